//! Command-line interface (C0, ambient: not part of the pipeline's core
//! contract). Parses arguments, loads configuration, runs the pipeline
//! against two pre-existing local checkouts, and renders the result.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use prreview_cache::Cache;
use prreview_llm::HttpLlmBackend;
use prreview_types::request::{ModelConfig, PipelineRequest};

use crate::coordinator::{Checkouts, Coordinator};
use crate::exit_codes::{self, exit_code_for};

/// Compares a pull request's branch against its base branch and reports
/// new, fixed, and unchanged issues.
#[derive(Parser)]
#[command(name = "prreview")]
#[command(about = "Adaptive LLM-driven pull request analysis pipeline")]
#[command(long_about = r#"
prreview runs an iterative LLM-driven analysis of two branches of a
repository, matches issues across them by content fingerprint (not line
number), and reports which issues are new, fixed, or unchanged.

EXAMPLES:
  # Compare a PR branch against main, using checkouts already on disk
  prreview review --repo-url https://github.com/acme/widgets --pr-number 42 \
    --main-ref main --pr-ref pull/42/head \
    --main-checkout /tmp/widgets-main --pr-checkout /tmp/widgets-pr42

CONFIGURATION:
  LLM_URL and LLM_KEY are required, from the environment or from a
  prreview.toml file discovered via --config. CLI flags take precedence
  over the config file, which takes precedence over defaults.
"#)]
#[command(version)]
pub struct Cli {
    /// Directory containing prreview.toml (if any)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Analyze one pull request and print a `ComparisonResult`
    Review {
        #[arg(long)]
        repo_url: String,
        #[arg(long)]
        pr_number: u64,
        #[arg(long, default_value = "main")]
        main_ref: String,
        #[arg(long)]
        pr_ref: String,
        /// Local checkout of `main_ref`
        #[arg(long)]
        main_checkout: PathBuf,
        /// Local checkout of `pr_ref`
        #[arg(long)]
        pr_checkout: PathBuf,
        /// Primary model identifier forwarded to the LLM backend unchanged
        #[arg(long)]
        model: String,
        /// Fallback model identifier, used if the model-selection
        /// collaborator populated one
        #[arg(long)]
        fallback_model: Option<String>,
        /// Print the result as JSON instead of a human-readable summary
        #[arg(long)]
        json: bool,
    },
}

/// Parses arguments, runs the pipeline, and prints the result. Returns the
/// process exit code on failure; `main.rs` only calls `std::process::exit`.
pub fn run() -> Result<(), i32> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_target(false)
        .init();

    let config = prreview_config::Config::load(cli.config.as_deref()).map_err(|err| {
        eprintln!("configuration error: {err}");
        exit_codes::codes::CLI_ARGS
    })?;

    let rt = tokio::runtime::Runtime::new().map_err(|err| {
        eprintln!("failed to start async runtime: {err}");
        exit_codes::codes::PROGRAMMING
    })?;

    match cli.command {
        Commands::Review {
            repo_url,
            pr_number,
            main_ref,
            pr_ref,
            main_checkout,
            pr_checkout,
            model,
            fallback_model,
            json,
        } => rt.block_on(async move {
            let llm = HttpLlmBackend::new(config.llm_url.clone(), config.llm_key.clone()).map_err(|err| {
                eprintln!("failed to build LLM client: {err}");
                exit_codes::codes::CLI_ARGS
            })?;

            let cache = Arc::new(Cache::new(None));
            let coordinator = Coordinator::new(Arc::new(llm), cache, config.options.max_in_flight);

            let mut model_config = ModelConfig::new(model);
            if let Some(fallback) = fallback_model {
                model_config = model_config.with_fallback(fallback);
            }

            let request = PipelineRequest::new(repo_url, pr_number, main_ref, pr_ref, model_config)
                .with_options(config.options.clone());
            let checkouts = Checkouts::new(main_checkout, pr_checkout);

            let result = coordinator.run(&request, &checkouts).await.map_err(|err| {
                eprintln!("✗ {err}");
                exit_code_for(err.kind())
            })?;

            if json {
                let rendered = serde_json::to_string_pretty(&result).map_err(|err| {
                    eprintln!("failed to render result as JSON: {err}");
                    exit_codes::codes::PROGRAMMING
                })?;
                println!("{rendered}");
            } else {
                print_summary(&result);
            }

            Ok(())
        }),
    }
}

fn print_summary(result: &prreview_types::result::ComparisonResult) {
    println!("decision: {:?}", result.summary.decision);
    println!("quality score: {}", result.summary.quality_score);
    println!(
        "new: {}  fixed: {}  unchanged: {}",
        result.new_issues.len(),
        result.fixed_issues.len(),
        result.unchanged_issues.len()
    );
    for issue in &result.new_issues {
        println!(
            "  [NEW] {:?} {} ({}:{})",
            issue.severity, issue.title, issue.location.file, issue.location.line
        );
    }
    for warning in &result.warnings {
        println!("warning: {:?}: {}", warning.kind, warning.message);
    }
}
