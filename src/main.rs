//! `prreview` CLI binary. All logic lives in the library; main.rs only
//! invokes `cli::run()` and maps its result to a process exit code.

fn main() {
    if let Err(code) = prreview::cli::run() {
        std::process::exit(code);
    }
}
