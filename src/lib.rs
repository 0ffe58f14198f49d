//! Adaptive LLM-driven pull request analysis pipeline.
//!
//! This crate wires C1–C8 (in the `prreview-*` workspace crates) into the
//! Pipeline Coordinator (C9) and an ambient CLI (C0). Library consumers
//! should depend on [`coordinator::Coordinator`] directly rather than on
//! the CLI.

pub mod cli;
pub mod coordinator;
pub mod exit_codes;

pub use coordinator::{Checkouts, Coordinator};
