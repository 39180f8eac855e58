//! Command Line Interface (CLI) layer for the retrieval pipeline.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`). It wires user-provided options to
//! the underlying library functionality exposed via the `api` module.
//!
//! If you are embedding the pipeline into another application, prefer the
//! high-level `api` module over calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
