//! # CLI Layer
//!
//! The only place that knows about terminal I/O and exit codes.
//!
//! - `setup`: argument parsing via clap
//! - `commands`: loads the table and settings, drives the coordinator
//! - `render`: text and JSON output

mod commands;
mod render;
pub mod setup;

pub use commands::run;
