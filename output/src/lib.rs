//! # PSL Output
//!
//! Binary encoder for resolved pipeline sets and their compilation
//! artifacts, plus the matching reference reader used by runtime loaders
//! and the round-trip tests. The wire layout lives in [psl_formats].

mod encoder;
mod reader;

pub use encoder::{output_compute_set, output_pipeline_set, OutputError, PipelineOutput};
pub use reader::{PipelineFile, ReadError};

#[cfg(test)]
mod tests;
