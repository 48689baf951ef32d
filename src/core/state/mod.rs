//! Provenance state recorded in a portable case

pub mod baseline;

pub use baseline::{record_baseline, SchemaBaseline, BASELINE_TABLE};
