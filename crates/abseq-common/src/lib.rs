//! abseq common types and errors.
//!
//! This crate provides foundational types shared across abseq crates:
//! - Experiment arms and aggregate buckets
//! - The unified error type with stable codes

pub mod bucket;
pub mod error;

pub use bucket::{AggregateBucket, Arm, ArmBuckets};
pub use error::{Error, ErrorCategory, Result};
