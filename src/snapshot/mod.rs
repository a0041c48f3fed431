//! Snapshot context for an experiment results view
//!
//! A view mounts a [`SnapshotScope`] for one experiment. The scoped
//! [`SnapshotContext`] tracks the selected phase and dimension, issues fetch
//! tickets when they change, and applies only the response for the most
//! recently selected key. Responses come from any [`SnapshotSource`].

pub mod context;
pub mod model;
pub mod source;

use thiserror::Error;

pub use context::{
    AnalysisSelector, FetchOutcome, FetchRequest, PrimaryAnalysis, SnapshotContext, SnapshotScope,
};
pub use model::{
    AnalysisSettings, DimensionResult, Experiment, MetricResult, Phase, Snapshot,
    SnapshotAnalysis, SnapshotKey, SnapshotResponse, Variation, VariationResult,
};
pub use source::{DirectorySnapshotSource, MemorySnapshotSource, SnapshotSource};

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot context used outside of a mounted results view")]
    NotMounted,

    #[error("no snapshot at {0}")]
    NotFound(String),

    #[error("invalid snapshot path segment {0:?}")]
    InvalidSegment(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid snapshot JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("snapshot fetch failed: {0}")]
    Fetch(String),
}
