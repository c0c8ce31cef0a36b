//! Errors returned by the map and reduce executors.
//!
//! Every variant is terminal for the task that produced it. Nothing is
//! retried and nothing already on disk is rolled back.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{what} must be at least 1")]
    InvalidTaskCount { what: &'static str },

    #[error("failed to read input file `{}`", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create/open intermediate file `{}`", path.display())]
    IntermediateOpen {
        path: PathBuf,
        /// Bucket files fully written before the failure. Always empty when
        /// a reduce task fails to open one of its inputs.
        written: Vec<PathBuf>,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode into intermediate file `{}`", path.display())]
    IntermediateEncode {
        path: PathBuf,
        /// Bucket files fully written before the failure.
        written: Vec<PathBuf>,
        #[source]
        source: serde_json::Error,
    },

    #[error("intermediate file `{}` does not exist", path.display())]
    IntermediateMissing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode intermediate file `{}`", path.display())]
    IntermediateDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to create/open output file `{}`", path.display())]
    OutputOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode into output file `{}`", path.display())]
    OutputEncode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode output file `{}`", path.display())]
    OutputDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write output file `{}`", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to move staged intermediate file into place at `{}`", path.display())]
    IntermediateCommit {
        path: PathBuf,
        /// Bucket files fully written before the failure.
        written: Vec<PathBuf>,
        #[source]
        source: io::Error,
    },

    #[error("failed to move staged file into place at `{}`", path.display())]
    Commit {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TaskError {
    /// Files this task left complete on disk before failing.
    ///
    /// Only map-side write failures can leave earlier buckets behind.
    pub fn written(&self) -> &[PathBuf] {
        match self {
            TaskError::IntermediateOpen { written, .. }
            | TaskError::IntermediateEncode { written, .. }
            | TaskError::IntermediateCommit { written, .. } => written,
            _ => &[],
        }
    }
}
