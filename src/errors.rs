// src/errors.rs
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failures a pipeline step can classify. Everything else travels as a plain
/// `anyhow::Error` with context attached.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("request to {target} failed: {message}")]
    Network { target: String, message: String },

    #[error("{target} returned HTTP {status}")]
    HttpStatus { target: String, status: u16 },

    #[error("invalid URL {target}: {message}")]
    InvalidUrl { target: String, message: String },

    #[error("no usable text extracted from {0}")]
    EmptyContent(String),

    #[error("inference endpoint error: {0}")]
    Inference(String),

    #[error("inference request timed out after {0}s")]
    InferenceTimeout(u64),

    #[error("no free file name for {} after {attempts} attempts", .path.display())]
    NameCollision { path: PathBuf, attempts: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Parse,
    Inference,
    Filesystem,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Network => "network",
            FailureKind::Parse => "parse",
            FailureKind::Inference => "inference",
            FailureKind::Filesystem => "filesystem",
        };
        f.write_str(label)
    }
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::Network { .. } | PipelineError::HttpStatus { .. } => {
                FailureKind::Network
            }
            PipelineError::InvalidUrl { .. } | PipelineError::EmptyContent(_) => {
                FailureKind::Parse
            }
            PipelineError::Inference(_) | PipelineError::InferenceTimeout(_) => {
                FailureKind::Inference
            }
            PipelineError::NameCollision { .. } => FailureKind::Filesystem,
        }
    }
}

/// Classify an arbitrary error chain. Unclassified errors are treated as
/// filesystem failures since every other step raises a `PipelineError`.
pub fn classify(err: &anyhow::Error) -> FailureKind {
    for cause in err.chain() {
        if let Some(pipeline) = cause.downcast_ref::<PipelineError>() {
            return pipeline.kind();
        }
        if cause.downcast_ref::<reqwest::Error>().is_some() {
            return FailureKind::Network;
        }
    }
    FailureKind::Filesystem
}
