//! Error taxonomy for routing, activation and back-end failures.
//!
//! [`RouteError`] is what callers of the orchestrator see. Routing and
//! activation problems originate here and are raised directly; failures
//! inside a back-end are wrapped in [`RouteError::AnalysisFailed`] or
//! [`RouteError::ChunkingFailed`] with the underlying [`BackendError`] kept as
//! the error source.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::BackendId;

/// Errors surfaced by the classifier and the orchestrator.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Invalid backend hint '{hint}'. Valid options: {}", valid_hints())]
    InvalidHint { hint: String },

    #[error(
        "Unsupported file type '{extension}' for file '{}'.\n\n{}\n\n\
         If you believe this file should be supported, you can specify a backend hint, e.g.:\n  \
         docroute analyze '{}' --hint document",
        .path.display(),
        supported_type_summary(),
        .path.display()
    )]
    UnsupportedType { path: PathBuf, extension: String },

    #[error(
        "The '{backend}' backend is required to process '{}' but is not available.\n\n\
         Install the '{}' provider (extra: {}) or register it with the orchestrator.\n\
         Or install all back-ends (extra: all).",
        .path.display(),
        .backend.activation_target(),
        .backend.install_extra()
    )]
    BackendNotAvailable { backend: BackendId, path: PathBuf },

    #[error("Failed to analyze '{}' using '{backend}' backend: {source}", .path.display())]
    AnalysisFailed {
        path: PathBuf,
        backend: BackendId,
        source: BackendError,
    },

    #[error("Failed to chunk '{}' using '{backend}' backend: {source}", .path.display())]
    ChunkingFailed {
        path: PathBuf,
        backend: BackendId,
        source: BackendError,
    },
}

impl RouteError {
    /// The back-end involved, when the error got far enough to resolve one.
    pub fn backend(&self) -> Option<BackendId> {
        match self {
            RouteError::InvalidHint { .. } | RouteError::UnsupportedType { .. } => None,
            RouteError::BackendNotAvailable { backend, .. }
            | RouteError::AnalysisFailed { backend, .. }
            | RouteError::ChunkingFailed { backend, .. } => Some(*backend),
        }
    }
}

/// Failures reported by a back-end. Kept structured so callers can match on
/// the cause of an `AnalysisFailed` / `ChunkingFailed`.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("backend exited with status {code}: {stderr}")]
    Exited { code: i32, stderr: String },

    #[error("backend produced invalid JSON: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    #[error("unexpected backend output: {0}")]
    UnexpectedOutput(String),

    #[error("unsupported chunking strategy '{0}'")]
    UnsupportedStrategy(String),

    #[error("{0}")]
    Message(String),

    #[error("{0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl BackendError {
    /// Wrap any foreign error without flattening it to a string.
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        BackendError::Other(Box::new(err))
    }
}

fn valid_hints() -> String {
    let mut names: Vec<&str> = BackendId::ALL.iter().map(|id| id.as_str()).collect();
    names.sort_unstable();
    names.join(", ")
}

fn supported_type_summary() -> &'static str {
    "Supported file types:\n  \
     - XML: .xml\n  \
     - PDF/Office: .pdf, .docx, .pptx, .xlsx\n  \
     - Images: .png, .jpg, .jpeg, .tiff\n  \
     - Data: .csv, .parquet, .db, .sqlite\n  \
     - Code/Documents: .py, .js, .ts, .md, .txt, .yaml, .json, etc."
}
