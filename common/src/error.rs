use thiserror::Error;

/// Failures of the browser key-value store. Never fatal: callers log them
/// and carry on with in-memory state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage quota exceeded")]
    QuotaExceeded,
    #[error("could not encode {key}: {reason}")]
    Encode { key: String, reason: String },
}

/// Failures of the PDF export. Any of them aborts the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    #[error("an export is already running")]
    AlreadyRunning,
    #[error("fonts did not load: {0}")]
    Fonts(String),
    #[error("rasterizing sheet {sheet} failed: {reason}")]
    Rasterize { sheet: usize, reason: String },
    #[error("building the document failed: {0}")]
    Document(String),
    #[error("saving {filename} failed: {reason}")]
    Save { filename: String, reason: String },
}
