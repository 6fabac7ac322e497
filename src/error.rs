use std::path::PathBuf;

/// Clipboard write failures.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    /// No clipboard could be opened on this platform/session.
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    /// The clipboard refused the write.
    #[error("clipboard write denied: {0}")]
    Denied(String),
    /// The blocking clipboard task panicked or was cancelled.
    #[error("clipboard task failed: {0}")]
    Task(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("no code block {index}: the answer has {available}")]
    NoSuchCodeBlock { index: usize, available: usize },
}
