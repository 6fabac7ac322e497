//! The clipboard capability the copy controller writes through.

use async_trait::async_trait;
use tracing::debug;

use crate::error::ClipboardError;

/// A place code can be copied to. Only text writes are needed.
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The system clipboard via `arboard`.
///
/// `arboard` is blocking, so every write runs on the blocking pool with a
/// fresh handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let text = text.to_owned();
        let len = text.len();
        tokio::task::spawn_blocking(move || {
            let mut clipboard = arboard::Clipboard::new()
                .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            clipboard
                .set_text(text)
                .map_err(|e| ClipboardError::Denied(e.to_string()))
        })
        .await
        .map_err(|e| ClipboardError::Task(e.to_string()))??;

        debug!(bytes = len, "wrote system clipboard");
        Ok(())
    }
}
