//! Copy-to-clipboard state for one rendered answer.
//!
//! A successful copy records the copied text and schedules a reset back to
//! "nothing copied". A newer copy supersedes the pending reset, and dropping
//! the controller cancels it.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::clipboard::Clipboard;

/// How long the "copied" indicator stays on.
pub const RESET_AFTER: Duration = Duration::from_millis(2000);

/// Which code text, if any, was most recently copied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyState {
    pub copied_text: Option<String>,
}

impl CopyState {
    /// Blocks are matched by exact text, so identical blocks light up together.
    pub fn is_copied(&self, text: &str) -> bool {
        self.copied_text.as_deref() == Some(text)
    }
}

#[derive(Default)]
struct PendingReset {
    // Bumped on every successful copy; a reset only applies to its own copy
    generation: u64,
    task: Option<JoinHandle<()>>,
}

pub struct CopyController {
    clipboard: Arc<dyn Clipboard>,
    state: Arc<watch::Sender<CopyState>>,
    reset_after: Duration,
    pending: Arc<Mutex<PendingReset>>,
}

impl CopyController {
    pub fn new(clipboard: Arc<dyn Clipboard>) -> Self {
        Self::with_reset_after(clipboard, RESET_AFTER)
    }

    pub fn with_reset_after(clipboard: Arc<dyn Clipboard>, reset_after: Duration) -> Self {
        let (state, _) = watch::channel(CopyState::default());
        Self {
            clipboard,
            state: Arc::new(state),
            reset_after,
            pending: Arc::new(Mutex::new(PendingReset::default())),
        }
    }

    /// Write `text` to the clipboard and, on success, mark it as copied.
    ///
    /// Failures leave the state alone and are only logged. Returns whether
    /// the write succeeded. Must be called from within a Tokio runtime.
    pub async fn copy(&self, text: &str) -> bool {
        if let Err(err) = self.clipboard.write_text(text).await {
            warn!(error = %err, "failed to copy code");
            return false;
        }

        let mut pending = self.pending.lock();
        pending.generation += 1;
        if let Some(task) = pending.task.take() {
            task.abort();
        }
        self.state.send_replace(CopyState {
            copied_text: Some(text.to_owned()),
        });
        pending.task = Some(self.spawn_reset(pending.generation));

        debug!(bytes = text.len(), generation = pending.generation, "copied code");
        true
    }

    fn spawn_reset(&self, generation: u64) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let pending = Arc::clone(&self.pending);
        let reset_after = self.reset_after;
        tokio::spawn(async move {
            tokio::time::sleep(reset_after).await;
            let mut pending = pending.lock();
            if pending.generation != generation {
                return;
            }
            pending.task = None;
            state.send_replace(CopyState::default());
            debug!(generation, "copy indicator reset");
        })
    }

    /// The current state.
    pub fn state(&self) -> CopyState {
        self.state.borrow().clone()
    }

    pub fn is_copied(&self, text: &str) -> bool {
        self.state.borrow().is_copied(text)
    }

    /// Watch for state changes, e.g. to re-render.
    pub fn subscribe(&self) -> watch::Receiver<CopyState> {
        self.state.subscribe()
    }
}

impl Drop for CopyController {
    fn drop(&mut self) {
        if let Some(task) = self.pending.lock().task.take() {
            task.abort();
        }
    }
}
