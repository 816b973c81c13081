mod fallback;
mod wl_copy;

pub use fallback::{
    HostClipboardGrant, HostGrantStrategy, MemoryClipboard, MemorySelection,
    OffscreenCopyStrategy, SelectionCopy,
};
pub use wl_copy::WlCopyBackend;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard strategy {strategy} is not available here")]
    Unavailable { strategy: &'static str },
    #[error("failed to run wl-copy command: {command}")]
    CommandIo {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("wl-copy exited with non-zero status: {status}")]
    CommandFailed { status: String },
    #[error("host clipboard grant rejected the write: {message}")]
    HostRejected { message: String },
    #[error("copy command was rejected by the page")]
    CopyCommandRejected,
    #[error("clipboard write failed: {message}")]
    Write { message: String },
}

pub type ClipboardResult<T> = std::result::Result<T, ClipboardError>;

/// One way of getting text onto the system clipboard.
#[async_trait]
pub trait ClipboardStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn write_text(&self, text: &str) -> ClipboardResult<()>;
}

/// Ordered clipboard strategies; the first that succeeds wins.
///
/// Failures are logged and fall through to the next strategy. No strategy is
/// attempted twice for the same write.
#[derive(Default)]
pub struct ClipboardWriter {
    strategies: Vec<Box<dyn ClipboardStrategy>>,
}

impl ClipboardWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform clipboard, then the host-granted clipboard, then the
    /// selection-based copy command.
    pub fn with_chain(
        direct: impl ClipboardStrategy + 'static,
        host_grant: impl ClipboardStrategy + 'static,
        selection: impl ClipboardStrategy + 'static,
    ) -> Self {
        Self::new()
            .with_strategy(direct)
            .with_strategy(host_grant)
            .with_strategy(selection)
    }

    pub fn with_strategy(mut self, strategy: impl ClipboardStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|strategy| strategy.name()).collect()
    }

    /// Returns whether any strategy committed `text`.
    pub async fn write(&self, text: &str) -> bool {
        for strategy in &self.strategies {
            match strategy.write_text(text).await {
                Ok(()) => {
                    tracing::debug!(strategy = strategy.name(), len = text.len(), "copied to clipboard");
                    return true;
                }
                Err(err) => {
                    tracing::debug!(strategy = strategy.name(), %err, "clipboard strategy failed");
                }
            }
        }
        tracing::warn!(len = text.len(), "every clipboard strategy failed");
        false
    }
}

impl std::fmt::Debug for ClipboardWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardWriter")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Scripted {
        name: &'static str,
        succeed: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ClipboardStrategy for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn write_text(&self, _text: &str) -> ClipboardResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(())
            } else {
                Err(ClipboardError::Write {
                    message: format!("{} refused", self.name),
                })
            }
        }
    }

    fn scripted(name: &'static str, succeed: bool) -> (Scripted, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Scripted {
                name,
                succeed,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    #[tokio::test]
    async fn write_stops_at_first_successful_strategy() {
        let (direct, direct_calls) = scripted("direct", false);
        let (grant, grant_calls) = scripted("grant", true);
        let (selection, selection_calls) = scripted("selection", true);
        let writer = ClipboardWriter::with_chain(direct, grant, selection);

        assert!(writer.write("hello").await);
        assert_eq!(direct_calls.load(Ordering::SeqCst), 1);
        assert_eq!(grant_calls.load(Ordering::SeqCst), 1);
        assert_eq!(selection_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn write_reports_failure_after_each_strategy_tried_once() {
        let (direct, direct_calls) = scripted("direct", false);
        let (grant, grant_calls) = scripted("grant", false);
        let (selection, selection_calls) = scripted("selection", false);
        let writer = ClipboardWriter::with_chain(direct, grant, selection);

        assert!(!writer.write("hello").await);
        assert_eq!(direct_calls.load(Ordering::SeqCst), 1);
        assert_eq!(grant_calls.load(Ordering::SeqCst), 1);
        assert_eq!(selection_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_writer_fails() {
        assert!(!ClipboardWriter::new().write("x").await);
    }

    #[test]
    fn strategy_names_follow_priority_order() {
        let (direct, _) = scripted("direct", true);
        let (grant, _) = scripted("grant", true);
        let (selection, _) = scripted("selection", true);
        let writer = ClipboardWriter::with_chain(direct, grant, selection);
        assert_eq!(writer.strategy_names(), vec!["direct", "grant", "selection"]);
    }

    #[test]
    fn command_error_contains_command_name() {
        let err = ClipboardError::CommandFailed {
            status: "exit status 1".to_string(),
        };
        assert!(format!("{err}").contains("wl-copy"));
    }
}
