use std::io::Write;
use std::process::{Command, Stdio};

use async_trait::async_trait;

use super::{ClipboardError, ClipboardResult, ClipboardStrategy};

const WL_COPY_COMMAND: &str = "wl-copy";
const MIME_TEXT_PLAIN_UTF8: &str = "text/plain;charset=utf-8";

/// Writes text through the Wayland `wl-copy` utility.
#[derive(Debug, Clone)]
pub struct WlCopyBackend {
    command: String,
}

impl WlCopyBackend {
    pub fn new() -> Self {
        Self::with_command(WL_COPY_COMMAND)
    }

    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn copy_blocking(command: &str, text: &str) -> ClipboardResult<()> {
        let io_error = |source| ClipboardError::CommandIo {
            command: command.to_string(),
            source,
        };
        let mut child = Command::new(command)
            .arg("--type")
            .arg(MIME_TEXT_PLAIN_UTF8)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(io_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(err) = stdin.write_all(text.as_bytes()) {
                drop(stdin);
                let _ = child.kill();
                let _ = child.wait();
                return Err(io_error(err));
            }
        }
        let status = child.wait().map_err(io_error)?;

        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::CommandFailed {
                status: status.to_string(),
            })
        }
    }
}

impl Default for WlCopyBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClipboardStrategy for WlCopyBackend {
    fn name(&self) -> &'static str {
        "wl-copy"
    }

    async fn write_text(&self, text: &str) -> ClipboardResult<()> {
        let command = self.command.clone();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || Self::copy_blocking(&command, &text))
            .await
            .map_err(|err| ClipboardError::Write {
                message: err.to_string(),
            })?
    }
}
