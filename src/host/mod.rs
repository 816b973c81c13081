use std::sync::Arc;

use async_trait::async_trait;

use crate::arbitrator::{Arbitrator, ElectionError};
use crate::protocol::{OpenResponse, TabId};

pub const COMMAND_ID: &str = "dom-copier-open";
pub const COMMAND_TITLE: &str = "DOM Copier";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    pub id: String,
    pub title: String,
}

impl CommandEntry {
    pub fn open_palette() -> Self {
        Self {
            id: COMMAND_ID.to_string(),
            title: COMMAND_TITLE.to_string(),
        }
    }
}

/// Host menu where commands are listed.
#[async_trait]
pub trait CommandRegistry: Send + Sync {
    async fn remove_all(&self) -> Result<(), String>;
    async fn create(&self, entry: CommandEntry) -> Result<(), String>;
}

/// Replaces every registered entry with the single open-palette command.
/// Registration failures are logged; the command simply stays unavailable.
pub async fn register_command(registry: &dyn CommandRegistry) -> bool {
    if let Err(message) = registry.remove_all().await {
        tracing::warn!(%message, "could not clear host commands");
    }
    match registry.create(CommandEntry::open_palette()).await {
        Ok(()) => {
            tracing::debug!(id = COMMAND_ID, "host command registered");
            true
        }
        Err(message) => {
            tracing::warn!(%message, id = COMMAND_ID, "could not register host command");
            false
        }
    }
}

/// Dispatches host command invocations to the arbitrator.
#[derive(Debug, Clone)]
pub struct HostCommand {
    arbitrator: Arc<Arbitrator>,
}

impl HostCommand {
    pub fn new(arbitrator: Arc<Arbitrator>) -> Self {
        Self { arbitrator }
    }

    /// Handles one invocation. Unknown commands, missing tabs and elections
    /// that find nothing are silent no-ops for the user.
    pub async fn on_command(&self, id: &str, tab: Option<TabId>) -> Option<OpenResponse> {
        if id != COMMAND_ID {
            return None;
        }
        let Some(tab) = tab else {
            tracing::debug!("command invoked without a tab");
            return None;
        };
        match self.arbitrator.run(tab).await {
            Ok((_, response)) => Some(response),
            Err(err @ ElectionError::NoRecentContext(_)) => {
                tracing::warn!(%err, "nothing to open; right-click an element first");
                None
            }
            Err(err) => {
                tracing::warn!(%err, "open command failed");
                None
            }
        }
    }
}
