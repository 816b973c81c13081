use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{ClipboardError, ClipboardResult, ClipboardStrategy};

/// Clipboard access the hosting environment grants explicitly (userscript
/// managers and similar). Only some hosts provide one.
pub trait HostClipboardGrant: Send + Sync {
    fn set_clipboard(&self, text: &str) -> Result<(), String>;
}

pub struct HostGrantStrategy {
    grant: Option<Arc<dyn HostClipboardGrant>>,
}

impl HostGrantStrategy {
    pub fn new(grant: Arc<dyn HostClipboardGrant>) -> Self {
        Self { grant: Some(grant) }
    }

    pub fn unavailable() -> Self {
        Self { grant: None }
    }
}

#[async_trait]
impl ClipboardStrategy for HostGrantStrategy {
    fn name(&self) -> &'static str {
        "host-grant"
    }

    async fn write_text(&self, text: &str) -> ClipboardResult<()> {
        let grant = self.grant.as_ref().ok_or(ClipboardError::Unavailable {
            strategy: "host-grant",
        })?;
        grant
            .set_clipboard(text)
            .map_err(|message| ClipboardError::HostRejected { message })
    }
}

/// Primitives for the last-resort copy: an off-screen editable field whose
/// selected content is copied with the page's copy command.
pub trait SelectionCopy: Send + Sync {
    type Field;

    fn insert_offscreen_field(&self, value: &str) -> Result<Self::Field, String>;
    fn select_field(&self, field: &Self::Field) -> Result<(), String>;
    /// Runs the copy command; `false` when the page refused it.
    fn exec_copy(&self) -> bool;
    fn remove_field(&self, field: Self::Field);
}

pub struct OffscreenCopyStrategy<S> {
    selection: S,
}

impl<S: SelectionCopy> OffscreenCopyStrategy<S> {
    pub fn new(selection: S) -> Self {
        Self { selection }
    }
}

#[async_trait]
impl<S> ClipboardStrategy for OffscreenCopyStrategy<S>
where
    S: SelectionCopy,
    S::Field: Send,
{
    fn name(&self) -> &'static str {
        "offscreen-selection"
    }

    async fn write_text(&self, text: &str) -> ClipboardResult<()> {
        let field = self
            .selection
            .insert_offscreen_field(text)
            .map_err(|message| ClipboardError::Write { message })?;
        let copied = self
            .selection
            .select_field(&field)
            .map(|()| self.selection.exec_copy());
        self.selection.remove_field(field);

        match copied {
            Ok(true) => Ok(()),
            Ok(false) => Err(ClipboardError::CopyCommandRejected),
            Err(message) => Err(ClipboardError::Write { message }),
        }
    }
}

/// Process-local clipboard, handy for tests and dry runs.
#[derive(Debug, Clone)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
    available: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self {
            contents: Arc::default(),
            available: true,
        }
    }

    /// A clipboard that refuses every write.
    pub fn unavailable() -> Self {
        Self {
            contents: Arc::default(),
            available: false,
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Default for MemoryClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClipboardStrategy for MemoryClipboard {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn write_text(&self, text: &str) -> ClipboardResult<()> {
        if !self.available {
            return Err(ClipboardError::Unavailable { strategy: "memory" });
        }
        let mut guard = self.contents.lock().map_err(|err| ClipboardError::Write {
            message: err.to_string(),
        })?;
        *guard = Some(text.to_string());
        Ok(())
    }
}

impl HostClipboardGrant for MemoryClipboard {
    fn set_clipboard(&self, text: &str) -> Result<(), String> {
        if !self.available {
            return Err("grant revoked".to_string());
        }
        let mut guard = self.contents.lock().map_err(|err| err.to_string())?;
        *guard = Some(text.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SelectionState {
    fields: Vec<(u64, String)>,
    selected: Option<u64>,
    next_field: u64,
    copied: Option<String>,
}

/// Off-screen field emulation that records what the copy command saw.
#[derive(Debug, Clone, Default)]
pub struct MemorySelection {
    state: Arc<Mutex<SelectionState>>,
    copy_enabled: bool,
}

impl MemorySelection {
    pub fn new(copy_enabled: bool) -> Self {
        Self {
            state: Arc::default(),
            copy_enabled,
        }
    }

    pub fn copied(&self) -> Option<String> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.copied.clone())
    }

    pub fn open_fields(&self) -> usize {
        self.state.lock().map(|state| state.fields.len()).unwrap_or(0)
    }
}

impl SelectionCopy for MemorySelection {
    type Field = u64;

    fn insert_offscreen_field(&self, value: &str) -> Result<u64, String> {
        let mut state = self.state.lock().map_err(|err| err.to_string())?;
        let id = state.next_field;
        state.next_field += 1;
        state.fields.push((id, value.to_string()));
        Ok(id)
    }

    fn select_field(&self, field: &u64) -> Result<(), String> {
        let mut state = self.state.lock().map_err(|err| err.to_string())?;
        if !state.fields.iter().any(|(id, _)| id == field) {
            return Err(format!("field {field} is not in the page"));
        }
        state.selected = Some(*field);
        Ok(())
    }

    fn exec_copy(&self) -> bool {
        if !self.copy_enabled {
            return false;
        }
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        let selected = state.selected.and_then(|selected| {
            state
                .fields
                .iter()
                .find(|(id, _)| *id == selected)
                .map(|(_, value)| value.clone())
        });
        match selected {
            Some(value) => {
                state.copied = Some(value);
                true
            }
            None => false,
        }
    }

    fn remove_field(&self, field: u64) {
        if let Ok(mut state) = self.state.lock() {
            state.fields.retain(|(id, _)| *id != field);
            if state.selected == Some(field) {
                state.selected = None;
            }
        }
    }
}
