use super::model::PaletteState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteEvent {
    Open,
    Cancel,
    Activated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: Option<PaletteState>,
    pub event: PaletteEvent,
    pub to: PaletteState,
}

impl StateTransition {
    pub const fn new(from: Option<PaletteState>, event: PaletteEvent, to: PaletteState) -> Self {
        Self { from, event, to }
    }
}
