use super::error::{StateError, StateResult};
use super::{PaletteEvent, PaletteState, StateTransition};

#[derive(Debug)]
pub struct StateMachine {
    state: PaletteState,
    transition_history: Vec<StateTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: PaletteState::default(),
            transition_history: Vec::new(),
        }
    }

    pub fn state(&self) -> PaletteState {
        self.state
    }

    pub fn can_transition(&self, event: PaletteEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: PaletteEvent) -> Option<PaletteState> {
        use PaletteEvent::*;
        match (self.state, event) {
            (PaletteState::Closed, Open) => Some(PaletteState::Open),
            (PaletteState::Open, Cancel) => Some(PaletteState::Closed),
            (PaletteState::Open, Activated) => Some(PaletteState::Closed),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: PaletteEvent) -> StateResult<PaletteState> {
        tracing::debug!(from = ?self.state, event = ?event, "request palette transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid palette transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        let record = StateTransition::new(Some(self.state), event, next);
        self.state = next;
        self.transition_history.push(record);

        Ok(self.state)
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.transition_history
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaletteState::{:?}", self.state)
    }
}
