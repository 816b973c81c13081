use super::event::PaletteEvent;
use super::model::PaletteState;
use thiserror::Error;

pub type StateResult<T> = std::result::Result<T, StateError>;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid palette transition: from {from:?} using event {event:?}")]
    InvalidStateTransition {
        from: PaletteState,
        event: PaletteEvent,
    },
}
