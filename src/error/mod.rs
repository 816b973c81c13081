use crate::arbitrator::ElectionError;
use crate::clipboard::ClipboardError;
use crate::dom::DocumentError;
use crate::frame::OpenError;
use crate::palette::PaletteError;
use crate::protocol::TransportError;
use crate::resolve::ResolveError;
use crate::state::StateError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Palette(#[from] PaletteError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Open(#[from] OpenError),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
    #[error(transparent)]
    Election(#[from] ElectionError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Document(#[from] DocumentError),
}
