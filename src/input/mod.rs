mod pointer;
mod shortcut;

pub use pointer::{
    InteractionKind, KeyRequirement, ModifierRules, Modifiers, PointerButton, PointerInteraction,
    TriggerPredicate,
};
pub use shortcut::{resolve_palette_key, EventDisposition, PaletteCommand, PaletteKey};
