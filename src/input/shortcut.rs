#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteKey {
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Enter,
    Escape,
    Character(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteCommand {
    MoveNext,
    MovePrevious,
    MoveFirst,
    MoveLast,
    Activate,
    Cancel,
}

/// Whether an event was handled by the copier or left to the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    Consumed,
    PassThrough,
}

pub fn resolve_palette_key(key: PaletteKey) -> Option<PaletteCommand> {
    match key {
        PaletteKey::ArrowDown => Some(PaletteCommand::MoveNext),
        PaletteKey::ArrowUp => Some(PaletteCommand::MovePrevious),
        PaletteKey::Home => Some(PaletteCommand::MoveFirst),
        PaletteKey::End => Some(PaletteCommand::MoveLast),
        PaletteKey::Enter => Some(PaletteCommand::Activate),
        PaletteKey::Escape => Some(PaletteCommand::Cancel),
        PaletteKey::Character(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_palette_key_maps_navigation_keys() {
        assert_eq!(
            resolve_palette_key(PaletteKey::ArrowDown),
            Some(PaletteCommand::MoveNext)
        );
        assert_eq!(
            resolve_palette_key(PaletteKey::ArrowUp),
            Some(PaletteCommand::MovePrevious)
        );
        assert_eq!(
            resolve_palette_key(PaletteKey::Home),
            Some(PaletteCommand::MoveFirst)
        );
        assert_eq!(
            resolve_palette_key(PaletteKey::End),
            Some(PaletteCommand::MoveLast)
        );
    }

    #[test]
    fn resolve_palette_key_maps_enter_and_escape() {
        assert_eq!(
            resolve_palette_key(PaletteKey::Enter),
            Some(PaletteCommand::Activate)
        );
        assert_eq!(
            resolve_palette_key(PaletteKey::Escape),
            Some(PaletteCommand::Cancel)
        );
    }

    #[test]
    fn resolve_palette_key_ignores_plain_characters() {
        assert_eq!(resolve_palette_key(PaletteKey::Character('c')), None);
    }
}
