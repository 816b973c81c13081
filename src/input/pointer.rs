use serde::Deserialize;

use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    Primary,
    Auxiliary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    pub const fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    PointerDown,
    /// Context-menu request; always carries secondary-button semantics.
    ContextMenu,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInteraction {
    pub kind: InteractionKind,
    pub button: PointerButton,
    pub modifiers: Modifiers,
    pub position: Point,
}

impl PointerInteraction {
    pub fn pointer_down(button: PointerButton, modifiers: Modifiers, position: Point) -> Self {
        Self {
            kind: InteractionKind::PointerDown,
            button,
            modifiers,
            position,
        }
    }

    pub fn context_menu(position: Point) -> Self {
        Self {
            kind: InteractionKind::ContextMenu,
            button: PointerButton::Secondary,
            modifiers: Modifiers::NONE,
            position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyRequirement {
    Required,
    Forbidden,
    #[default]
    Ignored,
}

impl KeyRequirement {
    fn accepts(self, pressed: bool) -> bool {
        match self {
            Self::Required => pressed,
            Self::Forbidden => !pressed,
            Self::Ignored => true,
        }
    }
}

/// Ctrl and Meta are treated as one "command" key so the same rule works
/// across platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ModifierRules {
    pub command: KeyRequirement,
    pub shift: KeyRequirement,
    pub alt: KeyRequirement,
}

/// Button-plus-modifier combination that qualifies an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TriggerPredicate {
    pub button: PointerButton,
    #[serde(default)]
    pub modifiers: ModifierRules,
}

impl TriggerPredicate {
    /// Right-click, with or without modifiers.
    pub const fn secondary_click() -> Self {
        Self {
            button: PointerButton::Secondary,
            modifiers: ModifierRules {
                command: KeyRequirement::Ignored,
                shift: KeyRequirement::Ignored,
                alt: KeyRequirement::Ignored,
            },
        }
    }

    /// Ctrl/Cmd + left click with neither Alt nor Shift held.
    pub const fn command_click() -> Self {
        Self {
            button: PointerButton::Primary,
            modifiers: ModifierRules {
                command: KeyRequirement::Required,
                shift: KeyRequirement::Forbidden,
                alt: KeyRequirement::Forbidden,
            },
        }
    }

    pub fn matches(&self, interaction: &PointerInteraction) -> bool {
        let button = match interaction.kind {
            InteractionKind::ContextMenu => PointerButton::Secondary,
            InteractionKind::PointerDown => interaction.button,
        };
        if button != self.button {
            return false;
        }
        let mods = interaction.modifiers;
        self.modifiers.command.accepts(mods.ctrl || mods.meta)
            && self.modifiers.shift.accepts(mods.shift)
            && self.modifiers.alt.accepts(mods.alt)
    }
}

impl Default for TriggerPredicate {
    fn default() -> Self {
        Self::secondary_click()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(button: PointerButton, modifiers: Modifiers) -> PointerInteraction {
        PointerInteraction::pointer_down(button, modifiers, Point::new(1.0, 1.0))
    }

    #[test]
    fn secondary_click_accepts_context_menu_and_right_button() {
        let trigger = TriggerPredicate::secondary_click();
        assert!(trigger.matches(&PointerInteraction::context_menu(Point::default())));
        assert!(trigger.matches(&down(PointerButton::Secondary, Modifiers::ctrl())));
        assert!(!trigger.matches(&down(PointerButton::Primary, Modifiers::NONE)));
    }

    #[test]
    fn command_click_requires_ctrl_or_meta_without_alt_or_shift() {
        let trigger = TriggerPredicate::command_click();
        assert!(trigger.matches(&down(PointerButton::Primary, Modifiers::ctrl())));
        assert!(trigger.matches(&down(
            PointerButton::Primary,
            Modifiers {
                meta: true,
                ..Modifiers::NONE
            }
        )));
        assert!(!trigger.matches(&down(PointerButton::Primary, Modifiers::NONE)));
        assert!(!trigger.matches(&down(
            PointerButton::Primary,
            Modifiers {
                ctrl: true,
                shift: true,
                ..Modifiers::NONE
            }
        )));
        assert!(!trigger.matches(&down(PointerButton::Secondary, Modifiers::ctrl())));
    }

    #[test]
    fn trigger_deserializes_from_config_json() {
        let trigger: TriggerPredicate = serde_json::from_str(
            r#"{ "button": "primary", "modifiers": { "alt": "required" } }"#,
        )
        .expect("trigger json");
        assert_eq!(trigger.button, PointerButton::Primary);
        assert_eq!(trigger.modifiers.alt, KeyRequirement::Required);
        assert_eq!(trigger.modifiers.command, KeyRequirement::Ignored);
    }
}
