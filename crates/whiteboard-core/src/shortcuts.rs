//! Keyboard shortcut registry.

use crate::input::KeyEvent;

/// Action bound to a keyboard shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Undo,
    Redo,
    DeleteSelection,
    Cancel,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub command: Command,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        command: Command,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            command,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    /// Whether a key event triggers this shortcut.
    ///
    /// Letter keys compare case-insensitively since Shift changes the
    /// reported key.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        event.key.eq_ignore_ascii_case(self.key)
            && event.modifiers.command() == self.ctrl
            && event.modifiers.shift == self.shift
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, Command::Undo, "Undo"),
            Shortcut::new("Z", true, true, Command::Redo, "Redo"),
            Shortcut::new("Y", true, false, Command::Redo, "Redo"),
            Shortcut::new(
                "Delete",
                false,
                false,
                Command::DeleteSelection,
                "Delete selected shape",
            ),
            Shortcut::new(
                "Backspace",
                false,
                false,
                Command::DeleteSelection,
                "Delete selected shape",
            ),
            Shortcut::new("Escape", false, false, Command::Cancel, "Cancel current action"),
        ]
    }

    /// Find the command bound to a key event.
    pub fn lookup(event: &KeyEvent) -> Option<Command> {
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(event))
            .map(|shortcut| shortcut.command)
    }

    /// Human-readable listing, one shortcut per line.
    pub fn describe() -> String {
        Self::all()
            .iter()
            .map(|shortcut| format!("  {:20} {}", shortcut.format(), shortcut.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    #[test]
    fn test_undo_redo_lookup() {
        assert_eq!(
            ShortcutRegistry::lookup(&KeyEvent::with_modifiers("z", Modifiers::CTRL)),
            Some(Command::Undo)
        );
        assert_eq!(
            ShortcutRegistry::lookup(&KeyEvent::with_modifiers("Z", Modifiers::CTRL_SHIFT)),
            Some(Command::Redo)
        );
        assert_eq!(
            ShortcutRegistry::lookup(&KeyEvent::with_modifiers("y", Modifiers::CTRL)),
            Some(Command::Redo)
        );
    }

    #[test]
    fn test_plain_letter_is_not_a_shortcut() {
        assert_eq!(ShortcutRegistry::lookup(&KeyEvent::new("z")), None);
    }

    #[test]
    fn test_delete_keys() {
        assert_eq!(
            ShortcutRegistry::lookup(&KeyEvent::new("Delete")),
            Some(Command::DeleteSelection)
        );
        assert_eq!(
            ShortcutRegistry::lookup(&KeyEvent::new("Backspace")),
            Some(Command::DeleteSelection)
        );
        assert_eq!(ShortcutRegistry::lookup(&KeyEvent::new("Escape")), Some(Command::Cancel));
    }

    #[test]
    fn test_format() {
        let shortcut = Shortcut::new("Z", true, true, Command::Redo, "Redo");
        assert_eq!(shortcut.format(), "Ctrl+Shift+Z");
        assert!(ShortcutRegistry::describe().contains("Ctrl+Y"));
    }
}
