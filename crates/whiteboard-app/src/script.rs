//! Scripted input for `whiteboard replay`.
//!
//! A script is a JSON array of steps, each tagged by `action`:
//!
//! ```json
//! [
//!   { "action": "tool", "name": "draw" },
//!   { "action": "pointer", "event": { "type": "down", "position": { "x": 10, "y": 10 } } },
//!   { "action": "pointer", "event": { "type": "move", "position": { "x": 40, "y": 25 } } },
//!   { "action": "pointer", "event": { "type": "up", "position": { "x": 40, "y": 25 } } },
//!   { "action": "key", "key": "z", "modifiers": { "ctrl": true } }
//! ]
//! ```

use serde::Deserialize;
use whiteboard_core::input::{KeyEvent, Modifiers, PointerEvent};
use whiteboard_core::session::Session;
use whiteboard_core::tools::ToolKind;

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ReplayStep {
    Pointer {
        event: PointerEvent,
    },
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Tool {
        name: String,
    },
    Color {
        hex: String,
    },
    StrokeWidth {
        width: u32,
    },
    /// Insert a default shape (`rectangle`, `ellipse` or `text`).
    Insert {
        kind: String,
    },
    Delete,
    Undo,
    Redo,
    Clear,
    ResetView,
}

impl ReplayStep {
    /// Apply the step to a session.
    pub fn apply(&self, session: &mut Session) {
        match self {
            ReplayStep::Pointer { event } => session.handle_pointer_event(event),
            ReplayStep::Key { key, modifiers } => {
                let event = KeyEvent::with_modifiers(key.clone(), *modifiers);
                if session.handle_key(&event).is_none() {
                    log::debug!("Key {key:?} is not bound");
                }
            }
            ReplayStep::Tool { name } => {
                session.set_tool_by_name(name);
            }
            ReplayStep::Color { hex } => {
                if !session.set_color(hex) {
                    log::warn!("Ignoring invalid color {hex:?}");
                }
            }
            ReplayStep::StrokeWidth { width } => session.set_stroke_width(*width),
            ReplayStep::Insert { kind } => {
                let kind = ToolKind::from_name(kind);
                if session.insert_shape(kind).is_none() {
                    log::warn!("Nothing inserted for {}", kind.name());
                }
            }
            ReplayStep::Delete => {
                session.delete_selected();
            }
            ReplayStep::Undo => {
                session.undo();
            }
            ReplayStep::Redo => {
                session.redo();
            }
            ReplayStep::Clear => session.clear(),
            ReplayStep::ResetView => session.reset_view(),
        }
    }
}

/// Parse a replay script.
pub fn parse_script(json: &str) -> serde_json::Result<Vec<ReplayStep>> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use whiteboard_core::shapes::Shape;

    #[test]
    fn test_parse_steps() {
        let steps = parse_script(
            r#"[
                {"action": "tool", "name": "ellipse"},
                {"action": "pointer", "event": {"type": "scroll", "position": {"x": 1, "y": 2}, "delta": {"x": 0, "y": -100}}},
                {"action": "key", "key": "Delete"},
                {"action": "strokeWidth", "width": 6},
                {"action": "resetView"},
                {"action": "undo"}
            ]"#,
        )
        .unwrap();

        assert_eq!(steps.len(), 6);
        assert_eq!(
            steps[0],
            ReplayStep::Tool {
                name: "ellipse".to_string()
            }
        );
        assert!(matches!(
            steps[1],
            ReplayStep::Pointer {
                event: PointerEvent::Scroll { .. }
            }
        ));
        assert_eq!(
            steps[2],
            ReplayStep::Key {
                key: "Delete".to_string(),
                modifiers: Modifiers::default()
            }
        );
        assert_eq!(steps[3], ReplayStep::StrokeWidth { width: 6 });
        assert_eq!(steps[4], ReplayStep::ResetView);
        assert_eq!(steps[5], ReplayStep::Undo);
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!(parse_script(r#"[{"action": "explode"}]"#).is_err());
    }

    #[test]
    fn test_freehand_stroke_script() {
        let steps = parse_script(
            r##"[
                {"action": "tool", "name": "draw"},
                {"action": "color", "hex": "#ff0000"},
                {"action": "pointer", "event": {"type": "down", "position": {"x": 10, "y": 10}}},
                {"action": "pointer", "event": {"type": "move", "position": {"x": 20, "y": 15}}},
                {"action": "pointer", "event": {"type": "move", "position": {"x": 30, "y": 30}}},
                {"action": "pointer", "event": {"type": "up", "position": {"x": 30, "y": 30}}}
            ]"##,
        )
        .unwrap();

        let mut session = Session::new().unwrap();
        for step in &steps {
            step.apply(&mut session);
        }

        assert_eq!(session.document().len(), 1);
        match &session.document().shapes()[0] {
            Shape::Freehand(stroke) => {
                assert_eq!(stroke.len(), 3);
                assert_eq!(stroke.style.stroke_color.to_hex(), "#ff0000");
            }
            other => panic!("expected a stroke, got {}", other.kind_name()),
        }
    }

    #[test]
    fn test_undo_keys() {
        let steps = parse_script(
            r#"[
                {"action": "insert", "kind": "rectangle"},
                {"action": "insert", "kind": "ellipse"},
                {"action": "key", "key": "z", "modifiers": {"ctrl": true}},
                {"action": "key", "key": "z", "modifiers": {"ctrl": true}},
                {"action": "key", "key": "y", "modifiers": {"ctrl": true}}
            ]"#,
        )
        .unwrap();

        let mut session = Session::new().unwrap();
        for step in &steps {
            step.apply(&mut session);
        }

        assert_eq!(session.document().len(), 1);
        assert_eq!(session.document().shapes()[0].kind_name(), "rectangle");
    }
}
