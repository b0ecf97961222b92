//! Tool system for the whiteboard.

use crate::shapes::{SerializableColor, ShapeId, ShapeStyle};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Draw,
    Rectangle,
    Ellipse,
    Text,
    Eraser,
    Zoom,
}

impl ToolKind {
    /// All tools, in toolbar order.
    pub const ALL: [ToolKind; 8] = [
        ToolKind::Select,
        ToolKind::Pan,
        ToolKind::Draw,
        ToolKind::Rectangle,
        ToolKind::Ellipse,
        ToolKind::Text,
        ToolKind::Eraser,
        ToolKind::Zoom,
    ];

    /// Map a tool name to a tool.
    ///
    /// Case-insensitive and total: unknown names select [`ToolKind::Select`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "select" => ToolKind::Select,
            "pan" => ToolKind::Pan,
            "draw" | "pen" | "freehand" => ToolKind::Draw,
            "rectangle" | "insertrectangle" => ToolKind::Rectangle,
            "ellipse" | "circle" | "insertellipse" => ToolKind::Ellipse,
            "text" | "inserttext" => ToolKind::Text,
            "eraser" => ToolKind::Eraser,
            "zoom" => ToolKind::Zoom,
            other => {
                log::warn!("Unknown tool {other:?}, falling back to select");
                ToolKind::Select
            }
        }
    }

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Pan => "pan",
            ToolKind::Draw => "draw",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Ellipse => "ellipse",
            ToolKind::Text => "text",
            ToolKind::Eraser => "eraser",
            ToolKind::Zoom => "zoom",
        }
    }

    /// Tools that insert a default shape on activation.
    pub fn is_insert(self) -> bool {
        matches!(self, ToolKind::Rectangle | ToolKind::Ellipse | ToolKind::Text)
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ToolState {
    /// Tool is idle, waiting for interaction.
    #[default]
    Idle,
    /// A selected shape follows the pointer.
    Dragging {
        shape: ShapeId,
        /// World position of the previous pointer event.
        last: Point,
        moved: bool,
    },
    /// The viewport follows the pointer.
    Panning {
        /// Screen position of the previous pointer event.
        last: Point,
    },
    /// A freehand stroke is receiving points.
    Drawing { shape: ShapeId },
}

/// Manages the current tool, its interaction state and the active style.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: ToolState,
    color: SerializableColor,
    stroke_width: u32,
    max_stroke_width: u32,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new(SerializableColor::black(), 2, 20)
    }
}

impl ToolManager {
    /// Create a new tool manager with the given active style.
    pub fn new(color: SerializableColor, stroke_width: u32, max_stroke_width: u32) -> Self {
        let max_stroke_width = max_stroke_width.max(1);
        Self {
            current_tool: ToolKind::default(),
            state: ToolState::default(),
            color,
            stroke_width: stroke_width.clamp(1, max_stroke_width),
            max_stroke_width,
        }
    }

    /// Set the current tool. Any interaction in progress is dropped.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool != self.current_tool {
            log::debug!("Tool {} -> {}", self.current_tool.name(), tool.name());
        }
        self.current_tool = tool;
        self.state = ToolState::Idle;
    }

    /// Active color.
    pub fn color(&self) -> SerializableColor {
        self.color
    }

    /// Set the active color. Existing shapes keep their colors.
    pub fn set_color(&mut self, color: SerializableColor) {
        self.color = color;
    }

    /// Active brush width.
    pub fn stroke_width(&self) -> u32 {
        self.stroke_width
    }

    /// Set the brush width, clamped to `1..=max_stroke_width`.
    pub fn set_stroke_width(&mut self, width: u32) {
        self.stroke_width = width.clamp(1, self.max_stroke_width);
    }

    pub fn max_stroke_width(&self) -> u32 {
        self.max_stroke_width
    }

    /// Style for a new freehand stroke. `background` is used by the eraser.
    pub fn brush_style(&self, background: SerializableColor) -> ShapeStyle {
        let color = if self.current_tool == ToolKind::Eraser {
            background
        } else {
            self.color
        };
        ShapeStyle::new(color, f64::from(self.stroke_width))
    }

    /// Style for an inserted rectangle, ellipse or text box.
    pub fn insert_style(&self) -> ShapeStyle {
        ShapeStyle::new(self.color, f64::from(self.stroke_width)).with_fill(Some(self.color))
    }

    /// Drop any interaction in progress.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
    }
}
