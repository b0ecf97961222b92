//! Whiteboard Core Library
//!
//! Platform-agnostic scene model, viewport, tool state machine, undo history
//! and document codec for the whiteboard drawing surface.

pub mod camera;
pub mod canvas;
pub mod config;
pub mod document;
pub mod history;
pub mod input;
pub mod session;
pub mod shapes;
pub mod shortcuts;
pub mod storage;
pub mod surface;
pub mod tools;

pub use camera::Camera;
pub use canvas::CanvasDocument;
pub use config::{ConfigError, WhiteboardConfig};
pub use document::DocumentError;
pub use history::{History, HistoryEntry, HistoryPosition};
pub use input::{KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use session::{Session, SessionError};
pub use shapes::{SerializableColor, Shape, ShapeId, ShapePatch, ShapeStyle};
pub use shortcuts::{Command, Shortcut, ShortcutRegistry};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use surface::{RenderSurface, SurfaceOp};
pub use tools::{ToolKind, ToolManager, ToolState};
