//! Whiteboard session: owns the scene, viewport, tools and history, and turns
//! pointer and keyboard input into scene changes.

use crate::camera::Camera;
use crate::canvas::CanvasDocument;
use crate::config::{ConfigError, WhiteboardConfig};
use crate::document::DocumentError;
use crate::history::{History, HistoryEntry, HistoryPosition};
use crate::input::{KeyEvent, MouseButton, PointerEvent};
use crate::shapes::{Ellipse, Freehand, Rectangle, SerializableColor, Shape, ShapeId, Text};
use crate::shortcuts::{Command, ShortcutRegistry};
use crate::storage::{Storage, StorageResult};
use crate::surface::{RenderSurface, SurfaceOp};
use crate::tools::{ToolKind, ToolManager, ToolState};
use kurbo::{Point, Vec2};
use thiserror::Error;

/// Errors creating a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// An editing session over one scene.
pub struct Session {
    config: WhiteboardConfig,
    document: CanvasDocument,
    camera: Camera,
    tools: ToolManager,
    history: History,
    selection: Option<ShapeId>,
    pending: Vec<SurfaceOp>,
}

impl Session {
    /// Create a session with the default configuration.
    pub fn new() -> Result<Self, SessionError> {
        Self::with_config(WhiteboardConfig::default())
    }

    /// Create a session with an empty scene. The initial scene is the first
    /// history entry.
    pub fn with_config(config: WhiteboardConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let document = CanvasDocument::with_background(config.background()?);
        Self::with_document(config, document)
    }

    /// Create a session around an existing scene.
    pub fn with_document(
        config: WhiteboardConfig,
        document: CanvasDocument,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let camera = Camera::with_zoom_range(config.min_zoom, config.max_zoom);
        let tools = ToolManager::new(
            config.color()?,
            config.default_stroke_width,
            config.max_stroke_width,
        );
        let history = History::new(&document, config.history_limit)?;
        let pending = vec![
            SurfaceOp::Reset(document.clone()),
            SurfaceOp::Viewport(camera.clone()),
        ];

        Ok(Self {
            config,
            document,
            camera,
            tools,
            history,
            selection: None,
            pending,
        })
    }

    pub fn config(&self) -> &WhiteboardConfig {
        &self.config
    }

    /// The current scene.
    pub fn document(&self) -> &CanvasDocument {
        &self.document
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    pub fn tool_state(&self) -> ToolState {
        self.tools.state
    }

    pub fn selection(&self) -> Option<ShapeId> {
        self.selection
    }

    pub fn color(&self) -> SerializableColor {
        self.tools.color()
    }

    pub fn stroke_width(&self) -> u32 {
        self.tools.stroke_width()
    }

    /// Surface operations queued since the last flush.
    pub fn pending_ops(&self) -> &[SurfaceOp] {
        &self.pending
    }

    // --- Tools and style ---

    /// Activate a tool. Insert tools immediately place one default shape at
    /// the insert origin.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.finish_interaction();
        self.tools.set_tool(tool);
        if tool.is_insert() {
            let origin = Point::new(self.config.insert_x, self.config.insert_y);
            self.insert_shape_at(tool, origin);
        }
    }

    /// Activate a tool by name. Unknown names select the select tool.
    pub fn set_tool_by_name(&mut self, name: &str) -> ToolKind {
        let tool = ToolKind::from_name(name);
        self.set_tool(tool);
        tool
    }

    /// Set the active color from a hex string. Invalid colors are rejected
    /// and leave the active color unchanged.
    pub fn set_color(&mut self, hex: &str) -> bool {
        match SerializableColor::from_hex(hex) {
            Some(color) => {
                self.tools.set_color(color);
                true
            }
            None => {
                log::warn!("Ignoring invalid color {hex:?}");
                false
            }
        }
    }

    /// Set the brush width, clamped to the configured range.
    pub fn set_stroke_width(&mut self, width: u32) {
        self.tools.set_stroke_width(width);
    }

    // --- Input ---

    /// Handle a pointer event in screen coordinates.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent) {
        if !event.is_finite() {
            log::warn!("Ignoring non-finite pointer event {event:?}");
            return;
        }

        match *event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
            } => self.pointer_down(position),
            PointerEvent::Up {
                button: MouseButton::Left,
                ..
            } => self.finish_interaction(),
            PointerEvent::Down { .. } | PointerEvent::Up { .. } => {}
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Scroll {
                position,
                delta,
                modifiers,
            } => {
                if self.tools.current_tool == ToolKind::Zoom || modifiers.command() {
                    self.zoom_at(position, self.config.wheel_zoom_base.powf(delta.y));
                }
            }
        }
    }

    /// Handle a key press. Returns the command it triggered, if any.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<Command> {
        let command = ShortcutRegistry::lookup(event)?;
        match command {
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::DeleteSelection => {
                self.delete_selected();
            }
            Command::Cancel => {
                self.cancel_interaction();
                self.set_selection(None);
            }
        }
        Some(command)
    }

    fn hit_tolerance(&self) -> f64 {
        self.config.hit_tolerance / self.camera.zoom
    }

    fn pointer_down(&mut self, screen: Point) {
        let world = self.camera.screen_to_world(screen);
        if !is_finite_point(world) {
            log::warn!("Ignoring pointer-down outside the finite world at {screen:?}");
            return;
        }
        match self.tools.current_tool {
            // Insert tools place their shape on activation; clicks select and drag
            ToolKind::Select | ToolKind::Rectangle | ToolKind::Ellipse | ToolKind::Text => {
                let hit = self.document.topmost_at(world, self.hit_tolerance());
                self.set_selection(hit);
                if let Some(shape) = hit {
                    self.tools.state = ToolState::Dragging {
                        shape,
                        last: world,
                        moved: false,
                    };
                }
            }
            ToolKind::Pan => {
                self.tools.state = ToolState::Panning { last: screen };
            }
            ToolKind::Draw | ToolKind::Eraser => {
                let style = self.tools.brush_style(self.document.background_color);
                let stroke = Freehand::from_points(vec![world]).with_style(style);
                if let Some(shape) = self.add_shape(Shape::Freehand(stroke)) {
                    self.tools.state = ToolState::Drawing { shape };
                }
            }
            ToolKind::Zoom => {}
        }
    }

    fn pointer_move(&mut self, screen: Point) {
        if let ToolState::Panning { last } = self.tools.state {
            self.pan(screen - last);
            self.tools.state = ToolState::Panning { last: screen };
            return;
        }

        let world = self.camera.screen_to_world(screen);
        if !is_finite_point(world) {
            log::warn!("Ignoring pointer move outside the finite world at {screen:?}");
            return;
        }
        match self.tools.state {
            ToolState::Idle | ToolState::Panning { .. } => {}
            ToolState::Dragging { shape, last, moved } => {
                let delta = world - last;
                if delta == Vec2::ZERO {
                    return;
                }
                if let Some(target) = self.document.get_shape_mut(shape) {
                    let mut translated = target.clone();
                    translated.translate(delta);
                    if !translated.is_valid() {
                        log::warn!("Dropping move of {shape} to non-finite geometry");
                        return;
                    }
                    *target = translated.clone();
                    self.pending.push(SurfaceOp::Update(translated));
                    self.tools.state = ToolState::Dragging {
                        shape,
                        last: world,
                        moved: true,
                    };
                } else {
                    self.tools.state = ToolState::Dragging {
                        shape,
                        last: world,
                        moved,
                    };
                }
            }
            ToolState::Drawing { shape } => {
                if let Some(stroke) = self
                    .document
                    .get_shape_mut(shape)
                    .and_then(Shape::as_freehand_mut)
                {
                    if stroke.add_point(world) {
                        let updated = Shape::Freehand(stroke.clone());
                        self.pending.push(SurfaceOp::Update(updated));
                    }
                }
            }
        }
    }

    /// Complete the interaction in progress as if the pointer was released.
    fn finish_interaction(&mut self) {
        let state = std::mem::take(&mut self.tools.state);
        match state {
            ToolState::Idle | ToolState::Panning { .. } => {}
            ToolState::Dragging { moved, .. } => {
                if moved {
                    self.commit();
                }
            }
            ToolState::Drawing { shape } => {
                let single_point = matches!(
                    self.document.get_shape(shape),
                    Some(Shape::Freehand(stroke)) if stroke.len() == 1
                );
                if single_point && self.config.discard_single_point_strokes {
                    log::debug!("Discarding single-point stroke {shape}");
                    if self.document.remove_shape(shape).is_some() {
                        self.pending.push(SurfaceOp::Remove(shape));
                    }
                } else if self.document.get_shape(shape).is_some() {
                    self.commit();
                }
            }
        }
    }

    /// Abandon the interaction in progress, reverting uncommitted changes.
    fn cancel_interaction(&mut self) {
        let state = std::mem::take(&mut self.tools.state);
        match state {
            ToolState::Dragging { moved: true, .. } => {
                match self.history.current().map(HistoryEntry::restore) {
                    Some(Ok(document)) => self.apply_restored(document),
                    Some(Err(err)) => log::error!("Failed to revert drag: {err}"),
                    None => {}
                }
            }
            ToolState::Drawing { shape } => {
                if self.document.remove_shape(shape).is_some() {
                    self.pending.push(SurfaceOp::Remove(shape));
                }
            }
            _ => {}
        }
    }

    // --- Scene edits ---

    fn add_shape(&mut self, shape: Shape) -> Option<ShapeId> {
        let id = self.document.add_shape(shape)?;
        if let Some(added) = self.document.get_shape(id) {
            self.pending.push(SurfaceOp::Add(added.clone()));
        }
        Some(id)
    }

    fn set_selection(&mut self, selection: Option<ShapeId>) {
        if self.selection != selection {
            self.selection = selection;
            self.pending.push(SurfaceOp::Selection(selection));
        }
    }

    /// Insert a default shape of an insert tool's kind at the insert origin.
    pub fn insert_shape(&mut self, kind: ToolKind) -> Option<ShapeId> {
        let origin = Point::new(self.config.insert_x, self.config.insert_y);
        self.insert_shape_at(kind, origin)
    }

    /// Insert a default shape whose top-left corner is at `origin` (world
    /// coordinates). The new shape is selected and recorded in history.
    pub fn insert_shape_at(&mut self, kind: ToolKind, origin: Point) -> Option<ShapeId> {
        let style = self.tools.insert_style();
        let shape = match kind {
            ToolKind::Rectangle => Shape::Rectangle(
                Rectangle::new(origin, self.config.rectangle_width, self.config.rectangle_height)
                    .with_style(style),
            ),
            ToolKind::Ellipse => {
                let radius = self.config.ellipse_radius;
                let center = origin + Vec2::new(radius, radius);
                Shape::Ellipse(Ellipse::circle(center, radius).with_style(style))
            }
            ToolKind::Text => Shape::Text(
                Text::new(origin, self.config.text_width, self.config.placeholder_text.clone())
                    .with_font_size(self.config.font_size)
                    .with_style(style),
            ),
            other => {
                log::warn!("Tool {} does not insert shapes", other.name());
                return None;
            }
        };

        let id = self.add_shape(shape)?;
        log::debug!("Inserted {} {id}", kind.name());
        self.set_selection(Some(id));
        self.commit();
        Some(id)
    }

    /// Delete the selected shape. Returns false when nothing was selected.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selection else {
            return false;
        };
        self.tools.cancel();
        self.set_selection(None);
        if self.document.remove_shape(id).is_none() {
            return false;
        }
        self.pending.push(SurfaceOp::Remove(id));
        self.commit();
        true
    }

    /// Remove every shape and restore the configured background.
    pub fn clear(&mut self) {
        self.tools.cancel();
        self.document.clear();
        if let Ok(background) = self.config.background() {
            self.document.background_color = background;
        }
        self.selection = None;
        self.pending.push(SurfaceOp::Reset(self.document.clone()));
        self.pending.push(SurfaceOp::Selection(None));
        self.commit();
    }

    // --- History ---

    fn commit(&mut self) {
        if let Err(err) = self.history.snapshot(&self.document) {
            log::error!("Failed to record history snapshot: {err}");
        }
    }

    fn apply_restored(&mut self, document: CanvasDocument) {
        self.document = document;
        self.tools.cancel();
        self.selection = None;
        self.pending.push(SurfaceOp::Reset(self.document.clone()));
        self.pending.push(SurfaceOp::Selection(None));
    }

    /// Step back one snapshot. Returns false at the oldest entry, or when the
    /// snapshot cannot be decoded; the scene and cursor are then unchanged.
    pub fn undo(&mut self) -> bool {
        let restored = self.history.undo();
        self.restore_step(restored)
    }

    /// Step forward one snapshot. Returns false at the newest entry, or when
    /// the snapshot cannot be decoded.
    pub fn redo(&mut self) -> bool {
        let restored = self.history.redo();
        self.restore_step(restored)
    }

    fn restore_step(&mut self, restored: Result<Option<CanvasDocument>, DocumentError>) -> bool {
        match restored {
            Ok(Some(document)) => {
                self.apply_restored(document);
                true
            }
            Ok(None) => false,
            Err(err) => {
                log::error!("Failed to restore history entry: {err}");
                false
            }
        }
    }

    pub fn history_position(&self) -> HistoryPosition {
        self.history.position()
    }

    // --- Viewport ---

    /// Pan the viewport by a screen-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        let before = self.camera.offset;
        self.camera.pan(delta);
        if self.camera.offset != before {
            self.pending.push(SurfaceOp::Viewport(self.camera.clone()));
        }
    }

    /// Zoom by `factor` keeping the screen point `anchor` fixed.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        let before = self.camera.clone();
        self.camera.zoom_at(anchor, factor);
        if self.camera != before {
            self.pending.push(SurfaceOp::Viewport(self.camera.clone()));
        }
    }

    /// Return to the identity viewport.
    pub fn reset_view(&mut self) {
        self.camera.reset();
        self.pending.push(SurfaceOp::Viewport(self.camera.clone()));
    }

    // --- Documents ---

    /// Serialize the scene.
    pub fn save_document(&self) -> Result<String, DocumentError> {
        self.document.to_json()
    }

    /// Replace the scene with a serialized document.
    ///
    /// On failure nothing changes. On success the new scene is recorded in
    /// history; the viewport is left as is.
    pub fn load_document(&mut self, json: &str) -> Result<(), DocumentError> {
        let document = CanvasDocument::from_json(json)?;
        self.replace_document(document);
        Ok(())
    }

    fn replace_document(&mut self, document: CanvasDocument) {
        log::debug!("Loaded document with {} shapes", document.len());
        self.apply_restored(document);
        self.commit();
    }

    /// Save the scene to a storage backend.
    pub async fn save_to(&self, storage: &dyn Storage, id: &str) -> StorageResult<()> {
        storage.save(id, &self.document).await
    }

    /// Load a scene from a storage backend. The scene is replaced only once
    /// the document has been fully read and validated.
    pub async fn load_from(&mut self, storage: &dyn Storage, id: &str) -> StorageResult<()> {
        let document = storage.load(id).await?;
        self.replace_document(document);
        Ok(())
    }

    /// Replay queued scene and viewport changes onto a surface.
    pub fn flush(&mut self, surface: &mut dyn RenderSurface) {
        for op in self.pending.drain(..) {
            op.apply(surface);
        }
    }
}

fn is_finite_point(point: Point) -> bool {
    point.x.is_finite() && point.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::storage::{MemoryStorage, StorageError};
    use crate::surface::tests::MirrorSurface;
    use pollster::block_on;

    fn session() -> Session {
        Session::new().unwrap()
    }

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    fn moved(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move {
            position: Point::new(x, y),
        }
    }

    fn up(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    fn kinds(session: &Session) -> Vec<&'static str> {
        session.document().shapes().iter().map(Shape::kind_name).collect()
    }

    #[test]
    fn test_new_session_is_seeded() {
        let session = session();
        assert!(session.document().is_empty());
        let position = session.history_position();
        assert_eq!((position.index, position.len), (0, 1));
        assert!(!position.can_undo && !position.can_redo);
    }

    #[test]
    fn test_select_hit_test() {
        let mut session = session();
        let mut doc = CanvasDocument::new();
        let id = doc
            .add_shape(Shape::Rectangle(Rectangle::new(Point::new(10.0, 10.0), 50.0, 50.0)))
            .unwrap();
        session.load_document(&doc.to_json().unwrap()).unwrap();

        session.handle_pointer_event(&down(30.0, 30.0));
        session.handle_pointer_event(&up(30.0, 30.0));
        assert_eq!(session.selection(), Some(id));

        session.handle_pointer_event(&down(200.0, 200.0));
        session.handle_pointer_event(&up(200.0, 200.0));
        assert_eq!(session.selection(), None);
    }

    #[test]
    fn test_insert_undo_redo_scenario() {
        let mut session = session();
        session.set_tool(ToolKind::Rectangle);
        session.set_tool(ToolKind::Ellipse);
        assert_eq!(kinds(&session), vec!["rectangle", "ellipse"]);
        let ids: Vec<ShapeId> = session.document().shapes().iter().map(Shape::id).collect();

        assert!(session.undo());
        assert_eq!(kinds(&session), vec!["rectangle"]);
        assert_eq!(session.selection(), None);

        assert!(session.redo());
        let after: Vec<ShapeId> = session.document().shapes().iter().map(Shape::id).collect();
        assert_eq!(after, ids);
    }

    #[test]
    fn test_insert_defaults_and_style() {
        let mut session = session();
        assert!(session.set_color("#ff0000"));
        session.set_tool(ToolKind::Ellipse);

        let Some(Shape::Ellipse(ellipse)) = session.document().shapes().first() else {
            panic!("expected an ellipse");
        };
        assert_eq!(ellipse.center, Point::new(150.0, 150.0));
        assert!((ellipse.radius_x - 50.0).abs() < f64::EPSILON);
        let red = SerializableColor::new(255, 0, 0, 255);
        assert_eq!(ellipse.style.fill_color, Some(red));
        assert_eq!(session.selection(), Some(ellipse.id));

        // The tool stays active and a press selects instead of inserting
        session.handle_pointer_event(&down(300.0, 40.0));
        session.handle_pointer_event(&up(300.0, 40.0));
        assert_eq!(session.tool(), ToolKind::Ellipse);
        assert_eq!(session.document().len(), 1);
        assert_eq!(session.selection(), None);
        assert_eq!(session.history_position().len, 2);
    }

    #[test]
    fn test_insert_tool_drags_inserted_shape() {
        let mut session = session();
        session.set_tool(ToolKind::Rectangle);
        let id = session.document().shapes()[0].id();

        session.handle_pointer_event(&down(150.0, 150.0));
        session.handle_pointer_event(&moved(180.0, 160.0));
        session.handle_pointer_event(&up(180.0, 160.0));

        assert_eq!(session.document().len(), 1);
        assert_eq!(session.selection(), Some(id));
        assert_eq!(session.document().shapes()[0].bounds().origin(), Point::new(130.0, 110.0));
        assert_eq!(session.history_position().len, 3);
    }

    #[test]
    fn test_text_insert() {
        let mut session = session();
        session.set_tool_by_name("insertText");
        let Some(Shape::Text(text)) = session.document().shapes().first() else {
            panic!("expected text");
        };
        assert_eq!(text.content, "Texte");
        assert_eq!(text.position, Point::new(100.0, 100.0));
        assert!((text.font_size - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_freehand_stroke_roundtrip() {
        let mut session = session();
        session.set_tool(ToolKind::Draw);
        session.handle_pointer_event(&down(0.0, 0.0));
        session.handle_pointer_event(&moved(10.0, 5.0));
        session.handle_pointer_event(&moved(20.0, 0.0));
        session.handle_pointer_event(&up(20.0, 0.0));

        let json = session.save_document().unwrap();
        let doc = CanvasDocument::from_json(&json).unwrap();
        let Some(Shape::Freehand(path)) = doc.shapes().first() else {
            panic!("expected a path");
        };
        assert_eq!(
            path.points,
            vec![Point::new(0.0, 0.0), Point::new(10.0, 5.0), Point::new(20.0, 0.0)]
        );
        assert_eq!(session.history_position().len, 2);
    }

    #[test]
    fn test_stroke_keeps_style_from_start() {
        let mut session = session();
        session.set_tool(ToolKind::Draw);
        session.set_stroke_width(8);
        session.handle_pointer_event(&down(0.0, 0.0));
        session.set_color("#00ff00");
        session.handle_pointer_event(&moved(5.0, 5.0));
        session.handle_pointer_event(&up(5.0, 5.0));

        let style = session.document().shapes()[0].style();
        assert_eq!(style.stroke_color, SerializableColor::black());
        assert!((style.stroke_width - 8.0).abs() < f64::EPSILON);
        assert_eq!(style.fill_color, None);
    }

    #[test]
    fn test_eraser_paints_background() {
        let config = WhiteboardConfig {
            background_color: "#fafafa".to_string(),
            ..WhiteboardConfig::default()
        };
        let mut session = Session::with_config(config).unwrap();
        session.set_tool(ToolKind::Eraser);
        session.handle_pointer_event(&down(1.0, 1.0));
        session.handle_pointer_event(&up(1.0, 1.0));

        let style = session.document().shapes()[0].style();
        assert_eq!(style.stroke_color, SerializableColor::new(250, 250, 250, 255));
    }

    #[test]
    fn test_single_point_stroke_policy() {
        let mut session = session();
        session.set_tool(ToolKind::Draw);
        session.handle_pointer_event(&down(5.0, 5.0));
        session.handle_pointer_event(&up(5.0, 5.0));
        assert_eq!(session.document().len(), 1);

        let config = WhiteboardConfig {
            discard_single_point_strokes: true,
            ..WhiteboardConfig::default()
        };
        let mut session = Session::with_config(config).unwrap();
        session.set_tool(ToolKind::Draw);
        session.handle_pointer_event(&down(5.0, 5.0));
        session.handle_pointer_event(&up(5.0, 5.0));
        assert!(session.document().is_empty());
        assert_eq!(session.history_position().len, 1);
    }

    #[test]
    fn test_drag_moves_selection_and_snapshots_once() {
        let mut session = session();
        session.set_tool(ToolKind::Rectangle);
        session.set_tool(ToolKind::Select);
        let before = session.history_position().len;

        session.handle_pointer_event(&down(150.0, 150.0));
        session.handle_pointer_event(&moved(160.0, 150.0));
        session.handle_pointer_event(&moved(170.0, 170.0));
        session.handle_pointer_event(&up(170.0, 170.0));

        let bounds = session.document().shapes()[0].bounds();
        assert_eq!(bounds.origin(), Point::new(120.0, 120.0));
        assert_eq!(session.history_position().len, before + 1);

        // A click without movement records nothing
        session.handle_pointer_event(&down(150.0, 150.0));
        session.handle_pointer_event(&up(150.0, 150.0));
        assert_eq!(session.history_position().len, before + 1);
    }

    #[test]
    fn test_drag_respects_zoom() {
        let mut session = session();
        session.set_tool(ToolKind::Rectangle);
        session.set_tool(ToolKind::Select);
        session.zoom_at(Point::ZERO, 2.0);

        // Rectangle (100,100)-(200,200) is at (200,200)-(400,400) on screen
        session.handle_pointer_event(&down(300.0, 300.0));
        session.handle_pointer_event(&moved(320.0, 300.0));
        session.handle_pointer_event(&up(320.0, 300.0));

        let origin = session.document().shapes()[0].bounds().origin();
        assert!((origin.x - 110.0).abs() < 1e-9);
        assert!((origin.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_pan_follows_pointer_without_history() {
        let mut session = session();
        session.set_tool(ToolKind::Pan);
        session.handle_pointer_event(&down(0.0, 0.0));
        session.handle_pointer_event(&moved(10.0, 0.0));
        session.handle_pointer_event(&moved(25.0, 5.0));
        session.handle_pointer_event(&up(25.0, 5.0));
        session.handle_pointer_event(&moved(100.0, 100.0));

        assert_eq!(session.camera().offset, Vec2::new(25.0, 5.0));
        assert_eq!(session.history_position().len, 1);
    }

    #[test]
    fn test_wheel_zoom() {
        let mut session = session();
        let scroll = |ctrl: bool| PointerEvent::Scroll {
            position: Point::new(400.0, 300.0),
            delta: Vec2::new(0.0, -100.0),
            modifiers: if ctrl { Modifiers::CTRL } else { Modifiers::default() },
        };

        session.handle_pointer_event(&scroll(false));
        assert!((session.camera().zoom - 1.0).abs() < f64::EPSILON);

        session.handle_pointer_event(&scroll(true));
        let expected = 0.999_f64.powf(-100.0);
        assert!((session.camera().zoom - expected).abs() < 1e-12);

        session.set_tool(ToolKind::Zoom);
        for _ in 0..100 {
            session.handle_pointer_event(&scroll(false));
        }
        assert!((session.camera().zoom - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_keyboard_shortcuts() {
        let mut session = session();
        session.set_tool(ToolKind::Rectangle);
        assert_eq!(session.document().len(), 1);

        let undo = KeyEvent::with_modifiers("z", Modifiers::CTRL);
        assert_eq!(session.handle_key(&undo), Some(Command::Undo));
        assert!(session.document().is_empty());

        let redo = KeyEvent::with_modifiers("y", Modifiers::CTRL);
        assert_eq!(session.handle_key(&redo), Some(Command::Redo));
        assert_eq!(session.document().len(), 1);

        // Selection is cleared on restore; select again and delete
        session.set_tool(ToolKind::Select);
        session.handle_pointer_event(&down(150.0, 150.0));
        session.handle_pointer_event(&up(150.0, 150.0));
        assert_eq!(session.handle_key(&KeyEvent::new("Delete")), Some(Command::DeleteSelection));
        assert!(session.document().is_empty());

        assert_eq!(session.handle_key(&KeyEvent::new("q")), None);
    }

    #[test]
    fn test_escape_cancels_drag() {
        let mut session = session();
        session.set_tool(ToolKind::Rectangle);
        session.set_tool(ToolKind::Select);
        let original = session.document().shapes()[0].bounds();

        session.handle_pointer_event(&down(150.0, 150.0));
        session.handle_pointer_event(&moved(190.0, 190.0));
        session.handle_key(&KeyEvent::new("Escape"));
        session.handle_pointer_event(&up(190.0, 190.0));

        assert_eq!(session.document().shapes()[0].bounds(), original);
        assert_eq!(session.selection(), None);
        assert_eq!(session.history_position().len, 2);
    }

    #[test]
    fn test_undo_redo_inverse() {
        let mut session = session();
        session.set_tool(ToolKind::Rectangle);
        let start = session.document().clone();
        let start_len = session.history_position().len;

        session.set_tool(ToolKind::Text);
        session.set_tool(ToolKind::Draw);
        session.handle_pointer_event(&down(1.0, 1.0));
        session.handle_pointer_event(&moved(2.0, 2.0));
        session.handle_pointer_event(&up(2.0, 2.0));
        session.clear();
        let end = session.document().clone();

        let steps = session.history_position().len - start_len;
        for _ in 0..steps {
            assert!(session.undo());
        }
        assert_eq!(session.document(), &start);
        for _ in 0..steps {
            assert!(session.redo());
        }
        assert_eq!(session.document(), &end);
        assert!(!session.redo());
    }

    #[test]
    fn test_undecodable_snapshot_leaves_scene_and_cursor() {
        let mut session = session();
        session.set_tool(ToolKind::Rectangle);
        session.set_tool(ToolKind::Ellipse);
        session.history.overwrite_entry(1, crate::history::UNDECODABLE);
        let before = session.document().clone();
        let position = session.history_position();

        assert!(!session.undo());
        assert_eq!(session.document(), &before);
        assert_eq!(session.history_position(), position);
        assert!(!session.redo());

        // Later edits still record on top of the intact cursor
        session.set_tool(ToolKind::Text);
        assert_eq!(session.history_position().index, 3);
    }

    #[test]
    fn test_history_cap() {
        let config = WhiteboardConfig {
            history_limit: 5,
            ..WhiteboardConfig::default()
        };
        let mut session = Session::with_config(config).unwrap();
        session.set_tool(ToolKind::Select);
        for i in 0..8 {
            session.insert_shape_at(ToolKind::Rectangle, Point::new(i as f64 * 10.0, 0.0));
        }
        assert_eq!(session.history_position().len, 5);

        let mut counts = Vec::new();
        while session.undo() {
            counts.push(session.document().len());
        }
        assert_eq!(counts, vec![7, 6, 5, 4]);
    }

    #[test]
    fn test_load_unknown_kind_keeps_scene() {
        let mut session = session();
        session.set_tool(ToolKind::Rectangle);
        let before = session.document().clone();
        let position = session.history_position();

        let json = r##"{"backgroundColor": "#ffffff", "objects": [
            {"id": "67e55044-10b1-426f-9247-bb680e5fe0c8", "kind": "hexagon",
             "strokeColor": "#000000", "strokeWidth": 1}]}"##;
        assert!(matches!(session.load_document(json), Err(DocumentError::Malformed(_))));
        assert_eq!(session.document(), &before);
        assert_eq!(session.history_position(), position);
        assert!(session.selection().is_some());
    }

    #[test]
    fn test_load_snapshots_and_keeps_viewport() {
        let mut session = session();
        session.pan(Vec2::new(12.0, 3.0));
        let mut doc = CanvasDocument::new();
        doc.add_shape(Shape::Ellipse(Ellipse::new(Point::new(1.0, 1.0), 2.0, 2.0)));

        session.load_document(&doc.to_json().unwrap()).unwrap();
        assert_eq!(session.document(), &doc);
        assert_eq!(session.camera().offset, Vec2::new(12.0, 3.0));
        assert_eq!(session.history_position().len, 2);
    }

    #[test]
    fn test_clear_resets_background_and_snapshots() {
        let mut session = session();
        session.set_tool(ToolKind::Rectangle);
        session.clear();
        assert!(session.document().is_empty());
        assert_eq!(session.document().background_color, SerializableColor::white());
        assert_eq!(session.history_position().len, 3);
    }

    #[test]
    fn test_invalid_inputs_are_ignored() {
        let mut session = session();
        assert!(!session.set_color("red"));
        assert_eq!(session.color(), SerializableColor::black());

        session.set_tool(ToolKind::Draw);
        session.handle_pointer_event(&down(f64::NAN, 0.0));
        assert!(session.document().is_empty());
        assert_eq!(session.set_tool_by_name("spray"), ToolKind::Select);
        assert!(!session.delete_selected());
        assert!(!session.undo());
    }

    #[test]
    fn test_far_pointer_keeps_geometry_finite() {
        let mut session = session();
        session.zoom_at(Point::ZERO, 0.5);

        // Screen x 1.5e308 maps past f64::MAX in world space
        session.set_tool(ToolKind::Draw);
        session.handle_pointer_event(&down(0.0, 0.0));
        session.handle_pointer_event(&moved(1.5e308, 0.0));
        session.handle_pointer_event(&moved(10.0, 0.0));
        session.handle_pointer_event(&up(10.0, 0.0));
        let Some(Shape::Freehand(stroke)) = session.document().shapes().first() else {
            panic!("expected a stroke");
        };
        assert_eq!(stroke.len(), 2);

        // The drag survives a finite step but drops one that overflows
        session.set_tool(ToolKind::Rectangle);
        session.handle_pointer_event(&down(75.0, 75.0));
        session.handle_pointer_event(&moved(8e307, 75.0));
        session.handle_pointer_event(&moved(-8e307, 75.0));
        session.handle_pointer_event(&up(-8e307, 75.0));

        assert!(session.document().shapes().iter().all(Shape::is_valid));
        let json = session.save_document().unwrap();
        let reloaded = CanvasDocument::from_json(&json).unwrap();
        assert_eq!(&reloaded, session.document());
        assert!(session.undo());
    }

    #[test]
    fn test_flush_mirrors_scene() {
        let mut session = session();
        let mut surface = MirrorSurface::default();

        session.set_tool(ToolKind::Rectangle);
        session.set_tool(ToolKind::Draw);
        session.handle_pointer_event(&down(0.0, 0.0));
        session.handle_pointer_event(&moved(4.0, 4.0));
        session.handle_pointer_event(&up(4.0, 4.0));
        session.zoom_at(Point::new(10.0, 10.0), 1.5);
        session.flush(&mut surface);

        assert_eq!(&surface.document, session.document());
        assert_eq!(&surface.camera, session.camera());
        assert!(session.pending_ops().is_empty());

        session.undo();
        session.flush(&mut surface);
        assert_eq!(&surface.document, session.document());
        assert_eq!(surface.selection, None);
    }

    #[test]
    fn test_storage_roundtrip() {
        let storage = MemoryStorage::new();
        let mut session = session();
        session.set_tool(ToolKind::Text);
        block_on(session.save_to(&storage, "board")).unwrap();

        let mut other = Session::new().unwrap();
        block_on(other.load_from(&storage, "board")).unwrap();
        assert_eq!(other.document(), session.document());

        let missing = block_on(other.load_from(&storage, "missing"));
        assert!(matches!(missing, Err(StorageError::NotFound(_))));
        assert_eq!(other.document(), session.document());
    }
}
