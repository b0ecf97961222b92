//! JSON document codec.
//!
//! ```json
//! { "backgroundColor": "#ffffff",
//!   "objects": [
//!     {"id": "…", "kind": "rectangle", "x": 0, "y": 0, "width": 10, "height": 10,
//!      "fillColor": "#ff0000", "strokeColor": "#000000", "strokeWidth": 2},
//!     {"id": "…", "kind": "ellipse", "cx": 5, "cy": 5, "rx": 2, "ry": 3, …},
//!     {"id": "…", "kind": "textbox", "x": 0, "y": 0, "width": 200, "text": "Hi", "fontSize": 20, …},
//!     {"id": "…", "kind": "path", "points": [[0, 0], [4, 2]], …}
//!   ] }
//! ```
//!
//! Decoding validates the whole document before building any shape, so a
//! failure never yields a partial scene.

use crate::canvas::CanvasDocument;
use crate::shapes::{
    Ellipse, Freehand, Rectangle, SerializableColor, Shape, ShapeId, ShapeStyle, Text,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Document codec errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed document: {0}")]
    Malformed(String),
    #[error("failed to encode document: {0}")]
    Encode(serde_json::Error),
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        DocumentError::Malformed(err.to_string())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentRecord {
    #[serde(default = "default_background")]
    background_color: String,
    objects: Vec<ObjectRecord>,
}

fn default_background() -> String {
    SerializableColor::white().to_hex()
}

fn default_font_size() -> f64 {
    Text::DEFAULT_FONT_SIZE
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StyleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fill_color: Option<String>,
    stroke_color: String,
    stroke_width: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind")]
enum ObjectRecord {
    #[serde(rename = "rectangle")]
    Rectangle {
        id: ShapeId,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(flatten)]
        style: StyleRecord,
    },
    #[serde(rename = "ellipse")]
    Ellipse {
        id: ShapeId,
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        #[serde(flatten)]
        style: StyleRecord,
    },
    #[serde(rename = "textbox")]
    Text {
        id: ShapeId,
        x: f64,
        y: f64,
        width: f64,
        text: String,
        #[serde(rename = "fontSize", default = "default_font_size")]
        font_size: f64,
        #[serde(flatten)]
        style: StyleRecord,
    },
    #[serde(rename = "path")]
    Path {
        id: ShapeId,
        points: Vec<[f64; 2]>,
        #[serde(flatten)]
        style: StyleRecord,
    },
}

impl ObjectRecord {
    fn id(&self) -> ShapeId {
        match self {
            ObjectRecord::Rectangle { id, .. }
            | ObjectRecord::Ellipse { id, .. }
            | ObjectRecord::Text { id, .. }
            | ObjectRecord::Path { id, .. } => *id,
        }
    }
}

impl From<&ShapeStyle> for StyleRecord {
    fn from(style: &ShapeStyle) -> Self {
        Self {
            fill_color: style.fill_color.map(|c| c.to_hex()),
            stroke_color: style.stroke_color.to_hex(),
            stroke_width: style.stroke_width,
        }
    }
}

impl From<&Shape> for ObjectRecord {
    fn from(shape: &Shape) -> Self {
        let style = StyleRecord::from(shape.style());
        match shape {
            Shape::Rectangle(r) => ObjectRecord::Rectangle {
                id: r.id,
                x: r.position.x,
                y: r.position.y,
                width: r.width,
                height: r.height,
                style,
            },
            Shape::Ellipse(e) => ObjectRecord::Ellipse {
                id: e.id,
                cx: e.center.x,
                cy: e.center.y,
                rx: e.radius_x,
                ry: e.radius_y,
                style,
            },
            Shape::Text(t) => ObjectRecord::Text {
                id: t.id,
                x: t.position.x,
                y: t.position.y,
                width: t.width,
                text: t.content.clone(),
                font_size: t.font_size,
                style,
            },
            Shape::Freehand(f) => ObjectRecord::Path {
                id: f.id,
                points: f.points.iter().map(|p| [p.x, p.y]).collect(),
                style,
            },
        }
    }
}

fn parse_color(value: &str, field: &str, id: ShapeId) -> Result<SerializableColor, DocumentError> {
    SerializableColor::from_hex(value)
        .ok_or_else(|| DocumentError::Malformed(format!("object {id}: invalid {field} {value:?}")))
}

fn check_extent(value: f64, field: &str, id: ShapeId) -> Result<f64, DocumentError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(DocumentError::Malformed(format!(
            "object {id}: {field} must be non-negative, got {value}"
        )))
    }
}

impl StyleRecord {
    fn into_style(self, id: ShapeId) -> Result<ShapeStyle, DocumentError> {
        let fill = self
            .fill_color
            .as_deref()
            .map(|c| parse_color(c, "fillColor", id))
            .transpose()?;
        let stroke = parse_color(&self.stroke_color, "strokeColor", id)?;
        let width = check_extent(self.stroke_width, "strokeWidth", id)?;
        Ok(ShapeStyle::new(stroke, width).with_fill(fill))
    }
}

impl ObjectRecord {
    fn into_shape(self) -> Result<Shape, DocumentError> {
        let shape = match self {
            ObjectRecord::Rectangle {
                id,
                x,
                y,
                width,
                height,
                style,
            } => Shape::Rectangle(Rectangle::reconstruct(
                id,
                Point::new(x, y),
                check_extent(width, "width", id)?,
                check_extent(height, "height", id)?,
                style.into_style(id)?,
            )),
            ObjectRecord::Ellipse {
                id,
                cx,
                cy,
                rx,
                ry,
                style,
            } => Shape::Ellipse(Ellipse::reconstruct(
                id,
                Point::new(cx, cy),
                check_extent(rx, "rx", id)?,
                check_extent(ry, "ry", id)?,
                style.into_style(id)?,
            )),
            ObjectRecord::Text {
                id,
                x,
                y,
                width,
                text,
                font_size,
                style,
            } => {
                if !(font_size.is_finite() && font_size > 0.0) {
                    return Err(DocumentError::Malformed(format!(
                        "object {id}: fontSize must be positive, got {font_size}"
                    )));
                }
                Shape::Text(Text::reconstruct(
                    id,
                    Point::new(x, y),
                    check_extent(width, "width", id)?,
                    text,
                    font_size,
                    style.into_style(id)?,
                ))
            }
            ObjectRecord::Path { id, points, style } => {
                if points.is_empty() {
                    return Err(DocumentError::Malformed(format!(
                        "object {id}: path has no points"
                    )));
                }
                let points = points.into_iter().map(|[x, y]| Point::new(x, y)).collect();
                Shape::Freehand(Freehand::reconstruct(id, points, style.into_style(id)?))
            }
        };

        if !shape.is_valid() {
            return Err(DocumentError::Malformed(format!(
                "object {}: non-finite geometry",
                shape.id()
            )));
        }
        Ok(shape)
    }
}

impl CanvasDocument {
    fn to_record(&self) -> DocumentRecord {
        DocumentRecord {
            background_color: self.background_color.to_hex(),
            objects: self.shapes().iter().map(ObjectRecord::from).collect(),
        }
    }

    /// Serialize the document to compact JSON.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string(&self.to_record()).map_err(DocumentError::Encode)
    }

    /// Serialize the document to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(&self.to_record()).map_err(DocumentError::Encode)
    }

    /// Deserialize and validate a document.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let record: DocumentRecord = serde_json::from_str(json)?;

        let background = SerializableColor::from_hex(&record.background_color).ok_or_else(|| {
            DocumentError::Malformed(format!(
                "invalid backgroundColor {:?}",
                record.background_color
            ))
        })?;

        let mut seen = HashSet::with_capacity(record.objects.len());
        let mut shapes = Vec::with_capacity(record.objects.len());
        for object in record.objects {
            let id = object.id();
            if !seen.insert(id) {
                return Err(DocumentError::Malformed(format!("duplicate object id {id}")));
            }
            shapes.push(object.into_shape()?);
        }

        Ok(Self::from_parts(background, shapes))
    }
}
