//! Linear undo/redo history of whole-scene snapshots.

use crate::canvas::CanvasDocument;
use crate::document::DocumentError;

/// Default number of snapshots kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// An immutable serialized scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    json: String,
}

impl HistoryEntry {
    /// Serialize a scene into an entry.
    pub fn capture(document: &CanvasDocument) -> Result<Self, DocumentError> {
        Ok(Self {
            json: document.to_json()?,
        })
    }

    /// The serialized scene.
    pub fn as_json(&self) -> &str {
        &self.json
    }

    /// Decode the scene stored in this entry.
    pub fn restore(&self) -> Result<CanvasDocument, DocumentError> {
        CanvasDocument::from_json(&self.json)
    }
}

/// Where the cursor sits, for enabling undo/redo controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryPosition {
    pub index: usize,
    pub len: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Snapshot log with a cursor.
///
/// Never empty; the cursor always points at a valid entry and the log never
/// holds more than `limit` entries.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    limit: usize,
}

impl History {
    /// Create a history seeded with the initial scene.
    pub fn new(initial: &CanvasDocument, limit: usize) -> Result<Self, DocumentError> {
        Ok(Self {
            entries: vec![HistoryEntry::capture(initial)?],
            cursor: 0,
            limit: limit.max(1),
        })
    }

    /// Record the current scene.
    ///
    /// Discards every entry after the cursor, appends, then drops the oldest
    /// entries while over the limit.
    pub fn snapshot(&mut self, document: &CanvasDocument) -> Result<(), DocumentError> {
        let entry = HistoryEntry::capture(document)?;
        self.entries.truncate(self.cursor + 1);
        self.entries.push(entry);
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
        self.cursor = self.entries.len() - 1;
        log::debug!("History snapshot {}/{}", self.cursor + 1, self.entries.len());
        Ok(())
    }

    /// Step back and decode the scene to restore. Returns `Ok(None)` at the
    /// oldest entry. The cursor stays put when the entry fails to decode.
    pub fn undo(&mut self) -> Result<Option<CanvasDocument>, DocumentError> {
        if self.cursor == 0 {
            return Ok(None);
        }
        self.step_to(self.cursor - 1).map(Some)
    }

    /// Step forward and decode the scene to restore. Returns `Ok(None)` at the
    /// newest entry. The cursor stays put when the entry fails to decode.
    pub fn redo(&mut self) -> Result<Option<CanvasDocument>, DocumentError> {
        if !self.can_redo() {
            return Ok(None);
        }
        self.step_to(self.cursor + 1).map(Some)
    }

    fn step_to(&mut self, index: usize) -> Result<CanvasDocument, DocumentError> {
        let document = self.entries[index].restore()?;
        self.cursor = index;
        Ok(document)
    }

    /// Entry under the cursor.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn position(&self) -> HistoryPosition {
        HistoryPosition {
            index: self.cursor,
            len: self.entries.len(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }
}

#[cfg(test)]
pub(crate) const UNDECODABLE: &str =
    r#"{"objects": [{"kind": "path", "points": [[0.0, 0.0], [null, 0.0]]}]}"#;

#[cfg(test)]
impl History {
    /// Overwrite a stored snapshot with raw JSON.
    pub(crate) fn overwrite_entry(&mut self, index: usize, json: &str) {
        self.entries[index] = HistoryEntry {
            json: json.to_string(),
        };
    }
}
