//! JSON documents with source positions.
//!
//! Parsing and validation are delegated to `serde_json` (with key order
//! preserved). A second pass over the already-validated text records the
//! byte offset of every value, keyed by JSON pointer, so that each node can
//! report the line and column it came from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::util::diagnostic::SourceLocation;

/// A parsed JSON document that knows where each of its values starts.
#[derive(Debug)]
pub struct JsonDocument {
    path: PathBuf,
    text: String,
    root: Value,
    offsets: HashMap<String, usize>,
    line_starts: Vec<usize>,
}

impl JsonDocument {
    /// Parse a document. A leading byte-order mark is ignored.
    pub fn parse(text: &str, path: impl Into<PathBuf>) -> Result<Self, serde_json::Error> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text).to_string();
        let root: Value = serde_json::from_str(&text)?;

        let mut indexer = OffsetIndexer {
            text: &text,
            pos: 0,
            offsets: HashMap::new(),
        };
        indexer.value(String::new());
        let offsets = indexer.offsets;

        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Ok(JsonDocument {
            path: path.into(),
            text,
            root,
            offsets,
            line_starts,
        })
    }

    /// The file this document was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> JsonNode<'_> {
        JsonNode {
            doc: self,
            value: &self.root,
            pointer: String::new(),
        }
    }

    fn location_at(&self, offset: usize) -> SourceLocation {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line.saturating_sub(1)];
        let column = self
            .text
            .get(line_start..offset)
            .map_or(0, |prefix| prefix.chars().count());
        SourceLocation::new(&self.path, line.max(1), column + 1)
    }
}

/// A value inside a [`JsonDocument`].
#[derive(Debug, Clone)]
pub struct JsonNode<'a> {
    doc: &'a JsonDocument,
    value: &'a Value,
    pointer: String,
}

impl<'a> JsonNode<'a> {
    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Look up an object member. `None` for missing keys and non-objects.
    pub fn get(&self, key: &str) -> Option<JsonNode<'a>> {
        let value = self.value.as_object()?.get(key)?;
        Some(self.child(key, value))
    }

    /// Object members in document order, or `None` for non-objects.
    pub fn entries(&self) -> Option<Vec<(&'a str, JsonNode<'a>)>> {
        let map = self.value.as_object()?;
        Some(
            map.iter()
                .map(|(key, value)| (key.as_str(), self.child(key, value)))
                .collect(),
        )
    }

    /// Array items in order, or `None` for non-arrays.
    pub fn items(&self) -> Option<Vec<JsonNode<'a>>> {
        let items = self.value.as_array()?;
        Some(
            items
                .iter()
                .enumerate()
                .map(|(i, value)| self.child(&i.to_string(), value))
                .collect(),
        )
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.value.as_str()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }

    pub fn is_object(&self) -> bool {
        self.value.is_object()
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// Human-readable name of the value's JSON type.
    pub fn kind(&self) -> &'static str {
        match self.value {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        }
    }

    /// Where this value starts in the source file.
    pub fn location(&self) -> SourceLocation {
        let offset = self.doc.offsets.get(&self.pointer).copied().unwrap_or(0);
        self.doc.location_at(offset)
    }

    fn child(&self, key: &str, value: &'a Value) -> JsonNode<'a> {
        JsonNode {
            doc: self.doc,
            value,
            pointer: child_pointer(&self.pointer, key),
        }
    }
}

fn child_pointer(parent: &str, key: &str) -> String {
    format!("{}/{}", parent, key.replace('~', "~0").replace('/', "~1"))
}

/// Walks validated JSON text recording where each value begins.
struct OffsetIndexer<'t> {
    text: &'t str,
    pos: usize,
    offsets: HashMap<String, usize>,
}

impl OffsetIndexer<'_> {
    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn value(&mut self, pointer: String) {
        self.skip_whitespace();
        self.offsets.insert(pointer.clone(), self.pos);
        match self.peek() {
            Some(b'{') => self.object(&pointer),
            Some(b'[') => self.array(&pointer),
            Some(b'"') => self.string(),
            Some(_) => self.scalar(),
            None => {}
        }
    }

    fn object(&mut self, pointer: &str) {
        self.pos += 1;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'}') => {
                    self.pos += 1;
                    return;
                }
                Some(b',') => self.pos += 1,
                Some(b'"') => {
                    let start = self.pos;
                    self.string();
                    // Keys may contain escapes; let serde_json decode them.
                    let key: String =
                        serde_json::from_str(&self.text[start..self.pos]).unwrap_or_default();
                    self.skip_whitespace();
                    if self.peek() == Some(b':') {
                        self.pos += 1;
                    }
                    self.value(child_pointer(pointer, &key));
                }
                _ => return,
            }
        }
    }

    fn array(&mut self, pointer: &str) {
        self.pos += 1;
        let mut index = 0usize;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b']') | None => {
                    self.pos += 1;
                    return;
                }
                Some(b',') => self.pos += 1,
                Some(_) => {
                    let before = self.pos;
                    self.value(child_pointer(pointer, &index.to_string()));
                    if self.pos == before {
                        return;
                    }
                    index += 1;
                }
            }
        }
    }

    fn string(&mut self) {
        self.pos += 1;
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'\\' => self.pos += 1,
                b'"' => return,
                _ => {}
            }
        }
    }

    fn scalar(&mut self) {
        while let Some(b) = self.peek() {
            if matches!(b, b',' | b'}' | b']') || b.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
    }
}
