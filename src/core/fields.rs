//! Typed access to manifest fields.
//!
//! Structural fields must have the right JSON type; a mismatch is an
//! `InvalidField` error pointing at the offending value.

use crate::core::errors::ProjectError;
use crate::util::json::JsonNode;

fn invalid(node: &JsonNode<'_>, field: &str, expected: &'static str) -> ProjectError {
    ProjectError::InvalidField {
        field: field.to_string(),
        expected,
        location: node.location(),
    }
}

/// A string member, `None` when absent or null.
pub(crate) fn optional_string(
    parent: &JsonNode<'_>,
    key: &str,
) -> Result<Option<String>, ProjectError> {
    match parent.get(key) {
        None => Ok(None),
        Some(node) if node.is_null() => Ok(None),
        Some(node) => node
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| invalid(&node, key, "a string")),
    }
}

/// A boolean member, `None` when absent or null.
pub(crate) fn optional_bool(parent: &JsonNode<'_>, key: &str) -> Result<Option<bool>, ProjectError> {
    match parent.get(key) {
        None => Ok(None),
        Some(node) if node.is_null() => Ok(None),
        Some(node) => node
            .as_bool()
            .map(Some)
            .ok_or_else(|| invalid(&node, key, "a boolean")),
    }
}

/// An array-of-strings member, empty when absent or null.
pub(crate) fn string_list(parent: &JsonNode<'_>, key: &str) -> Result<Vec<String>, ProjectError> {
    let Some(node) = parent.get(key).filter(|node| !node.is_null()) else {
        return Ok(Vec::new());
    };
    let items = node
        .items()
        .ok_or_else(|| invalid(&node, key, "an array of strings"))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(item, key, "an array of strings"))
        })
        .collect()
}

/// An object member, `None` when absent or null.
pub(crate) fn optional_object<'a>(
    parent: &JsonNode<'a>,
    key: &str,
) -> Result<Option<JsonNode<'a>>, ProjectError> {
    match parent.get(key) {
        None => Ok(None),
        Some(node) if node.is_null() => Ok(None),
        Some(node) if node.is_object() => Ok(Some(node)),
        Some(node) => Err(invalid(&node, key, "an object")),
    }
}

/// Require `node` itself to be an object.
pub(crate) fn require_object(node: &JsonNode<'_>, field: &str) -> Result<(), ProjectError> {
    if node.is_object() {
        Ok(())
    } else {
        Err(invalid(node, field, "an object"))
    }
}
