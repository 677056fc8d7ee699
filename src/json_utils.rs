//! Locating JSON inside free-form model output.
//!
//! Models are told to answer with a bare JSON object but routinely wrap it in prose or
//! markdown fences. These helpers scan for balanced `{...}`/`[...]` structures (ignoring
//! brackets inside strings) and try to deserialize them, outermost first.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Type of a JSON node found by the scanner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NodeType {
    Object,
    Array,
}

/// Coordinates of a JSON structure within a larger text, including nested children.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjCoords {
    pub start: usize,
    pub end: usize, // inclusive index of the closing bracket/brace
    pub kind: NodeType,
    pub children: Vec<ObjCoords>,
}

impl ObjCoords {
    pub fn new(start: usize, end: usize, kind: NodeType, children: Vec<ObjCoords>) -> Self {
        Self { start, end, kind, children }
    }

    /// The text this node spans.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..=self.end]
    }
}

#[derive(Debug)]
struct Frame {
    start: usize,
    kind: NodeType,
    children: Vec<ObjCoords>,
}

/// Find all JSON object/array structures in the given text. Coordinates are byte indices.
#[instrument(target = "quiz_forge::json", skip(text), fields(text_len = text.len()))]
pub fn find_json_structures(text: &str) -> Vec<ObjCoords> {
    let mut results: Vec<ObjCoords> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    let mut in_string = false;
    let mut escape = false;

    for (i, &b) in text.as_bytes().iter().enumerate() {
        if in_string {
            if escape {
                escape = false;
                continue;
            }
            match b {
                b'\\' => escape = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        let closing = match b {
            b'"' => {
                in_string = true;
                continue;
            }
            b'{' => {
                stack.push(Frame { start: i, kind: NodeType::Object, children: Vec::new() });
                continue;
            }
            b'[' => {
                stack.push(Frame { start: i, kind: NodeType::Array, children: Vec::new() });
                continue;
            }
            b'}' => NodeType::Object,
            b']' => NodeType::Array,
            _ => continue,
        };

        // A mismatched closer discards the open frame but keeps its finished children;
        // prose like "a) b]" is common.
        if let Some(frame) = stack.pop() {
            let finished = if frame.kind == closing {
                vec![ObjCoords::new(frame.start, i, closing, frame.children)]
            } else {
                frame.children
            };
            match stack.last_mut() {
                Some(parent) => parent.children.extend(finished),
                None => results.extend(finished),
            }
        }
    }

    // Brackets that never close must not swallow the structures opened after them.
    if !stack.is_empty() {
        results.extend(stack.into_iter().flat_map(|frame| frame.children));
        results.sort_by_key(|node| node.start);
    }

    debug!(target: "quiz_forge::json", count = results.len(), "found root structures");
    results
}

fn first_in_node<T: DeserializeOwned>(text: &str, node: &ObjCoords) -> Option<T> {
    if let Ok(value) = serde_json::from_str::<T>(node.slice(text)) {
        return Some(value);
    }
    node.children.iter().find_map(|child| first_in_node(text, child))
}

/// The first `T` in `text`: the whole text if it parses, otherwise the outermost
/// structure (in order of appearance) that deserializes, descending into children of
/// structures that don't.
#[instrument(target = "quiz_forge::json", skip(text), fields(text_len = text.len()))]
pub fn extract_first<T: DeserializeOwned>(text: &str) -> Option<T> {
    if let Ok(value) = serde_json::from_str::<T>(text.trim()) {
        return Some(value);
    }
    find_json_structures(text)
        .iter()
        .find_map(|node| first_in_node(text, node))
}
