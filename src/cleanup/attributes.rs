//! Turn inline `{name}` placeholders into `<ph conref="..."/>` elements.
//!
//! `set:` and `counter:` tokens never match here: they carry state that a plain substitution
//! cannot reproduce, so they stay in the text and surface in the problem report instead.

use crate::{cleanup::TOKEN_NAME, dom::Document, dom::NodeId};
use once_cell::sync::Lazy;
use regex::Regex;

pub const PHRASE_TAG: &str = "ph";
pub const CONREF_ATTR: &str = "conref";

/// A placeholder with its (optional) escape marker captured separately.
static ATTRIBUTE_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(\\?)\{{({TOKEN_NAME})\}}")).expect("placeholder pattern is valid")
});

/// Text split around its placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderSplit {
    /// Text before the first placeholder.
    pub lead: String,
    /// Each placeholder name with the text that follows it, up to the next placeholder.
    pub pieces: Vec<(String, String)>,
}

/// Split `text` around unescaped placeholders; `None` when there are none.
pub fn split_placeholders(text: &str) -> Option<PlaceholderSplit> {
    let mut lead = String::new();
    let mut pieces: Vec<(String, String)> = Vec::new();
    let mut cursor = 0;

    for caps in ATTRIBUTE_REF.captures_iter(text) {
        if !caps[1].is_empty() {
            continue;
        }
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let segment = text[cursor..whole.start()].to_string();
        match pieces.last_mut() {
            Some(last) => last.1 = segment,
            None => lead = segment,
        }
        pieces.push((caps[2].to_string(), String::new()));
        cursor = whole.end();
    }

    let last = pieces.last_mut()?;
    last.1 = text[cursor..].to_string();
    Some(PlaceholderSplit { lead, pieces })
}

fn conref_prefix(prefix: &str) -> String {
    if prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{prefix}/")
    }
}

fn phrase_nodes(doc: &mut Document, prefix: &str, pieces: Vec<(String, String)>) -> Vec<NodeId> {
    pieces
        .into_iter()
        .map(|(name, tail)| {
            let ph = doc.create_element(PHRASE_TAG);
            doc.set_attr(ph, CONREF_ATTR, format!("{prefix}{}", name.to_lowercase()));
            doc.set_tail(ph, Some(tail));
            ph
        })
        .collect()
}

/// Replace every placeholder in element text and in node tails with a `ph` element whose
/// `conref` is `<prefix>/<name>` in lower case.
///
/// Placeholders in an element's text become its leading children; placeholders in a tail become
/// siblings directly after the node that owns the tail. Literal text keeps its position as
/// element text or as the tail of the preceding new node. Returns whether anything changed.
pub fn replace_attributes(doc: &mut Document, conref: &str) -> bool {
    let prefix = conref_prefix(conref);
    let mut updated = false;

    for id in doc.iter() {
        if doc.is_element(id) {
            if let Some(split) = doc.text(id).and_then(split_placeholders) {
                doc.set_text(id, Some(split.lead));
                let nodes = phrase_nodes(doc, &prefix, split.pieces);
                for (idx, node) in nodes.into_iter().enumerate() {
                    doc.insert_child(id, idx, node);
                }
                updated = true;
            }
        }

        let Some(parent) = doc.parent(id) else {
            continue;
        };
        if let Some(split) = doc.tail(id).and_then(split_placeholders) {
            doc.set_tail(id, Some(split.lead));
            let base = doc.index_of(parent, id).map(|idx| idx + 1).unwrap_or(0);
            let nodes = phrase_nodes(doc, &prefix, split.pieces);
            for (offset, node) in nodes.into_iter().enumerate() {
                doc.insert_child(parent, base + offset, node);
            }
            updated = true;
        }
    }
    updated
}
