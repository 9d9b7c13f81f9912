//! Report placeholder syntax that survived the rewriting passes.

use crate::{
    catalog::ID_ATTR, cleanup::xrefs::HREF_ATTR, cleanup::TOKEN_NAME, diagnostic::Diagnostic,
    dom::Document,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{collections::BTreeSet, path::Path};

static LEFTOVER_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(\\?)\{{({TOKEN_NAME}|set:.+?|counter2?:.+?)\}}"
    ))
    .expect("leftover token pattern is valid")
});

fn collect_tokens(value: &str, found: &mut BTreeSet<String>) {
    for caps in LEFTOVER_TOKEN.captures_iter(value) {
        if caps[1].is_empty() {
            found.insert(caps[2].to_string());
        }
    }
}

/// Distinct names of unescaped placeholder, `set:`, and `counter:` tokens in element text,
/// tails, `id` values, and `href` values.
pub fn find_problems(doc: &Document) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    for id in doc.iter() {
        if doc.is_element(id) {
            if let Some(text) = doc.text(id) {
                collect_tokens(text, &mut found);
            }
            for attr in [ID_ATTR, HREF_ATTR] {
                if let Some(value) = doc.attr(id, attr) {
                    collect_tokens(value, &mut found);
                }
            }
        }
        if let Some(tail) = doc.tail(id) {
            collect_tokens(tail, &mut found);
        }
    }
    found
}

/// One unresolved placeholder diagnostic per distinct token in `doc`.
pub fn report_problems(doc: &Document, path: &Path) -> Vec<Diagnostic> {
    find_problems(doc)
        .into_iter()
        .map(|name| Diagnostic::unresolved_placeholder(path, name))
        .collect()
}
