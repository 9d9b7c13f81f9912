//! Strip foreign placeholder syntax out of `id` attributes.

use crate::{catalog::ID_ATTR, cleanup::TOKEN_NAME, dom::Document};
use once_cell::sync::Lazy;
use regex::Regex;

/// A placeholder, `set:`, or `counter:` token with an optional leading separator.
static EMBEDDED_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"[_-]?\{{(?:{TOKEN_NAME}|set:.+?|counter2?:.+?)\}}"
    ))
    .expect("embedded placeholder pattern is valid")
});

static VALID_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_:][A-Za-z0-9_:.-]+$").expect("identifier pattern is valid")
});

pub fn is_valid_id(value: &str) -> bool {
    VALID_ID.is_match(value)
}

/// Sanitized form of `value`, or `None` when it is already valid or nothing can be removed.
pub fn sanitize_id(value: &str) -> Option<String> {
    if is_valid_id(value) {
        return None;
    }
    let cleaned = EMBEDDED_PLACEHOLDER.replace_all(value, "");
    if cleaned == value {
        None
    } else {
        Some(cleaned.into_owned())
    }
}

/// Remove embedded placeholder tokens from every invalid `id` in `doc`.
///
/// Returns whether any identifier changed.
pub fn prune_ids(doc: &mut Document) -> bool {
    let mut updated = false;

    for id in doc.elements() {
        let Some(sanitized) = doc.attr(id, ID_ATTR).and_then(sanitize_id) else {
            continue;
        };
        tracing::debug!(
            "[prune_ids] {:?} -> {sanitized}",
            doc.attr(id, ID_ATTR).unwrap_or_default()
        );
        doc.set_attr(id, ID_ATTR, sanitized);
        updated = true;
    }
    updated
}
