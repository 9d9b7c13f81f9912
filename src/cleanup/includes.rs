//! Drop cross-references to build-time include files.

use crate::{cleanup::xrefs::HREF_ATTR, dom::Document};

pub const INCLUDE_XREF_TAG: &str = "xref";

/// Remove every `xref` whose `href` ends in `.<extension>`, whatever its scope.
///
/// A parent left without children by a removal is removed from its own parent too. The cascade
/// stops there: an ancestor emptied by that second removal stays. Returns whether anything was
/// removed.
pub fn prune_includes(doc: &mut Document, extension: &str) -> bool {
    let suffix = format!(".{}", extension.trim_start_matches('.'));
    let mut updated = false;

    for id in doc.elements() {
        if doc.tag(id) != INCLUDE_XREF_TAG {
            continue;
        }
        let Some(href) = doc.attr(id, HREF_ATTR) else {
            continue;
        };
        if !href.ends_with(&suffix) {
            continue;
        }
        // Already gone with an earlier cascade.
        if !doc.is_attached(id) {
            continue;
        }
        let Some(parent) = doc.parent(id) else {
            continue;
        };

        tracing::debug!("[prune_includes] removing <{INCLUDE_XREF_TAG} href={href:?}>");
        doc.remove_child(parent, id);
        updated = true;

        if !doc.children(parent).is_empty() {
            continue;
        }
        if let Some(grandparent) = doc.parent(parent) {
            doc.remove_child(grandparent, parent);
        }
    }
    updated
}
