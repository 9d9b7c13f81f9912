//! Point image references at a shared images directory.

use crate::{
    cleanup::xrefs::{EXTERNAL_SCOPE, HREF_ATTR, SCOPE_ATTR},
    diagnostic::{Diagnostic, DiagnosticKind},
    dom::Document,
    paths::{os_path_to_string, parent_dir, relative_path, same_dir},
};
use std::path::Path;

pub const IMAGE_TAG: &str = "image";

/// Prefix that makes an image reference in the document at `path` resolve inside `images_dir`,
/// or `None` when the document already lives in that directory.
pub fn image_prefix(path: &Path, images_dir: &Path) -> Option<String> {
    let doc_dir = parent_dir(path);
    if same_dir(&doc_dir, images_dir) {
        return None;
    }
    let mut prefix = os_path_to_string(relative_path(&doc_dir, images_dir));
    if !prefix.ends_with('/') {
        prefix.push('/');
    }
    Some(prefix)
}

/// Prefix the `href` of every `image` in `doc` with the path from the document's directory to
/// `images_dir`.
///
/// `path` and `images_dir` must share a base. References that already carry the prefix are left
/// alone and reported. Images marked `scope="external"` are not rewritten; their `href` is kept
/// as written. Returns whether any `href` changed.
pub fn update_image_paths(
    doc: &mut Document,
    path: &Path,
    images_dir: &Path,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let Some(prefix) = image_prefix(path, images_dir) else {
        return false;
    };
    let mut updated = false;

    for id in doc.elements() {
        if doc.tag(id) != IMAGE_TAG {
            continue;
        }
        if doc.attr(id, SCOPE_ATTR) == Some(EXTERNAL_SCOPE) {
            continue;
        }
        let Some(href) = doc.attr(id, HREF_ATTR) else {
            continue;
        };
        if href.starts_with(&prefix) {
            diagnostics.push(Diagnostic::for_file(
                path,
                DiagnosticKind::ImageAlreadyRewritten {
                    href: href.to_string(),
                },
            ));
            continue;
        }
        let target = format!("{prefix}{href}");
        doc.set_attr(id, HREF_ATTR, target);
        updated = true;
    }
    updated
}
