//! Rewrite document-local fragment references into cross-file targets.

use crate::{
    catalog::IdCatalog,
    diagnostic::Diagnostic,
    dom::Document,
    paths::relative_target,
};
use std::path::Path;

/// Elements whose `href` may point at an identifier.
pub const XREF_TAGS: [&str; 2] = ["xref", "link"];
pub const HREF_ATTR: &str = "href";
pub const SCOPE_ATTR: &str = "scope";
pub const EXTERNAL_SCOPE: &str = "external";
pub const FRAGMENT_MARKER: char = '#';

/// Outcome of looking up one fragment identifier in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Fully qualified target, e.g. `../a.dita#intro/overview`.
    Resolved(String),
    NotFound,
    Ambiguous(Vec<String>),
}

/// Resolve `identifier` (without the leading `#`) as seen from the document at `path`.
pub fn resolve_fragment(identifier: &str, path: &Path, catalog: &IdCatalog) -> Resolution {
    let matches = catalog.find_matches(identifier);
    let target_id = match matches.as_slice() {
        [] => return Resolution::NotFound,
        [single] => *single,
        _ => return Resolution::Ambiguous(matches.iter().map(|m| m.to_string()).collect()),
    };
    let Some(entry) = catalog.get(target_id) else {
        return Resolution::NotFound;
    };
    let filepath = relative_target(path, &entry.path);
    if entry.topic_id == target_id {
        Resolution::Resolved(format!("{filepath}#{}", entry.topic_id))
    } else {
        Resolution::Resolved(format!("{filepath}#{}/{target_id}", entry.topic_id))
    }
}

/// Point every internal `#id` reference in `doc` at the file and topic that define `id`.
///
/// External-scope references and values that are not fragment references are left alone, as
/// are references that match nothing or more than one catalog key; the latter two are
/// reported. Returns whether any `href` changed.
pub fn update_xrefs(
    doc: &mut Document,
    path: &Path,
    catalog: &IdCatalog,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let mut updated = false;

    for id in doc.elements() {
        if !XREF_TAGS.contains(&doc.tag(id)) {
            continue;
        }
        if doc.attr(id, SCOPE_ATTR) == Some(EXTERNAL_SCOPE) {
            continue;
        }
        let Some(href) = doc.attr(id, HREF_ATTR) else {
            continue;
        };
        if !href.starts_with(FRAGMENT_MARKER) {
            continue;
        }
        let identifier = href.trim_start_matches(FRAGMENT_MARKER).to_string();

        match resolve_fragment(&identifier, path, catalog) {
            Resolution::Resolved(target) => {
                tracing::debug!("[update_xrefs] {path:?}: #{identifier} -> {target}");
                doc.set_attr(id, HREF_ATTR, target);
                updated = true;
            }
            Resolution::NotFound => diagnostics.push(Diagnostic::id_not_found(path, identifier)),
            Resolution::Ambiguous(matches) => {
                diagnostics.push(Diagnostic::ambiguous_id(path, identifier, matches))
            }
        }
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::CatalogBuilder, diagnostic::DiagnosticKind};

    const A: &str = r##"<concept id="intro">
  <title>Intro</title>
  <conbody>
    <section id="overview"><p>See <xref href="#overview"/> and <xref href="#steps"/>.</p></section>
  </conbody>
</concept>"##;

    const B: &str = r##"<task id="steps">
  <title>Steps</title>
  <taskbody>
    <context><p>Read <xref href="#intro"/> first.</p></context>
    <steps><step id="step"><cmd>Go</cmd></step><step id="step_1"><cmd>Stop</cmd></step></steps>
  </taskbody>
  <related-links><link href="#overview_12ab"/><link href="https://example.com" scope="external"/></related-links>
</task>"##;

    fn catalog() -> IdCatalog {
        let mut builder = CatalogBuilder::new();
        builder.add(Path::new("a.dita"), &Document::parse(A).unwrap());
        builder.add(Path::new("sub/b.dita"), &Document::parse(B).unwrap());
        builder.finish()
    }

    fn hrefs(doc: &Document) -> Vec<String> {
        doc.elements()
            .into_iter()
            .filter_map(|id| doc.attr(id, HREF_ATTR).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_same_directory_and_parent_directory_targets() {
        let catalog = catalog();
        let mut diagnostics = Vec::new();

        let mut a = Document::parse(A).unwrap();
        assert!(update_xrefs(&mut a, Path::new("a.dita"), &catalog, &mut diagnostics));
        assert_eq!(
            hrefs(&a),
            vec!["a.dita#intro/overview", "sub/b.dita#steps"]
        );

        let mut b = Document::parse(B).unwrap();
        assert!(update_xrefs(&mut b, Path::new("sub/b.dita"), &catalog, &mut diagnostics));
        assert_eq!(
            hrefs(&b),
            vec![
                "../a.dita#intro",
                "../a.dita#intro/overview",
                "https://example.com"
            ]
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let catalog = catalog();
        let mut diagnostics = Vec::new();
        let mut a = Document::parse(A).unwrap();
        update_xrefs(&mut a, Path::new("a.dita"), &catalog, &mut diagnostics);
        let before = hrefs(&a);
        assert!(!update_xrefs(&mut a, Path::new("a.dita"), &catalog, &mut diagnostics));
        assert_eq!(hrefs(&a), before);
    }

    #[test]
    fn test_unmatched_and_ambiguous_are_left_alone() {
        let catalog = catalog();
        let mut diagnostics = Vec::new();
        let mut doc = Document::parse(
            r##"<topic id="t"><body><p><xref href="#nowhere"/><xref href="#step_1_x"/></p></body></topic>"##,
        )
        .unwrap();
        assert!(!update_xrefs(&mut doc, Path::new("t.dita"), &catalog, &mut diagnostics));
        assert_eq!(hrefs(&doc), vec!["#nowhere", "#step_1_x"]);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            diagnostics[0].kind,
            DiagnosticKind::IdNotFound {
                id: "nowhere".to_string()
            }
        );
        assert_eq!(
            diagnostics[1].kind,
            DiagnosticKind::AmbiguousId {
                id: "step_1_x".to_string(),
                matches: vec!["step".to_string(), "step_1".to_string()],
            }
        );
    }

    #[test]
    fn test_external_scope_fragment_is_skipped() {
        let catalog = catalog();
        let mut diagnostics = Vec::new();
        let mut doc = Document::parse(
            r##"<topic id="t"><body><p><xref scope="external" href="#intro"/></p></body></topic>"##,
        )
        .unwrap();
        assert!(!update_xrefs(&mut doc, Path::new("t.dita"), &catalog, &mut diagnostics));
        assert_eq!(hrefs(&doc), vec!["#intro"]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_other_attributes_are_untouched() {
        let catalog = catalog();
        let mut diagnostics = Vec::new();
        let mut doc = Document::parse(
            r##"<topic id="t"><body><p><xref format="dita" href="#intro" type="concept"/></p></body></topic>"##,
        )
        .unwrap();
        update_xrefs(&mut doc, Path::new("t.dita"), &catalog, &mut diagnostics);
        assert_eq!(
            doc.to_xml_string().unwrap(),
            r#"<topic id="t"><body><p><xref format="dita" href="a.dita#intro" type="concept"/></p></body></topic>"#
        );
    }
}
