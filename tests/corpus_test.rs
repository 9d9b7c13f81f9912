mod common;

use common::{read, setup_corpus};
use dita_cleanup::{
    CleanupConfig, CorpusCompiler, CorpusReport, DiagnosticKind, ProcessResult,
};
use std::path::Path;
use test_log::test;

fn compiler(root: &Path, write: bool) -> CorpusCompiler {
    let config = CleanupConfig::load(root, None).unwrap();
    CorpusCompiler::new(root, config, write).unwrap()
}

fn result<'a>(report: &'a CorpusReport, rel: &str) -> &'a ProcessResult {
    report
        .results
        .iter()
        .find(|r| r.path == Path::new(rel))
        .unwrap_or_else(|| panic!("no result for {rel}"))
}

fn rendered(diagnostics: &[dita_cleanup::Diagnostic]) -> Vec<String> {
    diagnostics.iter().map(|d| d.to_string()).collect()
}

#[test]
fn test_catalog_pass_reports_corpus_problems() {
    let (_tmp, root) = setup_corpus("corpus_1");
    let report = compiler(&root, false).run().unwrap();

    assert_eq!(report.documents, 7);
    assert_eq!(
        rendered(&report.catalog_diagnostics)
            .iter()
            .map(|line| line.split(':').take(2).collect::<Vec<_>>().join(":"))
            .collect::<Vec<_>>(),
        vec![
            "book.xml: unsupported root category",
            "broken.dita: malformed markup",
            "reference/dup.dita: duplicate identifier",
        ]
    );
    assert_eq!(
        report.catalog_diagnostics[2].kind,
        DiagnosticKind::DuplicateId {
            id: "overview".to_string()
        }
    );
    // Unparseable documents are not processed a second time.
    assert_eq!(report.results.len(), 6);
    assert!(report
        .results
        .iter()
        .all(|r| r.path != Path::new("broken.dita")));
}

#[test]
fn test_rewrites_documents_in_place() {
    let (_tmp, root) = setup_corpus("corpus_1");
    let report = compiler(&root, true).run().unwrap();

    assert_eq!(report.modified(), 2);
    assert_eq!(report.written(), 2);

    let intro = read(&root, "intro.dita");
    assert!(intro.starts_with(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE concept PUBLIC"
    ));
    assert!(intro.contains(
        r#"<p><ph conref="reuse/attributes.dita#attributes/product-name"/> installs in minutes. See <xref href="tasks/install.dita#install"/>.</p>"#
    ));
    assert!(intro.contains(r#"<image href="images/arch.png"/>"#));
    assert!(!intro.contains("attributes.adoc"));
    assert!(result(&report, "intro.dita").diagnostics.is_empty());

    let install = read(&root, "tasks/install.dita");
    assert!(install.contains(r#"<xref href="../intro.dita#intro"/>"#));
    assert!(install.contains(r#"<xref href="../intro.dita#intro/overview"/>"#));
    assert!(install.contains(r#"<step id="step-1"><cmd>Run step {counter:step}.</cmd></step>"#));
    assert!(install.contains(r##"<xref href="#missing"/>"##));
    assert!(install.contains(r#"<step id="_generated">"#));
    assert!(install.contains(r#"<image href="../images/screen.png"/>"#));
    assert_eq!(
        rendered(&result(&report, "tasks/install.dita").diagnostics),
        vec![
            "tasks/install.dita: no matching identifier: missing",
            "tasks/install.dita: unresolved placeholder: {counter:step}",
        ]
    );
}

#[test]
fn test_unmodified_documents_are_left_byte_identical() {
    let (_tmp, root) = setup_corpus("corpus_1");
    let before = read(&root, "tasks/configure.dita");
    let report = compiler(&root, true).run().unwrap();

    let configure = result(&report, "tasks/configure.dita");
    assert!(!configure.modified);
    assert!(!configure.written);
    assert_eq!(
        configure.diagnostics[0].kind,
        DiagnosticKind::AmbiguousId {
            id: "step_2_x".to_string(),
            matches: vec!["step".to_string(), "step_2".to_string()],
        }
    );
    assert_eq!(read(&root, "tasks/configure.dita"), before);
    for rel in ["book.xml", "reference/dup.dita", "reuse/attributes.dita"] {
        assert!(!result(&report, rel).modified, "{rel} should be untouched");
    }
}

#[test]
fn test_dry_run_writes_nothing() {
    let (_tmp, root) = setup_corpus("corpus_1");
    let before = read(&root, "intro.dita");
    let report = compiler(&root, false).run().unwrap();

    assert_eq!(report.modified(), 2);
    assert_eq!(report.written(), 0);
    assert_eq!(read(&root, "intro.dita"), before);
}

#[test]
fn test_second_run_changes_nothing() {
    let (_tmp, root) = setup_corpus("corpus_1");
    compiler(&root, true).run().unwrap();
    let intro = read(&root, "intro.dita");
    let install = read(&root, "tasks/install.dita");

    let report = compiler(&root, true).run().unwrap();
    assert_eq!(report.modified(), 0);
    assert_eq!(read(&root, "intro.dita"), intro);
    assert_eq!(read(&root, "tasks/install.dita"), install);

    let already: Vec<String> = report
        .diagnostics()
        .filter(|d| matches!(d.kind, DiagnosticKind::ImageAlreadyRewritten { .. }))
        .map(|d| d.to_string())
        .collect();
    assert_eq!(
        already,
        vec![
            "intro.dita: already-rewritten image path: images/arch.png",
            "tasks/install.dita: already-rewritten image path: ../images/screen.png",
        ]
    );
}

#[test]
fn test_single_file_root() {
    let (_tmp, root) = setup_corpus("corpus_1");
    let compiler = CorpusCompiler::new(
        root.join("tasks/configure.dita"),
        CleanupConfig::default(),
        false,
    )
    .unwrap();
    let report = compiler.run().unwrap();
    assert_eq!(report.documents, 1);
    assert_eq!(report.results[0].path, Path::new("configure.dita"));
    assert_eq!(report.catalog_size, 3);
}

#[test]
fn test_report_serializes_to_json() {
    let (_tmp, root) = setup_corpus("corpus_1");
    let report = compiler(&root, false).run().unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["documents"], 7);
    assert_eq!(json["catalog_diagnostics"][1]["category"], "malformed_markup");
    assert_eq!(json["catalog_diagnostics"][1]["path"], "broken.dita");
}
