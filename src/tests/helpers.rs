//! Shared test utilities for pass and catalog testing

use crate::{catalog::CatalogBuilder, catalog::IdCatalog, dom::Document};
use std::path::Path;

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

pub fn parse(xml: &str) -> Document {
    Document::parse(xml).unwrap()
}

/// Build a catalog from `(path, source)` pairs, in order.
pub fn catalog_of(docs: &[(&str, &str)]) -> IdCatalog {
    init_logging();
    let mut builder = CatalogBuilder::new();
    for (path, xml) in docs {
        builder.add(Path::new(path), &parse(xml));
    }
    builder.finish()
}

/// Every `href` value in document order.
pub fn hrefs(doc: &Document) -> Vec<String> {
    doc.elements()
        .into_iter()
        .filter_map(|id| doc.attr(id, "href").map(str::to_string))
        .collect()
}

pub const GUIDE: &str = r##"<concept id="guide">
  <title>Guide</title>
  <conbody>
    <section id="setup"><title>Setup</title><p>Install {product}.</p></section>
    <section id="_hidden"><p>Generated.</p></section>
  </conbody>
</concept>"##;

pub const TROUBLESHOOT: &str = r##"<task id="troubleshoot_{version}">
  <title>Troubleshooting</title>
  <taskbody>
    <steps>
      <step id="restart"><cmd>Restart, see <xref href="#setup_x1"/> and <xref href="#guide"/>.</cmd></step>
      <step><cmd>Read <xref href="notes.adoc"/></cmd></step>
    </steps>
    <result><image href="result.png"/></result>
  </taskbody>
</task>"##;
