//! # dita-cleanup
//!
//! A Rust library for making DITA topic corpora portable across files.
//!
//! ## Overview
//!
//! Content converted into DITA from other sources tends to carry document-local shortcuts:
//! bare `#id` cross-references, inline `{name}` placeholders, and identifiers with placeholder
//! syntax baked into them. dita-cleanup reads a whole corpus, builds one catalog of every
//! element identifier in it, and rewrites each document so that its references point at real
//! files and topics.
//!
//! ### What gets rewritten
//!
//! - **Fragment references**: `<xref href="#overview"/>` becomes `a.dita#intro/overview`,
//!   relative to the referring document
//! - **Identifiers**: `step-1_{context}` becomes `step-1`
//! - **Placeholders**: `{product-name}` in text becomes `<ph conref="vars/product-name"/>`
//! - **Include references**: cross-references to `.adoc` include files are dropped
//! - **Images**: `href` values are re-rooted at a shared images directory
//!
//! Anything that cannot be handled (unknown or ambiguous targets, duplicate identifiers,
//! leftover `{set:...}` tokens, unreadable files) is reported as a [`Diagnostic`] and the run
//! continues.
//!
//! ## Architecture
//!
//! - **[`dom`]**: Arena-backed element tree with text/tail content, read and written with `quick-xml`
//! - **[`catalog`]**: Per-document identifier lists and the corpus-wide [`IdCatalog`]
//! - **[`cleanup`]**: The per-document rewriting passes
//! - **[`compiler`]**: File discovery and the two-pass [`CorpusCompiler`]
//! - **[`config`]**: `dita-cleanup.toml` settings
//! - **[`paths`]**: Lexical path arithmetic for relative targets
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dita_cleanup::{CleanupConfig, CorpusCompiler};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CleanupConfig {
//!         conref_prefix: Some("reuse/attributes.dita#attributes".to_string()),
//!         ..CleanupConfig::default()
//!     };
//!     let write = true;
//!     let compiler = CorpusCompiler::new("./docs", config, write)?;
//!     let report = compiler.run()?;
//!
//!     for diagnostic in report.diagnostics() {
//!         println!("{diagnostic}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Single documents
//!
//! The passes also work on one in-memory document:
//!
//! ```rust
//! use dita_cleanup::{cleanup::replace_attributes, dom::Document};
//!
//! let mut doc = Document::parse("<p>Value is {product-name} today.</p>").unwrap();
//! assert!(replace_attributes(&mut doc, "vars"));
//! assert_eq!(
//!     doc.to_xml_string().unwrap(),
//!     r#"<p>Value is <ph conref="vars/product-name"/> today.</p>"#
//! );
//! ```

pub mod catalog;
pub mod cleanup;
pub mod compiler;
pub mod config;
pub mod diagnostic;
pub mod dom;
pub mod error;
pub mod paths;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogBuilder, CatalogEntry, IdCatalog};
pub use compiler::{discover_documents, CorpusCompiler, CorpusReport, ProcessResult};
pub use config::CleanupConfig;
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use error::*;
