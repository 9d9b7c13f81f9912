use crate::{
    catalog::{is_topic, CatalogBuilder, IdCatalog, ID_ATTR},
    cleanup::{pipeline, report_problems, run_passes, DocumentPass, PassContext},
    config::CleanupConfig,
    diagnostic::{Diagnostic, DiagnosticKind},
    dom::Document,
    error::CleanupError,
    paths::{normalize, relative_path},
};
use serde::Serialize;
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};
use walkdir::{DirEntry, WalkDir};

/// Every document under `root` that `config` accepts by extension, sorted by path.
///
/// Symbolic links are not followed and hidden entries (names starting with `.`) are skipped,
/// except for `root` itself. A `root` that is a file is returned as the only document.
pub fn discover_documents<P: AsRef<Path>>(
    root: P,
    config: &CleanupConfig,
) -> Result<Vec<PathBuf>, CleanupError> {
    fn is_hidden(entry: &DirEntry) -> bool {
        entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
    }
    let root = root.as_ref();
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.is_dir() {
        return Err(CleanupError::NotFound(format!("{root:?} is not a directory")));
    }

    let mut documents: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e) || e.path() == root)
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!("[discover_documents] skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(DirEntry::into_path)
        .filter(|p| config.is_document(p))
        .collect();
    documents.sort();
    Ok(documents)
}

/// Outcome of rewriting one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessResult {
    /// Path relative to the corpus directory.
    pub path: PathBuf,
    /// At least one pass changed the tree.
    pub modified: bool,
    /// The changed tree was saved.
    pub written: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorpusReport {
    pub root: PathBuf,
    pub documents: usize,
    pub catalog_size: usize,
    /// Diagnostics from catalog construction.
    pub catalog_diagnostics: Vec<Diagnostic>,
    pub results: Vec<ProcessResult>,
}

impl CorpusReport {
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.catalog_diagnostics
            .iter()
            .chain(self.results.iter().flat_map(|r| r.diagnostics.iter()))
    }

    pub fn modified(&self) -> usize {
        self.results.iter().filter(|r| r.modified).count()
    }

    pub fn written(&self) -> usize {
        self.results.iter().filter(|r| r.written).count()
    }
}

/// Runs the two passes over a corpus: build the identifier catalog from every document, then
/// rewrite each document against it.
///
/// The catalog is complete before the first document is rewritten. Documents are addressed
/// relative to the corpus directory (the root itself, or its parent when the root is a single
/// file), and that is also how they show up in catalog entries, rewritten targets, and
/// diagnostics.
pub struct CorpusCompiler {
    root: PathBuf,
    base: PathBuf,
    config: CleanupConfig,
    write: bool,
    passes: Vec<Box<dyn DocumentPass>>,
}

impl CorpusCompiler {
    /// Create a compiler for the file or directory at `root`.
    ///
    /// # Arguments
    /// * `root` - Corpus directory, or a single document
    /// * `config` - Which passes run and how
    /// * `write` - Save modified documents, or only report
    pub fn new(
        root: impl AsRef<Path>,
        config: CleanupConfig,
        write: bool,
    ) -> Result<Self, CleanupError> {
        let root = root.as_ref().canonicalize()?;
        let base = if root.is_file() {
            root.parent().map(Path::to_path_buf).unwrap_or_default()
        } else {
            root.clone()
        };
        let images_dir = config
            .images_dir_in(&base)
            .map(|dir| relative_path(&base, dir));
        let passes = pipeline(&config, images_dir);
        tracing::debug!(
            "[CorpusCompiler] {root:?}: passes {:?}",
            passes.iter().map(|p| p.name()).collect::<Vec<_>>()
        );
        Ok(Self {
            root,
            base,
            config,
            write,
            passes,
        })
    }

    /// Default configuration with write-back enabled.
    pub fn simple(root: impl AsRef<Path>) -> Result<Self, CleanupError> {
        Self::new(root, CleanupConfig::default(), true)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &CleanupConfig {
        &self.config
    }

    /// `path` relative to the corpus directory.
    pub fn relative(&self, path: &Path) -> PathBuf {
        match path.strip_prefix(&self.base) {
            Ok(rel) => normalize(rel),
            Err(_) => normalize(path),
        }
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        }
    }

    pub fn discover(&self) -> Result<Vec<PathBuf>, CleanupError> {
        discover_documents(&self.root, &self.config)
    }

    /// Pass 1: collect identifiers from `paths`, in order.
    ///
    /// Unparseable documents, non-topic roots, topics without an id, and duplicate identifiers
    /// are reported. None of these stop the scan. With `prune_ids` on, identifiers are
    /// registered as the sanitizer will leave them.
    pub fn build_catalog(&self, paths: &[PathBuf]) -> (IdCatalog, Vec<Diagnostic>) {
        let mut builder = CatalogBuilder::new().sanitize_ids(self.config.prune_ids);
        let mut diagnostics = Vec::new();

        for path in paths {
            let rel = self.relative(path);
            let doc = match Document::from_file(self.absolute(path)) {
                Ok(doc) => doc,
                Err(e) => {
                    diagnostics.push(load_failure(&rel, e));
                    continue;
                }
            };
            if !is_topic(&doc) {
                diagnostics.push(Diagnostic::for_file(
                    &rel,
                    DiagnosticKind::UnsupportedRoot {
                        tag: doc.root_tag().to_string(),
                    },
                ));
                continue;
            }
            if !doc.has_attr(doc.root(), ID_ATTR) {
                diagnostics.push(Diagnostic::for_file(&rel, DiagnosticKind::MissingTopicId));
            }
            diagnostics.extend(builder.add(&rel, &doc));
        }

        for diagnostic in &diagnostics {
            diagnostic.emit();
        }
        (builder.finish(), diagnostics)
    }

    /// Pass 2 for one document: run the configured passes, report leftover placeholders, and
    /// save the document if it changed and writing is enabled.
    pub fn process_document(&self, path: &Path, catalog: &IdCatalog) -> ProcessResult {
        let rel = self.relative(path);
        let abs = self.absolute(path);
        let mut result = ProcessResult {
            path: rel.clone(),
            modified: false,
            written: false,
            diagnostics: Vec::new(),
        };

        match Document::from_file(&abs) {
            Ok(mut doc) => {
                let ctx = PassContext {
                    path: &rel,
                    catalog,
                };
                result.modified = run_passes(&self.passes, &mut doc, &ctx, &mut result.diagnostics);
                result.diagnostics.extend(report_problems(&doc, &rel));

                if result.modified && self.write {
                    match doc.write_to(&abs) {
                        Ok(()) => result.written = true,
                        Err(e) => result.diagnostics.push(Diagnostic::for_file(
                            &rel,
                            DiagnosticKind::WriteFailed {
                                message: e.to_string(),
                            },
                        )),
                    }
                }
            }
            Err(e) => result.diagnostics.push(load_failure(&rel, e)),
        }

        for diagnostic in &result.diagnostics {
            diagnostic.emit();
        }
        result
    }

    /// Discover the corpus, build the catalog, then process every document that could be
    /// parsed in pass 1.
    pub fn run(&self) -> Result<CorpusReport, CleanupError> {
        let paths = self.discover()?;
        tracing::info!("Found {} documents under {:?}", paths.len(), self.root);

        let (catalog, catalog_diagnostics) = self.build_catalog(&paths);
        tracing::info!("Catalog holds {} identifiers", catalog.len());

        let unreadable: BTreeSet<&Path> = catalog_diagnostics
            .iter()
            .filter(|d| matches!(d.kind, DiagnosticKind::MalformedMarkup { .. }))
            .filter_map(|d| d.path.as_deref())
            .collect();

        let results: Vec<ProcessResult> = paths
            .iter()
            .filter(|path| !unreadable.contains(self.relative(path).as_path()))
            .map(|path| self.process_document(path, &catalog))
            .collect();

        let report = CorpusReport {
            root: self.root.clone(),
            documents: paths.len(),
            catalog_size: catalog.len(),
            catalog_diagnostics,
            results,
        };
        tracing::info!(
            "Processed {} documents: {} modified, {} written, {} diagnostics",
            report.results.len(),
            report.modified(),
            report.written(),
            report.diagnostics().count()
        );
        Ok(report)
    }
}

fn load_failure(rel: &Path, e: CleanupError) -> Diagnostic {
    match e {
        CleanupError::Malformed(message) => Diagnostic::malformed(Some(rel), message),
        other => Diagnostic::malformed(Some(rel), other.to_string()),
    }
}
