//! Per-document rewriting passes.
//!
//! Each pass mutates one [`Document`] in place and reports whether it changed anything. The
//! passes only read the [`IdCatalog`], so any number of documents can be processed against the
//! same catalog.

use crate::{catalog::IdCatalog, config::CleanupConfig, diagnostic::Diagnostic, dom::Document};
use std::path::{Path, PathBuf};

pub mod attributes;
pub mod ids;
pub mod images;
pub mod includes;
pub mod problems;
pub mod xrefs;

pub use attributes::replace_attributes;
pub use ids::{prune_ids, sanitize_id};
pub use images::update_image_paths;
pub use includes::prune_includes;
pub use problems::{find_problems, report_problems};
pub use xrefs::update_xrefs;

/// Name part of a `{name}` placeholder.
pub const TOKEN_NAME: &str = "[0-9A-Za-z_][0-9A-Za-z_-]*";

/// What a pass knows about the document it is working on.
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    pub path: &'a Path,
    pub catalog: &'a IdCatalog,
}

pub trait DocumentPass: Send + Sync {
    fn name(&self) -> &'static str;

    /// Rewrite `doc` in place, appending anything worth reporting to `diagnostics`. Returns
    /// whether the tree changed.
    fn apply(
        &self,
        doc: &mut Document,
        ctx: &PassContext<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveXrefs;

impl DocumentPass for ResolveXrefs {
    fn name(&self) -> &'static str {
        "resolve_xrefs"
    }

    fn apply(
        &self,
        doc: &mut Document,
        ctx: &PassContext<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> bool {
        update_xrefs(doc, ctx.path, ctx.catalog, diagnostics)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PruneIds;

impl DocumentPass for PruneIds {
    fn name(&self) -> &'static str {
        "prune_ids"
    }

    fn apply(&self, doc: &mut Document, _: &PassContext<'_>, _: &mut Vec<Diagnostic>) -> bool {
        prune_ids(doc)
    }
}

#[derive(Debug, Clone)]
pub struct ReplaceAttributes {
    pub conref_prefix: String,
}

impl DocumentPass for ReplaceAttributes {
    fn name(&self) -> &'static str {
        "replace_attributes"
    }

    fn apply(&self, doc: &mut Document, _: &PassContext<'_>, _: &mut Vec<Diagnostic>) -> bool {
        replace_attributes(doc, &self.conref_prefix)
    }
}

#[derive(Debug, Clone)]
pub struct PruneIncludes {
    pub extension: String,
}

impl DocumentPass for PruneIncludes {
    fn name(&self) -> &'static str {
        "prune_includes"
    }

    fn apply(&self, doc: &mut Document, _: &PassContext<'_>, _: &mut Vec<Diagnostic>) -> bool {
        prune_includes(doc, &self.extension)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateImagePaths {
    /// Must share a base with the document paths handed to [`DocumentPass::apply`].
    pub images_dir: PathBuf,
}

impl DocumentPass for UpdateImagePaths {
    fn name(&self) -> &'static str {
        "update_image_paths"
    }

    fn apply(
        &self,
        doc: &mut Document,
        ctx: &PassContext<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> bool {
        update_image_paths(doc, ctx.path, &self.images_dir, diagnostics)
    }
}

/// The rewriting passes enabled by `config`, in execution order.
///
/// `images_dir` is the resolved images directory; image rewriting only runs when one is given.
pub fn pipeline(config: &CleanupConfig, images_dir: Option<PathBuf>) -> Vec<Box<dyn DocumentPass>> {
    let mut passes: Vec<Box<dyn DocumentPass>> = Vec::new();
    if config.fix_links {
        passes.push(Box::new(ResolveXrefs));
    }
    if config.prune_ids {
        passes.push(Box::new(PruneIds));
    }
    if let Some(prefix) = config.conref_prefix.as_ref().filter(|p| !p.is_empty()) {
        passes.push(Box::new(ReplaceAttributes {
            conref_prefix: prefix.clone(),
        }));
    }
    if config.prune_includes {
        passes.push(Box::new(PruneIncludes {
            extension: config.include_extension.clone(),
        }));
    }
    if let Some(images_dir) = images_dir {
        passes.push(Box::new(UpdateImagePaths { images_dir }));
    }
    passes
}

/// Run `passes` over `doc` in order. Returns whether any of them changed the tree.
pub fn run_passes(
    passes: &[Box<dyn DocumentPass>],
    doc: &mut Document,
    ctx: &PassContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let mut modified = false;
    for pass in passes {
        if pass.apply(doc, ctx, diagnostics) {
            tracing::debug!("[{}] modified {:?}", pass.name(), ctx.path);
            modified = true;
        }
    }
    modified
}
