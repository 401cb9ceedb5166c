//! Recursive HTML import resolution.
//!
//! [`Importer::flatten`] loads a file, finds its `<link rel="import">`
//! elements and replaces each one with the flattened contents of the file it
//! references. Every file is inlined at most once per resolution.
//!
//! # Cycles
//!
//! A file is marked as read as soon as it has been loaded, before any of its
//! own imports are followed. A second reference to a file that is already read
//! (a duplicate, or a cycle back to an ancestor such as `a.html -> b.html ->
//! a.html`) is removed from the tree and never expanded again. Cycles are not
//! an error.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::dom::predicate::is_import;
use crate::dom::{Fragment, NodeId, Tree};
use crate::error::{VulcanizeError, VulcanizeResult};
use crate::inliner::{Inliner, StyleInliner};
use crate::parsers::html::{HtmlLoader, Loader};
use crate::utils::path::{is_relative_file, reference_to_path, Exclusions, PathRewriter, RelativePaths};

/// Resolver state for a single top-level resolution.
///
/// The `read` set is shared by every recursive `flatten` call made through
/// this instance and is never cleared. Use a fresh `Importer` per document.
pub struct Importer {
    read: HashSet<PathBuf>,
    excluded_imports: Exclusions,
    excluded_styles: Exclusions,
    output_dir: PathBuf,
    loader: Box<dyn Loader>,
    rewriter: Box<dyn PathRewriter>,
    inliner: Box<dyn StyleInliner>,
}

impl Importer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Importer {
            read: HashSet::new(),
            excluded_imports: Exclusions::default(),
            excluded_styles: Exclusions::default(),
            output_dir: output_dir.into(),
            loader: Box::new(HtmlLoader::new()),
            rewriter: Box::new(RelativePaths),
            inliner: Box::new(Inliner),
        }
    }

    pub fn with_excluded_imports(mut self, excluded: Exclusions) -> Self {
        self.excluded_imports = excluded;
        self
    }

    pub fn with_excluded_styles(mut self, excluded: Exclusions) -> Self {
        self.excluded_styles = excluded;
        self
    }

    pub fn with_loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn with_rewriter(mut self, rewriter: impl PathRewriter + 'static) -> Self {
        self.rewriter = Box::new(rewriter);
        self
    }

    pub fn with_inliner(mut self, inliner: impl StyleInliner + 'static) -> Self {
        self.inliner = Box::new(inliner);
        self
    }

    /// Canonical paths of every file loaded so far.
    pub fn read(&self) -> &HashSet<PathBuf> {
        &self.read
    }

    /// Load `path` and recursively replace its imports with their contents.
    ///
    /// `context` is the element the result will be inserted under; `None`
    /// parses `path` as a whole document. Any load failure, however deep,
    /// aborts the whole resolution.
    pub fn flatten(
        &mut self,
        tree: &mut Tree,
        path: &Path,
        context: Option<NodeId>,
    ) -> VulcanizeResult<Fragment> {
        let path = fs::canonicalize(path).map_err(|e| VulcanizeError::io(path, e))?;
        let mut fragment = self.load(tree, &path, context)?;

        let dir = path.parent().unwrap_or(Path::new("/"));
        self.process_imports(tree, &mut fragment, dir, context)?;

        Ok(fragment)
    }

    fn load(
        &mut self,
        tree: &mut Tree,
        path: &Path,
        context: Option<NodeId>,
    ) -> VulcanizeResult<Fragment> {
        debug!("loading {}", path.display());

        let mut fragment = self.loader.load(tree, path, context)?;
        let source_dir = path.parent().unwrap_or(Path::new("/"));
        self.rewriter
            .rewrite(tree, fragment, source_dir, &self.output_dir);
        self.inliner.inline_stylesheets(
            tree,
            &mut fragment,
            &self.output_dir,
            &self.excluded_styles,
        )?;

        self.read.insert(path.to_path_buf());
        Ok(fragment)
    }

    fn process_imports(
        &mut self,
        tree: &mut Tree,
        fragment: &mut Fragment,
        dir: &Path,
        context: Option<NodeId>,
    ) -> VulcanizeResult<()> {
        let imports = fragment.search(tree, &is_import());

        for import in imports {
            let href = match tree.node(import).attr("href") {
                Some(href) => href.to_string(),
                None => continue,
            };
            if self.excluded_imports.is_excluded(&href) {
                debug!("skipping excluded import {}", href);
                continue;
            }
            if !is_relative_file(&href) {
                warn!("leaving non-local import {} in place", href);
                continue;
            }

            let target = reference_to_path(dir, &href);
            let target = fs::canonicalize(&target).map_err(|e| VulcanizeError::io(&target, e))?;

            if self.read.contains(&target) {
                debug!("dropping duplicate import {}", target.display());
                tree.remove(fragment, import);
                continue;
            }

            let import_context = tree.parent(import).or(context);
            let imported = self.flatten(tree, &target, import_context)?;
            tree.replace_with_fragment(fragment, import, imported);
        }

        Ok(())
    }
}
