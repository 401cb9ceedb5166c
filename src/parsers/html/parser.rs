//! Loading HTML files into the arena.
//!
//! The importer does not care how markup becomes nodes; it only needs a
//! [`Loader`]. [`HtmlLoader`] is the html5ever-backed implementation used by
//! the binary.

use std::fs;
use std::path::Path;

use crate::dom::{Fragment, NodeId, Tree};
use crate::error::{VulcanizeError, VulcanizeResult};

use super::dom::{html_fragment_to_dom, html_to_dom, import_document, import_fragment};

/// Parses a file into nodes allocated in `tree`.
pub trait Loader {
    /// Parse `path`. Without a `context` the file is a whole document; with
    /// one it is parsed as a fragment destined to live under that node.
    fn load(&self, tree: &mut Tree, path: &Path, context: Option<NodeId>)
        -> VulcanizeResult<Fragment>;
}

/// Reads UTF-8 files from disk and parses them with html5ever.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlLoader;

impl HtmlLoader {
    pub fn new() -> Self {
        HtmlLoader
    }

    /// Parse markup that is already in memory.
    pub fn parse_str(&self, tree: &mut Tree, input: &str, context: Option<NodeId>) -> Fragment {
        let context_name = context.and_then(|id| tree.node(id).tag_name().map(str::to_owned));

        match context_name {
            Some(name) => import_fragment(tree, &html_fragment_to_dom(input, &name)),
            None => import_document(tree, &html_to_dom(input)),
        }
    }
}

impl Loader for HtmlLoader {
    fn load(
        &self,
        tree: &mut Tree,
        path: &Path,
        context: Option<NodeId>,
    ) -> VulcanizeResult<Fragment> {
        let data = fs::read(path).map_err(|e| VulcanizeError::io(path, e))?;
        let input = String::from_utf8(data).map_err(|e| VulcanizeError::parse(path, e.to_string()))?;

        Ok(self.parse_str(tree, &input, context))
    }
}
