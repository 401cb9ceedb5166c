//! Reference and path handling.
//!
//! Documents are read from one directory and written to another, so every
//! relative resource reference has to be rebased: resolved against the
//! directory of the file it appeared in, then expressed relative to the
//! output directory.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

use crate::dom::predicate::{any, has_attr, has_tag, is_import, BoxedPredicate, Predicate};
use crate::dom::{Fragment, Tree};
use crate::parsers::css::rewrite_css_urls;

/// Attributes holding a single URL.
pub const URL_ATTRS: &[&str] = &["action", "assetpath", "href", "src"];

/// A set of regular expressions matched against raw reference strings.
#[derive(Clone, Debug, Default)]
pub struct Exclusions {
    patterns: Vec<Regex>,
}

impl Exclusions {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Exclusions { patterns })
    }

    /// Whether any pattern matches somewhere in `reference`.
    pub fn is_excluded(&self, reference: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(reference))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// References with a scheme (`http:`, `data:`, ...) or protocol-relative ones.
pub fn is_remote(reference: &str) -> bool {
    reference.starts_with("//") || Url::parse(reference).is_ok()
}

/// Whether a reference points at a file relative to its document.
pub fn is_relative_file(reference: &str) -> bool {
    let reference = reference.trim();
    !(reference.is_empty()
        || reference.starts_with('#')
        || reference.starts_with('?')
        || reference.starts_with('/')
        || reference.contains("{{")
        || is_remote(reference))
}

/// Split `a/b.html?x#y` into `("a/b.html", "?x#y")`.
pub fn split_reference(reference: &str) -> (&str, &str) {
    match reference.find(['?', '#']) {
        Some(i) => reference.split_at(i),
        None => (reference, ""),
    }
}

/// `images/`, `.` and `..` name directories and must keep their trailing slash.
fn names_directory(path: &str) -> bool {
    path.ends_with('/') || matches!(path.rsplit('/').next(), Some(".") | Some(".."))
}

/// File a relative reference points to, seen from `base_dir`.
pub fn reference_to_path(base_dir: &Path, reference: &str) -> PathBuf {
    let (path, _) = split_reference(reference.trim());
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    path_clean::clean(base_dir.join(decoded.as_ref()))
}

/// `target` expressed as a URL reference relative to the directory `from_dir`.
pub fn relative_reference(from_dir: &Path, target: &Path) -> Option<String> {
    relative_url(from_dir, target, false)
}

fn relative_url(from_dir: &Path, target: &Path, directory: bool) -> Option<String> {
    let from_dir = path_clean::clean(std::path::absolute(from_dir).ok()?);
    let target = path_clean::clean(std::path::absolute(target).ok()?);

    let base = Url::from_directory_path(from_dir).ok()?;
    let target = if directory {
        Url::from_directory_path(target)
    } else {
        Url::from_file_path(target)
    }
    .ok()?;

    let relative = base.make_relative(&target)?;
    if relative.is_empty() {
        return Some("./".to_string());
    }
    Some(relative)
}

/// Rebase a reference written in a file under `source_dir` so that it works
/// from `output_dir`. Returns `None` for references that must stay as they
/// are.
pub fn rebase_reference(reference: &str, source_dir: &Path, output_dir: &Path) -> Option<String> {
    if !is_relative_file(reference) {
        return None;
    }

    let (path, suffix) = split_reference(reference.trim());
    let target = reference_to_path(source_dir, reference);
    let mut rebased = relative_url(output_dir, &target, names_directory(path))?;
    rebased.push_str(suffix);
    Some(rebased)
}

/// Rewrites resource references inside freshly loaded nodes.
pub trait PathRewriter {
    fn rewrite(&self, tree: &mut Tree, fragment: Fragment, source_dir: &Path, output_dir: &Path);
}

/// Rebases URL attributes, inline `style` attributes and `<style>` contents
/// from the source directory to the output directory.
///
/// Import links are skipped: the importer resolves them itself, and excluded
/// imports must come out exactly as they went in.
#[derive(Clone, Copy, Debug, Default)]
pub struct RelativePaths;

impl PathRewriter for RelativePaths {
    fn rewrite(&self, tree: &mut Tree, fragment: Fragment, source_dir: &Path, output_dir: &Path) {
        let mut predicates: Vec<BoxedPredicate> = URL_ATTRS
            .iter()
            .map(|name| Box::new(has_attr(*name)) as BoxedPredicate)
            .collect();
        predicates.push(Box::new(has_attr("style")));
        predicates.push(Box::new(has_tag("style")));
        let targets = fragment.search(tree, &any(predicates));

        let import = is_import();
        for id in targets {
            let node = tree.node(id);
            let skip_href = import.test(node);

            let mut updates: Vec<(&str, String)> = Vec::new();
            for &name in URL_ATTRS {
                if name == "href" && skip_href {
                    continue;
                }
                if let Some(value) = node.attr(name) {
                    if let Some(rebased) = rebase_reference(value, source_dir, output_dir) {
                        updates.push((name, rebased));
                    }
                }
            }
            if let Some(style) = node.attr("style") {
                let rebased = rewrite_css_urls(style, |url| {
                    rebase_reference(url, source_dir, output_dir)
                });
                if rebased != style {
                    updates.push(("style", rebased));
                }
            }

            let is_style_element = node.tag_name() == Some("style");
            for (name, value) in updates {
                tree.node_mut(id).set_attr(name, value);
            }

            if is_style_element {
                if let Some(css) = tree.text_content(id) {
                    let rebased = rewrite_css_urls(css, |url| {
                        rebase_reference(url, source_dir, output_dir)
                    });
                    tree.set_text_content(id, rebased);
                }
            }
        }
    }
}
