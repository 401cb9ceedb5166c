//! Inlining of local stylesheets and scripts.
//!
//! Runs after path rewriting, so every reference it sees is already relative
//! to the output directory.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::dom::predicate::{and, has_attr, has_tag, is_stylesheet};
use crate::dom::{Fragment, Tree};
use crate::error::{VulcanizeError, VulcanizeResult};
use crate::parsers::css::rewrite_css_urls;
use crate::utils::path::{is_relative_file, rebase_reference, reference_to_path, Exclusions};

/// Replaces `<link rel="stylesheet">` elements with `<style>` elements.
pub trait StyleInliner {
    fn inline_stylesheets(
        &self,
        tree: &mut Tree,
        fragment: &mut Fragment,
        output_dir: &Path,
        excluded: &Exclusions,
    ) -> VulcanizeResult<()>;
}

/// Reads stylesheets from disk, next to the output directory.
#[derive(Clone, Copy, Debug, Default)]
pub struct Inliner;

impl StyleInliner for Inliner {
    fn inline_stylesheets(
        &self,
        tree: &mut Tree,
        fragment: &mut Fragment,
        output_dir: &Path,
        excluded: &Exclusions,
    ) -> VulcanizeResult<()> {
        let sheets = fragment.search(tree, &and(is_stylesheet(), has_attr("href")));

        for link in sheets {
            let href = match tree.node(link).attr("href") {
                Some(href) if is_inlinable(href, excluded) => href.to_string(),
                _ => continue,
            };

            let path = reference_to_path(output_dir, &href);
            let css = fs::read_to_string(&path).map_err(|e| VulcanizeError::io(&path, e))?;
            let css_dir = path.parent().unwrap_or(output_dir);
            let css = rewrite_css_urls(&css, |url| rebase_reference(url, css_dir, output_dir));

            let style = tree.create_style(&css);
            if let Some(media) = tree.node(link).attr("media").map(str::to_owned) {
                tree.node_mut(style).set_attr("media", media);
            }

            debug!("inlined stylesheet {}", path.display());
            tree.replace_with_node(fragment, link, style);
        }

        Ok(())
    }
}

/// Replace `<script src>` elements pointing at local files with inline
/// scripts carrying the same remaining attributes.
pub fn inline_scripts(
    tree: &mut Tree,
    fragment: &mut Fragment,
    output_dir: &Path,
    excluded: &Exclusions,
) -> VulcanizeResult<()> {
    let scripts = fragment.search(tree, &and(has_tag("script"), has_attr("src")));

    for script in scripts {
        let src = match tree.node(script).attr("src") {
            Some(src) if is_inlinable(src, excluded) => src.to_string(),
            _ => continue,
        };

        let path = reference_to_path(output_dir, &src);
        let content = fs::read_to_string(&path).map_err(|e| VulcanizeError::io(&path, e))?;

        // the HTML tokenizer would end the element at the first "</script"
        let inline = tree.create_script(&content.replace("</script", "<\\/script"));
        let attrs: Vec<_> = tree
            .node(script)
            .attrs()
            .iter()
            .filter(|attr| attr.name != "src")
            .cloned()
            .collect();
        for attr in attrs {
            tree.node_mut(inline).set_attr(&attr.name, attr.value);
        }

        debug!("inlined script {}", path.display());
        tree.replace_with_node(fragment, script, inline);
    }

    Ok(())
}

fn is_inlinable(reference: &str, excluded: &Exclusions) -> bool {
    if !is_relative_file(reference) {
        return false;
    }
    if excluded.is_excluded(reference) {
        debug!("skipping excluded reference {}", reference);
        return false;
    }
    true
}
