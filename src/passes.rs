//! Cleanup passes run on the flattened document.
//!
//! Each pass collects its targets with a predicate search first and only then
//! mutates the tree.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};
use url::Url;

use crate::dom::predicate::{and, any, closest, has_attr, has_tag, is_comment, is_import, is_inline_script};
use crate::dom::{BoxedPredicate, Fragment, Node, NodeData, Tree};
use crate::error::{VulcanizeError, VulcanizeResult};

/// An anonymous `Polymer(...)` call: group 1 is set when the call is already
/// named, group 2 is `{` or `)`.
static POLYMER_INVOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Polymer\(([^,{]+)?(?:,\s*)?(\{|\))").unwrap());

/// Import hrefs are compared as URLs resolved against this base.
static IMPORT_BASE: LazyLock<Url> = LazyLock::new(|| Url::parse("http://localhost/").unwrap());

/// Elements whose whitespace is significant.
const WHITESPACE_PRESERVING: &[&str] = &["pre", "textarea", "script", "style"];

/// Remove every `<link rel="import">` whose href was already seen earlier in
/// document order. Hrefs that do not parse as URLs are never duplicates.
pub fn deduplicate_imports(tree: &mut Tree, fragment: &mut Fragment) {
    let mut seen = HashSet::new();
    let duplicates: Vec<_> = fragment
        .search(tree, &and(is_import(), has_attr("href")))
        .into_iter()
        .filter(|&id| {
            let href = tree.node(id).attr("href").unwrap_or_default();
            match IMPORT_BASE.join(href) {
                Ok(url) => !seen.insert(url.to_string()),
                Err(_) => false,
            }
        })
        .collect();

    for id in duplicates {
        debug!(
            "removing duplicate import {}",
            tree.node(id).attr("href").unwrap_or_default()
        );
        tree.remove(fragment, id);
    }
}

fn is_whitespace_text(node: &Node) -> bool {
    matches!(&node.data, NodeData::Text(text) if text.trim().is_empty())
}

/// Remove all comments, plus whitespace-only text outside of elements where
/// whitespace matters.
pub fn strip_comments_and_whitespace(tree: &mut Tree, fragment: &mut Fragment) {
    let preserving: Vec<BoxedPredicate> = WHITESPACE_PRESERVING
        .iter()
        .map(|tag| Box::new(has_tag(*tag)) as BoxedPredicate)
        .collect();
    let preserving = any(preserving);

    let comments = fragment.search(tree, &is_comment());
    let whitespace: Vec<_> = fragment
        .search(tree, &is_whitespace_text)
        .into_iter()
        .filter(|&id| closest(tree, id, &preserving).is_none())
        .collect();

    debug!(
        "stripping {} comments and {} whitespace nodes",
        comments.len(),
        whitespace.len()
    );
    for id in comments.into_iter().chain(whitespace) {
        tree.remove(fragment, id);
    }
}

/// Give anonymous `Polymer()` calls inside a `<polymer-element>` the
/// element's name.
pub fn use_named_polymer_invocations(tree: &mut Tree, fragment: &Fragment) {
    let scripts = fragment.search(tree, &is_inline_script());
    let polymer_element = has_tag("polymer-element");

    for script in scripts {
        let Some(element) = closest(tree, script, &polymer_element) else {
            continue;
        };
        let Some(content) = tree.text_content(script) else {
            continue;
        };
        let Some(caps) = POLYMER_INVOCATION.captures(content) else {
            continue;
        };
        if caps.get(1).is_some_and(|name| !name.as_str().is_empty()) {
            continue;
        }
        let Some(name) = tree.node(element).attr("name") else {
            warn!("polymer-element without a name, leaving invocation anonymous");
            continue;
        };

        let invocation = match &caps[2] {
            "{" => format!("Polymer('{name}',{{"),
            _ => format!("Polymer('{name}')"),
        };
        debug!("{} -> {}", &caps[0], invocation);
        let content = content.replacen(&caps[0], &invocation, 1);
        tree.set_text_content(script, content);
    }
}

/// Replace the `noscript` attribute of `<polymer-element>`s with an explicit
/// registration script.
pub fn remove_noscript(tree: &mut Tree, fragment: &Fragment) {
    let elements = fragment.search(tree, &and(has_tag("polymer-element"), has_attr("noscript")));

    for element in elements {
        let Some(name) = tree.node(element).attr("name").map(str::to_owned) else {
            warn!("noscript polymer-element without a name, leaving it alone");
            continue;
        };

        debug!("injecting explicit Polymer invocation for noscript element {}", name);
        let script = tree.create_script(&format!("Polymer('{name}');"));
        tree.node_mut(element).remove_attr("noscript");
        tree.append_child(element, script);
    }
}

/// Move every inline script into `csp_file` and reference it from the end of
/// `<body>` instead.
pub fn separate_scripts(
    tree: &mut Tree,
    fragment: &mut Fragment,
    csp_file: &Path,
) -> VulcanizeResult<()> {
    let body = fragment
        .search(tree, &has_tag("body"))
        .first()
        .copied()
        .ok_or(VulcanizeError::MissingBody)?;

    let scripts = fragment.search(tree, &is_inline_script());
    let contents: Vec<String> = scripts
        .iter()
        .map(|&id| tree.text_content(id).unwrap_or_default().to_string())
        .collect();
    for &id in &scripts {
        tree.remove(fragment, id);
    }

    fs::write(csp_file, contents.join(";\n")).map_err(|e| VulcanizeError::write(csp_file, e))?;
    info!(
        "separated {} scripts into {}",
        scripts.len(),
        csp_file.display()
    );

    let basename = csp_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let script = tree.create_external_script(&basename);
    tree.append_child(body, script);

    Ok(())
}
