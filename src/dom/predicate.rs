//! Node predicates and tree search.
//!
//! A predicate is any `Fn(&Node) -> bool`. Leaf predicates look at one node's
//! tag name and attributes; combinators build bigger tests out of smaller
//! ones. [`search`] and [`closest`] are how every mutation site picks its
//! targets: collect matches first, mutate second.

use super::node::{Node, NodeId, Tree};

/// A pure boolean test over a single node.
pub trait Predicate {
    fn test(&self, node: &Node) -> bool;
}

impl<F> Predicate for F
where
    F: Fn(&Node) -> bool,
{
    fn test(&self, node: &Node) -> bool {
        self(node)
    }
}

/// Type-erased predicate, for building lists of mixed predicates.
pub type BoxedPredicate<'a> = Box<dyn Predicate + 'a>;

/// Element with the given (lowercase) tag name.
pub fn has_tag(tag_name: impl Into<String>) -> impl Predicate {
    let tag_name = tag_name.into();
    move |node: &Node| node.tag_name() == Some(tag_name.as_str())
}

/// Element carrying the attribute, whatever its value.
pub fn has_attr(attr_name: impl Into<String>) -> impl Predicate {
    let attr_name = attr_name.into();
    move |node: &Node| node.has_attr(&attr_name)
}

/// Element whose attribute equals `value` exactly.
pub fn has_attr_value(attr_name: impl Into<String>, value: impl Into<String>) -> impl Predicate {
    let attr_name = attr_name.into();
    let value = value.into();
    move |node: &Node| node.attr(&attr_name) == Some(value.as_str())
}

pub fn is_comment() -> impl Predicate {
    |node: &Node| node.is_comment()
}

/// `<link rel="import">`
pub fn is_import() -> impl Predicate {
    and(has_tag("link"), has_attr_value("rel", "import"))
}

/// `<link rel="stylesheet">`
pub fn is_stylesheet() -> impl Predicate {
    and(has_tag("link"), has_attr_value("rel", "stylesheet"))
}

/// Inline JavaScript: `script:not([src])` with no `type` or
/// `type="text/javascript"`.
pub fn is_inline_script() -> impl Predicate {
    let predicates: Vec<BoxedPredicate<'static>> = vec![
        Box::new(has_tag("script")),
        Box::new(not(has_attr("src"))),
        Box::new(or(not(has_attr("type")), has_attr_value("type", "text/javascript"))),
    ];
    all(predicates)
}

pub fn and<A: Predicate, B: Predicate>(a: A, b: B) -> impl Predicate {
    move |node: &Node| a.test(node) && b.test(node)
}

pub fn or<A: Predicate, B: Predicate>(a: A, b: B) -> impl Predicate {
    move |node: &Node| a.test(node) || b.test(node)
}

pub fn not<P: Predicate>(p: P) -> impl Predicate {
    move |node: &Node| !p.test(node)
}

/// Every predicate holds; true for an empty list.
pub fn all<'a>(predicates: Vec<BoxedPredicate<'a>>) -> impl Predicate + 'a {
    move |node: &Node| predicates.iter().all(|p| p.test(node))
}

/// At least one predicate holds; false for an empty list.
pub fn any<'a>(predicates: Vec<BoxedPredicate<'a>>) -> impl Predicate + 'a {
    move |node: &Node| predicates.iter().any(|p| p.test(node))
}

/// All descendants of `root` (not `root` itself) matching `predicate`, in
/// pre-order document order.
pub fn search<P: Predicate + ?Sized>(tree: &Tree, root: NodeId, predicate: &P) -> Vec<NodeId> {
    tree.descendants(root)
        .filter(|&id| predicate.test(tree.node(id)))
        .collect()
}

/// Nearest node matching `predicate`, starting at `node` itself and walking
/// up through its ancestors.
pub fn closest<P: Predicate + ?Sized>(tree: &Tree, node: NodeId, predicate: &P) -> Option<NodeId> {
    let mut cursor = Some(node);
    while let Some(id) = cursor {
        if predicate.test(tree.node(id)) {
            return Some(id);
        }
        cursor = tree.parent(id);
    }
    None
}
