//! Fragments and the splice primitives.
//!
//! A [`Fragment`] is a handle over a run of sibling nodes, either freshly
//! parsed (no parent) or already attached under one parent. All mutation of
//! a tree during vulcanization goes through [`Tree::remove`],
//! [`Tree::replace_with_node`] and [`Tree::replace_with_fragment`], which keep
//! sibling links symmetric and parent `first_child`/`last_child` pointers and
//! the host fragment's ends in sync.

use super::node::{NodeId, Tree};
use super::predicate::Predicate;

/// Handle over zero or more top-level sibling nodes.
///
/// `first` and `last` are both `None` exactly when the fragment is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fragment {
    pub first: Option<NodeId>,
    pub last: Option<NodeId>,
}

impl Fragment {
    pub fn empty() -> Self {
        Fragment::default()
    }

    /// Fragment wrapping a single node.
    pub fn from_node(id: NodeId) -> Self {
        Fragment {
            first: Some(id),
            last: Some(id),
        }
    }

    /// Fragment spanning every child of `parent`.
    pub fn children_of(tree: &Tree, parent: NodeId) -> Self {
        Fragment {
            first: tree.first_child(parent),
            last: tree.last_child(parent),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// Append a detached node after the last member of a detached fragment.
    ///
    /// # Panics
    ///
    /// Panics if `node` is still linked, or if the fragment is attached under
    /// a parent.
    pub fn push(&mut self, tree: &mut Tree, node: NodeId) {
        {
            let n = tree.node(node);
            assert!(
                n.parent.is_none() && n.prev_sibling.is_none() && n.next_sibling.is_none(),
                "node {node} is still attached"
            );
        }
        match self.last {
            Some(last) => {
                assert!(
                    tree.parent(last).is_none(),
                    "cannot push onto an attached fragment"
                );
                tree.node_mut(last).next_sibling = Some(node);
                tree.node_mut(node).prev_sibling = Some(last);
            }
            None => self.first = Some(node),
        }
        self.last = Some(node);
    }

    /// Number of top-level members, found by walking from `first` to `last`.
    pub fn len(&self, tree: &Tree) -> usize {
        self.nodes(tree).count()
    }

    /// Iterate the top-level members in order.
    pub fn nodes<'a>(&self, tree: &'a Tree) -> FragmentNodes<'a> {
        FragmentNodes {
            tree,
            next: self.first,
            last: self.last,
        }
    }

    /// Every member and every descendant of a member matching `predicate`, in
    /// document order.
    ///
    /// Unlike [`super::predicate::search`] the top-level members themselves
    /// are candidates too.
    pub fn search<P: Predicate + ?Sized>(&self, tree: &Tree, predicate: &P) -> Vec<NodeId> {
        let mut matches = Vec::new();
        for member in self.nodes(tree) {
            if predicate.test(tree.node(member)) {
                matches.push(member);
            }
            matches.extend(
                tree.descendants(member)
                    .filter(|&id| predicate.test(tree.node(id))),
            );
        }
        matches
    }
}

/// Iterator over the top-level members of a fragment.
pub struct FragmentNodes<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
    last: Option<NodeId>,
}

impl Iterator for FragmentNodes<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = if Some(current) == self.last {
            None
        } else {
            self.tree.next_sibling(current)
        };
        Some(current)
    }
}

impl Tree {
    /// Excise `node` from its sibling chain and detach it.
    ///
    /// Neighbours are linked around it, its parent's `first_child` and
    /// `last_child` are moved past it, and `host` is shrunk if `node` was one
    /// of its ends. Afterwards `node` has no parent and no siblings; its own
    /// subtree is kept.
    pub fn remove(&mut self, host: &mut Fragment, node: NodeId) {
        let (parent, prev, next) = {
            let n = self.node(node);
            (n.parent, n.prev_sibling, n.next_sibling)
        };

        if let Some(prev) = prev {
            self.node_mut(prev).next_sibling = next;
        }
        if let Some(next) = next {
            self.node_mut(next).prev_sibling = prev;
        }

        if let Some(parent) = parent {
            let p = self.node_mut(parent);
            if p.first_child == Some(node) {
                p.first_child = next;
            }
            if p.last_child == Some(node) {
                p.last_child = prev;
            }
        }

        if host.first == Some(node) && host.last == Some(node) {
            *host = Fragment::empty();
        } else if host.first == Some(node) {
            host.first = next;
        } else if host.last == Some(node) {
            host.last = prev;
        }

        self.detach_links(node);
    }

    /// Replace `node` with a single detached node.
    pub fn replace_with_node(&mut self, host: &mut Fragment, node: NodeId, new_node: NodeId) {
        self.replace_with_fragment(host, node, Fragment::from_node(new_node));
    }

    /// Splice the members of `fragment` into the position held by `node`.
    ///
    /// The members are reparented to `node`'s parent (or left parentless when
    /// `node` is a top-level fragment member), linked between `node`'s former
    /// neighbours, and become the parent's first/last child and the host's
    /// first/last node wherever `node` was. An empty `fragment` degrades to
    /// [`Tree::remove`]. `node` ends up fully detached.
    pub fn replace_with_fragment(&mut self, host: &mut Fragment, node: NodeId, fragment: Fragment) {
        let (first, last) = match (fragment.first, fragment.last) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                self.remove(host, node);
                return;
            }
        };

        let (parent, prev, next) = {
            let n = self.node(node);
            (n.parent, n.prev_sibling, n.next_sibling)
        };

        let members: Vec<NodeId> = fragment.nodes(self).collect();
        for member in members {
            self.node_mut(member).parent = parent;
        }

        self.node_mut(first).prev_sibling = prev;
        self.node_mut(last).next_sibling = next;
        if let Some(prev) = prev {
            self.node_mut(prev).next_sibling = Some(first);
        }
        if let Some(next) = next {
            self.node_mut(next).prev_sibling = Some(last);
        }

        if let Some(parent) = parent {
            let p = self.node_mut(parent);
            if p.first_child == Some(node) {
                p.first_child = Some(first);
            }
            if p.last_child == Some(node) {
                p.last_child = Some(last);
            }
        }

        if host.first == Some(node) {
            host.first = Some(first);
        }
        if host.last == Some(node) {
            host.last = Some(last);
        }

        self.detach_links(node);
    }

    fn detach_links(&mut self, node: NodeId) {
        let n = self.node_mut(node);
        n.parent = None;
        n.prev_sibling = None;
        n.next_sibling = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::NodeData;
    use crate::dom::predicate::has_tag;

    fn names(tree: &Tree, ids: impl Iterator<Item = NodeId>) -> Vec<String> {
        ids.map(|id| match &tree.node(id).data {
            NodeData::Element { name, .. } => name.clone(),
            NodeData::Text(text) => format!("'{text}'"),
            NodeData::Comment(_) => "!".to_string(),
            NodeData::Document => "#document".to_string(),
        })
        .collect()
    }

    /// Sibling symmetry and parent end pointers for every child list under
    /// `root`.
    fn assert_consistent(tree: &Tree, root: NodeId) {
        for parent in std::iter::once(root).chain(tree.descendants(root)) {
            let children: Vec<NodeId> = tree.children(parent).collect();
            assert_eq!(tree.first_child(parent), children.first().copied());
            assert_eq!(tree.last_child(parent), children.last().copied());
            for (i, &child) in children.iter().enumerate() {
                assert_eq!(tree.parent(child), Some(parent));
                let expected_prev = if i == 0 { None } else { Some(children[i - 1]) };
                assert_eq!(tree.prev_sibling(child), expected_prev);
            }
        }
    }

    fn detached_run(tree: &mut Tree, tags: &[&str]) -> Fragment {
        let mut fragment = Fragment::empty();
        for tag in tags {
            let el = tree.create_element(*tag, vec![]);
            fragment.push(tree, el);
        }
        fragment
    }

    fn parent_with(tree: &mut Tree, tags: &[&str]) -> (NodeId, Vec<NodeId>) {
        let parent = tree.create_element("body", vec![]);
        let children = tags
            .iter()
            .map(|tag| {
                let el = tree.create_element(*tag, vec![]);
                tree.append_child(parent, el);
                el
            })
            .collect();
        (parent, children)
    }

    #[test]
    fn test_fragment_nodes_stop_at_last() {
        let mut tree = Tree::new();
        let (parent, children) = parent_with(&mut tree, &["a", "b", "c", "d"]);
        let fragment = Fragment {
            first: Some(children[1]),
            last: Some(children[2]),
        };
        assert_eq!(names(&tree, fragment.nodes(&tree)), vec!["b", "c"]);
        assert_eq!(fragment.len(&tree), 2);
        assert_eq!(Fragment::children_of(&tree, parent).len(&tree), 4);
        assert_eq!(Fragment::empty().len(&tree), 0);
    }

    #[test]
    fn test_replace_middle_child_with_fragment() {
        let mut tree = Tree::new();
        let (parent, children) = parent_with(&mut tree, &["a", "link", "c"]);
        let replacement = detached_run(&mut tree, &["x", "y"]);
        let mut host = Fragment::from_node(parent);

        tree.replace_with_fragment(&mut host, children[1], replacement);

        assert_eq!(names(&tree, tree.children(parent)), vec!["a", "x", "y", "c"]);
        assert_consistent(&tree, parent);
        assert_eq!(tree.parent(children[1]), None);
        assert_eq!(tree.next_sibling(children[1]), None);
        assert_eq!(tree.prev_sibling(children[1]), None);
        assert_eq!(host, Fragment::from_node(parent));
    }

    #[test]
    fn test_replace_first_and_last_child_updates_parent_ends() {
        let mut tree = Tree::new();
        let (parent, children) = parent_with(&mut tree, &["a", "b", "c"]);
        let mut host = Fragment::from_node(parent);

        let front = detached_run(&mut tree, &["x", "y"]);
        tree.replace_with_fragment(&mut host, children[0], front);
        let back = detached_run(&mut tree, &["z"]);
        tree.replace_with_fragment(&mut host, children[2], back);

        assert_eq!(names(&tree, tree.children(parent)), vec!["x", "y", "b", "z"]);
        assert_consistent(&tree, parent);
    }

    #[test]
    fn test_replace_only_child() {
        let mut tree = Tree::new();
        let (parent, children) = parent_with(&mut tree, &["link"]);
        let replacement = detached_run(&mut tree, &["div"]);
        let mut host = Fragment::from_node(parent);

        tree.replace_with_fragment(&mut host, children[0], replacement);

        let div = replacement.first.unwrap();
        assert_eq!(tree.first_child(parent), Some(div));
        assert_eq!(tree.last_child(parent), Some(div));
        assert_consistent(&tree, parent);
    }

    #[test]
    fn test_replace_only_child_with_empty_fragment() {
        let mut tree = Tree::new();
        let (parent, children) = parent_with(&mut tree, &["link"]);
        let mut host = Fragment::from_node(parent);

        tree.replace_with_fragment(&mut host, children[0], Fragment::empty());

        assert_eq!(tree.first_child(parent), None);
        assert_eq!(tree.last_child(parent), None);
        assert_eq!(host, Fragment::from_node(parent));
    }

    #[test]
    fn test_empty_replace_matches_remove() {
        let mut removed = Tree::new();
        let (p1, c1) = parent_with(&mut removed, &["a", "b", "c"]);
        let mut host1 = Fragment::from_node(p1);
        removed.remove(&mut host1, c1[1]);

        let mut replaced = Tree::new();
        let (p2, c2) = parent_with(&mut replaced, &["a", "b", "c"]);
        let mut host2 = Fragment::from_node(p2);
        replaced.replace_with_fragment(&mut host2, c2[1], Fragment::empty());

        assert_eq!(
            names(&removed, removed.children(p1)),
            names(&replaced, replaced.children(p2))
        );
        assert_eq!(names(&removed, removed.children(p1)), vec!["a", "c"]);
        assert_consistent(&removed, p1);
        assert_consistent(&replaced, p2);
    }

    #[test]
    fn test_remove_fixes_parent_pointers() {
        let mut tree = Tree::new();
        let (parent, children) = parent_with(&mut tree, &["a", "b", "c"]);
        let mut host = Fragment::from_node(parent);

        tree.remove(&mut host, children[0]);
        assert_eq!(tree.first_child(parent), Some(children[1]));
        tree.remove(&mut host, children[2]);
        assert_eq!(tree.last_child(parent), Some(children[1]));
        assert_consistent(&tree, parent);

        tree.remove(&mut host, children[1]);
        assert_eq!(tree.first_child(parent), None);
        assert_eq!(tree.last_child(parent), None);
    }

    #[test]
    fn test_remove_top_level_members_shrinks_host() {
        let mut tree = Tree::new();
        let mut host = detached_run(&mut tree, &["a", "b", "c"]);
        let members: Vec<NodeId> = host.nodes(&tree).collect();

        tree.remove(&mut host, members[0]);
        assert_eq!(host.first, Some(members[1]));
        tree.remove(&mut host, members[2]);
        assert_eq!(host.last, Some(members[1]));
        assert_eq!(names(&tree, host.nodes(&tree)), vec!["b"]);

        tree.remove(&mut host, members[1]);
        assert!(host.is_empty());
        assert_eq!(host.last, None);
    }

    #[test]
    fn test_replace_sole_member_of_host() {
        let mut tree = Tree::new();
        let mut host = detached_run(&mut tree, &["link"]);
        let link = host.first.unwrap();
        let replacement = detached_run(&mut tree, &["x", "y"]);

        tree.replace_with_fragment(&mut host, link, replacement);

        assert_eq!(host, replacement);
        assert_eq!(names(&tree, host.nodes(&tree)), vec!["x", "y"]);
        for member in host.nodes(&tree) {
            assert_eq!(tree.parent(member), None);
        }

        let mut single = detached_run(&mut tree, &["link"]);
        let only = single.first.unwrap();
        tree.replace_with_fragment(&mut single, only, Fragment::empty());
        assert!(single.is_empty());
    }

    #[test]
    fn test_replace_with_node() {
        let mut tree = Tree::new();
        let (parent, children) = parent_with(&mut tree, &["a", "link", "c"]);
        let mut host = Fragment::from_node(parent);
        let style = tree.create_style("p{}");

        tree.replace_with_node(&mut host, children[1], style);

        assert_eq!(names(&tree, tree.children(parent)), vec!["a", "style", "c"]);
        assert_eq!(tree.text_content(style), Some("p{}"));
        assert_consistent(&tree, parent);
    }

    #[test]
    #[should_panic(expected = "attached fragment")]
    fn test_push_rejects_attached_fragment() {
        let mut tree = Tree::new();
        let (parent, _) = parent_with(&mut tree, &["a"]);
        let mut fragment = Fragment::children_of(&tree, parent);
        let b = tree.create_element("b", vec![]);
        fragment.push(&mut tree, b);
    }

    #[test]
    fn test_fragment_search_includes_members() {
        let mut tree = Tree::new();
        let fragment = detached_run(&mut tree, &["div", "span", "div"]);
        let members: Vec<NodeId> = fragment.nodes(&tree).collect();
        let inner = tree.create_element("div", vec![]);
        tree.append_child(members[1], inner);

        let found = fragment.search(&tree, &has_tag("div"));
        assert_eq!(found, vec![members[0], inner, members[2]]);
    }
}
