//! Arena-backed markup tree.
//!
//! All nodes of one resolution live in a single [`Tree`] and refer to each
//! other through [`NodeId`] handles. Parent, child and sibling links are plain
//! optional handles, so splicing never fights the borrow checker and stays
//! O(1) in the number of links touched.

use std::fmt;

/// Stable handle to a node inside a [`Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single `key="value"` pair on an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// What kind of node this is, together with its static payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    /// Root of a whole parsed document
    Document,
    /// Element with a lowercase tag name and attributes with unique keys
    Element {
        name: String,
        attrs: Vec<Attribute>,
    },
    Text(String),
    Comment(String),
}

/// A node together with its position in the tree.
#[derive(Clone, Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Node {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.data, NodeData::Comment(_))
    }

    /// Tag name for elements, `None` for everything else.
    pub fn tag_name(&self) -> Option<&str> {
        match &self.data {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Value of the attribute, if this is an element carrying it.
    pub fn attr(&self, attr_name: &str) -> Option<&str> {
        match &self.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|attr| attr.name == attr_name)
                .map(|attr| attr.value.as_str()),
            _ => None,
        }
    }

    pub fn has_attr(&self, attr_name: &str) -> bool {
        self.attr(attr_name).is_some()
    }

    /// Set an attribute, replacing an existing value or appending a new pair.
    /// Non-element nodes are left alone.
    pub fn set_attr(&mut self, attr_name: &str, attr_value: impl Into<String>) {
        if let NodeData::Element { attrs, .. } = &mut self.data {
            let attr_value = attr_value.into();
            match attrs.iter_mut().find(|attr| attr.name == attr_name) {
                Some(attr) => attr.value = attr_value,
                None => attrs.push(Attribute::new(attr_name, attr_value)),
            }
        }
    }

    /// Remove every attribute with the given name.
    pub fn remove_attr(&mut self, attr_name: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.data {
            attrs.retain(|attr| attr.name != attr_name);
        }
    }

    pub fn attrs(&self) -> &[Attribute] {
        match &self.data {
            NodeData::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }
}

/// Arena owning every node of one document tree (and any fragments spliced
/// into it).
///
/// The arena only grows. Removed and displaced nodes stay allocated, unlinked,
/// until the whole `Tree` is dropped, so use one `Tree` per resolution.
#[derive(Clone, Debug, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Tree::default()
    }

    /// Number of nodes ever allocated, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Allocate a detached node.
    pub fn create(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    pub fn create_document(&mut self) -> NodeId {
        self.create(NodeData::Document)
    }

    pub fn create_element(&mut self, name: impl Into<String>, attrs: Vec<Attribute>) -> NodeId {
        self.create(NodeData::Element {
            name: name.into(),
            attrs,
        })
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.create(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.create(NodeData::Comment(text.into()))
    }

    /// `<script>content</script>`
    pub fn create_script(&mut self, content: &str) -> NodeId {
        let script = self.create_element("script", Vec::new());
        let text = self.create_text(content);
        self.append_child(script, text);
        script
    }

    /// `<script src="..."></script>`
    pub fn create_external_script(&mut self, src: &str) -> NodeId {
        self.create_element("script", vec![Attribute::new("src", src)])
    }

    /// `<style>content</style>`
    pub fn create_style(&mut self, content: &str) -> NodeId {
        let style = self.create_element("style", Vec::new());
        let text = self.create_text(content);
        self.append_child(style, text);
        style
    }

    /// Append a detached node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is a text or comment node, or if `child` is still
    /// linked somewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        assert!(
            !self.node(parent).is_text() && !self.node(parent).is_comment(),
            "text and comment nodes cannot have children"
        );
        {
            let node = self.node(child);
            assert!(
                node.parent.is_none() && node.prev_sibling.is_none() && node.next_sibling.is_none(),
                "node {child} is still attached"
            );
        }

        let last = self.node(parent).last_child;
        {
            let node = self.node_mut(child);
            node.parent = Some(parent);
            node.prev_sibling = last;
        }
        match last {
            Some(last) => self.node_mut(last).next_sibling = Some(child),
            None => self.node_mut(parent).first_child = Some(child),
        }
        self.node_mut(parent).last_child = Some(child);
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    /// Iterate the direct children of a node in order.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.first_child(id),
        }
    }

    /// Pre-order iterator over the descendants of `id`, `id` itself excluded.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root: id,
            next: self.first_child(id),
        }
    }

    /// Content of the text node that is the first child of `id`.
    ///
    /// Returns `None` when there is no first child or it is not a text node.
    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        let child = self.first_child(id)?;
        match &self.node(child).data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Replace the content of the first text child of `id`, creating one when
    /// the element has no children yet.
    ///
    /// # Panics
    ///
    /// Panics if `id` already has a first child that is not a text node.
    pub fn set_text_content(&mut self, id: NodeId, content: impl Into<String>) {
        let content = content.into();
        match self.first_child(id) {
            Some(child) => match &mut self.node_mut(child).data {
                NodeData::Text(text) => *text = content,
                other => panic!("first child of {id} is not a text node: {other:?}"),
            },
            None => {
                let text = self.create_text(content);
                self.append_child(id, text);
            }
        }
    }
}

/// Iterator over the children of a node.
pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}

/// Pre-order, depth-first iterator over the descendants of a node.
pub struct Descendants<'a> {
    tree: &'a Tree,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;

        self.next = match self.tree.first_child(current) {
            Some(child) => Some(child),
            None => {
                // climb until a node with a next sibling, stopping at the root
                let mut cursor = current;
                loop {
                    if cursor == self.root {
                        break None;
                    }
                    if let Some(sibling) = self.tree.next_sibling(cursor) {
                        break Some(sibling);
                    }
                    match self.tree.parent(cursor) {
                        Some(parent) if parent != self.root => cursor = parent,
                        _ => break None,
                    }
                }
            }
        };

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Tree, NodeId) {
        // <div><p>one</p><!--c--><span><b></b></span></div>
        let mut tree = Tree::new();
        let div = tree.create_element("div", vec![]);
        let p = tree.create_element("p", vec![Attribute::new("class", "lead")]);
        let one = tree.create_text("one");
        let comment = tree.create_comment("c");
        let span = tree.create_element("span", vec![]);
        let b = tree.create_element("b", vec![]);
        tree.append_child(div, p);
        tree.append_child(p, one);
        tree.append_child(div, comment);
        tree.append_child(div, span);
        tree.append_child(span, b);
        (tree, div)
    }

    fn tags(tree: &Tree, ids: impl Iterator<Item = NodeId>) -> Vec<String> {
        ids.map(|id| match &tree.node(id).data {
            NodeData::Element { name, .. } => name.clone(),
            NodeData::Text(text) => format!("'{text}'"),
            NodeData::Comment(_) => "!".to_string(),
            NodeData::Document => "#document".to_string(),
        })
        .collect()
    }

    #[test]
    fn test_append_child_links_siblings() {
        let (tree, div) = sample();
        let children: Vec<_> = tree.children(div).collect();
        assert_eq!(children.len(), 3);
        assert_eq!(tree.first_child(div), Some(children[0]));
        assert_eq!(tree.last_child(div), Some(children[2]));
        assert_eq!(tree.next_sibling(children[0]), Some(children[1]));
        assert_eq!(tree.prev_sibling(children[1]), Some(children[0]));
        assert_eq!(tree.prev_sibling(children[0]), None);
        assert_eq!(tree.next_sibling(children[2]), None);
        for child in children {
            assert_eq!(tree.parent(child), Some(div));
        }
    }

    #[test]
    fn test_descendants_pre_order_excludes_root() {
        let (tree, div) = sample();
        assert_eq!(
            tags(&tree, tree.descendants(div)),
            vec!["p", "'one'", "!", "span", "b"]
        );
    }

    #[test]
    fn test_descendants_of_subtree_stop_at_subtree() {
        let (tree, div) = sample();
        let p = tree.first_child(div).unwrap();
        assert_eq!(tags(&tree, tree.descendants(p)), vec!["'one'"]);
    }

    #[test]
    fn test_descendants_of_leaf_is_empty() {
        let mut tree = Tree::new();
        let text = tree.create_text("x");
        assert_eq!(tree.descendants(text).count(), 0);
    }

    #[test]
    fn test_attrs() {
        let (mut tree, div) = sample();
        let p = tree.first_child(div).unwrap();
        assert_eq!(tree.node(p).attr("class"), Some("lead"));
        assert!(!tree.node(p).has_attr("id"));

        tree.node_mut(p).set_attr("class", "tail");
        tree.node_mut(p).set_attr("id", "x");
        assert_eq!(tree.node(p).attr("class"), Some("tail"));
        assert_eq!(tree.node(p).attrs().len(), 2);

        tree.node_mut(p).remove_attr("class");
        assert_eq!(tree.node(p).attr("class"), None);
        assert_eq!(tree.node(p).attrs(), &[Attribute::new("id", "x")]);
    }

    #[test]
    fn test_factories() {
        let mut tree = Tree::new();
        let script = tree.create_script("go();");
        assert_eq!(tree.node(script).tag_name(), Some("script"));
        assert_eq!(tree.text_content(script), Some("go();"));
        assert_eq!(tree.parent(script), None);
        assert_eq!(tree.next_sibling(script), None);

        let external = tree.create_external_script("app.js");
        assert_eq!(tree.node(external).attr("src"), Some("app.js"));
        assert_eq!(tree.first_child(external), None);

        let style = tree.create_style("a{}");
        assert_eq!(tree.node(style).tag_name(), Some("style"));
        assert_eq!(tree.text_content(style), Some("a{}"));
    }

    #[test]
    fn test_text_content_without_text_child() {
        let (mut tree, div) = sample();
        assert_eq!(tree.text_content(div), None);

        let empty = tree.create_element("script", vec![]);
        assert_eq!(tree.text_content(empty), None);
        tree.set_text_content(empty, "late");
        assert_eq!(tree.text_content(empty), Some("late"));
        tree.set_text_content(empty, "later");
        assert_eq!(tree.text_content(empty), Some("later"));
        assert_eq!(tree.children(empty).count(), 1);
    }

    #[test]
    #[should_panic(expected = "not a text node")]
    fn test_set_text_content_rejects_element_child() {
        let (mut tree, div) = sample();
        tree.set_text_content(div, "nope");
    }

    #[test]
    #[should_panic(expected = "cannot have children")]
    fn test_text_cannot_have_children() {
        let mut tree = Tree::new();
        let text = tree.create_text("x");
        let b = tree.create_element("b", vec![]);
        tree.append_child(text, b);
    }
}
