use html5ever::tendril::TendrilSink;
use html5ever::{namespace_url, ns, parse_document, parse_fragment, LocalName, QualName};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::dom::{Attribute, Fragment, NodeData, NodeId, Tree};

/// 将 HTML 文本解析为完整文档的 DOM
pub fn html_to_dom(input: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(input)
}

/// 在给定上下文元素中将 HTML 文本解析为片段
///
/// The tree builder picks its insertion mode from `context_name`, so e.g. a
/// `<div>` imported into `<head>` is still kept as a `<div>`.
pub fn html_fragment_to_dom(input: &str, context_name: &str) -> RcDom {
    let context = QualName::new(None, ns!(html), LocalName::from(context_name));
    parse_fragment(RcDom::default(), Default::default(), context, vec![]).one(input)
}

/// Copy a parsed document into the arena as a single `Document` node.
/// The doctype is dropped; the serializer writes its own.
pub fn import_document(tree: &mut Tree, dom: &RcDom) -> Fragment {
    let document = tree.create_document();
    for child in dom.document.children.borrow().iter() {
        if let Some(id) = import_handle(tree, child) {
            tree.append_child(document, id);
        }
    }
    Fragment::from_node(document)
}

/// Copy a parsed fragment into the arena as a run of detached siblings.
pub fn import_fragment(tree: &mut Tree, dom: &RcDom) -> Fragment {
    let mut fragment = Fragment::empty();

    // html5ever wraps fragment results in a synthetic <html> element
    let root = dom.document.children.borrow().first().cloned();
    if let Some(root) = root {
        for child in root.children.borrow().iter() {
            if let Some(id) = import_handle(tree, child) {
                fragment.push(tree, id);
            }
        }
    }

    fragment
}

/// Recursively copy one rcdom node and its subtree. Doctypes and processing
/// instructions have no arena counterpart and yield `None`.
fn import_handle(tree: &mut Tree, handle: &Handle) -> Option<NodeId> {
    let id = match &handle.data {
        RcNodeData::Document => tree.create_document(),
        RcNodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| {
                    let name = match &attr.name.prefix {
                        Some(prefix) => format!("{}:{}", prefix, attr.name.local),
                        None => attr.name.local.to_string(),
                    };
                    Attribute::new(name, attr.value.to_string())
                })
                .collect();
            let id = tree.create(NodeData::Element {
                name: name.local.to_string(),
                attrs,
            });

            // <template> keeps its markup in a separate document fragment
            if let Some(contents) = template_contents.borrow().as_ref() {
                for child in contents.children.borrow().iter() {
                    if let Some(child_id) = import_handle(tree, child) {
                        tree.append_child(id, child_id);
                    }
                }
            }

            id
        }
        RcNodeData::Text { contents } => return Some(tree.create_text(contents.borrow().to_string())),
        RcNodeData::Comment { contents } => return Some(tree.create_comment(contents.to_string())),
        RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => return None,
    };

    for child in handle.children.borrow().iter() {
        if let Some(child_id) = import_handle(tree, child) {
            tree.append_child(id, child_id);
        }
    }

    Some(id)
}
