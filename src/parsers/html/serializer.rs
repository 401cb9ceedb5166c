use std::io;

use html5ever::serialize::{serialize, Serialize, SerializeOpts, Serializer, TraversalScope};
use html5ever::{namespace_url, ns, LocalName, QualName};

use crate::dom::{Fragment, NodeData, NodeId, Tree};

const DOCTYPE: &str = "<!doctype html>";

/// A fragment that html5ever's serializer can walk.
pub struct SerializableFragment<'a> {
    tree: &'a Tree,
    fragment: Fragment,
}

impl<'a> SerializableFragment<'a> {
    pub fn new(tree: &'a Tree, fragment: Fragment) -> Self {
        SerializableFragment { tree, fragment }
    }

    fn serialize_node<S: Serializer>(&self, serializer: &mut S, id: NodeId) -> io::Result<()> {
        match &self.tree.node(id).data {
            NodeData::Document => self.serialize_children(serializer, id),
            NodeData::Element { name, attrs } => {
                let name = QualName::new(None, ns!(html), LocalName::from(name.as_str()));
                let attrs: Vec<(QualName, &str)> = attrs
                    .iter()
                    .map(|attr| {
                        (
                            QualName::new(None, ns!(), LocalName::from(attr.name.as_str())),
                            attr.value.as_str(),
                        )
                    })
                    .collect();

                serializer.start_elem(
                    name.clone(),
                    attrs.iter().map(|(name, value)| (name, *value)),
                )?;
                self.serialize_children(serializer, id)?;
                serializer.end_elem(name)
            }
            NodeData::Text(text) => serializer.write_text(text),
            NodeData::Comment(text) => serializer.write_comment(text),
        }
    }

    fn serialize_children<S: Serializer>(&self, serializer: &mut S, id: NodeId) -> io::Result<()> {
        for child in self.tree.children(id) {
            self.serialize_node(serializer, child)?;
        }
        Ok(())
    }
}

impl Serialize for SerializableFragment<'_> {
    fn serialize<S>(&self, serializer: &mut S, _traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        for member in self.fragment.nodes(self.tree) {
            self.serialize_node(serializer, member)?;
        }
        Ok(())
    }
}

/// 将片段序列化为 HTML 文本
pub fn serialize_fragment(tree: &Tree, fragment: Fragment) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let serializable = SerializableFragment::new(tree, fragment);

    serialize(&mut buf, &serializable, SerializeOpts::default())
        .expect("Unable to serialize DOM into buffer");

    String::from_utf8_lossy(&buf).into_owned()
}

/// 序列化文档，并在开头加上 doctype
pub fn serialize_document(tree: &Tree, fragment: Fragment) -> String {
    let mut output = String::from(DOCTYPE);
    output.push_str(&serialize_fragment(tree, fragment));
    output
}
