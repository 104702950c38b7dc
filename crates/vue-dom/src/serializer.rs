//! HTML serialization of a [`Document`] subtree.

use crate::ast::{Attribute, Document, NodeData, NodeId};
use crate::parser::{is_raw_text_element, is_void_element};

impl Document {
    /// Serialize the node itself and its descendants.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, false, &mut out);
        out
    }

    /// Serialize the children of a node.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        let raw = self.tag_name(id).is_some_and(is_raw_text_element);
        for &child in self.children(id) {
            self.write_node(child, raw, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, raw_parent: bool, out: &mut String) {
        match self.data(id) {
            NodeData::Document => out.push_str(&self.inner_html(id)),
            NodeData::Text(text) if raw_parent => out.push_str(text),
            NodeData::Text(text) => write_escaped_text(text, out),
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for attr in &el.attrs {
                    write_attribute(attr, out);
                }
                out.push('>');
                if is_void_element(&el.tag) {
                    return;
                }
                out.push_str(&self.inner_html(id));
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }
}

fn write_escaped_text(text: &str, out: &mut String) {
    let escaped = htmlize::escape_text(text);
    out.push_str(&escaped.replace('\u{a0}', "&nbsp;"));
}

/// Attribute values are delimited with `"` unless the value contains `"` but
/// no `'`, in which case `'` is used and the value is written unchanged.
fn write_attribute(attr: &Attribute, out: &mut String) {
    out.push(' ');
    out.push_str(&attr.name);
    let Some(value) = attr.value.as_deref() else {
        return;
    };
    let value = value.replace('&', "&amp;");
    if value.contains('"') && !value.contains('\'') {
        out.push_str("='");
        out.push_str(&value);
        out.push('\'');
    } else {
        out.push_str("=\"");
        out.push_str(&value.replace('"', "&quot;"));
        out.push('"');
    }
}
