//! Arena-backed mutable document tree.
//!
//! Nodes live in a single `Vec` owned by [`Document`] and are addressed by
//! [`NodeId`]. Detached nodes stay in the arena; they simply have no parent.
//! This keeps ids stable while the compiler inserts, moves and removes
//! siblings during a walk.

use smol_str::SmolStr;

/// Handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// An attribute on an element. Names keep their source case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: SmolStr,
    /// `None` for attributes written without a value (`v-cloak`, `disabled`).
    pub value: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    pub fn bare(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// The value, with bare attributes reading as the empty string.
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Lowercased tag name.
    pub tag: SmolStr,
    pub attrs: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A mutable, parent-linked HTML tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element(ElementData {
            tag: SmolStr::new(tag.to_ascii_lowercase()),
            attrs: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Comment(text.into()))
    }

    // Structure

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Element children only, skipping text and comments.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    fn position(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.children(parent).iter().position(|&c| c == id)?;
        Some((parent, index))
    }

    /// Unlink a node from its parent. The subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some((parent, index)) = self.position(id) {
            self.nodes[parent.0].children.remove(index);
        }
        self.nodes[id.0].parent = None;
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `new` as the previous sibling of `reference`. Does nothing when
    /// `reference` is detached.
    pub fn insert_before(&mut self, reference: NodeId, new: NodeId) {
        self.detach(new);
        if let Some((parent, index)) = self.position(reference) {
            self.nodes[parent.0].children.insert(index, new);
            self.nodes[new.0].parent = Some(parent);
        }
    }

    /// Insert `new` as the next sibling of `reference`.
    pub fn insert_after(&mut self, reference: NodeId, new: NodeId) {
        self.detach(new);
        if let Some((parent, index)) = self.position(reference) {
            self.nodes[parent.0].children.insert(index + 1, new);
            self.nodes[new.0].parent = Some(parent);
        }
    }

    /// Put `new` where `old` is and detach `old`.
    pub fn replace_with(&mut self, old: NodeId, new: NodeId) {
        self.insert_before(old, new);
        self.detach(old);
    }

    pub fn remove_children(&mut self, id: NodeId) {
        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
    }

    /// Deep copy of a subtree. The copy is detached.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let data = self.nodes[id.0].data.clone();
        let copy = self.alloc(data);
        for child in self.nodes[id.0].children.clone() {
            let child_copy = self.clone_subtree(child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    // Elements

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.data(id), NodeData::Element(_))
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.data(id) {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        self.element(id).map(|el| el.attrs.as_slice()).unwrap_or(&[])
    }

    /// Attribute value by exact name. Bare attributes read as `""`.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.name == name)
            .map(Attribute::value)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attributes(id).iter().any(|a| a.name == name)
    }

    /// Set an attribute, replacing an existing one in place so attribute
    /// order is preserved.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(el) = self.element_mut(id) {
            match el.attrs.iter_mut().find(|a| a.name == name) {
                Some(attr) => attr.value = Some(value),
                None => el.attrs.push(Attribute::new(name, value)),
            }
        }
    }

    /// Append an attribute unless one with the same name exists. The first
    /// occurrence of a duplicated attribute wins, as in HTML.
    pub fn push_attribute(&mut self, id: NodeId, attr: Attribute) {
        if let Some(el) = self.element_mut(id) {
            if !el.attrs.iter().any(|a| a.name == attr.name) {
                el.attrs.push(attr);
            }
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.attrs.retain(|a| a.name != name);
        }
    }

    /// Remove every attribute whose name satisfies `pred`.
    pub fn retain_attributes<F>(&mut self, id: NodeId, mut pred: F)
    where
        F: FnMut(&Attribute) -> bool,
    {
        if let Some(el) = self.element_mut(id) {
            el.attrs.retain(|a| pred(a));
        }
    }

    // Character data

    /// Payload of a text or comment node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            NodeData::Text(t) | NodeData::Comment(t) => Some(t.as_str()),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let NodeData::Text(t) | NodeData::Comment(t) = &mut self.nodes[id.0].data {
            *t = text.into();
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            NodeData::Text(t) => out.push_str(t),
            NodeData::Comment(_) => {}
            _ => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let div = doc.create_element("DIV");
        let a = doc.create_text("a");
        let b = doc.create_text("b");
        let root = doc.root();
        doc.append_child(root, div);
        doc.append_child(div, a);
        doc.append_child(div, b);
        (doc, div, a, b)
    }

    #[test]
    fn test_tag_is_lowercased() {
        let (doc, div, _, _) = sample();
        assert_eq!(doc.tag_name(div), Some("div"));
    }

    #[test]
    fn test_insert_before_and_after() {
        let (mut doc, div, a, b) = sample();
        let open = doc.create_text("[");
        let close = doc.create_text("]");
        doc.insert_before(a, open);
        doc.insert_after(b, close);
        assert_eq!(doc.children(div), &[open, a, b, close]);
        assert_eq!(doc.parent(open), Some(div));
        assert_eq!(doc.text_content(div), "[ab]");
    }

    #[test]
    fn test_detach_and_replace() {
        let (mut doc, div, a, b) = sample();
        let c = doc.create_text("c");
        doc.replace_with(a, c);
        assert_eq!(doc.children(div), &[c, b]);
        assert_eq!(doc.parent(a), None);

        doc.detach(b);
        assert_eq!(doc.children(div), &[c]);
    }

    #[test]
    fn test_set_attribute_keeps_order() {
        let (mut doc, div, _, _) = sample();
        doc.set_attribute(div, "id", "x");
        doc.set_attribute(div, "class", "y");
        doc.set_attribute(div, "id", "z");
        let names: Vec<_> = doc.attributes(div).iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["id", "class"]);
        assert_eq!(doc.attribute(div, "id"), Some("z"));

        doc.remove_attribute(div, "id");
        assert!(!doc.has_attribute(div, "id"));
    }

    #[test]
    fn test_clone_subtree_is_deep_and_detached() {
        let (mut doc, div, a, _) = sample();
        let copy = doc.clone_subtree(div);
        assert_eq!(doc.parent(copy), None);
        assert_eq!(doc.text_content(copy), "ab");

        doc.set_text(a, "changed");
        assert_eq!(doc.text_content(copy), "ab");
    }

    #[test]
    fn test_remove_children() {
        let (mut doc, div, a, _) = sample();
        doc.remove_children(div);
        assert!(doc.children(div).is_empty());
        assert_eq!(doc.parent(a), None);
    }
}
