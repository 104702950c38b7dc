//! Mutable HTML tree for Vue templates.
//!
//! The compiler parses template markup into a [`Document`], rewrites it in
//! place (inserting control-flow text nodes, moving and removing elements,
//! rewriting attributes) and serializes it back to HTML.

pub mod ast;
pub mod error;
pub mod parser;
pub mod serializer;

pub use ast::{Attribute, Document, ElementData, NodeData, NodeId};
pub use error::{DomError, DomErrorCode, DomResult};
pub use parser::{is_void_element, parse_fragment, parse_into};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mutate_then_serialize() {
        let mut doc = parse_fragment(r#"<div v-if="show">hi</div>"#).unwrap();
        let div = doc.children(doc.root())[0];

        let open = doc.create_text("{% if show %}");
        let close = doc.create_text("{% endif %}");
        doc.insert_before(div, open);
        doc.insert_after(div, close);
        doc.remove_attribute(div, "v-if");

        assert_eq!(doc.inner_html(doc.root()), "{% if show %}<div>hi</div>{% endif %}");
    }
}
