//! Lenient HTML fragment parser.
//!
//! Handles what Vue templates contain: elements with directive attributes,
//! text with `{{ }}` interpolation, comments, void and self-closing tags, and
//! raw `<script>`/`<style>` content. Mismatched end tags close every element
//! opened after the matching one; end tags without an open match are
//! dropped.

use crate::ast::{Attribute, Document, NodeId};
use crate::error::{DomError, DomResult};
use source_map::Span;
use tracing::debug;

/// Parse `source` into a fresh document. Top-level nodes become children of
/// the document root.
pub fn parse_fragment(source: &str) -> DomResult<Document> {
    let mut doc = Document::new();
    let root = doc.root();
    TreeBuilder::new(source, &mut doc).parse_into(root)?;
    Ok(doc)
}

/// Parse `source` and append the resulting nodes to `parent`.
pub fn parse_into(doc: &mut Document, parent: NodeId, source: &str) -> DomResult<()> {
    TreeBuilder::new(source, doc).parse_into(parent)
}

struct TreeBuilder<'a, 'd> {
    source: &'a str,
    pos: usize,
    doc: &'d mut Document,
    /// Open elements; the bottom entry is the insertion parent passed in.
    stack: Vec<NodeId>,
}

impl<'a, 'd> TreeBuilder<'a, 'd> {
    fn new(source: &'a str, doc: &'d mut Document) -> Self {
        Self {
            source,
            pos: 0,
            doc,
            stack: Vec::new(),
        }
    }

    fn remaining(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.remaining().starts_with(s)
    }

    fn consume(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        self.read_while(char::is_whitespace);
    }

    fn read_while<F: Fn(char) -> bool>(&mut self, pred: F) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.advance();
        }
        &self.source[start..self.pos]
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.pos as u32)
    }

    fn current(&self) -> NodeId {
        // The stack is never empty while parsing.
        self.stack.last().copied().unwrap_or_else(|| self.doc.root())
    }

    fn parse_into(mut self, parent: NodeId) -> DomResult<()> {
        self.stack.push(parent);

        while !self.is_eof() {
            if self.starts_with("<!--") {
                self.parse_comment()?;
            } else if self.starts_with("</") && self.is_tag_start(2) {
                self.parse_end_tag();
            } else if self.starts_with("<!") || self.starts_with("<?") {
                // Doctype or processing instruction.
                self.read_while(|c| c != '>');
                self.consume(">");
            } else if self.starts_with("<") && self.is_tag_start(1) {
                self.parse_element()?;
            } else {
                self.parse_text();
            }
        }

        if self.stack.len() > 1 {
            debug!(open = self.stack.len() - 1, "closing elements left open at end of input");
        }
        Ok(())
    }

    fn is_tag_start(&self, offset: usize) -> bool {
        self.remaining()[offset..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
    }

    fn parse_comment(&mut self) -> DomResult<()> {
        let start = self.pos;
        self.consume("<!--");
        let Some(end) = self.remaining().find("-->") else {
            self.pos = self.source.len();
            return Err(DomError::unterminated_comment(self.span_from(start)));
        };
        let content = &self.remaining()[..end];
        self.pos += end + 3;
        let comment = self.doc.create_comment(content);
        let parent = self.current();
        self.doc.append_child(parent, comment);
        Ok(())
    }

    fn parse_text(&mut self) {
        let start = self.pos;
        // Always take at least one char so a lone `<` cannot stall the loop.
        self.advance();
        while !self.is_eof() {
            if self.starts_with("</") || self.starts_with("<!") {
                break;
            }
            if self.starts_with("<") && self.is_tag_start(1) {
                break;
            }
            self.advance();
        }
        let raw = &self.source[start..self.pos];
        self.append_text(&htmlize::unescape(raw));
    }

    fn append_text(&mut self, text: &str) {
        let parent = self.current();
        // Merge with a directly preceding text node.
        if let Some(&last) = self.doc.children(parent).last() {
            if let Some(existing) = self.text_of(last) {
                let merged = format!("{}{}", existing, text);
                self.doc.set_text(last, merged);
                return;
            }
        }
        let node = self.doc.create_text(text);
        self.doc.append_child(parent, node);
    }

    fn text_of(&self, id: NodeId) -> Option<String> {
        match self.doc.data(id) {
            crate::NodeData::Text(t) => Some(t.clone()),
            _ => None,
        }
    }

    fn parse_end_tag(&mut self) {
        self.consume("</");
        let name = self
            .read_while(|c| !c.is_whitespace() && c != '>' && c != '/')
            .to_ascii_lowercase();
        self.read_while(|c| c != '>');
        self.consume(">");

        // Index 0 is the insertion parent and is never popped.
        let matching = self
            .stack
            .iter()
            .skip(1)
            .rposition(|&id| self.doc.tag_name(id) == Some(name.as_str()))
            .map(|index| index + 1);
        match matching {
            Some(index) => self.stack.truncate(index),
            None => debug!(tag = %name, "dropping unmatched end tag"),
        }
    }

    fn parse_element(&mut self) -> DomResult<()> {
        let start = self.pos;
        self.consume("<");
        let tag = self
            .read_while(|c| !c.is_whitespace() && c != '>' && c != '/')
            .to_ascii_lowercase();

        let attrs = self.parse_attributes();

        let self_closing = self.consume("/>");
        if !self_closing && !self.consume(">") {
            return Err(DomError::unterminated_tag(&tag, self.span_from(start)));
        }

        let element = self.doc.create_element(&tag);
        for attr in attrs {
            self.doc.push_attribute(element, attr);
        }
        let parent = self.current();
        self.doc.append_child(parent, element);

        if self_closing || is_void_element(&tag) {
            return Ok(());
        }

        if is_raw_text_element(&tag) {
            let close = format!("</{}", tag);
            let end = find_ignore_case(self.remaining(), &close).unwrap_or(self.remaining().len());
            let content = &self.remaining()[..end];
            if !content.is_empty() {
                let text = self.doc.create_text(content);
                self.doc.append_child(element, text);
            }
            self.pos += end;
            if !self.is_eof() {
                self.read_while(|c| c != '>');
                self.consume(">");
            }
            return Ok(());
        }

        self.stack.push(element);
        Ok(())
    }

    fn parse_attributes(&mut self) -> Vec<Attribute> {
        let mut attrs = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_eof() || self.starts_with(">") || self.starts_with("/>") {
                break;
            }

            let name = self.read_while(|c| {
                !c.is_whitespace() && !matches!(c, '=' | '>' | '"' | '\'') && c != '/'
            });
            if name.is_empty() {
                // Stray `/`, quote or `=`.
                self.advance();
                continue;
            }

            self.skip_whitespace();
            if self.consume("=") {
                self.skip_whitespace();
                let value = self.parse_attribute_value();
                attrs.push(Attribute::new(name, htmlize::unescape(value).into_owned()));
            } else {
                attrs.push(Attribute::bare(name));
            }
        }

        attrs
    }

    fn parse_attribute_value(&mut self) -> &'a str {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.advance();
                let value = self.read_while(|c| c != quote);
                self.advance();
                value
            }
            _ => self.read_while(|c| !c.is_whitespace() && c != '>'),
        }
    }
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .char_indices()
        .map(|(i, _)| i)
        .find(|&i| {
            haystack
                .get(i..i + needle.len())
                .is_some_and(|window| window.eq_ignore_ascii_case(needle))
        })
}

/// Elements that never have children or an end tag.
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Elements whose content is kept as unparsed, unescaped text.
pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeData;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_nested_elements() {
        let doc = parse_fragment("<div id=\"a\"><span>hi</span></div>").unwrap();
        let root = doc.root();
        let div = doc.children(root)[0];
        assert_eq!(doc.tag_name(div), Some("div"));
        assert_eq!(doc.attribute(div, "id"), Some("a"));
        assert_eq!(doc.text_content(div), "hi");
    }

    #[test]
    fn test_directive_attributes_keep_case_and_syntax() {
        let doc = parse_fragment(r#"<Child :someProp="a > b" @click.stop="go" v-cloak/>"#).unwrap();
        let child = doc.children(doc.root())[0];
        assert_eq!(doc.tag_name(child), Some("child"));
        assert_eq!(doc.attribute(child, ":someProp"), Some("a > b"));
        assert!(doc.has_attribute(child, "@click.stop"));
        let cloak = &doc.attributes(child)[2];
        assert_eq!(cloak.name, "v-cloak");
        assert_eq!(cloak.value, None);
    }

    #[test]
    fn test_void_and_self_closing() {
        let doc = parse_fragment("<p><input type=\"text\"><br/>x</p>").unwrap();
        let p = doc.children(doc.root())[0];
        assert_eq!(doc.children(p).len(), 3);
    }

    #[test]
    fn test_entities_are_decoded() {
        let doc = parse_fragment("<p title=\"a &amp; b\">1 &lt; 2</p>").unwrap();
        let p = doc.children(doc.root())[0];
        assert_eq!(doc.attribute(p, "title"), Some("a & b"));
        assert_eq!(doc.text_content(p), "1 < 2");
    }

    #[test]
    fn test_raw_text_elements() {
        let doc = parse_fragment("<style>a > b { color: red }</style><p/>").unwrap();
        let root = doc.root();
        assert_eq!(doc.children(root).len(), 2);
        assert_eq!(doc.text_content(doc.children(root)[0]), "a > b { color: red }");
    }

    #[test]
    fn test_mismatched_end_tag_closes_inner() {
        let doc = parse_fragment("<div><span>a</div><p>b</p>").unwrap();
        let root = doc.root();
        assert_eq!(doc.children(root).len(), 2);
        assert_eq!(doc.tag_name(doc.children(root)[1]), Some("p"));
    }

    #[test]
    fn test_comments_and_lone_angle_bracket() {
        let doc = parse_fragment("<!-- note -->a < b").unwrap();
        let root = doc.root();
        assert_eq!(doc.data(doc.children(root)[0]), &NodeData::Comment(" note ".into()));
        assert_eq!(doc.text(doc.children(root)[1]), Some("a < b"));
    }

    #[test]
    fn test_unterminated_tag() {
        let err = parse_fragment("<div class=\"x\"").unwrap_err();
        assert_eq!(err.code, crate::DomErrorCode::UnterminatedTag);
    }

    #[test]
    fn test_parse_into_existing_parent() {
        let mut doc = Document::new();
        let wrapper = doc.create_element("template");
        let root = doc.root();
        doc.append_child(root, wrapper);
        parse_into(&mut doc, wrapper, "<a/></template><b/>").unwrap();
        assert_eq!(doc.children(wrapper).len(), 2);
    }
}
