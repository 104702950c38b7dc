//! Character cursor used by the block splitter.

use source_map::Span;

/// A cursor over a Vue single-file component.
pub struct SfcLexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> SfcLexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> &'a str {
        &self.source[self.pos..]
    }

    pub fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    pub fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub fn skip_whitespace(&mut self) {
        self.consume_while(char::is_whitespace);
    }

    pub fn starts_with(&self, s: &str) -> bool {
        self.remaining().starts_with(s)
    }

    pub fn consume(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    pub fn consume_while<F>(&mut self, pred: F) -> &'a str
    where
        F: Fn(char) -> bool,
    {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.next_char();
        }
        &self.source[start..self.pos]
    }

    pub fn consume_until(&mut self, s: &str) -> &'a str {
        let start = self.pos;
        while !self.is_eof() && !self.starts_with(s) {
            self.next_char();
        }
        &self.source[start..self.pos]
    }

    /// Read a tag name. Custom block names such as `twig-config` contain dashes.
    pub fn read_tag_name(&mut self) -> Option<&'a str> {
        let start = self.pos;
        match self.peek_char() {
            Some(c) if c.is_ascii_alphabetic() => {
                self.next_char();
            }
            _ => return None,
        }
        self.consume_while(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':');
        Some(&self.source[start..self.pos])
    }

    pub fn read_attr_name(&mut self) -> Option<&'a str> {
        let name = self.consume_while(|c| {
            !c.is_whitespace() && !matches!(c, '=' | '>' | '/' | '"' | '\'')
        });
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Read a quoted value; the quotes are consumed but not returned.
    pub fn read_quoted_string(&mut self) -> Option<&'a str> {
        let quote = self.peek_char()?;
        if quote != '"' && quote != '\'' {
            return None;
        }
        self.next_char();
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c == quote {
                let value = &self.source[start..self.pos];
                self.next_char();
                return Some(value);
            }
            self.next_char();
        }
        Some(&self.source[start..self.pos])
    }

    pub fn read_unquoted_value(&mut self) -> &'a str {
        self.consume_while(|c| !c.is_whitespace() && c != '>')
    }

    /// Read a `<!-- -->` comment and return its body.
    pub fn read_comment(&mut self) -> Option<&'a str> {
        if !self.consume("<!--") {
            return None;
        }
        let content = self.consume_until("-->");
        self.consume("-->");
        Some(content)
    }

    /// Check whether the cursor sits on `<tag` or `</tag` followed by a tag
    /// delimiter. `prefix` is `"<"` or `"</"`.
    fn at_tag(&self, prefix: &str, tag: &str) -> bool {
        let rest = self.remaining();
        if !rest.starts_with(prefix) {
            return false;
        }
        let after_prefix = &rest[prefix.len()..];
        let Some(name) = after_prefix.get(..tag.len()) else {
            return false;
        };
        name.eq_ignore_ascii_case(tag)
            && matches!(
                after_prefix[tag.len()..].chars().next(),
                Some('>' | '/' | ' ' | '\t' | '\n' | '\r') | None
            )
    }

    /// Read raw block content up to the matching `</tag`.
    ///
    /// Opening tags with the same name increase the nesting depth, so a
    /// `<template>` block may contain `<template v-slot>` children. Nested
    /// blocks treat comments as opaque text; raw blocks (script, style) end at
    /// the first closing tag. Returns `None` when the block is never closed.
    pub fn read_block_content(&mut self, tag: &str, nested: bool) -> Option<&'a str> {
        let start = self.pos;
        let mut depth = 0usize;

        while !self.is_eof() {
            if nested && self.starts_with("<!--") {
                self.consume_until("-->");
                self.consume("-->");
                continue;
            }
            if self.at_tag("</", tag) {
                if depth == 0 {
                    return Some(&self.source[start..self.pos]);
                }
                depth -= 1;
            } else if nested && self.at_tag("<", tag) {
                depth += 1;
            }
            self.next_char();
        }
        None
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.pos as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_tag_name_with_dash() {
        let mut lexer = SfcLexer::new("twig-config>");
        assert_eq!(lexer.read_tag_name(), Some("twig-config"));
    }

    #[test]
    fn test_read_attr_name_keeps_directive_syntax() {
        let mut lexer = SfcLexer::new("v-slot:header=");
        assert_eq!(lexer.read_attr_name(), Some("v-slot:header"));
    }

    #[test]
    fn test_read_quoted_string() {
        let mut lexer = SfcLexer::new("'scss' rest");
        assert_eq!(lexer.read_quoted_string(), Some("scss"));
        assert_eq!(lexer.remaining(), " rest");
    }

    #[test]
    fn test_read_comment() {
        let mut lexer = SfcLexer::new("<!-- note -->");
        assert_eq!(lexer.read_comment(), Some(" note "));
        assert!(lexer.is_eof());
    }

    #[test]
    fn test_read_nested_template_content() {
        let mut lexer =
            SfcLexer::new("<a><template #x>1</template></a></template>tail");
        let content = lexer.read_block_content("template", true);
        assert_eq!(content, Some("<a><template #x>1</template></a>"));
        assert!(lexer.starts_with("</template>"));
    }

    #[test]
    fn test_read_block_content_ignores_commented_close() {
        let mut lexer = SfcLexer::new("<p/><!-- </template> --><b/></template>");
        let content = lexer.read_block_content("template", true);
        assert_eq!(content, Some("<p/><!-- </template> --><b/>"));
    }

    #[test]
    fn test_read_block_content_unclosed() {
        let mut lexer = SfcLexer::new("<div>never closed");
        assert_eq!(lexer.read_block_content("template", true), None);
    }
}
