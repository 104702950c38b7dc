//! Splits a single-file component into its top-level blocks.

use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::lexer::SfcLexer;
use source_map::Span;

pub fn parse_sfc(source: &str) -> ParseResult<Sfc> {
    SfcParser::new(source).parse()
}

struct SfcParser<'a> {
    lexer: SfcLexer<'a>,
}

impl<'a> SfcParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lexer: SfcLexer::new(source),
        }
    }

    fn parse(&mut self) -> ParseResult<Sfc> {
        let mut sfc = Sfc::default();

        loop {
            self.lexer.skip_whitespace();
            if self.lexer.is_eof() {
                break;
            }

            if self.lexer.starts_with("<!--") {
                let start = self.lexer.pos();
                if let Some(content) = self.lexer.read_comment() {
                    sfc.comments.push(Comment {
                        content: content.to_string(),
                        span: self.lexer.span_from(start),
                    });
                }
                continue;
            }

            // Doctype and processing instructions carry nothing for us.
            if self.lexer.starts_with("<!") || self.lexer.starts_with("<?") {
                self.lexer.consume_until(">");
                self.lexer.consume(">");
                continue;
            }

            if self.lexer.starts_with("<") && !self.lexer.starts_with("</") {
                self.parse_block(&mut sfc)?;
                continue;
            }

            self.lexer.next_char();
        }

        Ok(sfc)
    }

    fn parse_block(&mut self, sfc: &mut Sfc) -> ParseResult<()> {
        let start = self.lexer.pos();
        self.lexer.consume("<");

        let tag_name = match self.lexer.read_tag_name() {
            Some(name) => name.to_ascii_lowercase(),
            None => return Ok(()),
        };

        let attrs = self.parse_attributes();

        let is_self_closing = self.lexer.consume("/>");
        if !is_self_closing && !self.lexer.consume(">") {
            return Err(ParseError::unterminated_tag(
                &tag_name,
                self.lexer.span_from(start),
            ));
        }

        let content_start = self.lexer.pos();
        let content = if is_self_closing {
            ""
        } else {
            let nested = tag_name == "template";
            match self.lexer.read_block_content(&tag_name, nested) {
                Some(content) => content,
                None => {
                    return Err(ParseError::unclosed_block(
                        &tag_name,
                        Span::new(start as u32, content_start as u32),
                    ))
                }
            }
        };
        let content_span = Span::new(content_start as u32, (content_start + content.len()) as u32);

        if !is_self_closing {
            self.lexer.consume_until(">");
            self.lexer.consume(">");
        }

        let span = self.lexer.span_from(start);
        let block = SfcBlock {
            span,
            content_span,
            content: content.to_string(),
            attrs,
        };

        match tag_name.as_str() {
            "template" => {
                if sfc.template.is_some() {
                    sfc.errors.push(ParseError::duplicate_block("template", span));
                } else {
                    sfc.template = Some(block);
                }
            }
            "script" => {
                let setup = block.has_attr("setup");
                let lang = ScriptLang::from_attr(block.get_attr("lang"));
                let slot = if setup {
                    &mut sfc.script_setup
                } else {
                    &mut sfc.script
                };
                if slot.is_some() {
                    let name = if setup { "script setup" } else { "script" };
                    sfc.errors.push(ParseError::duplicate_block(name, span));
                } else {
                    *slot = Some(ScriptBlock { block, lang, setup });
                }
            }
            "style" => {
                let lang = block.get_attr("lang").map(String::from);
                let scoped = block.has_attr("scoped");
                let src = block.get_attr("src").map(String::from);
                sfc.styles.push(StyleBlock {
                    block,
                    lang,
                    scoped,
                    src,
                });
            }
            _ => {
                sfc.custom_blocks.push(CustomBlock {
                    block,
                    block_type: tag_name.into(),
                });
            }
        }

        Ok(())
    }

    fn parse_attributes(&mut self) -> Vec<BlockAttr> {
        let mut attrs = Vec::new();

        loop {
            self.lexer.skip_whitespace();
            if self.lexer.is_eof() || self.lexer.starts_with(">") || self.lexer.starts_with("/>") {
                break;
            }

            let attr_start = self.lexer.pos();
            let Some(name) = self.lexer.read_attr_name() else {
                // A stray `/` or quote inside the tag.
                self.lexer.next_char();
                continue;
            };

            self.lexer.skip_whitespace();
            let value = if self.lexer.consume("=") {
                self.lexer.skip_whitespace();
                let value = self
                    .lexer
                    .read_quoted_string()
                    .unwrap_or_else(|| self.lexer.read_unquoted_value());
                Some(value.to_string())
            } else {
                None
            };

            attrs.push(BlockAttr {
                name: name.into(),
                value,
                span: self.lexer.span_from(attr_start),
            });
        }

        attrs
    }
}
