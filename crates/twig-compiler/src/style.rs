//! Style block compilation.
//!
//! `lang="scss"` blocks are compiled to CSS with grass first. Blocks are
//! then validated and printed with LightningCSS, and scoped blocks get the
//! component's `[data-v-…]` attribute appended to every selector.
//! A block that fails to compile is replaced by a warning comment so the
//! rest of the template still converts.

use crate::helpers::split_top_level;
use crate::options::{CompilerOptions, StyleOutput};
use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use vue_parser::StyleBlock;
use xxhash_rust::xxh3::xxh3_128;

static IMPORT: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r#"@import\s+(?:url\(\s*)?["']?(?P<path>[^"')\s;]+)["']?\s*\)?\s*;"#).ok()
});

/// The scope attribute for the given scoped style content.
pub fn scope_attribute_for(content: &str) -> String {
    format!("data-v-{:032x}", xxh3_128(content.as_bytes()))
}

/// Compiles `<style>` blocks and owns the scope attribute of a conversion.
#[derive(Debug, Clone, Default)]
pub struct StyleBuilder {
    output: StyleOutput,
    base_path: Option<PathBuf>,
    prelude: Option<String>,
    scoped_attribute: Option<String>,
}

impl StyleBuilder {
    pub fn new(options: &CompilerOptions) -> Self {
        Self {
            output: options.style_output,
            base_path: options.base_path.clone(),
            prelude: options.style_prelude.clone(),
            scoped_attribute: None,
        }
    }

    /// Derive the scope attribute from all scoped blocks, joined by a space.
    pub fn prepare_scope(&mut self, styles: &[StyleBlock]) {
        let scoped: Vec<&str> = styles
            .iter()
            .filter(|s| s.scoped)
            .map(|s| s.content.as_str())
            .collect();
        self.scoped_attribute = (!scoped.is_empty()).then(|| scope_attribute_for(&scoped.join(" ")));
    }

    pub fn scoped_attribute(&self) -> Option<&str> {
        self.scoped_attribute.as_deref()
    }

    pub fn output(&self) -> StyleOutput {
        self.output
    }

    /// The `<style>` element for a block, or `None` when the output mask
    /// excludes it.
    pub fn compile(&self, style: &StyleBlock) -> Option<String> {
        let wanted = if style.scoped {
            StyleOutput::SCOPED
        } else {
            StyleOutput::UNSCOPED
        };
        if !self.output.contains(wanted) {
            return None;
        }

        let result = self.source(style).and_then(|css| {
            let css = compile_css(&css)?;
            Ok(match (style.scoped, self.scoped_attribute.as_deref()) {
                (true, Some(attr)) => scope_css(&css, attr),
                _ => css,
            })
        });

        Some(match result {
            Ok(css) => format!("<style>\n{}</style>", css),
            Err(message) => {
                warn!(%message, "style block could not be compiled");
                format!("<style>/* Warning: {} */</style>", message.replace("*/", "* /"))
            }
        })
    }

    /// Block content (or the `src` file) as plain CSS.
    fn source(&self, style: &StyleBlock) -> Result<String, String> {
        let content = match (&style.src, &self.base_path) {
            (Some(src), Some(base)) => read_file(&base.join(src))?,
            _ => style.content.clone(),
        };
        if is_scss(style) {
            return self.compile_scss(&content);
        }
        Ok(match &self.base_path {
            Some(base) => inline_imports(&content, base),
            None => content,
        })
    }

    /// SCSS to CSS, with the prelude in front. Imports resolve against the
    /// base path.
    fn compile_scss(&self, content: &str) -> Result<String, String> {
        let source = match &self.prelude {
            Some(prelude) => format!("{}\n{}", prelude, content),
            None => content.to_string(),
        };
        let mut options = grass::Options::default().style(grass::OutputStyle::Expanded);
        if let Some(base) = &self.base_path {
            options = options.load_path(base);
        }
        grass::from_string(source, &options).map_err(|e| format!("SCSS compile error: {}", e))
    }
}

fn is_scss(style: &StyleBlock) -> bool {
    style
        .lang
        .as_deref()
        .is_some_and(|lang| lang.eq_ignore_ascii_case("scss"))
        || style.src.as_deref().is_some_and(|src| src.ends_with(".scss"))
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Cannot read {}: {}", path.display(), e))
}

/// Replace `@import` rules with the imported file. Imports that cannot be
/// read are kept as written.
fn inline_imports(css: &str, base: &Path) -> String {
    let Some(re) = IMPORT.as_ref() else {
        return css.to_string();
    };
    re.replace_all(css, |caps: &regex::Captures<'_>| {
        let path = base.join(&caps["path"]);
        match std::fs::read_to_string(&path) {
            Ok(imported) => {
                debug!(path = %path.display(), "inlined style import");
                imported
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "style import not found");
                caps[0].to_string()
            }
        }
    })
    .into_owned()
}

/// Parse and print through LightningCSS.
pub fn compile_css(css: &str) -> Result<String, String> {
    let parser_options = ParserOptions {
        filename: "style.css".to_string(),
        ..Default::default()
    };
    let stylesheet =
        StyleSheet::parse(css, parser_options).map_err(|e| format!("CSS parse error: {}", e))?;
    stylesheet
        .to_css(PrinterOptions::default())
        .map(|result| result.code)
        .map_err(|e| format!("CSS print error: {}", e))
}

/// Append `[attr]` to the selectors of every style rule, descending into
/// conditional group rules. Keyframes and other at-rules are left alone.
pub fn scope_css(css: &str, attr: &str) -> String {
    let mut out = String::with_capacity(css.len() + css.len() / 4);
    let mut pos = 0;

    while pos < css.len() {
        let Some((end, terminator)) = find_prelude_end(css, pos) else {
            out.push_str(&css[pos..]);
            break;
        };
        if terminator == ';' {
            out.push_str(&css[pos..=end]);
            pos = end + 1;
            continue;
        }
        let Some(close) = matching_brace(css, end) else {
            out.push_str(&css[pos..]);
            break;
        };

        let prelude = &css[pos..end];
        let body = &css[end + 1..close];
        let trimmed = prelude.trim();
        out.push_str(&prelude[..prelude.len() - prelude.trim_start().len()]);

        if let Some(at_rule) = trimmed.strip_prefix('@') {
            let name: String = at_rule
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect::<String>()
                .to_ascii_lowercase();
            out.push_str(trimmed);
            out.push_str(" {");
            if matches!(name.as_str(), "media" | "supports" | "container" | "layer" | "document") {
                out.push_str(&scope_css(body, attr));
            } else {
                out.push_str(body);
            }
        } else {
            out.push_str(&scope_selector(trimmed, attr));
            out.push_str(" {");
            out.push_str(body);
        }
        out.push('}');
        pos = close + 1;
    }
    out
}

/// First top-level `{` or `;` from `start`, skipping strings and comments.
fn find_prelude_end(css: &str, start: usize) -> Option<(usize, char)> {
    let mut chars = css[start..].char_indices().peekable();
    let mut quote: Option<char> = None;
    let mut last = None;
    while let Some((i, c)) = chars.next() {
        match quote {
            Some(q) => {
                if c == q && last != Some('\\') {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '/' if chars.peek().map(|&(_, n)| n) == Some('*') => {
                    let rest = &css[start + i + 2..];
                    let skip = rest.find("*/").map(|p| p + 2).unwrap_or(rest.len());
                    let target = start + i + 2 + skip;
                    while chars.peek().is_some_and(|&(j, _)| start + j < target) {
                        chars.next();
                    }
                }
                '{' | ';' => return Some((start + i, c)),
                _ => {}
            },
        }
        last = Some(c);
    }
    None
}

/// Index of the `}` closing the `{` at `open`.
fn matching_brace(css: &str, open: usize) -> Option<usize> {
    let mut depth = 0u32;
    let mut quote: Option<char> = None;
    let mut last = None;
    for (i, c) in css[open..].char_indices() {
        match quote {
            Some(q) => {
                if c == q && last != Some('\\') {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '{' => depth += 1,
                '}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(open + i);
                    }
                }
                _ => {}
            },
        }
        last = Some(c);
    }
    None
}

/// Scope each selector of a comma-separated list.
pub fn scope_selector(selector: &str, attr: &str) -> String {
    let attr_selector = format!("[{}]", attr);
    split_top_level(selector, ',')
        .into_iter()
        .map(|part| scope_single_selector(part, &attr_selector))
        .collect::<Vec<_>>()
        .join(", ")
}

fn scope_single_selector(selector: &str, attr_selector: &str) -> String {
    if let Some(pos) = selector.find(":deep(") {
        return transform_deep(selector, pos, attr_selector);
    }
    if let Some(pos) = selector.find(":slotted(") {
        return transform_slotted(selector, pos, attr_selector);
    }
    if let Some(pos) = selector.find(":global(") {
        return transform_global(selector, pos);
    }

    let parts: Vec<&str> = selector.split_whitespace().collect();
    let Some((last, init)) = parts.split_last() else {
        return selector.to_string();
    };
    let mut out: Vec<String> = init.iter().map(|p| p.to_string()).collect();
    out.push(add_scope_to_element(last, attr_selector));
    out.join(" ")
}

/// Insert the attribute before the first pseudo-class or pseudo-element.
fn add_scope_to_element(compound: &str, attr_selector: &str) -> String {
    let mut depth = 0i32;
    let mut last = None;
    for (i, c) in compound.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ':' if depth == 0 && i > 0 && last != Some('\\') => {
                return format!("{}{}{}", &compound[..i], attr_selector, &compound[i..]);
            }
            _ => {}
        }
        last = Some(c);
    }
    format!("{}{}", compound, attr_selector)
}

/// `.a :deep(.b)` → `.a[attr] .b`.
fn transform_deep(selector: &str, start: usize, attr_selector: &str) -> String {
    let before = selector[..start].trim();
    let after = &selector[start + ":deep(".len()..];
    match find_matching_paren(after) {
        Some(end) => {
            let scoped = if before.is_empty() {
                attr_selector.to_string()
            } else {
                scope_single_selector(before, attr_selector)
            };
            format!("{} {}{}", scoped, &after[..end], &after[end + 1..])
        }
        None => selector.to_string(),
    }
}

/// `:slotted(.b)` → `.b[attr-s]`.
fn transform_slotted(selector: &str, start: usize, attr_selector: &str) -> String {
    let after = &selector[start + ":slotted(".len()..];
    match find_matching_paren(after) {
        Some(end) => {
            let slotted = format!("{}-s]", attr_selector.trim_end_matches(']'));
            format!(
                "{}{}{}{}",
                &selector[..start],
                &after[..end],
                slotted,
                &after[end + 1..]
            )
        }
        None => selector.to_string(),
    }
}

/// `:global(.b)` → `.b`, unscoped.
fn transform_global(selector: &str, start: usize) -> String {
    let after = &selector[start + ":global(".len()..];
    match find_matching_paren(after) {
        Some(end) => format!("{}{}{}", &selector[..start], &after[..end], &after[end + 1..]),
        None => selector.to_string(),
    }
}

fn find_matching_paren(s: &str) -> Option<usize> {
    let mut depth = 1u32;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ATTR: &str = "data-v-0123456789abcdef0123456789abcdef";

    fn normalize(css: &str) -> String {
        css.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn style(content: &str, scoped: bool) -> StyleBlock {
        let source = if scoped {
            format!("<style scoped>{}</style>", content)
        } else {
            format!("<style>{}</style>", content)
        };
        vue_parser::parse_sfc(&source).unwrap().styles.remove(0)
    }

    fn scss(content: &str, scoped: bool) -> StyleBlock {
        let scoped = if scoped { " scoped" } else { "" };
        let source = format!("<style lang=\"scss\"{}>{}</style>", scoped, content);
        vue_parser::parse_sfc(&source).unwrap().styles.remove(0)
    }

    fn compile_all(options: CompilerOptions, block: &StyleBlock) -> String {
        let mut builder = StyleBuilder::new(&options.with_style_output(StyleOutput::ALL));
        builder.prepare_scope(std::slice::from_ref(block));
        builder.compile(block).unwrap()
    }

    #[test]
    fn test_scope_attribute_is_stable() {
        let a = scope_attribute_for(".a { color: red; }");
        assert_eq!(a, scope_attribute_for(".a { color: red; }"));
        assert_ne!(a, scope_attribute_for(".b { color: red; }"));
        assert_eq!(a.len(), "data-v-".len() + 32);
    }

    #[test]
    fn test_scope_selectors() {
        let attr = format!("[{}]", ATTR);
        assert_eq!(scope_selector(".a .b", ATTR), format!(".a .b{}", attr));
        assert_eq!(scope_selector("a:hover, p", ATTR), format!("a{0}:hover, p{0}", attr));
        assert_eq!(scope_selector(".a::before", ATTR), format!(".a{}::before", attr));
        assert_eq!(scope_selector(".a :deep(.b)", ATTR), format!(".a{} .b", attr));
        assert_eq!(scope_selector(":deep(.b)", ATTR), format!("{} .b", attr));
        assert_eq!(scope_selector(":global(.b) .c", ATTR), ".b .c");
        assert_eq!(
            scope_selector(":slotted(.b)", ATTR),
            format!(".b[{}-s]", ATTR)
        );
    }

    #[test]
    fn test_scope_css_rules() {
        let css = ".a { color: red; }\n@media (min-width: 10px) { .b { color: blue; } }\n@keyframes k { from { opacity: 0; } }";
        let scoped = scope_css(css, ATTR);
        assert_eq!(
            normalize(&scoped),
            normalize(&format!(
                ".a[{0}] {{ color: red; }}\n@media (min-width: 10px) {{ .b[{0}] {{ color: blue; }} }}\n@keyframes k {{ from {{ opacity: 0; }} }}",
                ATTR
            ))
        );
    }

    #[test]
    fn test_output_mask() {
        let options = CompilerOptions::default().with_style_output(StyleOutput::UNSCOPED);
        let mut builder = StyleBuilder::new(&options);
        let styles = vec![style(".a { color: red }", true), style(".b { color: blue }", false)];
        builder.prepare_scope(&styles);

        assert!(builder.scoped_attribute().is_some());
        assert_eq!(builder.compile(&styles[0]), None);
        let unscoped = builder.compile(&styles[1]).unwrap();
        assert!(unscoped.starts_with("<style>"));
        assert!(unscoped.contains(".b"));
    }

    #[test]
    fn test_scoped_block_is_rewritten() {
        let options = CompilerOptions::default().with_style_output(StyleOutput::ALL);
        let mut builder = StyleBuilder::new(&options);
        let styles = vec![style(".a { color: red }", true)];
        builder.prepare_scope(&styles);

        let attr = builder.scoped_attribute().unwrap().to_string();
        let out = builder.compile(&styles[0]).unwrap();
        assert!(out.contains(&format!(".a[{}]", attr)));
    }

    #[test]
    fn test_invalid_css_becomes_warning() {
        let options = CompilerOptions::default().with_style_output(StyleOutput::ALL);
        let builder = StyleBuilder::new(&options);
        let out = builder.compile(&style(".a { color: red; ", false)).unwrap();
        assert!(out.starts_with("<style>/* Warning: "));
    }

    #[test]
    fn test_nested_scss_is_flattened() {
        let out = compile_all(
            CompilerOptions::default(),
            &scss("$m: 2px; .a { .b { margin: $m; } }", false),
        );
        assert!(!out.contains("Warning"), "{}", out);
        assert!(normalize(&out).contains(".a .b { margin: 2px; }"), "{}", out);
    }

    #[test]
    fn test_scss_prelude_variables() {
        let options = CompilerOptions::default().with_style_prelude("$gap: 4px;");
        let out = compile_all(options, &scss(".a { padding: $gap; }", false));
        assert!(normalize(&out).contains(".a { padding: 4px; }"), "{}", out);
    }

    #[test]
    fn test_prelude_is_not_applied_to_plain_css() {
        let options = CompilerOptions::default().with_style_prelude("$gap: 4px;");
        let out = compile_all(options, &style(".b { margin: 0 }", false));
        assert!(!out.contains("Warning"), "{}", out);
        assert!(!out.contains("$gap"), "{}", out);
    }

    #[test]
    fn test_scoped_scss() {
        let block = scss(".a { .b { margin: 0; } }", true);
        let attr = scope_attribute_for(&block.content);
        let out = compile_all(CompilerOptions::default(), &block);
        assert!(out.contains(&format!(".a .b[{}]", attr)), "{}", out);
    }

    #[test]
    fn test_scss_error_becomes_warning() {
        let out = compile_all(CompilerOptions::default(), &scss(".a { color: $missing; }", false));
        assert!(out.starts_with("<style>/* Warning: SCSS compile error"), "{}", out);
    }

    #[test]
    fn test_imports_are_inlined() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("base.css"), ".base { margin: 0 }").unwrap();
        let css = inline_imports("@import 'base.css';\n.a { color: red }", dir.path());
        assert_eq!(css, ".base { margin: 0 }\n.a { color: red }");

        let missing = inline_imports("@import 'nope.css';", dir.path());
        assert_eq!(missing, "@import 'nope.css';");
    }
}
