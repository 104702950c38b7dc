//! `+` disambiguation for emitted Twig expressions.
//!
//! JavaScript uses `+` for both addition and string concatenation; Twig
//! concatenates with `~`. A chain of operands joined by `+` keeps `+` only
//! when every operand is provably numeric: a number literal, a declared
//! numeric property, or a parenthesized group that is itself numeric.

use crate::helpers::is_numeric;
use rustc_hash::FxHashSet;

/// Rewrite `+` chains inside every `{{ … }}` and `{% … %}` span of `html`.
pub fn convert_concat(html: &str, numeric: &FxHashSet<String>) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = find_span_start(rest) {
        out.push_str(&rest[..start]);
        let close = if rest[start..].starts_with("{{") { "}}" } else { "%}" };
        let body_start = start + 2;
        match find_span_end(&rest[body_start..], close) {
            Some(len) => {
                let body = &rest[body_start..body_start + len];
                out.push_str(&rest[start..body_start]);
                out.push_str(&convert_expression(body, numeric));
                out.push_str(close);
                rest = &rest[body_start + len + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn find_span_start(s: &str) -> Option<usize> {
    match (s.find("{{"), s.find("{%")) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Length of the span body up to `close`, skipping quoted strings.
fn find_span_end(s: &str, close: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut last = None;
    for (i, c) in s.char_indices() {
        match quote {
            Some(q) => {
                if c == q && last != Some('\\') {
                    quote = None;
                }
            }
            None if c == '"' || c == '\'' => quote = Some(c),
            None if s[i..].starts_with(close) => return Some(i),
            None => {}
        }
        last = Some(c);
    }
    None
}

#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Operand(&'a str),
    Plus,
    Space(&'a str),
    Other(&'a str),
}

/// Rewrite the `+` chains of a single expression.
pub fn convert_expression(expr: &str, numeric: &FxHashSet<String>) -> String {
    let segments = tokenize(expr);
    let mut out = String::with_capacity(expr.len());
    let mut i = 0;

    while i < segments.len() {
        match &segments[i] {
            Segment::Operand(_) => {
                let end = chain_end(&segments, i);
                let all_numeric = segments[i..end].iter().all(|s| match s {
                    Segment::Operand(op) => is_numeric_operand(op, numeric),
                    _ => true,
                });
                for segment in &segments[i..end] {
                    match segment {
                        Segment::Operand(op) => out.push_str(&convert_operand(op, numeric)),
                        Segment::Plus if all_numeric => out.push('+'),
                        Segment::Plus => out.push('~'),
                        Segment::Space(s) | Segment::Other(s) => out.push_str(s),
                    }
                }
                i = end;
            }
            Segment::Plus => {
                out.push('+');
                i += 1;
            }
            Segment::Space(s) | Segment::Other(s) => {
                out.push_str(s);
                i += 1;
            }
        }
    }
    out
}

/// End (exclusive) of the chain `operand (+ operand)*` starting at `start`.
fn chain_end(segments: &[Segment<'_>], start: usize) -> usize {
    let mut end = start + 1;
    loop {
        let mut j = end;
        while matches!(segments.get(j), Some(Segment::Space(_))) {
            j += 1;
        }
        if !matches!(segments.get(j), Some(Segment::Plus)) {
            return end;
        }
        j += 1;
        while matches!(segments.get(j), Some(Segment::Space(_))) {
            j += 1;
        }
        if !matches!(segments.get(j), Some(Segment::Operand(_))) {
            return end;
        }
        end = j + 1;
    }
}

/// Recurse into a parenthesized operand.
fn convert_operand(op: &str, numeric: &FxHashSet<String>) -> String {
    match group_inner(op) {
        Some(inner) => format!("({})", convert_expression(inner, numeric)),
        None => op.to_string(),
    }
}

fn is_numeric_operand(op: &str, numeric: &FxHashSet<String>) -> bool {
    if is_numeric(op) || numeric.contains(op) {
        return true;
    }
    match group_inner(op) {
        Some(inner) => {
            let segments = tokenize(inner);
            let has_operand = segments.iter().any(|s| matches!(s, Segment::Operand(_)));
            has_operand
                && segments.iter().all(|s| match s {
                    Segment::Operand(op) => is_numeric_operand(op, numeric),
                    Segment::Other(_) => false,
                    _ => true,
                })
        }
        None => false,
    }
}

/// `(x)` → `x` when the parentheses enclose the whole operand.
fn group_inner(op: &str) -> Option<&str> {
    let inner = op.strip_prefix('(')?.strip_suffix(')')?;
    (matching_close(op, 0) == Some(op.len() - 1)).then_some(inner)
}

fn is_operand_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '|' | '$')
}

fn tokenize(expr: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let bytes: Vec<(usize, char)> = expr.char_indices().collect();
    let mut i = 0;

    while i < bytes.len() {
        let (pos, c) = bytes[i];
        if c.is_whitespace() {
            let start = pos;
            while i < bytes.len() && bytes[i].1.is_whitespace() {
                i += 1;
            }
            segments.push(Segment::Space(&expr[start..offset(&bytes, i, expr)]));
        } else if c == '+' {
            let next = bytes.get(i + 1).map(|&(_, c)| c);
            let prev_operand = segments
                .iter()
                .rev()
                .find(|s| !matches!(s, Segment::Space(_)))
                .is_some_and(|s| matches!(s, Segment::Operand(_)));
            if matches!(next, Some('+' | '=')) || !prev_operand {
                let len = if matches!(next, Some('+' | '=')) { 2 } else { 1 };
                let end = offset(&bytes, (i + len).min(bytes.len()), expr);
                segments.push(Segment::Other(&expr[pos..end]));
                i += len;
            } else {
                segments.push(Segment::Plus);
                i += 1;
            }
        } else if is_operand_char(c) || matches!(c, '"' | '\'' | '(' | '[') {
            let end = read_operand(expr, pos);
            segments.push(Segment::Operand(&expr[pos..end]));
            while i < bytes.len() && bytes[i].0 < end {
                i += 1;
            }
        } else {
            let end = offset(&bytes, i + 1, expr);
            segments.push(Segment::Other(&expr[pos..end]));
            i += 1;
        }
    }
    segments
}

fn offset(chars: &[(usize, char)], index: usize, expr: &str) -> usize {
    chars.get(index).map(|&(p, _)| p).unwrap_or(expr.len())
}

/// Byte end of the operand starting at `start`: operand characters, string
/// literals and balanced bracket groups.
fn read_operand(expr: &str, start: usize) -> usize {
    let mut pos = start;
    while let Some(c) = expr[pos..].chars().next() {
        if c == '"' || c == '\'' {
            match closing_quote(expr, pos) {
                Some(end) => pos = end + 1,
                None => return expr.len(),
            }
        } else if c == '(' || c == '[' {
            match matching_close(expr, pos) {
                Some(end) => pos = end + 1,
                None => return expr.len(),
            }
        } else if is_operand_char(c) {
            pos += c.len_utf8();
        } else {
            break;
        }
    }
    pos
}

fn closing_quote(expr: &str, start: usize) -> Option<usize> {
    let quote = expr[start..].chars().next()?;
    let mut last = None;
    for (i, c) in expr[start + 1..].char_indices() {
        if c == quote && last != Some('\\') {
            return Some(start + 1 + i);
        }
        last = Some(c);
    }
    None
}

/// Index of the bracket closing the one at `start`, skipping strings.
fn matching_close(expr: &str, start: usize) -> Option<usize> {
    let mut depth = 0i32;
    let mut pos = start;
    while let Some(c) = expr[pos..].chars().next() {
        match c {
            '"' | '\'' => {
                pos = closing_quote(expr, pos)?;
            }
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos);
                }
            }
            _ => {}
        }
        pos += c.len_utf8();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn convert(html: &str) -> String {
        convert_concat(html, &FxHashSet::default())
    }

    #[test]
    fn test_numeric_addition_stays() {
        assert_eq!(convert("{{ 1 + 1 }}"), "{{ 1 + 1 }}");
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(convert("{{ 'a' + b }}"), "{{ 'a' ~ b }}");
        assert_eq!(convert("{{ '}}' + foo|trim }}"), "{{ '}}' ~ foo|trim }}");
        assert_eq!(convert("<p title=\"{{ a+b+1 }}\">"), "<p title=\"{{ a~b~1 }}\">");
    }

    #[test]
    fn test_declared_numeric_properties() {
        let mut numeric = FxHashSet::default();
        numeric.insert("count".to_string());
        assert_eq!(
            convert_concat("{{ count + 1 }} {{ label + count }}", &numeric),
            "{{ count + 1 }} {{ label ~ count }}"
        );
    }

    #[test]
    fn test_groups_and_blocks() {
        assert_eq!(
            convert("{% set x = 'a' + (1 + 2) %}"),
            "{% set x = 'a' ~ (1 + 2) %}"
        );
        assert_eq!(convert("{{ fn(a + 'b') }}"), "{{ fn(a + 'b') }}");
        assert_eq!(convert("{{ (a + 'b') }}"), "{{ (a ~ 'b') }}");
    }

    #[test]
    fn test_text_outside_spans_untouched() {
        assert_eq!(convert("a + b {{ x }}"), "a + b {{ x }}");
        assert_eq!(convert("{{ i++ }} {{ +x }}"), "{{ i++ }} {{ +x }}");
    }
}
