//! Rewrites Vue/JavaScript expressions into Twig expressions.
//!
//! This is pattern-based, not a parser: operators are swapped outside of
//! string literals and `.length`/`.trim` become filters. The output is in
//! placeholder form (see [`crate::replacements`]).

use crate::replacements;
use once_cell::sync::Lazy;
use regex::Regex;

static TEMPLATE_LITERAL: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"`([^`]+)`").ok());
static WHOLE_TEMPLATE_LITERAL: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?s)^`(?P<content>.+)`$").ok());
static TEMPLATE_SPLICE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\$\{([^{}]+)\}").ok());

/// Rewrite a condition or expression. String literals are copied verbatim.
pub fn refactor_condition(condition: &str) -> String {
    let mut out = String::with_capacity(condition.len() + 8);
    let mut buffer = String::new();
    let mut quote: Option<char> = None;
    let mut last: Option<char> = None;

    for c in condition.chars() {
        match quote {
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                if !buffer.is_empty() {
                    out.push_str(&refactor_condition_part(&buffer));
                    buffer.clear();
                }
                out.push(c);
            }
            Some(q) if c == q && last != Some('\\') => {
                quote = None;
                out.push(c);
            }
            Some(_) => out.push(c),
            None => buffer.push(c),
        }
        last = Some(c);
    }
    if !buffer.is_empty() {
        out.push_str(&refactor_condition_part(&buffer));
    }
    out
}

fn refactor_condition_part(part: &str) -> String {
    let part = part
        .replace("===", "==")
        .replace("!==", "!=")
        .replace("&&", "and")
        .replace("||", "or");
    let part = replace_negation(&part)
        .replace(".length", "|length")
        .replace(".trim", "|trim");
    replacements::sanitize(&part)
}

/// `!x` → `not x`, leaving `!=` alone.
fn replace_negation(part: &str) -> String {
    let mut out = String::with_capacity(part.len() + 8);
    let mut chars = part.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('!', Some(&next)) if next != '=' => out.push_str("not "),
            _ => out.push(c),
        }
    }
    out
}

/// Rewrite the inside of every `{{ … }}` span in a text node. Closing
/// braces inside string literals do not end a span.
pub fn refactor_text_node(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + 8);
    let mut buffer = String::new();
    let mut open = false;
    let mut quote: Option<char> = None;
    let mut last: Option<char> = None;

    for c in content.chars() {
        if !open {
            out.push(c);
            if c == '{' && last == Some('{') {
                open = true;
                // `{{{` must not count the third brace as an opener.
                last = None;
                continue;
            }
        } else {
            buffer.push(c);
            match quote {
                None if c == '"' || c == '\'' => quote = Some(c),
                Some(q) if c == q && last != Some('\\') => quote = None,
                _ => {}
            }
            if quote.is_none() && c == '}' && last == Some('}') {
                open = false;
                let inner = buffer.trim_end_matches('}');
                let inner = convert_template_string(inner);
                out.push_str(&refactor_condition(&inner));
                out.push_str("}}");
                buffer.clear();
                last = None;
                continue;
            }
        }
        last = Some(c);
    }
    // An unterminated span is left as written.
    out.push_str(&buffer);
    out
}

/// Template literals inside an interpolation become single-quoted strings
/// with `~` concatenation: `` `a ${b}` `` → `'a ' ~ b ~ ''`.
pub fn convert_template_string(content: &str) -> String {
    let Some(re) = TEMPLATE_LITERAL.as_ref() else {
        return content.to_string();
    };
    re.replace_all(content, |caps: &regex::Captures<'_>| {
        let inner = caps[1].replace("${", "' ~ ").replace('}', " ~ '");
        format!("'{}'", inner)
    })
    .into_owned()
}

/// A template literal that is a whole binding value becomes a double-quoted
/// string: `` `a-${b}` `` → `"a-" ~ ( b ) ~ ""`. Other values pass through.
pub fn refactor_template_string(value: &str) -> String {
    let (Some(whole), Some(splice)) = (WHOLE_TEMPLATE_LITERAL.as_ref(), TEMPLATE_SPLICE.as_ref())
    else {
        return value.to_string();
    };
    match whole.captures(value) {
        Some(caps) => {
            let quoted = format!("\"{}\"", &caps["content"]);
            splice.replace_all(&quoted, "\" ~ ( $1 ) ~ \"").into_owned()
        }
        None => value.to_string(),
    }
}

/// Rewrite every template literal embedded in an expression.
pub fn refactor_embedded_template_strings(value: &str) -> String {
    let Some(re) = TEMPLATE_LITERAL.as_ref() else {
        return value.to_string();
    };
    re.replace_all(value, |caps: &regex::Captures<'_>| {
        refactor_template_string(&caps[0])
    })
    .into_owned()
}
