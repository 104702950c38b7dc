//! Binding resolver: turns the value of a `:attr` binding into output
//! fragments.
//!
//! Fragments come in two flavors. With `twig_output` they are ready to sit
//! inside an attribute value (`{{ expr }}` in placeholder form). Without it
//! they are plain Twig expressions meant to be concatenated into a larger
//! one, such as the `class` property of an include.

use crate::expression::{refactor_condition, refactor_embedded_template_strings};
use crate::helpers::{camel_to_kebab, split_once_top_level, split_top_level, unquote};
use crate::replacements;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static SPLICE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").ok());

/// The resolved shape of a binding value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// The literal `true`: the attribute renders as `name="name"`.
    BooleanTrue,
    Fragments(Vec<String>),
}

impl Binding {
    pub fn into_fragments(self) -> Vec<String> {
        match self {
            Binding::BooleanTrue => Vec::new(),
            Binding::Fragments(fragments) => fragments,
        }
    }
}

/// Classify `value` and produce its fragments. Unrecognized shapes are
/// treated as plain expressions.
pub fn resolve(value: &str, name: &str, twig_output: bool) -> Binding {
    let value = value.trim();

    if value == "true" {
        debug!(attribute = name, "boolean binding");
        return Binding::BooleanTrue;
    }

    let fragments = if let Some(inner) = enclosed(value, '[', ']') {
        debug!(attribute = name, value, "array binding");
        let mut fragments = Vec::new();
        for element in split_top_level(inner, ',') {
            if let Some(content) = template_literal(element) {
                fragments.push(template_string(content, twig_output));
            } else if let Some(items) = enclosed(element, '{', '}') {
                fragments.extend(object(items, name, twig_output));
            } else if let Some(literal) = unquote(element) {
                if twig_output {
                    fragments.push(literal.to_string());
                } else {
                    fragments.push(element.to_string());
                }
            } else {
                fragments.push(prepare_output(&refactor_condition(element), twig_output));
            }
        }
        fragments
    } else if let Some(items) = enclosed(value, '{', '}') {
        debug!(attribute = name, value, "object binding");
        object(items, name, twig_output)
    } else if let Some(content) = template_literal(value) {
        debug!(attribute = name, value, "template string binding");
        vec![template_string(content, twig_output)]
    } else {
        let mut expr = refactor_condition(value);
        if expr.contains('`') {
            expr = refactor_embedded_template_strings(&expr);
        }
        debug!(attribute = name, value = %expr, "expression binding");
        vec![prepare_output(&expr, twig_output)]
    };

    Binding::Fragments(fragments)
}

/// Wrap an expression as output (`{{ expr }}`) or as a group (`(expr)`).
pub fn prepare_output(expr: &str, twig_output: bool) -> String {
    if twig_output {
        replacements::output(expr.trim())
    } else {
        format!("({})", expr.trim())
    }
}

/// `key: condition` pairs. For `style`, pairs are `property: value`.
fn object(items: &str, name: &str, twig_output: bool) -> Vec<String> {
    split_top_level(items, ',')
        .into_iter()
        .filter_map(|item| split_once_top_level(item, ':'))
        .map(|(key, expr)| {
            let key = key.trim();
            let key = unquote(key).unwrap_or(key);
            let expr = refactor_condition(expr.trim());
            if name == "style" {
                let property = camel_to_kebab(key);
                if twig_output {
                    format!("{}: {}", property, replacements::output(&expr))
                } else {
                    format!("\"{}: \" ~ ({})", property, expr)
                }
            } else {
                prepare_output(&format!("{} ? '{} ' : ''", expr, key), twig_output)
            }
        })
        .collect()
}

/// `` `btn ${size}` `` content, spliced as output or as `~` concatenation.
fn template_string(content: &str, twig_output: bool) -> String {
    let Some(splice) = SPLICE.as_ref() else {
        return content.to_string();
    };
    if twig_output {
        splice
            .replace_all(content, |caps: &regex::Captures<'_>| {
                replacements::output(&refactor_condition(caps[1].trim()))
            })
            .into_owned()
    } else {
        let spliced = splice.replace_all(content, |caps: &regex::Captures<'_>| {
            format!("\" ~ ({}) ~ \"", refactor_condition(caps[1].trim()))
        });
        format!("\"{}\"", spliced)
    }
}

fn template_literal(value: &str) -> Option<&str> {
    let inner = value.strip_prefix('`')?.strip_suffix('`')?;
    (!inner.is_empty() && !inner.contains('`')).then_some(inner)
}

/// The inside of `open … close` when the pair spans the whole value.
fn enclosed(value: &str, open: char, close: char) -> Option<&str> {
    let inner = value.strip_prefix(open)?.strip_suffix(close)?;
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut last = None;
    for c in inner.chars() {
        match quote {
            Some(q) => {
                if c == q && last != Some('\\') {
                    quote = None;
                }
            }
            None if c == '"' || c == '\'' || c == '`' => quote = Some(c),
            None if c == open => depth += 1,
            None if c == close => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            None => {}
        }
        last = Some(c);
    }
    (depth == 0 && !inner.trim().is_empty()).then_some(inner)
}
