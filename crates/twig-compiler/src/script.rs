//! Pattern-based scanning of the component script for declared props and
//! instance data.

use crate::expression::refactor_condition;
use crate::models::{Data, Property};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use vue_parser::ScriptLang;

static OBJECT_PROP: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?P<prop>[^\s:]+):\s*\{(?P<definition>[^{}]+)\}").ok());
static REQUIRED: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"required:\s*true").ok());
static TYPE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"type:\s*([A-Za-z]+)").ok());
static DEFAULT: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"default:\s*(?P<default>\[[^\[\]]+\]|[^,]+)\s*,?").ok());

static CLASS_PROP: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?s)@Prop\s*\((?:\{(?P<options>.*?)\})?\)[^;]*?(?P<name>[a-zA-Z0-9_$]+)!?:\s*(?P<type>[a-zA-Z\[\]]+)[^;@]*;",
    )
    .ok()
});
static CLASS_PROP_DEFAULT: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r#"default\s*:\s*(?P<value>'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*"|[a-zA-Z0-9_.\-]+|\[[^\[\]]*\])"#,
    )
    .ok()
});

static CLASS_DATA: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)private\s+(?P<name>[a-zA-Z0-9_$]+)(?:\s*:\s*[^=;]+)?\s*=\s*(?P<value>[^;]+?);[ \t]*(?:\r?\n|$)",
    )
    .ok()
});
static OBJECT_DATA: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?si)data\(\)\s*\{\s*return\s*\{(?P<body>.+?)\s*\}\s*;?\s*\}\s*,?").ok()
});

const RESERVED_KEYS: [&str; 3] = ["props", "methods", "computed"];

/// Declared props, by name, in declaration order. Class-style `@Prop`
/// declarations win over object-style ones when both are present.
pub fn register_properties(content: &str) -> IndexMap<String, Property> {
    let class_props = class_properties(content);
    if !class_props.is_empty() {
        return class_props;
    }
    object_properties(content)
}

fn object_properties(content: &str) -> IndexMap<String, Property> {
    let mut properties = IndexMap::new();
    let Some(re) = OBJECT_PROP.as_ref() else {
        return properties;
    };

    for caps in re.captures_iter(content) {
        let name = &caps["prop"];
        if RESERVED_KEYS.contains(&name) {
            continue;
        }
        let definition = &caps["definition"];
        let mut property = Property::new(name, "", true);

        property.is_required = REQUIRED
            .as_ref()
            .is_some_and(|re| re.is_match(definition));
        property.declared_type = TYPE
            .as_ref()
            .and_then(|re| re.captures(definition))
            .map(|c| c[1].to_string());
        property.default = DEFAULT
            .as_ref()
            .and_then(|re| re.captures(definition))
            .map(|c| c["default"].trim().to_string())
            .filter(|d| !d.is_empty());

        debug!(prop = name, ty = ?property.declared_type, "registered property");
        properties.insert(name.to_string(), property);
    }
    properties
}

fn class_properties(content: &str) -> IndexMap<String, Property> {
    let mut properties = IndexMap::new();
    let Some(re) = CLASS_PROP.as_ref() else {
        return properties;
    };

    for caps in re.captures_iter(content) {
        let name = &caps["name"];
        let mut property = Property::new(name, "", true);
        property.declared_type = Some(caps["type"].trim().to_string());
        property.default = caps.name("options").and_then(|options| {
            CLASS_PROP_DEFAULT
                .as_ref()?
                .captures(options.as_str())
                .map(|c| c["value"].trim().to_string())
        });

        debug!(prop = name, "registered class property");
        properties.insert(name.to_string(), property);
    }
    properties
}

/// Instance data: `private x = …;` fields for TypeScript, the object
/// returned by `data()` otherwise.
pub fn register_data(content: &str, lang: ScriptLang) -> Vec<Data> {
    let entries: Vec<(String, String)> = if lang.is_typescript() {
        CLASS_DATA
            .as_ref()
            .map(|re| {
                re.captures_iter(content)
                    .map(|c| (c["name"].to_string(), c["value"].to_string()))
                    .collect()
            })
            .unwrap_or_default()
    } else {
        OBJECT_DATA
            .as_ref()
            .and_then(|re| re.captures(content))
            .map(|c| {
                split_data_entries(&c["body"])
                    .into_iter()
                    .filter_map(|entry| {
                        let (name, value) = entry.split_once(':')?;
                        Some((name.to_string(), value.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    };

    entries
        .into_iter()
        .map(|(name, value)| Data {
            name: name.trim().to_string(),
            value: refactor_condition(value.replace("this.", "").trim())
                .trim()
                .to_string(),
        })
        .filter(|data| !data.name.is_empty())
        .collect()
}

/// Split a `data()` object body on top-level commas. Quotes, brackets and
/// `/* */` comments are respected; comments are dropped.
fn split_data_entries(body: &str) -> Vec<String> {
    let mut entries = vec![String::new()];
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut last: Option<char> = None;
    let mut in_comment = false;
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        if in_comment {
            if c == '*' && next == Some('/') {
                chars.next();
                in_comment = false;
            }
            continue;
        }
        if quote.is_none() && c == '/' && next == Some('*') {
            chars.next();
            in_comment = true;
            continue;
        }

        match quote {
            None if c == '"' || c == '\'' => quote = Some(c),
            Some(q) if c == q && last != Some('\\') => quote = None,
            _ => {}
        }

        match c {
            '[' | '{' if quote.is_none() => depth += 1,
            ']' | '}' if quote.is_none() => depth -= 1,
            ',' if quote.is_none() && depth == 0 => {
                entries.push(String::new());
                last = Some(c);
                continue;
            }
            _ => {}
        }
        if let Some(entry) = entries.last_mut() {
            entry.push(c);
        }
        last = Some(c);
    }
    entries
}
