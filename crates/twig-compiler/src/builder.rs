//! Twig tag builders.
//!
//! Every block tag starts on its own line; the whitespace pass removes the
//! newline again when stripping is enabled.

use crate::expression::refactor_condition;
use crate::models::Property;

pub fn create_block(content: &str) -> String {
    format!("\n{{% {} %}}", content)
}

pub fn create_comment(comment: &str) -> String {
    format!("{{# {} #}}", comment)
}

pub fn create_set(name: &str) -> String {
    create_block(&format!("set {}", name))
}

pub fn close_set() -> String {
    create_block("endset")
}

pub fn create_variable(name: &str, assignment: &str) -> String {
    create_block(&format!("set {} = {}", name, assignment))
}

pub fn create_default_for_variable(name: &str, default: &str) -> String {
    create_block(&format!("set {0} = {0}|default({1})", name, default))
}

pub fn create_multiline_variable(name: &str, content: &str) -> String {
    format!("{}{}{}", create_set(name), content, close_set())
}

pub fn create_if(condition: &str) -> String {
    create_block(&format!("if {}", refactor_condition(condition.trim())))
}

pub fn create_else_if(condition: &str) -> String {
    create_block(&format!("elseif {}", refactor_condition(condition.trim())))
}

pub fn create_else() -> String {
    create_block("else")
}

pub fn create_end_if() -> String {
    create_block("endif")
}

pub fn create_for_item_in_list(item: &str, list: &str) -> String {
    create_block(&format!("for {} in {}", item, list))
}

pub fn create_for(list: &str, item: &str, key: &str) -> String {
    create_block(&format!("for {}, {} in {}", key, item, list))
}

pub fn create_end_for() -> String {
    create_block("endfor")
}

/// `{{ name }}`, or `{{ name|default(fallback) }}`.
pub fn create_variable_output(name: &str, fallback: Option<&str>) -> String {
    match fallback {
        Some(fallback) => format!("{{{{ {}|default({}) }}}}", name, fallback),
        None => format!("{{{{ {} }}}}", name),
    }
}

/// `{% include "path" with { … } %}`, with an optional `|merge(spread)`.
pub fn create_include_partial(path: &str, properties: &[Property], spread: Option<&str>) -> String {
    let mut with = serialize_component_properties(properties);
    if let Some(spread) = spread {
        with.push_str(&format!("|merge({})", spread));
    }
    create_block(&format!("include \"{}\" with {}", path, with))
}

/// `{ 'name': value, … }`. `key` never reaches a partial.
pub fn serialize_component_properties(properties: &[Property]) -> String {
    let props: Vec<String> = properties
        .iter()
        .filter(|p| p.name != "key")
        .map(|p| format!("'{}': {}", p.name, p.value))
        .collect();
    format!("{{ {} }}", props.join(", "))
}

/// Banner comment: one line as `{# … #}`, several as a `#`-prefixed block.
pub fn create_banner(lines: &[String]) -> String {
    match lines {
        [] => String::new(),
        [line] => create_comment(line),
        lines => {
            let mut out = vec!["{#".to_string()];
            out.extend(lines.iter().map(|line| format!(" # {}", line)));
            out.push(" #}".to_string());
            out.join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replacements::restore;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blocks() {
        assert_eq!(restore(&create_if("a && b > 1")), "\n{% if a and b > 1 %}");
        assert_eq!(create_end_if(), "\n{% endif %}");
        assert_eq!(create_for("items", "item", "key"), "\n{% for key, item in items %}");
        assert_eq!(
            create_default_for_variable("size", "'md'"),
            "\n{% set size = size|default('md') %}"
        );
        assert_eq!(
            create_multiline_variable("x", "<b>y</b>"),
            "\n{% set x %}<b>y</b>\n{% endset %}"
        );
    }

    #[test]
    fn test_variable_output() {
        assert_eq!(create_variable_output("slot_default", None), "{{ slot_default }}");
        assert_eq!(
            create_variable_output("slot_default", Some("slot_default_fallback")),
            "{{ slot_default|default(slot_default_fallback) }}"
        );
    }

    #[test]
    fn test_include() {
        let props = vec![
            Property::new("foo", "bar", true),
            Property::new("key", "id", true),
            Property::new("baz", "\"qux\"", false),
        ];
        assert_eq!(
            create_include_partial("/c.twig", &props, None),
            "\n{% include \"/c.twig\" with { 'foo': bar, 'baz': \"qux\" } %}"
        );
        assert_eq!(
            create_include_partial("/c.twig", &props[..1], Some("attrs")),
            "\n{% include \"/c.twig\" with { 'foo': bar }|merge(attrs) %}"
        );
    }

    #[test]
    fn test_banner() {
        assert_eq!(create_banner(&["Generated".into()]), "{# Generated #}");
        assert_eq!(
            create_banner(&["a".into(), "b".into()]),
            "{#\n # a\n # b\n #}"
        );
    }
}
