//! String passes over the serialized template.

use crate::builder::{create_banner, create_multiline_variable};
use crate::concat::convert_concat;
use crate::context::ConvertContext;
use crate::converter::{SCOPED_STYLE_MARKER, SCOPED_STYLE_PROPERTY, WITH_IF_MARKER};
use crate::error::{ConvertError, ConvertResult};
use crate::helpers::hex_decode;
use crate::models::Pre;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Attributes whose unpacked value is always their own name.
const BOOLEAN_ATTRIBUTES: [&str; 3] = ["checked", "selected", "disabled"];

static SCOPE_ATTRIBUTE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"(data-v-[0-9a-f]{32})="""#).ok());
static WITH_IF: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(&format!(r#"{}="([^"]+)""#, WITH_IF_MARKER)).ok());
static TEMPLATE_WRAPPER: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?is)<template>\s*(.*)\s*</template>").ok());
static TEMPLATE_TAG: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)</?template[^>]*?>").ok());
static WHITESPACE_RUN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(\s)+").ok());
static SPACE_AFTER_TAG: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r">[^\S ]+").ok());
static SPACE_BEFORE_TAG: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[^\S ]+<").ok());

/// Assemble the final template from the serialized `<template>` element.
/// A template that serializes to nothing is an error.
pub fn assemble(ctx: &ConvertContext<'_>, body: &str) -> ConvertResult<String> {
    if unwrap_template(body).trim().is_empty() {
        return Err(ConvertError::Serialization {
            node: "template".to_string(),
        });
    }

    let mut blocks = ctx.raw_blocks.clone();
    blocks.push(
        ctx.variables
            .iter()
            .map(|(name, content)| create_multiline_variable(name, content))
            .collect::<String>(),
    );
    let html = format!("{}\n{}", blocks.join("\n"), body);

    let html = ctx.restore_placeholders(&html);
    let html = replace_scoped_placeholders(&html);
    let html = unpack_attributes_with_if(ctx, &html);
    let html = unwrap_template(&html);
    let html = convert_concat(&html, &ctx.numeric_properties());
    let html = replace_pres(&html, &ctx.pres);
    let html = if ctx.options.strip_whitespace {
        strip_whitespace(&html)
    } else {
        html
    };

    Ok(if ctx.options.banner.is_empty() {
        html
    } else {
        format!("{}\n{}", create_banner(&ctx.options.banner), html)
    })
}

/// The scoped-class marker becomes an output, scope attributes lose `=""`.
fn replace_scoped_placeholders(html: &str) -> String {
    let html = html.replace(
        &format!("{}=\"\"", SCOPED_STYLE_MARKER),
        &format!("{{{{ {}|default('') }}}}", SCOPED_STYLE_PROPERTY),
    );
    match SCOPE_ATTRIBUTE.as_ref() {
        Some(re) => re.replace_all(&html, "${1}").into_owned(),
        None => html,
    }
}

/// `__ATTRIBUTE_WITH_IF_CONDITION__="name|payload,…"` becomes one
/// `{% if cond %}name="value"{% endif %}` per entry.
fn unpack_attributes_with_if(ctx: &ConvertContext<'_>, html: &str) -> String {
    let Some(re) = WITH_IF.as_ref() else {
        return html.to_string();
    };
    re.replace_all(html, |caps: &regex::Captures<'_>| {
        caps[1]
            .split(',')
            .filter_map(|entry| {
                let (name, payload) = entry.split_once('|')?;
                let Some(decoded) = hex_decode(payload) else {
                    warn!(attribute = name, "malformed conditional attribute payload");
                    return None;
                };
                let value = ctx.restore_placeholders(&decoded);
                let condition = value.replace("{{", "").replace("}}", "").trim().to_string();
                let value = if BOOLEAN_ATTRIBUTES.contains(&name) {
                    name.to_string()
                } else {
                    value
                };
                Some(format!(
                    "{{% if {} %}}{}=\"{}\"{{% endif %}}",
                    condition, name, value
                ))
            })
            .collect::<Vec<_>>()
            .join(" ")
    })
    .into_owned()
}

/// Drop the root `<template>` and any grouping `<template>` tags.
fn unwrap_template(html: &str) -> String {
    let html = match TEMPLATE_WRAPPER.as_ref() {
        Some(re) => re.replace(html, "${1}").into_owned(),
        None => html.to_string(),
    };
    match TEMPLATE_TAG.as_ref() {
        Some(re) => re.replace_all(&html, "").into_owned(),
        None => html,
    }
}

fn replace_pres(html: &str, pres: &[Pre]) -> String {
    pres.iter().fold(html.to_string(), |acc, pre| {
        acc.replace(&pre.placeholder, &pre.value)
    })
}

/// Collapse whitespace and remove it between tags and Twig delimiters.
pub fn strip_whitespace(html: &str) -> String {
    let (Some(run), Some(after), Some(before)) = (
        WHITESPACE_RUN.as_ref(),
        SPACE_AFTER_TAG.as_ref(),
        SPACE_BEFORE_TAG.as_ref(),
    ) else {
        return html.to_string();
    };
    let html = run.replace_all(html, "${1}").replace('\n', "");
    let html = after.replace_all(&html, ">");
    let html = before.replace_all(&html, "<");
    html.replace("> <", "><")
        .replace("} <", "}<")
        .replace("> {", ">{")
        .replace("} {", "}{")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::hex_encode;
    use crate::models::ComponentRegistry;
    use crate::options::CompilerOptions;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_whitespace() {
        assert_eq!(
            strip_whitespace("<div>\n  <p>a   b</p>\n\n{% if x %} <b>y</b> {% endif %}\n</div>"),
            "<div><p>a b</p>{% if x %}<b>y</b>{% endif %}</div>"
        );
    }

    #[test]
    fn test_scoped_placeholders() {
        let attr = format!("data-v-{}", "a".repeat(32));
        let html = format!("<div {}=\"\" {}=\"\">", attr, SCOPED_STYLE_MARKER);
        assert_eq!(
            replace_scoped_placeholders(&html),
            format!("<div {} {{{{ dataScopedStyleAttribute|default('') }}}}>", attr)
        );
    }

    #[test]
    fn test_unpack_attributes_with_if() {
        let registry = ComponentRegistry::new();
        let ctx = ConvertContext::new(CompilerOptions::default(), &registry);
        let html = format!(
            "<input {}=\"checked|{},title|{}\">",
            WITH_IF_MARKER,
            hex_encode("__DOUBLE_CURLY_OPEN__ a __GREATER__ 1 __DOUBLE_CURLY_CLOSE__"),
            hex_encode("{{ label }}")
        );
        assert_eq!(
            unpack_attributes_with_if(&ctx, &html),
            "<input {% if a > 1 %}checked=\"checked\"{% endif %} {% if label %}title=\"{{ label }}\"{% endif %}>"
        );
    }

    #[test]
    fn test_unwrap_template() {
        assert_eq!(
            unwrap_template("{% set a = 1 %}\n<template>\n<div><template v-x>y</template></div>\n</template>"),
            "{% set a = 1 %}\n<div>y</div>\n"
        );
    }

    #[test]
    fn test_assemble_rejects_empty_template() {
        let registry = ComponentRegistry::new();
        let ctx = ConvertContext::new(CompilerOptions::default(), &registry);
        let err = assemble(&ctx, "<template>\n  \n</template>").unwrap_err();
        assert_eq!(err.kind(), crate::ConvertErrorKind::Serialization);
        assert!(assemble(&ctx, "<template><p></p></template>").is_ok());
    }

    #[test]
    fn test_assemble_prepends_blocks_and_banner() {
        let registry = ComponentRegistry::new();
        let options = CompilerOptions::default()
            .with_banner(["generated"])
            .with_strip_whitespace(false);
        let mut ctx = ConvertContext::new(options, &registry);
        ctx.raw_blocks.push("{% set a = 1 %}".to_string());
        ctx.add_variable("v", "<b>x</b>").unwrap();
        let out = assemble(&ctx, "<template><p>x</p></template>").unwrap();
        assert_eq!(
            out,
            "{# generated #}\n{% set a = 1 %}\n\n{% set v %}<b>x</b>\n{% endset %}\n<p>x</p>"
        );
    }
}
