//! Vue single-file component splitter.
//!
//! Breaks a `.vue` file into its top-level blocks: the template, scripts,
//! styles and custom blocks such as `<twig>` and `<twig-config>`. Block
//! contents are kept verbatim; parsing the template markup is left to
//! `vue-dom`.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use error::{ErrorCode, ParseError, ParseResult};
pub use parser::parse_sfc;

/// Split a `.vue` file into blocks.
pub fn parse(source: &str) -> ParseResult<Sfc> {
    parse_sfc(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_component() {
        let source = r#"<template>
  <div>Hello {{ name }}</div>
</template>

<script>
export default {
  props: { name: { type: String, default: 'World' } },
}
</script>

<style scoped>
div { color: red; }
</style>
"#;
        let result = parse(source).unwrap();
        assert!(result.template.is_some());
        assert!(result.script.is_some());
        assert_eq!(result.styles.len(), 1);
        assert!(result.styles[0].scoped);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_script_setup_is_fallback_script() {
        let source = r#"<script setup lang="ts">
const props = defineProps<{ msg: string }>()
</script>"#;
        let result = parse(source).unwrap();
        assert!(result.script.is_none());
        assert!(result.primary_script().is_some_and(|s| s.setup));
    }
}
