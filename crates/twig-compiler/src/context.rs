//! Conversion context.

use crate::error::{ConvertError, ConvertResult};
use crate::models::{ComponentRegistry, Pre, Property};
use crate::options::CompilerOptions;
use crate::replacements;
use crate::style::StyleBuilder;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use vue_dom::NodeId;

/// The `v-model` of the `<select>` currently being converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectModel {
    pub value: String,
    pub multiple: bool,
}

/// State of a single conversion.
#[derive(Debug)]
pub struct ConvertContext<'a> {
    /// Compiler options with the file's `<twig-config>` applied.
    pub options: CompilerOptions,
    pub components: &'a ComponentRegistry,
    /// Props declared by the component script.
    pub properties: IndexMap<String, Property>,
    /// Per nesting level: the node closing the open `v-if` chain.
    pub last_close_if: FxHashMap<usize, NodeId>,
    pub select_model: Option<SelectModel>,
    /// Placeholders restored after serialization, in insertion order.
    pub replace_variables: IndexMap<String, String>,
    /// Multi-line `{% set %}` variables written before the markup.
    pub variables: IndexMap<String, String>,
    pub pres: Vec<Pre>,
    /// Twig emitted before the markup.
    pub raw_blocks: Vec<String>,
    pub styles: StyleBuilder,
    slot_fallback_counters: FxHashMap<String, usize>,
    /// Counter for generating unique names.
    counter: u32,
}

impl<'a> ConvertContext<'a> {
    pub fn new(options: CompilerOptions, components: &'a ComponentRegistry) -> Self {
        let styles = StyleBuilder::new(&options);
        Self {
            options,
            components,
            properties: IndexMap::new(),
            last_close_if: FxHashMap::default(),
            select_model: None,
            replace_variables: IndexMap::new(),
            variables: IndexMap::new(),
            pres: Vec::new(),
            raw_blocks: Vec::new(),
            styles,
            slot_fallback_counters: FxHashMap::default(),
            counter: 0,
        }
    }

    /// Generate a unique placeholder, `__<PREFIX>_<n>__`.
    pub fn unique_id(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("__{}_{}__", prefix, self.counter)
    }

    /// Register a multi-line variable. Names are unique per conversion.
    pub fn add_variable(&mut self, name: &str, content: impl Into<String>) -> ConvertResult<()> {
        if self.variables.contains_key(name) {
            return Err(ConvertError::DuplicateVariable {
                name: name.to_string(),
            });
        }
        self.variables.insert(name.to_string(), content.into());
        Ok(())
    }

    /// Name of the variable holding a slot's fallback content:
    /// `<slot>_fallback`, then `<slot>_fallback_2` and so on per slot.
    pub fn next_slot_fallback_name(&mut self, slot_name: &str) -> String {
        let key = format!("{}_fallback", slot_name);
        let count = self.slot_fallback_counters.entry(key.clone()).or_insert(0);
        *count += 1;
        match *count {
            1 => key,
            n => format!("{}_{}", key, n),
        }
    }

    /// Put back placeholders and captured slot content.
    pub fn restore_placeholders(&self, html: &str) -> String {
        let html = replacements::restore(html);
        self.replace_variables
            .iter()
            .fold(html, |acc, (placeholder, value)| acc.replace(placeholder, value))
    }

    /// Names of props declared as numbers.
    pub fn numeric_properties(&self) -> FxHashSet<String> {
        self.properties
            .values()
            .filter(|p| p.is_numeric())
            .map(|p| p.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unique_id() {
        let registry = ComponentRegistry::new();
        let mut ctx = ConvertContext::new(CompilerOptions::default(), &registry);
        assert_eq!(ctx.unique_id("PRE"), "__PRE_1__");
        assert_eq!(ctx.unique_id("SLOT"), "__SLOT_2__");
    }

    #[test]
    fn test_duplicate_variable() {
        let registry = ComponentRegistry::new();
        let mut ctx = ConvertContext::new(CompilerOptions::default(), &registry);
        ctx.add_variable("a", "x").unwrap();
        let err = ctx.add_variable("a", "y").unwrap_err();
        assert_eq!(err.to_string(), "The variable a is already registered.");
    }

    #[test]
    fn test_slot_fallback_names() {
        let registry = ComponentRegistry::new();
        let mut ctx = ConvertContext::new(CompilerOptions::default(), &registry);
        assert_eq!(ctx.next_slot_fallback_name("slot_default"), "slot_default_fallback");
        assert_eq!(ctx.next_slot_fallback_name("slot_x"), "slot_x_fallback");
        assert_eq!(ctx.next_slot_fallback_name("slot_default"), "slot_default_fallback_2");
    }

    #[test]
    fn test_restore_placeholders() {
        let registry = ComponentRegistry::new();
        let mut ctx = ConvertContext::new(CompilerOptions::default(), &registry);
        ctx.replace_variables
            .insert("__SLOT_1__".into(), "<b>{{ a }}</b>".into());
        assert_eq!(
            ctx.restore_placeholders("__DOUBLE_CURLY_OPEN__ x __DOUBLE_CURLY_CLOSE__ __SLOT_1__"),
            "{{ x }} <b>{{ a }}</b>"
        );
    }
}
