//! Value objects recorded during a conversion.

use crate::helpers::kebab_to_camel;
use indexmap::IndexMap;
use smol_str::SmolStr;

pub const SLOT_DEFAULT_NAME: &str = "default";
pub const SLOT_PREFIX: &str = "slot_";
pub const SLOT_VALUE_SUFFIX: &str = "_value";

/// A component tag registered before conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
    pub name: SmolStr,
    /// Path of the compiled partial, as written in the `include` tag.
    pub path: String,
}

/// Registered components, looked up case-insensitively by tag name.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: IndexMap<SmolStr, ComponentDescriptor>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, path: impl Into<String>) {
        self.components.insert(
            SmolStr::new(name.to_ascii_lowercase()),
            ComponentDescriptor {
                name: SmolStr::new(name),
                path: path.into(),
            },
        );
    }

    pub fn get(&self, tag: &str) -> Option<&ComponentDescriptor> {
        self.components.get(tag.to_ascii_lowercase().as_str())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// A property: declared by the current component's script, or passed to an
/// included component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    /// Twig expression, or a quoted literal when `is_binding` is false.
    pub value: String,
    pub is_binding: bool,
    pub is_required: bool,
    pub default: Option<String>,
    pub declared_type: Option<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>, is_binding: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            is_binding,
            is_required: false,
            default: None,
            declared_type: None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.declared_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("number"))
    }
}

/// Content captured for a slot of an included component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub name: String,
    /// Placeholder standing in for the captured HTML until the final pass.
    pub placeholder: String,
    pub content: String,
}

impl Slot {
    /// `slot_<name>`: the property the partial reads.
    pub fn property_name(&self) -> String {
        format!("{}{}", SLOT_PREFIX, self.name)
    }

    /// `slot_<name>_value`: the variable the content is captured into.
    pub fn value_name(&self) -> String {
        format!("{}{}{}", SLOT_PREFIX, self.name, SLOT_VALUE_SUFFIX)
    }
}

/// One usage of a registered component.
#[derive(Debug, Clone)]
pub struct UsedComponent {
    pub name: SmolStr,
    pub path: String,
    pub properties: Vec<Property>,
    pub slots: IndexMap<String, Slot>,
    /// Expression of a `v-bind="…"` spread.
    pub v_bind: Option<String>,
}

impl UsedComponent {
    pub fn new(descriptor: &ComponentDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            path: descriptor.path.clone(),
            properties: Vec::new(),
            slots: IndexMap::new(),
            v_bind: None,
        }
    }

    /// Add a property; kebab-case names become camelCase.
    pub fn add_property(&mut self, name: &str, value: impl Into<String>, is_binding: bool) {
        self.properties
            .push(Property::new(kebab_to_camel(name), value, is_binding));
    }

    pub fn add_slot(&mut self, slot: Slot) {
        self.properties
            .push(Property::new(slot.property_name(), slot.value_name(), true));
        self.slots.insert(slot.name.clone(), slot);
    }

    pub fn has_slot(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }
}

/// A `v-pre` subtree, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pre {
    pub placeholder: String,
    pub value: String,
}

/// An entry of the component's instance data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_registry_is_case_insensitive() {
        let mut registry = ComponentRegistry::new();
        registry.register("ChildComponent", "/templates/ChildComponent.twig");
        assert!(registry.get("childcomponent").is_some());
        assert_eq!(
            registry.get("CHILDCOMPONENT").map(|c| c.path.as_str()),
            Some("/templates/ChildComponent.twig")
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_used_component_properties_and_slots() {
        let mut registry = ComponentRegistry::new();
        registry.register("Card", "card.twig");
        let mut used = UsedComponent::new(registry.get("card").unwrap());
        used.add_property("is-open", "open", true);
        used.add_slot(Slot {
            name: "header".into(),
            placeholder: "__SLOT_1__".into(),
            content: "<b>x</b>".into(),
        });

        assert_eq!(used.properties[0].name, "isOpen");
        assert_eq!(used.properties[1].name, "slot_header");
        assert_eq!(used.properties[1].value, "slot_header_value");
        assert!(used.has_slot("header"));
    }

    #[test]
    fn test_numeric_property() {
        let mut prop = Property::new("count", "", true);
        assert!(!prop.is_numeric());
        prop.declared_type = Some("Number".into());
        assert!(prop.is_numeric());
    }
}
