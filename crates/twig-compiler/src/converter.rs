//! Node converter: walks the template tree and rewrites Vue directives into
//! Twig in place.
//!
//! Control flow is spliced in as sibling text nodes (`{% if %}` before an
//! element, `{% endif %}` after it). Registered components are replaced by
//! an `{% include %}` with their props and captured slots. Everything that
//! would not survive serialization is written in placeholder form and put
//! back by the assembler.

use crate::binding::{self, Binding};
use crate::builder::{
    close_set, create_else, create_else_if, create_end_for, create_end_if, create_for,
    create_for_item_in_list, create_if, create_include_partial, create_set, create_variable,
    create_variable_output,
};
use crate::context::{ConvertContext, SelectModel};
use crate::error::{ConvertError, ConvertResult};
use crate::expression::{refactor_condition, refactor_template_string, refactor_text_node};
use crate::helpers::hex_encode;
use crate::models::{
    ComponentDescriptor, Pre, Property, Slot, UsedComponent, SLOT_DEFAULT_NAME, SLOT_PREFIX,
};
use crate::options::StyleOutput;
use crate::replacements::{self, Replacement};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};
use vue_dom::{Document, NodeData, NodeId};

/// Attribute marking a root element for scoped-class merging.
pub const SCOPED_STYLE_MARKER: &str = "__DATA_SCOPED_STYLE_ATTRIBUTE__";
/// Attribute gathering `name|payload` entries rendered inside `{% if %}`.
pub const WITH_IF_MARKER: &str = "__ATTRIBUTE_WITH_IF_CONDITION__";
/// Include property carrying the scope attribute to a child component.
pub const SCOPED_STYLE_PROPERTY: &str = "dataScopedStyleAttribute";

static IGNORED_COMMENT: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)^(eslint-disable|@?todo)").ok());

/// `v-model` on a checkbox or radio input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum InputModel {
    Checkbox(String),
    Radio(String),
}

pub struct NodeConverter<'c, 'a> {
    ctx: &'c mut ConvertContext<'a>,
    doc: &'c mut Document,
}

impl<'c, 'a> NodeConverter<'c, 'a> {
    pub fn new(ctx: &'c mut ConvertContext<'a>, doc: &'c mut Document) -> Self {
        Self { ctx, doc }
    }

    /// Convert the children of the `<template>` element. They are the
    /// root level (level 1) of the output.
    pub fn convert_root(&mut self, template: NodeId) -> ConvertResult<()> {
        let roots = self.doc.element_children(template).len();
        if roots > 1 {
            warn!(count = roots, "template has more than one root element");
        }
        self.convert_children(template, 1)
    }

    /// Convert a snapshot of the children. Nodes moved away by an earlier
    /// sibling's conversion are skipped.
    fn convert_children(&mut self, parent: NodeId, level: usize) -> ConvertResult<()> {
        let children = self.doc.children(parent).to_vec();
        for child in children {
            if self.doc.parent(child) != Some(parent) {
                continue;
            }
            self.convert_node(child, level)?;
        }
        Ok(())
    }

    pub fn convert_node(&mut self, id: NodeId, level: usize) -> ConvertResult<()> {
        match self.doc.data(id) {
            NodeData::Comment(text) => {
                let ignored = IGNORED_COMMENT
                    .as_ref()
                    .is_some_and(|re| re.is_match(text.trim()));
                if ignored {
                    self.doc.detach(id);
                }
                Ok(())
            }
            NodeData::Text(text) => {
                if !text.trim().is_empty() {
                    let text = refactor_text_node(text);
                    self.doc.set_text(id, text);
                }
                Ok(())
            }
            NodeData::Element(_) => self.convert_element(id, level),
            NodeData::Document => {
                warn!("document node found in template");
                Ok(())
            }
        }
    }

    fn convert_element(&mut self, id: NodeId, level: usize) -> ConvertResult<()> {
        let tag = self.doc.tag_name(id).unwrap_or_default().to_string();

        if self.doc.has_attribute(id, "data-twig-remove") {
            debug!(%tag, "removed element");
            self.doc.detach(id);
            return Ok(());
        }
        if self.doc.has_attribute(id, "v-pre") {
            self.handle_pre(id);
            return Ok(());
        }

        self.replace_show_with_if(id);
        self.handle_if(id, &tag, level)?;
        self.handle_for(id);
        let input_model = self.handle_model(id, &tag);
        self.handle_output_directive(id, "v-html", true);
        self.handle_output_directive(id, "v-text", false);
        self.strip_event_handlers(id);

        if tag == "slot" {
            return self.handle_slot(id, level);
        }

        self.cleanup_attributes(id);
        self.add_scoped_attribute(id, level);

        if let Some(descriptor) = self.ctx.components.get(&tag).cloned() {
            return self.convert_component(id, &descriptor, level);
        }

        self.handle_attribute_binding(id, &tag);
        let attribute_if = self
            .option_condition(id, &tag)
            .or_else(|| input_model.and_then(|model| self.input_condition(id, &model)));

        if level == 1 {
            self.add_root_attributes(id);
        }

        self.convert_children(id, level + 1)?;

        if let Some((condition, attribute)) = attribute_if {
            self.add_attribute_if(id, &condition, attribute);
        }
        if tag == "select" {
            self.ctx.select_model = None;
        }
        Ok(())
    }

    // Directives

    fn handle_pre(&mut self, id: NodeId) {
        self.doc.remove_attribute(id, "v-pre");
        let html = self.doc.outer_html(id);
        let placeholder = self.ctx.unique_id("PRE");
        let text = self.doc.create_text(placeholder.clone());
        self.doc.replace_with(id, text);
        debug!(%placeholder, "captured v-pre block");
        self.ctx.pres.push(Pre {
            placeholder,
            value: format!("{{% verbatim %}}{}{{% endverbatim %}}", html),
        });
    }

    fn replace_show_with_if(&mut self, id: NodeId) {
        if let Some(condition) = self.doc.attribute(id, "v-show").map(str::to_string) {
            self.doc.set_attribute(id, "v-if", condition);
            self.doc.remove_attribute(id, "v-show");
        }
    }

    fn handle_if(&mut self, id: NodeId, tag: &str, level: usize) -> ConvertResult<()> {
        let twig_if = self.doc.attribute(id, "data-twig-if").map(str::to_string);

        if let Some(condition) = self.doc.attribute(id, "v-if").map(str::to_string) {
            let condition = twig_if.unwrap_or(condition);
            debug!(%condition, level, "v-if");
            let open = self.doc.create_text(create_if(&condition));
            self.doc.insert_before(id, open);
            let close = self.doc.create_text(create_end_if());
            self.doc.insert_after(id, close);
            self.ctx.last_close_if.insert(level, close);
            self.doc.remove_attribute(id, "v-if");
            self.doc.remove_attribute(id, "data-twig-if");
        } else if let Some(condition) = self.doc.attribute(id, "v-else-if").map(str::to_string) {
            let condition = twig_if.unwrap_or(condition);
            debug!(%condition, level, "v-else-if");
            let open = self.open_chain(id, tag, level, "v-else-if")?;
            self.doc.set_text(open, create_else_if(&condition));
            let close = self.doc.create_text(create_end_if());
            self.doc.insert_after(id, close);
            self.ctx.last_close_if.insert(level, close);
            self.doc.remove_attribute(id, "v-else-if");
            self.doc.remove_attribute(id, "data-twig-if");
        } else if self.doc.has_attribute(id, "v-else") {
            debug!(level, "v-else");
            let open = self.open_chain(id, tag, level, "v-else")?;
            self.doc.set_text(open, create_else());
            let close = self.doc.create_text(create_end_if());
            self.doc.insert_after(id, close);
            // The chain is complete.
            self.ctx.last_close_if.remove(&level);
            self.doc.remove_attribute(id, "v-else");
        }
        Ok(())
    }

    /// The `{% endif %}` of the chain a branch continues. It must be a
    /// sibling of the branch.
    fn open_chain(
        &self,
        id: NodeId,
        tag: &str,
        level: usize,
        directive: &str,
    ) -> ConvertResult<NodeId> {
        self.ctx
            .last_close_if
            .get(&level)
            .copied()
            .filter(|&close| {
                self.doc.parent(close).is_some() && self.doc.parent(close) == self.doc.parent(id)
            })
            .ok_or_else(|| ConvertError::OrphanBranch {
                directive: directive.to_string(),
                tag: tag.to_string(),
            })
    }

    fn handle_for(&mut self, id: NodeId) {
        let Some(expression) = self.doc.attribute(id, "v-for").map(str::to_string) else {
            return;
        };
        self.doc.remove_attribute(id, "v-for");

        let Some((left, list)) = split_for_expression(&expression) else {
            warn!(%expression, "unrecognized v-for expression");
            return;
        };
        let list = if is_whole_number(list) {
            format!("1..{}", list)
        } else {
            refactor_condition(list)
        };

        let command = if left.contains(',') {
            let bindings = left.replace(['(', ')'], "");
            let parts: Vec<&str> = bindings.split(',').map(str::trim).collect();
            let value = parts.first().copied().unwrap_or_default();
            let key = parts.get(1).copied().unwrap_or_default();
            let mut command = create_for(&list, value, key);
            if let Some(index) = parts.get(2).filter(|i| !i.is_empty()) {
                command.push_str(&create_variable(index, "loop.index0"));
            }
            command
        } else {
            create_for_item_in_list(left.trim_matches(['(', ')']).trim(), &list)
        };
        debug!(%expression, "v-for");

        let start = self.doc.create_text(command);
        self.doc.insert_before(id, start);
        let end = self.doc.create_text(create_end_for());
        self.doc.insert_after(id, end);
    }

    fn handle_model(&mut self, id: NodeId, tag: &str) -> Option<InputModel> {
        let model = self.doc.attribute(id, "v-model")?.trim().to_string();
        self.doc.remove_attribute(id, "v-model");
        debug!(%tag, %model, "v-model");

        match tag {
            "textarea" => {
                self.doc.set_attribute(id, "v-text", model);
                None
            }
            "input" => match self.doc.attribute(id, "type") {
                Some("checkbox") => Some(InputModel::Checkbox(model)),
                Some("radio") => Some(InputModel::Radio(model)),
                _ => {
                    self.doc.set_attribute(id, ":value", model);
                    None
                }
            },
            "select" => {
                if self.ctx.select_model.is_some() {
                    warn!("nested select with v-model is not supported");
                }
                self.ctx.select_model = Some(SelectModel {
                    value: model,
                    multiple: self.doc.has_attribute(id, "multiple"),
                });
                None
            }
            _ => None,
        }
    }

    /// `v-html` (raw) and `v-text`: the element's content becomes the output
    /// of the expression.
    fn handle_output_directive(&mut self, id: NodeId, directive: &str, raw: bool) {
        let Some(expression) = self.doc.attribute(id, directive).map(str::to_string) else {
            return;
        };
        self.doc.remove_attribute(id, directive);
        self.doc.remove_children(id);

        let mut expression = refactor_condition(expression.trim());
        if raw {
            expression.push_str("|raw");
        }
        let text = self.doc.create_text(replacements::output(&expression));
        self.doc.append_child(id, text);
    }

    fn strip_event_handlers(&mut self, id: NodeId) {
        self.doc
            .retain_attributes(id, |a| !(a.name.starts_with("v-on:") || a.name.starts_with('@')));
    }

    fn handle_slot(&mut self, id: NodeId, level: usize) -> ConvertResult<()> {
        self.convert_children(id, level + 1)?;

        let name = self
            .doc
            .attribute(id, "name")
            .filter(|n| !n.is_empty())
            .map(|n| n.replace('-', "_"))
            .unwrap_or_else(|| SLOT_DEFAULT_NAME.to_string());
        let slot_name = format!("{}{}", SLOT_PREFIX, name);

        let fallback = self.doc.inner_html(id);
        let output = if fallback.trim().is_empty() {
            create_variable_output(&slot_name, None)
        } else {
            let variable = self.ctx.next_slot_fallback_name(&slot_name);
            self.ctx.add_variable(&variable, fallback)?;
            create_variable_output(&slot_name, Some(&variable))
        };
        debug!(slot = %slot_name, "slot placeholder");

        let text = self.doc.create_text(output);
        self.doc.replace_with(id, text);
        Ok(())
    }

    /// Drop directives Twig has no use for. Bindings, slot declarations and
    /// `v-cloak` stay; `ref` goes.
    fn cleanup_attributes(&mut self, id: NodeId) {
        self.doc.retain_attributes(id, |a| !is_discarded_attribute(&a.name));
    }

    fn add_scoped_attribute(&mut self, id: NodeId, level: usize) {
        if let Some(scope) = self.ctx.styles.scoped_attribute().map(str::to_string) {
            self.doc.set_attribute(id, &scope, "");
        }
        if level == 1 && self.ctx.styles.output().contains(StyleOutput::SCOPED) {
            self.doc.set_attribute(id, SCOPED_STYLE_MARKER, "");
        }
    }

    // Plain elements

    fn handle_attribute_binding(&mut self, id: NodeId, tag: &str) {
        for attribute in self.doc.attributes(id).to_vec() {
            let raw_name = attribute.name.as_str();
            if raw_name == "v-bind" {
                warn!(%tag, "v-bind spread is only supported on components");
                self.doc.remove_attribute(id, raw_name);
                continue;
            }
            let Some(name) = raw_name
                .strip_prefix("v-bind:")
                .or_else(|| raw_name.strip_prefix(':'))
            else {
                continue;
            };

            let value = replacements::sanitize_single(attribute.value(), Replacement::Pipe);
            let static_value = self.doc.attribute(id, name).unwrap_or_default().to_string();
            self.doc.remove_attribute(id, raw_name);

            if name == "key" || value.trim() == "false" {
                continue;
            }

            let fragments = match binding::resolve(&value, name, true) {
                Binding::BooleanTrue => {
                    self.doc.set_attribute(id, name, name);
                    continue;
                }
                Binding::Fragments(fragments) => fragments,
            };

            let with_if = self.ctx.options.attributes_with_if.iter().any(|a| a == name);
            let target = match Replacement::for_attribute(name, tag) {
                Some(replacement) => {
                    self.doc.remove_attribute(id, name);
                    replacement.placeholder().to_string()
                }
                None => name.to_string(),
            };
            let value = implode_attribute_value(name, fragments, &static_value);

            if with_if && !value.is_empty() {
                let condition = refactor_condition(&self.ctx.restore_placeholders(&value));
                let entry = format!("{}|{}", name, hex_encode(&condition));
                let gathered = match self.doc.attribute(id, WITH_IF_MARKER) {
                    Some(existing) if !existing.is_empty() => format!("{},{}", existing, entry),
                    _ => entry,
                };
                self.doc.set_attribute(id, WITH_IF_MARKER, gathered);
            } else {
                self.doc.set_attribute(id, &target, value);
            }
        }
    }

    /// `selected` condition of an `<option>` inside a `<select v-model>`.
    fn option_condition(&self, id: NodeId, tag: &str) -> Option<(String, &'static str)> {
        if tag != "option" {
            return None;
        }
        let model = self.ctx.select_model.as_ref()?;
        let value = match self.doc.attribute(id, "value") {
            Some(value) => value.to_string(),
            None => self.doc.text_content(id).trim().to_string(),
        };
        let value = quote_model_value(&value);
        let condition = if model.multiple {
            format!("{0} is iterable and {1} in {0}", model.value, value)
        } else {
            format!("{} == {}", model.value, value)
        };
        Some((condition, "selected"))
    }

    /// `checked` condition of a checkbox or radio with `v-model`.
    fn input_condition(&self, id: NodeId, model: &InputModel) -> Option<(String, &'static str)> {
        let value = quote_model_value(self.doc.attribute(id, "value")?);
        let condition = match (model, self.doc.attribute(id, "type")?) {
            (InputModel::Checkbox(m), "checkbox") => format!(
                "({0} is iterable and {1} in {0})  or ({0} is not iterable and {0})",
                m, value
            ),
            (InputModel::Radio(m), "radio") => format!("{} == {}", m, value),
            _ => return None,
        };
        Some((condition, "checked"))
    }

    /// Render the element with `attribute` when `condition` holds and an
    /// unchanged copy without it otherwise.
    fn add_attribute_if(&mut self, id: NodeId, condition: &str, attribute: &str) {
        let clone = self.doc.clone_subtree(id);
        self.doc.set_attribute(id, attribute, attribute);
        self.doc.remove_attribute(clone, attribute);

        let open = self.doc.create_text(create_if(condition));
        self.doc.insert_before(id, open);
        let end = self.doc.create_text(create_end_if());
        self.doc.insert_after(id, end);
        self.doc.insert_after(id, clone);
        let otherwise = self.doc.create_text(create_else());
        self.doc.insert_after(id, otherwise);
    }

    /// Root elements take `class`/`style` from the including template.
    fn add_root_attributes(&mut self, id: NodeId) {
        for name in self.ctx.options.include_attributes.clone() {
            let inherited = replacements::output(&format!("{}|default('')", name));
            let value = match self.doc.attribute(id, &name) {
                Some(existing) if !existing.trim().is_empty() => {
                    format!("{} {}", existing, inherited)
                }
                _ => inherited,
            };
            self.doc.set_attribute(id, &name, value);
        }
    }

    // Components

    fn convert_component(
        &mut self,
        id: NodeId,
        descriptor: &ComponentDescriptor,
        level: usize,
    ) -> ConvertResult<()> {
        debug!(component = %descriptor.name, level, "component include");
        let mut used = UsedComponent::new(descriptor);
        let scope = self.ctx.styles.scoped_attribute().map(str::to_string);

        for attribute in self.doc.attributes(id).to_vec() {
            let name = attribute.name.as_str();
            let value = attribute.value();
            if name == "v-bind" {
                used.v_bind = Some(value.trim().to_string());
            } else if let Some(prop) = name.strip_prefix("v-bind:").or_else(|| name.strip_prefix(':')) {
                let value = if value.contains('`') {
                    replacements::sanitize(&refactor_template_string(value.trim()))
                } else {
                    refactor_condition(value.trim())
                };
                used.add_property(prop, value, true);
            } else if scope.as_deref() == Some(name) || name == SCOPED_STYLE_MARKER {
                // Resolved when the include properties are prepared.
                used.properties.push(Property::new(name, "", false));
            } else if name == "v-cloak" || name.starts_with("v-slot") || name.starts_with('#') {
                continue;
            } else {
                used.add_property(name, format!("\"{}\"", replacements::sanitize(value)), false);
            }
        }

        self.convert_children(id, level + 1)?;

        for child in self.doc.element_children(id) {
            if self.doc.tag_name(child) != Some("template") {
                continue;
            }
            let Some(slot_name) = self.slot_declaration(child) else {
                continue;
            };
            let content = self.ctx.restore_placeholders(&self.doc.inner_html(child));
            self.add_slot(&mut used, slot_name, content);
            self.doc.detach(child);
        }
        if !used.has_slot(SLOT_DEFAULT_NAME) {
            let content = self.ctx.restore_placeholders(&self.doc.inner_html(id));
            self.add_slot(&mut used, SLOT_DEFAULT_NAME.to_string(), content.trim().to_string());
        }

        let (properties, spread) = self.prepare_include_properties(&used, level == 1);
        let include = self
            .doc
            .create_text(create_include_partial(&used.path, &properties, spread.as_deref()));
        self.doc.insert_before(id, include);

        for slot in used.slots.values() {
            let open = self.doc.create_text(create_set(&slot.value_name()));
            let content = self.doc.create_text(slot.placeholder.clone());
            let close = self.doc.create_text(close_set());
            self.doc.insert_before(include, open);
            self.doc.insert_before(include, content);
            self.doc.insert_before(include, close);
        }

        self.doc.detach(id);
        Ok(())
    }

    /// Slot name declared by `v-slot`, `v-slot:name` or `#name`.
    fn slot_declaration(&self, template: NodeId) -> Option<String> {
        self.doc.attributes(template).iter().find_map(|a| {
            let name = a.name.as_str();
            let declared = if name == "v-slot" {
                ""
            } else {
                name.strip_prefix("v-slot:").or_else(|| name.strip_prefix('#'))?
            };
            Some(if declared.is_empty() {
                SLOT_DEFAULT_NAME.to_string()
            } else {
                declared.replace('-', "_")
            })
        })
    }

    fn add_slot(&mut self, used: &mut UsedComponent, name: String, content: String) {
        let placeholder = self.ctx.unique_id("SLOT");
        debug!(slot = %name, %placeholder, "captured slot content");
        self.ctx
            .replace_variables
            .insert(placeholder.clone(), content.clone());
        used.add_slot(Slot {
            name,
            placeholder,
            content,
        });
    }

    /// Merge mergeable attributes into one property each, resolve the scope
    /// markers and expand `v-bind`. Returns the properties and the spread
    /// expression, if any.
    fn prepare_include_properties(
        &self,
        used: &UsedComponent,
        is_root: bool,
    ) -> (Vec<Property>, Option<String>) {
        let include_attributes = &self.ctx.options.include_attributes;
        let scope = self.ctx.styles.scoped_attribute();
        let mut merged: IndexMap<&str, Vec<String>> = IndexMap::new();
        let mut properties: Vec<Property> = Vec::new();
        let mut has_scope_property = false;

        for property in &used.properties {
            let name = property.name.as_str();
            if let Some(attribute) = include_attributes.iter().find(|a| *a == name) {
                let entry = merged.entry(attribute.as_str()).or_default();
                if property.is_binding {
                    entry.extend(binding::resolve(&property.value, name, false).into_fragments());
                } else {
                    entry.push(property.value.clone());
                }
            } else if scope == Some(name) {
                has_scope_property = true;
                properties.push(Property::new(
                    SCOPED_STYLE_PROPERTY,
                    format!("\"{}\"", name),
                    false,
                ));
            } else if name == SCOPED_STYLE_MARKER {
                let inherited = format!("{}|default('')", SCOPED_STYLE_PROPERTY);
                if has_scope_property {
                    for scoped in properties
                        .iter_mut()
                        .filter(|p| p.name == SCOPED_STYLE_PROPERTY)
                    {
                        scoped.value.push_str(&format!(" ~ \" \" ~ {}", inherited));
                    }
                } else {
                    properties.push(Property::new(SCOPED_STYLE_PROPERTY, inherited, false));
                }
            } else {
                properties.push(property.clone());
            }
        }

        let mut spread = None;
        match used.v_bind.as_deref() {
            Some("$props") => {
                properties.extend(self.ctx.properties.values().map(|declared| {
                    let mut passed = declared.clone();
                    passed.value = declared.name.clone();
                    passed
                }));
            }
            Some(expression) if !expression.is_empty() => {
                spread = Some(refactor_condition(expression));
            }
            _ => {}
        }

        for attribute in include_attributes {
            let glue = if attribute == "style" {
                " ~ \"; \" ~ "
            } else {
                " ~ \" \" ~ "
            };
            let entry = merged.entry(attribute.as_str()).or_default();
            if is_root {
                entry.push(format!("{}|default('')", attribute));
            }
            let value = if entry.is_empty() {
                "\"\"".to_string()
            } else {
                entry.join(glue)
            };
            properties.push(Property::new(attribute.clone(), value, false));
        }

        (properties, spread)
    }
}

/// Directive attributes with no Twig meaning.
fn is_discarded_attribute(name: &str) -> bool {
    if name == "ref" || name == ":ref" {
        return true;
    }
    match name.strip_prefix("v-") {
        Some(rest) => {
            let directive: String = rest.chars().take_while(|c| c.is_ascii_lowercase()).collect();
            !matches!(directive.as_str(), "bind" | "slot" | "cloak")
        }
        None => false,
    }
}

/// Split `left in right` (or `of`) at the first separator, trimmed.
fn split_for_expression(expression: &str) -> Option<(&str, &str)> {
    let position = [" in ", " of "]
        .iter()
        .filter_map(|sep| expression.find(sep))
        .min()?;
    let left = expression[..position].trim();
    let right = expression[position + 4..].trim();
    (!left.is_empty() && !right.is_empty()).then_some((left, right))
}

fn is_whole_number(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Quote a static `value` for comparison, splicing bound output in with `~`.
fn quote_model_value(value: &str) -> String {
    format!(
        "\"{}\"",
        value
            .replace(Replacement::DoubleCurlyOpen.placeholder(), "\" ~")
            .replace(Replacement::DoubleCurlyClose.placeholder(), "~ \"")
    )
}

/// Join bound fragments with the static value. Style declarations are
/// normalized to end in `;`.
fn implode_attribute_value(name: &str, mut values: Vec<String>, static_value: &str) -> String {
    let terminate = |v: &str| format!("{};", v.trim().trim_end_matches(';').trim_end());
    let static_value = if name == "style" && !static_value.trim().is_empty() {
        terminate(static_value)
    } else {
        static_value.to_string()
    };
    if name == "style" {
        for value in values.iter_mut() {
            *value = terminate(value);
        }
    }
    if !static_value.is_empty() {
        values.insert(0, static_value);
    }
    values.join(" ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComponentRegistry;
    use crate::options::CompilerOptions;
    use pretty_assertions::assert_eq;

    fn options() -> CompilerOptions {
        CompilerOptions {
            include_attributes: Vec::new(),
            ..CompilerOptions::default()
        }
    }

    fn run<'r>(
        template: &str,
        options: CompilerOptions,
        registry: &'r ComponentRegistry,
    ) -> ConvertResult<(String, ConvertContext<'r>)> {
        let mut ctx = ConvertContext::new(options, registry);
        let mut doc = Document::new();
        let root = doc.root();
        let element = doc.create_element("template");
        doc.append_child(root, element);
        vue_dom::parse_into(&mut doc, element, template)?;
        NodeConverter::new(&mut ctx, &mut doc).convert_root(element)?;
        let html = ctx.restore_placeholders(&doc.inner_html(element));
        Ok((html, ctx))
    }

    fn convert(template: &str) -> String {
        let registry = ComponentRegistry::new();
        run(template, options(), &registry).unwrap().0
    }

    #[test]
    fn test_if_chain() {
        assert_eq!(
            convert(r#"<div><p v-if="a">1</p><p v-else-if="b === 2">2</p><p v-else>3</p></div>"#),
            "<div>\n{% if a %}<p>1</p>\n{% elseif b == 2 %}<p>2</p>\n{% else %}<p>3</p>\n{% endif %}</div>"
        );
    }

    #[test]
    fn test_show_and_twig_if() {
        assert_eq!(
            convert(r#"<div><p v-show="open">x</p><b v-if="a" data-twig-if="b">y</b></div>"#),
            "<div>\n{% if open %}<p>x</p>\n{% endif %}\n{% if b %}<b>y</b>\n{% endif %}</div>"
        );
    }

    #[test]
    fn test_orphan_else() {
        let registry = ComponentRegistry::new();
        let err = run(r#"<div><p v-else>x</p></div>"#, options(), &registry).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Found v-else without a preceding v-if on <p>."
        );
    }

    #[test]
    fn test_for_shapes() {
        assert_eq!(
            convert(r#"<ul><li v-for="item in items">{{ item }}</li></ul>"#),
            "<ul>\n{% for item in items %}<li>{{ item }}</li>\n{% endfor %}</ul>"
        );
        assert_eq!(
            convert(r#"<ul><li v-for="(value, key) in object">x</li></ul>"#),
            "<ul>\n{% for key, value in object %}<li>x</li>\n{% endfor %}</ul>"
        );
        assert_eq!(
            convert(r#"<ul><li v-for="(value, key, index) of object">x</li></ul>"#),
            "<ul>\n{% for key, value in object %}\n{% set index = loop.index0 %}<li>x</li>\n{% endfor %}</ul>"
        );
        assert_eq!(
            convert(r#"<ul><li v-for="n in 5">x</li></ul>"#),
            "<ul>\n{% for n in 1..5 %}<li>x</li>\n{% endfor %}</ul>"
        );
    }

    #[test]
    fn test_html_and_text() {
        assert_eq!(
            convert(r#"<div><p v-html="content">old</p><span v-text="label"></span></div>"#),
            "<div><p>{{ content|raw }}</p><span>{{ label }}</span></div>"
        );
    }

    #[test]
    fn test_textarea_model() {
        assert_eq!(
            convert(r#"<div><textarea v-model="message"></textarea></div>"#),
            "<div><textarea>{{ message }}</textarea></div>"
        );
    }

    #[test]
    fn test_input_model_becomes_value() {
        assert_eq!(
            convert(r#"<div><input type="text" v-model="name"></div>"#),
            r#"<div><input type="text" value="{{ name }}"></div>"#
        );
    }

    #[test]
    fn test_events_refs_and_directives_are_removed() {
        assert_eq!(
            convert(r#"<div><a @click="go" v-on:hover="h" ref="link" v-custom="x" v-cloak>x</a></div>"#),
            "<div><a v-cloak>x</a></div>"
        );
    }

    #[test]
    fn test_twig_remove_and_comments() {
        assert_eq!(
            convert("<div><!-- eslint-disable --><!-- keep --><p data-twig-remove>x</p></div>"),
            "<div><!-- keep --></div>"
        );
    }

    #[test]
    fn test_pre_is_opaque() {
        let registry = ComponentRegistry::new();
        let (html, ctx) = run(
            r#"<div><span v-pre v-if="x">{{ raw }}</span></div>"#,
            options(),
            &registry,
        )
        .unwrap();
        assert_eq!(html, "<div>__PRE_1__</div>");
        assert_eq!(
            ctx.pres[0].value,
            r#"{% verbatim %}<span v-if="x">{{ raw }}</span>{% endverbatim %}"#
        );
    }

    #[test]
    fn test_attribute_bindings() {
        assert_eq!(
            convert(r#"<div><a :href="url" :key="id" :title="'x'" class="a" :class="{ b: isB }">x</a></div>"#),
            r#"<div><a class="a {{ isB ? 'b ' : '' }}" href="{{ url }}" title="{{ 'x' }}">x</a></div>"#
        );
    }

    #[test]
    fn test_false_binding_is_dropped() {
        assert_eq!(
            convert(r#"<div><input type="checkbox" :checked="false"></div>"#),
            r#"<div><input type="checkbox"></div>"#
        );
    }

    #[test]
    fn test_true_binding() {
        assert_eq!(
            convert(r#"<div><input :disabled="true"></div>"#),
            r#"<div><input disabled="disabled"></div>"#
        );
    }

    #[test]
    fn test_with_if_attribute_is_gathered() {
        let html = convert(r#"<div><input type="checkbox" :checked="foo === 1"></div>"#);
        assert!(html.contains(WITH_IF_MARKER));
        assert!(!html.contains("checked="));
    }

    #[test]
    fn test_style_binding_is_terminated() {
        assert_eq!(
            convert(r#"<div><p style="color: red" :style="{ fontSize: size }">x</p></div>"#),
            r#"<div><p style="color: red; font-size: {{ size }};">x</p></div>"#
        );
    }

    #[test]
    fn test_root_attributes() {
        let registry = ComponentRegistry::new();
        let (html, _) = run(
            r#"<div class="box">x</div>"#,
            CompilerOptions::default(),
            &registry,
        )
        .unwrap();
        assert_eq!(
            html,
            r#"<div class="box {{ class|default('') }}" style="{{ style|default('') }}">x</div>"#
        );
    }

    #[test]
    fn test_select_model() {
        let html = convert(
            r#"<div><select v-model="size"><option value="s">S</option></select></div>"#,
        );
        assert_eq!(
            html,
            "<div><select>\n{% if size == \"s\" %}<option value=\"s\" selected=\"selected\">S</option>\n{% else %}<option value=\"s\">S</option>\n{% endif %}</select></div>"
        );
    }

    #[test]
    fn test_radio_model() {
        let html = convert(r#"<div><input type="radio" value="a" v-model="choice"></div>"#);
        assert_eq!(
            html,
            "<div>\n{% if choice == \"a\" %}<input type=\"radio\" value=\"a\" checked=\"checked\">\n{% else %}<input type=\"radio\" value=\"a\">\n{% endif %}</div>"
        );
    }

    #[test]
    fn test_checkbox_model_without_value() {
        let html = convert(r#"<div><input type="checkbox" v-model="agree"></div>"#);
        assert_eq!(html, r#"<div><input type="checkbox"></div>"#);
    }

    #[test]
    fn test_checkbox_model_with_value() {
        let html = convert(r#"<div><input type="checkbox" value="a" v-model="tags"></div>"#);
        assert_eq!(
            html,
            "<div>\n{% if (tags is iterable and \"a\" in tags)  or (tags is not iterable and tags) %}<input type=\"checkbox\" value=\"a\" checked=\"checked\">\n{% else %}<input type=\"checkbox\" value=\"a\">\n{% endif %}</div>"
        );
    }

    #[test]
    fn test_slot_placeholders() {
        let registry = ComponentRegistry::new();
        let (html, ctx) = run(
            r#"<div><slot></slot><slot name="foot-note"><b>none</b></slot></div>"#,
            options(),
            &registry,
        )
        .unwrap();
        assert_eq!(
            html,
            "<div>{{ slot_default }}{{ slot_foot_note|default(slot_foot_note_fallback) }}</div>"
        );
        assert_eq!(
            ctx.variables.get("slot_foot_note_fallback").map(String::as_str),
            Some("<b>none</b>")
        );
    }

    #[test]
    fn test_component_include() {
        let mut registry = ComponentRegistry::new();
        registry.register("ChildComponent", "/templates/ChildComponent.twig");
        let (html, _) = run(
            r#"<div><ChildComponent :foo="bar" baz="qux"/></div>"#,
            options(),
            &registry,
        )
        .unwrap();
        assert_eq!(
            html,
            "<div>\n{% set slot_default_value %}\n{% endset %}\n{% include \"/templates/ChildComponent.twig\" with { 'foo': bar, 'baz': \"qux\", 'slot_default': slot_default_value } %}</div>"
        );
    }

    #[test]
    fn test_component_slots() {
        let mut registry = ComponentRegistry::new();
        registry.register("Card", "card.twig");
        let (html, _) = run(
            r#"<div><Card><template #header><h1>{{ title }}</h1></template><p>body</p></Card></div>"#,
            options(),
            &registry,
        )
        .unwrap();
        assert_eq!(
            html,
            concat!(
                "<div>",
                "\n{% set slot_header_value %}<h1>{{ title }}</h1>\n{% endset %}",
                "\n{% set slot_default_value %}<p>body</p>\n{% endset %}",
                "\n{% include \"card.twig\" with { 'slot_header': slot_header_value, 'slot_default': slot_default_value } %}",
                "</div>"
            )
        );
    }

    #[test]
    fn test_component_merges_class() {
        let mut registry = ComponentRegistry::new();
        registry.register("Card", "card.twig");
        let (html, _) = run(
            r#"<Card class="a" :class="{ b: isB }" v-bind="attrs"></Card>"#,
            CompilerOptions::default(),
            &registry,
        )
        .unwrap();
        assert!(html.contains(
            "'class': \"a\" ~ \" \" ~ (isB ? 'b ' : '') ~ \" \" ~ class|default('')"
        ));
        assert!(html.contains("'style': style|default('')"));
        assert!(html.ends_with("|merge(attrs) %}"));
    }

    #[test]
    fn test_props_spread() {
        let mut registry = ComponentRegistry::new();
        registry.register("Card", "card.twig");
        let mut ctx = ConvertContext::new(options(), &registry);
        ctx.properties
            .insert("size".into(), Property::new("size", "", true));
        let mut doc = Document::new();
        let root = doc.root();
        let template = doc.create_element("template");
        doc.append_child(root, template);
        vue_dom::parse_into(&mut doc, template, r#"<div><Card v-bind="$props"></Card></div>"#)
            .unwrap();
        NodeConverter::new(&mut ctx, &mut doc)
            .convert_root(template)
            .unwrap();
        assert!(doc.inner_html(template).contains("'size': size"));
    }

    #[test]
    fn test_split_for_expression() {
        assert_eq!(split_for_expression("item in items"), Some(("item", "items")));
        assert_eq!(split_for_expression(" (a, b)  of  list "), Some(("(a, b)", "list")));
        assert_eq!(split_for_expression("broken"), None);
    }

    #[test]
    fn test_implode_style() {
        assert_eq!(
            implode_attribute_value("style", vec!["a: b".into(), "c: d;".into()], "x: y;"),
            "x: y; a: b; c: d;"
        );
        assert_eq!(implode_attribute_value("class", vec!["b".into()], ""), "b");
    }
}
