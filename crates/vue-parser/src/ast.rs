//! Block types of a split single-file component.

use smol_str::SmolStr;
use source_map::Span;

/// The top-level blocks of a `.vue` file.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sfc {
    /// The first `<template>` block. Later top-level templates are reported
    /// in [`Sfc::errors`] and ignored.
    pub template: Option<SfcBlock>,
    pub script: Option<ScriptBlock>,
    pub script_setup: Option<ScriptBlock>,
    pub styles: Vec<StyleBlock>,
    /// Every other block, including `<twig>` and `<twig-config>`.
    pub custom_blocks: Vec<CustomBlock>,
    /// Comments between blocks.
    pub comments: Vec<Comment>,
    /// Recoverable problems found while splitting.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub errors: Vec<crate::ParseError>,
}

impl Sfc {
    /// The script whose declarations describe the component. A plain
    /// `<script>` wins over `<script setup>`.
    pub fn primary_script(&self) -> Option<&ScriptBlock> {
        self.script.as_ref().or(self.script_setup.as_ref())
    }

    /// All custom blocks with the given tag name, in source order.
    pub fn blocks_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a CustomBlock> + 'a {
        self.custom_blocks
            .iter()
            .filter(move |b| b.block_type.eq_ignore_ascii_case(kind))
    }

    /// Raw Twig passthrough blocks.
    pub fn twig_blocks(&self) -> impl Iterator<Item = &CustomBlock> + '_ {
        self.blocks_of("twig")
    }

    /// INI-style compiler configuration blocks.
    pub fn twig_config_blocks(&self) -> impl Iterator<Item = &CustomBlock> + '_ {
        self.blocks_of("twig-config")
    }
}

/// A block with its raw content and tag attributes.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SfcBlock {
    /// The span of the entire block including tags.
    pub span: Span,
    /// The span of the content only.
    pub content_span: Span,
    pub content: String,
    pub attrs: Vec<BlockAttr>,
}

impl SfcBlock {
    /// Attribute value by case-insensitive name. Boolean attributes yield `None`.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .and_then(|a| a.value.as_deref())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name.eq_ignore_ascii_case(name))
    }
}

/// An attribute on a block tag.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockAttr {
    pub name: SmolStr,
    /// `None` for boolean attributes such as `scoped`.
    pub value: Option<String>,
    pub span: Span,
}

/// A `<script>` or `<script setup>` block.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptBlock {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub block: SfcBlock,
    pub lang: ScriptLang,
    pub setup: bool,
}

impl std::ops::Deref for ScriptBlock {
    type Target = SfcBlock;
    fn deref(&self) -> &Self::Target {
        &self.block
    }
}

/// A `<style>` block.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleBlock {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub block: SfcBlock,
    /// The style language (css, scss, less, ...).
    pub lang: Option<String>,
    pub scoped: bool,
    /// External stylesheet reference.
    pub src: Option<String>,
}

impl std::ops::Deref for StyleBlock {
    type Target = SfcBlock;
    fn deref(&self) -> &Self::Target {
        &self.block
    }
}

/// Any block that is not template, script or style.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CustomBlock {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub block: SfcBlock,
    /// Lowercased tag name.
    pub block_type: SmolStr,
}

impl std::ops::Deref for CustomBlock {
    type Target = SfcBlock;
    fn deref(&self) -> &Self::Target {
        &self.block
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comment {
    pub content: String,
    pub span: Span,
}

/// Script language variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScriptLang {
    #[default]
    Js,
    Ts,
}

impl ScriptLang {
    /// Parse the `lang` attribute; unknown languages are treated as JavaScript.
    pub fn from_attr(lang: Option<&str>) -> Self {
        match lang.map(str::to_ascii_lowercase).as_deref() {
            Some("ts" | "tsx" | "typescript") => Self::Ts,
            _ => Self::Js,
        }
    }

    pub fn is_typescript(&self) -> bool {
        matches!(self, Self::Ts)
    }
}
