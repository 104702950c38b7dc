//! Compiler options.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

bitflags! {
    /// Which `<style>` blocks are copied into the generated template.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StyleOutput: u8 {
        const NONE = 0;
        const SCOPED = 0b01;
        const UNSCOPED = 0b10;
        const ALL = Self::SCOPED.bits() | Self::UNSCOPED.bits();
    }
}

/// Options shared by every conversion of a [`crate::Compiler`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    /// Banner lines written as a Twig comment on top of the output.
    pub banner: Vec<String>,
    pub strip_whitespace: bool,
    /// Attributes merged from the including template into the root element.
    pub include_attributes: Vec<String>,
    /// Attributes rendered as `{% if cond %}name="value"{% endif %}`.
    pub attributes_with_if: Vec<String>,
    pub style_output: StyleOutput,
    /// Emit `{% set %}` blocks for the component's `data()`.
    pub data_support: bool,
    /// Directory `@import` rules in style blocks are resolved against.
    pub base_path: Option<PathBuf>,
    /// SCSS prepended to every `lang="scss"` block, for shared variables
    /// and mixins.
    pub style_prelude: Option<String>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            banner: Vec::new(),
            strip_whitespace: true,
            include_attributes: vec!["class".into(), "style".into()],
            attributes_with_if: vec!["checked".into(), "selected".into(), "disabled".into()],
            style_output: StyleOutput::NONE,
            data_support: false,
            base_path: None,
            style_prelude: None,
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_banner<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.banner = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_strip_whitespace(mut self, strip: bool) -> Self {
        self.strip_whitespace = strip;
        self
    }

    /// Stop merging `style` from the including template.
    pub fn disable_style_include(mut self) -> Self {
        self.include_attributes.retain(|a| a != "style");
        self
    }

    pub fn with_data_support(mut self, enabled: bool) -> Self {
        self.data_support = enabled;
        self
    }

    pub fn with_style_output(mut self, output: StyleOutput) -> Self {
        self.style_output = output;
        self
    }

    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    pub fn with_style_prelude(mut self, prelude: impl Into<String>) -> Self {
        self.style_prelude = Some(prelude.into());
        self
    }

    /// Apply one `<twig-config>` block. Unknown keys are ignored.
    pub fn apply_twig_config(&mut self, ini: &str) {
        for (key, value) in parse_ini(ini) {
            match key.as_str() {
                "attributes-with-if" => {
                    for attr in value.split(',').map(str::trim).filter(|a| !a.is_empty()) {
                        if !self.attributes_with_if.iter().any(|a| a == attr) {
                            self.attributes_with_if.push(attr.to_string());
                        }
                    }
                }
                "disable-data-support" if is_truthy(&value) => self.data_support = false,
                _ => {}
            }
        }
    }
}

/// `key = value` lines; `;` and `#` start comments, `[sections]` are skipped.
fn parse_ini(ini: &str) -> Vec<(String, String)> {
    ini.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with([';', '#', '[']))
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            Some((key.trim().to_string(), value.to_string()))
        })
        .collect()
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let options = CompilerOptions::default();
        assert!(options.strip_whitespace);
        assert_eq!(options.include_attributes, vec!["class", "style"]);
        assert_eq!(options.attributes_with_if, vec!["checked", "selected", "disabled"]);
        assert_eq!(options.style_output, StyleOutput::NONE);
    }

    #[test]
    fn test_builder() {
        let options = CompilerOptions::new()
            .with_banner(["a", "b"])
            .with_strip_whitespace(false)
            .disable_style_include()
            .with_style_output(StyleOutput::ALL);
        assert_eq!(options.banner, vec!["a", "b"]);
        assert!(!options.strip_whitespace);
        assert_eq!(options.include_attributes, vec!["class"]);
        assert!(options.style_output.contains(StyleOutput::SCOPED));
    }

    #[test]
    fn test_twig_config() {
        let mut options = CompilerOptions::new().with_data_support(true);
        options.apply_twig_config(
            "; comment\nattributes-with-if = href, checked ,title\ndisable-data-support = on\n",
        );
        assert_eq!(
            options.attributes_with_if,
            vec!["checked", "selected", "disabled", "href", "title"]
        );
        assert!(!options.data_support);
    }

    #[test]
    fn test_style_output_names() {
        assert_eq!(StyleOutput::from_name("SCOPED"), Some(StyleOutput::SCOPED));
        assert_eq!(StyleOutput::from_name("ALL"), Some(StyleOutput::ALL));
        assert_eq!(StyleOutput::from_name("scoped"), None);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let options: CompilerOptions =
            serde_json::from_str(r#"{"stripWhitespace": false, "dataSupport": true}"#).unwrap();
        assert!(!options.strip_whitespace);
        assert!(options.data_support);
        assert_eq!(options.include_attributes, vec!["class", "style"]);
    }
}
