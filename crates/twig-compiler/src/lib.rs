//! Vue single-file component to Twig compilation.
//!
//! The component is split into blocks, its template is parsed into a
//! [`vue_dom::Document`], and the tree is rewritten in place: directives
//! become Twig control flow, bindings become Twig output, and registered
//! child components become `{% include %}` calls. A final string pass
//! assembles the template with its `{% set %}` prelude and styles.

pub mod assembler;
pub mod binding;
pub mod builder;
pub mod concat;
pub mod context;
pub mod converter;
pub mod error;
pub mod expression;
pub mod helpers;
pub mod models;
pub mod options;
pub mod replacements;
pub mod script;
pub mod style;

use builder::{create_default_for_variable, create_variable};
use tracing::{debug, warn};
use vue_dom::Document;
use vue_parser::Sfc;

pub use context::ConvertContext;
pub use converter::NodeConverter;
pub use error::{ConvertError, ConvertErrorKind, ConvertResult};
pub use models::{ComponentDescriptor, ComponentRegistry, Property};
pub use options::{CompilerOptions, StyleOutput};

/// Compiles components with a fixed set of options and registered
/// child components. Every call to [`Compiler::convert`] starts from a
/// fresh [`ConvertContext`].
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
    components: ComponentRegistry,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            options,
            components: ComponentRegistry::new(),
        }
    }

    /// Map a custom element tag to the Twig partial it is included from.
    /// Tags are matched case-insensitively.
    pub fn register_component(&mut self, name: &str, path: impl Into<String>) {
        self.components.register(name, path);
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn options_mut(&mut self) -> &mut CompilerOptions {
        &mut self.options
    }

    /// Compile the source of a `.vue` file.
    pub fn convert(&self, source: &str) -> ConvertResult<String> {
        let sfc = vue_parser::parse_sfc(source)?;
        for error in &sfc.errors {
            warn!(%error, "recovered from a malformed component block");
        }
        self.convert_sfc(&sfc)
    }

    /// Compile an already split component.
    pub fn convert_sfc(&self, sfc: &Sfc) -> ConvertResult<String> {
        let mut options = self.options.clone();
        for config in sfc.twig_config_blocks() {
            options.apply_twig_config(config.content.trim());
        }
        let data_support = options.data_support;
        let mut ctx = ConvertContext::new(options, &self.components);

        if let Some(script) = sfc.primary_script() {
            ctx.properties = script::register_properties(&script.content);
            let defaults: Vec<String> = ctx
                .properties
                .values()
                .filter_map(|p| Some(create_default_for_variable(&p.name, p.default.as_deref()?)))
                .collect();
            ctx.raw_blocks.extend(defaults);

            if data_support {
                for data in script::register_data(&script.content, script.lang) {
                    ctx.raw_blocks
                        .push(create_variable(&data.name, &data.value).trim_start().to_string());
                }
            }
            debug!(properties = ctx.properties.len(), "registered component script");
        }

        ctx.raw_blocks
            .extend(sfc.twig_blocks().map(|block| block.content.trim().to_string()));

        ctx.styles.prepare_scope(&sfc.styles);
        let styles: Vec<String> = sfc
            .styles
            .iter()
            .filter_map(|style| ctx.styles.compile(style))
            .collect();
        ctx.raw_blocks.extend(styles);

        let Some(template) = &sfc.template else {
            return Err(ConvertError::MissingTemplate);
        };

        let mut doc = Document::new();
        let root = doc.root();
        let element = doc.create_element("template");
        doc.append_child(root, element);
        vue_dom::parse_into(&mut doc, element, &template.content).map_err(|mut e| {
            e.span = e.span.offset_by(template.content_span.start);
            e
        })?;

        NodeConverter::new(&mut ctx, &mut doc).convert_root(element)?;
        let html = doc.outer_html(element);
        assembler::assemble(&ctx, &html)
    }
}
