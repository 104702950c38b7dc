//! Placeholder tokens for syntax that would not survive the HTML round trip.
//!
//! Expressions are written into the tree with `{{`, `<`, `&` and friends
//! swapped for `__NAME__` tokens; [`restore`] puts them back once the tree
//! has been serialized.

/// A fragment and its placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Replacement {
    DoubleCurlyOpen,
    DoubleCurlyClose,
    Greater,
    Smaller,
    Ampersand,
    Pipe,
    AttributeNameHref,
    AttributeNameAction,
    AttributeNameSrc,
    AttributeNameAName,
}

impl Replacement {
    /// Every entry, in restore order.
    pub const ALL: [Replacement; 10] = [
        Self::DoubleCurlyOpen,
        Self::DoubleCurlyClose,
        Self::Greater,
        Self::Smaller,
        Self::Ampersand,
        Self::Pipe,
        Self::AttributeNameHref,
        Self::AttributeNameAction,
        Self::AttributeNameSrc,
        Self::AttributeNameAName,
    ];

    /// Entries that are swapped out of expressions. Attribute names are only
    /// replaced when an attribute is renamed.
    pub const SYNTAX: [Replacement; 6] = [
        Self::DoubleCurlyOpen,
        Self::DoubleCurlyClose,
        Self::Greater,
        Self::Smaller,
        Self::Ampersand,
        Self::Pipe,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            Self::DoubleCurlyOpen => "{{",
            Self::DoubleCurlyClose => "}}",
            Self::Greater => ">",
            Self::Smaller => "<",
            Self::Ampersand => "&",
            Self::Pipe => "|",
            Self::AttributeNameHref => "href",
            Self::AttributeNameAction => "action",
            Self::AttributeNameSrc => "src",
            Self::AttributeNameAName => "name",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::DoubleCurlyOpen => "__DOUBLE_CURLY_OPEN__",
            Self::DoubleCurlyClose => "__DOUBLE_CURLY_CLOSE__",
            Self::Greater => "__GREATER__",
            Self::Smaller => "__SMALLER__",
            Self::Ampersand => "__AMPERSAND__",
            Self::Pipe => "__PIPE__",
            Self::AttributeNameHref => "__ATTRIBUTE_NAME_HREF__",
            Self::AttributeNameAction => "__ATTRIBUTE_NAME_ACTION__",
            Self::AttributeNameSrc => "__ATTRIBUTE_NAME_SRC__",
            Self::AttributeNameAName => "__ATTRIBUTE_NAME_A_NAME__",
        }
    }

    /// The placeholder an attribute is renamed to while it sits in the tree,
    /// if it needs one. `name` is only special on `<a>`.
    pub fn for_attribute(name: &str, tag: &str) -> Option<Self> {
        match name {
            "href" => Some(Self::AttributeNameHref),
            "action" => Some(Self::AttributeNameAction),
            "src" => Some(Self::AttributeNameSrc),
            "name" if tag == "a" => Some(Self::AttributeNameAName),
            _ => None,
        }
    }
}

/// Swap every syntax fragment in `target` for its placeholder.
pub fn sanitize(target: &str) -> String {
    Replacement::SYNTAX
        .iter()
        .fold(target.to_string(), |acc, r| acc.replace(r.value(), r.placeholder()))
}

/// Swap a single fragment for its placeholder.
pub fn sanitize_single(target: &str, replacement: Replacement) -> String {
    target.replace(replacement.value(), replacement.placeholder())
}

/// Put every placeholder back.
pub fn restore(target: &str) -> String {
    Replacement::ALL
        .iter()
        .fold(target.to_string(), |acc, r| acc.replace(r.placeholder(), r.value()))
}

/// The bound-output wrapper, `{{ value }}`, in placeholder form.
pub fn output(value: &str) -> String {
    format!(
        "{} {} {}",
        Replacement::DoubleCurlyOpen.placeholder(),
        value,
        Replacement::DoubleCurlyClose.placeholder()
    )
}
