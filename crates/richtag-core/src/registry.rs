//! Tag definitions and the registry that resolves them.
//!
//! A tag has an open template (literal, or computed from the user-supplied
//! argument), a close literal, block/inline semantics and an optional
//! validator. The registry is built once per editor and never mutated after.
//!
//! Detection patterns are built from the escaped open/close literals. For
//! literal tags they are compiled when the registry is built; computed tags
//! get theirs when the argument is resolved. Detection is per tag, strips a
//! single layer and knows nothing about nesting.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use smol_str::SmolStr;

use crate::error::MarkupError;

/// Line prefix marking a block image.
pub const IMAGE_SENTINEL: &str = "$img:";

pub type TemplateFn = dyn Fn(&str) -> String + Send + Sync;
pub type PredicateFn = dyn Fn(&str) -> bool + Send + Sync;

/// Opening token of a tag: a fixed string or a function of the argument.
#[derive(Clone)]
pub enum OpenTemplate {
    Literal(String),
    Computed(Arc<TemplateFn>),
}

impl OpenTemplate {
    pub fn literal(open: impl Into<String>) -> Self {
        Self::Literal(open.into())
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Produce the concrete opening token for `argument`.
    pub fn resolve(&self, argument: &str) -> String {
        match self {
            Self::Literal(open) => open.clone(),
            Self::Computed(f) => f(argument),
        }
    }
}

impl fmt::Debug for OpenTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(open) => f.debug_tuple("Literal").field(open).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Argument check run before a tag is applied.
#[derive(Clone)]
pub enum Validator {
    Pattern(Regex),
    Custom(Arc<PredicateFn>),
}

impl Validator {
    pub fn pattern(source: &str) -> Result<Self, regex::Error> {
        Ok(Self::Pattern(Regex::new(source)?))
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    pub fn accepts(&self, argument: &str) -> bool {
        match self {
            Self::Pattern(re) => re.is_match(argument),
            Self::Custom(f) => f(argument),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One named tag.
#[derive(Clone, Debug)]
pub struct TagDefinition {
    pub name: SmolStr,
    pub open: OpenTemplate,
    pub close: String,
    /// Block tags prefix the selection with `open` and never append `close`.
    pub is_block: bool,
    pub validator: Option<Validator>,
}

impl TagDefinition {
    pub fn inline(name: impl Into<SmolStr>, open: OpenTemplate, close: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            open,
            close: close.into(),
            is_block: false,
            validator: None,
        }
    }

    pub fn block(name: impl Into<SmolStr>, open: OpenTemplate) -> Self {
        Self {
            name: name.into(),
            open,
            close: String::new(),
            is_block: true,
            validator: None,
        }
    }

    pub fn with_close(mut self, close: impl Into<String>) -> Self {
        self.close = close.into();
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// True when there is no validator or the validator accepts `argument`.
    pub fn accepts(&self, argument: &str) -> bool {
        self.validator
            .as_ref()
            .is_none_or(|validator| validator.accepts(argument))
    }

    fn pattern_for(&self, open: &str) -> Result<TagPattern, regex::Error> {
        if self.is_block {
            TagPattern::block(open)
        } else {
            TagPattern::inline(open, &self.close)
        }
    }
}

/// Compiled detection pattern for one concrete open/close pair.
#[derive(Clone, Debug)]
pub enum TagPattern {
    /// Every literal occurrence of the open token.
    Block(Regex),
    /// `open (.*?) close`, spanning line breaks.
    Inline(Regex),
}

impl TagPattern {
    pub fn block(open: &str) -> Result<Self, regex::Error> {
        Ok(Self::Block(Regex::new(&regex::escape(open))?))
    }

    pub fn inline(open: &str, close: &str) -> Result<Self, regex::Error> {
        let source = format!("(?s){}(.*?){}", regex::escape(open), regex::escape(close));
        Ok(Self::Inline(Regex::new(&source)?))
    }

    /// Strip the tag from `selected` if present.
    ///
    /// Block patterns remove every occurrence of the open token. Inline
    /// patterns replace the first `open..close` match with its inner content.
    /// Returns `None` when nothing matched.
    pub fn strip(&self, selected: &str) -> Option<String> {
        match self {
            Self::Block(re) => re
                .is_match(selected)
                .then(|| re.replace_all(selected, "").into_owned()),
            Self::Inline(re) => {
                let caps = re.captures(selected)?;
                let whole = caps.get(0)?;
                let inner = caps.get(1).map_or("", |m| m.as_str());
                let mut out = String::with_capacity(selected.len());
                out.push_str(&selected[..whole.start()]);
                out.push_str(inner);
                out.push_str(&selected[whole.end()..]);
                Some(out)
            }
        }
    }
}

/// A tag with its open token evaluated for a specific argument.
#[derive(Clone, Debug)]
pub struct ResolvedTag {
    pub name: SmolStr,
    pub open: String,
    pub close: String,
    pub is_block: bool,
    pub pattern: TagPattern,
}

impl ResolvedTag {
    /// Wrap (inline) or prefix (block) `selected`.
    pub fn apply(&self, selected: &str) -> String {
        let mut out = String::with_capacity(self.open.len() + selected.len() + self.close.len());
        out.push_str(&self.open);
        out.push_str(selected);
        if !self.is_block {
            out.push_str(&self.close);
        }
        out
    }

    /// Strip one layer if present, otherwise apply.
    pub fn toggle(&self, selected: &str) -> String {
        self.pattern
            .strip(selected)
            .unwrap_or_else(|| self.apply(selected))
    }
}

#[derive(Clone, Debug)]
struct RegisteredTag {
    definition: TagDefinition,
    /// Precompiled pattern for literal-open tags.
    literal_pattern: Option<TagPattern>,
}

/// Immutable set of tag definitions, keyed by name.
#[derive(Clone, Debug)]
pub struct TagRegistry {
    tags: BTreeMap<SmolStr, RegisteredTag>,
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TagRegistry {
    /// Registry with the default tag set.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Builder seeded with the default tag set.
    pub fn builder() -> TagRegistryBuilder {
        TagRegistryBuilder::with_defaults()
    }

    pub fn get(&self, name: &str) -> Option<&TagDefinition> {
        self.tags.get(name).map(|tag| &tag.definition)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Tag names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(SmolStr::as_str)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &TagDefinition> {
        self.tags.values().map(|tag| &tag.definition)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Look up `name` and run its validator against `argument`.
    ///
    /// A missing argument is validated as the empty string.
    pub fn validate(&self, name: &str, argument: Option<&str>) -> Result<&TagDefinition, MarkupError> {
        let definition = self.get(name).ok_or_else(|| MarkupError::unknown_tag(name))?;
        let argument = argument.unwrap_or_default();
        if !definition.accepts(argument) {
            tracing::debug!(target: "richtag::registry", tag = name, argument, "argument rejected");
            return Err(MarkupError::invalid_argument(name, argument));
        }
        Ok(definition)
    }

    /// Resolve `name` and `argument` into a concrete open/close pair.
    pub fn resolve(&self, name: &str, argument: Option<&str>) -> Result<ResolvedTag, MarkupError> {
        let definition = self.validate(name, argument)?;
        let tag = &self.tags[name];
        let open = definition.open.resolve(argument.unwrap_or_default());
        let pattern = match &tag.literal_pattern {
            Some(pattern) => pattern.clone(),
            None => definition.pattern_for(&open)?,
        };
        Ok(ResolvedTag {
            name: definition.name.clone(),
            open,
            close: definition.close.clone(),
            is_block: definition.is_block,
            pattern,
        })
    }
}

/// Collects tag definitions; later definitions replace earlier ones with the
/// same name.
#[derive(Clone, Debug, Default)]
pub struct TagRegistryBuilder {
    tags: BTreeMap<SmolStr, TagDefinition>,
}

impl TagRegistryBuilder {
    /// Builder with no tags at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        Self::empty().tags(default_tags())
    }

    pub fn tag(mut self, definition: TagDefinition) -> Self {
        self.tags.insert(definition.name.clone(), definition);
        self
    }

    pub fn tags(self, definitions: impl IntoIterator<Item = TagDefinition>) -> Self {
        definitions.into_iter().fold(self, Self::tag)
    }

    pub fn build(self) -> TagRegistry {
        let tags = self
            .tags
            .into_iter()
            .map(|(name, definition)| {
                // Computed tags compile per resolution; a literal that fails here
                // is retried (and reported) on resolve.
                let literal_pattern = match &definition.open {
                    OpenTemplate::Literal(open) => definition.pattern_for(open).ok(),
                    OpenTemplate::Computed(_) => None,
                };
                let tag = RegisteredTag {
                    definition,
                    literal_pattern,
                };
                (name, tag)
            })
            .collect();
        TagRegistry { tags }
    }
}

/// The built-in tag set: color, bold, italic, size, link and img.
pub fn default_tags() -> Vec<TagDefinition> {
    vec![
        TagDefinition::inline(
            "color",
            OpenTemplate::computed(|v| format!("<color={v}>")),
            "</color>",
        )
        .with_validator(Validator::Pattern(color_value_re().clone())),
        TagDefinition::inline("bold", OpenTemplate::literal("<b>"), "</b>"),
        TagDefinition::inline("italic", OpenTemplate::literal("<i>"), "</i>"),
        TagDefinition::inline(
            "size",
            OpenTemplate::computed(|v| format!("<size={v}>")),
            "</size>",
        )
        .with_validator(Validator::Pattern(size_value_re().clone())),
        TagDefinition::inline(
            "link",
            OpenTemplate::computed(|v| format!("<link={v}>")),
            "</link>",
        )
        .with_validator(Validator::Pattern(link_url_re().clone())),
        TagDefinition::block(
            "img",
            OpenTemplate::computed(|v| format!("{IMAGE_SENTINEL}{v}\n")),
        )
        .with_validator(Validator::Pattern(image_url_re().clone())),
    ]
}

fn color_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#[0-9A-Fa-f]{6}|[a-zA-Z]+)$").unwrap())
}

fn size_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+%?$").unwrap())
}

pub(crate) fn link_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?i:https?|ftp)://[^\s/$.?#][^\n\r\u{2028}\u{2029}][^\s]*$").unwrap()
    })
}

fn image_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?i:https?)://[^\s/$.?#][^\n\r\u{2028}\u{2029}][^\s]*$").unwrap()
    })
}
