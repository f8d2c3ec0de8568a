//! richtag-core: toggleable inline markup without UI dependencies.
//!
//! This crate provides:
//! - `TagRegistry` - tag definitions (open/close templates, validators, block tags)
//! - `toggle` - wrap or unwrap a selection with a tag, recomputing the selection
//! - `clear` - strip all recognized markup from a region
//! - `render` - deterministic rewrite of markup text into preview HTML
//! - `RichTextEditor` - boundary layer threading host text/selection through the core
//!
//! All core operations are pure functions of their inputs; the only long-lived
//! state is the immutable registry.

pub mod actions;
pub mod clear;
pub mod config;
pub mod editor;
pub mod error;
pub mod registry;
pub mod render;
pub mod text;
pub mod toggle;
pub mod types;

pub use actions::{ParseCommandError, Prompt, StyleCommand};
pub use clear::{clear, strip_markup};
pub use config::{EditorConfig, TagSpec, VALUE_PLACEHOLDER};
pub use editor::{HtmlPreview, PreviewSink, RichTextEditor, StringSurface, TextSurface};
pub use error::{ConfigError, MarkupError};
pub use registry::{
    IMAGE_SENTINEL, OpenTemplate, ResolvedTag, TagDefinition, TagPattern, TagRegistry,
    TagRegistryBuilder, Validator,
};
pub use render::{RenderOptions, render, render_with, sanitize_url};
pub use smol_str::SmolStr;
pub use toggle::toggle;
pub use types::{Edit, Selection};
