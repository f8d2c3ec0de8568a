//! Boundary layer between a host text surface and the markup core.
//!
//! The core never touches the host directly. `RichTextEditor` reads the
//! current text and selection from a [`TextSurface`], runs a pure core
//! operation, writes the result back and refreshes the [`PreviewSink`].
//! Failed operations write nothing.

use crate::actions::StyleCommand;
use crate::clear::clear;
use crate::config::EditorConfig;
use crate::error::{ConfigError, MarkupError};
use crate::registry::TagRegistry;
use crate::render::{RenderOptions, render_with};
use crate::text::char_len;
use crate::toggle::toggle;
use crate::types::{Edit, Selection};

/// Host-owned text input (a textarea, a buffer, ...).
pub trait TextSurface {
    fn text(&self) -> String;

    fn selection(&self) -> Selection;

    fn set_text(&mut self, text: String);

    fn set_selection(&mut self, selection: Selection);
}

/// Receives rendered preview HTML, assigned wholesale.
pub trait PreviewSink {
    fn set_html(&mut self, html: String);
}

/// Unit type implementation - preview discarded.
impl PreviewSink for () {
    fn set_html(&mut self, _html: String) {}
}

impl<T: TextSurface> TextSurface for &mut T {
    fn text(&self) -> String {
        (**self).text()
    }

    fn selection(&self) -> Selection {
        (**self).selection()
    }

    fn set_text(&mut self, text: String) {
        (**self).set_text(text)
    }

    fn set_selection(&mut self, selection: Selection) {
        (**self).set_selection(selection)
    }
}

impl<T: PreviewSink> PreviewSink for &mut T {
    fn set_html(&mut self, html: String) {
        (**self).set_html(html)
    }
}

/// In-memory text surface.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringSurface {
    text: String,
    selection: Selection,
}

impl StringSurface {
    /// Surface with the caret at the end of `text`.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let selection = Selection::caret(char_len(&text));
        Self { text, selection }
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.set_selection(selection);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl TextSurface for StringSurface {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    /// Replacing the text keeps the selection only as far as it still fits.
    fn set_text(&mut self, text: String) {
        self.text = text;
        self.selection = self.selection.clamp_to(char_len(&self.text));
    }

    fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamp_to(char_len(&self.text));
    }
}

/// Preview sink that keeps the last rendered HTML.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HtmlPreview {
    html: String,
    updates: usize,
}

impl HtmlPreview {
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Number of times the preview has been assigned.
    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl PreviewSink for HtmlPreview {
    fn set_html(&mut self, html: String) {
        self.html = html;
        self.updates += 1;
    }
}

/// An editor instance: one registry for the session plus the host surfaces.
pub struct RichTextEditor<S, P = ()> {
    registry: TagRegistry,
    render_options: RenderOptions,
    surface: S,
    preview: P,
}

impl<S: TextSurface, P: PreviewSink> RichTextEditor<S, P> {
    pub fn new(registry: TagRegistry, surface: S, preview: P) -> Self {
        Self {
            registry,
            render_options: RenderOptions::default(),
            surface,
            preview,
        }
    }

    pub fn from_config(config: &EditorConfig, surface: S, preview: P) -> Result<Self, ConfigError> {
        Ok(Self::new(config.registry()?, surface, preview).with_render_options(config.render))
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn preview(&self) -> &P {
        &self.preview
    }

    pub fn into_parts(self) -> (S, P) {
        (self.surface, self.preview)
    }

    /// Toggle `tag` on the current selection.
    ///
    /// On failure the surface is left untouched and the error is returned
    /// for the host to show.
    pub fn apply_style(&mut self, tag: &str, argument: Option<&str>) -> Result<(), MarkupError> {
        let text = self.surface.text();
        let edit = toggle(&self.registry, &text, self.surface.selection(), tag, argument)
            .inspect_err(|err| {
                tracing::debug!(target: "richtag::editor", tag, %err, "style not applied");
            })?;
        self.apply_edit(edit);
        Ok(())
    }

    /// Run a toolbar command with the value the host collected for it.
    ///
    /// `collected` is `None` when the host's prompt was cancelled. A cancelled
    /// or empty value short-circuits without touching the core and returns
    /// `Ok(false)`, except for link and image where an empty value is an
    /// invalid argument. Returns `Ok(true)` when the text was changed.
    pub fn execute(
        &mut self,
        command: StyleCommand,
        collected: Option<&str>,
    ) -> Result<bool, MarkupError> {
        let Some(tag) = command.tag_name() else {
            self.clear_all_format();
            return Ok(true);
        };
        if !command.needs_argument() {
            self.apply_style(tag, None)?;
            return Ok(true);
        }

        let Some(value) = collected else {
            return Ok(false);
        };
        if command.prevalidates() {
            if value.is_empty() {
                return Err(MarkupError::invalid_argument(tag, value));
            }
            self.registry.validate(tag, Some(value))?;
        } else if value.is_empty() {
            return Ok(false);
        }
        self.apply_style(tag, Some(value))?;
        Ok(true)
    }

    /// Strip all formatting from the selection, or from everything when
    /// nothing is selected.
    pub fn clear_all_format(&mut self) {
        let text = self.surface.text();
        let edit = clear(&text, self.surface.selection());
        self.apply_edit(edit);
    }

    /// Render the current text into the preview sink.
    pub fn update_output(&mut self) {
        let html = render_with(&self.surface.text(), &self.render_options);
        self.preview.set_html(html);
    }

    /// Host input hook: the text changed outside of a command.
    pub fn on_input(&mut self) {
        self.update_output();
    }

    fn apply_edit(&mut self, edit: Edit) {
        self.surface.set_text(edit.text);
        self.surface.set_selection(edit.selection);
        self.update_output();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestEditor = RichTextEditor<StringSurface, HtmlPreview>;

    fn make_editor(content: &str, selection: Selection) -> TestEditor {
        let surface = StringSurface::new(content).with_selection(selection);
        RichTextEditor::new(TagRegistry::new(), surface, HtmlPreview::default())
    }

    #[test]
    fn test_apply_style_writes_back_and_renders() {
        let mut editor = make_editor("hello", Selection::new(0, 5));
        editor.apply_style("bold", None).unwrap();
        assert_eq!(editor.surface().as_str(), "<b>hello</b>");
        assert_eq!(editor.surface().selection(), Selection::new(0, 12));
        assert_eq!(editor.preview().html(), "<strong>hello</strong>");
    }

    #[test]
    fn test_failed_style_leaves_surface_alone() {
        let mut editor = make_editor("abc", Selection::new(0, 3));
        let err = editor.apply_style("color", Some("#12")).unwrap_err();
        assert!(matches!(err, MarkupError::InvalidArgument { .. }));
        assert_eq!(editor.surface().as_str(), "abc");
        assert_eq!(editor.surface().selection(), Selection::new(0, 3));
        assert_eq!(editor.preview().updates(), 0);
    }

    #[test]
    fn test_cancelled_prompt_short_circuits() {
        let mut editor = make_editor("abc", Selection::new(0, 3));
        assert!(!editor.execute(StyleCommand::Color, None).unwrap());
        assert!(!editor.execute(StyleCommand::Size, Some("")).unwrap());
        assert!(!editor.execute(StyleCommand::Link, None).unwrap());
        assert_eq!(editor.surface().as_str(), "abc");
    }

    #[test]
    fn test_empty_link_is_invalid() {
        let mut editor = make_editor("abc", Selection::new(0, 3));
        let err = editor.execute(StyleCommand::Link, Some("")).unwrap_err();
        assert!(matches!(err, MarkupError::InvalidArgument { .. }));
        let err = editor.execute(StyleCommand::Image, Some("ftp://x.com/a.png")).unwrap_err();
        assert!(matches!(err, MarkupError::InvalidArgument { .. }));
        assert_eq!(editor.surface().as_str(), "abc");
    }

    #[test]
    fn test_execute_commands() {
        let mut editor = make_editor("abc", Selection::new(0, 3));
        assert!(editor.execute(StyleCommand::Size, Some("12")).unwrap());
        assert_eq!(editor.surface().as_str(), "<size=12>abc</size>");

        assert!(editor.execute(StyleCommand::Italic, Some("ignored")).unwrap());
        assert_eq!(editor.surface().as_str(), "<i><size=12>abc</size></i>");

        assert!(editor.execute(StyleCommand::Clear, None).unwrap());
        assert_eq!(editor.surface().as_str(), "abc");
        assert_eq!(editor.surface().selection(), Selection::new(0, 3));
    }

    #[test]
    fn test_clear_without_selection_keeps_caret_in_bounds() {
        let mut editor = make_editor("<b>long text</b>", Selection::caret(16));
        editor.clear_all_format();
        assert_eq!(editor.surface().as_str(), "long text");
        assert_eq!(editor.surface().selection(), Selection::caret(9));
    }

    #[test]
    fn test_on_input_refreshes_preview() {
        let mut editor = make_editor("", Selection::caret(0));
        editor.surface_mut().set_text("<i>x</i>".to_string());
        editor.on_input();
        assert_eq!(editor.preview().html(), "<em>x</em>");
        assert_eq!(editor.preview().updates(), 1);
    }

    #[test]
    fn test_escaped_render_options_from_config() {
        let config = EditorConfig::from_json_str(r#"{ "render": { "escape_text": true } }"#).unwrap();
        let surface = StringSurface::new("<b>a</b> <u>");
        let mut editor = RichTextEditor::from_config(&config, surface, HtmlPreview::default()).unwrap();
        editor.update_output();
        assert_eq!(editor.preview().html(), "<strong>a</strong> &lt;u&gt;");
    }
}
