//! Toolbar commands.
//!
//! `StyleCommand` is the platform-agnostic form of a toolbar button. Commands
//! that need a value describe the prompt the host should show; the host
//! collects the value however it likes and hands it to
//! [`RichTextEditor::execute`](crate::editor::RichTextEditor::execute).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A style command issued from the host's toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleCommand {
    Color,
    Bold,
    Italic,
    Size,
    Link,
    Image,
    /// Strip all formatting.
    Clear,
}

/// What to ask the user before running a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt {
    pub message: &'static str,
    pub default_value: &'static str,
}

impl StyleCommand {
    /// Toolbar order.
    pub const ALL: [StyleCommand; 7] = [
        Self::Color,
        Self::Bold,
        Self::Italic,
        Self::Size,
        Self::Link,
        Self::Image,
        Self::Clear,
    ];

    /// Registry tag this command toggles; `None` for [`StyleCommand::Clear`].
    pub fn tag_name(&self) -> Option<&'static str> {
        match self {
            Self::Color => Some("color"),
            Self::Bold => Some("bold"),
            Self::Italic => Some("italic"),
            Self::Size => Some("size"),
            Self::Link => Some("link"),
            Self::Image => Some("img"),
            Self::Clear => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Size => "size",
            Self::Link => "link",
            Self::Image => "image",
            Self::Clear => "clear",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Color => "🎨",
            Self::Bold => "𝐁",
            Self::Italic => "𝐼",
            Self::Size => "🔠",
            Self::Link => "🔗",
            Self::Image => "🖼️",
            Self::Clear => "🗑️",
        }
    }

    /// Prompt for commands that take a value.
    pub fn prompt(&self) -> Option<Prompt> {
        let (message, default_value) = match self {
            Self::Color => ("input color code (eq:#FF0000):", "#EA1A1A"),
            Self::Size => ("input font size (eq:12):", "12"),
            Self::Link => ("input link (need http:// or https://):", "http://"),
            Self::Image => ("input link of image (need http:// or https://):", "http://"),
            Self::Bold | Self::Italic | Self::Clear => return None,
        };
        Some(Prompt {
            message,
            default_value,
        })
    }

    pub fn needs_argument(&self) -> bool {
        self.prompt().is_some()
    }

    /// Link and image values are checked at the boundary; an empty value is
    /// reported as invalid rather than silently ignored.
    pub(crate) fn prevalidates(&self) -> bool {
        matches!(self, Self::Link | Self::Image)
    }
}

impl fmt::Display for StyleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown style command: {0}")]
pub struct ParseCommandError(pub String);

impl FromStr for StyleCommand {
    type Err = ParseCommandError;

    /// Accepts toolbar labels and tag names (`img` for image).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.label() == s || cmd.tag_name() == Some(s))
            .ok_or_else(|| ParseCommandError(s.to_string()))
    }
}
