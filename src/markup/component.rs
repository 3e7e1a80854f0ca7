//! Rich-text message model

use std::fmt;

use serde::Serialize;

/// The sixteen named text colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl NamedColor {
    /// Resolve a tag name such as `dark_blue` to a color
    pub fn from_name(name: &str) -> Option<Self> {
        let color = match name {
            "black" => Self::Black,
            "dark_blue" => Self::DarkBlue,
            "dark_green" => Self::DarkGreen,
            "dark_aqua" => Self::DarkAqua,
            "dark_red" => Self::DarkRed,
            "dark_purple" => Self::DarkPurple,
            "gold" => Self::Gold,
            "gray" | "grey" => Self::Gray,
            "dark_gray" | "dark_grey" => Self::DarkGray,
            "blue" => Self::Blue,
            "green" => Self::Green,
            "aqua" => Self::Aqua,
            "red" => Self::Red,
            "light_purple" => Self::LightPurple,
            "yellow" => Self::Yellow,
            "white" => Self::White,
            _ => return None,
        };
        Some(color)
    }

    /// RGB value used when rendering to a true-color terminal
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Black => (0x00, 0x00, 0x00),
            Self::DarkBlue => (0x00, 0x00, 0xAA),
            Self::DarkGreen => (0x00, 0xAA, 0x00),
            Self::DarkAqua => (0x00, 0xAA, 0xAA),
            Self::DarkRed => (0xAA, 0x00, 0x00),
            Self::DarkPurple => (0xAA, 0x00, 0xAA),
            Self::Gold => (0xFF, 0xAA, 0x00),
            Self::Gray => (0xAA, 0xAA, 0xAA),
            Self::DarkGray => (0x55, 0x55, 0x55),
            Self::Blue => (0x55, 0x55, 0xFF),
            Self::Green => (0x55, 0xFF, 0x55),
            Self::Aqua => (0x55, 0xFF, 0xFF),
            Self::Red => (0xFF, 0x55, 0x55),
            Self::LightPurple => (0xFF, 0x55, 0xFF),
            Self::Yellow => (0xFF, 0xFF, 0x55),
            Self::White => (0xFF, 0xFF, 0xFF),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum TextColor {
    Named(NamedColor),
    Rgb { r: u8, g: u8, b: u8 },
}

impl TextColor {
    /// Parse `RRGGBB` (no leading `#`)
    pub fn from_hex(digits: &str) -> Option<Self> {
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Named(named) => named.rgb(),
            Self::Rgb { r, g, b } => (r, g, b),
        }
    }
}

/// Formatting applied to one span of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Style {
    pub color: Option<TextColor>,
    pub bold: bool,
    pub italic: bool,
    pub underlined: bool,
    pub strikethrough: bool,
    pub obfuscated: bool,
}

impl Style {
    pub fn is_plain(&self) -> bool {
        *self == Style::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSpan {
    pub text: String,
    pub style: Style,
}

/// Fully parsed rich-text message, ready to hand to a recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedMessage {
    spans: Vec<TextSpan>,
}

impl FormattedMessage {
    pub fn new(spans: Vec<TextSpan>) -> Self {
        Self { spans }
    }

    /// A single unstyled span; used for diagnostics that bypass markup
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            spans: vec![TextSpan {
                text: text.into(),
                style: Style::default(),
            }],
        }
    }

    pub fn spans(&self) -> &[TextSpan] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.is_empty())
    }

    /// Concatenated text with all styling dropped
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Render with 24-bit ANSI escape sequences
    pub fn to_ansi(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            if span.style.is_plain() {
                out.push_str(&span.text);
                continue;
            }
            let style = &span.style;
            if let Some(color) = style.color {
                let (r, g, b) = color.rgb();
                out.push_str(&format!("\x1b[38;2;{};{};{}m", r, g, b));
            }
            if style.bold {
                out.push_str("\x1b[1m");
            }
            if style.italic {
                out.push_str("\x1b[3m");
            }
            if style.underlined {
                out.push_str("\x1b[4m");
            }
            if style.obfuscated {
                out.push_str("\x1b[5m");
            }
            if style.strikethrough {
                out.push_str("\x1b[9m");
            }
            out.push_str(&span.text);
            out.push_str("\x1b[0m");
        }
        out
    }
}

impl fmt::Display for FormattedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for span in &self.spans {
            f.write_str(&span.text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert_eq!(
            TextColor::from_hex("FF8000"),
            Some(TextColor::Rgb { r: 255, g: 128, b: 0 })
        );
        assert_eq!(TextColor::from_hex("GG0000"), None);
        assert_eq!(TextColor::from_hex("FFF"), None);
    }

    #[test]
    fn test_plain_message() {
        let message = FormattedMessage::plain("Missing key: a.b");
        assert_eq!(message.plain_text(), "Missing key: a.b");
        assert_eq!(message.to_ansi(), "Missing key: a.b");
        assert!(message.spans()[0].style.is_plain());
    }

    #[test]
    fn test_ansi_rendering() {
        let message = FormattedMessage::new(vec![TextSpan {
            text: "hi".to_string(),
            style: Style {
                color: Some(TextColor::Named(NamedColor::Green)),
                bold: true,
                ..Style::default()
            },
        }]);
        assert_eq!(message.to_ansi(), "\x1b[38;2;85;255;85m\x1b[1mhi\x1b[0m");
    }
}
