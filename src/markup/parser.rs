//! Structured tag markup parser

use thiserror::Error;

use super::component::{FormattedMessage, NamedColor, Style, TextColor, TextSpan};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarkupError {
    #[error("Closing tag </{tag}> at byte {position} has no matching opening tag")]
    UnbalancedClose { tag: String, position: usize },
}

/// Result type for markup parsing
pub type MarkupResult<T> = Result<T, MarkupError>;

/// Turns a structured tag markup string into a renderable message.
pub trait RichTextParser: Send + Sync {
    fn parse(&self, markup: &str) -> MarkupResult<FormattedMessage>;
}

#[derive(Debug, Clone, Copy)]
enum Decoration {
    Bold,
    Italic,
    Underlined,
    Strikethrough,
    Obfuscated,
}

#[derive(Debug, Clone, Copy)]
enum Tag {
    Color(TextColor),
    Decoration(Decoration),
    Reset,
}

/// An opened tag and the style in effect inside it
struct Frame {
    name: String,
    style: Style,
}

/// Parser for `<tag>` markup: named colors, `<#RRGGBB>`, decorations and
/// `<reset>`. Unknown tags are kept as literal text and `\<` escapes a bracket.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagMarkupParser;

impl TagMarkupParser {
    pub fn new() -> Self {
        Self
    }
}

impl RichTextParser for TagMarkupParser {
    fn parse(&self, markup: &str) -> MarkupResult<FormattedMessage> {
        let mut spans = SpanBuilder::default();
        let mut stack: Vec<Frame> = Vec::new();
        let mut offset = 0;

        while offset < markup.len() {
            let rest = &markup[offset..];
            let style = current_style(&stack);

            let Some(pos) = rest.find(|c| c == '<' || c == '\\') else {
                spans.push(rest, style);
                break;
            };
            spans.push(&rest[..pos], style);
            let tail = &rest[pos..];

            if tail.starts_with("\\<") {
                spans.push("<", style);
                offset += pos + 2;
                continue;
            }
            if tail.starts_with('\\') {
                spans.push("\\", style);
                offset += pos + 1;
                continue;
            }

            let Some(end) = tail[1..].find('>') else {
                spans.push(tail, style);
                break;
            };
            let inner = &tail[1..1 + end];
            if inner.contains('<') {
                spans.push("<", style);
                offset += pos + 1;
                continue;
            }

            if let Some(name) = inner.strip_prefix('/') {
                let canonical = canonical_name(name);
                if canonical == "reset" {
                    // closing a reset has nothing to undo
                } else if let Some(idx) = stack.iter().rposition(|f| f.name == canonical) {
                    stack.truncate(idx);
                } else if resolve_tag(&canonical).is_some() {
                    return Err(MarkupError::UnbalancedClose {
                        tag: name.to_string(),
                        position: offset + pos,
                    });
                } else {
                    spans.push(&tail[..end + 2], style);
                }
            } else {
                let canonical = canonical_name(inner);
                match resolve_tag(&canonical) {
                    Some(Tag::Reset) => stack.clear(),
                    Some(tag) => stack.push(Frame {
                        name: canonical,
                        style: apply(style, tag),
                    }),
                    None => spans.push(&tail[..end + 2], style),
                }
            }
            offset += pos + end + 2;
        }

        Ok(FormattedMessage::new(spans.finish()))
    }
}

fn current_style(stack: &[Frame]) -> Style {
    stack.last().map(|f| f.style).unwrap_or_default()
}

/// Lowercase and fold decoration aliases so open and close tags compare equal
fn canonical_name(name: &str) -> String {
    let lower = name.trim().to_ascii_lowercase();
    match lower.as_str() {
        "b" => "bold".to_string(),
        "i" | "em" => "italic".to_string(),
        "u" => "underlined".to_string(),
        "st" => "strikethrough".to_string(),
        "obf" => "obfuscated".to_string(),
        _ => lower,
    }
}

fn resolve_tag(canonical: &str) -> Option<Tag> {
    let tag = match canonical {
        "bold" => Tag::Decoration(Decoration::Bold),
        "italic" => Tag::Decoration(Decoration::Italic),
        "underlined" => Tag::Decoration(Decoration::Underlined),
        "strikethrough" => Tag::Decoration(Decoration::Strikethrough),
        "obfuscated" => Tag::Decoration(Decoration::Obfuscated),
        "reset" => Tag::Reset,
        _ => {
            if let Some(hex) = canonical.strip_prefix('#') {
                Tag::Color(TextColor::from_hex(hex)?)
            } else {
                Tag::Color(TextColor::Named(NamedColor::from_name(canonical)?))
            }
        }
    };
    Some(tag)
}

fn apply(mut style: Style, tag: Tag) -> Style {
    match tag {
        Tag::Color(color) => style.color = Some(color),
        Tag::Decoration(Decoration::Bold) => style.bold = true,
        Tag::Decoration(Decoration::Italic) => style.italic = true,
        Tag::Decoration(Decoration::Underlined) => style.underlined = true,
        Tag::Decoration(Decoration::Strikethrough) => style.strikethrough = true,
        Tag::Decoration(Decoration::Obfuscated) => style.obfuscated = true,
        Tag::Reset => style = Style::default(),
    }
    style
}

/// Accumulates text, merging neighbours that share a style
#[derive(Default)]
struct SpanBuilder {
    spans: Vec<TextSpan>,
}

impl SpanBuilder {
    fn push(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.spans.push(TextSpan {
                text: text.to_string(),
                style,
            }),
        }
    }

    fn finish(self) -> Vec<TextSpan> {
        self.spans
    }
}
