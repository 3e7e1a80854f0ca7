//! Text markup handling.
//!
//! Messages are authored in either of two dialects:
//! - legacy inline codes: `&a`, `&l`, `&#RRGGBB`
//! - structured tags: `<green>`, `<bold>`, `<#RRGGBB>`
//!
//! Rendering is two-phase. [`translate_legacy`] rewrites legacy codes into
//! structured tags, then a [`RichTextParser`] builds the final
//! [`FormattedMessage`].
//!
//! # Example
//!
//! ```
//! use locale_messenger::markup::{translate_legacy, RichTextParser, TagMarkupParser};
//!
//! let markup = translate_legacy("&aHello &#FF8800world");
//! assert_eq!(markup, "<green>Hello <#FF8800>world");
//!
//! let message = TagMarkupParser::new().parse(&markup).unwrap();
//! assert_eq!(message.plain_text(), "Hello world");
//! ```

mod component;
mod legacy;
mod parser;

pub use component::{FormattedMessage, NamedColor, Style, TextColor, TextSpan};
pub use legacy::{legacy_tag, translate_legacy, LEGACY_MARKER};
pub use parser::{MarkupError, MarkupResult, RichTextParser, TagMarkupParser};
