//! Legacy inline color codes to structured tag markup

use std::borrow::Cow;

/// Marker character that introduces a legacy formatting code
pub const LEGACY_MARKER: char = '&';

/// Number of hex digits in a legacy `&#RRGGBB` color
const HEX_DIGITS: usize = 6;

/// Legacy code character -> structured tag
const LEGACY_CODES: [(char, &str); 22] = [
    ('0', "<black>"),
    ('1', "<dark_blue>"),
    ('2', "<dark_green>"),
    ('3', "<dark_aqua>"),
    ('4', "<dark_red>"),
    ('5', "<dark_purple>"),
    ('6', "<gold>"),
    ('7', "<gray>"),
    ('8', "<dark_gray>"),
    ('9', "<blue>"),
    ('a', "<green>"),
    ('b', "<aqua>"),
    ('c', "<red>"),
    ('d', "<light_purple>"),
    ('e', "<yellow>"),
    ('f', "<white>"),
    ('k', "<obfuscated>"),
    ('l', "<bold>"),
    ('m', "<strikethrough>"),
    ('n', "<underlined>"),
    ('o', "<italic>"),
    ('r', "<reset>"),
];

/// Look up the structured tag for a single legacy code character
pub fn legacy_tag(code: char) -> Option<&'static str> {
    LEGACY_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, tag)| *tag)
}

/// Translate legacy `&x` and `&#RRGGBB` codes into structured tags.
///
/// Never fails: a marker followed by anything that is not a recognized code is
/// copied through literally. Input without a marker is returned borrowed.
pub fn translate_legacy(text: &str) -> Cow<'_, str> {
    if !text.contains(LEGACY_MARKER) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut rest = text;

    while let Some(pos) = rest.find(LEGACY_MARKER) {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + LEGACY_MARKER.len_utf8()..];

        if let Some(hex) = hex_color(after) {
            out.push_str("<#");
            out.push_str(hex);
            out.push('>');
            rest = &after[1 + HEX_DIGITS..];
            continue;
        }

        match after.chars().next().and_then(legacy_tag) {
            Some(tag) => {
                out.push_str(tag);
                // Every code character is ASCII
                rest = &after[1..];
            }
            None => {
                out.push(LEGACY_MARKER);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    Cow::Owned(out)
}

/// Match `#RRGGBB` at the start of `s`, returning the six hex digits verbatim
fn hex_color(s: &str) -> Option<&str> {
    let body = s.strip_prefix('#')?;
    let digits = body.get(..HEX_DIGITS)?;
    digits
        .bytes()
        .all(|b| b.is_ascii_hexdigit())
        .then_some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_marker_is_borrowed() {
        let result = translate_legacy("<green>Hello</green>");
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "<green>Hello</green>");
    }

    #[test]
    fn test_single_codes_in_order() {
        let result = translate_legacy("&aHello &l&cWorld&r!");
        assert_eq!(result, "<green>Hello <bold><red>World<reset>!");
        assert!(!result.contains(LEGACY_MARKER));
    }

    #[test]
    fn test_every_code_has_one_tag() {
        for (code, tag) in LEGACY_CODES {
            let input = format!("x&{}y", code);
            assert_eq!(translate_legacy(&input), format!("x{}y", tag));
        }
    }

    #[test]
    fn test_hex_case_preserved() {
        assert_eq!(translate_legacy("&#FfA0b1Hi"), "<#FfA0b1>Hi");
        assert_eq!(translate_legacy("&#123456&#abcdef"), "<#123456><#abcdef>");
    }

    #[test]
    fn test_hex_body_not_reinterpreted() {
        // "a1" inside the hex body must not become <green>
        assert_eq!(translate_legacy("&#a1a1a1text"), "<#a1a1a1>text");
    }

    #[test]
    fn test_invalid_hex_left_untouched() {
        assert_eq!(translate_legacy("&#GGGGGG"), "&#GGGGGG");
        assert_eq!(translate_legacy("&#12345"), "&#12345");
        assert_eq!(translate_legacy("&#12345&a"), "&#12345<green>");
    }

    #[test]
    fn test_unknown_code_passthrough() {
        assert_eq!(translate_legacy("Tom & Jerry"), "Tom & Jerry");
        assert_eq!(translate_legacy("&zfoo&"), "&zfoo&");
        assert_eq!(translate_legacy("&A"), "&A");
        assert_eq!(translate_legacy("&&a"), "&<green>");
    }

    #[test]
    fn test_multibyte_after_marker() {
        assert_eq!(translate_legacy("&éclair &eok"), "&éclair <yellow>ok");
    }

    #[test]
    fn test_idempotent_on_tag_markup() {
        let once = translate_legacy("&6Gold &#00FF00green").into_owned();
        let twice = translate_legacy(&once);
        assert_eq!(once, twice);
    }
}
