//! Text Normalization
//!
//! Player-facing strings are NFKC normalized, trimmed and have internal
//! whitespace runs collapsed before any validation happens.

use unicode_normalization::UnicodeNormalization;

/// Characters that carry meaning in HTML or attribute contexts.
pub const MARKUP_CHARS: &[char] = &['<', '>', '&', '"', '\'', '`', '\\'];

/// NFKC normalize, trim and collapse whitespace runs to a single space.
pub fn normalize_display_text(input: &str) -> String {
    let normalized: String = input.nfkc().collect();
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Control characters plus the invisible format characters used for spoofing.
pub fn is_control_char(c: char) -> bool {
    c.is_control() || matches!(c, '\u{200B}'..='\u{200F}' | '\u{2028}'..='\u{202E}' | '\u{FEFF}')
}

/// First control character, if any.
pub fn find_control_char(input: &str) -> Option<char> {
    input.chars().find(|&c| is_control_char(c))
}

/// First markup character, if any.
pub fn find_markup_char(input: &str) -> Option<char> {
    input.chars().find(|c| MARKUP_CHARS.contains(c))
}
