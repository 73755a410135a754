//! Backslash escape decoding for `Key` and `Value` text.
//!
//! Recognized forms: `\n \r \f \t \v \b \\`, `\x` with 1 to 4 hex digits,
//! `\u` with exactly 4 and `\U` with exactly 8 hex digits. Anything else,
//! including a hex payload that is not a Unicode scalar value, is left as-is.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref ESCAPE_REGEX: Regex = Regex::new(
        r"\\(?:(?P<simple>[nrftvb\\])|x(?P<x>[0-9A-Fa-f]{1,4})|u(?P<u>[0-9A-Fa-f]{4})|U(?P<big_u>[0-9A-Fa-f]{8}))"
    )
    .unwrap();
}

/// Decodes escape sequences in `text`. Borrows when nothing needs replacing.
pub fn decode(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        return Cow::Borrowed(text);
    }
    ESCAPE_REGEX.replace_all(text, |caps: &Captures| {
        decode_sequence(caps).unwrap_or_else(|| caps[0].to_string())
    })
}

fn decode_sequence(caps: &Captures) -> Option<String> {
    if let Some(simple) = caps.name("simple") {
        let ch = match simple.as_str() {
            "n" => '\n',
            "r" => '\r',
            "f" => '\u{0C}',
            "t" => '\t',
            "v" => '\u{0B}',
            "b" => '\u{08}',
            _ => '\\',
        };
        return Some(ch.to_string());
    }

    let hex = caps
        .name("x")
        .or_else(|| caps.name("u"))
        .or_else(|| caps.name("big_u"))?;
    let code = u32::from_str_radix(hex.as_str(), 16).ok()?;
    char::from_u32(code).map(|c| c.to_string())
}
