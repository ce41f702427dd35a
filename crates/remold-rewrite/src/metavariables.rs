//! Metavariable parsing helpers shared across modules.
//!
//! Patterns and replacement templates use `$NAME` and `$$$NAME`
//! metavariables. This module centralises the name rules so parsing stays
//! consistent between pattern compilation and template compilation.

/// Returns whether `c` is a valid first character for a metavariable name.
///
/// Metavariable names must begin with an ASCII uppercase letter or `_`.
pub(crate) const fn is_valid_metavar_start_char(c: char) -> bool {
    c.is_ascii_uppercase() || c == '_'
}

/// Returns whether `c` is a valid continuation character for a metavariable
/// name.
pub(crate) const fn is_valid_metavar_continuation_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'
}

/// Extracts a metavariable name from a character stream.
///
/// The stream is expected to be positioned at the first character after the
/// `$` prefix. Returns an empty string if the next character is not a valid
/// start.
pub(crate) fn extract_metavar_name(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> String {
    let mut name = String::new();

    let Some((_, first_char)) = chars.peek().copied() else {
        return name;
    };

    if !is_valid_metavar_start_char(first_char) {
        return name;
    }

    name.push(first_char);
    chars.next();

    while let Some((_, c)) = chars.peek().copied() {
        if !is_valid_metavar_continuation_char(c) {
            break;
        }
        name.push(c);
        chars.next();
    }

    name
}

/// Returns whether `c` may start a source-language identifier.
pub(crate) const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Returns whether `c` may continue a source-language identifier.
pub(crate) const fn is_ident_continuation_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns the byte length of the identifier at the start of `text`, or
/// zero if `text` does not begin with one.
pub(crate) fn leading_ident_len(text: &str) -> usize {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return 0;
    };
    if !is_ident_start_char(first) {
        return 0;
    }
    let mut len = first.len_utf8();
    for c in chars {
        if !is_ident_continuation_char(c) {
            break;
        }
        len += c.len_utf8();
    }
    len
}
