//! Line-level pattern compilation and matching.
//!
//! This module implements the textual pattern language the rule engine
//! executes. A pattern is a sequence of literal segments interleaved with
//! metavariables:
//!
//! - `$NAME` matches a single source-language identifier and captures it.
//! - `$$$NAME` matches a span of text up to the next literal segment. The
//!   terminating literal must occur at bracket depth zero with respect to
//!   `()`, `[]`, and `{}`, so call arguments containing nested calls are
//!   captured whole. At the end of a pattern the span runs to the end of
//!   the input.
//!
//! Patterns match at any column; the engine preserves the text before and
//! after a match, so indentation and trailing punctuation survive
//! substitution untouched.

use crate::error::RewriteError;
use crate::metavariables::{
    extract_metavar_name, is_ident_continuation_char, is_ident_start_char, leading_ident_len,
};

/// One compiled pattern segment.
#[derive(Debug, Clone)]
enum Segment {
    /// Verbatim text that must appear in the input.
    Literal(String),
    /// `$NAME`: a single identifier capture.
    Ident(String),
    /// `$$$NAME`: a bracket-balanced span capture.
    Span(String),
}

/// Restriction on the character immediately following a match.
///
/// Guards keep broad fallback patterns from re-matching text a more
/// specific rule (or a previous run of the tool) has already rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Guard {
    /// No restriction.
    #[default]
    None,
    /// Rejects a match that is immediately followed by an identifier
    /// character or by one of the migrated accessor spellings (`.get(`,
    /// `.set(`, `.init(`, `.get_for_layout(`, `.set_for_layout(`,
    /// `.new_inherited(`).
    ///
    /// Used by the generic field-read fallback: `self.field` must not
    /// truncate a longer field name, and must not rewrite an access that
    /// is already in migrated form.
    NotMigratedRead,
}

/// Accessor spellings that mark an already-migrated call site.
const MIGRATED_ACCESSORS: &[&str] = &[
    ".get(",
    ".set(",
    ".init(",
    ".get_for_layout(",
    ".set_for_layout(",
    ".new_inherited(",
];

/// A compiled line-level pattern.
#[derive(Debug, Clone)]
pub struct LinePattern {
    source: String,
    segments: Vec<Segment>,
    guard: Guard,
}

/// A successful pattern match with its capture bindings.
#[derive(Debug, Clone)]
pub struct LineMatch {
    start: usize,
    end: usize,
    bindings: Vec<(String, String)>,
}

impl LineMatch {
    /// Returns the half-open byte range of the match within the input.
    #[must_use]
    pub const fn byte_range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    /// Returns the text captured by the named metavariable, if bound.
    #[must_use]
    pub fn capture(&self, name: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, text)| text.as_str())
    }
}

impl LinePattern {
    /// Compiles a pattern string.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern contains invalid metavariable
    /// syntax, or if a `$$$NAME` span is followed by anything other than a
    /// literal segment or the end of the pattern.
    pub fn compile(source: &str) -> Result<Self, RewriteError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((_, c)) = chars.next() {
            if c != '$' {
                literal.push(c);
                continue;
            }
            let mut dollars = 1;
            while dollars < 3 && matches!(chars.peek(), Some((_, '$'))) {
                chars.next();
                dollars += 1;
            }
            let name = extract_metavar_name(&mut chars);
            if name.is_empty() {
                return Err(RewriteError::invalid_metavariable(format!(
                    "pattern {source:?} has a `$` without a metavariable name"
                )));
            }
            if dollars == 2 {
                return Err(RewriteError::invalid_metavariable(format!(
                    "pattern {source:?} uses `$$`; write `$NAME` or `$$$NAME`"
                )));
            }
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(if dollars == 1 {
                Segment::Ident(name)
            } else {
                Segment::Span(name)
            });
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        // A span capture needs a literal terminator (or pattern end) to
        // know where it stops.
        for pair in segments.windows(2) {
            if matches!(pair, [Segment::Span(_), Segment::Ident(_) | Segment::Span(_)]) {
                return Err(RewriteError::invalid_pattern(
                    source,
                    "a `$$$NAME` span must be followed by literal text or end the pattern",
                ));
            }
        }
        if segments.is_empty() {
            return Err(RewriteError::invalid_pattern(source, "pattern is empty"));
        }

        Ok(Self {
            source: source.to_owned(),
            segments,
            guard: Guard::None,
        })
    }

    /// Attaches a guard to the pattern.
    #[must_use]
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = guard;
        self
    }

    /// Returns the original pattern source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the names of the metavariables the pattern binds.
    #[must_use]
    pub fn metavariables(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Ident(name) | Segment::Span(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Finds the first match in `line`.
    #[must_use]
    pub fn find(&self, line: &str) -> Option<LineMatch> {
        self.find_from(line, 0)
    }

    /// Finds the first match in `line` starting at or after `from`.
    #[must_use]
    pub fn find_from(&self, line: &str, from: usize) -> Option<LineMatch> {
        let mut start = from;
        while start <= line.len() {
            if line.is_char_boundary(start) {
                if let Some(found) = self.match_at(line, start) {
                    return Some(found);
                }
            }
            start += 1;
        }
        None
    }

    /// Attempts to match the full segment sequence anchored at `start`.
    fn match_at(&self, line: &str, start: usize) -> Option<LineMatch> {
        // A pattern that opens with identifier text must not match in the
        // middle of a longer identifier: `event: Event` must not bind
        // inside `my_event: Event`.
        if self.starts_with_ident_text()
            && line[..start]
                .chars()
                .next_back()
                .is_some_and(is_ident_continuation_char)
        {
            return None;
        }
        let mut pos = start;
        let mut bindings = Vec::new();
        let mut segments = self.segments.iter().peekable();

        while let Some(segment) = segments.next() {
            match segment {
                Segment::Literal(lit) => {
                    if !line[pos..].starts_with(lit.as_str()) {
                        return None;
                    }
                    pos += lit.len();
                }
                Segment::Ident(name) => {
                    let len = leading_ident_len(&line[pos..]);
                    if len == 0 {
                        return None;
                    }
                    bindings.push((name.clone(), line[pos..pos + len].to_owned()));
                    pos += len;
                }
                Segment::Span(name) => {
                    let captured_len = match segments.peek() {
                        Some(Segment::Literal(term)) => balanced_prefix_len(&line[pos..], term)?,
                        // Validated at compile time: a span is followed by
                        // a literal or ends the pattern.
                        _ => line.len() - pos,
                    };
                    bindings.push((name.clone(), line[pos..pos + captured_len].to_owned()));
                    pos += captured_len;
                }
            }
        }

        if !self.guard_allows(line, pos) {
            return None;
        }
        Some(LineMatch {
            start,
            end: pos,
            bindings,
        })
    }

    /// Returns whether the pattern's first segment begins with identifier
    /// text.
    fn starts_with_ident_text(&self) -> bool {
        match self.segments.first() {
            Some(Segment::Literal(lit)) => lit.chars().next().is_some_and(is_ident_start_char),
            Some(Segment::Ident(_) | Segment::Span(_)) | None => false,
        }
    }

    /// Applies the pattern's guard at the match end position.
    fn guard_allows(&self, line: &str, end: usize) -> bool {
        match self.guard {
            Guard::None => true,
            Guard::NotMigratedRead => {
                let rest = &line[end..];
                if rest.chars().next().is_some_and(is_ident_continuation_char) {
                    return false;
                }
                !MIGRATED_ACCESSORS
                    .iter()
                    .any(|accessor| rest.starts_with(accessor))
            }
        }
    }
}

/// Returns the length of the shortest prefix of `text` after which `term`
/// occurs at bracket depth zero.
///
/// Returns `None` when a closing bracket would unbalance the span before
/// the terminator is seen, or when the input ends first.
fn balanced_prefix_len(text: &str, term: &str) -> Option<usize> {
    let mut depth: usize = 0;
    for (i, c) in text.char_indices() {
        if depth == 0 && text[i..].starts_with(term) {
            return Some(i);
        }
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}
