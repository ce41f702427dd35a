//! Declaration extraction: recognising annotated record declarations and
//! decomposing each field into a [`FieldDescriptor`].
//!
//! Extraction is a read-only analysis pass. It is activated by the
//! `#[dom_struct]` marker line, scans to the matching closing brace, and
//! classifies each field's declared type by trying ordered alternatives
//! from most specific to least specific: known record-reference shapes
//! first, then the known wrapper spellings, then a generic fallback that
//! classifies the field as opaque and records a review flag so the field
//! is left untouched rather than aborting the file.

use crate::descriptor::{FieldDescriptor, RecordDecl, ReviewFlag, WrapperKind};
use crate::error::RewriteError;

/// The fixed marker line identifying a declaration as subject to
/// migration.
pub const RECORD_MARKER: &str = "#[dom_struct]";

/// Everything stage one learns about one source text.
#[derive(Debug, Default)]
pub struct Extraction {
    /// The annotated records found, in source order.
    pub records: Vec<RecordDecl>,
    /// Fields whose shape was not recognised.
    pub flags: Vec<ReviewFlag>,
}

/// Scans `source` for annotated record declarations.
///
/// # Errors
///
/// Returns [`RewriteError::UnterminatedConstruct`] if a declaration block
/// is still open at the end of the input, and
/// [`RewriteError::MalformedDeclaration`] if the marker is not followed
/// by a struct header.
pub fn extract(source: &str) -> Result<Extraction, RewriteError> {
    let mut extraction = Extraction::default();
    let mut lines = source.lines().enumerate().peekable();

    while let Some((index, line)) = lines.next() {
        if line.trim() != RECORD_MARKER {
            continue;
        }
        let marker_line = index + 1;
        let record = parse_record(&mut lines, marker_line, &mut extraction.flags)?;
        tracing::debug!(
            record = %record.name,
            fields = record.fields.len(),
            line = marker_line,
            "extracted record declaration"
        );
        extraction.records.push(record);
    }
    Ok(extraction)
}

/// Parses one record declaration, starting just after the marker line.
fn parse_record(
    lines: &mut std::iter::Peekable<std::iter::Enumerate<std::str::Lines<'_>>>,
    marker_line: usize,
    flags: &mut Vec<ReviewFlag>,
) -> Result<RecordDecl, RewriteError> {
    // Attribute lines between the marker and the header are tolerated.
    let (header_index, header) = loop {
        let Some((index, line)) = lines.next() else {
            return Err(RewriteError::unterminated("record declaration", marker_line));
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("#[") {
            continue;
        }
        break (index, trimmed);
    };

    let name = parse_struct_header(header).ok_or_else(|| {
        RewriteError::malformed_declaration(
            header_index + 1,
            format!("expected a struct header after {RECORD_MARKER}, found {header:?}"),
        )
    })?;

    let mut fields = Vec::new();
    loop {
        let Some((index, line)) = lines.next() else {
            return Err(RewriteError::unterminated("record declaration", marker_line));
        };
        let trimmed = line.trim();
        if trimmed == "}" {
            break;
        }
        if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with("#[") {
            continue;
        }
        let line_number = index + 1;
        let Some((field_name, declared_type)) = split_field(trimmed) else {
            flags.push(ReviewFlag {
                line: line_number,
                field: trimmed.to_owned(),
                message: "is not a recognised field declaration".to_owned(),
            });
            continue;
        };
        let (kind, inner_type) = classify_type(&declared_type, fields.is_empty());
        if kind == WrapperKind::Opaque {
            flags.push(ReviewFlag {
                line: line_number,
                field: field_name.clone(),
                message: format!("has unrecognised wrapper shape `{declared_type}`"),
            });
        }
        fields.push(FieldDescriptor {
            name: field_name,
            is_traced: kind.is_traced(),
            kind,
            declared_type,
            inner_type,
            line: line_number,
        });
    }

    Ok(RecordDecl {
        name,
        fields,
        line: marker_line,
    })
}

/// Parses `pub struct Name {` (visibility optional) into the record name.
fn parse_struct_header(header: &str) -> Option<String> {
    let rest = header.strip_prefix("pub ").unwrap_or(header);
    let rest = rest.strip_prefix("struct ")?;
    let rest = rest.strip_suffix('{')?.trim_end();
    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(rest.to_owned())
}

/// Splits a body line into `(name, type-expression)`.
///
/// Trailing separators are stripped; an optional `pub` prefix is
/// accepted.
fn split_field(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("pub ").unwrap_or(line);
    let (name, declared) = rest.split_once(':')?;
    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    let declared = declared.trim().trim_end_matches(',').trim_end();
    if declared.is_empty() {
        return None;
    }
    Some((name.to_owned(), declared.to_owned()))
}

/// Classifies a declared type expression.
///
/// Alternatives are tried from most specific to least specific; anything
/// unmatched is opaque. Returns the kind and, when the kind wraps one,
/// the inner type expression verbatim.
pub(crate) fn classify_type(declared: &str, is_first_field: bool) -> (WrapperKind, Option<String>) {
    let Some(parsed) = split_generic(declared) else {
        return (WrapperKind::Opaque, None);
    };
    match parsed {
        // Record-reference shapes come first.
        (head, None) => {
            if !is_plain_path(head) {
                return (WrapperKind::Opaque, None);
            }
            if is_first_field {
                if last_segment(head) == "Reflector" {
                    (WrapperKind::Reflector, None)
                } else {
                    (WrapperKind::Base, Some(head.to_owned()))
                }
            } else {
                (WrapperKind::Direct, None)
            }
        }
        (head, Some(inner)) => match last_segment(head) {
            "Cell" => (WrapperKind::MutableCell, Some(inner.to_owned())),
            "DOMRefCell" => match split_generic(inner) {
                Some(("Vec", Some(element))) if is_managed_handle(element) => {
                    (WrapperKind::Sequence, Some(element.to_owned()))
                }
                _ => (WrapperKind::BorrowChecked, Some(inner.to_owned())),
            },
            "Box" => (WrapperKind::HeapIndirection, Some(inner.to_owned())),
            "JS" => (WrapperKind::RawHandle, Some(inner.to_owned())),
            "MutNullableHeap" if is_managed_handle(inner) => {
                (WrapperKind::NullableReference, Some(inner.to_owned()))
            }
            "MutNullableJS" => (
                WrapperKind::NullableReference,
                Some(format!("JS<{inner}>")),
            ),
            "Option" if is_managed_handle(inner) => {
                (WrapperKind::NullableReference, Some(inner.to_owned()))
            }
            "Vec" if is_managed_handle(inner) => (WrapperKind::Sequence, Some(inner.to_owned())),
            _ => (WrapperKind::Opaque, None),
        },
    }
}

/// Splits `Head<Inner>` into its parts, or returns `(ty, None)` for a
/// type with no generic arguments.
///
/// Returns `None` when the angle brackets are unbalanced or followed by
/// trailing text.
fn split_generic(ty: &str) -> Option<(&str, Option<&str>)> {
    let Some(open) = ty.find('<') else {
        return Some((ty, None));
    };
    if !ty.ends_with('>') {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in ty.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 && i + 1 != ty.len() {
                    return None;
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    Some((&ty[..open], Some(ty[open + 1..ty.len() - 1].trim())))
}

/// Returns whether `ty` is a `JS<...>` managed-handle expression.
fn is_managed_handle(ty: &str) -> bool {
    matches!(split_generic(ty), Some((head, Some(_))) if last_segment(head) == "JS")
}

/// Returns the last `::` segment of a path head.
fn last_segment(head: &str) -> &str {
    head.rsplit("::").next().unwrap_or(head)
}

/// Returns whether `head` is a bare (possibly `::`-qualified) path with
/// no punctuation beyond the separators.
fn is_plain_path(head: &str) -> bool {
    !head.is_empty()
        && head
            .split("::")
            .all(|segment| {
                !segment.is_empty()
                    && segment
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_')
            })
}
