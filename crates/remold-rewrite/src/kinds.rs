//! The wrapper-kind rewrite table.
//!
//! A pure mapping from a classified field descriptor to the textual
//! rewrites that apply to it: the declaration-level replacement, the
//! accessor templates for usage sites, and the initialiser rewrite used
//! inside the old constructor's struct literal. Substitution is purely
//! textual; capture groups from the match are substituted positionally
//! into the replacement with no type-level validation, so the match
//! patterns are written to be as specific as the line level allows.

use crate::descriptor::{FieldDescriptor, WrapperKind};

/// How a field's declaration line is rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclRewrite {
    /// The declared type is already in migrated form.
    Keep,
    /// The declared type is replaced by the given spelling.
    Replace(String),
    /// The declaration line is removed entirely.
    Remove,
}

/// One accessor rewrite template, to be instantiated as a rule.
#[derive(Debug, Clone)]
pub(crate) struct AccessorTemplate {
    /// Pattern text (already specialised to the field's name).
    pub(crate) pattern: String,
    /// Replacement text.
    pub(crate) replacement: String,
    /// Whether the pattern carries the migrated-read guard.
    pub(crate) guarded: bool,
}

/// One constructor-initialiser rewrite template.
#[derive(Debug, Clone)]
pub(crate) enum InitTemplate {
    /// Rewrite `pattern` to `replacement`.
    Rewrite {
        /// Pattern text.
        pattern: String,
        /// Replacement text.
        replacement: String,
    },
    /// Drop lines matching `pattern`.
    Drop {
        /// Pattern text.
        pattern: String,
    },
}

/// Returns the declaration-level replacement for a field.
#[must_use]
pub fn declaration_rewrite(field: &FieldDescriptor) -> DeclRewrite {
    let inner = field.inner_type.as_deref().unwrap_or_default();
    match field.kind {
        WrapperKind::Base => DeclRewrite::Replace(format!("Base<{inner}>")),
        WrapperKind::Reflector => DeclRewrite::Remove,
        WrapperKind::MutableCell => DeclRewrite::Replace(format!("Mut<{inner}>")),
        WrapperKind::BorrowChecked => DeclRewrite::Replace(format!("Layout<{inner}>")),
        WrapperKind::NullableReference => DeclRewrite::Replace(format!("Option<{inner}>")),
        WrapperKind::Sequence => DeclRewrite::Replace(format!("DOMVec<{inner}>")),
        WrapperKind::Direct
        | WrapperKind::HeapIndirection
        | WrapperKind::RawHandle
        | WrapperKind::Opaque => DeclRewrite::Keep,
    }
}

/// Returns the accessor rewrite templates for a field's usage sites.
///
/// Templates are ordered most specific first; the engine's
/// first-match-wins policy (per occurrence) then picks the most specific
/// rewrite. The generic guarded read comes last.
pub(crate) fn accessor_templates(field: &FieldDescriptor) -> Vec<AccessorTemplate> {
    let f = &field.name;
    let mut templates = Vec::new();
    let mut push = |pattern: String, replacement: String| {
        templates.push(AccessorTemplate {
            pattern,
            replacement,
            guarded: false,
        });
    };
    match field.kind {
        WrapperKind::BorrowChecked => {
            push(
                format!("*self.{f}.borrow_mut() = $$$VALUE;"),
                format!("self.{f}.set($VALUE);"),
            );
            push(
                format!("self.{f}.borrow_for_layout()"),
                format!("self.{f}.get_for_layout()"),
            );
            // A bare `borrow_mut` has no mechanical equivalent; it is
            // left in place and flagged after the rewrite pass.
            push(format!("self.{f}.borrow()"), format!("self.{f}.get()"));
        }
        WrapperKind::RawHandle => {
            push(
                format!("self.{f}.unsafe_get()"),
                format!("self.{f}.get_for_layout()"),
            );
            push(
                format!("self.{f}.root()"),
                format!("self.{f}.get().root()"),
            );
            templates.push(generic_read(f));
        }
        WrapperKind::MutableCell => {
            push(
                format!("self.{f} = $$$VALUE;"),
                format!("self.{f}.set($VALUE);"),
            );
        }
        WrapperKind::Direct | WrapperKind::HeapIndirection | WrapperKind::Sequence => {
            push(format!("self.{f}.clone()"), format!("self.{f}.get()"));
            push(
                format!("self.{f}.iter()"),
                format!("self.{f}.get().iter()"),
            );
            push(format!("self.{f}.len()"), format!("self.{f}.get().len()"));
            templates.push(generic_read(f));
        }
        WrapperKind::Base
        | WrapperKind::Reflector
        | WrapperKind::NullableReference
        | WrapperKind::Opaque => {}
    }
    templates
}

/// The guarded generic fallback: a bare `self.field` read becomes
/// `self.field.get()`.
fn generic_read(field: &str) -> AccessorTemplate {
    AccessorTemplate {
        pattern: format!("self.{field}"),
        replacement: format!("self.{field}.get()"),
        guarded: true,
    }
}

/// Returns the constructor-initialiser rewrite templates for a field.
///
/// These apply inside the old `new_inherited` struct literal, turning
/// each `name: expression,` entry into an explicit initialisation
/// statement. Wrapper constructors are unwrapped before the generic
/// fallback runs.
pub(crate) fn initialiser_templates(field: &FieldDescriptor) -> Vec<InitTemplate> {
    let f = &field.name;
    let rewrite = |pattern: String, replacement: String| InitTemplate::Rewrite {
        pattern,
        replacement,
    };
    match field.kind {
        WrapperKind::Base => vec![
            rewrite(
                format!("{f}: $BASE::new_inherited($$$ARGS),"),
                format!("self.{f}.new_inherited($ARGS);"),
            ),
            rewrite(
                format!("{f}: $BASE::new_inherited($$$ARGS)"),
                format!("self.{f}.new_inherited($ARGS);"),
            ),
        ],
        WrapperKind::Reflector => vec![InitTemplate::Drop {
            pattern: format!("{f}: Reflector::new()"),
        }],
        WrapperKind::MutableCell => with_generic_fallback(f, unwrap_init(f, "Cell")),
        WrapperKind::BorrowChecked | WrapperKind::Sequence => {
            with_generic_fallback(f, unwrap_init(f, "DOMRefCell"))
        }
        WrapperKind::NullableReference => {
            let mut templates = vec![
                rewrite(
                    format!("{f}: Default::default(),"),
                    format!("self.{f}.init(None);"),
                ),
                rewrite(
                    format!("{f}: Default::default()"),
                    format!("self.{f}.init(None);"),
                ),
            ];
            templates.extend(unwrap_init(f, "MutNullableHeap"));
            templates.extend(generic_init(f));
            templates
        }
        WrapperKind::Direct | WrapperKind::HeapIndirection | WrapperKind::RawHandle => {
            generic_init(f)
        }
        WrapperKind::Opaque => Vec::new(),
    }
}

/// Unwraps a wrapper constructor: `name: Wrapper::new(expression)` (with
/// or without the trailing comma) becomes `self.name.init(expression);`.
fn unwrap_init(field: &str, wrapper: &str) -> Vec<InitTemplate> {
    [
        format!("{field}: {wrapper}::new($$$VALUE),"),
        format!("{field}: {wrapper}::new($$$VALUE)"),
    ]
    .into_iter()
    .map(|pattern| InitTemplate::Rewrite {
        pattern,
        replacement: format!("self.{field}.init($VALUE);"),
    })
    .collect()
}

/// Prepends wrapper-specific unwrap templates to the generic fallback.
fn with_generic_fallback(field: &str, specific: Vec<InitTemplate>) -> Vec<InitTemplate> {
    let mut templates = specific;
    templates.extend(generic_init(field));
    templates
}

/// The generic initialiser fallback: `name: expression,` becomes
/// `self.name.init(expression);`, with and without the trailing comma.
fn generic_init(field: &str) -> Vec<InitTemplate> {
    vec![
        InitTemplate::Rewrite {
            pattern: format!("{field}: $$$VALUE,"),
            replacement: format!("self.{field}.init($VALUE);"),
        },
        InitTemplate::Rewrite {
            pattern: format!("{field}: $$$VALUE"),
            replacement: format!("self.{field}.init($VALUE);"),
        },
    ]
}
