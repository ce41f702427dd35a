//! Field descriptors: the structured form of one declared record field.
//!
//! A descriptor is created while scanning a record's declaration block,
//! consumed immediately to synthesise rewrite rules, and not persisted
//! beyond that record's processing.

use std::fmt;

/// The wrapper taxonomy a declared field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapperKind {
    /// First field naming the record's parent type; becomes `Base<P>`.
    Base,
    /// First field of type `Reflector`; the migrated macro supplies the
    /// reflector, so the field is removed.
    Reflector,
    /// Plain immutable-after-construction value; declaration unchanged.
    Direct,
    /// `Cell<T>`: runtime-checked same-context mutable slot; becomes
    /// `Mut<T>`.
    MutableCell,
    /// `DOMRefCell<T>`: runtime-borrow-counted container usable from the
    /// layout context; becomes `Layout<T>`.
    BorrowChecked,
    /// `Box<T>`: owned pointer to separately heap-allocated data;
    /// declaration unchanged.
    HeapIndirection,
    /// `MutNullableHeap<JS<T>>` or `Option<JS<T>>`: optional managed
    /// reference, lazily set once; becomes `Option<JS<T>>`.
    NullableReference,
    /// `JS<T>`: pointer into the externally managed, garbage-collected
    /// heap; declaration unchanged.
    RawHandle,
    /// `Vec<JS<T>>` (possibly inside `DOMRefCell`): ordered collection of
    /// managed handles; becomes `DOMVec<JS<T>>`.
    Sequence,
    /// Unrecognised shape: left untouched and flagged for manual review.
    Opaque,
}

impl WrapperKind {
    /// Returns whether the wrapper must remain visible to the external
    /// tracing/rooting protocol.
    #[must_use]
    pub const fn is_traced(self) -> bool {
        matches!(
            self,
            Self::Base | Self::NullableReference | Self::RawHandle | Self::Sequence
        )
    }

    /// Returns a short human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Reflector => "reflector",
            Self::Direct => "direct",
            Self::MutableCell => "mutable cell",
            Self::BorrowChecked => "borrow checked",
            Self::HeapIndirection => "heap indirection",
            Self::NullableReference => "nullable reference",
            Self::RawHandle => "raw handle",
            Self::Sequence => "sequence",
            Self::Opaque => "opaque",
        }
    }
}

impl fmt::Display for WrapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One declared field, decomposed.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field identifier; unique within its record.
    pub name: String,
    /// The wrapper taxonomy the declared type belongs to.
    pub kind: WrapperKind,
    /// The declared type expression, verbatim (trailing separator
    /// stripped).
    pub declared_type: String,
    /// The wrapped inner type expression, verbatim, when the kind has
    /// one.
    pub inner_type: Option<String>,
    /// Whether the field participates in the tracing/rooting protocol.
    pub is_traced: bool,
    /// One-based source line of the declaration.
    pub line: usize,
}

/// One annotated record declaration.
#[derive(Debug, Clone)]
pub struct RecordDecl {
    /// The record's type name.
    pub name: String,
    /// The record's fields, in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// One-based source line of the annotation marker.
    pub line: usize,
}

/// A location that needs manual attention after migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewFlag {
    /// One-based source line.
    pub line: usize,
    /// The field the flag concerns.
    pub field: String,
    /// Why the location was flagged.
    pub message: String,
}

impl fmt::Display for ReviewFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} {}", self.line, self.field, self.message)
    }
}
