//! Batch migration of DOM-object modules to the magic wrapper taxonomy.
//!
//! This crate is the core of the `remold` tool. Given a source module
//! that declares `#[dom_struct]` records, it mechanically migrates every
//! declaration and every call site that reads or writes those fields to
//! the `magic_dom_struct!` taxonomy, in two stages:
//!
//! 1. A read-only analysis pass extracts each annotated record and
//!    decomposes its fields into [`FieldDescriptor`] values.
//! 2. The synthesiser derives a field-specific rewrite rule set from the
//!    descriptors, composes it with the static constructor and
//!    struct-declaration rule sets, and the line-oriented rule engine
//!    applies the combined program over the same text.
//!
//! The engine works at the line/pattern level, not on a syntax tree: it
//! trades generality for simplicity on a known, narrow set of
//! declaration and call shapes. Unrecognised shapes degrade to
//! pass-through and are surfaced as [`ReviewFlag`]s rather than aborting
//! the file; the only fatal per-file condition is an unterminated
//! multi-line construct.
//!
//! The entry point is [`migrate_source`]:
//!
//! ```no_run
//! let migration = remold_rewrite::migrate_source("...")?;
//! println!("{}", migration.output);
//! # Ok::<(), remold_rewrite::RewriteError>(())
//! ```

mod ctor;
mod declaration;
mod descriptor;
mod engine;
mod error;
mod kinds;
mod metavariables;
mod pattern;
mod pipeline;
mod rule;
mod synthesize;

pub use declaration::{Extraction, RECORD_MARKER, extract};
pub use descriptor::{FieldDescriptor, RecordDecl, ReviewFlag, WrapperKind};
pub use engine::{Engine, Program, StateId};
pub use error::RewriteError;
pub use kinds::{DeclRewrite, declaration_rewrite};
pub use pattern::{Guard, LineMatch, LinePattern};
pub use pipeline::{Migration, migrate_source};
pub use rule::{Action, Flow, Rule, RuleSpan, Template};
pub use synthesize::build_program;
