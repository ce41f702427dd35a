//! The per-file migration pipeline.
//!
//! Two sequential stages, communicating through explicit in-memory
//! values rather than a transient rule-script file:
//!
//! 1. **Analysis** — the declaration extractor scans the full text and
//!    produces record declarations plus review flags. Nothing is
//!    written.
//! 2. **Rewrite** — the synthesiser turns the extraction into a rewrite
//!    program and the engine runs it over the same text.
//!
//! A stage-one failure prevents stage two from running; any failure
//! yields no output at all, so the caller can guarantee an atomic
//! per-file commit. Files are processed independently — the pipeline
//! shares no state between inputs.

use crate::declaration::{self, Extraction};
use crate::descriptor::{ReviewFlag, WrapperKind};
use crate::engine::Engine;
use crate::error::RewriteError;
use crate::synthesize;

/// The result of migrating one source text.
#[derive(Debug)]
pub struct Migration {
    /// The rewritten text.
    pub output: String,
    /// Locations needing manual attention.
    pub flags: Vec<ReviewFlag>,
    /// Number of rewrite rules the synthesiser generated.
    pub rules_generated: usize,
}

impl Migration {
    /// Returns whether the rewrite changed the text.
    #[must_use]
    pub fn changed(&self, original: &str) -> bool {
        self.output != original
    }
}

/// Migrates one source text.
///
/// # Errors
///
/// Returns an error when a declaration block or a multi-line call
/// expression is unterminated; in that case no output exists and the
/// original file must be left untouched.
pub fn migrate_source(source: &str) -> Result<Migration, RewriteError> {
    let extraction = declaration::extract(source)?;
    let program = synthesize::build_program(&extraction)?;
    let rules_generated = program.rule_count();
    let output = Engine::run(&program, source)?;

    let mut flags = extraction.flags.clone();
    flags.extend(residual_borrow_flags(&output, &extraction));
    flags.extend(residual_initialiser_flags(&output, &extraction));
    flags.sort_by_key(|flag| flag.line);

    tracing::debug!(
        records = extraction.records.len(),
        rules = rules_generated,
        flags = flags.len(),
        "migrated source"
    );
    Ok(Migration {
        output,
        flags,
        rules_generated,
    })
}

/// Flags opaque fields whose constructor entry survived the rewrite.
///
/// An unrecognised field has no initialiser rule, so its `name: value,`
/// entry is forwarded into the rewritten `new_inherited` as a dangling
/// struct-literal fragment. The flag points the operator at that line,
/// not only at the declaration.
fn residual_initialiser_flags(output: &str, extraction: &Extraction) -> Vec<ReviewFlag> {
    let mut flags = Vec::new();
    for record in &extraction.records {
        for field in &record.fields {
            if field.kind != WrapperKind::Opaque {
                continue;
            }
            let declaration = format!("{}: {}", field.name, field.declared_type);
            let entry = format!("{}: ", field.name);
            for (index, line) in output.lines().enumerate() {
                let trimmed = line.trim_start();
                if trimmed.starts_with(&entry) && !trimmed.starts_with(&declaration) {
                    flags.push(ReviewFlag {
                        line: index + 1,
                        field: field.name.clone(),
                        message: "constructor entry needs a manual rewrite".to_owned(),
                    });
                }
            }
        }
    }
    flags
}

/// Flags borrow-checked fields still accessed through `borrow_mut`.
///
/// A bare mutable borrow has no mechanical equivalent under the migrated
/// taxonomy, so any occurrence surviving the rewrite needs a human.
fn residual_borrow_flags(output: &str, extraction: &Extraction) -> Vec<ReviewFlag> {
    let mut flags = Vec::new();
    for record in &extraction.records {
        for field in &record.fields {
            let needle = format!("self.{}.borrow_mut()", field.name);
            for (index, line) in output.lines().enumerate() {
                if line.contains(&needle) {
                    flags.push(ReviewFlag {
                        line: index + 1,
                        field: field.name.clone(),
                        message: "still uses borrow_mut; rewrite by hand".to_owned(),
                    });
                }
            }
        }
    }
    flags
}
