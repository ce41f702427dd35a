//! Rule synthesis: turning extracted field descriptors into the concrete
//! rewrite program for one source text.
//!
//! This is stage one's output. For every classified field the
//! synthesiser instantiates the rewrite table's templates as in-memory
//! [`Rule`] values — one batch per field, in declaration order — and
//! composes them with the static constructor rule set and the
//! struct-declaration rewrite into a single [`Program`] that stage two
//! executes. Rules are file-scoped: two records declaring fields with
//! the same name share accessor rules, a documented limitation of the
//! generation-order scoping.

use crate::ctor;
use crate::declaration::{Extraction, RECORD_MARKER};
use crate::descriptor::RecordDecl;
use crate::engine::{Program, StateId};
use crate::error::RewriteError;
use crate::kinds::{self, DeclRewrite, InitTemplate};
use crate::pattern::{Guard, LinePattern};
use crate::rule::{Flow, Rule};

/// Builds the stage-two rewrite program from stage one's extraction.
///
/// # Errors
///
/// Returns an error if a synthesised pattern or template fails to
/// compile; the templates are fixed, so this indicates a malformed field
/// or record name rather than user input the tool should tolerate.
pub fn build_program(extraction: &Extraction) -> Result<Program, RewriteError> {
    let mut program = Program::new();
    let scanning = program.add_state("scanning", 0);
    let struct_body = program.add_state("struct-body", 4);
    let ctor_body = program.add_state("ctor-body", 0);
    let ctor_literal = program.add_state("ctor-literal", -4);
    let ctor_tail = program.add_state("ctor-tail", 0);

    push_scanning_rules(&mut program, scanning, struct_body, ctor_body, extraction)?;
    push_struct_body_rules(&mut program, struct_body, scanning, extraction)?;
    push_ctor_rules(&mut program, ctor_body, ctor_literal, ctor_tail, scanning, extraction)?;

    tracing::debug!(
        records = extraction.records.len(),
        rules = program.rule_count(),
        "synthesised rewrite program"
    );
    Ok(program)
}

/// Rules active at the top level of the file.
fn push_scanning_rules(
    program: &mut Program,
    scanning: StateId,
    struct_body: StateId,
    ctor_body: StateId,
    extraction: &Extraction,
) -> Result<(), RewriteError> {
    // The record annotation marker opens the migrated macro block.
    program.push_rule(
        scanning,
        Rule::rewrite(RECORD_MARKER, "magic_dom_struct! {")?.with_transition(struct_body),
    );

    // The old constructor signature, anchored to each extracted record's
    // name: a `new_inherited` on an unannotated type must not drag the
    // engine into the constructor states, because only an extracted
    // record's struct literal can lead back out of them. The no-argument
    // shape must precede the general one so the latter's span does not
    // leave a dangling comma behind.
    for record in &extraction.records {
        program.push_rule(
            scanning,
            Rule::rewrite(
                &format!("fn new_inherited() -> {} {{", record.name),
                "fn new_inherited(&mut self) {",
            )?
            .accumulating("fn new_inherited(", "{")?
            .with_transition(ctor_body),
        );
        program.push_rule(
            scanning,
            Rule::rewrite(
                &format!("fn new_inherited($$$ARGS) -> {} {{", record.name),
                "fn new_inherited(&mut self, $ARGS) {",
            )?
            .accumulating("fn new_inherited(", "{")?
            .with_transition(ctor_body),
        );
    }

    // Allocation call sites; ordered before the accessor rules so an
    // accumulated call is claimed by the cascade, not nibbled at.
    for rule in ctor::rules()? {
        program.push_rule(scanning, rule);
    }

    // Per-field accessor rules, in declaration order. They cascade: each
    // rewrites its own occurrences and lets the rest of the table run.
    for record in &extraction.records {
        for field in &record.fields {
            for template in kinds::accessor_templates(field) {
                let pattern = if template.guarded {
                    LinePattern::compile(&template.pattern)?.with_guard(Guard::NotMigratedRead)
                } else {
                    LinePattern::compile(&template.pattern)?
                };
                program.push_rule(
                    scanning,
                    Rule::rewrite_pattern(pattern, &template.replacement, Flow::TryRemaining)?,
                );
            }
        }
    }
    Ok(())
}

/// Rules active inside an annotated record's declaration block.
fn push_struct_body_rules(
    program: &mut Program,
    struct_body: StateId,
    scanning: StateId,
    extraction: &Extraction,
) -> Result<(), RewriteError> {
    for record in &extraction.records {
        for field in &record.fields {
            match kinds::declaration_rewrite(field) {
                DeclRewrite::Keep => {}
                DeclRewrite::Replace(migrated) => {
                    program.push_rule(
                        struct_body,
                        Rule::rewrite(
                            &format!("{}: {}", field.name, field.declared_type),
                            &format!("{}: {}", field.name, migrated),
                        )?,
                    );
                }
                DeclRewrite::Remove => {
                    program.push_rule(
                        struct_body,
                        Rule::suppress(&format!("{}: {}", field.name, field.declared_type))?,
                    );
                }
            }
        }
    }
    // Close the record body and the surrounding macro block.
    program.push_rule(
        struct_body,
        Rule::rewrite("}", "    }\n}")?.raw().with_transition(scanning),
    );
    Ok(())
}

/// Rules active inside the old constructor and its struct literal.
fn push_ctor_rules(
    program: &mut Program,
    ctor_body: StateId,
    ctor_literal: StateId,
    ctor_tail: StateId,
    scanning: StateId,
    extraction: &Extraction,
) -> Result<(), RewriteError> {
    // The literal's opening line carries the record name; dropping it
    // turns the literal's entries into plain statements.
    for record in &extraction.records {
        program.push_rule(
            ctor_body,
            Rule::suppress(&format!("{} {{", record.name))?.with_transition(ctor_literal),
        );
    }
    for record in &extraction.records {
        push_initialiser_rules(program, ctor_literal, record)?;
    }
    program.push_rule(
        ctor_literal,
        Rule::suppress("}")?.with_transition(ctor_tail),
    );
    program.push_rule(
        ctor_tail,
        Rule::pass_through("}")?.with_transition(scanning),
    );
    Ok(())
}

/// Instantiates one record's initialiser templates.
fn push_initialiser_rules(
    program: &mut Program,
    ctor_literal: StateId,
    record: &RecordDecl,
) -> Result<(), RewriteError> {
    for field in &record.fields {
        for template in kinds::initialiser_templates(field) {
            let rule = match template {
                InitTemplate::Rewrite {
                    pattern,
                    replacement,
                } => Rule::rewrite(&pattern, &replacement)?,
                InitTemplate::Drop { pattern } => Rule::suppress(&pattern)?,
            };
            program.push_rule(ctor_literal, rule);
        }
    }
    Ok(())
}
