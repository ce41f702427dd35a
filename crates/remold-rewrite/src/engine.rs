//! The line-oriented finite-state rule engine.
//!
//! The engine is the shared execution substrate for every pass: it walks
//! an input line sequence, tries the ordered rules of the active state
//! against each line, applies the first match (and, for cascading rules,
//! the remaining matches), and writes the result to the output. A rule
//! may demand multi-line lookahead, in which case physical lines are
//! accumulated into one logical line until a terminating pattern appears;
//! hitting the end of the input first is a fatal error for the file.
//!
//! The engine holds no state across inputs: a [`Program`] is immutable
//! while running, and every [`Engine::run`] call starts in the program's
//! first state.

use crate::error::RewriteError;
use crate::rule::{Action, Flow, Rule, RuleSpan};

/// Identifier of one engine state within a [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateId(usize);

/// One named control point in the line-stream automaton.
#[derive(Debug)]
struct State {
    name: &'static str,
    rules: Vec<Rule>,
    /// Indentation delta applied to lines emitted while this state is
    /// active. Positive values indent, negative values dedent by up to
    /// that many columns.
    indent: i32,
}

/// An ordered rule table organised into named states.
#[derive(Debug, Default)]
pub struct Program {
    states: Vec<State>,
}

impl Program {
    /// Creates an empty program.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a state. The first state added is the start state.
    pub fn add_state(&mut self, name: &'static str, indent: i32) -> StateId {
        self.states.push(State {
            name,
            rules: Vec::new(),
            indent,
        });
        StateId(self.states.len() - 1)
    }

    /// Appends a rule to a state's ordered rule list.
    pub fn push_rule(&mut self, state: StateId, rule: Rule) {
        self.states[state.0].rules.push(rule);
    }

    /// Returns the total number of rules across all states.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.states.iter().map(|state| state.rules.len()).sum()
    }
}

/// Executes a [`Program`] over an input text.
#[derive(Debug, Default)]
pub struct Engine;

impl Engine {
    /// Runs the program over `input` and returns the rewritten text.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::UnterminatedConstruct`] when a multi-line
    /// accumulation reaches the end of the input before its terminator,
    /// and [`RewriteError::InvalidPattern`] for a program with no states.
    pub fn run(program: &Program, input: &str) -> Result<String, RewriteError> {
        if program.states.is_empty() {
            return Err(RewriteError::invalid_pattern(
                "<program>",
                "program has no states",
            ));
        }
        let lines: Vec<&str> = input.lines().collect();
        let mut output = String::new();
        let mut state_id = StateId(0);
        let mut index = 0;

        while index < lines.len() {
            let state = &program.states[state_id.0];
            let line_number = index + 1;
            let (logical, consumed, original_block) =
                gather_logical_line(state, &lines, index, line_number)?;

            let outcome = apply_state_rules(state, &logical);
            match outcome.action {
                Action::Emit => {
                    if outcome.matched {
                        emit(&mut output, &outcome.text, state.indent, outcome.raw);
                    } else if let Some(block) = original_block {
                        // A construct was accumulated but no rule claimed
                        // it: forward the physical lines untouched.
                        for line in block {
                            emit(&mut output, line, state.indent, false);
                        }
                    } else {
                        emit(&mut output, &outcome.text, state.indent, false);
                    }
                }
                Action::Suppress => {}
            }
            if let Some(next) = outcome.transition {
                tracing::trace!(
                    from = state.name,
                    to = program.states[next.0].name,
                    line = line_number,
                    "state transition"
                );
                state_id = next;
            }
            index += consumed;
        }

        if !input.ends_with('\n') && output.ends_with('\n') {
            output.pop();
        }
        Ok(output)
    }
}

/// Result of running one state's rules over a logical line.
struct LineOutcome {
    text: String,
    matched: bool,
    action: Action,
    raw: bool,
    transition: Option<StateId>,
}

/// Tries the state's ordered rules against a logical line.
///
/// The first matching rule fixes the action, raw flag, and transition;
/// rules with [`Flow::TryRemaining`] let the rest of the table rewrite
/// their own occurrences on the already-rewritten text.
fn apply_state_rules(state: &State, logical: &str) -> LineOutcome {
    let mut outcome = LineOutcome {
        text: logical.to_owned(),
        matched: false,
        action: Action::Emit,
        raw: false,
        transition: None,
    };
    for rule in &state.rules {
        let Some(rewritten) = apply_rule(rule, &outcome.text) else {
            continue;
        };
        outcome.text = rewritten;
        if !outcome.matched {
            outcome.matched = true;
            outcome.action = rule.action();
            outcome.raw = rule.is_raw();
            outcome.transition = rule.transition();
        }
        if rule.flow() == Flow::Stop {
            break;
        }
    }
    outcome
}

/// Substitutes every occurrence of the rule's pattern in `line`.
///
/// Returns `None` when the pattern does not occur at all.
fn apply_rule(rule: &Rule, line: &str) -> Option<String> {
    let mut out = String::new();
    let mut pos = 0;
    let mut matched = false;
    while let Some(found) = rule.pattern().find_from(line, pos) {
        matched = true;
        let range = found.byte_range();
        out.push_str(&line[pos..range.start]);
        match rule.template() {
            Some(template) => out.push_str(&template.render(&found)),
            None => out.push_str(&line[range.clone()]),
        }
        if range.end == range.start {
            // Zero-width match; stop rather than loop forever.
            pos = range.start;
            break;
        }
        pos = range.end;
    }
    if !matched {
        return None;
    }
    out.push_str(&line[pos..]);
    Some(out)
}

/// Builds the logical line for the current position.
///
/// When an accumulating rule's trigger matches and its terminator is not
/// yet present, subsequent lines are joined (continuation indentation
/// collapsed to one space) until the terminator appears. The physical
/// lines are kept so an unclaimed construct can be forwarded unchanged.
fn gather_logical_line<'a>(
    state: &State,
    lines: &[&'a str],
    index: usize,
    line_number: usize,
) -> Result<(String, usize, Option<Vec<&'a str>>), RewriteError> {
    let first = lines[index];
    let accumulator = state.rules.iter().find_map(|rule| match rule.span() {
        RuleSpan::Accumulate { trigger, until } if trigger.find(first).is_some() => Some(until),
        _ => None,
    });
    let Some(until) = accumulator else {
        return Ok((first.to_owned(), 1, None));
    };
    if until.find(first).is_some() {
        return Ok((first.to_owned(), 1, None));
    }

    let mut logical = first.to_owned();
    let mut block = vec![first];
    let mut next = index + 1;
    loop {
        let Some(line) = lines.get(next) else {
            return Err(RewriteError::unterminated("call expression", line_number));
        };
        logical.push(' ');
        logical.push_str(line.trim_start());
        block.push(line);
        next += 1;
        if until.find(line).is_some() {
            break;
        }
    }
    Ok((logical, next - index, Some(block)))
}

/// Writes one emitted line (or multi-line replacement) to the output.
///
/// Continuation lines of a multi-line replacement inherit the first
/// line's indentation. Raw emissions bypass both adjustments.
fn emit(output: &mut String, text: &str, indent: i32, raw: bool) {
    if raw {
        output.push_str(text);
        output.push('\n');
        return;
    }
    let mut parts = text.split('\n');
    let first = parts.next().unwrap_or_default();
    let adjusted = adjust_indent(first, indent);
    let continuation_indent: String = adjusted
        .chars()
        .take_while(|c| *c == ' ')
        .collect();
    output.push_str(&adjusted);
    output.push('\n');
    for part in parts {
        if !part.is_empty() {
            output.push_str(&continuation_indent);
            output.push_str(part);
        }
        output.push('\n');
    }
}

/// Applies a state's indentation delta to one line.
fn adjust_indent(line: &str, indent: i32) -> String {
    if line.is_empty() || indent == 0 {
        return line.to_owned();
    }
    if indent > 0 {
        let mut out = " ".repeat(indent.unsigned_abs() as usize);
        out.push_str(line);
        return out;
    }
    let strip = indent.unsigned_abs() as usize;
    let available = line.len() - line.trim_start_matches(' ').len();
    line[available.min(strip)..].to_owned()
}
