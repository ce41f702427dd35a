//! Rewrite rules: a pattern, a replacement template, and control flow.
//!
//! Rules are the unit the engine executes. They are produced statically
//! (the constructor rule set, the struct-declaration rewrite) or
//! dynamically (one batch per extracted field descriptor). Rules are
//! ordered: within an engine state the first matching rule decides the
//! line's fate.

use crate::engine::StateId;
use crate::error::RewriteError;
use crate::metavariables::{extract_metavar_name, is_valid_metavar_start_char};
use crate::pattern::{LineMatch, LinePattern};

/// What happens to a line once a rule matches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Write the (possibly rewritten) line to the output. A rule with no
    /// template emits the line unchanged.
    Emit,
    /// Drop the line from the output.
    Suppress,
}

/// Whether later rules in the state still run after this rule matches.
///
/// `Stop` is the first-match-wins policy; `TryRemaining` lets several
/// rules each rewrite their own occurrences on one line, mirroring a
/// branch-on-last-substitution cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// No further rules are attempted for this line.
    Stop,
    /// The remaining rules are attempted against the rewritten line.
    TryRemaining,
}

/// How much input a rule consumes.
#[derive(Debug, Clone)]
pub enum RuleSpan {
    /// The rule matches one line.
    Single,
    /// The rule matches a logical line accumulated across physical lines.
    ///
    /// When `trigger` matches a line that `until` does not, subsequent
    /// lines are buffered (joined with a single space, continuation
    /// indentation collapsed) until `until` matches. Reaching the end of
    /// the input first is a fatal unterminated-construct error.
    Accumulate {
        /// Pattern that opens the multi-line construct.
        trigger: LinePattern,
        /// Pattern that terminates accumulation.
        until: LinePattern,
    },
}

/// A replacement template with `$NAME` capture references.
#[derive(Debug, Clone)]
pub struct Template {
    parts: Vec<TemplatePart>,
}

#[derive(Debug, Clone)]
enum TemplatePart {
    Literal(String),
    Var(String),
}

impl Template {
    /// Compiles a replacement template.
    ///
    /// # Errors
    ///
    /// Returns an error if a `$` is not followed by a valid metavariable
    /// name.
    pub fn compile(source: &str) -> Result<Self, RewriteError> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((_, c)) = chars.next() {
            if c != '$' {
                literal.push(c);
                continue;
            }
            if !chars
                .peek()
                .is_some_and(|&(_, next)| is_valid_metavar_start_char(next))
            {
                return Err(RewriteError::invalid_replacement(format!(
                    "template {source:?} has a `$` without a metavariable name"
                )));
            }
            let name = extract_metavar_name(&mut chars);
            if !literal.is_empty() {
                parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
            }
            parts.push(TemplatePart::Var(name));
        }
        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }

        Ok(Self { parts })
    }

    /// Returns the metavariable names the template references.
    #[must_use]
    pub fn variables(&self) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                TemplatePart::Var(name) => Some(name.as_str()),
                TemplatePart::Literal(_) => None,
            })
            .collect()
    }

    /// Renders the template with the captures of one match.
    ///
    /// Rule construction validates that every referenced metavariable is
    /// bound by the pattern, so an unbound capture renders empty rather
    /// than failing.
    #[must_use]
    pub fn render(&self, found: &LineMatch) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Var(name) => out.push_str(found.capture(name).unwrap_or_default()),
            }
        }
        out
    }
}

/// One ordered rewrite rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: LinePattern,
    template: Option<Template>,
    action: Action,
    flow: Flow,
    transition: Option<StateId>,
    span: RuleSpan,
    raw: bool,
}

impl Rule {
    /// Creates a rule that rewrites matches and stops rule evaluation.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern or template fails to compile, or
    /// if the template references a metavariable the pattern does not
    /// bind.
    pub fn rewrite(pattern: &str, template: &str) -> Result<Self, RewriteError> {
        Self::build(LinePattern::compile(pattern)?, Some(template), Flow::Stop)
    }

    /// Creates a rewrite rule that lets the remaining rules run too.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Rule::rewrite`].
    pub fn rewrite_continue(pattern: &str, template: &str) -> Result<Self, RewriteError> {
        Self::build(
            LinePattern::compile(pattern)?,
            Some(template),
            Flow::TryRemaining,
        )
    }

    /// Creates a rewrite rule from an already-compiled (possibly guarded)
    /// pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to compile or references an
    /// unbound metavariable.
    pub fn rewrite_pattern(
        pattern: LinePattern,
        template: &str,
        flow: Flow,
    ) -> Result<Self, RewriteError> {
        Self::build(pattern, Some(template), flow)
    }

    /// Creates a rule that drops matching lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern fails to compile.
    pub fn suppress(pattern: &str) -> Result<Self, RewriteError> {
        let mut rule = Self::build(LinePattern::compile(pattern)?, None, Flow::Stop)?;
        rule.action = Action::Suppress;
        Ok(rule)
    }

    /// Creates a rule that forwards matching lines unchanged.
    ///
    /// Useful for lines whose only significance is a state transition.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern fails to compile.
    pub fn pass_through(pattern: &str) -> Result<Self, RewriteError> {
        Self::build(LinePattern::compile(pattern)?, None, Flow::Stop)
    }

    fn build(
        pattern: LinePattern,
        template: Option<&str>,
        flow: Flow,
    ) -> Result<Self, RewriteError> {
        let template = match template {
            Some(source) => {
                let compiled = Template::compile(source)?;
                let bound = pattern.metavariables();
                for var in compiled.variables() {
                    if !bound.contains(&var) {
                        return Err(RewriteError::invalid_replacement(format!(
                            "template references undefined metavariable: ${var}"
                        )));
                    }
                }
                Some(compiled)
            }
            None => None,
        };
        Ok(Self {
            pattern,
            template,
            action: Action::Emit,
            flow,
            transition: None,
            span: RuleSpan::Single,
            raw: false,
        })
    }

    /// Sets the state the engine enters after this rule applies.
    #[must_use]
    pub fn with_transition(mut self, state: StateId) -> Self {
        self.transition = Some(state);
        self
    }

    /// Makes the rule consume a multi-line construct.
    ///
    /// # Errors
    ///
    /// Returns an error if either pattern fails to compile.
    pub fn accumulating(mut self, trigger: &str, until: &str) -> Result<Self, RewriteError> {
        self.span = RuleSpan::Accumulate {
            trigger: LinePattern::compile(trigger)?,
            until: LinePattern::compile(until)?,
        };
        Ok(self)
    }

    /// Emits the rendered template verbatim, bypassing the state's
    /// indentation adjustment and multi-line re-indentation.
    #[must_use]
    pub fn raw(mut self) -> Self {
        self.raw = true;
        self
    }

    /// Returns the rule's pattern.
    #[must_use]
    pub fn pattern(&self) -> &LinePattern {
        &self.pattern
    }

    pub(crate) fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    pub(crate) const fn action(&self) -> Action {
        self.action
    }

    pub(crate) const fn flow(&self) -> Flow {
        self.flow
    }

    pub(crate) const fn transition(&self) -> Option<StateId> {
        self.transition
    }

    pub(crate) const fn span(&self) -> &RuleSpan {
        &self.span
    }

    pub(crate) const fn is_raw(&self) -> bool {
        self.raw
    }
}
