//! Error types for the migration engine.
//!
//! This module provides structured error types for pattern compilation,
//! declaration extraction, and rule-engine execution. Unknown field shapes
//! are deliberately *not* errors: they degrade to pass-through and surface
//! as review flags instead.

use thiserror::Error;

/// Errors from migration operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RewriteError {
    /// A multi-line construct was still open when the input ended.
    ///
    /// This is fatal for the file being processed: no output may be
    /// committed, and the original file must be left untouched.
    #[error("unterminated {construct} starting at line {line}")]
    UnterminatedConstruct {
        /// Human-readable name of the construct (declaration block, call
        /// expression).
        construct: String,
        /// One-based line where the construct opened.
        line: usize,
    },

    /// A pattern contains invalid metavariable syntax.
    #[error("invalid metavariable syntax: {message}")]
    InvalidMetavariable {
        /// Description of the metavariable error.
        message: String,
    },

    /// A pattern is structurally invalid.
    #[error("invalid pattern {pattern:?}: {message}")]
    InvalidPattern {
        /// The offending pattern source.
        pattern: String,
        /// Description of the compilation failure.
        message: String,
    },

    /// A replacement template references a metavariable the pattern does
    /// not bind.
    #[error("invalid replacement template: {message}")]
    InvalidReplacement {
        /// Description of the replacement error.
        message: String,
    },

    /// A record declaration could not be decomposed.
    #[error("malformed declaration at line {line}: {message}")]
    MalformedDeclaration {
        /// One-based line of the offending declaration.
        line: usize,
        /// Description of the parse failure.
        message: String,
    },
}

impl RewriteError {
    /// Creates an unterminated-construct error.
    #[must_use]
    pub fn unterminated(construct: impl Into<String>, line: usize) -> Self {
        Self::UnterminatedConstruct {
            construct: construct.into(),
            line,
        }
    }

    /// Creates an invalid-metavariable error.
    #[must_use]
    pub fn invalid_metavariable(message: impl Into<String>) -> Self {
        Self::InvalidMetavariable {
            message: message.into(),
        }
    }

    /// Creates an invalid-pattern error.
    #[must_use]
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid-replacement error.
    #[must_use]
    pub fn invalid_replacement(message: impl Into<String>) -> Self {
        Self::InvalidReplacement {
            message: message.into(),
        }
    }

    /// Creates a malformed-declaration error.
    #[must_use]
    pub fn malformed_declaration(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedDeclaration {
            line,
            message: message.into(),
        }
    }
}
