//! Error types for user shader parsing and size-expression evaluation.

use thiserror::Error;

/// Why a single pass (or size expression) was rejected.
///
/// Every variant aborts the current pass only; the caller decides whether
/// the rest of the shader file is still worth parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Too many HOOK/BIND directives, size-expression tokens or passes.
    #[error("{what} exceeds the limit of {limit}")]
    CapacityExceeded { what: &'static str, limit: usize },

    /// OFFSET/COMPONENTS did not carry the expected literals.
    #[error("malformed {directive} argument: '{line}'")]
    MalformedDirectiveArgument {
        directive: &'static str,
        line: String,
    },

    /// A WIDTH/HEIGHT/WHEN word matched none of the recognized forms.
    #[error("invalid size expression token '{0}'")]
    InvalidSizeExpressionToken(String),

    /// Header line whose keyword is not a known directive.
    #[error("unrecognized command '{0}'")]
    UnknownDirective(String),
}

/// Failure while evaluating an RPN size expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("variable {0} not found in RPN expression")]
    UnknownVariable(String),

    #[error("stack underflow in RPN expression")]
    StackUnderflow,

    #[error("illegal operation in RPN expression")]
    IllegalOperation,

    /// The stack did not hold exactly one value once all tokens ran.
    #[error("malformed stack after RPN expression ({0} values left)")]
    MalformedStack(usize),
}
