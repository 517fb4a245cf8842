use thiserror::Error;

use crate::numbers::arithmeticerror::ArithmeticError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),

    #[error("invalid element: {0}")]
    InvalidElement(String),

    #[error("invalid sequence: {0}")]
    InvalidSequence(String),

    #[error("invalid curve: {0}")]
    InvalidCurve(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("closure did not reach a fixed point within {iterations} iterations")]
    ClosureDidNotConverge { iterations: usize }
}
