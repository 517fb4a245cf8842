use thiserror::Error;

/// Failures of the exact rational kernel.
///
/// Indeterminate forms are always reported, never folded into a sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivideByZero,

    #[error("undetermined result for {operation}")]
    UndeterminedResult { operation: &'static str },

    #[error("{operation} is only defined for finite values")]
    NotFinite { operation: &'static str },

    #[error("{0} has no exact decimal representation")]
    NotRepresentable(String),

    #[error("cannot parse rational from '{0}'")]
    Parse(String)
}

impl ArithmeticError {
    pub fn undetermined(operation: &'static str) -> ArithmeticError {
        ArithmeticError::UndeterminedResult { operation }
    }

    pub fn not_finite(operation: &'static str) -> ArithmeticError {
        ArithmeticError::NotFinite { operation }
    }
}
