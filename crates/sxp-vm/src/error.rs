use thiserror::Error;

/// Every failure the engine can produce. All variants are recoverable at the
/// call boundary; nothing here aborts the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalErr {
    #[error("invalid encoding: {0}")]
    InvalidEncoding(&'static str),

    #[error("unexpected end of input")]
    TruncatedInput,

    #[error("wrong value kind: expected {0}")]
    WrongValueKind(&'static str),

    #[error("path into atom")]
    PathNotFound,

    #[error("unimplemented operator {0}")]
    UnknownOperator(String),

    #[error("{op} takes {expected} argument(s)")]
    ArityMismatch {
        op: &'static str,
        expected: &'static str,
    },

    #[error("operator must be a lone atom")]
    NotApplicable,

    #[error("cost exceeded")]
    CostExceeded,

    #[error("program raised: {0}")]
    Raise(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("shift too large")]
    ShiftTooLarge,

    #[error("invalid index")]
    InvalidIndex,

    #[error("atom heap limit exceeded")]
    OutOfMemory,

    #[error("too many pairs")]
    TooManyPairs,

    #[error("too many atoms")]
    TooManyAtoms,
}
