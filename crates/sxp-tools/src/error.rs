use thiserror::Error;

use sxp_vm::EvalErr;

// no Eq derive: hex::FromHexError is only PartialEq
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolsError {
    #[error("{0}")]
    Eval(#[from] EvalErr),

    #[error("{0}")]
    Hex(#[from] hex::FromHexError),

    #[error("syntax error at {position}: {message}")]
    Syntax { position: usize, message: String },
}

pub type Result<T> = std::result::Result<T, ToolsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_comparisons() {
        let truncated = ToolsError::Eval(EvalErr::TruncatedInput);
        assert_eq!(truncated.clone(), truncated);
        let odd = ToolsError::Hex(hex::FromHexError::OddLength);
        assert_eq!(odd, ToolsError::Hex(hex::FromHexError::OddLength));
        assert_ne!(odd, truncated);
    }
}
