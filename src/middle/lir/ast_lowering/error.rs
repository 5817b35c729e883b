//! Lowering errors.

use thiserror::Error;

use crate::frontend::intern::Symbol;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoweringError {
    /// A well-typed construct this backend has no lowering for
    #[error("unsupported construct `{construct}`")]
    Unsupported { construct: &'static str },

    #[error("`{builtin}` only accepts a string literal argument")]
    NonLiteralPrintArgument { builtin: Symbol },

    #[error("`{builtin}` takes {expected} argument(s) but {found} were supplied")]
    BuiltinArity {
        builtin: Symbol,
        expected: usize,
        found: usize,
    },

    #[error("identifier `{0}` is not bound in any enclosing scope")]
    UnresolvedIdentifier(Symbol),

    #[error("`{node}` node carries an erroneous type")]
    ErroneousNode { node: &'static str },

    #[error("string literal {found:?} does not match pooled constant {expected:?}")]
    ConstantPoolMismatch {
        expected: Option<String>,
        found: String,
    },

    #[error("failed to write lowered output")]
    Output(#[from] core::fmt::Error),
}

impl LoweringError {
    pub fn unsupported(construct: &'static str) -> Self {
        Self::Unsupported { construct }
    }

    /// Whether this error means the checker handed over a crate it should
    /// have rejected, as opposed to a valid program this backend can't lower
    pub fn is_upstream_defect(&self) -> bool {
        match self {
            LoweringError::Unsupported { .. }
            | LoweringError::NonLiteralPrintArgument { .. }
            | LoweringError::Output(_) => false,
            LoweringError::BuiltinArity { .. }
            | LoweringError::UnresolvedIdentifier(_)
            | LoweringError::ErroneousNode { .. }
            | LoweringError::ConstantPoolMismatch { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_node() {
        assert_eq!(
            LoweringError::unsupported("struct").to_string(),
            "unsupported construct `struct`"
        );
        assert_eq!(
            LoweringError::NonLiteralPrintArgument {
                builtin: Symbol::new("prints")
            }
            .to_string(),
            "`prints` only accepts a string literal argument"
        );
    }

    #[test]
    fn unsupported_constructs_are_not_defects() {
        assert!(!LoweringError::unsupported("match").is_upstream_defect());
        assert!(LoweringError::UnresolvedIdentifier(Symbol::new("x")).is_upstream_defect());
    }
}
