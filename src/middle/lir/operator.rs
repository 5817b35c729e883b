//! Maps source operators onto the instructions that implement them.

use strum::Display;

use crate::frontend::ast::{BinaryOperatorClass, BinaryOperatorKind, UnaryOperatorKind};

/// Two-operand integer instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    SDiv,
    SRem,
    Xor,
}

/// Signed integer comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum IntPredicate {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortCircuit {
    And,
    Or,
}

/// How a binary operator is lowered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryLowering {
    /// One instruction on both operands
    Arithmetic(Opcode),
    /// One signed compare producing an `i1`
    Compare(IntPredicate),
    /// Store the right side into the left place
    Assign,
    /// Load, compute, store back
    CompoundAssign(Opcode),
    /// Branches between the operands
    ShortCircuit(ShortCircuit),
}

/// How a unary operator is lowered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryLowering {
    /// `sub <ty> 0, <operand>`
    Negate,
    /// `xor <ty> <operand>, <all ones>`, which is `true` for booleans
    Invert,
    /// `load <ty>, ptr <operand>`
    Load,
    /// The address of the operand's place, no instruction
    Address { is_mutable: bool },
}

fn arithmetic_opcode(kind: BinaryOperatorKind) -> Opcode {
    match kind {
        BinaryOperatorKind::Add | BinaryOperatorKind::AddAssign => Opcode::Add,
        BinaryOperatorKind::Subtract | BinaryOperatorKind::SubtractAssign => Opcode::Sub,
        BinaryOperatorKind::Multiply | BinaryOperatorKind::MultiplyAssign => Opcode::Mul,
        BinaryOperatorKind::Divide | BinaryOperatorKind::DivideAssign => Opcode::SDiv,
        BinaryOperatorKind::Remainder | BinaryOperatorKind::RemainderAssign => Opcode::SRem,
        // `class()` only routes arithmetic kinds here
        _ => unreachable!("{kind} is not an arithmetic operator"),
    }
}

fn predicate(kind: BinaryOperatorKind) -> IntPredicate {
    match kind {
        BinaryOperatorKind::Equals => IntPredicate::Eq,
        BinaryOperatorKind::NotEquals => IntPredicate::Ne,
        BinaryOperatorKind::LessThan => IntPredicate::Slt,
        BinaryOperatorKind::LessThanOrEqualTo => IntPredicate::Sle,
        BinaryOperatorKind::GreaterThan => IntPredicate::Sgt,
        BinaryOperatorKind::GreaterThanOrEqualTo => IntPredicate::Sge,
        _ => unreachable!("{kind} is not a relational operator"),
    }
}

pub fn lower_binary_operator(kind: BinaryOperatorKind) -> BinaryLowering {
    match kind.class() {
        BinaryOperatorClass::Arithmetic => BinaryLowering::Arithmetic(arithmetic_opcode(kind)),
        BinaryOperatorClass::CompoundAssignment(operator) => {
            BinaryLowering::CompoundAssign(arithmetic_opcode(operator))
        }
        BinaryOperatorClass::Assignment => BinaryLowering::Assign,
        BinaryOperatorClass::Relational => BinaryLowering::Compare(predicate(kind)),
        BinaryOperatorClass::Logical => BinaryLowering::ShortCircuit(match kind {
            BinaryOperatorKind::LogicalAnd => ShortCircuit::And,
            _ => ShortCircuit::Or,
        }),
    }
}

pub fn lower_unary_operator(kind: UnaryOperatorKind, is_mutable: bool) -> UnaryLowering {
    match kind {
        UnaryOperatorKind::Not => UnaryLowering::Invert,
        UnaryOperatorKind::Negate => UnaryLowering::Negate,
        UnaryOperatorKind::Deref => UnaryLowering::Load,
        UnaryOperatorKind::AddressOf => UnaryLowering::Address { is_mutable },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_and_compound_share_opcodes() {
        assert_eq!(
            lower_binary_operator(BinaryOperatorKind::Divide),
            BinaryLowering::Arithmetic(Opcode::SDiv)
        );
        assert_eq!(
            lower_binary_operator(BinaryOperatorKind::DivideAssign),
            BinaryLowering::CompoundAssign(Opcode::SDiv)
        );
        assert_eq!(
            lower_binary_operator(BinaryOperatorKind::RemainderAssign),
            BinaryLowering::CompoundAssign(Opcode::SRem)
        );
    }

    #[test]
    fn comparisons_are_signed() {
        assert_eq!(
            lower_binary_operator(BinaryOperatorKind::LessThan),
            BinaryLowering::Compare(IntPredicate::Slt)
        );
        assert_eq!(
            lower_binary_operator(BinaryOperatorKind::GreaterThanOrEqualTo),
            BinaryLowering::Compare(IntPredicate::Sge)
        );
    }

    #[test]
    fn structural_operators_have_no_opcode() {
        assert_eq!(
            lower_binary_operator(BinaryOperatorKind::Assign),
            BinaryLowering::Assign
        );
        assert_eq!(
            lower_binary_operator(BinaryOperatorKind::LogicalOr),
            BinaryLowering::ShortCircuit(ShortCircuit::Or)
        );
        assert_eq!(
            lower_unary_operator(UnaryOperatorKind::AddressOf, true),
            UnaryLowering::Address { is_mutable: true }
        );
    }

    #[test]
    fn unary_spellings_depend_on_arity() {
        // `-` and `*` mean different things with one operand
        assert_eq!(
            lower_unary_operator("-".parse().unwrap(), false),
            UnaryLowering::Negate
        );
        assert_eq!(
            lower_unary_operator("*".parse().unwrap(), false),
            UnaryLowering::Load
        );
        assert_eq!(
            lower_binary_operator("*".parse().unwrap()),
            BinaryLowering::Arithmetic(Opcode::Mul)
        );
    }

    #[test]
    fn opcodes_print_lowercase() {
        assert_eq!(Opcode::SDiv.to_string(), "sdiv");
        assert_eq!(IntPredicate::Sle.to_string(), "sle");
    }
}
