//! The fully checked syntax tree handed over by the type checker. Every
//! expression, statement and item carries its resolved [`Type`]; the lowering
//! passes only ever read it.

use strum::{EnumString, IntoStaticStr};

use super::intern::Symbol;
use crate::middle::ty::Type;

pub mod build;
pub mod visit;

/// The top level compilation unit
#[derive(Debug, Clone)]
pub struct Crate {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone)]
pub struct Item {
    pub name: Symbol,
    /// The function type of a function, `Ok` for type definitions and
    /// `Error` if the checker rejected the item
    pub ty: Type,
    pub kind: ItemKind,
}

#[derive(Debug, Clone)]
pub enum ItemKind {
    FunctionDefinition(Box<FunctionDefinition>),
    EnumDefinition(EnumDefinition),
    StructDefinition(StructDefinition),
}

impl ItemKind {
    pub fn node_name(&self) -> &'static str {
        match self {
            ItemKind::FunctionDefinition(_) => "fn-def",
            ItemKind::EnumDefinition(_) => "enum-def",
            ItemKind::StructDefinition(_) => "struct-def",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    pub parameters: Vec<Parameter>,
    pub return_type: Type,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub pattern: Pattern,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct EnumDefinition {
    pub constructors: Vec<ConstructorDefinition>,
}

#[derive(Debug, Clone)]
pub struct ConstructorDefinition {
    pub name: Symbol,
    pub parameters: Vec<Type>,
}

#[derive(Debug, Clone)]
pub struct StructDefinition {
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: Symbol,
    pub ty: Type,
}

/// `{ stmt; stmt; expr }`
#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Statement>,
    /// Trailing expression which becomes the value of the block
    pub expression: Option<Box<Expression>>,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub enum StatementKind {
    Let(Box<Local>),
    Return(Option<Box<Expression>>),
    // Expression terminated with a semicolon
    Expression(Box<Expression>),
}

/// `let <pattern>: <ty> = <initializer>;`
#[derive(Debug, Clone)]
pub struct Local {
    pub pattern: Pattern,
    /// Explicit annotation, if one was written
    pub ty: Option<Type>,
    pub initializer: Option<Box<Expression>>,
}

#[derive(Debug, Clone)]
pub struct Pattern {
    pub kind: PatternKind,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub enum PatternKind {
    Wildcard,
    Unit,
    True,
    False,
    Str(String),
    U8(u8),
    I32(i32),
    /// `&pat`
    Reference(Box<Pattern>),
    Array(Vec<Pattern>),
    Enum {
        enum_name: Symbol,
        constructor: Symbol,
        parameters: Vec<Pattern>,
    },
    Struct {
        name: Symbol,
        fields: Vec<FieldPattern>,
    },
    /// `x`, `mut x`, `ref x`, `ref mut x`
    Binding {
        name: Symbol,
        is_mutable: bool,
        is_ref: bool,
    },
}

impl PatternKind {
    pub fn node_name(&self) -> &'static str {
        match self {
            PatternKind::Wildcard => "pat-wild",
            PatternKind::Unit => "pat-unit",
            PatternKind::True => "pat-true",
            PatternKind::False => "pat-false",
            PatternKind::Str(_) => "pat-str",
            PatternKind::U8(_) | PatternKind::I32(_) => "pat-lit",
            PatternKind::Reference(_) => "pat-deref",
            PatternKind::Array(_) => "pat-arr",
            PatternKind::Enum { .. } => "pat-enum",
            PatternKind::Struct { .. } => "pat-struct",
            PatternKind::Binding {
                is_mutable, is_ref, ..
            } => match (is_mutable, is_ref) {
                (true, true) => "pat-ref-mut-id",
                (true, false) => "pat-mut-id",
                (false, true) => "pat-ref-id",
                (false, false) => "pat-id",
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldPattern {
    pub name: Symbol,
    pub pattern: Pattern,
}

#[derive(Debug, Clone)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub enum ExpressionKind {
    Unit,
    True,
    False,
    I32(i32),
    U8(u8),
    Str(String),
    Identifier(Symbol),
    Enum {
        enum_name: Symbol,
        constructor: Symbol,
        arguments: Vec<Expression>,
    },
    Struct {
        name: Symbol,
        fields: Vec<FieldInitializer>,
    },
    Array(Vec<Expression>),
    /// `expr.field`
    Lookup {
        expression: Box<Expression>,
        field: Symbol,
    },
    /// `expr[index]`
    Index {
        expression: Box<Expression>,
        index: Box<Expression>,
    },
    FunctionCall {
        target: Symbol,
        arguments: Vec<Expression>,
    },
    /// `Box::new(expr)`
    BoxNew(Box<Expression>),
    Match {
        scrutinee: Box<Expression>,
        arms: Vec<MatchArm>,
    },
    If {
        condition: Box<Expression>,
        positive: Box<Expression>,
        /// must be a block expression or an if expression
        negative: Option<Box<Expression>>,
    },
    While {
        condition: Box<Expression>,
        body: Box<Expression>,
    },
    Loop(Box<Expression>),
    Block(Box<Block>),
    Unary {
        operator: UnaryOperatorKind,
        /// `&mut` rather than `&`
        is_mutable: bool,
        operand: Box<Expression>,
    },
    Binary {
        lhs: Box<Expression>,
        operator: BinaryOperatorKind,
        rhs: Box<Expression>,
    },
}

impl ExpressionKind {
    /// The name of the node as it appears in the S-expression dump
    pub fn node_name(&self) -> &'static str {
        match self {
            ExpressionKind::Unit => "unit",
            ExpressionKind::True => "true",
            ExpressionKind::False => "false",
            ExpressionKind::I32(_) => "lit-dec",
            ExpressionKind::U8(_) => "lit-char",
            ExpressionKind::Str(_) => "lit-str",
            ExpressionKind::Identifier(_) => "id",
            ExpressionKind::Enum { .. } => "enum",
            ExpressionKind::Struct { .. } => "struct",
            ExpressionKind::Array(_) => "arr",
            ExpressionKind::Lookup { .. } => "field-lookup",
            ExpressionKind::Index { .. } => "arr-index",
            ExpressionKind::FunctionCall { .. } => "fn-call",
            ExpressionKind::BoxNew(_) => "box-new",
            ExpressionKind::Match { .. } => "match",
            ExpressionKind::If { .. } => "if",
            ExpressionKind::While { .. } => "while",
            ExpressionKind::Loop(_) => "loop",
            ExpressionKind::Block(_) => "block",
            ExpressionKind::Unary {
                operator,
                is_mutable,
                ..
            } => operator.node_name(*is_mutable),
            ExpressionKind::Binary { operator, .. } => operator.node_name(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldInitializer {
    pub name: Symbol,
    pub expression: Expression,
}

#[derive(Debug, Clone)]
pub struct MatchArm {
    pub patterns: Vec<Pattern>,
    pub body: Expression,
}

/// Operators are resolved from their spelling once, by the parser. An
/// unrecognized spelling is a parse error and never reaches lowering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr)]
pub enum UnaryOperatorKind {
    #[strum(serialize = "!")]
    Not,
    #[strum(serialize = "-")]
    Negate,
    #[strum(serialize = "*")]
    Deref,
    #[strum(serialize = "&")]
    AddressOf,
}

impl UnaryOperatorKind {
    pub fn spelling(self) -> &'static str {
        self.into()
    }

    pub fn node_name(self, is_mutable: bool) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Negate => "neg",
            Self::Deref => "deref",
            Self::AddressOf if is_mutable => "addr-of-mut",
            Self::AddressOf => "addr-of",
        }
    }
}

impl core::fmt::Display for UnaryOperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.spelling())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr)]
pub enum BinaryOperatorKind {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "%")]
    Remainder,
    #[strum(serialize = "=")]
    Assign,
    #[strum(serialize = "+=")]
    AddAssign,
    #[strum(serialize = "-=")]
    SubtractAssign,
    #[strum(serialize = "*=")]
    MultiplyAssign,
    #[strum(serialize = "/=")]
    DivideAssign,
    #[strum(serialize = "%=")]
    RemainderAssign,
    #[strum(serialize = "&&")]
    LogicalAnd,
    #[strum(serialize = "||")]
    LogicalOr,
    #[strum(serialize = "==")]
    Equals,
    #[strum(serialize = "!=")]
    NotEquals,
    #[strum(serialize = "<")]
    LessThan,
    #[strum(serialize = "<=")]
    LessThanOrEqualTo,
    #[strum(serialize = ">")]
    GreaterThan,
    #[strum(serialize = ">=")]
    GreaterThanOrEqualTo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperatorClass {
    /// `=`
    Assignment,
    /// `+= -= *= /= %=`, carrying the arithmetic operator they apply
    CompoundAssignment(BinaryOperatorKind),
    /// `+ - * / %`
    Arithmetic,
    /// `&& ||`
    Logical,
    /// `== != < <= > >=`
    Relational,
}

impl BinaryOperatorKind {
    pub fn class(self) -> BinaryOperatorClass {
        match self {
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Remainder => {
                BinaryOperatorClass::Arithmetic
            }
            Self::Assign => BinaryOperatorClass::Assignment,
            Self::AddAssign => BinaryOperatorClass::CompoundAssignment(Self::Add),
            Self::SubtractAssign => BinaryOperatorClass::CompoundAssignment(Self::Subtract),
            Self::MultiplyAssign => BinaryOperatorClass::CompoundAssignment(Self::Multiply),
            Self::DivideAssign => BinaryOperatorClass::CompoundAssignment(Self::Divide),
            Self::RemainderAssign => BinaryOperatorClass::CompoundAssignment(Self::Remainder),
            Self::LogicalAnd | Self::LogicalOr => BinaryOperatorClass::Logical,
            Self::Equals
            | Self::NotEquals
            | Self::LessThan
            | Self::LessThanOrEqualTo
            | Self::GreaterThan
            | Self::GreaterThanOrEqualTo => BinaryOperatorClass::Relational,
        }
    }

    pub fn spelling(self) -> &'static str {
        self.into()
    }

    pub fn node_name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "sub",
            Self::Multiply => "mul",
            Self::Divide => "div",
            Self::Remainder => "rem",
            Self::Assign => "assign",
            Self::AddAssign => "assign-add",
            Self::SubtractAssign => "assign-sub",
            Self::MultiplyAssign => "assign-mul",
            Self::DivideAssign => "assign-div",
            Self::RemainderAssign => "assign-rem",
            Self::LogicalAnd => "and",
            Self::LogicalOr => "or",
            Self::Equals => "eq",
            Self::NotEquals => "neq",
            Self::LessThan => "lt",
            Self::LessThanOrEqualTo => "leq",
            Self::GreaterThan => "gt",
            Self::GreaterThanOrEqualTo => "geq",
        }
    }
}

impl core::fmt::Display for BinaryOperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.spelling())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_parse_from_their_spelling() {
        assert_eq!("+=".parse(), Ok(BinaryOperatorKind::AddAssign));
        assert_eq!("<=".parse(), Ok(BinaryOperatorKind::LessThanOrEqualTo));
        assert_eq!("&".parse(), Ok(UnaryOperatorKind::AddressOf));
        assert!("<<".parse::<BinaryOperatorKind>().is_err());
        assert!("~".parse::<UnaryOperatorKind>().is_err());
    }

    #[test]
    fn every_spelling_round_trips() {
        for spelling in [
            "+", "-", "*", "/", "%", "=", "+=", "-=", "*=", "/=", "%=", "&&", "||", "==", "!=",
            "<", "<=", ">", ">=",
        ] {
            let kind: BinaryOperatorKind = spelling.parse().unwrap();
            assert_eq!(kind.spelling(), spelling);
        }
    }

    #[test]
    fn node_names_follow_the_dump_format() {
        assert_eq!(BinaryOperatorKind::RemainderAssign.node_name(), "assign-rem");
        assert_eq!(UnaryOperatorKind::AddressOf.node_name(true), "addr-of-mut");
        assert_eq!(UnaryOperatorKind::Negate.node_name(false), "neg");
    }

    #[test]
    fn compound_assignment_carries_its_arithmetic_operator() {
        assert_eq!(
            BinaryOperatorKind::MultiplyAssign.class(),
            BinaryOperatorClass::CompoundAssignment(BinaryOperatorKind::Multiply)
        );
        assert_eq!(
            BinaryOperatorKind::NotEquals.class(),
            BinaryOperatorClass::Relational
        );
    }
}
