//! Typed constructors for synthesizing checked trees without a source file.
//! Result types are derived the same way the checker assigns them.

use super::{
    BinaryOperatorClass, BinaryOperatorKind, Block, Crate, Expression, ExpressionKind,
    FieldDefinition, FieldInitializer, FunctionDefinition, Item, ItemKind, Local, Parameter,
    Pattern, PatternKind, Statement, StatementKind, StructDefinition, UnaryOperatorKind,
};
use crate::{
    frontend::intern::Symbol,
    middle::ty::{Type, TypeKind},
};

pub fn krate(items: impl IntoIterator<Item = Item>) -> Crate {
    Crate {
        items: items.into_iter().collect(),
    }
}

pub fn function(
    name: &str,
    parameters: impl IntoIterator<Item = (Pattern, Type)>,
    return_type: Type,
    body: Block,
) -> Item {
    let parameters = parameters
        .into_iter()
        .map(|(pattern, ty)| Parameter { pattern, ty })
        .collect::<Vec<_>>();

    Item {
        name: Symbol::new(name),
        ty: Type::function(parameters.iter().map(|p| p.ty.clone()), return_type.clone()),
        kind: ItemKind::FunctionDefinition(Box::new(FunctionDefinition {
            parameters,
            return_type,
            body,
        })),
    }
}

pub fn struct_definition(
    name: &str,
    fields: impl IntoIterator<Item = (&'static str, Type)>,
) -> Item {
    Item {
        name: Symbol::new(name),
        ty: Type::ok(),
        kind: ItemKind::StructDefinition(StructDefinition {
            fields: fields
                .into_iter()
                .map(|(name, ty)| FieldDefinition {
                    name: Symbol::new(name),
                    ty,
                })
                .collect(),
        }),
    }
}

/* Patterns */

pub fn bind(name: &str, ty: Type) -> Pattern {
    binding(name, ty, false, false)
}

pub fn bind_mut(name: &str, ty: Type) -> Pattern {
    binding(name, ty, true, false)
}

pub fn bind_ref(name: &str, ty: Type) -> Pattern {
    binding(name, ty, false, true)
}

fn binding(name: &str, ty: Type, is_mutable: bool, is_ref: bool) -> Pattern {
    Pattern {
        kind: PatternKind::Binding {
            name: Symbol::new(name),
            is_mutable,
            is_ref,
        },
        ty,
    }
}

pub fn wildcard(ty: Type) -> Pattern {
    Pattern {
        kind: PatternKind::Wildcard,
        ty,
    }
}

/* Statements */

pub fn let_statement(pattern: Pattern, initializer: Option<Expression>) -> Statement {
    Statement {
        kind: StatementKind::Let(Box::new(Local {
            pattern,
            ty: None,
            initializer: initializer.map(Box::new),
        })),
        ty: Type::unit(),
    }
}

/// `let mut <name> = <initializer>;` with the binding typed by the initializer
pub fn let_mut(name: &str, initializer: Expression) -> Statement {
    let pattern = bind_mut(name, initializer.ty.clone());
    let_statement(pattern, Some(initializer))
}

pub fn let_immutable(name: &str, initializer: Expression) -> Statement {
    let pattern = bind(name, initializer.ty.clone());
    let_statement(pattern, Some(initializer))
}

pub fn return_statement(expression: Option<Expression>) -> Statement {
    Statement {
        kind: StatementKind::Return(expression.map(Box::new)),
        ty: Type::div(),
    }
}

pub fn expression_statement(expression: Expression) -> Statement {
    let ty = if expression.ty.is_div() {
        Type::div()
    } else {
        Type::unit()
    };

    Statement {
        kind: StatementKind::Expression(Box::new(expression)),
        ty,
    }
}

/* Expressions */

fn expression(kind: ExpressionKind, ty: Type) -> Expression {
    Expression { kind, ty }
}

pub fn unit() -> Expression {
    expression(ExpressionKind::Unit, Type::unit())
}

pub fn boolean(value: bool) -> Expression {
    let kind = if value {
        ExpressionKind::True
    } else {
        ExpressionKind::False
    };

    expression(kind, Type::bool())
}

pub fn i32(value: i32) -> Expression {
    expression(ExpressionKind::I32(value), Type::i32())
}

pub fn u8(value: u8) -> Expression {
    expression(ExpressionKind::U8(value), Type::u8())
}

pub fn str(value: &str) -> Expression {
    expression(ExpressionKind::Str(value.to_owned()), Type::str())
}

pub fn id(name: &str, ty: Type) -> Expression {
    expression(ExpressionKind::Identifier(Symbol::new(name)), ty)
}

pub fn call(target: &str, arguments: impl IntoIterator<Item = Expression>, ty: Type) -> Expression {
    expression(
        ExpressionKind::FunctionCall {
            target: Symbol::new(target),
            arguments: arguments.into_iter().collect(),
        },
        ty,
    )
}

pub fn struct_literal(
    name: &str,
    fields: impl IntoIterator<Item = (&'static str, Expression)>,
) -> Expression {
    let name = Symbol::new(name);

    expression(
        ExpressionKind::Struct {
            name,
            fields: fields
                .into_iter()
                .map(|(field, expression)| FieldInitializer {
                    name: Symbol::new(field),
                    expression,
                })
                .collect(),
        },
        Type::new(TypeKind::Id(name)),
    )
}

pub fn unary(operator: UnaryOperatorKind, operand: Expression) -> Expression {
    let ty = match operator {
        UnaryOperatorKind::Not | UnaryOperatorKind::Negate => operand.ty.clone(),
        UnaryOperatorKind::Deref => match &*operand.ty {
            TypeKind::Ref(inner) | TypeKind::Box(inner) => match &**inner {
                TypeKind::Mut(inner) => inner.clone(),
                _ => inner.clone(),
            },
            _ => Type::error(),
        },
        UnaryOperatorKind::AddressOf => Type::reference(operand.ty.clone()),
    };

    expression(
        ExpressionKind::Unary {
            operator,
            is_mutable: false,
            operand: Box::new(operand),
        },
        ty,
    )
}

/// `&mut <operand>`
pub fn address_of_mut(operand: Expression) -> Expression {
    let ty = Type::mutable_reference(operand.ty.clone());

    expression(
        ExpressionKind::Unary {
            operator: UnaryOperatorKind::AddressOf,
            is_mutable: true,
            operand: Box::new(operand),
        },
        ty,
    )
}

pub fn binary(lhs: Expression, operator: BinaryOperatorKind, rhs: Expression) -> Expression {
    let ty = match operator.class() {
        BinaryOperatorClass::Arithmetic => lhs.ty.clone(),
        BinaryOperatorClass::Assignment | BinaryOperatorClass::CompoundAssignment(_) => {
            Type::unit()
        }
        BinaryOperatorClass::Logical | BinaryOperatorClass::Relational => Type::bool(),
    };

    expression(
        ExpressionKind::Binary {
            lhs: Box::new(lhs),
            operator,
            rhs: Box::new(rhs),
        },
        ty,
    )
}

pub fn if_else(
    condition: Expression,
    positive: Expression,
    negative: Option<Expression>,
) -> Expression {
    let ty = match &negative {
        Some(negative) if positive.ty.is_div() => negative.ty.clone(),
        Some(_) => positive.ty.clone(),
        None => Type::unit(),
    };

    expression(
        ExpressionKind::If {
            condition: Box::new(condition),
            positive: Box::new(positive),
            negative: negative.map(Box::new),
        },
        ty,
    )
}

pub fn while_loop(condition: Expression, body: Expression) -> Expression {
    expression(
        ExpressionKind::While {
            condition: Box::new(condition),
            body: Box::new(body),
        },
        Type::unit(),
    )
}

pub fn infinite_loop(body: Expression) -> Expression {
    expression(ExpressionKind::Loop(Box::new(body)), Type::div())
}

pub fn block(
    statements: impl IntoIterator<Item = Statement>,
    trailing: Option<Expression>,
) -> Block {
    let statements = statements.into_iter().collect::<Vec<_>>();

    let ty = match &trailing {
        Some(trailing) => trailing.ty.clone(),
        // a block whose statements always diverge never completes
        None if statements.iter().any(|s| s.ty.is_div()) => Type::div(),
        None => Type::unit(),
    };

    Block {
        statements,
        expression: trailing.map(Box::new),
        ty,
    }
}

pub fn block_expression(block: Block) -> Expression {
    let ty = block.ty.clone();
    expression(ExpressionKind::Block(Box::new(block)), ty)
}
