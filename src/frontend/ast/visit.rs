//! Trait definition for an AST visitor which walks the tree in DFS order,
//! visiting children left to right in the same order lowering evaluates them

use super::{
    Block, Crate, Expression, ExpressionKind, FunctionDefinition, Item, ItemKind, Local,
    MatchArm, Parameter, Pattern, PatternKind, Statement, StatementKind,
};

pub trait Visitor<'ast>: Sized {
    fn visit_item(&mut self, item: &'ast Item) {
        walk_item(self, item)
    }

    fn visit_function_definition(&mut self, function: &'ast FunctionDefinition) {
        walk_function_definition(self, function)
    }

    fn visit_parameter(&mut self, parameter: &'ast Parameter) {
        walk_parameter(self, parameter)
    }

    fn visit_block(&mut self, block: &'ast Block) {
        walk_block(self, block)
    }

    fn visit_statement(&mut self, statement: &'ast Statement) {
        walk_statement(self, statement)
    }

    fn visit_local(&mut self, local: &'ast Local) {
        walk_local(self, local)
    }

    fn visit_pattern(&mut self, pattern: &'ast Pattern) {
        walk_pattern(self, pattern)
    }

    fn visit_expression(&mut self, expression: &'ast Expression) {
        walk_expression(self, expression)
    }

    fn visit_match_arm(&mut self, arm: &'ast MatchArm) {
        walk_match_arm(self, arm)
    }
}

pub fn walk_crate<'a>(visitor: &mut impl Visitor<'a>, krate: &'a Crate) {
    for item in &krate.items {
        visitor.visit_item(item);
    }
}

pub fn walk_item<'a>(visitor: &mut impl Visitor<'a>, item: &'a Item) {
    match &item.kind {
        ItemKind::FunctionDefinition(function) => {
            visitor.visit_function_definition(function);
        }
        // definitions carry types only, there is nothing to walk into
        ItemKind::EnumDefinition(_) | ItemKind::StructDefinition(_) => {}
    }
}

pub fn walk_function_definition<'a>(
    visitor: &mut impl Visitor<'a>,
    function: &'a FunctionDefinition,
) {
    for parameter in &function.parameters {
        visitor.visit_parameter(parameter);
    }

    visitor.visit_block(&function.body);
}

pub fn walk_parameter<'a>(visitor: &mut impl Visitor<'a>, parameter: &'a Parameter) {
    visitor.visit_pattern(&parameter.pattern);
}

pub fn walk_block<'a>(visitor: &mut impl Visitor<'a>, block: &'a Block) {
    for statement in &block.statements {
        visitor.visit_statement(statement);
    }

    if let Some(expression) = &block.expression {
        visitor.visit_expression(expression);
    }
}

pub fn walk_statement<'a>(visitor: &mut impl Visitor<'a>, statement: &'a Statement) {
    match &statement.kind {
        StatementKind::Let(local) => visitor.visit_local(local),
        StatementKind::Return(Some(expression)) | StatementKind::Expression(expression) => {
            visitor.visit_expression(expression)
        }
        StatementKind::Return(None) => {}
    }
}

pub fn walk_local<'a>(visitor: &mut impl Visitor<'a>, local: &'a Local) {
    visitor.visit_pattern(&local.pattern);

    if let Some(initializer) = &local.initializer {
        visitor.visit_expression(initializer);
    }
}

pub fn walk_pattern<'a>(visitor: &mut impl Visitor<'a>, pattern: &'a Pattern) {
    match &pattern.kind {
        PatternKind::Reference(inner) => visitor.visit_pattern(inner),
        PatternKind::Array(patterns) | PatternKind::Enum {
            parameters: patterns,
            ..
        } => {
            for pattern in patterns {
                visitor.visit_pattern(pattern);
            }
        }
        PatternKind::Struct { fields, .. } => {
            for field in fields {
                visitor.visit_pattern(&field.pattern);
            }
        }
        PatternKind::Wildcard
        | PatternKind::Unit
        | PatternKind::True
        | PatternKind::False
        | PatternKind::Str(_)
        | PatternKind::U8(_)
        | PatternKind::I32(_)
        | PatternKind::Binding { .. } => {}
    }
}

pub fn walk_expression<'a>(visitor: &mut impl Visitor<'a>, expression: &'a Expression) {
    match &expression.kind {
        ExpressionKind::Unit
        | ExpressionKind::True
        | ExpressionKind::False
        | ExpressionKind::I32(_)
        | ExpressionKind::U8(_)
        | ExpressionKind::Str(_)
        | ExpressionKind::Identifier(_) => {}
        ExpressionKind::Enum { arguments, .. }
        | ExpressionKind::Array(arguments)
        | ExpressionKind::FunctionCall { arguments, .. } => {
            for argument in arguments {
                visitor.visit_expression(argument);
            }
        }
        ExpressionKind::Struct { fields, .. } => {
            for field in fields {
                visitor.visit_expression(&field.expression);
            }
        }
        ExpressionKind::Lookup { expression, .. }
        | ExpressionKind::BoxNew(expression)
        | ExpressionKind::Loop(expression)
        | ExpressionKind::Unary {
            operand: expression,
            ..
        } => visitor.visit_expression(expression),
        ExpressionKind::Index { expression, index } => {
            visitor.visit_expression(expression);
            visitor.visit_expression(index);
        }
        ExpressionKind::Match { scrutinee, arms } => {
            visitor.visit_expression(scrutinee);

            for arm in arms {
                visitor.visit_match_arm(arm);
            }
        }
        ExpressionKind::If {
            condition,
            positive,
            negative,
        } => {
            visitor.visit_expression(condition);
            visitor.visit_expression(positive);

            if let Some(negative) = negative {
                visitor.visit_expression(negative);
            }
        }
        ExpressionKind::While { condition, body } => {
            visitor.visit_expression(condition);
            visitor.visit_expression(body);
        }
        ExpressionKind::Block(block) => visitor.visit_block(block),
        ExpressionKind::Binary { lhs, rhs, .. } => {
            visitor.visit_expression(lhs);
            visitor.visit_expression(rhs);
        }
    }
}

pub fn walk_match_arm<'a>(visitor: &mut impl Visitor<'a>, arm: &'a MatchArm) {
    for pattern in &arm.patterns {
        visitor.visit_pattern(pattern);
    }

    visitor.visit_expression(&arm.body);
}
