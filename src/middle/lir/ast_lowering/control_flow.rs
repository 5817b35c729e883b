//! Structured control flow to labeled blocks.
//!
//! Every construct reserves one label id `L` and names its blocks after it
//! (`then.L`, `cond.L`, ...). All labels a construct branches to are opened
//! by the same construct, so each is defined exactly once.

use super::{FunctionLoweringContext, LoweringError, expression::check_type};
use crate::{
    frontend::ast::{BinaryOperatorKind, Expression, ExpressionKind},
    middle::lir::{self, LabelKind, type_lowering::lower_type},
};

impl FunctionLoweringContext<'_> {
    /// ```text
    ///   br i1 %c, label %then.L, label %else.L
    /// then.L:
    ///   br label %end.L
    /// else.L:
    ///   br label %end.L
    /// end.L:
    ///   %v = phi ...
    /// ```
    pub(super) fn lower_if(
        &mut self,
        expression: &Expression,
        condition: &Expression,
        positive: &Expression,
        negative: Option<&Expression>,
    ) -> Result<Option<lir::Operand>, LoweringError> {
        let id = self.new_label();
        let then_label = lir::Label::new(LabelKind::Then, id);
        let else_label = lir::Label::new(LabelKind::Else, id);
        let end_label = lir::Label::new(LabelKind::End, id);

        self.lower_condition(condition, then_label, else_label)?;

        let mut incoming = Vec::new();

        self.open_block(then_label);
        let value = self.lower_expression(positive)?;
        self.leave_arm(positive, value, end_label, &mut incoming);

        self.open_block(else_label);
        match negative {
            Some(negative) => {
                let value = self.lower_expression(negative)?;
                self.leave_arm(negative, value, end_label, &mut incoming);
            }
            None => {
                self.branch_to(end_label);
            }
        }

        self.open_block(end_label);

        if expression.ty.is_valueless() {
            return Ok(None);
        }

        let ty = lower_type(&expression.ty)?;
        let destination = self.push_value(|destination| lir::Instruction::Phi {
            destination,
            ty,
            incoming,
        });

        Ok(Some(lir::Operand::Register(destination)))
    }

    /// Jumps from the end of an `if` arm to `end`, recording the value the arm
    /// produced. An arm of type `!` may still sit in an open block nothing
    /// reaches (`after.L`, or the `end.L` of an inner `if` whose arms both
    /// return), which is closed with `unreachable` so `end` only has the
    /// predecessors its phi lists.
    fn leave_arm(
        &mut self,
        arm: &Expression,
        value: Option<lir::Operand>,
        end: lir::Label,
        incoming: &mut Vec<(lir::Operand, lir::Label)>,
    ) {
        if arm.ty.is_div() {
            if !self.is_terminated() {
                self.push_instruction(lir::Instruction::Unreachable);
            }

            return;
        }

        if let Some(source) = self.branch_to(end) {
            incoming.extend(value.map(|value| (value, source)));
        }
    }

    /// ```text
    ///   br label %cond.L
    /// cond.L:
    ///   br i1 %c, label %body.L, label %end.L
    /// body.L:
    ///   br label %cond.L
    /// end.L:
    /// ```
    pub(super) fn lower_while(
        &mut self,
        condition: &Expression,
        body: &Expression,
    ) -> Result<Option<lir::Operand>, LoweringError> {
        let id = self.new_label();
        let condition_label = lir::Label::new(LabelKind::Condition, id);
        let body_label = lir::Label::new(LabelKind::Body, id);
        let end_label = lir::Label::new(LabelKind::End, id);

        self.push_instruction(lir::Instruction::Jump {
            destination: condition_label,
        });

        self.open_block(condition_label);
        self.lower_condition(condition, body_label, end_label)?;

        self.open_block(body_label);
        self.lower_expression(body)?;
        self.branch_to(condition_label);

        self.open_block(end_label);

        Ok(None)
    }

    /// ```text
    ///   br label %begin.L
    /// begin.L:
    ///   br label %begin.L
    /// after.L:
    /// ```
    ///
    /// Nothing branches to `after.L`, leaving a `return` in the body as the
    /// only way out.
    pub(super) fn lower_loop(
        &mut self,
        body: &Expression,
    ) -> Result<Option<lir::Operand>, LoweringError> {
        let id = self.new_label();
        let begin_label = lir::Label::new(LabelKind::Begin, id);

        self.push_instruction(lir::Instruction::Jump {
            destination: begin_label,
        });

        self.open_block(begin_label);
        self.lower_expression(body)?;
        self.branch_to(begin_label);

        self.open_block(lir::Label::new(LabelKind::After, id));

        Ok(None)
    }

    /// Lowers a boolean expression as a branch to `positive` when it holds
    /// and to `negative` otherwise. `&&` and `||` only evaluate their right
    /// side when it decides the outcome.
    pub(super) fn lower_condition(
        &mut self,
        condition: &Expression,
        positive: lir::Label,
        negative: lir::Label,
    ) -> Result<(), LoweringError> {
        check_type(condition)?;

        match &condition.kind {
            ExpressionKind::Binary {
                lhs,
                operator: BinaryOperatorKind::LogicalAnd,
                rhs,
            } => {
                let rhs_label = lir::Label::new(LabelKind::AndRhs, self.new_label());

                self.lower_condition(lhs, rhs_label, negative)?;
                self.open_block(rhs_label);
                self.lower_condition(rhs, positive, negative)
            }
            ExpressionKind::Binary {
                lhs,
                operator: BinaryOperatorKind::LogicalOr,
                rhs,
            } => {
                let rhs_label = lir::Label::new(LabelKind::OrRhs, self.new_label());

                self.lower_condition(lhs, positive, rhs_label)?;
                self.open_block(rhs_label);
                self.lower_condition(rhs, positive, negative)
            }
            _ => {
                let value = self.lower_operand(condition)?;

                self.push_instruction(lir::Instruction::Branch {
                    condition: value,
                    positive,
                    negative,
                });

                Ok(())
            }
        }
    }

    /// `&&` or `||` whose result is stored or passed on rather than branched
    /// on, merged from two constant arms
    pub(super) fn lower_logical_value(
        &mut self,
        expression: &Expression,
    ) -> Result<Option<lir::Operand>, LoweringError> {
        let id = self.new_label();
        let then_label = lir::Label::new(LabelKind::Then, id);
        let else_label = lir::Label::new(LabelKind::Else, id);
        let end_label = lir::Label::new(LabelKind::End, id);

        self.lower_condition(expression, then_label, else_label)?;

        self.open_block(then_label);
        self.branch_to(end_label);

        self.open_block(else_label);
        self.branch_to(end_label);

        self.open_block(end_label);

        let destination = self.push_value(|destination| lir::Instruction::Phi {
            destination,
            ty: lir::Type::I1,
            incoming: vec![
                (lir::Operand::bool(true), then_label),
                (lir::Operand::bool(false), else_label),
            ],
        });

        Ok(Some(lir::Operand::Register(destination)))
    }
}
