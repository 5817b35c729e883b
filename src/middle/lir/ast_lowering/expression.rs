use log::trace;

use super::{FunctionLoweringContext, LoweringError, scope::Storage};
use crate::{
    frontend::{
        ast::{Block, Expression, ExpressionKind, UnaryOperatorKind},
        intern::Symbol,
    },
    middle::lir::{
        self, Opcode,
        constant_pool::ConstantPool,
        operator::{BinaryLowering, UnaryLowering, lower_binary_operator, lower_unary_operator},
        type_lowering::lower_type,
    },
};

impl FunctionLoweringContext<'_> {
    /// Lowers `expression` for its value. Valueless expressions (unit, and
    /// anything that diverges) give `None`.
    pub(super) fn lower_expression(
        &mut self,
        expression: &Expression,
    ) -> Result<Option<lir::Operand>, LoweringError> {
        check_type(expression)?;

        match &expression.kind {
            ExpressionKind::Unit => Ok(None),
            ExpressionKind::I32(value) => Ok(Some(lir::Operand::int(i64::from(*value)))),
            ExpressionKind::True => Ok(Some(self.materialize(lir::Immediate::Bool(true)))),
            ExpressionKind::False => Ok(Some(self.materialize(lir::Immediate::Bool(false)))),
            ExpressionKind::U8(value) => Ok(Some(
                self.materialize(lir::Immediate::Int(i64::from(*value))),
            )),
            ExpressionKind::Identifier(name) => self.lower_identifier(*name),
            ExpressionKind::FunctionCall { target, arguments } => {
                self.lower_function_call(expression, *target, arguments)
            }
            ExpressionKind::Block(block) => self.lower_block(block),
            ExpressionKind::If {
                condition,
                positive,
                negative,
            } => self.lower_if(expression, condition, positive, negative.as_deref()),
            ExpressionKind::While { condition, body } => self.lower_while(condition, body),
            ExpressionKind::Loop(body) => self.lower_loop(body),
            ExpressionKind::Unary {
                operator,
                is_mutable,
                operand,
            } => self.lower_unary(expression, *operator, *is_mutable, operand),
            ExpressionKind::Binary { lhs, operator, rhs } => {
                match lower_binary_operator(*operator) {
                    BinaryLowering::Arithmetic(opcode) => {
                        let ty = lower_type(&lhs.ty)?;
                        let lhs = self.lower_operand(lhs)?;
                        let rhs = self.lower_operand(rhs)?;

                        let destination = self.push_value(|destination| {
                            lir::Instruction::BinaryOperation {
                                opcode,
                                destination,
                                ty,
                                lhs,
                                rhs,
                            }
                        });

                        Ok(Some(lir::Operand::Register(destination)))
                    }
                    BinaryLowering::Compare(predicate) => {
                        let ty = lower_type(&lhs.ty)?;
                        let lhs = self.lower_operand(lhs)?;
                        let rhs = self.lower_operand(rhs)?;

                        let destination = self.push_value(|destination| lir::Instruction::Compare {
                            predicate,
                            destination,
                            ty,
                            lhs,
                            rhs,
                        });

                        Ok(Some(lir::Operand::Register(destination)))
                    }
                    BinaryLowering::Assign => {
                        let address = self.lower_place(lhs)?;
                        let ty = lower_type(&lhs.ty)?;

                        if let Some(value) = self.lower_expression(rhs)? {
                            self.push_instruction(lir::Instruction::Store { ty, value, address });
                        }

                        Ok(None)
                    }
                    BinaryLowering::CompoundAssign(opcode) => {
                        let address = self.lower_place(lhs)?;
                        let ty = lower_type(&lhs.ty)?;

                        let current = self.push_value(|destination| lir::Instruction::Load {
                            destination,
                            ty,
                            address,
                        });
                        let rhs = self.lower_operand(rhs)?;
                        let updated = self.push_value(|destination| {
                            lir::Instruction::BinaryOperation {
                                opcode,
                                destination,
                                ty,
                                lhs: lir::Operand::Register(current),
                                rhs,
                            }
                        });

                        self.push_instruction(lir::Instruction::Store {
                            ty,
                            value: lir::Operand::Register(updated),
                            address,
                        });

                        Ok(None)
                    }
                    BinaryLowering::ShortCircuit(_) => self.lower_logical_value(expression),
                }
            }
            ExpressionKind::Str(_)
            | ExpressionKind::Enum { .. }
            | ExpressionKind::Struct { .. }
            | ExpressionKind::Array(_)
            | ExpressionKind::Lookup { .. }
            | ExpressionKind::Index { .. }
            | ExpressionKind::BoxNew(_)
            | ExpressionKind::Match { .. } => {
                Err(LoweringError::unsupported(expression.kind.node_name()))
            }
        }
    }

    /// Lowers an expression whose value is required
    pub(super) fn lower_operand(
        &mut self,
        expression: &Expression,
    ) -> Result<lir::Operand, LoweringError> {
        match self.lower_expression(expression)? {
            Some(value) => Ok(value),
            // whatever consumes the value is dead code
            None if expression.ty.is_div() => Ok(lir::Operand::poison()),
            None => Err(LoweringError::unsupported(expression.kind.node_name())),
        }
    }

    /// Lowers the statements of a block in a fresh scope, then its trailing
    /// expression as the value of the block
    pub(super) fn lower_block(
        &mut self,
        block: &Block,
    ) -> Result<Option<lir::Operand>, LoweringError> {
        self.scopes.push();

        for statement in &block.statements {
            self.lower_statement(statement)?;
        }

        let value = match &block.expression {
            Some(expression) => self.lower_expression(expression)?,
            None => None,
        };

        self.scopes.pop();

        Ok(value)
    }

    /// Moves a literal that has no immediate form into a register
    fn materialize(&mut self, value: lir::Immediate) -> lir::Operand {
        let ty = match value {
            lir::Immediate::Bool(_) => lir::Type::I1,
            _ => lir::Type::I8,
        };

        let destination = self.push_value(|destination| lir::Instruction::Materialize {
            destination,
            ty,
            value,
        });

        lir::Operand::Register(destination)
    }

    fn lower_identifier(&mut self, name: Symbol) -> Result<Option<lir::Operand>, LoweringError> {
        let binding = self.scopes.resolve(name)?;

        match binding.storage {
            Storage::Address(slot) => {
                let ty = binding.ty;
                let destination = self.push_value(|destination| lir::Instruction::Load {
                    destination,
                    ty,
                    address: lir::Operand::Register(slot),
                });

                Ok(Some(lir::Operand::Register(destination)))
            }
            Storage::Value(value) => Ok(value),
        }
    }

    /// Lowers an assignable expression to the address it designates
    fn lower_place(&mut self, expression: &Expression) -> Result<lir::Operand, LoweringError> {
        check_type(expression)?;

        match &expression.kind {
            ExpressionKind::Identifier(name) => match self.scopes.resolve(*name)?.storage {
                Storage::Address(slot) => Ok(lir::Operand::Register(slot)),
                Storage::Value(_) => Err(LoweringError::unsupported(expression.kind.node_name())),
            },
            ExpressionKind::Unary {
                operator: UnaryOperatorKind::Deref,
                operand,
                ..
            } => self.lower_operand(operand),
            kind => Err(LoweringError::unsupported(kind.node_name())),
        }
    }

    fn lower_unary(
        &mut self,
        expression: &Expression,
        operator: UnaryOperatorKind,
        is_mutable: bool,
        operand: &Expression,
    ) -> Result<Option<lir::Operand>, LoweringError> {
        let lowering = lower_unary_operator(operator, is_mutable);

        match lowering {
            UnaryLowering::Address { .. } => self.lower_place(operand).map(Some),
            UnaryLowering::Load => {
                let address = self.lower_operand(operand)?;

                if expression.ty.is_valueless() {
                    return Ok(None);
                }

                let ty = lower_type(&expression.ty)?;
                let destination = self.push_value(|destination| lir::Instruction::Load {
                    destination,
                    ty,
                    address,
                });

                Ok(Some(lir::Operand::Register(destination)))
            }
            UnaryLowering::Negate | UnaryLowering::Invert => {
                let ty = lower_type(&expression.ty)?;
                let value = self.lower_operand(operand)?;

                let (opcode, lhs, rhs) = match lowering {
                    UnaryLowering::Negate => (Opcode::Sub, lir::Operand::int(0), value),
                    _ if ty == lir::Type::I1 => (Opcode::Xor, value, lir::Operand::bool(true)),
                    _ => (Opcode::Xor, value, lir::Operand::int(-1)),
                };

                let destination = self.push_value(|destination| lir::Instruction::BinaryOperation {
                    opcode,
                    destination,
                    ty,
                    lhs,
                    rhs,
                });

                Ok(Some(lir::Operand::Register(destination)))
            }
        }
    }

    fn lower_function_call(
        &mut self,
        expression: &Expression,
        target: Symbol,
        arguments: &[Expression],
    ) -> Result<Option<lir::Operand>, LoweringError> {
        if target == self.builtins.print_int {
            let argument = single_argument(target, arguments)?;
            let ty = lower_type(&argument.ty)?;
            let value = self.lower_operand(argument)?;
            let (ty, value) = self.promote_variadic(ty, value);

            self.call_printf(ConstantPool::print_int_format(), ty, value);

            return Ok(None);
        }

        if target == self.builtins.print_str {
            let argument = single_argument(target, arguments)?;
            check_type(argument)?;

            let ExpressionKind::Str(literal) = &argument.kind else {
                return Err(LoweringError::NonLiteralPrintArgument { builtin: target });
            };

            let constant = self.pool.take(literal)?;
            trace!("`{target}` prints pooled constant {constant:?}");

            self.call_printf(
                ConstantPool::print_str_format(),
                lir::Type::Ptr,
                lir::Operand::Constant(constant),
            );

            return Ok(None);
        }

        let mut lowered = Vec::with_capacity(arguments.len());

        for argument in arguments {
            let value = self.lower_expression(argument)?;

            // valueless arguments are evaluated but not passed
            if let Some(value) = value
                && !argument.ty.is_valueless()
            {
                lowered.push((lower_type(&argument.ty)?, value));
            }
        }

        let return_type = lower_type(&expression.ty)?;
        let callee = lir::Callee::Function(target);

        if return_type.is_void() {
            self.push_instruction(lir::Instruction::FunctionCall {
                destination: None,
                return_type,
                callee,
                arguments: lowered,
            });

            return Ok(None);
        }

        let destination = self.push_value(|destination| lir::Instruction::FunctionCall {
            destination: Some(destination),
            return_type,
            callee,
            arguments: lowered,
        });

        Ok(Some(lir::Operand::Register(destination)))
    }

    /// Widens `bool` and `u8` values to the `i32` a C variadic argument
    /// expects
    fn promote_variadic(
        &mut self,
        ty: lir::Type,
        value: lir::Operand,
    ) -> (lir::Type, lir::Operand) {
        if !matches!(ty, lir::Type::I1 | lir::Type::I8) {
            return (ty, value);
        }

        let destination = self.push_value(|destination| lir::Instruction::ZeroExtend {
            destination,
            from: ty,
            value,
            to: lir::Type::I32,
        });

        (lir::Type::I32, lir::Operand::Register(destination))
    }

    fn call_printf(&mut self, format: lir::ConstantId, ty: lir::Type, value: lir::Operand) {
        self.push_instruction(lir::Instruction::FunctionCall {
            destination: None,
            return_type: lir::Type::I32,
            callee: lir::Callee::Printf,
            arguments: vec![
                (lir::Type::Ptr, lir::Operand::Constant(format)),
                (ty, value),
            ],
        });
    }
}

/// Rejects nodes the checker should never have let through
pub(super) fn check_type(expression: &Expression) -> Result<(), LoweringError> {
    if expression.ty.is_erroneous() {
        return Err(LoweringError::ErroneousNode {
            node: expression.kind.node_name(),
        });
    }

    Ok(())
}

fn single_argument(
    builtin: Symbol,
    arguments: &[Expression],
) -> Result<&Expression, LoweringError> {
    match arguments {
        [argument] => Ok(argument),
        _ => Err(LoweringError::BuiltinArity {
            builtin,
            expected: 1,
            found: arguments.len(),
        }),
    }
}
