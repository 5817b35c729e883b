use super::{FunctionLoweringContext, LoweringError, scope::Binding};
use crate::{
    frontend::ast::{Expression, Local, PatternKind, Statement, StatementKind},
    middle::lir::{self, type_lowering::lower_type},
};

impl FunctionLoweringContext<'_> {
    pub(super) fn lower_statement(&mut self, statement: &Statement) -> Result<(), LoweringError> {
        match &statement.kind {
            StatementKind::Let(local) => self.lower_let(local),
            StatementKind::Return(expression) => self.lower_return(expression.as_deref()),
            StatementKind::Expression(expression) => {
                // any value is dropped
                self.lower_expression(expression)?;
                Ok(())
            }
        }
    }

    /// `let <pattern> = <initializer>;`
    ///
    /// The slot is allocated before the initializer is evaluated, but the
    /// name is only bound afterwards so the initializer still sees any
    /// binding it shadows.
    fn lower_let(&mut self, local: &Local) -> Result<(), LoweringError> {
        let pattern = &local.pattern;
        let ty = local.ty.as_ref().unwrap_or(&pattern.ty);

        let (name, is_ref) = match &pattern.kind {
            PatternKind::Binding { name, is_ref, .. } => (*name, *is_ref),
            PatternKind::Wildcard => {
                if let Some(initializer) = &local.initializer {
                    self.lower_expression(initializer)?;
                }

                return Ok(());
            }
            kind => return Err(LoweringError::unsupported(kind.node_name())),
        };

        if ty.is_valueless() {
            if let Some(initializer) = &local.initializer {
                self.lower_expression(initializer)?;
            }

            self.scopes.bind(name, Binding::valueless());
            return Ok(());
        }

        let lir_ty = lower_type(ty)?;
        let slot = self.allocate_slot(lir_ty);

        if let Some(initializer) = &local.initializer {
            let value = self.lower_operand(initializer)?;

            self.push_instruction(lir::Instruction::Store {
                ty: lir_ty,
                value,
                address: lir::Operand::Register(slot),
            });
        }

        let binding = if is_ref {
            Binding::reference_to(slot)
        } else {
            Binding::slot(slot, lir_ty)
        };
        self.scopes.bind(name, binding);

        Ok(())
    }

    fn lower_return(&mut self, expression: Option<&Expression>) -> Result<(), LoweringError> {
        let value = match expression {
            Some(expression) => self.lower_expression(expression)?,
            None => None,
        };

        let value = if self.is_entry_point {
            Some((lir::Type::I32, self.exit_status(value)))
        } else if self.return_type.is_void() {
            None
        } else {
            Some((self.return_type, value.unwrap_or(lir::Operand::poison())))
        };

        self.push_instruction(lir::Instruction::Return { value });

        Ok(())
    }
}
