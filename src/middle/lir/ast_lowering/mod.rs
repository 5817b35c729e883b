//! Lowers a checked AST into LIR one function at a time.
//!
//! Every function gets its own [`FunctionLoweringContext`] so that register
//! and label numbering restart at zero. The constant pool is the only state
//! shared across functions.

use core::fmt::{self, Display};

use log::{debug, trace};

use crate::{
    frontend::{
        ast::{self, PatternKind},
        intern::Symbol,
    },
    index::Index,
    middle::{
        lir::{
            self, LabelId, LabelKind, RegisterId,
            constant_pool::ConstantPool,
            pretty_print::{write_constants, write_trailer},
            type_lowering::lower_type,
        },
        ty::TypeKind,
    },
};

mod control_flow;
mod error;
mod expression;
mod scope;
mod statement;

pub use error::LoweringError;
pub use scope::{Binding, ScopeStack, Storage};

/// Knobs a caller may turn when lowering a crate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweringOptions {
    /// The function that is called by the C runtime. It always returns `i32`.
    pub entry_point: String,
    /// Builtin printing one integer followed by a newline
    pub print_int: String,
    /// Builtin printing one string literal followed by a newline
    pub print_str: String,
    /// Recorded in the module metadata
    pub producer: String,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        Self {
            entry_point: "main".to_owned(),
            print_int: "printi".to_owned(),
            print_str: "prints".to_owned(),
            producer: concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Builtins {
    print_int: Symbol,
    print_str: Symbol,
}

/// Lowers every function of `krate`
pub fn lower_crate(
    krate: &ast::Crate,
    options: &LoweringOptions,
) -> Result<lir::Module, LoweringError> {
    let mut lowering = CrateLoweringContext::new(krate, options);
    let mut function_definitions = Vec::new();

    for item in &krate.items {
        if let Some(function) = lowering.lower_item(item)? {
            function_definitions.push(function);
        }
    }

    Ok(lir::Module {
        constants: lowering.pool.into_constants(),
        function_definitions,
        producer: options.producer.clone(),
    })
}

/// Lowers `krate` straight into `out` as plain text, one function at a time.
///
/// Output is not transactional: when a function fails to lower, everything
/// written before it stays in `out`.
pub fn emit_crate(
    krate: &ast::Crate,
    options: &LoweringOptions,
    out: &mut impl fmt::Write,
) -> Result<(), LoweringError> {
    let mut lowering = CrateLoweringContext::new(krate, options);

    let mut constants = String::new();
    write_constants(&mut constants, lowering.pool.iter())?;
    write_plain(out, constants)?;

    for item in &krate.items {
        if let Some(function) = lowering.lower_item(item)? {
            writeln!(out)?;
            write_plain(out, function)?;
        }
    }

    let mut trailer = String::new();
    write_trailer(&mut trailer, &options.producer)?;

    writeln!(out)?;
    write_plain(out, trailer)?;

    Ok(())
}

fn write_plain(out: &mut impl fmt::Write, value: impl Display) -> fmt::Result {
    out.write_str(&strip_ansi_escapes::strip_str(value.to_string()))
}

struct CrateLoweringContext {
    entry_point: Symbol,
    builtins: Builtins,
    pool: ConstantPool,
}

impl CrateLoweringContext {
    fn new(krate: &ast::Crate, options: &LoweringOptions) -> Self {
        let builtins = Builtins {
            print_int: Symbol::new(&options.print_int),
            print_str: Symbol::new(&options.print_str),
        };

        let pool = ConstantPool::collect(krate, builtins.print_str);
        debug!("constant pool holds {} constants", pool.len());

        Self {
            entry_point: Symbol::new(&options.entry_point),
            builtins,
            pool,
        }
    }

    fn lower_item(
        &mut self,
        item: &ast::Item,
    ) -> Result<Option<lir::FunctionDefinition>, LoweringError> {
        if matches!(*item.ty, TypeKind::Error) {
            return Err(LoweringError::ErroneousNode {
                node: item.kind.node_name(),
            });
        }

        match &item.kind {
            ast::ItemKind::FunctionDefinition(function) => {
                self.lower_function(item.name, function).map(Some)
            }
            // type definitions only matter to the checker
            ast::ItemKind::EnumDefinition(_) | ast::ItemKind::StructDefinition(_) => {
                trace!("skipping {} `{}`", item.kind.node_name(), item.name);
                Ok(None)
            }
        }
    }

    fn lower_function(
        &mut self,
        name: Symbol,
        function: &ast::FunctionDefinition,
    ) -> Result<lir::FunctionDefinition, LoweringError> {
        debug!("lowering function `{name}`");

        let is_entry_point = name == self.entry_point;
        let returns_status = is_entry_point && matches!(*function.return_type, TypeKind::I32);
        let return_type = if is_entry_point {
            lir::Type::I32
        } else {
            lower_type(&function.return_type)?
        };

        let mut ctx = FunctionLoweringContext {
            pool: &mut self.pool,
            builtins: self.builtins,
            is_entry_point,
            returns_status,
            return_type,
            next_register: RegisterId::new(0),
            next_label: LabelId::new(0),
            blocks: Vec::new(),
            scopes: ScopeStack::new(),
        };

        ctx.open_block(lir::Label::Entry);

        let parameters = ctx.lower_parameters(&function.parameters)?;
        let value = ctx.lower_block(&function.body)?;
        ctx.finish_body(value);

        let definition = lir::FunctionDefinition {
            symbol_name: name,
            return_type,
            parameters,
            blocks: ctx.blocks,
        };

        debug!(
            "lowered `{name}` into {} blocks using {} registers",
            definition.blocks.len(),
            definition.register_count()
        );

        Ok(definition)
    }
}

/// Per-function lowering state
pub(super) struct FunctionLoweringContext<'a> {
    pool: &'a mut ConstantPool,
    builtins: Builtins,
    is_entry_point: bool,
    /// The entry point is declared `-> i32`, so its own values are the exit
    /// status
    returns_status: bool,
    return_type: lir::Type,

    next_register: RegisterId,
    next_label: LabelId,
    /// Blocks in the order they were opened. Instructions always go into
    /// the last one.
    blocks: Vec<lir::Block>,
    scopes: ScopeStack,
}

impl FunctionLoweringContext<'_> {
    fn new_register(&mut self) -> RegisterId {
        let id = self.next_register;
        self.next_register.increment_by(1);
        id
    }

    /// Reserves the id shared by every label of one construct
    fn new_label(&mut self) -> LabelId {
        let id = self.next_label;
        self.next_label.increment_by(1);
        trace!("allocated label id {}", id.index());
        id
    }

    fn open_block(&mut self, label: lir::Label) {
        debug_assert!(
            self.blocks.last().is_none_or(lir::Block::is_terminated),
            "block opened while {} falls through",
            self.current_label()
        );

        trace!("opening block {label}");
        self.blocks.push(lir::Block::new(label));
    }

    fn current_label(&self) -> lir::Label {
        self.blocks
            .last()
            .map(|block| block.label)
            .unwrap_or(lir::Label::Entry)
    }

    /// Whether control can no longer reach the end of the current block
    fn is_terminated(&self) -> bool {
        self.blocks.last().is_some_and(lir::Block::is_terminated)
    }

    /// Code following a `return` or `loop` still needs a home, which is a
    /// fresh block that nothing branches to
    fn ensure_open_block(&mut self) {
        if self.is_terminated() {
            let id = self.new_label();
            self.open_block(lir::Label::new(LabelKind::Continuation, id));
        }
    }

    fn push_instruction(&mut self, instruction: lir::Instruction) {
        self.ensure_open_block();

        if let Some(block) = self.blocks.last_mut() {
            block.instructions.push(instruction);
        }
    }

    /// Pushes an instruction binding a fresh register. The register is only
    /// allocated once the operands have been lowered, which keeps numbering
    /// in textual order.
    fn push_value(
        &mut self,
        instruction: impl FnOnce(RegisterId) -> lir::Instruction,
    ) -> RegisterId {
        self.ensure_open_block();

        let destination = self.new_register();
        self.push_instruction(instruction(destination));

        destination
    }

    /// Jumps to `destination` unless the current block already ended, giving
    /// the label of the block the jump leaves from
    fn branch_to(&mut self, destination: lir::Label) -> Option<lir::Label> {
        if self.is_terminated() {
            return None;
        }

        let source = self.current_label();
        self.push_instruction(lir::Instruction::Jump { destination });

        Some(source)
    }

    fn allocate_slot(&mut self, ty: lir::Type) -> RegisterId {
        self.push_value(|destination| lir::Instruction::Alloca { destination, ty })
    }

    /// Builds the signature and spills every parameter into its own slot
    fn lower_parameters(
        &mut self,
        parameters: &[ast::Parameter],
    ) -> Result<Vec<lir::FunctionParameter>, LoweringError> {
        let mut lowered = Vec::with_capacity(parameters.len());

        for (i, parameter) in parameters.iter().enumerate() {
            let name = match &parameter.pattern.kind {
                PatternKind::Binding { name, .. } => *name,
                PatternKind::Wildcard => Symbol::new(&format!("_{i}")),
                kind => return Err(LoweringError::unsupported(kind.node_name())),
            };

            if parameter.ty.is_valueless() {
                self.scopes.bind(name, Binding::valueless());
                continue;
            }

            let ty = lower_type(&parameter.ty)?;
            let slot = self.allocate_slot(ty);

            self.push_instruction(lir::Instruction::Store {
                ty,
                value: lir::Operand::Parameter(name),
                address: lir::Operand::Register(slot),
            });

            let binding = match &parameter.pattern.kind {
                PatternKind::Binding { is_ref: true, .. } => Binding::reference_to(slot),
                _ => Binding::slot(slot, ty),
            };
            self.scopes.bind(name, binding);

            lowered.push(lir::FunctionParameter { name, ty });
        }

        Ok(lowered)
    }

    /// What the entry point returns for `value`, which is zero unless it
    /// produces an `i32` of its own
    fn exit_status(&self, value: Option<lir::Operand>) -> lir::Operand {
        match value {
            Some(value) if self.returns_status => value,
            _ => lir::Operand::int(0),
        }
    }

    /// Closes the last block if control can still fall off the end
    fn finish_body(&mut self, value: Option<lir::Operand>) {
        if self.is_terminated() {
            return;
        }

        let instruction = if self.is_entry_point {
            lir::Instruction::Return {
                value: Some((lir::Type::I32, self.exit_status(value))),
            }
        } else if self.return_type.is_void() {
            lir::Instruction::Return { value: None }
        } else if let Some(value) = value {
            lir::Instruction::Return {
                value: Some((self.return_type, value)),
            }
        } else {
            lir::Instruction::Unreachable
        };

        self.push_instruction(instruction);
    }
}

#[cfg(test)]
mod tests {
    use hashbrown::HashSet;

    use super::*;
    use crate::{
        frontend::ast::build::{
            block, block_expression, boolean, call, expression_statement, function, i32, id,
            if_else, krate, let_immutable,
        },
        middle::ty::Type,
    };

    fn lower_main(statements: impl IntoIterator<Item = ast::Statement>) -> lir::FunctionDefinition {
        let krate = krate([function("main", [], Type::unit(), block(statements, None))]);

        lower_crate(&krate, &LoweringOptions::default())
            .expect("crate should lower")
            .function_definitions
            .remove(0)
    }

    fn value_if() -> lir::FunctionDefinition {
        lower_main([
            let_immutable(
                "x",
                if_else(
                    boolean(true),
                    block_expression(block([], Some(i32(1)))),
                    Some(block_expression(block([], Some(i32(2))))),
                ),
            ),
            expression_statement(call("printi", [id("x", Type::i32())], Type::unit())),
        ])
    }

    #[test]
    fn blocks_are_closed_and_branch_to_known_labels() {
        let main = value_if();
        let labels = main.blocks.iter().map(|b| b.label).collect::<HashSet<_>>();

        assert_eq!(labels.len(), main.blocks.len());

        for block in &main.blocks {
            assert!(block.is_terminated(), "{} falls through", block.label);
            assert_eq!(
                block.instructions.iter().filter(|i| i.is_terminator()).count(),
                1
            );

            for instruction in &block.instructions {
                for successor in instruction.successors() {
                    assert!(labels.contains(&successor), "{successor} is not defined");
                }
            }
        }
    }

    #[test]
    fn labels_of_one_construct_share_an_id() {
        let ids = value_if()
            .blocks
            .iter()
            .map(|b| b.label.id())
            .collect::<Vec<_>>();

        let construct = Some(LabelId::new(0));
        assert_eq!(ids, [None, construct, construct, construct]);
    }

    #[test]
    fn phi_result_is_what_gets_stored() {
        let main = value_if();
        let end = &main.blocks[3];

        let Some(lir::Instruction::Phi { destination, .. }) = end.instructions.first() else {
            panic!("`{}` should open with a phi", end.label);
        };
        let Some(lir::Instruction::Store { value, .. }) = end.instructions.get(1) else {
            panic!("the phi should be stored into `x`");
        };

        assert_eq!(value.as_register(), Some(*destination));
        assert_eq!(main.register_count(), 4);
    }

    #[test]
    fn entry_point_falls_through_to_exit_status() {
        let main = lower_main([]);

        assert_eq!(main.return_type, lir::Type::I32);
        assert_eq!(
            main.blocks[0].instructions,
            [lir::Instruction::Return {
                value: Some((lir::Type::I32, lir::Operand::int(0)))
            }]
        );
    }
}
