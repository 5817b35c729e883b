//! Crate-wide pool of global string constants.
//!
//! The pool is filled by a single pass over the whole crate before any
//! function is lowered, because every constant has to be declared ahead of the
//! first function. Lowering then walks the crate in the same order and claims
//! the pooled constants one by one.

use log::debug;

use crate::{
    frontend::{
        ast::{
            Crate, Expression, ExpressionKind,
            visit::{self, Visitor},
        },
        intern::Symbol,
    },
    index::{Index, IndexVec},
    middle::lir::{ConstantId, GlobalConstant, ast_lowering::LoweringError},
};

/// `printf` format used by the integer print builtin
pub const PRINT_INT_FORMAT: &str = "%d\n";
/// `printf` format used by the string print builtin
pub const PRINT_STR_FORMAT: &str = "%s\n";

#[derive(Debug, Clone)]
pub struct ConstantPool {
    constants: IndexVec<ConstantId, GlobalConstant>,
    /// The next pooled constant lowering will claim
    cursor: ConstantId,
}

impl Default for ConstantPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantPool {
    /// A pool holding only the two format strings
    pub fn new() -> Self {
        let mut constants = IndexVec::new();

        for format in [PRINT_INT_FORMAT, PRINT_STR_FORMAT] {
            let id = constants.next_index();
            constants.push(GlobalConstant::nul_terminated(id, format));
        }

        let cursor = constants.next_index();

        Self { constants, cursor }
    }

    /// Pools every string literal passed to `print_str`, in evaluation order
    pub fn collect(krate: &Crate, print_str: Symbol) -> Self {
        let mut collector = PrintLiteralCollector {
            pool: Self::new(),
            builtin: print_str,
        };

        visit::walk_crate(&mut collector, krate);

        collector.pool
    }

    pub fn print_int_format() -> ConstantId {
        ConstantId::new(0)
    }

    pub fn print_str_format() -> ConstantId {
        ConstantId::new(1)
    }

    /// Appends a constant. Equal strings are never merged.
    pub fn push(&mut self, value: &str) -> ConstantId {
        let id = self.constants.next_index();
        let constant = GlobalConstant::nul_terminated(id, value);

        debug!("pooled constant {} ({} bytes)", id.index(), constant.size());

        self.constants.push(constant)
    }

    /// Claims the next pooled constant for a literal being lowered. The
    /// literal must be the one the collecting pass saw at this position.
    pub fn take(&mut self, found: &str) -> Result<ConstantId, LoweringError> {
        let id = self.cursor;

        match self.constants.get(id) {
            Some(constant) if constant.bytes.strip_suffix(&[0]) == Some(found.as_bytes()) => {
                self.cursor.increment_by(1);
                Ok(id)
            }
            constant => Err(LoweringError::ConstantPoolMismatch {
                expected: constant.map(|c| {
                    String::from_utf8_lossy(&c.bytes[..c.bytes.len() - 1]).into_owned()
                }),
                found: found.to_owned(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GlobalConstant> {
        self.constants.iter()
    }

    pub fn into_constants(self) -> Vec<GlobalConstant> {
        self.constants.into_raw()
    }
}

struct PrintLiteralCollector {
    pool: ConstantPool,
    builtin: Symbol,
}

impl<'ast> Visitor<'ast> for PrintLiteralCollector {
    fn visit_expression(&mut self, expression: &'ast Expression) {
        if let ExpressionKind::FunctionCall { target, arguments } = &expression.kind
            && *target == self.builtin
            && let [argument] = arguments.as_slice()
            && let ExpressionKind::Str(value) = &argument.kind
        {
            self.pool.push(value);
        }

        visit::walk_expression(self, expression);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        frontend::ast::build::{self, call, expression_statement, str},
        middle::ty::Type,
    };

    fn prints(value: &str) -> crate::frontend::ast::Statement {
        expression_statement(call("prints", [str(value)], Type::unit()))
    }

    #[test]
    fn format_strings_come_first() {
        let pool = ConstantPool::new();
        let constants = pool.iter().collect::<Vec<_>>();

        assert_eq!(constants.len(), 2);
        assert_eq!(constants[0].bytes, b"%d\n\0");
        assert_eq!(constants[1].size(), 4);
    }

    #[test]
    fn equal_literals_are_not_deduplicated() {
        let body = build::block([prints("hi"), prints("hi")], None);
        let krate = build::krate([build::function("main", [], Type::unit(), body)]);

        let pool = ConstantPool::collect(&krate, Symbol::new("prints"));
        let pooled = pool.iter().skip(2).collect::<Vec<_>>();

        assert_eq!(pooled.len(), 2);
        assert_ne!(pooled[0].id, pooled[1].id);
        assert!(pooled.iter().all(|c| c.size() == 3));
    }

    #[test]
    fn only_print_arguments_are_pooled() {
        let body = build::block(
            [
                expression_statement(call("other", [str("nope")], Type::unit())),
                prints("yes"),
            ],
            None,
        );
        let krate = build::krate([build::function("main", [], Type::unit(), body)]);

        let pool = ConstantPool::collect(&krate, Symbol::new("prints"));

        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn take_claims_constants_in_order() {
        let mut pool = ConstantPool::new();
        let first = pool.push("a");
        let second = pool.push("b");

        assert_eq!(pool.take("a"), Ok(first));
        assert_eq!(pool.take("b"), Ok(second));
        assert_eq!(
            pool.take("c"),
            Err(LoweringError::ConstantPoolMismatch {
                expected: None,
                found: "c".to_owned()
            })
        );
    }

    #[test]
    fn take_rejects_out_of_order_literals() {
        let mut pool = ConstantPool::new();
        pool.push("a");

        assert!(pool.take("b").unwrap_err().is_upstream_defect());
    }
}
