use hashbrown::HashMap;

use crate::{
    frontend::intern::Symbol,
    middle::lir::{self, RegisterId, ast_lowering::LoweringError},
};

/// Where the value of a binding lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// In a stack slot. Reads load through the slot, places use it directly.
    Address(RegisterId),
    /// Held by an operand that is used as-is. `None` for bindings of a
    /// valueless type.
    Value(Option<lir::Operand>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub storage: Storage,
    /// Type of the value a read produces
    pub ty: lir::Type,
}

impl Binding {
    pub fn slot(slot: RegisterId, ty: lir::Type) -> Self {
        Self {
            storage: Storage::Address(slot),
            ty,
        }
    }

    /// A `ref` binding reads as the address of its slot
    pub fn reference_to(slot: RegisterId) -> Self {
        Self {
            storage: Storage::Value(Some(lir::Operand::Register(slot))),
            ty: lir::Type::Ptr,
        }
    }

    pub fn valueless() -> Self {
        Self {
            storage: Storage::Value(None),
            ty: lir::Type::Void,
        }
    }
}

/// Lexical scopes of one function body, innermost last
#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<HashMap<Symbol, Binding>>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    /// A stack holding the function-level scope parameters are bound in
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        // the function scope outlives every block
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Binds `name` in the innermost scope, shadowing any earlier binding
    pub fn bind(&mut self, name: Symbol, binding: Binding) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name, binding);
        }
    }

    pub fn resolve(&self, name: Symbol) -> Result<Binding, LoweringError> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(&name))
            .copied()
            .ok_or(LoweringError::UnresolvedIdentifier(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Index;

    #[test]
    fn inner_scopes_shadow_and_restore() {
        let x = Symbol::new("x");
        let outer = Binding::slot(RegisterId::new(0), lir::Type::I32);
        let inner = Binding::slot(RegisterId::new(3), lir::Type::I1);

        let mut scopes = ScopeStack::new();
        scopes.bind(x, outer);
        scopes.push();
        scopes.bind(x, inner);

        assert_eq!(scopes.resolve(x), Ok(inner));

        scopes.pop();

        assert_eq!(scopes.resolve(x), Ok(outer));
    }

    #[test]
    fn rebinding_in_the_same_scope_shadows() {
        let x = Symbol::new("x");
        let mut scopes = ScopeStack::new();

        scopes.bind(x, Binding::slot(RegisterId::new(0), lir::Type::I32));
        scopes.bind(x, Binding::valueless());

        assert_eq!(scopes.resolve(x), Ok(Binding::valueless()));
    }

    #[test]
    fn ref_bindings_are_register_valued() {
        let binding = Binding::reference_to(RegisterId::new(2));

        assert_eq!(
            binding.storage,
            Storage::Value(Some(lir::Operand::Register(RegisterId::new(2))))
        );
        assert_eq!(binding.ty, lir::Type::Ptr);
    }

    #[test]
    fn unbound_names_are_reported() {
        let scopes = ScopeStack::new();
        let y = Symbol::new("y");

        assert_eq!(
            scopes.resolve(y),
            Err(LoweringError::UnresolvedIdentifier(y))
        );
    }

    #[test]
    fn function_scope_is_never_popped() {
        let mut scopes = ScopeStack::new();
        scopes.pop();

        assert_eq!(scopes.depth(), 1);
    }
}
