//! LIR (Low-level Intermediate Representation). In this form, structured
//! control flow is simplified to labels and branches, expression trees are
//! flattened into ordered single-assignment instructions, and every binding
//! lives in a stack slot.

use strum::Display;

use crate::{
    frontend::intern::Symbol,
    index::{Index, simple_index},
};

pub mod ast_lowering;
pub mod constant_pool;
pub mod operator;
pub mod pretty_print;
pub mod type_lowering;

pub use operator::{IntPredicate, Opcode};

#[derive(Debug, Clone)]
pub struct Module {
    /// Pooled constants in declaration order, the fixed format strings first
    pub constants: Vec<GlobalConstant>,
    pub function_definitions: Vec<FunctionDefinition>,
    /// Written into the metadata trailer
    pub producer: String,
}

/// An immutable, NUL terminated byte array in the global data section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalConstant {
    pub id: ConstantId,
    /// Contents including the trailing NUL
    pub bytes: Vec<u8>,
}

impl GlobalConstant {
    pub fn nul_terminated(id: ConstantId, value: &str) -> Self {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);

        Self { id, bytes }
    }

    /// Declared size of the array, always the string length plus one
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

simple_index! {
    /// Identifies a global constant. The numbering is shared by the whole crate.
    pub struct ConstantId;
}

#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    pub symbol_name: Symbol,
    pub return_type: Type,
    pub parameters: Vec<FunctionParameter>,
    /// Blocks in the order they were opened, starting with `entry`
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionParameter {
    /// Name of the incoming value in the signature
    pub name: Symbol,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub label: Label,
    pub instructions: Vec<Instruction>,
}

impl Block {
    pub fn new(label: Label) -> Self {
        Self {
            label,
            instructions: Vec::new(),
        }
    }

    /// A block is closed once it ends in a branch, return or `unreachable`
    pub fn is_terminated(&self) -> bool {
        self.instructions.last().is_some_and(|i| i.is_terminator())
    }
}

simple_index! {
    /// Identifies a virtual single-assignment register within one function
    pub struct RegisterId;
}

simple_index! {
    /// Identifies one control-flow construct within one function. Every label
    /// the construct needs shares this id.
    pub struct LabelId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum LabelKind {
    #[strum(serialize = "then")]
    Then,
    #[strum(serialize = "else")]
    Else,
    #[strum(serialize = "end")]
    End,
    #[strum(serialize = "cond")]
    Condition,
    #[strum(serialize = "body")]
    Body,
    #[strum(serialize = "begin")]
    Begin,
    #[strum(serialize = "after")]
    After,
    #[strum(serialize = "and.rhs")]
    AndRhs,
    #[strum(serialize = "or.rhs")]
    OrRhs,
    #[strum(serialize = "cont")]
    Continuation,
}

/// Names the entry of a basic block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Entry,
    Local(LabelKind, LabelId),
}

impl Label {
    pub fn new(kind: LabelKind, id: LabelId) -> Self {
        Self::Local(kind, id)
    }

    pub fn id(self) -> Option<LabelId> {
        match self {
            Label::Entry => None,
            Label::Local(_, id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Type {
    I1,
    I8,
    I32,
    Ptr,
    Void,
}

impl Type {
    pub fn is_void(self) -> bool {
        self == Type::Void
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Immediate {
    Int(i64),
    Bool(bool),
    /// Stands in for the value of an expression that never completes
    Poison,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Immediate(Immediate),
    Register(RegisterId),
    /// An incoming parameter, only read by the prologue
    Parameter(Symbol),
    /// The address of a global constant
    Constant(ConstantId),
}

impl Operand {
    pub fn int(value: i64) -> Self {
        Self::Immediate(Immediate::Int(value))
    }

    pub fn bool(value: bool) -> Self {
        Self::Immediate(Immediate::Bool(value))
    }

    pub fn poison() -> Self {
        Self::Immediate(Immediate::Poison)
    }

    pub fn as_register(self) -> Option<RegisterId> {
        match self {
            Operand::Register(id) => Some(id),
            _ => None,
        }
    }
}

/// The callee of a call instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callee {
    Function(Symbol),
    /// The external variadic print primitive
    Printf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `%d = alloca <ty>`
    Alloca { destination: RegisterId, ty: Type },
    /// `store <ty> <value>, ptr <address>`
    Store {
        ty: Type,
        value: Operand,
        address: Operand,
    },
    /// `%d = load <ty>, ptr <address>`
    Load {
        destination: RegisterId,
        ty: Type,
        address: Operand,
    },
    /// `%d = <opcode> <ty> <lhs>, <rhs>`
    BinaryOperation {
        opcode: Opcode,
        destination: RegisterId,
        ty: Type,
        lhs: Operand,
        rhs: Operand,
    },
    /// `%d = icmp <predicate> <ty> <lhs>, <rhs>`
    Compare {
        predicate: IntPredicate,
        destination: RegisterId,
        ty: Type,
        lhs: Operand,
        rhs: Operand,
    },
    /// Moves a non-integer literal into a register with a no-op cast
    Materialize {
        destination: RegisterId,
        ty: Type,
        value: Immediate,
    },
    /// `%d = zext <from> <value> to <to>`
    ZeroExtend {
        destination: RegisterId,
        from: Type,
        value: Operand,
        to: Type,
    },
    /// `%d = phi <ty> [<value>, %<label>], ...`
    Phi {
        destination: RegisterId,
        ty: Type,
        incoming: Vec<(Operand, Label)>,
    },
    FunctionCall {
        destination: Option<RegisterId>,
        return_type: Type,
        callee: Callee,
        arguments: Vec<(Type, Operand)>,
    },
    Jump {
        destination: Label,
    },
    Branch {
        condition: Operand,
        positive: Label,
        negative: Label,
    },
    Return {
        value: Option<(Type, Operand)>,
    },
    Unreachable,
}

impl Instruction {
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Jump { .. }
                | Instruction::Branch { .. }
                | Instruction::Return { .. }
                | Instruction::Unreachable
        )
    }

    /// The register this instruction binds, if any
    pub fn destination(&self) -> Option<RegisterId> {
        match self {
            Instruction::Alloca { destination, .. }
            | Instruction::Load { destination, .. }
            | Instruction::BinaryOperation { destination, .. }
            | Instruction::Compare { destination, .. }
            | Instruction::Materialize { destination, .. }
            | Instruction::ZeroExtend { destination, .. }
            | Instruction::Phi { destination, .. } => Some(*destination),
            Instruction::FunctionCall { destination, .. } => *destination,
            Instruction::Store { .. }
            | Instruction::Jump { .. }
            | Instruction::Branch { .. }
            | Instruction::Return { .. }
            | Instruction::Unreachable => None,
        }
    }

    /// Labels this instruction may transfer control to
    pub fn successors(&self) -> Vec<Label> {
        match self {
            Instruction::Jump { destination } => vec![*destination],
            Instruction::Branch {
                positive, negative, ..
            } => vec![*positive, *negative],
            _ => Vec::new(),
        }
    }
}

impl FunctionDefinition {
    /// Number of registers bound in this function
    pub fn register_count(&self) -> usize {
        self.blocks
            .iter()
            .flat_map(|b| b.instructions.iter())
            .filter_map(Instruction::destination)
            .map(|r| r.index() + 1)
            .max()
            .unwrap_or(0)
    }
}
