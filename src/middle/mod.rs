//! Resolved types and the lowering of checked trees to LIR.

pub mod lir;
pub mod ty;
