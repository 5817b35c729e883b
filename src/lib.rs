pub mod frontend;
pub mod index;
pub mod middle;

pub use middle::lir::{
    ast_lowering::{LoweringError, LoweringOptions, emit_crate, lower_crate},
    pretty_print::{emit_module, pretty_print_module},
};
