//! The checked tree handed over by the front end, and the symbols it names
//! things with.

pub mod ast;
pub mod intern;
