//! goloop core
//!
//! Session state shared by the engine: the entry log and the assembler that
//! renders it as a Go program.

pub mod assembler;
pub mod entry;

pub use assembler::{assemble, print_expression, print_values, Placement, Program};
pub use entry::{Entry, EntryKind, EntryLog};
