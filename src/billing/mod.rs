//! Bill assembly: aggregation, numbering and the orchestrating assembler

pub mod aggregation;
pub mod assembler;
pub mod numbering;

pub use aggregation::*;
pub use assembler::*;
pub use numbering::*;
