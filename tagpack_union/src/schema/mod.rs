//! How a sum type describes itself.
//!
//! A `UnionSchema` lists the cases of one sum type. Each case lists its fields
//! in declared order and supplies a pair of plain functions:
//! one that borrows field values out of a value,
//! and one that builds a value from field values.

mod case;
mod field;
mod provider;

pub use case::*;
pub use field::*;
pub use provider::*;
