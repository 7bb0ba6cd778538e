//! Data module: link variables, the local field and group-element generation.

pub mod field;
pub mod generator;
pub mod su3;

pub use field::LatticeField;
pub use generator::{GroupElementGenerator, Su3Generator};
pub use su3::Su3;
