//! Typed models

mod options;
mod table;

pub use options::*;
pub use table::*;
