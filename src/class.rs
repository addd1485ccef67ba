//! The class file container: constant pool, member tables and raw attributes.

mod java_str;
pub(crate) mod parser;
mod structs;

pub use java_str::JavaString;
pub use parser::class_file;
pub use structs::*;
