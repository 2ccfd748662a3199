//! Core data model for notebook cells.
//!
//! A cell is a snippet of code together with what a host needs to know to
//! schedule it: the names it reads, the name it produces and, when the cell
//! defines a function, a typed description of how to call it. This crate owns
//! the language-neutral pieces (the value envelope and type lattice, function
//! specs, argument binding, the host-side call context and diagnostics).
//! Language frontends live in sibling crates.

#[macro_use]
pub mod macros;
pub mod binder;
pub mod call;
pub mod cell;
pub mod collections;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod frontend;
pub mod function;
pub mod source_map;
pub mod value;

pub use tracing;

pub use error::{Error, Result};
