//! tybuf-compiler
//!
//! This crate implements:
//!  1) The parsed syntax-tree model and the pluggable [`ast::AstParser`]
//!     contract (with a JSON-tree implementation),
//!  2) Per-file flattening into a Declaration Table and Import Table,
//!  3) The node→schema compiler (`compile_decl` / `compile_type`),
//!  4) The multi-file [`SchemaGenerator`] with transitive reference
//!     resolution and encode-ID regeneration,
//!  5) Error types ([`TybufError`]).

pub mod ast;
pub mod compile;
pub mod error;
pub mod flatten;
pub mod generator;
pub mod imports;

pub use compile::{compile_decl, compile_type};
pub use error::TybufError;
pub use generator::{
    regen_result_encode_ids, FilterInfo, GenerateOptions, GenerateResult, SchemaGenerator,
};
