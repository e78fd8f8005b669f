//! tybuf-schema
//!
//! Canonical schema definitions for Tybuf. A [`Schema`] is the
//! language-agnostic, serializable representation of one type declaration,
//! produced by `tybuf-compiler` and consumed by the wire codec. The JSON
//! shape (field names, omitted optionals) is part of the wire contract and
//! must stay stable across releases.
//!
//! ```
//! use tybuf_schema::{Schema, SchemaRef};
//!
//! let schema = Schema::Reference(SchemaRef {
//!     path: Some("proto/user".to_owned()),
//!     target_name: "User".to_owned(),
//! });
//! let json = serde_json::to_string(&schema).unwrap();
//! assert_eq!(json, r#"{"type":"Reference","path":"proto/user","targetName":"User"}"#);
//! ```

pub mod encode_id;
pub mod schema;
pub mod util;

pub use encode_id::*;
pub use schema::*;
pub use util::*;
