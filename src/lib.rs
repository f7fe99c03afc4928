//! `colfer` library: the Colfer wire format and its multi-language code
//! generator. The crate exposes four layers, leaves first: the
//! [`model`] (resolved schema description), [`type_map`] (logical type
//! to target-language native type), [`gen`] (the per-language emitters),
//! and the reference wire-format runtime ([`wire`] + [`codec`]) that the
//! emitted Java/ECMAScript sources must match byte for byte.
pub mod codec;
pub mod error;
pub mod gen;
pub mod model;
pub mod schema_doc;
pub mod type_map;
pub mod wire;

pub use error::CodecError;
pub use model::{Field, LogicalType, Package, Schema, Struct};
pub use schema_doc::SchemaError;
