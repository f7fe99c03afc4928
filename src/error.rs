//! Runtime error definitions for the reference wire-format codec. One
//! enum, [`CodecError`], with exactly the five kinds the wire format
//! names — independent of any target language's error mechanism, since
//! the same taxonomy has to describe a failure whether it happened in
//! this crate's reference runtime or in a Java/ECMAScript codec this
//! crate generated. Mirrors a `BitReaderError`/`BitWriterError` split,
//! collapsed into one enum because the byte-level reader and writer here
//! share a single failure vocabulary.
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Decoder needs more bytes than the input provides.
    #[error("unexpected end of input at offset {offset} while reading {context}")]
    Eof { offset: usize, context: String },

    /// Encoded output would exceed `size_max`, or a list's element count
    /// would exceed `list_max`.
    #[error("{context}: {detail}")]
    Overflow { context: String, detail: String },

    /// A value falls outside the representable or declared range of its
    /// field (`uint16 > 65535`, `int32 < -2^31`, …).
    #[error("value for field {field:?} is out of range: {detail}")]
    Range { field: String, detail: String },

    /// The decoder's `header` register is neither a known next field's
    /// tag (in either form) nor the end-of-struct sentinel.
    #[error("schema mismatch in struct {struct_name:?} at offset {offset}: {detail}")]
    SchemaMismatch {
        struct_name: String,
        offset: usize,
        detail: String,
    },

    /// Invalid UTF-16 surrogate pair during UTF-8 emission, or malformed
    /// UTF-8 multibyte sequence during decoding.
    #[error("encoding error in struct {struct_name:?} field {field:?}: {detail}")]
    Encoding {
        struct_name: String,
        field: String,
        detail: String,
    },
}
