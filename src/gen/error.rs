//! Emission-time error set, split from the runtime `CodecError`: this
//! enum names failures that only happen while walking a `Schema` and
//! writing files, not while encoding or decoding a frame.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::error::CodecError;

#[derive(Debug, Error)]
pub enum GenError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("formatting error while emitting {context}: {source}")]
    Format {
        context: String,
        #[source]
        source: std::fmt::Error,
    },

    #[error("inconsistent schema while emitting {context}: {source}")]
    Schema {
        context: String,
        #[source]
        source: CodecError,
    },
}

impl From<std::fmt::Error> for GenError {
    fn from(source: std::fmt::Error) -> Self {
        GenError::Format {
            context: "generated source".to_string(),
            source,
        }
    }
}
