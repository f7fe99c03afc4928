//! The Emitter: turns a resolved [`crate::model::Schema`] into generated
//! source trees for one or both target languages, writing them under an
//! output directory. Keeps "build the text" (per-language submodules)
//! separate from "write the files" (this module), invoked from a CLI
//! rather than a cargo build step.
pub mod conf;
pub mod ecma;
pub mod error;
pub mod java;
pub mod naming;

use std::fs;
use std::io::Write as _;
use std::path::Path;

use crate::model::Schema;
pub use error::GenError;

/// Which target language(s) a run should emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSelection {
    Java,
    Ecma,
    All,
}

impl TargetSelection {
    pub fn includes_java(self) -> bool {
        matches!(self, Self::Java | Self::All)
    }

    pub fn includes_ecma(self) -> bool {
        matches!(self, Self::Ecma | Self::All)
    }
}

/// Emit every package in `schema` under `out_dir`, per `selection`.
///
/// Java output lands at `<out_dir>/<package>/<Struct>.java`, one file per
/// struct. ECMAScript output lands at `<out_dir>/<package>/Colfer.js`, one
/// combined file per package.
pub fn generate_all(schema: &Schema, out_dir: &Path, selection: TargetSelection) -> Result<(), GenError> {
    for package in &schema.packages {
        let package_dir = out_dir.join(&package.name);
        fs::create_dir_all(&package_dir).map_err(|source| GenError::CreateDir {
            path: package_dir.clone(),
            source,
        })?;

        if selection.includes_java() {
            for file in java::emit_package(package)? {
                write_file(&package_dir.join(&file.file_name), &file.source)?;
            }
        }

        if selection.includes_ecma() {
            let source = ecma::emit_package(package)?;
            write_file(&package_dir.join(conf::ECMA_FILE_NAME), &source)?;
        }
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), GenError> {
    let file = fs::File::create(path).map_err(|source| GenError::WriteFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = std::io::BufWriter::new(file);
    writer.write_all(contents.as_bytes()).map_err(|source| GenError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}
