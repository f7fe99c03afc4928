//! Output-layout constants used while emitting generated source.
/// File written per struct by the Java emitter: `<StructName>.java`.
pub const JAVA_FILE_EXT: &str = "java";
/// Single combined file the ECMAScript emitter writes per run.
pub const ECMA_FILE_NAME: &str = "Colfer.js";
