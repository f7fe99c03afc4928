//! The Schema Model: a resolved, read-only description of packages,
//! structs and fields. Built once by [`crate::schema_doc::resolve`] and
//! never mutated afterwards — the Emitter and the reference codec only
//! ever borrow it.
//!
//! Mirrors a `PgnDescriptor`/`FieldDescriptor`/`FieldKind` triad,
//! generalized from a single NMEA2000 database to Colfer's closed
//! logical-type set.

/// Default upper bound on an encoded frame, in bytes (16 MiB).
pub const DEFAULT_SIZE_MAX: u64 = 16 * 1024 * 1024;
/// Default upper bound on the number of elements in a list field (64 Ki).
pub const DEFAULT_LIST_MAX: u64 = 64 * 1024;

/// Highest field index a struct may declare. Index 127 is reserved for
/// the end-of-struct sentinel and is therefore never assignable.
pub const MAX_FIELD_INDEX: u8 = 126;

/// Closed enumeration of logical field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Bool,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int32,
    Int64,
    Float32,
    Float64,
    Timestamp,
    Text,
    Binary,
    StructRef,
}

impl LogicalType {
    /// Parse the wire-format type name used in schema documents.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => Self::Bool,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "timestamp" => Self::Timestamp,
            "text" => Self::Text,
            "binary" => Self::Binary,
            "struct-ref" => Self::StructRef,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Timestamp => "timestamp",
            Self::Text => "text",
            Self::Binary => "binary",
            Self::StructRef => "struct-ref",
        }
    }

    /// Only these five types may be list-typed.
    pub fn list_capable(self) -> bool {
        matches!(
            self,
            Self::Float32 | Self::Float64 | Self::Text | Self::Binary | Self::StructRef
        )
    }
}

/// A single field within a [`Struct`]. `index` is also the field's
/// position in `Struct::fields` — the wire index.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub index: u8,
    pub logical_type: LogicalType,
    pub is_list: bool,
    /// Name of the referenced struct, set iff `logical_type` is `StructRef`.
    pub type_ref: Option<String>,
}

/// A struct definition: title-cased name plus its ordered field list.
/// Field order is significant — it is both the declaration order the
/// Emitter walks and the wire index assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Struct {
    pub fn field_by_index(&self, index: u8) -> Option<&Field> {
        self.fields.iter().find(|f| f.index == index)
    }
}

/// A package: a namespace holding structs plus the compile-time caps
/// every struct in it shares.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub structs: Vec<Struct>,
    pub size_max: u64,
    pub list_max: u64,
    pub has_list: bool,
    pub has_timestamp: bool,
}

impl Package {
    pub fn struct_by_name(&self, name: &str) -> Option<&Struct> {
        self.structs.iter().find(|s| s.name == name)
    }
}

/// Top-level resolved schema: every package the generator was asked to
/// emit. Read-only after [`crate::schema_doc::resolve`] hands it off.
#[derive(Debug, Clone)]
pub struct Schema {
    pub packages: Vec<Package>,
}

impl Schema {
    pub fn package_by_name(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }
}
