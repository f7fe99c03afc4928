//! Deserializes a resolved schema document (JSON) into the [`crate::model`]
//! types, validating the structural invariants along the way.
//!
//! The schema *grammar* — whatever produces this JSON from a `.colf`
//! source file — is out of scope; this module only has to turn an
//! already-resolved document into a read-only [`crate::model::Schema`]
//! and reject anything that would violate the wire format's invariants.
//! Mirrors a `domain` module of serde `Deserialize` structs feeding a
//! `type_helpers` validation pass, generalized from a single CANboat
//! database to Colfer's schema documents.
use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use crate::model::{Field, LogicalType, Package, Schema, Struct, DEFAULT_LIST_MAX, DEFAULT_SIZE_MAX, MAX_FIELD_INDEX};

/// Failures discovered while resolving a schema document into the Schema
/// Model. Each variant names the offending package/struct/field so a
/// caller can report it without re-walking the document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("package {package:?} declares duplicate struct {name:?}")]
    DuplicateStruct { package: String, name: String },

    #[error("{package}::{strct} declares duplicate field index {index}")]
    DuplicateFieldIndex {
        package: String,
        strct: String,
        index: u8,
    },

    #[error("{package}::{strct} field {field:?} has index {index}, but indices must be < 127 (127 is the end-of-struct sentinel)")]
    FieldIndexOutOfRange {
        package: String,
        strct: String,
        field: String,
        index: u16,
    },

    #[error("{package}::{strct} field {field:?} has unknown type {type_name:?}")]
    UnknownType {
        package: String,
        strct: String,
        field: String,
        type_name: String,
    },

    #[error("{package}::{strct} field {field:?} is a list of {type_name}, but only float32, float64, text, binary and struct-ref may be list-typed")]
    NonListableType {
        package: String,
        strct: String,
        field: String,
        type_name: String,
    },

    #[error("{package}::{strct} field {field:?} is struct-ref but names no type_ref")]
    MissingTypeRef {
        package: String,
        strct: String,
        field: String,
    },

    #[error("{package}::{strct} field {field:?} references unknown struct {type_ref:?}")]
    UnresolvedTypeRef {
        package: String,
        strct: String,
        field: String,
        type_ref: String,
    },
}

#[derive(Debug, Deserialize)]
pub struct SchemaDocument {
    pub packages: Vec<PackageDoc>,
}

#[derive(Debug, Deserialize)]
pub struct PackageDoc {
    pub name: String,
    #[serde(default)]
    pub size_max: Option<u64>,
    #[serde(default)]
    pub list_max: Option<u64>,
    pub structs: Vec<StructDoc>,
}

#[derive(Debug, Deserialize)]
pub struct StructDoc {
    pub name: String,
    pub fields: Vec<FieldDoc>,
}

#[derive(Debug, Deserialize)]
pub struct FieldDoc {
    pub name: String,
    pub index: u16,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, rename = "list")]
    pub is_list: bool,
    #[serde(default)]
    pub type_ref: Option<String>,
}

/// Parse a schema document from its JSON text representation.
pub fn parse(json: &str) -> Result<SchemaDocument, serde_json::Error> {
    serde_json::from_str(json)
}

/// Resolve a parsed [`SchemaDocument`] into a read-only [`Schema`],
/// enforcing unique/in-range field indices, the closed type set, and the
/// list-capable type restriction.
pub fn resolve(doc: SchemaDocument) -> Result<Schema, SchemaError> {
    let mut packages = Vec::with_capacity(doc.packages.len());
    for pkg_doc in doc.packages {
        packages.push(resolve_package(pkg_doc)?);
    }
    Ok(Schema { packages })
}

fn resolve_package(pkg_doc: PackageDoc) -> Result<Package, SchemaError> {
    let struct_names: HashSet<&str> = pkg_doc.structs.iter().map(|s| s.name.as_str()).collect();

    let mut seen_names = HashSet::new();
    let mut structs = Vec::with_capacity(pkg_doc.structs.len());
    let mut has_list = false;
    let mut has_timestamp = false;

    for struct_doc in &pkg_doc.structs {
        if !seen_names.insert(struct_doc.name.clone()) {
            return Err(SchemaError::DuplicateStruct {
                package: pkg_doc.name.clone(),
                name: struct_doc.name.clone(),
            });
        }
        let resolved = resolve_struct(&pkg_doc.name, struct_doc, &struct_names)?;
        has_list |= resolved.fields.iter().any(|f| f.is_list);
        has_timestamp |= resolved
            .fields
            .iter()
            .any(|f| f.logical_type == LogicalType::Timestamp);
        structs.push(resolved);
    }

    Ok(Package {
        name: pkg_doc.name,
        structs,
        size_max: pkg_doc.size_max.unwrap_or(DEFAULT_SIZE_MAX),
        list_max: pkg_doc.list_max.unwrap_or(DEFAULT_LIST_MAX),
        has_list,
        has_timestamp,
    })
}

fn resolve_struct(
    package: &str,
    struct_doc: &StructDoc,
    struct_names: &HashSet<&str>,
) -> Result<Struct, SchemaError> {
    let mut seen_indices = HashSet::new();
    let mut fields = Vec::with_capacity(struct_doc.fields.len());

    for field_doc in &struct_doc.fields {
        if field_doc.index > MAX_FIELD_INDEX as u16 {
            return Err(SchemaError::FieldIndexOutOfRange {
                package: package.to_string(),
                strct: struct_doc.name.clone(),
                field: field_doc.name.clone(),
                index: field_doc.index,
            });
        }
        let index = field_doc.index as u8;
        if !seen_indices.insert(index) {
            return Err(SchemaError::DuplicateFieldIndex {
                package: package.to_string(),
                strct: struct_doc.name.clone(),
                index,
            });
        }

        let logical_type =
            LogicalType::from_name(&field_doc.type_name).ok_or_else(|| SchemaError::UnknownType {
                package: package.to_string(),
                strct: struct_doc.name.clone(),
                field: field_doc.name.clone(),
                type_name: field_doc.type_name.clone(),
            })?;

        if field_doc.is_list && !logical_type.list_capable() {
            return Err(SchemaError::NonListableType {
                package: package.to_string(),
                strct: struct_doc.name.clone(),
                field: field_doc.name.clone(),
                type_name: field_doc.type_name.clone(),
            });
        }

        if logical_type == LogicalType::StructRef {
            let type_ref = field_doc.type_ref.clone().ok_or_else(|| SchemaError::MissingTypeRef {
                package: package.to_string(),
                strct: struct_doc.name.clone(),
                field: field_doc.name.clone(),
            })?;
            if !struct_names.contains(type_ref.as_str()) {
                return Err(SchemaError::UnresolvedTypeRef {
                    package: package.to_string(),
                    strct: struct_doc.name.clone(),
                    field: field_doc.name.clone(),
                    type_ref,
                });
            }
        }

        fields.push(Field {
            name: field_doc.name.clone(),
            index,
            logical_type,
            is_list: field_doc.is_list,
            type_ref: field_doc.type_ref.clone(),
        });
    }

    fields.sort_by_key(|f| f.index);

    Ok(Struct {
        name: struct_doc.name.clone(),
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(json: &str) -> SchemaDocument {
        parse(json).expect("valid json")
    }

    #[test]
    fn resolves_a_minimal_schema() {
        let schema = resolve(doc(
            r#"{"packages":[{"name":"pkg","structs":[{"name":"Item","fields":[
                {"name":"id","index":0,"type":"uint32"}
            ]}]}]}"#,
        ))
        .unwrap();
        let pkg = &schema.packages[0];
        assert_eq!(pkg.size_max, DEFAULT_SIZE_MAX);
        assert_eq!(pkg.list_max, DEFAULT_LIST_MAX);
        assert!(!pkg.has_list);
        assert_eq!(pkg.structs[0].fields[0].logical_type, LogicalType::Uint32);
    }

    #[test]
    fn rejects_duplicate_field_index() {
        let err = resolve(doc(
            r#"{"packages":[{"name":"pkg","structs":[{"name":"Item","fields":[
                {"name":"a","index":0,"type":"uint32"},
                {"name":"b","index":0,"type":"text"}
            ]}]}]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateFieldIndex { index: 0, .. }));
    }

    #[test]
    fn rejects_field_index_127() {
        let err = resolve(doc(
            r#"{"packages":[{"name":"pkg","structs":[{"name":"Item","fields":[
                {"name":"a","index":127,"type":"uint32"}
            ]}]}]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, SchemaError::FieldIndexOutOfRange { index: 127, .. }));
    }

    #[test]
    fn rejects_scalar_list_of_non_listable_type() {
        let err = resolve(doc(
            r#"{"packages":[{"name":"pkg","structs":[{"name":"Item","fields":[
                {"name":"a","index":0,"type":"uint32","list":true}
            ]}]}]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, SchemaError::NonListableType { .. }));
    }

    #[test]
    fn rejects_unresolved_struct_ref() {
        let err = resolve(doc(
            r#"{"packages":[{"name":"pkg","structs":[{"name":"Item","fields":[
                {"name":"a","index":0,"type":"struct-ref","type_ref":"Missing"}
            ]}]}]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedTypeRef { .. }));
    }

    #[test]
    fn has_timestamp_flag_is_set() {
        let schema = resolve(doc(
            r#"{"packages":[{"name":"pkg","structs":[{"name":"Item","fields":[
                {"name":"t","index":0,"type":"timestamp"}
            ]}]}]}"#,
        ))
        .unwrap();
        assert!(schema.packages[0].has_timestamp);
    }
}
