//! The Type Mapper: a pure function from (logical type, list-ness, type
//! reference, target language) to the target's native type plus a couple
//! of booleans the Emitter needs at every call site. Mirrors a
//! `type_helpers::map_type` dispatch style — one `match` arm per logical
//! kind, no hidden state.
use crate::model::LogicalType;

/// The two exemplar emitter families: a statically-typed, JVM-style
/// target (Java) and a dynamically-typed, ECMAScript-style target.
/// `uint8`/`uint16` are only ever routed through `Dynamic`; the `Static`
/// target collapses every integer kind into `uint32/uint64/int32/int64`
/// upstream, before the mapper is ever consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetLang {
    Static,
    Dynamic,
}

/// The native type chosen for a field, plus the two facts the Emitter
/// needs to decide how to initialize and null-check it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    pub name: String,
    /// Whether the zero value of this type needs an explicit shared
    /// sentinel constant rather than a language literal (the Java
    /// template's `_zero<Field>` arrays).
    pub needs_zero_sentinel: bool,
    /// Whether the native type is nullable/reference-like in its target
    /// language (struct-refs, lists, and `binary` in the static target;
    /// struct-refs and lists in the dynamic one).
    pub is_reference_type: bool,
}

impl NativeType {
    fn value(name: &str) -> Self {
        NativeType {
            name: name.to_string(),
            needs_zero_sentinel: false,
            is_reference_type: false,
        }
    }

    fn reference(name: &str) -> Self {
        NativeType {
            name: name.to_string(),
            needs_zero_sentinel: false,
            is_reference_type: true,
        }
    }

    fn reference_with_sentinel(name: &str) -> Self {
        NativeType {
            name: name.to_string(),
            needs_zero_sentinel: true,
            is_reference_type: true,
        }
    }
}

/// Map one field's shape to its native representation. `type_ref` is the
/// referenced struct's fully-qualified name, required iff `logical_type`
/// is `StructRef`.
pub fn map_type(
    logical_type: LogicalType,
    is_list: bool,
    type_ref: Option<&str>,
    target: TargetLang,
) -> NativeType {
    if is_list {
        return map_list_type(logical_type, type_ref, target);
    }

    match (target, logical_type) {
        (TargetLang::Static, LogicalType::Bool) => NativeType::value("boolean"),
        (TargetLang::Static, LogicalType::Uint32 | LogicalType::Int32) => NativeType::value("int"),
        (TargetLang::Static, LogicalType::Uint64 | LogicalType::Int64) => NativeType::value("long"),
        (TargetLang::Static, LogicalType::Float32) => NativeType::value("float"),
        (TargetLang::Static, LogicalType::Float64) => NativeType::value("double"),
        (TargetLang::Static, LogicalType::Timestamp) => NativeType::reference("java.time.Instant"),
        (TargetLang::Static, LogicalType::Text) => NativeType::value("String"),
        (TargetLang::Static, LogicalType::Binary) => NativeType::reference_with_sentinel("byte[]"),
        (TargetLang::Static, LogicalType::StructRef) => {
            NativeType::reference(type_ref.expect("struct-ref field always carries a type_ref"))
        }
        // uint8/uint16 never reach the statically typed target; the
        // mapper still answers with their natural width so a caller
        // that bypasses schema validation fails loudly rather than
        // silently widening.
        (TargetLang::Static, LogicalType::Uint8) => NativeType::value("byte"),
        (TargetLang::Static, LogicalType::Uint16) => NativeType::value("short"),

        (TargetLang::Dynamic, LogicalType::Bool) => NativeType::value("boolean"),
        (TargetLang::Dynamic, LogicalType::Timestamp) => NativeType::reference("Date"),
        (TargetLang::Dynamic, LogicalType::Text) => NativeType::value("string"),
        (TargetLang::Dynamic, LogicalType::Binary) => NativeType::reference_with_sentinel("Uint8Array"),
        (TargetLang::Dynamic, LogicalType::StructRef) => {
            NativeType::reference(type_ref.expect("struct-ref field always carries a type_ref"))
        }
        // Every remaining numeric kind collapses to one IEEE-754 double;
        // integers above 2^53 are a runtime range check, not a distinct
        // native type.
        (TargetLang::Dynamic, _) => NativeType::value("number"),
    }
}

fn map_list_type(logical_type: LogicalType, type_ref: Option<&str>, target: TargetLang) -> NativeType {
    match (target, logical_type) {
        (TargetLang::Static, LogicalType::Float32) => NativeType::reference_with_sentinel("float[]"),
        (TargetLang::Static, LogicalType::Float64) => NativeType::reference_with_sentinel("double[]"),
        (TargetLang::Static, LogicalType::Text) => NativeType::reference_with_sentinel("String[]"),
        (TargetLang::Static, LogicalType::Binary) => NativeType::reference_with_sentinel("byte[][]"),
        (TargetLang::Static, LogicalType::StructRef) => {
            let referent = type_ref.expect("struct-ref field always carries a type_ref");
            NativeType::reference_with_sentinel(&format!("{referent}[]"))
        }
        (TargetLang::Static, other) => unreachable!("{other:?} is not list-capable"),

        (TargetLang::Dynamic, LogicalType::Float32) => NativeType::reference("Float32Array"),
        (TargetLang::Dynamic, LogicalType::Float64) => NativeType::reference("Float64Array"),
        (TargetLang::Dynamic, LogicalType::Text) => NativeType::reference("Array"),
        (TargetLang::Dynamic, LogicalType::Binary) => NativeType::reference("Array"),
        (TargetLang::Dynamic, LogicalType::StructRef) => NativeType::reference("Array"),
        (TargetLang::Dynamic, other) => unreachable!("{other:?} is not list-capable"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_integers_collapse_to_int_and_long() {
        assert_eq!(
            map_type(LogicalType::Uint32, false, None, TargetLang::Static).name,
            "int"
        );
        assert_eq!(
            map_type(LogicalType::Int64, false, None, TargetLang::Static).name,
            "long"
        );
    }

    #[test]
    fn dynamic_numbers_collapse_to_one_type() {
        for lt in [
            LogicalType::Uint8,
            LogicalType::Uint16,
            LogicalType::Uint32,
            LogicalType::Uint64,
            LogicalType::Int32,
            LogicalType::Int64,
            LogicalType::Float32,
            LogicalType::Float64,
        ] {
            assert_eq!(map_type(lt, false, None, TargetLang::Dynamic).name, "number");
        }
    }

    #[test]
    fn struct_ref_is_a_reference_type_in_both_targets() {
        assert!(map_type(LogicalType::StructRef, false, Some("User"), TargetLang::Static).is_reference_type);
        assert!(map_type(LogicalType::StructRef, false, Some("User"), TargetLang::Dynamic).is_reference_type);
    }

    #[test]
    fn binary_needs_a_zero_sentinel_in_the_static_target() {
        assert!(map_type(LogicalType::Binary, false, None, TargetLang::Static).needs_zero_sentinel);
    }
}
