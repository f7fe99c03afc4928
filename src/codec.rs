//! The generic reference runtime: a schema-driven `encode`/`decode` pair
//! that implements the Colfer wire format exactly, without generating any
//! code. Since Rust is not one of Colfer's two exemplar emitter targets,
//! this plays the role a generic `serialize`/`deserialize_into` engine
//! plays for a message database — a generic dispatch over a descriptor,
//! here [`Struct`], instead of per-message generated code — and doubles
//! as the oracle the emitted Java/ECMAScript sources are tested against.
use crate::error::CodecError;
use crate::model::{Field, LogicalType, Package, Struct};
use crate::wire::{ByteReader, ByteWriter, FORMAT_FLAG, SENTINEL, UINT16_SMALL_MAX, UINT32_VARINT_MAX, UINT64_VARINT_MAX};

/// A dynamically-typed field value, generalized across the closed
/// logical-type set. Borrows `'s` from the [`Package`] that owns the
/// struct descriptors it points into.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'s> {
    Bool(bool),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    /// `ns` is always in `[0, 10^9)`; `secs` may be negative (pre-epoch).
    Timestamp { secs: i64, nanos: u32 },
    Text(String),
    Binary(Vec<u8>),
    StructRef(Option<Box<Instance<'s>>>),
    ListFloat32(Vec<f32>),
    ListFloat64(Vec<f64>),
    /// `None` elements are replaced with `Some(String::new())` the
    /// moment they are encoded; the replacement is visible in this
    /// vector afterwards.
    ListText(Vec<Option<String>>),
    ListBinary(Vec<Option<Vec<u8>>>),
    /// Carries the referenced struct's descriptor alongside the element
    /// vector so a `None` slot can be replaced with a freshly
    /// zero-valued instance during encoding without a separate schema
    /// lookup.
    ListStructRef(&'s Struct, Vec<Option<Instance<'s>>>),
}

impl<'s> Value<'s> {
    /// The zero value for `field`: numeric zero, `false`, empty
    /// string/bytes/list, or `None` for a struct-ref.
    pub fn zero_of(field: &Field, package: &'s Package) -> Self {
        if field.is_list {
            return match field.logical_type {
                LogicalType::Float32 => Value::ListFloat32(Vec::new()),
                LogicalType::Float64 => Value::ListFloat64(Vec::new()),
                LogicalType::Text => Value::ListText(Vec::new()),
                LogicalType::Binary => Value::ListBinary(Vec::new()),
                LogicalType::StructRef => {
                    let referent = resolve_type_ref(field, package)
                        .expect("schema_doc::resolve validated type_ref");
                    Value::ListStructRef(referent, Vec::new())
                }
                other => unreachable!("{other:?} is not list-capable; rejected at schema resolution"),
            };
        }
        match field.logical_type {
            LogicalType::Bool => Value::Bool(false),
            LogicalType::Uint8 => Value::Uint8(0),
            LogicalType::Uint16 => Value::Uint16(0),
            LogicalType::Uint32 => Value::Uint32(0),
            LogicalType::Uint64 => Value::Uint64(0),
            LogicalType::Int32 => Value::Int32(0),
            LogicalType::Int64 => Value::Int64(0),
            LogicalType::Float32 => Value::Float32(0.0),
            LogicalType::Float64 => Value::Float64(0.0),
            LogicalType::Timestamp => Value::Timestamp { secs: 0, nanos: 0 },
            LogicalType::Text => Value::Text(String::new()),
            LogicalType::Binary => Value::Binary(Vec::new()),
            LogicalType::StructRef => Value::StructRef(None),
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Value::Bool(b) => !*b,
            Value::Uint8(v) => *v == 0,
            Value::Uint16(v) => *v == 0,
            Value::Uint32(v) => *v == 0,
            Value::Uint64(v) => *v == 0,
            Value::Int32(v) => *v == 0,
            Value::Int64(v) => *v == 0,
            Value::Float32(v) => *v == 0.0,
            Value::Float64(v) => *v == 0.0,
            Value::Timestamp { secs, nanos } => *secs == 0 && *nanos == 0,
            Value::Text(s) => s.is_empty(),
            Value::Binary(b) => b.is_empty(),
            Value::StructRef(r) => r.is_none(),
            Value::ListFloat32(v) => v.is_empty(),
            Value::ListFloat64(v) => v.is_empty(),
            Value::ListText(v) => v.is_empty(),
            Value::ListBinary(v) => v.is_empty(),
            Value::ListStructRef(_, v) => v.is_empty(),
        }
    }
}

/// A struct instance: its descriptor plus one [`Value`] per field,
/// aligned by declaration order (`descriptor.fields[i]` describes
/// `fields[i]`).
#[derive(Debug, Clone, PartialEq)]
pub struct Instance<'s> {
    pub descriptor: &'s Struct,
    pub fields: Vec<Value<'s>>,
}

impl<'s> Instance<'s> {
    /// Build an all-zero instance of `descriptor` (the emitted
    /// constructor/initializer behavior, plus the value this crate uses
    /// to repair `None` struct-ref list elements during encoding).
    pub fn zero(descriptor: &'s Struct, package: &'s Package) -> Self {
        let fields = descriptor
            .fields
            .iter()
            .map(|f| Value::zero_of(f, package))
            .collect();
        Instance { descriptor, fields }
    }

    pub fn field(&self, name: &str) -> Option<&Value<'s>> {
        let idx = self.descriptor.fields.iter().position(|f| f.name == name)?;
        self.fields.get(idx)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Value<'s>> {
        let idx = self.descriptor.fields.iter().position(|f| f.name == name)?;
        self.fields.get_mut(idx)
    }
}

/// Whether `field`'s tag byte legitimately uses the format-flag bit:
/// unused for `bool`/`uint8`, the list-capable types, and `struct-ref`;
/// selects a second representation for everything else.
fn has_big_representation(field: &Field) -> bool {
    if field.is_list {
        return false;
    }
    matches!(
        field.logical_type,
        LogicalType::Uint16
            | LogicalType::Uint32
            | LogicalType::Uint64
            | LogicalType::Int32
            | LogicalType::Int64
            | LogicalType::Timestamp
    )
}

fn resolve_type_ref<'s>(field: &Field, package: &'s Package) -> Option<&'s Struct> {
    package.struct_by_name(field.type_ref.as_deref()?)
}

/// Encode `instance` into its wire representation. Takes `&mut` because
/// list fields of `text`, `binary` and `struct-ref` may have their
/// `None` elements replaced in place — a caller that
/// cares can inspect `instance` afterwards to see the repaired list.
pub fn encode(instance: &mut Instance, package: &Package) -> Result<Vec<u8>, CodecError> {
    let mut writer = ByteWriter::new(package.size_max);
    encode_into(instance, &mut writer, package.list_max)?;
    Ok(writer.into_bytes())
}

fn encode_into(instance: &mut Instance, writer: &mut ByteWriter, list_max: u64) -> Result<(), CodecError> {
    let struct_name = instance.descriptor.name.clone();
    let fields = instance.descriptor.fields.clone();
    for (i, field) in fields.iter().enumerate() {
        encode_field(&struct_name, field, &mut instance.fields[i], writer, list_max)?;
    }
    writer.write_u8(SENTINEL, &struct_name, "<sentinel>")
}

fn check_list_cap(len: usize, list_max: u64, struct_name: &str, field: &str) -> Result<(), CodecError> {
    if len as u64 > list_max {
        return Err(CodecError::Overflow {
            context: format!("{struct_name}::{field}"),
            detail: format!("list length {len} exceeds list_max ({list_max})"),
        });
    }
    Ok(())
}

/// A length prefix decoded off the wire that claims more bytes than the
/// package's `size_max` is rejected before it is used to allocate
/// anything, the decode-side mirror of `ByteWriter::check_cap`.
fn check_size_cap(len: usize, size_max: u64, struct_name: &str, field: &str) -> Result<(), CodecError> {
    if len as u64 > size_max {
        return Err(CodecError::Overflow {
            context: format!("{struct_name}::{field}"),
            detail: format!("claimed length {len} exceeds size_max ({size_max})"),
        });
    }
    Ok(())
}

fn encode_field(
    struct_name: &str,
    field: &Field,
    value: &mut Value,
    writer: &mut ByteWriter,
    list_max: u64,
) -> Result<(), CodecError> {
    let name = field.name.as_str();
    let tag = field.index;
    if value.is_zero() {
        return Ok(());
    }
    match value {
        Value::Bool(_) => writer.write_u8(tag, struct_name, name)?,
        Value::Uint8(v) => {
            writer.write_u8(tag, struct_name, name)?;
            writer.write_u8(*v, struct_name, name)?;
        }
        Value::Uint16(v) => {
            if *v < UINT16_SMALL_MAX {
                writer.write_u8(tag | FORMAT_FLAG, struct_name, name)?;
                writer.write_u8(*v as u8, struct_name, name)?;
            } else {
                writer.write_u8(tag, struct_name, name)?;
                writer.write_u16_be(*v, struct_name, name)?;
            }
        }
        Value::Uint32(v) => {
            if *v < UINT32_VARINT_MAX {
                writer.write_u8(tag, struct_name, name)?;
                writer.write_varint(*v as u64, struct_name, name)?;
            } else {
                writer.write_u8(tag | FORMAT_FLAG, struct_name, name)?;
                writer.write_u32_be(*v, struct_name, name)?;
            }
        }
        Value::Uint64(v) => {
            if *v < UINT64_VARINT_MAX {
                writer.write_u8(tag, struct_name, name)?;
                writer.write_varint(*v, struct_name, name)?;
            } else {
                writer.write_u8(tag | FORMAT_FLAG, struct_name, name)?;
                writer.write_u64_be(*v, struct_name, name)?;
            }
        }
        Value::Int32(v) => {
            let negative = *v < 0;
            writer.write_u8(if negative { tag | FORMAT_FLAG } else { tag }, struct_name, name)?;
            writer.write_varint((*v as i64).unsigned_abs(), struct_name, name)?;
        }
        Value::Int64(v) => {
            let negative = *v < 0;
            writer.write_u8(if negative { tag | FORMAT_FLAG } else { tag }, struct_name, name)?;
            writer.write_varint(v.unsigned_abs(), struct_name, name)?;
        }
        Value::Float32(v) => {
            writer.write_u8(tag, struct_name, name)?;
            writer.write_f32_be(*v, struct_name, name)?;
        }
        Value::Float64(v) => {
            writer.write_u8(tag, struct_name, name)?;
            writer.write_f64_be(*v, struct_name, name)?;
        }
        Value::Timestamp { secs, nanos } => {
            if *secs >= 0 && *secs < (1i64 << 32) {
                writer.write_u8(tag, struct_name, name)?;
                writer.write_u32_be(*secs as u32, struct_name, name)?;
                writer.write_u32_be(*nanos, struct_name, name)?;
            } else {
                writer.write_u8(tag | FORMAT_FLAG, struct_name, name)?;
                writer.write_i64_be(*secs, struct_name, name)?;
                writer.write_u32_be(*nanos, struct_name, name)?;
            }
        }
        Value::Text(s) => {
            writer.write_u8(tag, struct_name, name)?;
            writer.write_varint(s.len() as u64, struct_name, name)?;
            writer.write_bytes(s.as_bytes(), struct_name, name)?;
        }
        Value::Binary(b) => {
            writer.write_u8(tag, struct_name, name)?;
            writer.write_varint(b.len() as u64, struct_name, name)?;
            writer.write_bytes(b, struct_name, name)?;
        }
        Value::StructRef(inner) => {
            let instance = inner.as_mut().expect("non-zero StructRef carries an instance");
            writer.write_u8(tag, struct_name, name)?;
            encode_into(instance, writer, list_max)?;
        }
        Value::ListFloat32(items) => {
            check_list_cap(items.len(), list_max, struct_name, name)?;
            writer.write_u8(tag, struct_name, name)?;
            writer.write_varint(items.len() as u64, struct_name, name)?;
            for v in items.iter() {
                writer.write_f32_be(*v, struct_name, name)?;
            }
        }
        Value::ListFloat64(items) => {
            check_list_cap(items.len(), list_max, struct_name, name)?;
            writer.write_u8(tag, struct_name, name)?;
            writer.write_varint(items.len() as u64, struct_name, name)?;
            for v in items.iter() {
                writer.write_f64_be(*v, struct_name, name)?;
            }
        }
        Value::ListText(items) => {
            for slot in items.iter_mut() {
                if slot.is_none() {
                    *slot = Some(String::new());
                }
            }
            check_list_cap(items.len(), list_max, struct_name, name)?;
            writer.write_u8(tag, struct_name, name)?;
            writer.write_varint(items.len() as u64, struct_name, name)?;
            for slot in items.iter() {
                let s = slot.as_ref().unwrap();
                writer.write_varint(s.len() as u64, struct_name, name)?;
                writer.write_bytes(s.as_bytes(), struct_name, name)?;
            }
        }
        Value::ListBinary(items) => {
            for slot in items.iter_mut() {
                if slot.is_none() {
                    *slot = Some(Vec::new());
                }
            }
            check_list_cap(items.len(), list_max, struct_name, name)?;
            writer.write_u8(tag, struct_name, name)?;
            writer.write_varint(items.len() as u64, struct_name, name)?;
            for slot in items.iter() {
                let b = slot.as_ref().unwrap();
                writer.write_varint(b.len() as u64, struct_name, name)?;
                writer.write_bytes(b, struct_name, name)?;
            }
        }
        Value::ListStructRef(referent, items) => {
            for slot in items.iter_mut() {
                if slot.is_none() {
                    *slot = Some(zero_instance_for(referent));
                }
            }
            check_list_cap(items.len(), list_max, struct_name, name)?;
            writer.write_u8(tag, struct_name, name)?;
            writer.write_varint(items.len() as u64, struct_name, name)?;
            for slot in items.iter_mut() {
                encode_into(slot.as_mut().unwrap(), writer, list_max)?;
            }
        }
    }
    Ok(())
}

/// Build a zero instance for `referent` without a `Package` in scope —
/// used only to repair `None` list elements, where every nested field
/// of the synthesized instance is itself zero and therefore needs no
/// package-level lookup beyond what `referent.fields` already carries.
fn zero_instance_for<'s>(referent: &'s Struct) -> Instance<'s> {
    let fields = referent
        .fields
        .iter()
        .map(|f| zero_value_without_package(f))
        .collect();
    Instance {
        descriptor: referent,
        fields,
    }
}

fn zero_value_without_package<'s>(field: &Field) -> Value<'s> {
    if field.is_list {
        return match field.logical_type {
            LogicalType::Float32 => Value::ListFloat32(Vec::new()),
            LogicalType::Float64 => Value::ListFloat64(Vec::new()),
            LogicalType::Text => Value::ListText(Vec::new()),
            LogicalType::Binary => Value::ListBinary(Vec::new()),
            // A zero-valued struct-ref list element can never itself need
            // repairing (empty lists need no referent descriptor), so this
            // path is unreachable for well-formed schemas.
            LogicalType::StructRef => unreachable!(
                "a struct-ref list inside a synthesized zero instance is always empty"
            ),
            other => unreachable!("{other:?} is not list-capable"),
        };
    }
    match field.logical_type {
        LogicalType::Bool => Value::Bool(false),
        LogicalType::Uint8 => Value::Uint8(0),
        LogicalType::Uint16 => Value::Uint16(0),
        LogicalType::Uint32 => Value::Uint32(0),
        LogicalType::Uint64 => Value::Uint64(0),
        LogicalType::Int32 => Value::Int32(0),
        LogicalType::Int64 => Value::Int64(0),
        LogicalType::Float32 => Value::Float32(0.0),
        LogicalType::Float64 => Value::Float64(0.0),
        LogicalType::Timestamp => Value::Timestamp { secs: 0, nanos: 0 },
        LogicalType::Text => Value::Text(String::new()),
        LogicalType::Binary => Value::Binary(Vec::new()),
        LogicalType::StructRef => Value::StructRef(None),
    }
}

/// Decode one struct instance of `descriptor` from the front of `reader`.
pub fn decode<'s>(
    reader: &mut ByteReader,
    descriptor: &'s Struct,
    package: &'s Package,
) -> Result<Instance<'s>, CodecError> {
    let mut instance = Instance::zero(descriptor, package);
    let mut header = reader.read_u8("header")?;

    for (i, field) in descriptor.fields.iter().enumerate() {
        let small_tag = field.index;
        let big_tag = field.index | FORMAT_FLAG;
        let matches_small = header == small_tag;
        let matches_big = has_big_representation(field) && header == big_tag;
        if matches_small || matches_big {
            instance.fields[i] = decode_field(reader, &descriptor.name, field, matches_big, package, package.list_max)?;
            header = reader.read_u8("header")?;
        }
    }

    if header != SENTINEL {
        return Err(CodecError::SchemaMismatch {
            struct_name: descriptor.name.clone(),
            offset: reader.position() - 1,
            detail: format!(
                "header byte {header:#04x} matches neither a known field tag nor the sentinel"
            ),
        });
    }
    Ok(instance)
}

fn decode_field<'s>(
    reader: &mut ByteReader,
    struct_name: &str,
    field: &Field,
    is_big: bool,
    package: &'s Package,
    list_max: u64,
) -> Result<Value<'s>, CodecError> {
    let name = field.name.as_str();
    match (field.logical_type, field.is_list) {
        (LogicalType::Bool, _) => Ok(Value::Bool(true)),
        (LogicalType::Uint8, _) => Ok(Value::Uint8(reader.read_u8(name)?)),
        (LogicalType::Uint16, _) => {
            if is_big {
                Ok(Value::Uint16(reader.read_u8(name)? as u16))
            } else {
                Ok(Value::Uint16(reader.read_u16_be(name)?))
            }
        }
        (LogicalType::Uint32, _) => {
            if is_big {
                Ok(Value::Uint32(reader.read_u32_be(name)?))
            } else {
                Ok(Value::Uint32(reader.read_varint32(name)?))
            }
        }
        (LogicalType::Uint64, _) => {
            if is_big {
                Ok(Value::Uint64(reader.read_u64_be(name)?))
            } else {
                Ok(Value::Uint64(reader.read_varint64(name)?))
            }
        }
        (LogicalType::Int32, _) => {
            let abs = reader.read_varint32(name)?;
            let v = if is_big { -(abs as i64) } else { abs as i64 };
            if v < i32::MIN as i64 || v > i32::MAX as i64 {
                return Err(CodecError::Range {
                    field: field.name.clone(),
                    detail: format!("{v} does not fit in int32"),
                });
            }
            Ok(Value::Int32(v as i32))
        }
        (LogicalType::Int64, _) => {
            let abs = reader.read_varint64(name)?;
            let v = if is_big {
                -(abs as i64)
            } else {
                abs as i64
            };
            Ok(Value::Int64(v))
        }
        (LogicalType::Float32, false) => Ok(Value::Float32(reader.read_f32_be(name)?)),
        (LogicalType::Float64, false) => Ok(Value::Float64(reader.read_f64_be(name)?)),
        (LogicalType::Timestamp, _) => {
            let (secs, nanos) = if is_big {
                (reader.read_i64_be(name)?, reader.read_u32_be(name)?)
            } else {
                (reader.read_u32_be(name)? as i64, reader.read_u32_be(name)?)
            };
            Ok(Value::Timestamp { secs, nanos })
        }
        (LogicalType::Text, false) => {
            let len = reader.read_varint64(name)? as usize;
            check_size_cap(len, package.size_max, struct_name, name)?;
            let bytes = reader.read_exact(len, name)?;
            let s = String::from_utf8(bytes.to_vec()).map_err(|e| CodecError::Encoding {
                struct_name: struct_name.to_string(),
                field: field.name.clone(),
                detail: e.to_string(),
            })?;
            Ok(Value::Text(s))
        }
        (LogicalType::Binary, false) => {
            let len = reader.read_varint64(name)? as usize;
            check_size_cap(len, package.size_max, struct_name, name)?;
            Ok(Value::Binary(reader.read_exact(len, name)?.to_vec()))
        }
        (LogicalType::StructRef, false) => {
            let referent = resolve_type_ref(field, package).ok_or_else(|| CodecError::SchemaMismatch {
                struct_name: struct_name.to_string(),
                offset: reader.position(),
                detail: format!("field {:?} names no resolvable type_ref", field.name),
            })?;
            let nested = decode(reader, referent, package)?;
            Ok(Value::StructRef(Some(Box::new(nested))))
        }
        (LogicalType::Float32, true) => {
            let count = read_list_count(reader, name, list_max)?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(reader.read_f32_be(name)?);
            }
            Ok(Value::ListFloat32(items))
        }
        (LogicalType::Float64, true) => {
            let count = read_list_count(reader, name, list_max)?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(reader.read_f64_be(name)?);
            }
            Ok(Value::ListFloat64(items))
        }
        (LogicalType::Text, true) => {
            let count = read_list_count(reader, name, list_max)?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                let len = reader.read_varint64(name)? as usize;
                check_size_cap(len, package.size_max, struct_name, name)?;
                let bytes = reader.read_exact(len, name)?;
                let s = String::from_utf8(bytes.to_vec()).map_err(|e| CodecError::Encoding {
                    struct_name: struct_name.to_string(),
                    field: field.name.clone(),
                    detail: e.to_string(),
                })?;
                items.push(Some(s));
            }
            Ok(Value::ListText(items))
        }
        (LogicalType::Binary, true) => {
            let count = read_list_count(reader, name, list_max)?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                let len = reader.read_varint64(name)? as usize;
                check_size_cap(len, package.size_max, struct_name, name)?;
                items.push(Some(reader.read_exact(len, name)?.to_vec()));
            }
            Ok(Value::ListBinary(items))
        }
        (LogicalType::StructRef, true) => {
            let referent = resolve_type_ref(field, package).ok_or_else(|| CodecError::SchemaMismatch {
                struct_name: struct_name.to_string(),
                offset: reader.position(),
                detail: format!("field {:?} names no resolvable type_ref", field.name),
            })?;
            let count = read_list_count(reader, name, list_max)?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(Some(decode(reader, referent, package)?));
            }
            Ok(Value::ListStructRef(referent, items))
        }
    }
}

fn read_list_count(reader: &mut ByteReader, context: &str, list_max: u64) -> Result<usize, CodecError> {
    let count = reader.read_varint64(context)?;
    if count > list_max {
        return Err(CodecError::Overflow {
            context: context.to_string(),
            detail: format!("list length {count} exceeds list_max ({list_max})"),
        });
    }
    Ok(count as usize)
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
