//! Statically-typed Emitter target. Walks a `&Package` and produces one
//! Java source string per struct — the CLI decides whether/where to
//! write it.
use std::fmt::Write as _;

use crate::error::CodecError;
use crate::gen::conf::JAVA_FILE_EXT;
use crate::gen::error::GenError;
use crate::gen::naming::escape_java_name;
use crate::model::{Field, LogicalType, Package, Struct};
use crate::type_map::{map_type, TargetLang};

/// One generated file: its relative path under the package directory and
/// its full source text.
pub struct JavaFile {
    pub file_name: String,
    pub source: String,
}

/// Emit one `.java` file per struct in `package`, matching `GenerateJava`'s
/// one-class-per-struct layout.
pub fn emit_package(package: &Package) -> Result<Vec<JavaFile>, GenError> {
    package
        .structs
        .iter()
        .map(|s| emit_struct(package, s).map(|source| JavaFile {
            file_name: format!("{}.{JAVA_FILE_EXT}", s.name),
            source,
        }))
        .collect()
}

fn native_name(field: &Field) -> String {
    map_type(field.logical_type, field.is_list, field.type_ref.as_deref(), TargetLang::Static).name
}

fn zero_literal(field: &Field) -> String {
    let name = escape_java_name(&field.name);
    match (field.logical_type, field.is_list) {
        (_, true) => format!("_zero{name}"),
        (LogicalType::Text, false) => "\"\"".to_string(),
        (LogicalType::Binary, false) => format!("_zero{name}"),
        _ => String::new(),
    }
}

/// `uint8`/`uint16` have no native representation in this target — they
/// only appear in the dynamic-runtime emitter's schema set.
fn check_static_support(s: &Struct) -> Result<(), GenError> {
    for f in &s.fields {
        if matches!(f.logical_type, LogicalType::Uint8 | LogicalType::Uint16) {
            return Err(GenError::Schema {
                context: format!("{}::{}", s.name, f.name),
                source: CodecError::Encoding {
                    struct_name: s.name.clone(),
                    field: f.name.clone(),
                    detail: format!("{:?} has no representation in this target", f.logical_type),
                },
            });
        }
    }
    Ok(())
}

fn emit_struct(package: &Package, s: &Struct) -> Result<String, GenError> {
    check_static_support(s)?;
    let mut out = String::new();
    writeln!(out, "package {};", package.name.replace('/', "."))?;
    writeln!(out)?;
    writeln!(out, "// This file was generated by colf(1); DO NOT EDIT")?;
    writeln!(out)?;
    writeln!(out, "import static java.lang.String.format;")?;
    writeln!(out, "import java.util.InputMismatchException;")?;
    writeln!(out, "import java.nio.BufferOverflowException;")?;
    writeln!(out, "import java.nio.BufferUnderflowException;")?;
    writeln!(out)?;
    writeln!(out, "/**")?;
    writeln!(out, " * Data bean with built-in serialization support.")?;
    writeln!(out, " */")?;
    writeln!(out, "public class {} implements java.io.Serializable {{", s.name)?;
    writeln!(out)?;
    writeln!(out, "\tpublic static int colferSizeMax = {};", package.size_max)?;
    writeln!(out, "\tpublic static int colferListMax = {};", package.list_max)?;
    writeln!(out, "\tprivate static final java.nio.charset.Charset _utf8 = java.nio.charset.Charset.forName(\"UTF-8\");")?;

    for f in &s.fields {
        let name = escape_java_name(&f.name);
        if f.is_list {
            writeln!(out, "\tprivate static final {}[] _zero{} = new {}[0];", native_name(f), name, native_name(f))?;
        } else if f.logical_type == LogicalType::Binary {
            writeln!(out, "\tprivate static final byte[] _zero{name} = new byte[0];")?;
        }
    }
    writeln!(out)?;

    for f in &s.fields {
        let name = escape_java_name(&f.name);
        let ty = native_name(f);
        let zero = zero_literal(f);
        if zero.is_empty() {
            writeln!(out, "\tpublic {ty} {name};")?;
        } else {
            writeln!(out, "\tpublic {ty} {name} = {zero};")?;
        }
    }
    writeln!(out)?;

    emit_marshal(&mut out, s)?;
    writeln!(out)?;
    emit_unmarshal(&mut out, s)?;
    writeln!(out)?;

    for f in &s.fields {
        let name = escape_java_name(&f.name);
        let ty = native_name(f);
        let title = title_case(&name);
        writeln!(out, "\tpublic {ty} get{title}() {{ return this.{name}; }}")?;
        writeln!(out, "\tpublic void set{title}({ty} value) {{ this.{name} = value; }}")?;
    }
    writeln!(out)?;

    emit_equals_and_hash(&mut out, s)?;
    writeln!(out, "}}")?;
    Ok(out)
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) => c.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn emit_marshal(out: &mut String, s: &Struct) -> Result<(), GenError> {
    writeln!(out, "\t/** Serializes the object. */")?;
    writeln!(out, "\tpublic int marshal(byte[] buf, int offset) {{")?;
    writeln!(out, "\t\tint i = offset;")?;
    writeln!(out, "\t\ttry {{")?;
    for f in &s.fields {
        let name = escape_java_name(&f.name);
        let idx = f.index;
        if f.is_list {
            writeln!(out, "\t\t\tif (this.{name}.length != 0) {{")?;
            writeln!(out, "\t\t\t\tbuf[i++] = (byte) {idx};")?;
            writeln!(out, "\t\t\t\tint x = this.{name}.length;")?;
            writeln!(out, "\t\t\t\tif (x > colferListMax) throw new IllegalStateException(format(\"colfer: field {name} length %d exceeds %d elements\", x, colferListMax));")?;
            writeln!(out, "\t\t\t\twhile (x > 0x7f) {{ buf[i++] = (byte) (x | 0x80); x >>>= 7; }}")?;
            writeln!(out, "\t\t\t\tbuf[i++] = (byte) x;")?;
            writeln!(out, "\t\t\t\tfor (int ai = 0; ai < this.{name}.length; ai++) {{ i = this.{name}[ai].marshal(buf, i); }}")?;
            writeln!(out, "\t\t\t}}")?;
            continue;
        }
        match f.logical_type {
            LogicalType::Bool => {
                writeln!(out, "\t\t\tif (this.{name}) buf[i++] = (byte) {idx};")?;
            }
            LogicalType::Uint8 | LogicalType::Uint16 => {
                unreachable!("rejected by check_static_support before emission")
            }
            LogicalType::Uint32 => {
                writeln!(out, "\t\t\tif (this.{name} != 0) {{")?;
                writeln!(out, "\t\t\t\tint x = this.{name};")?;
                writeln!(out, "\t\t\t\tif ((x & ~((1 << 21) - 1)) != 0) {{ buf[i++] = (byte) ({idx} | 0x80); buf[i++] = (byte) (x >>> 24); buf[i++] = (byte) (x >>> 16); buf[i++] = (byte) (x >>> 8); buf[i++] = (byte) x; }}")?;
                writeln!(out, "\t\t\t\telse {{ buf[i++] = (byte) {idx}; while (x > 0x7f) {{ buf[i++] = (byte) (x | 0x80); x >>>= 7; }} buf[i++] = (byte) x; }}")?;
                writeln!(out, "\t\t\t}}")?;
            }
            LogicalType::Uint64 => {
                writeln!(out, "\t\t\tif (this.{name} != 0) {{")?;
                writeln!(out, "\t\t\t\tlong x = this.{name};")?;
                writeln!(out, "\t\t\t\tif ((x & ~((1L << 49) - 1)) != 0) {{ buf[i++] = (byte) ({idx} | 0x80); for (int sh = 56; sh >= 0; sh -= 8) buf[i++] = (byte) (x >>> sh); }}")?;
                writeln!(out, "\t\t\t\telse {{ buf[i++] = (byte) {idx}; while (x > 0x7fL) {{ buf[i++] = (byte) (x | 0x80); x >>>= 7; }} buf[i++] = (byte) x; }}")?;
                writeln!(out, "\t\t\t}}")?;
            }
            LogicalType::Int32 => {
                writeln!(out, "\t\t\tif (this.{name} != 0) {{")?;
                writeln!(out, "\t\t\t\tint x = this.{name};")?;
                writeln!(out, "\t\t\t\tif (x < 0) {{ x = -x; buf[i++] = (byte) ({idx} | 0x80); }} else buf[i++] = (byte) {idx};")?;
                writeln!(out, "\t\t\t\twhile ((x & ~0x7f) != 0) {{ buf[i++] = (byte) (x | 0x80); x >>>= 7; }}")?;
                writeln!(out, "\t\t\t\tbuf[i++] = (byte) x;")?;
                writeln!(out, "\t\t\t}}")?;
            }
            LogicalType::Int64 => {
                writeln!(out, "\t\t\tif (this.{name} != 0) {{")?;
                writeln!(out, "\t\t\t\tlong x = this.{name};")?;
                writeln!(out, "\t\t\t\tif (x < 0) {{ x = -x; buf[i++] = (byte) ({idx} | 0x80); }} else buf[i++] = (byte) {idx};")?;
                writeln!(out, "\t\t\t\tfor (int n = 0; n < 8 && (x & ~0x7fL) != 0; n++) {{ buf[i++] = (byte) (x | 0x80); x >>>= 7; }}")?;
                writeln!(out, "\t\t\t\tbuf[i++] = (byte) x;")?;
                writeln!(out, "\t\t\t}}")?;
            }
            LogicalType::Float32 => {
                writeln!(out, "\t\t\tif (this.{name} != 0.0f) {{ buf[i++] = (byte) {idx}; int x = Float.floatToRawIntBits(this.{name}); buf[i++] = (byte) (x >>> 24); buf[i++] = (byte) (x >>> 16); buf[i++] = (byte) (x >>> 8); buf[i++] = (byte) x; }}")?;
            }
            LogicalType::Float64 => {
                writeln!(out, "\t\t\tif (this.{name} != 0.0) {{ buf[i++] = (byte) {idx}; long x = Double.doubleToRawLongBits(this.{name}); for (int sh = 56; sh >= 0; sh -= 8) buf[i++] = (byte) (x >>> sh); }}")?;
            }
            LogicalType::Timestamp => {
                writeln!(out, "\t\t\tif (this.{name} != null) {{")?;
                writeln!(out, "\t\t\t\tlong s = this.{name}.getEpochSecond(); int ns = this.{name}.getNano();")?;
                writeln!(out, "\t\t\t\tif (s != 0 || ns != 0) {{")?;
                writeln!(out, "\t\t\t\t\tif (s >= 0 && s < (1L << 32)) {{ buf[i++] = (byte) {idx}; buf[i++] = (byte) (s >>> 24); buf[i++] = (byte) (s >>> 16); buf[i++] = (byte) (s >>> 8); buf[i++] = (byte) s; buf[i++] = (byte) (ns >>> 24); buf[i++] = (byte) (ns >>> 16); buf[i++] = (byte) (ns >>> 8); buf[i++] = (byte) ns; }}")?;
                writeln!(out, "\t\t\t\t\telse {{ buf[i++] = (byte) ({idx} | 0x80); for (int sh = 56; sh >= 0; sh -= 8) buf[i++] = (byte) (s >>> sh); buf[i++] = (byte) (ns >>> 24); buf[i++] = (byte) (ns >>> 16); buf[i++] = (byte) (ns >>> 8); buf[i++] = (byte) ns; }}")?;
                writeln!(out, "\t\t\t\t}}")?;
                writeln!(out, "\t\t\t}}")?;
            }
            LogicalType::Text => {
                writeln!(out, "\t\t\tif (!this.{name}.isEmpty()) {{")?;
                writeln!(out, "\t\t\t\tbyte[] utf = this.{name}.getBytes(_utf8);")?;
                writeln!(out, "\t\t\t\tint size = utf.length;")?;
                writeln!(out, "\t\t\t\tif (size > colferSizeMax) throw new IllegalStateException(format(\"colfer: field {name} size %d exceeds %d UTF-8 bytes\", size, colferSizeMax));")?;
                writeln!(out, "\t\t\t\tbuf[i++] = (byte) {idx};")?;
                writeln!(out, "\t\t\t\tint x = size;")?;
                writeln!(out, "\t\t\t\twhile (x > 0x7f) {{ buf[i++] = (byte) (x | 0x80); x >>>= 7; }}")?;
                writeln!(out, "\t\t\t\tbuf[i++] = (byte) x;")?;
                writeln!(out, "\t\t\t\tSystem.arraycopy(utf, 0, buf, i, size); i += size;")?;
                writeln!(out, "\t\t\t}}")?;
            }
            LogicalType::Binary => {
                writeln!(out, "\t\t\tif (this.{name}.length != 0) {{")?;
                writeln!(out, "\t\t\t\tbuf[i++] = (byte) {idx};")?;
                writeln!(out, "\t\t\t\tint size = this.{name}.length;")?;
                writeln!(out, "\t\t\t\tif (size > colferSizeMax) throw new IllegalStateException(format(\"colfer: field {name} size %d exceeds %d bytes\", size, colferSizeMax));")?;
                writeln!(out, "\t\t\t\tint x = size;")?;
                writeln!(out, "\t\t\t\twhile (x > 0x7f) {{ buf[i++] = (byte) (x | 0x80); x >>>= 7; }}")?;
                writeln!(out, "\t\t\t\tbuf[i++] = (byte) x;")?;
                writeln!(out, "\t\t\t\tSystem.arraycopy(this.{name}, 0, buf, i, size); i += size;")?;
                writeln!(out, "\t\t\t}}")?;
            }
            LogicalType::StructRef => {
                writeln!(out, "\t\t\tif (this.{name} != null) {{ buf[i++] = (byte) {idx}; i = this.{name}.marshal(buf, i); }}")?;
            }
        }
    }
    writeln!(out, "\t\t\tbuf[i++] = (byte) 0x7f;")?;
    writeln!(out, "\t\t\treturn i;")?;
    writeln!(out, "\t\t}} catch (IndexOutOfBoundsException e) {{")?;
    writeln!(out, "\t\t\tif (i - offset > colferSizeMax) throw new IllegalStateException(format(\"colfer: serial exceeds %d bytes\", colferSizeMax));")?;
    writeln!(out, "\t\t\tif (i >= buf.length) throw new BufferOverflowException();")?;
    writeln!(out, "\t\t\tthrow e;")?;
    writeln!(out, "\t\t}}")?;
    writeln!(out, "\t}}")?;
    Ok(())
}

fn emit_unmarshal(out: &mut String, s: &Struct) -> Result<(), GenError> {
    writeln!(out, "\t/** Deserializes the object. */")?;
    writeln!(out, "\tpublic int unmarshal(byte[] buf, int offset) {{")?;
    writeln!(out, "\t\tint i = offset;")?;
    writeln!(out, "\t\ttry {{")?;
    writeln!(out, "\t\t\tbyte header = buf[i++];")?;
    for f in &s.fields {
        let name = escape_java_name(&f.name);
        let idx = f.index;
        if f.is_list {
            let ty = native_name(f);
            let elem_ty = ty.trim_end_matches("[]");
            writeln!(out, "\t\t\tif (header == (byte) {idx}) {{")?;
            writeln!(out, "\t\t\t\tint length = 0;")?;
            writeln!(out, "\t\t\t\tfor (int shift = 0; true; shift += 7) {{ byte b = buf[i++]; length |= (b & 0x7f) << shift; if (shift == 28 || b >= 0) break; }}")?;
            writeln!(out, "\t\t\t\tif (length > colferListMax) throw new SecurityException(format(\"colfer: field {name} length %d exceeds %d elements\", length, colferListMax));")?;
            writeln!(out, "\t\t\t\t{elem_ty}[] a = new {elem_ty}[length];")?;
            writeln!(out, "\t\t\t\tfor (int ai = 0; ai < length; ai++) {{ {elem_ty} o = new {elem_ty}(); i = o.unmarshal(buf, i); a[ai] = o; }}")?;
            writeln!(out, "\t\t\t\tthis.{name} = a;")?;
            writeln!(out, "\t\t\t\theader = buf[i++];")?;
            writeln!(out, "\t\t\t}}")?;
            continue;
        }
        match f.logical_type {
            LogicalType::Bool => {
                writeln!(out, "\t\t\tif (header == (byte) {idx}) {{ this.{name} = true; header = buf[i++]; }}")?;
            }
            LogicalType::Uint8 | LogicalType::Uint16 => {
                unreachable!("rejected by check_static_support before emission")
            }
            LogicalType::Uint32 => {
                writeln!(out, "\t\t\tif (header == (byte) {idx}) {{")?;
                writeln!(out, "\t\t\t\tint x = 0;")?;
                writeln!(out, "\t\t\t\tfor (int shift = 0; true; shift += 7) {{ byte b = buf[i++]; x |= (b & 0x7f) << shift; if (shift == 28 || b >= 0) break; }}")?;
                writeln!(out, "\t\t\t\tthis.{name} = x; header = buf[i++];")?;
                writeln!(out, "\t\t\t}} else if (header == (byte) ({idx} | 0x80)) {{")?;
                writeln!(out, "\t\t\t\tthis.{name} = (buf[i++] & 0xff) << 24 | (buf[i++] & 0xff) << 16 | (buf[i++] & 0xff) << 8 | (buf[i++] & 0xff);")?;
                writeln!(out, "\t\t\t\theader = buf[i++];")?;
                writeln!(out, "\t\t\t}}")?;
            }
            LogicalType::Uint64 => {
                writeln!(out, "\t\t\tif (header == (byte) {idx}) {{")?;
                writeln!(out, "\t\t\t\tlong x = 0;")?;
                writeln!(out, "\t\t\t\tfor (int shift = 0; true; shift += 7) {{ byte b = buf[i++]; if (shift == 56 || b >= 0) {{ x |= (b & 0xffL) << shift; break; }} x |= (b & 0x7fL) << shift; }}")?;
                writeln!(out, "\t\t\t\tthis.{name} = x; header = buf[i++];")?;
                writeln!(out, "\t\t\t}} else if (header == (byte) ({idx} | 0x80)) {{")?;
                writeln!(out, "\t\t\t\tlong x = 0; for (int sh = 56; sh >= 0; sh -= 8) x |= (buf[i++] & 0xffL) << sh;")?;
                writeln!(out, "\t\t\t\tthis.{name} = x; header = buf[i++];")?;
                writeln!(out, "\t\t\t}}")?;
            }
            LogicalType::Int32 => {
                writeln!(out, "\t\t\tif (header == (byte) {idx} || header == (byte) ({idx} | 0x80)) {{")?;
                writeln!(out, "\t\t\t\tboolean negative = header == (byte) ({idx} | 0x80);")?;
                writeln!(out, "\t\t\t\tint x = 0;")?;
                writeln!(out, "\t\t\t\tfor (int shift = 0; true; shift += 7) {{ byte b = buf[i++]; x |= (b & 0x7f) << shift; if (shift == 28 || b >= 0) break; }}")?;
                writeln!(out, "\t\t\t\tthis.{name} = negative ? -x : x;")?;
                writeln!(out, "\t\t\t\theader = buf[i++];")?;
                writeln!(out, "\t\t\t}}")?;
            }
            LogicalType::Int64 => {
                writeln!(out, "\t\t\tif (header == (byte) {idx} || header == (byte) ({idx} | 0x80)) {{")?;
                writeln!(out, "\t\t\t\tboolean negative = header == (byte) ({idx} | 0x80);")?;
                writeln!(out, "\t\t\t\tlong x = 0;")?;
                writeln!(out, "\t\t\t\tfor (int shift = 0; true; shift += 7) {{ byte b = buf[i++]; if (shift == 56 || b >= 0) {{ x |= (b & 0xffL) << shift; break; }} x |= (b & 0x7fL) << shift; }}")?;
                writeln!(out, "\t\t\t\tthis.{name} = negative ? -x : x;")?;
                writeln!(out, "\t\t\t\theader = buf[i++];")?;
                writeln!(out, "\t\t\t}}")?;
            }
            LogicalType::Float32 => {
                writeln!(out, "\t\t\tif (header == (byte) {idx}) {{ int x = (buf[i++] & 0xff) << 24 | (buf[i++] & 0xff) << 16 | (buf[i++] & 0xff) << 8 | (buf[i++] & 0xff); this.{name} = Float.intBitsToFloat(x); header = buf[i++]; }}")?;
            }
            LogicalType::Float64 => {
                writeln!(out, "\t\t\tif (header == (byte) {idx}) {{ long x = 0; for (int sh = 56; sh >= 0; sh -= 8) x |= (buf[i++] & 0xffL) << sh; this.{name} = Double.longBitsToDouble(x); header = buf[i++]; }}")?;
            }
            LogicalType::Timestamp => {
                writeln!(out, "\t\t\tif (header == (byte) {idx}) {{")?;
                writeln!(out, "\t\t\t\tlong s = (buf[i++] & 0xffL) << 24 | (buf[i++] & 0xffL) << 16 | (buf[i++] & 0xffL) << 8 | (buf[i++] & 0xffL);")?;
                writeln!(out, "\t\t\t\tlong ns = (buf[i++] & 0xffL) << 24 | (buf[i++] & 0xffL) << 16 | (buf[i++] & 0xffL) << 8 | (buf[i++] & 0xffL);")?;
                writeln!(out, "\t\t\t\tthis.{name} = java.time.Instant.ofEpochSecond(s, ns); header = buf[i++];")?;
                writeln!(out, "\t\t\t}} else if (header == (byte) ({idx} | 0x80)) {{")?;
                writeln!(out, "\t\t\t\tlong s = 0; for (int sh = 56; sh >= 0; sh -= 8) s |= (buf[i++] & 0xffL) << sh;")?;
                writeln!(out, "\t\t\t\tlong ns = (buf[i++] & 0xffL) << 24 | (buf[i++] & 0xffL) << 16 | (buf[i++] & 0xffL) << 8 | (buf[i++] & 0xffL);")?;
                writeln!(out, "\t\t\t\tthis.{name} = java.time.Instant.ofEpochSecond(s, ns); header = buf[i++];")?;
                writeln!(out, "\t\t\t}}")?;
            }
            LogicalType::Text => {
                writeln!(out, "\t\t\tif (header == (byte) {idx}) {{")?;
                writeln!(out, "\t\t\t\tint size = 0;")?;
                writeln!(out, "\t\t\t\tfor (int shift = 0; true; shift += 7) {{ byte b = buf[i++]; size |= (b & 0x7f) << shift; if (shift == 28 || b >= 0) break; }}")?;
                writeln!(out, "\t\t\t\tif (size > colferSizeMax) throw new SecurityException(format(\"colfer: field {name} size %d exceeds %d UTF-8 bytes\", size, colferSizeMax));")?;
                writeln!(out, "\t\t\t\tthis.{name} = new String(buf, i, size, _utf8); i += size;")?;
                writeln!(out, "\t\t\t\theader = buf[i++];")?;
                writeln!(out, "\t\t\t}}")?;
            }
            LogicalType::Binary => {
                writeln!(out, "\t\t\tif (header == (byte) {idx}) {{")?;
                writeln!(out, "\t\t\t\tint size = 0;")?;
                writeln!(out, "\t\t\t\tfor (int shift = 0; true; shift += 7) {{ byte b = buf[i++]; size |= (b & 0x7f) << shift; if (shift == 28 || b >= 0) break; }}")?;
                writeln!(out, "\t\t\t\tif (size > colferSizeMax) throw new SecurityException(format(\"colfer: field {name} size %d exceeds %d bytes\", size, colferSizeMax));")?;
                writeln!(out, "\t\t\t\tthis.{name} = new byte[size]; System.arraycopy(buf, i, this.{name}, 0, size); i += size;")?;
                writeln!(out, "\t\t\t\theader = buf[i++];")?;
                writeln!(out, "\t\t\t}}")?;
            }
            LogicalType::StructRef => {
                let ty = native_name(f);
                writeln!(out, "\t\t\tif (header == (byte) {idx}) {{ this.{name} = new {ty}(); i = this.{name}.unmarshal(buf, i); header = buf[i++]; }}")?;
            }
        }
    }
    writeln!(out, "\t\t\tif (header != (byte) 0x7f) throw new InputMismatchException(format(\"colfer: unknown header at byte %d\", i - 1));")?;
    writeln!(out, "\t\t}} catch (IndexOutOfBoundsException e) {{")?;
    writeln!(out, "\t\t\tif (i - offset > colferSizeMax) throw new SecurityException(format(\"colfer: serial exceeds %d bytes\", colferSizeMax));")?;
    writeln!(out, "\t\t\tif (i >= buf.length) throw new BufferUnderflowException();")?;
    writeln!(out, "\t\t\tthrow new RuntimeException(\"colfer: bug\", e);")?;
    writeln!(out, "\t\t}}")?;
    writeln!(out, "\t\tif (i - offset > colferSizeMax) throw new SecurityException(format(\"colfer: serial exceeds %d bytes\", colferSizeMax));")?;
    writeln!(out, "\t\treturn i;")?;
    writeln!(out, "\t}}")?;
    Ok(())
}

fn emit_equals_and_hash(out: &mut String, s: &Struct) -> Result<(), GenError> {
    writeln!(out, "\t@Override")?;
    writeln!(out, "\tpublic final int hashCode() {{")?;
    writeln!(out, "\t\tint h = 1;")?;
    for f in &s.fields {
        let name = escape_java_name(&f.name);
        if f.is_list {
            writeln!(out, "\t\tfor (Object o : this.{name}) h = 31 * h + (o == null ? 0 : o.hashCode());")?;
            continue;
        }
        match f.logical_type {
            LogicalType::Bool => writeln!(out, "\t\th = 31 * h + (this.{name} ? 1231 : 1237);")?,
            LogicalType::Uint8 | LogicalType::Uint16 | LogicalType::Uint32 | LogicalType::Int32 => {
                writeln!(out, "\t\th = 31 * h + this.{name};")?
            }
            LogicalType::Uint64 | LogicalType::Int64 => {
                writeln!(out, "\t\th = 31 * h + (int) (this.{name} ^ (this.{name} >>> 32));")?
            }
            LogicalType::Float32 => writeln!(out, "\t\th = 31 * h + Float.floatToIntBits(this.{name});")?,
            LogicalType::Float64 => {
                writeln!(out, "\t\tlong {name}Bits = Double.doubleToLongBits(this.{name});")?;
                writeln!(out, "\t\th = 31 * h + (int) ({name}Bits ^ ({name}Bits >>> 32));")?
            }
            LogicalType::Binary => writeln!(out, "\t\tfor (byte b : this.{name}) h = 31 * h + b;")?,
            _ => writeln!(out, "\t\tif (this.{name} != null) h = 31 * h + this.{name}.hashCode();")?,
        }
    }
    writeln!(out, "\t\treturn h;")?;
    writeln!(out, "\t}}")?;
    writeln!(out)?;
    writeln!(out, "\t@Override")?;
    writeln!(out, "\tpublic final boolean equals(Object o) {{")?;
    writeln!(out, "\t\treturn o instanceof {0} && equals(({0}) o);", s.name)?;
    writeln!(out, "\t}}")?;
    writeln!(out)?;
    writeln!(out, "\tpublic final boolean equals({} o) {{", s.name)?;
    write!(out, "\t\treturn o != null")?;
    for f in &s.fields {
        let name = escape_java_name(&f.name);
        if f.is_list || f.logical_type == LogicalType::Binary {
            write!(out, "\n\t\t\t&& java.util.Arrays.equals(this.{name}, o.{name})")?;
        } else {
            match f.logical_type {
                LogicalType::Bool | LogicalType::Uint8 | LogicalType::Uint16 | LogicalType::Uint32
                | LogicalType::Uint64 | LogicalType::Int32 | LogicalType::Int64 => {
                    write!(out, "\n\t\t\t&& this.{name} == o.{name}")?
                }
                LogicalType::Float32 | LogicalType::Float64 => write!(
                    out,
                    "\n\t\t\t&& (this.{name} == o.{name} || (this.{name} != this.{name} && o.{name} != o.{name}))"
                )?,
                _ => write!(out, "\n\t\t\t&& java.util.Objects.equals(this.{name}, o.{name})")?,
            }
        }
    }
    writeln!(out, ";")?;
    writeln!(out, "\t}}")?;
    Ok(())
}
