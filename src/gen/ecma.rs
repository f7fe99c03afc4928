//! Dynamic Emitter target. Unlike the Java emitter this one produces a
//! single combined source file per package, holding every struct plus a
//! handful of shared marshal/unmarshal helpers.
use std::fmt::Write as _;

use crate::error::CodecError;
use crate::gen::error::GenError;
use crate::gen::naming::escape_ecma_name;
use crate::model::{Field, LogicalType, Package, Struct};
use crate::type_map::{map_type, TargetLang};

fn native_name(field: &Field) -> String {
    map_type(field.logical_type, field.is_list, field.type_ref.as_deref(), TargetLang::Dynamic).name
}

/// A struct-ref field without a `type_ref` is a schema inconsistency that
/// should have been caught upstream; surface it here rather than emitting
/// a constructor call for an empty type name.
fn type_ref_or_err<'a>(f: &'a Field, s: &Struct) -> Result<&'a str, GenError> {
    f.type_ref.as_deref().ok_or_else(|| GenError::Schema {
        context: format!("{}::{}", s.name, f.name),
        source: CodecError::SchemaMismatch {
            struct_name: s.name.clone(),
            offset: 0,
            detail: format!("field {:?} is struct-ref but names no type_ref", f.name),
        },
    })
}

/// Emit the single `Colfer.js` file covering every struct in `package`.
pub fn emit_package(package: &Package) -> Result<String, GenError> {
    let mut out = String::new();
    writeln!(out, "// This file was generated by colf(1); DO NOT EDIT")?;
    writeln!(out, "\"use strict\";")?;
    writeln!(out)?;
    writeln!(out, "var colferSizeMax = {};", package.size_max)?;
    writeln!(out, "var colferListMax = {};", package.list_max)?;
    writeln!(out)?;

    emit_shared_helpers(&mut out, package)?;

    for s in &package.structs {
        emit_struct(&mut out, s)?;
    }

    write!(out, "module.exports = {{")?;
    for (i, s) in package.structs.iter().enumerate() {
        if i > 0 {
            write!(out, ", ")?;
        }
        write!(out, "{0}: {0}", s.name)?;
    }
    writeln!(out, "}};")?;
    Ok(out)
}

fn emit_shared_helpers(out: &mut String, package: &Package) -> Result<(), GenError> {
    writeln!(out, "function encodeVarint(x) {{")?;
    writeln!(out, "\tvar bytes = [];")?;
    writeln!(out, "\twhile (x > 0x7f) {{ bytes.push((x & 0x7f) | 0x80); x = Math.floor(x / 128); }}")?;
    writeln!(out, "\tbytes.push(x);")?;
    writeln!(out, "\treturn bytes;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "function decodeVarint(buf, i) {{")?;
    writeln!(out, "\tvar x = 0, shift = 0;")?;
    writeln!(out, "\tfor (;;) {{")?;
    writeln!(out, "\t\tvar b = buf[i++];")?;
    writeln!(out, "\t\tx += (b & 0x7f) * Math.pow(2, shift);")?;
    writeln!(out, "\t\tif ((b & 0x80) === 0) break;")?;
    writeln!(out, "\t\tshift += 7;")?;
    writeln!(out, "\t\tif (shift > 49) throw new RangeError('colfer: varint overflow');")?;
    writeln!(out, "\t}}")?;
    writeln!(out, "\treturn [x, i];")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    if package.has_timestamp {
        writeln!(out, "function decodeInt64(buf, i) {{")?;
        writeln!(out, "\tvar hi = (buf[i] << 24) | (buf[i + 1] << 16) | (buf[i + 2] << 8) | buf[i + 3];")?;
        writeln!(out, "\tvar lo = (buf[i + 4] * 0x1000000) + (buf[i + 5] << 16) + (buf[i + 6] << 8) + buf[i + 7];")?;
        writeln!(out, "\treturn [hi * 0x100000000 + lo, i + 8];")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
    }

    writeln!(out, "function encodeUTF8(s) {{")?;
    writeln!(out, "\treturn new Uint8Array(Buffer.from(s, 'utf8'));")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "function decodeUTF8(buf, offset, size) {{")?;
    writeln!(out, "\treturn Buffer.from(buf.buffer, buf.byteOffset + offset, size).toString('utf8');")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

fn zero_literal(field: &Field) -> String {
    let ty = native_name(field);
    if field.is_list {
        return match ty.as_str() {
            "Float32Array" => "new Float32Array(0)".to_string(),
            "Float64Array" => "new Float64Array(0)".to_string(),
            _ => "[]".to_string(),
        };
    }
    match field.logical_type {
        LogicalType::Bool => "false".to_string(),
        LogicalType::Timestamp => "null".to_string(),
        LogicalType::Text => "''".to_string(),
        LogicalType::Binary => "new Uint8Array(0)".to_string(),
        LogicalType::StructRef => "null".to_string(),
        _ => "0".to_string(),
    }
}

fn emit_struct(out: &mut String, s: &Struct) -> Result<(), GenError> {
    writeln!(out, "/**")?;
    writeln!(out, " * @constructor")?;
    writeln!(out, " */")?;
    writeln!(out, "function {}() {{", s.name)?;
    for f in &s.fields {
        let name = escape_ecma_name(&f.name);
        writeln!(out, "\tthis.{name} = {};", zero_literal(f))?;
        if f.logical_type == LogicalType::Timestamp && !f.is_list {
            writeln!(out, "\tthis.{name}_ns = 0;")?;
        }
    }
    writeln!(out, "}}")?;
    writeln!(out)?;

    emit_marshal(out, s)?;
    writeln!(out)?;
    emit_unmarshal(out, s)?;
    writeln!(out)?;
    Ok(())
}

fn range_check(out: &mut String, name: &str, max: &str, min: Option<&str>) -> Result<(), GenError> {
    match min {
        Some(min) => writeln!(
            out,
            "\t\tif (this.{name} > {max} || this.{name} < {min}) throw new RangeError('colfer: field {name} out of reach');"
        )?,
        None => writeln!(
            out,
            "\t\tif (this.{name} > {max} || this.{name} < 0) throw new RangeError('colfer: field {name} out of reach');"
        )?,
    }
    Ok(())
}

fn emit_marshal(out: &mut String, s: &Struct) -> Result<(), GenError> {
    writeln!(out, "{}.prototype.marshal = function() {{", s.name)?;
    writeln!(out, "\tvar segs = [];")?;
    for f in &s.fields {
        let name = escape_ecma_name(&f.name);
        let idx = f.index;
        if f.is_list {
            writeln!(out, "\tif (this.{name}.length) {{")?;
            writeln!(out, "\t\tif (this.{name}.length > colferListMax) throw new RangeError('colfer: field {name} exceeds colferListMax');")?;
            writeln!(out, "\t\tsegs.push(new Uint8Array([{idx}]));")?;
            writeln!(out, "\t\tsegs.push(new Uint8Array(encodeVarint(this.{name}.length)));")?;
            writeln!(out, "\t\tfor (var i = 0; i < this.{name}.length; i++) {{")?;
            if f.logical_type == LogicalType::StructRef {
                let ty = type_ref_or_err(f, s)?;
                writeln!(out, "\t\t\tvar v = this.{name}[i]; if (v == null) {{ v = new {ty}(); this.{name}[i] = v; }}")?;
                writeln!(out, "\t\t\tsegs.push(v.marshal());")?;
            } else if f.logical_type == LogicalType::Text {
                writeln!(out, "\t\t\tvar v = this.{name}[i]; if (v == null) {{ v = ''; this.{name}[i] = v; }}")?;
                writeln!(out, "\t\t\tvar utf = encodeUTF8(v); segs.push(new Uint8Array(encodeVarint(utf.length))); segs.push(utf);")?;
            } else if f.logical_type == LogicalType::Binary {
                writeln!(out, "\t\t\tvar v = this.{name}[i]; if (v == null) {{ v = new Uint8Array(0); this.{name}[i] = v; }}")?;
                writeln!(out, "\t\t\tsegs.push(new Uint8Array(encodeVarint(v.length))); segs.push(v);")?;
            } else {
                writeln!(out, "\t\t\tvar buf = new ArrayBuffer({}); var view = new DataView(buf); view.set{}(0, this.{name}[i], false); segs.push(new Uint8Array(buf));",
                    if f.logical_type == LogicalType::Float32 { 4 } else { 8 },
                    if f.logical_type == LogicalType::Float32 { "Float32" } else { "Float64" })?;
            }
            writeln!(out, "\t\t}}")?;
            writeln!(out, "\t}}")?;
            continue;
        }
        match f.logical_type {
            LogicalType::Bool => {
                writeln!(out, "\tif (this.{name}) segs.push(new Uint8Array([{idx}]));")?;
            }
            LogicalType::Uint8 => {
                range_check(out, &name, "255", None)?;
                writeln!(out, "\tif (this.{name}) segs.push(new Uint8Array([{idx}, this.{name}]));")?;
            }
            LogicalType::Uint16 => {
                range_check(out, &name, "65535", None)?;
                writeln!(out, "\tif (this.{name}) {{")?;
                writeln!(out, "\t\tif (this.{name} < 256) segs.push(new Uint8Array([{idx} | 0x80, this.{name}]));")?;
                writeln!(out, "\t\telse segs.push(new Uint8Array([{idx}, this.{name} >>> 8, this.{name} & 0xff]));")?;
                writeln!(out, "\t}}")?;
            }
            LogicalType::Uint32 | LogicalType::Uint64 => {
                range_check(out, &name, "Number.MAX_SAFE_INTEGER", None)?;
                writeln!(out, "\tif (this.{name}) {{ segs.push(new Uint8Array([{idx}])); segs.push(new Uint8Array(encodeVarint(this.{name}))); }}")?;
            }
            LogicalType::Int32 | LogicalType::Int64 => {
                range_check(out, &name, "Number.MAX_SAFE_INTEGER", Some("Number.MIN_SAFE_INTEGER"))?;
                writeln!(out, "\tif (this.{name}) {{")?;
                writeln!(out, "\t\tvar x = this.{name}; var header = {idx};")?;
                writeln!(out, "\t\tif (x < 0) {{ x = -x; header |= 0x80; }}")?;
                writeln!(out, "\t\tsegs.push(new Uint8Array([header])); segs.push(new Uint8Array(encodeVarint(x)));")?;
                writeln!(out, "\t}}")?;
            }
            LogicalType::Float32 | LogicalType::Float64 => {
                let (width, kind) = if f.logical_type == LogicalType::Float32 { (4, "Float32") } else { (8, "Float64") };
                writeln!(out, "\tif (this.{name} || Number.isNaN(this.{name})) {{")?;
                writeln!(out, "\t\tvar buf = new ArrayBuffer({width}); new DataView(buf).set{kind}(0, this.{name}, false);")?;
                writeln!(out, "\t\tsegs.push(new Uint8Array([{idx}])); segs.push(new Uint8Array(buf));")?;
                writeln!(out, "\t}}")?;
            }
            LogicalType::Timestamp => {
                writeln!(out, "\tif (this.{name}) {{")?;
                writeln!(out, "\t\tvar ms = this.{name}.getTime();")?;
                writeln!(out, "\t\tvar s = Math.floor(ms / 1000); var ns = (ms - s * 1000) * 1e6 + this.{name}_ns;")?;
                writeln!(out, "\t\tif (s !== 0 || ns !== 0) {{")?;
                writeln!(out, "\t\t\tif (s >= 0 && s < 4294967296) {{")?;
                writeln!(out, "\t\t\t\tsegs.push(new Uint8Array([{idx}]));")?;
                writeln!(out, "\t\t\t\tvar buf = new ArrayBuffer(8); var view = new DataView(buf); view.setUint32(0, s, false); view.setUint32(4, ns, false); segs.push(new Uint8Array(buf));")?;
                writeln!(out, "\t\t\t}} else {{")?;
                writeln!(out, "\t\t\t\tsegs.push(new Uint8Array([{idx} | 0x80]));")?;
                writeln!(out, "\t\t\t\tvar neg = s < 0 ? 1 : 0; var abs = Math.abs(s);")?;
                writeln!(out, "\t\t\t\tvar hi = Math.floor(abs / 0x100000000); var lo = abs >>> 0;")?;
                writeln!(out, "\t\t\t\tvar buf = new ArrayBuffer(12); var view = new DataView(buf); view.setUint32(0, hi, false); view.setUint32(4, lo, false); view.setUint32(8, ns, false); segs.push(new Uint8Array(buf));")?;
                writeln!(out, "\t\t\t}}")?;
                writeln!(out, "\t\t}}")?;
                writeln!(out, "\t}}")?;
            }
            LogicalType::Text => {
                writeln!(out, "\tif (this.{name}) {{")?;
                writeln!(out, "\t\tvar utf = encodeUTF8(this.{name});")?;
                writeln!(out, "\t\tif (utf.length > colferSizeMax) throw new RangeError('colfer: field {name} exceeds colferSizeMax');")?;
                writeln!(out, "\t\tsegs.push(new Uint8Array([{idx}])); segs.push(new Uint8Array(encodeVarint(utf.length))); segs.push(utf);")?;
                writeln!(out, "\t}}")?;
            }
            LogicalType::Binary => {
                writeln!(out, "\tif (this.{name}.length) {{")?;
                writeln!(out, "\t\tif (this.{name}.length > colferSizeMax) throw new RangeError('colfer: field {name} exceeds colferSizeMax');")?;
                writeln!(out, "\t\tsegs.push(new Uint8Array([{idx}])); segs.push(new Uint8Array(encodeVarint(this.{name}.length))); segs.push(this.{name});")?;
                writeln!(out, "\t}}")?;
            }
            LogicalType::StructRef => {
                writeln!(out, "\tif (this.{name} != null) {{ segs.push(new Uint8Array([{idx}])); segs.push(this.{name}.marshal()); }}")?;
            }
        }
    }
    writeln!(out, "\tsegs.push(new Uint8Array([0x7f]));")?;
    writeln!(out, "\tvar size = 0; for (var i = 0; i < segs.length; i++) size += segs[i].length;")?;
    writeln!(out, "\tif (size > colferSizeMax) throw new RangeError('colfer: serial exceeds colferSizeMax');")?;
    writeln!(out, "\tvar out = new Uint8Array(size); var o = 0;")?;
    writeln!(out, "\tfor (var i = 0; i < segs.length; i++) {{ out.set(segs[i], o); o += segs[i].length; }}")?;
    writeln!(out, "\treturn out;")?;
    writeln!(out, "}};")?;
    Ok(())
}

fn emit_unmarshal(out: &mut String, s: &Struct) -> Result<(), GenError> {
    writeln!(out, "{}.prototype.unmarshal = function(buf, offset) {{", s.name)?;
    writeln!(out, "\tvar i = offset;")?;
    writeln!(out, "\tvar header = buf[i++];")?;
    for f in &s.fields {
        let name = escape_ecma_name(&f.name);
        let idx = f.index;
        if f.is_list {
            writeln!(out, "\tif (header === {idx}) {{")?;
            writeln!(out, "\t\tvar r = decodeVarint(buf, i); var length = r[0]; i = r[1];")?;
            writeln!(out, "\t\tif (length > colferListMax) throw new RangeError('colfer: field {name} exceeds colferListMax');")?;
            writeln!(out, "\t\tvar a = new Array(length);")?;
            writeln!(out, "\t\tfor (var ai = 0; ai < length; ai++) {{")?;
            match f.logical_type {
                LogicalType::StructRef => {
                    let ty = type_ref_or_err(f, s)?;
                    writeln!(out, "\t\t\tvar o = new {ty}(); i = o.unmarshal(buf, i); a[ai] = o;")?;
                }
                LogicalType::Text => {
                    writeln!(out, "\t\t\tvar sr = decodeVarint(buf, i); var size = sr[0]; i = sr[1];")?;
                    writeln!(out, "\t\t\ta[ai] = decodeUTF8(buf, i, size); i += size;")?;
                }
                LogicalType::Binary => {
                    writeln!(out, "\t\t\tvar sr = decodeVarint(buf, i); var size = sr[0]; i = sr[1];")?;
                    writeln!(out, "\t\t\ta[ai] = buf.slice(i, i + size); i += size;")?;
                }
                _ => {
                    let width = if f.logical_type == LogicalType::Float32 { 4 } else { 8 };
                    let kind = if f.logical_type == LogicalType::Float32 { "Float32" } else { "Float64" };
                    writeln!(out, "\t\t\ta[ai] = new DataView(buf.buffer, buf.byteOffset + i, {width}).get{kind}(0, false); i += {width};")?;
                }
            }
            writeln!(out, "\t\t}}")?;
            writeln!(out, "\t\tthis.{name} = a;")?;
            writeln!(out, "\t\theader = buf[i++];")?;
            writeln!(out, "\t}}")?;
            continue;
        }
        match f.logical_type {
            LogicalType::Bool => {
                writeln!(out, "\tif (header === {idx}) {{ this.{name} = true; header = buf[i++]; }}")?;
            }
            LogicalType::Uint8 => {
                writeln!(out, "\tif (header === {idx}) {{ this.{name} = buf[i++]; header = buf[i++]; }}")?;
            }
            LogicalType::Uint16 => {
                writeln!(out, "\tif (header === ({idx} | 0x80)) {{ this.{name} = buf[i++]; header = buf[i++]; }}")?;
                writeln!(out, "\telse if (header === {idx}) {{ this.{name} = (buf[i++] << 8) | buf[i++]; header = buf[i++]; }}")?;
            }
            LogicalType::Uint32 | LogicalType::Uint64 => {
                writeln!(out, "\tif (header === {idx}) {{ var r = decodeVarint(buf, i); this.{name} = r[0]; i = r[1]; header = buf[i++]; }}")?;
            }
            LogicalType::Int32 | LogicalType::Int64 => {
                writeln!(out, "\tif (header === {idx} || header === ({idx} | 0x80)) {{")?;
                writeln!(out, "\t\tvar negative = header === ({idx} | 0x80);")?;
                writeln!(out, "\t\tvar r = decodeVarint(buf, i); this.{name} = negative ? -r[0] : r[0]; i = r[1];")?;
                writeln!(out, "\t\theader = buf[i++];")?;
                writeln!(out, "\t}}")?;
            }
            LogicalType::Float32 | LogicalType::Float64 => {
                let (width, kind) = if f.logical_type == LogicalType::Float32 { (4, "Float32") } else { (8, "Float64") };
                writeln!(out, "\tif (header === {idx}) {{ this.{name} = new DataView(buf.buffer, buf.byteOffset + i, {width}).get{kind}(0, false); i += {width}; header = buf[i++]; }}")?;
            }
            LogicalType::Timestamp => {
                writeln!(out, "\tif (header === {idx}) {{")?;
                writeln!(out, "\t\tvar view = new DataView(buf.buffer, buf.byteOffset + i, 8);")?;
                writeln!(out, "\t\tvar s = view.getUint32(0, false); var ns = view.getUint32(4, false); i += 8;")?;
                writeln!(out, "\t\tthis.{name} = new Date(s * 1000 + Math.floor(ns / 1e6)); this.{name}_ns = ns % 1000000;")?;
                writeln!(out, "\t\theader = buf[i++];")?;
                writeln!(out, "\t}} else if (header === ({idx} | 0x80)) {{")?;
                writeln!(out, "\t\tvar r = decodeInt64(buf, i); var s = r[0]; i = r[1];")?;
                writeln!(out, "\t\tvar view = new DataView(buf.buffer, buf.byteOffset + i, 4); var ns = view.getUint32(0, false); i += 4;")?;
                writeln!(out, "\t\tthis.{name} = new Date(s * 1000 + Math.floor(ns / 1e6)); this.{name}_ns = ns % 1000000;")?;
                writeln!(out, "\t\theader = buf[i++];")?;
                writeln!(out, "\t}}")?;
            }
            LogicalType::Text => {
                writeln!(out, "\tif (header === {idx}) {{")?;
                writeln!(out, "\t\tvar r = decodeVarint(buf, i); var size = r[0]; i = r[1];")?;
                writeln!(out, "\t\tif (size > colferSizeMax) throw new RangeError('colfer: field {name} exceeds colferSizeMax');")?;
                writeln!(out, "\t\tthis.{name} = decodeUTF8(buf, i, size); i += size;")?;
                writeln!(out, "\t\theader = buf[i++];")?;
                writeln!(out, "\t}}")?;
            }
            LogicalType::Binary => {
                writeln!(out, "\tif (header === {idx}) {{")?;
                writeln!(out, "\t\tvar r = decodeVarint(buf, i); var size = r[0]; i = r[1];")?;
                writeln!(out, "\t\tif (size > colferSizeMax) throw new RangeError('colfer: field {name} exceeds colferSizeMax');")?;
                writeln!(out, "\t\tthis.{name} = buf.slice(i, i + size); i += size;")?;
                writeln!(out, "\t\theader = buf[i++];")?;
                writeln!(out, "\t}}")?;
            }
            LogicalType::StructRef => {
                let ty = type_ref_or_err(f, s)?;
                writeln!(out, "\tif (header === {idx}) {{ this.{name} = new {ty}(); i = this.{name}.unmarshal(buf, i); header = buf[i++]; }}")?;
            }
        }
    }
    writeln!(out, "\tif (header !== 0x7f) throw new Error('colfer: unknown header at byte ' + (i - 1));")?;
    writeln!(out, "\treturn i;")?;
    writeln!(out, "}};")?;
    Ok(())
}
