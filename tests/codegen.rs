//! Integration coverage for the Emitter: feeds a resolved schema through
//! both target languages and checks the generated source for the markers
//! that make each wire-format rule recognizable, without compiling the
//! output (neither `javac` nor `node` is part of this crate's toolchain).
use colfer::gen::{ecma, java};
use colfer::schema_doc::{parse, resolve};
use colfer::Schema;

fn schema(json: &str) -> Schema {
    resolve(parse(json).expect("valid json")).expect("valid schema")
}

const PERSON_SCHEMA: &str = r#"{
    "packages": [{
        "name": "people",
        "structs": [
            {
                "name": "Person",
                "fields": [
                    {"name": "name", "index": 0, "type": "text"},
                    {"name": "age", "index": 1, "type": "uint32"},
                    {"name": "friend", "index": 2, "type": "struct-ref", "type_ref": "Person"},
                    {"name": "tags", "index": 3, "type": "text", "list": true},
                    {"name": "born", "index": 4, "type": "timestamp"}
                ]
            }
        ]
    }]
}"#;

#[test]
fn java_emitter_writes_one_file_per_struct() {
    let schema = schema(PERSON_SCHEMA);
    let package = &schema.packages[0];
    let files = java::emit_package(package).expect("emission succeeds");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name, "Person.java");
}

#[test]
fn java_output_declares_fields_and_marshal_methods() {
    let schema = schema(PERSON_SCHEMA);
    let files = java::emit_package(&schema.packages[0]).unwrap();
    let source = &files[0].source;
    assert!(source.contains("public class Person"));
    assert!(source.contains("public String name"));
    assert!(source.contains("public int age"));
    assert!(source.contains("public Person friend"));
    assert!(source.contains("public String[] tags"));
    assert!(source.contains("public java.time.Instant born"));
    assert!(source.contains("public int marshal(byte[] buf, int offset)"));
    assert!(source.contains("public int unmarshal(byte[] buf, int offset)"));
    assert!(source.contains("0x7f"));
}

#[test]
fn java_emitter_rejects_uint16_field() {
    // uint8/uint16 have no representation in the statically typed target;
    // only the dynamic-runtime emitter's schema set covers them.
    let schema_doc = schema(
        r#"{"packages":[{"name":"pkg","structs":[{"name":"Box","fields":[
            {"name":"n","index":0,"type":"uint16"}
        ]}]}]}"#,
    );
    assert!(java::emit_package(&schema_doc.packages[0]).is_err());
}

#[test]
fn ecma_emitter_writes_one_combined_file() {
    let schema = schema(PERSON_SCHEMA);
    let source = ecma::emit_package(&schema.packages[0]).expect("emission succeeds");
    assert!(source.contains("function Person()"));
    assert!(source.contains("Person.prototype.marshal"));
    assert!(source.contains("Person.prototype.unmarshal"));
    assert!(source.contains("module.exports"));
}

#[test]
fn ecma_output_collapses_numeric_fields_to_number() {
    let schema = schema(PERSON_SCHEMA);
    let source = ecma::emit_package(&schema.packages[0]).unwrap();
    assert!(source.contains("this.age = 0;"));
}

#[test]
fn ecma_output_emits_timestamp_nanosecond_companion_field() {
    let schema = schema(PERSON_SCHEMA);
    let source = ecma::emit_package(&schema.packages[0]).unwrap();
    assert!(source.contains("this.born_ns = 0;"));
}

#[test]
fn ecma_keyword_collision_is_escaped() {
    let schema = schema(
        r#"{"packages":[{"name":"pkg","structs":[{"name":"Thing","fields":[
            {"name":"class","index":0,"type":"text"}
        ]}]}]}"#,
    );
    let source = ecma::emit_package(&schema.packages[0]).unwrap();
    assert!(source.contains("this.class_"));
    assert!(!source.contains("this.class "));
}

#[test]
fn java_emitter_reports_a_gen_error_on_format_failure() {
    // Sanity check that the conversion path exists: formatting into a
    // `String` buffer cannot actually fail, so this just exercises the
    // `From<std::fmt::Error>` impl directly.
    let err: colfer::gen::GenError = std::fmt::Error.into();
    assert!(err.to_string().contains("formatting error"));
}
