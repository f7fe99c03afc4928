//! Keyword-escaping helpers for the two Emitter targets. Deliberately
//! minimal: this crate's input boundary is an already-resolved schema
//! document, so an exhaustive per-language reserved-word table is out of
//! scope — only the one escape each emitter actually performs is kept.
const ECMA_KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "return", "super", "switch", "this", "throw", "try", "typeof",
    "var", "void", "while", "with", "yield",
];

/// Whether `name` collides with an ECMAScript reserved word.
pub fn is_ecma_keyword(name: &str) -> bool {
    ECMA_KEYWORDS.contains(&name)
}

/// Append an underscore on collision, applied to package and field names
/// before they're written into generated source.
pub fn escape_ecma_name(name: &str) -> String {
    if is_ecma_keyword(name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Java has no field-name escaping step; struct/field names are emitted
/// as-is. Kept as a named pass-through so call sites read the same
/// whether or not a target happens to escape.
pub fn escape_java_name(name: &str) -> String {
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_ecma_reserved_words() {
        assert_eq!(escape_ecma_name("class"), "class_");
        assert_eq!(escape_ecma_name("id"), "id");
    }

    #[test]
    fn java_escaping_is_a_pass_through() {
        assert_eq!(escape_java_name("class"), "class");
    }
}
