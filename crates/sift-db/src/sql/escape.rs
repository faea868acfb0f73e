use bson::Bson;

/// How a resolved template argument reaches the output text. Selected by
/// the placeholder's bracket type; the operand variant can refine it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EscapeMode {
    /// Becomes a named placeholder; the value goes to the binding list.
    Param,
    /// Quoted as a column/table identifier.
    Identifier,
    /// Identifier quoting that leaves `*`, dotted paths and pre-quoted
    /// text usable: each dotted segment is quoted on its own.
    IdentifierSoft,
    /// Inlined verbatim. Only for already-rendered SQL.
    None,
}

/// ANSI identifier quoting: wrap in `"`, double embedded quotes.
pub(crate) fn identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Soft identifier quoting for field/table references: `*` and
/// already-quoted or parenthesized text pass through, dotted paths are
/// quoted per segment.
pub(crate) fn identifier_soft(name: &str) -> String {
    if name == "*" || name.starts_with('"') || name.contains('(') {
        return name.to_string();
    }
    if name.contains('.') {
        return name.split('.').map(identifier_soft).collect::<Vec<_>>().join(".");
    }
    identifier(name)
}

/// Literal rendering for the debug query: correct escaping, display only.
pub(crate) fn literal(value: &Bson) -> String {
    match value {
        Bson::Null => "null".to_string(),
        Bson::Boolean(true) => "1".to_string(),
        Bson::Boolean(false) => "0".to_string(),
        Bson::Int32(n) => n.to_string(),
        Bson::Int64(n) => n.to_string(),
        Bson::Double(n) => n.to_string(),
        Bson::String(s) => format!("'{}'", s.replace('\'', "''")),
        other => format!("'{}'", other.to_string().replace('\'', "''")),
    }
}
