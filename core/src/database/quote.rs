use crate::database::value::SqlValue;

/// Escaping of identifiers and literal values for inclusion in SQL text.
pub trait Quote: Send + Sync {
    fn identifier(&self, name: &str) -> String;

    fn value(&self, value: &SqlValue) -> String;
}

/// MySQL quoting rules: backtick identifiers and backslash-escaped string literals.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlQuote;

impl MySqlQuote {
    fn quote_identifier_part(part: &str) -> String {
        format!("`{}`", part.replace('`', "``"))
    }

    fn escape_string(value: &str) -> String {
        let mut escaped = String::with_capacity(value.len() + 2);
        escaped.push('\'');
        for c in value.chars() {
            match c {
                '\0' => escaped.push_str("\\0"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\\' => escaped.push_str("\\\\"),
                '\'' => escaped.push_str("\\'"),
                '"' => escaped.push_str("\\\""),
                '\x1a' => escaped.push_str("\\Z"),
                c => escaped.push(c),
            }
        }
        escaped.push('\'');
        escaped
    }
}

impl Quote for MySqlQuote {
    /// Handles `schema.table` by quoting each part on its own.
    fn identifier(&self, name: &str) -> String {
        name.split('.').map(Self::quote_identifier_part).collect::<Vec<_>>().join(".")
    }

    fn value(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(true) => "1".to_string(),
            SqlValue::Bool(false) => "0".to_string(),
            SqlValue::Int(value) => value.to_string(),
            SqlValue::UInt(value) => value.to_string(),
            SqlValue::Float(value) if value.is_finite() => value.to_string(),
            SqlValue::Float(_) => "NULL".to_string(),
            SqlValue::Text(value) => Self::escape_string(value),
            SqlValue::Raw(fragment) => fragment.to_string(),
        }
    }
}
