//! SQL generation for multi-row `INSERT` statements.
//!
//! Everything in here is pure string building, no I/O.

use crate::database::{
    quote::Quote,
    value::{SqlFragment, SqlValue},
};

/// How a column is treated when an inserted row collides with an existing key.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateField {
    /// `col = VALUES(col)`, take the value from the incoming row.
    UseIncomingValue(String),
    /// `col = <quoted literal>` regardless of the incoming row.
    SetToLiteral(String, SqlValue),
    /// `col = <sql>` with the expression emitted verbatim.
    SetToRawExpression(String, SqlFragment),
}

impl UpdateField {
    pub fn column(&self) -> &str {
        match self {
            UpdateField::UseIncomingValue(column)
            | UpdateField::SetToLiteral(column, _)
            | UpdateField::SetToRawExpression(column, _) => column,
        }
    }
}

impl From<&str> for UpdateField {
    fn from(column: &str) -> Self {
        UpdateField::UseIncomingValue(column.to_string())
    }
}

impl From<String> for UpdateField {
    fn from(column: String) -> Self {
        UpdateField::UseIncomingValue(column)
    }
}

impl<V: Into<SqlValue>> From<(&str, V)> for UpdateField {
    fn from((column, value): (&str, V)) -> Self {
        match value.into() {
            SqlValue::Raw(fragment) => UpdateField::SetToRawExpression(column.to_string(), fragment),
            value => UpdateField::SetToLiteral(column.to_string(), value),
        }
    }
}

/// Quotes a value unless it is a raw fragment, which goes in as given.
fn render_value(quote: &dyn Quote, value: &SqlValue) -> String {
    match value {
        SqlValue::Raw(fragment) => fragment.to_string(),
        value => quote.value(value),
    }
}

/// Renders each update field into its `ON DUPLICATE KEY UPDATE` assignment.
pub fn resolve_update_fields(quote: &dyn Quote, fields: &[UpdateField]) -> Vec<String> {
    fields
        .iter()
        .map(|field| {
            let column = quote.identifier(field.column());
            match field {
                UpdateField::UseIncomingValue(_) => format!("{} = VALUES({})", column, column),
                UpdateField::SetToLiteral(_, value) => {
                    format!("{} = {}", column, render_value(quote, value))
                }
                UpdateField::SetToRawExpression(_, sql) => format!("{} = {}", column, sql),
            }
        })
        .collect()
}

/// Builds `INSERT [IGNORE] INTO <table> (<cols>) VALUES (...), (...) [ON DUPLICATE KEY UPDATE ...]`.
///
/// `IGNORE` is only emitted when there are no update assignments. `rows` must not be empty.
pub fn build_insert_sql(
    quote: &dyn Quote,
    table: &str,
    insert_fields: &[String],
    update_assignments: &[String],
    rows: &[Vec<SqlValue>],
    insert_ignore: bool,
) -> String {
    let values = rows
        .iter()
        .map(|row| {
            let quoted = row.iter().map(|value| render_value(quote, value)).collect::<Vec<_>>();
            format!("({})", quoted.join(", "))
        })
        .collect::<Vec<_>>()
        .join(", ");

    let columns =
        insert_fields.iter().map(|field| quote.identifier(field)).collect::<Vec<_>>().join(", ");

    let mut query = String::from("INSERT");
    if update_assignments.is_empty() && insert_ignore {
        query.push_str(" IGNORE");
    }
    query.push_str(&format!(" INTO {} ({}) VALUES {}", quote.identifier(table), columns, values));

    if !update_assignments.is_empty() {
        query.push_str(" ON DUPLICATE KEY UPDATE ");
        query.push_str(&update_assignments.join(", "));
    }

    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::quote::MySqlQuote;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_resolve_incoming_value() {
        let resolved = resolve_update_fields(&MySqlQuote, &["field".into()]);
        assert_eq!(resolved, vec!["`field` = VALUES(`field`)"]);
    }

    #[test]
    fn test_resolve_literal_and_raw() {
        let resolved = resolve_update_fields(
            &MySqlQuote,
            &[
                ("count", 5).into(),
                ("name", "bob").into(),
                ("updated_at", SqlFragment::new("NOW()")).into(),
                UpdateField::SetToLiteral("note".to_string(), SqlValue::Raw(SqlFragment::new("x + 1"))),
            ],
        );
        assert_eq!(
            resolved,
            vec!["`count` = 5", "`name` = 'bob'", "`updated_at` = NOW()", "`note` = x + 1"]
        );
    }

    #[test]
    fn test_tuple_with_fragment_becomes_raw_expression() {
        let field: UpdateField = ("hits", SqlFragment::new("hits + 1")).into();
        assert_eq!(
            field,
            UpdateField::SetToRawExpression("hits".to_string(), SqlFragment::new("hits + 1"))
        );
    }

    #[test]
    fn test_multiple_rows_with_upsert() {
        let sql = build_insert_sql(
            &MySqlQuote,
            "table",
            &fields(&["a", "b"]),
            &resolve_update_fields(&MySqlQuote, &["a".into(), "b".into()]),
            &[vec![1.into(), 2.into()], vec![3.into(), "four".into()]],
            false,
        );
        assert_eq!(
            sql,
            "INSERT INTO `table` (`a`, `b`) VALUES (1, 2), (3, 'four') \
             ON DUPLICATE KEY UPDATE `a` = VALUES(`a`), `b` = VALUES(`b`)"
        );
    }

    #[test]
    fn test_plain_insert_has_no_trailing_clause() {
        let sql =
            build_insert_sql(&MySqlQuote, "t", &fields(&["a"]), &[], &[vec![1.into()]], false);
        assert_eq!(sql, "INSERT INTO `t` (`a`) VALUES (1)");
    }

    #[test]
    fn test_ignore_and_update_combinations() {
        for (ignore, update) in [(true, true), (true, false), (false, true), (false, false)] {
            let assignments = if update {
                resolve_update_fields(&MySqlQuote, &["field".into()])
            } else {
                Vec::new()
            };
            let sql = build_insert_sql(
                &MySqlQuote,
                "test_table",
                &fields(&["field"]),
                &assignments,
                &[vec!["value".into()]],
                ignore,
            );

            assert_eq!(sql.contains("INSERT IGNORE INTO"), ignore && !update, "{}", sql);
            assert_eq!(sql.contains("ON DUPLICATE KEY UPDATE"), update, "{}", sql);
        }
    }

    #[test]
    fn test_raw_fragment_row_value() {
        let sql = build_insert_sql(
            &MySqlQuote,
            "events",
            &fields(&["name", "created_at"]),
            &[],
            &[vec!["it's".into(), SqlFragment::new("NOW()").into()]],
            false,
        );
        assert_eq!(sql, "INSERT INTO `events` (`name`, `created_at`) VALUES ('it\\'s', NOW())");
    }
}
