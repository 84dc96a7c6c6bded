//! Identifier quoting and literal escaping
//!
//! Every identifier and literal that reaches generated SQL passes through
//! [`Escaper`], which applies the quoting rules of a [`DialectConfig`].

use std::fmt::Write;

use crate::config::DialectConfig;
use crate::error::{QueryGeneratorError, Result};
use crate::types::TableReference;
use crate::value::SqlValue;

/// Character types that store single-byte text; literals for them skip the `N` prefix
const NON_UNICODE_TYPES: &[&str] = &["VARCHAR", "CHAR", "TEXT"];

/// Quote a SQL Server identifier with the default bracket delimiters
///
/// # Example
/// ```
/// use mssql_query_generator::sql::quote_identifier;
///
/// assert_eq!(quote_identifier("my_table"), "[my_table]");
/// assert_eq!(quote_identifier("odd]name"), "[odd]]name]");
/// ```
pub fn quote_identifier(identifier: &str) -> String {
    format!("[{}]", identifier.replace(']', "]]"))
}

/// Wrap text in a plain (non-unicode) string literal, doubling single quotes
///
/// Used for catalog comparisons against `sysname` columns.
pub fn quote_plain(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Renders identifiers and values according to a dialect configuration
#[derive(Debug, Clone, Copy)]
pub struct Escaper<'a> {
    config: &'a DialectConfig,
}

impl<'a> Escaper<'a> {
    pub fn new(config: &'a DialectConfig) -> Self {
        Self { config }
    }

    /// Wrap a name in the configured delimiters, doubling the closing delimiter
    pub fn quote_identifier(&self, name: &str) -> String {
        let end = self.config.quote_end;
        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push(self.config.quote_start);
        for c in name.chars() {
            if c == end {
                quoted.push(end);
            }
            quoted.push(c);
        }
        quoted.push(end);
        quoted
    }

    /// Render `[schema].[table]`, or `[table]` when no schema is given
    pub fn quote_table(&self, table: &TableReference) -> String {
        match &table.schema {
            Some(schema) => format!(
                "{}.{}",
                self.quote_identifier(schema),
                self.quote_identifier(&table.name)
            ),
            None => self.quote_identifier(&table.name),
        }
    }

    /// Schema a reference resolves to, falling back to the configured default
    pub fn schema_of<'t>(&'t self, table: &'t TableReference) -> &'t str {
        table
            .schema
            .as_deref()
            .unwrap_or(self.config.default_schema.as_str())
    }

    /// Render a string literal, `N`-prefixed when the dialect uses unicode literals
    pub fn escape_string(&self, text: &str) -> String {
        if self.config.unicode_strings {
            format!("N{}", quote_plain(text))
        } else {
            quote_plain(text)
        }
    }

    /// Render a value as a SQL literal
    ///
    /// `declared_type` is the column's SQL type when known. It selects
    /// non-unicode literals for `VARCHAR`-family columns and date-only
    /// rendering for `DATE` columns.
    pub fn escape_value(&self, value: &SqlValue, declared_type: Option<&str>) -> Result<String> {
        let declared = declared_type.map(|t| t.trim().to_uppercase());
        let declared = declared.as_deref();

        let literal = match value {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(b) => match (self.config.native_boolean, b) {
                (true, true) => "TRUE".to_string(),
                (true, false) => "FALSE".to_string(),
                (false, true) => "1".to_string(),
                (false, false) => "0".to_string(),
            },
            SqlValue::Int(i) => i.to_string(),
            SqlValue::Float(f) => {
                if !f.is_finite() {
                    return Err(QueryGeneratorError::validation(format!(
                        "Cannot render non-finite number {} as a SQL literal",
                        f
                    )));
                }
                f.to_string()
            }
            SqlValue::Decimal(d) => d.to_string(),
            SqlValue::Text(s) => self.escape_text(s, declared),
            SqlValue::Date(d) => self.escape_string(&d.format("%Y-%m-%d").to_string()),
            SqlValue::DateTime(dt) => {
                if declared.is_some_and(|t| t == "DATE") {
                    self.escape_string(&dt.format("%Y-%m-%d").to_string())
                } else {
                    self.escape_string(&dt.format("%Y-%m-%d %H:%M:%S%.3f %:z").to_string())
                }
            }
            SqlValue::Uuid(u) => self.escape_string(&u.to_string()),
            SqlValue::Bytes(bytes) => {
                let mut hex = String::with_capacity(2 + bytes.len() * 2);
                hex.push_str("0x");
                for b in bytes {
                    let _ = write!(hex, "{:02x}", b);
                }
                hex
            }
            SqlValue::Json(json) => self.escape_string(&json.to_string()),
        };

        Ok(literal)
    }

    fn escape_text(&self, text: &str, declared: Option<&str>) -> String {
        let non_unicode = declared.is_some_and(|t| {
            NON_UNICODE_TYPES
                .iter()
                .any(|prefix| t.starts_with(prefix))
        });
        if non_unicode {
            quote_plain(text)
        } else {
            self.escape_string(text)
        }
    }
}
