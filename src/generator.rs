//! QueryGenerator - main entry point for SQL Server statement compilation
//!
//! The generator owns an immutable [`DialectConfig`]. Statement builders are
//! grouped by concern in [`crate::sql::ddl`], [`crate::sql::dml`] and
//! [`crate::sql::introspect`], each adding methods to [`QueryGenerator`].

use std::fmt;

use crate::config::DialectConfig;
use crate::sql::sanitize::Escaper;

/// Statement separator used when joining multi-statement output
pub const STATEMENT_SEPARATOR: &str = "; ";

/// Compiles structured operations into T-SQL text
///
/// All builders are pure: identical arguments always produce byte-identical
/// SQL, and a generator can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct QueryGenerator {
    config: DialectConfig,
}

impl QueryGenerator {
    /// Create a generator for the given dialect configuration
    pub fn new(config: DialectConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &DialectConfig {
        &self.config
    }

    /// Escaper bound to this generator's configuration
    pub fn escaper(&self) -> Escaper<'_> {
        Escaper::new(&self.config)
    }
}

/// Log a compiled statement and hand it back
pub(crate) fn traced<T: fmt::Display>(operation: &'static str, sql: T) -> T {
    tracing::trace!(operation, sql = %sql, "compiled statement");
    sql
}

/// An ordered sequence of SQL statements
///
/// Builders that register comments next to DDL return several statements.
/// They stay separate until rendered, where they are joined as
/// `stmt; stmt;`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statements(Vec<String>);

impl Statements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a statement; a trailing `;` is stripped
    pub fn push(&mut self, statement: impl Into<String>) {
        let statement = statement.into();
        let trimmed = statement.trim_end().trim_end_matches(';').to_string();
        self.0.push(trimmed);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// Join into one text, each statement terminated by `;`
    pub fn to_sql(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        format!("{};", self.0.join(STATEMENT_SEPARATOR))
    }
}

impl fmt::Display for Statements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

impl IntoIterator for Statements {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
