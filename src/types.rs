//! Core type definitions for query generation
//!
//! Includes table references, attribute definitions, table hints, query
//! options and model metadata.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::QueryGeneratorError;
use crate::value::SqlValue;

// ============================================================================
// Table References
// ============================================================================

/// A table name with an optional schema
///
/// Deserializes from either a bare string (`"users"`) or an object
/// (`{"tableName": "users", "schema": "sales"}`). Both forms are equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "TableReferenceRepr")]
pub struct TableReference {
    #[serde(rename = "tableName")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TableReferenceRepr {
    Name(String),
    Structured {
        #[serde(rename = "tableName")]
        name: String,
        #[serde(default)]
        schema: Option<String>,
    },
}

impl From<TableReferenceRepr> for TableReference {
    fn from(repr: TableReferenceRepr) -> Self {
        match repr {
            TableReferenceRepr::Name(name) => TableReference::new(name),
            TableReferenceRepr::Structured { name, schema } => Self { name, schema },
        }
    }
}

impl TableReference {
    /// Create a reference in the default schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
        }
    }

    /// Create a schema-qualified reference
    pub fn with_schema(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Some(schema.into()),
        }
    }
}

impl From<&str> for TableReference {
    fn from(name: &str) -> Self {
        TableReference::new(name)
    }
}

impl From<String> for TableReference {
    fn from(name: String) -> Self {
        TableReference::new(name)
    }
}

impl From<&TableReference> for TableReference {
    fn from(table: &TableReference) -> Self {
        table.clone()
    }
}

/// `(schema, table)`
impl From<(&str, &str)> for TableReference {
    fn from((schema, name): (&str, &str)) -> Self {
        TableReference::with_schema(schema, name)
    }
}

// ============================================================================
// Attribute Definitions
// ============================================================================

static INLINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?) COMMENT (.*)$").expect("valid comment regex"));

static INLINE_REFERENCES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?) (REFERENCES.*)$").expect("valid references regex"));

/// Foreign key target of an attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct References {
    pub table: TableReference,
    /// Referenced column (default: "id")
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub on_delete: Option<String>,
    #[serde(default)]
    pub on_update: Option<String>,
}

impl References {
    pub fn new(table: impl Into<TableReference>) -> Self {
        Self {
            table: table.into(),
            key: None,
            on_delete: None,
            on_update: None,
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn on_delete(mut self, action: impl Into<String>) -> Self {
        self.on_delete = Some(action.into());
        self
    }

    pub fn on_update(mut self, action: impl Into<String>) -> Self {
        self.on_update = Some(action.into());
        self
    }
}

/// Column definition supplied by the schema layer
///
/// `data_type` is raw SQL (`VARCHAR(255)`, `INTEGER NOT NULL`, ...). It may
/// carry inline `PRIMARY KEY`, `REFERENCES ...` and `COMMENT <text>` suffixes,
/// which builders treat the same as the structured fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub auto_increment: bool,
    /// `None` leaves nullability to the server default
    #[serde(default)]
    pub allow_null: Option<bool>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip)]
    pub default_value: Option<SqlValue>,
    #[serde(default)]
    pub references: Option<References>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl AttributeDefinition {
    /// Create a new attribute with a name and SQL type
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            primary_key: false,
            auto_increment: false,
            allow_null: None,
            unique: false,
            default_value: None,
            references: None,
            comment: None,
        }
    }

    /// Parse a serialized attribute such as `VARCHAR(50) UNIQUE COMMENT Bar Foo`
    ///
    /// The inline comment moves to [`AttributeDefinition::comment`].
    pub fn parse(name: impl Into<String>, definition: &str) -> Self {
        let mut attr = Self::new(name, definition);
        if let Some(caps) = INLINE_COMMENT.captures(definition) {
            attr.data_type = caps[1].to_string();
            attr.comment = Some(caps[2].trim().to_string());
        }
        attr
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.allow_null = Some(false);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.allow_null = Some(true);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default(mut self, value: impl Into<SqlValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn references(mut self, references: References) -> Self {
        self.references = Some(references);
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Whether the attribute is a primary key, flagged or inline
    pub fn is_primary_key(&self) -> bool {
        self.primary_key || self.data_type.contains("PRIMARY KEY")
    }

    /// Split an inline `REFERENCES ...` clause off the type
    pub(crate) fn split_inline_references(definition: &str) -> (String, Option<String>) {
        match INLINE_REFERENCES.captures(definition) {
            Some(caps) => (caps[1].to_string(), Some(caps[2].to_string())),
            None => (definition.to_string(), None),
        }
    }
}

/// Named composite UNIQUE constraint for CREATE TABLE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueKey {
    /// Constraint name (default: `uniq_<table>_<fields>`)
    #[serde(default)]
    pub name: Option<String>,
    pub fields: Vec<String>,
}

impl UniqueKey {
    pub fn new(fields: Vec<String>) -> Self {
        Self { name: None, fields }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

// ============================================================================
// Table Hints
// ============================================================================

/// SQL Server table hints accepted in `WITH (...)`
///
/// Deserializes from the keyword in any case through [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum TableHint {
    NoLock,
    ReadUncommitted,
    UpdLock,
    RepeatableRead,
    Serializable,
    ReadCommitted,
    TabLock,
    TabLockX,
    PagLock,
    RowLock,
    NoWait,
    ReadPast,
    XLock,
    Snapshot,
    NoExpand,
}

impl TableHint {
    pub const ALL: [TableHint; 15] = [
        TableHint::NoLock,
        TableHint::ReadUncommitted,
        TableHint::UpdLock,
        TableHint::RepeatableRead,
        TableHint::Serializable,
        TableHint::ReadCommitted,
        TableHint::TabLock,
        TableHint::TabLockX,
        TableHint::PagLock,
        TableHint::RowLock,
        TableHint::NoWait,
        TableHint::ReadPast,
        TableHint::XLock,
        TableHint::Snapshot,
        TableHint::NoExpand,
    ];

    /// Keyword as written in T-SQL
    pub fn as_sql(&self) -> &'static str {
        match self {
            TableHint::NoLock => "NOLOCK",
            TableHint::ReadUncommitted => "READUNCOMMITTED",
            TableHint::UpdLock => "UPDLOCK",
            TableHint::RepeatableRead => "REPEATABLEREAD",
            TableHint::Serializable => "SERIALIZABLE",
            TableHint::ReadCommitted => "READCOMMITTED",
            TableHint::TabLock => "TABLOCK",
            TableHint::TabLockX => "TABLOCKX",
            TableHint::PagLock => "PAGLOCK",
            TableHint::RowLock => "ROWLOCK",
            TableHint::NoWait => "NOWAIT",
            TableHint::ReadPast => "READPAST",
            TableHint::XLock => "XLOCK",
            TableHint::Snapshot => "SNAPSHOT",
            TableHint::NoExpand => "NOEXPAND",
        }
    }
}

impl fmt::Display for TableHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl TryFrom<String> for TableHint {
    type Error = QueryGeneratorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for TableHint {
    type Err = QueryGeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        TableHint::ALL
            .into_iter()
            .find(|hint| hint.as_sql() == wanted)
            .ok_or_else(|| QueryGeneratorError::unsupported(format!("Unknown table hint '{}'", s)))
    }
}

// ============================================================================
// Query Options
// ============================================================================

/// Options shared by the statement builders
///
/// Each builder reads the options it recognizes and ignores the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    #[serde(default)]
    pub table_hint: Option<TableHint>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    /// Table description registered by CREATE TABLE
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub unique_keys: Vec<UniqueKey>,
    /// Append `OUTPUT INSERTED.*` to INSERT and UPDATE
    #[serde(default)]
    pub returning: bool,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_hint(mut self, hint: TableHint) -> Self {
        self.table_hint = Some(hint);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn unique_key(mut self, key: UniqueKey) -> Self {
        self.unique_keys.push(key);
        self
    }

    pub fn returning(mut self, enabled: bool) -> Self {
        self.returning = enabled;
        self
    }

    /// Parse options from JSON, ignoring unrecognized keys
    ///
    /// An unknown `tableHint` is reported as
    /// [`QueryGeneratorError::UnsupportedFeature`].
    pub fn from_json(value: serde_json::Value) -> crate::Result<Self> {
        if let Some(hint) = value.get("tableHint").and_then(|h| h.as_str()) {
            hint.parse::<TableHint>()?;
        }
        Ok(serde_json::from_value(value)?)
    }
}

// ============================================================================
// Model Metadata
// ============================================================================

/// Read-only model metadata supplied by the schema layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelMeta {
    pub name: String,
    pub primary_key_field: Option<String>,
    pub attributes: Vec<AttributeDefinition>,
    /// Column sets of unique indexes declared outside the attributes
    pub unique_indexes: Vec<Vec<String>>,
}

impl ModelMeta {
    pub fn new(name: impl Into<String>, attributes: Vec<AttributeDefinition>) -> Self {
        let primary_key_field = attributes
            .iter()
            .find(|a| a.is_primary_key())
            .map(|a| a.name.clone());
        Self {
            name: name.into(),
            primary_key_field,
            attributes,
            unique_indexes: Vec::new(),
        }
    }

    pub fn unique_index(mut self, fields: Vec<String>) -> Self {
        self.unique_indexes.push(fields);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn primary_keys(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|a| a.is_primary_key())
            .map(|a| a.name.as_str())
            .collect()
    }

    /// Unique attributes followed by columns of unique indexes, deduplicated
    pub fn unique_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .attributes
            .iter()
            .filter(|a| a.unique)
            .map(|a| a.name.as_str())
            .collect();
        for field in self.unique_indexes.iter().flatten() {
            if !keys.contains(&field.as_str()) && self.attribute(field).is_some() {
                keys.push(field.as_str());
            }
        }
        keys
    }

    pub fn identity_columns(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|a| a.auto_increment)
            .map(|a| a.name.as_str())
            .collect()
    }
}
