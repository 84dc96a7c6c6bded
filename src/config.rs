//! Dialect configuration for the query generator
//!
//! Provides a builder pattern for configuring quoting and escaping rules.
//! A configuration is fixed once it is built and handed to a
//! [`QueryGenerator`](crate::QueryGenerator).

/// First SQL Server major version that supports `OFFSET ... FETCH` paging (2012)
pub const OFFSET_FETCH_MIN_VERSION: u32 = 11;

/// Quoting and escaping rules for a SQL Server target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectConfig {
    /// Schema used when a table reference has none (default: "dbo")
    pub default_schema: String,
    /// Opening identifier delimiter (default: '[')
    pub quote_start: char,
    /// Closing identifier delimiter, doubled when it appears inside a name (default: ']')
    pub quote_end: char,
    /// Whether string literals carry the `N` unicode prefix (default: true)
    pub unicode_strings: bool,
    /// Whether booleans render as TRUE/FALSE instead of 1/0 (default: false)
    pub native_boolean: bool,
    /// Major version of the target server (default: 15, SQL Server 2019)
    pub database_version: u32,
}

impl DialectConfig {
    /// Create a new configuration builder
    pub fn builder() -> DialectConfigBuilder {
        DialectConfigBuilder::new()
    }

    /// Whether the target server understands `OFFSET ... FETCH NEXT`
    pub fn supports_offset_fetch(&self) -> bool {
        self.database_version >= OFFSET_FETCH_MIN_VERSION
    }
}

impl Default for DialectConfig {
    fn default() -> Self {
        DialectConfigBuilder::new().build()
    }
}

/// Builder for DialectConfig
#[derive(Debug)]
pub struct DialectConfigBuilder {
    default_schema: String,
    quote_start: char,
    quote_end: char,
    unicode_strings: bool,
    native_boolean: bool,
    database_version: u32,
}

impl DialectConfigBuilder {
    /// Create a new builder with SQL Server defaults
    pub fn new() -> Self {
        Self {
            default_schema: "dbo".to_string(),
            quote_start: '[',
            quote_end: ']',
            unicode_strings: true,
            native_boolean: false,
            database_version: 15,
        }
    }

    /// Set the implicit default schema (default: "dbo")
    pub fn default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }

    /// Set the identifier delimiters (default: '[' and ']')
    pub fn identifier_quotes(mut self, start: char, end: char) -> Self {
        self.quote_start = start;
        self.quote_end = end;
        self
    }

    /// Enable or disable the `N` prefix on string literals (default: true)
    pub fn unicode_strings(mut self, enabled: bool) -> Self {
        self.unicode_strings = enabled;
        self
    }

    /// Render booleans as TRUE/FALSE rather than 1/0 (default: false)
    pub fn native_boolean(mut self, enabled: bool) -> Self {
        self.native_boolean = enabled;
        self
    }

    /// Set the target server major version (default: 15)
    pub fn database_version(mut self, major: u32) -> Self {
        self.database_version = major;
        self
    }

    /// Build the configuration
    pub fn build(self) -> DialectConfig {
        DialectConfig {
            default_schema: self.default_schema,
            quote_start: self.quote_start,
            quote_end: self.quote_end,
            unicode_strings: self.unicode_strings,
            native_boolean: self.native_boolean,
            database_version: self.database_version,
        }
    }
}

impl Default for DialectConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
