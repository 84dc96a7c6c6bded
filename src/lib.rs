//! # mssql-query-generator
//!
//! Compiles structured database operations into Microsoft SQL Server
//! (T-SQL) text.
//!
//! The generator performs no I/O. It takes table references, attribute
//! definitions, row payloads and conditions, and returns SQL that an
//! execution layer runs against the server.
//!
//! ## Features
//!
//! - **DDL**: Guarded CREATE TABLE, column changes, constraints, schemas, and
//!   column descriptions stored as `MS_Description` extended properties
//! - **DML**: Batched multi-row INSERT, MERGE-based upsert, UPDATE, DELETE and
//!   SELECT composition with OFFSET/FETCH paging and table hints
//! - **Introspection**: Default, primary key and foreign key constraint lookups,
//!   table and schema listings, server version
//! - **SQL Injection Prevention**: Every identifier is bracket-quoted and every
//!   literal escaped through a single [`Escaper`]
//!
//! ## Quick Start
//!
//! ```rust
//! use mssql_query_generator::{AttributeDefinition, QueryGenerator, QueryOptions};
//!
//! let generator = QueryGenerator::default();
//! let sql = generator
//!     .create_table_query(
//!         "myTable",
//!         &[AttributeDefinition::new("int", "INTEGER")],
//!         &QueryOptions::default(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(
//!     sql.to_sql(),
//!     "IF OBJECT_ID(N'[myTable]', 'U') IS NULL CREATE TABLE [myTable] ([int] INTEGER);"
//! );
//! ```
//!
//! ## Configuration
//!
//! Dialect settings are fixed when the generator is created:
//!
//! ```rust
//! use mssql_query_generator::{DialectConfig, QueryGenerator};
//!
//! let config = DialectConfig::builder()
//!     .default_schema("sales")   // Schema for unqualified tables (default: dbo)
//!     .database_version(11)      // SQL Server 2012; enables OFFSET/FETCH
//!     .build();
//! let generator = QueryGenerator::new(config);
//! ```
//!
//! ## Logging
//!
//! Builders emit `tracing` events: `trace` with each compiled statement and
//! `debug` for decisions such as batching or dropped upsert clauses. The
//! library never installs a subscriber.

pub mod config;
pub mod error;
pub mod generator;
pub mod sql;
pub mod types;
pub mod value;

// Re-export main types for convenience
pub use config::{DialectConfig, DialectConfigBuilder};
pub use error::{QueryGeneratorError, Result};
pub use generator::{QueryGenerator, Statements};
pub use types::{
    AttributeDefinition, ModelMeta, QueryOptions, References, TableHint, TableReference,
    UniqueKey,
};
pub use value::{Row, SqlValue};

// Re-export SQL utilities for advanced users
pub use sql::condition::{Condition, ConditionContext, Operator, TableContext, compile_condition};
pub use sql::sanitize::{Escaper, quote_identifier};
