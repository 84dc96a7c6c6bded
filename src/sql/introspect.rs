//! Catalog queries for SQL Server
//!
//! These statements read `INFORMATION_SCHEMA` and the `sys` catalog views.
//! Output columns use canonical aliases (`tableName`, `columnName`,
//! `constraintName`, `referencedTableName`, `referencedColumnName`) so result
//! parsing does not depend on the server's casing.

use crate::generator::{QueryGenerator, traced};
use crate::sql::sanitize::quote_plain;
use crate::types::TableReference;

const FOREIGN_KEY_SELECT: &str = "SELECT constraint_name = OBJ.NAME, constraintName = OBJ.NAME, constraintSchema = SCHEMA_NAME(OBJ.SCHEMA_ID), tableName = TB.NAME, tableSchema = SCHEMA_NAME(TB.SCHEMA_ID), columnName = COL.NAME, referencedTableSchema = SCHEMA_NAME(RTB.SCHEMA_ID), referencedTableName = RTB.NAME, referencedColumnName = RCOL.NAME FROM sys.foreign_key_columns FKC INNER JOIN sys.objects OBJ ON OBJ.OBJECT_ID = FKC.CONSTRAINT_OBJECT_ID INNER JOIN sys.tables TB ON TB.OBJECT_ID = FKC.PARENT_OBJECT_ID INNER JOIN sys.columns COL ON COL.COLUMN_ID = PARENT_COLUMN_ID AND COL.OBJECT_ID = TB.OBJECT_ID INNER JOIN sys.tables RTB ON RTB.OBJECT_ID = FKC.REFERENCED_OBJECT_ID INNER JOIN sys.columns RCOL ON RCOL.COLUMN_ID = REFERENCED_COLUMN_ID AND RCOL.OBJECT_ID = RTB.OBJECT_ID";

impl QueryGenerator {
    /// Look up the name of the DEFAULT constraint on a column
    pub fn get_default_constraint_query(
        &self,
        table: impl Into<TableReference>,
        column: &str,
    ) -> String {
        let object = quote_plain(&self.escaper().quote_table(&table.into()));
        traced(
            "get_default_constraint",
            format!(
                "SELECT name FROM sys.default_constraints WHERE PARENT_OBJECT_ID = OBJECT_ID({0}, 'U') AND PARENT_COLUMN_ID = (SELECT column_id FROM sys.columns WHERE NAME = ({1}) AND object_id = OBJECT_ID({0}, 'U'));",
                object,
                quote_plain(column)
            ),
        )
    }

    /// Look up the PRIMARY KEY constraint a column belongs to
    pub fn get_primary_key_constraint_query(
        &self,
        table: impl Into<TableReference>,
        column: &str,
    ) -> String {
        let table = table.into();
        let mut sql = format!(
            "SELECT K.TABLE_NAME AS tableName, K.COLUMN_NAME AS columnName, K.CONSTRAINT_NAME AS constraintName FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS AS C JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE AS K ON C.TABLE_NAME = K.TABLE_NAME AND C.CONSTRAINT_CATALOG = K.CONSTRAINT_CATALOG AND C.CONSTRAINT_SCHEMA = K.CONSTRAINT_SCHEMA AND C.CONSTRAINT_NAME = K.CONSTRAINT_NAME WHERE C.CONSTRAINT_TYPE = 'PRIMARY KEY' AND K.COLUMN_NAME = {} AND K.TABLE_NAME = {}",
            quote_plain(column),
            quote_plain(&table.name)
        );
        if let Some(schema) = &table.schema {
            sql.push_str(&format!(" AND K.TABLE_SCHEMA = {}", quote_plain(schema)));
        }
        sql.push(';');
        traced("get_primary_key_constraint", sql)
    }

    /// Look up the foreign keys defined on one column
    ///
    /// A schema-qualified table adds exactly one schema predicate.
    pub fn get_foreign_key_query(&self, table: impl Into<TableReference>, column: &str) -> String {
        let table = table.into();
        let sql = format!(
            "{} WHERE TB.NAME ={} AND COL.NAME ={}{}",
            FOREIGN_KEY_SELECT,
            quote_plain(&table.name),
            quote_plain(column),
            schema_predicate(&table)
        );
        traced("get_foreign_key", sql)
    }

    /// Look up every foreign key defined on a table
    pub fn get_foreign_keys_query(&self, table: impl Into<TableReference>) -> String {
        let table = table.into();
        let sql = format!(
            "{} WHERE TB.NAME ={}{}",
            FOREIGN_KEY_SELECT,
            quote_plain(&table.name),
            schema_predicate(&table)
        );
        traced("get_foreign_keys", sql)
    }

    /// List base tables with their schemas
    pub fn show_tables_query(&self) -> String {
        traced(
            "show_tables",
            "SELECT TABLE_NAME, TABLE_SCHEMA FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_TYPE = 'BASE TABLE';"
                .to_string(),
        )
    }

    /// Report the server version as `major.minor.build`
    pub fn version_query(&self) -> String {
        traced(
            "version",
            "DECLARE @ms_ver NVARCHAR(20); SET @ms_ver = REVERSE(CONVERT(NVARCHAR(20), SERVERPROPERTY('ProductVersion'))); SELECT REVERSE(SUBSTRING(@ms_ver, CHARINDEX('.', @ms_ver)+1, 20)) AS 'version'"
                .to_string(),
        )
    }

    /// Describe the columns of a table: type, length, nullability, default,
    /// primary key membership and description
    pub fn describe_table_query(&self, table: impl Into<TableReference>) -> String {
        let table = table.into();
        let schema = quote_plain(self.escaper().schema_of(&table));
        traced(
            "describe_table",
            format!(
                "SELECT c.COLUMN_NAME AS 'Name', c.DATA_TYPE AS 'Type', c.CHARACTER_MAXIMUM_LENGTH AS 'Length', c.IS_NULLABLE AS 'IsNull', COLUMN_DEFAULT AS 'Default', pk.CONSTRAINT_TYPE AS 'Constraint', COLUMNPROPERTY(OBJECT_ID(c.TABLE_SCHEMA+'.'+c.TABLE_NAME), c.COLUMN_NAME, 'IsIdentity') AS 'IsIdentity', CAST(prop.value AS NVARCHAR) AS 'Comment' FROM INFORMATION_SCHEMA.TABLES t INNER JOIN INFORMATION_SCHEMA.COLUMNS c ON t.TABLE_NAME = c.TABLE_NAME AND t.TABLE_SCHEMA = c.TABLE_SCHEMA LEFT JOIN (SELECT tc.table_schema, tc.table_name, cu.column_name, tc.CONSTRAINT_TYPE FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE cu ON tc.table_schema=cu.table_schema AND tc.table_name=cu.table_name AND tc.constraint_name=cu.constraint_name AND tc.CONSTRAINT_TYPE='PRIMARY KEY') pk ON pk.table_schema=c.table_schema AND pk.table_name=c.table_name AND pk.column_name=c.column_name INNER JOIN sys.columns AS sc ON sc.object_id = OBJECT_ID(t.table_schema + '.' + t.table_name) AND sc.name = c.column_name LEFT JOIN sys.extended_properties prop ON prop.major_id = sc.object_id AND prop.minor_id = sc.column_id AND prop.name = 'MS_Description' WHERE t.TABLE_NAME = {} AND t.TABLE_SCHEMA = {};",
                quote_plain(&table.name),
                schema
            ),
        )
    }

    /// List the indexes of a table
    pub fn show_indexes_query(&self, table: impl Into<TableReference>) -> String {
        let escaper = self.escaper();
        let object = escaper.quote_table(&table.into());
        traced(
            "show_indexes",
            format!("EXEC sys.sp_helpindex @objname = {};", escaper.escape_string(&object)),
        )
    }

    /// List user schemas, excluding the built-in ones
    pub fn show_schemas_query(&self) -> String {
        traced(
            "show_schemas",
            "SELECT name AS schema_name FROM sys.schemas WHERE name NOT IN ('INFORMATION_SCHEMA', 'dbo', 'guest', 'sys', 'archive') AND principal_id = 1;"
                .to_string(),
        )
    }
}

fn schema_predicate(table: &TableReference) -> String {
    match &table.schema {
        Some(schema) => format!(" AND SCHEMA_NAME(TB.SCHEMA_ID) ={}", quote_plain(schema)),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DialectConfig;

    fn generator() -> QueryGenerator {
        QueryGenerator::default()
    }

    // ==================== Constraint Lookup Tests ====================

    #[test]
    fn test_default_constraint_without_schema() {
        let sql = generator().get_default_constraint_query("t", "c");
        assert_eq!(
            sql,
            "SELECT name FROM sys.default_constraints WHERE PARENT_OBJECT_ID = OBJECT_ID('[t]', 'U') AND PARENT_COLUMN_ID = (SELECT column_id FROM sys.columns WHERE NAME = ('c') AND object_id = OBJECT_ID('[t]', 'U'));"
        );
    }

    #[test]
    fn test_default_constraint_escapes_quotes() {
        let sql = generator().get_default_constraint_query("o't", "c'1");
        assert!(sql.contains("OBJECT_ID('[o''t]', 'U')"));
        assert!(sql.contains("NAME = ('c''1')"));
    }

    #[test]
    fn test_primary_key_constraint_with_schema() {
        let sql = generator().get_primary_key_constraint_query(("sales", "orders"), "id");
        assert!(sql.ends_with(
            "AND K.COLUMN_NAME = 'id' AND K.TABLE_NAME = 'orders' AND K.TABLE_SCHEMA = 'sales';"
        ));
    }

    // ==================== Foreign Key Tests ====================

    #[test]
    fn test_foreign_key_schema_adds_one_clause() {
        let plain = generator().get_foreign_key_query("myTable", "myColumn");
        let scoped = generator().get_foreign_key_query(("mySchema", "myTable"), "myColumn");

        assert_eq!(scoped, format!("{} AND SCHEMA_NAME(TB.SCHEMA_ID) ='mySchema'", plain));
        assert_eq!(
            scoped.matches(" AND ").count(),
            plain.matches(" AND ").count() + 1
        );
    }

    #[test]
    fn test_foreign_keys_of_table() {
        let sql = generator().get_foreign_keys_query(("s", "t"));
        assert!(sql.starts_with("SELECT constraint_name = OBJ.NAME, constraintName = OBJ.NAME"));
        assert!(sql.ends_with("WHERE TB.NAME ='t' AND SCHEMA_NAME(TB.SCHEMA_ID) ='s'"));
        assert!(!sql.contains("COL.NAME ='"));
    }

    #[test]
    fn test_foreign_key_aliases_are_canonical() {
        let sql = generator().get_foreign_keys_query("t");
        for alias in [
            "constraintName =",
            "tableName =",
            "columnName =",
            "referencedTableName =",
            "referencedColumnName =",
        ] {
            assert!(sql.contains(alias), "missing alias {}", alias);
        }
    }

    // ==================== Catalog Listing Tests ====================

    #[test]
    fn test_describe_table_uses_default_schema() {
        let generator = QueryGenerator::new(DialectConfig::builder().default_schema("app").build());
        let sql = generator.describe_table_query("users");
        assert!(sql.ends_with("WHERE t.TABLE_NAME = 'users' AND t.TABLE_SCHEMA = 'app';"));
    }

    #[test]
    fn test_show_indexes() {
        assert_eq!(
            generator().show_indexes_query(("s", "t")),
            "EXEC sys.sp_helpindex @objname = N'[s].[t]';"
        );
    }

    #[test]
    fn test_show_schemas() {
        let sql = generator().show_schemas_query();
        assert!(sql.starts_with("SELECT name AS schema_name FROM sys.schemas"));
        assert!(sql.ends_with(';'));
    }

    #[test]
    fn test_show_tables_and_version_are_constant() {
        let g = generator();
        assert_eq!(g.show_tables_query(), g.show_tables_query());
        assert!(g.version_query().ends_with("AS 'version'"));
    }
}
