//! DDL generation for SQL Server
//!
//! Table, column, constraint and schema statements. Column comments are
//! stored as `MS_Description` extended properties, so DDL that carries
//! comments produces a [`Statements`] sequence rather than a single string.

use crate::error::{QueryGeneratorError, Result};
use crate::generator::{QueryGenerator, Statements, traced};
use crate::sql::sanitize::quote_plain;
use crate::types::{AttributeDefinition, QueryOptions, References, TableReference};

/// Where a column definition is going to be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnContext {
    /// Inside CREATE TABLE; keys move to table-level constraints
    CreateTable,
    /// ALTER TABLE ... ADD; nullability is always spelled out
    AddColumn,
    /// ALTER TABLE ... ALTER COLUMN; only type and nullability are allowed
    ChangeColumn,
}

/// A rendered column definition with the parts that live outside it
#[derive(Debug, Default)]
struct ColumnParts {
    definition: String,
    comment: Option<String>,
    /// `REFERENCES ...` clause pulled out of the definition
    references: Option<String>,
}

impl QueryGenerator {
    /// Generate a guarded CREATE TABLE followed by comment registrations
    ///
    /// The CREATE TABLE only runs when `OBJECT_ID(<table>, 'U')` is NULL, so
    /// executing the text twice is harmless. Primary keys (flagged or inline)
    /// become a table-level `PRIMARY KEY (...)` and references become
    /// `FOREIGN KEY (...)` clauses. Each commented attribute adds one
    /// `sp_addextendedproperty` call, in attribute order.
    pub fn create_table_query(
        &self,
        table: impl Into<TableReference>,
        attributes: &[AttributeDefinition],
        options: &QueryOptions,
    ) -> Result<Statements> {
        let table = table.into();
        let escaper = self.escaper();
        let quoted_table = escaper.quote_table(&table);

        let mut clauses = Vec::with_capacity(attributes.len() + 2);
        let mut primary_keys = Vec::new();
        let mut foreign_keys = Vec::new();
        let mut comments = Vec::new();

        for attr in attributes {
            let parts = self.column_parts(&table, attr, ColumnContext::CreateTable)?;
            let column = escaper.quote_identifier(&attr.name);

            clauses.push(format!("{} {}", column, parts.definition));
            if attr.is_primary_key() {
                primary_keys.push(column.clone());
            }
            if let Some(references) = parts.references {
                foreign_keys.push(format!("FOREIGN KEY ({}) {}", column, references));
            }
            if let Some(comment) = parts.comment {
                comments.push(self.comment_statement(&table, Some(&attr.name), &comment));
            }
        }

        for key in &options.unique_keys {
            let name = key
                .name
                .clone()
                .unwrap_or_else(|| format!("uniq_{}_{}", table.name, key.fields.join("_")));
            let fields: Vec<String> = key
                .fields
                .iter()
                .map(|f| escaper.quote_identifier(f))
                .collect();
            clauses.push(format!(
                "CONSTRAINT {} UNIQUE ({})",
                escaper.quote_identifier(&name),
                fields.join(", ")
            ));
        }

        if !primary_keys.is_empty() {
            clauses.push(format!("PRIMARY KEY ({})", primary_keys.join(", ")));
        }
        clauses.extend(foreign_keys);

        let mut statements = Statements::new();
        statements.push(format!(
            "IF OBJECT_ID({}, 'U') IS NULL CREATE TABLE {} ({})",
            escaper.escape_string(&quoted_table),
            quoted_table,
            clauses.join(", ")
        ));
        if let Some(comment) = &options.comment {
            statements.push(self.comment_statement(&table, None, comment));
        }
        for comment in comments {
            statements.push(comment);
        }

        Ok(traced("create_table", statements))
    }

    /// Generate ALTER TABLE ... ADD, plus a comment registration when the
    /// attribute carries a comment
    ///
    /// The first statement is the same with or without a comment.
    pub fn add_column_query(
        &self,
        table: impl Into<TableReference>,
        attribute: &AttributeDefinition,
    ) -> Result<Statements> {
        let table = table.into();
        let escaper = self.escaper();
        let parts = self.column_parts(&table, attribute, ColumnContext::AddColumn)?;

        let mut statements = Statements::new();
        statements.push(format!(
            "ALTER TABLE {} ADD {} {}",
            escaper.quote_table(&table),
            escaper.quote_identifier(&attribute.name),
            parts.definition
        ));
        if let Some(comment) = parts.comment {
            statements.push(self.comment_statement(&table, Some(&attribute.name), &comment));
        }

        Ok(traced("add_column", statements))
    }

    /// Generate ALTER TABLE ... ALTER COLUMN
    ///
    /// Defaults, unique flags and references become separate `ADD`
    /// statements. Drop an existing default first (see
    /// [`QueryGenerator::get_default_constraint_query`]). IDENTITY cannot be
    /// added to an existing column.
    pub fn change_column_query(
        &self,
        table: impl Into<TableReference>,
        attribute: &AttributeDefinition,
    ) -> Result<Statements> {
        let table = table.into();
        if attribute.auto_increment {
            return Err(QueryGeneratorError::unsupported(format!(
                "Cannot turn existing column '{}' into an IDENTITY column",
                attribute.name
            )));
        }

        let escaper = self.escaper();
        let quoted_table = escaper.quote_table(&table);
        let column = escaper.quote_identifier(&attribute.name);
        let parts = self.column_parts(&table, attribute, ColumnContext::ChangeColumn)?;

        let mut statements = Statements::new();
        statements.push(format!(
            "ALTER TABLE {} ALTER COLUMN {} {}",
            quoted_table, column, parts.definition
        ));
        if let Some(default) = &attribute.default_value {
            statements.push(format!(
                "ALTER TABLE {} ADD DEFAULT {} FOR {}",
                quoted_table,
                escaper.escape_value(default, Some(&attribute.data_type))?,
                column
            ));
        }
        if attribute.unique {
            statements.push(format!("ALTER TABLE {} ADD UNIQUE ({})", quoted_table, column));
        }
        if let Some(references) = parts.references {
            statements.push(format!(
                "ALTER TABLE {} ADD FOREIGN KEY ({}) {}",
                quoted_table, column, references
            ));
        }
        if parts.comment.is_some() {
            tracing::debug!(
                column = %attribute.name,
                "change_column ignores comments; use comment_query"
            );
        }

        Ok(traced("change_column", statements))
    }

    /// Generate ALTER TABLE ... DROP COLUMN
    pub fn remove_column_query(&self, table: impl Into<TableReference>, column: &str) -> String {
        let escaper = self.escaper();
        traced(
            "remove_column",
            format!(
                "ALTER TABLE {} DROP COLUMN {};",
                escaper.quote_table(&table.into()),
                escaper.quote_identifier(column)
            ),
        )
    }

    /// Generate `EXEC sp_rename` for a column
    pub fn rename_column_query(
        &self,
        table: impl Into<TableReference>,
        before: &str,
        after: &str,
    ) -> String {
        let escaper = self.escaper();
        let current = format!(
            "{}.{}",
            escaper.quote_table(&table.into()),
            escaper.quote_identifier(before)
        );
        traced(
            "rename_column",
            format!(
                "EXEC sp_rename {}, {}, N'COLUMN';",
                escaper.escape_string(&current),
                escaper.escape_string(after)
            ),
        )
    }

    /// Generate `EXEC sp_rename` for a table
    ///
    /// `sp_rename` cannot move a table to another schema, so a target with a
    /// different schema is rejected.
    pub fn rename_table_query(
        &self,
        before: impl Into<TableReference>,
        after: impl Into<TableReference>,
    ) -> Result<String> {
        let before = before.into();
        let after = after.into();
        if after.schema.is_some() && after.schema != before.schema {
            return Err(QueryGeneratorError::unsupported(format!(
                "Renaming '{}' cannot move it to schema '{}'",
                before.name,
                after.schema.as_deref().unwrap_or_default()
            )));
        }

        let escaper = self.escaper();
        let current = escaper.quote_table(&before);
        // Multi-part names must be passed as a string literal
        let current = if before.schema.is_some() {
            escaper.escape_string(&current)
        } else {
            current
        };

        Ok(traced(
            "rename_table",
            format!(
                "EXEC sp_rename {}, {};",
                current,
                escaper.quote_identifier(&after.name)
            ),
        ))
    }

    /// Generate a guarded DROP TABLE
    pub fn drop_table_query(&self, table: impl Into<TableReference>) -> String {
        let escaper = self.escaper();
        let quoted_table = escaper.quote_table(&table.into());
        traced(
            "drop_table",
            format!(
                "IF OBJECT_ID({}, 'U') IS NOT NULL DROP TABLE {};",
                escaper.escape_string(&quoted_table),
                quoted_table
            ),
        )
    }

    /// Generate TRUNCATE TABLE
    pub fn truncate_table_query(&self, table: impl Into<TableReference>) -> String {
        traced(
            "truncate_table",
            format!("TRUNCATE TABLE {};", self.escaper().quote_table(&table.into())),
        )
    }

    /// Generate ALTER TABLE ... DROP CONSTRAINT
    pub fn drop_constraint_query(
        &self,
        table: impl Into<TableReference>,
        constraint_name: &str,
    ) -> String {
        let escaper = self.escaper();
        traced(
            "drop_constraint",
            format!(
                "ALTER TABLE {} DROP CONSTRAINT {};",
                escaper.quote_table(&table.into()),
                escaper.quote_identifier(constraint_name)
            ),
        )
    }

    /// Generate ALTER TABLE ... DROP for a foreign key constraint
    pub fn drop_foreign_key_query(
        &self,
        table: impl Into<TableReference>,
        foreign_key: &str,
    ) -> String {
        let escaper = self.escaper();
        traced(
            "drop_foreign_key",
            format!(
                "ALTER TABLE {} DROP {}",
                escaper.quote_table(&table.into()),
                escaper.quote_identifier(foreign_key)
            ),
        )
    }

    /// Generate DROP INDEX
    pub fn remove_index_query(&self, table: impl Into<TableReference>, index_name: &str) -> String {
        let escaper = self.escaper();
        traced(
            "remove_index",
            format!(
                "DROP INDEX {} ON {};",
                escaper.quote_identifier(index_name),
                escaper.quote_table(&table.into())
            ),
        )
    }

    /// Generate CREATE SCHEMA guarded by a catalog lookup
    pub fn create_schema_query(&self, schema: &str) -> String {
        traced("create_schema", self.guarded_schema_statement(schema, "NOT EXISTS", "CREATE"))
    }

    /// Generate DROP SCHEMA guarded by a catalog lookup
    pub fn drop_schema_query(&self, schema: &str) -> String {
        traced("drop_schema", self.guarded_schema_statement(schema, "EXISTS", "DROP"))
    }

    /// Generate a single `sp_addextendedproperty` registration
    ///
    /// With a column the description attaches to the column, otherwise to
    /// the table.
    pub fn comment_query(
        &self,
        table: impl Into<TableReference>,
        column: Option<&str>,
        comment: &str,
    ) -> String {
        let statement = self.comment_statement(&table.into(), column, comment);
        traced("comment", format!("{};", statement))
    }

    fn guarded_schema_statement(&self, schema: &str, guard: &str, verb: &str) -> String {
        let escaper = self.escaper();
        // CREATE/DROP SCHEMA must be alone in its batch, hence sp_executesql
        let inner = format!("{} SCHEMA {};", verb, escaper.quote_identifier(schema));
        format!(
            "IF {} (SELECT schema_name FROM INFORMATION_SCHEMA.SCHEMATA WHERE schema_name = {}) BEGIN EXEC sp_executesql {} END;",
            guard,
            quote_plain(schema),
            escaper.escape_string(&inner)
        )
    }

    fn comment_statement(
        &self,
        table: &TableReference,
        column: Option<&str>,
        comment: &str,
    ) -> String {
        let escaper = self.escaper();
        let mut statement = format!(
            "EXEC sp_addextendedproperty @name = N'MS_Description', @value = {}, @level0type = N'Schema', @level0name = {}, @level1type = N'Table', @level1name = {}",
            escaper.escape_string(comment),
            quote_plain(escaper.schema_of(table)),
            escaper.quote_identifier(&table.name)
        );
        if let Some(column) = column {
            statement.push_str(&format!(
                ", @level2type = N'Column', @level2name = {}",
                escaper.quote_identifier(column)
            ));
        }
        statement
    }

    fn column_parts(
        &self,
        table: &TableReference,
        attr: &AttributeDefinition,
        context: ColumnContext,
    ) -> Result<ColumnParts> {
        let escaper = self.escaper();
        let parsed = AttributeDefinition::parse(attr.name.as_str(), &attr.data_type);
        let comment = attr.comment.clone().or(parsed.comment);
        let (data_type, inline_references) =
            AttributeDefinition::split_inline_references(&parsed.data_type);

        let mut definition = data_type;
        if context == ColumnContext::CreateTable {
            definition = collapse_whitespace(&definition.replace("PRIMARY KEY", ""));
        }
        let upper = definition.to_uppercase();

        match attr.allow_null {
            Some(false) if !upper.contains("NOT NULL") => definition.push_str(" NOT NULL"),
            Some(true) if !upper.ends_with("NULL") => definition.push_str(" NULL"),
            None if context != ColumnContext::CreateTable
                && !attr.is_primary_key()
                && attr.default_value.is_none()
                && !upper.contains("NULL") =>
            {
                definition.push_str(" NULL")
            }
            _ => {}
        }

        if context != ColumnContext::ChangeColumn {
            if attr.auto_increment && !upper.contains("IDENTITY") {
                definition.push_str(" IDENTITY(1,1)");
            }
            if let Some(default) = &attr.default_value {
                definition.push_str(&format!(
                    " DEFAULT {}",
                    escaper.escape_value(default, Some(&attr.data_type))?
                ));
            }
            if attr.unique && !upper.contains("UNIQUE") {
                definition.push_str(" UNIQUE");
            }
        }

        let references = match &attr.references {
            Some(references) => Some(self.references_clause(table, attr, references)),
            None => inline_references,
        };

        let references = if context == ColumnContext::AddColumn {
            if attr.primary_key && !upper.contains("PRIMARY KEY") {
                definition.push_str(" PRIMARY KEY");
            }
            if let Some(references) = references {
                definition.push(' ');
                definition.push_str(&references);
            }
            None
        } else {
            references
        };

        Ok(ColumnParts {
            definition,
            comment,
            references,
        })
    }

    fn references_clause(
        &self,
        table: &TableReference,
        attr: &AttributeDefinition,
        references: &References,
    ) -> String {
        let escaper = self.escaper();
        let mut clause = format!(
            "REFERENCES {} ({})",
            escaper.quote_table(&references.table),
            escaper.quote_identifier(references.key.as_deref().unwrap_or("id"))
        );
        // SQL Server rejects cascading actions on self-references
        if references.table.name == table.name && references.table.schema == table.schema {
            tracing::debug!(
                column = %attr.name,
                "dropping ON DELETE/ON UPDATE on self-referencing foreign key"
            );
            return clause;
        }
        if let Some(action) = &references.on_delete {
            clause.push_str(&format!(" ON DELETE {}", action.to_uppercase()));
        }
        if let Some(action) = &references.on_update {
            clause.push_str(&format!(" ON UPDATE {}", action.to_uppercase()));
        }
        clause
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DialectConfig;
    use crate::types::UniqueKey;

    fn generator() -> QueryGenerator {
        QueryGenerator::default()
    }

    // ==================== CREATE TABLE Tests ====================

    #[test]
    fn test_create_table_single_column() {
        let sql = generator()
            .create_table_query(
                "myTable",
                &[AttributeDefinition::new("int", "INTEGER")],
                &QueryOptions::default(),
            )
            .unwrap();

        assert_eq!(sql.len(), 1);
        assert_eq!(
            sql.to_sql(),
            "IF OBJECT_ID(N'[myTable]', 'U') IS NULL CREATE TABLE [myTable] ([int] INTEGER);"
        );
    }

    #[test]
    fn test_create_table_with_schema() {
        let sql = generator()
            .create_table_query(
                TableReference::with_schema("sales", "orders"),
                &[AttributeDefinition::new("id", "INTEGER")],
                &QueryOptions::default(),
            )
            .unwrap()
            .to_sql();

        assert!(sql.starts_with(
            "IF OBJECT_ID(N'[sales].[orders]', 'U') IS NULL CREATE TABLE [sales].[orders]"
        ));
    }

    #[test]
    fn test_create_table_primary_keys_move_to_constraint() {
        let attributes = vec![
            AttributeDefinition::new("id", "INTEGER")
                .primary_key()
                .auto_increment()
                .not_null(),
            AttributeDefinition::new("code", "NVARCHAR(10) PRIMARY KEY"),
            AttributeDefinition::new("name", "NVARCHAR(255)"),
        ];
        let sql = generator()
            .create_table_query("items", &attributes, &QueryOptions::default())
            .unwrap()
            .to_sql();

        assert_eq!(
            sql,
            "IF OBJECT_ID(N'[items]', 'U') IS NULL CREATE TABLE [items] ([id] INTEGER NOT NULL IDENTITY(1,1), [code] NVARCHAR(10), [name] NVARCHAR(255), PRIMARY KEY ([id], [code]));"
        );
    }

    #[test]
    fn test_create_table_references_move_to_foreign_keys() {
        let attributes = vec![
            AttributeDefinition::new("id", "INTEGER").primary_key(),
            AttributeDefinition::new("user_id", "INTEGER").references(
                References::new("users").key("id").on_delete("cascade"),
            ),
            AttributeDefinition::new("org_id", "INTEGER NULL REFERENCES [orgs] ([id])"),
        ];
        let sql = generator()
            .create_table_query("posts", &attributes, &QueryOptions::default())
            .unwrap()
            .to_sql();

        assert!(sql.contains("[user_id] INTEGER, [org_id] INTEGER NULL, PRIMARY KEY ([id])"));
        assert!(sql.contains(
            "FOREIGN KEY ([user_id]) REFERENCES [users] ([id]) ON DELETE CASCADE, FOREIGN KEY ([org_id]) REFERENCES [orgs] ([id]))"
        ));
    }

    #[test]
    fn test_create_table_self_reference_drops_cascade() {
        let attributes = vec![AttributeDefinition::new("parent_id", "INTEGER").references(
            References::new("nodes").on_delete("CASCADE").on_update("CASCADE"),
        )];
        let sql = generator()
            .create_table_query("nodes", &attributes, &QueryOptions::default())
            .unwrap()
            .to_sql();

        assert!(sql.contains("FOREIGN KEY ([parent_id]) REFERENCES [nodes] ([id]))"));
        assert!(!sql.contains("CASCADE"));
    }

    #[test]
    fn test_create_table_unique_keys() {
        let options = QueryOptions::new()
            .unique_key(UniqueKey::new(vec!["a".to_string(), "b".to_string()]))
            .unique_key(UniqueKey::new(vec!["c".to_string()]).named("c_unique"));
        let attributes = vec![
            AttributeDefinition::new("a", "INTEGER"),
            AttributeDefinition::new("b", "INTEGER"),
            AttributeDefinition::new("c", "INTEGER"),
        ];
        let sql = generator()
            .create_table_query("t", &attributes, &options)
            .unwrap()
            .to_sql();

        assert!(sql.contains(
            "CONSTRAINT [uniq_t_a_b] UNIQUE ([a], [b]), CONSTRAINT [c_unique] UNIQUE ([c])"
        ));
    }

    #[test]
    fn test_create_table_structured_and_inline_comments_match() {
        let inline = vec![AttributeDefinition::new("int", "INTEGER COMMENT Foo Bar")];
        let structured = vec![AttributeDefinition::new("int", "INTEGER").comment("Foo Bar")];
        let options = QueryOptions::default();

        assert_eq!(
            generator().create_table_query("myTable", &inline, &options).unwrap(),
            generator().create_table_query("myTable", &structured, &options).unwrap()
        );
    }

    #[test]
    fn test_create_table_comment_escaping() {
        let attributes = vec![AttributeDefinition::new("c", "INTEGER").comment("it's 'quoted'")];
        let sql = generator()
            .create_table_query("t", &attributes, &QueryOptions::default())
            .unwrap()
            .to_sql();

        assert!(sql.contains("@value = N'it''s ''quoted'''"));
    }

    #[test]
    fn test_create_table_table_comment() {
        let options = QueryOptions::new().comment("Orders table");
        let statements = generator()
            .create_table_query(
                "orders",
                &[AttributeDefinition::new("id", "INTEGER").comment("Key")],
                &options,
            )
            .unwrap();

        let parts: Vec<&str> = statements.iter().collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[1].ends_with("@level1type = N'Table', @level1name = [orders]"));
        assert!(parts[2].ends_with("@level2type = N'Column', @level2name = [id]"));
    }

    #[test]
    fn test_create_table_comment_uses_table_schema() {
        let attributes = vec![AttributeDefinition::new("c", "INTEGER").comment("x")];
        let sql = generator()
            .create_table_query(
                TableReference::with_schema("sales", "t"),
                &attributes,
                &QueryOptions::default(),
            )
            .unwrap()
            .to_sql();

        assert!(sql.contains("@level0name = 'sales'"));
        assert!(sql.contains("@level1name = [t]"));
    }

    #[test]
    fn test_create_table_is_pure() {
        let attributes = vec![AttributeDefinition::new("a", "INTEGER").comment("c")];
        let g = generator();
        let first = g.create_table_query("t", &attributes, &QueryOptions::default()).unwrap();
        let second = g.create_table_query("t", &attributes, &QueryOptions::default()).unwrap();
        assert_eq!(first.to_sql(), second.to_sql());
    }

    // ==================== ADD / CHANGE COLUMN Tests ====================

    #[test]
    fn test_add_column_nullable_by_default() {
        let sql = generator()
            .add_column_query("myTable", &AttributeDefinition::new("myColumn", "VARCHAR(255)"))
            .unwrap();
        assert_eq!(sql.to_sql(), "ALTER TABLE [myTable] ADD [myColumn] VARCHAR(255) NULL;");
    }

    #[test]
    fn test_add_column_full_definition() {
        let attr = AttributeDefinition::new("status", "NVARCHAR(20)")
            .not_null()
            .default("active")
            .unique();
        let sql = generator().add_column_query("t", &attr).unwrap().to_sql();
        assert_eq!(
            sql,
            "ALTER TABLE [t] ADD [status] NVARCHAR(20) NOT NULL DEFAULT N'active' UNIQUE;"
        );
    }

    #[test]
    fn test_add_column_with_references() {
        let attr = AttributeDefinition::new("user_id", "INTEGER")
            .references(References::new("users").on_delete("set null"));
        let sql = generator().add_column_query("t", &attr).unwrap().to_sql();
        assert_eq!(
            sql,
            "ALTER TABLE [t] ADD [user_id] INTEGER NULL REFERENCES [users] ([id]) ON DELETE SET NULL;"
        );
    }

    #[test]
    fn test_add_column_comment_presence_keeps_prefix() {
        let plain = AttributeDefinition::new("c", "INTEGER");
        let commented = AttributeDefinition::new("c", "INTEGER").comment("note");

        let without = generator().add_column_query("t", &plain).unwrap();
        let with = generator().add_column_query("t", &commented).unwrap();

        assert_eq!(without.len(), 1);
        assert_eq!(with.len(), 2);
        assert_eq!(without.iter().next(), with.iter().next());
    }

    #[test]
    fn test_change_column() {
        let attr = AttributeDefinition::new("age", "INTEGER").not_null().default(0);
        let sql = generator().change_column_query("users", &attr).unwrap().to_sql();
        assert_eq!(
            sql,
            "ALTER TABLE [users] ALTER COLUMN [age] INTEGER NOT NULL; ALTER TABLE [users] ADD DEFAULT 0 FOR [age];"
        );
    }

    #[test]
    fn test_change_column_references() {
        let attr = AttributeDefinition::new("org_id", "INTEGER REFERENCES [orgs] ([id])");
        let sql = generator().change_column_query("users", &attr).unwrap().to_sql();
        assert_eq!(
            sql,
            "ALTER TABLE [users] ALTER COLUMN [org_id] INTEGER NULL; ALTER TABLE [users] ADD FOREIGN KEY ([org_id]) REFERENCES [orgs] ([id]);"
        );
    }

    #[test]
    fn test_change_column_identity_unsupported() {
        let attr = AttributeDefinition::new("id", "INTEGER").auto_increment();
        let err = generator().change_column_query("users", &attr).unwrap_err();
        assert!(matches!(err, QueryGeneratorError::UnsupportedFeature(_)));
    }

    // ==================== RENAME / REMOVE Tests ====================

    #[test]
    fn test_remove_column() {
        assert_eq!(
            generator().remove_column_query("myTable", "myColumn"),
            "ALTER TABLE [myTable] DROP COLUMN [myColumn];"
        );
    }

    #[test]
    fn test_rename_column() {
        assert_eq!(
            generator().rename_column_query("users", "name", "full_name"),
            "EXEC sp_rename N'[users].[name]', N'full_name', N'COLUMN';"
        );
    }

    #[test]
    fn test_rename_table() {
        assert_eq!(
            generator().rename_table_query("old", "new").unwrap(),
            "EXEC sp_rename [old], [new];"
        );
    }

    #[test]
    fn test_rename_table_with_schema() {
        assert_eq!(
            generator()
                .rename_table_query(("sales", "old"), ("sales", "new"))
                .unwrap(),
            "EXEC sp_rename N'[sales].[old]', [new];"
        );
    }

    #[test]
    fn test_rename_table_across_schemas_unsupported() {
        let err = generator()
            .rename_table_query(("sales", "old"), ("archive", "old"))
            .unwrap_err();
        assert!(matches!(err, QueryGeneratorError::UnsupportedFeature(_)));
    }

    // ==================== DROP Tests ====================

    #[test]
    fn test_drop_table() {
        assert_eq!(
            generator().drop_table_query("users"),
            "IF OBJECT_ID(N'[users]', 'U') IS NOT NULL DROP TABLE [users];"
        );
    }

    #[test]
    fn test_truncate_table() {
        assert_eq!(
            generator().truncate_table_query(("s", "t")),
            "TRUNCATE TABLE [s].[t];"
        );
    }

    #[test]
    fn test_drop_constraint() {
        assert_eq!(
            generator().drop_constraint_query(("mySchema", "myTable"), "myConstraint"),
            "ALTER TABLE [mySchema].[myTable] DROP CONSTRAINT [myConstraint];"
        );
    }

    #[test]
    fn test_drop_foreign_key() {
        assert_eq!(
            generator().drop_foreign_key_query("myTable", "myColumnKey"),
            "ALTER TABLE [myTable] DROP [myColumnKey]"
        );
    }

    #[test]
    fn test_remove_index() {
        assert_eq!(
            generator().remove_index_query("users", "users_email"),
            "DROP INDEX [users_email] ON [users];"
        );
    }

    // ==================== SCHEMA Tests ====================

    #[test]
    fn test_create_schema() {
        assert_eq!(
            generator().create_schema_query("sales"),
            "IF NOT EXISTS (SELECT schema_name FROM INFORMATION_SCHEMA.SCHEMATA WHERE schema_name = 'sales') BEGIN EXEC sp_executesql N'CREATE SCHEMA [sales];' END;"
        );
    }

    #[test]
    fn test_drop_schema_escapes_name() {
        let sql = generator().drop_schema_query("o'brien");
        assert!(sql.starts_with("IF EXISTS (SELECT schema_name FROM INFORMATION_SCHEMA.SCHEMATA WHERE schema_name = 'o''brien')"));
        assert!(sql.contains("N'DROP SCHEMA [o''brien];'"));
    }

    // ==================== COMMENT Tests ====================

    #[test]
    fn test_comment_query_column() {
        assert_eq!(
            generator().comment_query("t", Some("c"), "desc"),
            "EXEC sp_addextendedproperty @name = N'MS_Description', @value = N'desc', @level0type = N'Schema', @level0name = 'dbo', @level1type = N'Table', @level1name = [t], @level2type = N'Column', @level2name = [c];"
        );
    }

    #[test]
    fn test_comment_query_default_schema_from_config() {
        let generator = QueryGenerator::new(DialectConfig::builder().default_schema("app").build());
        assert!(generator.comment_query("t", None, "x").contains("@level0name = 'app'"));
    }
}
