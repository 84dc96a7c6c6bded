//! DML generation for SQL Server
//!
//! INSERT (bulk), MERGE-based upsert, UPDATE, DELETE and SELECT composition.

use crate::error::{QueryGeneratorError, Result};
use crate::generator::{QueryGenerator, traced};
use crate::sql::condition::{Condition, TableContext, compile_condition};
use crate::types::{AttributeDefinition, ModelMeta, QueryOptions, TableReference};
use crate::value::{Row, SqlValue};

/// Upper bound on literals per INSERT; SQL Server allows 1000 row values
const BULK_INSERT_PARAMETER_BUDGET: usize = 250;

/// Rows per INSERT statement for a given column count
fn bulk_batch_size(columns: usize) -> usize {
    BULK_INSERT_PARAMETER_BUDGET / (columns + 1) + 1
}

impl QueryGenerator {
    /// Generate a multi-row INSERT
    ///
    /// Columns are the union of the rows' keys in first-seen order; a row
    /// missing a column gets `NULL` there. A row whose only key is an
    /// auto-increment attribute set to NULL becomes
    /// `INSERT INTO <table> DEFAULT VALUES;`, as does an empty row when the
    /// only attribute is auto-increment. Rows that produce no statement at
    /// all are rejected.
    ///
    /// # Example
    /// ```
    /// use mssql_query_generator::{QueryGenerator, QueryOptions, Row};
    ///
    /// let generator = QueryGenerator::default();
    /// let rows = vec![Row::new().set("name", "foo"), Row::new().set("name", "bar")];
    /// let sql = generator
    ///     .bulk_insert_query("myTable", &rows, &QueryOptions::default(), &[])
    ///     .unwrap();
    /// assert_eq!(sql, "INSERT INTO [myTable] ([name]) VALUES (N'foo'),(N'bar');");
    /// ```
    pub fn bulk_insert_query(
        &self,
        table: impl Into<TableReference>,
        rows: &[Row],
        options: &QueryOptions,
        attributes: &[AttributeDefinition],
    ) -> Result<String> {
        if rows.is_empty() {
            return Err(QueryGeneratorError::validation(
                "Bulk insert requires at least one row",
            ));
        }

        let escaper = self.escaper();
        let quoted_table = escaper.quote_table(&table.into());
        let attribute = |name: &str| attributes.iter().find(|a| a.name == name);
        let is_identity = |name: &str| attribute(name).is_some_and(|a| a.auto_increment);
        let identity_only = matches!(attributes, [only] if only.auto_increment);

        let mut statements = Vec::new();
        let mut columns: Vec<&str> = Vec::new();
        let mut value_rows = Vec::with_capacity(rows.len());
        let mut identity_insert = false;

        for row in rows {
            if row.is_empty() && identity_only {
                tracing::debug!("empty row for identity-only table; using DEFAULT VALUES");
                statements.push(format!("INSERT INTO {} DEFAULT VALUES;", quoted_table));
                continue;
            }

            let mut entries = row.iter();
            if let (Some((only, SqlValue::Null)), None) = (entries.next(), entries.next()) {
                if is_identity(only) {
                    tracing::debug!(column = only, "row has only a NULL identity; using DEFAULT VALUES");
                    statements.push(format!("INSERT INTO {} DEFAULT VALUES;", quoted_table));
                    continue;
                }
            }

            for (column, value) in row.iter() {
                let identity = is_identity(column);
                if identity && !value.is_null() {
                    identity_insert = true;
                }
                if !columns.contains(&column) && !(identity && value.is_null()) {
                    columns.push(column);
                }
            }
            value_rows.push(row);
        }

        if !columns.is_empty() {
            let tuples = value_rows
                .iter()
                .map(|row| -> Result<String> {
                    let literals = columns
                        .iter()
                        .map(|&column| {
                            let value = row.get(column).unwrap_or(&SqlValue::Null);
                            let declared = attribute(column).map(|a| a.data_type.as_str());
                            escaper.escape_value(value, declared)
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Ok(format!("({})", literals.join(",")))
                })
                .collect::<Result<Vec<_>>>()?;

            let column_list = columns
                .iter()
                .map(|c| escaper.quote_identifier(c))
                .collect::<Vec<_>>()
                .join(",");
            let output = if options.returning {
                " OUTPUT INSERTED.*"
            } else {
                ""
            };

            let batch_size = bulk_batch_size(columns.len());
            if tuples.len() > batch_size {
                tracing::debug!(
                    rows = tuples.len(),
                    batch_size,
                    "splitting bulk insert into batches"
                );
            }
            for batch in tuples.chunks(batch_size) {
                statements.push(format!(
                    "INSERT INTO {} ({}){} VALUES {};",
                    quoted_table,
                    column_list,
                    output,
                    batch.join(",")
                ));
            }
        }

        if statements.is_empty() {
            return Err(QueryGeneratorError::validation(
                "Bulk insert rows carry no columns to insert",
            ));
        }

        let sql = statements.join(" ");
        let sql = if identity_insert {
            wrap_identity_insert(&quoted_table, &sql)
        } else {
            sql
        };
        Ok(traced("bulk_insert", sql))
    }

    /// Generate a MERGE statement that updates a matching row or inserts a new one
    ///
    /// `where_` is the lookup the caller would use to find the row, normally
    /// an `Or` of per-key `And` groups. Groups containing a NULL value are
    /// ignored and at least one group must remain. The MERGE joins target and
    /// source on every primary key of the model; a model without primary keys
    /// joins on its unique keys instead.
    pub fn upsert_query(
        &self,
        table: impl Into<TableReference>,
        insert_values: &Row,
        update_values: &Row,
        where_: &Condition,
        model: &ModelMeta,
    ) -> Result<String> {
        if insert_values.is_empty() {
            return Err(QueryGeneratorError::validation(
                "Upsert requires at least one insert value",
            ));
        }

        let table = table.into();
        let escaper = self.escaper();
        let quoted_table = escaper.quote_table(&table);
        let target = escaper.quote_identifier(&format!("{}_target", table.name));
        let source = escaper.quote_identifier(&format!("{}_source", table.name));

        // Column-to-column join; lookup values never reach the predicate
        let on = upsert_match_keys(where_, model)?
            .into_iter()
            .map(|key| {
                let column = escaper.quote_identifier(key);
                format!("{}.{} = {}.{}", target, column, source, column)
            })
            .collect::<Vec<_>>()
            .join(" AND ");

        let declared = |column: &str| model.attribute(column).map(|a| a.data_type.as_str());
        let insert_columns = insert_values
            .columns()
            .map(|c| escaper.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let insert_literals = insert_values
            .iter()
            .map(|(column, value)| escaper.escape_value(value, declared(column)))
            .collect::<Result<Vec<_>>>()?
            .join(", ");

        let identity_columns = model.identity_columns();
        let assignments = update_values
            .iter()
            .filter(|(column, _)| !identity_columns.contains(column))
            .map(|(column, value)| -> Result<String> {
                Ok(format!(
                    "{}.{} = {}",
                    target,
                    escaper.quote_identifier(column),
                    escaper.escape_value(value, declared(column))?
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut sql = format!(
            "MERGE INTO {} WITH(HOLDLOCK) AS {} USING (VALUES({})) AS {}({}) ON {}",
            quoted_table, target, insert_literals, source, insert_columns, on
        );
        if assignments.is_empty() {
            tracing::debug!(table = %table.name, "upsert has nothing to update; omitting WHEN MATCHED");
        } else {
            sql.push_str(&format!(
                " WHEN MATCHED THEN UPDATE SET {}",
                assignments.join(", ")
            ));
        }
        sql.push_str(&format!(
            " WHEN NOT MATCHED THEN INSERT ({}) VALUES({}) OUTPUT $action, INSERTED.*;",
            insert_columns, insert_literals
        ));

        let explicit_identity = insert_values
            .iter()
            .any(|(column, value)| identity_columns.contains(&column) && !value.is_null());
        if explicit_identity {
            sql = wrap_identity_insert(&quoted_table, &sql);
        }

        Ok(traced("upsert", sql))
    }

    /// Generate an UPDATE
    ///
    /// `options.limit` becomes `TOP(n)` and `options.returning` adds
    /// `OUTPUT INSERTED.*`.
    pub fn update_query(
        &self,
        table: impl Into<TableReference>,
        values: &Row,
        where_: Option<&Condition>,
        options: &QueryOptions,
    ) -> Result<String> {
        if values.is_empty() {
            return Err(QueryGeneratorError::validation(
                "Update requires at least one value",
            ));
        }

        let escaper = self.escaper();
        let assignments = values
            .iter()
            .map(|(column, value)| -> Result<String> {
                Ok(format!(
                    "{}={}",
                    escaper.quote_identifier(column),
                    escaper.escape_value(value, None)?
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut sql = String::from("UPDATE");
        if let Some(limit) = options.limit {
            sql.push_str(&format!(" TOP({})", limit));
        }
        sql.push_str(&format!(
            " {} SET {}",
            escaper.quote_table(&table.into()),
            assignments.join(",")
        ));
        if options.returning {
            sql.push_str(" OUTPUT INSERTED.*");
        }
        sql.push_str(&self.where_clause(where_, None)?);
        sql.push(';');

        Ok(traced("update", sql))
    }

    /// Generate a DELETE followed by an affected-row count
    pub fn delete_query(
        &self,
        table: impl Into<TableReference>,
        where_: Option<&Condition>,
        options: &QueryOptions,
    ) -> Result<String> {
        let mut sql = String::from("DELETE");
        if let Some(limit) = options.limit {
            sql.push_str(&format!(" TOP({})", limit));
        }
        sql.push_str(&format!(" FROM {}", self.escaper().quote_table(&table.into())));
        sql.push_str(&self.where_clause(where_, None)?);
        sql.push_str("; SELECT @@ROWCOUNT AS AFFECTEDROWS;");

        Ok(traced("delete", sql))
    }

    /// Generate the head of a SELECT: columns, table, alias and table hint
    ///
    /// Columns, table and alias are emitted as given. Paging and filtering
    /// belong to later stages, so `options.limit`, `options.offset` and
    /// `where_clause` are not applied here; see
    /// [`QueryGenerator::add_limit_and_offset`].
    pub fn select_from_table_fragment(
        &self,
        options: &QueryOptions,
        model: Option<&ModelMeta>,
        columns: &[String],
        table: &str,
        alias: Option<&str>,
        where_clause: Option<&str>,
    ) -> Result<String> {
        if columns.is_empty() {
            return Err(QueryGeneratorError::validation(
                "SELECT requires at least one column",
            ));
        }
        if options.limit.is_some() || options.offset.is_some() {
            tracing::debug!(
                model = model.map(|m| m.name.as_str()),
                "select fragment leaves limit/offset to the paging stage"
            );
        }
        if where_clause.is_some() {
            tracing::debug!("select fragment leaves the where clause to the caller");
        }

        let mut sql = format!("SELECT {} FROM {}", columns.join(", "), table);
        if let Some(alias) = alias {
            sql.push_str(&format!(" AS {}", alias));
        }
        if let Some(hint) = options.table_hint {
            sql.push_str(&format!(" WITH ({})", hint));
        }
        Ok(sql)
    }

    /// Generate the paging suffix of a SELECT
    ///
    /// Returns an empty string when neither limit nor offset is set. OFFSET
    /// requires an ORDER BY, so an unordered query is ordered by the model's
    /// primary key.
    pub fn add_limit_and_offset(
        &self,
        options: &QueryOptions,
        model: Option<&ModelMeta>,
        table_as: impl Into<TableReference>,
        ordered: bool,
    ) -> Result<String> {
        if options.limit.is_none() && options.offset.is_none() {
            return Ok(String::new());
        }
        if !self.config().supports_offset_fetch() {
            return Err(QueryGeneratorError::unsupported(format!(
                "OFFSET/FETCH paging requires SQL Server 2012 or newer (version {} configured)",
                self.config().database_version
            )));
        }

        let escaper = self.escaper();
        let mut fragment = String::new();
        if !ordered {
            let primary_key = model
                .and_then(|m| m.primary_key_field.as_deref())
                .ok_or_else(|| {
                    QueryGeneratorError::validation(
                        "Paging an unordered query requires a model primary key",
                    )
                })?;
            fragment.push_str(&format!(
                " ORDER BY {}.{}",
                escaper.quote_table(&table_as.into()),
                escaper.quote_identifier(primary_key)
            ));
        }

        fragment.push_str(&format!(" OFFSET {} ROWS", options.offset.unwrap_or(0)));
        if let Some(limit) = options.limit {
            fragment.push_str(&format!(" FETCH NEXT {} ROWS ONLY", limit));
        }
        Ok(fragment)
    }

    /// Generate a complete SELECT
    ///
    /// Quotes the table and columns, then composes the select fragment, the
    /// WHERE clause and the paging suffix. An empty column list selects `*`.
    pub fn select_query(
        &self,
        table: impl Into<TableReference>,
        columns: &[String],
        options: &QueryOptions,
        where_: Option<&Condition>,
        model: Option<&ModelMeta>,
    ) -> Result<String> {
        let table = table.into();
        let escaper = self.escaper();
        let columns = if columns.is_empty() {
            vec!["*".to_string()]
        } else {
            columns.iter().map(|c| escaper.quote_identifier(c)).collect()
        };

        let mut sql = self.select_from_table_fragment(
            options,
            model,
            &columns,
            &escaper.quote_table(&table),
            None,
            None,
        )?;
        sql.push_str(&self.where_clause(where_, model)?);
        sql.push_str(&self.add_limit_and_offset(options, model, &table, false)?);
        sql.push(';');

        Ok(traced("select", sql))
    }

    fn where_clause(&self, where_: Option<&Condition>, model: Option<&ModelMeta>) -> Result<String> {
        match where_ {
            Some(condition) => {
                let ctx = TableContext::new(self.escaper()).with_model(model);
                Ok(format!(" WHERE {}", compile_condition(condition, &ctx)?))
            }
            None => Ok(String::new()),
        }
    }
}

fn wrap_identity_insert(quoted_table: &str, sql: &str) -> String {
    format!(
        "SET IDENTITY_INSERT {0} ON; {1} SET IDENTITY_INSERT {0} OFF;",
        quoted_table, sql
    )
}

/// First column a where clause constrains
fn leading_column(clause: &Condition) -> Option<&str> {
    match clause {
        Condition::Equality(column, _)
        | Condition::Comparison(column, _, _)
        | Condition::In(column, _) => Some(column.as_str()),
        Condition::And(terms) => terms.first().and_then(leading_column),
        Condition::Or(_) | Condition::Not(_) => None,
    }
}

fn has_null_value(clause: &Condition) -> bool {
    match clause {
        Condition::Equality(_, value) | Condition::Comparison(_, _, value) => value.is_null(),
        Condition::In(_, values) => values.iter().any(SqlValue::is_null),
        Condition::And(terms) | Condition::Or(terms) => terms.iter().any(has_null_value),
        Condition::Not(inner) => has_null_value(inner),
    }
}

/// Columns a MERGE joins target and source on
fn upsert_match_keys<'m>(where_: &Condition, model: &'m ModelMeta) -> Result<Vec<&'m str>> {
    let clauses: Vec<&Condition> = match where_ {
        Condition::Or(clauses) => clauses.iter().collect(),
        other => vec![other],
    };

    let usable: Vec<&Condition> = clauses
        .into_iter()
        .filter(|clause| {
            let skip = has_null_value(clause);
            if skip {
                tracing::debug!(model = %model.name, "ignoring upsert lookup clause with NULL value");
            }
            !skip
        })
        .collect();
    if usable.is_empty() {
        return Err(QueryGeneratorError::validation(format!(
            "Upsert on '{}' needs a lookup clause without NULL values",
            model.name
        )));
    }

    let primary_keys = model.primary_keys();
    if !primary_keys.is_empty() {
        let keyed_by_primary = usable
            .iter()
            .any(|clause| leading_column(clause).is_some_and(|c| primary_keys.contains(&c)));
        if !keyed_by_primary {
            tracing::debug!(model = %model.name, "no lookup clause leads with a primary key; joining on primary keys anyway");
        }
        return Ok(primary_keys);
    }

    let unique_keys = model.unique_keys();
    if unique_keys.is_empty() {
        return Err(QueryGeneratorError::validation(format!(
            "Upsert on '{}' needs primary key or unique key attributes",
            model.name
        )));
    }
    tracing::debug!(model = %model.name, "model has no primary key; joining on unique keys");
    Ok(unique_keys)
}
