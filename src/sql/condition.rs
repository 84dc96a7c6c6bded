//! Condition building for SQL WHERE clauses
//!
//! Converts a [`Condition`] tree into a boolean T-SQL expression. Column
//! and value rendering is delegated to a [`ConditionContext`], so the same
//! tree can compile against a plain table or an alias.

use crate::error::{QueryGeneratorError, Result};
use crate::sql::sanitize::Escaper;
use crate::types::ModelMeta;
use crate::value::{Row, SqlValue};

/// Comparison operators beyond equality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Operator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Ne => "<>",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
        }
    }
}

/// A boolean expression over columns
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    And(Vec<Condition>),
    Or(Vec<Condition>),
    /// `column = value`, or `column IS NULL` when the value is [`SqlValue::Null`]
    Equality(String, SqlValue),
    Comparison(String, Operator, SqlValue),
    In(String, Vec<SqlValue>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Condition::Equality(column.into(), value.into())
    }

    pub fn compare(column: impl Into<String>, op: Operator, value: impl Into<SqlValue>) -> Self {
        Condition::Comparison(column.into(), op, value.into())
    }

    pub fn and(conditions: Vec<Condition>) -> Self {
        Condition::And(conditions)
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Condition::Or(conditions)
    }

    pub fn negate(condition: Condition) -> Self {
        Condition::Not(Box::new(condition))
    }

    /// Implicit AND of a row's column/value pairs, in row order
    pub fn from_row(row: &Row) -> Self {
        Condition::And(
            row.iter()
                .map(|(column, value)| Condition::Equality(column.to_string(), value.clone()))
                .collect(),
        )
    }

    /// Parse a JSON where-object
    ///
    /// Supported shapes:
    /// - `{"col": value}` (several keys form an implicit AND, in key order)
    /// - `{"$and": [...]}`, `{"$or": [...]}`, `{"$not": {...}}`
    /// - `{"col": {"$eq" | "$ne" | "$gt" | "$gte" | "$lt" | "$lte": value}}`
    /// - `{"col": {"$in": [...]}}`
    ///
    /// Any other `$` operator is rejected.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(map) => {
                let mut parts = Vec::with_capacity(map.len());
                for (key, item) in map {
                    parts.push(match key.strip_prefix('$') {
                        Some(op) => Self::logical_from_json(op, item)?,
                        None => Self::column_from_json(key, item)?,
                    });
                }
                Ok(Self::collapse(parts))
            }
            serde_json::Value::Array(items) => Ok(Condition::And(
                items.iter().map(Self::from_json).collect::<Result<Vec<_>>>()?,
            )),
            other => Err(QueryGeneratorError::validation(format!(
                "Where condition must be an object or array, got {}",
                other
            ))),
        }
    }

    fn logical_from_json(op: &str, item: &serde_json::Value) -> Result<Self> {
        match op {
            "and" | "or" => {
                let items = item.as_array().ok_or_else(|| {
                    QueryGeneratorError::validation(format!("${} requires an array", op))
                })?;
                let children = items.iter().map(Self::from_json).collect::<Result<Vec<_>>>()?;
                Ok(if op == "and" {
                    Condition::And(children)
                } else {
                    Condition::Or(children)
                })
            }
            "not" => Ok(Condition::negate(Self::from_json(item)?)),
            other => Err(QueryGeneratorError::validation(format!(
                "Unsupported logical operator '${}'",
                other
            ))),
        }
    }

    fn column_from_json(column: &str, item: &serde_json::Value) -> Result<Self> {
        let operators = match item {
            serde_json::Value::Object(map) if map.keys().any(|k| k.starts_with('$')) => map,
            _ => return Ok(Condition::eq(column, item.clone())),
        };

        let mut parts = Vec::with_capacity(operators.len());
        for (key, operand) in operators {
            let part = match key.as_str() {
                "$eq" => Condition::eq(column, operand.clone()),
                "$ne" => Condition::compare(column, Operator::Ne, operand.clone()),
                "$gt" => Condition::compare(column, Operator::Gt, operand.clone()),
                "$gte" => Condition::compare(column, Operator::Gte, operand.clone()),
                "$lt" => Condition::compare(column, Operator::Lt, operand.clone()),
                "$lte" => Condition::compare(column, Operator::Lte, operand.clone()),
                "$in" => {
                    let values = operand.as_array().ok_or_else(|| {
                        QueryGeneratorError::validation("$in requires an array value")
                    })?;
                    Condition::In(
                        column.to_string(),
                        values.iter().cloned().map(SqlValue::from).collect(),
                    )
                }
                other => {
                    return Err(QueryGeneratorError::validation(format!(
                        "Unsupported operator '{}' on column '{}'",
                        other, column
                    )));
                }
            };
            parts.push(part);
        }
        Ok(Self::collapse(parts))
    }

    fn collapse(mut parts: Vec<Condition>) -> Self {
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Condition::And(parts)
        }
    }
}

/// Resolves columns and values while a condition compiles
pub trait ConditionContext {
    /// Render a column reference
    fn column(&self, name: &str) -> String;

    /// Render the value side of a comparison against `column`
    fn value(&self, column: &str, value: &SqlValue) -> Result<String>;

    /// Render `column = value`; NULL turns into `IS NULL`
    fn equality(&self, column: &str, value: &SqlValue) -> Result<String> {
        if value.is_null() {
            return Ok(format!("{} IS NULL", self.column(column)));
        }
        Ok(format!("{} = {}", self.column(column), self.value(column, value)?))
    }
}

/// Compiles columns against one table, optionally qualified by an alias
pub struct TableContext<'a> {
    escaper: Escaper<'a>,
    qualifier: Option<String>,
    model: Option<&'a ModelMeta>,
}

impl<'a> TableContext<'a> {
    pub fn new(escaper: Escaper<'a>) -> Self {
        Self {
            escaper,
            qualifier: None,
            model: None,
        }
    }

    /// Prefix every column with an already-quoted table or alias
    pub fn qualified(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Use the model's declared types when escaping values
    pub fn with_model(mut self, model: Option<&'a ModelMeta>) -> Self {
        self.model = model;
        self
    }
}

impl ConditionContext for TableContext<'_> {
    fn column(&self, name: &str) -> String {
        let column = self.escaper.quote_identifier(name);
        match &self.qualifier {
            Some(q) => format!("{}.{}", q, column),
            None => column,
        }
    }

    fn value(&self, column: &str, value: &SqlValue) -> Result<String> {
        let declared = self
            .model
            .and_then(|m| m.attribute(column))
            .map(|a| a.data_type.as_str());
        self.escaper.escape_value(value, declared)
    }
}

/// Compile a condition into a boolean SQL expression
///
/// - `Equality` renders `col = value`, or `col IS NULL` only for NULL
/// - `And` joins its children with ` AND `
/// - `Or` joins its children with ` OR ` inside parentheses; multi-term
///   `And` children are parenthesized
/// - empty `And`/`Or` groups are rejected
pub fn compile_condition(condition: &Condition, ctx: &dyn ConditionContext) -> Result<String> {
    match condition {
        Condition::Equality(column, value) => ctx.equality(column, value),
        Condition::Comparison(column, op, value) => {
            if value.is_null() {
                return match op {
                    Operator::Ne => Ok(format!("{} IS NOT NULL", ctx.column(column))),
                    _ => Err(QueryGeneratorError::validation(format!(
                        "Operator {} cannot compare against NULL",
                        op.as_sql()
                    ))),
                };
            }
            Ok(format!(
                "{} {} {}",
                ctx.column(column),
                op.as_sql(),
                ctx.value(column, value)?
            ))
        }
        Condition::In(column, values) => {
            if values.is_empty() {
                return Ok("1 = 0".to_string());
            }
            let rendered = values
                .iter()
                .map(|v| ctx.value(column, v))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("{} IN ({})", ctx.column(column), rendered.join(", ")))
        }
        Condition::And(children) => {
            if children.is_empty() {
                return Err(QueryGeneratorError::validation(
                    "AND condition requires at least one term",
                ));
            }
            let clauses = children
                .iter()
                .map(|c| compile_condition(c, ctx))
                .collect::<Result<Vec<_>>>()?;
            Ok(clauses.join(" AND "))
        }
        Condition::Or(children) => {
            if children.is_empty() {
                return Err(QueryGeneratorError::validation(
                    "OR condition requires at least one term",
                ));
            }
            let mut clauses = Vec::with_capacity(children.len());
            for child in children {
                let clause = compile_condition(child, ctx)?;
                match child {
                    Condition::And(terms) if terms.len() > 1 => clauses.push(format!("({})", clause)),
                    _ => clauses.push(clause),
                }
            }
            Ok(format!("({})", clauses.join(" OR ")))
        }
        Condition::Not(inner) => Ok(format!("NOT ({})", compile_condition(inner, ctx)?)),
    }
}
