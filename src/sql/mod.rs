//! SQL Server statement compilation
//!
//! Provides escaping, condition compilation and the statement builders.

pub mod condition;
pub mod ddl;
pub mod dml;
pub mod introspect;
pub mod sanitize;

pub use condition::{Condition, ConditionContext, Operator, TableContext, compile_condition};
pub use sanitize::{Escaper, quote_identifier, quote_plain};
