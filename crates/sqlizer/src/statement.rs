//! Materialized statements.
//!
//! A [`Statement`] is the builder's only output: the space-joined fragment
//! list with a trailing terminator, paired with the bound values in emission
//! order. Substituting placeholders and executing is the executor's job.

use crate::value::Value;
use tokio_postgres::types::ToSql;

/// A finalized `(text, ordered values)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    text: String,
    values: Vec<Value>,
}

impl Statement {
    pub(crate) fn new(text: String, values: Vec<Value>) -> Self {
        Self { text, values }
    }

    /// The SQL text with `?` placeholder markers.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The bound values, in placeholder order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of `?` markers in the text.
    pub fn placeholder_count(&self) -> usize {
        self.text.matches('?').count()
    }

    /// Render the text with `$1, $2, ...` placeholders for tokio-postgres.
    pub fn to_pg_sql(&self) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut idx: usize = 0;
        for (i, part) in self.text.split('?').enumerate() {
            if i > 0 {
                idx += 1;
                use std::fmt::Write;
                let _ = write!(&mut out, "${idx}");
            }
            out.push_str(part);
        }
        out
    }

    /// Parameter refs compatible with tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values.iter().map(Value::as_sql).collect()
    }
}
