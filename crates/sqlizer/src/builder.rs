//! The immutable query builder.
//!
//! Every public method validates its arguments and the current chain
//! position, then derives a brand-new [`Builder`] from the receiver. The
//! receiver is never mutated, so any intermediate builder can be kept and
//! reused to branch independent continuations:
//!
//! ```ignore
//! use sqlizer::Builder;
//!
//! let base = Builder::new().select_all()?.from("posts")?;
//! let by_id = base.where_("post_id", "=", 7)?.build()?;
//! let recent = base.order_by(&[OrderSpec::desc("created_at")])?.limit(10)?.build()?;
//! ```
//!
//! Chains that would produce grammatically invalid SQL fail at the offending
//! call with a [`SqlizerError::Sequencing`] error; the last valid builder
//! stays usable.

use crate::cast::Arg;
use crate::error::{SqlizerError, SqlizerResult};
use crate::state::{BuilderState, Context};
use crate::statement::Statement;
use crate::value::Value;

/// Comparison operators accepted by `where_` and friends.
const SUPPORTED_OPERATORS: [&str; 9] = ["=", "!=", "<>", ">", ">=", "<", "<=", "LIKE", "NOT LIKE"];

/// Operators that have a dedicated method and are rejected with a redirect.
const DEDICATED_OPERATORS: [(&str, &str); 6] = [
    ("IS NULL", "is_null"),
    ("IS NOT NULL", "is_not_null"),
    ("IN", "where_in"),
    ("NOT IN", "where_not_in"),
    ("BETWEEN", "is_between"),
    ("NOT BETWEEN", "is_not_between"),
];

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    fn to_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// A single ORDER BY item: column plus direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    column: String,
    dir: SortDir,
}

impl OrderSpec {
    /// Ascending sort on `column`.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            dir: SortDir::Asc,
        }
    }

    /// Descending sort on `column`.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            dir: SortDir::Desc,
        }
    }

    fn to_sql(&self) -> String {
        format!("{} {}", self.column, self.dir.to_sql())
    }
}

impl From<&str> for OrderSpec {
    fn from(column: &str) -> Self {
        OrderSpec::asc(column)
    }
}

/// The immutable SQL builder.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    state: BuilderState,
}

impl Builder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulated SQL fragments, in emission order.
    pub fn fragments(&self) -> &[String] {
        &self.state.fragments
    }

    /// The accumulated bound values, in placeholder order.
    pub fn values(&self) -> &[Value] {
        &self.state.values
    }

    /// The current predicate context.
    pub fn context(&self) -> Context {
        self.state.context
    }

    // ==================== state derivation ====================

    /// Derive a fresh state from the current one.
    ///
    /// `insert_keys` is deliberately not carried over: it only lives between
    /// `insert` and `into_table`.
    fn derive(&self) -> BuilderState {
        BuilderState {
            fragments: self.state.fragments.clone(),
            values: self.state.values.clone(),
            insert_keys: None,
            context: self.state.context,
        }
    }

    fn with_state(&self, state: BuilderState) -> Builder {
        Builder { state }
    }

    // ==================== validation helpers ====================

    fn ensure_name(name: &str, what: &str, method: &str) -> SqlizerResult<()> {
        if name.trim().is_empty() {
            return Err(SqlizerError::validation(format!(
                "`{method}` requires a non-empty {what}"
            )));
        }
        Ok(())
    }

    /// Invariant guard: once LIMIT is on the tail, only `offset` may follow.
    fn ensure_open_tail(&self, method: &str) -> SqlizerResult<()> {
        if self.state.ends_with_pagination() {
            return Err(SqlizerError::sequencing(format!(
                "`{method}` cannot follow LIMIT/OFFSET"
            )));
        }
        Ok(())
    }

    fn ensure_where_context(&self, method: &str) -> SqlizerResult<()> {
        if !self.state.has_where() {
            return Err(SqlizerError::sequencing(format!(
                "`{method}` requires an established WHERE context on the chain"
            )));
        }
        Ok(())
    }

    // ==================== verbs & targets ====================

    /// Prefix `SELECT` (no columns) or `SELECT a, b, ...` to the chain.
    pub fn select(&self, columns: &[&str]) -> SqlizerResult<Builder> {
        let head = if columns.is_empty() {
            "SELECT".to_string()
        } else {
            if columns.iter().any(|c| c.trim().is_empty()) {
                return Err(SqlizerError::validation(
                    "`select` column list cannot include empty names",
                ));
            }
            format!("SELECT {}", columns.join(", "))
        };

        let mut state = self.derive();
        state.fragments.insert(0, head);
        state.context = Context::TopLevel;
        Ok(self.with_state(state))
    }

    /// Shorthand for `select(&["*"])`.
    pub fn select_all(&self) -> SqlizerResult<Builder> {
        self.select(&["*"])
    }

    /// Append `DISTINCT a, b, ...`.
    pub fn distinct(&self, columns: &[&str]) -> SqlizerResult<Builder> {
        self.ensure_open_tail("distinct")?;
        if columns.is_empty() {
            return Err(SqlizerError::validation(
                "`distinct` requires at least one column",
            ));
        }
        if columns.iter().any(|c| c.trim().is_empty()) {
            return Err(SqlizerError::validation(
                "`distinct` column list cannot include empty names",
            ));
        }

        let mut state = self.derive();
        state.fragments.push(format!("DISTINCT {}", columns.join(", ")));
        Ok(self.with_state(state))
    }

    /// Append `FROM table`.
    pub fn from(&self, table: &str) -> SqlizerResult<Builder> {
        self.ensure_open_tail("from")?;
        Self::ensure_name(table, "table name", "from")?;

        let mut state = self.derive();
        state.fragments.push(format!("FROM {table}"));
        Ok(self.with_state(state))
    }

    /// Append `FROM table` as the first call on the chain.
    pub fn from_table(&self, table: &str) -> SqlizerResult<Builder> {
        if !self.state.fragments.is_empty() {
            return Err(SqlizerError::sequencing(
                "`from_table` must be the first call on the chain",
            ));
        }
        self.from(table)
    }

    /// Append a bare table name (used after `update()`).
    pub fn table(&self, table: &str) -> SqlizerResult<Builder> {
        self.ensure_open_tail("table")?;
        Self::ensure_name(table, "table name", "table")?;

        let mut state = self.derive();
        state.fragments.push(table.to_string());
        Ok(self.with_state(state))
    }

    // ==================== INSERT / UPDATE / DELETE ====================

    /// Start an INSERT: records the row's columns and captures its values.
    ///
    /// Must be the first call on the chain and must be followed by [`Builder::into_table`].
    pub fn insert(&self, row: &[(&str, Value)]) -> SqlizerResult<Builder> {
        if !self.state.fragments.is_empty() {
            return Err(SqlizerError::sequencing(
                "`insert` cannot be chained after another builder method",
            ));
        }
        if row.is_empty() {
            return Err(SqlizerError::validation(
                "`insert` requires a non-empty row of (column, value) pairs",
            ));
        }
        for (column, _) in row {
            Self::ensure_name(column, "column name", "insert")?;
        }

        let mut state = self.derive();
        state.fragments.push("INSERT".to_string());
        state.values = row.iter().map(|(_, v)| v.clone()).collect();
        state.insert_keys = Some(row.iter().map(|(c, _)| c.to_string()).collect());
        Ok(self.with_state(state))
    }

    /// Complete an INSERT: `INTO table(k1, k2) VALUES(?, ?)` from the
    /// columns recorded by [`Builder::insert`].
    ///
    /// Named `into_table` (not `into`) so it never collides with the prelude's
    /// `Into::into` during method resolution.
    pub fn into_table(&self, table: &str) -> SqlizerResult<Builder> {
        Self::ensure_name(table, "table name", "into_table")?;

        let marker_ok = self
            .state
            .last_fragment()
            .is_some_and(|f| f.starts_with("INSERT"));
        let Some(keys) = self.state.insert_keys.as_ref().filter(|_| marker_ok) else {
            return Err(SqlizerError::sequencing(
                "`into_table` must be chained immediately after `insert`",
            ));
        };

        let placeholders = vec!["?"; keys.len()].join(", ");
        let mut state = self.derive();
        state
            .fragments
            .push(format!("INTO {table}({}) VALUES({placeholders})", keys.join(", ")));
        Ok(self.with_state(state))
    }

    /// Start an UPDATE. Must be the first call on the chain.
    pub fn update(&self) -> SqlizerResult<Builder> {
        if !self.state.fragments.is_empty() {
            return Err(SqlizerError::sequencing(
                "`update` must be the first call on the chain",
            ));
        }

        let mut state = self.derive();
        state.fragments.push("UPDATE".to_string());
        Ok(self.with_state(state))
    }

    /// Append `SET k1 = ?, k2 = ?, ...` and bind the row's values.
    pub fn set(&self, row: &[(&str, Value)]) -> SqlizerResult<Builder> {
        self.ensure_open_tail("set")?;
        if row.is_empty() {
            return Err(SqlizerError::validation(
                "`set` requires a non-empty row of (column, value) pairs",
            ));
        }
        for (column, _) in row {
            Self::ensure_name(column, "column name", "set")?;
        }

        let assignments = row
            .iter()
            .map(|(c, _)| format!("{c} = ?"))
            .collect::<Vec<_>>()
            .join(", ");

        let mut state = self.derive();
        state.fragments.push(format!("SET {assignments}"));
        state.values.extend(row.iter().map(|(_, v)| v.clone()));
        Ok(self.with_state(state))
    }

    /// Prefix `DELETE` (or make it the sole fragment on an empty chain).
    pub fn delete(&self) -> Builder {
        let mut state = self.derive();
        state.fragments.insert(0, "DELETE".to_string());
        self.with_state(state)
    }

    /// Prefix `SELECT COUNT(*) AS recordsCount`.
    pub fn count_records(&self) -> Builder {
        let mut state = self.derive();
        state
            .fragments
            .insert(0, "SELECT COUNT(*) AS recordsCount".to_string());
        self.with_state(state)
    }

    // ==================== pagination & ordering ====================

    /// Append `LIMIT ?` and bind `n`.
    pub fn limit(&self, n: i64) -> SqlizerResult<Builder> {
        if self.state.fragments.is_empty() {
            return Err(SqlizerError::sequencing(
                "`limit` cannot be the first call on the chain",
            ));
        }
        self.ensure_open_tail("limit")?;

        let mut state = self.derive();
        state.fragments.push("LIMIT ?".to_string());
        state.values.push(Value::Int(n));
        Ok(self.with_state(state))
    }

    /// Append `OFFSET ?` and bind `n`. Only legal immediately after `limit`.
    pub fn offset(&self, n: i64) -> SqlizerResult<Builder> {
        if !self.state.last_fragment().is_some_and(|f| f.contains("LIMIT")) {
            return Err(SqlizerError::sequencing(
                "`offset` must be chained immediately after `limit`",
            ));
        }

        let mut state = self.derive();
        state.fragments.push("OFFSET ?".to_string());
        state.values.push(Value::Int(n));
        Ok(self.with_state(state))
    }

    /// Append `ORDER BY` plus a single `"a ASC, b DESC"` fragment.
    pub fn order_by(&self, items: &[OrderSpec]) -> SqlizerResult<Builder> {
        self.ensure_open_tail("order_by")?;
        if items.is_empty() {
            return Err(SqlizerError::validation(
                "`order_by` requires at least one sort item",
            ));
        }
        for item in items {
            Self::ensure_name(&item.column, "column name", "order_by")?;
        }

        let joined = items
            .iter()
            .map(OrderSpec::to_sql)
            .collect::<Vec<_>>()
            .join(", ");

        let mut state = self.derive();
        state.fragments.push("ORDER BY".to_string());
        state.fragments.push(joined);
        Ok(self.with_state(state))
    }

    // ==================== predicates ====================

    /// Append `WHERE column OP ?` (or `column OP ?` when continuing a boolean
    /// expression) and bind the value.
    ///
    /// The operator must be one of `=`, `!=`, `<>`, `>`, `>=`, `<`, `<=`,
    /// `LIKE`, `NOT LIKE`. Operators with a dedicated method (`IN`,
    /// `BETWEEN`, `IS NULL`, ...) are rejected with a hint naming it.
    pub fn where_(
        &self,
        column: &str,
        operator: &str,
        value: impl Into<Arg>,
    ) -> SqlizerResult<Builder> {
        self.ensure_open_tail("where_")?;
        if self.state.context == Context::TopLevel && self.state.has_where() {
            return Err(SqlizerError::sequencing(
                "`where_` cannot be chained after an existing WHERE; use and()/or(), \
                 and_where()/or_where(), or and_group()/or_group()",
            ));
        }
        Self::ensure_name(column, "column name", "where_")?;

        let op = operator.trim().to_uppercase();
        if let Some((_, method)) = DEDICATED_OPERATORS.iter().find(|(o, _)| *o == op) {
            return Err(SqlizerError::unsupported_operator(
                op.clone(),
                format!("use the dedicated `{method}` method instead"),
            ));
        }
        if !SUPPORTED_OPERATORS.contains(&op.as_str()) {
            return Err(SqlizerError::unsupported_operator(
                op.clone(),
                format!("supported operators: {}", SUPPORTED_OPERATORS.join(", ")),
            ));
        }

        let bound = value.into().resolve()?;
        if matches!(&bound, Value::Text(s) if s.is_empty()) {
            return Err(SqlizerError::validation(
                "`where_` value cannot be empty text",
            ));
        }

        let fragment = match self.state.context {
            Context::Combinator => format!("{column} {op} ?"),
            Context::TopLevel => format!("WHERE {column} {op} ?"),
        };

        let mut state = self.derive();
        state.fragments.push(fragment);
        state.values.push(bound);
        state.context = Context::TopLevel;
        Ok(self.with_state(state))
    }

    /// Append a bare `WHERE column` (or `column`), typically followed by
    /// `in_list`, `not_in`, `is_null`, `is_not_null`, `is_between`, or
    /// `is_not_between`.
    pub fn where_field(&self, column: &str) -> SqlizerResult<Builder> {
        self.ensure_open_tail("where_field")?;
        if self.state.context == Context::TopLevel && self.state.has_where() {
            return Err(SqlizerError::sequencing(
                "`where_field` cannot be chained after an existing WHERE; use a combinator first",
            ));
        }
        Self::ensure_name(column, "column name", "where_field")?;

        let fragment = match self.state.context {
            Context::Combinator => column.to_string(),
            Context::TopLevel => format!("WHERE {column}"),
        };

        let mut state = self.derive();
        state.fragments.push(fragment);
        state.context = Context::TopLevel;
        Ok(self.with_state(state))
    }

    fn combinator(&self, token: &str, method: &str) -> SqlizerResult<Builder> {
        self.ensure_open_tail(method)?;
        self.ensure_where_context(method)?;
        if self.state.ends_with_combinator() {
            return Err(SqlizerError::sequencing(format!(
                "`{method}` cannot follow another bare combinator"
            )));
        }

        let mut state = self.derive();
        state.fragments.push(token.to_string());
        state.context = Context::Combinator;
        Ok(self.with_state(state))
    }

    /// Append a bare `AND`; the next predicate continues the expression.
    pub fn and(&self) -> SqlizerResult<Builder> {
        self.combinator("AND", "and")
    }

    /// Append a bare `OR`; the next predicate continues the expression.
    pub fn or(&self) -> SqlizerResult<Builder> {
        self.combinator("OR", "or")
    }

    fn and_or(
        &self,
        column: &str,
        operator: &str,
        value: Arg,
        token: &str,
        method: &str,
    ) -> SqlizerResult<Builder> {
        self.ensure_open_tail(method)?;
        if self.state.ends_with_combinator() {
            return Err(SqlizerError::sequencing(format!(
                "`{method}` cannot be called after and()/or()"
            )));
        }
        if !self.state.has_where() {
            return Err(SqlizerError::sequencing(format!(
                "`{method}` must be chained after `where_`"
            )));
        }

        let mut state = self.derive();
        state.fragments.push(token.to_string());
        state.context = Context::Combinator;
        self.with_state(state).where_(column, operator, value)
    }

    /// Append `AND column OP ?`.
    pub fn and_where(
        &self,
        column: &str,
        operator: &str,
        value: impl Into<Arg>,
    ) -> SqlizerResult<Builder> {
        self.and_or(column, operator, value.into(), "AND", "and_where")
    }

    /// Append `OR column OP ?`.
    pub fn or_where(
        &self,
        column: &str,
        operator: &str,
        value: impl Into<Arg>,
    ) -> SqlizerResult<Builder> {
        self.and_or(column, operator, value.into(), "OR", "or_where")
    }

    fn group<F>(&self, token: &str, method: &str, f: F) -> SqlizerResult<Builder>
    where
        F: FnOnce(Builder) -> SqlizerResult<Builder>,
    {
        self.ensure_open_tail(method)?;
        self.ensure_where_context(method)?;
        if self.state.ends_with_combinator() {
            return Err(SqlizerError::sequencing(format!(
                "`{method}` cannot follow another bare combinator"
            )));
        }

        let mut state = self.derive();
        state.fragments.push(token.to_string());
        state.context = Context::Combinator;
        f(self.with_state(state))
    }

    /// Seed a sub-builder with `AND` and hand it to `f`.
    ///
    /// Note: grouped predicates are emitted flat, without parentheses, so
    /// they do not bind tighter than the surrounding expression.
    pub fn and_group<F>(&self, f: F) -> SqlizerResult<Builder>
    where
        F: FnOnce(Builder) -> SqlizerResult<Builder>,
    {
        self.group("AND", "and_group", f)
    }

    /// Seed a sub-builder with `OR` and hand it to `f`.
    ///
    /// Note: grouped predicates are emitted flat, without parentheses, so
    /// they do not bind tighter than the surrounding expression.
    pub fn or_group<F>(&self, f: F) -> SqlizerResult<Builder>
    where
        F: FnOnce(Builder) -> SqlizerResult<Builder>,
    {
        self.group("OR", "or_group", f)
    }

    fn where_in_or_not_in<V>(
        &self,
        column: &str,
        list: Vec<V>,
        op: &str,
        method: &str,
    ) -> SqlizerResult<Builder>
    where
        V: Into<Value>,
    {
        self.ensure_open_tail(method)?;
        Self::ensure_name(column, "column name", method)?;
        if list.is_empty() {
            return Err(SqlizerError::validation(format!(
                "`{method}` requires a non-empty list"
            )));
        }
        if self.state.context == Context::TopLevel && self.state.has_where() {
            return Err(SqlizerError::sequencing(format!(
                "`{method}` cannot introduce a second WHERE; use a combinator first"
            )));
        }

        let placeholders = vec!["?"; list.len()].join(",");
        let fragment = match self.state.context {
            Context::Combinator => format!("{column} {op}({placeholders})"),
            Context::TopLevel => format!("WHERE {column} {op}({placeholders})"),
        };

        let mut state = self.derive();
        state.fragments.push(fragment);
        state.values.extend(list.into_iter().map(Into::into));
        state.context = Context::TopLevel;
        Ok(self.with_state(state))
    }

    /// Append `WHERE column IN(?,...)` (or `column IN(?,...)` in a
    /// combinator context) and bind the list.
    pub fn where_in<V>(&self, column: &str, list: Vec<V>) -> SqlizerResult<Builder>
    where
        V: Into<Value>,
    {
        self.where_in_or_not_in(column, list, "IN", "where_in")
    }

    /// Append `WHERE column NOT IN(?,...)` and bind the list.
    pub fn where_not_in<V>(&self, column: &str, list: Vec<V>) -> SqlizerResult<Builder>
    where
        V: Into<Value>,
    {
        self.where_in_or_not_in(column, list, "NOT IN", "where_not_in")
    }

    fn list_suffix<V>(&self, list: Vec<V>, op: &str, method: &str) -> SqlizerResult<Builder>
    where
        V: Into<Value>,
    {
        self.ensure_open_tail(method)?;
        self.ensure_where_context(method)?;
        if list.is_empty() {
            return Err(SqlizerError::validation(format!(
                "`{method}` requires a non-empty list"
            )));
        }

        let placeholders = vec!["?"; list.len()].join(",");
        let mut state = self.derive();
        state.fragments.push(format!("{op}({placeholders})"));
        state.values.extend(list.into_iter().map(Into::into));
        Ok(self.with_state(state))
    }

    /// Append `IN(?,...)` to the trailing predicate (pairs with `where_field`).
    pub fn in_list<V>(&self, list: Vec<V>) -> SqlizerResult<Builder>
    where
        V: Into<Value>,
    {
        self.list_suffix(list, "IN", "in_list")
    }

    /// Append `NOT IN(?,...)` to the trailing predicate.
    pub fn not_in<V>(&self, list: Vec<V>) -> SqlizerResult<Builder>
    where
        V: Into<Value>,
    {
        self.list_suffix(list, "NOT IN", "not_in")
    }

    fn null_suffix(&self, token: &str, method: &str) -> SqlizerResult<Builder> {
        self.ensure_open_tail(method)?;
        self.ensure_where_context(method)?;

        let mut state = self.derive();
        state.fragments.push(token.to_string());
        Ok(self.with_state(state))
    }

    /// Append `IS NULL` to the trailing predicate.
    pub fn is_null(&self) -> SqlizerResult<Builder> {
        self.null_suffix("IS NULL", "is_null")
    }

    /// Append `IS NOT NULL` to the trailing predicate.
    pub fn is_not_null(&self) -> SqlizerResult<Builder> {
        self.null_suffix("IS NOT NULL", "is_not_null")
    }

    fn between(
        &self,
        start: Value,
        end: Value,
        template: &str,
        method: &str,
    ) -> SqlizerResult<Builder> {
        self.ensure_open_tail(method)?;
        self.ensure_where_context(method)?;
        if !start.is_number() || !end.is_number() {
            return Err(SqlizerError::validation(format!(
                "`{method}` requires numeric start and end bounds, got {} and {}",
                start.type_name(),
                end.type_name()
            )));
        }

        let mut state = self.derive();
        state.fragments.push(template.to_string());
        state.values.push(start);
        state.values.push(end);
        Ok(self.with_state(state))
    }

    /// Append `BETWEEN ? AND ?` and bind both bounds.
    pub fn is_between(
        &self,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> SqlizerResult<Builder> {
        self.between(start.into(), end.into(), "BETWEEN ? AND ?", "is_between")
    }

    /// Append `NOT BETWEEN ? AND ?` and bind both bounds.
    pub fn is_not_between(
        &self,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> SqlizerResult<Builder> {
        self.between(
            start.into(),
            end.into(),
            "NOT BETWEEN ? AND ?",
            "is_not_between",
        )
    }

    // ==================== materialization ====================

    /// Materialize the chain into a [`Statement`].
    ///
    /// Joins the fragments with single spaces, appends the statement
    /// terminator, and pairs the text with the accumulated values.
    pub fn build(&self) -> SqlizerResult<Statement> {
        if self.state.fragments.is_empty() {
            return Err(SqlizerError::TerminalState(
                "cannot materialize an empty builder".to_string(),
            ));
        }
        if self.state.ends_with_combinator() {
            return Err(SqlizerError::TerminalState(format!(
                "statement cannot end with a bare combinator [{}]",
                self.state.last_fragment().unwrap_or_default()
            )));
        }

        let markers = self.state.placeholder_count();
        if markers != self.state.values.len() {
            return Err(SqlizerError::validation(format!(
                "placeholder/value mismatch: {} markers, {} values",
                markers,
                self.state.values.len()
            )));
        }

        let text = format!("{};", self.state.fragments.join(" "));
        Ok(Statement::new(text, self.state.values.clone()))
    }
}
