//! Executing materialized statements against PostgreSQL.
//!
//! An [`Executor`] takes a [`Statement`], renders its `?` markers as the
//! `$1, $2, ...` placeholders tokio-postgres expects, and runs it with the
//! statement's bound values. The trait is implemented for plain clients,
//! transactions, and (behind the `pool` feature) deadpool-postgres clients,
//! so query code can stay generic over where the connection came from.

use crate::error::SqlizerResult;
use crate::statement::Statement;
use tokio_postgres::Row;

fn render(stmt: &Statement) -> String {
    let sql = stmt.to_pg_sql();
    tracing::debug!(target: "sqlizer::query", sql = %sql, params = stmt.values().len());
    sql
}

/// A connection-like handle that can run materialized statements.
pub trait Executor: Send + Sync {
    /// Run the statement and return all rows.
    fn query(&self, stmt: &Statement) -> impl std::future::Future<Output = SqlizerResult<Vec<Row>>> + Send;

    /// Run the statement and require exactly one row.
    fn query_one(&self, stmt: &Statement) -> impl std::future::Future<Output = SqlizerResult<Row>> + Send;

    /// Run the statement and return the first row, if any.
    fn query_opt(
        &self,
        stmt: &Statement,
    ) -> impl std::future::Future<Output = SqlizerResult<Option<Row>>> + Send;

    /// Run the statement and return the number of affected rows.
    fn execute(&self, stmt: &Statement) -> impl std::future::Future<Output = SqlizerResult<u64>> + Send;
}

impl Executor for tokio_postgres::Client {
    async fn query(&self, stmt: &Statement) -> SqlizerResult<Vec<Row>> {
        let sql = render(stmt);
        Ok(tokio_postgres::Client::query(self, &sql, &stmt.params_ref()).await?)
    }

    async fn query_one(&self, stmt: &Statement) -> SqlizerResult<Row> {
        let sql = render(stmt);
        Ok(tokio_postgres::Client::query_one(self, &sql, &stmt.params_ref()).await?)
    }

    async fn query_opt(&self, stmt: &Statement) -> SqlizerResult<Option<Row>> {
        let sql = render(stmt);
        Ok(tokio_postgres::Client::query_opt(self, &sql, &stmt.params_ref()).await?)
    }

    async fn execute(&self, stmt: &Statement) -> SqlizerResult<u64> {
        let sql = render(stmt);
        Ok(tokio_postgres::Client::execute(self, &sql, &stmt.params_ref()).await?)
    }
}

impl Executor for tokio_postgres::Transaction<'_> {
    async fn query(&self, stmt: &Statement) -> SqlizerResult<Vec<Row>> {
        let sql = render(stmt);
        Ok(tokio_postgres::Transaction::query(self, &sql, &stmt.params_ref()).await?)
    }

    async fn query_one(&self, stmt: &Statement) -> SqlizerResult<Row> {
        let sql = render(stmt);
        Ok(tokio_postgres::Transaction::query_one(self, &sql, &stmt.params_ref()).await?)
    }

    async fn query_opt(&self, stmt: &Statement) -> SqlizerResult<Option<Row>> {
        let sql = render(stmt);
        Ok(tokio_postgres::Transaction::query_opt(self, &sql, &stmt.params_ref()).await?)
    }

    async fn execute(&self, stmt: &Statement) -> SqlizerResult<u64> {
        let sql = render(stmt);
        Ok(tokio_postgres::Transaction::execute(self, &sql, &stmt.params_ref()).await?)
    }
}

#[cfg(feature = "pool")]
impl Executor for deadpool_postgres::Client {
    async fn query(&self, stmt: &Statement) -> SqlizerResult<Vec<Row>> {
        // Delegate to the deref target (ClientWrapper / tokio_postgres::Client).
        Executor::query(&***self, stmt).await
    }

    async fn query_one(&self, stmt: &Statement) -> SqlizerResult<Row> {
        Executor::query_one(&***self, stmt).await
    }

    async fn query_opt(&self, stmt: &Statement) -> SqlizerResult<Option<Row>> {
        Executor::query_opt(&***self, stmt).await
    }

    async fn execute(&self, stmt: &Statement) -> SqlizerResult<u64> {
        Executor::execute(&***self, stmt).await
    }
}

#[cfg(feature = "pool")]
impl Executor for deadpool_postgres::Transaction<'_> {
    async fn query(&self, stmt: &Statement) -> SqlizerResult<Vec<Row>> {
        Executor::query(&**self, stmt).await
    }

    async fn query_one(&self, stmt: &Statement) -> SqlizerResult<Row> {
        Executor::query_one(&**self, stmt).await
    }

    async fn query_opt(&self, stmt: &Statement) -> SqlizerResult<Option<Row>> {
        Executor::query_opt(&**self, stmt).await
    }

    async fn execute(&self, stmt: &Statement) -> SqlizerResult<u64> {
        Executor::execute(&**self, stmt).await
    }
}

impl<C: Executor> Executor for &C {
    async fn query(&self, stmt: &Statement) -> SqlizerResult<Vec<Row>> {
        (*self).query(stmt).await
    }

    async fn query_one(&self, stmt: &Statement) -> SqlizerResult<Row> {
        (*self).query_one(stmt).await
    }

    async fn query_opt(&self, stmt: &Statement) -> SqlizerResult<Option<Row>> {
        (*self).query_opt(stmt).await
    }

    async fn execute(&self, stmt: &Statement) -> SqlizerResult<u64> {
        (*self).execute(stmt).await
    }
}
