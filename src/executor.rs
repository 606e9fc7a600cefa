use async_trait::async_trait;

use crate::error::PgMapperError;
use crate::prepare::prepare;
use crate::results::ResultSet;
use crate::types::{RowValues, SqlArg};

/// Query surface shared by pooled connections and open transactions.
///
/// Implementors supply the three raw operations; the prepared variants run the
/// parameter preparer first and delegate.
#[async_trait]
pub trait SqlExecutor: Send {
    /// Executes `query` unmodified and returns the number of rows affected.
    async fn execute_raw(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<u64, PgMapperError>;

    /// Executes `query` unmodified and returns the decoded rows.
    async fn query_raw(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, PgMapperError>;

    /// Executes `query` unmodified and concatenates the single byte column of
    /// every returned row, in row order. Zero rows yields an empty buffer.
    async fn query_into_bytes(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<Vec<u8>, PgMapperError>;

    /// Prepares `template` with `args` and executes it, discarding the result.
    async fn execute(&mut self, template: &str, args: &[SqlArg]) -> Result<(), PgMapperError> {
        let prepared = prepare(template, args);
        self.execute_raw(&prepared.statement, &prepared.params)
            .await
            .map(|_| ())
    }

    /// Prepares `template` with `args` and returns the decoded rows.
    async fn select(
        &mut self,
        template: &str,
        args: &[SqlArg],
    ) -> Result<ResultSet, PgMapperError> {
        let prepared = prepare(template, args);
        self.query_raw(&prepared.statement, &prepared.params).await
    }

    /// Prepares `template` with `args`, then behaves like [`SqlExecutor::query_into_bytes`].
    async fn prepared_query_into_bytes(
        &mut self,
        template: &str,
        args: &[SqlArg],
    ) -> Result<Vec<u8>, PgMapperError> {
        let prepared = prepare(template, args);
        self.query_into_bytes(&prepared.statement, &prepared.params)
            .await
    }
}
