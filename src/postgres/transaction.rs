use async_trait::async_trait;
use deadpool_postgres::{Object, Transaction as PgTransaction};

use super::query::{execute_on, query_bytes_on, query_on};
use crate::error::PgMapperError;
use crate::executor::SqlExecutor;
use crate::results::ResultSet;
use crate::runner::PatchTransaction;
use crate::types::RowValues;

/// Lightweight transaction wrapper for Postgres.
pub struct Tx<'a> {
    tx: PgTransaction<'a>,
}

/// Begin a new transaction on the provided Postgres connection.
///
/// # Errors
/// Returns an error if creating the transaction fails.
pub async fn begin_transaction(conn: &mut Object) -> Result<Tx<'_>, PgMapperError> {
    let tx = conn.transaction().await?;
    Ok(Tx { tx })
}

#[async_trait]
impl SqlExecutor for Tx<'_> {
    async fn execute_raw(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<u64, PgMapperError> {
        execute_on(&*self.tx, query, params).await
    }

    async fn query_raw(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, PgMapperError> {
        query_on(&*self.tx, query, params).await
    }

    async fn query_into_bytes(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<Vec<u8>, PgMapperError> {
        query_bytes_on(&*self.tx, query, params).await
    }
}

#[async_trait]
impl PatchTransaction for Tx<'_> {
    async fn commit(self) -> Result<(), PgMapperError> {
        self.tx.commit().await.map_err(PgMapperError::CommitError)
    }

    async fn rollback(self) -> Result<(), PgMapperError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
