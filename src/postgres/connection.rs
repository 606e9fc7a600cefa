use async_trait::async_trait;
use deadpool_postgres::Object;

use super::query::{execute_on, query_bytes_on, query_on};
use super::transaction::{Tx, begin_transaction};
use crate::error::PgMapperError;
use crate::executor::SqlExecutor;
use crate::results::ResultSet;
use crate::types::RowValues;

/// A pooled Postgres connection checked out for the duration of one call.
pub struct PgConnection {
    client: Object,
}

impl PgConnection {
    #[must_use]
    pub fn new(client: Object) -> Self {
        Self { client }
    }

    /// Begin a transaction borrowing this connection.
    ///
    /// # Errors
    /// Returns an error if the driver cannot start the transaction.
    pub async fn begin(&mut self) -> Result<Tx<'_>, PgMapperError> {
        begin_transaction(&mut self.client).await
    }
}

#[async_trait]
impl SqlExecutor for PgConnection {
    async fn execute_raw(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<u64, PgMapperError> {
        let client: &tokio_postgres::Client = &self.client;
        execute_on(client, query, params).await
    }

    async fn query_raw(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, PgMapperError> {
        let client: &tokio_postgres::Client = &self.client;
        query_on(client, query, params).await
    }

    async fn query_into_bytes(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<Vec<u8>, PgMapperError> {
        let client: &tokio_postgres::Client = &self.client;
        query_bytes_on(client, query, params).await
    }
}
