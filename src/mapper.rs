use deadpool_postgres::Pool;
use serde_json::{Map, Value};

use crate::command::Command;
use crate::compiler::{ID_KEY, PatchCompiler, PatchContext, USER_ID_KEY};
use crate::config::ConnectionConfig;
use crate::error::PgMapperError;
use crate::executor::SqlExecutor;
use crate::postgres::{PgConnection, create_pool};
use crate::results::ResultSet;
use crate::runner::run_phases;
use crate::types::{RowValues, SqlArg};

/// Entry point: owns the pooled database handle and applies patches against it.
///
/// `Mapper` is cheap to clone; clones share the pool. Concurrent calls each
/// check out their own connection and run their own transaction.
#[derive(Clone)]
pub struct Mapper {
    pool: Pool,
}

impl Mapper {
    /// Build a mapper for `config`. Connections are opened lazily.
    ///
    /// # Errors
    /// Returns `PgMapperError::ConfigError` or `PgMapperError::ConnectionError`
    /// if the pool cannot be set up.
    pub fn new(config: &ConnectionConfig) -> Result<Self, PgMapperError> {
        Ok(Self {
            pool: create_pool(config)?,
        })
    }

    /// Wrap an already configured pool.
    #[must_use]
    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Check out a pooled connection.
    ///
    /// # Errors
    /// Returns `PgMapperError::ConnectionError` if no connection can be opened.
    pub async fn connection(&self) -> Result<PgConnection, PgMapperError> {
        Ok(PgConnection::new(self.pool.get().await?))
    }

    /// Compile `patch` with `compiler` and apply the resulting commands in one
    /// transaction.
    ///
    /// The pool is handed to the compiler through [`PatchContext::db`]. A
    /// compilation failure returns before any connection is checked out.
    ///
    /// # Errors
    /// Returns the compiler's error, a connection error, the first failing
    /// command phase's error (after rolling back), or the commit error.
    pub async fn apply_patch<C>(
        &self,
        patch: &C::Patch,
        compiler: &C,
        options: Map<String, Value>,
    ) -> Result<(), PgMapperError>
    where
        C: PatchCompiler + ?Sized,
    {
        let ctx = PatchContext::new(self.pool.clone(), options);
        let commands = compiler.compile(patch, &ctx).await?;
        self.run(&commands).await
    }

    /// [`Mapper::apply_patch`] for a patch targeting the record `id`.
    ///
    /// # Errors
    /// See [`Mapper::apply_patch`].
    pub async fn apply_patch_for<C>(
        &self,
        id: impl Into<Value>,
        patch: &C::Patch,
        compiler: &C,
    ) -> Result<(), PgMapperError>
    where
        C: PatchCompiler + ?Sized,
    {
        let mut options = Map::new();
        options.insert(ID_KEY.to_string(), id.into());
        self.apply_patch(patch, compiler, options).await
    }

    /// [`Mapper::apply_patch`] for a patch targeting `id` on behalf of `user_id`.
    ///
    /// # Errors
    /// See [`Mapper::apply_patch`].
    pub async fn apply_patch_as<C>(
        &self,
        id: impl Into<Value>,
        user_id: impl Into<Value>,
        patch: &C::Patch,
        compiler: &C,
    ) -> Result<(), PgMapperError>
    where
        C: PatchCompiler + ?Sized,
    {
        let mut options = Map::new();
        options.insert(ID_KEY.to_string(), id.into());
        options.insert(USER_ID_KEY.to_string(), user_id.into());
        self.apply_patch(patch, compiler, options).await
    }

    async fn run(&self, commands: &[Box<dyn Command>]) -> Result<(), PgMapperError> {
        let mut conn = self.connection().await?;
        let tx = conn.begin().await?;
        run_phases(tx, commands).await
    }

    /// Prepare `template` with `args` and execute it, discarding the result.
    ///
    /// # Errors
    /// Returns connection or driver errors.
    pub async fn execute(&self, template: &str, args: &[SqlArg]) -> Result<(), PgMapperError> {
        self.connection().await?.execute(template, args).await
    }

    /// Execute `query` unmodified and return the rows affected.
    ///
    /// # Errors
    /// Returns connection or driver errors.
    pub async fn execute_raw(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<u64, PgMapperError> {
        self.connection().await?.execute_raw(query, params).await
    }

    /// Prepare `template` with `args` and return the decoded rows.
    ///
    /// # Errors
    /// Returns connection, driver, or decode errors.
    pub async fn select(&self, template: &str, args: &[SqlArg]) -> Result<ResultSet, PgMapperError> {
        self.connection().await?.select(template, args).await
    }

    /// Execute `query` unmodified and return the decoded rows.
    ///
    /// # Errors
    /// Returns connection, driver, or decode errors.
    pub async fn query_raw(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, PgMapperError> {
        self.connection().await?.query_raw(query, params).await
    }

    /// Execute `query` unmodified and concatenate its single `bytea` column.
    ///
    /// # Errors
    /// Returns connection, driver, or decode errors.
    pub async fn query_into_bytes(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<Vec<u8>, PgMapperError> {
        self.connection().await?.query_into_bytes(query, params).await
    }

    /// Prepare `template` with `args`, then behave like [`Mapper::query_into_bytes`].
    ///
    /// # Errors
    /// Returns connection, driver, or decode errors.
    pub async fn prepared_query_into_bytes(
        &self,
        template: &str,
        args: &[SqlArg],
    ) -> Result<Vec<u8>, PgMapperError> {
        self.connection()
            .await?
            .prepared_query_into_bytes(template, args)
            .await
    }
}

impl std::fmt::Debug for Mapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper")
            .field("pool", &self.pool.status())
            .finish()
    }
}
