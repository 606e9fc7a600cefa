use thiserror::Error;

#[derive(Debug, Error)]
pub enum PgMapperError {
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Patch compilation error: {0}")]
    CompileError(String),

    #[error("Command phase error: {0}")]
    PhaseError(String),

    #[error("Row decode error: {0}")]
    DecodeError(String),

    #[error("Commit failed: {0}")]
    CommitError(#[source] tokio_postgres::Error),
}

impl From<deadpool_postgres::PoolError> for PgMapperError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        PgMapperError::ConnectionError(format!("Postgres pool error: {err}"))
    }
}
