use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

use crate::config::ConnectionConfig;
use crate::error::PgMapperError;

/// Build a connection pool from `config`'s connection string.
///
/// No connection is opened here; the first checkout connects.
///
/// # Errors
/// Returns `PgMapperError::ConfigError` if the connection string does not parse
/// or `PgMapperError::ConnectionError` if the pool cannot be built.
pub fn create_pool(config: &ConnectionConfig) -> Result<Pool, PgMapperError> {
    let pg_config: tokio_postgres::Config = config
        .connection_string()
        .parse()
        .map_err(|e| PgMapperError::ConfigError(format!("Invalid connection string: {e}")))?;

    let mut manager_config = ManagerConfig::default();
    manager_config.recycling_method = RecyclingMethod::Fast;
    let manager = Manager::from_config(pg_config, NoTls, manager_config);

    Pool::builder(manager).build().map_err(|e| {
        PgMapperError::ConnectionError(format!("Failed to create Postgres pool: {e}"))
    })
}
