//! Embedded `PostgreSQL` for integration tests and benchmarks.

use postgresql_embedded::PostgreSQL;
use tracing::warn;

use crate::config::ConnectionConfig;
use crate::mapper::Mapper;

/// A running embedded `PostgreSQL` instance and the config that reaches it.
pub struct EmbeddedPostgres {
    pub postgresql: PostgreSQL,
    pub config: ConnectionConfig,
}

impl EmbeddedPostgres {
    /// Build a mapper pointed at this instance.
    ///
    /// # Errors
    /// Propagates pool setup errors.
    pub fn mapper(&self) -> Result<Mapper, crate::error::PgMapperError> {
        Mapper::new(&self.config)
    }
}

/// Set up and start an embedded server with a fresh `db_name` database.
///
/// # Errors
/// Returns an error if the binaries cannot be installed, the server cannot be
/// started, or the database cannot be created.
pub async fn setup_postgres_embedded(
    db_name: &str,
) -> Result<EmbeddedPostgres, Box<dyn std::error::Error>> {
    let mut postgresql = PostgreSQL::default();
    postgresql.setup().await?;
    postgresql.start().await?;
    postgresql.create_database(db_name).await?;

    let settings = postgresql.settings();
    let config = ConnectionConfig {
        user: settings.username.clone(),
        port: settings.port,
        host: settings.host.clone(),
        password: settings.password.clone(),
        ssl: false,
        database: db_name.to_string(),
    };

    Ok(EmbeddedPostgres { postgresql, config })
}

/// Stop a previously started embedded instance.
pub async fn stop_postgres_embedded(postgres: EmbeddedPostgres) {
    if let Err(err) = postgres.postgresql.stop().await {
        warn!(error = %err, "embedded postgres did not stop cleanly");
    }
}
