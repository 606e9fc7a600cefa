// PostgreSQL module - the only backend the mapper runs against
//
// - config: pool setup from a `ConnectionConfig`
// - params: parameter conversion between `RowValues` and PostgreSQL types
// - query: row decoding and the shared execute/query/bytes helpers
// - connection: pooled connection wrapper
// - transaction: transaction wrapper driven by the phase runner

pub mod config;
pub mod connection;
pub mod params;
pub mod query;
pub mod transaction;

// Re-export the public API
pub use config::create_pool;
pub use connection::PgConnection;
pub use params::Params;
pub use query::{build_result_set_from_rows, postgres_extract_value};
pub use transaction::{Tx, begin_transaction};
