//! Transactional patch application and dynamic parameter preparation over
//! `tokio-postgres`.
//!
//! A [`PatchCompiler`] turns a caller's patch into ordered [`Command`]s; the
//! [`Mapper`] applies them in one transaction using a Before/Main/After sweep
//! and commits only if every phase of every command succeeds. Statements are
//! built with [`prepare`], which expands list arguments into individually
//! numbered `$n` placeholders.

pub mod command;
pub mod compiler;
pub mod config;
pub mod error;
pub mod executor;
pub mod mapper;
pub mod postgres;
pub mod prelude;
pub mod prepare;
pub mod query;
pub mod results;
pub mod runner;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use command::{Command, Phase, PhaseValue, StatementCommand};
pub use compiler::{PatchCompiler, PatchContext};
pub use config::ConnectionConfig;
pub use error::PgMapperError;
pub use executor::SqlExecutor;
pub use mapper::Mapper;
pub use prepare::{Prepared, prepare};
pub use query::{ByteRow, concat_byte_rows};
pub use results::{CustomDbRow, ResultSet};
pub use runner::{PatchTransaction, run_phases};
pub use types::{QueryAndArgs, RowValues, SqlArg};
