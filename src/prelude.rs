//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::command::{Command, Phase, PhaseValue, StatementCommand};
pub use crate::compiler::{PatchCompiler, PatchContext};
pub use crate::config::ConnectionConfig;
pub use crate::error::PgMapperError;
pub use crate::executor::SqlExecutor;
pub use crate::mapper::Mapper;
pub use crate::prepare::{Prepared, prepare};
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::runner::{PatchTransaction, run_phases};
pub use crate::types::{QueryAndArgs, RowValues, SqlArg};
