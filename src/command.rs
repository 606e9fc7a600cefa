//! Compiled units of work and the values threaded between their phases.

use std::fmt;

use async_trait::async_trait;

use crate::error::PgMapperError;
use crate::executor::SqlExecutor;
use crate::results::ResultSet;
use crate::types::{QueryAndArgs, RowValues};

/// The three execution phases, in the order they are swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    Main,
    After,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Before => "before",
            Phase::Main => "main",
            Phase::After => "after",
        })
    }
}

/// Intermediate value handed from one phase of a command to the next phase of
/// the same command.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PhaseValue {
    #[default]
    Empty,
    Rows(ResultSet),
    Affected(u64),
    Bytes(Vec<u8>),
    Value(RowValues),
    Json(serde_json::Value),
}

/// One compiled unit of work.
///
/// The runner calls `execute_before` on every command, then `execute_main` on
/// every command, then `execute_after` on every command, all inside one
/// transaction. Main receives what Before returned for the same command and
/// After receives what Main returned.
#[async_trait]
pub trait Command: Send + Sync {
    /// Validation or pre-fetch. Runs before any command's Main phase.
    async fn execute_before(&self, _tx: &mut dyn SqlExecutor) -> Result<PhaseValue, PgMapperError> {
        Ok(PhaseValue::Empty)
    }

    /// The mutation itself.
    async fn execute_main(
        &self,
        tx: &mut dyn SqlExecutor,
        prior: PhaseValue,
    ) -> Result<PhaseValue, PgMapperError>;

    /// Post-mutation side effects. Only reached once every Main phase succeeded.
    async fn execute_after(
        &self,
        _tx: &mut dyn SqlExecutor,
        prior: PhaseValue,
    ) -> Result<PhaseValue, PgMapperError> {
        Ok(prior)
    }
}

/// A command built from prepared SQL templates.
///
/// * Before: runs the optional guard query and hands its rows to Main. With
///   [`StatementCommand::require_rows`] an empty guard result fails the phase.
/// * Main: runs the statement and yields the affected row count.
/// * After: runs the optional follow-up statement and passes Main's value on.
///
/// ```rust
/// use pg_mapper::prelude::*;
///
/// let cmd = StatementCommand::new(QueryAndArgs::new(
///     "UPDATE accounts SET active = false WHERE id IN (%s)",
///     vec![SqlArg::list([1_i64, 2])],
/// ))
/// .with_guard(QueryAndArgs::new(
///     "SELECT id FROM accounts WHERE id IN (%s) FOR UPDATE",
///     vec![SqlArg::list([1_i64, 2])],
/// ))
/// .require_rows();
/// # let _ = cmd;
/// ```
#[derive(Debug, Clone)]
pub struct StatementCommand {
    guard: Option<QueryAndArgs>,
    require_rows: bool,
    statement: QueryAndArgs,
    follow_up: Option<QueryAndArgs>,
}

impl StatementCommand {
    #[must_use]
    pub fn new(statement: QueryAndArgs) -> Self {
        Self {
            guard: None,
            require_rows: false,
            statement,
            follow_up: None,
        }
    }

    #[must_use]
    pub fn with_guard(mut self, guard: QueryAndArgs) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Fail the Before phase when the guard query returns no rows.
    #[must_use]
    pub fn require_rows(mut self) -> Self {
        self.require_rows = true;
        self
    }

    #[must_use]
    pub fn with_follow_up(mut self, follow_up: QueryAndArgs) -> Self {
        self.follow_up = Some(follow_up);
        self
    }
}

#[async_trait]
impl Command for StatementCommand {
    async fn execute_before(&self, tx: &mut dyn SqlExecutor) -> Result<PhaseValue, PgMapperError> {
        let Some(guard) = &self.guard else {
            return Ok(PhaseValue::Empty);
        };
        let rows = tx.select(&guard.query, &guard.args).await?;
        if self.require_rows && rows.is_empty() {
            return Err(PgMapperError::PhaseError(format!(
                "guard matched no rows: {}",
                guard.query
            )));
        }
        Ok(PhaseValue::Rows(rows))
    }

    async fn execute_main(
        &self,
        tx: &mut dyn SqlExecutor,
        _prior: PhaseValue,
    ) -> Result<PhaseValue, PgMapperError> {
        let prepared = self.statement.prepare();
        let affected = tx
            .execute_raw(&prepared.statement, &prepared.params)
            .await?;
        Ok(PhaseValue::Affected(affected))
    }

    async fn execute_after(
        &self,
        tx: &mut dyn SqlExecutor,
        prior: PhaseValue,
    ) -> Result<PhaseValue, PgMapperError> {
        if let Some(follow_up) = &self.follow_up {
            tx.execute(&follow_up.query, &follow_up.args).await?;
        }
        Ok(prior)
    }
}
