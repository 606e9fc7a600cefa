//! The three-phase transaction protocol.
//!
//! Every command's Before phase runs before any Main phase, and every Main
//! phase runs before any After phase. The first failure rolls the whole
//! transaction back; nothing is committed unless all phases of all commands
//! succeed.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::command::{Command, Phase, PhaseValue};
use crate::error::PgMapperError;
use crate::executor::SqlExecutor;

/// An open transaction the runner can drive and then finish.
#[async_trait]
pub trait PatchTransaction: SqlExecutor + Sized {
    /// # Errors
    /// Returns `PgMapperError::CommitError` if the database refuses the commit.
    async fn commit(self) -> Result<(), PgMapperError>;

    /// # Errors
    /// Returns the driver error if the rollback itself fails.
    async fn rollback(self) -> Result<(), PgMapperError>;
}

/// Run all commands through the Before, Main and After sweeps inside `tx`,
/// then commit.
///
/// On the first failing phase the transaction is rolled back and that
/// command's error is returned unchanged. A failed rollback is logged and does
/// not replace the original error.
///
/// # Errors
/// Returns the failing command's error, or the commit error.
pub async fn run_phases<T>(mut tx: T, commands: &[Box<dyn Command>]) -> Result<(), PgMapperError>
where
    T: PatchTransaction,
{
    debug!(commands = commands.len(), "starting patch transaction");

    let outcome = sweep(&mut tx, commands).await;
    match outcome {
        Ok(()) => {
            tx.commit().await?;
            debug!(commands = commands.len(), "patch transaction committed");
            Ok(())
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback after failed phase also failed");
            }
            Err(err)
        }
    }
}

async fn sweep<T>(tx: &mut T, commands: &[Box<dyn Command>]) -> Result<(), PgMapperError>
where
    T: PatchTransaction,
{
    // slot i belongs to command i for the whole call
    let mut results: Vec<PhaseValue> = Vec::with_capacity(commands.len());

    for (index, command) in commands.iter().enumerate() {
        let value = command
            .execute_before(tx)
            .await
            .inspect_err(|err| log_failure(index, Phase::Before, err))?;
        results.push(value);
    }

    for (index, command) in commands.iter().enumerate() {
        let prior = std::mem::take(&mut results[index]);
        results[index] = command
            .execute_main(tx, prior)
            .await
            .inspect_err(|err| log_failure(index, Phase::Main, err))?;
    }

    for (index, command) in commands.iter().enumerate() {
        let prior = std::mem::take(&mut results[index]);
        results[index] = command
            .execute_after(tx, prior)
            .await
            .inspect_err(|err| log_failure(index, Phase::After, err))?;
    }

    Ok(())
}

fn log_failure(index: usize, phase: Phase, err: &PgMapperError) {
    warn!(command = index, %phase, error = %err, "patch phase failed, rolling back");
}
