use async_trait::async_trait;
use deadpool_postgres::Pool;
use serde_json::{Map, Value};

use crate::command::Command;
use crate::error::PgMapperError;

/// Options key carrying the id of the record being patched.
pub const ID_KEY: &str = "id";
/// Options key carrying the id of the acting user.
pub const USER_ID_KEY: &str = "userId";

/// Everything a compiler may consult while compiling one patch.
///
/// The live database handle is always present; caller-supplied values live in
/// a string-keyed options map. The context only lives for one `apply_patch` call.
#[derive(Clone)]
pub struct PatchContext {
    db: Pool,
    options: Map<String, Value>,
}

impl PatchContext {
    #[must_use]
    pub fn new(db: Pool, options: Map<String, Value>) -> Self {
        Self { db, options }
    }

    /// The pool the patch is applied against.
    #[must_use]
    pub fn db(&self) -> &Pool {
        &self.db
    }

    #[must_use]
    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.get(ID_KEY)
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&Value> {
        self.get(USER_ID_KEY)
    }
}

impl std::fmt::Debug for PatchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchContext")
            .field("db", &self.db.status())
            .field("options", &self.options)
            .finish()
    }
}

/// Turns a patch into the ordered commands the runner executes.
///
/// Implementations decide the patch format; the runner only relies on the order
/// of the returned commands.
#[async_trait]
pub trait PatchCompiler: Send + Sync {
    type Patch: Send + Sync + ?Sized;

    /// # Errors
    /// Returns an error (typically `PgMapperError::CompileError`) when the patch
    /// or context is rejected. The runner opens no transaction in that case.
    async fn compile(
        &self,
        patch: &Self::Patch,
        ctx: &PatchContext,
    ) -> Result<Vec<Box<dyn Command>>, PgMapperError>;
}
