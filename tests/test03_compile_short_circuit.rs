use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pg_mapper::prelude::*;
use serde_json::{Map, Value, json};

/// Nothing listens on port 1, so any checkout fails fast.
fn unreachable_mapper() -> Mapper {
    let cfg = ConnectionConfig {
        host: "127.0.0.1".into(),
        port: 1,
        ..ConnectionConfig::default()
    };
    Mapper::new(&cfg).expect("pool setup does not connect")
}

struct CountingCommand {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Command for CountingCommand {
    async fn execute_main(
        &self,
        _tx: &mut dyn SqlExecutor,
        prior: PhaseValue,
    ) -> Result<PhaseValue, PgMapperError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(prior)
    }
}

/// Accepts patches that are JSON arrays; records the context it saw.
struct ArrayCompiler {
    calls: Arc<AtomicUsize>,
    seen: std::sync::Mutex<Option<Map<String, Value>>>,
}

impl ArrayCompiler {
    fn new() -> Self {
        Self {
            calls: Arc::default(),
            seen: std::sync::Mutex::new(None),
        }
    }
}

#[async_trait]
impl PatchCompiler for ArrayCompiler {
    type Patch = Value;

    async fn compile(
        &self,
        patch: &Value,
        ctx: &PatchContext,
    ) -> Result<Vec<Box<dyn Command>>, PgMapperError> {
        *self.seen.lock().unwrap() = Some(ctx.options().clone());
        let ops = patch
            .as_array()
            .ok_or_else(|| PgMapperError::CompileError("patch must be an array".into()))?;
        Ok(ops
            .iter()
            .map(|_| {
                Box::new(CountingCommand {
                    calls: self.calls.clone(),
                }) as Box<dyn Command>
            })
            .collect())
    }
}

#[tokio::test]
async fn compile_error_returns_before_connecting() {
    let mapper = unreachable_mapper();
    let compiler = ArrayCompiler::new();

    let err = mapper
        .apply_patch(&json!({"op": "replace"}), &compiler, Map::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PgMapperError::CompileError(_)));
    assert_eq!(mapper.pool().status().size, 0);
    assert_eq!(compiler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn connection_failure_runs_no_commands() {
    let mapper = unreachable_mapper();
    let compiler = ArrayCompiler::new();

    let err = mapper
        .apply_patch(&json!([{"op": "add"}]), &compiler, Map::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PgMapperError::ConnectionError(_)));
    assert_eq!(compiler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn identity_variants_fill_context_options() {
    let mapper = unreachable_mapper();
    let compiler = ArrayCompiler::new();

    let _ = mapper
        .apply_patch_as(7, "user-42", &json!("not an array"), &compiler)
        .await;
    let seen = compiler.seen.lock().unwrap().clone().unwrap();
    assert_eq!(seen.get("id"), Some(&json!(7)));
    assert_eq!(seen.get("userId"), Some(&json!("user-42")));

    let _ = mapper
        .apply_patch_for("doc-1", &json!("not an array"), &compiler)
        .await;
    let seen = compiler.seen.lock().unwrap().clone().unwrap();
    assert_eq!(seen.get("id"), Some(&json!("doc-1")));
    assert!(seen.get("userId").is_none());
}
