#![allow(dead_code)]

use std::sync::Arc;

use oxide_orm::callbacks::{Callback, Phase, Processor};
use oxide_orm::{Config, Db, DialectKind, Result, SoftDelete, Statement, TableSchema};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn noop(_: &mut Statement) -> Result<()> {
    Ok(())
}

/// A handler appending `label` to the statement's `trace` setting.
pub fn record(label: &str) -> impl Fn(&mut Statement) -> Result<()> + Send + Sync + 'static {
    let label = label.to_owned();
    move |stmt| {
        let mut seen = trace(stmt);
        seen.push(label.clone());
        stmt.set_setting("trace", serde_json::json!(seen));
        Ok(())
    }
}

pub fn trace(stmt: &Statement) -> Vec<String> {
    stmt.setting("trace")
        .and_then(|value| serde_json::from_value(value.clone()).ok())
        .unwrap_or_default()
}

/// Registers `name` with string constraints, the way a table of cases
/// describes them.
pub fn add(processor: &mut Processor, name: &str, before: &[&str], after: &[&str]) {
    let mut callback = Callback::new(name, record(name));
    callback.before.extend(before.iter().map(|s| (*s).to_owned()));
    callback.after.extend(after.iter().map(|s| (*s).to_owned()));
    processor.insert(callback, false);
}

pub fn create_processor() -> Processor {
    Processor::new(Phase::Create)
}

/// Runs the chain and returns the handlers that actually ran.
pub fn run(processor: &Processor) -> Vec<String> {
    let mut stmt = Statement::new("users");
    processor
        .execute(&mut stmt)
        .unwrap_or_else(|e| panic!("Failed to execute chain\nError: {e}"));
    trace(&stmt)
}

pub fn users() -> Arc<TableSchema> {
    Arc::new(
        TableSchema::new("users")
            .primary_key("id")
            .field("Name", "name")
            .field("DeletedAt", "deleted_at"),
    )
}

pub fn soft_delete_db() -> Db {
    let mut db = Db::new(Config::default());
    db.use_plugin(SoftDelete::new())
        .unwrap_or_else(|e| panic!("Failed to install plugin\nError: {e}"));
    db
}

pub fn postgres_db() -> Db {
    Db::new(Config::default().dialect(DialectKind::Postgres))
}
