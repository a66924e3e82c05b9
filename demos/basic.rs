//! Basic Replicant Example
//!
//! Demonstrates embedded-mode usage: declaring replicants, observing
//! changes, batching edits, and whole-value assignment.
//!
//! Run with: cargo run --example basic

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;

use replicant_core::{DeclareOptions, Registry};
use replicant_storage::FileStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("Replicant Basic Example\n");

    let store = Arc::new(FileStore::new("./db/replicants"));
    let registry = Arc::new(Registry::with_store(store));

    // Declare a replicant; the default applies only on first declaration.
    let scores = registry
        .declare(
            "example-bundle",
            "scores",
            DeclareOptions::with_default(json!({"red": 0, "blue": 0, "log": []})),
        )
        .await?;

    scores.on_change(|event| {
        println!(
            "change r{}: {} op(s) -> {}",
            event.revision,
            event.operations.len(),
            event.new_value
        );
    });

    // Single tracked edits: one commit, one op each.
    scores.set("red", json!(1))?;
    scores.push("log", json!("red scored"))?;

    // Batched edits: one commit, one revision bump, ordered ops.
    scores.transact(|txn| {
        txn.set("blue", json!(1))?;
        txn.push("log", json!("blue equalized"))
    })?;

    // Whole-value assignment acknowledges the originator.
    let ack = scores.assign(json!({"red": 0, "blue": 0, "log": []}))?;
    println!("reset accepted at revision {}", ack.revision);

    // One-shot snapshot read; no subscription, no events.
    println!(
        "\nreadReplicant: {:?}",
        registry.read("example-bundle", "scores")
    );

    // Programmatic directory of declared replicants.
    println!("\nDeclared replicants:");
    for (namespace, names) in registry.declared() {
        for (name, record) in names {
            println!(
                "  - {}/{} (revision {}, persistent: {})",
                namespace,
                name,
                record.revision(),
                record.persistent()
            );
        }
    }

    // Let the coalescing writer flush the final snapshot.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    Ok(())
}
