// Batch run command
//
// Seeds an in-memory store, runs one or more concurrent batches over it on a
// shared worker pool and prints each report.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use itemflow_core::{status, InMemoryItemStore, Item, ItemId, ItemService};
use itemflow_engine::{BatchEngine, BatchReport, ItemflowConfig, WorkerPool};
use tracing::info;

use crate::output::{write_field, write_table_header, write_table_row, OutputFormat};

#[derive(Args)]
pub struct RunArgs {
    /// Number of items to seed
    #[arg(long, default_value = "10")]
    pub items: u64,

    /// Item IDs to delete after seeding (repeatable)
    #[arg(long, value_delimiter = ',')]
    pub missing: Vec<u64>,

    /// Worker pool size (overrides ITEMFLOW_MAX_WORKERS)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Per-item delay in milliseconds (overrides ITEMFLOW_PROCESSING_DELAY_MS)
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Submissions allowed to wait for a worker (overrides ITEMFLOW_QUEUE_CAPACITY)
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Number of concurrent batches
    #[arg(long, default_value = "1")]
    pub batches: usize,
}

pub async fn run(args: RunArgs, output: OutputFormat, quiet: bool) -> Result<()> {
    let config = apply_overrides(ItemflowConfig::from_env(), &args);

    let store = Arc::new(InMemoryItemStore::new());
    let service = ItemService::new(store.clone());

    seed(&service, args.items).await?;
    for &id in &args.missing {
        service
            .delete_by_id(ItemId::new(id))
            .await
            .with_context(|| format!("Failed to delete item {}", id))?;
    }

    let pool = Arc::new(WorkerPool::new(config.pool));
    let engine = BatchEngine::new(store, Arc::clone(&pool), config.engine);

    let handles: Vec<_> = (0..args.batches.max(1))
        .map(|_| engine.process_all())
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for result in futures::future::join_all(handles).await {
        reports.push(result.context("Batch failed")?);
    }

    pool.shutdown()
        .await
        .context("Failed to shut down worker pool")?;

    output.emit(&reports, |out, reports| {
        for report in reports {
            write_report(out, report, quiet)?;
        }
        Ok(())
    })
}

fn apply_overrides(mut config: ItemflowConfig, args: &RunArgs) -> ItemflowConfig {
    if let Some(workers) = args.workers {
        config.pool = config.pool.with_max_concurrency(workers);
    }
    if let Some(capacity) = args.queue_capacity {
        config.pool = config.pool.with_queue_capacity(capacity);
    }
    if let Some(delay_ms) = args.delay_ms {
        config.engine = config
            .engine
            .with_processing_delay(Duration::from_millis(delay_ms));
    }
    config
}

async fn seed(service: &ItemService, count: u64) -> Result<()> {
    for i in 1..=count {
        let item = Item::new(format!("item-{}", i), format!("item{}@example.com", i))
            .with_description("seeded by itemflow run")
            .with_status(status::NEW);

        service
            .save(item)
            .await
            .with_context(|| format!("Failed to seed item {}", i))?;
    }

    info!(count, "Seeded items");
    Ok(())
}

fn write_report(out: &mut dyn Write, report: &BatchReport, quiet: bool) -> io::Result<()> {
    write_field(out, "Batch", &report.batch_id.to_string())?;
    write_field(
        out,
        "Processed",
        &format!("{}/{}", report.succeeded, report.total),
    )?;
    write_field(out, "Not found", &report.not_found.to_string())?;
    write_field(out, "Failed", &report.failed.to_string())?;
    write_field(
        out,
        "Elapsed",
        &format!("{} ms", report.elapsed().num_milliseconds()),
    )?;
    if let Some(fault) = &report.orchestration_fault {
        write_field(out, "Fault", fault)?;
    }

    if !quiet && !report.items.is_empty() {
        writeln!(out)?;
        write_table_header(out, &[("ID", 8), ("NAME", 20), ("STATUS", 12)])?;
        for item in &report.items {
            let id = item.id.map(|id| id.to_string()).unwrap_or_default();
            write_table_row(
                out,
                &[
                    (&id, 8),
                    (&item.name, 20),
                    (item.status.as_deref().unwrap_or("-"), 12),
                ],
            )?;
        }
    }

    if !report.failures.is_empty() {
        writeln!(out)?;
        write_table_header(out, &[("ID", 8), ("KIND", 12), ("ERROR", 50)])?;
        for failure in &report.failures {
            write_table_row(
                out,
                &[
                    (&failure.item_id.to_string(), 8),
                    (&failure.kind.to_string(), 12),
                    (&failure.error, 50),
                ],
            )?;
        }
    }

    writeln!(out)
}
