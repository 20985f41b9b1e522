//! Re-upload a legacy Ghost content tree to the configured bucket.
//!
//! Reads the adapter configuration from `GHOST_STORAGE_ADAPTER_R2_*` (and a
//! `.env` file when present).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use stowage_cli::{init_tracing, summary_line};
use stowage_core::{AdapterConfig, AdapterSettings, StorageBackend};
use stowage_services::{ContentImporter, StorageAdapter};
use stowage_storage::create_storage;

#[derive(Parser, Debug)]
#[command(name = "content_importer")]
#[command(about = "Import a legacy content/images tree into object storage")]
struct Args {
    /// Directory containing the `content` folder
    #[arg(env = "CONTENT_IMPORTER_CONTENT_PARENT_PATH", value_name = "DIR")]
    content_parent_path: PathBuf,

    /// Run against an in-memory store instead of the bucket
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let settings = AdapterSettings {
        storage_type_images: Some(true),
        ..Default::default()
    };
    // `.env` is already loaded so clap can see it.
    let config = AdapterConfig::resolve(&settings, std::env::vars())
        .context("Failed to load adapter configuration")?;

    init_tracing(config.log_level());

    let backend = if args.dry_run {
        StorageBackend::Memory
    } else {
        StorageBackend::S3
    };
    let storage = create_storage(&config, backend).context("Failed to create storage")?;
    let adapter = StorageAdapter::new(config, storage);
    let importer = ContentImporter::new(Arc::new(adapter));

    tracing::info!(
        root = %args.content_parent_path.display(),
        dry_run = args.dry_run,
        "Starting content import"
    );

    let summary = importer
        .run(&args.content_parent_path)
        .await
        .with_context(|| format!("Import of {} failed", args.content_parent_path.display()))?;

    println!("{}", summary_line(&summary, args.dry_run));
    Ok(())
}
