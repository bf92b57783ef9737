//! `emote-batch`: tag emote images from the command line.

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use emote_batch::builders::PipelineBuilder;
use emote_batch::config::BatchConfig;
use emote_batch::core::{AppResult, WorkItem};
use emote_batch::runtime::{OutputFormat, RecordWriter, TokioSpawner};
use emote_batch::util::init_tracing;

#[derive(Parser)]
#[command(
    name = "emote-batch",
    version,
    about = "Tag emote images with a vision model, rate limited and bounded in concurrency."
)]
struct Cli {
    /// JSON configuration file; the environment is used when absent.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit records in input order once the batch completes.
    #[arg(long)]
    ordered: bool,

    /// Indented JSON instead of one record per line.
    #[arg(long)]
    pretty: bool,

    /// Image files to tag.
    #[arg(required = true, value_name = "IMAGE")]
    images: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_tracing();

    let config = match &cli.config {
        Some(path) => BatchConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => {
            let config = BatchConfig::from_env();
            config.validate().context("invalid configuration")?;
            config
        }
    };

    if let Some(dir) = &config.working_dir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("changing into {}", dir.display()))?;
    }

    let driver =
        PipelineBuilder::new("emotes", config).build_emote_driver(TokioSpawner::current())?;
    let items = WorkItem::from_paths(cli.images);
    let total = items.len();

    let format = if cli.pretty {
        OutputFormat::Pretty
    } else {
        OutputFormat::Lines
    };
    let mut writer = RecordWriter::new(io::stdout().lock(), format);

    let mut results = driver.dispatch(items)?;
    if cli.ordered {
        for result in results.collect_ordered().await {
            writer.write_result(result).context("writing record")?;
        }
    } else {
        while let Some(result) = results.next().await {
            writer.write_result(result).context("writing record")?;
        }
    }

    driver.limiter().stop().await;
    info!(total, written = writer.written(), "done");
    Ok(())
}
