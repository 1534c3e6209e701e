use anyhow::Result;
use clap::Parser;
use mimalloc::MiMalloc;
use splitweave_rs::cli::Args;
use splitweave_rs::pipeline;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.quiet {
            EnvFilter::new("warn")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let stats = pipeline::run(&args)?;
    tracing::info!(
        total_records = stats.total_records,
        malformed_lines = stats.malformed_lines,
        kept_records = stats.kept_records,
        skipped_unmapped = stats.skipped_unmapped,
        dropped_records = stats.dropped_records,
        reads = stats.reads,
        segments = stats.segments,
        intervals = stats.intervals,
        paired_end = stats.paired_end,
        "splitweave-rs: processing complete"
    );
    Ok(())
}
