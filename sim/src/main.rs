use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use sim::{SimConfig, Summary};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "claimsync-sim",
    version,
    about = "Deterministic claimsync replication simulation"
)]
struct Cli {
    /// JSON file with a full or partial SimConfig. Flags override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of connected sinks.
    #[arg(long)]
    sinks: Option<u32>,
    /// Number of store operations to perform.
    #[arg(long)]
    ops: Option<u32>,
    /// RNG seed for deterministic results.
    #[arg(long)]
    seed: Option<u64>,
    /// Index of a sink that loses deliveries.
    #[arg(long)]
    fail_sink: Option<u32>,
    /// Lose every n-th delivery to the failing sink.
    #[arg(long)]
    fail_every: Option<u32>,
    /// Output directory for summary.json.
    #[arg(long, default_value = "target/claimsync-sim")]
    out_dir: PathBuf,
}

impl Cli {
    fn sim_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path)?,
            None => SimConfig::default(),
        };
        if let Some(sinks) = self.sinks {
            config.sinks = sinks;
        }
        if let Some(ops) = self.ops {
            config.ops = ops;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.fail_sink.is_some() {
            config.fail_sink = self.fail_sink;
        }
        if let Some(every) = self.fail_every {
            config.fail_every = every;
        }
        config.validate()?;
        Ok(config)
    }
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.sim_config()?;

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create output dir {}", cli.out_dir.display()))?;

    let summary = sim::run(&config)?;
    write_summary_json(&cli.out_dir, &summary)?;

    let diverged: Vec<u32> = summary.diverged().map(|report| report.sink).collect();
    if !diverged.is_empty() {
        anyhow::bail!("sinks {diverged:?} diverged from the source");
    }
    Ok(())
}

fn write_summary_json(out_dir: &Path, summary: &Summary) -> Result<()> {
    let path = out_dir.join("summary.json");
    let contents = serde_json::to_string_pretty(summary).context("serialize summary")?;
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
