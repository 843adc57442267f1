mod config;
mod decode;
mod error;
mod fetch;
mod parser;
mod record;
mod sink;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use config::SinkConfig;
use error::SinkError;
use fetch::FetchedPage;
use sink::JsonLinesSink;

#[derive(Parser)]
#[command(name = "trf5_scraper", about = "TRF5 case scraper writing JSON Lines")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the TRF5 search form for each case number and persist the results
    Fetch {
        /// Case numbers, e.g. 0015648-78.1999.4.05.0000
        case_numbers: Vec<String>,
        /// File with one case number per line
        #[arg(short, long)]
        list: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Extract records from HTML pages already saved to disk
    Parse {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Output file, appended to (never truncated)
    #[arg(short, long, env = "OUTPUT_FILE", default_value = config::DEFAULT_OUTPUT)]
    output: PathBuf,
    /// Write data_autuacao as YYYY-MM-DD instead of dd/mm/yyyy
    #[arg(long)]
    iso_dates: bool,
}

impl OutputArgs {
    fn into_config(self) -> Result<SinkConfig, error::ConfigError> {
        SinkConfig::new(self.output, self.iso_dates)
    }
}

#[derive(Default)]
struct RunCounts {
    saved: usize,
    dead: usize,
    failed: usize,
}

impl RunCounts {
    fn add(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Saved => self.saved += 1,
            Outcome::Dead => self.dead += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    fn print(&self, path: &Path) {
        println!(
            "Saved {} records to {} ({} without case data, {} failed).",
            self.saved,
            path.display(),
            self.dead,
            self.failed,
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Saved,
    Dead,
    Failed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fetch {
            case_numbers,
            list,
            output,
        } => {
            // Validate everything before the first request goes out.
            let numbers = config::case_numbers(case_numbers, list.as_deref())?;
            let config = output.into_config()?;
            let sink = JsonLinesSink::open(&config.output, config.dates)?;

            println!("Fetching {} case numbers...", numbers.len());
            let counts = fetch_and_persist(numbers, &sink).await?;
            let path = sink.path().to_path_buf();
            sink.close()?;
            counts.print(&path);
            Ok(())
        }
        Commands::Parse { files, output } => {
            let config = output.into_config()?;
            let sink = JsonLinesSink::open(&config.output, config.dates)?;

            println!("Parsing {} files...", files.len());
            let counts = parse_files(&files, &sink)?;
            let path = sink.path().to_path_buf();
            sink.close()?;
            counts.print(&path);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb
}

/// Single consumer: every page goes through the core here, and only here touches the sink.
async fn fetch_and_persist(numbers: Vec<String>, sink: &JsonLinesSink) -> anyhow::Result<RunCounts> {
    let pb = progress_bar(numbers.len());
    let client = fetch::client()?;
    let robots = fetch::load_robots(&client).await;
    let mut rx = fetch::spawn_fetches(client, &robots, numbers);
    let mut counts = RunCounts::default();

    while let Some(page) = rx.recv().await {
        counts.add(persist_page(page, sink)?);
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(counts)
}

/// Parsing and the blocking file write run off the async workers.
fn persist_page(page: FetchedPage, sink: &JsonLinesSink) -> Result<Outcome, SinkError> {
    match page.html {
        Ok(html) => tokio::task::block_in_place(|| persist(&page.case_number, &html, sink)),
        Err(e) => {
            warn!("Fetch failed for {}: {:#}", page.case_number, e);
            Ok(Outcome::Failed)
        }
    }
}

fn parse_files(files: &[PathBuf], sink: &JsonLinesSink) -> anyhow::Result<RunCounts> {
    use rayon::prelude::*;

    let pb = progress_bar(files.len());

    let outcomes = files
        .par_iter()
        .map(|path| {
            let source = path.display().to_string();
            let outcome = match std::fs::read(path) {
                Ok(bytes) => persist(&source, &decode::decode_page(&source, &bytes), sink),
                Err(e) => {
                    warn!("Cannot read {}: {}", source, e);
                    Ok(Outcome::Failed)
                }
            };
            pb.inc(1);
            outcome
        })
        .collect::<Result<Vec<_>, SinkError>>()
        .context("Aborting: output file is not writable")?;

    pb.finish_and_clear();

    let mut counts = RunCounts::default();
    for outcome in outcomes {
        counts.add(outcome);
    }
    Ok(counts)
}

fn persist(source: &str, html: &str, sink: &JsonLinesSink) -> Result<Outcome, SinkError> {
    match parser::process_document(source, html) {
        Some(record) => {
            sink.write(&record)?;
            Ok(Outcome::Saved)
        }
        None => Ok(Outcome::Dead),
    }
}
