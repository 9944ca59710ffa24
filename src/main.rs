use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::debug;
use sitesnap::{
    runner::{Runner, RunnerOptions},
    utils::{
        DEFAULT_CONCURRENCY, DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_CSV, DEFAULT_SCREENSHOT_DIR,
        DEFAULT_TIMEOUT_SECS,
    },
};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Bulk domain screenshot CLI", long_about = None)]
struct Args {
    /// File with one domain per line
    #[arg(short = 'i', long, default_value = DEFAULT_INPUT_FILE)]
    input_file: PathBuf,
    /// CSV file the domain-to-screenshot mapping is written to
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_CSV)]
    output_csv: PathBuf,
    /// Directory the PNG files are saved in
    #[arg(short = 's', long, default_value = DEFAULT_SCREENSHOT_DIR)]
    screenshot_dir: PathBuf,
    /// Total number of concurrently open tabs
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,
    /// Maximum time in seconds a navigation may take before falling back
    #[arg(short = 't', long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    debug!("starting sitesnap with {:#?}", args.clone());

    let options = RunnerOptions::default_builder()
        .input_file(args.input_file)
        .output_csv(args.output_csv)
        .screenshot_dir(args.screenshot_dir)
        .concurrency(args.concurrency)
        .timeout(args.timeout)
        .build()?;

    let runner = Runner::new(options).context("could not instantiate runner")?;
    let summary = runner.run().await?;

    println!(
        "Done! {} domains: {} ok, {} skipped, {} errored.",
        summary.total, summary.ok, summary.skipped, summary.errored
    );
    println!("Screenshots saved in {}", summary.screenshot_dir.display());
    println!("CSV mapping saved to {}", summary.csv_path.display());

    Ok(())
}
