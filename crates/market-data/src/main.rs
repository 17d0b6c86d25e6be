use agent_utils::init_tracing;
use clap::Parser;
use market_data::{SUMMARY_FILE, summarize_directory, write_summary};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "market-data")]
#[command(about = "Summarise daily bar files into the ticker metrics table", long_about = None)]
struct Args {
    /// Directory of `*.txt` daily bar files
    #[arg(long, default_value = "d_us_txt/data/daily/us/nasdaq etfs")]
    data_dir: PathBuf,

    /// Where to write the summary CSV
    #[arg(long, default_value = SUMMARY_FILE)]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let summaries = summarize_directory(&args.data_dir)?;
    write_summary(&summaries, &args.output)?;
    info!("Wrote {} rows to {}", summaries.len(), args.output.display());
    Ok(())
}
