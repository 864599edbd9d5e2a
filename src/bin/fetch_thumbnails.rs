use std::env;
use std::path::PathBuf;

use thumbscore::core::fetcher::ThumbnailFetcher;
use thumbscore::core::AppConfig;
use thumbscore::parsers::csv_parser;
use thumbscore::utils::logging::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: fetch-thumbnails <metadata-csv> [output-dir]");
        std::process::exit(1);
    }

    let csv_path = PathBuf::from(&args[1]);

    let mut fetch_config = AppConfig::load().map(|config| config.fetch).unwrap_or_else(
        |error| {
            warn!("Failed to load configuration: {error}. Using defaults");
            Default::default()
        },
    );
    if let Some(output_dir) = args.get(2) {
        fetch_config.output_dir = output_dir.clone();
    }

    // Loading the metadata CSV is strict: a malformed file is a hard error,
    // while individual download failures below are logged and skipped.
    let records = match csv_parser::read_records(&csv_path) {
        Ok(records) => records,
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    };
    info!(
        "Loaded {} video records from {}",
        records.len(),
        csv_path.display()
    );

    let fetcher = match ThumbnailFetcher::new(fetch_config) {
        Ok(fetcher) => fetcher,
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    };

    match fetcher.fetch_all(&records).await {
        Ok(summary) => info!(
            "Fetch complete: {} downloaded, {} skipped, {} failed",
            summary.downloaded, summary.skipped, summary.failed
        ),
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }
}
