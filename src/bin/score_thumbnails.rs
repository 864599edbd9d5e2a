use std::env;
use std::path::{Path, PathBuf};

use thumbscore::core::scoring::{
    rank, read_embeddings_csv, score_embeddings, write_results_csv, LinearRegressor,
    ScoredThumbnail,
};
use thumbscore::core::AppConfig;
use thumbscore::utils::logging::init_tracing;
use tracing::{info, warn};

fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: score-thumbnails <embeddings-csv> <model-json> [results-csv]");
        std::process::exit(1);
    }

    let embeddings_path = PathBuf::from(&args[1]);
    let model_path = PathBuf::from(&args[2]);
    let results_path = args.get(3).map(PathBuf::from);

    let scoring_config = AppConfig::load()
        .map(|config| config.scoring)
        .unwrap_or_else(|error| {
            warn!("Failed to load configuration: {error}. Using defaults");
            Default::default()
        });

    let ranked = match score(&embeddings_path, &model_path, scoring_config.batch_size) {
        Ok(ranked) => ranked,
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    };

    match results_path {
        Some(path) => {
            if let Err(error) = write_results_csv(&path, &ranked) {
                eprintln!("Error: {error}");
                std::process::exit(1);
            }
            info!("Wrote {} scored thumbnails to {}", ranked.len(), path.display());
        }
        None => print_results(&ranked),
    }
}

fn score(
    embeddings_path: &Path,
    model_path: &Path,
    batch_size: usize,
) -> thumbscore::AppResult<Vec<ScoredThumbnail>> {
    let (names, embeddings) = read_embeddings_csv(embeddings_path)?;
    info!(
        "Loaded {} embeddings from {}",
        names.len(),
        embeddings_path.display()
    );

    let regressor = LinearRegressor::from_json_file(model_path)?;
    info!(
        "Loaded regressor with dimension {} from {}",
        regressor.dimension(),
        model_path.display()
    );

    let results = score_embeddings(&regressor, batch_size, &names, &embeddings)?;
    Ok(rank(results))
}

fn print_results(results: &[ScoredThumbnail]) {
    println!(
        "{:<40} {:>10} {:>24}",
        "filename", "log_score", "views_per_subscriber_est"
    );
    for item in results {
        println!(
            "{:<40} {:>10.4} {:>24.2}",
            item.filename, item.log_score, item.views_per_subscriber_est
        );
    }
}
