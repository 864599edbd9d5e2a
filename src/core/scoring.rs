//! Thumbnail scoring pipeline
//!
//! Batches decoded images through a pretrained vision embedder and a
//! pretrained regressor, producing one popularity score per image. Both
//! models sit behind traits; the crate ships a linear regressor loaded
//! from a JSON weights file, while embedding models are wired in by the
//! caller (or consumed through their exported embedding files).

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::models::{AppError, AppResult};
use crate::utils::file_utils::is_image_file;

/// Batch image-embedding model.
pub trait ImageEmbedder {
    /// Embed a batch of decoded images, one fixed-length vector per image.
    fn embed_batch(&self, images: &[DynamicImage]) -> AppResult<Vec<Vec<f32>>>;

    /// Length of the vectors produced by `embed_batch`.
    fn dimension(&self) -> usize;
}

/// Batch regression model mapping embedding vectors to scalar scores.
pub trait ScoreRegressor {
    fn predict_batch(&self, embeddings: &[Vec<f32>]) -> AppResult<Vec<f32>>;
}

/// Linear model over embedding vectors, loaded from a JSON weights file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub weights: Vec<f32>,
    pub bias: f32,
}

impl LinearRegressor {
    /// Load pretrained weights from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AppError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            AppError::Parse(format!("invalid model file {}: {}", path.display(), e))
        })
    }

    pub fn dimension(&self) -> usize {
        self.weights.len()
    }
}

impl ScoreRegressor for LinearRegressor {
    fn predict_batch(&self, embeddings: &[Vec<f32>]) -> AppResult<Vec<f32>> {
        embeddings
            .iter()
            .map(|embedding| {
                if embedding.len() != self.weights.len() {
                    return Err(AppError::Model(format!(
                        "embedding dimension {} does not match model dimension {}",
                        embedding.len(),
                        self.weights.len()
                    )));
                }
                let dot: f32 = embedding
                    .iter()
                    .zip(&self.weights)
                    .map(|(value, weight)| value * weight)
                    .sum();
                Ok(self.bias + dot)
            })
            .collect()
    }
}

/// Scoring pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Images per embedder/regressor batch
    pub batch_size: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { batch_size: 32 }
    }
}

/// One scored thumbnail.
///
/// `log_score` is the regressor output; `views_per_subscriber_est` is its
/// exponential, the estimated views-per-subscriber ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredThumbnail {
    pub filename: String,
    pub log_score: f32,
    pub views_per_subscriber_est: f32,
}

/// Batches images through an embedder and a regressor.
pub struct ScoringPipeline<E, R> {
    embedder: E,
    regressor: R,
    config: ScoringConfig,
}

impl<E: ImageEmbedder, R: ScoreRegressor> ScoringPipeline<E, R> {
    pub fn new(embedder: E, regressor: R, config: ScoringConfig) -> Self {
        Self {
            embedder,
            regressor,
            config,
        }
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn regressor(&self) -> &R {
        &self.regressor
    }

    /// Score decoded images, batching `batch_size` at a time.
    pub fn score_images(
        &self,
        names: &[String],
        images: &[DynamicImage],
    ) -> AppResult<Vec<ScoredThumbnail>> {
        if names.len() != images.len() {
            return Err(AppError::Model(format!(
                "{} names for {} images",
                names.len(),
                images.len()
            )));
        }

        let batch_size = self.config.batch_size.max(1);
        let mut embeddings = Vec::with_capacity(images.len());
        for batch in images.chunks(batch_size) {
            let batch_embeddings = self.embedder.embed_batch(batch)?;
            if batch_embeddings.len() != batch.len() {
                return Err(AppError::Model(format!(
                    "embedder returned {} vectors for {} images",
                    batch_embeddings.len(),
                    batch.len()
                )));
            }
            debug!("Embedded batch of {} images", batch.len());
            embeddings.extend(batch_embeddings);
        }

        score_embeddings(&self.regressor, batch_size, names, &embeddings)
    }

    /// Walk a directory for image files, decode them, and score the ones
    /// that decode. Unreadable images are logged and skipped.
    pub fn score_directory(&self, dir: impl AsRef<Path>) -> AppResult<Vec<ScoredThumbnail>> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Err(AppError::NotFound(dir.to_path_buf()));
        }

        let mut names = Vec::new();
        let mut images = Vec::new();
        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !entry.file_type().is_file() || !is_image_file(path) {
                continue;
            }
            match image::open(path) {
                Ok(decoded) => {
                    names.push(path.file_name().unwrap_or_default().to_string_lossy().into_owned());
                    images.push(decoded);
                }
                Err(error) => {
                    warn!("Skipping {}, could not open image: {}", path.display(), error);
                }
            }
        }

        self.score_images(&names, &images)
    }
}

/// Score precomputed embedding vectors with a regressor, batching like the
/// image path.
pub fn score_embeddings<R: ScoreRegressor>(
    regressor: &R,
    batch_size: usize,
    names: &[String],
    embeddings: &[Vec<f32>],
) -> AppResult<Vec<ScoredThumbnail>> {
    if names.len() != embeddings.len() {
        return Err(AppError::Model(format!(
            "{} names for {} embeddings",
            names.len(),
            embeddings.len()
        )));
    }

    let batch_size = batch_size.max(1);
    let mut results = Vec::with_capacity(names.len());
    for (name_batch, embedding_batch) in names
        .chunks(batch_size)
        .zip(embeddings.chunks(batch_size))
    {
        let scores = regressor.predict_batch(embedding_batch)?;
        for (name, score) in name_batch.iter().zip(scores) {
            results.push(ScoredThumbnail {
                filename: name.clone(),
                log_score: score,
                views_per_subscriber_est: score.exp(),
            });
        }
    }

    Ok(results)
}

/// Sort results by descending score; input order breaks ties.
pub fn rank(mut results: Vec<ScoredThumbnail>) -> Vec<ScoredThumbnail> {
    results.sort_by(|a, b| {
        b.log_score
            .partial_cmp(&a.log_score)
            .unwrap_or(Ordering::Equal)
    });
    results
}

/// Write a results table, truncating any previous file.
pub fn write_results_csv(
    path: impl AsRef<Path>,
    results: &[ScoredThumbnail],
) -> AppResult<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    writer.write_record(["filename", "log_score", "views_per_subscriber_est"])?;
    for item in results {
        writer.write_record(&[
            item.filename.clone(),
            format!("{:.4}", item.log_score),
            format!("{:.2}", item.views_per_subscriber_est),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Read `name, v0, v1, …` rows from an embeddings CSV produced by an
/// external embedding exporter. No header row is expected.
pub fn read_embeddings_csv(path: impl AsRef<Path>) -> AppResult<(Vec<String>, Vec<Vec<f32>>)> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AppError::NotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut names = Vec::new();
    let mut embeddings = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut fields = record.iter();
        let name = fields
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::Parse("embedding row without a name".to_string()))?;
        let vector = fields
            .map(|value| {
                value.trim().parse::<f32>().map_err(|e| {
                    AppError::Parse(format!("non-numeric embedding value '{value}': {e}"))
                })
            })
            .collect::<AppResult<Vec<f32>>>()?;
        names.push(name.to_string());
        embeddings.push(vector);
    }

    Ok((names, embeddings))
}

/// Clone-able holder that lazily initializes a shared resource exactly
/// once per process, even under concurrent first access. Meant for
/// expensive read-only resources like loaded models, passed explicitly
/// instead of living in a global.
pub struct Shared<T> {
    cell: Arc<OnceLock<T>>,
}

impl<T> Shared<T> {
    pub fn new() -> Self {
        Self {
            cell: Arc::new(OnceLock::new()),
        }
    }

    /// The resource, initializing it on first access.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> &T {
        self.cell.get_or_init(init)
    }

    /// The resource if some caller already initialized it.
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }
}

impl<T> Default for Shared<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}
