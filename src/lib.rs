//! Thumbscore - Core Library
//!
//! This library provides the core functionality of the thumbnail toolkit:
//! the video metadata data model, per-channel aggregation, CSV import and
//! export, batch thumbnail fetching, and the popularity scoring pipeline.

pub mod core;
pub mod parsers;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    aggregate::{ChannelAggregate, ChannelAggregateCollection},
    config::AppConfig,
    fetcher::{FetchSummary, FetcherConfig, ThumbnailFetcher},
    models::{AppError, AppResult, VideoRecord, VideoResource},
    scoring::{
        ImageEmbedder, LinearRegressor, ScoreRegressor, ScoredThumbnail, ScoringConfig,
        ScoringPipeline, Shared,
    },
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
