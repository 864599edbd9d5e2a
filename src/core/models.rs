//! Core data models for the thumbnail toolkit
//!
//! `VideoRecord` is the immutable snapshot of one video's metadata, built
//! either from a raw API video resource or from a row of a previously
//! exported CSV file. The serde types below mirror the nested resource
//! shape returned by the remote metadata API, where every field at every
//! level may be absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::parsers::csv_parser::{columns, RowView};

/// One video's metadata at fetch time.
///
/// Numeric counts are non-negative; `published_at` is `None` when the
/// source had no usable timestamp. Records are never mutated after
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub published_at: Option<DateTime<Utc>>,
    pub channel_id: String,
    pub title: String,
    pub thumbnail_maxres_url: String,
    pub category_id: String,
    pub default_language: String,
    pub duration: String,
    pub view_count: u64,
    pub like_count: u64,
    pub favorite_count: u64,
    pub comment_count: u64,
}

impl VideoRecord {
    /// Build a record from a raw API video resource.
    ///
    /// Missing optional fields default to empty strings, zero counts, or no
    /// timestamp; only a malformed `publishedAt` string is an error.
    pub fn from_api(resource: &VideoResource) -> AppResult<Self> {
        let snippet = resource.snippet.as_ref();
        let content_details = resource.content_details.as_ref();
        let statistics = resource.statistics.as_ref();

        let published_at = match snippet.and_then(|s| s.published_at.as_deref()) {
            Some(raw) if !raw.is_empty() => Some(parse_timestamp(raw)?),
            _ => None,
        };

        let thumbnail_maxres_url = snippet
            .and_then(|s| s.thumbnails.as_ref())
            .and_then(|t| t.maxres.as_ref())
            .and_then(|t| t.url.clone())
            .unwrap_or_default();

        Ok(Self {
            video_id: resource.id.clone().unwrap_or_default(),
            published_at,
            channel_id: snippet
                .and_then(|s| s.channel_id.clone())
                .unwrap_or_default(),
            title: snippet.and_then(|s| s.title.clone()).unwrap_or_default(),
            thumbnail_maxres_url,
            category_id: snippet
                .and_then(|s| s.category_id.clone())
                .unwrap_or_default(),
            default_language: snippet
                .and_then(|s| s.default_language.clone())
                .unwrap_or_default(),
            duration: content_details
                .and_then(|c| c.duration.clone())
                .unwrap_or_default(),
            view_count: count_field(statistics.and_then(|s| s.view_count.as_deref())),
            like_count: count_field(statistics.and_then(|s| s.like_count.as_deref())),
            favorite_count: count_field(statistics.and_then(|s| s.favorite_count.as_deref())),
            comment_count: count_field(statistics.and_then(|s| s.comment_count.as_deref())),
        })
    }

    /// Build a record from one row of a metadata CSV.
    ///
    /// Every column of the schema is required except `published_at`, which
    /// may be empty. A missing column or a non-numeric count is an error.
    pub fn from_csv_row(row: &RowView<'_>) -> AppResult<Self> {
        let raw_published = row.field(columns::PUBLISHED_AT)?;
        let published_at = if raw_published.is_empty() {
            None
        } else {
            Some(parse_timestamp(raw_published)?)
        };

        Ok(Self {
            video_id: row.field(columns::VIDEO_ID)?.to_string(),
            published_at,
            channel_id: row.field(columns::CHANNEL_ID)?.to_string(),
            title: row.field(columns::TITLE)?.to_string(),
            thumbnail_maxres_url: row.field(columns::THUMBNAIL_MAXRES_URL)?.to_string(),
            category_id: row.field(columns::CATEGORY_ID)?.to_string(),
            default_language: row.field(columns::DEFAULT_LANGUAGE)?.to_string(),
            duration: row.field(columns::DURATION)?.to_string(),
            view_count: parse_count(columns::VIEW_COUNT, row.field(columns::VIEW_COUNT)?)?,
            like_count: parse_count(columns::LIKE_COUNT, row.field(columns::LIKE_COUNT)?)?,
            favorite_count: parse_count(
                columns::FAVORITE_COUNT,
                row.field(columns::FAVORITE_COUNT)?,
            )?,
            comment_count: parse_count(
                columns::COMMENT_COUNT,
                row.field(columns::COMMENT_COUNT)?,
            )?,
        })
    }
}

fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Parse(format!("invalid published_at '{raw}': {e}")))
}

fn parse_count(column: &str, raw: &str) -> AppResult<u64> {
    raw.trim().parse::<u64>().map_err(|e| {
        AppError::Parse(format!(
            "column '{column}' has non-numeric value '{raw}': {e}"
        ))
    })
}

// The API serializes statistics counts as decimal strings; an absent or
// unreadable value counts as zero.
fn count_field(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(0)
}

/// Raw video resource as returned by the remote metadata API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoResource {
    pub id: Option<String>,
    pub snippet: Option<VideoSnippet>,
    pub content_details: Option<VideoContentDetails>,
    pub statistics: Option<VideoStatistics>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoSnippet {
    pub published_at: Option<String>,
    pub channel_id: Option<String>,
    pub title: Option<String>,
    pub thumbnails: Option<ThumbnailSet>,
    pub category_id: Option<String>,
    pub default_language: Option<String>,
}

/// Thumbnail variants keyed by resolution tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailSet {
    pub default: Option<ThumbnailInfo>,
    pub medium: Option<ThumbnailInfo>,
    pub high: Option<ThumbnailInfo>,
    pub standard: Option<ThumbnailInfo>,
    pub maxres: Option<ThumbnailInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailInfo {
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoContentDetails {
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoStatistics {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub favorite_count: Option<String>,
    pub comment_count: Option<String>,
}

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Cannot add video '{video_id}' from channel '{actual}' to aggregate for channel '{expected}'")]
    ChannelMismatch {
        video_id: String,
        expected: String,
        actual: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    #[error("Model error: {0}")]
    Model(String),
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
