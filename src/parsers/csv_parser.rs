//! CSV schema and row access for video metadata files
//!
//! One schema serves both the load and the export path: a fixed column
//! order on write, with header-name lookup on read so a reordered source
//! file still loads.

use csv::{Reader, StringRecord, WriterBuilder};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::Path;

use crate::core::models::{AppError, AppResult, VideoRecord};

/// Column names of the metadata CSV schema.
pub mod columns {
    pub const VIDEO_ID: &str = "video_id";
    pub const PUBLISHED_AT: &str = "published_at";
    pub const CHANNEL_ID: &str = "channel_id";
    pub const TITLE: &str = "title";
    pub const THUMBNAIL_MAXRES_URL: &str = "thumbnail_maxres_url";
    pub const CATEGORY_ID: &str = "category_id";
    pub const DEFAULT_LANGUAGE: &str = "default_language";
    pub const DURATION: &str = "duration";
    pub const VIEW_COUNT: &str = "view_count";
    pub const LIKE_COUNT: &str = "like_count";
    pub const FAVORITE_COUNT: &str = "favorite_count";
    pub const COMMENT_COUNT: &str = "comment_count";
}

/// Canonical header row for exported metadata files, in column order.
pub const CSV_HEADERS: [&str; 12] = [
    columns::VIDEO_ID,
    columns::PUBLISHED_AT,
    columns::CHANNEL_ID,
    columns::TITLE,
    columns::THUMBNAIL_MAXRES_URL,
    columns::CATEGORY_ID,
    columns::DEFAULT_LANGUAGE,
    columns::DURATION,
    columns::VIEW_COUNT,
    columns::LIKE_COUNT,
    columns::FAVORITE_COUNT,
    columns::COMMENT_COUNT,
];

/// Header-name to field-index mapping built once per file.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn new(headers: &StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(index, name)| (name.trim().to_string(), index))
            .collect();
        Self { positions }
    }

    /// View one data row through this header mapping.
    pub fn row<'a>(&'a self, record: &'a StringRecord) -> RowView<'a> {
        RowView {
            index: self,
            record,
        }
    }
}

/// Borrowed view of one CSV data row with access by column name.
#[derive(Debug)]
pub struct RowView<'a> {
    index: &'a HeaderIndex,
    record: &'a StringRecord,
}

impl RowView<'_> {
    /// Field value for a named column, or `MissingColumn` if the file has
    /// no such header or the row is too short.
    pub fn field(&self, name: &str) -> AppResult<&str> {
        self.index
            .positions
            .get(name)
            .and_then(|&position| self.record.get(position))
            .ok_or_else(|| AppError::MissingColumn(name.to_string()))
    }
}

/// Read every record from a metadata CSV, parsing rows strictly.
///
/// Fails with `NotFound` before opening anything when the file is absent.
pub fn read_records(path: &Path) -> AppResult<Vec<VideoRecord>> {
    if !path.exists() {
        return Err(AppError::NotFound(path.to_path_buf()));
    }

    let mut reader = Reader::from_path(path)?;
    let header_index = HeaderIndex::new(&reader.headers()?.clone());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(VideoRecord::from_csv_row(&header_index.row(&record))?);
    }

    Ok(records)
}

/// Append records to a metadata CSV, creating the file if absent.
///
/// The header row is written only when the file is new or empty, so
/// repeated exports into one file accumulate rows under a single header.
pub fn append_records(path: &Path, records: &[VideoRecord]) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let write_header = file.metadata()?.len() == 0;

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    if write_header {
        writer.write_record(CSV_HEADERS)?;
    }
    for record in records {
        writer.write_record(&encode_row(record))?;
    }
    writer.flush()?;

    Ok(())
}

fn encode_row(record: &VideoRecord) -> [String; 12] {
    [
        record.video_id.clone(),
        record
            .published_at
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default(),
        record.channel_id.clone(),
        record.title.clone(),
        record.thumbnail_maxres_url.clone(),
        record.category_id.clone(),
        record.default_language.clone(),
        record.duration.clone(),
        record.view_count.to_string(),
        record.like_count.to_string(),
        record.favorite_count.to_string(),
        record.comment_count.to_string(),
    ]
}
