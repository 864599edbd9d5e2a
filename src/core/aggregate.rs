//! Per-channel aggregation of video metadata
//!
//! `ChannelAggregate` keeps one channel's videos in insertion order with
//! running totals maintained on every append. `ChannelAggregateCollection`
//! partitions a multi-channel metadata CSV into per-channel aggregates in
//! one pass.

use std::collections::HashMap;
use std::path::Path;

use crate::core::models::{AppError, AppResult, VideoRecord};
use crate::parsers::csv_parser;

/// Running statistics for one channel's videos.
///
/// Invariants: every contained record belongs to `channel_id`,
/// `total_videos` equals the sequence length, and `average_view_count` is
/// `total_views / total_videos` (0.0 while empty).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelAggregate {
    channel_id: String,
    videos: Vec<VideoRecord>,
    total_videos: usize,
    total_views: u64,
    average_view_count: f64,
}

impl ChannelAggregate {
    /// Create an empty aggregate for a channel.
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            ..Self::default()
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Contained records in insertion order.
    pub fn videos(&self) -> &[VideoRecord] {
        &self.videos
    }

    pub fn total_videos(&self) -> usize {
        self.total_videos
    }

    pub fn total_views(&self) -> u64 {
        self.total_views
    }

    pub fn average_view_count(&self) -> f64 {
        self.average_view_count
    }

    /// Append one record, keeping the counters in step with the sequence.
    ///
    /// A record from another channel is rejected and leaves the aggregate
    /// untouched.
    pub fn append(&mut self, video: VideoRecord) -> AppResult<()> {
        if video.channel_id != self.channel_id {
            return Err(AppError::ChannelMismatch {
                video_id: video.video_id,
                expected: self.channel_id.clone(),
                actual: video.channel_id,
            });
        }

        self.total_views += video.view_count;
        self.videos.push(video);
        self.total_videos = self.videos.len();
        self.average_view_count = self.total_views as f64 / self.total_videos as f64;

        Ok(())
    }

    /// Append records in order, failing fast on the first mismatch.
    ///
    /// Records appended before the failure stay in the aggregate.
    pub fn append_all(
        &mut self,
        videos: impl IntoIterator<Item = VideoRecord>,
    ) -> AppResult<()> {
        for video in videos {
            self.append(video)?;
        }
        Ok(())
    }

    /// Serialize every contained record into a metadata CSV.
    ///
    /// The file is opened in append mode and created if absent; the header
    /// row is written only when the file is new or empty, so repeated
    /// exports accumulate rows under one header.
    pub fn export_to_csv(&self, path: impl AsRef<Path>) -> AppResult<()> {
        csv_parser::append_records(path.as_ref(), &self.videos)
    }

    /// Rebuild an aggregate from a metadata CSV, keeping only rows whose
    /// channel identifier matches.
    pub fn from_csv(channel_id: impl Into<String>, path: impl AsRef<Path>) -> AppResult<Self> {
        let mut aggregate = Self::new(channel_id);
        for video in csv_parser::read_records(path.as_ref())? {
            if video.channel_id == aggregate.channel_id {
                aggregate.append(video)?;
            }
        }
        Ok(aggregate)
    }
}

/// Per-channel aggregates loaded from one multi-channel metadata CSV.
#[derive(Debug, Clone, Default)]
pub struct ChannelAggregateCollection {
    by_channel: HashMap<String, ChannelAggregate>,
}

impl ChannelAggregateCollection {
    /// Load a metadata CSV and route every row into the aggregate for its
    /// channel, creating aggregates the first time a channel is seen.
    pub fn load_all(path: impl AsRef<Path>) -> AppResult<Self> {
        let records = csv_parser::read_records(path.as_ref())?;

        let mut by_channel: HashMap<String, ChannelAggregate> = HashMap::new();
        for video in records {
            let channel_id = video.channel_id.clone();
            by_channel
                .entry(channel_id.clone())
                .or_insert_with(|| ChannelAggregate::new(channel_id))
                .append(video)?;
        }

        Ok(Self { by_channel })
    }

    /// Aggregate for a channel seen during load.
    pub fn get(&self, channel_id: &str) -> AppResult<&ChannelAggregate> {
        self.by_channel
            .get(channel_id)
            .ok_or_else(|| AppError::UnknownChannel(channel_id.to_string()))
    }

    /// Channel identifiers seen during load, in no particular order.
    pub fn channel_ids(&self) -> impl Iterator<Item = &str> {
        self.by_channel.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_channel.is_empty()
    }
}
