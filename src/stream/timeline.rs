//! Timeline resolution for playback-synchronized highlighting.
//!
//! A [`Timeline`] holds `(index, time)` observations: the word at `index`
//! starts at `time` milliseconds into playback. Resolving a playback time
//! yields the highlight position, the number of words already reached.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::session::MarkdownSession;
use crate::error::Result;

/// One observation of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimestampEntry {
    pub index: usize,
    /// Milliseconds from the start of playback
    pub time: f64,
}

/// Observations sorted by index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    entries: Vec<TimestampEntry>,
    monotonic: bool,
}

impl Timeline {
    /// Empty timeline.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            monotonic: true,
        }
    }

    /// Build a timeline from raw `(index, time)` pairs.
    ///
    /// Pairs with a non-finite time, or an index that is not a finite
    /// non-negative integer, are dropped. When an index repeats, the last
    /// pair wins.
    pub fn new(pairs: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut dropped = 0usize;
        let valid = pairs.into_iter().filter_map(|(index, time)| {
            match valid_index(index) {
                Some(index) if time.is_finite() => Some((index, time)),
                _ => {
                    dropped += 1;
                    None
                }
            }
        });
        let timeline = Self::from_valid(valid);
        if dropped > 0 {
            log::trace!("Dropped {} malformed timeline entries", dropped);
        }
        timeline
    }

    /// Build a timeline from an index-to-time map.
    pub fn from_map(map: &HashMap<usize, f64>) -> Self {
        Self::new(map.iter().map(|(&index, &time)| (index as f64, time)))
    }

    /// Load a timeline from a JSON object mapping indices to times,
    /// e.g. `{"0": 100, "1": 180}`.
    ///
    /// Keys that are not numbers and values that are not finite numbers
    /// are dropped like any other malformed entry.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(json)?;
        Ok(Self::new(raw.into_iter().map(|(key, value)| {
            let index = key.trim().parse::<f64>().unwrap_or(f64::NAN);
            (index, value.as_f64().unwrap_or(f64::NAN))
        })))
    }

    fn from_valid(pairs: impl Iterator<Item = (usize, f64)>) -> Self {
        let sorted: BTreeMap<usize, f64> = pairs.collect();
        let entries: Vec<TimestampEntry> = sorted
            .into_iter()
            .map(|(index, time)| TimestampEntry { index, time })
            .collect();
        let monotonic = entries.windows(2).all(|pair| pair[0].time <= pair[1].time);
        Self { entries, monotonic }
    }

    /// Entries sorted by index.
    pub fn entries(&self) -> &[TimestampEntry] {
        &self.entries
    }

    /// Check if times never decrease as the index grows.
    pub fn is_monotonic(&self) -> bool {
        self.monotonic
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highlight position at playback time `time_ms`.
    pub fn resolve(&self, time_ms: f64) -> usize {
        resolve_highlight_position(self, time_ms)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'de> Deserialize<'de> for Timeline {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            entries: Vec<TimestampEntry>,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(Self::new(
            raw.entries
                .into_iter()
                .map(|entry| (entry.index as f64, entry.time)),
        ))
    }
}

fn valid_index(index: f64) -> Option<usize> {
    if !index.is_finite() || index < 0.0 || index.fract() != 0.0 || index >= usize::MAX as f64 {
        return None;
    }
    Some(index as usize)
}

/// Number of words reached at playback time `time_ms`.
///
/// Returns one past the index of the last entry whose time is at or before
/// `time_ms`, or 0 when there is none. Monotonic timelines use a binary
/// search. Otherwise every entry is scanned and the greatest such index
/// wins.
pub fn resolve_highlight_position(timeline: &Timeline, time_ms: f64) -> usize {
    let entries = &timeline.entries;
    if entries.is_empty() {
        return 0;
    }

    if timeline.monotonic {
        let reached = entries.partition_point(|entry| entry.time <= time_ms);
        return match reached {
            0 => 0,
            n => entries[n - 1].index.saturating_add(1),
        };
    }

    entries
        .iter()
        .filter(|entry| entry.time <= time_ms)
        .map(|entry| entry.index.saturating_add(1))
        .max()
        .unwrap_or(0)
}

/// Pushes resolved highlight positions into a session.
///
/// Remembers the last position it applied, so repeated syncs within the
/// same word do not touch the session.
#[derive(Debug, Clone, Default)]
pub struct HighlightSync {
    timeline: Option<Timeline>,
    last: Option<usize>,
}

impl HighlightSync {
    /// Create a sync without a timeline; [`sync`](Self::sync) is a no-op
    /// until one is set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sync for `timeline`.
    pub fn with_timeline(timeline: Timeline) -> Self {
        Self {
            timeline: Some(timeline),
            last: None,
        }
    }

    /// Replace the timeline and forget the last applied position.
    pub fn set_timeline(&mut self, timeline: Option<Timeline>) {
        self.timeline = timeline;
        self.last = None;
    }

    pub fn timeline(&self) -> Option<&Timeline> {
        self.timeline.as_ref()
    }

    /// Resolve `time_ms` and move the session's highlight if the position
    /// changed. Returns the newly applied position.
    pub fn sync(&mut self, session: &MarkdownSession, time_ms: f64) -> Option<usize> {
        let timeline = self.timeline.as_ref()?;
        let position = resolve_highlight_position(timeline, time_ms);
        if self.last == Some(position) {
            return None;
        }
        self.last = Some(position);
        session.set_highlight_position(position);
        Some(position)
    }
}
