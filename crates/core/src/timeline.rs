//! Annotation timeline layout.
//!
//! Positions each annotation as a horizontal bar over the video length,
//! in percent. When the real duration is unknown the denominator is an
//! estimate (1.2 x the latest annotation end). The estimate is for display
//! only and is never written back.

use serde::Serialize;

use crate::timestamp::to_seconds;
use crate::types::DbId;

/// Factor applied to the latest annotation end when no duration is known.
pub const ESTIMATE_FACTOR: f64 = 1.2;

/// Input to the layout: one annotation's id and time range.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineSpan<'a> {
    pub id: DbId,
    pub start_timestamp: &'a str,
    pub end_timestamp: &'a str,
}

/// A positioned bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelineSegment {
    pub annotation_id: DbId,
    pub left_pct: f64,
    pub width_pct: f64,
}

/// Where the denominator came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "seconds", rename_all = "snake_case")]
pub enum TimelineScale {
    Duration(f64),
    Estimated(f64),
}

impl TimelineScale {
    pub fn seconds(&self) -> f64 {
        match self {
            TimelineScale::Duration(s) | TimelineScale::Estimated(s) => *s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub scale: TimelineScale,
    pub segments: Vec<TimelineSegment>,
}

/// Estimate a duration from annotation end times.
///
/// Returns `None` when no span has a parseable, non-zero end.
pub fn estimated_duration(spans: &[TimelineSpan<'_>]) -> Option<f64> {
    let max_end = spans
        .iter()
        .filter_map(|s| to_seconds(s.end_timestamp))
        .max()?;
    if max_end == 0 {
        return None;
    }
    Some(f64::from(max_end) * ESTIMATE_FACTOR)
}

/// Lay out annotation spans over the video.
///
/// `duration` is the stored video duration in seconds. Spans with
/// malformed timestamps are skipped. An end before its start yields a
/// zero-width bar. Returns `None` when no usable denominator exists.
pub fn layout(spans: &[TimelineSpan<'_>], duration: Option<i32>) -> Option<Timeline> {
    let scale = match duration.filter(|d| *d > 0) {
        Some(d) => TimelineScale::Duration(f64::from(d)),
        None => TimelineScale::Estimated(estimated_duration(spans)?),
    };
    let total = scale.seconds();

    let segments = spans
        .iter()
        .filter_map(|span| {
            let start = f64::from(to_seconds(span.start_timestamp)?);
            let end = f64::from(to_seconds(span.end_timestamp)?);
            let left = (start / total * 100.0).clamp(0.0, 100.0);
            let right = (end / total * 100.0).clamp(0.0, 100.0);
            Some(TimelineSegment {
                annotation_id: span.id,
                left_pct: left,
                width_pct: (right - left).max(0.0),
            })
        })
        .collect();

    Some(Timeline { scale, segments })
}
