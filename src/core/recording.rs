//! Recording metadata and the parser/writer seams.
//!
//! The binary container parser and writer are external collaborators. These
//! traits describe exactly what the mapping pipeline consumes from them and
//! what it hands back on export.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::ParameterSet;
use crate::util::{Error, Result};

/// Number of f32 values per exported sample: x, y, z, residual, camera mask.
pub const SAMPLE_WIDTH: usize = 5;

/// Largest frame range a recording header or export may declare.
///
/// Materializing and exporting allocate per declared frame.
pub const MAX_FRAME_COUNT: usize = 1 << 24;

/// Length of the inclusive range `[start, end]`, `Some(0)` when `end < start`.
///
/// `None` when the length does not fit in `usize`.
pub fn inclusive_len(start: i64, end: i64) -> Option<usize> {
    if end < start {
        return Some(0);
    }
    let span = end.checked_sub(start)?.checked_add(1)?;
    usize::try_from(span).ok()
}

/// Header level metadata of an opened recording.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordingInfo {
    /// Capture rate in frames per second.
    pub frame_rate: f64,
    /// First frame index.
    pub first_frame: i64,
    /// Last frame index (inclusive).
    pub last_frame: i64,
    /// Number of point channels per frame.
    pub point_count: usize,
}

impl RecordingInfo {
    /// Number of frames in `[first_frame, last_frame]`.
    ///
    /// Zero when the range is not representable; [`validate`](Self::validate)
    /// rejects such headers.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.checked_frame_count().unwrap_or(0)
    }

    /// Number of frames in `[first_frame, last_frame]`, `None` on overflow.
    #[inline]
    pub fn checked_frame_count(&self) -> Option<usize> {
        inclusive_len(self.first_frame, self.last_frame)
    }

    /// Check the frame rate and that the frame range is representable and
    /// no longer than [`MAX_FRAME_COUNT`].
    pub fn validate(&self) -> Result<()> {
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(Error::invalid(format!("frame rate {} is not positive", self.frame_rate)));
        }
        match self.checked_frame_count() {
            Some(n) if n <= MAX_FRAME_COUNT => Ok(()),
            Some(n) => Err(Error::invalid(format!(
                "header declares {} frames, at most {} supported",
                n, MAX_FRAME_COUNT
            ))),
            None => Err(Error::invalid(format!(
                "frame range [{}, {}] is not representable",
                self.first_frame, self.last_frame
            ))),
        }
    }

    /// Check if the recording carries POINT data.
    #[inline]
    pub fn has_point_data(&self) -> bool {
        self.point_count > 0
    }

    /// Check if a frame index lies in the declared range.
    #[inline]
    pub fn contains_frame(&self, frame: i64) -> bool {
        frame >= self.first_frame && frame <= self.last_frame
    }
}

/// One frame of raw samples as delivered by the parser.
#[derive(Clone, Debug)]
pub struct FrameBlock<'a> {
    /// Absolute frame index.
    pub index: i64,
    /// `(x, y, z, residual)` per point channel, in storage order.
    pub points: Cow<'a, [[f32; 4]]>,
    /// Analog samples, passed through untouched.
    pub analog: Cow<'a, [f32]>,
}

/// Lazy frame stream.
pub type FrameIter<'a> = Box<dyn Iterator<Item = Result<FrameBlock<'a>>> + 'a>;

/// Reader interface for an opened recording.
pub trait RecordingSource {
    /// Header metadata.
    fn info(&self) -> RecordingInfo;

    /// Parsed parameter dictionary.
    fn parameters(&self) -> &ParameterSet;

    /// Stream frames in `[first_frame, last_frame]`.
    ///
    /// Each call restarts the stream from the first frame.
    fn read_frames(&mut self) -> Result<FrameIter<'_>>;
}

/// Dense point array ready for encoding, laid out `[frame][label][SAMPLE_WIDTH]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseFrames {
    pub frame_rate: f64,
    pub first_frame: i64,
    pub labels: Vec<String>,
    pub frame_count: usize,
    pub data: Vec<f32>,
}

impl DenseFrames {
    /// Allocate with every residual set to `-1` (invalid).
    pub fn invalid(frame_rate: f64, first_frame: i64, labels: Vec<String>, frame_count: usize) -> Self {
        let mut data = vec![0.0f32; frame_count * labels.len() * SAMPLE_WIDTH];
        for sample in data.chunks_exact_mut(SAMPLE_WIDTH) {
            sample[3] = -1.0;
        }
        Self {
            frame_rate,
            first_frame,
            labels,
            frame_count,
            data,
        }
    }

    /// Number of label columns.
    #[inline]
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    fn offset(&self, frame: usize, label: usize) -> usize {
        (frame * self.labels.len() + label) * SAMPLE_WIDTH
    }

    /// Sample at a (relative frame, label) cell.
    pub fn sample(&self, frame: usize, label: usize) -> &[f32] {
        let o = self.offset(frame, label);
        &self.data[o..o + SAMPLE_WIDTH]
    }

    /// Mutable sample at a (relative frame, label) cell.
    pub fn sample_mut(&mut self, frame: usize, label: usize) -> &mut [f32] {
        let o = self.offset(frame, label);
        &mut self.data[o..o + SAMPLE_WIDTH]
    }

    /// Last frame index (inclusive), `first_frame - 1` when empty.
    pub fn last_frame(&self) -> i64 {
        self.first_frame.saturating_add(self.frame_count as i64 - 1)
    }
}

/// Writer interface for encoding an exported recording.
pub trait FrameWriter {
    /// Encode the dense frames together with the metadata groups.
    fn write_recording(&mut self, frames: &DenseFrames, parameters: &ParameterSet) -> Result<()>;
}
