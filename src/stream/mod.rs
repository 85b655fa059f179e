//! Frame stream to columnar per-entity arrays.
//!
//! A recording is streamed exactly once. Every frame block is transformed and
//! scattered into the arrays of all entities at the same time; entity masks
//! are exclusive so no sample is copied twice.

mod frames;

pub use frames::*;

use tracing::debug;

use crate::core::{Diagnostics, FrameIter, LabelMask, RecordingInfo, Warning};
use crate::util::{Error, Mat3, Result, Vec3};

/// Decides whether a sample counts as observed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResidualPolicy {
    /// Residual threshold; `<= 0` disables thresholding.
    pub max_residual: f32,
}

impl ResidualPolicy {
    pub fn new(max_residual: f32) -> Self {
        Self { max_residual }
    }

    /// `residual >= 0` and, when thresholding, `residual < max_residual`.
    #[inline]
    pub fn is_valid(&self, residual: f32) -> bool {
        residual >= 0.0 && (self.max_residual <= 0.0 || residual < self.max_residual)
    }
}

/// Labels of one entity to materialize.
#[derive(Clone, Debug)]
pub struct Selection {
    /// Retained label indices.
    pub mask: LabelMask,
    /// Names for the retained labels, in index order.
    pub labels: Vec<String>,
}

/// Result of streaming a recording.
#[derive(Clone, Debug)]
pub struct StreamOutput {
    /// One entry per selection, in selection order.
    pub entities: Vec<EntityFrames>,
    /// Last frame after excluding an all-zero terminal frame.
    pub last_frame: i64,
    /// Terminal frame that was dropped, if any.
    pub dropped_frame: Option<i64>,
}

/// Applies the global transform and residual policy while streaming.
#[derive(Clone, Copy, Debug)]
pub struct FrameStreamAdapter {
    transform: Mat3,
    policy: ResidualPolicy,
}

impl FrameStreamAdapter {
    pub fn new(transform: Mat3, policy: ResidualPolicy) -> Self {
        Self { transform, policy }
    }

    pub fn transform(&self) -> Mat3 {
        self.transform
    }

    pub fn policy(&self) -> ResidualPolicy {
        self.policy
    }

    /// Stream `frames` into one [`EntityFrames`] per selection.
    ///
    /// Frames outside the declared range or with the wrong channel count are
    /// structural errors. Frames never delivered stay invalid and are
    /// reported as a single warning.
    pub fn materialize(
        &self,
        info: &RecordingInfo,
        frames: FrameIter<'_>,
        selections: &[Selection],
        diag: &mut Diagnostics,
    ) -> Result<StreamOutput> {
        info.validate()?;
        let frame_count = info.frame_count();
        let columns: Vec<Vec<usize>> = selections.iter().map(|s| s.mask.ones().collect()).collect();
        let mut out: Vec<EntityFrames> = selections
            .iter()
            .map(|s| EntityFrames::new(s.labels.clone(), info.first_frame, frame_count))
            .collect();

        let mut seen = vec![false; frame_count];
        let mut terminal_zero = false;

        for block in frames {
            let block = block?;
            if !info.contains_frame(block.index) {
                return Err(Error::FrameOutOfRange {
                    frame: block.index,
                    first: info.first_frame,
                    last: info.last_frame,
                });
            }
            if block.points.len() != info.point_count {
                return Err(Error::LabelCountMismatch {
                    frame: block.index,
                    expected: info.point_count,
                    actual: block.points.len(),
                });
            }

            let rel = (block.index - info.first_frame) as usize;
            seen[rel] = true;
            if block.index == info.last_frame {
                terminal_zero = block.points.iter().all(|p| p[0] == 0.0 && p[1] == 0.0 && p[2] == 0.0);
            }

            for (entity, cols) in out.iter_mut().zip(&columns) {
                for (j, &src) in cols.iter().enumerate() {
                    let [x, y, z, residual] = block.points[src];
                    let p = self.transform * Vec3::new(x, y, z);
                    entity.store(rel, j, p, residual, self.policy.is_valid(residual));
                }
            }
        }

        let missing = seen.iter().filter(|s| !**s).count();
        if missing > 0 {
            diag.push(Warning::MissingFrames { count: missing });
        }

        // Exporters pad the last frame with zeros; a real capture is never
        // exactly at the origin for every channel.
        let mut last_frame = info.last_frame;
        let mut dropped_frame = None;
        if terminal_zero && frame_count > 0 {
            for entity in &mut out {
                entity.truncate(frame_count - 1);
            }
            dropped_frame = Some(info.last_frame);
            last_frame = last_frame.saturating_sub(1);
            diag.push(Warning::TrailingFrameDropped { frame: info.last_frame });
        }

        debug!(
            "Materialized {} frames for {} entities",
            frame_count - dropped_frame.is_some() as usize,
            out.len()
        );

        Ok(StreamOutput {
            entities: out,
            last_frame,
            dropped_frame,
        })
    }
}
