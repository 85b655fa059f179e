//! Core layer - recording data model and collaborator seams.
//!
//! This module provides:
//! - [`ParameterSet`] / [`ParameterGroup`] / [`Parameter`] - Typed parameter dictionary
//! - [`LabelMask`] - Bitset selection over label indices
//! - [`RecordingInfo`] / [`FrameBlock`] - Recording metadata and raw frame samples
//! - [`RecordingSource`] / [`FrameWriter`] - Traits for the binary parser/writer
//! - [`Diagnostics`] / [`Warning`] - Recoverable conditions collected during a run

mod params;
mod mask;
mod recording;
mod diagnostics;

pub use mask::LabelMask;
pub use params::{ParamData, Parameter, ParameterGroup, ParameterSet};
pub use recording::{
    inclusive_len, DenseFrames, FrameBlock, FrameIter, FrameWriter, RecordingInfo, RecordingSource,
    MAX_FRAME_COUNT, SAMPLE_WIDTH,
};
pub use diagnostics::{Diagnostics, EmptyReason, Warning};
