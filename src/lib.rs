//! # c3d-anim
//!
//! Maps motion-capture recordings (C3D style: point trajectories with
//! per-sample residuals, a typed parameter dictionary and events) onto
//! keyframe animation channels, and consolidates animation channels back
//! into a dense point recording.
//!
//! The binary container is handled by an external parser/writer behind the
//! [`core::RecordingSource`] and [`core::FrameWriter`] traits; the animation
//! host sits behind the sink traits in [`anim`].
//!
//! ## Modules
//!
//! - [`util`] - Errors, axis conventions, length units
//! - [`core`] - Parameter dictionary model, label masks, parser seams, warnings
//! - [`dict`] - Parameter interpretation (units, orientation, labels, events)
//! - [`partition`] - Actor/label partitioning
//! - [`stream`] - Frame stream to columnar per-entity arrays
//! - [`import`] - Columnar arrays to keyframe channels
//! - [`export`] - Keyframe channels to dense point frames
//! - [`events`] - Events to timeline markers
//! - [`anim`] - Host animation model and sink traits
//! - [`recording`] - In-memory / JSON recordings
//! - [`options`] - Import and export options
//! - [`pipeline`] - End-to-end import, batch import and export
//!
//! ## Example
//!
//! ```ignore
//! use c3d_anim::prelude::*;
//!
//! let mut source = MemoryRecording::load("walk.json")?;
//! let mut scene = Scene::new();
//! let report = import_recording("walk", &mut source, &ImportOptions::default(), &mut scene)?;
//! report.apply_to(&mut scene);
//!
//! let mut out = JsonRecordingWriter::new("walk_out.json");
//! export_scene(&scene, &ExportOptions::default(), &mut out, &mut Diagnostics::new())?;
//! ```

pub mod util;
pub mod core;
pub mod dict;
pub mod partition;
pub mod stream;
pub mod import;
pub mod export;
pub mod events;
pub mod anim;
pub mod recording;
pub mod options;
pub mod pipeline;

// Re-export commonly used types
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::anim::{Action, FCurve, Interpolation, Keyframe, Scene, SceneSettings, SyncMode};
    pub use crate::core::{Diagnostics, FrameWriter, ParameterSet, RecordingInfo, RecordingSource, Warning};
    pub use crate::options::{ExportOptions, ExportScope, ImportOptions};
    pub use crate::partition::EntityKey;
    pub use crate::pipeline::{export_scene, import_batch, import_recording, BatchReport, ImportReport};
    pub use crate::recording::{JsonRecordingWriter, MemoryRecording};
    pub use crate::util::{Axis, AxisConvention, Error, LengthUnit, Result};
}
