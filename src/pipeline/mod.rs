//! End-to-end import and export.
//!
//! - [`import_recording`] - one recording into a host scene
//! - [`import_batch`] - several recordings with per-file failure isolation
//! - [`export_scene`] / [`export_actions`] - host animation back to a recording

mod batch;
mod export;
mod import;

pub use batch::*;
pub use export::*;
pub use import::*;

use crate::anim::{ChannelSink, MarkerSink, RigSink};

/// Everything the importer writes into.
pub trait HostScene: ChannelSink + MarkerSink + RigSink {}

impl<T: ChannelSink + MarkerSink + RigSink + ?Sized> HostScene for T {}
