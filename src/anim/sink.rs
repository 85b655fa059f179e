//! Host interfaces the import pipeline writes into.

use super::{ChannelKind, Keyframe};
use crate::partition::EntityKey;
use crate::util::Result;

/// Receives per-entity keyframe channels.
///
/// Calls for one entity are bracketed by [`begin_entity`](Self::begin_entity)
/// and [`finalize`](Self::finalize); entities never interleave.
pub trait ChannelSink {
    /// Opaque channel handle.
    type Channel: Copy;

    /// Open the keyframe container for `entity`.
    ///
    /// `name` is the container name, `fake_user` asks the host to keep it
    /// alive while unreferenced. Returns the name actually used.
    fn begin_entity(&mut self, entity: &EntityKey, name: &str, fake_user: bool) -> Result<String>;

    /// Create a channel for `label` in the open container.
    fn create_channel(&mut self, label: &str, kind: ChannelKind) -> Result<Self::Channel>;

    /// Append keys in time order.
    fn append_keyframes(&mut self, channel: Self::Channel, keys: &[Keyframe]) -> Result<()>;

    /// Mark a channel read-only.
    fn lock_channel(&mut self, _channel: Self::Channel) -> Result<()> {
        Ok(())
    }

    /// Close the open container.
    fn finalize(&mut self) -> Result<()>;

    /// Drop the open container without committing it.
    fn discard(&mut self) -> Result<()>;
}

/// Receives timeline markers.
pub trait MarkerSink {
    fn insert_marker(&mut self, frame: i32, label: &str);
}

/// Builds visual rigs for imported entities.
pub trait RigSink {
    /// Create a rig with one bone per label and bind it to `action`.
    fn create_rig(&mut self, entity: &EntityKey, labels: &[String], bone_size: f32, action: &str) -> Result<()>;
}
