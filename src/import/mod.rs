//! Columnar entity frames to keyframe channels.
//!
//! Mapping is pure: [`map_entity`] builds the complete channel set of one
//! entity without touching the host, so entities can be mapped in parallel
//! and committed to a [`ChannelSink`] afterwards.

use crate::anim::{ChannelKind, ChannelSink, Interpolation, Keyframe};
use crate::partition::EntityKey;
use crate::stream::EntityFrames;
use crate::util::Result;

/// Settings shared by every entity of an import.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelConfig {
    pub interpolation: Interpolation,
    /// Multiplied onto absolute frame indices to get key times.
    pub resample_factor: f64,
    pub include_residuals: bool,
    /// Keep labels that have no valid sample at all.
    pub include_empty: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::Bezier,
            resample_factor: 1.0,
            include_residuals: false,
            include_empty: false,
        }
    }
}

/// Channels of one label.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelChannels {
    pub label: String,
    /// x, y, z location keys at the label's valid frames.
    pub location: [Vec<Keyframe>; 3],
    /// Stepped residual keys, one per change in value.
    pub residual: Option<Vec<Keyframe>>,
}

impl LabelChannels {
    /// Number of frames with a location key.
    pub fn sample_count(&self) -> usize {
        self.location[0].len()
    }
}

/// Every channel of one entity, in label order.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityChannels {
    pub entity: EntityKey,
    pub labels: Vec<LabelChannels>,
}

impl EntityChannels {
    /// Location keyframes over all labels and dimensions.
    pub fn total_keyframes(&self) -> usize {
        self.labels.iter().map(|l| l.location.iter().map(Vec::len).sum::<usize>()).sum()
    }

    pub fn label_names(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.label.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Build channels for one entity.
///
/// Key times are absolute frame indices times the resample factor. Labels
/// without any valid sample are pruned together with their residual channel
/// unless `include_empty` is set.
pub fn map_entity(entity: EntityKey, frames: &EntityFrames, config: &ChannelConfig) -> EntityChannels {
    let times: Vec<f32> = (0..frames.frame_count())
        .map(|f| (frames.frame_index(f) as f64 * config.resample_factor) as f32)
        .collect();

    let labels = frames
        .labels()
        .iter()
        .enumerate()
        .filter_map(|(j, label)| {
            let location = location_keys(frames, j, &times, config.interpolation);
            if location[0].is_empty() && !config.include_empty {
                return None;
            }
            let residual = config.include_residuals.then(|| residual_keys(frames, j, &times));
            Some(LabelChannels {
                label: label.clone(),
                location,
                residual,
            })
        })
        .collect();

    EntityChannels { entity, labels }
}

fn location_keys(frames: &EntityFrames, label: usize, times: &[f32], interp: Interpolation) -> [Vec<Keyframe>; 3] {
    let mut keys: [Vec<Keyframe>; 3] = Default::default();
    for (f, &t) in times.iter().enumerate() {
        if !frames.is_valid(f, label) {
            continue;
        }
        for (dim, curve) in keys.iter_mut().enumerate() {
            curve.push(Keyframe::new(t, frames.component(f, dim, label), interp));
        }
    }
    keys
}

/// Run-length encode the residual: a key at the first frame and wherever the
/// value changes.
fn residual_keys(frames: &EntityFrames, label: usize, times: &[f32]) -> Vec<Keyframe> {
    let mut keys: Vec<Keyframe> = Vec::new();
    let mut prev: Option<u32> = None;
    for (f, &t) in times.iter().enumerate() {
        let r = frames.residual(f, label);
        if prev != Some(r.to_bits()) {
            keys.push(Keyframe::new(t, r, Interpolation::Constant));
            prev = Some(r.to_bits());
        }
    }
    keys
}

/// Write an entity's channels into the sink's open container.
///
/// The caller brackets this with `begin_entity` / `finalize`.
pub fn commit<S: ChannelSink + ?Sized>(channels: &EntityChannels, sink: &mut S) -> Result<()> {
    for label in &channels.labels {
        for (dim, keys) in label.location.iter().enumerate() {
            let ch = sink.create_channel(&label.label, ChannelKind::Location(dim as u8))?;
            sink.append_keyframes(ch, keys)?;
        }
        if let Some(keys) = &label.residual {
            let ch = sink.create_channel(&label.label, ChannelKind::Residual)?;
            sink.append_keyframes(ch, keys)?;
            sink.lock_channel(ch)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Diagnostics, FrameBlock, LabelMask, RecordingInfo};
    use crate::stream::{FrameStreamAdapter, ResidualPolicy, Selection};
    use crate::util::Mat3;
    use std::borrow::Cow;

    /// One label, residuals `[0, 0, -1, 2, 0]` at frames 1..=5, x = frame.
    fn frames(max_residual: f32) -> EntityFrames {
        let info = RecordingInfo {
            frame_rate: 100.0,
            first_frame: 1,
            last_frame: 5,
            point_count: 1,
        };
        let residuals = [0.0, 0.0, -1.0, 2.0, 0.0];
        let blocks = (1..=5i64).map(move |i| -> Result<FrameBlock<'static>> {
            Ok(FrameBlock {
                index: i,
                points: Cow::Owned(vec![[i as f32, 1.0, 2.0, residuals[(i - 1) as usize]]]),
                analog: Cow::Owned(Vec::new()),
            })
        });
        let selection = Selection {
            mask: LabelMask::all(1),
            labels: vec!["Hip".into()],
        };
        let adapter = FrameStreamAdapter::new(Mat3::IDENTITY, ResidualPolicy::new(max_residual));
        adapter
            .materialize(&info, Box::new(blocks), &[selection], &mut Diagnostics::new())
            .unwrap()
            .entities
            .remove(0)
    }

    fn times(keys: &[Keyframe]) -> Vec<f32> {
        keys.iter().map(|k| k.time).collect()
    }

    #[test]
    fn test_unthresholded_keys() {
        let ch = map_entity(EntityKey::Unlabeled, &frames(0.0), &ChannelConfig::default());
        assert_eq!(times(&ch.labels[0].location[0]), vec![1.0, 2.0, 4.0, 5.0]);
        assert_eq!(ch.labels[0].location[0][2].value, 4.0);
        assert_eq!(ch.total_keyframes(), 12);
    }

    #[test]
    fn test_thresholded_keys() {
        let ch = map_entity(EntityKey::Unlabeled, &frames(1.5), &ChannelConfig::default());
        assert_eq!(times(&ch.labels[0].location[1]), vec![1.0, 2.0, 5.0]);
    }

    #[test]
    fn test_residual_run_length() {
        let config = ChannelConfig {
            include_residuals: true,
            ..Default::default()
        };
        let ch = map_entity(EntityKey::Unlabeled, &frames(0.0), &config);
        let residual = ch.labels[0].residual.as_ref().unwrap();
        let pairs: Vec<(f32, f32)> = residual.iter().map(|k| (k.time, k.value)).collect();
        assert_eq!(pairs, vec![(1.0, 0.0), (3.0, -1.0), (4.0, 2.0), (5.0, 0.0)]);
        assert!(residual.iter().all(|k| k.interpolation == Interpolation::Constant));
    }

    #[test]
    fn test_resample_factor() {
        let config = ChannelConfig {
            resample_factor: 0.5,
            interpolation: Interpolation::Linear,
            ..Default::default()
        };
        let ch = map_entity(EntityKey::Unlabeled, &frames(0.0), &config);
        assert_eq!(times(&ch.labels[0].location[2]), vec![0.5, 1.0, 2.0, 2.5]);
        assert_eq!(ch.labels[0].location[2][0].interpolation, Interpolation::Linear);
    }

    #[test]
    fn test_empty_label_pruning() {
        let mut f = EntityFrames::new(vec!["Good".into(), "Empty".into()], 0, 2);
        f.store(0, 0, crate::util::Vec3::ONE, 0.0, true);
        let config = ChannelConfig {
            include_residuals: true,
            ..Default::default()
        };
        let ch = map_entity(EntityKey::Unlabeled, &f, &config);
        assert_eq!(ch.label_names(), vec!["Good"]);

        let keep = ChannelConfig {
            include_empty: true,
            ..config
        };
        let ch = map_entity(EntityKey::Unlabeled, &f, &keep);
        assert_eq!(ch.label_names(), vec!["Good", "Empty"]);
        assert!(ch.labels[1].residual.is_some());
    }

    #[test]
    fn test_commit_to_scene() {
        use crate::anim::{residual_path, Scene};
        let config = ChannelConfig {
            include_residuals: true,
            ..Default::default()
        };
        let ch = map_entity(EntityKey::Unlabeled, &frames(0.0), &config);
        let mut scene = Scene::new();
        scene.begin_entity(&EntityKey::Unlabeled, "take.UNLABELED", true).unwrap();
        commit(&ch, &mut scene).unwrap();
        scene.finalize().unwrap();
        let action = &scene.actions[0];
        assert_eq!(action.curves.len(), 4);
        assert!(action.curve(&residual_path("Hip"), 0).unwrap().locked);
    }
}
