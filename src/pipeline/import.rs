use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, info_span, trace};

use super::HostScene;
use crate::anim::{Scene, SceneSettings, SyncMode};
use crate::core::{Diagnostics, EmptyReason, LabelMask, ParameterGroup, RecordingInfo, RecordingSource, Warning};
use crate::dict::{make_labels_unique, ParameterDictionary};
use crate::events::{self, EventRecord};
use crate::import::{commit, map_entity, ChannelConfig, EntityChannels};
use crate::options::ImportOptions;
use crate::partition::{EntityKey, Partitioner};
use crate::stream::{FrameStreamAdapter, ResidualPolicy, Selection};
use crate::util::{axis_conversion, Error, Mat3, Result};

/// Scene settings the import suggests. `None` fields are left alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RecommendedSettings {
    pub frame_rate: Option<f64>,
    pub frame_end: Option<i64>,
    pub sync_mode: Option<SyncMode>,
}

impl RecommendedSettings {
    pub fn apply(&self, settings: &mut SceneSettings) {
        if let Some(rate) = self.frame_rate {
            settings.frame_rate = rate;
        }
        if let Some(end) = self.frame_end {
            settings.frame_end = end;
        }
        if let Some(mode) = self.sync_mode {
            settings.sync_mode = mode;
        }
    }
}

/// One committed entity.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntityReport {
    pub entity: EntityKey,
    /// Name of the keyframe container in the host.
    pub action: String,
    pub labels: usize,
    pub keyframes: usize,
}

/// Outcome of importing one recording.
#[derive(Clone, Debug, Serialize)]
pub struct ImportReport {
    pub name: String,
    pub info: RecordingInfo,
    pub entities: Vec<EntityReport>,
    pub markers: usize,
    pub resample_factor: f64,
    /// Last frame after dropping an all-zero terminal frame.
    pub last_frame: i64,
    pub recommended: RecommendedSettings,
    /// `TIMECODE` group, kept for re-export.
    #[serde(skip)]
    pub timecode: Option<ParameterGroup>,
    pub warnings: Diagnostics,
}

impl ImportReport {
    /// Apply recommended settings and carried metadata to an in-memory scene.
    pub fn apply_to(&self, scene: &mut Scene) {
        self.recommended.apply(&mut scene.settings);
        if let Some(tc) = &self.timecode {
            scene.metadata.insert_group(tc.clone());
        }
    }

    pub fn total_keyframes(&self) -> usize {
        self.entities.iter().map(|e| e.keyframes).sum()
    }
}

/// Everything derived from the parameter dictionary before streaming.
struct Plan {
    transform: Mat3,
    keys: Vec<EntityKey>,
    selections: Vec<Selection>,
    events: Vec<EventRecord>,
    timecode: Option<ParameterGroup>,
}

fn plan_import(name: &str, dict: &ParameterDictionary<'_>, options: &ImportOptions, diag: &mut Diagnostics) -> Result<Plan> {
    let scale = options.global_scale * dict.unit_conversion_or_assume("POINT", options.scene_unit, diag);
    let orient = if options.use_manual_orientation {
        axis_conversion(options.manual_convention()?, options.scene_convention)?
    } else {
        let scene = options.scene_convention;
        let (m, parsed) = dict.axis_interpretation(scene.forward, scene.up);
        if !parsed {
            diag.push(Warning::OrientationNotParsed {
                section: "POINT".to_string(),
            });
        }
        m
    };
    let transform = orient * scale as f32;

    let raw = dict.point_labels();
    let labels = make_labels_unique(&raw);
    let vendor = if options.apply_label_mask {
        dict.generate_label_mask(&raw, "POINT", &options.label_mask_rules)
    } else {
        LabelMask::all(labels.len())
    };

    let partitioner = Partitioner::new(options.actor_separator);
    let entities = if options.split_actors {
        partitioner.partition(&labels)
    } else {
        Partitioner::whole(name, labels.len())
    };

    let mut keys = Vec::with_capacity(entities.len());
    let mut selections = Vec::with_capacity(entities.len());
    for (key, mask) in entities {
        let retained = mask.and(&vendor);
        if retained.is_clear() {
            diag.push(Warning::EmptyEntity {
                entity: key.name().to_string(),
                reason: EmptyReason::NoLabels,
            });
            continue;
        }
        let local = retained
            .select(&labels)
            .map(|l| key.local_label(l, partitioner.separator()).to_string())
            .collect();
        debug!("Entity '{}': {} labels", key, retained.count());
        keys.push(key);
        selections.push(Selection {
            mask: retained,
            labels: local,
        });
    }

    let events = if options.include_event_markers { dict.events() } else { Vec::new() };
    let timecode = dict.parameters().group("TIMECODE").cloned();

    Ok(Plan {
        transform,
        keys,
        selections,
        events,
        timecode,
    })
}

/// Import one recording into `host`.
///
/// `name` is the recording's name (normally the file stem); containers are
/// named `<name>.<entity>`. Structural problems abort with an error, anything
/// else is recorded in the report's warnings.
#[tracing::instrument(skip_all, fields(name = %name))]
pub fn import_recording<R, H>(name: &str, source: &mut R, options: &ImportOptions, host: &mut H) -> Result<ImportReport>
where
    R: RecordingSource + ?Sized,
    H: HostScene + ?Sized,
{
    let info = source.info();
    if !info.has_point_data() {
        return Err(Error::NoPointData(name.to_string()));
    }
    info.validate()?;
    let mut diag = Diagnostics::new();
    let plan = {
        let dict = ParameterDictionary::new(source.parameters(), info);
        plan_import(name, &dict, options, &mut diag)?
    };

    let target_rate = options.target_frame_rate.unwrap_or_else(|| info.frame_rate.trunc().max(1.0));
    let resample_factor = if options.resample_frame_rate {
        target_rate / info.frame_rate
    } else {
        1.0
    };

    let output = {
        let _span = info_span!("read_points", frames = info.frame_count()).entered();
        let adapter = FrameStreamAdapter::new(plan.transform, ResidualPolicy::new(options.max_residual));
        adapter.materialize(&info, source.read_frames()?, &plan.selections, &mut diag)?
    };

    let config = ChannelConfig {
        interpolation: options.interpolation,
        resample_factor,
        include_residuals: options.include_residual_channels,
        include_empty: options.include_empty_labels,
    };
    let keyframing = info_span!("keyframe", entities = plan.keys.len()).entered();
    let mapped: Vec<EntityChannels> = plan
        .keys
        .par_iter()
        .zip(output.entities.par_iter())
        .map(|(key, frames)| map_entity(key.clone(), frames, &config))
        .collect();

    let mut entities = Vec::with_capacity(mapped.len());
    for channels in &mapped {
        let keyframes = channels.total_keyframes();
        if keyframes == 0 {
            diag.push(Warning::EmptyEntity {
                entity: channels.entity.name().to_string(),
                reason: EmptyReason::NoKeyframes,
            });
            continue;
        }
        let container = format!("{}.{}", name, channels.entity.name());
        let action = host.begin_entity(&channels.entity, &container, options.fake_user)?;
        if let Err(e) = commit(channels, host) {
            host.discard()?;
            return Err(e);
        }
        host.finalize()?;

        let labels = channels.label_names();
        trace!("Committed '{}': {} labels, {} keyframes", action, labels.len(), keyframes);
        if options.create_armature {
            host.create_rig(&channels.entity, &labels, options.bone_size, &action)?;
        }
        entities.push(EntityReport {
            entity: channels.entity.clone(),
            action,
            labels: labels.len(),
            keyframes,
        });
    }

    drop(keyframing);

    let markers = events::translate(&plan.events, resample_factor, host, &mut diag);

    let recommended = RecommendedSettings {
        frame_rate: options.set_frame_rate.then(|| {
            if options.resample_frame_rate {
                target_rate
            } else {
                info.frame_rate
            }
        }),
        frame_end: options
            .set_end_frame
            .then(|| (output.last_frame as f64 * resample_factor).round() as i64),
        sync_mode: options.set_playback_mode.then_some(options.sync_mode),
    };

    info!(
        "Imported '{}': {} entities, {} markers, {} warnings",
        name,
        entities.len(),
        markers,
        diag.len()
    );

    Ok(ImportReport {
        name: name.to_string(),
        info,
        entities,
        markers,
        resample_factor,
        last_frame: output.last_frame,
        recommended,
        timecode: plan.timecode,
        warnings: diag,
    })
}
