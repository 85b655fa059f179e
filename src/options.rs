//! Import and export options.
//!
//! Both structs deserialize from partial JSON; missing fields take the
//! defaults below.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::anim::{Interpolation, SyncMode};
use crate::dict::LabelMaskRules;
use crate::partition::DEFAULT_SEPARATOR;
use crate::util::{Axis, AxisConvention, Error, LengthUnit, Result};

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Options controlling how a recording becomes animation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    // Orientation / scale
    /// Use `axis_forward`/`axis_up` instead of the file's screen axes.
    pub use_manual_orientation: bool,
    pub axis_forward: Axis,
    pub axis_up: Axis,
    pub global_scale: f64,
    /// Convention and unit of the target scene.
    pub scene_convention: AxisConvention,
    pub scene_unit: LengthUnit,

    // Rig
    pub create_armature: bool,
    pub bone_size: f32,

    // Animation
    /// Retime keys to `target_frame_rate` (or the recording rate truncated to
    /// whole frames per second, at least 1).
    pub resample_frame_rate: bool,
    pub target_frame_rate: Option<f64>,
    pub fake_user: bool,
    pub interpolation: Interpolation,
    /// Residual threshold; `<= 0` disables.
    pub max_residual: f32,
    pub include_event_markers: bool,
    pub include_empty_labels: bool,
    pub include_residual_channels: bool,
    pub apply_label_mask: bool,
    pub label_mask_rules: LabelMaskRules,
    pub split_actors: bool,
    pub actor_separator: char,

    // Scene settings to recommend
    pub set_frame_rate: bool,
    pub set_end_frame: bool,
    pub set_playback_mode: bool,
    pub sync_mode: SyncMode,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            use_manual_orientation: false,
            axis_forward: Axis::NegZ,
            axis_up: Axis::PosY,
            global_scale: 1.0,
            scene_convention: AxisConvention::SCENE,
            scene_unit: LengthUnit::Meter,
            create_armature: true,
            bone_size: 0.02,
            resample_frame_rate: false,
            target_frame_rate: None,
            fake_user: true,
            interpolation: Interpolation::Bezier,
            max_residual: 0.0,
            include_event_markers: false,
            include_empty_labels: false,
            include_residual_channels: false,
            apply_label_mask: true,
            label_mask_rules: LabelMaskRules::default(),
            split_actors: true,
            actor_separator: DEFAULT_SEPARATOR,
            set_frame_rate: true,
            set_end_frame: true,
            set_playback_mode: true,
            sync_mode: SyncMode::FrameDrop,
        }
    }
}

impl ImportOptions {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        load_json(path.as_ref())
    }

    /// Axis convention given by the manual orientation fields.
    pub fn manual_convention(&self) -> Result<AxisConvention> {
        AxisConvention::new(self.axis_forward, self.axis_up)
    }
}

/// Which actions an export consumes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportScope {
    #[default]
    All,
    Selected,
}

/// Options controlling how animation becomes a recording.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub scope: ExportScope,
    /// Carry the scene's `TIMECODE` metadata through, when present.
    pub export_timecode: bool,
    /// Write in `axis_forward`/`axis_up` instead of the scene convention.
    pub use_manual_orientation: bool,
    pub axis_forward: Axis,
    pub axis_up: Axis,
    pub global_scale: f64,
    pub scene_convention: AxisConvention,
    pub scene_unit: LengthUnit,
    pub output_unit: LengthUnit,
    /// Overrides for the scene frame range (inclusive).
    pub frame_start: Option<i64>,
    pub frame_end: Option<i64>,
    /// Separator used to restore actor prefixes.
    pub actor_separator: char,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            scope: ExportScope::All,
            export_timecode: true,
            use_manual_orientation: false,
            axis_forward: Axis::NegY,
            axis_up: Axis::PosZ,
            global_scale: 1.0,
            scene_convention: AxisConvention::SCENE,
            scene_unit: LengthUnit::Meter,
            output_unit: LengthUnit::Millimeter,
            frame_start: None,
            frame_end: None,
            actor_separator: DEFAULT_SEPARATOR,
        }
    }
}

impl ExportOptions {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        load_json(path.as_ref())
    }

    /// Convention the written file uses.
    pub fn file_convention(&self) -> Result<AxisConvention> {
        if self.use_manual_orientation {
            AxisConvention::new(self.axis_forward, self.axis_up)
        } else {
            Ok(self.scene_convention)
        }
    }
}
