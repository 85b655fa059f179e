//! Host side animation model.
//!
//! A minimal in-memory representation of what an animation host stores:
//! actions holding per-channel keyframe curves, timeline markers, armature
//! rigs and scene timing settings. The import pipeline only talks to it via
//! the sink traits in [`sink`], so any host can substitute its own storage.

mod paths;
mod scene;
mod sink;

pub use paths::*;
pub use scene::*;
pub use sink::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::partition::EntityKey;
use crate::util::{Error, Result, Vec3};

/// Keyframe interpolation mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interpolation {
    Constant,
    Linear,
    #[default]
    Bezier,
    Quad,
    Cubic,
    Circ,
}

impl Interpolation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Constant => "CONSTANT",
            Self::Linear => "LINEAR",
            Self::Bezier => "BEZIER",
            Self::Quad => "QUAD",
            Self::Cubic => "CUBIC",
            Self::Circ => "CIRC",
        }
    }
}

impl FromStr for Interpolation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CONSTANT" => Ok(Self::Constant),
            "LINEAR" => Ok(Self::Linear),
            "BEZIER" => Ok(Self::Bezier),
            "QUAD" => Ok(Self::Quad),
            "CUBIC" => Ok(Self::Cubic),
            "CIRC" => Ok(Self::Circ),
            other => Err(Error::invalid(format!("unknown interpolation '{}'", other))),
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single (time, value) key.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    #[serde(default)]
    pub interpolation: Interpolation,
}

impl Keyframe {
    pub fn new(time: f32, value: f32, interpolation: Interpolation) -> Self {
        Self {
            time,
            value,
            interpolation,
        }
    }
}

/// What a channel stores for its label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// One spatial component (0 = x, 1 = y, 2 = z).
    Location(u8),
    /// Sample residual, stepped.
    Residual,
}

impl ChannelKind {
    pub fn data_path(self, label: &str) -> String {
        match self {
            Self::Location(_) => location_path(label),
            Self::Residual => residual_path(label),
        }
    }

    pub fn array_index(self) -> u8 {
        match self {
            Self::Location(dim) => dim,
            Self::Residual => 0,
        }
    }
}

/// Keyframe curve bound to one data path component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FCurve {
    pub data_path: String,
    #[serde(default)]
    pub array_index: u8,
    /// Grouping key, the channel's label.
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
    /// Locked curves are not meant to be edited.
    #[serde(default)]
    pub locked: bool,
}

impl FCurve {
    pub fn new(data_path: impl Into<String>, array_index: u8, group: impl Into<String>) -> Self {
        Self {
            data_path: data_path.into(),
            array_index,
            group: group.into(),
            keyframes: Vec::new(),
            locked: false,
        }
    }

    /// Sort keys by time. Keys are appended in order by the importer; hand
    /// built curves may not be.
    pub fn update(&mut self) {
        self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
    }
}

/// Keyframe container for one entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub entity: EntityKey,
    /// Keep the action alive even when nothing references it.
    #[serde(default)]
    pub fake_user: bool,
    /// Participates in "selected" export scope.
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub curves: Vec<FCurve>,
}

impl Action {
    pub fn new(name: impl Into<String>, entity: EntityKey) -> Self {
        Self {
            name: name.into(),
            entity,
            fake_user: false,
            selected: false,
            curves: Vec::new(),
        }
    }

    /// Distinct curve groups in first-seen order.
    pub fn groups(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for c in &self.curves {
            if !out.contains(&c.group.as_str()) {
                out.push(&c.group);
            }
        }
        out
    }

    pub fn curve(&self, data_path: &str, array_index: u8) -> Option<&FCurve> {
        self.curves
            .iter()
            .find(|c| c.data_path == data_path && c.array_index == array_index)
    }

    /// Keyframes summed over every curve.
    pub fn total_keyframes(&self) -> usize {
        self.curves.iter().map(|c| c.keyframes.len()).sum()
    }
}

/// Named timeline marker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub frame: i32,
    pub name: String,
}

/// Single bone of a marker rig. One bone per label, head at the origin
/// and tail along +Z.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    pub head: Vec3,
    pub tail: Vec3,
}

/// Bone drawing style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoneDisplay {
    #[default]
    Octahedral,
    Stick,
}

/// Rig presenting one entity's labels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Armature {
    pub name: String,
    pub entity: EntityKey,
    pub bones: Vec<Bone>,
    #[serde(default)]
    pub display: BoneDisplay,
    /// Radius of the sphere shape drawn for each bone.
    pub shape_radius: f32,
    /// Action driving the rig.
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

/// How playback keeps up with the frame rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncMode {
    /// Play every frame.
    None,
    /// Drop frames to keep up.
    #[default]
    FrameDrop,
    /// Sync to audio.
    AudioSync,
}

impl FromStr for SyncMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "FRAME_DROP" => Ok(Self::FrameDrop),
            "AUDIO_SYNC" => Ok(Self::AudioSync),
            other => Err(Error::invalid(format!("unknown sync mode '{}'", other))),
        }
    }
}

/// Scene timeline settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub frame_rate: f64,
    pub frame_start: i64,
    pub frame_end: i64,
    pub sync_mode: SyncMode,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            frame_rate: 24.0,
            frame_start: 1,
            frame_end: 250,
            sync_mode: SyncMode::FrameDrop,
        }
    }
}
