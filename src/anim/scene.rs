//! In-memory scene implementing the host sink traits.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::{
    Action, Armature, Bone, BoneDisplay, ChannelKind, ChannelSink, FCurve, Keyframe, Marker, MarkerSink, RigSink,
    SceneSettings,
};
use crate::core::ParameterSet;
use crate::options::ExportScope;
use crate::partition::EntityKey;
use crate::util::{Error, Result, Vec3};

/// Actions, rigs, markers and timeline settings of one scene.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub settings: SceneSettings,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub armatures: Vec<Armature>,
    #[serde(default)]
    pub markers: Vec<Marker>,
    /// Recording metadata carried through for re-export (e.g. `TIMECODE`).
    #[serde(default)]
    pub metadata: ParameterSet,
    #[serde(skip)]
    open: Option<usize>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a scene from JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Save the scene as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn action_mut(&mut self, name: &str) -> Option<&mut Action> {
        self.actions.iter_mut().find(|a| a.name == name)
    }

    pub fn armature(&self, name: &str) -> Option<&Armature> {
        self.armatures.iter().find(|a| a.name == name)
    }

    /// Actions participating in an export.
    pub fn actions_in_scope(&self, scope: ExportScope) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| scope == ExportScope::All || a.selected)
            .collect()
    }

    /// Mark actions as selected by name. Returns how many matched.
    pub fn select(&mut self, names: &[&str]) -> usize {
        let mut hits = 0;
        for a in &mut self.actions {
            a.selected = names.contains(&a.name.as_str());
            hits += a.selected as usize;
        }
        hits
    }

    fn open_action(&mut self) -> Result<&mut Action> {
        let idx = self.open.ok_or_else(|| Error::invalid("no open action"))?;
        self.actions
            .get_mut(idx)
            .ok_or_else(|| Error::invalid("open action was removed"))
    }
}

/// `base`, or `base.NNN` with the first free suffix.
fn unique_name<'a>(base: &str, taken: impl Iterator<Item = &'a str> + Clone) -> String {
    if !taken.clone().any(|n| n == base) {
        return base.to_string();
    }
    (1..)
        .map(|i| format!("{}.{:03}", base, i))
        .find(|candidate| !taken.clone().any(|n| n == candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}

impl ChannelSink for Scene {
    type Channel = usize;

    fn begin_entity(&mut self, entity: &EntityKey, name: &str, fake_user: bool) -> Result<String> {
        if self.open.is_some() {
            return Err(Error::invalid("previous action was not finalized"));
        }
        let name = unique_name(name, self.actions.iter().map(|a| a.name.as_str()));
        let mut action = Action::new(name.clone(), entity.clone());
        action.fake_user = fake_user;
        self.actions.push(action);
        self.open = Some(self.actions.len() - 1);
        Ok(name)
    }

    fn create_channel(&mut self, label: &str, kind: ChannelKind) -> Result<usize> {
        let action = self.open_action()?;
        action
            .curves
            .push(FCurve::new(kind.data_path(label), kind.array_index(), label));
        Ok(action.curves.len() - 1)
    }

    fn append_keyframes(&mut self, channel: usize, keys: &[Keyframe]) -> Result<()> {
        let action = self.open_action()?;
        let curve = action
            .curves
            .get_mut(channel)
            .ok_or_else(|| Error::NotFound(format!("channel {}", channel)))?;
        curve.keyframes.extend_from_slice(keys);
        Ok(())
    }

    fn lock_channel(&mut self, channel: usize) -> Result<()> {
        let action = self.open_action()?;
        if let Some(curve) = action.curves.get_mut(channel) {
            curve.locked = true;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let action = self.open_action()?;
        for curve in &mut action.curves {
            curve.update();
        }
        self.open = None;
        Ok(())
    }

    fn discard(&mut self) -> Result<()> {
        if let Some(idx) = self.open.take() {
            if idx < self.actions.len() {
                self.actions.remove(idx);
            }
        }
        Ok(())
    }
}

impl MarkerSink for Scene {
    fn insert_marker(&mut self, frame: i32, label: &str) {
        self.markers.push(Marker {
            frame,
            name: label.to_string(),
        });
    }
}

impl RigSink for Scene {
    fn create_rig(&mut self, entity: &EntityKey, labels: &[String], bone_size: f32, action: &str) -> Result<()> {
        let name = unique_name(entity.name(), self.armatures.iter().map(|a| a.name.as_str()));
        let bones = labels
            .iter()
            .map(|label| Bone {
                name: label.clone(),
                head: Vec3::ZERO,
                tail: Vec3::new(0.0, 0.0, bone_size),
            })
            .collect();
        self.armatures.push(Armature {
            name,
            entity: entity.clone(),
            bones,
            display: BoneDisplay::Stick,
            shape_radius: bone_size * 0.5,
            action: Some(action.to_string()),
            hidden: *entity == EntityKey::Unlabeled,
        });
        Ok(())
    }
}
