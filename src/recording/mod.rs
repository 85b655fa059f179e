//! In-memory recordings.
//!
//! [`MemoryRecording`] implements both sides of the parser seam: it can be
//! read as a [`RecordingSource`] and written to as a [`FrameWriter`], and it
//! persists as JSON. Binary C3D encoding lives outside this crate.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::{
    DenseFrames, FrameBlock, FrameIter, FrameWriter, ParameterSet, RecordingInfo, RecordingSource,
};
use crate::util::{Error, Result};

/// One stored frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryFrame {
    pub index: i64,
    pub points: Vec<[f32; 4]>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub analog: Vec<f32>,
}

/// Recording held entirely in memory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecording {
    pub info: RecordingInfo,
    #[serde(default)]
    pub parameters: ParameterSet,
    #[serde(default)]
    pub frames: Vec<MemoryFrame>,
}

impl MemoryRecording {
    pub fn new(info: RecordingInfo, parameters: ParameterSet) -> Self {
        Self {
            info,
            parameters,
            frames: Vec::new(),
        }
    }

    /// Append a frame of `(x, y, z, residual)` samples.
    pub fn push_frame(&mut self, index: i64, points: Vec<[f32; 4]>) {
        self.frames.push(MemoryFrame {
            index,
            points,
            analog: Vec::new(),
        });
    }

    /// Build from dense export frames. The camera mask column is dropped.
    pub fn from_dense(frames: &DenseFrames, parameters: ParameterSet) -> Self {
        let n = frames.label_count();
        let info = RecordingInfo {
            frame_rate: frames.frame_rate,
            first_frame: frames.first_frame,
            last_frame: frames.last_frame(),
            point_count: n,
        };
        let mut rec = Self::new(info, parameters);
        for f in 0..frames.frame_count {
            let points = (0..n)
                .map(|j| {
                    let s = frames.sample(f, j);
                    [s[0], s[1], s[2], s[3]]
                })
                .collect();
            rec.push_frame(frames.first_frame + f as i64, points);
        }
        rec
    }

    /// Load a recording from JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let rec: Self = serde_json::from_str(&text)?;
        rec.validate()?;
        Ok(rec)
    }

    /// Save as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Check the header against the stored frames.
    pub fn validate(&self) -> Result<()> {
        self.info.validate()?;
        if self.frames.len() > self.info.frame_count() {
            return Err(Error::InvalidStructure(format!(
                "{} frames stored, header declares {}",
                self.frames.len(),
                self.info.frame_count()
            )));
        }
        Ok(())
    }
}

impl RecordingSource for MemoryRecording {
    fn info(&self) -> RecordingInfo {
        self.info
    }

    fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    fn read_frames(&mut self) -> Result<FrameIter<'_>> {
        Ok(Box::new(self.frames.iter().map(|f| {
            Ok::<_, Error>(FrameBlock {
                index: f.index,
                points: Cow::Borrowed(f.points.as_slice()),
                analog: Cow::Borrowed(f.analog.as_slice()),
            })
        })))
    }
}

impl FrameWriter for MemoryRecording {
    fn write_recording(&mut self, frames: &DenseFrames, parameters: &ParameterSet) -> Result<()> {
        *self = Self::from_dense(frames, parameters.clone());
        Ok(())
    }
}

/// Writes exported recordings to a JSON file.
#[derive(Clone, Debug)]
pub struct JsonRecordingWriter {
    path: PathBuf,
}

impl JsonRecordingWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameWriter for JsonRecordingWriter {
    fn write_recording(&mut self, frames: &DenseFrames, parameters: &ParameterSet) -> Result<()> {
        let rec = MemoryRecording::from_dense(frames, parameters.clone());
        rec.save(&self.path)
            .map_err(|e| Error::WriteFailed(format!("{}: {}", self.path.display(), e)))?;
        info!("Wrote {} frames to {}", frames.frame_count, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> RecordingInfo {
        RecordingInfo {
            frame_rate: 60.0,
            first_frame: 1,
            last_frame: 2,
            point_count: 1,
        }
    }

    #[test]
    fn test_source_streams_in_order() {
        let mut rec = MemoryRecording::new(info(), ParameterSet::new());
        rec.push_frame(1, vec![[1.0, 2.0, 3.0, 0.0]]);
        rec.push_frame(2, vec![[4.0, 5.0, 6.0, -1.0]]);
        let indices: Vec<i64> = rec.read_frames().unwrap().map(|b| b.unwrap().index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_from_dense() {
        let mut dense = DenseFrames::invalid(100.0, 5, vec!["Hip".into()], 2);
        dense.sample_mut(1, 0)[..4].copy_from_slice(&[1.0, 2.0, 3.0, 0.0]);
        let rec = MemoryRecording::from_dense(&dense, ParameterSet::new());
        assert_eq!(rec.info.last_frame, 6);
        assert_eq!(rec.frames[0].points[0][3], -1.0);
        assert_eq!(rec.frames[1].points[0], [1.0, 2.0, 3.0, 0.0]);
    }

    #[test]
    fn test_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.json");
        let mut rec = MemoryRecording::new(info(), ParameterSet::new());
        rec.push_frame(1, vec![[1.0, 2.0, 3.0, 0.0]]);
        rec.save(&path).unwrap();
        assert_eq!(MemoryRecording::load(&path).unwrap(), rec);
        assert!(matches!(
            MemoryRecording::load(dir.path().join("nope.json")),
            Err(Error::FileNotFound(_))
        ));
    }

    #[test]
    fn test_validate() {
        let mut rec = MemoryRecording::new(info(), ParameterSet::new());
        for i in 0..3 {
            rec.push_frame(i, vec![[0.0; 4]]);
        }
        assert!(rec.validate().is_err());
        rec.frames.clear();
        rec.info.frame_rate = 0.0;
        assert!(rec.validate().is_err());
    }

    #[test]
    fn test_load_rejects_unrepresentable_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        let broken = RecordingInfo {
            first_frame: i64::MIN,
            last_frame: 5,
            ..info()
        };
        MemoryRecording::new(broken, ParameterSet::new()).save(&path).unwrap();
        assert!(matches!(MemoryRecording::load(&path), Err(Error::InvalidStructure(_))));
    }
}
