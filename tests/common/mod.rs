//! Shared recording builders for the integration tests.
#![allow(dead_code)]

use c3d_anim::core::{Parameter, ParameterGroup, ParameterSet, RecordingInfo};
use c3d_anim::recording::MemoryRecording;

/// POINT group for a millimetre, Z-up recording.
pub fn point_group(labels: &[&str]) -> ParameterGroup {
    ParameterGroup::new("POINT", "")
        .with(Parameter::int16("USED", "", labels.len() as i16))
        .with(Parameter::strings("LABELS", "", labels.iter().copied()))
        .with(Parameter::string("UNITS", "", "mm"))
        .with(Parameter::string("X_SCREEN", "", "+X"))
        .with(Parameter::string("Y_SCREEN", "", "+Z"))
}

/// Build a recording over `first..=last`, sampling `f(frame, label)`.
pub fn recording<F>(labels: &[&str], rate: f64, first: i64, last: i64, mut f: F) -> MemoryRecording
where
    F: FnMut(i64, usize) -> [f32; 4],
{
    let info = RecordingInfo {
        frame_rate: rate,
        first_frame: first,
        last_frame: last,
        point_count: labels.len(),
    };
    let params: ParameterSet = [point_group(labels)].into_iter().collect();
    let mut rec = MemoryRecording::new(info, params);
    for frame in first..=last {
        let points = (0..labels.len()).map(|j| f(frame, j)).collect();
        rec.push_frame(frame, points);
    }
    rec
}

/// Smooth, never-zero trajectory in millimetres.
pub fn sample(frame: i64, label: usize) -> [f32; 4] {
    let t = frame as f32;
    [
        100.0 + t * 1.5 + label as f32 * 10.0,
        -50.0 + (t * 0.1).sin() * 20.0,
        900.0 + label as f32,
        0.5,
    ]
}
