//! Import a recording, export it again and compare the samples.

mod common;

use approx::assert_relative_eq;
use c3d_anim::core::{Parameter, ParameterGroup, RecordingSource};
use c3d_anim::prelude::*;
use common::{recording, sample};

/// Import `rec` with default options and export the whole scene again.
fn roundtrip(rec: &mut MemoryRecording) -> (ImportReport, Scene, MemoryRecording) {
    let mut scene = Scene::new();
    let report = import_recording("take", rec, &ImportOptions::default(), &mut scene).expect("import failed");
    report.apply_to(&mut scene);
    scene.settings.frame_start = report.info.first_frame;

    let mut out = MemoryRecording::new(rec.info(), Default::default());
    let mut diag = Diagnostics::new();
    export_scene(&scene, &ExportOptions::default(), &mut out, &mut diag)
        .expect("export failed")
        .expect("nothing exported");
    (report, scene, out)
}

#[test]
fn test_roundtrip_restores_samples() {
    let labels = ["Actor1:Hip", "Actor1:Knee", "Head"];
    let mut rec = recording(&labels, 100.0, 5, 30, |frame, j| {
        let mut s = sample(frame, j);
        // Knee drops out for a stretch.
        if j == 1 && (10..15).contains(&frame) {
            s[3] = -1.0;
        }
        s
    });
    let (_, _, out) = roundtrip(&mut rec);

    assert_eq!(out.info.first_frame, 5);
    assert_eq!(out.info.last_frame, 30);
    let point = out.parameters.group("POINT").expect("missing POINT");
    assert_eq!(
        point.get("LABELS").and_then(Parameter::as_strings).map(|l| l.to_vec()),
        Some(labels.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    );

    for (frame, stored) in rec.frames.iter().zip(&out.frames) {
        assert_eq!(frame.index, stored.index);
        for (j, (a, b)) in frame.points.iter().zip(&stored.points).enumerate() {
            if a[3] < 0.0 {
                assert_eq!(b[3], -1.0, "frame {} label {}", frame.index, j);
                continue;
            }
            assert_eq!(b[3], 0.0);
            for d in 0..3 {
                assert_relative_eq!(a[d], b[d], max_relative = 1e-5);
            }
        }
    }
}

#[test]
fn test_roundtrip_carries_timecode() {
    let mut rec = recording(&["Hip"], 100.0, 1, 10, sample);
    let timecode = ParameterGroup::new("TIMECODE", "")
        .with(Parameter::string("STANDARD", "", "SMPTE"))
        .with(Parameter::int16("DROP_FRAMES", "", 0));
    rec.parameters.insert_group(timecode.clone());

    let (report, scene, out) = roundtrip(&mut rec);
    assert!(report.timecode.is_some());
    assert_eq!(scene.metadata.group("TIMECODE"), Some(&timecode));
    assert_eq!(out.parameters.group("TIMECODE"), Some(&timecode));
}

#[test]
fn test_roundtrip_through_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("walk.json");
    let scene_path = dir.path().join("scene.json");
    let output = dir.path().join("walk_out.json");

    recording(&["A:Hip", "A:Knee"], 50.0, 1, 12, sample)
        .save(&input)
        .expect("save recording");

    let mut source = MemoryRecording::load(&input).expect("load recording");
    let mut scene = Scene::new();
    let report = import_recording("walk", &mut source, &ImportOptions::default(), &mut scene).expect("import failed");
    report.apply_to(&mut scene);
    scene.save(&scene_path).expect("save scene");

    let mut scene = Scene::load(&scene_path).expect("load scene");
    assert_eq!(scene.settings.frame_rate, 50.0);
    assert_eq!(scene.settings.frame_end, 12);
    scene.settings.frame_start = 1;

    let mut writer = JsonRecordingWriter::new(&output);
    let summary = export_scene(&scene, &ExportOptions::default(), &mut writer, &mut Diagnostics::new())
        .expect("export failed")
        .expect("nothing exported");
    assert_eq!(summary.labels, 2);
    assert_eq!(summary.frames, 12);

    let back = MemoryRecording::load(&output).expect("load export");
    assert_eq!(back.info.point_count, 2);
    assert_eq!(back.frames.len(), 12);
    assert_relative_eq!(back.frames[0].points[0][0], source.frames[0].points[0][0], max_relative = 1e-5);
}
