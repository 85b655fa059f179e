use serde::Serialize;
use tracing::info;

use crate::anim::{Action, Scene, SceneSettings};
use crate::core::{Diagnostics, FrameWriter, Parameter, ParameterGroup, ParameterSet, Warning};
use crate::dict::screen_axis;
use crate::options::ExportOptions;
use crate::export::{consolidate, ExportRange};
use crate::util::{axis_conversion, Error, Mat3, Result};

/// Name written to `MANUFACTURER:COMPANY` and `MANUFACTURER:SOFTWARE`.
pub const SOFTWARE_NAME: &str = env!("CARGO_PKG_NAME");

/// What an export wrote.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExportSummary {
    pub labels: usize,
    pub frames: usize,
    pub first_frame: i64,
    pub last_frame: i64,
    pub timecode: bool,
}

/// Export the scene's actions in the configured scope.
pub fn export_scene<W: FrameWriter + ?Sized>(
    scene: &Scene,
    options: &ExportOptions,
    writer: &mut W,
    diag: &mut Diagnostics,
) -> Result<Option<ExportSummary>> {
    let actions = scene.actions_in_scope(options.scope);
    export_actions(&actions, &scene.settings, &scene.metadata, options, writer, diag)
}

/// Export `actions` over the scene frame range.
///
/// Returns `Ok(None)` and records [`Warning::NoAnimatableEntities`] when no
/// action carries a position curve; the writer is not called in that case.
#[tracing::instrument(skip_all, fields(actions = actions.len()))]
pub fn export_actions<W: FrameWriter + ?Sized>(
    actions: &[&Action],
    settings: &SceneSettings,
    metadata: &ParameterSet,
    options: &ExportOptions,
    writer: &mut W,
    diag: &mut Diagnostics,
) -> Result<Option<ExportSummary>> {
    let scene_conv = options.scene_convention;
    let rotation = axis_conversion(scene_conv, options.file_convention()?)?;
    let scale = options.global_scale * options.scene_unit.conversion_to(options.output_unit);

    let range = ExportRange {
        start: options.frame_start.unwrap_or(settings.frame_start),
        end: options.frame_end.unwrap_or(settings.frame_end),
        frame_rate: settings.frame_rate,
        transform: rotation * scale as f32,
        separator: options.actor_separator,
    };
    let Some(frames) = consolidate(actions.iter().copied(), &range)? else {
        diag.push(Warning::NoAnimatableEntities);
        return Ok(None);
    };

    let mut params = ParameterSet::new();
    params.insert_group(point_group(&frames.labels, range.frame_rate, &rotation, options)?);
    params.insert_group(
        ParameterGroup::new("MANUFACTURER", "Software that wrote the file")
            .with(Parameter::string("COMPANY", "", SOFTWARE_NAME))
            .with(Parameter::string("SOFTWARE", "", SOFTWARE_NAME))
            .with(Parameter::string("VERSION_LABEL", "", env!("CARGO_PKG_VERSION"))),
    );

    let mut timecode = false;
    if options.export_timecode {
        match metadata.group("TIMECODE") {
            Some(group) => {
                params.insert_group(group.clone());
                timecode = true;
            }
            None => info!("TIMECODE not found, skipping"),
        }
    }

    writer.write_recording(&frames, &params)?;

    let summary = ExportSummary {
        labels: frames.label_count(),
        frames: frames.frame_count,
        first_frame: frames.first_frame,
        last_frame: frames.last_frame(),
        timecode,
    };
    info!(
        "Exported {} labels over frames {}..={}",
        summary.labels, summary.first_frame, summary.last_frame
    );
    Ok(Some(summary))
}

/// `POINT` group describing the written samples.
///
/// Screen axes are the images of the scene's right and up axes, so reading
/// the file back with inferred orientation restores the scene convention.
fn point_group(labels: &[String], frame_rate: f64, rotation: &Mat3, options: &ExportOptions) -> Result<ParameterGroup> {
    let used = i16::try_from(labels.len())
        .map_err(|_| Error::WriteFailed(format!("{} labels exceed the POINT:USED range", labels.len())))?;
    let conv = options.scene_convention;

    let mut group = ParameterGroup::new("POINT", "3-D point parameters")
        .with(Parameter::int16("USED", "Number of points", used))
        .with(Parameter::strings("LABELS", "Point labels", labels.iter().cloned()))
        .with(Parameter::string("UNITS", "Length unit", options.output_unit.symbol()))
        .with(Parameter::floats("RATE", "Frame rate", &[], vec![frame_rate as f32]));
    if let Some(x) = screen_axis(rotation, conv.right()) {
        group.set(Parameter::string("X_SCREEN", "", x.screen_str()));
    }
    if let Some(y) = screen_axis(rotation, conv.up.vector()) {
        group.set(Parameter::string("Y_SCREEN", "", y.screen_str()));
    }
    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::{location_path, FCurve, Interpolation, Keyframe};
    use crate::core::DenseFrames;
    use crate::options::ExportScope;
    use crate::partition::EntityKey;
    use crate::util::Axis;

    #[derive(Default)]
    struct Capture(Option<(DenseFrames, ParameterSet)>);

    impl FrameWriter for Capture {
        fn write_recording(&mut self, frames: &DenseFrames, parameters: &ParameterSet) -> Result<()> {
            self.0 = Some((frames.clone(), parameters.clone()));
            Ok(())
        }
    }

    fn scene() -> Scene {
        let mut scene = Scene::new();
        scene.settings.frame_start = 1;
        scene.settings.frame_end = 3;
        scene.settings.frame_rate = 100.0;
        let mut a = Action::new("take.Actor1", EntityKey::Actor("Actor1".into()));
        let mut c = FCurve::new(location_path("Hip"), 0, "Hip");
        c.keyframes.push(Keyframe::new(2.0, 0.25, Interpolation::Bezier));
        a.curves.push(c);
        scene.actions.push(a);
        scene
    }

    #[test]
    fn test_export_parameters() {
        let mut out = Capture::default();
        let mut diag = Diagnostics::new();
        let summary = export_scene(&scene(), &ExportOptions::default(), &mut out, &mut diag)
            .unwrap()
            .unwrap();
        assert_eq!(summary.frames, 3);
        assert!(!summary.timecode);

        let (frames, params) = out.0.unwrap();
        // default scene unit m, output mm
        assert!((frames.sample(1, 0)[0] - 250.0).abs() < 1e-3);
        assert_eq!(params.get("POINT", "UNITS").unwrap().as_str(), Some("mm"));
        assert_eq!(params.get("POINT", "USED").unwrap().as_int(), Some(1));
        assert_eq!(params.get("POINT", "X_SCREEN").unwrap().as_str(), Some("+X"));
        assert_eq!(params.get("POINT", "Y_SCREEN").unwrap().as_str(), Some("+Z"));
        assert_eq!(
            params.get("POINT", "LABELS").unwrap().as_strings().unwrap(),
            &["Actor1:Hip".to_string()]
        );
        assert_eq!(params.get("MANUFACTURER", "SOFTWARE").unwrap().as_str(), Some(SOFTWARE_NAME));
    }

    #[test]
    fn test_manual_orientation_screen_axes() {
        let options = ExportOptions {
            use_manual_orientation: true,
            axis_forward: Axis::NegY,
            axis_up: Axis::PosZ,
            ..Default::default()
        };
        let mut out = Capture::default();
        export_scene(&scene(), &options, &mut out, &mut Diagnostics::new()).unwrap();
        let (frames, params) = out.0.unwrap();
        assert_eq!(params.get("POINT", "X_SCREEN").unwrap().as_str(), Some("-X"));
        assert_eq!(params.get("POINT", "Y_SCREEN").unwrap().as_str(), Some("+Z"));
        assert!((frames.sample(1, 0)[0] + 250.0).abs() < 1e-3);
    }

    #[test]
    fn test_timecode_passthrough() {
        let mut s = scene();
        s.metadata
            .insert_group(ParameterGroup::new("TIMECODE", "").with(Parameter::int16("DROP_FRAMES", "", 0)));
        let mut out = Capture::default();
        let summary = export_scene(&s, &ExportOptions::default(), &mut out, &mut Diagnostics::new())
            .unwrap()
            .unwrap();
        assert!(summary.timecode);
        assert!(out.0.unwrap().1.group("TIMECODE").is_some());
    }

    #[test]
    fn test_nothing_selected() {
        let options = ExportOptions {
            scope: ExportScope::Selected,
            ..Default::default()
        };
        let mut out = Capture::default();
        let mut diag = Diagnostics::new();
        assert!(export_scene(&scene(), &options, &mut out, &mut diag).unwrap().is_none());
        assert!(out.0.is_none());
        assert!(diag.any(|w| matches!(w, Warning::NoAnimatableEntities)));
    }
}
