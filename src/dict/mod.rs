//! Parameter dictionary accessor.
//!
//! Interprets the typed parameter groups of an opened recording: spatial
//! units, screen axis conventions, point labels, vendor label masks and
//! events.
//!
//! ## Example
//!
//! ```ignore
//! use c3d_anim::dict::ParameterDictionary;
//! use c3d_anim::util::{Axis, LengthUnit};
//!
//! let dict = ParameterDictionary::new(source.parameters(), source.info());
//! let scale = dict.unit_conversion("POINT", LengthUnit::Meter)?;
//! let (orient, parsed) = dict.axis_interpretation(Axis::PosY, Axis::PosZ);
//! ```

mod labels;
mod label_mask;

pub use labels::make_labels_unique;
pub use label_mask::{LabelMaskRule, LabelMaskRules, LabelPattern};

use crate::core::{Diagnostics, LabelMask, ParameterSet, RecordingInfo, Warning};
use crate::events::{Event, EventRecord, MalformedEvent};
use crate::util::{Axis, AxisConvention, Error, LengthUnit, Mat3, Result, Vec3};

/// Unit assumed when a section does not declare a usable one.
pub const ASSUMED_UNIT: LengthUnit = LengthUnit::Millimeter;

/// Screen axes assumed when X/Y_SCREEN are unusable.
pub const DEFAULT_SCREEN_AXES: (Axis, Axis) = (Axis::PosX, Axis::PosZ);

/// Read-only view over the parameter groups of one recording.
#[derive(Clone, Copy, Debug)]
pub struct ParameterDictionary<'a> {
    params: &'a ParameterSet,
    info: RecordingInfo,
}

impl<'a> ParameterDictionary<'a> {
    pub fn new(params: &'a ParameterSet, info: RecordingInfo) -> Self {
        Self { params, info }
    }

    /// Underlying parameters.
    pub fn parameters(&self) -> &'a ParameterSet {
        self.params
    }

    /// Header metadata.
    pub fn info(&self) -> &RecordingInfo {
        &self.info
    }

    pub fn frame_rate(&self) -> f64 {
        self.info.frame_rate
    }

    pub fn first_frame(&self) -> i64 {
        self.info.first_frame
    }

    pub fn last_frame(&self) -> i64 {
        self.info.last_frame
    }

    /// Software that produced the recording (`MANUFACTURER:SOFTWARE`, falling back to `COMPANY`).
    pub fn software(&self) -> Option<&'a str> {
        self.params
            .get("MANUFACTURER", "SOFTWARE")
            .or_else(|| self.params.get("MANUFACTURER", "COMPANY"))
            .and_then(|p| p.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Declared length unit of a data section (`<section>:UNITS`).
    pub fn section_unit(&self, section: &str) -> Result<LengthUnit> {
        let param = self
            .params
            .get(section, "UNITS")
            .ok_or_else(|| Error::unit(section, "no UNITS parameter"))?;
        let text = param
            .as_str()
            .ok_or_else(|| Error::parameter(section, "UNITS", format!("{}, not a string", param.value.type_name())))?;
        text.parse::<LengthUnit>()
            .map_err(|_| Error::unit(section, format!("unrecognised unit '{}'", text)))
    }

    /// Factor converting the section's native length unit into `target`.
    pub fn unit_conversion(&self, section: &str, target: LengthUnit) -> Result<f64> {
        Ok(self.section_unit(section)?.conversion_to(target))
    }

    /// Like [`unit_conversion`](Self::unit_conversion), but assumes millimetres
    /// (recording a warning) when the unit cannot be determined.
    pub fn unit_conversion_or_assume(&self, section: &str, target: LengthUnit, diag: &mut Diagnostics) -> f64 {
        match self.unit_conversion(section, target) {
            Ok(f) => f,
            Err(e) => {
                let reason = match e {
                    Error::Unit { reason, .. } => reason,
                    Error::InvalidParameter { name, reason, .. } => format!("{} is {}", name, reason),
                    other => other.to_string(),
                };
                diag.push(Warning::UnitAssumed {
                    section: section.to_string(),
                    assumed: ASSUMED_UNIT,
                    reason,
                });
                ASSUMED_UNIT.conversion_to(target)
            }
        }
    }

    /// Parse `POINT:X_SCREEN` / `POINT:Y_SCREEN`.
    ///
    /// Returns `None` when either is missing, unparseable or both are parallel.
    pub fn screen_axes(&self, section: &str) -> Option<(Axis, Axis)> {
        let parse = |name: &str| -> Option<Axis> {
            self.params
                .get(section, name)
                .and_then(|p| p.as_str())
                .and_then(|s| s.parse::<Axis>().ok())
        };
        let x = parse("X_SCREEN")?;
        let y = parse("Y_SCREEN")?;
        (!x.is_parallel(y)).then_some((x, y))
    }

    /// Rotation mapping native point axes into the `forward`/`up` convention.
    ///
    /// X_SCREEN maps onto the target right axis, Y_SCREEN onto up and their
    /// cross product onto `-forward` (towards the viewer). The flag is false
    /// when the screen parameters were unusable and the defaults were used.
    pub fn axis_interpretation(&self, forward: Axis, up: Axis) -> (Mat3, bool) {
        let target = AxisConvention::new(forward, up).unwrap_or_default();
        let (parsed, (x_screen, y_screen)) = match self.screen_axes("POINT") {
            Some(axes) => (true, axes),
            None => (false, DEFAULT_SCREEN_AXES),
        };
        let xs = x_screen.vector();
        let ys = y_screen.vector();
        let native = Mat3::from_cols(xs, ys, xs.cross(ys));
        let screen = Mat3::from_cols(target.right(), target.up.vector(), -target.forward.vector());
        (screen * native.transpose(), parsed)
    }

    /// Point labels in storage order.
    ///
    /// Concatenates `LABELS`, `LABELS2`, `LABELS3`, ... and fits the list to
    /// the point channel count; missing entries are named `POINT_<n>`.
    pub fn point_labels(&self) -> Vec<String> {
        let count = self.info.point_count;
        let mut labels: Vec<String> = Vec::with_capacity(count);
        let mut part = 1usize;
        while labels.len() < count {
            let name = if part == 1 { "LABELS".to_string() } else { format!("LABELS{}", part) };
            let Some(strings) = self.params.get("POINT", &name).and_then(|p| p.as_strings()) else {
                break;
            };
            labels.extend(strings.iter().map(|s| s.trim().to_string()));
            part += 1;
        }
        labels.truncate(count);
        while labels.len() < count {
            labels.push(format!("POINT_{}", labels.len() + 1));
        }
        labels
    }

    /// Keep-mask for labels of a section under the given rule set.
    pub fn generate_label_mask<S: AsRef<str>>(&self, labels: &[S], section: &str, rules: &LabelMaskRules) -> LabelMask {
        rules.mask(labels, self.software(), section)
    }

    /// De-duplicate labels (see [`make_labels_unique`]).
    pub fn make_labels_unique<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
        make_labels_unique(labels)
    }

    /// Events declared in the `EVENT` group.
    ///
    /// Each entry either resolves to a native frame and label, or describes
    /// why it could not be read. An absent group yields no entries.
    pub fn events(&self) -> Vec<EventRecord> {
        let Some(group) = self.params.group("EVENT") else {
            return Vec::new();
        };
        let labels = group.get("LABELS").and_then(|p| p.as_strings()).unwrap_or(&[]);
        let contexts = group.get("CONTEXTS").and_then(|p| p.as_strings()).unwrap_or(&[]);
        let times = group.get("TIMES").and_then(|p| p.as_floats()).unwrap_or(&[]);
        let used = group
            .get("USED")
            .and_then(|p| p.as_int())
            .map(|n| n.max(0) as usize)
            .unwrap_or(labels.len());

        (0..used)
            .map(|index| -> EventRecord {
                let malformed = |reason: &str| MalformedEvent {
                    index,
                    reason: reason.to_string(),
                };
                let label = labels
                    .get(index)
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| malformed("missing label"))?;
                let pair = times
                    .get(index * 2..index * 2 + 2)
                    .ok_or_else(|| malformed("missing time"))?;
                let seconds = pair[0] as f64 * 60.0 + pair[1] as f64;
                if !seconds.is_finite() {
                    return Err(malformed("time is not finite"));
                }
                let label = match contexts.get(index).map(|c| c.trim()).filter(|c| !c.is_empty()) {
                    Some(context) => format!("{} {}", context, label),
                    None => label.to_string(),
                };
                Ok(Event {
                    frame: seconds * self.info.frame_rate,
                    label,
                })
            })
            .collect()
    }
}

/// Axis that `orient` maps `target_axis` onto, if axis aligned.
pub(crate) fn screen_axis(orient: &Mat3, target_axis: Vec3) -> Option<Axis> {
    Axis::from_vector((*orient * target_axis).normalize_or_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Parameter, ParameterGroup};
    use approx::assert_relative_eq;

    fn info(points: usize) -> RecordingInfo {
        RecordingInfo {
            frame_rate: 100.0,
            first_frame: 1,
            last_frame: 10,
            point_count: points,
        }
    }

    fn point_group() -> ParameterGroup {
        ParameterGroup::new("POINT", "")
            .with(Parameter::string("UNITS", "", "mm"))
            .with(Parameter::string("X_SCREEN", "", "+X"))
            .with(Parameter::string("Y_SCREEN", "", "+Y"))
            .with(Parameter::strings("LABELS", "", ["LASI ", "RASI"]))
    }

    #[test]
    fn test_unit_conversion() {
        let set: ParameterSet = [point_group()].into_iter().collect();
        let dict = ParameterDictionary::new(&set, info(2));
        assert_relative_eq!(dict.unit_conversion("POINT", LengthUnit::Meter).unwrap(), 0.001);
        assert!(matches!(
            dict.unit_conversion("ANALOG", LengthUnit::Meter),
            Err(Error::Unit { .. })
        ));
    }

    #[test]
    fn test_unit_assumed_with_warning() {
        let set = ParameterSet::new();
        let dict = ParameterDictionary::new(&set, info(0));
        let mut diag = Diagnostics::new();
        let f = dict.unit_conversion_or_assume("POINT", LengthUnit::Meter, &mut diag);
        assert_relative_eq!(f, 0.001);
        assert!(diag.any(|w| matches!(w, Warning::UnitAssumed { .. })));
    }

    #[test]
    fn test_non_string_units_parameter() {
        let group = point_group().with(Parameter::int16("UNITS", "", 3));
        let set: ParameterSet = [group].into_iter().collect();
        let dict = ParameterDictionary::new(&set, info(2));
        assert!(matches!(
            dict.section_unit("POINT"),
            Err(Error::InvalidParameter { ref name, .. }) if name == "UNITS"
        ));

        let mut diag = Diagnostics::new();
        let f = dict.unit_conversion_or_assume("POINT", LengthUnit::Meter, &mut diag);
        assert_relative_eq!(f, 0.001);
        assert!(diag.any(|w| matches!(w, Warning::UnitAssumed { reason, .. } if reason.contains("not a string"))));
    }

    #[test]
    fn test_axis_interpretation_y_up() {
        // Y-up capture volume, viewed along -Z.
        let set: ParameterSet = [point_group()].into_iter().collect();
        let dict = ParameterDictionary::new(&set, info(2));
        let (m, parsed) = dict.axis_interpretation(Axis::PosY, Axis::PosZ);
        assert!(parsed);
        assert!((m * Vec3::Y).abs_diff_eq(Vec3::Z, 1e-6));
        assert!((m * Vec3::X).abs_diff_eq(Vec3::X, 1e-6));
        assert!((m * Vec3::Z).abs_diff_eq(Vec3::NEG_Y, 1e-6));
    }

    #[test]
    fn test_axis_interpretation_default_is_identity_for_z_up() {
        let set = ParameterSet::new();
        let dict = ParameterDictionary::new(&set, info(0));
        let (m, parsed) = dict.axis_interpretation(Axis::PosY, Axis::PosZ);
        assert!(!parsed);
        assert!(m.abs_diff_eq(Mat3::IDENTITY, 1e-6));
    }

    #[test]
    fn test_parallel_screen_axes_rejected() {
        let group = ParameterGroup::new("POINT", "")
            .with(Parameter::string("X_SCREEN", "", "+X"))
            .with(Parameter::string("Y_SCREEN", "", "-X"));
        let set: ParameterSet = [group].into_iter().collect();
        let dict = ParameterDictionary::new(&set, info(0));
        assert!(dict.screen_axes("POINT").is_none());
    }

    #[test]
    fn test_point_labels_continuation_and_padding() {
        let group = point_group().with(Parameter::strings("LABELS2", "", ["LPSI"]));
        let set: ParameterSet = [group].into_iter().collect();
        let labels = ParameterDictionary::new(&set, info(4)).point_labels();
        assert_eq!(labels, vec!["LASI", "RASI", "LPSI", "POINT_4"]);

        let labels = ParameterDictionary::new(&set, info(1)).point_labels();
        assert_eq!(labels, vec!["LASI"]);
    }

    #[test]
    fn test_events() {
        let event = ParameterGroup::new("EVENT", "")
            .with(Parameter::int16("USED", "", 3))
            .with(Parameter::floats("TIMES", "", &[2, 2], vec![0.0, 0.5, 1.0, 0.25]))
            .with(Parameter::strings("LABELS", "", ["Foot Strike", "Foot Off", "Extra"]))
            .with(Parameter::strings("CONTEXTS", "", ["Left", ""]));
        let set: ParameterSet = [event].into_iter().collect();
        let events = ParameterDictionary::new(&set, info(0)).events();
        assert_eq!(events.len(), 3);

        let first = events[0].as_ref().unwrap();
        assert_relative_eq!(first.frame, 50.0);
        assert_eq!(first.label, "Left Foot Strike");

        let second = events[1].as_ref().unwrap();
        assert_relative_eq!(second.frame, 6025.0);
        assert_eq!(second.label, "Foot Off");

        let third = events[2].as_ref().unwrap_err();
        assert_eq!(third.index, 2);
    }

    #[test]
    fn test_software_lookup() {
        let mfr = ParameterGroup::new("MANUFACTURER", "").with(Parameter::string("COMPANY", "", "Vicon"));
        let set: ParameterSet = [mfr].into_iter().collect();
        assert_eq!(ParameterDictionary::new(&set, info(0)).software(), Some("Vicon"));
    }
}
