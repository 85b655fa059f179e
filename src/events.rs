//! Recording events to timeline markers.

use serde::{Deserialize, Serialize};

use crate::anim::MarkerSink;
use crate::core::{Diagnostics, Warning};

/// Event decoded from the `EVENT` group, in native frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Native frame, possibly fractional.
    pub frame: f64,
    /// `"<context> <label>"`, or just the label without a context.
    pub label: String,
}

/// Event that could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MalformedEvent {
    pub index: usize,
    pub reason: String,
}

pub type EventRecord = std::result::Result<Event, MalformedEvent>;

/// Insert a marker per event at `round(frame * resample_factor)`.
///
/// Malformed events and events whose marker frame cannot be represented are
/// skipped with a warning. Returns the number of markers inserted.
pub fn translate<M: MarkerSink + ?Sized>(
    events: &[EventRecord],
    resample_factor: f64,
    sink: &mut M,
    diag: &mut Diagnostics,
) -> usize {
    let mut inserted = 0;
    for (index, record) in events.iter().enumerate() {
        match record {
            Ok(event) => {
                let frame = (event.frame * resample_factor).round();
                if !frame.is_finite() || frame < i32::MIN as f64 || frame > i32::MAX as f64 {
                    diag.push(Warning::MalformedEvent {
                        index,
                        reason: format!("marker frame {} out of range", frame),
                    });
                    continue;
                }
                sink.insert_marker(frame as i32, &event.label);
                inserted += 1;
            }
            Err(bad) => diag.push(Warning::MalformedEvent {
                index: bad.index,
                reason: bad.reason.clone(),
            }),
        }
    }
    inserted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Markers(Vec<(i32, String)>);

    impl MarkerSink for Markers {
        fn insert_marker(&mut self, frame: i32, label: &str) {
            self.0.push((frame, label.to_string()));
        }
    }

    fn event(frame: f64, label: &str) -> EventRecord {
        Ok(Event {
            frame,
            label: label.to_string(),
        })
    }

    #[test]
    fn test_resampled_markers() {
        let mut sink = Markers::default();
        let mut diag = Diagnostics::new();
        let events = [event(120.0, "Left Foot Strike"), event(33.0, "Right Foot Off")];
        assert_eq!(translate(&events, 0.5, &mut sink, &mut diag), 2);
        assert_eq!(sink.0[0], (60, "Left Foot Strike".to_string()));
        // 16.5 rounds away from zero.
        assert_eq!(sink.0[1].0, 17);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_malformed_skipped() {
        let mut sink = Markers::default();
        let mut diag = Diagnostics::new();
        let events = [
            Err(MalformedEvent {
                index: 0,
                reason: "missing time".into(),
            }),
            event(f64::INFINITY, "Bad"),
            event(10.0, "Good"),
        ];
        assert_eq!(translate(&events, 1.0, &mut sink, &mut diag), 1);
        assert_eq!(diag.len(), 2);
        assert!(diag.iter().all(|w| matches!(w, Warning::MalformedEvent { .. })));
    }
}
