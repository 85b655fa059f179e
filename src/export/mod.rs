//! Keyframe channels to a dense point array.
//!
//! Position curves of every action in scope are gathered into one column per
//! distinct full label; keyframes are sampled at their rounded frame. Cells
//! without a key keep residual `-1`.

use indexmap::IndexMap;
use tracing::debug;

use crate::anim::{location_label, Action};
use crate::core::{inclusive_len, DenseFrames, MAX_FRAME_COUNT, SAMPLE_WIDTH};
use crate::util::{Error, Mat3, Result, Vec3};

/// Frame range and transform of an export.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportRange {
    /// First exported frame.
    pub start: i64,
    /// Last exported frame (inclusive).
    pub end: i64,
    pub frame_rate: f64,
    /// Applied to every position, e.g. axis conversion times unit scale.
    pub transform: Mat3,
    /// Actor prefix separator.
    pub separator: char,
}

impl ExportRange {
    /// Frames in `[start, end]`, `None` when the count overflows.
    pub fn frame_count(&self) -> Option<usize> {
        inclusive_len(self.start, self.end)
    }
}

/// Position curves an action contributes: (full label, array index, curve index).
fn location_curves<'a>(action: &'a Action, separator: char) -> impl Iterator<Item = (String, usize, usize)> + 'a {
    action.curves.iter().enumerate().filter_map(move |(i, c)| {
        let label = location_label(&c.data_path)?;
        let dim = c.array_index as usize;
        (dim < 3).then(|| (action.entity.full_label(label, separator), dim, i))
    })
}

/// Consolidate actions into dense frames.
///
/// Returns `None` when no action carries a position curve. Ranges longer
/// than [`MAX_FRAME_COUNT`] are rejected before anything is allocated.
pub fn consolidate<'a, I>(actions: I, range: &ExportRange) -> Result<Option<DenseFrames>>
where
    I: IntoIterator<Item = &'a Action>,
    I::IntoIter: Clone,
{
    let frame_count = range
        .frame_count()
        .filter(|&n| n <= MAX_FRAME_COUNT)
        .ok_or_else(|| {
            Error::invalid(format!(
                "export range [{}, {}] exceeds {} frames",
                range.start, range.end, MAX_FRAME_COUNT
            ))
        })?;
    let actions = actions.into_iter();

    let mut columns: IndexMap<String, usize> = IndexMap::new();
    for action in actions.clone() {
        for (label, _, _) in location_curves(action, range.separator) {
            let next = columns.len();
            columns.entry(label).or_insert(next);
        }
    }
    if columns.is_empty() {
        return Ok(None);
    }
    if frame_count
        .checked_mul(columns.len())
        .and_then(|n| n.checked_mul(SAMPLE_WIDTH))
        .is_none()
    {
        return Err(Error::invalid(format!(
            "{} labels over {} frames do not fit in memory",
            columns.len(),
            frame_count
        )));
    }

    let labels: Vec<String> = columns.keys().cloned().collect();
    let mut frames = DenseFrames::invalid(range.frame_rate, range.start, labels, frame_count);

    let mut written = 0usize;
    for action in actions {
        for (label, dim, curve) in location_curves(action, range.separator) {
            let col = columns[&label];
            for key in &action.curves[curve].keyframes {
                let f = (key.time as f64).round() - range.start as f64;
                if !(0.0..frame_count as f64).contains(&f) {
                    continue;
                }
                let sample = frames.sample_mut(f as usize, col);
                sample[dim] = key.value;
                sample[3] = 0.0;
                written += 1;
            }
        }
    }

    for sample in frames.data.chunks_exact_mut(SAMPLE_WIDTH) {
        let p = range.transform * Vec3::new(sample[0], sample[1], sample[2]);
        sample[..3].copy_from_slice(&p.to_array());
    }

    debug!(
        "Consolidated {} labels over {} frames ({} keys in range)",
        frames.label_count(),
        frame_count,
        written
    );
    Ok(Some(frames))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::{location_path, residual_path, FCurve, Interpolation, Keyframe};
    use crate::partition::EntityKey;

    fn range(start: i64, end: i64) -> ExportRange {
        ExportRange {
            start,
            end,
            frame_rate: 100.0,
            transform: Mat3::IDENTITY,
            separator: ':',
        }
    }

    fn curve(label: &str, dim: u8, keys: &[(f32, f32)]) -> FCurve {
        let mut c = FCurve::new(location_path(label), dim, label);
        c.keyframes = keys
            .iter()
            .map(|&(t, v)| Keyframe::new(t, v, Interpolation::Bezier))
            .collect();
        c
    }

    #[test]
    fn test_columns_and_defaults() {
        let mut actor = Action::new("a.Actor1", EntityKey::Actor("Actor1".into()));
        actor.curves.push(curve("Hip", 0, &[(1.0, 5.0), (2.0, 6.0)]));
        actor.curves.push(curve("Hip", 1, &[(1.0, 7.0)]));
        let mut free = Action::new("a.UNLABELED", EntityKey::Unlabeled);
        free.curves.push(curve("Head", 2, &[(3.0, 1.5)]));
        let mut residual = FCurve::new(residual_path("Head"), 0, "Head");
        residual.keyframes.push(Keyframe::new(1.0, 9.0, Interpolation::Constant));
        free.curves.push(residual);

        let frames = consolidate([&actor, &free], &range(1, 3)).unwrap().unwrap();
        assert_eq!(frames.labels, vec!["Actor1:Hip", "Head"]);
        assert_eq!(frames.frame_count, 3);
        assert_eq!(&frames.sample(0, 0)[..4], &[5.0, 7.0, 0.0, 0.0]);
        assert_eq!(frames.sample(1, 0)[3], 0.0);
        assert_eq!(frames.sample(2, 0)[3], -1.0);
        assert_eq!(frames.sample(2, 1)[2], 1.5);
        assert_eq!(frames.sample(0, 1)[3], -1.0);
    }

    #[test]
    fn test_range_clipping_and_rounding() {
        let mut a = Action::new("a", EntityKey::Unlabeled);
        a.curves.push(curve("Hip", 0, &[(0.0, 1.0), (1.6, 2.0), (10.0, 3.0)]));
        let frames = consolidate([&a], &range(1, 3)).unwrap().unwrap();
        assert_eq!(frames.sample(0, 0)[3], -1.0);
        assert_eq!(frames.sample(1, 0)[0], 2.0);
        assert_eq!(frames.sample(2, 0)[3], -1.0);
    }

    #[test]
    fn test_transform_applied() {
        let mut a = Action::new("a", EntityKey::Unlabeled);
        a.curves.push(curve("Hip", 0, &[(0.0, 0.5)]));
        let r = ExportRange {
            transform: Mat3::from_diagonal(Vec3::splat(1000.0)),
            ..range(0, 0)
        };
        let frames = consolidate([&a], &r).unwrap().unwrap();
        assert_eq!(frames.sample(0, 0)[0], 500.0);
    }

    #[test]
    fn test_nothing_animatable() {
        let a = Action::new("a", EntityKey::Unlabeled);
        assert!(consolidate([&a], &range(0, 10)).unwrap().is_none());
        assert!(consolidate(Vec::<&Action>::new(), &range(0, 10)).unwrap().is_none());
    }

    #[test]
    fn test_far_key_times_skipped() {
        let mut a = Action::new("a", EntityKey::Unlabeled);
        a.curves.push(curve("Hip", 0, &[(1.0e30, 9.0), (0.0, 4.0), (-1.0e30, 8.0), (f32::NAN, 7.0)]));
        let frames = consolidate([&a], &range(-1, 3)).unwrap().unwrap();
        assert_eq!(frames.frame_count, 5);
        assert_eq!(frames.sample(1, 0)[0], 4.0);
        let written = (0..5).filter(|&f| frames.sample(f, 0)[3] == 0.0).count();
        assert_eq!(written, 1);
    }

    #[test]
    fn test_oversized_range_rejected() {
        let mut a = Action::new("a", EntityKey::Unlabeled);
        a.curves.push(curve("Hip", 0, &[(0.0, 1.0)]));
        assert_eq!(range(i64::MIN, i64::MAX).frame_count(), None);
        assert!(matches!(
            consolidate([&a], &range(i64::MIN, 3)),
            Err(Error::InvalidStructure(_))
        ));
        assert!(matches!(
            consolidate([&a], &range(0, MAX_FRAME_COUNT as i64)),
            Err(Error::InvalidStructure(_))
        ));
        assert_eq!(range(5, 4).frame_count(), Some(0));
    }
}
