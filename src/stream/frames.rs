use crate::util::Vec3;

/// Columnar samples of one entity.
///
/// Positions are laid out `[frame][dim][label]` so each label/dimension
/// curve is a strided read; validity and residual are `[frame][label]`.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityFrames {
    labels: Vec<String>,
    first_frame: i64,
    frame_count: usize,
    positions: Vec<f32>,
    valid: Vec<bool>,
    residuals: Vec<f32>,
}

impl EntityFrames {
    /// Every sample starts invalid with residual `-1`.
    pub fn new(labels: Vec<String>, first_frame: i64, frame_count: usize) -> Self {
        let n = labels.len();
        Self {
            labels,
            first_frame,
            frame_count,
            positions: vec![0.0; frame_count * 3 * n],
            valid: vec![false; frame_count * n],
            residuals: vec![-1.0; frame_count * n],
        }
    }

    #[inline]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[inline]
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    #[inline]
    pub fn first_frame(&self) -> i64 {
        self.first_frame
    }

    /// Absolute frame index of a relative frame.
    #[inline]
    pub fn frame_index(&self, frame: usize) -> i64 {
        self.first_frame + frame as i64
    }

    #[inline]
    pub fn component(&self, frame: usize, dim: usize, label: usize) -> f32 {
        self.positions[(frame * 3 + dim) * self.labels.len() + label]
    }

    pub fn position(&self, frame: usize, label: usize) -> Vec3 {
        Vec3::new(
            self.component(frame, 0, label),
            self.component(frame, 1, label),
            self.component(frame, 2, label),
        )
    }

    #[inline]
    pub fn is_valid(&self, frame: usize, label: usize) -> bool {
        self.valid[frame * self.labels.len() + label]
    }

    #[inline]
    pub fn residual(&self, frame: usize, label: usize) -> f32 {
        self.residuals[frame * self.labels.len() + label]
    }

    /// Number of valid samples for a label.
    pub fn valid_count(&self, label: usize) -> usize {
        (0..self.frame_count).filter(|&f| self.is_valid(f, label)).count()
    }

    pub(crate) fn store(&mut self, frame: usize, label: usize, p: Vec3, residual: f32, valid: bool) {
        let n = self.labels.len();
        for (dim, v) in p.to_array().into_iter().enumerate() {
            self.positions[(frame * 3 + dim) * n + label] = v;
        }
        self.valid[frame * n + label] = valid;
        self.residuals[frame * n + label] = residual;
    }

    /// Keep only the first `frame_count` frames.
    pub fn truncate(&mut self, frame_count: usize) {
        if frame_count >= self.frame_count {
            return;
        }
        let n = self.labels.len();
        self.frame_count = frame_count;
        self.positions.truncate(frame_count * 3 * n);
        self.valid.truncate(frame_count * n);
        self.residuals.truncate(frame_count * n);
    }
}
