//! Recoverable conditions collected during import and export.
//!
//! Warnings never interrupt control flow; they are logged when recorded and
//! surfaced to the caller in aggregate.

use serde::Serialize;
use std::fmt;

use crate::util::LengthUnit;

/// Why an entity produced no output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// Every label was removed by the selection masks.
    NoLabels,
    /// Labels were retained but none had a valid sample.
    NoKeyframes,
}

/// A recoverable condition.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Section unit unknown; a default unit was assumed.
    UnitAssumed {
        section: String,
        assumed: LengthUnit,
        reason: String,
    },
    /// Screen axis parameters missing or unusable; default orientation used.
    OrientationNotParsed { section: String },
    /// Entity skipped.
    EmptyEntity { entity: String, reason: EmptyReason },
    /// Single event skipped.
    MalformedEvent { index: usize, reason: String },
    /// All-zero terminal frame excluded from the frame range.
    TrailingFrameDropped { frame: i64 },
    /// Frames declared in the header but never delivered by the stream.
    MissingFrames { count: usize },
    /// Export scope contained nothing animatable.
    NoAnimatableEntities,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnitAssumed { section, assumed, reason } => write!(
                f,
                "unit of {} data unknown ({}), assuming {}",
                section, reason, assumed
            ),
            Self::OrientationNotParsed { section } => write!(
                f,
                "unable to parse X/Y_SCREEN information for {} data, manual adjustment to orientation may be necessary",
                section
            ),
            Self::EmptyEntity { entity, reason: EmptyReason::NoLabels } => {
                write!(f, "all POINT data was culled for entity '{}'", entity)
            }
            Self::EmptyEntity { entity, reason: EmptyReason::NoKeyframes } => {
                write!(f, "no valid POINT data for entity '{}'", entity)
            }
            Self::MalformedEvent { index, reason } => {
                write!(f, "skipped event {}: {}", index, reason)
            }
            Self::TrailingFrameDropped { frame } => {
                write!(f, "terminal frame {} is all zero and was excluded", frame)
            }
            Self::MissingFrames { count } => {
                write!(f, "{} declared frames were not present in the stream", count)
            }
            Self::NoAnimatableEntities => write!(f, "no animatable entities found for export"),
        }
    }
}

/// Warning accumulator.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning.
    pub fn push(&mut self, warning: Warning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Merge warnings recorded elsewhere (already logged).
    pub fn extend(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.warnings.iter()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Check if any warning matches a predicate.
    pub fn any(&self, pred: impl Fn(&Warning) -> bool) -> bool {
        self.warnings.iter().any(pred)
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.warnings
    }
}
