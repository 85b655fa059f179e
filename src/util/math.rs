//! Math type re-exports and axis convention utilities.
//!
//! This module re-exports the glam types used by the pipeline and provides
//! signed axis identifiers plus the forward/up conventions used to build
//! orientation matrices between a capture system and a host scene.

// Re-export glam types
pub use glam::{Mat3, Vec3};

use super::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A signed principal axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    #[serde(rename = "X", alias = "+X")]
    PosX,
    #[serde(rename = "-X")]
    NegX,
    #[serde(rename = "Y", alias = "+Y")]
    PosY,
    #[serde(rename = "-Y")]
    NegY,
    #[serde(rename = "Z", alias = "+Z")]
    PosZ,
    #[serde(rename = "-Z")]
    NegZ,
}

impl Axis {
    pub const ALL: [Axis; 6] = [
        Axis::PosX,
        Axis::NegX,
        Axis::PosY,
        Axis::NegY,
        Axis::PosZ,
        Axis::NegZ,
    ];

    /// Unit vector along this axis.
    #[inline]
    pub fn vector(self) -> Vec3 {
        match self {
            Axis::PosX => Vec3::X,
            Axis::NegX => Vec3::NEG_X,
            Axis::PosY => Vec3::Y,
            Axis::NegY => Vec3::NEG_Y,
            Axis::PosZ => Vec3::Z,
            Axis::NegZ => Vec3::NEG_Z,
        }
    }

    /// Find the axis a vector points along, if it is (numerically) axis aligned.
    pub fn from_vector(v: Vec3) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.vector().abs_diff_eq(v, 1e-4))
    }

    /// Opposite direction.
    pub fn negate(self) -> Self {
        match self {
            Axis::PosX => Axis::NegX,
            Axis::NegX => Axis::PosX,
            Axis::PosY => Axis::NegY,
            Axis::NegY => Axis::PosY,
            Axis::PosZ => Axis::NegZ,
            Axis::NegZ => Axis::PosZ,
        }
    }

    /// Host style identifier (`X`, `-X`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::PosX => "X",
            Axis::NegX => "-X",
            Axis::PosY => "Y",
            Axis::NegY => "-Y",
            Axis::PosZ => "Z",
            Axis::NegZ => "-Z",
        }
    }

    /// Screen parameter style identifier (`+X`, `-X`, ...).
    pub fn screen_str(self) -> &'static str {
        match self {
            Axis::PosX => "+X",
            Axis::NegX => "-X",
            Axis::PosY => "+Y",
            Axis::NegY => "-Y",
            Axis::PosZ => "+Z",
            Axis::NegZ => "-Z",
        }
    }

    /// True if both axes lie on the same line.
    #[inline]
    pub fn is_parallel(self, other: Axis) -> bool {
        self == other || self == other.negate()
    }
}

impl FromStr for Axis {
    type Err = Error;

    /// Accepts `X`, `+x`, ` -Z ` and similar.
    fn from_str(s: &str) -> Result<Self> {
        let t = s.trim().to_ascii_uppercase();
        let (negative, letter) = match t.as_bytes() {
            [b'+', l] => (false, *l),
            [b'-', l] => (true, *l),
            [l] => (false, *l),
            _ => return Err(Error::InvalidAxis(s.to_string())),
        };
        let axis = match letter {
            b'X' => Axis::PosX,
            b'Y' => Axis::PosY,
            b'Z' => Axis::PosZ,
            _ => return Err(Error::InvalidAxis(s.to_string())),
        };
        Ok(if negative { axis.negate() } else { axis })
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinate convention described by a forward and an up axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisConvention {
    pub forward: Axis,
    pub up: Axis,
}

impl AxisConvention {
    /// Host scene convention: forward `Y`, up `Z`.
    pub const SCENE: Self = Self {
        forward: Axis::PosY,
        up: Axis::PosZ,
    };

    /// Create a convention, rejecting parallel forward/up pairs.
    pub fn new(forward: Axis, up: Axis) -> Result<Self> {
        if forward.is_parallel(up) {
            return Err(Error::InvalidAxis(format!(
                "forward {} and up {} are parallel",
                forward, up
            )));
        }
        Ok(Self { forward, up })
    }

    /// Right-hand side axis (`forward x up`).
    #[inline]
    pub fn right(&self) -> Vec3 {
        self.forward.vector().cross(self.up.vector())
    }

    /// Orthonormal basis with columns `[forward, up, forward x up]`.
    pub fn basis(&self) -> Mat3 {
        let f = self.forward.vector();
        let u = self.up.vector();
        Mat3::from_cols(f, u, f.cross(u))
    }
}

impl Default for AxisConvention {
    fn default() -> Self {
        Self::SCENE
    }
}

/// Matrix mapping coordinates expressed in `from` into the `to` convention.
///
/// `from.forward` maps onto `to.forward` and `from.up` onto `to.up`.
pub fn axis_conversion(from: AxisConvention, to: AxisConvention) -> Result<Mat3> {
    let from = AxisConvention::new(from.forward, from.up)?;
    let to = AxisConvention::new(to.forward, to.up)?;
    // Bases are orthonormal, so the inverse is the transpose.
    Ok(to.basis() * from.basis().transpose())
}
