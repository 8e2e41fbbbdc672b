use crate::error::CutError;
use crate::polygon::{dot, norm, scale};

/// A cutting plane `normal · x = offset` with a unit normal.
///
/// The half-space with negative signed distance is the reference side ("below");
/// the normal points from the reference fluid towards the other fluid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    normal: [f64; 3],
    offset: f64,
}

impl Plane {
    /// Creates a plane from a normal (normalized here) and the offset along the unit normal.
    pub fn new(normal: [f64; 3], offset: f64) -> Result<Self, CutError> {
        Ok(Self {
            normal: unit_normal(normal)?,
            offset,
        })
    }

    /// Creates the plane through `point` with the given normal.
    pub fn from_point_normal(point: [f64; 3], normal: [f64; 3]) -> Result<Self, CutError> {
        let normal = unit_normal(normal)?;
        Ok(Self {
            normal,
            offset: dot(normal, point),
        })
    }

    /// Same normal, different offset. The normal is already unit length.
    #[inline]
    pub(crate) fn with_offset(&self, offset: f64) -> Self {
        Self {
            normal: self.normal,
            offset,
        }
    }

    #[inline]
    pub fn normal(&self) -> [f64; 3] {
        self.normal
    }

    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Point of the plane closest to the origin.
    pub fn point(&self) -> [f64; 3] {
        scale(self.normal, self.offset)
    }

    /// Signed distance of `p`: negative below the plane, positive above.
    #[inline]
    pub fn signed_distance(&self, p: [f64; 3]) -> f64 {
        dot(self.normal, p) - self.offset
    }

    /// The complementary plane: same surface, reference side swapped.
    pub fn flipped(&self) -> Self {
        Self {
            normal: scale(self.normal, -1.0),
            offset: -self.offset,
        }
    }
}

pub(crate) fn unit_normal(normal: [f64; 3]) -> Result<[f64; 3], CutError> {
    let len = norm(normal);
    if !(len > f64::MIN_POSITIVE) || !len.is_finite() {
        return Err(CutError::DegenerateNormal);
    }
    Ok(scale(normal, 1.0 / len))
}
