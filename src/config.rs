//! Numerical tolerances shared by the face cutter, the cell cutter and the
//! signed-distance solver.

/// Default on-plane band, relative to the cell length scale.
pub const DEFAULT_PLANE_TOLERANCE: f64 = 1e-10;
/// Default point-merge distance, relative to the cell length scale.
pub const DEFAULT_MERGE_TOLERANCE: f64 = 1e-10;
/// Default absolute tolerance on an achieved volume fraction.
pub const DEFAULT_FRACTION_TOLERANCE: f64 = 1e-8;
/// Default band below which (or above `1 - band`) a fraction is treated as empty (or full).
pub const DEFAULT_FRACTION_EPSILON: f64 = 1e-8;
/// Default cap on root-find refinement steps.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Tolerances used when cutting cells and solving for plane offsets.
///
/// `plane` and `merge` are relative: they are multiplied by the bounding-box
/// diagonal of the cell being cut, so the same settings work for cells of any size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    /// Vertices with `|n·x - d|` below this (times the cell length scale) lie on the plane.
    pub plane: f64,
    /// Points closer than this (times the cell length scale) are merged.
    pub merge: f64,
    /// Absolute tolerance on the volume fraction reached by the root-find.
    pub fraction: f64,
    /// Fractions within this band of 0 or 1 skip the root-find.
    pub fraction_epsilon: f64,
    /// Maximum number of refinement steps in the root-find.
    pub max_iterations: usize,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            plane: DEFAULT_PLANE_TOLERANCE,
            merge: DEFAULT_MERGE_TOLERANCE,
            fraction: DEFAULT_FRACTION_TOLERANCE,
            fraction_epsilon: DEFAULT_FRACTION_EPSILON,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl Tolerances {
    /// Sets the relative on-plane band.
    pub fn with_plane(mut self, plane: f64) -> Self {
        self.plane = plane;
        self
    }

    /// Sets the relative point-merge distance.
    pub fn with_merge(mut self, merge: f64) -> Self {
        self.merge = merge;
        self
    }

    /// Sets the absolute tolerance on the reached fraction.
    pub fn with_fraction(mut self, fraction: f64) -> Self {
        self.fraction = fraction;
        self
    }

    /// Sets the band of fractions snapped to 0 or 1.
    pub fn with_fraction_epsilon(mut self, fraction_epsilon: f64) -> Self {
        self.fraction_epsilon = fraction_epsilon;
        self
    }

    /// Sets the cap on root-find refinement steps.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Absolute on-plane band and merge distance for a cell of the given length scale.
    #[inline]
    pub(crate) fn scaled(&self, length_scale: f64) -> (f64, f64) {
        let scale = if length_scale > 0.0 { length_scale } else { 1.0 };
        (self.plane * scale, self.merge * scale)
    }
}
