/// Generic bounding box for N-dimensional space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox<const D: usize> {
    pub min: [f64; D],
    pub max: [f64; D],
}

impl<const D: usize> BoundingBox<D> {
    pub fn new(min: [f64; D], max: [f64; D]) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point of a flat `[x, y, z, x, y, z, ...]` buffer.
    ///
    /// Returns `None` for an empty buffer.
    pub fn from_flat(coords: &[f64]) -> Option<Self> {
        if coords.len() < D {
            return None;
        }
        let mut min = [f64::INFINITY; D];
        let mut max = [f64::NEG_INFINITY; D];
        for point in coords.chunks_exact(D) {
            for k in 0..D {
                min[k] = min[k].min(point[k]);
                max[k] = max[k].max(point[k]);
            }
        }
        Some(Self { min, max })
    }

    /// Length of the box diagonal.
    pub fn diagonal(&self) -> f64 {
        let mut d2 = 0.0;
        for k in 0..D {
            let e = self.max[k] - self.min[k];
            d2 += e * e;
        }
        d2.sqrt()
    }
}
