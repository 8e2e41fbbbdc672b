use crate::plane::Plane;
use crate::polygon::{distance, lerp};

/// A segment on the cutting plane, oriented for the interface polygon.
pub type Segment = [[f64; 3]; 2];

/// Where a face lies relative to the cutting plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceStatus {
    /// No vertex strictly above the plane: the whole face is kept.
    Below,
    /// Vertices strictly on both sides.
    Cut,
    /// No vertex strictly below the plane: nothing is kept.
    Above,
}

/// Result of cutting one face.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceCut {
    pub status: FaceStatus,
    /// Part of the face on the reference side, in the input orientation. Empty if
    /// nothing (or only a degenerate sliver) is kept.
    pub points: Vec<[f64; 3]>,
    /// Pieces of the face boundary lying on the plane, reversed with respect to
    /// the face loop. Convex faces produce at most one. A segment may be shorter
    /// than the merge tolerance.
    pub segments: Vec<Segment>,
}

impl FaceCut {
    fn discarded() -> Self {
        FaceCut {
            status: FaceStatus::Above,
            points: Vec::new(),
            segments: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The plane-crossing edge of a convex face.
    pub fn segment(&self) -> Option<Segment> {
        self.segments.first().copied()
    }
}

#[derive(Clone, Copy, Debug)]
enum Crossing {
    Exit([f64; 3]),
    Entry([f64; 3]),
}

/// Cuts planar polygons by a plane, keeping the part below it.
///
/// Tolerances are absolute lengths; `CellCutter` scales them to the cell size.
#[derive(Clone, Copy, Debug)]
pub struct FaceCutter {
    plane_tolerance: f64,
    merge_tolerance: f64,
}

impl FaceCutter {
    pub fn new(plane_tolerance: f64, merge_tolerance: f64) -> Self {
        Self {
            plane_tolerance,
            merge_tolerance,
        }
    }

    pub fn cut(&self, face: &[[f64; 3]], plane: &Plane) -> FaceCut {
        let n = face.len();
        if n < 3 {
            return FaceCut::discarded();
        }

        // -1 below, 0 on, +1 above
        let mut dists = Vec::with_capacity(n);
        let mut sides = Vec::with_capacity(n);
        let mut has_below = false;
        let mut has_above = false;
        for &p in face {
            let d = plane.signed_distance(p);
            let side = if d > self.plane_tolerance {
                has_above = true;
                1i8
            } else if d < -self.plane_tolerance {
                has_below = true;
                -1i8
            } else {
                0i8
            };
            dists.push(d);
            sides.push(side);
        }

        if !has_below {
            return FaceCut::discarded();
        }

        if !has_above {
            // Kept whole. An edge lying in the plane still bounds the interface.
            let mut segments = Vec::new();
            for i in 0..n {
                let j = (i + 1) % n;
                if sides[i] == 0 && sides[j] == 0 {
                    segments.push([face[j], face[i]]);
                }
            }
            return FaceCut {
                status: FaceStatus::Below,
                points: face.to_vec(),
                segments,
            };
        }

        let mut points = Vec::with_capacity(n + 2);
        let mut crossings = Vec::with_capacity(2);

        for i in 0..n {
            let j = (i + 1) % n;
            let (s_i, s_j) = (sides[i], sides[j]);

            if s_i <= 0 {
                points.push(face[i]);
            }

            match (s_i, s_j) {
                (-1, 1) | (1, -1) => {
                    let t = (dists[i] / (dists[i] - dists[j])).clamp(0.0, 1.0);
                    let x = lerp(face[i], face[j], t);
                    points.push(x);
                    crossings.push(if s_i < 0 { Crossing::Exit(x) } else { Crossing::Entry(x) });
                }
                (0, 1) => crossings.push(Crossing::Exit(face[i])),
                (1, 0) => crossings.push(Crossing::Entry(face[j])),
                _ => {}
            }
        }

        let points = self.merge_points(points);

        // Each exit is closed by the next entry along the loop. Short segments
        // are kept: the neighbouring face shares their end points, and the loop
        // assembly collapses them consistently for both.
        let m = crossings.len();
        let mut segments = Vec::with_capacity(m / 2);
        for k in 0..m {
            if let Crossing::Exit(exit) = crossings[k] {
                if let Crossing::Entry(entry) = crossings[(k + 1) % m] {
                    segments.push([entry, exit]);
                }
            }
        }

        FaceCut {
            status: FaceStatus::Cut,
            points,
            segments,
        }
    }

    /// Drops consecutive points closer than the merge tolerance, wrapping around.
    fn merge_points(&self, points: Vec<[f64; 3]>) -> Vec<[f64; 3]> {
        let mut merged: Vec<[f64; 3]> = Vec::with_capacity(points.len());
        for p in points {
            match merged.last() {
                Some(&last) if distance(last, p) <= self.merge_tolerance => {}
                _ => merged.push(p),
            }
        }
        while merged.len() > 1 && distance(merged[0], merged[merged.len() - 1]) <= self.merge_tolerance {
            merged.pop();
        }
        if merged.len() < 3 {
            merged.clear();
        }
        merged
    }
}
