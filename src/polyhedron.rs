use crate::bounds::BoundingBox;
use crate::error::CutError;
use crate::polygon::{centre_and_area, cross, dot, mean, sub};

/// A polyhedral control volume with outward-oriented planar faces.
///
/// Vertices are stored flat, faces as counts plus flattened indices, the same
/// layout a mesh hands over per cell. Face loops must be counter-clockwise seen
/// from outside the cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Polyhedron {
    // Flat array of vertices [x, y, z, x, y, z, ...]
    pub(crate) vertices: Vec<f64>,
    // Number of vertices for each face
    pub(crate) face_counts: Vec<u32>,
    // Flattened indices for all faces
    pub(crate) face_indices: Vec<u32>,
}

impl Polyhedron {
    /// Creates a cell from raw buffers, checking that they are consistent.
    pub fn new(
        vertices: Vec<f64>,
        face_counts: Vec<u32>,
        face_indices: Vec<u32>,
    ) -> Result<Self, CutError> {
        if vertices.len() % 3 != 0 {
            return Err(CutError::InvalidCell(format!(
                "vertex buffer length {} is not a multiple of 3",
                vertices.len()
            )));
        }
        if face_counts.len() < 4 {
            return Err(CutError::InvalidCell(format!(
                "a polyhedron needs at least 4 faces, got {}",
                face_counts.len()
            )));
        }
        if let Some(&count) = face_counts.iter().find(|&&c| c < 3) {
            return Err(CutError::InvalidCell(format!(
                "face with {count} vertices"
            )));
        }
        let total: usize = face_counts.iter().map(|&c| c as usize).sum();
        if total != face_indices.len() {
            return Err(CutError::InvalidCell(format!(
                "face counts sum to {total} but {} indices were given",
                face_indices.len()
            )));
        }
        let num_verts = vertices.len() / 3;
        if let Some(&idx) = face_indices.iter().find(|&&i| i as usize >= num_verts) {
            return Err(CutError::InvalidCell(format!(
                "vertex index {idx} out of range for {num_verts} vertices"
            )));
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(CutError::InvalidCell("non-finite vertex coordinate".into()));
        }
        Ok(Self {
            vertices,
            face_counts,
            face_indices,
        })
    }

    /// Creates a cell from a point list and one index loop per face.
    pub fn from_faces(points: &[[f64; 3]], faces: &[Vec<usize>]) -> Result<Self, CutError> {
        let vertices = points.iter().flat_map(|p| p.iter().copied()).collect();
        let face_counts = faces.iter().map(|f| f.len() as u32).collect();
        let face_indices = faces.iter().flatten().map(|&i| i as u32).collect();
        Self::new(vertices, face_counts, face_indices)
    }

    /// The hexahedral cell spanned by an axis-aligned box.
    pub fn from_bounds(bounds: BoundingBox<3>) -> Polyhedron {
        let [min_x, min_y, min_z] = bounds.min;
        let [max_x, max_y, max_z] = bounds.max;
        let vertices: Vec<f64> = vec![
            min_x, min_y, min_z, // 0
            max_x, min_y, min_z, // 1
            max_x, max_y, min_z, // 2
            min_x, max_y, min_z, // 3
            min_x, min_y, max_z, // 4
            max_x, min_y, max_z, // 5
            max_x, max_y, max_z, // 6
            min_x, max_y, max_z, // 7
        ];

        let face_counts: Vec<u32> = vec![4, 4, 4, 4, 4, 4];

        let face_indices: Vec<u32> = vec![
            3, 2, 1, 0, // Bottom (z-)
            4, 5, 6, 7, // Top (z+)
            0, 1, 5, 4, // Front (y-)
            2, 3, 7, 6, // Back (y+)
            0, 4, 7, 3, // Left (x-)
            1, 2, 6, 5, // Right (x+)
        ];

        Polyhedron {
            vertices,
            face_counts,
            face_indices,
        }
    }

    /// Unit cube `[0, 1]^3`.
    pub fn unit_cube() -> Polyhedron {
        Self::from_bounds(BoundingBox::new([0.0; 3], [1.0; 3]))
    }

    /// Tetrahedron through four points; faces are oriented outward whatever the point order.
    pub fn tetrahedron(a: [f64; 3], b: [f64; 3], c: [f64; 3], d: [f64; 3]) -> Result<Self, CutError> {
        let six_v = dot(cross(sub(b, a), sub(c, a)), sub(d, a));
        let (b, c) = if six_v < 0.0 { (b, c) } else { (c, b) };
        // With (a, b, c) now clockwise seen from d, these loops all face outward.
        Self::from_faces(
            &[a, b, c, d],
            &[vec![0, 1, 2], vec![0, 3, 1], vec![1, 3, 2], vec![2, 3, 0]],
        )
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn face_count(&self) -> usize {
        self.face_counts.len()
    }

    #[inline]
    pub fn vertex(&self, index: usize) -> [f64; 3] {
        [
            self.vertices[index * 3],
            self.vertices[index * 3 + 1],
            self.vertices[index * 3 + 2],
        ]
    }

    /// Flat array of vertices [x, y, z, x, y, z, ...].
    pub fn vertices(&self) -> &[f64] {
        &self.vertices
    }

    /// Ordered points of every face.
    pub fn face_points(&self) -> impl Iterator<Item = Vec<[f64; 3]>> + '_ {
        let mut offset = 0;
        self.face_counts.iter().map(move |&count| {
            let count = count as usize;
            let face = self.face_indices[offset..offset + count]
                .iter()
                .map(|&i| self.vertex(i as usize))
                .collect();
            offset += count;
            face
        })
    }

    pub fn bounds(&self) -> BoundingBox<3> {
        BoundingBox::from_flat(&self.vertices)
            .unwrap_or_else(|| BoundingBox::new([0.0; 3], [0.0; 3]))
    }

    /// Characteristic length used to scale tolerances: the bounding-box diagonal.
    pub fn length_scale(&self) -> f64 {
        self.bounds().diagonal()
    }

    /// Minimum and maximum of `normal · x` over the vertices.
    pub fn extent(&self, normal: [f64; 3]) -> (f64, f64) {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for v in self.vertices.chunks_exact(3) {
            let d = v[0] * normal[0] + v[1] * normal[1] + v[2] * normal[2];
            lo = lo.min(d);
            hi = hi.max(d);
        }
        (lo, hi)
    }

    /// Centre and outward area vector of face `face_index`.
    pub fn face_centre_and_area(&self, face_index: usize) -> Option<([f64; 3], [f64; 3])> {
        self.face_points().nth(face_index).map(|f| centre_and_area(&f))
    }

    /// Origin used for the tetrahedral decomposition, keeping the determinants well scaled.
    fn reference_point(&self) -> [f64; 3] {
        if self.vertices.is_empty() {
            return [0.0; 3];
        }
        self.vertex(0)
    }

    pub fn volume(&self) -> f64 {
        let r = self.reference_point();
        let mut volume: f64 = 0.0;
        let mut index_offset: usize = 0;

        for &count in &self.face_counts {
            let count: usize = count as usize;

            // Use the first vertex of the face as a pivot for fan triangulation
            let v0 = sub(self.vertex(self.face_indices[index_offset] as usize), r);

            for i in 1..count - 1 {
                let v1 = sub(self.vertex(self.face_indices[index_offset + i] as usize), r);
                let v2 = sub(self.vertex(self.face_indices[index_offset + i + 1] as usize), r);
                volume += dot(v0, cross(v1, v2));
            }
            index_offset += count;
        }

        volume / 6.0
    }

    pub fn centroid(&self) -> [f64; 3] {
        let r = self.reference_point();
        let mut centroid = [0.0; 3];
        let mut total_volume: f64 = 0.0;
        let mut index_offset: usize = 0;

        for &count in &self.face_counts {
            let count: usize = count as usize;
            let v0 = sub(self.vertex(self.face_indices[index_offset] as usize), r);

            for i in 1..count - 1 {
                let v1 = sub(self.vertex(self.face_indices[index_offset + i] as usize), r);
                let v2 = sub(self.vertex(self.face_indices[index_offset + i + 1] as usize), r);

                let det: f64 = dot(v0, cross(v1, v2));
                total_volume += det;

                for k in 0..3 {
                    centroid[k] += det * (v0[k] + v1[k] + v2[k]);
                }
            }
            index_offset += count;
        }

        if total_volume.abs() < f64::MIN_POSITIVE {
            let points: Vec<[f64; 3]> = (0..self.vertex_count()).map(|i| self.vertex(i)).collect();
            return mean(&points);
        }

        let factor: f64 = 1.0 / (4.0 * total_volume);
        [
            r[0] + centroid[0] * factor,
            r[1] + centroid[1] * factor,
            r[2] + centroid[2] * factor,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::distance;

    #[test]
    fn test_box_metrics() {
        let cell = Polyhedron::from_bounds(BoundingBox::new([0.0, 0.0, 0.0], [10.0, 20.0, 30.0]));
        assert!((cell.volume() - 6000.0).abs() < 1e-9);
        assert!(distance(cell.centroid(), [5.0, 10.0, 15.0]) < 1e-9);
        assert_eq!(cell.face_count(), 6);
        assert_eq!(cell.vertex_count(), 8);
    }

    #[test]
    fn test_box_faces_outward() {
        let cell = Polyhedron::unit_cube();
        let centroid = cell.centroid();
        for i in 0..cell.face_count() {
            let (c, a) = cell.face_centre_and_area(i).unwrap();
            assert!(dot(a, sub(c, centroid)) > 0.0, "face {i} points inward");
            assert!((dot(a, a).sqrt() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_tetrahedron_orientation() {
        let a = [0.0, 0.0, 0.0];
        let b = [1.0, 0.0, 0.0];
        let c = [0.0, 1.0, 0.0];
        let d = [0.0, 0.0, 1.0];
        let t1 = Polyhedron::tetrahedron(a, b, c, d).unwrap();
        let t2 = Polyhedron::tetrahedron(a, c, b, d).unwrap();
        assert!((t1.volume() - 1.0 / 6.0).abs() < 1e-12);
        assert!((t2.volume() - 1.0 / 6.0).abs() < 1e-12);
        assert!(distance(t1.centroid(), [0.25, 0.25, 0.25]) < 1e-12);
    }

    #[test]
    fn test_extent() {
        let cell = Polyhedron::unit_cube();
        let s = 1.0 / 3.0f64.sqrt();
        let (lo, hi) = cell.extent([s, s, s]);
        assert!(lo.abs() < 1e-12);
        assert!((hi - 3.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_buffers() {
        assert!(matches!(
            Polyhedron::new(vec![0.0; 7], vec![3, 3, 3, 3], vec![0; 12]),
            Err(CutError::InvalidCell(_))
        ));
        assert!(matches!(
            Polyhedron::new(vec![0.0; 12], vec![3, 3, 3, 3], vec![0; 11]),
            Err(CutError::InvalidCell(_))
        ));
        assert!(matches!(
            Polyhedron::new(vec![0.0; 12], vec![3, 3, 3, 3], vec![4; 12]),
            Err(CutError::InvalidCell(_))
        ));
        assert!(matches!(
            Polyhedron::new(vec![0.0; 12], vec![3, 3, 2], vec![0; 8]),
            Err(CutError::InvalidCell(_))
        ));
    }
}
