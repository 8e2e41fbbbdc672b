use crate::bounds::BoundingBox;
use crate::cell_cutter::{CellCutter, SubCell};
use crate::config::Tolerances;
use crate::plane::Plane;
use crate::polyhedron::Polyhedron;
use wasm_bindgen::prelude::*;
use js_sys::{Array, Float64Array};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

#[wasm_bindgen(typescript_custom_section)]
const TS_CONSTANTS_STATUS: &'static str = r#"
export const STATUS_FULLY_BELOW = -1;
export const STATUS_CUT = 0;
export const STATUS_FULLY_ABOVE = 1;
"#;

// --- Cell ---

/// WASM wrapper for a polyhedral cell and the cutter applied to it.
#[wasm_bindgen]
#[derive(Clone)]
pub struct Cell3D {
    inner: Polyhedron,
    cutter: CellCutter,
}

#[wasm_bindgen]
impl Cell3D {
    /// Creates a cell from flat vertices, per-face vertex counts and flattened face indices.
    #[wasm_bindgen(constructor)]
    pub fn new(vertices: Vec<f64>, face_counts: Vec<u32>, face_indices: Vec<u32>) -> Result<Cell3D, JsError> {
        Ok(Cell3D {
            inner: Polyhedron::new(vertices, face_counts, face_indices)?,
            cutter: CellCutter::default(),
        })
    }

    #[wasm_bindgen(js_name = fromBox)]
    pub fn from_box(min_x: f64, min_y: f64, min_z: f64, max_x: f64, max_y: f64, max_z: f64) -> Cell3D {
        Cell3D {
            inner: Polyhedron::from_bounds(BoundingBox::new([min_x, min_y, min_z], [max_x, max_y, max_z])),
            cutter: CellCutter::default(),
        }
    }

    /// Replaces the tolerances used for cutting and solving.
    #[wasm_bindgen(js_name = setTolerances)]
    pub fn set_tolerances(&mut self, plane: f64, merge: f64, fraction: f64, max_iterations: usize) {
        self.cutter = CellCutter::new(
            Tolerances::default()
                .with_plane(plane)
                .with_merge(merge)
                .with_fraction(fraction)
                .with_max_iterations(max_iterations),
        );
    }

    #[wasm_bindgen(getter)]
    pub fn volume(&self) -> f64 {
        self.inner.volume()
    }

    #[wasm_bindgen(getter)]
    pub fn centroid(&self) -> Vec<f64> {
        self.inner.centroid().to_vec()
    }

    /// Flat array of vertices [x, y, z, x, y, z, ...].
    #[wasm_bindgen(getter)]
    pub fn vertices(&self) -> Vec<f64> {
        self.inner.vertices().to_vec()
    }

    /// Cuts the cell by the plane `n · x = offset` and returns the part below it.
    pub fn cut(&self, nx: f64, ny: f64, nz: f64, offset: f64) -> Result<SubCell3D, JsError> {
        let plane = Plane::new([nx, ny, nz], offset)?;
        let sub_cell = self.cutter.calc_sub_cell(&self.inner, &plane)?;
        Ok(SubCell3D::from(&sub_cell))
    }

    /// Offset of the plane with normal `n` leaving fraction `alpha` of the cell below it.
    ///
    /// Throws if the solve does not converge within the iteration cap.
    #[wasm_bindgen(js_name = findSignedDistance)]
    pub fn find_signed_distance(&self, nx: f64, ny: f64, nz: f64, alpha: f64) -> Result<f64, JsError> {
        let solution = self
            .cutter
            .find_signed_distance(&self.inner, [nx, ny, nz], alpha)?
            .into_result()?;
        Ok(solution.offset())
    }
}

// --- Sub-cell ---

/// Snapshot of a cut, with every derived quantity evaluated.
#[wasm_bindgen]
#[derive(Clone, Debug)]
pub struct SubCell3D {
    status: i32,
    volume: f64,
    centroid: [f64; 3],
    fraction: f64,
    interface_points: Vec<f64>,
    interface_loops: Vec<Vec<f64>>,
    interface_centre: Option<[f64; 3]>,
    interface_area: [f64; 3],
    cut_faces: Vec<Vec<f64>>,
    fully_submerged: Vec<u32>,
}

impl From<&SubCell<'_>> for SubCell3D {
    fn from(sub_cell: &SubCell<'_>) -> Self {
        SubCell3D {
            status: sub_cell.status().label(),
            volume: sub_cell.sub_cell_volume(),
            centroid: sub_cell.sub_cell_centre(),
            fraction: sub_cell.volume_fraction(),
            interface_points: sub_cell.interface_points().iter().flatten().copied().collect(),
            interface_loops: sub_cell
                .interface_loops()
                .iter()
                .map(|l| l.iter().flatten().copied().collect())
                .collect(),
            interface_centre: sub_cell.interface_centre(),
            interface_area: sub_cell.interface_area(),
            cut_faces: sub_cell
                .cut_faces()
                .iter()
                .map(|f| f.points.iter().flatten().copied().collect())
                .collect(),
            fully_submerged: sub_cell.fully_submerged_faces().iter().map(|&l| l as u32).collect(),
        }
    }
}

#[wasm_bindgen]
impl SubCell3D {
    /// -1 fully below, 0 cut, +1 fully above.
    #[wasm_bindgen(getter)]
    pub fn status(&self) -> i32 {
        self.status
    }

    #[wasm_bindgen(getter)]
    pub fn volume(&self) -> f64 {
        self.volume
    }

    #[wasm_bindgen(getter)]
    pub fn centroid(&self) -> Vec<f64> {
        self.centroid.to_vec()
    }

    #[wasm_bindgen(getter)]
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Flat interface polygon [x, y, z, ...]; empty unless cut. The first patch for non-convex cells.
    #[wasm_bindgen(getter, js_name = interfacePoints)]
    pub fn interface_points(&self) -> Vec<f64> {
        self.interface_points.clone()
    }

    /// Interface centroid, or `undefined` unless cut.
    #[wasm_bindgen(getter, js_name = interfaceCentre)]
    pub fn interface_centre(&self) -> Option<Vec<f64>> {
        self.interface_centre.map(|c| c.to_vec())
    }

    #[wasm_bindgen(getter, js_name = interfaceArea)]
    pub fn interface_area(&self) -> Vec<f64> {
        self.interface_area.to_vec()
    }

    #[wasm_bindgen(getter, js_name = fullySubmergedFaces)]
    pub fn fully_submerged_faces(&self) -> Vec<u32> {
        self.fully_submerged.clone()
    }

    #[wasm_bindgen(js_name = cutFaces)]
    pub fn wasm_cut_faces(&self) -> Array {
        nested_array(&self.cut_faces)
    }

    /// Every interface patch as a flat [x, y, z, ...] array.
    #[wasm_bindgen(js_name = interfaceLoops)]
    pub fn wasm_interface_loops(&self) -> Array {
        nested_array(&self.interface_loops)
    }
}

// Workaround for the fact that wasm-bindgen does not support nested vectors directly
fn nested_array(rows: &[Vec<f64>]) -> Array {
    let result = Array::new_with_length(rows.len() as u32);
    for (i, row) in rows.iter().enumerate() {
        result.set(i as u32, Float64Array::from(&row[..]).into());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell3d_cut_snapshot() {
        let cell = Cell3D::from_box(0.0, 0.0, 0.0, 2.0, 1.0, 1.0);
        assert!((cell.volume() - 2.0).abs() < 1e-12);

        let Ok(sub) = cell.cut(1.0, 0.0, 0.0, 0.5) else {
            panic!("cut failed");
        };
        assert_eq!(sub.status(), 0);
        assert!((sub.volume() - 0.5).abs() < 1e-12);
        assert!((sub.fraction() - 0.25).abs() < 1e-12);
        assert_eq!(sub.interface_points().len(), 12);
        assert_eq!(sub.interface_loops, vec![sub.interface_points()]);
        let area = sub.interface_area();
        assert!((area[0] - 1.0).abs() < 1e-12 && area[1].abs() < 1e-12 && area[2].abs() < 1e-12);
        assert_eq!(sub.fully_submerged_faces(), vec![4]);
        assert!(sub.interface_centre().is_some());
    }

    #[test]
    fn test_cell3d_signed_distance() {
        let cell = Cell3D::from_box(0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        let Ok(offset) = cell.find_signed_distance(0.0, 1.0, 0.0, 0.75) else {
            panic!("solve failed");
        };
        assert!((offset - 0.75).abs() < 1e-7);
    }
}
