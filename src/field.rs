//! Whole-mesh operations: initialising a volume-fraction field from a plane,
//! reconstructing per-cell interfaces from fractions and normals, and
//! recomputing fractions from reconstructed interfaces.
//!
//! Cells are independent, so every pass runs in parallel with each cell
//! writing only its own slot. A failing cell never aborts the pass; it is
//! reported in the returned diagnostics.

use rayon::prelude::*;

use crate::cell_cutter::CellCutter;
use crate::error::CutError;
use crate::plane::Plane;
use crate::polygon::dot;
use crate::polyhedron::Polyhedron;

/// Trait for the geometry provider: anything that hands out cells by index.
pub trait Mesh: Sync {
    fn cell_count(&self) -> usize;

    fn cell(&self, index: usize) -> &Polyhedron;
}

impl Mesh for [Polyhedron] {
    fn cell_count(&self) -> usize {
        self.len()
    }

    fn cell(&self, index: usize) -> &Polyhedron {
        &self[index]
    }
}

impl Mesh for Vec<Polyhedron> {
    fn cell_count(&self) -> usize {
        self.len()
    }

    fn cell(&self, index: usize) -> &Polyhedron {
        &self[index]
    }
}

/// A cell the pass could not handle exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct CellDiagnostic {
    pub cell: usize,
    pub error: CutError,
}

/// Reconstructed interface patch of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterfaceCell {
    pub plane: Plane,
    pub centre: [f64; 3],
    /// Area vector, pointing from the reference fluid to the other one.
    pub area: [f64; 3],
}

impl InterfaceCell {
    pub fn normal(&self) -> [f64; 3] {
        self.plane.normal()
    }
}

/// Per-cell interface patches, keyed by cell index.
#[derive(Clone, Debug, Default)]
pub struct InterfaceField {
    cells: Vec<Option<InterfaceCell>>,
    diagnostics: Vec<CellDiagnostic>,
}

impl InterfaceField {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Interface patch of cell `index`, `None` for cells without an interface.
    pub fn get(&self, index: usize) -> Option<&InterfaceCell> {
        self.cells.get(index).and_then(Option::as_ref)
    }

    pub fn plane(&self, index: usize) -> Option<&Plane> {
        self.get(index).map(|c| &c.plane)
    }

    /// Indices and patches of all interfacial cells.
    pub fn interfacial_cells(&self) -> impl Iterator<Item = (usize, &InterfaceCell)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (i, c)))
    }

    /// Cells whose reconstruction failed or did not converge.
    pub fn diagnostics(&self) -> &[CellDiagnostic] {
        &self.diagnostics
    }
}

fn check_len(expected: usize, actual: usize) -> Result<(), CutError> {
    if actual < expected {
        return Err(CutError::FieldSize { expected, actual });
    }
    Ok(())
}

/// Sets `alpha` to the fraction of every cell below one global plane.
///
/// Cells whose cut fails get 1 or 0 depending on which side their centroid is.
pub fn fill_volume_fraction<M: Mesh + ?Sized>(
    cutter: &CellCutter,
    mesh: &M,
    plane: &Plane,
    alpha: &mut [f64],
) -> Result<Vec<CellDiagnostic>, CutError> {
    let count = mesh.cell_count();
    check_len(count, alpha.len())?;

    let diagnostics = alpha[..count]
        .par_iter_mut()
        .enumerate()
        .filter_map(|(i, a)| {
            let cell = mesh.cell(i);
            match cutter.calc_sub_cell(cell, plane) {
                Ok(sub_cell) => {
                    *a = sub_cell.volume_fraction();
                    None
                }
                Err(error) => {
                    log::debug!("cell {}: {}; using centroid side", i, error);
                    *a = if plane.signed_distance(cell.centroid()) <= 0.0 { 1.0 } else { 0.0 };
                    Some(CellDiagnostic { cell: i, error })
                }
            }
        })
        .collect();

    Ok(diagnostics)
}

/// Recomputes `alpha` for every cell that carries an interface plane.
///
/// Cells without an interface keep their value.
pub fn volume_of_fluid<M: Mesh + ?Sized>(
    cutter: &CellCutter,
    mesh: &M,
    interface: &InterfaceField,
    alpha: &mut [f64],
) -> Result<Vec<CellDiagnostic>, CutError> {
    let count = mesh.cell_count();
    check_len(count, alpha.len())?;
    check_len(count, interface.len())?;

    let diagnostics = alpha[..count]
        .par_iter_mut()
        .enumerate()
        .filter_map(|(i, a)| {
            let plane = interface.plane(i)?;
            match cutter.calc_sub_cell(mesh.cell(i), plane) {
                Ok(sub_cell) => {
                    *a = sub_cell.volume_fraction();
                    None
                }
                Err(error) => {
                    log::debug!("cell {}: {}", i, error);
                    Some(CellDiagnostic { cell: i, error })
                }
            }
        })
        .collect();

    Ok(diagnostics)
}

/// Places a plane in every interfacial cell so that it reproduces the cell's
/// fraction, using the supplied normals.
///
/// A cell is interfacial when its fraction is strictly inside the snapping band
/// and its normal is non-zero. Non-converged cells keep their best-effort plane
/// and are also listed in the diagnostics.
pub fn reconstruct_interface<M: Mesh + ?Sized>(
    cutter: &CellCutter,
    mesh: &M,
    alpha: &[f64],
    normals: &[[f64; 3]],
) -> Result<InterfaceField, CutError> {
    let count = mesh.cell_count();
    check_len(count, alpha.len())?;
    check_len(count, normals.len())?;
    let eps = cutter.tolerances().fraction_epsilon;

    let results: Vec<(Option<InterfaceCell>, Option<CutError>)> = (0..count)
        .into_par_iter()
        .map(|i| {
            let a = alpha[i];
            let n = normals[i];
            if a <= eps || a >= 1.0 - eps || dot(n, n) == 0.0 {
                return (None, None);
            }
            match cutter.reconstruct(mesh.cell(i), n, a) {
                Ok((solution, sub_cell)) => {
                    let patch = sub_cell.interface_centre().map(|centre| InterfaceCell {
                        plane: solution.plane,
                        centre,
                        area: sub_cell.interface_area(),
                    });
                    let error = solution.into_result().err();
                    (patch, error)
                }
                Err(error) => (None, Some(error)),
            }
        })
        .collect();

    let mut field = InterfaceField {
        cells: Vec::with_capacity(count),
        diagnostics: Vec::new(),
    };
    for (i, (patch, error)) in results.into_iter().enumerate() {
        if let Some(error) = error {
            log::debug!("cell {}: {}", i, error);
            field.diagnostics.push(CellDiagnostic { cell: i, error });
        }
        field.cells.push(patch);
    }
    Ok(field)
}
