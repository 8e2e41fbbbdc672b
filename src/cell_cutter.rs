use std::cell::OnceCell;

use crate::config::Tolerances;
use crate::error::{ChainError, CutError};
use crate::face_cutter::{FaceCutter, FaceStatus};
use crate::plane::Plane;
use crate::polygon::{add, centre_and_area, dot, mean, norm, scale, sub};
use crate::polyhedron::Polyhedron;
use crate::segments::assemble_loops;

/// Position of a cell relative to the cutting plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellStatus {
    /// The plane does not enter the cell; all of it is on the reference side.
    FullyBelow,
    /// The plane cuts through the cell interior.
    Cut,
    /// The plane does not enter the cell; none of it is on the reference side.
    FullyAbove,
}

impl CellStatus {
    /// Integer label: -1 fully below, 0 cut, +1 fully above.
    pub fn label(self) -> i32 {
        match self {
            CellStatus::FullyBelow => -1,
            CellStatus::Cut => 0,
            CellStatus::FullyAbove => 1,
        }
    }
}

/// A face of the sub-cell: the part of cell face `label` on the reference side.
#[derive(Clone, Debug, PartialEq)]
pub struct CutFace {
    pub label: usize,
    pub points: Vec<[f64; 3]>,
}

/// The part of a cell below a plane.
///
/// Produced fresh by every [`CellCutter::calc_sub_cell`] call. Volume, centre and
/// interface measures are computed on first access and then kept.
#[derive(Debug)]
pub struct SubCell<'a> {
    cell: &'a Polyhedron,
    plane: Plane,
    status: CellStatus,
    cut_faces: Vec<CutFace>,
    fully_submerged: Vec<usize>,
    interface: Vec<Vec<[f64; 3]>>,
    centre_and_volume: OnceCell<([f64; 3], f64)>,
    interface_centre_and_area: OnceCell<([f64; 3], [f64; 3])>,
}

impl<'a> SubCell<'a> {
    fn new(cell: &'a Polyhedron, plane: Plane, status: CellStatus) -> Self {
        Self {
            cell,
            plane,
            status,
            cut_faces: Vec::new(),
            fully_submerged: Vec::new(),
            interface: Vec::new(),
            centre_and_volume: OnceCell::new(),
            interface_centre_and_area: OnceCell::new(),
        }
    }

    pub fn status(&self) -> CellStatus {
        self.status
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn cell(&self) -> &'a Polyhedron {
        self.cell
    }

    /// Faces of the sub-cell other than the interface, labelled by cell face.
    pub fn cut_faces(&self) -> &[CutFace] {
        &self.cut_faces
    }

    /// Labels of cell faces lying entirely on the reference side.
    pub fn fully_submerged_faces(&self) -> &[usize] {
        &self.fully_submerged
    }

    /// The interface polygon, counter-clockwise about the plane normal. Empty unless cut.
    ///
    /// A non-convex cell can be cut into several patches; this is the first one.
    pub fn interface_points(&self) -> &[[f64; 3]] {
        self.interface.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every interface patch, each counter-clockwise about the plane normal.
    pub fn interface_loops(&self) -> &[Vec<[f64; 3]>] {
        &self.interface
    }

    pub fn sub_cell_volume(&self) -> f64 {
        self.sub_cell_centre_and_volume().1
    }

    /// Centroid of the sub-cell; the cell centroid when the sub-cell is empty.
    pub fn sub_cell_centre(&self) -> [f64; 3] {
        self.sub_cell_centre_and_volume().0
    }

    /// Centroid of the interface, `None` unless the cell is cut. Patches are weighted by area.
    pub fn interface_centre(&self) -> Option<[f64; 3]> {
        match self.status {
            CellStatus::Cut => Some(self.interface_centre_and_area().0),
            _ => None,
        }
    }

    /// Total area vector of the interface, along the plane normal. Zero unless cut.
    pub fn interface_area(&self) -> [f64; 3] {
        match self.status {
            CellStatus::Cut => self.interface_centre_and_area().1,
            _ => [0.0; 3],
        }
    }

    /// Unit normal of the interface polygon, `None` unless the cell is cut.
    pub fn interface_normal(&self) -> Option<[f64; 3]> {
        let area = self.interface_area();
        let mag = norm(area);
        if mag > 0.0 { Some(scale(area, 1.0 / mag)) } else { None }
    }

    /// Sub-cell volume over cell volume, in `[0, 1]`. Zero for a degenerate cell.
    pub fn volume_fraction(&self) -> f64 {
        match self.status {
            CellStatus::FullyBelow => 1.0,
            CellStatus::FullyAbove => 0.0,
            CellStatus::Cut => {
                let cell_volume = self.cell.volume();
                if cell_volume > 0.0 {
                    (self.sub_cell_volume() / cell_volume).clamp(0.0, 1.0)
                } else {
                    0.0
                }
            }
        }
    }

    /// Sub-cell volume from the divergence theorem, `Σ S_f · c_f / 3` over the
    /// sub-cell boundary. Agrees with [`Self::sub_cell_volume`] up to round-off.
    pub fn divergence_volume(&self) -> f64 {
        match self.status {
            CellStatus::FullyAbove => 0.0,
            CellStatus::FullyBelow | CellStatus::Cut => {
                self.boundary_measures().iter().map(|(c, s)| dot(*s, *c)).sum::<f64>() / 3.0
            }
        }
    }

    fn sub_cell_centre_and_volume(&self) -> ([f64; 3], f64) {
        *self.centre_and_volume.get_or_init(|| match self.status {
            CellStatus::FullyBelow => (self.cell.centroid(), self.cell.volume()),
            CellStatus::FullyAbove => (self.cell.centroid(), 0.0),
            CellStatus::Cut => self.pyramid_decomposition(),
        })
    }

    fn interface_centre_and_area(&self) -> ([f64; 3], [f64; 3]) {
        *self.interface_centre_and_area.get_or_init(|| {
            let patches: Vec<_> = self.interface.iter().map(|l| centre_and_area(l)).collect();
            if let [single] = patches.as_slice() {
                return *single;
            }
            let mut area = [0.0; 3];
            let mut moment = [0.0; 3];
            let mut weight = 0.0;
            for &(c, s) in &patches {
                let w = norm(s);
                area = add(area, s);
                moment = add(moment, scale(c, w));
                weight += w;
            }
            let centre = if weight > 0.0 {
                scale(moment, 1.0 / weight)
            } else {
                mean(&patches.iter().map(|(c, _)| *c).collect::<Vec<_>>())
            };
            (centre, area)
        })
    }

    /// Centre and outward area vector of every sub-cell boundary polygon.
    fn boundary_measures(&self) -> Vec<([f64; 3], [f64; 3])> {
        self.cut_faces
            .iter()
            .map(|f| centre_and_area(&f.points))
            .chain(self.interface.iter().map(|l| centre_and_area(l)))
            .collect()
    }

    /// Sums pyramids from an interior apex to every boundary polygon.
    fn pyramid_decomposition(&self) -> ([f64; 3], f64) {
        let measures = self.boundary_measures();
        let centres: Vec<[f64; 3]> = measures.iter().map(|(c, _)| *c).collect();
        let apex = mean(&centres);

        let mut volume = 0.0;
        let mut moment = [0.0; 3];
        for (c, s) in measures {
            let pyr_vol = dot(s, sub(c, apex)) / 3.0;
            // Pyramid centroid lies a quarter of the way from base centre to apex.
            let pyr_centre = add(scale(c, 0.75), scale(apex, 0.25));
            volume += pyr_vol;
            moment = add(moment, scale(pyr_centre, pyr_vol));
        }

        if volume > f64::MIN_POSITIVE {
            (scale(moment, 1.0 / volume), volume)
        } else {
            (apex, 0.0)
        }
    }
}

/// Cuts polyhedral cells by planes and inverts volume fractions.
///
/// Holds only tolerances, so one instance can be shared by any number of threads.
#[derive(Clone, Copy, Debug, Default)]
pub struct CellCutter {
    tolerances: Tolerances,
}

impl CellCutter {
    pub fn new(tolerances: Tolerances) -> Self {
        Self { tolerances }
    }

    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    /// Face cutter with tolerances scaled to `cell`.
    pub fn face_cutter(&self, cell: &Polyhedron) -> FaceCutter {
        let (plane_tol, merge_tol) = self.tolerances.scaled(cell.length_scale());
        FaceCutter::new(plane_tol, merge_tol)
    }

    /// Cuts `cell` by `plane` and returns the part below it.
    ///
    /// A plane that only grazes the cell, so that the whole interface merges
    /// into a point, leaves the cell fully on the side it penetrates deeper.
    pub fn calc_sub_cell<'a>(&self, cell: &'a Polyhedron, plane: &Plane) -> Result<SubCell<'a>, CutError> {
        let (plane_tol, merge_tol) = self.tolerances.scaled(cell.length_scale());

        // Trivial cells first: no vertex strictly on one of the sides.
        let mut min_d = f64::INFINITY;
        let mut max_d = f64::NEG_INFINITY;
        for i in 0..cell.vertex_count() {
            let d = plane.signed_distance(cell.vertex(i));
            min_d = min_d.min(d);
            max_d = max_d.max(d);
        }

        if max_d <= plane_tol {
            return Ok(Self::fully_below(cell, plane));
        }
        if min_d >= -plane_tol {
            return Ok(SubCell::new(cell, *plane, CellStatus::FullyAbove));
        }

        let face_cutter = self.face_cutter(cell);
        let mut sub_cell = SubCell::new(cell, *plane, CellStatus::Cut);
        let mut segments = Vec::new();

        for (label, face) in cell.face_points().enumerate() {
            let cut = face_cutter.cut(&face, plane);
            if cut.status == FaceStatus::Below {
                sub_cell.fully_submerged.push(label);
            }
            segments.extend_from_slice(&cut.segments);
            if !cut.points.is_empty() {
                sub_cell.cut_faces.push(CutFace {
                    label,
                    points: cut.points,
                });
            }
        }

        if segments.is_empty() {
            log::debug!(
                "plane {:?} separates cell vertices but no face produced a segment",
                plane
            );
            return Err(ChainError::Unclassifiable.into());
        }

        let loops = assemble_loops(&segments, merge_tol).map_err(|err| {
            log::debug!("interface loop for plane {:?} not closed: {}", plane, err);
            CutError::from(err)
        })?;

        if loops.is_empty() {
            log::debug!(
                "plane {:?} grazes the cell (penetration {:e} below, {:e} above)",
                plane,
                -min_d,
                max_d
            );
            return Ok(if max_d < -min_d {
                Self::fully_below(cell, plane)
            } else {
                SubCell::new(cell, *plane, CellStatus::FullyAbove)
            });
        }

        for mut points in loops {
            let (_, area) = centre_and_area(&points);
            if dot(area, plane.normal()) < 0.0 {
                points.reverse();
            }
            sub_cell.interface.push(points);
        }

        Ok(sub_cell)
    }

    fn fully_below<'a>(cell: &'a Polyhedron, plane: &Plane) -> SubCell<'a> {
        let mut sub_cell = SubCell::new(cell, *plane, CellStatus::FullyBelow);
        for (label, points) in cell.face_points().enumerate() {
            sub_cell.cut_faces.push(CutFace { label, points });
            sub_cell.fully_submerged.push(label);
        }
        sub_cell
    }

    /// Cuts `cell` and writes its volume fraction into `alpha[index]`.
    pub fn volume_of_fluid_at(
        &self,
        index: usize,
        cell: &Polyhedron,
        plane: &Plane,
        alpha: &mut [f64],
    ) -> Result<CellStatus, CutError> {
        let len = alpha.len();
        let slot = alpha.get_mut(index).ok_or(CutError::FieldSize {
            expected: index + 1,
            actual: len,
        })?;
        let sub_cell = self.calc_sub_cell(cell, plane)?;
        *slot = sub_cell.volume_fraction();
        Ok(sub_cell.status())
    }
}
