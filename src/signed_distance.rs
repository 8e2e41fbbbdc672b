//! Plane offset from a target volume fraction.
//!
//! For a fixed normal the fraction below the plane grows monotonically with the
//! offset, from 0 at the lowest vertex projection to 1 at the highest. Between
//! two consecutive vertex projections the cut topology does not change and the
//! volume is a cubic in the offset whose derivative is the interface area, so
//! the solve first brackets the target between vertex projections and then
//! refines with Newton steps kept inside the bracket.

use crate::cell_cutter::{CellCutter, SubCell};
use crate::error::CutError;
use crate::plane::{Plane, unit_normal};
use crate::polygon::norm;
use crate::polyhedron::Polyhedron;

/// How a signed-distance solve ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Convergence {
    /// Fraction within the snapping band of 0 or 1; no iteration was needed.
    Trivial,
    /// Fraction reached within tolerance.
    Converged,
    /// Iteration cap reached; the offset is the midpoint of the last bracket.
    ToleranceExceeded { residual: f64 },
}

/// Result of [`CellCutter::find_signed_distance`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SignedDistance {
    pub plane: Plane,
    /// Fraction actually produced by `plane`.
    pub fraction: f64,
    /// Refinement steps taken inside the final bracket.
    pub iterations: usize,
    pub convergence: Convergence,
}

impl SignedDistance {
    pub fn offset(&self) -> f64 {
        self.plane.offset()
    }

    pub fn converged(&self) -> bool {
        !matches!(self.convergence, Convergence::ToleranceExceeded { .. })
    }

    /// Turns a non-converged result into [`CutError::ToleranceExceeded`].
    pub fn into_result(self) -> Result<Self, CutError> {
        match self.convergence {
            Convergence::ToleranceExceeded { residual } => Err(CutError::ToleranceExceeded {
                offset: self.offset(),
                residual,
                iterations: self.iterations,
            }),
            _ => Ok(self),
        }
    }
}

impl CellCutter {
    /// Finds the offset of the plane with the given normal that leaves volume
    /// fraction `alpha` of `cell` below it.
    pub fn find_signed_distance(
        &self,
        cell: &Polyhedron,
        normal: [f64; 3],
        alpha: f64,
    ) -> Result<SignedDistance, CutError> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(CutError::InvalidFraction(alpha));
        }
        let normal = unit_normal(normal)?;
        let cell_volume = cell.volume();
        if !(cell_volume > f64::MIN_POSITIVE) {
            return Err(CutError::DegenerateCell);
        }

        let tol = self.tolerances();
        let (plane_tol, _) = tol.scaled(cell.length_scale());
        let base = Plane::new(normal, 0.0)?;

        let mut projections: Vec<f64> = (0..cell.vertex_count())
            .map(|i| base.signed_distance(cell.vertex(i)))
            .collect();
        projections.sort_by(f64::total_cmp);
        projections.dedup_by(|a, b| (*a - *b).abs() <= plane_tol);

        let lowest = projections[0];
        let highest = projections[projections.len() - 1];

        if alpha <= tol.fraction_epsilon {
            return Ok(SignedDistance {
                plane: base.with_offset(lowest),
                fraction: 0.0,
                iterations: 0,
                convergence: Convergence::Trivial,
            });
        }
        if alpha >= 1.0 - tol.fraction_epsilon {
            return Ok(SignedDistance {
                plane: base.with_offset(highest),
                fraction: 1.0,
                iterations: 0,
                convergence: Convergence::Trivial,
            });
        }

        let evaluate = |offset: f64| -> Result<(f64, f64), CutError> {
            let sub_cell = self.calc_sub_cell(cell, &base.with_offset(offset))?;
            Ok((
                sub_cell.sub_cell_volume() / cell_volume,
                norm(sub_cell.interface_area()),
            ))
        };
        let converged = |offset: f64, fraction: f64, iterations: usize| SignedDistance {
            plane: base.with_offset(offset),
            fraction,
            iterations,
            convergence: Convergence::Converged,
        };

        // Bracket between consecutive vertex projections.
        let (mut i_lo, mut i_hi) = (0, projections.len() - 1);
        let (mut f_lo, mut f_hi) = (0.0, 1.0);
        while i_hi - i_lo > 1 {
            let mid = (i_lo + i_hi) / 2;
            let (f, _) = evaluate(projections[mid])?;
            if (f - alpha).abs() <= tol.fraction {
                return Ok(converged(projections[mid], f, 0));
            }
            if f < alpha {
                i_lo = mid;
                f_lo = f;
            } else {
                i_hi = mid;
                f_hi = f;
            }
        }

        let (mut lo, mut hi) = (projections[i_lo], projections[i_hi]);
        let mut x = if f_hi > f_lo {
            lo + (alpha - f_lo) / (f_hi - f_lo) * (hi - lo)
        } else {
            0.5 * (lo + hi)
        };

        for iteration in 1..=tol.max_iterations {
            let (f, area) = evaluate(x)?;
            let residual = f - alpha;
            log::trace!(
                "signed distance iteration {}: offset {} fraction {} residual {:e}",
                iteration,
                x,
                f,
                residual
            );
            if residual.abs() <= tol.fraction {
                return Ok(converged(x, f, iteration));
            }

            if residual < 0.0 {
                lo = x;
            } else {
                hi = x;
            }

            let slope = area / cell_volume;
            let newton = if slope > f64::MIN_POSITIVE { x - residual / slope } else { f64::NAN };
            x = if newton > lo && newton < hi { newton } else { 0.5 * (lo + hi) };
        }

        let offset = 0.5 * (lo + hi);
        let (fraction, _) = evaluate(offset)?;
        let residual = (fraction - alpha).abs();
        log::warn!(
            "signed distance for fraction {} not converged after {} iterations (residual {:e})",
            alpha,
            tol.max_iterations,
            residual
        );
        Ok(SignedDistance {
            plane: base.with_offset(offset),
            fraction,
            iterations: tol.max_iterations,
            convergence: Convergence::ToleranceExceeded { residual },
        })
    }

    /// Solves for the plane reproducing `alpha` and cuts `cell` with it.
    pub fn reconstruct<'a>(
        &self,
        cell: &'a Polyhedron,
        normal: [f64; 3],
        alpha: f64,
    ) -> Result<(SignedDistance, SubCell<'a>), CutError> {
        let solution = self.find_signed_distance(cell, normal, alpha)?;
        let sub_cell = self.calc_sub_cell(cell, &solution.plane)?;
        Ok((solution, sub_cell))
    }
}
