//! # plicut
//!
//! `plicut` is a Rust library for geometric interface reconstruction in volume-of-fluid
//! simulations, designed to be used in Rust as well as compiled to WebAssembly (WASM).
//! It cuts arbitrary polyhedral cells by planes exactly and inverts volume fractions
//! into plane positions (PLIC: piecewise-linear interface calculation).
//!
//! ## Features
//!
//! - **Exact cutting**: Clips every face of a cell against a plane and closes the cut with the interface polygon.
//! - **Sub-cell measures**: Volume, centroid, interface centre and area vector, computed on demand.
//! - **Fraction inversion**: Finds the plane offset reproducing a target volume fraction for a given normal.
//! - **Whole-mesh passes**: Fills, reconstructs and recomputes fraction fields in parallel with `rayon`.
//! - **WASM-first**: Built with `wasm-bindgen` for use from JavaScript and TypeScript.
//!
//! ## Example
//!
//! ```
//! use plicut::{CellCutter, Plane, Polyhedron};
//!
//! let cell = Polyhedron::unit_cube();
//! let cutter = CellCutter::default();
//!
//! let sub_cell = cutter.calc_sub_cell(&cell, &Plane::new([0.0, 0.0, 1.0], 0.25).unwrap()).unwrap();
//! assert!((sub_cell.volume_fraction() - 0.25).abs() < 1e-12);
//!
//! let solution = cutter.find_signed_distance(&cell, [0.0, 0.0, 1.0], 0.25).unwrap();
//! assert!((solution.offset() - 0.25).abs() < 1e-8);
//! ```
//!
//! ## Main Interface
//!
//! The primary entry point is the [`CellCutter`] struct, which holds the tolerances and
//! produces a [`SubCell`] for every cell/plane pair. Mesh-wide passes live in [`field`].

mod bounds;
mod cell_cutter;
mod config;
mod error;
mod face_cutter;
pub mod field;
mod plane;
pub mod polygon;
mod polyhedron;
mod segments;
mod signed_distance;
mod wasm;

pub use bounds::BoundingBox;
pub use cell_cutter::CellCutter;
pub use cell_cutter::CellStatus;
pub use cell_cutter::CutFace;
pub use cell_cutter::SubCell;
pub use config::Tolerances;
pub use config::DEFAULT_FRACTION_EPSILON;
pub use config::DEFAULT_FRACTION_TOLERANCE;
pub use config::DEFAULT_MAX_ITERATIONS;
pub use config::DEFAULT_MERGE_TOLERANCE;
pub use config::DEFAULT_PLANE_TOLERANCE;
pub use error::ChainError;
pub use error::CutError;
pub use face_cutter::FaceCut;
pub use face_cutter::FaceCutter;
pub use face_cutter::FaceStatus;
pub use face_cutter::Segment;
pub use field::Mesh;
pub use plane::Plane;
pub use polyhedron::Polyhedron;
pub use segments::assemble_loop;
pub use segments::assemble_loops;
pub use signed_distance::Convergence;
pub use signed_distance::SignedDistance;
pub use wasm::Cell3D;
pub use wasm::SubCell3D;
