/// Reasons why a set of plane segments could not be closed into one interface polygon.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainError {
    /// The chain ended at a point no remaining segment starts from.
    ///
    /// This happens for non-manifold cells or when round-off places the two
    /// ends of a shared mesh edge on different sides of the plane.
    #[error("open chain: {linked} of {total} segments linked before the chain broke")]
    OpenChain { linked: usize, total: usize },

    /// The segments form more than one closed loop.
    ///
    /// Only non-convex cells can be cut into several interface patches.
    #[error("segments form {loops} separate loops")]
    MultipleLoops { loops: usize },

    /// Faces were partially cut but no segment was produced.
    #[error("cell is neither fully below, fully above nor cut")]
    Unclassifiable,
}

/// Errors reported by cell cutting and volume-fraction inversion.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CutError {
    /// A target volume fraction outside `[0, 1]` (or NaN).
    #[error("volume fraction {0} is outside [0, 1]")]
    InvalidFraction(f64),

    /// A plane normal of zero length.
    #[error("plane normal has zero length")]
    DegenerateNormal,

    /// A cell whose volume is zero, so no fraction can be defined.
    #[error("cell has zero volume")]
    DegenerateCell,

    /// Malformed cell buffers.
    #[error("invalid cell: {0}")]
    InvalidCell(String),

    /// A per-cell field whose length does not match the mesh.
    #[error("field has {actual} entries, expected at least {expected}")]
    FieldSize { expected: usize, actual: usize },

    /// The interface polygon could not be assembled.
    #[error("inconsistent cut topology: {0}")]
    InconsistentTopology(#[from] ChainError),

    /// The root-find stopped at its iteration cap before reaching the fraction tolerance.
    #[error(
        "signed distance did not converge after {iterations} iterations (offset {offset}, residual {residual:e})"
    )]
    ToleranceExceeded {
        offset: f64,
        residual: f64,
        iterations: usize,
    },
}
