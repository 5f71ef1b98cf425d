//! Chain-complex computational geometry library
//!
//! This library operates on cellular complexes described by sparse signed
//! incidence (boundary/coboundary) operators between cells of successive
//! dimensions: vertices, edges, faces and 3-cells.
//!
//! It provides the incidence-operator algebra, boundary-cycle recovery,
//! constrained face triangulation with orientation repair, a robust
//! point-in-face classifier, skeleton merging and cleanup, a minimal
//! Wavefront mesh reader/writer, and the driver for 3D spatial arrangement.
//!
//! # Example
//! ```
//! use cell_complex::incidence;
//!
//! // The four edges of the unit square, endpoints by vertex index.
//! let ev = vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![0, 3]];
//! let cop_ev = incidence::edge_vertex_op(&ev, true);
//!
//! assert_eq!((cop_ev.num_rows, cop_ev.num_cols), (4, 4));
//! assert_eq!(cop_ev.get(0, 0), -1);
//! assert_eq!(cop_ev.get(0, 1), 1);
//! ```

pub mod arrangement;
pub mod classify;
pub mod cycles;
pub mod geometry;
pub mod incidence;
pub mod obj;
pub mod skeleton;
pub mod sparse;
pub mod triangulate;
pub mod types;

// Canonical inputs shared by unit and integration tests
pub mod testdata;

pub use arrangement::{Arrangement3d, ArrangementKernel, arrange_3d, merge_vertices};
pub use classify::{PointPosition, point_in_face};
pub use cycles::{face_cycle, face_cycles};
pub use sparse::ChainOp;
pub use triangulate::{Triangulator, face_area, triangulate_faces, triangulate_faces_2d};
pub use types::{Cell, Edge, Points};

/// Error types for chain-complex operations
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("cell {0}: boundary chain does not close into a cycle")]
    MalformedComplex(usize),

    #[error("cell {0}: degenerate geometry (collinear or zero-area)")]
    DegenerateGeometry(usize),

    #[error("cell {0}: no admissible next edge while walking the boundary")]
    AmbiguousTraversal(usize),

    #[error("line {0}: unreadable mesh record: {1}")]
    IoFormat(usize, String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChainError>;

/// Numerical tolerance for floating-point comparisons
/// Used throughout the library for:
/// - Vertex equality and merging
/// - Planar-basis degeneracy detection
pub const EPSILON: f64 = 1e-8;
