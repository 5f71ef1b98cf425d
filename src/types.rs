//! Core cell representations

use crate::sparse::ChainOp;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Vertex buffer: one row per vertex, one column per coordinate (2D or 3D)
pub type Points = Array2<f64>;

/// An edge with endpoints stored low index first, the canonical direction
/// used by the signed incidence builders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub lo: usize,
    pub hi: usize,
}

impl Edge {
    pub fn new(a: usize, b: usize) -> Self {
        if a < b { Self { lo: a, hi: b } } else { Self { lo: b, hi: a } }
    }
}

/// One cell, in any of the shapes the boundary-cycle extractor accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    /// Vertex indices: the ordered boundary traversal of a face, or the
    /// endpoints of an edge
    Vertices(Vec<usize>),
    /// Signed sparse chain over lower-dimensional cells
    Chain(Vec<(usize, i32)>),
    /// Unsigned support over lower-dimensional cells
    Edges(Vec<usize>),
}

impl Cell {
    /// The signed chain stored in one row of an incidence operator
    pub fn from_row(op: &ChainOp, row: usize) -> Self {
        Cell::Chain(op.row_entries(row).collect())
    }
}
