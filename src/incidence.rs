//! Builders for sparse incidence operators
//!
//! Cells arrive as index lists (endpoints for edges, boundary traversals for
//! faces) and leave as rows of a [`ChainOp`].

use crate::cycles;
use crate::sparse::ChainOp;
use crate::types::{Cell, Edge};
use crate::{ChainError, Result};
use std::collections::HashMap;

/// Build copEV, the edge -> vertex incidence operator.
///
/// For edge (a, b) the column min(a, b) holds -1 and the column max(a, b)
/// holds +1 in the signed form; both hold +1 unsigned. The column count is
/// the largest vertex index seen plus one.
///
/// # Panics
///
/// Panics if an edge does not have exactly two distinct endpoints.
pub fn edge_vertex_op(edges: &[Vec<usize>], signed: bool) -> ChainOp {
    let num_cols = edges
        .iter()
        .flat_map(|e| e.iter().copied())
        .max()
        .map_or(0, |m| m + 1);

    let rows = edges
        .iter()
        .map(|e| {
            assert_eq!(e.len(), 2, "edge must have exactly two endpoints");
            assert_ne!(e[0], e[1], "edge endpoints must be distinct");
            let edge = Edge::new(e[0], e[1]);
            let lo_sign = if signed { -1 } else { 1 };
            vec![(edge.lo, lo_sign), (edge.hi, 1)]
        })
        .collect();

    ChainOp::from_rows(rows, num_cols)
}

/// Build copFE, the face -> edge incidence operator.
///
/// Faces are ordered boundary traversals; each consecutive vertex pair
/// (wrapping last -> first) is looked up among `edges` by its sorted
/// endpoints, and the sign is +1 iff the face traverses the edge in its
/// canonical low -> high direction. A face referencing an absent edge fails
/// with [`ChainError::MalformedComplex`].
pub fn face_edge_op(faces: &[Vec<usize>], edges: &[Vec<usize>]) -> Result<ChainOp> {
    let lookup: HashMap<Edge, usize> = edges
        .iter()
        .enumerate()
        .map(|(i, e)| (Edge::new(e[0], e[1]), i))
        .collect();

    let mut rows = Vec::with_capacity(faces.len());
    for (f, face) in faces.iter().enumerate() {
        let mut row = Vec::with_capacity(face.len());
        for k in 0..face.len() {
            let a = face[k];
            let b = face[(k + 1) % face.len()];
            let e = *lookup
                .get(&Edge::new(a, b))
                .ok_or(ChainError::MalformedComplex(f))?;
            let sign = if b > a { 1 } else { -1 };
            row.push((e, sign));
        }
        rows.push(row);
    }

    Ok(ChainOp::from_rows(rows, edges.len()))
}

/// Build (copEV, copFE) from edge and face cell lists.
///
/// Face vertex lists need not be ordered: each face is first put into
/// boundary order by the unsigned walk over the edge incidences.
pub fn face_ops(edges: &[Vec<usize>], faces: &[Vec<usize>]) -> Result<(ChainOp, ChainOp)> {
    let cop_ev = edge_vertex_op(edges, true);

    let mut ordered = Vec::with_capacity(faces.len());
    for (f, face) in faces.iter().enumerate() {
        ordered.push(cycles::face_cycle(&cop_ev, &Cell::Vertices(face.clone()), f)?);
    }

    let cop_fe = face_edge_op(&ordered, edges)?;
    Ok((cop_ev, cop_fe))
}

/// Unsigned cell list -> incidence operator: every incidence is +1.
pub fn cells_to_op(cells: &[Vec<usize>]) -> ChainOp {
    let num_cols = cells
        .iter()
        .flat_map(|c| c.iter().copied())
        .max()
        .map_or(0, |m| m + 1);

    let rows = cells
        .iter()
        .map(|cell| cell.iter().map(|&v| (v, 1)).collect())
        .collect();
    ChainOp::from_rows(rows, num_cols)
}

/// Incidence operator -> unsigned cell list: per-row stored column indices in
/// ascending order, signs ignored.
pub fn op_to_cells(op: &ChainOp) -> Vec<Vec<usize>> {
    (0..op.num_rows)
        .map(|row| op.row_entries(row).map(|(col, _)| col).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_vertex_op_signed() {
        let ev = vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![0, 3]];
        let op = edge_vertex_op(&ev, true);
        assert_eq!((op.num_rows, op.num_cols), (4, 4));
        for (i, e) in ev.iter().enumerate() {
            assert_eq!(op.get(i, *e.iter().min().unwrap()), -1);
            assert_eq!(op.get(i, *e.iter().max().unwrap()), 1);
        }
    }

    #[test]
    fn test_edge_vertex_op_unsigned() {
        let op = edge_vertex_op(&[vec![2, 0]], false);
        assert_eq!(op.get(0, 0), 1);
        assert_eq!(op.get(0, 2), 1);
    }

    #[test]
    fn test_face_edge_op_square_signs() {
        let ev = vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![0, 3]];
        let fv = vec![vec![0, 1, 2, 3]];
        let op = face_edge_op(&fv, &ev).unwrap();
        let signs: Vec<i32> = (0..4).map(|e| op.get(0, e)).collect();
        assert_eq!(signs, vec![1, 1, 1, -1]);
    }

    #[test]
    fn test_face_edge_op_missing_edge() {
        let ev = vec![vec![0, 1], vec![1, 2]];
        let fv = vec![vec![0, 1, 2]];
        let result = face_edge_op(&fv, &ev);
        assert!(matches!(result, Err(ChainError::MalformedComplex(0))));
    }

    #[test]
    fn test_cell_list_round_trip() {
        let cells = vec![vec![0, 2], vec![1, 3], vec![0, 1, 2]];
        assert_eq!(op_to_cells(&cells_to_op(&cells)), cells);

        let op = cells_to_op(&cells);
        assert_eq!(cells_to_op(&op_to_cells(&op)), op);
    }
}
