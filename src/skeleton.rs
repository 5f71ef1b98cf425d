//! Skeleton-level operations: block-diagonal merging and edge deletion

use crate::sparse::ChainOp;
use crate::types::Points;
use ndarray::{Axis, concatenate};

/// Merge two 1-skeletons: vertex rows stacked, edge operators block-diagonal.
/// No vertex deduplication is performed.
///
/// # Panics
///
/// Panics if the vertex buffers disagree on dimension.
pub fn merge_1_skeletons(
    v1: &Points,
    ev1: &ChainOp,
    v2: &Points,
    ev2: &ChainOp,
) -> (Points, ChainOp) {
    assert_eq!(v1.ncols(), v2.ncols(), "vertex dimension mismatch");
    let v = concatenate(Axis(0), &[v1.view(), v2.view()])
        .expect("row stacking with equal column counts");
    (v, ev1.block_diag(ev2))
}

/// Merge two 2-skeletons: vertices stacked, both incidence operators
/// block-diagonal. No vertex deduplication is performed.
pub fn merge_2_skeletons(
    v1: &Points,
    ev1: &ChainOp,
    fe1: &ChainOp,
    v2: &Points,
    ev2: &ChainOp,
    fe2: &ChainOp,
) -> (Points, ChainOp, ChainOp) {
    let (v, ev) = merge_1_skeletons(v1, ev1, v2, ev2);
    (v, ev, fe1.block_diag(fe2))
}

/// Delete the given edge rows from copEV, then drop every vertex column that
/// became empty together with its row of `v`.
pub fn delete_edges(todel: &[usize], v: &Points, cop_ev: &ChainOp) -> (Points, ChainOp) {
    let trimmed = cop_ev.delete_rows(todel);
    let (compacted, kept) = trimmed.drop_empty_cols();
    (v.select(Axis(0), &kept), compacted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incidence;
    use ndarray::arr2;

    #[test]
    fn test_merge_1_skeletons() {
        let v1 = arr2(&[[0.0, 0.0], [1.0, 0.0]]);
        let ev1 = incidence::edge_vertex_op(&[vec![0, 1]], true);
        let v2 = arr2(&[[2.0, 0.0], [3.0, 0.0]]);
        let ev2 = incidence::edge_vertex_op(&[vec![0, 1]], true);

        let (v, ev) = merge_1_skeletons(&v1, &ev1, &v2, &ev2);
        assert_eq!(v.nrows(), 4);
        assert_eq!((ev.num_rows, ev.num_cols), (2, 4));
        assert_eq!(ev.get(1, 2), -1);
        assert_eq!(ev.get(1, 3), 1);
    }

    #[test]
    fn test_delete_edges_removes_dangling_vertices() {
        // Path 0-1-2-3; deleting the last edge leaves vertex 3 dangling.
        let v = arr2(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [3.0, 0.0]]);
        let ev = incidence::edge_vertex_op(&[vec![0, 1], vec![1, 2], vec![2, 3]], true);

        let (v2, ev2) = delete_edges(&[2], &v, &ev);
        assert_eq!(v2.nrows(), 3);
        assert_eq!((ev2.num_rows, ev2.num_cols), (2, 3));
        assert_eq!(v2.row(2).to_vec(), vec![2.0, 0.0]);
    }
}
