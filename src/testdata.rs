//! Canonical complexes and collaborator stand-ins for tests
//!
//! This module provides the small cellular complexes used by unit and
//! integration tests, a constrained triangulator good enough for simple test
//! polygons, and an arrangement kernel that fragments every face into its
//! own sub-skeleton.

use crate::arrangement::ArrangementKernel;
use crate::sparse::ChainOp;
use crate::triangulate::Triangulator;
use crate::types::{Edge, Points};
use crate::{ChainError, EPSILON, Result, incidence};
use ndarray::{Array2, Axis, arr2};
use rand::Rng;
use std::collections::HashMap;

/// Unit square cell lists: (V, EV, FV), counter-clockwise boundary
pub fn unit_square() -> (Points, Vec<Vec<usize>>, Vec<Vec<usize>>) {
    let v = arr2(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
    let ev = vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![0, 3]];
    let fv = vec![vec![0, 1, 2, 3]];
    (v, ev, fv)
}

/// Unit square as a 3D 2-complex with its incidence operators
pub fn unit_square_ops() -> (Points, ChainOp, ChainOp) {
    let (v2, ev, fv) = unit_square();
    let mut v = Array2::zeros((v2.nrows(), 3));
    v.column_mut(0).assign(&v2.column(0));
    v.column_mut(1).assign(&v2.column(1));
    let (cop_ev, cop_fe) = incidence::face_ops(&ev, &fv).expect("square is well formed");
    (v, cop_ev, cop_fe)
}

/// Unit square traversed clockwise, planar, for orientation-repair tests
pub fn clockwise_square_ops() -> (Points, ChainOp, ChainOp) {
    let (v, ev, _) = unit_square();
    let cop_ev = incidence::edge_vertex_op(&ev, true);
    let cop_fe =
        incidence::face_edge_op(&[vec![0, 3, 2, 1]], &ev).expect("square is well formed");
    (v, cop_ev, cop_fe)
}

/// Unit square as a 2D vertex buffer plus edge endpoint pairs, for the
/// point classifier
pub fn unit_square_2d() -> (Points, Vec<[usize; 2]>) {
    let (v, ev, _) = unit_square();
    let edges = ev.iter().map(|e| [e[0], e[1]]).collect();
    (v, edges)
}

/// Diamond whose right corner lies on the row of interior query points
pub fn diamond_polygon() -> (Points, Vec<[usize; 2]>) {
    let v = arr2(&[[2.0, 0.0], [4.0, 1.0], [2.0, 2.0], [0.0, 1.0]]);
    let edges = vec![[0, 1], [1, 2], [2, 3], [3, 0]];
    (v, edges)
}

/// Staircase with one horizontal edge on the y = 1 row: the boundary passes
/// from below it to above it
pub fn staircase_polygon() -> (Points, Vec<[usize; 2]>) {
    let v = arr2(&[
        [0.0, 0.0],
        [2.0, 0.0],
        [2.0, 1.0],
        [4.0, 1.0],
        [4.0, 2.0],
        [0.0, 2.0],
    ]);
    let edges = vec![[0, 1], [1, 2], [2, 3], [3, 4], [4, 5], [5, 0]];
    (v, edges)
}

/// Polygon with a notch that descends to the y = 1 row, runs along it and
/// returns upward: a graze that must not count as a crossing
pub fn notched_polygon() -> (Points, Vec<[usize; 2]>) {
    let v = arr2(&[
        [0.0, 0.0],
        [6.0, 0.0],
        [6.0, 2.0],
        [4.0, 2.0],
        [4.0, 1.0],
        [2.0, 1.0],
        [2.0, 2.0],
        [0.0, 2.0],
    ]);
    let edges = vec![
        [0, 1],
        [1, 2],
        [2, 3],
        [3, 4],
        [4, 5],
        [5, 6],
        [6, 7],
        [7, 0],
    ];
    (v, edges)
}

/// Two unit squares sharing the x = 1 boundary, assembled block-diagonally
/// with duplicated corner vertices, as fragment accumulation produces
pub fn two_squares_disjoint() -> (Points, ChainOp, ChainOp) {
    let (va, eva, fva) = unit_square();
    let vb = arr2(&[[1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0]]);
    // Both squares share the same local topology.
    let (cop_ev, cop_fe) = incidence::face_ops(&eva, &fva).expect("square is well formed");
    crate::skeleton::merge_2_skeletons(&va, &cop_ev, &cop_fe, &vb, &cop_ev, &cop_fe)
}

/// Unit cube cell lists: (V, EV, FV) with faces ordered outward
pub fn unit_cube() -> (Points, Vec<Vec<usize>>, Vec<Vec<usize>>) {
    let v = arr2(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ]);
    let ev = vec![
        vec![0, 1],
        vec![1, 2],
        vec![2, 3],
        vec![0, 3],
        vec![4, 5],
        vec![5, 6],
        vec![6, 7],
        vec![4, 7],
        vec![0, 4],
        vec![1, 5],
        vec![2, 6],
        vec![3, 7],
    ];
    let fv = vec![
        vec![0, 3, 2, 1],
        vec![4, 5, 6, 7],
        vec![0, 1, 5, 4],
        vec![2, 3, 7, 6],
        vec![0, 4, 7, 3],
        vec![1, 2, 6, 5],
    ];
    (v, ev, fv)
}

/// Unit-cube 2-skeleton with its incidence operators
pub fn unit_cube_ops() -> (Points, ChainOp, ChainOp) {
    let (v, ev, fv) = unit_cube();
    let cop_ev = incidence::edge_vertex_op(&ev, true);
    let cop_fe = incidence::face_edge_op(&fv, &ev).expect("cube is well formed");
    (v, cop_ev, cop_fe)
}

/// Copy of a vertex buffer with every coordinate perturbed within
/// ±amplitude/2, for merge-tolerance tests
pub fn jitter_points(v: &Points, amplitude: f64) -> Points {
    let mut rng = rand::rng();
    let mut out = v.clone();
    for value in out.iter_mut() {
        *value += amplitude * (rng.random::<f64>() - 0.5);
    }
    out
}

/// Ear-clipping constrained triangulator for simple test polygons.
///
/// The boundary cycle is assumed to arrive in order, so the consecutive-pair
/// constraints are satisfied by construction. Returned triangles follow the
/// orientation of the input cycle, as the triangulation seam requires.
pub struct EarClipTriangulator;

fn area2(p: &[f64; 2], q: &[f64; 2], r: &[f64; 2]) -> f64 {
    (q[0] - p[0]) * (r[1] - p[1]) - (r[0] - p[0]) * (q[1] - p[1])
}

fn strictly_inside(p: &[f64; 2], a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> bool {
    area2(a, b, p) > EPSILON && area2(b, c, p) > EPSILON && area2(c, a, p) > EPSILON
}

impl Triangulator for EarClipTriangulator {
    fn triangulate(
        &self,
        points2d: &Points,
        labels: &[usize],
        _segments: &[[usize; 2]],
        _boundary: &[bool],
    ) -> Result<Vec<[usize; 3]>> {
        let m = points2d.nrows();
        if m < 3 {
            return Err(ChainError::DegenerateGeometry(0));
        }
        let pts: Vec<[f64; 2]> = (0..m)
            .map(|i| [points2d[[i, 0]], points2d[[i, 1]]])
            .collect();

        let mut doubled = 0.0;
        for i in 0..m {
            let j = (i + 1) % m;
            doubled += pts[i][0] * pts[j][1] - pts[j][0] * pts[i][1];
        }
        if doubled.abs() < EPSILON {
            return Err(ChainError::DegenerateGeometry(0));
        }
        let reversed = doubled < 0.0;

        // Clip on a counter-clockwise copy, emit in the cycle's orientation.
        let mut idx: Vec<usize> = (0..m).collect();
        if reversed {
            idx.reverse();
        }

        let mut triangles = Vec::with_capacity(m - 2);
        while idx.len() > 3 {
            let k = idx.len();
            let ear = (0..k).find(|&i| {
                let (p, c, n) = (pts[idx[(i + k - 1) % k]], pts[idx[i]], pts[idx[(i + 1) % k]]);
                if area2(&p, &c, &n) <= EPSILON {
                    return false;
                }
                idx.iter().all(|&j| {
                    let q = pts[j];
                    q == p || q == c || q == n || !strictly_inside(&q, &p, &c, &n)
                })
            });
            let Some(i) = ear else {
                return Err(ChainError::DegenerateGeometry(0));
            };
            let k = idx.len();
            triangles.push([idx[(i + k - 1) % k], idx[i], idx[(i + 1) % k]]);
            idx.remove(i);
        }
        triangles.push([idx[0], idx[1], idx[2]]);

        Ok(triangles
            .into_iter()
            .map(|t| {
                let t = if reversed { [t[0], t[2], t[1]] } else { t };
                [labels[t[0]], labels[t[1]], labels[t[2]]]
            })
            .collect())
    }
}

/// Arrangement kernel whose fragmenter returns each face's own sub-skeleton
/// unchanged and whose cell extractor wraps all faces into a single 3-cell.
/// Useful for exercising the driver without a real arrangement.
pub struct IdentityKernel;

impl ArrangementKernel for IdentityKernel {
    fn spatial_index(&self, _v: &Points, _cop_ev: &ChainOp, cop_fe: &ChainOp) -> Vec<Vec<usize>> {
        (0..cop_fe.num_rows)
            .map(|f| (0..cop_fe.num_rows).filter(|&g| g != f).collect())
            .collect()
    }

    fn fragment_face(
        &self,
        v: &Points,
        cop_ev: &ChainOp,
        cop_fe: &ChainOp,
        _index: &[Vec<usize>],
        face: usize,
    ) -> Result<(Points, ChainOp, ChainOp)> {
        let mut vorder: Vec<usize> = Vec::new();
        let mut vlocal: HashMap<usize, usize> = HashMap::new();
        let mut ev_rows = Vec::new();
        let mut fe_row = Vec::new();

        for (k, (e, sign)) in cop_fe.row_entries(face).enumerate() {
            let (a, b) = cop_ev
                .endpoints(e)
                .ok_or(ChainError::MalformedComplex(face))?;
            for vi in [a, b] {
                if !vlocal.contains_key(&vi) {
                    vlocal.insert(vi, vorder.len());
                    vorder.push(vi);
                }
            }
            let edge = Edge::new(vlocal[&a], vlocal[&b]);
            let flipped = vlocal[&a] > vlocal[&b];
            ev_rows.push(vec![(edge.lo, -1), (edge.hi, 1)]);
            fe_row.push((k, if flipped { -sign } else { sign }));
        }

        let nv = v.select(Axis(0), &vorder);
        let nev = ChainOp::from_rows(ev_rows, vorder.len());
        let num_edges = nev.num_rows;
        let nfe = ChainOp::from_rows(vec![fe_row], num_edges);
        Ok((nv, nev, nfe))
    }

    fn extract_cells(&self, _v: &Points, _cop_ev: &ChainOp, cop_fe: &ChainOp) -> Result<ChainOp> {
        let row = (0..cop_fe.num_rows).map(|f| (f, 1)).collect();
        Ok(ChainOp::from_rows(vec![row], cop_fe.num_rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_cube_is_closed() {
        let (_, cop_ev, cop_fe) = unit_cube_ops();
        assert_eq!((cop_ev.num_rows, cop_fe.num_rows), (12, 6));
        assert_eq!(cop_fe.compose(&cop_ev).nnz(), 0);
    }

    #[test]
    fn test_ear_clip_square() {
        let points = arr2(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        let labels = vec![10, 11, 12, 13];
        let segments = vec![[0, 1], [1, 2], [2, 3], [3, 0]];
        let triangles = EarClipTriangulator
            .triangulate(&points, &labels, &segments, &[true; 4])
            .unwrap();
        assert_eq!(triangles.len(), 2);
        for t in &triangles {
            assert!(t.iter().all(|l| labels.contains(l)));
        }
    }

    #[test]
    fn test_ear_clip_concave() {
        // L-shaped hexagon.
        let points = arr2(&[
            [0.0, 0.0],
            [2.0, 0.0],
            [2.0, 1.0],
            [1.0, 1.0],
            [1.0, 2.0],
            [0.0, 2.0],
        ]);
        let labels: Vec<usize> = (0..6).collect();
        let triangles = EarClipTriangulator
            .triangulate(&points, &labels, &[], &[])
            .unwrap();
        assert_eq!(triangles.len(), 4);

        let total: f64 = triangles
            .iter()
            .map(|t| 0.5 * area2(&[points[[t[0], 0]], points[[t[0], 1]]],
                                 &[points[[t[1], 0]], points[[t[1], 1]]],
                                 &[points[[t[2], 0]], points[[t[2], 1]]]))
            .sum();
        assert!((total - 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_jitter_stays_within_amplitude() {
        let (v, _, _) = unit_square();
        let jittered = jitter_points(&v, 1e-9);
        for (a, b) in v.iter().zip(jittered.iter()) {
            assert!((a - b).abs() <= 1e-9);
        }
    }
}
