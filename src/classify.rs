//! Point-in-face classification
//!
//! A tile-code crossing-number test of a query point against the edges of a
//! planar face. On-boundary, through-vertex and horizontal-edge degeneracies
//! are resolved deterministically by the code table below.

use crate::sparse::ChainOp;
use crate::types::{Cell, Points};
use serde::{Deserialize, Serialize};

/// Position of a point relative to a planar face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointPosition {
    Inside,
    Outside,
    OnBoundary,
}

/// 4-bit tile code of (x, y) relative to the query point: bit 0 above,
/// bit 1 below, bit 2 right, bit 3 left. Code 0 coincides with the query.
fn tile_code(x: f64, y: f64, qx: f64, qy: f64) -> u8 {
    let mut code = 0u8;
    if y > qy {
        code |= 1;
    }
    if y < qy {
        code |= 2;
    }
    if x > qx {
        code |= 4;
    }
    if x < qx {
        code |= 8;
    }
    code
}

/// Axis-grazing state machine for edges that end on the query's horizontal
/// ray. A graze opens half a crossing; the following graze completes it when
/// the edge continues to the other side (stored status equals `old`) and
/// cancels it when the boundary returns to the same side.
fn crossing_test(new: u8, old: u8, status: &mut u8, count: &mut f64) {
    if *status == 0 {
        *status = new;
        *count += 0.5;
    } else {
        if *status == old {
            *count += 0.5;
        } else {
            *count -= 0.5;
        }
        *status = 0;
    }
}

/// Classify `point` against the face bounded by `edges` over the 2D vertex
/// buffer `v`.
///
/// Any edge that reports an on-boundary condition short-circuits the scan;
/// otherwise the rounded crossing count decides by parity.
pub fn point_in_face(point: &[f64; 2], v: &Points, edges: &[[usize; 2]]) -> PointPosition {
    let (qx, qy) = (point[0], point[1]);
    let mut count = 0.0f64;
    let mut status = 0u8;

    for &[a, b] in edges {
        let (x1, y1) = (v[[a, 0]], v[[a, 1]]);
        let (x2, y2) = (v[[b, 0]], v[[b, 1]]);
        let c1 = tile_code(x1, y1, qx, qy);
        let c2 = tile_code(x2, y2, qx, qy);
        let (c_edge, c_un, c_int) = (c1 ^ c2, c1 | c2, c1 & c2);

        match c_edge {
            // Both endpoints coincide with the query point.
            0 if c_un == 0 => return PointPosition::OnBoundary,
            // Horizontal edge on the query's row, query between endpoints.
            12 if c_un == c_edge => return PointPosition::OnBoundary,
            // Pure vertical crossing of the query's row.
            3 => {
                if c_int == 0 {
                    return PointPosition::OnBoundary;
                }
                if c_int == 4 {
                    count += 1.0;
                }
            }
            // Full diagonal: decide by the x-intercept on the query's row.
            15 => {
                let x_int = x2 + (qy - y2) * (x1 - x2) / (y1 - y2);
                if x_int == qx {
                    return PointPosition::OnBoundary;
                }
                if x_int > qx {
                    count += 1.0;
                }
            }
            // One endpoint on the right half-ray, the other across the row.
            13 if c1 == 4 || c2 == 4 => crossing_test(1, 2, &mut status, &mut count),
            14 if c1 == 4 || c2 == 4 => crossing_test(2, 1, &mut status, &mut count),
            7 => count += 1.0,
            11 => {}
            // Vertical motion ending on the query's row.
            1 => {
                if c_int == 0 {
                    return PointPosition::OnBoundary;
                }
                if c_int == 4 {
                    crossing_test(1, 2, &mut status, &mut count);
                }
            }
            2 => {
                if c_int == 0 {
                    return PointPosition::OnBoundary;
                }
                if c_int == 4 {
                    crossing_test(2, 1, &mut status, &mut count);
                }
            }
            // Collinear with the ray through an endpoint at the query.
            4 | 8 if c_un == c_edge => return PointPosition::OnBoundary,
            5 | 6 if c1 == 0 || c2 == 0 => return PointPosition::OnBoundary,
            5 => crossing_test(1, 2, &mut status, &mut count),
            6 => crossing_test(2, 1, &mut status, &mut count),
            9 | 10 if c1 == 0 || c2 == 0 => return PointPosition::OnBoundary,
            _ => {}
        }
    }

    if (count.round() as i64).rem_euclid(2) == 1 {
        PointPosition::Inside
    } else {
        PointPosition::Outside
    }
}

/// Edge endpoint pairs of a face over copEV, for feeding [`point_in_face`].
pub fn face_edges(cop_ev: &ChainOp, face: &Cell) -> Vec<[usize; 2]> {
    match face {
        Cell::Chain(chain) => chain
            .iter()
            .filter(|&&(_, s)| s != 0)
            .filter_map(|&(e, _)| cop_ev.endpoints(e))
            .map(|(a, b)| [a, b])
            .collect(),
        Cell::Edges(edges) => edges
            .iter()
            .filter_map(|&e| cop_ev.endpoints(e))
            .map(|(a, b)| [a, b])
            .collect(),
        Cell::Vertices(verts) => {
            let set: std::collections::HashSet<usize> = verts.iter().copied().collect();
            (0..cop_ev.num_rows)
                .filter_map(|e| cop_ev.endpoints(e))
                .filter(|(a, b)| set.contains(a) && set.contains(b))
                .map(|(a, b)| [a, b])
                .collect()
        }
    }
}
