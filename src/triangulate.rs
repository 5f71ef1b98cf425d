//! Constrained face triangulation with orientation repair
//!
//! Each face is projected onto its own plane, handed to an external
//! constrained-triangulation primitive behind the [`Triangulator`] seam, and
//! re-oriented from the signed planar area of its boundary cycle.

use crate::cycles;
use crate::sparse::ChainOp;
use crate::types::{Cell, Points};
use crate::{ChainError, EPSILON, Result, geometry};
use ndarray::Array2;

/// The external constrained-triangulation primitive.
///
/// `points2d` are the planar coordinates of a face boundary, `labels` the
/// original vertex index of each point, `segments` the constraint edges as
/// local point-index pairs and `boundary` their boundary flags. The returned
/// triples are labels, wound in the orientation of the constraint cycle.
pub trait Triangulator {
    fn triangulate(
        &self,
        points2d: &Points,
        labels: &[usize],
        segments: &[[usize; 2]],
        boundary: &[bool],
    ) -> Result<Vec<[usize; 3]>>;
}

fn sub3(v: &Points, i: usize, origin: &[f64; 3]) -> [f64; 3] {
    [
        v[[i, 0]] - origin[0],
        v[[i, 1]] - origin[1],
        v[[i, 2]] - origin[2],
    ]
}

fn dot3(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross3(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm3(a: &[f64; 3]) -> f64 {
    dot3(a, a).sqrt()
}

fn normalize3(a: &[f64; 3]) -> Option<[f64; 3]> {
    let n = norm3(a);
    if n < EPSILON {
        return None;
    }
    Some([a[0] / n, a[1] / n, a[2] / n])
}

/// In-plane basis (v1, v2) of the face through the cycle's vertices.
///
/// v1 points from the first cycle vertex to the second; further vertices are
/// scanned until one yields a direction whose cross product with v1 is
/// non-degenerate. A collinear cycle fails with
/// [`ChainError::DegenerateGeometry`].
fn plane_basis(v: &Points, cycle: &[usize], cell: usize) -> Result<([f64; 3], [f64; 3])> {
    if cycle.len() < 3 {
        return Err(ChainError::DegenerateGeometry(cell));
    }
    let origin = [
        v[[cycle[0], 0]],
        v[[cycle[0], 1]],
        v[[cycle[0], 2]],
    ];

    let v1 = normalize3(&sub3(v, cycle[1], &origin)).ok_or(ChainError::DegenerateGeometry(cell))?;
    for &vi in &cycle[2..] {
        let Some(v2) = normalize3(&sub3(v, vi, &origin)) else {
            continue;
        };
        if norm3(&cross3(&v1, &v2)) > EPSILON {
            return Ok((v1, v2));
        }
    }
    Err(ChainError::DegenerateGeometry(cell))
}

/// Planar coordinates of the cycle's vertices in the (v1, v2) basis.
fn project_cycle(v: &Points, cycle: &[usize], basis: &([f64; 3], [f64; 3])) -> Points {
    let origin = [
        v[[cycle[0], 0]],
        v[[cycle[0], 1]],
        v[[cycle[0], 2]],
    ];
    let mut points2d = Array2::zeros((cycle.len(), 2));
    for (k, &vi) in cycle.iter().enumerate() {
        let d = sub3(v, vi, &origin);
        points2d[[k, 0]] = dot3(&d, &basis.0);
        points2d[[k, 1]] = dot3(&d, &basis.1);
    }
    points2d
}

/// Triangulate one projected face boundary: constrain the consecutive cycle
/// pairs, then reverse every triangle when the cycle's signed planar area is
/// negative, so the triangles sum to a non-negative area in this frame.
fn triangulate_cycle(
    points2d: &Points,
    cycle: &[usize],
    triangulator: &impl Triangulator,
    cell: usize,
) -> Result<Vec<[usize; 3]>> {
    let m = cycle.len();
    let segments: Vec<[usize; 2]> = (0..m).map(|k| [k, (k + 1) % m]).collect();
    let boundary = vec![true; m];

    let mut triangles = triangulator
        .triangulate(points2d, cycle, &segments, &boundary)
        .map_err(|e| match e {
            ChainError::DegenerateGeometry(_) => ChainError::DegenerateGeometry(cell),
            other => other,
        })?;

    if geometry::polygon_area(points2d) < 0.0 {
        for t in &mut triangles {
            t.swap(1, 2);
        }
    }
    Ok(triangles)
}

/// Triangulate every face of a 3D 2-complex.
///
/// Per face: recover the boundary cycle from its signed chain, project it to
/// the face plane, triangulate, and repair orientation from the signed area
/// of the projected cycle.
///
/// # Panics
///
/// Panics if `v` is not three-dimensional.
pub fn triangulate_faces(
    v: &Points,
    cop_ev: &ChainOp,
    cop_fe: &ChainOp,
    triangulator: &impl Triangulator,
) -> Result<Vec<Vec<[usize; 3]>>> {
    assert_eq!(v.ncols(), 3, "triangulation expects 3D vertices");

    let mut faces = Vec::with_capacity(cop_fe.num_rows);
    for f in 0..cop_fe.num_rows {
        let cycle = cycles::face_cycle(cop_ev, &Cell::from_row(cop_fe, f), f)?;
        let basis = plane_basis(v, &cycle, f)?;
        let points2d = project_cycle(v, &cycle, &basis);
        faces.push(triangulate_cycle(&points2d, &cycle, triangulator, f)?);
    }
    Ok(faces)
}

/// Triangulate every face of a planar 2-complex in place, without any
/// projection: orientation repair happens in the global frame, so each
/// face's triangles sum to a non-negative area there.
pub fn triangulate_faces_2d(
    v: &Points,
    cop_ev: &ChainOp,
    cop_fe: &ChainOp,
    triangulator: &impl Triangulator,
) -> Result<Vec<Vec<[usize; 3]>>> {
    let mut faces = Vec::with_capacity(cop_fe.num_rows);
    for f in 0..cop_fe.num_rows {
        let cycle = cycles::face_cycle(cop_ev, &Cell::from_row(cop_fe, f), f)?;
        let mut points2d = Array2::zeros((cycle.len(), 2));
        for (k, &vi) in cycle.iter().enumerate() {
            points2d[[k, 0]] = v[[vi, 0]];
            points2d[[k, 1]] = v[[vi, 1]];
        }
        faces.push(triangulate_cycle(&points2d, &cycle, triangulator, f)?);
    }
    Ok(faces)
}

/// Signed area of the face `cell`: the boundary cycle is recovered and the
/// signed triangle areas of its fan are summed over the first two
/// coordinates. The sign reveals the face's orientation.
pub fn face_area(v: &Points, cop_ev: &ChainOp, face: &Cell, cell: usize) -> Result<f64> {
    let cycle = cycles::face_cycle(cop_ev, face, cell)?;
    let mut points2d = Array2::zeros((cycle.len(), 2));
    for (k, &vi) in cycle.iter().enumerate() {
        points2d[[k, 0]] = v[[vi, 0]];
        points2d[[k, 1]] = v[[vi, 1]];
    }
    Ok(geometry::polygon_area(&points2d))
}
