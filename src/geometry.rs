//! Geometric utility functions

use crate::EPSILON;
use crate::types::Points;
use ndarray::{Array1, ArrayView1};

/// Per-axis bounding box of a vertex buffer: (min, max)
pub fn bbox(points: &Points) -> (Array1<f64>, Array1<f64>) {
    let dim = points.ncols();
    let mut min = Array1::from_elem(dim, f64::INFINITY);
    let mut max = Array1::from_elem(dim, f64::NEG_INFINITY);

    for row in points.rows() {
        for (k, &c) in row.iter().enumerate() {
            if c < min[k] {
                min[k] = c;
            }
            if c > max[k] {
                max[k] = c;
            }
        }
    }

    (min, max)
}

/// Componentwise box containment: outer.min <= inner.min <= inner.max <= outer.max
pub fn bbox_contains(outer: &(Array1<f64>, Array1<f64>), inner: &(Array1<f64>, Array1<f64>)) -> bool {
    let (omin, omax) = outer;
    let (imin, imax) = inner;

    omin.iter()
        .zip(imin.iter())
        .zip(imax.iter().zip(omax.iter()))
        .all(|((olo, ilo), (ihi, ohi))| olo <= ilo && ilo <= ihi && ihi <= ohi)
}

/// Signed area of a 2D triangle: half the determinant of the matrix whose
/// rows are (x_i, y_i, 1). Positive for counter-clockwise order.
pub fn triangle_area(p1: ArrayView1<f64>, p2: ArrayView1<f64>, p3: ArrayView1<f64>) -> f64 {
    0.5 * ((p2[0] - p1[0]) * (p3[1] - p1[1]) - (p3[0] - p1[0]) * (p2[1] - p1[1]))
}

/// Signed area of a 2D polygon given as a row-per-vertex buffer in boundary
/// order: the fan of signed triangle areas from the first vertex.
pub fn polygon_area(points2d: &Points) -> f64 {
    let m = points2d.nrows();
    let mut area = 0.0;
    for k in 1..m.saturating_sub(1) {
        area += triangle_area(points2d.row(0), points2d.row(k), points2d.row(k + 1));
    }
    area
}

/// Coordinate-wise vertex equality with absolute tolerance
pub fn vequals(a: ArrayView1<f64>, b: ArrayView1<f64>) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < EPSILON)
}

/// Whether `v` matches any row of `points` within tolerance
pub fn vin(v: ArrayView1<f64>, points: &Points) -> bool {
    points.rows().into_iter().any(|row| vequals(v, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_bbox() {
        let points = arr2(&[[0.0, 2.0], [1.0, -1.0], [0.5, 0.5]]);
        let (min, max) = bbox(&points);
        assert_eq!(min.to_vec(), vec![0.0, -1.0]);
        assert_eq!(max.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_bbox_contains() {
        let outer = bbox(&arr2(&[[0.0, 0.0], [2.0, 2.0]]));
        let inner = bbox(&arr2(&[[0.5, 0.5], [1.0, 1.5]]));
        assert!(bbox_contains(&outer, &inner));
        assert!(!bbox_contains(&inner, &outer));
    }

    #[test]
    fn test_triangle_area_sign() {
        let points = arr2(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        let ccw = triangle_area(points.row(0), points.row(1), points.row(2));
        let cw = triangle_area(points.row(0), points.row(2), points.row(1));
        assert!((ccw - 0.5).abs() < EPSILON);
        assert!((cw + 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_polygon_area() {
        let square = arr2(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        assert!((polygon_area(&square) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_vequals_and_vin() {
        let points = arr2(&[[0.0, 0.0], [1.0, 0.0]]);
        let near = ndarray::arr1(&[1.0 + 1e-9, 0.0]);
        let far = ndarray::arr1(&[1.0 + 1e-6, 0.0]);
        assert!(vequals(near.view(), points.row(1)));
        assert!(vin(near.view(), &points));
        assert!(!vin(far.view(), &points));
    }
}
