//! Integration tests for the chain-complex core
//!
//! Each test mirrors one end-to-end scenario: operator construction on the
//! unit square, point classification, degenerate-face rejection, orientation
//! repair, the cube mesh round trip and arrangement determinism.

use cell_complex::{
    Cell, ChainError, EPSILON, PointPosition, arrange_3d, classify, cycles, face_area, geometry,
    incidence, merge_vertices, obj, testdata, triangulate,
};
use ndarray::arr2;

#[test]
fn test_unit_square_operators() {
    let (_, ev, fv) = testdata::unit_square();

    let cop_ev = incidence::edge_vertex_op(&ev, true);
    println!("copEV: {} edges over {} vertices", cop_ev.num_rows, cop_ev.num_cols);
    assert_eq!((cop_ev.num_rows, cop_ev.num_cols), (4, 4));
    for (i, e) in ev.iter().enumerate() {
        let (lo, hi) = (*e.iter().min().unwrap(), *e.iter().max().unwrap());
        assert_eq!(cop_ev.get(i, lo), -1);
        assert_eq!(cop_ev.get(i, hi), 1);
    }

    let cop_fe = incidence::face_edge_op(&fv, &ev).unwrap();
    let signs: Vec<i32> = (0..4).map(|e| cop_fe.get(0, e)).collect();
    println!("copFE signs: {:?}", signs);
    assert_eq!(signs, vec![1, 1, 1, -1]);

    // The square's boundary is a closed 1-cycle.
    assert_eq!(cop_fe.compose(&cop_ev).nnz(), 0);
}

#[test]
fn test_unit_square_classification() {
    let (v, edges) = testdata::unit_square_2d();

    let cases = [
        ([0.5, 0.5], PointPosition::Inside),
        ([1.5, 0.5], PointPosition::Outside),
        ([1.0, 0.5], PointPosition::OnBoundary),
        ([0.0, 0.0], PointPosition::OnBoundary),
    ];
    for (point, expected) in cases {
        let result = classify::point_in_face(&point, &v, &edges);
        println!("({}, {}) -> {:?}", point[0], point[1], result);
        assert_eq!(result, expected);
    }
}

#[test]
fn test_collinear_face_is_rejected() {
    let v = arr2(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
    let ev = vec![vec![0, 1], vec![1, 2], vec![0, 2]];
    let fv = vec![vec![0, 1, 2]];
    let (cop_ev, cop_fe) = incidence::face_ops(&ev, &fv).unwrap();

    let result =
        triangulate::triangulate_faces(&v, &cop_ev, &cop_fe, &testdata::EarClipTriangulator);
    assert!(matches!(result, Err(ChainError::DegenerateGeometry(0))));
}

#[test]
fn test_clockwise_square_orientation_repair() {
    let (v, cop_ev, cop_fe) = testdata::clockwise_square_ops();
    assert!(face_area(&v, &cop_ev, &Cell::from_row(&cop_fe, 0), 0).unwrap() < 0.0);

    let faces =
        triangulate::triangulate_faces_2d(&v, &cop_ev, &cop_fe, &testdata::EarClipTriangulator)
            .unwrap();
    let total: f64 = faces[0]
        .iter()
        .map(|t| geometry::triangle_area(v.row(t[0]), v.row(t[1]), v.row(t[2])))
        .sum();
    println!("summed signed area after repair: {}", total);
    assert!(total > 0.0);
}

#[test]
fn test_cube_mesh_round_trip() {
    let (v, cop_ev, cop_fe) = testdata::unit_cube_ops();
    let file = tempfile::NamedTempFile::new().unwrap();
    obj::export_obj(file.path(), &v, &cop_ev, &cop_fe, &testdata::EarClipTriangulator).unwrap();

    let (v2, cop_ev2, cop_fe2) = obj::import_obj(file.path()).unwrap();
    println!(
        "round trip: {} vertices, {} edges, {} faces",
        v2.nrows(),
        cop_ev2.num_rows,
        cop_fe2.num_rows
    );
    assert_eq!(v2.nrows(), 8);
    // 12 cube edges plus the diagonal the triangulation adds per square face.
    assert_eq!(cop_ev2.num_rows, 18);
    assert_eq!(cop_fe2.num_rows, 12);
    assert_eq!(cop_fe2.compose(&cop_ev2).nnz(), 0);

    for (a, b) in v.iter().zip(v2.iter()) {
        assert!((a - b).abs() < 1e-6);
    }
}

#[test]
fn test_arrangement_is_deterministic() {
    let (v, cop_ev, cop_fe) = testdata::unit_cube_ops();

    let first = arrange_3d(&v, &cop_ev, &cop_fe, &testdata::IdentityKernel).unwrap();
    let second = arrange_3d(&v, &cop_ev, &cop_fe, &testdata::IdentityKernel).unwrap();

    assert_eq!(first.vertices, second.vertices);
    assert_eq!(first.cop_ev, second.cop_ev);
    assert_eq!(first.cop_fe, second.cop_fe);
    assert_eq!(first.cop_cf, second.cop_cf);

    assert_eq!(first.vertices.nrows(), 8);
    assert_eq!(first.cop_ev.num_rows, 12);
    assert_eq!(first.cop_fe.num_rows, 6);
}

#[test]
fn test_face_edge_sign_consistency() {
    // Property: copFE is +1 exactly where the face's recovered cycle
    // traverses the edge from its low-index to its high-index endpoint.
    let (_, ev, _) = testdata::unit_cube();
    let (_, cop_ev, cop_fe) = testdata::unit_cube_ops();

    for f in 0..cop_fe.num_rows {
        let cycle = cycles::face_cycle(&cop_ev, &Cell::from_row(&cop_fe, f), f).unwrap();
        for k in 0..cycle.len() {
            let (a, b) = (cycle[k], cycle[(k + 1) % cycle.len()]);
            let e = ev
                .iter()
                .position(|edge| edge.iter().min() == [a, b].iter().min()
                    && edge.iter().max() == [a, b].iter().max())
                .unwrap();
            let expected = if b > a { 1 } else { -1 };
            assert_eq!(cop_fe.get(f, e), expected, "face {} edge {}", f, e);
        }
    }
}

#[test]
fn test_merge_collapses_jittered_duplicates() {
    // A duplicated square with sub-tolerance jitter collapses back onto the
    // original four vertices.
    let (v, cop_ev, cop_fe) = testdata::two_squares_disjoint();
    let jittered = testdata::jitter_points(&v, EPSILON / 4.0);

    let (mv, mev, mfe) = merge_vertices(&jittered, &cop_ev, &cop_fe);
    assert_eq!(mv.nrows(), 6);
    assert_eq!(mev.num_rows, 7);
    assert_eq!(mfe.num_rows, 2);
}

#[test]
fn test_cell_list_round_trip() {
    let (_, ev, fv) = testdata::unit_cube();

    let cells: Vec<Vec<usize>> = ev.iter().chain(fv.iter()).cloned().collect();
    let op = incidence::cells_to_op(&cells);
    let back = incidence::op_to_cells(&op);
    for (cell, round) in cells.iter().zip(back.iter()) {
        let mut sorted = cell.clone();
        sorted.sort_unstable();
        assert_eq!(&sorted, round);
    }
    assert_eq!(incidence::cells_to_op(&back), op);
}
