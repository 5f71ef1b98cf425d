//! 3D spatial arrangement driver
//!
//! Fragments every face of a 2-complex against its candidate neighbors
//! (through an external fragmenter), accumulates the per-face skeletons,
//! normalizes the result with a deterministic vertex merge and finally asks
//! an external 3-cycle extractor for the cell operator.

use crate::sparse::ChainOp;
use crate::types::{Edge, Points};
use crate::{EPSILON, Result, skeleton};
use ndarray::{Array2, Axis};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};

/// Fragmentation is fanned across rayon workers from this face count on;
/// below it the sequential path is faster.
const PARALLEL_THRESHOLD: usize = 64;

/// External collaborators of the arrangement: the spatial index, the
/// per-face fragmenter and the minimal-3-cycle extractor.
pub trait ArrangementKernel {
    /// Candidate neighbor faces for each face of the complex.
    fn spatial_index(&self, v: &Points, cop_ev: &ChainOp, cop_fe: &ChainOp) -> Vec<Vec<usize>>;

    /// Fragment `face` against its candidates, returning the sub-skeleton
    /// (vertices, copEV, copFE) of the fragments, locally indexed.
    fn fragment_face(
        &self,
        v: &Points,
        cop_ev: &ChainOp,
        cop_fe: &ChainOp,
        index: &[Vec<usize>],
        face: usize,
    ) -> Result<(Points, ChainOp, ChainOp)>;

    /// copCF of the merged 2-skeleton: one row per 3-cell, signs giving the
    /// outward orientation of each face.
    fn extract_cells(&self, v: &Points, cop_ev: &ChainOp, cop_fe: &ChainOp) -> Result<ChainOp>;
}

/// A fully arranged 3D complex
#[derive(Debug, Clone)]
pub struct Arrangement3d {
    pub vertices: Points,
    pub cop_ev: ChainOp,
    pub cop_fe: ChainOp,
    pub cop_cf: ChainOp,
}

/// Arrange a 3D 2-complex: fragment each face, merge the fragment skeletons,
/// deduplicate vertices and extract the 3-cells.
///
/// Fragmentation runs to completion; a fragmenter failure aborts the whole
/// arrangement. The final merge renumbers vertices lexicographically, so the
/// result does not depend on the number of workers.
pub fn arrange_3d<K>(
    v: &Points,
    cop_ev: &ChainOp,
    cop_fe: &ChainOp,
    kernel: &K,
) -> Result<Arrangement3d>
where
    K: ArrangementKernel + Sync,
{
    arrange_with(v, cop_ev, cop_fe, kernel, cop_fe.num_rows >= PARALLEL_THRESHOLD)
}

fn arrange_with<K>(
    v: &Points,
    cop_ev: &ChainOp,
    cop_fe: &ChainOp,
    kernel: &K,
    parallel: bool,
) -> Result<Arrangement3d>
where
    K: ArrangementKernel + Sync,
{
    let index = kernel.spatial_index(v, cop_ev, cop_fe);

    let fragments: Vec<(Points, ChainOp, ChainOp)> = if parallel {
        (0..cop_fe.num_rows)
            .into_par_iter()
            .map(|f| kernel.fragment_face(v, cop_ev, cop_fe, &index, f))
            .collect::<Result<_>>()?
    } else {
        (0..cop_fe.num_rows)
            .map(|f| kernel.fragment_face(v, cop_ev, cop_fe, &index, f))
            .collect::<Result<_>>()?
    };
    log::debug!("fragmented {} faces", fragments.len());

    let mut acc_v: Points = Array2::zeros((0, v.ncols()));
    let mut acc_ev = ChainOp::new(0, 0);
    let mut acc_fe = ChainOp::new(0, 0);
    for (nv, nev, nfe) in &fragments {
        (acc_v, acc_ev, acc_fe) =
            skeleton::merge_2_skeletons(&acc_v, &acc_ev, &acc_fe, nv, nev, nfe);
    }

    let (vertices, cop_ev, cop_fe) = merge_vertices(&acc_v, &acc_ev, &acc_fe);
    let cop_cf = kernel.extract_cells(&vertices, &cop_ev, &cop_fe)?;

    Ok(Arrangement3d {
        vertices,
        cop_ev,
        cop_fe,
        cop_cf,
    })
}

/// Deduplicate vertices within tolerance and rebuild the incidence operators
/// over the surviving cells.
///
/// Vertices are swept once in lexicographic coordinate order, each one
/// mapping to the first representative within ε per coordinate (the
/// tolerance is not transitive, so a single sweep decides membership).
/// Edges are rebuilt in canonical signed form (-1 at the low endpoint),
/// collapsed edges are dropped, duplicate edge and face rows are removed and
/// all surviving rows are renumbered in a fixed lexicographic order, making
/// the output independent of the order in which fragments were accumulated.
pub fn merge_vertices(
    v: &Points,
    cop_ev: &ChainOp,
    cop_fe: &ChainOp,
) -> (Points, ChainOp, ChainOp) {
    let n = v.nrows();
    let dim = v.ncols();

    // Single sweep in lexicographic coordinate order.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        (0..dim)
            .map(|k| v[[a, k]].total_cmp(&v[[b, k]]))
            .find(|ord| ord.is_ne())
            .unwrap_or(a.cmp(&b))
    });

    let mut reps: Vec<usize> = Vec::new();
    let mut vmap = vec![0usize; n];
    for &i in &order {
        let mut found = None;
        // Representatives are discovered with non-decreasing first
        // coordinate, so the backward scan can stop at the first x gap.
        for r in (0..reps.len()).rev() {
            let ri = reps[r];
            if v[[i, 0]] - v[[ri, 0]] >= EPSILON {
                break;
            }
            if (0..dim).all(|k| (v[[i, k]] - v[[ri, k]]).abs() < EPSILON) {
                found = Some(r);
                break;
            }
        }
        match found {
            Some(r) => vmap[i] = r,
            None => {
                vmap[i] = reps.len();
                reps.push(i);
            }
        }
    }
    log::debug!("merged {} vertices into {}", n, reps.len());

    // Remap edges onto representatives; drop collapsed ones. An edge whose
    // canonical direction reverses under the renumbering flips the sign of
    // every face traversal through it.
    let mut pairs: BTreeSet<Edge> = BTreeSet::new();
    let mut mapped: Vec<Option<(Edge, bool)>> = Vec::with_capacity(cop_ev.num_rows);
    for e in 0..cop_ev.num_rows {
        let Some((a, b)) = cop_ev.endpoints(e) else {
            mapped.push(None);
            continue;
        };
        let (ma, mb) = (vmap[a], vmap[b]);
        if ma == mb {
            log::warn!("edge {} collapsed to a point and was dropped", e);
            mapped.push(None);
            continue;
        }
        let edge = Edge::new(ma, mb);
        pairs.insert(edge);
        mapped.push(Some((edge, ma > mb)));
    }

    let pairs: Vec<Edge> = pairs.into_iter().collect();
    let edge_index: HashMap<Edge, usize> =
        pairs.iter().enumerate().map(|(i, &e)| (e, i)).collect();
    let edge_map: Vec<Option<(usize, bool)>> = mapped
        .into_iter()
        .map(|entry| entry.map(|(edge, flipped)| (edge_index[&edge], flipped)))
        .collect();

    // Face rows over the new edge numbering, deduplicated up to orientation.
    let mut face_rows: BTreeSet<Vec<(usize, i32)>> = BTreeSet::new();
    for f in 0..cop_fe.num_rows {
        let mut entries: Vec<(usize, i32)> = cop_fe
            .row_entries(f)
            .filter_map(|(e, s)| edge_map[e].map(|(idx, flipped)| (idx, if flipped { -s } else { s })))
            .collect();
        entries.sort_by_key(|&(col, _)| col);

        let mut summed: Vec<(usize, i32)> = Vec::with_capacity(entries.len());
        for (col, val) in entries {
            match summed.last_mut() {
                Some(last) if last.0 == col => last.1 += val,
                _ => summed.push((col, val)),
            }
        }
        summed.retain(|&(_, val)| val != 0);
        if summed.is_empty() {
            continue;
        }
        if summed[0].1 < 0 {
            for entry in &mut summed {
                entry.1 = -entry.1;
            }
        }
        face_rows.insert(summed);
    }
    let face_rows: Vec<Vec<(usize, i32)>> = face_rows.into_iter().collect();

    // Drop edges no face references (only meaningful when faces exist).
    let (face_rows, pairs) = if cop_fe.num_rows > 0 {
        let fe = ChainOp::from_rows(face_rows, pairs.len());
        let (fe, kept) = fe.drop_empty_cols();
        let pairs: Vec<Edge> = kept.iter().map(|&e| pairs[e]).collect();
        let rows = (0..fe.num_rows).map(|f| fe.row_entries(f).collect()).collect::<Vec<_>>();
        (rows, pairs)
    } else {
        (face_rows, pairs)
    };

    let ev_rows: Vec<Vec<(usize, i32)>> = pairs
        .iter()
        .map(|edge| vec![(edge.lo, -1), (edge.hi, 1)])
        .collect();
    let cop_ev2 = ChainOp::from_rows(ev_rows, reps.len());
    let cop_fe2 = ChainOp::from_rows(face_rows, cop_ev2.num_rows);

    // Drop vertices no surviving edge references.
    let rep_v = v.select(Axis(0), &reps);
    if cop_ev2.num_rows == 0 {
        return (rep_v, cop_ev2, cop_fe2);
    }
    let (cop_ev2, kept_verts) = cop_ev2.drop_empty_cols();
    let vertices = rep_v.select(Axis(0), &kept_verts);
    (vertices, cop_ev2, cop_fe2)
}
