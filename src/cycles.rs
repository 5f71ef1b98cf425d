//! Boundary-cycle recovery for faces
//!
//! Recovers the ordered vertex cycle of a face from its edge incidences.
//! The three accepted face shapes (signed chain, vertex list, unsigned edge
//! support) share one output contract: a single closed boundary traversal
//! with consistent orientation and no repeated start vertex.

use crate::sparse::ChainOp;
use crate::types::Cell;
use crate::{ChainError, Result};
use std::collections::{HashMap, HashSet};

/// Ordered vertex cycle of the face `cell`, dispatching on its representation.
///
/// For a face with internal boundaries only the orbit reached from the first
/// edge is returned; use [`face_cycles`] to recover every orbit.
pub fn face_cycle(cop_ev: &ChainOp, face: &Cell, cell: usize) -> Result<Vec<usize>> {
    match face {
        Cell::Chain(chain) => signed_chain_cycle(cop_ev, chain, cell),
        Cell::Vertices(verts) => unsigned_walk_cycle(cop_ev, verts, cell),
        Cell::Edges(edges) => edge_pattern_cycle(cop_ev, edges, cell),
    }
}

/// All boundary orbits of a signed face chain.
///
/// A simple face yields one orbit; each hole contributes a further one.
pub fn face_cycles(cop_ev: &ChainOp, chain: &[(usize, i32)], cell: usize) -> Result<Vec<Vec<usize>>> {
    let succ = signed_successors(cop_ev, chain, cell)?;
    let mut seeds: Vec<usize> = succ.keys().copied().collect();
    seeds.sort_unstable();

    let mut visited = HashSet::new();
    let mut orbits = Vec::new();
    for seed in seeds {
        if visited.contains(&seed) {
            continue;
        }
        let orbit = walk_orbit(&succ, seed, succ.len(), cell)?;
        visited.extend(orbit.iter().copied());
        orbits.push(orbit);
    }
    Ok(orbits)
}

/// Endpoints of edge `e`, low index first.
fn endpoints_of(cop_ev: &ChainOp, e: usize, cell: usize) -> Result<(usize, usize)> {
    cop_ev.endpoints(e).ok_or(ChainError::MalformedComplex(cell))
}

/// Tail -> head successor map of a signed chain: a positive coefficient
/// traverses the edge in its canonical low -> high direction.
fn signed_successors(
    cop_ev: &ChainOp,
    chain: &[(usize, i32)],
    cell: usize,
) -> Result<HashMap<usize, usize>> {
    let mut succ = HashMap::with_capacity(chain.len());
    for &(e, sign) in chain {
        if sign == 0 {
            continue;
        }
        if e >= cop_ev.num_rows {
            return Err(ChainError::MalformedComplex(cell));
        }
        let (lo, hi) = endpoints_of(cop_ev, e, cell)?;
        let (tail, head) = if sign > 0 { (lo, hi) } else { (hi, lo) };
        if succ.insert(tail, head).is_some() {
            // Two edges leave the same vertex: not a permutation.
            return Err(ChainError::MalformedComplex(cell));
        }
    }
    if succ.is_empty() {
        return Err(ChainError::MalformedComplex(cell));
    }
    Ok(succ)
}

/// Follow the successor permutation from `start` until it returns there.
fn walk_orbit(
    succ: &HashMap<usize, usize>,
    start: usize,
    limit: usize,
    cell: usize,
) -> Result<Vec<usize>> {
    let mut cycle = vec![start];
    let mut cur = *succ.get(&start).ok_or(ChainError::MalformedComplex(cell))?;
    while cur != start {
        if cycle.len() > limit {
            return Err(ChainError::MalformedComplex(cell));
        }
        cycle.push(cur);
        cur = *succ.get(&cur).ok_or(ChainError::MalformedComplex(cell))?;
    }
    Ok(cycle)
}

/// Signed-chain walk: the chain's signs orient every edge, and the
/// tail -> head pairs form a permutation whose orbits are the boundary
/// cycles; the orbit of the first edge's tail is returned.
fn signed_chain_cycle(cop_ev: &ChainOp, chain: &[(usize, i32)], cell: usize) -> Result<Vec<usize>> {
    let succ = signed_successors(cop_ev, chain, cell)?;

    let &(e0, sign0) = chain
        .iter()
        .find(|&&(_, s)| s != 0)
        .ok_or(ChainError::MalformedComplex(cell))?;
    let (lo, hi) = endpoints_of(cop_ev, e0, cell)?;
    let start = if sign0 > 0 { lo } else { hi };

    walk_orbit(&succ, start, succ.len(), cell)
}

/// Unsigned walk over a vertex list: at each step the next edge is the first
/// (by edge index) unused edge incident to the current vertex whose other
/// endpoint belongs to the face and has not been visited, the start vertex
/// excepted.
fn unsigned_walk_cycle(cop_ev: &ChainOp, verts: &[usize], cell: usize) -> Result<Vec<usize>> {
    if verts.len() < 3 {
        return Err(ChainError::MalformedComplex(cell));
    }
    let face_set: HashSet<usize> = verts.iter().copied().collect();

    // Incident face edges per vertex, in edge-index order.
    let mut incident: HashMap<usize, Vec<(usize, usize)>> = HashMap::new();
    for e in 0..cop_ev.num_rows {
        if let Some((a, b)) = cop_ev.endpoints(e) {
            if face_set.contains(&a) && face_set.contains(&b) {
                incident.entry(a).or_default().push((e, b));
                incident.entry(b).or_default().push((e, a));
            }
        }
    }

    let start = verts[0];
    let mut cycle = vec![start];
    let mut visited: HashSet<usize> = HashSet::from([start]);
    let mut used: HashSet<usize> = HashSet::new();
    let mut cur = start;

    loop {
        let candidates = incident
            .get(&cur)
            .ok_or(ChainError::AmbiguousTraversal(cell))?;
        let next = candidates.iter().find(|&&(e, w)| {
            !used.contains(&e) && (!visited.contains(&w) || (w == start && cycle.len() >= 3))
        });
        let &(e, w) = next.ok_or(ChainError::AmbiguousTraversal(cell))?;
        used.insert(e);
        if w == start {
            return Ok(cycle);
        }
        visited.insert(w);
        cycle.push(w);
        cur = w;
    }
}

/// Edge-structural walk: orientation is reconstructed from the nonzero
/// pattern alone by chaining edges through shared endpoints; the first edge
/// is traversed low -> high.
fn edge_pattern_cycle(cop_ev: &ChainOp, edges: &[usize], cell: usize) -> Result<Vec<usize>> {
    if edges.is_empty() {
        return Err(ChainError::MalformedComplex(cell));
    }

    // Incident face edges per endpoint, in the order the support lists them.
    let mut incident: HashMap<usize, Vec<(usize, usize)>> = HashMap::new();
    for &e in edges {
        let (a, b) = endpoints_of(cop_ev, e, cell)?;
        incident.entry(a).or_default().push((e, b));
        incident.entry(b).or_default().push((e, a));
    }

    let (start, mut cur) = endpoints_of(cop_ev, edges[0], cell)?;
    let mut used: HashSet<usize> = HashSet::from([edges[0]]);
    let mut cycle = vec![start];

    while cur != start {
        if cycle.len() > edges.len() {
            return Err(ChainError::MalformedComplex(cell));
        }
        cycle.push(cur);
        let candidates = incident
            .get(&cur)
            .ok_or(ChainError::MalformedComplex(cell))?;
        let next = candidates.iter().find(|&&(e, _)| !used.contains(&e));
        let &(e, w) = next.ok_or(ChainError::MalformedComplex(cell))?;
        used.insert(e);
        cur = w;
    }
    Ok(cycle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incidence;

    fn square_ops() -> (ChainOp, ChainOp) {
        let ev = vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![0, 3]];
        let fv = vec![vec![0, 1, 2, 3]];
        incidence::face_ops(&ev, &fv).unwrap()
    }

    #[test]
    fn test_signed_chain_cycle() {
        let (cop_ev, cop_fe) = square_ops();
        let cycle = face_cycle(&cop_ev, &Cell::from_row(&cop_fe, 0), 0).unwrap();
        assert_eq!(cycle, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_unsigned_walk_cycle() {
        let (cop_ev, _) = square_ops();
        // Unordered vertex set: the walk recovers a boundary order.
        let cycle = face_cycle(&cop_ev, &Cell::Vertices(vec![0, 2, 1, 3]), 0).unwrap();
        assert_eq!(cycle.len(), 4);
        assert_eq!(cycle[0], 0);
        // Consecutive cycle vertices are joined by an edge of the square.
        for k in 0..4 {
            let (a, b) = (cycle[k], cycle[(k + 1) % 4]);
            assert!((a as i32 - b as i32).abs() == 1 || (a, b) == (3, 0) || (a, b) == (0, 3));
        }
    }

    #[test]
    fn test_edge_pattern_cycle() {
        let (cop_ev, _) = square_ops();
        let cycle = face_cycle(&cop_ev, &Cell::Edges(vec![0, 1, 2, 3]), 0).unwrap();
        assert_eq!(cycle, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_reversed_chain_reverses_cycle() {
        let (cop_ev, cop_fe) = square_ops();
        let reversed: Vec<(usize, i32)> = cop_fe.row_entries(0).map(|(e, s)| (e, -s)).collect();
        let cycle = face_cycle(&cop_ev, &Cell::Chain(reversed), 0).unwrap();
        assert_eq!(cycle, vec![1, 0, 3, 2]);
    }

    #[test]
    fn test_face_with_hole_yields_two_orbits() {
        // Outer square 0..4 and inner square 4..8, opposite orientations.
        let ev = vec![
            vec![0, 1],
            vec![1, 2],
            vec![2, 3],
            vec![0, 3],
            vec![4, 5],
            vec![5, 6],
            vec![6, 7],
            vec![4, 7],
        ];
        let cop_ev = incidence::edge_vertex_op(&ev, true);
        let chain = vec![(0, 1), (1, 1), (2, 1), (3, -1), (4, -1), (5, -1), (6, -1), (7, 1)];

        let orbits = face_cycles(&cop_ev, &chain, 0).unwrap();
        assert_eq!(orbits.len(), 2);
        assert_eq!(orbits[0], vec![0, 1, 2, 3]);
        assert_eq!(orbits[1], vec![4, 7, 6, 5]);

        // The single-orbit form walks the component of the first edge only.
        let one = face_cycle(&cop_ev, &Cell::Chain(chain), 0).unwrap();
        assert_eq!(one, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_broken_chain_is_malformed() {
        let (cop_ev, _) = square_ops();
        // Two edges only: the walk cannot return to its seed.
        let result = face_cycle(&cop_ev, &Cell::Chain(vec![(0, 1), (1, 1)]), 7);
        assert!(matches!(result, Err(ChainError::MalformedComplex(7))));
    }

    #[test]
    fn test_unsigned_walk_stuck_is_ambiguous() {
        let ev = vec![vec![0, 1], vec![1, 2]];
        let cop_ev = incidence::edge_vertex_op(&ev, true);
        let result = face_cycle(&cop_ev, &Cell::Vertices(vec![0, 1, 2]), 3);
        assert!(matches!(result, Err(ChainError::AmbiguousTraversal(3))));
    }
}
