//! Minimal Wavefront mesh reader and writer
//!
//! The reader accepts `v x y z` and `f i j k [...]` records (1-based,
//! `/texcoord/normal` suffixes ignored) and rebuilds the incidence operators
//! from the face list. The writer triangulates every face and emits 1-based
//! triangles, optionally grouped per 3-cell.

use crate::sparse::ChainOp;
use crate::triangulate::{self, Triangulator};
use crate::types::{Edge, Points};
use crate::{ChainError, Result, incidence};
use ndarray::Array2;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Read a mesh file and rebuild (V, copEV, copFE).
///
/// Face records are decomposed into their boundary edges (sorted endpoint
/// pairs, deduplicated) before the operators are built. Groups, normals and
/// texture coordinates are ignored.
pub fn import_obj<P: AsRef<Path>>(path: P) -> Result<(Points, ChainOp, ChainOp)> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut coords: Vec<f64> = Vec::new();
    let mut faces: Vec<(usize, Vec<usize>)> = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let lineno = lineno + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                for _ in 0..3 {
                    let token = parts
                        .next()
                        .ok_or_else(|| ChainError::IoFormat(lineno, line.to_string()))?;
                    let value: f64 = token
                        .parse()
                        .map_err(|_| ChainError::IoFormat(lineno, token.to_string()))?;
                    coords.push(value);
                }
            }
            Some("f") => {
                let mut face = Vec::new();
                for token in parts {
                    let field = token.split('/').next().unwrap_or(token);
                    let index: usize = field
                        .parse()
                        .map_err(|_| ChainError::IoFormat(lineno, token.to_string()))?;
                    if index == 0 {
                        return Err(ChainError::IoFormat(lineno, token.to_string()));
                    }
                    face.push(index - 1);
                }
                if face.len() < 3 {
                    return Err(ChainError::IoFormat(lineno, line.to_string()));
                }
                faces.push((lineno, face));
            }
            // g, o, s, vn, vt, mtllib, usemtl
            _ => {}
        }
    }

    let num_vertices = coords.len() / 3;
    for (lineno, face) in &faces {
        if face.iter().any(|&i| i >= num_vertices) {
            return Err(ChainError::IoFormat(*lineno, "vertex index out of range".into()));
        }
    }

    let v = Array2::from_shape_vec((num_vertices, 3), coords)
        .expect("coordinate count is a multiple of three");

    let mut seen: HashSet<Edge> = HashSet::new();
    let mut edges: Vec<Vec<usize>> = Vec::new();
    let faces: Vec<Vec<usize>> = faces.into_iter().map(|(_, face)| face).collect();
    for face in &faces {
        for k in 0..face.len() {
            let edge = Edge::new(face[k], face[(k + 1) % face.len()]);
            // A repeated vertex yields no edge; the face fails cycle
            // recovery downstream instead of poisoning the 1-skeleton.
            if edge.lo != edge.hi && seen.insert(edge) {
                edges.push(vec![edge.lo, edge.hi]);
            }
        }
    }

    let (cop_ev, cop_fe) = incidence::face_ops(&edges, &faces)?;
    Ok((v, cop_ev, cop_fe))
}

fn write_vertices<W: Write>(out: &mut W, v: &Points) -> Result<()> {
    for row in v.rows() {
        let z = if v.ncols() > 2 { row[2] } else { 0.0 };
        writeln!(out, "v {:.6} {:.6} {:.6}", row[0], row[1], z)?;
    }
    Ok(())
}

fn write_triangle<W: Write>(out: &mut W, t: &[usize; 3], flip: bool) -> Result<()> {
    let [a, b, c] = *t;
    if flip {
        writeln!(out, "f {} {} {}", a + 1, c + 1, b + 1)?;
    } else {
        writeln!(out, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    Ok(())
}

/// Triangulate a 2- or 3-dimensional complex with the matching path.
fn triangulated(
    v: &Points,
    cop_ev: &ChainOp,
    cop_fe: &ChainOp,
    triangulator: &impl Triangulator,
) -> Result<Vec<Vec<[usize; 3]>>> {
    if v.ncols() == 2 {
        triangulate::triangulate_faces_2d(v, cop_ev, cop_fe, triangulator)
    } else {
        triangulate::triangulate_faces(v, cop_ev, cop_fe, triangulator)
    }
}

/// Write a triangulated mesh: every face of the 2-complex is triangulated
/// and emitted as 1-based triangles after the vertex records.
pub fn export_obj<P: AsRef<Path>>(
    path: P,
    v: &Points,
    cop_ev: &ChainOp,
    cop_fe: &ChainOp,
    triangulator: &impl Triangulator,
) -> Result<()> {
    let faces = triangulated(v, cop_ev, cop_fe, triangulator)?;

    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "# cell-complex mesh export")?;
    writeln!(out, "# Vertices: {}", v.nrows())?;
    writeln!(out, "# Faces: {}", cop_fe.num_rows)?;
    write_vertices(&mut out, v)?;
    for triangles in &faces {
        for t in triangles {
            write_triangle(&mut out, t, false)?;
        }
    }
    Ok(())
}

/// Write a triangulated mesh grouped by 3-cell.
///
/// Each row of copCF becomes one `g cellN` group; triangles of a face with a
/// negative incidence sign have their winding flipped so every cell is
/// consistently oriented outward.
pub fn export_obj_cells<P: AsRef<Path>>(
    path: P,
    v: &Points,
    cop_ev: &ChainOp,
    cop_fe: &ChainOp,
    cop_cf: &ChainOp,
    triangulator: &impl Triangulator,
) -> Result<()> {
    let faces = triangulated(v, cop_ev, cop_fe, triangulator)?;

    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "# cell-complex mesh export")?;
    writeln!(out, "# Vertices: {}", v.nrows())?;
    writeln!(out, "# Cells: {}", cop_cf.num_rows)?;
    write_vertices(&mut out, v)?;
    for c in 0..cop_cf.num_rows {
        writeln!(out, "g cell{}", c + 1)?;
        for (f, sign) in cop_cf.row_entries(c) {
            for t in &faces[f] {
                write_triangle(&mut out, t, sign < 0)?;
            }
        }
    }
    Ok(())
}
