//! Sparse signed incidence operators (CSR format)
//!
//! CSR format stores:
//! - `values`: orientation signs in row-major order
//! - `col_indices`: column index for each value
//! - `row_ptrs`: index into values/col_indices where each row starts

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Signed incidence operator between cells of successive dimensions.
///
/// Rows are the higher-dimensional cells, columns the lower-dimensional
/// ones; stored values are the orientation signs (±1 for signed operators,
/// +1 for unsigned ones). Column indices are sorted within each row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainOp {
    /// Number of rows (cells of dimension k)
    pub num_rows: usize,
    /// Number of columns (cells of dimension k-1)
    pub num_cols: usize,
    /// Non-zero signs in row-major order
    pub values: Vec<i32>,
    /// Column indices for each value
    pub col_indices: Vec<usize>,
    /// Row pointers: row_ptrs[i] is the start index in values/col_indices
    /// for row i; row_ptrs[num_rows] = nnz
    pub row_ptrs: Vec<usize>,
}

impl ChainOp {
    /// Create a new empty operator
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            values: Vec::new(),
            col_indices: Vec::new(),
            row_ptrs: vec![0; num_rows + 1],
        }
    }

    /// Create an operator from per-row (column, sign) lists.
    ///
    /// Entries within a row are sorted by column; zero signs are dropped.
    ///
    /// # Panics
    ///
    /// Panics if a column index is out of bounds.
    pub fn from_rows(rows: Vec<Vec<(usize, i32)>>, num_cols: usize) -> Self {
        let num_rows = rows.len();
        let mut values = Vec::new();
        let mut col_indices = Vec::new();
        let mut row_ptrs = Vec::with_capacity(num_rows + 1);
        row_ptrs.push(0);

        for mut row in rows {
            row.sort_by_key(|&(col, _)| col);
            for (col, val) in row {
                assert!(col < num_cols, "column index {} out of bounds", col);
                if val != 0 {
                    values.push(val);
                    col_indices.push(col);
                }
            }
            row_ptrs.push(values.len());
        }

        Self {
            num_rows,
            num_cols,
            values,
            col_indices,
            row_ptrs,
        }
    }

    /// Create an operator from COO triplets (row, col, sign).
    ///
    /// Duplicate entries are summed; entries that cancel to zero are dropped.
    pub fn from_triplets(
        num_rows: usize,
        num_cols: usize,
        mut triplets: Vec<(usize, usize, i32)>,
    ) -> Self {
        triplets.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut rows: Vec<Vec<(usize, i32)>> = vec![Vec::new(); num_rows];
        for (row, col, val) in triplets {
            match rows[row].last_mut() {
                Some(last) if last.0 == col => last.1 += val,
                _ => rows[row].push((col, val)),
            }
        }

        Self::from_rows(rows, num_cols)
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Get the range of indices in values/col_indices for a given row
    pub fn row_range(&self, row: usize) -> Range<usize> {
        self.row_ptrs[row]..self.row_ptrs[row + 1]
    }

    /// Get the (col, sign) pairs for a row, columns ascending
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, i32)> + '_ {
        let range = self.row_range(row);
        self.col_indices[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Get element at (i, j), returns 0 if not stored
    pub fn get(&self, i: usize, j: usize) -> i32 {
        for idx in self.row_range(i) {
            if self.col_indices[idx] == j {
                return self.values[idx];
            }
        }
        0
    }

    /// Endpoints of an edge row: the two stored columns, low index first.
    ///
    /// Returns `None` when the row does not have exactly two entries.
    pub fn endpoints(&self, row: usize) -> Option<(usize, usize)> {
        let range = self.row_range(row);
        if range.len() != 2 {
            return None;
        }
        Some((self.col_indices[range.start], self.col_indices[range.start + 1]))
    }

    /// Number of stored entries per column
    pub fn col_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.num_cols];
        for &col in &self.col_indices {
            counts[col] += 1;
        }
        counts
    }

    /// Transposed operator
    pub fn transpose(&self) -> Self {
        let mut rows: Vec<Vec<(usize, i32)>> = vec![Vec::new(); self.num_cols];
        for row in 0..self.num_rows {
            for (col, val) in self.row_entries(row) {
                rows[col].push((row, val));
            }
        }
        Self::from_rows(rows, self.num_rows)
    }

    /// Integer matrix product `self * rhs`.
    ///
    /// Used to check boundary compositions: for a complex whose faces have
    /// closed boundary cycles, `cop_fe.compose(&cop_ev)` is the zero matrix.
    ///
    /// # Panics
    ///
    /// Panics if the inner dimensions do not match.
    pub fn compose(&self, rhs: &ChainOp) -> ChainOp {
        assert_eq!(self.num_cols, rhs.num_rows, "inner dimension mismatch");

        let mut triplets = Vec::new();
        for i in 0..self.num_rows {
            for (k, a) in self.row_entries(i) {
                for (j, b) in rhs.row_entries(k) {
                    triplets.push((i, j, a * b));
                }
            }
        }
        ChainOp::from_triplets(self.num_rows, rhs.num_cols, triplets)
    }

    /// Block-diagonal merge: rows of `other` appended below `self`, with its
    /// column indices shifted past `self.num_cols`. Values are concatenated
    /// unchanged.
    pub fn block_diag(&self, other: &ChainOp) -> ChainOp {
        let mut values = self.values.clone();
        values.extend_from_slice(&other.values);

        let mut col_indices = self.col_indices.clone();
        col_indices.extend(other.col_indices.iter().map(|&c| c + self.num_cols));

        let offset = self.nnz();
        let mut row_ptrs = self.row_ptrs.clone();
        row_ptrs.extend(other.row_ptrs.iter().skip(1).map(|&p| p + offset));

        ChainOp {
            num_rows: self.num_rows + other.num_rows,
            num_cols: self.num_cols + other.num_cols,
            values,
            col_indices,
            row_ptrs,
        }
    }

    /// Copy of the operator without the given rows
    pub fn delete_rows(&self, todel: &[usize]) -> ChainOp {
        let mut drop = vec![false; self.num_rows];
        for &row in todel {
            drop[row] = true;
        }

        let rows = (0..self.num_rows)
            .filter(|&row| !drop[row])
            .map(|row| self.row_entries(row).collect())
            .collect();
        ChainOp::from_rows(rows, self.num_cols)
    }

    /// Drop columns with no stored entry, compacting the remaining ones.
    ///
    /// Returns the compacted operator and the original indices of the kept
    /// columns, in ascending order.
    pub fn drop_empty_cols(&self) -> (ChainOp, Vec<usize>) {
        let counts = self.col_counts();
        let kept: Vec<usize> = (0..self.num_cols).filter(|&c| counts[c] > 0).collect();

        let mut remap = vec![usize::MAX; self.num_cols];
        for (new, &old) in kept.iter().enumerate() {
            remap[old] = new;
        }

        let rows = (0..self.num_rows)
            .map(|row| {
                self.row_entries(row)
                    .map(|(col, val)| (remap[col], val))
                    .collect()
            })
            .collect();
        (ChainOp::from_rows(rows, kept.len()), kept)
    }

    /// Dense rendition, for small operators in tests
    pub fn to_dense(&self) -> Array2<i32> {
        let mut dense = Array2::zeros((self.num_rows, self.num_cols));
        for row in 0..self.num_rows {
            for (col, val) in self.row_entries(row) {
                dense[[row, col]] = val;
            }
        }
        dense
    }
}
