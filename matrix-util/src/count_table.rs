//! Non-negative integer count tables.
//!
//! Rows are the "dimension" being counted (words, documents) and columns
//! are categories (topics). Counts can only move by explicit increments
//! and decrements; a decrement below zero is a bookkeeping defect and
//! panics instead of wrapping.

use fnv::FnvHashMap as HashMap;

/// Common interface of dense and sparse count tables
pub trait CountMatrix {
    /// Allocate a zeroed `nrows x ncols` table
    fn zeros(nrows: usize, ncols: usize) -> Self
    where
        Self: Sized;

    fn nrows(&self) -> usize;

    fn ncols(&self) -> usize;

    /// `self[row, col]`
    fn get(&self, row: usize, col: usize) -> u32;

    /// `self[row, col] += delta`
    fn incr(&mut self, row: usize, col: usize, delta: u32);

    /// `self[row, col] -= delta`
    ///
    /// Panics if the cell holds less than `delta`.
    fn decr(&mut self, row: usize, col: usize, delta: u32);

    /// Copy of a row as a dense vector
    fn row(&self, row: usize) -> Vec<u32> {
        (0..self.ncols()).map(|c| self.get(row, c)).collect()
    }

    /// Copy of a column as a dense vector
    fn col(&self, col: usize) -> Vec<u32> {
        (0..self.nrows()).map(|r| self.get(r, col)).collect()
    }

    fn row_sum(&self, row: usize) -> u64 {
        (0..self.ncols()).map(|c| self.get(row, c) as u64).sum()
    }

    fn col_sum(&self, col: usize) -> u64 {
        (0..self.nrows()).map(|r| self.get(r, col) as u64).sum()
    }

    /// Sum of every column at once, `O(nrows * ncols)` for dense storage
    fn col_sums(&self) -> Vec<u64> {
        let mut ret = vec![0u64; self.ncols()];
        for r in 0..self.nrows() {
            for (c, x) in ret.iter_mut().enumerate() {
                *x += self.get(r, c) as u64;
            }
        }
        ret
    }
}

#[cold]
#[inline(never)]
fn negative_count(row: usize, col: usize, current: u32, delta: u32) -> ! {
    panic!(
        "count underflow at [{}, {}]: current = {}, decrement = {}",
        row, col, current, delta
    )
}

/// Row-major dense table backed by a flat `Vec<u32>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseCounts {
    nrows: usize,
    ncols: usize,
    data: Vec<u32>,
}

impl DenseCounts {
    /// The row slice `self[row, ..]`
    #[inline]
    pub fn row_slice(&self, row: usize) -> &[u32] {
        &self.data[row * self.ncols..(row + 1) * self.ncols]
    }
}

impl CountMatrix for DenseCounts {
    fn zeros(nrows: usize, ncols: usize) -> Self {
        DenseCounts {
            nrows,
            ncols,
            data: vec![0; nrows * ncols],
        }
    }

    #[inline]
    fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> u32 {
        debug_assert!(row < self.nrows && col < self.ncols);
        self.data[row * self.ncols + col]
    }

    #[inline]
    fn incr(&mut self, row: usize, col: usize, delta: u32) {
        debug_assert!(row < self.nrows && col < self.ncols);
        self.data[row * self.ncols + col] += delta;
    }

    #[inline]
    fn decr(&mut self, row: usize, col: usize, delta: u32) {
        debug_assert!(row < self.nrows && col < self.ncols);
        let cell = &mut self.data[row * self.ncols + col];
        match cell.checked_sub(delta) {
            Some(x) => *cell = x,
            None => negative_count(row, col, *cell, delta),
        }
    }

    fn row(&self, row: usize) -> Vec<u32> {
        self.row_slice(row).to_vec()
    }

    fn row_sum(&self, row: usize) -> u64 {
        self.row_slice(row).iter().map(|&x| x as u64).sum()
    }

    fn col_sums(&self) -> Vec<u64> {
        let mut ret = vec![0u64; self.ncols];
        for row in self.data.chunks_exact(self.ncols.max(1)) {
            for (x, &c) in ret.iter_mut().zip(row) {
                *x += c as u64;
            }
        }
        ret
    }
}

/// One hash map per row; zero cells are not stored.
///
/// Useful for word-topic counts with a large vocabulary where most
/// (word, topic) pairs never co-occur.
#[derive(Debug, Clone, Default)]
pub struct SparseCounts {
    ncols: usize,
    rows: Vec<HashMap<usize, u32>>,
}

impl SparseCounts {
    /// Number of stored non-zero cells
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }
}

impl CountMatrix for SparseCounts {
    fn zeros(nrows: usize, ncols: usize) -> Self {
        SparseCounts {
            ncols,
            rows: vec![HashMap::default(); nrows],
        }
    }

    #[inline]
    fn nrows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> u32 {
        debug_assert!(col < self.ncols);
        self.rows[row].get(&col).copied().unwrap_or(0)
    }

    #[inline]
    fn incr(&mut self, row: usize, col: usize, delta: u32) {
        debug_assert!(col < self.ncols);
        if delta > 0 {
            *self.rows[row].entry(col).or_insert(0) += delta;
        }
    }

    fn decr(&mut self, row: usize, col: usize, delta: u32) {
        debug_assert!(col < self.ncols);
        if delta == 0 {
            return;
        }
        let current = self.get(row, col);
        match current.checked_sub(delta) {
            Some(0) => {
                self.rows[row].remove(&col);
            }
            Some(x) => {
                self.rows[row].insert(col, x);
            }
            None => negative_count(row, col, current, delta),
        }
    }

    fn row_sum(&self, row: usize) -> u64 {
        self.rows[row].values().map(|&x| x as u64).sum()
    }

    fn col_sums(&self) -> Vec<u64> {
        let mut ret = vec![0u64; self.ncols];
        for row in &self.rows {
            for (&c, &x) in row {
                ret[c] += x as u64;
            }
        }
        ret
    }
}
