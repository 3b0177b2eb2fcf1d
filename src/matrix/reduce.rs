use super::{Matrix, PARALLEL_THRESHOLD};
use crate::error::ModelError;
use rayon::prelude::*;

impl Matrix {
    /// Collapses one axis by reducing every line along it with `reduce`.
    ///
    /// Axis 0 reduces each column (result `(1, cols)`), axis 1 reduces each row
    /// (result `(rows, 1)`).
    fn reduce_axis<F>(&self, axis: usize, reduce: F) -> Result<Matrix, ModelError>
    where
        F: Fn(&mut dyn Iterator<Item = f64>) -> f64 + Sync + Send,
    {
        let parallel = self.data.len() >= PARALLEL_THRESHOLD;
        let (rows, cols) = (self.rows, self.cols);

        match axis {
            0 => {
                let column = |j: usize| {
                    let mut line = (0..rows).map(|i| self.data[i * cols + j]);
                    reduce(&mut line as &mut dyn Iterator<Item = f64>)
                };
                let data = if parallel {
                    (0..cols).into_par_iter().map(column).collect()
                } else {
                    (0..cols).map(column).collect()
                };
                Ok(Matrix {
                    rows: 1,
                    cols,
                    data,
                })
            }
            1 => {
                let row = |i: usize| {
                    let mut line = self.data[i * cols..(i + 1) * cols].iter().copied();
                    reduce(&mut line as &mut dyn Iterator<Item = f64>)
                };
                let data = if parallel {
                    (0..rows).into_par_iter().map(row).collect()
                } else {
                    (0..rows).map(row).collect()
                };
                Ok(Matrix {
                    rows,
                    cols: 1,
                    data,
                })
            }
            _ => Err(ModelError::InvalidAxis(axis)),
        }
    }

    /// Sums along `axis`.
    ///
    /// # Parameters
    ///
    /// * `axis` - 0 collapses rows (column sums, shape `(1, cols)`),
    ///   1 collapses columns (row sums, shape `(rows, 1)`)
    ///
    /// # Returns
    ///
    /// - `Ok(Matrix)` - The reduced matrix
    /// - `Err(ModelError::InvalidAxis)` - If `axis` is not 0 or 1
    pub fn sum(&self, axis: usize) -> Result<Matrix, ModelError> {
        self.reduce_axis(axis, |line| line.sum())
    }

    /// Averages along `axis`. A zero-length line averages to `NaN`.
    ///
    /// # Returns
    ///
    /// - `Ok(Matrix)` - The reduced matrix
    /// - `Err(ModelError::InvalidAxis)` - If `axis` is not 0 or 1
    pub fn mean(&self, axis: usize) -> Result<Matrix, ModelError> {
        let count = match axis {
            0 => self.rows,
            _ => self.cols,
        };
        Ok(self.sum(axis)? / count as f64)
    }

    /// Maximum along `axis`. `NaN` entries are skipped; an empty line yields `-inf`.
    ///
    /// # Returns
    ///
    /// - `Ok(Matrix)` - The reduced matrix
    /// - `Err(ModelError::InvalidAxis)` - If `axis` is not 0 or 1
    pub fn max(&self, axis: usize) -> Result<Matrix, ModelError> {
        self.reduce_axis(axis, |line| {
            line.fold(f64::NEG_INFINITY, |acc, x| if x > acc { x } else { acc })
        })
    }

    /// Index of the maximum along `axis`, stored as `f64`.
    ///
    /// Ties resolve to the first position holding the maximum.
    ///
    /// # Returns
    ///
    /// - `Ok(Matrix)` - `(1, cols)` for axis 0 (row index per column) or `(rows, 1)` for
    ///   axis 1 (column index per row)
    /// - `Err(ModelError::InvalidAxis)` - If `axis` is not 0 or 1
    pub fn argmax(&self, axis: usize) -> Result<Matrix, ModelError> {
        self.reduce_axis(axis, |line| {
            let (best, _) = line.enumerate().fold(
                (0usize, f64::NEG_INFINITY),
                |(best, max), (i, x)| if x > max { (i, x) } else { (best, max) },
            );
            best as f64
        })
    }

    /// Sum of every element.
    pub fn sum_all(&self) -> f64 {
        if self.data.len() >= PARALLEL_THRESHOLD {
            self.data.par_iter().sum()
        } else {
            self.data.iter().sum()
        }
    }
}
