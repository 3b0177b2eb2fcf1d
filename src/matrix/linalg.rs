use super::{Matrix, PARALLEL_THRESHOLD};
use crate::error::ModelError;
use rayon::prelude::*;

impl Matrix {
    /// Matrix product `self · other`.
    ///
    /// Each output row is independent of every other, so rows are computed in parallel
    /// once the amount of work crosses the parallel threshold. Every output element is
    /// accumulated over the inner dimension in increasing order.
    ///
    /// # Parameters
    ///
    /// * `other` - Right operand, must have as many rows as `self` has columns
    ///
    /// # Returns
    ///
    /// - `Ok(Matrix)` - Product with shape `(self.rows, other.cols)`
    /// - `Err(ModelError::ShapeIncompatible)` - If `self.cols != other.rows`
    pub fn dot(&self, other: &Matrix) -> Result<Matrix, ModelError> {
        if self.cols != other.rows {
            return Err(ModelError::ShapeIncompatible(format!(
                "cannot multiply matrix of shape ({}, {}) by matrix of shape ({}, {})",
                self.rows, self.cols, other.rows, other.cols
            )));
        }

        let (m, k, n) = (self.rows, self.cols, other.cols);
        let mut data = vec![0.0; m * n];
        if data.is_empty() {
            return Ok(Matrix {
                rows: m,
                cols: n,
                data,
            });
        }

        let kernel = |(i, out_row): (usize, &mut [f64])| {
            let a_row = &self.data[i * k..(i + 1) * k];
            for (p, &a) in a_row.iter().enumerate() {
                let b_row = &other.data[p * n..(p + 1) * n];
                for (out, &b) in out_row.iter_mut().zip(b_row) {
                    *out += a * b;
                }
            }
        };

        if m * n * k >= PARALLEL_THRESHOLD {
            data.par_chunks_mut(n).enumerate().for_each(&kernel);
        } else {
            data.chunks_mut(n).enumerate().for_each(&kernel);
        }

        Ok(Matrix {
            rows: m,
            cols: n,
            data,
        })
    }

    /// Returns the transpose, a new matrix with shape `(cols, rows)`.
    pub fn t(&self) -> Matrix {
        let (rows, cols) = (self.cols, self.rows);
        let mut data = vec![0.0; rows * cols];
        if data.is_empty() {
            return Matrix { rows, cols, data };
        }

        // output row i is input column i
        let kernel = |(i, out_row): (usize, &mut [f64])| {
            for (j, out) in out_row.iter_mut().enumerate() {
                *out = self.data[j * self.cols + i];
            }
        };

        if data.len() >= PARALLEL_THRESHOLD {
            data.par_chunks_mut(cols).enumerate().for_each(&kernel);
        } else {
            data.chunks_mut(cols).enumerate().for_each(&kernel);
        }

        Matrix { rows, cols, data }
    }
}
