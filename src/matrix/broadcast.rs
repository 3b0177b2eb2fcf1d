use super::{Matrix, PARALLEL_THRESHOLD, Shape};
use crate::error::ModelError;
use rayon::prelude::*;

/// Resolves the common shape two operands broadcast to.
///
/// Each axis is reconciled independently: equal extents are kept, and an extent of 1
/// is replicated to the other operand's extent. Any other combination is an error.
///
/// # Parameters
///
/// - `left` - Shape of the left operand
/// - `right` - Shape of the right operand
///
/// # Returns
///
/// - `Ok(Shape)` - The target shape of the elementwise operation
/// - `Err(ModelError::ShapeIncompatible)` - If an axis has two distinct extents, neither being 1
///
/// # Example
/// ```rust
/// use rustynn::matrix::broadcast::broadcast_shape;
///
/// assert_eq!(broadcast_shape((4, 3), (1, 3)).unwrap(), (4, 3));
/// assert_eq!(broadcast_shape((4, 1), (1, 3)).unwrap(), (4, 3));
/// assert!(broadcast_shape((4, 3), (2, 3)).is_err());
/// ```
pub fn broadcast_shape(left: Shape, right: Shape) -> Result<Shape, ModelError> {
    let resolve = |l: usize, r: usize| match (l, r) {
        _ if l == r => Some(l),
        (1, _) => Some(r),
        (_, 1) => Some(l),
        _ => None,
    };

    match (resolve(left.0, right.0), resolve(left.1, right.1)) {
        (Some(rows), Some(cols)) => Ok((rows, cols)),
        _ => Err(ModelError::ShapeIncompatible(format!(
            "operands with shapes {:?} and {:?} cannot be broadcast together",
            left, right
        ))),
    }
}

impl Matrix {
    /// Materializes this matrix replicated to `shape`.
    ///
    /// # Parameters
    ///
    /// * `shape` - Target shape; every axis of `self` must equal it or be 1
    ///
    /// # Returns
    ///
    /// - `Ok(Matrix)` - The replicated matrix
    /// - `Err(ModelError::ShapeIncompatible)` - If an axis can't be replicated to the target extent
    pub fn broadcast_to(&self, shape: Shape) -> Result<Matrix, ModelError> {
        let fits = |own: usize, target: usize| own == target || own == 1;
        if !fits(self.rows, shape.0) || !fits(self.cols, shape.1) {
            return Err(ModelError::ShapeIncompatible(format!(
                "matrix of shape {:?} cannot be broadcast to shape {:?}",
                self.shape(),
                shape
            )));
        }
        Ok(self.zip_broadcast_unchecked(self, shape, |a, _| a))
    }

    /// Applies `f` elementwise after reconciling both shapes by broadcasting.
    ///
    /// Size-1 axes are replicated logically through index arithmetic; neither operand is
    /// copied. Rows of the output are computed in parallel for large results.
    ///
    /// # Parameters
    ///
    /// - `other` - Right operand
    /// - `f` - Function combining one element of `self` with one element of `other`
    ///
    /// # Returns
    ///
    /// - `Ok(Matrix)` - Result with the broadcast shape
    /// - `Err(ModelError::ShapeIncompatible)` - If the shapes cannot be broadcast together
    pub fn broadcast_zip<F>(&self, other: &Matrix, f: F) -> Result<Matrix, ModelError>
    where
        F: Fn(f64, f64) -> f64 + Sync + Send,
    {
        let shape = broadcast_shape(self.shape(), other.shape())?;
        Ok(self.zip_broadcast_unchecked(other, shape, f))
    }

    /// Elementwise `self + other` with broadcasting.
    pub fn broadcast_add(&self, other: &Matrix) -> Result<Matrix, ModelError> {
        self.broadcast_zip(other, |a, b| a + b)
    }

    /// Elementwise `self - other` with broadcasting.
    pub fn broadcast_sub(&self, other: &Matrix) -> Result<Matrix, ModelError> {
        self.broadcast_zip(other, |a, b| a - b)
    }

    /// Elementwise `self * other` with broadcasting.
    pub fn broadcast_mul(&self, other: &Matrix) -> Result<Matrix, ModelError> {
        self.broadcast_zip(other, |a, b| a * b)
    }

    /// Elementwise `self / other` with broadcasting.
    ///
    /// Division by zero is not an error and yields `inf` or `NaN`.
    pub fn broadcast_div(&self, other: &Matrix) -> Result<Matrix, ModelError> {
        self.broadcast_zip(other, |a, b| a / b)
    }

    // `shape` must already be a valid broadcast target for both operands.
    fn zip_broadcast_unchecked<F>(&self, other: &Matrix, shape: Shape, f: F) -> Matrix
    where
        F: Fn(f64, f64) -> f64 + Sync + Send,
    {
        let (rows, cols) = shape;
        let mut data = vec![0.0; rows * cols];
        if data.is_empty() {
            return Matrix { rows, cols, data };
        }

        let fill_row = |(i, out_row): (usize, &mut [f64])| {
            let l_start = if self.rows == 1 { 0 } else { i * self.cols };
            let r_start = if other.rows == 1 { 0 } else { i * other.cols };
            let l_row = &self.data[l_start..l_start + self.cols];
            let r_row = &other.data[r_start..r_start + other.cols];

            for (j, out) in out_row.iter_mut().enumerate() {
                let a = if self.cols == 1 { l_row[0] } else { l_row[j] };
                let b = if other.cols == 1 { r_row[0] } else { r_row[j] };
                *out = f(a, b);
            }
        };

        if data.len() >= PARALLEL_THRESHOLD {
            data.par_chunks_mut(cols).enumerate().for_each(&fill_row);
        } else {
            data.chunks_mut(cols).enumerate().for_each(&fill_row);
        }

        Matrix { rows, cols, data }
    }
}
