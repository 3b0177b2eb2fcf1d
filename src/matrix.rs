use crate::error::ModelError;
use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Broadcasting rules and broadcast-aware elementwise binary operations
pub mod broadcast;
/// Matrix product and transpose
pub mod linalg;
/// Scalar operator overloads and elementwise unary functions
pub mod ops;
/// Axis reductions: `sum`, `mean`, `max`, `argmax`
pub mod reduce;

pub use broadcast::broadcast_shape;

/// Shape of a matrix as `(rows, cols)`
pub type Shape = (usize, usize);

/// Threshold for parallel computation (in number of elements).
/// For matrices with fewer elements, sequential computation is faster due to overhead
pub(crate) const PARALLEL_THRESHOLD: usize = 10_000;

/// Dense two-dimensional matrix of `f64` values stored contiguously in row-major order.
///
/// The buffer always holds exactly `rows * cols` values, and every shape-producing
/// operation returns a new matrix that re-establishes this invariant. Cloning copies
/// the buffer, so two matrices never alias each other.
///
/// Operations whose operands may disagree in shape (matrix product, broadcasting
/// elementwise ops, reshape, reductions along an axis) return
/// `Result<Matrix, ModelError>`. Operations with a scalar operand are exposed through
/// the standard operator traits.
///
/// # Fields
///
/// - `rows` - Number of rows
/// - `cols` - Number of columns
/// - `data` - Row-major buffer of length `rows * cols`
///
/// # Example
/// ```rust
/// use rustynn::matrix::Matrix;
///
/// let a = Matrix::from([[1.0, 2.0], [3.0, 4.0]]);
/// let b = Matrix::from([[10.0, 20.0]]);
///
/// // (2, 2) + (1, 2) broadcasts the single row over both rows
/// let c = a.broadcast_add(&b).unwrap();
/// assert_eq!(c, Matrix::from([[11.0, 22.0], [13.0, 24.0]]));
///
/// // Scalar ops use the operator traits
/// let d = &a * 2.0 - 1.0;
/// assert_eq!(d, Matrix::from([[1.0, 3.0], [5.0, 7.0]]));
///
/// assert_eq!(a.sum(0).unwrap(), Matrix::from([[4.0, 6.0]]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates a matrix of the given shape filled with zeros.
    ///
    /// # Parameters
    ///
    /// - `rows` - Number of rows
    /// - `cols` - Number of columns
    ///
    /// # Returns
    ///
    /// * `Matrix` - A zero matrix with shape `(rows, cols)`
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates a matrix of the given shape filled with ones.
    pub fn ones(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![1.0; rows * cols],
        }
    }

    /// Creates a matrix whose entries are independent draws from the standard normal distribution.
    ///
    /// # Parameters
    ///
    /// - `rows` - Number of rows
    /// - `cols` - Number of columns
    /// - `rng` - Random number generator used for every draw
    ///
    /// # Returns
    ///
    /// * `Matrix` - A matrix with shape `(rows, cols)` of N(0, 1) samples
    pub fn randn<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let mut matrix = Self::zeros(rows, cols);
        matrix.fill_randn(rng);
        matrix
    }

    /// Creates a matrix from a row-major buffer.
    ///
    /// # Parameters
    ///
    /// - `rows` - Number of rows
    /// - `cols` - Number of columns
    /// - `data` - Row-major values, must hold exactly `rows * cols` entries
    ///
    /// # Returns
    ///
    /// - `Ok(Matrix)` - The matrix wrapping `data`
    /// - `Err(ModelError::ShapeIncompatible)` - If `data.len() != rows * cols`
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, ModelError> {
        if data.len() != rows * cols {
            return Err(ModelError::ShapeIncompatible(format!(
                "buffer of length {} cannot form a matrix of shape ({}, {})",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Creates a matrix from a rectangular nested sequence, inferring the shape.
    ///
    /// An empty outer sequence yields a `(0, 0)` matrix.
    ///
    /// # Parameters
    ///
    /// * `rows` - One inner vector per matrix row
    ///
    /// # Returns
    ///
    /// - `Ok(Matrix)` - The matrix with shape `(rows.len(), rows[0].len())`
    /// - `Err(ModelError::ShapeIncompatible)` - If the inner vectors have unequal lengths
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ModelError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);

        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(ModelError::ShapeIncompatible(format!(
                    "row {} has {} elements, expected {}",
                    i,
                    row.len(),
                    n_cols
                )));
            }
            data.extend(row);
        }

        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            data,
        })
    }

    /// Replaces every entry with zero.
    pub fn fill_zeros(&mut self) -> &mut Self {
        self.fill(0.0)
    }

    /// Replaces every entry with one.
    pub fn fill_ones(&mut self) -> &mut Self {
        self.fill(1.0)
    }

    /// Replaces every entry with `value`.
    pub fn fill(&mut self, value: f64) -> &mut Self {
        if self.data.len() >= PARALLEL_THRESHOLD {
            self.data.par_iter_mut().for_each(|x| *x = value);
        } else {
            self.data.iter_mut().for_each(|x| *x = value);
        }
        self
    }

    /// Replaces every entry with an independent draw from the standard normal distribution.
    ///
    /// Draws are taken sequentially from `rng` in row-major order, so a seeded generator
    /// reproduces the same matrix.
    pub fn fill_randn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &mut Self {
        for x in self.data.iter_mut() {
            *x = StandardNormal.sample(rng);
        }
        self
    }

    /// Returns the shape as `(rows, cols)`.
    pub fn shape(&self) -> Shape {
        (self.rows, self.cols)
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Total number of elements, `rows * cols`.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the row-major buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Returns the row-major buffer for in-place updates. The length cannot change.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Consumes the matrix and returns its row-major buffer.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<usize, ModelError> {
        if row >= self.rows || col >= self.cols {
            return Err(ModelError::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    /// Reads the element at `(row, col)`.
    ///
    /// # Returns
    ///
    /// - `Ok(f64)` - The element value
    /// - `Err(ModelError::IndexOutOfBounds)` - If either index exceeds the declared shape
    pub fn get(&self, row: usize, col: usize) -> Result<f64, ModelError> {
        let offset = self.check_bounds(row, col)?;
        Ok(self.data[offset])
    }

    /// Writes `value` at `(row, col)`.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - If the element was written
    /// - `Err(ModelError::IndexOutOfBounds)` - If either index exceeds the declared shape
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<(), ModelError> {
        let offset = self.check_bounds(row, col)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Returns row `i` as a slice.
    pub fn row(&self, i: usize) -> Result<&[f64], ModelError> {
        if i >= self.rows {
            return Err(ModelError::IndexOutOfBounds {
                row: i,
                col: 0,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(&self.data[i * self.cols..(i + 1) * self.cols])
    }

    /// Builds a new matrix from the rows at `indices`, preserving index order.
    ///
    /// # Parameters
    ///
    /// * `indices` - Row indices to gather; repeats are allowed
    ///
    /// # Returns
    ///
    /// - `Ok(Matrix)` - Matrix with shape `(indices.len(), cols)`
    /// - `Err(ModelError::IndexOutOfBounds)` - If any index is not a valid row
    pub fn gather_rows(&self, indices: &[usize]) -> Result<Matrix, ModelError> {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            data.extend_from_slice(self.row(i)?);
        }
        Ok(Matrix {
            rows: indices.len(),
            cols: self.cols,
            data,
        })
    }

    /// Reinterprets the buffer with a new shape of equal total size.
    ///
    /// Either dimension may be `-1`, in which case it is inferred from the other
    /// dimension and the total size.
    ///
    /// # Parameters
    ///
    /// - `rows` - Target row count, or `-1` to infer
    /// - `cols` - Target column count, or `-1` to infer
    ///
    /// # Returns
    ///
    /// - `Ok(Matrix)` - The reshaped matrix, values in the same row-major order
    /// - `Err(ModelError::ShapeIncompatible)` - If `rows * cols` differs from the original size,
    ///   both dimensions are `-1`, or a dimension is negative
    pub fn reshape(&self, rows: isize, cols: isize) -> Result<Matrix, ModelError> {
        let size = self.data.len();
        let incompatible = || {
            ModelError::ShapeIncompatible(format!(
                "cannot reshape matrix of shape ({}, {}) into ({}, {})",
                self.rows, self.cols, rows, cols
            ))
        };

        let infer = |known: isize| -> Result<usize, ModelError> {
            match usize::try_from(known) {
                Ok(k) if k > 0 => Ok(size / k),
                _ => Err(incompatible()),
            }
        };

        let (new_rows, new_cols) = match (rows, cols) {
            (-1, -1) => return Err(incompatible()),
            (-1, c) => (infer(c)?, c as usize),
            (r, -1) => (r as usize, infer(r)?),
            (r, c) if r >= 0 && c >= 0 => (r as usize, c as usize),
            _ => return Err(incompatible()),
        };

        if new_rows * new_cols != size {
            return Err(incompatible());
        }

        Ok(Matrix {
            rows: new_rows,
            cols: new_cols,
            data: self.data.clone(),
        })
    }

    /// Converts into an `ndarray::Array2` with the same shape and values.
    pub fn to_array2(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.rows, self.cols), |(i, j)| {
            self.data[i * self.cols + j]
        })
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    /// # Panics
    ///
    /// Panics if the index is out of bounds. Use [`Matrix::get`] for a fallible read.
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        match self.check_bounds(row, col) {
            Ok(offset) => &self.data[offset],
            Err(e) => panic!("{}", e),
        }
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        match self.check_bounds(row, col) {
            Ok(offset) => &mut self.data[offset],
            Err(e) => panic!("{}", e),
        }
    }
}

impl<const R: usize, const C: usize> From<[[f64; C]; R]> for Matrix {
    fn from(rows: [[f64; C]; R]) -> Self {
        Matrix {
            rows: R,
            cols: C,
            data: rows.iter().flatten().copied().collect(),
        }
    }
}

impl From<Array2<f64>> for Matrix {
    fn from(array: Array2<f64>) -> Self {
        let (rows, cols) = array.dim();
        Matrix {
            rows,
            cols,
            data: array.iter().copied().collect(),
        }
    }
}

impl From<&Array2<f64>> for Matrix {
    fn from(array: &Array2<f64>) -> Self {
        let (rows, cols) = array.dim();
        Matrix {
            rows,
            cols,
            data: array.iter().copied().collect(),
        }
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for i in 0..self.rows {
            if i > 0 {
                write!(f, ",\n ")?;
            }
            write!(f, "[")?;
            for j in 0..self.cols {
                if j > 0 {
                    write!(f, ", ")?;
                }
                match f.precision() {
                    Some(p) => write!(f, "{:.*}", p, self.data[i * self.cols + j])?,
                    None => write!(f, "{}", self.data[i * self.cols + j])?,
                }
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}
