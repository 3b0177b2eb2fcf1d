use super::{Matrix, PARALLEL_THRESHOLD};
use crate::error::ModelError;
use rayon::prelude::*;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Implements `Matrix <op> f64` for owned and borrowed matrices, plus `f64 <op> Matrix`.
macro_rules! impl_scalar_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<f64> for &Matrix {
            type Output = Matrix;

            fn $method(self, rhs: f64) -> Matrix {
                self.map(|x| x $op rhs)
            }
        }

        impl $trait<f64> for Matrix {
            type Output = Matrix;

            fn $method(mut self, rhs: f64) -> Matrix {
                self.map_inplace(|x| x $op rhs);
                self
            }
        }

        impl $trait<&Matrix> for f64 {
            type Output = Matrix;

            fn $method(self, rhs: &Matrix) -> Matrix {
                rhs.map(|x| self $op x)
            }
        }

        impl $trait<Matrix> for f64 {
            type Output = Matrix;

            fn $method(self, mut rhs: Matrix) -> Matrix {
                rhs.map_inplace(|x| self $op x);
                rhs
            }
        }
    };
}

impl_scalar_op!(Add, add, +);
impl_scalar_op!(Sub, sub, -);
impl_scalar_op!(Mul, mul, *);
impl_scalar_op!(Div, div, /);

impl Neg for &Matrix {
    type Output = Matrix;

    fn neg(self) -> Matrix {
        self.map(|x| -x)
    }
}

impl Neg for Matrix {
    type Output = Matrix;

    fn neg(mut self) -> Matrix {
        self.map_inplace(|x| -x);
        self
    }
}

impl Matrix {
    /// Returns a new matrix with `f` applied to every element.
    ///
    /// # Parameters
    ///
    /// * `f` - Elementwise function
    ///
    /// # Returns
    ///
    /// * `Matrix` - Matrix with the same shape as `self`
    pub fn map<F>(&self, f: F) -> Matrix
    where
        F: Fn(f64) -> f64 + Sync + Send,
    {
        let data = if self.data.len() >= PARALLEL_THRESHOLD {
            self.data.par_iter().map(|&x| f(x)).collect()
        } else {
            self.data.iter().map(|&x| f(x)).collect()
        };
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        }
    }

    /// Applies `f` to every element in place.
    pub fn map_inplace<F>(&mut self, f: F)
    where
        F: Fn(f64) -> f64 + Sync + Send,
    {
        if self.data.len() >= PARALLEL_THRESHOLD {
            self.data.par_iter_mut().for_each(|x| *x = f(*x));
        } else {
            self.data.iter_mut().for_each(|x| *x = f(*x));
        }
    }

    /// Raises every element to the real power `exponent`.
    pub fn powf(&self, exponent: f64) -> Matrix {
        if exponent == 2.0 {
            return self.map(|x| x * x);
        }
        self.map(|x| x.powf(exponent))
    }

    /// Elementwise natural logarithm. Non-positive inputs yield `NaN` or `-inf`.
    pub fn log(&self) -> Matrix {
        self.map(f64::ln)
    }

    /// Elementwise exponential.
    pub fn exp(&self) -> Matrix {
        self.map(f64::exp)
    }

    /// Elementwise square root. Negative inputs yield `NaN`.
    pub fn sqrt(&self) -> Matrix {
        self.map(f64::sqrt)
    }

    /// Returns a 0/1 mask with 1 where the element is strictly greater than `threshold`.
    pub fn gt(&self, threshold: f64) -> Matrix {
        self.map(|x| if x > threshold { 1.0 } else { 0.0 })
    }

    /// Adds `other` into `self` elementwise. Both shapes must match exactly.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - If `other` was accumulated
    /// - `Err(ModelError::ShapeIncompatible)` - If the shapes differ
    pub fn accumulate(&mut self, other: &Matrix) -> Result<(), ModelError> {
        if self.shape() != other.shape() {
            return Err(ModelError::ShapeIncompatible(format!(
                "cannot accumulate matrix of shape {:?} into matrix of shape {:?}",
                other.shape(),
                self.shape()
            )));
        }

        if self.data.len() >= PARALLEL_THRESHOLD {
            self.data
                .par_iter_mut()
                .zip(other.data.par_iter())
                .for_each(|(x, &y)| *x += y);
        } else {
            self.data
                .iter_mut()
                .zip(other.data.iter())
                .for_each(|(x, &y)| *x += y);
        }
        Ok(())
    }
}
