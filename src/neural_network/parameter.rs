use crate::error::ModelError;
use crate::matrix::Matrix;

/// A trainable value paired with the gradient of the loss with respect to it.
///
/// The gradient always has the same shape as the value. Gradients accumulate across
/// backward calls until [`Parameter::zero_grad`] is called; the model zeroes them at the
/// start of every `feed_forward`.
///
/// # Fields
///
/// - `value` - Current parameter value
/// - `grad` - Accumulated gradient, same shape as `value`
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    value: Matrix,
    grad: Matrix,
}

impl Parameter {
    /// Wraps `value` with a zero gradient of the same shape.
    pub fn new(value: Matrix) -> Self {
        let (rows, cols) = value.shape();
        Self {
            value,
            grad: Matrix::zeros(rows, cols),
        }
    }

    pub fn value(&self) -> &Matrix {
        &self.value
    }

    pub fn grad(&self) -> &Matrix {
        &self.grad
    }

    pub fn shape(&self) -> (usize, usize) {
        self.value.shape()
    }

    /// Replaces the value, keeping the gradient untouched.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - If the value was replaced
    /// - `Err(ModelError::ShapeIncompatible)` - If `value` has a different shape than the current one
    pub fn set_value(&mut self, value: Matrix) -> Result<(), ModelError> {
        if value.shape() != self.value.shape() {
            return Err(ModelError::ShapeIncompatible(format!(
                "parameter of shape {:?} cannot take a value of shape {:?}",
                self.value.shape(),
                value.shape()
            )));
        }
        self.value = value;
        Ok(())
    }

    /// Resets the accumulated gradient to zero.
    pub fn zero_grad(&mut self) {
        self.grad.fill_zeros();
    }

    /// Adds `grad` into the accumulated gradient.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - If the contribution was accumulated
    /// - `Err(ModelError::ShapeIncompatible)` - If `grad` does not match the parameter shape
    pub fn accumulate_grad(&mut self, grad: &Matrix) -> Result<(), ModelError> {
        self.grad.accumulate(grad)
    }
}
