use super::validate_update_inputs;
use crate::error::ModelError;
use crate::matrix::{Matrix, PARALLEL_THRESHOLD};
use crate::neural_network::Optimizer;
use rayon::prelude::*;

/// Stochastic Gradient Descent (SGD) optimizer.
///
/// A simple optimization algorithm that updates parameters in the direction
/// of the negative gradient, scaled by the learning rate:
/// `new_value = value - learning_rate * grad`. It keeps no state between updates.
///
/// # Example
/// ```rust
/// use rustynn::prelude::*;
///
/// let mut sgd = SGD::new();
/// let value = Matrix::from([[1.0, 2.0]]);
/// let grad = Matrix::from([[0.5, -1.0]]);
///
/// let updated = sgd.update(&value, &grad, 0.1).unwrap();
/// assert_eq!(updated, Matrix::from([[0.95, 2.1]]));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SGD;

impl SGD {
    /// Creates a new SGD optimizer.
    ///
    /// # Returns
    ///
    /// * `Self` - A new SGD optimizer instance
    pub fn new() -> Self {
        SGD
    }
}

impl Optimizer for SGD {
    fn update(
        &mut self,
        value: &Matrix,
        grad: &Matrix,
        learning_rate: f64,
    ) -> Result<Matrix, ModelError> {
        validate_update_inputs(value, grad, learning_rate)?;

        let mut updated = value.clone();
        let weights = updated.as_mut_slice();
        let grads = grad.as_slice();
        if weights.len() >= PARALLEL_THRESHOLD {
            weights
                .par_iter_mut()
                .zip(grads.par_iter())
                .for_each(|(w, &g)| *w -= learning_rate * g);
        } else {
            weights
                .iter_mut()
                .zip(grads.iter())
                .for_each(|(w, &g)| *w -= learning_rate * g);
        }
        Ok(updated)
    }

    fn instantiate(&self) -> Self {
        SGD
    }

    fn name(&self) -> &str {
        "SGD"
    }
}
