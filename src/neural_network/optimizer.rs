use crate::error::ModelError;
use crate::matrix::Matrix;

/// Adam optimizer with bias-corrected moment estimates
pub mod adam;
/// Validation helpers shared by optimizer constructors
pub(crate) mod input_validation_function;
/// Plain stochastic gradient descent
pub mod sgd;

pub use adam::Adam;
pub use sgd::SGD;

use input_validation_function::validate_step_size;

/// Defines the interface for optimization algorithms.
///
/// An optimizer value holds a configuration plus the running state for **one**
/// parameter. A trainer keeps one instance per model parameter, created from a shared
/// prototype with [`Optimizer::instantiate`], and calls `update` once per parameter per
/// optimization step.
pub trait Optimizer: Send {
    /// Computes the new value of a parameter from its current value and gradient.
    ///
    /// # Parameters
    ///
    /// - `value` - Current parameter value
    /// - `grad` - Gradient of the loss with respect to `value`, same shape
    /// - `learning_rate` - Step size for this update
    ///
    /// # Returns
    ///
    /// - `Ok(Matrix)` - The updated parameter value
    /// - `Err(ModelError::ShapeIncompatible)` - If `grad` does not match `value`, or `value` does
    ///   not match the shape this instance's state is bound to
    /// - `Err(ModelError::InputValidationError)` - If `learning_rate` is negative or not finite
    fn update(
        &mut self,
        value: &Matrix,
        grad: &Matrix,
        learning_rate: f64,
    ) -> Result<Matrix, ModelError>;

    /// Creates a fresh instance with the same configuration and no accumulated state.
    fn instantiate(&self) -> Self
    where
        Self: Sized;

    /// Returns the name of the algorithm (e.g. "Adam").
    fn name(&self) -> &str;
}

/// Creates one independent optimizer instance per parameter, ordered by parameter index.
///
/// # Parameters
///
/// - `prototype` - Configuration every instance is created from
/// - `count` - Number of parameters
///
/// # Returns
///
/// * `Vec<O>` - `count` fresh instances
pub fn instantiate_per_parameter<O: Optimizer>(prototype: &O, count: usize) -> Vec<O> {
    (0..count).map(|_| prototype.instantiate()).collect()
}

/// Checks the arguments every `update` receives.
fn validate_update_inputs(
    value: &Matrix,
    grad: &Matrix,
    learning_rate: f64,
) -> Result<(), ModelError> {
    validate_step_size(learning_rate)?;
    if value.shape() != grad.shape() {
        return Err(ModelError::ShapeIncompatible(format!(
            "gradient of shape {:?} does not match parameter of shape {:?}",
            grad.shape(),
            value.shape()
        )));
    }
    Ok(())
}
