use super::input_validation_function::{validate_decay_rate, validate_epsilon};
use super::validate_update_inputs;
use crate::error::ModelError;
use crate::matrix::{Matrix, PARALLEL_THRESHOLD};
use crate::neural_network::Optimizer;
use rayon::prelude::*;

/// Adam optimizer implementation.
///
/// An optimization algorithm that computes individual adaptive learning
/// rates for different parameters from estimates of first and second moments
/// of the gradients. Each call performs:
///
/// ```text
/// m = beta1 * m + (1 - beta1) * grad
/// v = beta2 * v + (1 - beta2) * grad²
/// m_hat = m / (1 - beta1^t)
/// v_hat = v / (1 - beta2^t)
/// value = value - lr * m_hat / (sqrt(v_hat) + epsilon)
/// t = t + 1
/// ```
///
/// The moment estimates are created as zeros on the first update and are then bound
/// to that parameter's shape.
///
/// # Fields
///
/// - `beta1` - Exponential decay rate for the first moment estimates
/// - `beta2` - Exponential decay rate for the second moment estimates
/// - `epsilon` - Small constant added for numerical stability
/// - `momentum` - First moment estimate, `None` until the first update
/// - `velocity` - Second moment estimate, `None` until the first update
/// - `t` - Timestep of the next update, starting at 1
#[derive(Debug, Clone, PartialEq)]
pub struct Adam {
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    momentum: Option<Matrix>,
    velocity: Option<Matrix>,
    t: u64,
}

impl Adam {
    /// Creates a new Adam optimizer with the specified parameters.
    ///
    /// # Parameters
    ///
    /// - `beta1` - Decay rate for the first moment estimates (typically 0.9)
    /// - `beta2` - Decay rate for the second moment estimates (typically 0.999)
    /// - `epsilon` - Small constant for numerical stability (typically 1e-8)
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - A new Adam optimizer instance
    /// - `Err(ModelError::InputValidationError)` - If a beta is outside [0, 1) or epsilon is not positive
    pub fn new(beta1: f64, beta2: f64, epsilon: f64) -> Result<Self, ModelError> {
        validate_decay_rate(beta1, "beta1")?;
        validate_decay_rate(beta2, "beta2")?;
        validate_epsilon(epsilon)?;

        Ok(Self {
            beta1,
            beta2,
            epsilon,
            momentum: None,
            velocity: None,
            t: 1,
        })
    }

    pub fn beta1(&self) -> f64 {
        self.beta1
    }

    pub fn beta2(&self) -> f64 {
        self.beta2
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Timestep the next update will use.
    pub fn timestep(&self) -> u64 {
        self.t
    }

    pub fn momentum(&self) -> Option<&Matrix> {
        self.momentum.as_ref()
    }

    pub fn velocity(&self) -> Option<&Matrix> {
        self.velocity.as_ref()
    }
}

impl Default for Adam {
    /// beta1 = 0.9, beta2 = 0.999, epsilon = 1e-8
    fn default() -> Self {
        Self {
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            momentum: None,
            velocity: None,
            t: 1,
        }
    }
}

impl Optimizer for Adam {
    fn update(
        &mut self,
        value: &Matrix,
        grad: &Matrix,
        learning_rate: f64,
    ) -> Result<Matrix, ModelError> {
        validate_update_inputs(value, grad, learning_rate)?;

        let (rows, cols) = value.shape();
        let momentum = self
            .momentum
            .get_or_insert_with(|| Matrix::zeros(rows, cols));
        let velocity = self
            .velocity
            .get_or_insert_with(|| Matrix::zeros(rows, cols));
        if momentum.shape() != (rows, cols) {
            return Err(ModelError::ShapeIncompatible(format!(
                "Adam state is bound to a parameter of shape {:?}, got {:?}",
                momentum.shape(),
                (rows, cols)
            )));
        }

        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);
        let correction1 = 1.0 - beta1.powf(self.t as f64);
        let correction2 = 1.0 - beta2.powf(self.t as f64);

        let mut updated = value.clone();
        let step = |((w, &g), (m, v)): ((&mut f64, &f64), (&mut f64, &mut f64))| {
            *m = beta1 * *m + (1.0 - beta1) * g;
            *v = beta2 * *v + (1.0 - beta2) * g * g;
            let m_hat = *m / correction1;
            let v_hat = *v / correction2;
            *w -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
        };

        let grads = grad.as_slice();
        if updated.len() >= PARALLEL_THRESHOLD {
            updated
                .as_mut_slice()
                .par_iter_mut()
                .zip(grads.par_iter())
                .zip(
                    momentum
                        .as_mut_slice()
                        .par_iter_mut()
                        .zip(velocity.as_mut_slice().par_iter_mut()),
                )
                .for_each(step);
        } else {
            updated
                .as_mut_slice()
                .iter_mut()
                .zip(grads.iter())
                .zip(
                    momentum
                        .as_mut_slice()
                        .iter_mut()
                        .zip(velocity.as_mut_slice().iter_mut()),
                )
                .for_each(step);
        }

        self.t += 1;
        Ok(updated)
    }

    fn instantiate(&self) -> Self {
        Self {
            beta1: self.beta1,
            beta2: self.beta2,
            epsilon: self.epsilon,
            momentum: None,
            velocity: None,
            t: 1,
        }
    }

    fn name(&self) -> &str {
        "Adam"
    }
}
