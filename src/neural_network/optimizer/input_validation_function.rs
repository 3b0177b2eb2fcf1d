use crate::error::ModelError;

/// Validates that a per-step learning rate is non-negative and finite.
///
/// Zero is accepted: a decayed schedule may reach it and an update with it is the identity.
///
/// # Parameters
///
/// * `learning_rate` - The learning rate value to validate
///
/// # Returns
///
/// - `Ok(())` if the learning rate is non-negative and finite
/// - `Err(ModelError::InputValidationError)` otherwise
pub(crate) fn validate_step_size(learning_rate: f64) -> Result<(), ModelError> {
    if !(learning_rate >= 0.0 && learning_rate.is_finite()) {
        return Err(ModelError::InputValidationError(format!(
            "learning_rate must be non-negative and finite, got {}",
            learning_rate
        )));
    }
    Ok(())
}

/// Checks the initial learning rate of a [`TrainingConfig`](crate::config::TrainingConfig).
///
/// Unlike [`validate_step_size`], zero is rejected since training would never move.
pub(crate) fn validate_learning_rate(learning_rate: f64) -> Result<(), ModelError> {
    if !(learning_rate > 0.0 && learning_rate.is_finite()) {
        return Err(ModelError::InputValidationError(format!(
            "learning_rate must be positive and finite, got {}",
            learning_rate
        )));
    }
    Ok(())
}

/// Checks a factor in [0, 1).
///
/// Used for Adam's `beta1` and `beta2`, and for `learning_rate_decay`, where the
/// caller accepts exactly 1.0 as "no decay" and rejects 0.0 itself.
///
/// # Parameters
///
/// - `value` - Factor to check
/// - `param_name` - Name reported in the error message
pub(crate) fn validate_decay_rate(value: f64, param_name: &str) -> Result<(), ModelError> {
    if !((0.0..1.0).contains(&value) && value.is_finite()) {
        return Err(ModelError::InputValidationError(format!(
            "{} must be in range [0, 1) and finite, got {}",
            param_name, value
        )));
    }
    Ok(())
}

/// Adam's denominator guard must be positive so `sqrt(v) + epsilon` never vanishes.
pub(crate) fn validate_epsilon(epsilon: f64) -> Result<(), ModelError> {
    if !(epsilon > 0.0 && epsilon.is_finite()) {
        return Err(ModelError::InputValidationError(format!(
            "epsilon must be positive and finite, got {}",
            epsilon
        )));
    }
    Ok(())
}
