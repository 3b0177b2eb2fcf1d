use crate::error::ModelError;
use crate::matrix::Matrix;

/// Softmax classifier head with cross-entropy loss and L2 regularization.
///
/// All functions are stateless. Predictions hold one example per row and one class
/// score per column; ground truth holds one class index per example row, as a
/// `(batch_size, 1)` matrix of integral values.
///
/// # Example
/// ```rust
/// use rustynn::prelude::*;
///
/// let scores = Matrix::from([[2.0, 1.0, 0.1], [0.5, 2.5, 0.2]]);
/// let labels = Matrix::from([[0.0], [1.0]]);
///
/// let (loss, grad) = SoftmaxLayer::softmax_with_ce_loss(&scores, &labels).unwrap();
/// assert!(loss > 0.0);
/// assert_eq!(grad.shape(), (2, 3));
/// ```
pub struct SoftmaxLayer;

impl SoftmaxLayer {
    /// Row-wise softmax, stabilized by subtracting each row's maximum before exponentiating.
    ///
    /// # Parameters
    ///
    /// * `predictions` - Scores with shape (batch_size, n_classes)
    ///
    /// # Returns
    ///
    /// - `Ok(Matrix)` - Probabilities with the same shape, each row summing to 1
    /// - `Err(ModelError)` - Never for a well-formed matrix; propagated from the reductions
    pub fn softmax(predictions: &Matrix) -> Result<Matrix, ModelError> {
        let shifted = predictions.broadcast_sub(&predictions.max(1)?)?;
        let exponentiated = shifted.exp();
        exponentiated.broadcast_div(&exponentiated.sum(1)?)
    }

    /// Mean negative log-likelihood of the ground-truth classes.
    ///
    /// # Parameters
    ///
    /// - `probs` - Probabilities with shape (batch_size, n_classes)
    /// - `gt_index` - Ground-truth class indices with shape (batch_size, 1)
    ///
    /// # Returns
    ///
    /// - `Ok(f64)` - `mean_i(-ln(probs[i, gt_index[i]]))`; a probability of 0 yields `inf`
    /// - `Err(ModelError::ShapeIncompatible)` - If `gt_index` is not (batch_size, 1)
    /// - `Err(ModelError::InputValidationError)` - If a label is negative, fractional or not finite
    /// - `Err(ModelError::IndexOutOfBounds)` - If a label is not smaller than n_classes
    pub fn ce_loss(probs: &Matrix, gt_index: &Matrix) -> Result<f64, ModelError> {
        let labels = class_indices(gt_index, probs.nrows())?;

        let mut total = 0.0;
        for (i, &label) in labels.iter().enumerate() {
            total -= probs.get(i, label)?.ln();
        }
        Ok(total / labels.len() as f64)
    }

    /// One-hot encoding of class indices.
    ///
    /// # Parameters
    ///
    /// - `gt_index` - Class indices with shape (batch_size, 1)
    /// - `n_classes` - Number of columns of the encoding
    ///
    /// # Returns
    ///
    /// - `Ok(Matrix)` - (batch_size, n_classes) with a single 1 per row at the labeled column
    /// - `Err(ModelError)` - If a label is invalid or out of range
    pub fn one_hot(gt_index: &Matrix, n_classes: usize) -> Result<Matrix, ModelError> {
        let labels = class_indices(gt_index, gt_index.nrows())?;
        let mut encoded = Matrix::zeros(labels.len(), n_classes);
        for (i, &label) in labels.iter().enumerate() {
            encoded.set(i, label, 1.0)?;
        }
        Ok(encoded)
    }

    /// Softmax followed by cross-entropy, with the gradient with respect to the scores.
    ///
    /// # Parameters
    ///
    /// - `predictions` - Scores with shape (batch_size, n_classes)
    /// - `gt_index` - Ground-truth class indices with shape (batch_size, 1)
    ///
    /// # Returns
    ///
    /// - `Ok((f64, Matrix))` - The mean loss and `(softmax(predictions) - one_hot) / batch_size`
    /// - `Err(ModelError)` - If the labels don't fit the predictions
    pub fn softmax_with_ce_loss(
        predictions: &Matrix,
        gt_index: &Matrix,
    ) -> Result<(f64, Matrix), ModelError> {
        let probs = Self::softmax(predictions)?;
        let loss = Self::ce_loss(&probs, gt_index)?;
        let one_hot = Self::one_hot(gt_index, predictions.ncols())?;
        let grad = probs.broadcast_sub(&one_hot)? / predictions.nrows() as f64;
        Ok((loss, grad))
    }

    /// L2 penalty of a weight matrix.
    ///
    /// # Parameters
    ///
    /// - `weight` - Parameter value to penalize
    /// - `reg_strength` - Regularization strength
    ///
    /// # Returns
    ///
    /// * `(f64, Matrix)` - `reg_strength * sum(weight²)` and its gradient `2 * reg_strength * weight`
    pub fn l2_reg(weight: &Matrix, reg_strength: f64) -> (f64, Matrix) {
        let loss = reg_strength * weight.powf(2.0).sum_all();
        let grad = weight * (2.0 * reg_strength);
        (loss, grad)
    }
}

/// Converts a (batch_size, 1) label matrix into class indices.
fn class_indices(gt_index: &Matrix, batch_size: usize) -> Result<Vec<usize>, ModelError> {
    if gt_index.shape() != (batch_size, 1) {
        return Err(ModelError::ShapeIncompatible(format!(
            "ground truth of shape {:?} does not hold one label per example, expected ({}, 1)",
            gt_index.shape(),
            batch_size
        )));
    }

    gt_index
        .as_slice()
        .iter()
        .map(|&label| {
            if label.is_finite() && label >= 0.0 && label.fract() == 0.0 {
                Ok(label as usize)
            } else {
                Err(ModelError::InputValidationError(format!(
                    "class label must be a non-negative integer, got {}",
                    label
                )))
            }
        })
        .collect()
}
