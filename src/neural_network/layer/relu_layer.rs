use crate::error::ModelError;
use crate::matrix::Matrix;
use crate::neural_network::Layer;

/// ReLU (Rectified Linear Unit) activation layer.
///
/// `forward` builds the 0/1 mask `input > 0` and returns `mask * input`; `backward`
/// returns `grad_output * mask` using the mask of the last forward call. The layer
/// owns no parameters.
///
/// # Example
/// ```rust
/// use rustynn::prelude::*;
///
/// let mut relu = ReLULayer::new();
/// let out = relu.forward(&Matrix::from([[-1.0, 2.0], [3.0, -4.0]])).unwrap();
/// assert_eq!(out, Matrix::from([[0.0, 2.0], [3.0, 0.0]]));
///
/// let grad = relu.backward(&Matrix::ones(2, 2)).unwrap();
/// assert_eq!(grad, Matrix::from([[0.0, 1.0], [1.0, 0.0]]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReLULayer {
    mask: Option<Matrix>,
}

impl ReLULayer {
    /// Creates a new ReLU layer with an empty mask cache.
    pub fn new() -> Self {
        Self { mask: None }
    }

    /// Mask cached by the last forward call.
    pub fn mask(&self) -> Option<&Matrix> {
        self.mask.as_ref()
    }
}

impl Layer for ReLULayer {
    fn forward(&mut self, input: &Matrix) -> Result<Matrix, ModelError> {
        let mask = input.gt(0.0);
        let output = mask.broadcast_mul(input)?;
        self.mask = Some(mask);
        Ok(output)
    }

    fn backward(&mut self, grad_output: &Matrix) -> Result<Matrix, ModelError> {
        let mask = self.mask.as_ref().ok_or_else(|| {
            ModelError::ProcessingError("Forward pass has not been run yet".to_string())
        })?;

        if grad_output.shape() != mask.shape() {
            return Err(ModelError::ShapeIncompatible(format!(
                "gradient output shape {:?} doesn't match input shape {:?}",
                grad_output.shape(),
                mask.shape()
            )));
        }

        grad_output.broadcast_mul(mask)
    }

    fn layer_type(&self) -> &str {
        "ReLULayer"
    }

    fn output_shape(&self) -> String {
        match &self.mask {
            Some(mask) => format!("(None, {})", mask.ncols()),
            None => "Unknown".to_string(),
        }
    }
}
