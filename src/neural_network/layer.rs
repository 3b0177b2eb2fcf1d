use crate::error::ModelError;
use crate::matrix::Matrix;
use crate::neural_network::Parameter;

/// Fully connected (affine) layer
pub mod fc_layer;
/// Rectified linear unit activation layer
pub mod relu_layer;

pub use fc_layer::FCLayer;
pub use relu_layer::ReLULayer;

/// Defines the interface for neural network layers.
///
/// A layer transforms a batch of examples (one example per row) in `forward`, and in
/// `backward` maps the gradient of the loss with respect to its output to the gradient
/// with respect to its input. `forward` may cache whatever `backward` needs. Layers that
/// own parameters **add** their gradient contributions to those parameters in `backward`;
/// zeroing is the model's job.
pub trait Layer: Send + Sync {
    /// Performs forward propagation through the layer.
    ///
    /// # Parameters
    ///
    /// * `input` - Input batch with shape `(batch_size, input_dim)`
    ///
    /// # Returns
    ///
    /// - `Ok(Matrix)` - The output batch
    /// - `Err(ModelError)` - If the input shape does not fit the layer
    fn forward(&mut self, input: &Matrix) -> Result<Matrix, ModelError>;

    /// Performs backward propagation through the layer.
    ///
    /// # Parameters
    ///
    /// * `grad_output` - Gradient of the loss with respect to this layer's last output
    ///
    /// # Returns
    ///
    /// - `Ok(Matrix)` - Gradient with respect to this layer's last input
    /// - `Err(ModelError::ProcessingError)` - If `forward` has not been run yet
    /// - `Err(ModelError::ShapeIncompatible)` - If `grad_output` does not match the last output
    fn backward(&mut self, grad_output: &Matrix) -> Result<Matrix, ModelError>;

    /// Returns the type name of the layer (e.g. "FCLayer").
    fn layer_type(&self) -> &str;

    /// Returns a description of the output shape of the layer.
    fn output_shape(&self) -> String {
        "Unknown".to_string()
    }

    /// Returns the total number of trainable scalars in the layer.
    fn param_count(&self) -> usize {
        self.params().iter().map(|p| p.value().len()).sum()
    }

    /// Returns the parameters owned by the layer, in a fixed order.
    fn params(&self) -> Vec<&Parameter> {
        Vec::new()
    }

    /// Returns mutable access to the parameters owned by the layer, same order as [`Layer::params`].
    fn params_mut(&mut self) -> Vec<&mut Parameter> {
        Vec::new()
    }
}
