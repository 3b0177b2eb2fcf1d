use crate::error::ModelError;
use crate::matrix::Matrix;
use crate::neural_network::{Layer, Parameter};
use rand::Rng;

/// Scale applied to standard normal draws when initializing weights and biases
const INIT_SCALE: f64 = 0.001;

/// Fully connected layer computing `output = input · W + B`.
///
/// The bias row broadcasts over every example in the batch.
///
/// # Dimensions
///
/// - Input shape: (batch_size, n_input)
/// - Output shape: (batch_size, n_output)
///
/// # Fields
///
/// - `weight` - Weight parameter with shape (n_input, n_output)
/// - `bias` - Bias parameter with shape (1, n_output)
/// - `input_cache` - Input of the last forward pass, used by backward
///
/// # Example
/// ```rust
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use rustynn::prelude::*;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let mut fc = FCLayer::new(4, 3, &mut rng);
///
/// let x = Matrix::ones(2, 4);
/// let out = fc.forward(&x).unwrap();
/// assert_eq!(out.shape(), (2, 3));
///
/// let grad_input = fc.backward(&Matrix::ones(2, 3)).unwrap();
/// assert_eq!(grad_input.shape(), (2, 4));
/// ```
#[derive(Debug, Clone)]
pub struct FCLayer {
    weight: Parameter,
    bias: Parameter,
    input_cache: Option<Matrix>,
}

impl FCLayer {
    /// Creates a new fully connected layer with small random weights and biases.
    ///
    /// Both parameters are drawn from N(0, 1) and scaled by 0.001.
    ///
    /// # Parameters
    ///
    /// - `n_input` - Number of input features
    /// - `n_output` - Number of output features
    /// - `rng` - Random number generator used for initialization
    ///
    /// # Returns
    ///
    /// * `Self` - A new FCLayer instance
    pub fn new<R: Rng + ?Sized>(n_input: usize, n_output: usize, rng: &mut R) -> Self {
        let weight = Matrix::randn(n_input, n_output, rng) * INIT_SCALE;
        let bias = Matrix::randn(1, n_output, rng) * INIT_SCALE;
        Self {
            weight: Parameter::new(weight),
            bias: Parameter::new(bias),
            input_cache: None,
        }
    }

    /// Creates a layer from explicit weight and bias values.
    ///
    /// # Parameters
    ///
    /// - `weight` - Weight matrix with shape (n_input, n_output)
    /// - `bias` - Bias row with shape (1, n_output)
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - The layer
    /// - `Err(ModelError::ShapeIncompatible)` - If `bias` is not a single row matching the weight's columns
    pub fn from_values(weight: Matrix, bias: Matrix) -> Result<Self, ModelError> {
        if bias.shape() != (1, weight.ncols()) {
            return Err(ModelError::ShapeIncompatible(format!(
                "bias of shape {:?} does not fit weight of shape {:?}, expected (1, {})",
                bias.shape(),
                weight.shape(),
                weight.ncols()
            )));
        }
        Ok(Self {
            weight: Parameter::new(weight),
            bias: Parameter::new(bias),
            input_cache: None,
        })
    }

    pub fn n_input(&self) -> usize {
        self.weight.value().nrows()
    }

    pub fn n_output(&self) -> usize {
        self.weight.value().ncols()
    }

    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub fn weight_mut(&mut self) -> &mut Parameter {
        &mut self.weight
    }

    pub fn bias(&self) -> &Parameter {
        &self.bias
    }

    pub fn bias_mut(&mut self) -> &mut Parameter {
        &mut self.bias
    }
}

impl Layer for FCLayer {
    fn forward(&mut self, input: &Matrix) -> Result<Matrix, ModelError> {
        let output = input
            .dot(self.weight.value())?
            .broadcast_add(self.bias.value())?;
        self.input_cache = Some(input.clone());
        Ok(output)
    }

    fn backward(&mut self, grad_output: &Matrix) -> Result<Matrix, ModelError> {
        let input = self.input_cache.as_ref().ok_or_else(|| {
            ModelError::ProcessingError("Forward pass has not been run".to_string())
        })?;

        if grad_output.shape() != (input.nrows(), self.n_output()) {
            return Err(ModelError::ShapeIncompatible(format!(
                "gradient of shape {:?} does not match layer output shape ({}, {})",
                grad_output.shape(),
                input.nrows(),
                self.n_output()
            )));
        }

        // dW = X^T · dOut, dB = column sums of dOut
        let grad_weight = input.t().dot(grad_output)?;
        let grad_bias = grad_output.sum(0)?;
        self.weight.accumulate_grad(&grad_weight)?;
        self.bias.accumulate_grad(&grad_bias)?;

        grad_output.dot(&self.weight.value().t())
    }

    fn layer_type(&self) -> &str {
        "FCLayer"
    }

    fn output_shape(&self) -> String {
        format!("(None, {})", self.n_output())
    }

    fn params(&self) -> Vec<&Parameter> {
        vec![&self.weight, &self.bias]
    }

    fn params_mut(&mut self) -> Vec<&mut Parameter> {
        vec![&mut self.weight, &mut self.bias]
    }
}
