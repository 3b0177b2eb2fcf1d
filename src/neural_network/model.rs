use crate::config::NetworkConfig;
use crate::error::ModelError;
use crate::matrix::Matrix;
use crate::neural_network::{FCLayer, Layer, Parameter, ReLULayer, SoftmaxLayer};
use rand::Rng;

/// An ordered stack of layers trained with softmax cross-entropy and L2 regularization.
///
/// The layer list and every parameter live as long as the model. Each call to
/// [`Model::feed_forward`] zeroes all gradients before recomputing them, so gradients
/// always describe exactly one batch.
///
/// # Fields
///
/// - `layers` - Layers applied in order during the forward pass
/// - `reg` - L2 regularization strength applied to every parameter
///
/// # Example
/// ```rust
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use rustynn::prelude::*;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let config = NetworkConfig::new(4, 8, 3, 1e-3);
/// let mut model = Model::new(&config, &mut rng).unwrap();
///
/// let x = Matrix::randn(5, 4, &mut rng);
/// let y = Matrix::from([[0.0], [1.0], [2.0], [1.0], [0.0]]);
///
/// let loss = model.feed_forward(&x, &y).unwrap();
/// assert!(loss > 0.0);
///
/// let predictions = model.predict(&x).unwrap();
/// assert_eq!(predictions.shape(), (5, 1));
/// ```
pub struct Model {
    layers: Vec<Box<dyn Layer>>,
    reg: f64,
}

impl Model {
    /// Builds the two-layer classifier `FCLayer(n_input, n_hidden) → ReLU → FCLayer(n_hidden, n_output)`.
    ///
    /// # Parameters
    ///
    /// - `config` - Layer sizes and regularization strength
    /// - `rng` - Random number generator used for weight initialization
    ///
    /// # Returns
    ///
    /// - `Ok(Model)` - The constructed model
    /// - `Err(ModelError::InputValidationError)` - If the configuration is invalid
    pub fn new<R: Rng + ?Sized>(config: &NetworkConfig, rng: &mut R) -> Result<Self, ModelError> {
        config.validate()?;

        let mut model = Self::from_layers(Vec::new(), config.reg);
        model
            .add(FCLayer::new(config.n_input, config.n_hidden, rng))
            .add(ReLULayer::new())
            .add(FCLayer::new(config.n_hidden, config.n_output, rng));
        Ok(model)
    }

    /// Creates a model from an explicit layer stack.
    pub fn from_layers(layers: Vec<Box<dyn Layer>>, reg: f64) -> Self {
        Self { layers, reg }
    }

    /// Appends a layer to the model
    ///
    /// Supports method chaining pattern
    ///
    /// # Parameters
    ///
    /// * `layer` - The layer to add to the model
    ///
    /// # Returns
    ///
    /// * `&mut Model` - Mutable reference to self for method chaining
    pub fn add<L: 'static + Layer>(&mut self, layer: L) -> &mut Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn layers(&self) -> &[Box<dyn Layer>] {
        &self.layers
    }

    /// L2 regularization strength.
    pub fn reg(&self) -> f64 {
        self.reg
    }

    /// All parameters, ordered by layer and then by each layer's own order
    /// (weight before bias for [`FCLayer`]).
    pub fn params(&self) -> Vec<&Parameter> {
        self.layers.iter().flat_map(|layer| layer.params()).collect()
    }

    /// Mutable access to all parameters, same order as [`Model::params`].
    pub fn params_mut(&mut self) -> Vec<&mut Parameter> {
        self.layers
            .iter_mut()
            .flat_map(|layer| layer.params_mut())
            .collect()
    }

    /// Total number of trainable scalars.
    pub fn param_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.param_count()).sum()
    }

    fn forward(&mut self, x: &Matrix) -> Result<Matrix, ModelError> {
        let mut output = x.clone();
        for layer in &mut self.layers {
            output = layer.forward(&output)?;
        }
        Ok(output)
    }

    /// Runs one forward/backward pass over a batch and returns the regularized loss.
    ///
    /// Steps: zero every gradient, forward through the layers, compute the softmax
    /// cross-entropy loss and its gradient, propagate the gradient backward through
    /// the layers in reverse order, then add each parameter's L2 loss and gradient.
    ///
    /// # Parameters
    ///
    /// - `x` - Input batch with shape (batch_size, n_input)
    /// - `y` - Class indices with shape (batch_size, 1)
    ///
    /// # Returns
    ///
    /// - `Ok(f64)` - Data loss plus L2 penalty
    /// - `Err(ModelError)` - If the batch does not fit the model
    pub fn feed_forward(&mut self, x: &Matrix, y: &Matrix) -> Result<f64, ModelError> {
        for param in self.params_mut() {
            param.zero_grad();
        }

        let scores = self.forward(x)?;
        let (mut loss, mut grad) = SoftmaxLayer::softmax_with_ce_loss(&scores, y)?;

        for layer in self.layers.iter_mut().rev() {
            grad = layer.backward(&grad)?;
        }

        let reg = self.reg;
        for param in self.params_mut() {
            let (reg_loss, reg_grad) = SoftmaxLayer::l2_reg(param.value(), reg);
            loss += reg_loss;
            param.accumulate_grad(&reg_grad)?;
        }

        Ok(loss)
    }

    /// Predicts one class index per example (argmax over the final scores).
    ///
    /// # Parameters
    ///
    /// * `x` - Input batch with shape (batch_size, n_input)
    ///
    /// # Returns
    ///
    /// - `Ok(Matrix)` - Predicted class indices with shape (batch_size, 1)
    /// - `Err(ModelError)` - If the batch does not fit the model
    pub fn predict(&mut self, x: &Matrix) -> Result<Matrix, ModelError> {
        self.forward(x)?.argmax(1)
    }

    /// Prints a summary of the model's structure
    ///
    /// Displays each layer's information and parameter statistics in a tabular format
    pub fn summary(&self) {
        let col1_width = 33;
        let col2_width = 24;
        let col3_width = 15;
        println!("Model: \"model\"");
        println!(
            "┏{}┳{}┳{}┓",
            "━".repeat(col1_width),
            "━".repeat(col2_width),
            "━".repeat(col3_width)
        );
        println!(
            "┃ {:<31} ┃ {:<22} ┃ {:>13} ┃",
            "Layer (type)", "Output Shape", "Param #"
        );
        println!(
            "┡{}╇{}╇{}┩",
            "━".repeat(col1_width),
            "━".repeat(col2_width),
            "━".repeat(col3_width)
        );

        for (i, layer) in self.layers.iter().enumerate() {
            let layer_name = if i == 0 {
                "Layer".to_string()
            } else {
                format!("Layer_{}", i)
            };
            println!(
                "│ {:<31} │ {:<22} │ {:>13} │",
                format!("{} ({})", layer_name, layer.layer_type()),
                layer.output_shape(),
                layer.param_count()
            );
        }
        println!(
            "└{}┴{}┴{}┘",
            "─".repeat(col1_width),
            "─".repeat(col2_width),
            "─".repeat(col3_width)
        );

        let total_params = self.param_count();
        // f64 parameters, 8 bytes each
        println!(" Total params: {} ({} B)", total_params, total_params * 8);
        println!(" L2 regularization strength: {}", self.reg);
    }
}
