use crate::error::ModelError;
use crate::neural_network::optimizer::input_validation_function::{
    validate_decay_rate, validate_learning_rate,
};

/// Number of features in one 32x32 RGB record
pub const RECORD_WIDTH: usize = 32 * 32 * 3;
/// Number of digit classes
pub const NUM_CLASSES: usize = 10;

/// Architecture of the fully connected classifier built by [`crate::neural_network::Model::new`].
///
/// # Fields
///
/// - `n_input` - Number of input features
/// - `n_hidden` - Width of the hidden layer
/// - `n_output` - Number of classes
/// - `reg` - L2 regularization strength
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkConfig {
    pub n_input: usize,
    pub n_hidden: usize,
    pub n_output: usize,
    pub reg: f64,
}

impl NetworkConfig {
    pub fn new(n_input: usize, n_hidden: usize, n_output: usize, reg: f64) -> Self {
        Self {
            n_input,
            n_hidden,
            n_output,
            reg,
        }
    }

    /// Checks that every layer has at least one unit and the regularization strength is
    /// non-negative and finite.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - If the configuration is usable
    /// - `Err(ModelError::InputValidationError)` - Otherwise
    pub fn validate(&self) -> Result<(), ModelError> {
        for (name, size) in [
            ("n_input", self.n_input),
            ("n_hidden", self.n_hidden),
            ("n_output", self.n_output),
        ] {
            if size == 0 {
                return Err(ModelError::InputValidationError(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        if !(self.reg >= 0.0 && self.reg.is_finite()) {
            return Err(ModelError::InputValidationError(format!(
                "reg must be non-negative and finite, got {}",
                self.reg
            )));
        }
        Ok(())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            n_input: RECORD_WIDTH,
            n_hidden: 100,
            n_output: NUM_CLASSES,
            reg: 1e-5,
        }
    }
}

/// Hyperparameters of [`crate::trainer::Trainer::fit`].
///
/// # Fields
///
/// - `num_epochs` - Number of epochs to run
/// - `batch_size` - Examples per minibatch
/// - `learning_rate` - Initial learning rate
/// - `learning_rate_decay` - Multiplier applied to the learning rate after every epoch
/// - `num_folds` - Number of validation folds rotated across epochs
/// - `seed` - Seed for fold assignment and batch shuffling; `None` draws from OS entropy
/// - `verbose` - Show a progress bar while training
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingConfig {
    pub num_epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub learning_rate_decay: f64,
    pub num_folds: usize,
    pub seed: Option<u64>,
    pub verbose: bool,
}

impl TrainingConfig {
    /// Creates a configuration with the given schedule and the default fold count,
    /// no seed and no progress bar.
    pub fn new(
        num_epochs: usize,
        batch_size: usize,
        learning_rate: f64,
        learning_rate_decay: f64,
    ) -> Self {
        Self {
            num_epochs,
            batch_size,
            learning_rate,
            learning_rate_decay,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_folds(mut self, num_folds: usize) -> Self {
        self.num_folds = num_folds;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Checks the hyperparameters.
    ///
    /// The learning rate must be positive and finite, the decay in `(0, 1]`, and the
    /// batch size at least 1 and the fold count at least 2.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - If the configuration is usable
    /// - `Err(ModelError::InputValidationError)` - Otherwise
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_learning_rate(self.learning_rate)?;

        // a decay of exactly 1.0 keeps the rate constant
        if self.learning_rate_decay != 1.0 {
            validate_decay_rate(self.learning_rate_decay, "learning_rate_decay")?;
            if self.learning_rate_decay == 0.0 {
                return Err(ModelError::InputValidationError(
                    "learning_rate_decay must be greater than 0".to_string(),
                ));
            }
        }

        if self.batch_size == 0 {
            return Err(ModelError::InputValidationError(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        if self.num_folds < 2 {
            return Err(ModelError::InputValidationError(format!(
                "num_folds must be at least 2, got {}",
                self.num_folds
            )));
        }
        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_epochs: 20,
            batch_size: 300,
            learning_rate: 1e-3,
            learning_rate_decay: 0.9,
            num_folds: 10,
            seed: None,
            verbose: false,
        }
    }
}
