/// Dense row-major matrix engine with broadcasting and rayon-parallel kernels.
pub mod matrix;

/// Parameters, layers, the softmax cross-entropy loss, optimizers and the model.
pub mod neural_network;

/// Minibatch training with rotating validation folds.
pub mod trainer;

/// Network and training hyperparameters.
pub mod config;

/// Fixed-record binary dataset loading, normalization and batch materialization.
pub mod dataset;


/// Error types shared by the whole crate.
pub mod error;

/// Commonly used types, re-exported for glob import.
pub mod prelude;

pub use error::{IoError, ModelError};
