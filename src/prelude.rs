pub use crate::config::{NUM_CLASSES, NetworkConfig, RECORD_WIDTH, TrainingConfig};
pub use crate::dataset::{Dataset, load_as_matrix, load_dataset, prepare_dataset};
pub use crate::error::{IoError, ModelError};
pub use crate::matrix::{Matrix, Shape, broadcast_shape};
pub use crate::neural_network::{
    Adam, FCLayer, Layer, Model, Optimizer, Parameter, ReLULayer, SGD, SoftmaxLayer,
};
pub use crate::trainer::{History, Trainer, compute_accuracy, split_indices};
