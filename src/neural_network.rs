/// Module that contains the layer abstraction and its implementations
pub mod layer;
/// Module that contains the softmax / cross-entropy loss and L2 regularization
pub mod loss_function;
/// Module that contains the model composing layers, loss and regularization
pub mod model;
/// Module that contains optimization algorithms for neural network training
pub mod optimizer;
/// Module that contains the trainable (value, gradient) pair
pub mod parameter;

pub use layer::*;
pub use loss_function::*;
pub use model::*;
pub use optimizer::*;
pub use parameter::*;
