use crate::config::TrainingConfig;
use crate::dataset::{Dataset, load_as_matrix};
use crate::error::ModelError;
use crate::matrix::Matrix;
use crate::neural_network::{Model, Optimizer, instantiate_per_parameter};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng, rng};

/// Rows predicted at once when measuring accuracy
const EVAL_CHUNK_SIZE: usize = 1024;

/// Per-epoch metrics recorded by [`Trainer::fit`].
///
/// All three vectors have one entry per completed epoch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    pub loss: Vec<f64>,
    pub train_accuracy: Vec<f64>,
    pub val_accuracy: Vec<f64>,
}

impl History {
    /// Number of recorded epochs.
    pub fn len(&self) -> usize {
        self.loss.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loss.is_empty()
    }
}

/// Minibatch trainer with rotating validation folds.
///
/// The dataset is partitioned once into `num_folds` disjoint folds. Epoch `e` holds
/// out fold `e % num_folds` for validation and trains on every other example. One
/// optimizer instance per model parameter is created from `prototype` at the start
/// of [`Trainer::fit`] and keeps its state across all epochs.
///
/// # Fields
///
/// - `model` - Model being trained
/// - `dataset` - Normalized training data
/// - `prototype` - Optimizer configuration cloned once per parameter
/// - `config` - Training hyperparameters
/// - `rng` - Source of fold assignment and batch shuffling
/// - `learning_rate` - Current learning rate, decayed after every epoch
///
/// # Example
/// ```rust
/// use ndarray::{Array1, Array2};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use rustynn::prelude::*;
///
/// let features = Array2::from_shape_fn((40, 2), |(i, j)| {
///     let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
///     sign * (1.0 + j as f64)
/// });
/// let labels = Array1::from_shape_fn(40, |i| (i % 2) as f64);
/// let dataset = Dataset::new(features, labels).unwrap();
///
/// let mut rng = StdRng::seed_from_u64(3);
/// let model = Model::new(&NetworkConfig::new(2, 8, 2, 0.0), &mut rng).unwrap();
/// let config = TrainingConfig::new(5, 8, 1e-2, 0.9).with_seed(3);
///
/// let mut trainer = Trainer::new(model, dataset, Adam::default(), config).unwrap();
/// let history = trainer.fit().unwrap();
/// assert_eq!(history.len(), 5);
/// ```
pub struct Trainer<O: Optimizer> {
    model: Model,
    dataset: Dataset,
    prototype: O,
    config: TrainingConfig,
    rng: StdRng,
    learning_rate: f64,
}

impl<O: Optimizer> Trainer<O> {
    /// Creates a trainer whose random stream comes from `config.seed`.
    ///
    /// A seeded configuration gives `StdRng::seed_from_u64(seed)`, otherwise the
    /// generator is seeded from the thread-local RNG. Use [`Trainer::with_rng`] to keep
    /// drawing from the generator that initialized the model.
    ///
    /// # Parameters
    ///
    /// - `model` - Model to train
    /// - `dataset` - Training examples, already normalized
    /// - `prototype` - Optimizer configuration, one instance is derived per parameter
    /// - `config` - Training hyperparameters
    ///
    /// # Returns
    ///
    /// - `Ok(Trainer)` - The trainer
    /// - `Err(ModelError::InputValidationError)` - If the configuration is invalid, the
    ///   dataset is empty, or there are more folds than examples
    pub fn new(
        model: Model,
        dataset: Dataset,
        prototype: O,
        config: TrainingConfig,
    ) -> Result<Self, ModelError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rng()),
        };
        Self::with_rng(model, dataset, prototype, config, rng)
    }

    /// Creates a trainer that continues an existing random stream.
    ///
    /// Fold assignment and batch shuffling draw from `rng`, so one generator seeds
    /// weight initialization and training alike. `config.seed` is ignored.
    ///
    /// # Returns
    ///
    /// - `Ok(Trainer)` - The trainer
    /// - `Err(ModelError::InputValidationError)` - Same conditions as [`Trainer::new`]
    pub fn with_rng(
        model: Model,
        dataset: Dataset,
        prototype: O,
        config: TrainingConfig,
        rng: StdRng,
    ) -> Result<Self, ModelError> {
        config.validate()?;

        if dataset.is_empty() {
            return Err(ModelError::InputValidationError(
                "Cannot train on an empty dataset".to_string(),
            ));
        }
        if config.num_folds > dataset.len() {
            return Err(ModelError::InputValidationError(format!(
                "num_folds ({}) cannot exceed the number of samples ({})",
                config.num_folds,
                dataset.len()
            )));
        }

        Ok(Self {
            model,
            dataset,
            prototype,
            learning_rate: config.learning_rate,
            config,
            rng,
        })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn into_model(self) -> Model {
        self.model
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Learning rate the next epoch will use.
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Trains the model for `num_epochs` epochs.
    ///
    /// Each epoch selects its validation fold round-robin, shuffles the remaining
    /// indices and splits them into `n_train / batch_size` batches; a trailing
    /// partial batch is dropped. When `batch_size` exceeds the training split, every
    /// training example becomes its own batch of one. After every batch each parameter
    /// is replaced by its optimizer's update. After the batches, the learning rate is
    /// decayed and the average batch loss, training accuracy and validation accuracy
    /// are recorded.
    ///
    /// # Returns
    ///
    /// - `Ok(History)` - Per-epoch loss and accuracies
    /// - `Err(ModelError)` - The first error raised by any batch; training stops there
    pub fn fit(&mut self) -> Result<History, ModelError> {
        let n_samples = self.dataset.len();
        let num_epochs = self.config.num_epochs;
        let batch_size = self.config.batch_size;

        let mut optimizers = instantiate_per_parameter(&self.prototype, self.model.params().len());

        let all_indices: Vec<usize> = (0..n_samples).collect();
        let folds = split_indices(&all_indices, self.config.num_folds, &mut self.rng)?;

        let fold_size = n_samples / self.config.num_folds;
        let n_train = n_samples - fold_size;
        let (n_batches, batch_len) = if batch_size > n_train {
            (n_train, 1)
        } else {
            (n_train / batch_size, batch_size)
        };
        let dropped = n_train - n_batches * batch_len;
        if dropped > 0 {
            warn!(
                "{} training samples per epoch do not fill a batch of {} and are skipped",
                dropped, batch_size
            );
        }

        let progress_bar = if self.config.verbose {
            ProgressBar::new((num_epochs * n_batches) as u64)
        } else {
            ProgressBar::hidden()
        };
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} | Epoch {msg}")
                .map_err(|e| {
                    ModelError::ProcessingError(format!("Failed to set progress bar template: {}", e))
                })?
                .progress_chars("█▓░"),
        );

        let mut history = History::default();

        for epoch in 0..num_epochs {
            let val_indices = &folds[epoch % folds.len()];
            let mut train_indices = complement(n_samples, val_indices);
            train_indices.shuffle(&mut self.rng);

            let mut epoch_loss = 0.0;
            for (batch_count, batch) in train_indices
                .chunks(batch_len)
                .take(n_batches)
                .enumerate()
            {
                let (x_batch, y_batch) = load_as_matrix(&self.dataset, batch)?;
                epoch_loss += self.model.feed_forward(&x_batch, &y_batch)?;
                self.apply_updates(&mut optimizers)?;

                progress_bar.set_message(format!(
                    "{}/{} | Avg Loss: {:.6}",
                    epoch + 1,
                    num_epochs,
                    epoch_loss / (batch_count + 1) as f64
                ));
                progress_bar.inc(1);
            }

            self.learning_rate *= self.config.learning_rate_decay;

            let avg_loss = epoch_loss / n_batches as f64;
            let train_accuracy = accuracy_over(&mut self.model, &self.dataset, &train_indices)?;
            let val_accuracy = accuracy_over(&mut self.model, &self.dataset, val_indices)?;

            info!(
                "Epoch {}/{}: loss {:.6}, train accuracy {:.4}, validation accuracy {:.4}",
                epoch + 1,
                num_epochs,
                avg_loss,
                train_accuracy,
                val_accuracy
            );

            history.loss.push(avg_loss);
            history.train_accuracy.push(train_accuracy);
            history.val_accuracy.push(val_accuracy);
        }

        progress_bar.finish_with_message("Training completed");
        Ok(history)
    }

    /// Accuracy of the current model on every example of `dataset`.
    ///
    /// # Returns
    ///
    /// - `Ok(f64)` - Fraction of correctly classified examples, 0 for an empty dataset
    /// - `Err(ModelError)` - If the dataset does not fit the model
    pub fn evaluate(&mut self, dataset: &Dataset) -> Result<f64, ModelError> {
        let indices: Vec<usize> = (0..dataset.len()).collect();
        accuracy_over(&mut self.model, dataset, &indices)
    }

    fn apply_updates(&mut self, optimizers: &mut [O]) -> Result<(), ModelError> {
        let learning_rate = self.learning_rate;
        for (param, optimizer) in self.model.params_mut().into_iter().zip(optimizers.iter_mut()) {
            let updated = optimizer.update(param.value(), param.grad(), learning_rate)?;
            param.set_value(updated)?;
        }
        Ok(())
    }
}

/// Fraction of rows where the predicted label equals the ground truth label.
///
/// # Parameters
///
/// - `pred` - Predicted class indices with shape (n, 1)
/// - `gt` - Ground truth class indices with shape (n, 1)
///
/// # Returns
///
/// - `Ok(f64)` - Accuracy in [0, 1], 0 if there are no predictions
/// - `Err(ModelError::ShapeIncompatible)` - If the shapes differ
pub fn compute_accuracy(pred: &Matrix, gt: &Matrix) -> Result<f64, ModelError> {
    Ok(count_correct(pred, gt)? as f64 / pred.len().max(1) as f64)
}

fn count_correct(pred: &Matrix, gt: &Matrix) -> Result<usize, ModelError> {
    if pred.shape() != gt.shape() {
        return Err(ModelError::ShapeIncompatible(format!(
            "Predictions have shape {:?} but labels have shape {:?}",
            pred.shape(),
            gt.shape()
        )));
    }
    Ok(pred
        .as_slice()
        .iter()
        .zip(gt.as_slice())
        .filter(|(p, g)| p == g)
        .count())
}

fn accuracy_over(model: &mut Model, dataset: &Dataset, indices: &[usize]) -> Result<f64, ModelError> {
    if indices.is_empty() {
        return Ok(0.0);
    }

    let mut correct = 0;
    for chunk in indices.chunks(EVAL_CHUNK_SIZE) {
        let (x, y) = load_as_matrix(dataset, chunk)?;
        correct += count_correct(&model.predict(&x)?, &y)?;
    }
    Ok(correct as f64 / indices.len() as f64)
}

/// Indices in `0..n` that are not in `excluded` (which must be sorted).
fn complement(n: usize, excluded: &[usize]) -> Vec<usize> {
    (0..n)
        .filter(|i| excluded.binary_search(i).is_err())
        .collect()
}

/// Randomly partitions `indices` into `splits` disjoint folds of equal size.
///
/// Each fold holds `indices.len() / splits` elements and is sorted ascending. The
/// `indices.len() % splits` leftover elements belong to no fold.
///
/// # Parameters
///
/// - `indices` - Indices to partition
/// - `splits` - Number of folds
/// - `rng` - Random number generator used for the assignment
///
/// # Returns
///
/// - `Ok(Vec<Vec<usize>>)` - `splits` sorted folds
/// - `Err(ModelError::InputValidationError)` - If `splits` is 0 or larger than `indices.len()`
///
/// # Example
/// ```rust
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use rustynn::trainer::split_indices;
///
/// let indices: Vec<usize> = (0..23).collect();
/// let folds = split_indices(&indices, 5, &mut StdRng::seed_from_u64(1)).unwrap();
///
/// assert_eq!(folds.len(), 5);
/// assert!(folds.iter().all(|fold| fold.len() == 4));
/// ```
pub fn split_indices<R: Rng + ?Sized>(
    indices: &[usize],
    splits: usize,
    rng: &mut R,
) -> Result<Vec<Vec<usize>>, ModelError> {
    if splits == 0 || splits > indices.len() {
        return Err(ModelError::InputValidationError(format!(
            "Cannot split {} indices into {} folds",
            indices.len(),
            splits
        )));
    }

    let mut shuffled = indices.to_vec();
    shuffled.shuffle(rng);

    let size = indices.len() / splits;
    Ok(shuffled
        .chunks_exact(size)
        .take(splits)
        .map(|chunk| {
            let mut fold = chunk.to_vec();
            fold.sort_unstable();
            fold
        })
        .collect())
}
