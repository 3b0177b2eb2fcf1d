use crate::error::{IoError, ModelError};
use crate::matrix::Matrix;
use log::debug;
use ndarray::{Array1, Array2, Axis};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;

/// Labeled examples: one feature row and one class label per example.
///
/// # Fields
///
/// - `features` - Feature matrix with shape (n_samples, n_features)
/// - `labels` - Class label per example, length n_samples
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Array2<f64>,
    labels: Array1<f64>,
}

impl Dataset {
    /// Pairs features with labels.
    ///
    /// # Returns
    ///
    /// - `Ok(Dataset)` - The dataset
    /// - `Err(ModelError::InputValidationError)` - If the number of rows and labels differ
    pub fn new(features: Array2<f64>, labels: Array1<f64>) -> Result<Self, ModelError> {
        if features.nrows() != labels.len() {
            return Err(ModelError::InputValidationError(format!(
                "features and labels must have the same number of samples, features rows: {}, labels length: {}",
                features.nrows(),
                labels.len()
            )));
        }
        Ok(Self { features, labels })
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn labels(&self) -> &Array1<f64> {
        &self.labels
    }

    /// Number of examples.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }
}

/// Reads a fixed-record binary dataset.
///
/// Every record is `record_width` unsigned bytes of feature intensities (0-255)
/// followed by one label byte.
///
/// # Parameters
///
/// - `path` - File to read
/// - `rows` - Number of records to read
/// - `record_width` - Number of feature bytes per record
///
/// # Returns
///
/// - `Ok(Dataset)` - Features (rows × record_width) as raw intensities and labels
/// - `Err(IoError::TruncatedFile)` - If the file is shorter than `rows * (record_width + 1)` bytes
/// - `Err(IoError::StdIoError)` - If the file cannot be opened or read
pub fn load_dataset<P: AsRef<Path>>(
    path: P,
    rows: usize,
    record_width: usize,
) -> Result<Dataset, IoError> {
    let path = path.as_ref();
    let started = Instant::now();

    let expected = record_width
        .checked_add(1)
        .and_then(|width| rows.checked_mul(width))
        .ok_or_else(|| {
            ModelError::InputValidationError(format!(
                "{} records of width {} overflow the addressable file size",
                rows, record_width
            ))
        })? as u64;

    let file = File::open(path)?;
    let actual = file.metadata()?.len();
    if actual < expected {
        return Err(IoError::TruncatedFile {
            path: path.display().to_string(),
            expected,
            actual,
        });
    }

    let mut reader = BufReader::new(file);
    let mut record = vec![0u8; record_width + 1];
    let mut features = Vec::with_capacity(rows * record_width);
    let mut labels = Vec::with_capacity(rows);

    for _ in 0..rows {
        reader.read_exact(&mut record)?;
        features.extend(record[..record_width].iter().map(|&b| f64::from(b)));
        labels.push(f64::from(record[record_width]));
    }

    let features = Array2::from_shape_vec((rows, record_width), features)
        .map_err(|e| ModelError::ProcessingError(format!("Failed to build feature matrix: {}", e)))?;
    let dataset = Dataset::new(features, Array1::from(labels))?;

    debug!(
        "Loaded {} records of width {} from {} in {:.1} ms",
        rows,
        record_width,
        path.display(),
        started.elapsed().as_secs_f64() * 1000.0
    );
    Ok(dataset)
}

/// Normalizes raw intensities in place and returns the training mean.
///
/// Every feature of both sets is scaled by 1/255, then the mean of all scaled
/// *training* features is subtracted from both sets. The test set never contributes
/// to the mean.
///
/// # Parameters
///
/// - `train` - Training set, also the source of the mean
/// - `test` - Test set, shifted by the training mean
///
/// # Returns
///
/// - `Ok(f64)` - The subtracted training mean
/// - `Err(ModelError::InputValidationError)` - If the training set has no features
pub fn prepare_dataset(train: &mut Dataset, test: &mut Dataset) -> Result<f64, ModelError> {
    let started = Instant::now();

    train.features.par_mapv_inplace(|x| x / 255.0);
    test.features.par_mapv_inplace(|x| x / 255.0);

    let mean = train.features.mean().ok_or_else(|| {
        ModelError::InputValidationError("Cannot normalize an empty training set".to_string())
    })?;

    train.features.par_mapv_inplace(|x| x - mean);
    test.features.par_mapv_inplace(|x| x - mean);

    debug!(
        "Dataset prepared in {:.1} ms (training mean {:.6})",
        started.elapsed().as_secs_f64() * 1000.0,
        mean
    );
    Ok(mean)
}

/// Gathers the examples at `indices` into a feature matrix and a label column.
///
/// # Parameters
///
/// - `dataset` - Source dataset
/// - `indices` - Example indices, gathered in the given order
///
/// # Returns
///
/// - `Ok((Matrix, Matrix))` - Features (indices.len() × n_features) and labels (indices.len() × 1)
/// - `Err(ModelError::IndexOutOfBounds)` - If an index is not a valid example
pub fn load_as_matrix(dataset: &Dataset, indices: &[usize]) -> Result<(Matrix, Matrix), ModelError> {
    if let Some(&bad) = indices.iter().find(|&&i| i >= dataset.len()) {
        return Err(ModelError::IndexOutOfBounds {
            row: bad,
            col: 0,
            rows: dataset.len(),
            cols: dataset.n_features(),
        });
    }

    let features = Matrix::from(dataset.features.select(Axis(0), indices));
    let labels = Matrix::from_vec(
        indices.len(),
        1,
        indices.iter().map(|&i| dataset.labels[i]).collect(),
    )?;
    Ok((features, labels))
}
