/// Error types that can occur during matrix and model operations
///
/// # Variants
///
/// - `ShapeIncompatible` - Operand shapes cannot be reconciled (dot product, broadcasting, reshape)
/// - `InvalidAxis` - An axis argument outside `{0, 1}` was passed to a reduction
/// - `IndexOutOfBounds` - Direct element access beyond the declared row/column extent
/// - `InputValidationError` - The input provided does not meet the expected format or validation rules
/// - `ProcessingError` - Something went wrong while processing (e.g. backward before forward)
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    ShapeIncompatible(String),
    InvalidAxis(usize),
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    InputValidationError(String),
    ProcessingError(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::ShapeIncompatible(msg) => write!(f, "Shape incompatible: {}", msg),
            ModelError::InvalidAxis(axis) => {
                write!(f, "Invalid axis: there is no axis {} in a 2D matrix", axis)
            }
            ModelError::IndexOutOfBounds {
                row,
                col,
                rows,
                cols,
            } => write!(
                f,
                "Index ({}, {}) is out of bounds for matrix of shape ({}, {})",
                row, col, rows, cols
            ),
            ModelError::InputValidationError(msg) => write!(f, "Input validation error: {}", msg),
            ModelError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
        }
    }
}

/// Implements the standard error trait for ModelError
impl std::error::Error for ModelError {}

/// Input/Output error types that can occur while reading datasets from disk
///
/// # Variants
///
/// - `StdIoError` - Wraps standard I/O errors from file system operations
/// - `TruncatedFile` - The file holds fewer bytes than the declared record layout requires
/// - `Model` - A shape or validation error raised while turning raw records into matrices
#[derive(Debug)]
pub enum IoError {
    StdIoError(std::io::Error),
    TruncatedFile {
        path: String,
        expected: u64,
        actual: u64,
    },
    Model(ModelError),
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoError::StdIoError(e) => write!(f, "IO error: {}", e),
            IoError::TruncatedFile {
                path,
                expected,
                actual,
            } => write!(
                f,
                "Dataset file '{}' is truncated: expected at least {} bytes, found {}",
                path, expected, actual
            ),
            IoError::Model(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IoError::StdIoError(e) => Some(e),
            IoError::Model(e) => Some(e),
            IoError::TruncatedFile { .. } => None,
        }
    }
}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::StdIoError(e)
    }
}

impl From<ModelError> for IoError {
    fn from(e: ModelError) -> Self {
        IoError::Model(e)
    }
}
