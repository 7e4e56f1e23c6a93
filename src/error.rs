use std::path::PathBuf;

use thiserror::Error;

/// Rejected form values, caught before the model is touched.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("field `{field}` must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },
}

/// Problems with the model artifact or with what it returns.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model schema mismatch: missing {missing:?}, unexpected {unexpected:?}, duplicated {duplicated:?}")]
    SchemaMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
        duplicated: Vec<String>,
    },
    #[error("invalid model artifact: {0}")]
    Invalid(String),
    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),
    #[error("model runtime error: {0}")]
    Runtime(String),
}

/// Inference failed for the current request. Aborts the render.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("malformed model output: {0}")]
    MalformedOutput(String),
}

/// Failures during bootstrap. All of these stop the process before serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Model file not found: {}. Run the training script first.", .0.display())]
    ModelMissing(PathBuf),
    #[error("failed to load model {}: {source}", path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: ModelError,
    },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
