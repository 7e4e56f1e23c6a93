pub mod assets;
pub mod config;
pub mod error;
pub mod features;
pub mod handler;
pub mod model;
pub mod render;
pub mod server;
#[cfg(feature = "torch")]
pub mod torch_model;
pub mod types;

pub use config::AppConfig;
pub use error::{InputError, ModelError, PredictError, StartupError};
pub use handler::{handle, Action, Page, PageState};
pub use model::{Classifier, LogisticModel};
pub use server::{bootstrap, router, AppState};
pub use types::{FeatureRecord, FormInput, Observation, PredictionResult, Verdict, FEATURE_NAMES};
