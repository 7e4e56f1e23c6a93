//! Inference request handler.
//!
//! Each request carries the full form state. `handle` turns it into the
//! page to show: the clamped observation with its derived features, and
//! either `Idle` or `ResultShown`. Nothing survives between requests, so
//! any interaction other than running the model lands back on `Idle`.

use serde::Serialize;

use crate::error::PredictError;
use crate::features::build_record;
use crate::model::Classifier;
use crate::types::{FeatureRecord, FormInput, Observation, PredictionResult, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Any interaction that is not the prediction button.
    Edit,
    RunPrediction,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", content = "result", rename_all = "snake_case")]
pub enum PageState {
    Idle,
    ResultShown(PredictionResult),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub observation: Observation,
    pub features: FeatureRecord,
    pub state: PageState,
}

pub fn handle(
    classifier: &dyn Classifier,
    input: &FormInput,
    action: Action,
) -> Result<Page, PredictError> {
    let observation = Observation::from_input(input)?;
    // derived features are recomputed on every interaction
    let features = build_record(&observation);

    let state = match action {
        Action::Edit => PageState::Idle,
        Action::RunPrediction => PageState::ResultShown(predict(classifier, &features)?),
    };

    Ok(Page {
        observation,
        features,
        state,
    })
}

/// Run the model on a single row and read back row 0: its label and the
/// probability in the positive-class column.
pub fn predict(
    classifier: &dyn Classifier,
    record: &FeatureRecord,
) -> Result<PredictionResult, PredictError> {
    let rows = std::slice::from_ref(record);

    let labels = classifier.predict(rows)?;
    let label = *labels
        .first()
        .ok_or_else(|| PredictError::MalformedOutput("predict returned no rows".into()))?;

    let probs = classifier.predict_proba(rows)?;
    let row = probs
        .first()
        .ok_or_else(|| PredictError::MalformedOutput("predict_proba returned no rows".into()))?;
    let probability = *row.get(1).ok_or_else(|| {
        PredictError::MalformedOutput(format!(
            "predict_proba row has {} columns, need the positive class at index 1",
            row.len()
        ))
    })?;

    let verdict = Verdict::from_label(label)
        .ok_or_else(|| PredictError::MalformedOutput(format!("non-binary label {}", label)))?;
    if !(0.0..=1.0).contains(&probability) {
        return Err(PredictError::MalformedOutput(format!(
            "probability {} outside [0, 1]",
            probability
        )));
    }

    Ok(PredictionResult {
        verdict,
        probability,
    })
}
