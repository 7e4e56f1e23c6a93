use axum::{
    extract::{Form, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::assets::Background;
use crate::config::AppConfig;
use crate::error::{PredictError, StartupError};
use crate::handler::{self, Action, Page, PageState};
use crate::model::{self, Classifier};
use crate::render::{self, Chrome, BACKGROUND_ROUTE};
use crate::types::{FeatureRecord, FormInput, Verdict};

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn Classifier>,
    pub background: Arc<Background>,
    pub log_predictions: bool,
}

impl AppState {
    pub fn new(classifier: Arc<dyn Classifier>, background: Background) -> Self {
        Self {
            classifier,
            background: Arc::new(background),
            log_predictions: false,
        }
    }

    fn chrome(&self) -> Chrome {
        Chrome {
            has_background: self.background.bytes().is_some(),
            warning: self.background.warning(),
        }
    }
}

/// Read both startup files. The background is optional, the model is not:
/// without it nothing is served.
pub fn bootstrap(cfg: &AppConfig) -> Result<AppState, StartupError> {
    let background = Background::load(&cfg.background_path)?;
    let classifier = model::load_classifier(&cfg.model_path)?;
    tracing::info!(
        "loaded model {}: {}",
        cfg.model_path.display(),
        classifier.describe()
    );

    Ok(AppState {
        log_predictions: cfg.log_predictions,
        ..AppState::new(classifier, background)
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/api/predict", post(api_predict))
        .route(BACKGROUND_ROUTE, get(background))
        .with_state(state)
}

// ---------- Handlers ----------

fn run(state: &AppState, input: &FormInput, action: Action) -> Result<Page, PredictError> {
    let page = handler::handle(state.classifier.as_ref(), input, action)?;
    if state.log_predictions {
        if let PageState::ResultShown(r) = &page.state {
            let sample: Vec<String> = page
                .features
                .named()
                .iter()
                .map(|(name, v)| format!("{}={:.3}", name, v))
                .collect();
            tracing::info!(
                "prediction verdict={:?} p={:.4} features=[{}]",
                r.verdict,
                r.probability,
                sample.join(", ")
            );
        }
    }
    Ok(page)
}

fn status_for(err: &PredictError) -> StatusCode {
    match err {
        PredictError::Input(_) => StatusCode::BAD_REQUEST,
        PredictError::Model(_) | PredictError::MalformedOutput(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn html_response(state: &AppState, input: &FormInput, action: Action) -> Response {
    match run(state, input, action) {
        Ok(page) => Html(render::page(&page, &state.chrome())).into_response(),
        Err(e) => {
            tracing::error!("render aborted: {}", e);
            let bad_input = matches!(e, PredictError::Input(_));
            (status_for(&e), Html(render::fault(bad_input))).into_response()
        }
    }
}

async fn index(State(state): State<AppState>, Query(input): Query<FormInput>) -> Response {
    html_response(&state, &input, Action::Edit)
}

async fn predict(State(state): State<AppState>, Form(input): Form<FormInput>) -> Response {
    html_response(&state, &input, Action::RunPrediction)
}

#[derive(Serialize)]
struct PredictOut {
    label: i64,
    verdict: Verdict,
    probability: f64,
    probability_display: String,
    features: FeatureRecord,
}

async fn api_predict(
    State(state): State<AppState>,
    Json(input): Json<FormInput>,
) -> Result<Json<PredictOut>, (StatusCode, Json<serde_json::Value>)> {
    let page = run(&state, &input, Action::RunPrediction)
        .map_err(|e| {
            tracing::error!("prediction aborted: {}", e);
            let msg = match e {
                PredictError::Input(_) => e.to_string(),
                _ => render::FAULT_MESSAGE.to_string(),
            };
            (status_for(&e), Json(json!({ "error": msg })))
        })?;

    match page.state {
        PageState::ResultShown(r) => Ok(Json(PredictOut {
            label: r.verdict.label(),
            verdict: r.verdict,
            probability: r.probability,
            probability_display: r.probability_display(),
            features: page.features,
        })),
        PageState::Idle => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "prediction did not run" })),
        )),
    }
}

async fn background(State(state): State<AppState>) -> Response {
    match state.background.bytes() {
        Some(b) => ([(header::CONTENT_TYPE, "image/jpeg")], b.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
