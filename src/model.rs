use serde::Deserialize;
use std::{collections::HashSet, fs, io, path::Path, sync::Arc};

use crate::error::{ModelError, StartupError};
use crate::types::{FeatureRecord, FEATURE_NAMES};

/// A trained binary classifier. Class 1 is "hurricane".
pub trait Classifier: Send + Sync {
    /// One label per row.
    fn predict(&self, rows: &[FeatureRecord]) -> Result<Vec<i64>, ModelError>;

    /// One `[p(class 0), p(class 1)]` vector per row.
    fn predict_proba(&self, rows: &[FeatureRecord]) -> Result<Vec<Vec<f64>>, ModelError>;

    fn describe(&self) -> String;
}

// ---------- Logistic regression artifact ----------

#[derive(Deserialize)]
struct ScalerJson {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

#[derive(Deserialize)]
struct LogisticJson {
    features: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
    scaler: Option<ScalerJson>,
    threshold: Option<f64>,
}

struct Term {
    feature: String,
    coefficient: f64,
    mean: f64,
    scale: f64,
}

/// Standard-scaled logistic regression with weights keyed by column name,
/// so the artifact's column order never has to match ours.
pub struct LogisticModel {
    terms: Vec<Term>,
    intercept: f64,
    threshold: f64,
}

impl LogisticModel {
    pub fn from_json(txt: &str) -> Result<Self, ModelError> {
        let raw: LogisticJson = serde_json::from_str(txt)?;
        let n = raw.features.len();

        if raw.coefficients.len() != n {
            return Err(ModelError::Invalid(format!(
                "{} coefficients for {} features",
                raw.coefficients.len(),
                n
            )));
        }
        check_schema(&raw.features)?;

        let (mean, scale) = match raw.scaler {
            Some(s) => {
                if s.mean.len() != n || s.scale.len() != n {
                    return Err(ModelError::Invalid(format!(
                        "scaler has {} means and {} scales for {} features",
                        s.mean.len(),
                        s.scale.len(),
                        n
                    )));
                }
                (s.mean, s.scale)
            }
            None => (vec![0.0; n], vec![1.0; n]),
        };
        if let Some(bad) = scale.iter().find(|s| !s.is_finite() || **s == 0.0) {
            return Err(ModelError::Invalid(format!("scaler scale entry {} is unusable", bad)));
        }

        let threshold = raw.threshold.unwrap_or(0.5);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ModelError::Invalid(format!("threshold {} outside [0, 1]", threshold)));
        }

        let terms = raw
            .features
            .into_iter()
            .zip(raw.coefficients)
            .zip(mean.into_iter().zip(scale))
            .map(|((feature, coefficient), (mean, scale))| Term {
                feature,
                coefficient,
                mean,
                scale,
            })
            .collect();

        Ok(Self {
            terms,
            intercept: raw.intercept,
            threshold,
        })
    }

    fn positive_probability(&self, row: &FeatureRecord) -> Result<f64, ModelError> {
        let mut z = self.intercept;
        for t in &self.terms {
            let x = row
                .value(&t.feature)
                .ok_or_else(|| ModelError::Runtime(format!("row has no column `{}`", t.feature)))?;
            z += t.coefficient * (x - t.mean) / t.scale;
        }
        Ok(sigmoid(z))
    }
}

impl Classifier for LogisticModel {
    fn predict(&self, rows: &[FeatureRecord]) -> Result<Vec<i64>, ModelError> {
        rows.iter()
            .map(|r| {
                let p = self.positive_probability(r)?;
                Ok::<_, ModelError>(i64::from(p >= self.threshold))
            })
            .collect()
    }

    fn predict_proba(&self, rows: &[FeatureRecord]) -> Result<Vec<Vec<f64>>, ModelError> {
        rows.iter()
            .map(|r| {
                let p = self.positive_probability(r)?;
                Ok::<_, ModelError>(vec![1.0 - p, p])
            })
            .collect()
    }

    fn describe(&self) -> String {
        format!(
            "logistic regression over {} features (threshold {})",
            self.terms.len(),
            self.threshold
        )
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// The artifact must name exactly the ten training columns, once each.
pub fn check_schema(features: &[String]) -> Result<(), ModelError> {
    let mut seen = HashSet::new();
    let mut duplicated = Vec::new();
    let mut unexpected = Vec::new();
    for f in features {
        if !seen.insert(f.as_str()) {
            duplicated.push(f.clone());
        }
        if !FEATURE_NAMES.contains(&f.as_str()) {
            unexpected.push(f.clone());
        }
    }
    let missing: Vec<String> = FEATURE_NAMES
        .iter()
        .filter(|n| !seen.contains(**n))
        .map(|n| n.to_string())
        .collect();

    if missing.is_empty() && unexpected.is_empty() && duplicated.is_empty() {
        Ok(())
    } else {
        Err(ModelError::SchemaMismatch {
            missing,
            unexpected,
            duplicated,
        })
    }
}

// ---------- Loading ----------

/// Load the artifact at `path`, picking the backend from its extension.
/// A missing file is reported separately from a broken one.
pub fn load_classifier(path: &Path) -> Result<Arc<dyn Classifier>, StartupError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let load_err = |source: ModelError| StartupError::ModelLoad {
        path: path.to_path_buf(),
        source,
    };

    match ext.as_str() {
        "pt" | "ts" => {
            if !path.exists() {
                return Err(StartupError::ModelMissing(path.to_path_buf()));
            }
            load_torchscript(path).map_err(load_err)
        }
        _ => {
            let txt = fs::read_to_string(path).map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => StartupError::ModelMissing(path.to_path_buf()),
                _ => StartupError::Io {
                    path: path.to_path_buf(),
                    source: e,
                },
            })?;
            let mdl = LogisticModel::from_json(&txt).map_err(load_err)?;
            Ok(Arc::new(mdl))
        }
    }
}

#[cfg(feature = "torch")]
fn load_torchscript(path: &Path) -> Result<Arc<dyn Classifier>, ModelError> {
    Ok(Arc::new(crate::torch_model::TorchModel::load(path)?))
}

#[cfg(not(feature = "torch"))]
fn load_torchscript(path: &Path) -> Result<Arc<dyn Classifier>, ModelError> {
    Err(ModelError::UnsupportedFormat(format!(
        "{} is a TorchScript module; rebuild with `--features torch`",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::build_record;
    use crate::types::{FormInput, Observation};

    const PRESSURE_ONLY: &str = r#"{
        "features": ["year","month","day","hour","lat","long","pressure",
                     "tropicalstorm_force_diameter","pressure_anomaly","abs_lat"],
        "coefficients": [0,0,0,0,0,0,0,0,0.1,0],
        "intercept": -2.0
    }"#;

    fn record(pressure: i32) -> FeatureRecord {
        let input = FormInput {
            pressure,
            ..FormInput::default()
        };
        build_record(&Observation::from_input(&input).unwrap())
    }

    #[test]
    fn test_logistic_probabilities() {
        let mdl = LogisticModel::from_json(PRESSURE_ONLY).unwrap();
        let probs = mdl.predict_proba(&[record(980), record(1013)]).unwrap();

        assert_eq!(probs.len(), 2);
        assert!((probs[0][1] - sigmoid(1.3)).abs() < 1e-12);
        assert!((probs[1][1] - sigmoid(-2.0)).abs() < 1e-12);
        for p in &probs {
            assert!((p[0] + p[1] - 1.0).abs() < 1e-12, "classes should sum to one");
        }

        let labels = mdl.predict(&[record(980), record(1013)]).unwrap();
        assert_eq!(labels, vec![1, 0]);
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let shuffled = r#"{
            "features": ["abs_lat","pressure_anomaly","tropicalstorm_force_diameter","pressure",
                         "long","lat","hour","day","month","year"],
            "coefficients": [0,0.1,0,0,0,0,0,0,0,0],
            "intercept": -2.0
        }"#;
        let a = LogisticModel::from_json(PRESSURE_ONLY).unwrap();
        let b = LogisticModel::from_json(shuffled).unwrap();
        let row = [record(955)];
        assert_eq!(a.predict_proba(&row).unwrap(), b.predict_proba(&row).unwrap());
    }

    #[test]
    fn test_scaler_applied() {
        let scaled = r#"{
            "features": ["year","month","day","hour","lat","long","pressure",
                         "tropicalstorm_force_diameter","pressure_anomaly","abs_lat"],
            "coefficients": [0,0,0,0,0,0,0,0,1.0,0],
            "intercept": 0.0,
            "scaler": {"mean": [0,0,0,0,0,0,0,0,33,0], "scale": [1,1,1,1,1,1,1,1,10,1]}
        }"#;
        let mdl = LogisticModel::from_json(scaled).unwrap();
        // anomaly 33 sits exactly on the mean -> z = 0
        let p = mdl.predict_proba(&[record(980)]).unwrap()[0][1];
        assert!((p - 0.5).abs() < 1e-12);
        // default threshold is inclusive
        assert_eq!(mdl.predict(&[record(980)]).unwrap(), vec![1]);
    }

    #[test]
    fn test_schema_mismatch_reported() {
        let bad = r#"{
            "features": ["year","month","day","hour","lat","long","pressure",
                         "storm_diameter","pressure_anomaly","pressure_anomaly"],
            "coefficients": [0,0,0,0,0,0,0,0,0,0],
            "intercept": 0.0
        }"#;
        match LogisticModel::from_json(bad) {
            Err(ModelError::SchemaMismatch {
                missing,
                unexpected,
                duplicated,
            }) => {
                assert_eq!(missing, vec!["tropicalstorm_force_diameter", "abs_lat"]);
                assert_eq!(unexpected, vec!["storm_diameter"]);
                assert_eq!(duplicated, vec!["pressure_anomaly"]);
            }
            Err(e) => panic!("wrong error: {}", e),
            Ok(_) => panic!("schema drift should be rejected"),
        }
    }

    #[test]
    fn test_invalid_artifacts() {
        let short = r#"{"features": ["year"], "coefficients": [], "intercept": 0}"#;
        assert!(matches!(LogisticModel::from_json(short), Err(ModelError::Invalid(_))));

        let zero_scale = PRESSURE_ONLY.replace(
            r#""intercept": -2.0"#,
            r#""intercept": -2.0, "scaler": {"mean": [0,0,0,0,0,0,0,0,0,0], "scale": [1,1,1,1,1,1,1,1,0,1]}"#,
        );
        assert!(matches!(LogisticModel::from_json(&zero_scale), Err(ModelError::Invalid(_))));

        let threshold = PRESSURE_ONLY.replace(r#""intercept": -2.0"#, r#""intercept": -2.0, "threshold": 1.5"#);
        assert!(matches!(LogisticModel::from_json(&threshold), Err(ModelError::Invalid(_))));

        assert!(matches!(LogisticModel::from_json("not json"), Err(ModelError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_distinct() {
        let err = load_classifier(Path::new("no/such/hurricane_model.json")).err().unwrap();
        assert!(matches!(err, StartupError::ModelMissing(_)));

        let err = load_classifier(Path::new("no/such/hurricane_model.pt")).err().unwrap();
        assert!(matches!(err, StartupError::ModelMissing(_)));
    }
}
