use std::path::Path;
use tch::{kind::Kind, CModule, Device, Tensor};

use crate::error::ModelError;
use crate::model::Classifier;
use crate::types::{FeatureRecord, FEATURE_NAMES};

/// TorchScript classifier. Takes `[N, 10]` float rows in `FEATURE_NAMES`
/// order and emits `[N, 2]` logits.
pub struct TorchModel {
    model: CModule,
    device: Device,
}

fn runtime(e: tch::TchError) -> ModelError {
    ModelError::Runtime(e.to_string())
}

impl TorchModel {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let device = Device::Cpu;
        let model = CModule::load_on_device(path, device).map_err(runtime)?;

        // Probe output shape with a zero row: expect [1, 2]
        let dummy = Tensor::zeros([1, FEATURE_NAMES.len() as i64], (Kind::Float, device));
        let sz = model.forward_ts(&[dummy]).map_err(runtime)?.size();
        if sz != [1, 2] {
            return Err(ModelError::Invalid(format!(
                "unexpected model output size: {:?}",
                sz
            )));
        }

        Ok(Self { model, device })
    }

    fn probabilities(&self, rows: &[FeatureRecord]) -> Result<Tensor, ModelError> {
        let flat: Vec<f32> = rows
            .iter()
            .flat_map(|r| r.to_row())
            .map(|v| v as f32)
            .collect();
        let input = Tensor::from_slice(&flat)
            .reshape([rows.len() as i64, FEATURE_NAMES.len() as i64])
            .to_device(self.device);

        let logits = self.model.forward_ts(&[input]).map_err(runtime)?;
        Ok(logits.softmax(-1, Kind::Double))
    }
}

impl Classifier for TorchModel {
    fn predict(&self, rows: &[FeatureRecord]) -> Result<Vec<i64>, ModelError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let labels = self.probabilities(rows)?.argmax(-1, false);
        Ok((0..rows.len() as i64)
            .map(|i| labels.int64_value(&[i]))
            .collect())
    }

    fn predict_proba(&self, rows: &[FeatureRecord]) -> Result<Vec<Vec<f64>>, ModelError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let probs = self.probabilities(rows)?;
        let sz = probs.size();
        let (n, k) = (sz[0], sz[1]);
        Ok((0..n)
            .map(|i| (0..k).map(|j| probs.double_value(&[i, j])).collect())
            .collect())
    }

    fn describe(&self) -> String {
        format!("TorchScript module on {:?}", self.device)
    }
}
