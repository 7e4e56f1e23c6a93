use serde::{Deserialize, Serialize};

use crate::error::InputError;

// ---------- Raw form input ----------

// Nine raw controls as they arrive from the form / query string / JSON body.
// Anything left out falls back to the control's default.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FormInput {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub lat: f64,
    pub long: f64,
    pub pressure: i32,
    pub tropicalstorm_force_diameter: f64,
}

impl Default for FormInput {
    fn default() -> Self {
        Self {
            year: 2023,
            month: 9,
            day: 15,
            hour: 12,
            lat: 25.0,
            long: -75.0,
            pressure: 980,
            tropicalstorm_force_diameter: 120.0,
        }
    }
}

pub const MONTH_RANGE: (i32, i32) = (1, 12);
pub const DAY_RANGE: (i32, i32) = (1, 31);
pub const HOUR_RANGE: (i32, i32) = (0, 23);

// ---------- Observation ----------

/// One set of readings after the range controls have been applied.
///
/// Month, day and hour are clamped the way a slider would clamp them; the
/// remaining fields are free numeric entries. Day is never checked against
/// month, so `day = 31, month = 2` is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub lat: f64,
    pub long: f64,
    pub pressure: i32,
    pub tropicalstorm_force_diameter: f64,
}

impl Observation {
    pub fn from_input(input: &FormInput) -> Result<Self, InputError> {
        ensure_finite("lat", input.lat)?;
        ensure_finite("long", input.long)?;
        ensure_finite(
            "tropicalstorm_force_diameter",
            input.tropicalstorm_force_diameter,
        )?;

        Ok(Self {
            year: input.year,
            month: input.month.clamp(MONTH_RANGE.0, MONTH_RANGE.1),
            day: input.day.clamp(DAY_RANGE.0, DAY_RANGE.1),
            hour: input.hour.clamp(HOUR_RANGE.0, HOUR_RANGE.1),
            lat: input.lat,
            long: input.long,
            pressure: input.pressure,
            tropicalstorm_force_diameter: input.tropicalstorm_force_diameter,
        })
    }
}

fn ensure_finite(field: &'static str, value: f64) -> Result<(), InputError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(InputError::NonFinite { field, value })
    }
}

// ---------- Model contract ----------

/// Column names the classifier was trained on, in canonical order.
pub const FEATURE_NAMES: [&str; 10] = [
    "year",
    "month",
    "day",
    "hour",
    "lat",
    "long",
    "pressure",
    "tropicalstorm_force_diameter",
    "pressure_anomaly",
    "abs_lat",
];

/// The single row handed to the model: eight raw readings plus the two
/// derived features. Built only through `features::build_record`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureRecord {
    pub year: f64,
    pub month: f64,
    pub day: f64,
    pub hour: f64,
    pub lat: f64,
    pub long: f64,
    pub pressure: f64,
    pub tropicalstorm_force_diameter: f64,
    pub pressure_anomaly: f64,
    pub abs_lat: f64,
}

impl FeatureRecord {
    /// Look a column up by its training name.
    pub fn value(&self, name: &str) -> Option<f64> {
        let v = match name {
            "year" => self.year,
            "month" => self.month,
            "day" => self.day,
            "hour" => self.hour,
            "lat" => self.lat,
            "long" => self.long,
            "pressure" => self.pressure,
            "tropicalstorm_force_diameter" => self.tropicalstorm_force_diameter,
            "pressure_anomaly" => self.pressure_anomaly,
            "abs_lat" => self.abs_lat,
            _ => return None,
        };
        Some(v)
    }

    /// Values in `FEATURE_NAMES` order.
    pub fn to_row(&self) -> [f64; 10] {
        [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.lat,
            self.long,
            self.pressure,
            self.tropicalstorm_force_diameter,
            self.pressure_anomaly,
            self.abs_lat,
        ]
    }

    pub fn named(&self) -> Vec<(&'static str, f64)> {
        FEATURE_NAMES.iter().copied().zip(self.to_row()).collect()
    }
}

// ---------- Prediction ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    TropicalStorm,
    Hurricane,
}

impl Verdict {
    pub fn from_label(label: i64) -> Option<Self> {
        match label {
            0 => Some(Verdict::TropicalStorm),
            1 => Some(Verdict::Hurricane),
            _ => None,
        }
    }

    pub fn label(self) -> i64 {
        match self {
            Verdict::TropicalStorm => 0,
            Verdict::Hurricane => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub verdict: Verdict,
    /// Positive-class (hurricane) probability, whatever the verdict.
    pub probability: f64,
}

impl PredictionResult {
    /// "82.3%" for 0.8234.
    pub fn probability_display(&self) -> String {
        format_percent(self.probability)
    }
}

pub fn format_percent(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}
