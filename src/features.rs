use crate::types::{FeatureRecord, Observation};

/// Mean sea-level pressure (mb) the anomaly is measured against.
pub const REFERENCE_PRESSURE_MB: i32 = 1013;

/// Positive when the storm's central pressure is below the reference.
pub fn pressure_anomaly(pressure: i32) -> f64 {
    f64::from(REFERENCE_PRESSURE_MB) - f64::from(pressure)
}

pub fn abs_lat(lat: f64) -> f64 {
    lat.abs()
}

/// Raw readings + derived features -> the ten-column model row.
pub fn build_record(obs: &Observation) -> FeatureRecord {
    FeatureRecord {
        year: f64::from(obs.year),
        month: f64::from(obs.month),
        day: f64::from(obs.day),
        hour: f64::from(obs.hour),
        lat: obs.lat,
        long: obs.long,
        pressure: f64::from(obs.pressure),
        tropicalstorm_force_diameter: obs.tropicalstorm_force_diameter,
        pressure_anomaly: pressure_anomaly(obs.pressure),
        abs_lat: abs_lat(obs.lat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FormInput, FEATURE_NAMES};

    fn observation(input: FormInput) -> Observation {
        Observation::from_input(&input).unwrap()
    }

    #[test]
    fn test_pressure_anomaly() {
        assert_eq!(pressure_anomaly(980), 33.0);
        assert_eq!(pressure_anomaly(1013), 0.0);
        assert_eq!(pressure_anomaly(1050), -37.0);
        // no overflow at the extremes
        assert_eq!(pressure_anomaly(i32::MIN), 1013.0 + 2147483648.0);
    }

    #[test]
    fn test_abs_lat() {
        assert_eq!(abs_lat(25.0), 25.0);
        assert_eq!(abs_lat(-40.5), 40.5);
        assert_eq!(abs_lat(0.0), 0.0);
    }

    #[test]
    fn test_default_record() {
        let rec = build_record(&observation(FormInput::default()));

        assert_eq!(rec.year, 2023.0);
        assert_eq!(rec.month, 9.0);
        assert_eq!(rec.day, 15.0);
        assert_eq!(rec.hour, 12.0);
        assert_eq!(rec.lat, 25.0);
        assert_eq!(rec.long, -75.0);
        assert_eq!(rec.pressure, 980.0);
        assert_eq!(rec.tropicalstorm_force_diameter, 120.0);
        assert_eq!(rec.pressure_anomaly, 33.0);
        assert_eq!(rec.abs_lat, 25.0);
    }

    #[test]
    fn test_reference_pressure_zeroes_anomaly() {
        for (lat, year) in [(10.0, 1990), (-33.3, 2023), (60.0, 2050)] {
            let rec = build_record(&observation(FormInput {
                pressure: 1013,
                lat,
                year,
                ..FormInput::default()
            }));
            assert_eq!(rec.pressure_anomaly, 0.0);
        }
    }

    #[test]
    fn test_record_shape_is_fixed() {
        let inputs = [
            FormInput::default(),
            FormInput {
                lat: -89.99,
                long: 179.5,
                pressure: 870,
                tropicalstorm_force_diameter: 0.0,
                ..FormInput::default()
            },
        ];
        for input in inputs {
            let named = build_record(&observation(input)).named();
            let names: Vec<&str> = named.iter().map(|(n, _)| *n).collect();
            assert_eq!(names, FEATURE_NAMES.to_vec());
        }
    }

    #[test]
    fn test_lookup_by_name_matches_row() {
        let rec = build_record(&observation(FormInput {
            lat: -12.25,
            ..FormInput::default()
        }));
        for (name, value) in rec.named() {
            assert_eq!(rec.value(name), Some(value), "column {} disagrees", name);
        }
        assert_eq!(rec.value("abs_lat"), Some(12.25));
        assert_eq!(rec.value("wind_speed"), None);
    }
}
