//! Typed output records of the preprocessing pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::columns::data_columns;

/// One quality-gated aggregate row: a single turbine over a single window.
///
/// `window_start` labels the window by its **start** timestamp. Nulls are
/// values masked by the coverage gate or the envelope filter — a window with
/// no valid data is still a present row, never an absent one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    #[serde(rename = "TurbineName")]
    pub turbine_name: String,
    #[serde(rename = "TimeStamp_StartFormat")]
    pub window_start: DateTime<Utc>,
    #[serde(rename = "ActivePowerMean")]
    pub active_power_mean: Option<f64>,
    #[serde(rename = "ActivePowerSD")]
    pub active_power_sd: Option<f64>,
    #[serde(rename = "WindSpeedMean")]
    pub wind_speed_mean: Option<f64>,
    #[serde(rename = "WindSpeedSD")]
    pub wind_speed_sd: Option<f64>,
    #[serde(rename = "YawAngleMean")]
    pub yaw_angle_mean: Option<f64>,
    #[serde(rename = "YawAngleMin")]
    pub yaw_angle_min: Option<f64>,
    #[serde(rename = "YawAngleMax")]
    pub yaw_angle_max: Option<f64>,
    #[serde(rename = "PitchAngleMean")]
    pub pitch_angle_mean: Option<f64>,
    #[serde(rename = "GenRpmMean")]
    pub gen_rpm_mean: Option<f64>,
    #[serde(rename = "AmbientTemp")]
    pub ambient_temp: Option<f64>,
    /// Fixed 0.0 sentinel: genuine downtime telemetry is unavailable in the
    /// source data, so this is a deliberate approximation, not a measurement.
    #[serde(rename = "ShutdownDuration")]
    pub shutdown_duration: f64,
}

impl AggregateRecord {
    /// A row with every measurement null and the shutdown sentinel set.
    #[must_use]
    pub fn empty(turbine_name: impl Into<String>, window_start: DateTime<Utc>) -> Self {
        Self {
            turbine_name: turbine_name.into(),
            window_start,
            active_power_mean: None,
            active_power_sd: None,
            wind_speed_mean: None,
            wind_speed_sd: None,
            yaw_angle_mean: None,
            yaw_angle_min: None,
            yaw_angle_max: None,
            pitch_angle_mean: None,
            gen_rpm_mean: None,
            ambient_temp: None,
            shutdown_duration: 0.0,
        }
    }

    /// Read a measurement by its output column name.
    #[must_use]
    pub fn measurement(&self, column: &str) -> Option<f64> {
        match column {
            data_columns::ACTIVE_POWER_MEAN => self.active_power_mean,
            data_columns::ACTIVE_POWER_SD => self.active_power_sd,
            data_columns::WIND_SPEED_MEAN => self.wind_speed_mean,
            data_columns::WIND_SPEED_SD => self.wind_speed_sd,
            data_columns::YAW_ANGLE_MEAN => self.yaw_angle_mean,
            data_columns::YAW_ANGLE_MIN => self.yaw_angle_min,
            data_columns::YAW_ANGLE_MAX => self.yaw_angle_max,
            data_columns::PITCH_ANGLE_MEAN => self.pitch_angle_mean,
            data_columns::GEN_RPM_MEAN => self.gen_rpm_mean,
            data_columns::AMBIENT_TEMP => self.ambient_temp,
            _ => None,
        }
    }

    /// Write a measurement by its output column name.
    ///
    /// Callers iterate the static output table, so unknown names are a
    /// programming error; they are ignored rather than panicking.
    pub fn set_measurement(&mut self, column: &str, value: Option<f64>) {
        match column {
            data_columns::ACTIVE_POWER_MEAN => self.active_power_mean = value,
            data_columns::ACTIVE_POWER_SD => self.active_power_sd = value,
            data_columns::WIND_SPEED_MEAN => self.wind_speed_mean = value,
            data_columns::WIND_SPEED_SD => self.wind_speed_sd = value,
            data_columns::YAW_ANGLE_MEAN => self.yaw_angle_mean = value,
            data_columns::YAW_ANGLE_MIN => self.yaw_angle_min = value,
            data_columns::YAW_ANGLE_MAX => self.yaw_angle_max = value,
            data_columns::PITCH_ANGLE_MEAN => self.pitch_angle_mean = value,
            data_columns::GEN_RPM_MEAN => self.gen_rpm_mean = value,
            data_columns::AMBIENT_TEMP => self.ambient_temp = value,
            _ => {}
        }
    }

    /// Null out every measurement, keeping identity and the shutdown sentinel.
    pub fn mask_measurements(&mut self) {
        let turbine_name = std::mem::take(&mut self.turbine_name);
        *self = Self::empty(turbine_name, self.window_start);
    }
}

/// Derived toggle state for one window of control-log data.
///
/// The two flags are evaluated independently; a window straddling a state
/// transition legitimately carries neither. Nothing downstream may assume
/// mutual exclusivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleRecord {
    #[serde(rename = "TimeStamp_StartFormat")]
    pub window_start: DateTime<Utc>,
    pub toggle_on: bool,
    pub toggle_off: bool,
}

/// One row of the raw static asset table.
///
/// The source table carries arbitrary further columns; only the identifying
/// triple survives normalization, so only it is modeled here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRow {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Normalized per-turbine metadata with the canonical window descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurbineMetadata {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "TimeZone")]
    pub time_zone: String,
    #[serde(rename = "TimeSpanMinutes")]
    pub time_span_minutes: u32,
    /// Window labeling convention; always "Start".
    #[serde(rename = "TimeFormat")]
    pub time_format: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_record_has_shutdown_sentinel() {
        let ts = Utc.with_ymd_and_hms(2020, 2, 17, 16, 30, 0).unwrap();
        let rec = AggregateRecord::empty("SMV6", ts);
        assert_eq!(rec.shutdown_duration, 0.0);
        assert!(rec.active_power_mean.is_none());
        assert!(rec.yaw_angle_max.is_none());
    }

    #[test]
    fn test_measurement_roundtrip_by_column_name() {
        let ts = Utc.with_ymd_and_hms(2020, 2, 17, 16, 30, 0).unwrap();
        let mut rec = AggregateRecord::empty("SMV6", ts);
        rec.set_measurement(data_columns::GEN_RPM_MEAN, Some(1200.0));
        assert_eq!(rec.measurement(data_columns::GEN_RPM_MEAN), Some(1200.0));
        assert_eq!(rec.gen_rpm_mean, Some(1200.0));
    }

    #[test]
    fn test_mask_measurements_preserves_identity() {
        let ts = Utc.with_ymd_and_hms(2020, 2, 17, 16, 30, 0).unwrap();
        let mut rec = AggregateRecord::empty("SMV6", ts);
        rec.active_power_mean = Some(900.0);
        rec.pitch_angle_mean = Some(1.2);
        rec.mask_measurements();
        assert_eq!(rec.turbine_name, "SMV6");
        assert_eq!(rec.window_start, ts);
        assert!(rec.active_power_mean.is_none());
        assert!(rec.pitch_angle_mean.is_none());
        assert_eq!(rec.shutdown_duration, 0.0);
    }

    #[test]
    fn test_aggregate_record_serializes_exact_column_names() {
        let ts = Utc.with_ymd_and_hms(2020, 2, 17, 16, 30, 0).unwrap();
        let rec = AggregateRecord::empty("SMV6", ts);
        let json = serde_json::to_value(&rec).unwrap();
        for col in [
            "TurbineName",
            "TimeStamp_StartFormat",
            "ActivePowerMean",
            "ActivePowerSD",
            "WindSpeedMean",
            "WindSpeedSD",
            "YawAngleMean",
            "YawAngleMin",
            "YawAngleMax",
            "PitchAngleMean",
            "GenRpmMean",
            "AmbientTemp",
            "ShutdownDuration",
        ] {
            assert!(json.get(col).is_some(), "missing column {col}");
        }
    }
}
