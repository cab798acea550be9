//! Canonical column names and the declarative signal table.
//!
//! The resampler and coverage gate never hardcode per-signal logic; they
//! iterate `AGG_TABLE` and `OUTPUT_TABLE` so adding a signal group is a
//! table edit, not new control flow.

use serde::{Deserialize, Serialize};

/// Output column names of the analysis-ready aggregate frame.
pub mod data_columns {
    pub const TURBINE_NAME: &str = "TurbineName";
    pub const ACTIVE_POWER_MEAN: &str = "ActivePowerMean";
    pub const ACTIVE_POWER_SD: &str = "ActivePowerSD";
    pub const WIND_SPEED_MEAN: &str = "WindSpeedMean";
    pub const WIND_SPEED_SD: &str = "WindSpeedSD";
    pub const YAW_ANGLE_MEAN: &str = "YawAngleMean";
    pub const YAW_ANGLE_MIN: &str = "YawAngleMin";
    pub const YAW_ANGLE_MAX: &str = "YawAngleMax";
    pub const PITCH_ANGLE_MEAN: &str = "PitchAngleMean";
    pub const GEN_RPM_MEAN: &str = "GenRpmMean";
    pub const AMBIENT_TEMP: &str = "AmbientTemp";
    pub const SHUTDOWN_DURATION: &str = "ShutdownDuration";

    /// Window-start timestamp index column.
    pub const TIMESTAMP: &str = "TimeStamp_StartFormat";
}

/// Raw SCADA field names after the turbine suffix has been split off.
pub mod raw_fields {
    pub const ACTIVE_POWER_AVG: &str = "active_power_avg";
    pub const ACTIVE_POWER_STD: &str = "active_power_std";
    pub const ACTIVE_POWER_COUNT: &str = "active_power_count";
    pub const WIND_SPEED_AVG: &str = "wind_speed_avg";
    pub const WIND_SPEED_STD: &str = "wind_speed_std";
    pub const WIND_SPEED_COUNT: &str = "wind_speed_count";
    pub const PITCH_ANGLE_AVG: &str = "blade_1_pitch_angle_avg";
    pub const PITCH_ANGLE_COUNT: &str = "blade_1_pitch_angle_count";
    pub const GEN_SPEED_AVG: &str = "generator_speed_avg";
    pub const GEN_SPEED_COUNT: &str = "generator_speed_count";
    pub const TEMPERATURE_AVG: &str = "temperature_avg";
    pub const TEMPERATURE_COUNT: &str = "temperature_count";
    pub const NACELLE_POSITION_AVG: &str = "nacelle_position_avg";
    pub const NACELLE_POSITION_MIN: &str = "nacelle_position_min";
    pub const NACELLE_POSITION_MAX: &str = "nacelle_position_max";
    pub const NACELLE_POSITION_COUNT: &str = "nacelle_position_count";

    /// Control-log offset-active signal (fractional 0..=1 per native sample).
    pub const OFFSET_ACTIVE_AVG: &str = "control_log_offset_active_avg";
    pub const OFFSET_ACTIVE_COUNT: &str = "control_log_offset_active_count";
}

/// Signal groups gated independently by the coverage gate.
///
/// Sensor outages are per-signal, so one group failing its coverage floor
/// must never mask another group's aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalGroup {
    Power,
    WindSpeed,
    Pitch,
    GenRpm,
    Temperature,
    Yaw,
}

impl SignalGroup {
    pub const ALL: [Self; 6] = [
        Self::Power,
        Self::WindSpeed,
        Self::Pitch,
        Self::GenRpm,
        Self::Temperature,
        Self::Yaw,
    ];

    /// Raw field carrying the native sample count backing this group.
    #[must_use]
    pub const fn count_field(self) -> &'static str {
        match self {
            Self::Power => raw_fields::ACTIVE_POWER_COUNT,
            Self::WindSpeed => raw_fields::WIND_SPEED_COUNT,
            Self::Pitch => raw_fields::PITCH_ANGLE_COUNT,
            Self::GenRpm => raw_fields::GEN_SPEED_COUNT,
            Self::Temperature => raw_fields::TEMPERATURE_COUNT,
            Self::Yaw => raw_fields::NACELLE_POSITION_COUNT,
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::WindSpeed => "windspeed",
            Self::Pitch => "pitch",
            Self::GenRpm => "rpm",
            Self::Temperature => "temperature",
            Self::Yaw => "yaw",
        }
    }
}

/// How a raw field is folded over one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggRule {
    /// Arithmetic mean of the non-null samples.
    Mean,
    /// Circular mean in degrees on [0, 360).
    CircularMean,
    Min,
    Max,
    /// Sum of non-null samples; empty windows sum to 0.0 (used for counts).
    Sum,
}

/// One raw field the resampler must aggregate.
#[derive(Debug, Clone, Copy)]
pub struct AggSpec {
    pub field: &'static str,
    pub rule: AggRule,
}

/// Every raw field the resampler folds per (turbine, window).
///
/// Pitch angles stay on an arithmetic mean: blade pitch lives in a narrow
/// band nowhere near the wrap-around, unlike nacelle position.
pub const AGG_TABLE: &[AggSpec] = &[
    AggSpec { field: raw_fields::ACTIVE_POWER_AVG, rule: AggRule::Mean },
    AggSpec { field: raw_fields::ACTIVE_POWER_STD, rule: AggRule::Mean },
    AggSpec { field: raw_fields::ACTIVE_POWER_COUNT, rule: AggRule::Sum },
    AggSpec { field: raw_fields::WIND_SPEED_AVG, rule: AggRule::Mean },
    AggSpec { field: raw_fields::WIND_SPEED_STD, rule: AggRule::Mean },
    AggSpec { field: raw_fields::WIND_SPEED_COUNT, rule: AggRule::Sum },
    AggSpec { field: raw_fields::PITCH_ANGLE_AVG, rule: AggRule::Mean },
    AggSpec { field: raw_fields::PITCH_ANGLE_COUNT, rule: AggRule::Sum },
    AggSpec { field: raw_fields::GEN_SPEED_AVG, rule: AggRule::Mean },
    AggSpec { field: raw_fields::GEN_SPEED_COUNT, rule: AggRule::Sum },
    AggSpec { field: raw_fields::TEMPERATURE_AVG, rule: AggRule::Mean },
    AggSpec { field: raw_fields::TEMPERATURE_COUNT, rule: AggRule::Sum },
    AggSpec { field: raw_fields::NACELLE_POSITION_AVG, rule: AggRule::CircularMean },
    AggSpec { field: raw_fields::NACELLE_POSITION_MIN, rule: AggRule::Min },
    AggSpec { field: raw_fields::NACELLE_POSITION_MAX, rule: AggRule::Max },
    AggSpec { field: raw_fields::NACELLE_POSITION_COUNT, rule: AggRule::Sum },
];

/// Mapping from an output column to its aggregated source field and the
/// signal group whose coverage gates it.
#[derive(Debug, Clone, Copy)]
pub struct OutputSpec {
    pub output: &'static str,
    pub source: &'static str,
    pub group: SignalGroup,
}

pub const OUTPUT_TABLE: &[OutputSpec] = &[
    OutputSpec {
        output: data_columns::ACTIVE_POWER_MEAN,
        source: raw_fields::ACTIVE_POWER_AVG,
        group: SignalGroup::Power,
    },
    OutputSpec {
        output: data_columns::ACTIVE_POWER_SD,
        source: raw_fields::ACTIVE_POWER_STD,
        group: SignalGroup::Power,
    },
    OutputSpec {
        output: data_columns::WIND_SPEED_MEAN,
        source: raw_fields::WIND_SPEED_AVG,
        group: SignalGroup::WindSpeed,
    },
    OutputSpec {
        output: data_columns::WIND_SPEED_SD,
        source: raw_fields::WIND_SPEED_STD,
        group: SignalGroup::WindSpeed,
    },
    OutputSpec {
        output: data_columns::YAW_ANGLE_MEAN,
        source: raw_fields::NACELLE_POSITION_AVG,
        group: SignalGroup::Yaw,
    },
    OutputSpec {
        output: data_columns::YAW_ANGLE_MIN,
        source: raw_fields::NACELLE_POSITION_MIN,
        group: SignalGroup::Yaw,
    },
    OutputSpec {
        output: data_columns::YAW_ANGLE_MAX,
        source: raw_fields::NACELLE_POSITION_MAX,
        group: SignalGroup::Yaw,
    },
    OutputSpec {
        output: data_columns::PITCH_ANGLE_MEAN,
        source: raw_fields::PITCH_ANGLE_AVG,
        group: SignalGroup::Pitch,
    },
    OutputSpec {
        output: data_columns::GEN_RPM_MEAN,
        source: raw_fields::GEN_SPEED_AVG,
        group: SignalGroup::GenRpm,
    },
    OutputSpec {
        output: data_columns::AMBIENT_TEMP,
        source: raw_fields::TEMPERATURE_AVG,
        group: SignalGroup::Temperature,
    },
];
