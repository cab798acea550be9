//! Data Quality Gating
//!
//! The coverage gate masks any aggregate whose backing native sample count
//! falls below the configured fraction of a full window. Masking is a soft
//! failure: the value becomes null and stays visible downstream as
//! "unknown"; only aggregate percentages are logged. Each signal group is
//! gated independently because sensor outages are per-signal.
//!
//! `envelope` holds the operational-envelope outlier filter applied after
//! gating.

pub mod envelope;

use std::collections::BTreeMap;

use tracing::info;

use crate::config::PrepConfig;
use crate::resample::ResampledWindow;
use crate::types::{AggregateRecord, SignalGroup, OUTPUT_TABLE};

/// Apply the coverage gate, producing the analysis-ready aggregate records.
///
/// A group passes a window when its summed native count reaches
/// `cfg.coverage_floor()`. Values of failing groups are nulled; the row
/// itself always survives (gap-free grid invariant). `ShutdownDuration`
/// is the fixed 0.0 sentinel assigned in [`AggregateRecord::empty`].
#[must_use]
pub fn apply_coverage_gate(
    windows: &[ResampledWindow],
    cfg: &PrepConfig,
) -> Vec<AggregateRecord> {
    let floor = cfg.coverage_floor();
    let mut masked_per_group: BTreeMap<&'static str, usize> = BTreeMap::new();

    let mut records = Vec::with_capacity(windows.len());
    for window in windows {
        let mut record = AggregateRecord::empty(&window.turbine_name, window.window_start);
        for group in SignalGroup::ALL {
            let count = window.value(group.count_field()).unwrap_or(0.0);
            let covered = count >= floor;
            if !covered {
                *masked_per_group.entry(group.label()).or_default() += 1;
            }
            for spec in OUTPUT_TABLE.iter().filter(|spec| spec.group == group) {
                let value = if covered { window.value(spec.source) } else { None };
                record.set_measurement(spec.output, value);
            }
        }
        records.push(record);
    }

    if !records.is_empty() {
        let total = records.len();
        for (group, masked) in &masked_per_group {
            #[allow(clippy::cast_precision_loss)]
            let pct = 100.0 * *masked as f64 / total as f64;
            info!(
                group,
                masked,
                total,
                "coverage gate masked {pct:.1}% of windows"
            );
        }
    }
    records
}

/// Per-turbine fraction of windows with a usable value, per signal.
///
/// Mirrors the coverage heatmap computation of the upstream analysis, minus
/// the plot: fractions are published through structured logging instead.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageSummary {
    pub turbine_name: String,
    pub power: f64,
    pub wind_speed: f64,
    pub yaw: f64,
    pub rpm: f64,
    pub pitch: f64,
}

/// Compute per-turbine coverage fractions over gated records.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn coverage_by_turbine(records: &[AggregateRecord]) -> Vec<CoverageSummary> {
    #[derive(Default)]
    struct Tally {
        rows: usize,
        power: usize,
        wind_speed: usize,
        yaw: usize,
        rpm: usize,
        pitch: usize,
    }

    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();
    for record in records {
        let tally = tallies.entry(record.turbine_name.as_str()).or_default();
        tally.rows += 1;
        tally.power += usize::from(record.active_power_mean.is_some());
        tally.wind_speed += usize::from(record.wind_speed_mean.is_some());
        tally.yaw += usize::from(record.yaw_angle_mean.is_some());
        tally.rpm += usize::from(record.gen_rpm_mean.is_some());
        tally.pitch += usize::from(record.pitch_angle_mean.is_some());
    }

    tallies
        .into_iter()
        .map(|(turbine_name, t)| {
            let rows = t.rows.max(1) as f64;
            CoverageSummary {
                turbine_name: turbine_name.to_string(),
                power: t.power as f64 / rows,
                wind_speed: t.wind_speed as f64 / rows,
                yaw: t.yaw as f64 / rows,
                rpm: t.rpm as f64 / rows,
                pitch: t.pitch as f64 / rows,
            }
        })
        .collect()
}

/// Log per-turbine coverage fractions at info level.
pub fn log_coverage(records: &[AggregateRecord]) {
    for summary in coverage_by_turbine(records) {
        info!(
            turbine = %summary.turbine_name,
            power = format_args!("{:.2}", summary.power),
            windspeed = format_args!("{:.2}", summary.wind_speed),
            yaw = format_args!("{:.2}", summary.yaw),
            rpm = format_args!("{:.2}", summary.rpm),
            pitch = format_args!("{:.2}", summary.pitch),
            "data coverage"
        );
    }
}
