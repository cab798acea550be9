//! Resampler — native-resolution telemetry to fixed-window aggregates
//!
//! Takes a timestamp-indexed raw frame whose column names carry turbine
//! suffixes, splits the columns per turbine, and folds each signal onto a
//! fixed window grid: arithmetic mean for linear quantities, circular mean
//! for nacelle position, min/max for yaw bounds, sums for the native sample
//! counts the coverage gate needs.
//!
//! Windows are labeled by their **start** timestamp, and the output grid is
//! gap-free: a window with no rows still yields a record (all values null)
//! for every turbine.

mod columns;

pub use columns::{split_turbine_suffix, ParsedColumn};

use chrono::{DateTime, Duration, Utc};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::PrepConfig;
use crate::types::{AggRule, RawFrame, AGG_TABLE};

/// Resampling errors. Both variants are fatal: a column name that does not
/// decompose is never guessed at or silently dropped.
#[derive(Debug, Error)]
pub enum ResampleError {
    #[error("cannot split turbine suffix from raw column name '{0}' under the fixed naming convention")]
    ColumnParse(String),

    #[error("raw telemetry frame contains no rows")]
    EmptyInput,
}

/// Aggregates of one (turbine, window) before coverage gating.
///
/// `values` is keyed by canonical raw field name; a missing entry means the
/// input frame carried no column for that field.
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledWindow {
    pub turbine_name: String,
    /// Start timestamp of the window.
    pub window_start: DateTime<Utc>,
    pub values: BTreeMap<&'static str, Option<f64>>,
}

impl ResampledWindow {
    /// Aggregated value of one raw field, null-flattened.
    #[must_use]
    pub fn value(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied().flatten()
    }
}

/// Circular mean of angles in degrees, on [0, 360).
///
/// Respects wrap-around: the mean of {350, 10} is 0, not 180.
#[must_use]
pub fn circular_mean_deg(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let (sin_sum, cos_sum) = values.iter().fold((0.0_f64, 0.0_f64), |(s, c), v| {
        let r = v.to_radians();
        (s + r.sin(), c + r.cos())
    });
    let deg = sin_sum.atan2(cos_sum).to_degrees().rem_euclid(360.0);
    // rem_euclid of a tiny negative angle can round up to exactly 360.0
    Some(if deg >= 360.0 { 0.0 } else { deg })
}

/// Floor a timestamp onto the window grid.
pub(crate) fn floor_to_window(ts: DateTime<Utc>, window_secs: u32) -> DateTime<Utc> {
    let secs = ts.timestamp();
    let floored = secs - secs.rem_euclid(i64::from(window_secs));
    DateTime::<Utc>::from_timestamp(floored, 0).unwrap_or(ts)
}

/// Inclusive gap-free grid of window starts spanning `[first, last]`.
pub(crate) fn window_grid(
    first: DateTime<Utc>,
    last: DateTime<Utc>,
    window_secs: u32,
) -> Vec<DateTime<Utc>> {
    let mut grid = Vec::new();
    let mut window = floor_to_window(first, window_secs);
    let end = floor_to_window(last, window_secs);
    let step = Duration::seconds(i64::from(window_secs));
    while window <= end {
        grid.push(window);
        window += step;
    }
    grid
}

/// Row indices grouped by containing window start.
pub(crate) fn bucket_rows(
    index: &[DateTime<Utc>],
    window_secs: u32,
) -> BTreeMap<DateTime<Utc>, Vec<usize>> {
    let mut buckets: BTreeMap<DateTime<Utc>, Vec<usize>> = BTreeMap::new();
    for (row, ts) in index.iter().enumerate() {
        buckets
            .entry(floor_to_window(*ts, window_secs))
            .or_default()
            .push(row);
    }
    buckets
}

/// Fold one window's samples under an aggregation rule.
///
/// Sums of empty windows are 0.0 (a window with no rows backs zero native
/// samples); every other rule yields null on empty input.
pub(crate) fn fold(values: &[f64], rule: AggRule) -> Option<f64> {
    match rule {
        AggRule::Sum => Some(values.iter().sum()),
        _ if values.is_empty() => None,
        AggRule::Mean => Some(values.iter().mean()),
        AggRule::CircularMean => circular_mean_deg(values),
        AggRule::Min => Some(values.iter().copied().fold(f64::INFINITY, f64::min)),
        AggRule::Max => Some(values.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
    }
}

/// Resample a raw frame using the fixed column-name convention.
pub fn resample(raw: &RawFrame, cfg: &PrepConfig) -> Result<Vec<ResampledWindow>, ResampleError> {
    resample_with(raw, cfg, split_turbine_suffix)
}

/// Resample a raw frame with an injected column-name parsing strategy.
///
/// Output is ordered by turbine name, then window start, and covers the full
/// window grid for every turbine. Errors on an unparseable column name or an
/// empty frame.
pub fn resample_with<F>(
    raw: &RawFrame,
    cfg: &PrepConfig,
    parse_column: F,
) -> Result<Vec<ResampledWindow>, ResampleError>
where
    F: Fn(&str) -> Option<ParsedColumn>,
{
    if raw.is_empty() {
        return Err(ResampleError::EmptyInput);
    }

    // turbine suffix -> canonical field -> source column name
    let mut per_turbine: BTreeMap<String, BTreeMap<&'static str, String>> = BTreeMap::new();
    for name in raw.column_names() {
        let parsed =
            parse_column(name).ok_or_else(|| ResampleError::ColumnParse(name.to_string()))?;
        match AGG_TABLE.iter().find(|spec| spec.field == parsed.field) {
            Some(spec) => {
                per_turbine
                    .entry(parsed.turbine_suffix)
                    .or_default()
                    .insert(spec.field, name.to_string());
            }
            None => {
                debug!(column = name, field = %parsed.field, "raw field not in signal table, skipping");
            }
        }
    }

    let index = raw.index();
    let window_secs = cfg.windowing.window_secs;
    let (first, last) = match (index.iter().min(), index.iter().max()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(ResampleError::EmptyInput),
    };
    let grid = window_grid(first, last, window_secs);
    let buckets = bucket_rows(index, window_secs);
    let no_rows: Vec<usize> = Vec::new();

    let mut out = Vec::with_capacity(grid.len() * per_turbine.len());
    for (suffix, fields) in &per_turbine {
        let turbine_name = format!("{}{}", cfg.site.turbine_prefix, suffix);
        for window_start in &grid {
            let rows = buckets.get(window_start).unwrap_or(&no_rows);
            let mut values = BTreeMap::new();
            for spec in AGG_TABLE {
                let Some(column_name) = fields.get(spec.field) else {
                    continue;
                };
                let Some(column) = raw.column(column_name) else {
                    continue;
                };
                let samples: Vec<f64> = rows.iter().filter_map(|&row| column[row]).collect();
                values.insert(spec.field, fold(&samples, spec.rule));
            }
            out.push(ResampledWindow {
                turbine_name: turbine_name.clone(),
                window_start: *window_start,
                values,
            });
        }
    }

    info!(
        turbines = per_turbine.len(),
        windows = grid.len(),
        rows = index.len(),
        "resampled raw frame onto window grid"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::raw_fields;
    use chrono::TimeZone;

    fn ts(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 2, 17, hour, minute, 0).unwrap()
    }

    /// Angular distance in degrees, for float-tolerant assertions.
    fn ang_dist(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn test_circular_mean_wraps_at_north() {
        let mean = circular_mean_deg(&[350.0, 10.0]).unwrap();
        assert!(ang_dist(mean, 0.0) < 1e-9, "got {mean}");
    }

    #[test]
    fn test_circular_mean_plain_angles() {
        let mean = circular_mean_deg(&[10.0, 20.0]).unwrap();
        assert!(ang_dist(mean, 15.0) < 1e-9, "got {mean}");
    }

    #[test]
    fn test_circular_mean_empty_is_none() {
        assert!(circular_mean_deg(&[]).is_none());
    }

    #[test]
    fn test_fold_sum_of_empty_is_zero() {
        assert_eq!(fold(&[], AggRule::Sum), Some(0.0));
        assert_eq!(fold(&[], AggRule::Mean), None);
        assert_eq!(fold(&[], AggRule::Min), None);
    }

    #[test]
    fn test_floor_to_window_start_label() {
        let floored = floor_to_window(ts(16, 37), 600);
        assert_eq!(floored, ts(16, 30));
        // already aligned timestamps stay put
        assert_eq!(floor_to_window(ts(16, 30), 600), ts(16, 30));
    }

    #[test]
    fn test_window_grid_has_no_gaps() {
        let grid = window_grid(ts(16, 5), ts(16, 45), 600);
        assert_eq!(
            grid,
            vec![ts(16, 0), ts(16, 10), ts(16, 20), ts(16, 30), ts(16, 40)]
        );
    }

    fn one_turbine_frame() -> RawFrame {
        // two 10-minute windows of 1-minute rows for turbine suffix "6"
        // under a qualifier-free naming scheme: field_T6
        let index: Vec<_> = (0..20).map(|m| ts(16, m)).collect();
        let power: Vec<_> = (0..20).map(|m| Some(f64::from(m) * 10.0)).collect();
        let counts: Vec<_> = (0..20).map(|_| Some(60.0)).collect();
        RawFrame::new(index)
            .and_then_column("active_power_avg_T6", power)
            .and_then_column("active_power_count_T6", counts)
    }

    // small helper so test frames read linearly
    trait FrameExt {
        fn and_then_column(self, name: &str, values: Vec<Option<f64>>) -> RawFrame;
    }
    impl FrameExt for RawFrame {
        fn and_then_column(self, name: &str, values: Vec<Option<f64>>) -> RawFrame {
            self.with_column(name, values).unwrap()
        }
    }

    #[test]
    fn test_resample_two_windows() {
        let cfg = PrepConfig::default();
        let windows = resample(&one_turbine_frame(), &cfg).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].turbine_name, "SMVT6");
        assert_eq!(windows[0].window_start, ts(16, 0));
        // mean of 0,10,...,90 = 45
        assert_eq!(windows[0].value(raw_fields::ACTIVE_POWER_AVG), Some(45.0));
        assert_eq!(windows[0].value(raw_fields::ACTIVE_POWER_COUNT), Some(600.0));
        // mean of 100..=190 step 10 = 145
        assert_eq!(windows[1].window_start, ts(16, 10));
        assert_eq!(windows[1].value(raw_fields::ACTIVE_POWER_AVG), Some(145.0));
    }

    #[test]
    fn test_resample_fills_empty_windows() {
        // rows only in the first and last window; the middle must still appear
        let index = vec![ts(16, 1), ts(16, 25)];
        let frame = RawFrame::new(index)
            .and_then_column("wind_speed_avg_T6", vec![Some(5.0), Some(7.0)]);
        let cfg = PrepConfig::default();
        let windows = resample(&frame, &cfg).unwrap();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[1].window_start, ts(16, 10));
        assert!(windows[1].value(raw_fields::WIND_SPEED_AVG).is_none());
        // no count column at all: sums absent, not zero
        assert!(windows[1].values.get(raw_fields::WIND_SPEED_COUNT).is_none());
    }

    #[test]
    fn test_resample_nacelle_position_uses_circular_mean() {
        let index = vec![ts(16, 0), ts(16, 1)];
        let frame = RawFrame::new(index)
            .and_then_column("nacelle_position_avg_T6", vec![Some(350.0), Some(10.0)]);
        let cfg = PrepConfig::default();
        let windows = resample(&frame, &cfg).unwrap();
        let mean = windows[0].value(raw_fields::NACELLE_POSITION_AVG).unwrap();
        assert!(ang_dist(mean, 0.0) < 1e-9, "got {mean}");
    }

    #[test]
    fn test_resample_yaw_bounds_use_min_max() {
        let index = vec![ts(16, 0), ts(16, 1), ts(16, 2)];
        let frame = RawFrame::new(index)
            .and_then_column(
                "nacelle_position_min_T6",
                vec![Some(181.0), Some(179.5), None],
            )
            .and_then_column(
                "nacelle_position_max_T6",
                vec![Some(183.0), Some(190.0), Some(185.0)],
            );
        let cfg = PrepConfig::default();
        let windows = resample(&frame, &cfg).unwrap();
        assert_eq!(windows[0].value(raw_fields::NACELLE_POSITION_MIN), Some(179.5));
        assert_eq!(windows[0].value(raw_fields::NACELLE_POSITION_MAX), Some(190.0));
    }

    #[test]
    fn test_resample_unparseable_column_is_fatal() {
        let frame = RawFrame::new(vec![ts(16, 0)])
            .and_then_column("power", vec![Some(1.0)]);
        let cfg = PrepConfig::default();
        let err = resample(&frame, &cfg).unwrap_err();
        assert!(matches!(err, ResampleError::ColumnParse(name) if name == "power"));
    }

    #[test]
    fn test_resample_empty_frame_is_fatal() {
        let cfg = PrepConfig::default();
        let err = resample(&RawFrame::new(Vec::new()), &cfg).unwrap_err();
        assert!(matches!(err, ResampleError::EmptyInput));
    }

    #[test]
    fn test_resample_skips_unknown_fields() {
        let frame = RawFrame::new(vec![ts(16, 0)])
            .and_then_column("rotor_flux_avg_T6", vec![Some(1.0)])
            .and_then_column("active_power_avg_T6", vec![Some(100.0)]);
        let cfg = PrepConfig::default();
        let windows = resample(&frame, &cfg).unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].value(raw_fields::ACTIVE_POWER_AVG), Some(100.0));
        assert!(windows[0].values.get("rotor_flux_avg").is_none());
    }

    #[test]
    fn test_resample_custom_parser_strategy() {
        // alternate scheme: turbine prefix "T7:" before the field
        let frame = RawFrame::new(vec![ts(16, 0)])
            .and_then_column("T7:active_power_avg", vec![Some(50.0)]);
        let cfg = PrepConfig::default();
        let windows = resample_with(&frame, &cfg, |name| {
            let (suffix, field) = name.split_once(':')?;
            Some(ParsedColumn {
                turbine_suffix: suffix.to_string(),
                field: field.to_string(),
            })
        })
        .unwrap();
        assert_eq!(windows[0].turbine_name, "SMVT7");
        assert_eq!(windows[0].value(raw_fields::ACTIVE_POWER_AVG), Some(50.0));
    }
}
