//! Toggle-State Detector
//!
//! The control log reports the wake-steering offset as a fractional
//! "offset active" signal: an average over each native statistic interval
//! plus the count of native samples behind it. Per window, `toggle_on`
//! requires the windowed average to reach the activation threshold and
//! `toggle_off` requires it to fall to one minus that threshold, each under
//! the same coverage floor as the aggregate gate.
//!
//! The two flags are evaluated independently. A window straddling a state
//! transition averages somewhere in between and correctly carries neither
//! flag; that indeterminate state is intentional and must survive
//! downstream. Source timestamps already label window starts in UTC and are
//! taken as-is.

use thiserror::Error;
use tracing::info;

use crate::config::PrepConfig;
use crate::resample::{bucket_rows, fold, window_grid};
use crate::types::{raw_fields, AggRule, RawFrame, ToggleRecord};

/// Control-log detection errors; all fatal.
#[derive(Debug, Error)]
pub enum ToggleError {
    #[error("control log frame is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("control log frame contains no rows")]
    EmptyInput,
}

/// Derive per-window toggle states from a raw control-log frame.
///
/// The frame must carry the offset-active average/count column pair. Output
/// covers the full window grid; windows with no data carry neither flag.
pub fn detect_toggle_states(
    control: &RawFrame,
    cfg: &PrepConfig,
) -> Result<Vec<ToggleRecord>, ToggleError> {
    if control.is_empty() {
        return Err(ToggleError::EmptyInput);
    }
    let avg_col = control
        .column(raw_fields::OFFSET_ACTIVE_AVG)
        .ok_or(ToggleError::MissingColumn(raw_fields::OFFSET_ACTIVE_AVG))?;
    let count_col = control
        .column(raw_fields::OFFSET_ACTIVE_COUNT)
        .ok_or(ToggleError::MissingColumn(raw_fields::OFFSET_ACTIVE_COUNT))?;

    let index = control.index();
    let window_secs = cfg.windowing.window_secs;
    let (first, last) = match (index.iter().min(), index.iter().max()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(ToggleError::EmptyInput),
    };
    let buckets = bucket_rows(index, window_secs);
    let no_rows: Vec<usize> = Vec::new();

    let on_threshold = cfg.toggle.activation_threshold;
    let off_threshold = 1.0 - on_threshold;
    let floor = cfg.coverage_floor();

    let mut records = Vec::new();
    let mut on_windows = 0_usize;
    let mut off_windows = 0_usize;
    for window_start in window_grid(first, last, window_secs) {
        let rows = buckets.get(&window_start).unwrap_or(&no_rows);
        let avgs: Vec<f64> = rows.iter().filter_map(|&row| avg_col[row]).collect();
        let counts: Vec<f64> = rows.iter().filter_map(|&row| count_col[row]).collect();

        let avg = fold(&avgs, AggRule::Mean);
        let count = fold(&counts, AggRule::Sum).unwrap_or(0.0);
        let covered = count >= floor;

        let toggle_on = covered && avg.is_some_and(|a| a >= on_threshold);
        let toggle_off = covered && avg.is_some_and(|a| a <= off_threshold);
        on_windows += usize::from(toggle_on);
        off_windows += usize::from(toggle_off);
        records.push(ToggleRecord {
            window_start,
            toggle_on,
            toggle_off,
        });
    }

    info!(
        windows = records.len(),
        on_windows,
        off_windows,
        "derived toggle states from control log"
    );
    Ok(records)
}
