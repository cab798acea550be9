//! Pipeline orchestration
//!
//! Thin composition layer over the pure transforms: raw SCADA frame →
//! resample → coverage gate (→ optional envelope filter), control-log frame
//! → toggle states, static asset table → turbine metadata. Every operation
//! is a deterministic in-memory transform; callers wanting memoization wrap
//! these calls with [`ArtifactCache::compute_or_fetch`](crate::cache::ArtifactCache::compute_or_fetch).

use thiserror::Error;

use crate::config::PrepConfig;
use crate::metadata::{normalize_metadata, MetadataError};
use crate::quality::envelope::{apply_envelope_filter, EnvelopeSet};
use crate::quality::{apply_coverage_gate, log_coverage};
use crate::resample::{resample_with, ParsedColumn, ResampleError};
use crate::toggle::{detect_toggle_states, ToggleError};
use crate::types::{AggregateRecord, AssetRow, RawFrame, ToggleRecord, TurbineMetadata};

/// Errors surfaced by pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Resample(#[from] ResampleError),

    #[error(transparent)]
    Toggle(#[from] ToggleError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Raw SCADA frame to quality-gated aggregate records, using the fixed
/// column-name convention.
pub fn build_aggregate_frame(
    raw: &RawFrame,
    cfg: &PrepConfig,
) -> Result<Vec<AggregateRecord>, PipelineError> {
    build_aggregate_frame_with(raw, cfg, crate::resample::split_turbine_suffix)
}

/// Raw SCADA frame to quality-gated aggregate records with an injected
/// column-name parsing strategy.
pub fn build_aggregate_frame_with<F>(
    raw: &RawFrame,
    cfg: &PrepConfig,
    parse_column: F,
) -> Result<Vec<AggregateRecord>, PipelineError>
where
    F: Fn(&str) -> Option<ParsedColumn>,
{
    let windows = resample_with(raw, cfg, parse_column)?;
    let records = apply_coverage_gate(&windows, cfg);
    log_coverage(&records);
    Ok(records)
}

/// Full preprocessing: aggregate frame plus envelope filtering against the
/// site's reference curves.
pub fn build_filtered_frame(
    raw: &RawFrame,
    cfg: &PrepConfig,
    envelopes: &EnvelopeSet,
) -> Result<Vec<AggregateRecord>, PipelineError> {
    let mut records = build_aggregate_frame(raw, cfg)?;
    apply_envelope_filter(&mut records, envelopes);
    Ok(records)
}

/// Control-log frame to per-window toggle states.
pub fn build_toggle_frame(
    control: &RawFrame,
    cfg: &PrepConfig,
) -> Result<Vec<ToggleRecord>, PipelineError> {
    Ok(detect_toggle_states(control, cfg)?)
}

/// Static asset table to normalized turbine metadata.
pub fn build_turbine_metadata(
    assets: &[AssetRow],
    cfg: &PrepConfig,
) -> Result<Vec<TurbineMetadata>, PipelineError> {
    Ok(normalize_metadata(assets, cfg)?)
}
