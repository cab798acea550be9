//! Windgate: SCADA Preprocessing for Energy-Uplift Analysis
//!
//! Converts raw high-frequency turbine telemetry and control-system logs
//! into quality-gated, window-aligned aggregate records for a downstream
//! uplift estimator.
//!
//! ## Pipeline
//!
//! - **Resampler**: native-resolution signals → fixed-window aggregates
//!   (circular mean for directional quantities, sample-count tracking)
//! - **Coverage Gate**: per-signal-group masking below the coverage floor
//! - **Toggle-State Detector**: control-log offset signal → per-window
//!   {toggle_on, toggle_off}
//! - **Envelope Filter**: rotor-speed/pitch outlier rejection against
//!   externally fitted reference curves
//! - **Metadata Normalizer**: static asset table → per-turbine metadata

pub mod cache;
pub mod config;
pub mod metadata;
pub mod pipeline;
pub mod quality;
pub mod resample;
pub mod toggle;
pub mod types;

// Re-export configuration
pub use config::PrepConfig;

// Re-export commonly used types
pub use types::{
    AggregateRecord, AssetRow, RawFrame, SignalGroup, ToggleRecord, TurbineMetadata,
};

// Re-export pipeline operations
pub use pipeline::{
    build_aggregate_frame, build_filtered_frame, build_toggle_frame, build_turbine_metadata,
    PipelineError,
};

// Re-export quality gating and envelope filtering
pub use quality::envelope::{EnvelopeBin, EnvelopeCurve, EnvelopeSet};
pub use quality::{apply_coverage_gate, coverage_by_turbine, CoverageSummary};

// Re-export the artifact cache
pub use cache::{ArtifactCache, CacheError};
