//! Turbine Metadata Normalizer
//!
//! The static asset table mixes turbines with masts, lidars, and other site
//! hardware. Normalization keeps rows whose name carries the site's turbine
//! prefix, retains the identifying coordinates, and attaches the canonical
//! window descriptor (time zone, window width in minutes, start-format
//! labeling).

use thiserror::Error;
use tracing::info;

use crate::config::PrepConfig;
use crate::types::{AssetRow, TurbineMetadata};

/// Window labeling convention published in metadata; windows are labeled by
/// their start timestamp throughout the pipeline.
pub const TIME_FORMAT_START: &str = "Start";

/// Metadata normalization errors; all fatal misconfiguration signals.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("static asset table contains no rows")]
    EmptyInput,

    #[error("no asset rows match turbine prefix '{prefix}'")]
    NoMatchingTurbines { prefix: String },
}

/// Reduce the static asset table to normalized turbine metadata.
///
/// A zero-row result means the prefix does not match the site's naming and
/// the run must stop rather than continue with no turbines.
pub fn normalize_metadata(
    assets: &[AssetRow],
    cfg: &PrepConfig,
) -> Result<Vec<TurbineMetadata>, MetadataError> {
    if assets.is_empty() {
        return Err(MetadataError::EmptyInput);
    }

    let prefix = cfg.site.turbine_prefix.as_str();
    let turbines: Vec<TurbineMetadata> = assets
        .iter()
        .filter(|row| row.name.starts_with(prefix))
        .map(|row| TurbineMetadata {
            name: row.name.clone(),
            latitude: row.latitude,
            longitude: row.longitude,
            time_zone: cfg.site.time_zone.clone(),
            time_span_minutes: cfg.window_minutes(),
            time_format: TIME_FORMAT_START.to_string(),
        })
        .collect();

    if turbines.is_empty() {
        return Err(MetadataError::NoMatchingTurbines {
            prefix: prefix.to_string(),
        });
    }

    info!(
        turbines = turbines.len(),
        assets = assets.len(),
        prefix,
        "normalized turbine metadata"
    );
    Ok(turbines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str, lat: f64, lon: f64) -> AssetRow {
        AssetRow {
            name: name.to_string(),
            latitude: lat,
            longitude: lon,
        }
    }

    fn site_assets() -> Vec<AssetRow> {
        vec![
            asset("SMV1", 49.92, 2.74),
            asset("SMV2", 49.93, 2.75),
            asset("Met Mast A", 49.94, 2.76),
            asset("Lidar North", 49.95, 2.77),
        ]
    }

    #[test]
    fn test_prefix_filter_keeps_only_turbines() {
        let cfg = PrepConfig::default();
        let metadata = normalize_metadata(&site_assets(), &cfg).unwrap();
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata[0].name, "SMV1");
        assert_eq!(metadata[0].latitude, 49.92);
        assert_eq!(metadata[1].name, "SMV2");
    }

    #[test]
    fn test_canonical_window_descriptor_attached() {
        let cfg = PrepConfig::default();
        let metadata = normalize_metadata(&site_assets(), &cfg).unwrap();
        assert_eq!(metadata[0].time_zone, "UTC");
        assert_eq!(metadata[0].time_span_minutes, 10);
        assert_eq!(metadata[0].time_format, "Start");
    }

    #[test]
    fn test_zero_matches_is_fatal() {
        let mut cfg = PrepConfig::default();
        cfg.site.turbine_prefix = "WTG".to_string();
        let err = normalize_metadata(&site_assets(), &cfg).unwrap_err();
        assert!(
            matches!(err, MetadataError::NoMatchingTurbines { prefix } if prefix == "WTG")
        );
    }

    #[test]
    fn test_empty_table_is_fatal() {
        let cfg = PrepConfig::default();
        let err = normalize_metadata(&[], &cfg).unwrap_err();
        assert!(matches!(err, MetadataError::EmptyInput));
    }
}
