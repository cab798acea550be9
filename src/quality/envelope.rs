//! Operational Envelope Filter
//!
//! Externally fitted reference curves bound the expected operating region:
//! an ordered run of contiguous bins over an independent variable (power or
//! wind speed), each carrying an upper limit for a dependent variable (rotor
//! speed or pitch). A point strictly above its bin's limit is an anomalous
//! operating state; equality is in-envelope.
//!
//! Rotor speed and pitch are each checked against up to two curves combined
//! with OR. A single curve cannot separate genuine low-power high-speed
//! operation from a faulty measurement, which is exactly what the second
//! independent variable disambiguates.

use thiserror::Error;
use tracing::info;

use crate::types::AggregateRecord;

/// Curve construction errors. All are fatal misconfiguration: a malformed
/// curve must stop the run rather than silently pass bad data.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("envelope curve has no bins")]
    Empty,

    #[error("envelope needs {expected} bin edges for {limits} limits, got {actual}")]
    EdgeCountMismatch {
        expected: usize,
        actual: usize,
        limits: usize,
    },

    #[error("envelope bin {index} is degenerate: left {left} is not below right {right}")]
    DegenerateBin { index: usize, left: f64, right: f64 },

    #[error(
        "envelope bin {index} is not contiguous with its successor: right edge {right} vs next left edge {next_left}"
    )]
    NotContiguous {
        index: usize,
        right: f64,
        next_left: f64,
    },
}

/// One bin of an envelope curve: `[left, right)` with an upper `limit` on
/// the dependent variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeBin {
    pub left: f64,
    pub right: f64,
    pub limit: f64,
}

/// An ordered, contiguous, validated envelope curve. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeCurve {
    bins: Vec<EnvelopeBin>,
}

impl EnvelopeCurve {
    /// Validate and wrap a bin sequence.
    ///
    /// Bins must be non-empty, each strictly ordered (`left < right`), and
    /// exactly contiguous (each right edge equals the next left edge). The
    /// edges come from shared bin-edge arrays of the fitting step, so exact
    /// float equality is the correct check.
    pub fn new(bins: Vec<EnvelopeBin>) -> Result<Self, EnvelopeError> {
        if bins.is_empty() {
            return Err(EnvelopeError::Empty);
        }
        for (index, bin) in bins.iter().enumerate() {
            if !(bin.left < bin.right) {
                return Err(EnvelopeError::DegenerateBin {
                    index,
                    left: bin.left,
                    right: bin.right,
                });
            }
        }
        for (index, pair) in bins.windows(2).enumerate() {
            if pair[0].right != pair[1].left {
                return Err(EnvelopeError::NotContiguous {
                    index,
                    right: pair[0].right,
                    next_left: pair[1].left,
                });
            }
        }
        Ok(Self { bins })
    }

    /// Build a curve from shared bin edges and per-bin limits.
    /// `edges` must have `limits.len() + 1` entries.
    pub fn from_edges(edges: &[f64], limits: &[f64]) -> Result<Self, EnvelopeError> {
        if edges.len() != limits.len() + 1 {
            return Err(EnvelopeError::EdgeCountMismatch {
                expected: limits.len() + 1,
                actual: edges.len(),
                limits: limits.len(),
            });
        }
        let bins = edges
            .windows(2)
            .zip(limits.iter())
            .map(|(edge, &limit)| EnvelopeBin {
                left: edge[0],
                right: edge[1],
                limit,
            })
            .collect();
        Self::new(bins)
    }

    /// Observed domain of the independent variable.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        (self.bins[0].left, self.bins[self.bins.len() - 1].right)
    }

    /// Upper limit applying at `x`, with flat extension beyond the domain:
    /// values outside the fitted range use the nearest boundary bin's limit.
    #[must_use]
    pub fn limit_for(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let first = self.bins[0];
        let last = self.bins[self.bins.len() - 1];
        if x < first.left {
            return first.limit;
        }
        if x >= last.right {
            return last.limit;
        }
        let idx = self.bins.partition_point(|bin| bin.left <= x);
        self.bins[idx.saturating_sub(1)].limit
    }

    /// Whether the point (x, y) lies strictly above the envelope.
    /// Equality with the limit is in-envelope.
    #[must_use]
    pub fn exceeds(&self, x: f64, y: f64) -> bool {
        y > self.limit_for(x)
    }
}

/// The reference curves one site supplies for envelope filtering.
///
/// Any curve may be absent; an absent curve never flags a point.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeSet {
    pub rpm_v_power: Option<EnvelopeCurve>,
    pub rpm_v_wind_speed: Option<EnvelopeCurve>,
    pub pitch_v_power: Option<EnvelopeCurve>,
    pub pitch_v_wind_speed: Option<EnvelopeCurve>,
}

/// Outcome of checking one record against the envelope set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvelopeVerdict {
    pub rpm_exceeded: bool,
    pub pitch_exceeded: bool,
}

impl EnvelopeVerdict {
    #[must_use]
    pub const fn any(self) -> bool {
        self.rpm_exceeded || self.pitch_exceeded
    }
}

fn curve_hit(curve: Option<&EnvelopeCurve>, x: Option<f64>, y: Option<f64>) -> bool {
    match (curve, x, y) {
        (Some(curve), Some(x), Some(y)) => curve.exceeds(x, y),
        // a masked coordinate is unknown, and unknown is never anomalous
        _ => false,
    }
}

impl EnvelopeSet {
    /// Check one gated record. Each dependent variable fails if either of
    /// its curves is exceeded (OR combination).
    #[must_use]
    pub fn check(&self, record: &AggregateRecord) -> EnvelopeVerdict {
        let rpm = record.gen_rpm_mean;
        let pitch = record.pitch_angle_mean;
        let power = record.active_power_mean;
        let wind_speed = record.wind_speed_mean;

        EnvelopeVerdict {
            rpm_exceeded: curve_hit(self.rpm_v_power.as_ref(), power, rpm)
                || curve_hit(self.rpm_v_wind_speed.as_ref(), wind_speed, rpm),
            pitch_exceeded: curve_hit(self.pitch_v_power.as_ref(), power, pitch)
                || curve_hit(self.pitch_v_wind_speed.as_ref(), wind_speed, pitch),
        }
    }
}

/// Counts from one envelope-filter pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvelopeStats {
    pub checked: usize,
    pub flagged: usize,
}

/// Flag records against the envelope set and mask the flagged ones.
///
/// Flagged rows keep their identity and stay on the window grid; all
/// measurement columns become null, the same "unknown" representation the
/// coverage gate uses.
pub fn apply_envelope_filter(
    records: &mut [AggregateRecord],
    envelopes: &EnvelopeSet,
) -> EnvelopeStats {
    let mut stats = EnvelopeStats {
        checked: records.len(),
        flagged: 0,
    };
    for record in records.iter_mut() {
        if envelopes.check(record).any() {
            record.mask_measurements();
            stats.flagged += 1;
        }
    }
    if stats.checked > 0 {
        #[allow(clippy::cast_precision_loss)]
        let pct = 100.0 * stats.flagged as f64 / stats.checked as f64;
        info!(
            flagged = stats.flagged,
            checked = stats.checked,
            "envelope filter rejected {pct:.1}% of windows"
        );
    }
    stats
}
