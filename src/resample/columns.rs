//! Raw column-name convention.
//!
//! Turbine identifiers are encoded in raw column names. The convention is
//! fixed, not inferred: the trailing underscore token is the turbine suffix
//! unless it is a single character, in which case that character is a site
//! qualifier, the suffix is the second-to-last token, and the qualifier is
//! folded back into the field name.
//!
//! The rule is deliberately brittle to other naming schemes. Alternate
//! conventions are substituted by passing a different parsing function to
//! [`resample_with`](super::resample_with), never by editing the resampler.

/// A raw column name decomposed under the naming convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedColumn {
    /// Turbine suffix; prepend the site prefix to get the turbine name.
    pub turbine_suffix: String,
    /// Remaining tokens joined back into the canonical field name.
    pub field: String,
}

/// Split a raw column name into turbine suffix and field name.
///
/// Returns `None` when the name does not decompose under the convention;
/// the resampler treats that as fatal.
///
/// ```
/// use windgate::resample::split_turbine_suffix;
///
/// let p = split_turbine_suffix("active_power_avg_A12").unwrap();
/// assert_eq!(p.turbine_suffix, "A12");
/// assert_eq!(p.field, "active_power_avg");
/// ```
#[must_use]
pub fn split_turbine_suffix(name: &str) -> Option<ParsedColumn> {
    let parts: Vec<&str> = name.split('_').collect();
    if parts.len() < 2 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }

    let last = parts[parts.len() - 1];
    if last.chars().count() == 1 {
        // Trailing single character is a site qualifier, not an identifier.
        if parts.len() < 3 {
            return None;
        }
        let turbine_suffix = parts[parts.len() - 2].to_string();
        let mut field_parts = parts[..parts.len() - 2].to_vec();
        field_parts.push(last);
        Some(ParsedColumn {
            turbine_suffix,
            field: field_parts.join("_"),
        })
    } else {
        Some(ParsedColumn {
            turbine_suffix: last.to_string(),
            field: parts[..parts.len() - 1].join("_"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_multichar_token_is_the_suffix() {
        let p = split_turbine_suffix("active_power_avg_A12").unwrap();
        assert_eq!(p.turbine_suffix, "A12");
        assert_eq!(p.field, "active_power_avg");
    }

    #[test]
    fn test_trailing_single_char_is_a_qualifier() {
        let p = split_turbine_suffix("active_power_avg_7").unwrap();
        assert_eq!(p.turbine_suffix, "avg");
        assert_eq!(p.field, "active_power_7");
    }

    #[test]
    fn test_two_token_name() {
        let p = split_turbine_suffix("temperature_T03").unwrap();
        assert_eq!(p.turbine_suffix, "T03");
        assert_eq!(p.field, "temperature");
    }

    #[test]
    fn test_unparseable_names_rejected() {
        assert!(split_turbine_suffix("power").is_none());
        assert!(split_turbine_suffix("power_1").is_none());
        assert!(split_turbine_suffix("power__A12").is_none());
        assert!(split_turbine_suffix("").is_none());
    }
}
