//! Simulation configuration consumed when a simulation is constructed.

use serde::{Deserialize, Serialize};

/// Number of board columns used when no valid width is supplied.
pub const DEFAULT_BOARD_WIDTH: i64 = 28;
/// Number of board rows used when no valid height is supplied.
pub const DEFAULT_BOARD_HEIGHT: i64 = 28;

/// Parameters required to build a board and start its first path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of board columns.
    pub width: i64,
    /// Number of board rows.
    pub height: i64,
    /// Requested starting column; random when absent.
    pub start_x: Option<i64>,
    /// Requested starting row; random when absent.
    pub start_y: Option<i64>,
    /// Seed for tile generation and random start selection; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            start_x: None,
            start_y: None,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Builds a configuration from untrusted textual values.
    ///
    /// Missing or malformed values fall back to their defaults instead of
    /// failing. Non-positive dimensions are passed through unchanged so that
    /// board construction reports them.
    #[must_use]
    pub fn from_raw(raw: &RawConfig) -> Self {
        Self::default().overlay(raw)
    }

    /// Overlays the values present in `raw` on top of this configuration.
    ///
    /// Malformed values in `raw` leave the current value untouched.
    #[must_use]
    pub fn overlay(mut self, raw: &RawConfig) -> Self {
        if let Some(width) = lenient(raw.width.as_deref()) {
            self.width = width;
        }
        if let Some(height) = lenient(raw.height.as_deref()) {
            self.height = height;
        }
        if let Some(start_x) = lenient(raw.start_x.as_deref()) {
            self.start_x = Some(start_x);
        }
        if let Some(start_y) = lenient(raw.start_y.as_deref()) {
            self.start_y = Some(start_y);
        }
        if let Some(seed) = parse_seed(raw.seed.as_deref()) {
            self.seed = Some(seed);
        }
        self
    }
}

/// Configuration values exactly as received from a form or command line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawConfig {
    /// Raw board width.
    pub width: Option<String>,
    /// Raw board height.
    pub height: Option<String>,
    /// Raw starting column.
    pub start_x: Option<String>,
    /// Raw starting row.
    pub start_y: Option<String>,
    /// Raw generation seed.
    pub seed: Option<String>,
}

fn lenient(value: Option<&str>) -> Option<i64> {
    value.and_then(parse_lenient_int)
}

fn parse_seed(value: Option<&str>) -> Option<u64> {
    value.and_then(|value| value.trim().parse::<u64>().ok())
}

/// Parses an integer the way HTML form values are usually coerced.
///
/// The trimmed input must read as a finite number; the leading integer part
/// is then returned, so `"12.7"` yields `12` while `"12px"` and `"abc"` are
/// rejected.
#[must_use]
pub fn parse_lenient_int(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    let numeric = trimmed.parse::<f64>().ok()?;
    if !numeric.is_finite() {
        return None;
    }

    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|character: char| !character.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_parse_accepts_plain_and_fractional_numbers() {
        assert_eq!(parse_lenient_int("16"), Some(16));
        assert_eq!(parse_lenient_int("  -3 "), Some(-3));
        assert_eq!(parse_lenient_int("+4"), Some(4));
        assert_eq!(parse_lenient_int("12.7"), Some(12));
    }

    #[test]
    fn lenient_parse_rejects_malformed_values() {
        assert_eq!(parse_lenient_int(""), None);
        assert_eq!(parse_lenient_int("abc"), None);
        assert_eq!(parse_lenient_int("12px"), None);
        assert_eq!(parse_lenient_int("inf"), None);
        assert_eq!(parse_lenient_int(".5"), None);
    }

    #[test]
    fn malformed_raw_values_fall_back_to_defaults() {
        let raw = RawConfig {
            width: Some("wide".to_owned()),
            height: Some("10".to_owned()),
            start_x: Some("".to_owned()),
            start_y: Some("3".to_owned()),
            seed: Some("not-a-seed".to_owned()),
        };

        let config = SimulationConfig::from_raw(&raw);

        assert_eq!(config.width, DEFAULT_BOARD_WIDTH);
        assert_eq!(config.height, 10);
        assert_eq!(config.start_x, None);
        assert_eq!(config.start_y, Some(3));
        assert_eq!(config.seed, None);
    }

    #[test]
    fn non_positive_dimensions_pass_through() {
        let raw = RawConfig {
            width: Some("0".to_owned()),
            ..RawConfig::default()
        };

        assert_eq!(SimulationConfig::from_raw(&raw).width, 0);
    }

    #[test]
    fn overlay_keeps_existing_values_for_malformed_input() {
        let base = SimulationConfig {
            width: 12,
            height: 9,
            start_x: Some(1),
            start_y: Some(2),
            seed: Some(7),
        };
        let raw = RawConfig {
            width: Some("x".to_owned()),
            height: Some("5".to_owned()),
            seed: Some("11".to_owned()),
            ..RawConfig::default()
        };

        let merged = base.overlay(&raw);

        assert_eq!(merged.width, 12);
        assert_eq!(merged.height, 5);
        assert_eq!(merged.start_x, Some(1));
        assert_eq!(merged.start_y, Some(2));
        assert_eq!(merged.seed, Some(11));
    }
}
