//! Ratio metrics that may be undefined
//!
//! A rate over an empty population has no value. It is carried as
//! [`MetricValue::Undefined`] all the way to the report, serializes as JSON
//! `null` and displays as `N/A`; it is never folded into zero.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Defined(f64),
    Undefined,
}

impl MetricValue {
    /// Wrap a raw float, mapping NaN and infinities to `Undefined`
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() {
            MetricValue::Defined(value)
        } else {
            MetricValue::Undefined
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            MetricValue::Defined(v) => Some(v),
            MetricValue::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, MetricValue::Defined(_))
    }

    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            MetricValue::Defined(v) => MetricValue::from_f64(f(v)),
            MetricValue::Undefined => MetricValue::Undefined,
        }
    }

    /// Scale a fraction to a percentage rounded to one decimal place
    pub fn as_percent(self) -> Self {
        self.map(|v| round1(v * 100.0))
    }

    /// Descending order with undefined values last
    pub fn cmp_desc(&self, other: &Self) -> Ordering {
        match (self.value(), other.value()) {
            (Some(a), Some(b)) => b.total_cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl Default for MetricValue {
    fn default() -> Self {
        MetricValue::Undefined
    }
}

impl From<Option<f64>> for MetricValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(MetricValue::Undefined, MetricValue::from_f64)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Defined(v) => write!(f, "{:.1}", v),
            MetricValue::Undefined => f.write_str("N/A"),
        }
    }
}

/// `numerator / denominator`, undefined when the denominator is zero
pub fn ratio(numerator: usize, denominator: usize) -> MetricValue {
    if denominator == 0 {
        MetricValue::Undefined
    } else {
        MetricValue::Defined(numerator as f64 / denominator as f64)
    }
}

/// `numerator / denominator * 100` rounded to one decimal place
pub fn percent(numerator: usize, denominator: usize) -> MetricValue {
    ratio(numerator, denominator).as_percent()
}

/// Round half away from zero to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_zero_denominator_is_undefined() {
        assert_eq!(ratio(0, 0), MetricValue::Undefined);
        assert_eq!(ratio(5, 0), MetricValue::Undefined);
        assert_eq!(ratio(1, 4), MetricValue::Defined(0.25));
    }

    #[test]
    fn test_percent_rounds_to_one_decimal() {
        assert_eq!(percent(1, 3), MetricValue::Defined(33.3));
        assert_eq!(percent(2, 3), MetricValue::Defined(66.7));
        assert_eq!(percent(10, 30), MetricValue::Defined(33.3));
    }

    #[test]
    fn test_nan_becomes_undefined() {
        assert_eq!(MetricValue::from_f64(f64::NAN), MetricValue::Undefined);
        assert_eq!(MetricValue::from(None), MetricValue::Undefined);
        assert_eq!(MetricValue::from(Some(0.5)), MetricValue::Defined(0.5));
    }

    #[test]
    fn test_display() {
        assert_eq!(MetricValue::Defined(94.25).to_string(), "94.2");
        assert_eq!(MetricValue::Defined(50.0).to_string(), "50.0");
        assert_eq!(MetricValue::Undefined.to_string(), "N/A");
    }

    #[test]
    fn test_serializes_undefined_as_null() {
        let json = serde_json::to_string(&vec![MetricValue::Defined(1.5), MetricValue::Undefined]).unwrap();
        assert_eq!(json, "[1.5,null]");
    }

    #[test]
    fn test_cmp_desc_puts_undefined_last() {
        let mut values = vec![
            MetricValue::Defined(10.0),
            MetricValue::Undefined,
            MetricValue::Defined(40.0),
        ];
        values.sort_by(MetricValue::cmp_desc);
        assert_eq!(
            values,
            vec![
                MetricValue::Defined(40.0),
                MetricValue::Defined(10.0),
                MetricValue::Undefined
            ]
        );
    }
}
