//! Rounding rules (C1).
//!
//! A `RoundingRule` is a value-type functor: `(digits, style) -> round(x)`.
//! The default-constructed rule is deliberately *poisoned* — calling
//! `round` on it raises `CoreError::Config` — so a rule that was forgotten
//! during setup fails loudly instead of silently rounding to nothing.

use serde::{Deserialize, Serialize};

use crate::enums::RoundingStyle;
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundingRule {
    digits: i32,
    // `None` is the poisoned default; `Some(style)` is a fully initialized rule.
    style: Option<RoundingStyle>,
}

impl RoundingRule {
    pub fn new(digits: i32, style: RoundingStyle) -> Self {
        Self {
            digits,
            style: Some(style),
        }
    }

    /// Round a single value. Errors if this rule was never initialized.
    pub fn round(&self, x: f64) -> Result<f64, CoreError> {
        let style = self
            .style
            .ok_or_else(|| CoreError::config("rounding rule used before initialization"))?;

        if style == RoundingStyle::NotAtAll {
            return Ok(x);
        }

        let scale = 10f64.powi(self.digits);
        let scaled = x * scale;
        let rounded = match style {
            RoundingStyle::NotAtAll => unreachable!(),
            RoundingStyle::ToNearest => scaled.round(),
            RoundingStyle::Upward => scaled.ceil(),
            RoundingStyle::Downward => scaled.floor(),
        };
        Ok(rounded / scale)
    }

    /// Apply `round` to every element of a slice, short-circuiting on the
    /// first error.
    pub fn round_each(&self, xs: &[f64]) -> Result<Vec<f64>, CoreError> {
        xs.iter().map(|&x| self.round(x)).collect()
    }
}

impl Default for RoundingRule {
    fn default() -> Self {
        Self {
            digits: 0,
            style: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poisoned_default_errors_on_use() {
        let rule = RoundingRule::default();
        assert!(rule.round(1.0).is_err());
    }

    #[test]
    fn not_at_all_is_identity() {
        let rule = RoundingRule::new(2, RoundingStyle::NotAtAll);
        assert_eq!(rule.round(1.23456).unwrap(), 1.23456);
    }

    #[test]
    fn round_is_idempotent() {
        let rule = RoundingRule::new(2, RoundingStyle::ToNearest);
        let once = rule.round(4.125).unwrap();
        let twice = rule.round(once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn minutiae_rule_matches_scenario_s6() {
        let rule = RoundingRule::new(2, RoundingStyle::ToNearest);
        let guar = 5.00;
        let curr = 3.25;
        let midpoint = (guar + curr) / 2.0;
        let rounded = rule.round(midpoint).unwrap();
        assert!((rounded - 4.13).abs() < 1e-9, "got {rounded}");
    }

    #[test]
    fn round_each_applies_elementwise() {
        let rule = RoundingRule::new(0, RoundingStyle::Upward);
        let xs = [1.1, 2.9, -0.5];
        let rounded = rule.round_each(&xs).unwrap();
        assert_eq!(rounded, vec![2.0, 3.0, -0.0]);
    }
}
