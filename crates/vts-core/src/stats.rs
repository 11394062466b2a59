//! Statistics primitives for plot measurements.
//!
//! Every function fails soft: insufficient samples, missing operands, and
//! division by zero all yield `None`. Callers pass already-parsed values;
//! non-finite entries are skipped rather than poisoning the result.

use serde::{Deserialize, Serialize};

/// t-value used for the least significant difference.
///
/// Fixed rather than looked up from a Student's t table by degrees of freedom.
pub const DEFAULT_LSD_T_VALUE: f64 = 2.0;

/// Replicated plots per participant.
pub const DEFAULT_REPLICATIONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LsdParams {
    pub t_value: f64,
    pub replications: usize,
}

impl Default for LsdParams {
    fn default() -> Self {
        Self {
            t_value: DEFAULT_LSD_T_VALUE,
            replications: DEFAULT_REPLICATIONS,
        }
    }
}

fn finite(values: &[f64]) -> impl Iterator<Item = f64> + '_ {
    values.iter().copied().filter(|v| v.is_finite())
}

/// Arithmetic mean; `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = finite(values).fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}

/// Bessel-corrected standard deviation; needs at least two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    let n = finite(values).count();
    if n < 2 {
        return None;
    }
    let m = mean(values)?;
    let squares: f64 = finite(values).map(|v| (v - m).powi(2)).sum();
    Some((squares / (n - 1) as f64).sqrt())
}

/// Standard deviation as a percentage of the mean.
pub fn coefficient_of_variation(mean: Option<f64>, std_dev: Option<f64>) -> Option<f64> {
    let (mean, std_dev) = (mean?, std_dev?);
    if mean == 0.0 {
        return None;
    }
    Some(std_dev / mean * 100.0)
}

/// Subject minus standard.
pub fn absolute_delta(subject_mean: Option<f64>, standard_mean: Option<f64>) -> Option<f64> {
    Some(subject_mean? - standard_mean?)
}

/// Percentage difference of the subject relative to the standard.
pub fn standard_relative_delta(
    subject_mean: Option<f64>,
    standard_mean: Option<f64>,
) -> Option<f64> {
    let (subject, standard) = (subject_mean?, standard_mean?);
    if standard == 0.0 {
        return None;
    }
    Some((subject - standard) / standard * 100.0)
}

/// `t * sqrt(2 * s^2 / n)`.
pub fn least_significant_difference(std_dev: Option<f64>, params: LsdParams) -> Option<f64> {
    let std_dev = std_dev?;
    if params.replications == 0 {
        return None;
    }
    Some(params.t_value * (2.0 * std_dev.powi(2) / params.replications as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn mean_of_four_plots() {
        assert_relative_eq!(mean(&[31.0, 31.5, 31.2, 31.3]).unwrap(), 31.25, epsilon = 1e-9);
        assert_relative_eq!(mean(&[32.4, 32.8, 33.0, 32.5]).unwrap(), 32.675, epsilon = 1e-9);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn mean_skips_non_finite() {
        assert_eq!(mean(&[f64::NAN, 2.0, 4.0]), Some(3.0));
        assert_eq!(mean(&[f64::INFINITY]), None);
    }

    #[test]
    fn std_dev_needs_two_values() {
        assert_eq!(sample_std_dev(&[5.0]), None);
        assert_eq!(sample_std_dev(&[5.0, 5.0]), Some(0.0));
        // Sample (n-1) rather than population variance.
        assert_relative_eq!(sample_std_dev(&[2.0, 4.0]).unwrap(), 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn cv_absent_for_zero_mean_or_missing_operand() {
        assert_eq!(coefficient_of_variation(Some(0.0), Some(1.5)), None);
        assert_eq!(coefficient_of_variation(None, Some(1.5)), None);
        assert_eq!(coefficient_of_variation(Some(10.0), None), None);
        assert_relative_eq!(
            coefficient_of_variation(Some(20.0), Some(1.0)).unwrap(),
            5.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn deltas_against_standard() {
        let standard = Some(31.25);
        let subject = Some(32.675);
        assert_relative_eq!(absolute_delta(subject, standard).unwrap(), 1.425, epsilon = 1e-9);
        assert_relative_eq!(
            standard_relative_delta(subject, standard).unwrap(),
            4.56,
            epsilon = 1e-9
        );
        assert_eq!(standard_relative_delta(subject, Some(0.0)), None);
        assert_eq!(standard_relative_delta(subject, None), None);
        assert_eq!(absolute_delta(None, standard), None);
    }

    #[test]
    fn lsd_uses_fixed_t_value() {
        let lsd = least_significant_difference(Some(1.0), LsdParams::default()).unwrap();
        assert_relative_eq!(lsd, 2.0 * (0.5f64).sqrt(), epsilon = 1e-12);

        let custom = LsdParams {
            t_value: 2.447,
            replications: 4,
        };
        let lsd = least_significant_difference(Some(1.0), custom).unwrap();
        assert_relative_eq!(lsd, 2.447 * (0.5f64).sqrt(), epsilon = 1e-12);

        let none = LsdParams {
            replications: 0,
            ..LsdParams::default()
        };
        assert_eq!(least_significant_difference(Some(1.0), none), None);
        assert_eq!(least_significant_difference(None, LsdParams::default()), None);
    }

    proptest! {
        #[test]
        fn mean_lies_within_bounds(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..16)) {
            let m = mean(&values).unwrap();
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(m >= min - 1e-6 && m <= max + 1e-6);
        }

        #[test]
        fn std_dev_is_non_negative_and_shift_invariant(
            values in prop::collection::vec(-1.0e3f64..1.0e3, 2..16),
            shift in -1.0e3f64..1.0e3,
        ) {
            let s = sample_std_dev(&values).unwrap();
            prop_assert!(s >= 0.0);
            let shifted: Vec<f64> = values.iter().map(|v| v + shift).collect();
            let s2 = sample_std_dev(&shifted).unwrap();
            prop_assert!((s - s2).abs() < 1e-6);
        }

        #[test]
        fn cv_with_zero_mean_is_always_absent(std_dev in 0.0f64..1.0e6) {
            prop_assert_eq!(coefficient_of_variation(Some(0.0), Some(std_dev)), None);
        }
    }
}
