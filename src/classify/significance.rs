// Significance decision per statistics engine
//
// Frequentist rows are decided on a p-value against the fixed 0.05 threshold.
// When a multiple-comparison correction is active the adjusted p-value is
// authoritative, except on guardrails which are always read uncorrected.
// Bayesian rows are decided on chance to win against a symmetric band.

use crate::stat_record::{CorrectionPolicy, RowKind, StatRecord};

/// Fixed policy threshold for frequentist significance
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Outcome of the significance test for a single row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Significance {
    pub significant: bool,
    /// Same test on the raw p-value, ignoring any correction
    pub significant_unadjusted: bool,
    /// p-value the decision was taken on
    pub operative_p_value: Option<f64>,
    /// Correction actually applied (None on guardrails and bayesian rows)
    pub applied_correction: Option<CorrectionPolicy>,
}

/// Decide frequentist significance
///
/// The operative p-value is adjusted iff a correction is active, the row is
/// not a guardrail, and the adjusted value was delivered. A row without any
/// p-value is never significant.
pub fn frequentist(
    stats: &StatRecord,
    correction: Option<CorrectionPolicy>,
    kind: RowKind,
) -> Significance {
    let raw = stats.p_value;

    let adjusted = match (correction, kind) {
        (Some(policy), RowKind::Standard) => stats.p_value_adjusted.map(|p| (p, policy)),
        _ => None,
    };

    let operative = adjusted.map(|(p, _)| p).or(raw);

    Significance {
        significant: below_threshold(operative),
        significant_unadjusted: below_threshold(raw),
        operative_p_value: operative,
        applied_correction: adjusted.map(|(_, policy)| policy),
    }
}

/// Decide bayesian significance from chance to win
pub fn bayesian(stats: &StatRecord, threshold: f64) -> Significance {
    let significant = stats
        .chance_to_win
        .map(|ctw| ctw > threshold || ctw < 1.0 - threshold)
        .unwrap_or(false);

    Significance {
        significant,
        significant_unadjusted: significant,
        operative_p_value: None,
        applied_correction: None,
    }
}

fn below_threshold(p_value: Option<f64>) -> bool {
    p_value.is_some_and(|p| p < SIGNIFICANCE_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(p: Option<f64>, adjusted: Option<f64>) -> StatRecord {
        StatRecord {
            p_value: p,
            p_value_adjusted: adjusted,
            ..Default::default()
        }
    }

    #[test]
    fn test_frequentist_uses_raw_without_correction() {
        let sig = frequentist(&record(Some(0.03), Some(0.08)), None, RowKind::Standard);
        assert!(sig.significant);
        assert_eq!(sig.operative_p_value, Some(0.03));
        assert_eq!(sig.applied_correction, None);
    }

    #[test]
    fn test_frequentist_uses_adjusted_with_correction() {
        let sig = frequentist(
            &record(Some(0.03), Some(0.08)),
            Some(CorrectionPolicy::BenjaminiHochberg),
            RowKind::Standard,
        );
        assert!(!sig.significant);
        assert!(sig.significant_unadjusted);
        assert_eq!(sig.operative_p_value, Some(0.08));
        assert_eq!(sig.applied_correction, Some(CorrectionPolicy::BenjaminiHochberg));
    }

    #[test]
    fn test_frequentist_guardrail_ignores_correction() {
        let sig = frequentist(
            &record(Some(0.03), Some(0.08)),
            Some(CorrectionPolicy::HolmBonferroni),
            RowKind::Guardrail,
        );
        assert!(sig.significant);
        assert!(sig.significant_unadjusted);
        assert_eq!(sig.applied_correction, None);
    }

    #[test]
    fn test_frequentist_missing_adjusted_falls_back_to_raw() {
        let sig = frequentist(
            &record(Some(0.01), None),
            Some(CorrectionPolicy::HolmBonferroni),
            RowKind::Standard,
        );
        assert!(sig.significant);
        assert_eq!(sig.operative_p_value, Some(0.01));
        assert_eq!(sig.applied_correction, None);
    }

    #[test]
    fn test_frequentist_missing_p_value_is_not_significant() {
        let sig = frequentist(&record(None, None), None, RowKind::Standard);
        assert!(!sig.significant);
        assert!(!sig.significant_unadjusted);
    }

    #[test]
    fn test_frequentist_threshold_is_strict() {
        let sig = frequentist(&record(Some(0.05), None), None, RowKind::Standard);
        assert!(!sig.significant);
    }

    #[test]
    fn test_bayesian_band() {
        let ctw = |c: f64| StatRecord {
            chance_to_win: Some(c),
            ..Default::default()
        };
        assert!(bayesian(&ctw(0.97), 0.95).significant);
        assert!(bayesian(&ctw(0.02), 0.95).significant);
        assert!(!bayesian(&ctw(0.60), 0.95).significant);
        assert!(!bayesian(&StatRecord::default(), 0.95).significant);
    }
}
