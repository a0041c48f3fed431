// Row verdict produced by the classifier
//
// A verdict is derived state: recomputed from the current records on every
// render, never persisted, identified only by the (metric, variation, phase,
// dimension) tuple that produced it.

use crate::classify::signals::{EnoughDataMeta, RiskMeta};
use crate::stat_record::{CorrectionPolicy, MetricDescriptor, RowKind, StatsEngine};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical outcome shown on the status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultsStatus {
    Won,
    Lost,
    Draw,
    Inconclusive,
}

impl ResultsStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultsStatus::Won => "won",
            ResultsStatus::Lost => "lost",
            ResultsStatus::Draw => "draw",
            ResultsStatus::Inconclusive => "inconclusive",
        }
    }

    /// `won`, `lost` and `draw` are decided outcomes
    pub fn is_decided(self) -> bool {
        !matches!(self, ResultsStatus::Inconclusive)
    }
}

impl fmt::Display for ResultsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the lift favours the treatment once `inverse` is accounted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionalStatus {
    Winning,
    Losing,
}

impl DirectionalStatus {
    /// Winning when the lift, sign-flipped for inverse metrics, is positive
    pub fn from_lift(expected: f64, inverse: bool) -> Self {
        let signed = if inverse { -expected } else { expected };
        if signed > 0.0 {
            DirectionalStatus::Winning
        } else {
            DirectionalStatus::Losing
        }
    }
}

/// Arrow shown next to the % change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrow {
    Up,
    Down,
}

impl Arrow {
    /// Up for winning non-inverse or losing inverse metrics, down otherwise
    pub fn select(directional: DirectionalStatus, inverse: bool) -> Self {
        match (directional, inverse) {
            (DirectionalStatus::Winning, false) | (DirectionalStatus::Losing, true) => Arrow::Up,
            _ => Arrow::Down,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Arrow::Up => "↑",
            Arrow::Down => "↓",
        }
    }
}

/// Classification of one metric/variation row against the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowVerdict {
    pub results_status: ResultsStatus,
    pub directional_status: DirectionalStatus,
    pub significant: bool,
    pub significant_unadjusted: bool,
    pub enough_data: bool,
    pub results_reason: String,
    pub significant_reason: String,
    pub enough_data_reason: String,

    pub engine: StatsEngine,
    pub kind: RowKind,
    /// Correction that was actually applied to this row
    pub correction: Option<CorrectionPolicy>,
    /// p-value the significance decision was taken on (frequentist only)
    pub operative_p_value: Option<f64>,

    pub risk_meta: RiskMeta,
    pub suspicious_change: bool,
    pub suspicious_change_reason: String,
    pub guardrail_warning: Option<String>,
    pub enough_data_meta: EnoughDataMeta,
}

impl RowVerdict {
    pub fn arrow(&self, metric: &MetricDescriptor) -> Arrow {
        Arrow::select(self.directional_status, metric.inverse)
    }

    /// The badge is shown for decided outcomes and whenever the row is not
    /// significant, where it overrides whatever status came before.
    pub fn shows_status_badge(&self) -> bool {
        self.results_status.is_decided() || !self.significant
    }

    pub fn status_label(&self) -> String {
        if !self.significant {
            return "Not significant".to_string();
        }
        let status = self.results_status.as_str();
        let mut chars = status.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Reason shown in the badge's tooltip
    pub fn status_reason(&self) -> &str {
        if self.significant {
            &self.results_reason
        } else {
            &self.significant_reason
        }
    }

    /// Bold values: guardrails go by the unadjusted decision
    pub fn emphasized(&self) -> bool {
        match self.kind {
            RowKind::Standard => self.significant,
            RowKind::Guardrail => self.significant_unadjusted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directional_status_from_lift() {
        assert_eq!(DirectionalStatus::from_lift(0.1, false), DirectionalStatus::Winning);
        assert_eq!(DirectionalStatus::from_lift(0.1, true), DirectionalStatus::Losing);
        assert_eq!(DirectionalStatus::from_lift(-0.1, true), DirectionalStatus::Winning);
        assert_eq!(DirectionalStatus::from_lift(0.0, false), DirectionalStatus::Losing);
    }

    #[test]
    fn test_arrow_select() {
        assert_eq!(Arrow::select(DirectionalStatus::Winning, false), Arrow::Up);
        assert_eq!(Arrow::select(DirectionalStatus::Losing, true), Arrow::Up);
        assert_eq!(Arrow::select(DirectionalStatus::Losing, false), Arrow::Down);
        assert_eq!(Arrow::select(DirectionalStatus::Winning, true), Arrow::Down);
    }

    #[test]
    fn test_results_status_wire_names() {
        assert_eq!(serde_json::to_string(&ResultsStatus::Won).unwrap(), "\"won\"");
        assert_eq!(ResultsStatus::Inconclusive.to_string(), "inconclusive");
        assert!(ResultsStatus::Draw.is_decided());
        assert!(!ResultsStatus::Inconclusive.is_decided());
    }
}
