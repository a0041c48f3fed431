// Upstream row metadata carried alongside the statistics
//
// Risk, suspicious-change and guardrail metadata are computed by the analysis
// engine. The classifier never derives them; it threads them through to the
// verdict so the flag aggregator can decide what to surface.

use serde::{Deserialize, Serialize};

/// Risk level reported by the analysis engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskStatus {
    #[default]
    Ok,
    Warning,
    Danger,
}

impl RiskStatus {
    /// `warning` and `danger` are worth a callout
    pub fn is_elevated(self) -> bool {
        matches!(self, RiskStatus::Warning | RiskStatus::Danger)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskMeta {
    pub show_risk: bool,
    pub risk_status: RiskStatus,
    pub risk_reason: String,
    /// Risk relative to the baseline, pre-formatted upstream (e.g. "2.4%")
    pub relative_risk_formatted: String,
    /// Absolute risk, when the metric has a meaningful unit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_formatted: Option<String>,
}

/// Progress towards the minimum sample, used by the "not enough data" callout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EnoughDataMeta {
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_remaining_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RowSignals {
    pub risk_meta: RiskMeta,
    pub suspicious_change: bool,
    pub suspicious_change_reason: String,
    /// Present when a guardrail trends in the wrong direction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardrail_warning: Option<String>,
    pub enough_data_meta: EnoughDataMeta,
    /// Days since the phase started collecting data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_days: Option<f64>,
}
