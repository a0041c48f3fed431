//! Warning flags for a classified row
//!
//! One aggregation function serves both standard and guardrail rows; the
//! [`RowKind`] decides whether the third slot is a suspicious change or a
//! guardrail regression. Flags are independent: several may be active on the
//! same row and all of them are returned.

use crate::classify::{ResultsStatus, RiskStatus, RowVerdict};
use crate::stat_record::{MetricDescriptor, RowKind};
use serde::{Deserialize, Serialize};

/// Elevated risk callout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFlag {
    pub status: RiskStatus,
    pub reason: String,
    /// Relative risk as formatted upstream
    pub magnitude: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absolute: Option<String>,
}

/// The active warnings for one row; at most one of each kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WarningSet {
    pub insufficient_data: Option<InsufficientData>,
    pub risk: Option<RiskFlag>,
    pub suspicious_change: Option<Reason>,
    pub guardrail_regression: Option<Reason>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsufficientData {
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_remaining_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reason {
    pub reason: String,
}

/// A single active warning, borrowed from a [`WarningSet`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Warning<'a> {
    InsufficientData(&'a InsufficientData),
    Risk(&'a RiskFlag),
    SuspiciousChange(&'a Reason),
    GuardrailRegression(&'a Reason),
}

impl Warning<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            Warning::InsufficientData(_) => "not enough data",
            Warning::Risk(_) => "risk",
            Warning::SuspiciousChange(_) => "suspicious",
            Warning::GuardrailRegression(_) => "bad guardrail trend",
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Warning::InsufficientData(flag) => &flag.reason,
            Warning::Risk(flag) => &flag.reason,
            Warning::SuspiciousChange(flag) | Warning::GuardrailRegression(flag) => &flag.reason,
        }
    }
}

impl WarningSet {
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Active warnings in display order: insufficient data, risk,
    /// suspicious change, guardrail regression
    pub fn iter(&self) -> impl Iterator<Item = Warning<'_>> {
        [
            self.insufficient_data.as_ref().map(Warning::InsufficientData),
            self.risk.as_ref().map(Warning::Risk),
            self.suspicious_change.as_ref().map(Warning::SuspiciousChange),
            self.guardrail_regression.as_ref().map(Warning::GuardrailRegression),
        ]
        .into_iter()
        .flatten()
    }
}

/// Derive the warning set for a classified row
///
/// Risk is suppressed on rows that already lost; losing is the worse outcome.
/// The suppression applies to `lost` only, not to `draw` or `inconclusive`.
pub fn aggregate_flags(verdict: &RowVerdict, metric: &MetricDescriptor, kind: RowKind) -> WarningSet {
    let insufficient_data = (!verdict.enough_data).then(|| InsufficientData {
        reason: verdict.enough_data_reason.clone(),
        percent_complete: verdict.enough_data_meta.percent_complete,
        time_remaining_ms: verdict.enough_data_meta.time_remaining_ms,
    });

    let risk_meta = &verdict.risk_meta;
    let risk = (risk_meta.show_risk
        && risk_meta.risk_status.is_elevated()
        && verdict.results_status != ResultsStatus::Lost)
        .then(|| RiskFlag {
            status: risk_meta.risk_status,
            reason: risk_meta.risk_reason.clone(),
            magnitude: risk_meta.relative_risk_formatted.clone(),
            absolute: risk_meta.risk_formatted.clone(),
        });

    let (suspicious_change, guardrail_regression) = match kind {
        RowKind::Standard => (
            verdict.suspicious_change.then(|| Reason {
                reason: verdict.suspicious_change_reason.clone(),
            }),
            None,
        ),
        RowKind::Guardrail => (
            None,
            verdict
                .guardrail_warning
                .as_ref()
                .filter(|warning| !warning.is_empty())
                .map(|warning| Reason {
                    reason: warning.clone(),
                }),
        ),
    };

    let warnings = WarningSet {
        insufficient_data,
        risk,
        suspicious_change,
        guardrail_regression,
    };

    if !warnings.is_empty() {
        tracing::debug!(
            metric = %metric.id,
            kind = ?kind,
            count = warnings.len(),
            "row has flagged items"
        );
    }

    warnings
}
