//! Per-variation metric records as delivered by the analysis engine
//!
//! A `StatRecord` is one variation's view of one metric inside a snapshot:
//! relative lift, interval, p-values, chance to win and sample size. The
//! analysis engine computes all of these upstream; this module only carries
//! and repairs them.
//!
//! Every numeric field is optional on the wire. Experiments that are still
//! collecting data routinely ship partial records, so accessors read missing
//! values as 0 instead of failing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of value a metric measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Conversion (did the user do X)
    #[default]
    Binomial,
    /// Number of events per user
    Count,
    /// Time-based metric, seconds
    Duration,
    /// Monetary metric
    Revenue,
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricType::Binomial => write!(f, "binomial"),
            MetricType::Count => write!(f, "count"),
            MetricType::Duration => write!(f, "duration"),
            MetricType::Revenue => write!(f, "revenue"),
        }
    }
}

/// Static description of a metric, supplied by the experiment definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub metric_type: MetricType,
    /// Lower raw values are better (latency, error rate, ...)
    #[serde(default)]
    pub inverse: bool,
}

impl MetricDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, metric_type: MetricType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            metric_type,
            inverse: false,
        }
    }

    /// Mark the metric as inverse (lower is better)
    pub fn inverted(mut self) -> Self {
        self.inverse = true;
        self
    }
}

/// Which statistics engine produced the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatsEngine {
    /// p-values and confidence intervals are authoritative
    Frequentist,
    /// chance to win and credible intervals are authoritative
    #[default]
    Bayesian,
}

impl fmt::Display for StatsEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsEngine::Frequentist => write!(f, "frequentist"),
            StatsEngine::Bayesian => write!(f, "bayesian"),
        }
    }
}

/// Multiple-comparison correction applied to p-values upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorrectionPolicy {
    HolmBonferroni,
    BenjaminiHochberg,
}

impl fmt::Display for CorrectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectionPolicy::HolmBonferroni => write!(f, "holm-bonferroni"),
            CorrectionPolicy::BenjaminiHochberg => write!(f, "benjamini-hochberg"),
        }
    }
}

/// Whether a row is a regular goal metric or a guardrail
///
/// Guardrails are monitored for unintended regressions and are never
/// evaluated against corrected p-values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    #[default]
    Standard,
    Guardrail,
}

impl RowKind {
    pub fn from_guardrail(is_guardrail: bool) -> Self {
        if is_guardrail {
            RowKind::Guardrail
        } else {
            RowKind::Standard
        }
    }

    pub fn is_guardrail(self) -> bool {
        self == RowKind::Guardrail
    }
}

/// One variation's statistics for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatRecord {
    /// Relative lift against the baseline (0.1 = +10%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<f64>,
    /// Interval on the relative lift, `[low, high]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_value_adjusted: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chance_to_win: Option<f64>,
    #[serde(default)]
    pub users: u64,
    /// Absolute magnitude (conversions, total revenue, ...)
    #[serde(default)]
    pub value: f64,
}

impl StatRecord {
    pub fn expected(&self) -> f64 {
        self.expected.unwrap_or(0.0)
    }

    pub fn ci_low(&self) -> f64 {
        self.ci.map(|ci| ci[0]).unwrap_or(0.0)
    }

    pub fn ci_high(&self) -> f64 {
        self.ci.map(|ci| ci[1]).unwrap_or(0.0)
    }

    pub fn chance_to_win(&self) -> f64 {
        self.chance_to_win.unwrap_or(0.0)
    }

    /// Repair a record so the documented invariants hold
    ///
    /// - non-finite numbers are dropped (read as missing)
    /// - an inverted interval is swapped into `low <= high`
    /// - p-values and chance to win are clamped into `[0, 1]`
    pub fn normalized(&self) -> StatRecord {
        let expected = finite(self.expected);

        let ci = match self.ci {
            Some([low, high]) if low.is_finite() && high.is_finite() => {
                if low > high {
                    tracing::debug!(low, high, "swapping inverted interval");
                    Some([high, low])
                } else {
                    Some([low, high])
                }
            }
            _ => None,
        };

        StatRecord {
            expected,
            ci,
            p_value: unit_interval(self.p_value, "p_value"),
            p_value_adjusted: unit_interval(self.p_value_adjusted, "p_value_adjusted"),
            chance_to_win: unit_interval(self.chance_to_win, "chance_to_win"),
            users: self.users,
            value: if self.value.is_finite() { self.value } else { 0.0 },
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn unit_interval(value: Option<f64>, field: &'static str) -> Option<f64> {
    let value = finite(value)?;
    if !(0.0..=1.0).contains(&value) {
        tracing::debug!(field, value, "clamping probability into [0, 1]");
    }
    Some(value.clamp(0.0, 1.0))
}
