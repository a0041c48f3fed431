// Experiment and snapshot records
//
// Shapes of the already-serialized analysis objects this crate consumes.
// Field names follow the JSON the analysis service emits (camelCase).

use crate::classify::RowSignals;
use crate::stat_record::{CorrectionPolicy, MetricDescriptor, RowKind, StatRecord, StatsEngine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_started: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    pub id: String,
    pub name: String,
}

/// Experiment definition as needed by the results view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experiment {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phases: Vec<Phase>,
    /// Variation 0 is the baseline
    #[serde(default)]
    pub variations: Vec<Variation>,
    #[serde(default)]
    pub metrics: Vec<MetricDescriptor>,
    /// Metric ids monitored as guardrails
    #[serde(default)]
    pub guardrails: Vec<String>,
}

impl Experiment {
    /// Most recent phase, or 0 when the experiment has none
    pub fn initial_phase(&self) -> usize {
        self.phases.len().saturating_sub(1)
    }

    pub fn metric(&self, id: &str) -> Option<&MetricDescriptor> {
        self.metrics.iter().find(|m| m.id == id)
    }

    pub fn row_kind(&self, metric_id: &str) -> RowKind {
        RowKind::from_guardrail(self.guardrails.iter().any(|g| g == metric_id))
    }

    /// Goal metrics first, then guardrails, each in definition order
    pub fn metrics_in_display_order(&self) -> impl Iterator<Item = (&MetricDescriptor, RowKind)> {
        let goals = self
            .metrics
            .iter()
            .filter(|m| !self.guardrails.contains(&m.id))
            .map(|m| (m, RowKind::Standard));
        let guardrails = self
            .guardrails
            .iter()
            .filter_map(|id| self.metric(id))
            .map(|m| (m, RowKind::Guardrail));
        goals.chain(guardrails)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSettings {
    #[serde(default)]
    pub stats_engine: StatsEngine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_value_correction: Option<CorrectionPolicy>,
    #[serde(default)]
    pub dimensions: Vec<String>,
}

/// Statistics for one metric in one variation, plus upstream row metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MetricResult {
    #[serde(flatten)]
    pub stats: StatRecord,
    #[serde(default)]
    pub signals: RowSignals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VariationResult {
    #[serde(default)]
    pub users: u64,
    #[serde(default)]
    pub metrics: BTreeMap<String, MetricResult>,
}

/// Results for one dimension value ("" or "All" when not split)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DimensionResult {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub variations: Vec<VariationResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SnapshotAnalysis {
    #[serde(default)]
    pub settings: AnalysisSettings,
    #[serde(default)]
    pub results: Vec<DimensionResult>,
}

/// Point-in-time analysis of an experiment for one phase/dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    pub experiment: String,
    #[serde(default)]
    pub phase: usize,
    #[serde(default)]
    pub dimension: String,
    #[serde(default)]
    pub analyses: Vec<SnapshotAnalysis>,
}

/// Payload returned by the fetch endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot: Snapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<Snapshot>,
}

/// Identity of a snapshot fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotKey {
    pub experiment_id: String,
    pub phase: usize,
    /// Empty when results are not split by a dimension
    pub dimension: String,
}

impl SnapshotKey {
    pub fn new(experiment_id: impl Into<String>, phase: usize, dimension: impl Into<String>) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            phase,
            dimension: dimension.into(),
        }
    }

    /// Endpoint path: `/experiment/{id}/snapshot/{phase}[/{dimension}]`
    pub fn path(&self) -> String {
        let mut path = format!("/experiment/{}/snapshot/{}", self.experiment_id, self.phase);
        if !self.dimension.is_empty() {
            path.push('/');
            path.push_str(&self.dimension);
        }
        path
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
