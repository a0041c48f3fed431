//! Experiment results report
//!
//! Walks one dimension of a snapshot analysis and classifies every
//! metric/variation pair against the baseline (variation 0), attaching the
//! flags each row would show. Goal metrics come first, then guardrails.

use crate::classify::{Arrow, Classifier, ClassifyRequest, RowVerdict};
use crate::display::format_lift;
use crate::flags::{aggregate_flags, WarningSet};
use crate::snapshot::{DimensionResult, Experiment, SnapshotAnalysis, VariationResult};
use crate::stat_record::{MetricType, RowKind, StatRecord};
use serde::Serialize;
use std::fmt::Write as _;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ReportError {
    #[error("analysis has no results for dimension value '{0}'")]
    UnknownDimension(String),

    #[error("analysis has no results")]
    Empty,

    #[error("results contain no baseline variation")]
    NoBaseline,
}

/// One classified row of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub metric_id: String,
    pub metric_name: String,
    pub metric_type: MetricType,
    pub inverse: bool,
    pub variation_index: usize,
    pub variation_name: String,
    pub kind: RowKind,
    pub expected: f64,
    pub verdict: RowVerdict,
    pub warnings: WarningSet,
}

/// Pick the dimension value to report on
///
/// `None` (or an empty name) selects the first result, which is the
/// unsplit "All" row for analyses without a dimension.
pub fn select_dimension<'a>(
    analysis: &'a SnapshotAnalysis,
    dimension_value: Option<&str>,
) -> Result<&'a DimensionResult, ReportError> {
    match dimension_value.filter(|name| !name.is_empty()) {
        Some(name) => analysis
            .results
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| ReportError::UnknownDimension(name.to_string())),
        None => analysis.results.first().ok_or(ReportError::Empty),
    }
}

/// Classify every metric/variation pair of one dimension value
pub fn build_report(
    experiment: &Experiment,
    analysis: &SnapshotAnalysis,
    dimension_value: Option<&str>,
    classifier: &Classifier,
) -> Result<Vec<ReportRow>, ReportError> {
    let dimension = select_dimension(analysis, dimension_value)?;
    let (baseline_result, variations) = dimension
        .variations
        .split_first()
        .ok_or(ReportError::NoBaseline)?;

    let engine = analysis.settings.stats_engine;
    let correction = analysis.settings.p_value_correction;
    let mut rows = Vec::new();

    for (metric, kind) in experiment.metrics_in_display_order() {
        let baseline = stats_for(baseline_result, &metric.id);

        for (offset, variation_result) in variations.iter().enumerate() {
            let variation_index = offset + 1;
            let Some(result) = variation_result.metrics.get(&metric.id) else {
                tracing::debug!(
                    metric = %metric.id,
                    variation = variation_index,
                    "no results for metric, skipping row"
                );
                continue;
            };
            let stats = with_user_fallback(&result.stats, variation_result);

            let request = ClassifyRequest::new(metric, &baseline, &stats, engine)
                .with_correction(correction)
                .with_kind(kind)
                .with_signals(&result.signals);
            let verdict = classifier.classify(&request);
            let warnings = aggregate_flags(&verdict, metric, kind);

            rows.push(ReportRow {
                metric_id: metric.id.clone(),
                metric_name: metric.name.clone(),
                metric_type: metric.metric_type,
                inverse: metric.inverse,
                variation_index,
                variation_name: variation_name(experiment, variation_index),
                kind,
                expected: stats.expected(),
                verdict,
                warnings,
            });
        }
    }

    Ok(rows)
}

/// Plain-text table, one line per row plus one line per warning
pub fn render_text(rows: &[ReportRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<28} {:<20} {:<16} {:>9}  {}",
        "Metric", "Variation", "Status", "Change", "Flags"
    );

    for row in rows {
        let metric = match row.kind {
            RowKind::Standard => row.metric_name.clone(),
            RowKind::Guardrail => format!("{} (guardrail)", row.metric_name),
        };
        let arrow = Arrow::select(row.verdict.directional_status, row.inverse);
        let change = format!("{} {}", arrow.glyph(), format_lift(row.expected));
        let flags = row
            .warnings
            .iter()
            .map(|w| w.label())
            .collect::<Vec<_>>()
            .join(", ");

        let _ = writeln!(
            out,
            "{:<28} {:<20} {:<16} {:>9}  {}",
            metric,
            row.variation_name,
            row.verdict.status_label(),
            change,
            flags
        );
        for warning in row.warnings.iter() {
            if !warning.reason().is_empty() {
                let _ = writeln!(out, "    {}: {}", warning.label(), warning.reason());
            }
        }
    }

    out
}

fn stats_for(result: &VariationResult, metric_id: &str) -> StatRecord {
    match result.metrics.get(metric_id) {
        Some(metric) => with_user_fallback(&metric.stats, result),
        None => StatRecord {
            users: result.users,
            ..Default::default()
        },
    }
}

// Per-metric user counts are optional; the variation total stands in
fn with_user_fallback(stats: &StatRecord, result: &VariationResult) -> StatRecord {
    let mut stats = stats.clone();
    if stats.users == 0 {
        stats.users = result.users;
    }
    stats
}

fn variation_name(experiment: &Experiment, index: usize) -> String {
    experiment
        .variations
        .get(index)
        .map(|v| v.name.clone())
        .unwrap_or_else(|| format!("Variation {}", index))
}
