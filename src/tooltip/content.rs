// Text model of the results tooltip
//
// Everything the popup shows for one metric/variation row, already reduced to
// strings and display switches. Rendering technology stays with the caller.

use crate::classify::{Arrow, ResultsStatus, RowVerdict};
use crate::display::{
    format_compact, format_lift, format_p_value, format_percent, format_plus_minus, ValueFormatter,
};
use crate::flags::{aggregate_flags, WarningSet};
use crate::stat_record::{CorrectionPolicy, MetricDescriptor, MetricType, StatRecord, StatsEngine};
use crate::tooltip::geometry::{LayoutX, VerticalAlign};
use serde::Serialize;
use std::fmt::Write as _;

/// Inputs for one tooltip, as collected by the results table on hover
///
/// Engine and row kind are read from `verdict`, so the badge, the flags and
/// the emphasis always agree with the classification they came from.
#[derive(Debug, Clone)]
pub struct TooltipData {
    pub metric: MetricDescriptor,
    pub variation_row: usize,
    pub variation_name: String,
    pub stats: StatRecord,
    pub baseline_row: usize,
    pub baseline_name: String,
    pub baseline: StatRecord,
    pub verdict: RowVerdict,
    /// Correction configured on the analysis, shown as a note on standard
    /// frequentist rows even when no adjusted value was delivered
    pub correction: Option<CorrectionPolicy>,
    pub layout_x: LayoutX,
    pub y_align: VerticalAlign,
}

/// Where the pointer arrow sits on the popup box
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArrowPosition {
    /// Popup opened below the anchor has its arrow on the top edge
    pub edge: VerticalAlign,
    /// Position along that edge, percent from the left
    pub offset_percent: f64,
}

impl ArrowPosition {
    pub fn new(layout_x: LayoutX, y_align: VerticalAlign) -> Self {
        Self {
            edge: y_align,
            offset_percent: layout_x.arrow_percent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusBadge {
    pub status: ResultsStatus,
    pub label: String,
    pub non_significant: bool,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correction_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeLine {
    pub arrow: Arrow,
    pub lift: String,
    /// Frequentist only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plus_minus: Option<String>,
    pub emphasized: bool,
    pub dimmed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueLine {
    pub label: &'static str,
    /// One entry per rendered line
    pub lines: Vec<String>,
    pub emphasized: bool,
    pub dimmed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub row: usize,
    pub name: String,
    pub users: String,
    pub value: String,
    pub total: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipContent {
    pub guardrail: bool,
    pub metric_name: String,
    pub metric_type: MetricType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverse_hint: Option<&'static str>,
    pub arrow: ArrowPosition,
    pub variation_row: usize,
    pub variation_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_badge: Option<StatusBadge>,
    pub change: ChangeLine,
    pub interval: ValueLine,
    pub chance: ValueLine,
    pub warnings: WarningSet,
    pub table: Vec<TableRow>,
}

impl TooltipContent {
    pub fn build(data: &TooltipData, formatter: &dyn ValueFormatter) -> Self {
        let verdict = &data.verdict;
        let kind = verdict.kind;
        let stats = data.stats.normalized();
        let baseline = data.baseline.normalized();
        let emphasized = verdict.emphasized();
        let dimmed = !verdict.enough_data;
        let frequentist = verdict.engine == StatsEngine::Frequentist;

        let status_badge = verdict.shows_status_badge().then(|| StatusBadge {
            status: verdict.results_status,
            label: verdict.status_label(),
            non_significant: !verdict.significant,
            reason: verdict.status_reason().to_string(),
            correction_note: data
                .correction
                .filter(|_| frequentist && !kind.is_guardrail())
                .map(|policy| {
                    format!(
                        "Note that p-values have been corrected using the {} method.",
                        policy
                    )
                }),
        });

        let change = ChangeLine {
            arrow: verdict.arrow(&data.metric),
            lift: format_lift(stats.expected()),
            plus_minus: frequentist.then(|| format_plus_minus(stats.expected(), stats.ci_low())),
            emphasized,
            dimmed,
        };

        let interval = ValueLine {
            label: if frequentist {
                "95% Confidence Interval:"
            } else {
                "95% Credible Interval:"
            },
            lines: vec![format!(
                "[{}, {}]",
                format_percent(stats.ci_low()),
                format_percent(stats.ci_high())
            )],
            emphasized,
            dimmed,
        };

        let chance = if frequentist {
            ValueLine {
                label: "P-Value:",
                lines: p_value_lines(&stats, verdict),
                emphasized,
                dimmed,
            }
        } else {
            ValueLine {
                label: "Chance to Win:",
                lines: vec![format_percent(stats.chance_to_win())],
                emphasized,
                dimmed,
            }
        };

        let table = vec![
            table_row(
                data.baseline_row,
                &data.baseline_name,
                &baseline,
                data.metric.metric_type,
                formatter,
            ),
            table_row(
                data.variation_row,
                &data.variation_name,
                &stats,
                data.metric.metric_type,
                formatter,
            ),
        ];

        TooltipContent {
            guardrail: kind.is_guardrail(),
            metric_name: data.metric.name.clone(),
            metric_type: data.metric.metric_type,
            inverse_hint: data
                .metric
                .inverse
                .then_some("metric is inverse, lower is better"),
            arrow: ArrowPosition::new(data.layout_x, data.y_align),
            variation_row: data.variation_row,
            variation_name: data.variation_name.clone(),
            status_badge,
            change,
            interval,
            chance,
            warnings: aggregate_flags(verdict, &data.metric, kind),
            table,
        }
    }

    /// Plain-text rendering used by the CLI
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        if self.guardrail {
            out.push_str("GUARDRAIL\n");
        }
        let _ = write!(out, "{} ({})", self.metric_name, self.metric_type);
        if let Some(hint) = self.inverse_hint {
            let _ = write!(out, " [{}]", hint);
        }
        out.push('\n');
        let _ = writeln!(out, "Variation {}: {}", self.variation_row, self.variation_name);

        if let Some(badge) = &self.status_badge {
            let _ = writeln!(out, "Status: {}", badge.label);
            if !badge.reason.is_empty() {
                let _ = writeln!(out, "  {}", badge.reason);
            }
            if let Some(note) = &badge.correction_note {
                let _ = writeln!(out, "  {}", note);
            }
        }

        let _ = write!(out, "% Change: {} {}", self.change.arrow.glyph(), self.change.lift);
        if let Some(pm) = &self.change.plus_minus {
            let _ = write!(out, " {}", pm);
        }
        out.push('\n');

        for line in [&self.interval, &self.chance] {
            let _ = writeln!(out, "{} {}", line.label, line.lines.join(" "));
        }

        for warning in self.warnings.iter() {
            let _ = writeln!(out, "! {}: {}", warning.label(), warning.reason());
        }

        let _ = writeln!(out, "{:<20} {:>8} {:>12} {:>14}", "Variation", "Users", "Value", "Total");
        for row in &self.table {
            let _ = writeln!(
                out,
                "{:<20} {:>8} {:>12} {:>14}",
                format!("{} {}", row.row, row.name),
                row.users,
                row.value,
                row.total
            );
        }

        out
    }
}

fn p_value_lines(stats: &StatRecord, verdict: &RowVerdict) -> Vec<String> {
    let raw = stats.p_value.map(format_p_value).unwrap_or_default();
    match (verdict.correction, stats.p_value_adjusted) {
        (Some(_), Some(adjusted)) => vec![format_p_value(adjusted), format!("(unadj.: {})", raw)],
        _ => vec![raw],
    }
}

fn table_row(
    row: usize,
    name: &str,
    stats: &StatRecord,
    metric_type: MetricType,
    formatter: &dyn ValueFormatter,
) -> TableRow {
    let per_user = if stats.users > 0 {
        formatter.format_value(metric_type, stats.value / stats.users as f64)
    } else {
        String::new()
    };
    // Totals of a conversion metric are a count of conversions
    let total_type = match metric_type {
        MetricType::Binomial => MetricType::Count,
        other => other,
    };

    TableRow {
        row,
        name: name.to_string(),
        users: format_compact(stats.users),
        value: per_user,
        total: formatter.format_value(total_type, stats.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, ClassifyRequest};
    use crate::display::PlainValueFormatter;
    use crate::stat_record::RowKind;

    fn data(engine: StatsEngine, correction: Option<CorrectionPolicy>, stats: StatRecord) -> TooltipData {
        let metric = MetricDescriptor::new("checkout", "Checkout rate", MetricType::Binomial);
        let baseline = StatRecord {
            users: 4200,
            value: 630.0,
            ..Default::default()
        };
        let verdict = classify(
            &ClassifyRequest::new(&metric, &baseline, &stats, engine).with_correction(correction),
        );
        TooltipData {
            metric,
            variation_row: 1,
            variation_name: "Treatment".to_string(),
            stats,
            baseline_row: 0,
            baseline_name: "Control".to_string(),
            baseline,
            verdict,
            correction,
            layout_x: LayoutX::ElementCenter,
            y_align: VerticalAlign::Top,
        }
    }

    fn treatment() -> StatRecord {
        StatRecord {
            expected: Some(0.10),
            ci: Some([0.02, 0.18]),
            p_value: Some(0.03),
            users: 4100,
            value: 680.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_frequentist_win_content() {
        let content = TooltipContent::build(
            &data(StatsEngine::Frequentist, None, treatment()),
            &PlainValueFormatter::default(),
        );

        let badge = content.status_badge.as_ref().unwrap();
        assert_eq!(badge.label, "Won");
        assert!(badge.correction_note.is_none());
        assert_eq!(content.change.arrow, Arrow::Up);
        assert_eq!(content.change.lift, "10%");
        assert_eq!(content.change.plus_minus.as_deref(), Some("±8%"));
        assert!(content.change.emphasized);
        assert_eq!(content.interval.label, "95% Confidence Interval:");
        assert_eq!(content.interval.lines, vec!["[2%, 18%]".to_string()]);
        assert_eq!(content.chance.label, "P-Value:");
        assert_eq!(content.chance.lines, vec!["0.030".to_string()]);
        assert_eq!(content.table[0].users, "4.2K");
        assert_eq!(content.table[1].total, "680");
    }

    #[test]
    fn test_corrected_p_value_lines() {
        let stats = StatRecord {
            p_value_adjusted: Some(0.08),
            ..treatment()
        };
        let content = TooltipContent::build(
            &data(StatsEngine::Frequentist, Some(CorrectionPolicy::BenjaminiHochberg), stats),
            &PlainValueFormatter::default(),
        );

        let badge = content.status_badge.as_ref().unwrap();
        assert_eq!(badge.label, "Not significant");
        assert!(badge.non_significant);
        assert_eq!(
            badge.correction_note.as_deref(),
            Some("Note that p-values have been corrected using the benjamini-hochberg method.")
        );
        assert_eq!(
            content.chance.lines,
            vec!["0.080".to_string(), "(unadj.: 0.030)".to_string()]
        );
        assert!(!content.change.emphasized);
    }

    #[test]
    fn test_bayesian_content() {
        let stats = StatRecord {
            chance_to_win: Some(0.97),
            ..treatment()
        };
        let content = TooltipContent::build(
            &data(StatsEngine::Bayesian, None, stats),
            &PlainValueFormatter::default(),
        );

        assert_eq!(content.chance.label, "Chance to Win:");
        assert_eq!(content.chance.lines, vec!["97%".to_string()]);
        assert_eq!(content.interval.label, "95% Credible Interval:");
        assert_eq!(content.interval.lines, vec!["[2%, 18%]".to_string()]);
        assert!(content.change.plus_minus.is_none());
    }

    #[test]
    fn test_text_rendering_mentions_key_lines() {
        let content = TooltipContent::build(
            &data(StatsEngine::Frequentist, None, treatment()),
            &PlainValueFormatter::default(),
        );
        let text = content.to_text();
        assert!(text.contains("Checkout rate (binomial)"));
        assert!(text.contains("Status: Won"));
        assert!(text.contains("% Change: ↑ 10% ±8%"));
        assert!(text.contains("P-Value: 0.030"));
    }

    #[test]
    fn test_repaired_record_is_shown_consistently() {
        // Inverted interval and a p-value outside [0, 1] as delivered upstream
        let stats = StatRecord {
            expected: Some(0.05),
            ci: Some([0.2, -0.1]),
            p_value: Some(1.7),
            ..treatment()
        };
        let content = TooltipContent::build(
            &data(StatsEngine::Frequentist, None, stats),
            &PlainValueFormatter::default(),
        );

        assert_eq!(content.interval.lines, vec!["[-10%, 20%]".to_string()]);
        assert_eq!(content.chance.lines, vec!["1.000".to_string()]);
        assert_eq!(content.change.plus_minus.as_deref(), Some("±15%"));
        let badge = content.status_badge.as_ref().unwrap();
        assert!(badge.reason.contains("(1.000)"));
    }

    #[test]
    fn test_arrow_position_follows_layout() {
        let mut input = data(StatsEngine::Frequentist, None, treatment());
        input.layout_x = LayoutX::ElementLeft;
        input.y_align = VerticalAlign::Bottom;

        let content = TooltipContent::build(&input, &PlainValueFormatter::default());
        assert_eq!(content.arrow.edge, VerticalAlign::Bottom);
        assert_eq!(content.arrow.offset_percent, 97.0);
    }

    #[test]
    fn test_guardrail_reads_kind_from_verdict() {
        let metric = MetricDescriptor::new("errors", "Errors", MetricType::Count).inverted();
        let baseline = StatRecord {
            users: 4200,
            value: 630.0,
            ..Default::default()
        };
        let stats = StatRecord {
            p_value_adjusted: Some(0.2),
            ..treatment()
        };
        let verdict = classify(
            &ClassifyRequest::new(&metric, &baseline, &stats, StatsEngine::Frequentist)
                .with_correction(Some(CorrectionPolicy::HolmBonferroni))
                .with_kind(RowKind::Guardrail),
        );
        let input = TooltipData {
            metric,
            variation_row: 1,
            variation_name: "Treatment".to_string(),
            stats,
            baseline_row: 0,
            baseline_name: "Control".to_string(),
            baseline,
            verdict,
            correction: Some(CorrectionPolicy::HolmBonferroni),
            layout_x: LayoutX::ElementCenter,
            y_align: VerticalAlign::Top,
        };

        let content = TooltipContent::build(&input, &PlainValueFormatter::default());
        assert!(content.guardrail);
        assert!(content.change.emphasized);
        let badge = content.status_badge.as_ref().unwrap();
        assert!(badge.correction_note.is_none());
        // Guardrails show the raw p-value only
        assert_eq!(content.chance.lines, vec!["0.030".to_string()]);
    }
}
