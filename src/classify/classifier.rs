// Result classification
//
// Turns a baseline record and a comparison record into a RowVerdict. The
// function is pure: identical requests always produce identical verdicts, so
// callers may memoize on (metric, variation, snapshot ids, engine,
// correction, row kind).

use crate::classify::signals::RowSignals;
use crate::classify::significance::{self, Significance, SIGNIFICANCE_THRESHOLD};
use crate::classify::verdict::{DirectionalStatus, ResultsStatus, RowVerdict};
use crate::config::ClassifierConfig;
use crate::display::{format_lift, format_p_value, format_percent};
use crate::stat_record::{CorrectionPolicy, MetricDescriptor, RowKind, StatRecord, StatsEngine};

/// Everything needed to classify one metric/variation row
#[derive(Debug, Clone, Copy)]
pub struct ClassifyRequest<'a> {
    pub metric: &'a MetricDescriptor,
    pub baseline: &'a StatRecord,
    pub variation: &'a StatRecord,
    pub engine: StatsEngine,
    pub correction: Option<CorrectionPolicy>,
    pub kind: RowKind,
    pub signals: Option<&'a RowSignals>,
}

impl<'a> ClassifyRequest<'a> {
    pub fn new(
        metric: &'a MetricDescriptor,
        baseline: &'a StatRecord,
        variation: &'a StatRecord,
        engine: StatsEngine,
    ) -> Self {
        Self {
            metric,
            baseline,
            variation,
            engine,
            correction: None,
            kind: RowKind::Standard,
            signals: None,
        }
    }

    pub fn with_correction(mut self, correction: Option<CorrectionPolicy>) -> Self {
        self.correction = correction;
        self
    }

    pub fn with_kind(mut self, kind: RowKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_signals(mut self, signals: &'a RowSignals) -> Self {
        self.signals = Some(signals);
        self
    }
}

/// Classifier bound to a configuration
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one row
    ///
    /// # Example
    /// ```
    /// use abverdict::classify::{ClassifyRequest, Classifier, ResultsStatus};
    /// use abverdict::stat_record::{MetricDescriptor, MetricType, StatRecord, StatsEngine};
    ///
    /// let metric = MetricDescriptor::new("signup", "Signups", MetricType::Binomial);
    /// let baseline = StatRecord { users: 1000, ..Default::default() };
    /// let variation = StatRecord {
    ///     expected: Some(0.10),
    ///     ci: Some([0.02, 0.18]),
    ///     p_value: Some(0.03),
    ///     users: 1000,
    ///     ..Default::default()
    /// };
    ///
    /// let request = ClassifyRequest::new(&metric, &baseline, &variation, StatsEngine::Frequentist);
    /// let verdict = Classifier::default().classify(&request);
    /// assert!(verdict.significant);
    /// assert_eq!(verdict.results_status, ResultsStatus::Won);
    /// ```
    pub fn classify(&self, request: &ClassifyRequest<'_>) -> RowVerdict {
        let baseline = request.baseline.normalized();
        let stats = request.variation.normalized();
        let signals = request.signals.cloned().unwrap_or_default();

        let significance = match request.engine {
            StatsEngine::Frequentist => {
                significance::frequentist(&stats, request.correction, request.kind)
            }
            StatsEngine::Bayesian => {
                significance::bayesian(&stats, self.config.chance_to_win_threshold)
            }
        };

        let expected = stats.expected();
        let directional_status = DirectionalStatus::from_lift(expected, request.metric.inverse);
        let enough_data = self.has_enough_data(&baseline, &stats, signals.elapsed_days);

        let results_status = if !enough_data || !significance.significant {
            ResultsStatus::Inconclusive
        } else if expected == 0.0 || expected.abs() < self.config.negligible_effect {
            ResultsStatus::Draw
        } else {
            match directional_status {
                DirectionalStatus::Winning => ResultsStatus::Won,
                DirectionalStatus::Losing => ResultsStatus::Lost,
            }
        };

        tracing::trace!(
            metric = %request.metric.id,
            engine = %request.engine,
            kind = ?request.kind,
            significant = significance.significant,
            enough_data,
            status = %results_status,
            "classified row"
        );

        RowVerdict {
            results_status,
            directional_status,
            significant: significance.significant,
            significant_unadjusted: significance.significant_unadjusted,
            enough_data,
            results_reason: self.results_reason(request.engine, results_status, &significance),
            significant_reason: self.significant_reason(request.engine, &stats, &significance),
            enough_data_reason: signals.enough_data_meta.reason.clone(),
            engine: request.engine,
            kind: request.kind,
            correction: significance.applied_correction,
            operative_p_value: significance.operative_p_value,
            risk_meta: signals.risk_meta,
            suspicious_change: signals.suspicious_change,
            suspicious_change_reason: signals.suspicious_change_reason,
            guardrail_warning: signals.guardrail_warning,
            enough_data_meta: signals.enough_data_meta,
        }
    }

    fn has_enough_data(
        &self,
        baseline: &StatRecord,
        stats: &StatRecord,
        elapsed_days: Option<f64>,
    ) -> bool {
        if baseline.users.min(stats.users) < self.config.min_users {
            return false;
        }
        match (self.config.min_duration_days, elapsed_days) {
            (Some(min_days), Some(elapsed)) => elapsed >= min_days,
            // Duration required but unknown: treat as still collecting
            (Some(_), None) => false,
            (None, _) => true,
        }
    }

    fn results_reason(
        &self,
        engine: StatsEngine,
        status: ResultsStatus,
        significance: &Significance,
    ) -> String {
        let evidence = match engine {
            StatsEngine::Frequentist => format!(
                "the {}p-value is below {}",
                if significance.applied_correction.is_some() {
                    "adjusted "
                } else {
                    ""
                },
                SIGNIFICANCE_THRESHOLD
            ),
            StatsEngine::Bayesian => format!(
                "the chance to win is outside the {} to {} band",
                format_percent(1.0 - self.config.chance_to_win_threshold),
                format_percent(self.config.chance_to_win_threshold)
            ),
        };

        match status {
            ResultsStatus::Won => format!(
                "Significant win as {} and the change is in the desired direction.",
                evidence
            ),
            ResultsStatus::Lost => format!(
                "Significant loss as {} and the change is in the undesired direction.",
                evidence
            ),
            ResultsStatus::Draw => format!(
                "The change is significant, but smaller than {} in either direction.",
                format_lift(self.config.negligible_effect.max(0.0))
            ),
            ResultsStatus::Inconclusive if significance.significant => {
                "The change is significant, but there is not enough data yet to call a result."
                    .to_string()
            }
            ResultsStatus::Inconclusive => String::new(),
        }
    }

    fn significant_reason(
        &self,
        engine: StatsEngine,
        stats: &StatRecord,
        significance: &Significance,
    ) -> String {
        if significance.significant {
            return String::new();
        }

        match engine {
            StatsEngine::Frequentist => match significance.operative_p_value {
                Some(p) => format!(
                    "This metric is not statistically significant. The {}p-value ({}) is greater than the threshold ({}).",
                    if significance.applied_correction.is_some() {
                        "adjusted "
                    } else {
                        ""
                    },
                    format_p_value(p),
                    SIGNIFICANCE_THRESHOLD
                ),
                None => "This metric is not statistically significant. No p-value is available yet."
                    .to_string(),
            },
            StatsEngine::Bayesian => match stats.chance_to_win {
                Some(ctw) => format!(
                    "This metric is not statistically significant. The chance to win ({}) is between {} and {}.",
                    format_percent(ctw),
                    format_percent(1.0 - self.config.chance_to_win_threshold),
                    format_percent(self.config.chance_to_win_threshold)
                ),
                None => "This metric is not statistically significant. No chance to win is available yet."
                    .to_string(),
            },
        }
    }
}

/// Classify with the default configuration
pub fn classify(request: &ClassifyRequest<'_>) -> RowVerdict {
    Classifier::default().classify(request)
}
