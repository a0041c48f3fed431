//! Display vocabulary for verdicts and statistics
//!
//! Percentages are shown with at most 2 fractional digits, lifts with 1,
//! user counts in compact notation. Currency formatting is the caller's
//! business and goes through [`ValueFormatter`].

use crate::stat_record::MetricType;

/// Format a fraction as a percentage with at most 2 fractional digits
///
/// ```
/// use abverdict::display::format_percent;
///
/// assert_eq!(format_percent(0.97), "97%");
/// assert_eq!(format_percent(-0.0525), "-5.25%");
/// ```
pub fn format_percent(fraction: f64) -> String {
    if !fraction.is_finite() {
        return String::new();
    }
    format!("{}%", group_thousands(&trim_fixed(fraction * 100.0, 2)))
}

/// Relative lift rounded to 1 fractional digit, without grouping
pub fn format_lift(expected: f64) -> String {
    if !expected.is_finite() {
        return String::new();
    }
    format!("{}%", trim_fixed(expected * 100.0, 1))
}

/// Half-width of the interval below the point estimate, e.g. `±4.1%`
pub fn format_plus_minus(expected: f64, ci_low: f64) -> String {
    format!("±{}", format_lift((expected - ci_low).abs()))
}

pub fn format_p_value(p_value: f64) -> String {
    if !p_value.is_finite() {
        return String::new();
    }
    if p_value < 0.001 {
        "<0.001".to_string()
    } else {
        format!("{:.3}", p_value)
    }
}

/// Compact notation with one fractional digit: `950`, `1.2K`, `3.4M`
pub fn format_compact(count: u64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    let value = count as f64;
    for (i, (scale, suffix)) in UNITS.iter().enumerate() {
        if value < *scale {
            continue;
        }
        let scaled = trim_fixed(value / scale, 1);
        // 999.96K rounds up to 1000K; promote to the next unit
        if scaled == "1000" && i > 0 {
            let (_, bigger) = UNITS[i - 1];
            return format!("1{}", bigger);
        }
        return format!("{}{}", scaled, suffix);
    }
    count.to_string()
}

/// Fixed-point rendering with trailing zeros removed (`12.50` -> `12.5`)
fn trim_fixed(value: f64, digits: usize) -> String {
    let fixed = format!("{:.*}", digits, value);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn group_thousands(number: &str) -> String {
    let (sign, rest) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Formats the absolute "Value"/"Total" columns of the variation table
pub trait ValueFormatter {
    fn format_value(&self, metric_type: MetricType, value: f64) -> String;
}

/// Minimal formatter used by the CLI
#[derive(Debug, Clone)]
pub struct PlainValueFormatter {
    pub currency: String,
}

impl Default for PlainValueFormatter {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
        }
    }
}

impl ValueFormatter for PlainValueFormatter {
    fn format_value(&self, metric_type: MetricType, value: f64) -> String {
        match metric_type {
            MetricType::Binomial => format_percent(value),
            MetricType::Count => group_thousands(&trim_fixed(value, 2)),
            MetricType::Duration => format!("{}s", trim_fixed(value, 1)),
            MetricType::Revenue => format!("{} {}", group_thousands(&format!("{:.2}", value)), self.currency),
        }
    }
}
