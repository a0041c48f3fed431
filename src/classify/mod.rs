// Result classification for experiment metric rows
//
// Turns the statistics the analysis engine already computed into a small set
// of categorical outcomes:
// - significance (frequentist p-value or bayesian chance to win)
// - direction (winning/losing, with inverse metrics flipping the sign)
// - data sufficiency (sample size and collection window)
// - results status (won/lost/draw/inconclusive)
//
// Nothing here computes statistics. Missing fields are tolerated and read as
// 0 or empty strings so experiments that are still collecting data classify
// as inconclusive instead of failing.

mod classifier;
mod signals;
mod significance;
mod verdict;

pub use classifier::{classify, ClassifyRequest, Classifier};
pub use signals::{EnoughDataMeta, RiskMeta, RiskStatus, RowSignals};
pub use significance::{Significance, SIGNIFICANCE_THRESHOLD};
pub use verdict::{Arrow, DirectionalStatus, ResultsStatus, RowVerdict};
