//! abverdict - A/B test result classification and results-view plumbing
//!
//! This library turns already-computed experiment statistics into display
//! verdicts (won, lost, draw, inconclusive), aggregates the warning flags a
//! results row shows, lays out the results tooltip against the viewport and
//! keeps the snapshot state of a results view consistent under rapid
//! phase/dimension changes.

pub mod classify;
pub mod cli;
pub mod config;
pub mod display;
pub mod flags;
pub mod report;
pub mod snapshot;
pub mod stat_record;
pub mod tooltip;
