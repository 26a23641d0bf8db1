//! Class-imbalance analysis for tabular datasets.
//!
//! ```text
//!   data::loader ──► analysis::analyze ──┬──► chart (bar + pie PNG)
//!                                        └──► report (JSON / text) · ui (desktop viewer)
//! ```

pub mod analysis;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod logging;
pub mod report;
