//! planvision - financial planning toolkit for an advisory practice.
//!
//! The library provides:
//! - Five deterministic time-value-of-money calculators (SIP, loan EMI,
//!   retirement corpus, SWP, education cost), each returning a headline
//!   figure plus a yearly schedule
//! - Risk-appetite questionnaire scoring
//! - An in-memory client ledger with segmentation filters, aggregate
//!   metrics, and CSV export
//! - An HTTP API and embedded web UI wrapping all of the above

pub mod api;
pub mod core;
