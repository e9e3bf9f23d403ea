//! # Top-K Label Reporter
//!
//! Turns a model's probability vector into an ordered list of
//! `(label, score)` pairs. Everything in here is pure: no I/O, no state.

pub mod types;
pub mod topk;

pub use types::{Prediction, ReportError, ScoredIndex};
pub use topk::{format_line, report, report_batch, softmax, top_k};
