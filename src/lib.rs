//! # imtag
//!
//! Ranks classifier output into labelled top-k reports, serves a small HTTP
//! classification endpoint and tags images zero-shot by mapping predictions
//! into word vector space.

pub mod classifier;
pub mod config;
pub mod embedding;
pub mod knn;
pub mod labels;
pub mod report;
pub mod server;
pub mod store;
pub mod tagger;
