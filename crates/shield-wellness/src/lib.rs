//! SHIELD wellness service library.
//!
//! Computes a composite wellness score and a biological-age offset from a
//! nightly measurement set, raises per-metric alerts, and enriches those
//! alerts with suggestions from an OpenAI-compatible completion service.
//! A lab-report boundary extracts biomarker panels from uploaded PDFs.

pub mod advice;
pub mod config;
pub mod error;
pub mod labs;
pub mod scoring;
pub mod telemetry;
