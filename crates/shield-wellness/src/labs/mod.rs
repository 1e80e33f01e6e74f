//! Lab report intake: PDF text-layer extraction, biomarker pattern
//! matching, and the upload endpoint.

pub mod domain;
mod extractor;
mod patterns;
pub mod router;
pub mod service;

pub use domain::{BiomarkerReading, LabReport, ReferenceStatus};
pub use extractor::{ExtractedReport, ExtractionError, LabReportExtractor, TextLayerExtractor};
pub use router::lab_router;
pub use service::LabReportService;
