use std::sync::Arc;

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::advice::{AdviceLimits, CompletionRequest, SuggestionProvider, FALLBACK_SUGGESTION};

use super::domain::LabReport;
use super::extractor::{ExtractedReport, ExtractionError, LabReportExtractor};

const RECEIPT_MESSAGE: &str = "File received securely. Biomarker extraction complete.";

/// Turns an uploaded lab report into structured biomarker readings plus
/// an optional model-written summary. The summary call is bounded by the
/// per-call timeout and never fails the analysis.
pub struct LabReportService<X, P> {
    extractor: Arc<X>,
    advice: Option<Arc<P>>,
    limits: AdviceLimits,
}

impl<X, P> LabReportService<X, P>
where
    X: LabReportExtractor,
    P: SuggestionProvider,
{
    pub fn new(extractor: Arc<X>, advice: Option<Arc<P>>, limits: AdviceLimits) -> Self {
        Self {
            extractor,
            advice,
            limits,
        }
    }

    pub async fn analyze(
        &self,
        filename: String,
        bytes: &[u8],
    ) -> Result<LabReport, ExtractionError> {
        let extracted = self.extractor.extract(bytes)?;
        debug!(
            filename = %filename,
            biomarkers = extracted.biomarkers.len(),
            "lab report text extracted"
        );

        let suggestions = match &self.advice {
            Some(provider) => Some(self.summarize(provider.as_ref(), &extracted).await),
            None => None,
        };

        Ok(LabReport {
            filename,
            biomarkers: extracted.biomarkers,
            suggestions,
            message: RECEIPT_MESSAGE.to_string(),
        })
    }

    async fn summarize(&self, provider: &P, extracted: &ExtractedReport) -> String {
        let request = CompletionRequest::summary(summary_prompt(extracted));
        match timeout(self.limits.call_timeout, provider.complete(request)).await {
            Ok(Ok(summary)) => summary,
            Ok(Err(error)) => {
                warn!(%error, "lab summary call failed; using fallback");
                FALLBACK_SUGGESTION.to_string()
            }
            Err(_) => {
                warn!(timeout = ?self.limits.call_timeout, "lab summary call timed out; using fallback");
                FALLBACK_SUGGESTION.to_string()
            }
        }
    }
}

fn summary_prompt(extracted: &ExtractedReport) -> String {
    let readings = serde_json::to_string(&extracted.biomarkers).unwrap_or_default();
    format!(
        "Given the following lab report text and extracted values, summarize the key findings, \
         highlight any out-of-range or borderline values, and provide actionable suggestions \
         for the patient.\n\nLab Report Text:\n{}\n\nExtracted Values:\n{}\n\nSummary and Suggestions:",
        extracted.text, readings
    )
}
