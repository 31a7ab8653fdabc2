use crate::metrics::MetricExtractor;
use crate::prompt::build_analysis_prompt;
use dart_core::{CanonicalStatement, DartResult, KeyMetrics, NarrativeGenerator};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Narrative analysis of one company's statement, with the metrics it was based on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub company_name: String,
    pub analysis: String,
    pub key_metrics: KeyMetrics,
}

/// Extract metrics, build the prompt and make a single generator call.
/// Generator failures are returned as-is.
pub async fn analyze_company(
    generator: &dyn NarrativeGenerator,
    company_name: &str,
    statement: &CanonicalStatement,
) -> DartResult<AnalysisReport> {
    let key_metrics = MetricExtractor::new().extract(&statement.financial_statements);
    let prompt = build_analysis_prompt(company_name, &key_metrics)?;

    info!(
        "Requesting analysis of {} from {} ({} ratios)",
        company_name,
        generator.backend_name(),
        key_metrics.ratios.len()
    );

    let analysis = generator.generate(&prompt).await.map_err(|e| {
        warn!("Analysis of {} failed: {}", company_name, e);
        e
    })?;

    Ok(AnalysisReport {
        company_name: company_name.to_string(),
        analysis,
        key_metrics,
    })
}
