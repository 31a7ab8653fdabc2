pub mod analysis;
pub mod metrics;
pub mod normalizer;
pub mod prompt;

pub use analysis::{analyze_company, AnalysisReport};
pub use metrics::MetricExtractor;
pub use normalizer::{coerce_amount, normalize, parse_amount, FieldCoercionFault};
pub use prompt::build_analysis_prompt;
