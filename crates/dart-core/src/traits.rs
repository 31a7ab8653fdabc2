use async_trait::async_trait;
use crate::{DartResult, RawStatementResponse, StatementRequest};

/// Source of raw statement responses (the registry's statement endpoint)
#[async_trait]
pub trait StatementSource: Send + Sync {
    async fn fetch_statement(&self, request: &StatementRequest) -> DartResult<RawStatementResponse>;
}

/// Text generator used for narrative analysis. One call, no retry.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> DartResult<String>;

    fn backend_name(&self) -> &'static str;
}
