use dart_core::{DartResult, KeyMetrics};

/// Build the Korean-language analysis prompt for the narrative generator.
///
/// The metrics are embedded as pretty-printed JSON, followed by the fixed
/// list of analysis angles and the expected answer layout.
pub fn build_analysis_prompt(company_name: &str, metrics: &KeyMetrics) -> DartResult<String> {
    let metrics_json = serde_json::to_string_pretty(metrics)?;

    Ok(format!(
        r#"재무제표 분석 전문가로서 {company_name}의 재무제표를 분석해주세요.

주요 재무 데이터:
{metrics_json}

다음 관점에서 분석해주세요:
1. 재무 건전성 (부채비율, 자기자본비율, 유동비율)
2. 수익성 (ROE, 매출액 증가율, 영업이익률)
3. 성장성 (전년 대비 주요 지표 변화)
4. 강점과 약점
5. 투자자 관점에서의 평가
6. 주의해야 할 리스크 요인

분석 결과를 다음 형식으로 작성해주세요:
- 전체적인 평가 (한 줄 요약)
- 상세 분석 (각 항목별 3-4줄)
- 투자 의견 및 주의사항

한국어로 작성하고, 전문적이면서도 이해하기 쉽게 설명해주세요.
"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dart_core::{MetricName, MetricPair, RatioName};
    use rust_decimal_macros::dec;

    #[test]
    fn test_prompt_embeds_company_and_metrics() {
        let mut metrics = KeyMetrics::default();
        metrics.income_statement.insert(
            MetricName::Revenue,
            MetricPair { current: dec!(500000), previous: dec!(400000) },
        );
        metrics.ratios.insert(RatioName::RevenueGrowthRate, dec!(25));

        let prompt = build_analysis_prompt("삼성전자", &metrics).unwrap();

        assert!(prompt.starts_with("재무제표 분석 전문가로서 삼성전자의 재무제표를 분석해주세요."));
        assert!(prompt.contains("\"revenue\""));
        assert!(prompt.contains("\"revenue_growth_rate\""));
        assert!(prompt.contains("6. 주의해야 할 리스크 요인"));
        assert!(prompt.trim_end().ends_with("전문적이면서도 이해하기 쉽게 설명해주세요."));
    }

    #[test]
    fn test_prompt_with_empty_metrics() {
        let prompt = build_analysis_prompt("다코", &KeyMetrics::default()).unwrap();
        assert!(prompt.contains("\"balance_sheet\": {}"));
        assert!(prompt.contains("\"ratios\": {}"));
    }
}
