use dart_core::{
    FinancialStatements, KeyMetrics, MetricName, MetricPair, RatioName, StatementLine,
    StatementSummary,
};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;

/// Metric name paired with the account-label substrings that identify it.
type LabelTable = &'static [(MetricName, &'static [&'static str])];

// Order matters: a line is claimed by the first metric whose labels it contains.
const BALANCE_SHEET_LABELS: LabelTable = &[
    (MetricName::TotalAssets, &["자산총계", "자산 총계"]),
    (MetricName::TotalEquity, &["자본총계", "자본 총계"]),
    (MetricName::TotalLiabilities, &["부채총계", "부채 총계"]),
    (MetricName::CurrentAssets, &["유동자산"]),
    (MetricName::CurrentLiabilities, &["유동부채"]),
];

const INCOME_STATEMENT_LABELS: LabelTable = &[
    (MetricName::Revenue, &["매출액", "수익(매출액)"]),
    (MetricName::OperatingIncome, &["영업이익"]),
    (MetricName::NetIncome, &["당기순이익"]),
    (MetricName::GrossProfit, &["매출총이익"]),
];

const SUMMARY_BALANCE_LABELS: LabelTable = &[
    (MetricName::TotalAssets, &["자산총계", "Total Assets"]),
    (MetricName::TotalLiabilities, &["부채총계", "Total Liabilities"]),
    (MetricName::TotalEquity, &["자본총계", "Total Equity"]),
];

const SUMMARY_INCOME_LABELS: LabelTable = &[
    (MetricName::Revenue, &["매출액", "Revenue"]),
    (MetricName::NetIncome, &["당기순손익", "당기순이익", "Net Income"]),
];

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Resolves canonical metrics from account labels and derives ratios.
///
/// Matching is substring-based and first-occurrence-wins: once a metric is
/// resolved, later lines that would also qualify are ignored. Note that a
/// label such as `비유동자산` contains `유동자산`, so source ordering decides
/// which line is used.
pub struct MetricExtractor;

impl MetricExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, statements: &FinancialStatements) -> KeyMetrics {
        let balance_sheet = resolve(&statements.balance_sheet, BALANCE_SHEET_LABELS);
        let income_statement = resolve(&statements.income_statement, INCOME_STATEMENT_LABELS);
        let ratios = self.calculate_ratios(&balance_sheet, &income_statement);

        KeyMetrics {
            balance_sheet,
            income_statement,
            ratios,
        }
    }

    /// Headline current-period figures; unresolved lines stay zero.
    pub fn summarize(&self, statements: &FinancialStatements) -> StatementSummary {
        let bs = resolve(&statements.balance_sheet, SUMMARY_BALANCE_LABELS);
        let is = resolve(&statements.income_statement, SUMMARY_INCOME_LABELS);
        let current = |map: &BTreeMap<MetricName, MetricPair>, name: MetricName| {
            map.get(&name).map(|p| p.current).unwrap_or_default()
        };

        StatementSummary {
            total_assets: current(&bs, MetricName::TotalAssets),
            total_liabilities: current(&bs, MetricName::TotalLiabilities),
            total_equity: current(&bs, MetricName::TotalEquity),
            revenue: current(&is, MetricName::Revenue),
            net_income: current(&is, MetricName::NetIncome),
        }
    }

    fn calculate_ratios(
        &self,
        bs: &BTreeMap<MetricName, MetricPair>,
        is: &BTreeMap<MetricName, MetricPair>,
    ) -> BTreeMap<RatioName, Decimal> {
        let current =
            |map: &BTreeMap<MetricName, MetricPair>, name: MetricName| map.get(&name).map(|p| p.current);

        let total_assets = current(bs, MetricName::TotalAssets);
        let total_equity = current(bs, MetricName::TotalEquity);
        let total_liabilities = current(bs, MetricName::TotalLiabilities);
        let current_assets = current(bs, MetricName::CurrentAssets);
        let current_liabilities = current(bs, MetricName::CurrentLiabilities);
        let net_income = current(is, MetricName::NetIncome);

        let candidates = [
            (
                RatioName::DebtToEquityRatio,
                total_liabilities.zip(total_equity).and_then(|(l, e)| percentage(l, e)),
            ),
            (
                RatioName::EquityRatio,
                total_equity.zip(total_assets).and_then(|(e, a)| percentage(e, a)),
            ),
            (
                RatioName::CurrentRatio,
                current_assets
                    .zip(current_liabilities)
                    .and_then(|(a, l)| percentage(a, l)),
            ),
            (
                RatioName::Roe,
                net_income.zip(total_equity).and_then(|(n, e)| percentage(n, e)),
            ),
            (
                RatioName::RevenueGrowthRate,
                is.get(&MetricName::Revenue).and_then(|r| self.calculate_growth(r)),
            ),
        ];

        candidates
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect()
    }

    fn calculate_growth(&self, pair: &MetricPair) -> Option<Decimal> {
        let delta = pair.current.checked_sub(pair.previous)?;
        percentage(delta, pair.previous)
    }
}

impl Default for MetricExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// `numerator / denominator × 100`, two decimals, half away from zero.
/// `None` on a zero denominator or overflow.
fn percentage(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        return None;
    }
    let ratio = numerator.checked_div(denominator)?.checked_mul(HUNDRED)?;
    Some(ratio.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

fn resolve(lines: &[StatementLine], table: LabelTable) -> BTreeMap<MetricName, MetricPair> {
    let mut resolved = BTreeMap::new();

    for line in lines {
        let claimed = table
            .iter()
            .find(|(_, labels)| labels.iter().any(|l| line.account_name.contains(*l)));

        if let Some((name, _)) = claimed {
            resolved.entry(*name).or_insert(MetricPair {
                current: line.current_amount,
                previous: line.previous_amount,
            });
        }
    }

    resolved
}
