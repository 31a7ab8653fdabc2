use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Currency assumed when the source omits one.
pub const DEFAULT_CURRENCY: &str = "KRW";

/// Separate vs. consolidated statement (`fs_div`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsType {
    Separate,
    Consolidated,
}

impl FsType {
    /// `CFS` is consolidated; `OFS` and anything unrecognised is separate.
    pub fn from_code(code: &str) -> Self {
        if code.trim().eq_ignore_ascii_case("CFS") {
            FsType::Consolidated
        } else {
            FsType::Separate
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FsType::Separate => "OFS",
            FsType::Consolidated => "CFS",
        }
    }
}

/// Which statement a line item belongs to (`sj_div`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementType {
    BalanceSheet,
    IncomeStatement,
    Other,
}

impl StatementType {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "BS" => StatementType::BalanceSheet,
            "IS" => StatementType::IncomeStatement,
            _ => StatementType::Other,
        }
    }
}

/// One canonical financial-statement line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub account_name: String,
    pub fs_type: FsType,
    pub statement_type: StatementType,
    pub current_amount: Decimal,
    pub current_accumulated: Decimal,
    pub previous_amount: Decimal,
    pub previous_accumulated: Decimal,
    pub currency: String,
}

/// Company metadata carried on the first line item of a statement response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub stock_code: String,
    pub report_date: String,
    pub report_type: String,
}

/// The three statement buckets. All are always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatements {
    pub balance_sheet: Vec<StatementLine>,
    pub income_statement: Vec<StatementLine>,
    pub other: Vec<StatementLine>,
}

impl FinancialStatements {
    pub fn push(&mut self, line: StatementLine) {
        match line.statement_type {
            StatementType::BalanceSheet => self.balance_sheet.push(line),
            StatementType::IncomeStatement => self.income_statement.push(line),
            StatementType::Other => self.other.push(line),
        }
    }

    pub fn len(&self) -> usize {
        self.balance_sheet.len() + self.income_statement.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Headline current-period figures; zero when the line was not found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementSummary {
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub total_equity: Decimal,
    pub revenue: Decimal,
    pub net_income: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalStatement {
    pub company_info: CompanyInfo,
    pub financial_statements: FinancialStatements,
    pub summary: StatementSummary,
}

/// Canonical names for extracted balance-sheet and income-statement items
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    TotalAssets,
    TotalLiabilities,
    TotalEquity,
    CurrentAssets,
    CurrentLiabilities,
    Revenue,
    OperatingIncome,
    NetIncome,
    GrossProfit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioName {
    DebtToEquityRatio,
    EquityRatio,
    CurrentRatio,
    Roe,
    RevenueGrowthRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPair {
    pub current: Decimal,
    pub previous: Decimal,
}

/// Metrics derived from one canonical statement.
///
/// A ratio key is present only when every input line was resolved and the
/// denominator was non-zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub balance_sheet: BTreeMap<MetricName, MetricPair>,
    pub income_statement: BTreeMap<MetricName, MetricPair>,
    pub ratios: BTreeMap<RatioName, Decimal>,
}

impl KeyMetrics {
    pub fn metric(&self, name: MetricName) -> Option<&MetricPair> {
        self.balance_sheet
            .get(&name)
            .or_else(|| self.income_statement.get(&name))
    }

    pub fn ratio(&self, name: RatioName) -> Option<Decimal> {
        self.ratios.get(&name).copied()
    }
}

// ---------------------------------------------------------------------------
// Wire shape of the registry's statement endpoint. Every field is optional and
// string fields tolerate numbers or null.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStatementResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub list: Vec<RawLineItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLineItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub account_nm: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fs_div: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sj_div: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub thstrm_amount: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub thstrm_add_amount: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub frmtrm_amount: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub frmtrm_add_amount: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub stock_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub thstrm_dt: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reprt_code: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<RawLineItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<RawLineItem>>::deserialize(deserializer)?.unwrap_or_default())
}
