use crate::metrics::MetricExtractor;
use dart_core::{
    CanonicalStatement, CompanyInfo, DartError, DartResult, FinancialStatements, FsType,
    RawLineItem, RawStatementResponse, StatementLine, StatementType, DEFAULT_CURRENCY,
};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Status the registry uses for a successful response.
pub const STATUS_OK: &str = "000";

/// A single amount field that could not be read as a number.
/// Always resolved to zero by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCoercionFault {
    pub raw: String,
}

impl fmt::Display for FieldCoercionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot read '{}' as an amount", self.raw)
    }
}

/// Parse a reported amount: thousands separators stripped, blank is zero.
pub fn parse_amount(raw: &str) -> Result<Decimal, FieldCoercionFault> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| FieldCoercionFault {
            raw: raw.to_string(),
        })
}

/// Like [`parse_amount`], but an absent or unreadable value becomes zero.
pub fn coerce_amount(field: &str, raw: Option<&str>) -> Decimal {
    match raw.map(parse_amount) {
        None => Decimal::ZERO,
        Some(Ok(amount)) => amount,
        Some(Err(fault)) => {
            debug!("Field {}: {}; using 0", field, fault);
            Decimal::ZERO
        }
    }
}

/// Map a raw statement response into the canonical three-bucket structure.
///
/// A response with a non-success status is returned as `DartError::Source`
/// with the registry's message untouched; nothing is partially normalized.
/// A response without any status is treated as successful.
pub fn normalize(raw: &RawStatementResponse) -> DartResult<CanonicalStatement> {
    if let Some(status) = raw.status.as_deref() {
        if status.trim() != STATUS_OK {
            let message = raw.message.clone().unwrap_or_default();
            if status.trim() == dart_core::STATUS_NO_DATA {
                debug!("Statement source reported no data: {}", message);
            } else {
                warn!("Statement source returned status {}: {}", status, message);
            }
            return Err(DartError::source_error(status.trim(), message));
        }
    }

    let company_info = raw
        .list
        .first()
        .map(|item| CompanyInfo {
            stock_code: text(&item.stock_code),
            report_date: text(&item.thstrm_dt),
            report_type: text(&item.reprt_code),
        })
        .unwrap_or_default();

    let mut financial_statements = FinancialStatements::default();
    for item in &raw.list {
        financial_statements.push(to_line(item));
    }

    let summary = MetricExtractor::new().summarize(&financial_statements);
    debug!(
        "Normalized {} lines ({} BS, {} IS, {} other)",
        financial_statements.len(),
        financial_statements.balance_sheet.len(),
        financial_statements.income_statement.len(),
        financial_statements.other.len()
    );

    Ok(CanonicalStatement {
        company_info,
        financial_statements,
        summary,
    })
}

fn to_line(item: &RawLineItem) -> StatementLine {
    let currency = item
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CURRENCY);

    StatementLine {
        account_name: text(&item.account_nm),
        fs_type: FsType::from_code(item.fs_div.as_deref().unwrap_or_default()),
        statement_type: StatementType::from_code(item.sj_div.as_deref().unwrap_or_default()),
        current_amount: coerce_amount("thstrm_amount", item.thstrm_amount.as_deref()),
        current_accumulated: coerce_amount("thstrm_add_amount", item.thstrm_add_amount.as_deref()),
        previous_amount: coerce_amount("frmtrm_amount", item.frmtrm_amount.as_deref()),
        previous_accumulated: coerce_amount("frmtrm_add_amount", item.frmtrm_add_amount.as_deref()),
        currency: currency.to_string(),
    }
}

fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricExtractor;
    use dart_core::RatioName;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawStatementResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234,567"), Ok(dec!(1234567)));
        assert_eq!(parse_amount("-1,000"), Ok(dec!(-1000)));
        assert_eq!(parse_amount("12.5"), Ok(dec!(12.5)));
        assert_eq!(parse_amount(""), Ok(Decimal::ZERO));
        assert!(parse_amount("N/A").is_err());
    }

    #[test]
    fn test_coerce_amount_never_fails() {
        assert_eq!(coerce_amount("x", Some("1,234,567")), dec!(1234567));
        assert_eq!(coerce_amount("x", Some("")), Decimal::ZERO);
        assert_eq!(coerce_amount("x", Some("-")), Decimal::ZERO);
        assert_eq!(coerce_amount("x", Some("abc")), Decimal::ZERO);
        assert_eq!(coerce_amount("x", None), Decimal::ZERO);
    }

    #[test]
    fn test_error_status_is_propagated_verbatim() {
        let err = normalize(&raw(json!({
            "status": "013",
            "message": "조회된 데이타가 없습니다."
        })))
        .unwrap_err();

        assert_eq!(err, DartError::source_error("013", "조회된 데이타가 없습니다."));
        assert!(err.is_not_found());

        let err = normalize(&raw(json!({
            "status": "010",
            "message": "등록되지 않은 키입니다.",
            "list": [{ "account_nm": "자산총계", "sj_div": "BS" }]
        })))
        .unwrap_err();
        assert!(matches!(err, DartError::Source { ref message, .. } if message == "등록되지 않은 키입니다."));
    }

    #[test]
    fn test_end_to_end_revenue_growth() {
        let statement = normalize(&raw(json!({
            "status": "000",
            "message": "정상",
            "list": [
                {
                    "account_nm": "자산총계", "fs_div": "CFS", "sj_div": "BS",
                    "thstrm_amount": "1,000,000", "frmtrm_amount": "900,000",
                    "stock_code": "005930", "thstrm_dt": "2023.12.31 현재", "reprt_code": "11011"
                },
                {
                    "account_nm": "매출액", "fs_div": "CFS", "sj_div": "IS",
                    "thstrm_amount": "500,000", "frmtrm_amount": "400,000"
                }
            ]
        })))
        .unwrap();

        let fs = &statement.financial_statements;
        assert_eq!(fs.balance_sheet.len(), 1);
        assert_eq!(fs.income_statement.len(), 1);
        assert!(fs.other.is_empty());
        assert_eq!(fs.balance_sheet[0].current_amount, dec!(1000000));
        assert_eq!(fs.balance_sheet[0].fs_type, FsType::Consolidated);
        assert_eq!(fs.balance_sheet[0].currency, "KRW");

        assert_eq!(statement.company_info.stock_code, "005930");
        assert_eq!(statement.company_info.report_date, "2023.12.31 현재");
        assert_eq!(statement.company_info.report_type, "11011");
        assert_eq!(statement.summary.total_assets, dec!(1000000));
        assert_eq!(statement.summary.revenue, dec!(500000));

        let metrics = MetricExtractor::new().extract(fs);
        assert_eq!(metrics.ratio(RatioName::RevenueGrowthRate), Some(dec!(25)));
    }

    #[test]
    fn test_every_line_lands_in_exactly_one_bucket() {
        let statement = normalize(&raw(json!({
            "status": "000",
            "list": [
                { "account_nm": "자산총계", "sj_div": "BS" },
                { "account_nm": "매출액", "sj_div": "IS" },
                { "account_nm": "영업활동현금흐름", "sj_div": "CF" },
                { "account_nm": "자본변동", "sj_div": "SCE" },
                { "account_nm": "미분류" },
                { "sj_div": "BS", "thstrm_amount": "oops" }
            ]
        })))
        .unwrap();

        let fs = &statement.financial_statements;
        assert_eq!(fs.len(), 6);
        assert_eq!(fs.balance_sheet.len(), 2);
        assert_eq!(fs.income_statement.len(), 1);
        assert_eq!(fs.other.len(), 3);
        assert_eq!(fs.balance_sheet[1].account_name, "");
        assert_eq!(fs.balance_sheet[1].current_amount, Decimal::ZERO);
    }

    #[test]
    fn test_missing_status_and_empty_list() {
        let statement = normalize(&raw(json!({}))).unwrap();
        assert!(statement.financial_statements.is_empty());
        assert_eq!(statement.company_info, CompanyInfo::default());
        assert_eq!(statement.summary.total_assets, Decimal::ZERO);
    }

    #[test]
    fn test_explicit_currency_is_kept() {
        let statement = normalize(&raw(json!({
            "status": "000",
            "list": [{ "account_nm": "Revenue", "sj_div": "IS", "currency": "USD", "thstrm_amount": 10 }]
        })))
        .unwrap();

        let line = &statement.financial_statements.income_statement[0];
        assert_eq!(line.currency, "USD");
        assert_eq!(line.current_amount, dec!(10));
        assert_eq!(statement.summary.revenue, dec!(10));
    }
}
