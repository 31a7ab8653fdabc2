use crate::error::{DartError, DartResult};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// First business year the registry serves statement data for.
pub const FIRST_DISCLOSURE_YEAR: i32 = 2015;

/// Reporting period granularity (`reprt_code`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportCode {
    #[serde(rename = "11013")]
    FirstQuarter,
    #[serde(rename = "11012")]
    HalfYear,
    #[serde(rename = "11014")]
    ThirdQuarter,
    #[serde(rename = "11011")]
    Annual,
}

impl ReportCode {
    pub const ALL: [ReportCode; 4] = [
        ReportCode::FirstQuarter,
        ReportCode::HalfYear,
        ReportCode::ThirdQuarter,
        ReportCode::Annual,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ReportCode::FirstQuarter => "11013",
            ReportCode::HalfYear => "11012",
            ReportCode::ThirdQuarter => "11014",
            ReportCode::Annual => "11011",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportCode::FirstQuarter => "1분기보고서",
            ReportCode::HalfYear => "반기보고서",
            ReportCode::ThirdQuarter => "3분기보고서",
            ReportCode::Annual => "사업보고서",
        }
    }
}

impl Default for ReportCode {
    fn default() -> Self {
        ReportCode::Annual
    }
}

impl fmt::Display for ReportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ReportCode {
    type Err = DartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportCode::ALL
            .into_iter()
            .find(|r| r.code() == s.trim())
            .ok_or_else(|| DartError::InvalidRequest(format!("Unknown report code: {}", s)))
    }
}

/// Years with statement data, oldest first.
pub fn available_years(current_year: i32) -> Vec<i32> {
    (FIRST_DISCLOSURE_YEAR..=current_year).collect()
}

/// A validated statement query: `{corp_code, year, report_code}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatementRequest {
    pub corp_code: String,
    pub year: i32,
    pub report_code: ReportCode,
}

impl StatementRequest {
    pub fn new(corp_code: &str, year: i32, report_code: ReportCode) -> DartResult<Self> {
        Self::validated(corp_code, year, report_code, Utc::now().year())
    }

    /// Same as [`StatementRequest::new`] with an explicit upper bound for the year.
    pub fn validated(
        corp_code: &str,
        year: i32,
        report_code: ReportCode,
        current_year: i32,
    ) -> DartResult<Self> {
        let corp_code = corp_code.trim();
        if corp_code.len() != 8 || !corp_code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DartError::InvalidRequest(format!(
                "corp_code must be 8 digits, got '{}'",
                corp_code
            )));
        }

        if year < FIRST_DISCLOSURE_YEAR || year > current_year {
            return Err(DartError::InvalidRequest(format!(
                "year must be between {} and {}, got {}",
                FIRST_DISCLOSURE_YEAR, current_year, year
            )));
        }

        Ok(Self {
            corp_code: corp_code.to_string(),
            year,
            report_code,
        })
    }
}
