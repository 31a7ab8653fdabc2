use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One registered corporation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CorpIdentity {
    pub corp_code: String,
    pub corp_name: String,
    pub corp_eng_name: String,
    /// Empty when the company is not listed
    pub stock_code: String,
    pub modify_date: String,
}

impl CorpIdentity {
    pub fn is_listed(&self) -> bool {
        !self.stock_code.trim().is_empty()
    }
}

/// Flat field-name -> text mapping for one entity element of the bulk feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryRecord {
    fields: BTreeMap<String, String>,
}

impl RegistryRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later values for the same field name replace earlier ones.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns `None` when the record has no usable `corp_code`.
    pub fn to_identity(&self) -> Option<CorpIdentity> {
        let corp_code = self.get("corp_code").map(str::trim).filter(|c| !c.is_empty())?;

        Some(CorpIdentity {
            corp_code: corp_code.to_string(),
            corp_name: self.text("corp_name"),
            corp_eng_name: self.text("corp_eng_name"),
            stock_code: self.text("stock_code"),
            modify_date: self.text("modify_date"),
        })
    }

    fn text(&self, name: &str) -> String {
        self.get(name).map(str::trim).unwrap_or_default().to_string()
    }
}

impl FromIterator<(String, String)> for RegistryRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Outcome of one ingestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub total: i64,
    pub listed: i64,
    pub unlisted: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> RegistryRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_to_identity_trims_fields() {
        let identity = record(&[
            ("corp_code", "00126380"),
            ("corp_name", "삼성전자"),
            ("corp_eng_name", "SAMSUNG ELECTRONICS CO,.LTD"),
            ("stock_code", " 005930 "),
            ("modify_date", "20231211"),
        ])
        .to_identity()
        .unwrap();

        assert_eq!(identity.stock_code, "005930");
        assert!(identity.is_listed());
    }

    #[test]
    fn test_missing_optional_fields_default_to_empty() {
        let identity = record(&[("corp_code", "00434003"), ("corp_name", "다코")])
            .to_identity()
            .unwrap();

        assert_eq!(identity.corp_eng_name, "");
        assert_eq!(identity.stock_code, "");
        assert!(!identity.is_listed());
    }

    #[test]
    fn test_blank_corp_code_has_no_identity() {
        assert!(record(&[("corp_code", "  "), ("corp_name", "x")]).to_identity().is_none());
        assert!(record(&[("corp_name", "x")]).to_identity().is_none());
    }
}
