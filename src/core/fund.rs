//! Fund records and NAV history

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Stable numeric identifier of a scheme.
pub type SchemeCode = u64;

/// A mutual fund scheme as listed by the catalog.
///
/// Identity is the scheme code alone: two `Fund` values with the same code
/// compare equal and hash the same even if one of them carries enrichment
/// fields from a detail fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    pub scheme_code: SchemeCode,
    pub scheme_name: String,
    pub isin_growth: Option<String>,
    pub isin_div_reinvestment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund_house: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_category: Option<String>,
}

impl Fund {
    pub fn new(scheme_code: SchemeCode, scheme_name: impl Into<String>) -> Self {
        Self {
            scheme_code,
            scheme_name: scheme_name.into(),
            isin_growth: None,
            isin_div_reinvestment: None,
            fund_house: None,
            scheme_type: None,
            scheme_category: None,
        }
    }

    pub fn with_isins(mut self, growth: Option<&str>, div_reinvestment: Option<&str>) -> Self {
        self.isin_growth = growth.map(str::to_string);
        self.isin_div_reinvestment = div_reinvestment.map(str::to_string);
        self
    }

    /// True once a detail fetch has filled in the structured fields.
    pub fn is_enriched(&self) -> bool {
        self.fund_house.is_some() || self.scheme_type.is_some() || self.scheme_category.is_some()
    }
}

impl PartialEq for Fund {
    fn eq(&self, other: &Self) -> bool {
        self.scheme_code == other.scheme_code
    }
}

impl Eq for Fund {}

impl Hash for Fund {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.scheme_code.hash(state);
    }
}

/// One point of a fund's NAV history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavSample {
    pub date: NaiveDate,
    pub nav: f64,
}

/// A fund together with the metadata and NAV series of the detail endpoint.
#[derive(Debug, Clone)]
pub struct FundDetail {
    pub fund: Fund,
    /// Ascending by date, one sample per date.
    pub nav_history: Vec<NavSample>,
    pub status: String,
}

impl FundDetail {
    pub fn latest(&self) -> Option<&NavSample> {
        self.nav_history.last()
    }

    /// The most recent `count` samples, oldest first.
    pub fn recent(&self, count: usize) -> &[NavSample] {
        let start = self.nav_history.len().saturating_sub(count);
        &self.nav_history[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fund_identity_is_scheme_code() {
        let plain = Fund::new(100, "HDFC Equity Fund");
        let mut enriched = Fund::new(100, "HDFC Equity Fund - Growth");
        enriched.fund_house = Some("HDFC Mutual Fund".to_string());

        assert_eq!(plain, enriched);
        assert!(enriched.is_enriched());
        assert!(!plain.is_enriched());

        let set: HashSet<Fund> = [plain, enriched, Fund::new(101, "ICICI Debt Fund")]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_catalog_record_deserialization() {
        let json = r#"{"schemeCode": 119551, "schemeName": "Aditya Birla Sun Life Banking & PSU Debt Fund", "isinGrowth": "INF209KA12Z1", "isinDivReinvestment": null}"#;
        let fund: Fund = serde_json::from_str(json).unwrap();

        assert_eq!(fund.scheme_code, 119551);
        assert_eq!(fund.isin_growth.as_deref(), Some("INF209KA12Z1"));
        assert!(fund.isin_div_reinvestment.is_none());
        assert!(!fund.is_enriched());
    }

    #[test]
    fn test_recent_samples() {
        let day = |d| NaiveDate::from_ymd_opt(2025, 8, d).unwrap();
        let detail = FundDetail {
            fund: Fund::new(1, "Test Fund"),
            nav_history: vec![
                NavSample { date: day(1), nav: 10.0 },
                NavSample { date: day(2), nav: 11.0 },
                NavSample { date: day(3), nav: 12.0 },
            ],
            status: "SUCCESS".to_string(),
        };

        assert_eq!(detail.latest().map(|s| s.nav), Some(12.0));
        assert_eq!(detail.recent(2).len(), 2);
        assert_eq!(detail.recent(2)[0].date, day(2));
        assert_eq!(detail.recent(10).len(), 3);
    }
}
