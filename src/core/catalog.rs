//! Fund catalog abstraction and structured-field helpers

use super::error::CatalogError;
use super::fund::{Fund, FundDetail, SchemeCode};
use async_trait::async_trait;

/// Read-only access to the remote fund catalog.
#[async_trait]
pub trait FundCatalog: Send + Sync {
    /// Every listed scheme, in the order the service returns them.
    async fn fetch_catalog(&self) -> Result<Vec<Fund>, CatalogError>;

    /// One scheme with its structured metadata and NAV history.
    async fn fetch_detail(&self, scheme_code: SchemeCode) -> Result<FundDetail, CatalogError>;
}

/// Funds whose `fund_house` contains `amc`, ignoring case.
///
/// Only meaningful on enriched funds; funds without a fund house never match.
pub fn filter_by_fund_house(funds: &[Fund], amc: &str) -> Vec<Fund> {
    let needle = amc.to_lowercase();
    funds
        .iter()
        .filter(|f| {
            f.fund_house
                .as_deref()
                .is_some_and(|house| house.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Funds whose `scheme_category` contains `category`, ignoring case.
pub fn filter_by_scheme_category(funds: &[Fund], category: &str) -> Vec<Fund> {
    let needle = category.to_lowercase();
    funds
        .iter()
        .filter(|f| {
            f.scheme_category
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enriched(code: SchemeCode, house: &str, category: &str) -> Fund {
        let mut fund = Fund::new(code, format!("Fund {code}"));
        fund.fund_house = Some(house.to_string());
        fund.scheme_category = Some(category.to_string());
        fund
    }

    #[test]
    fn test_structured_filters_ignore_unenriched_funds() {
        let funds = vec![
            enriched(1, "HDFC Mutual Fund", "Equity Scheme - Large Cap Fund"),
            Fund::new(2, "HDFC Liquid Fund"),
            enriched(3, "ICICI Prudential Mutual Fund", "Debt Scheme - Gilt Fund"),
        ];

        let by_house = filter_by_fund_house(&funds, "hdfc");
        assert_eq!(by_house.len(), 1);
        assert_eq!(by_house[0].scheme_code, 1);

        let by_category = filter_by_scheme_category(&funds, "DEBT");
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].scheme_code, 3);
    }
}
