use crate::core::{CatalogError, Fund, FundCatalog, FundDetail, NavSample, SchemeCode};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

const NAV_DATE_FORMAT: &str = "%d-%m-%Y";

/// Client for the mfapi.in catalog (`/mf` and `/mf/{code}`).
pub struct MfApiCatalog {
    base_url: String,
    client: reqwest::Client,
}

impl MfApiCatalog {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mfx/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                debug!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        debug!("Requesting {}", url);

        let network = |reason: String| CatalogError::Network {
            url: url.to_string(),
            reason,
        };
        let decode = |reason: String| CatalogError::Decode {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(network(format!("unexpected status {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| network(format!("failed to read body: {e}")))?;

        // Check for empty responses before parsing
        if body.trim().is_empty() {
            return Err(decode("empty response body".to_string()));
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(error = ?e, url, "Failed to parse catalog response");
            decode(e.to_string())
        })
    }
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    meta: DetailMeta,
    #[serde(default)]
    data: Vec<RawNav>,
    status: String,
}

#[derive(Debug, Deserialize)]
struct DetailMeta {
    fund_house: String,
    scheme_type: String,
    scheme_category: String,
    scheme_code: SchemeCode,
    scheme_name: String,
    isin_growth: Option<String>,
    isin_div_reinvestment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawNav {
    date: String,
    nav: String,
}

impl From<DetailMeta> for Fund {
    fn from(meta: DetailMeta) -> Self {
        Fund {
            scheme_code: meta.scheme_code,
            scheme_name: meta.scheme_name,
            isin_growth: meta.isin_growth,
            isin_div_reinvestment: meta.isin_div_reinvestment,
            fund_house: Some(meta.fund_house),
            scheme_type: Some(meta.scheme_type),
            scheme_category: Some(meta.scheme_category),
        }
    }
}

/// Parses the raw NAV rows, skipping unparseable ones, sorted ascending by
/// date with one sample per date.
fn parse_nav_history(scheme_code: SchemeCode, rows: Vec<RawNav>) -> Vec<NavSample> {
    let mut samples: Vec<NavSample> = rows
        .into_iter()
        .filter_map(|row| {
            let date = NaiveDate::parse_from_str(row.date.trim(), NAV_DATE_FORMAT).ok();
            let nav = row.nav.trim().parse::<f64>().ok();
            match (date, nav) {
                (Some(date), Some(nav)) => Some(NavSample { date, nav }),
                _ => {
                    debug!(
                        "Skipping NAV row for scheme {}: date='{}' nav='{}'",
                        scheme_code, row.date, row.nav
                    );
                    None
                }
            }
        })
        .collect();

    samples.sort_by_key(|s| s.date);
    samples.dedup_by_key(|s| s.date);
    samples
}

#[async_trait]
impl FundCatalog for MfApiCatalog {
    async fn fetch_catalog(&self) -> Result<Vec<Fund>, CatalogError> {
        let url = format!("{}/mf", self.base_url);
        let funds: Vec<Fund> = self.fetch(&url).await?;
        debug!("Fetched {} funds", funds.len());
        Ok(funds)
    }

    async fn fetch_detail(&self, scheme_code: SchemeCode) -> Result<FundDetail, CatalogError> {
        let url = format!("{}/mf/{}", self.base_url, scheme_code);
        let response: DetailResponse = self.fetch(&url).await?;

        let fund = Fund::from(response.meta);
        let nav_history = parse_nav_history(fund.scheme_code, response.data);
        debug!(
            "Fetched detail for scheme {} with {} NAV samples",
            fund.scheme_code,
            nav_history.len()
        );

        Ok(FundDetail {
            fund,
            nav_history,
            status: response.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mfapi_mock_server(
        request_path: &str,
        mock_response: &str,
        status_code: u16,
    ) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(mock_response))
            .mount(&mock_server)
            .await;
        mock_server
    }

    const CATALOG_JSON: &str = r#"[
        {"schemeCode": 100, "schemeName": "HDFC Equity Fund", "isinGrowth": "INF179K01BB8", "isinDivReinvestment": null},
        {"schemeCode": 101, "schemeName": "ICICI Debt Fund", "isinGrowth": null, "isinDivReinvestment": null}
    ]"#;

    const DETAIL_JSON: &str = r#"{
        "meta": {
            "fund_house": "HDFC Mutual Fund",
            "scheme_type": "Open Ended Schemes",
            "scheme_category": "Equity Scheme - Flexi Cap Fund",
            "scheme_code": 100,
            "scheme_name": "HDFC Equity Fund",
            "isin_growth": "INF179K01BB8",
            "isin_div_reinvestment": null
        },
        "data": [
            {"date": "20-08-2025", "nav": "101.80000"},
            {"date": "01-08-2025", "nav": "102.50000"},
            {"date": "10-08-2025", "nav": "104.20000"},
            {"date": "bad-date", "nav": "1.0"},
            {"date": "11-08-2025", "nav": "N.A."}
        ],
        "status": "SUCCESS"
    }"#;

    #[tokio::test]
    async fn test_successful_catalog_fetch() {
        let mock_server = create_mfapi_mock_server("/mf", CATALOG_JSON, 200).await;
        let catalog = MfApiCatalog::new(&mock_server.uri());

        let funds = catalog.fetch_catalog().await.unwrap();

        assert_eq!(funds.len(), 2);
        assert_eq!(funds[0].scheme_code, 100);
        assert_eq!(funds[0].isin_growth.as_deref(), Some("INF179K01BB8"));
        assert_eq!(funds[1].scheme_name, "ICICI Debt Fund");
        assert!(funds.iter().all(|f| !f.is_enriched()));
    }

    #[tokio::test]
    async fn test_successful_detail_fetch() {
        let mock_server = create_mfapi_mock_server("/mf/100", DETAIL_JSON, 200).await;
        let catalog = MfApiCatalog::new(&mock_server.uri());

        let detail = catalog.fetch_detail(100).await.unwrap();

        assert_eq!(detail.status, "SUCCESS");
        assert_eq!(detail.fund.fund_house.as_deref(), Some("HDFC Mutual Fund"));
        assert_eq!(
            detail.fund.scheme_category.as_deref(),
            Some("Equity Scheme - Flexi Cap Fund")
        );
        assert_eq!(detail.nav_history.len(), 3);
        assert_eq!(
            detail.nav_history[0].date,
            NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()
        );
        assert!((detail.latest().unwrap().nav - 101.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_server_error_is_network_error() {
        let mock_server = create_mfapi_mock_server("/mf", "Server Error", 500).await;
        let catalog = MfApiCatalog::new(&mock_server.uri());

        let result = catalog.fetch_catalog().await;

        match result {
            Err(CatalogError::Network { reason, .. }) => assert!(reason.contains("500")),
            other => panic!("Expected network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_detail_is_decode_error() {
        let mock_server =
            create_mfapi_mock_server("/mf/100", r#"{ "not_meta": "abc" }"#, 200).await;
        let catalog = MfApiCatalog::new(&mock_server.uri());

        let result = catalog.fetch_detail(100).await;

        assert!(matches!(result, Err(CatalogError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_empty_body_is_decode_error() {
        let mock_server = create_mfapi_mock_server("/mf", "", 200).await;
        let catalog = MfApiCatalog::new(&mock_server.uri());

        let err = catalog.fetch_catalog().await.unwrap_err();

        assert!(matches!(err, CatalogError::Decode { .. }));
        assert!(err.to_string().contains("empty response body"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let catalog = MfApiCatalog::new("http://127.0.0.1:9");

        let result = catalog.fetch_catalog().await;

        assert!(matches!(result, Err(CatalogError::Network { .. })));
    }
}
