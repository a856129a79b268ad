//! Loaded catalog, derived facets and load status
//!
//! Only the most recent `refresh` may update the view: each call takes a new
//! generation number and a response that arrives after a newer call started
//! is dropped.

use crate::core::{CatalogError, Fund, FundCatalog, SchemeCode};
use crate::facets::{AmcHeuristic, derive_amcs};
use crate::filter::FundFilter;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Result of a refresh that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// The catalog was replaced; carries the fund count.
    Applied(usize),
    /// A newer refresh started while this one was in flight.
    Superseded,
}

#[derive(Default)]
struct CatalogState {
    funds: Vec<Fund>,
    amcs: Vec<String>,
    status: LoadStatus,
}

pub struct CatalogView {
    catalog: Arc<dyn FundCatalog>,
    state: RwLock<CatalogState>,
    generation: AtomicU64,
}

impl CatalogView {
    pub fn new(catalog: Arc<dyn FundCatalog>) -> Self {
        Self {
            catalog,
            state: RwLock::new(CatalogState::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn refresh(&self) -> Result<Refresh, CatalogError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.status = LoadStatus::Loading;

        let result = self.catalog.fetch_catalog().await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding catalog response from superseded request {generation}");
            return Ok(Refresh::Superseded);
        }

        match result {
            Ok(funds) => {
                let count = funds.len();
                state.amcs = derive_amcs(&funds, AmcHeuristic::FirstTwoWords);
                state.funds = funds;
                state.status = LoadStatus::Loaded;
                info!("Loaded {} funds with {} AMC labels", count, state.amcs.len());
                Ok(Refresh::Applied(count))
            }
            Err(e) => {
                warn!("Catalog load failed: {}", e);
                state.status = LoadStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn status(&self) -> LoadStatus {
        self.state.read().await.status.clone()
    }

    pub async fn funds(&self) -> Vec<Fund> {
        self.state.read().await.funds.clone()
    }

    /// Filter facet labels (first two words), recomputed on every load.
    pub async fn amcs(&self) -> Vec<String> {
        self.state.read().await.amcs.clone()
    }

    /// The first-word AMC grouping used by the AMC listing.
    pub async fn amc_listing(&self) -> Vec<String> {
        derive_amcs(&self.state.read().await.funds, AmcHeuristic::FirstWord)
    }

    pub async fn filtered(&self, filter: &FundFilter) -> Vec<Fund> {
        filter.apply(&self.state.read().await.funds)
    }

    pub async fn find(&self, scheme_code: SchemeCode) -> Option<Fund> {
        self.state
            .read()
            .await
            .funds
            .iter()
            .find(|f| f.scheme_code == scheme_code)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FundDetail;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Serves scripted catalog responses; the first call is slow.
    struct ScriptedCatalog {
        responses: Vec<Result<Vec<Fund>, String>>,
        calls: AtomicUsize,
        first_delay: Duration,
    }

    impl ScriptedCatalog {
        fn new(responses: Vec<Result<Vec<Fund>, String>>, first_delay: Duration) -> Self {
            Self {
                responses,
                calls: AtomicUsize::new(0),
                first_delay,
            }
        }
    }

    #[async_trait]
    impl FundCatalog for ScriptedCatalog {
        async fn fetch_catalog(&self) -> Result<Vec<Fund>, CatalogError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                tokio::time::sleep(self.first_delay).await;
            }
            self.responses[call].clone().map_err(|reason| CatalogError::Network {
                url: "test".to_string(),
                reason,
            })
        }

        async fn fetch_detail(&self, scheme_code: SchemeCode) -> Result<FundDetail, CatalogError> {
            Err(CatalogError::Network {
                url: format!("test/{scheme_code}"),
                reason: "not scripted".to_string(),
            })
        }
    }

    fn funds(names: &[(SchemeCode, &str)]) -> Vec<Fund> {
        names.iter().map(|(c, n)| Fund::new(*c, *n)).collect()
    }

    #[tokio::test]
    async fn test_refresh_loads_funds_and_facets() {
        let catalog = ScriptedCatalog::new(
            vec![Ok(funds(&[
                (100, "HDFC Equity Fund"),
                (101, "ICICI Debt Fund"),
                (102, "HDFC Liquid Fund"),
            ]))],
            Duration::ZERO,
        );
        let view = CatalogView::new(Arc::new(catalog));
        assert_eq!(view.status().await, LoadStatus::Idle);

        assert_eq!(view.refresh().await.unwrap(), Refresh::Applied(3));

        assert_eq!(view.status().await, LoadStatus::Loaded);
        assert_eq!(
            view.amcs().await,
            vec!["HDFC Equity", "HDFC Liquid", "ICICI Debt"]
        );
        assert_eq!(view.amc_listing().await, vec!["HDFC", "ICICI"]);
        assert_eq!(
            view.filtered(&FundFilter::new().category("Equity"))
                .await
                .len(),
            1
        );
        assert_eq!(view.find(101).await.unwrap().scheme_name, "ICICI Debt Fund");
        assert!(view.find(999).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_sets_status() {
        let catalog = ScriptedCatalog::new(vec![Err("offline".to_string())], Duration::ZERO);
        let view = CatalogView::new(Arc::new(catalog));

        let err = view.refresh().await.unwrap_err();

        assert!(err.to_string().contains("offline"));
        assert!(matches!(view.status().await, LoadStatus::Failed(msg) if msg.contains("offline")));
        assert!(view.funds().await.is_empty());
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let catalog = ScriptedCatalog::new(
            vec![
                Ok(funds(&[(1, "Stale Fund")])),
                Ok(funds(&[(2, "Fresh Fund"), (3, "Fresh Two")])),
            ],
            Duration::from_millis(50),
        );
        let view = CatalogView::new(Arc::new(catalog));

        let (first, second) = tokio::join!(view.refresh(), view.refresh());

        assert_eq!(first.unwrap(), Refresh::Superseded);
        assert_eq!(second.unwrap(), Refresh::Applied(2));
        let codes: Vec<_> = view.funds().await.iter().map(|f| f.scheme_code).collect();
        assert_eq!(codes, vec![2, 3]);
    }
}
