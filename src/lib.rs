pub mod catalog_view;
pub mod cli;
pub mod comparison;
pub mod core;
pub mod facets;
pub mod filter;
pub mod profile;
pub mod providers;
pub mod store;

use crate::catalog_view::CatalogView;
use crate::core::config::AppConfig;
use crate::core::{FundCatalog, SchemeCode};
use crate::filter::FundFilter;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Funds {
        filter: FundFilter,
        limit: Option<usize>,
    },
    Amcs {
        first_word: bool,
    },
    Detail {
        scheme_code: SchemeCode,
        days: usize,
    },
    Compare {
        scheme_codes: Vec<SchemeCode>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("mfx starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let catalog: Arc<dyn FundCatalog> =
        Arc::new(providers::MfApiCatalog::new(config.mfapi_base_url()));

    match command {
        AppCommand::Funds { filter, limit } => {
            let view = CatalogView::new(catalog);
            cli::funds::run(&view, &filter, limit).await
        }
        AppCommand::Amcs { first_word } => {
            let view = CatalogView::new(catalog);
            cli::amcs::run(&view, first_word).await
        }
        AppCommand::Detail { scheme_code, days } => {
            cli::detail::run(catalog.as_ref(), scheme_code, days).await
        }
        AppCommand::Compare { scheme_codes } => {
            cli::compare::run(catalog.as_ref(), &scheme_codes).await
        }
    }
}
