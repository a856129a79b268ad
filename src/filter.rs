//! Scheme-name based filtering of the catalog
//!
//! Every predicate is a case-insensitive substring match on the scheme name.
//! Category and type choices are matched against the name too, not against
//! `scheme_category`/`scheme_type`: the list view never fetches details, so
//! those fields are empty there. See `core::catalog::filter_by_scheme_category`
//! for the structured variant used on enriched funds.

use crate::core::Fund;
use std::fmt::Display;
use std::str::FromStr;

pub const ALL: &str = "All";

/// Category choices offered by the filter sheet.
pub const CATEGORIES: [&str; 3] = [ALL, "Equity", "Debt"];
/// Plan type choices offered by the filter sheet.
pub const TYPES: [&str; 3] = [ALL, "Growth", "Dividend"];

/// A single facet selection. `All` disables the predicate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Facet {
    #[default]
    All,
    Only(String),
}

impl Facet {
    fn needle(&self) -> Option<String> {
        match self {
            Facet::All => None,
            Facet::Only(value) => Some(value.to_lowercase()),
        }
    }
}

impl FromStr for Facet {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == ALL {
            Facet::All
        } else {
            Facet::Only(s.to_string())
        })
    }
}

impl From<&str> for Facet {
    fn from(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Facet::All => write!(f, "{ALL}"),
            Facet::Only(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FundFilter {
    pub search: String,
    pub amc: Facet,
    pub category: Facet,
    pub fund_type: Facet,
}

impl FundFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    pub fn amc(mut self, amc: impl Into<Facet>) -> Self {
        self.amc = amc.into();
        self
    }

    pub fn category(mut self, category: impl Into<Facet>) -> Self {
        self.category = category.into();
        self
    }

    pub fn fund_type(mut self, fund_type: impl Into<Facet>) -> Self {
        self.fund_type = fund_type.into();
        self
    }

    /// Puts every facet back to `All`. The search text is kept.
    pub fn reset(&mut self) {
        self.amc = Facet::All;
        self.category = Facet::All;
        self.fund_type = Facet::All;
    }

    pub fn matches(&self, fund: &Fund) -> bool {
        let name = fund.scheme_name.to_lowercase();
        let search = self.search.to_lowercase();
        (search.is_empty() || name.contains(&search))
            && [&self.amc, &self.category, &self.fund_type]
                .into_iter()
                .filter_map(Facet::needle)
                .all(|needle| name.contains(&needle))
    }

    /// The matching funds in their original order.
    pub fn apply(&self, funds: &[Fund]) -> Vec<Fund> {
        funds.iter().filter(|f| self.matches(f)).cloned().collect()
    }
}
