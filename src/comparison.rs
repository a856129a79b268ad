//! Side-by-side comparison selection

use crate::core::{Fund, SchemeCode};
use tracing::debug;

pub const MAX_COMPARED: usize = 4;
pub const MIN_COMPARED: usize = 2;

/// What a call to [`ComparisonSelection::toggle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// The selection was already full; nothing changed.
    Rejected,
}

/// Funds picked for comparison during one browsing session. Never persisted
/// and unrelated to the profile's saved funds.
#[derive(Debug, Clone, Default)]
pub struct ComparisonSelection {
    active: bool,
    funds: Vec<Fund>,
}

impl ComparisonSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self) {
        self.active = true;
    }

    /// Leaves selection mode, dropping every selected fund.
    pub fn exit(&mut self) {
        self.active = false;
        self.funds.clear();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn toggle(&mut self, fund: &Fund) -> Toggle {
        if let Some(idx) = self
            .funds
            .iter()
            .position(|f| f.scheme_code == fund.scheme_code)
        {
            self.funds.remove(idx);
            return Toggle::Removed;
        }
        if self.funds.len() < MAX_COMPARED {
            self.funds.push(fund.clone());
            Toggle::Added
        } else {
            debug!("Comparison full, ignoring scheme {}", fund.scheme_code);
            Toggle::Rejected
        }
    }

    pub fn contains(&self, scheme_code: SchemeCode) -> bool {
        self.funds.iter().any(|f| f.scheme_code == scheme_code)
    }

    pub fn len(&self) -> usize {
        self.funds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funds.is_empty()
    }

    pub fn funds(&self) -> &[Fund] {
        &self.funds
    }

    pub fn can_compare(&self) -> bool {
        (MIN_COMPARED..=MAX_COMPARED).contains(&self.funds.len())
    }

    /// The selected funds, only when they form a valid comparison.
    pub fn comparison(&self) -> Option<&[Fund]> {
        self.can_compare().then_some(self.funds.as_slice())
    }
}
