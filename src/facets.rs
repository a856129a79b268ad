//! AMC facet derivation from scheme names
//!
//! The catalog list carries no fund house, so AMC labels are guessed from the
//! leading words of the scheme name. Two groupings are offered: the filter
//! facet uses the first two words ("Aditya Birla", "HDFC Equity"), the AMC
//! listing uses the first word only ("Aditya", "HDFC"). They are separate
//! views and are not expected to agree.

use crate::core::Fund;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmcHeuristic {
    /// First two whitespace-separated tokens, used by the filter facet.
    #[default]
    FirstTwoWords,
    /// First token only, used by the AMC listing.
    FirstWord,
}

impl AmcHeuristic {
    fn token_count(self) -> usize {
        match self {
            AmcHeuristic::FirstTwoWords => 2,
            AmcHeuristic::FirstWord => 1,
        }
    }

    /// The label for one scheme name, or `None` when the name has no tokens.
    /// Names shorter than the heuristic use whatever tokens exist.
    pub fn label(self, scheme_name: &str) -> Option<String> {
        let tokens: Vec<&str> = scheme_name
            .split_whitespace()
            .take(self.token_count())
            .collect();
        if tokens.is_empty() {
            None
        } else {
            Some(tokens.join(" "))
        }
    }
}

/// Deduplicated AMC labels in byte-wise ascending order. Case is preserved,
/// so "HDFC" and "Hdfc" are distinct labels.
pub fn derive_amcs(funds: &[Fund], heuristic: AmcHeuristic) -> Vec<String> {
    funds
        .iter()
        .filter_map(|f| heuristic.label(&f.scheme_name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
