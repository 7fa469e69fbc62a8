//! Language size types
//!
//! A [`LanguageBreakdown`] belongs to one repository; [`AggregatedLanguages`]
//! is the ranked merge over all of a user's repositories.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Bytes of code per language for a single repository, in upstream order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageBreakdown(pub IndexMap<String, u64>);

impl LanguageBreakdown {
    pub fn new(languages: IndexMap<String, u64>) -> Self {
        Self(languages)
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for LanguageBreakdown {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(language, bytes)| (language.into(), bytes))
                .collect(),
        )
    }
}

/// One row of the aggregated ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedLanguage {
    /// 1-based rank
    pub number: usize,
    pub language: String,
    pub size_in_bytes: u64,
}

/// Languages ranked by total bytes, largest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregatedLanguages(pub Vec<RankedLanguage>);

impl AggregatedLanguages {
    /// Ranks accumulated totals. Entries must be in first-encountered order;
    /// the sort is stable so that order breaks ties.
    pub fn from_totals(totals: IndexMap<String, u64>) -> Self {
        let mut entries: Vec<(String, u64)> = totals.into_iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));

        Self(
            entries
                .into_iter()
                .enumerate()
                .map(|(index, (language, size_in_bytes))| RankedLanguage {
                    number: index + 1,
                    language,
                    size_in_bytes,
                })
                .collect(),
        )
    }
}
