//! Reductions from fan-out results to the three listing views
//!
//! All functions are pure and run after a batch has fully joined, so input
//! order is always the canonical page-then-repository order.

use indexmap::IndexMap;

use crate::types::{AggregatedLanguages, LanguageBreakdown, RepositorySummary};

/// Concatenates pages in page order, then in per-page record order
pub fn repositories_view(pages: Vec<Vec<RepositorySummary>>) -> Vec<RepositorySummary> {
    pages.into_iter().flatten().collect()
}

/// Sums bytes per language across breakdowns and ranks the totals.
///
/// The first breakdown mentioning a language fixes its place among equal totals.
pub fn languages_view(breakdowns: Vec<LanguageBreakdown>) -> AggregatedLanguages {
    let mut totals: IndexMap<String, u64> = IndexMap::new();
    for breakdown in breakdowns {
        for (language, bytes) in breakdown.0 {
            let total = totals.entry(language).or_insert(0);
            *total = total.saturating_add(bytes);
        }
    }
    AggregatedLanguages::from_totals(totals)
}

/// Total stargazers over every repository on every page
pub fn stars_view(pages: &[Vec<RepositorySummary>]) -> u64 {
    pages
        .iter()
        .flatten()
        .fold(0u64, |sum, repository| {
            sum.saturating_add(repository.stargazers_count)
        })
}

/// Repository names in page order, then record order
pub fn repository_names(pages: &[Vec<RepositorySummary>]) -> Vec<String> {
    pages
        .iter()
        .flatten()
        .map(|repository| repository.name.clone())
        .collect()
}
