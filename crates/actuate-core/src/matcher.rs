//! First-match lookup of candidates in an [`AutomationIndex`].
//!
//! "Best" is defined by candidate priority, never by textual similarity:
//! the first candidate that hits any lookup wins.

use crate::index::AutomationIndex;
use std::collections::HashMap;
use tracing::debug;

/// Which lookup produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    ExactName,
    NormalizedName,
    ExactId,
    NormalizedId,
}

/// A candidate that matched an installed automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchHit<'a> {
    /// Canonical name of the matched automation.
    pub name: &'a str,
    /// Position of the matching candidate in the input list.
    pub position: usize,
    pub kind: MatchKind,
}

/// Lookup tables built once per index snapshot.
#[derive(Debug)]
pub struct Matcher<'a> {
    exact_name: HashMap<&'a str, &'a str>,
    normalized_name: HashMap<String, &'a str>,
    exact_id: HashMap<&'a str, &'a str>,
    normalized_id: HashMap<String, &'a str>,
}

/// Lowercased, trimmed form used for tolerant comparisons.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

impl<'a> Matcher<'a> {
    /// Build lookup maps. On collisions the earliest record wins.
    pub fn new(index: &'a AutomationIndex) -> Self {
        let mut matcher = Self {
            exact_name: HashMap::with_capacity(index.len()),
            normalized_name: HashMap::with_capacity(index.len()),
            exact_id: HashMap::new(),
            normalized_id: HashMap::new(),
        };

        for record in index {
            let name = record.name.as_str();
            matcher.exact_name.entry(name).or_insert(name);
            matcher.normalized_name.entry(normalize(name)).or_insert(name);

            if let Some(id) = record.id.as_deref().filter(|id| !id.is_empty()) {
                matcher.exact_id.entry(id).or_insert(name);
                matcher.normalized_id.entry(normalize(id)).or_insert(name);
            }
        }
        matcher
    }

    /// Look up a single candidate across all four maps.
    pub fn find(&self, candidate: &str) -> Option<(&'a str, MatchKind)> {
        if let Some(name) = self.exact_name.get(candidate).copied() {
            return Some((name, MatchKind::ExactName));
        }
        let normalized = normalize(candidate);
        if let Some(name) = self.normalized_name.get(&normalized).copied() {
            return Some((name, MatchKind::NormalizedName));
        }
        if let Some(name) = self.exact_id.get(candidate).copied() {
            return Some((name, MatchKind::ExactId));
        }
        if let Some(name) = self.normalized_id.get(&normalized).copied() {
            return Some((name, MatchKind::NormalizedId));
        }
        None
    }

    /// First candidate, in the given order, that names an installed automation.
    pub fn first_match<I, S>(&self, candidates: I) -> Option<MatchHit<'a>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        candidates
            .into_iter()
            .enumerate()
            .find_map(|(position, candidate)| {
                self.find(candidate.as_ref()).map(|(name, kind)| {
                    debug!(
                        candidate = candidate.as_ref(),
                        automation = name,
                        ?kind,
                        "Candidate matched"
                    );
                    MatchHit {
                        name,
                        position,
                        kind,
                    }
                })
            })
    }
}
