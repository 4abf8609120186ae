//! Required-clause catalog.
//!
//! Maps each required clause category to its trigger keywords and the
//! matching strategy applied to them. Built once at startup and shared
//! immutably for the lifetime of the process.

use serde::Serialize;

/// Reference fuzzy threshold on the 0–100 partial-ratio scale.
/// Inherited from the legacy checker; untuned.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 70.0;

/// How a rule's keywords are matched against document text.
///
/// Exactly one strategy applies per rule — strategies are never mixed
/// inside a single category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Exact substring containment. Text and keywords are both
    /// lower-cased, so matching is case-insensitive.
    Substring,
    /// Partial-ratio similarity strictly above `threshold`, tolerant of
    /// minor wording variation.
    Fuzzy { threshold: f64 },
}

/// One required clause category and its trigger phrases.
#[derive(Debug, Clone, Serialize)]
pub struct ClauseRule {
    pub name: String,
    /// Trigger phrases, stored lower-cased.
    pub keywords: Vec<String>,
    pub strategy: MatchStrategy,
}

impl ClauseRule {
    pub fn substring(name: &str, keywords: &[&str]) -> ClauseRule {
        ClauseRule {
            name: name.to_lowercase(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            strategy: MatchStrategy::Substring,
        }
    }

    pub fn fuzzy(name: &str, keywords: &[&str], threshold: f64) -> ClauseRule {
        ClauseRule {
            name: name.to_lowercase(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            strategy: MatchStrategy::Fuzzy { threshold },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClauseCatalog {
    pub rules: Vec<ClauseRule>,
}

impl ClauseCatalog {
    pub fn new(rules: Vec<ClauseRule>) -> ClauseCatalog {
        ClauseCatalog { rules }
    }

    /// The clauses every contract must carry.
    ///
    /// All entries use substring matching. "governed by" is a trigger for
    /// the governing-law category so the common "governed by the laws of"
    /// phrasing counts as present.
    pub fn required_clauses() -> ClauseCatalog {
        ClauseCatalog::new(vec![
            ClauseRule::substring(
                "data privacy",
                &["data privacy", "data protection", "gdpr"],
            ),
            ClauseRule::substring(
                "termination",
                &["termination", "cancel", "end of contract"],
            ),
            ClauseRule::substring(
                "governing law",
                &["governing law", "jurisdiction", "legal authority", "governed by"],
            ),
            ClauseRule::substring(
                "payment terms",
                &["payment terms", "fees", "payment schedule"],
            ),
        ])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
