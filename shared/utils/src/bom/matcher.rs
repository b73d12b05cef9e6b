//! Fuzzy Matching Layer
//!
//! Resolves free-text colorway and component names from a comparison file
//! to keys a parsed document actually knows.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use bomfill_models::{strip_leading_zeros, ComponentEntry, ComponentIndex};

use crate::config::{ComponentAlias, MatchingConfig};

/// Strategy that produced a colorway match, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    CaseInsensitive,
    NumericPrefix,
    WordOverlap,
    NameFragment,
    SharedToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorwayMatch {
    pub key: String,
    pub strategy: MatchStrategy,
}

/// Layered colorway resolution; the first strategy with a hit wins.
#[derive(Debug, Clone)]
pub struct ColorwayMatcher {
    stop_words: HashSet<String>,
    null_sentinels: HashSet<String>,
    prefixes: HashSet<String>,
    numeric_prefix: Regex,
    min_shared_token_len: usize,
}

impl ColorwayMatcher {
    pub fn new(config: &MatchingConfig) -> Self {
        let lower = |words: &[String]| -> HashSet<String> {
            words.iter().map(|w| w.trim().to_lowercase()).filter(|w| !w.is_empty()).collect()
        };

        let mut prefixes: Vec<String> = lower(&config.colorway_prefixes).into_iter().collect();
        prefixes.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternatives: Vec<String> = prefixes.iter().map(|p| regex::escape(p)).collect();

        let pattern = if alternatives.is_empty() {
            r"^(\d+)".to_string()
        } else {
            format!(r"(?i)^(?:(?:{})\s*[-#:.]?\s*)?(\d+)", alternatives.join("|"))
        };
        // Escaped alternatives always form a valid pattern.
        let numeric_prefix = Regex::new(&pattern).unwrap_or_else(|_| Regex::new(r"^(\d+)").expect("valid regex"));

        Self {
            stop_words: lower(&config.stop_words),
            null_sentinels: lower(&config.null_sentinels),
            prefixes: prefixes.into_iter().collect(),
            numeric_prefix,
            min_shared_token_len: config.min_shared_token_len,
        }
    }

    /// Leading colorway number with zeros stripped: `"COL-464 Navy"` -> `"464"`.
    pub fn numeric_prefix(&self, text: &str) -> Option<String> {
        self.numeric_prefix
            .captures(text.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| strip_leading_zeros(m.as_str()).to_string())
    }

    /// Color words: lowercased alphanumeric tokens minus alias prefixes,
    /// stop words and pure numbers.
    fn color_words(&self, text: &str) -> HashSet<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
            .filter(|t| !self.prefixes.contains(*t) && !self.stop_words.contains(*t))
            .map(str::to_string)
            .collect()
    }

    fn raw_tokens(text: &str) -> HashSet<String> {
        text.to_lowercase()
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn is_null(&self, value: &str) -> bool {
        value.is_empty() || value.chars().count() < 2 || self.null_sentinels.contains(&value.to_lowercase())
    }

    /// Resolves `raw` to one of `candidates`.
    ///
    /// Empty, one-character and null-like inputs never match, nor does
    /// anything against an empty candidate list.
    pub fn match_colorway(&self, raw: &str, candidates: &[String]) -> Option<ColorwayMatch> {
        let value = raw.trim();
        if self.is_null(value) || candidates.is_empty() {
            return None;
        }

        let hit = self
            .exact(value, candidates)
            .or_else(|| self.case_insensitive(value, candidates))
            .or_else(|| self.by_numeric_prefix(value, candidates))
            .or_else(|| self.by_word_overlap(value, candidates))
            .or_else(|| self.by_name_fragment(value, candidates))
            .or_else(|| self.by_shared_token(value, candidates));

        if let Some(hit) = &hit {
            debug!(input = %value, key = %hit.key, strategy = ?hit.strategy, "Colorway matched");
        } else {
            debug!(input = %value, candidates = candidates.len(), "Colorway unresolved");
        }
        hit
    }

    /// Matched key only.
    pub fn normalize_colorway(&self, raw: &str, candidates: &[String]) -> Option<String> {
        self.match_colorway(raw, candidates).map(|m| m.key)
    }

    fn exact(&self, value: &str, candidates: &[String]) -> Option<ColorwayMatch> {
        candidates
            .iter()
            .find(|c| c.as_str() == value)
            .map(|c| hit(c, MatchStrategy::Exact))
    }

    fn case_insensitive(&self, value: &str, candidates: &[String]) -> Option<ColorwayMatch> {
        let lower = value.to_lowercase();
        candidates
            .iter()
            .find(|c| c.to_lowercase() == lower)
            .map(|c| hit(c, MatchStrategy::CaseInsensitive))
    }

    fn by_numeric_prefix(&self, value: &str, candidates: &[String]) -> Option<ColorwayMatch> {
        let wanted = self.numeric_prefix(value)?;
        candidates
            .iter()
            .find(|c| self.numeric_prefix(c).as_deref() == Some(wanted.as_str()))
            .map(|c| hit(c, MatchStrategy::NumericPrefix))
    }

    /// `|overlap| / |candidate words|`; ties keep the earlier candidate.
    fn by_word_overlap(&self, value: &str, candidates: &[String]) -> Option<ColorwayMatch> {
        let words = self.color_words(value);
        if words.is_empty() {
            return None;
        }

        let mut best: Option<(&String, f64)> = None;
        for candidate in candidates {
            let candidate_words = self.color_words(candidate);
            if candidate_words.is_empty() {
                continue;
            }
            let overlap = candidate_words.intersection(&words).count();
            let score = overlap as f64 / candidate_words.len() as f64;
            if score > 0.0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((candidate, score));
            }
        }

        best.map(|(c, _)| hit(c, MatchStrategy::WordOverlap))
    }

    fn by_name_fragment(&self, value: &str, candidates: &[String]) -> Option<ColorwayMatch> {
        let lower = value.to_lowercase();
        candidates
            .iter()
            .find(|c| {
                let fragment = match c.split_once('-') {
                    Some((_, name)) => name.trim().to_lowercase(),
                    None => c.trim().to_lowercase(),
                };
                !fragment.is_empty() && (lower.contains(&fragment) || fragment.contains(&lower))
            })
            .map(|c| hit(c, MatchStrategy::NameFragment))
    }

    fn by_shared_token(&self, value: &str, candidates: &[String]) -> Option<ColorwayMatch> {
        let tokens: HashSet<String> = Self::raw_tokens(value)
            .into_iter()
            .filter(|t| t.chars().count() >= self.min_shared_token_len)
            .collect();
        if tokens.is_empty() {
            return None;
        }

        candidates
            .iter()
            .find(|c| Self::raw_tokens(c).iter().any(|t| tokens.contains(t)))
            .map(|c| hit(c, MatchStrategy::SharedToken))
    }
}

fn hit(key: &str, strategy: MatchStrategy) -> ColorwayMatch {
    ColorwayMatch {
        key: key.to_string(),
        strategy,
    }
}

/// Alias-table resolution of component names.
#[derive(Debug, Clone)]
pub struct ComponentMatcher {
    aliases: Vec<ComponentAlias>,
}

impl ComponentMatcher {
    pub fn new(config: &MatchingConfig) -> Self {
        Self {
            aliases: config.component_aliases.clone(),
        }
    }

    /// Canonical name for `name`: an exact pass over every canonical name
    /// and alias, then a substring pass over aliases of three or more
    /// characters.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        let exact = self.aliases.iter().find(|entry| {
            entry.canonical.to_lowercase() == needle
                || entry.aliases.iter().any(|a| a.trim().to_lowercase() == needle)
        });
        if let Some(entry) = exact {
            return Some(entry.canonical.as_str());
        }

        self.aliases
            .iter()
            .find(|entry| {
                entry
                    .aliases
                    .iter()
                    .map(|a| a.trim().to_lowercase())
                    .filter(|a| a.chars().count() >= 3)
                    .any(|a| needle.contains(&a) || (needle.chars().count() >= 3 && a.contains(&needle)))
            })
            .map(|entry| entry.canonical.as_str())
    }

    /// Canonical name, or `name` unchanged when no alias applies.
    pub fn normalize_component(&self, name: &str) -> String {
        self.resolve(name)
            .map(str::to_string)
            .unwrap_or_else(|| name.to_string())
    }

    /// Finds `name` in a component index, directly or through aliases.
    pub fn find<'a>(&self, name: &str, index: &'a ComponentIndex) -> Option<&'a ComponentEntry> {
        if let Some(entry) = index.get(name) {
            return Some(entry);
        }

        let canonical = self.resolve(name)?;
        index.get(canonical).or_else(|| {
            index
                .components
                .iter()
                .find(|c| self.resolve(&c.name) == Some(canonical))
        })
    }
}
