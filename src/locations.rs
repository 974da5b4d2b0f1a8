//! Master Location Resolver
//!
//! Maps free-text facility names to canonical facilities. Matching order:
//!
//! 1. Exact (normalised) canonical name
//! 2. Alias lookup
//! 3. Keyword containment: every keyword of an entry must appear; the entry
//!    matching the most keywords wins, so "thunder" + "drill" beats
//!    "thunder" alone
//! 4. Canonical name or alias contained in the text (longest wins)
//! 5. `Unknown` / `Unclassified`
//!
//! Built once per batch from the config table and shared read-only.

use std::collections::HashMap;

use crate::config::LocationConfig;
use crate::text;
use crate::types::{CanonicalLocation, FacilityType};

/// Which step of the matching order produced a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    Exact,
    Alias,
    Keywords,
    Containment,
    Unmatched,
}

#[derive(Debug, Clone)]
struct Entry {
    location: CanonicalLocation,
    keywords: Vec<String>,
    /// Normalised name plus aliases, for containment matching
    names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LocationResolver {
    entries: Vec<Entry>,
    by_name: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
    unknown: CanonicalLocation,
}

impl LocationResolver {
    pub fn new(table: &[LocationConfig]) -> Self {
        let mut entries = Vec::with_capacity(table.len());
        let mut by_name = HashMap::new();
        let mut by_alias = HashMap::new();

        for cfg in table {
            let idx = entries.len();
            let name = text::normalize(&cfg.name);
            if name.is_empty() {
                continue;
            }
            by_name.entry(name.clone()).or_insert(idx);

            let mut names = vec![name];
            for alias in &cfg.aliases {
                let a = text::normalize(alias);
                if a.is_empty() {
                    continue;
                }
                by_alias.entry(a.clone()).or_insert(idx);
                names.push(a);
            }

            entries.push(Entry {
                location: CanonicalLocation {
                    canonical_name: cfg.name.trim().to_string(),
                    facility_type: cfg.facility_type,
                    aliases: cfg.aliases.clone(),
                },
                keywords: cfg
                    .keywords
                    .iter()
                    .map(|k| text::normalize(k))
                    .filter(|k| !k.is_empty())
                    .collect(),
                names,
            });
        }

        Self {
            entries,
            by_name,
            by_alias,
            unknown: CanonicalLocation::unknown(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a name to its canonical facility.
    pub fn resolve(&self, name: &str) -> &CanonicalLocation {
        self.resolve_with_method(name).0
    }

    /// Resolve an optional name; `None` resolves to Unknown.
    pub fn resolve_opt(&self, name: Option<&str>) -> &CanonicalLocation {
        name.map(|n| self.resolve(n)).unwrap_or(&self.unknown)
    }

    pub fn resolve_with_method(&self, name: &str) -> (&CanonicalLocation, MatchMethod) {
        let norm = text::normalize(name);
        if norm.is_empty() {
            return (&self.unknown, MatchMethod::Unmatched);
        }

        if let Some(&i) = self.by_name.get(&norm) {
            return (&self.entries[i].location, MatchMethod::Exact);
        }
        if let Some(&i) = self.by_alias.get(&norm) {
            return (&self.entries[i].location, MatchMethod::Alias);
        }
        if let Some(i) = self.keyword_match(&norm) {
            return (&self.entries[i].location, MatchMethod::Keywords);
        }
        if let Some(i) = self.containment_match(&norm) {
            return (&self.entries[i].location, MatchMethod::Containment);
        }
        (&self.unknown, MatchMethod::Unmatched)
    }

    /// Facility lookup by canonical name
    pub fn get(&self, canonical_name: &str) -> Option<&CanonicalLocation> {
        self.by_name
            .get(&text::normalize(canonical_name))
            .map(|&i| &self.entries[i].location)
    }

    pub fn facility_type(&self, name: &str) -> FacilityType {
        self.resolve(name).facility_type
    }

    /// Entry whose keywords all appear, preferring more keywords, then more
    /// keyword characters, then table order.
    fn keyword_match(&self, norm: &str) -> Option<usize> {
        let mut best: Option<(usize, usize, usize)> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.keywords.is_empty()
                || !entry.keywords.iter().all(|k| text::contains_keyword(norm, k))
            {
                continue;
            }
            let count = entry.keywords.len();
            let chars: usize = entry.keywords.iter().map(String::len).sum();
            match best {
                Some((_, c, l)) if (count, chars) <= (c, l) => {}
                _ => best = Some((i, count, chars)),
            }
        }
        best.map(|(i, _, _)| i)
    }

    fn containment_match(&self, norm: &str) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            for n in &entry.names {
                if n.len() >= 4 && text::contains_keyword(norm, n) {
                    match best {
                        Some((_, len)) if n.len() <= len => {}
                        _ => best = Some((i, n.len())),
                    }
                }
            }
        }
        best.map(|(i, _)| i)
    }
}
