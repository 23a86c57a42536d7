use std::collections::{HashMap, HashSet};

use crate::{
    bigram::{self, Bigram, Pair, WeightClass},
    entry::Entry,
    scorer::ScoringConfig,
    token,
};

/// Capped per-class occurrence counts for one pair within one entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub primary: u8,
    pub secondary: u8,
}

/// Per-entry matching data.
///
/// `counts` holds capped occurrence counts consumed by exact matches;
/// `distinct` holds the entry's pairs in first-occurrence order, each
/// with its best weight class, and is what soft matching scans.
#[derive(Debug, Clone, Default)]
pub struct Postings {
    counts: HashMap<Pair, ClassCounts>,
    distinct: Vec<(Pair, WeightClass)>,
}

impl Postings {
    pub(crate) fn from_bigrams(sequence: &[Bigram], cap: u8) -> Self {
        let mut counts: HashMap<Pair, ClassCounts> = HashMap::new();
        let mut distinct: Vec<(Pair, WeightClass)> = Vec::new();

        for bigram in sequence {
            let slot = counts.entry(bigram.pair.clone()).or_default();
            match bigram.class {
                WeightClass::Primary => {
                    if slot.primary < cap {
                        slot.primary += 1;
                    }
                }
                WeightClass::Secondary => {
                    if slot.secondary < cap {
                        slot.secondary += 1;
                    }
                }
            }

            // A pair seen in both classes is listed once, as primary.
            match distinct.iter_mut().find(|(p, _)| p == &bigram.pair) {
                None => distinct.push((bigram.pair.clone(), bigram.class)),
                Some((_, class)) => {
                    if bigram.class == WeightClass::Primary {
                        *class = WeightClass::Primary;
                    }
                }
            }
        }

        Self { counts, distinct }
    }

    /// Occurrence counts for a pair; zero counts for absent pairs.
    pub fn counts(&self, pair: &Pair) -> ClassCounts {
        self.counts.get(pair).copied().unwrap_or_default()
    }

    /// The entry's distinct pairs in first-occurrence order.
    pub fn distinct(&self) -> &[(Pair, WeightClass)] {
        &self.distinct
    }
}

/// One entry with its precomputed matching data.
#[derive(Debug, Clone)]
pub struct IndexedEntry {
    pub entry: Entry,
    pub postings: Postings,
    /// Token count of the tag text, used as the specificity tie-break.
    pub tag_tokens: usize,
}

/// Outcome of an index build.
///
/// A malformed entry never fails the build; it is skipped and listed
/// here so the caller can surface it.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub indexed: usize,
    pub skipped: Vec<String>,
}

/// Immutable matching index over a merged entry set.
///
/// Built once per (re)load and never mutated; a rebuild produces a
/// fresh `Index` that the engine publishes in one step, so queries
/// always observe a consistent snapshot.
///
/// The reverse lookup is keyed by token rather than by pair: a soft
/// match can score an entry that shares no exact pair with the query
/// (one typo'd word corrupts both pairs it touches), so pair-keyed
/// pruning would hide exactly the entries fuzzy matching exists for.
/// Sharing at least one token is required instead.
#[derive(Debug, Default)]
pub struct Index {
    entries: Vec<IndexedEntry>,
    by_token: HashMap<String, Vec<usize>>,
    by_identity: HashMap<String, usize>,
}

impl Index {
    /// Index a merged entry set.
    ///
    /// Entries with an empty identity or no usable tag tokens are
    /// skipped and reported, as is any duplicate identity (the merged
    /// set should contain at most one entry per identity; the first
    /// one wins here).
    pub fn build(entries: Vec<Entry>, params: &ScoringConfig) -> (Self, BuildReport) {
        let mut index = Self::default();
        let mut report = BuildReport::default();

        for entry in entries {
            let primary_tokens = token::tokenize(&entry.primary_text);
            if entry.identity.is_empty() || primary_tokens.is_empty() {
                tracing::warn!(
                    identity = %entry.identity,
                    "skipping entry without identity or tag tokens"
                );
                report.skipped.push(entry.identity);
                continue;
            }
            if index.by_identity.contains_key(&entry.identity) {
                tracing::warn!(identity = %entry.identity, "skipping duplicate identity");
                report.skipped.push(entry.identity);
                continue;
            }

            let secondary_tokens = token::tokenize(&entry.secondary_text);
            let mut sequence = bigram::bigrams(&primary_tokens, WeightClass::Primary);
            sequence.extend(bigram::bigrams(&secondary_tokens, WeightClass::Secondary));
            let postings = Postings::from_bigrams(&sequence, params.occurrence_cap);

            let id = index.entries.len();
            let tokens: HashSet<&String> =
                primary_tokens.iter().chain(secondary_tokens.iter()).collect();
            for token in tokens {
                index.by_token.entry(token.clone()).or_default().push(id);
            }
            index.by_identity.insert(entry.identity.clone(), id);
            index.entries.push(IndexedEntry {
                entry,
                postings,
                tag_tokens: primary_tokens.len(),
            });
        }

        report.indexed = index.entries.len();
        (index, report)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by its identity, for direct selection.
    pub fn get(&self, identity: &str) -> Option<&Entry> {
        self.by_identity
            .get(identity)
            .map(|&id| &self.entries[id].entry)
    }

    /// All indexed entries, in build order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().map(|indexed| &indexed.entry)
    }

    pub(crate) fn indexed(&self, id: usize) -> &IndexedEntry {
        &self.entries[id]
    }

    /// Ids of every entry sharing at least one token with the query,
    /// deduplicated and in a fixed order. Entries outside this set are
    /// never walked.
    pub(crate) fn candidates(&self, tokens: &[String]) -> Vec<usize> {
        let mut ids: Vec<usize> = tokens
            .iter()
            .filter_map(|token| self.by_token.get(token))
            .flatten()
            .copied()
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;

    fn build(entries: Vec<Entry>) -> (Index, BuildReport) {
        Index::build(entries, &ScoringConfig::default())
    }

    #[test]
    fn indexes_valid_entries() {
        let (index, report) = build(vec![
            Entry::knowledge("install knowledge", "pip install"),
            Entry::tool("backup", "archive files", "Nightly backup", None),
        ]);
        assert_eq!(index.len(), 2);
        assert_eq!(report.indexed, 2);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn skips_entry_without_tag_tokens() {
        let (index, report) = build(vec![
            Entry::knowledge("???", "unmatchable tags"),
            Entry::knowledge("install knowledge", "pip install"),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(report.skipped, vec!["???".to_string()]);
        assert!(index.get("install knowledge").is_some());
    }

    #[test]
    fn skips_duplicate_identity() {
        let (index, report) = build(vec![
            Entry::knowledge("install knowledge", "first"),
            Entry::knowledge("install knowledge", "second"),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        let entry = index.get("install knowledge").unwrap();
        assert_eq!(entry.secondary_text, "first");
    }

    #[test]
    fn candidates_require_token_overlap() {
        let (index, _) = build(vec![
            Entry::knowledge("install knowledge", "pip install"),
            Entry::knowledge("uninstall tool", "rm the tool"),
        ]);

        let query = token::tokenize("install knowledge");
        let candidates = index.candidates(&query);
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            index.indexed(candidates[0]).entry.identity,
            "install knowledge"
        );
    }

    #[test]
    fn candidates_cover_secondary_tokens() {
        let (index, _) = build(vec![Entry::knowledge("backup files", "rsync nightly")]);
        assert_eq!(index.candidates(&token::tokenize("rsync")).len(), 1);
    }

    #[test]
    fn candidates_are_deduplicated() {
        let (index, _) = build(vec![Entry::knowledge(
            "install knowledge",
            "install knowledge twice over",
        )]);

        let query = token::tokenize("install knowledge knowledge twice");
        assert_eq!(index.candidates(&query).len(), 1);
    }

    #[test]
    fn occurrence_counts_are_capped() {
        let text = "again again again again again again again";
        let (index, _) = build(vec![Entry::knowledge(text, "")]);

        let postings = &index.indexed(0).postings;
        let counts = postings.counts(&Pair::new("again", "again"));
        assert_eq!(counts.primary, ScoringConfig::default().occurrence_cap);
        assert_eq!(counts.secondary, 0);
    }

    #[test]
    fn pair_in_both_classes_listed_once_as_primary() {
        let (index, _) = build(vec![Entry::knowledge("pip install", "pip install")]);

        let postings = &index.indexed(0).postings;
        let counts = postings.counts(&Pair::new("pip", "install"));
        assert_eq!(counts.primary, 1);
        assert_eq!(counts.secondary, 1);

        let listed: Vec<_> = postings
            .distinct()
            .iter()
            .filter(|(p, _)| *p == Pair::new("pip", "install"))
            .collect();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].1, WeightClass::Primary);
    }

    #[test]
    fn single_token_tag_gets_degenerate_pair() {
        let (index, _) = build(vec![Entry::knowledge("backup", "")]);

        let postings = &index.indexed(0).postings;
        assert_eq!(postings.counts(&Pair::single("backup")).primary, 1);
    }

    #[test]
    fn tag_tokens_counted_from_primary_text() {
        let (index, _) = build(vec![Entry::knowledge("install knowledge base", "v")]);
        assert_eq!(index.indexed(0).tag_tokens, 3);
    }

    #[test]
    fn get_unknown_identity_is_none() {
        let (index, _) = build(vec![Entry::knowledge("install knowledge", "v")]);
        assert!(index.get("missing").is_none());
    }
}
