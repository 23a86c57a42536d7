use rayon::prelude::*;

use crate::{
    bigram,
    index::Index,
    scorer::{self, ScoringConfig},
    token,
};

/// One ranked result: an entry identity and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub identity: String,
    pub score: f64,
}

/// Score every entry reachable from the query and order the survivors.
///
/// The query is tokenized and paired once; entries sharing no token
/// with it are never walked. Candidates are scored in parallel, and
/// anything scoring zero or below `min_score` is dropped. Survivors
/// are sorted by score descending, then fewer tag tokens (more
/// specific entries first), then identity, so a fixed index and query
/// always yield the same sequence. An empty query yields an empty
/// result.
pub fn rank(
    query: &str,
    index: &Index,
    params: &ScoringConfig,
    min_score: f64,
) -> Vec<RankedEntry> {
    let tokens = token::tokenize(query);
    let pairs = bigram::pairs(&tokens);
    if pairs.is_empty() {
        return Vec::new();
    }

    let candidates = index.candidates(&tokens);
    tracing::debug!(
        candidates = candidates.len(),
        total = index.len(),
        "scoring candidates"
    );

    let mut scored: Vec<(usize, f64)> = candidates
        .par_iter()
        .filter_map(|&id| {
            let score = scorer::score(&pairs, &index.indexed(id).postings, params);
            (score > 0.0 && score >= min_score).then_some((id, score))
        })
        .collect();

    scored.sort_by(|&(a_id, a_score), &(b_id, b_score)| {
        let a = index.indexed(a_id);
        let b = index.indexed(b_id);
        b_score
            .partial_cmp(&a_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.tag_tokens.cmp(&b.tag_tokens))
            .then_with(|| a.entry.identity.cmp(&b.entry.identity))
    });

    scored
        .into_iter()
        .map(|(id, score)| RankedEntry {
            identity: index.indexed(id).entry.identity.clone(),
            score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;

    fn sample_index() -> Index {
        let entries = vec![
            Entry::knowledge("install knowledge", "pip install"),
            Entry::knowledge("uninstall tool", "pip uninstall"),
            Entry::knowledge("backup files", "rsync to the archive disk"),
            Entry::tool("backup", "backup files nightly", "Nightly backup run", None),
        ];
        let (index, report) = Index::build(entries, &ScoringConfig::default());
        assert!(report.skipped.is_empty());
        index
    }

    fn rank_default(query: &str, index: &Index) -> Vec<RankedEntry> {
        rank(query, index, &ScoringConfig::default(), 0.0)
    }

    #[test]
    fn matching_entry_ranks_first() {
        let index = sample_index();
        let results = rank_default("how do I install knowledge?", &index);
        assert!(!results.is_empty());
        assert_eq!(results[0].identity, "install knowledge");
        assert!(results[0].score > 0.0);
    }

    #[test]
    fn non_overlapping_entries_are_absent() {
        let index = sample_index();
        let results = rank_default("install knowledge", &index);
        assert!(
            results.iter().all(|r| r.identity != "uninstall tool"),
            "an entry sharing no token with the query must not appear"
        );
    }

    #[test]
    fn scores_are_descending() {
        let index = sample_index();
        let results = rank_default("backup files nightly", &index);
        for window in results.windows(2) {
            assert!(window[0].score >= window[1].score);
        }
    }

    #[test]
    fn deterministic_across_calls() {
        let index = sample_index();
        let a = rank_default("backup files", &index);
        let b = rank_default("backup files", &index);
        assert_eq!(a, b);
    }

    #[test]
    fn tie_broken_by_fewer_tag_tokens() {
        let entries = vec![
            Entry::knowledge("alpha beta gamma delta", "x"),
            Entry::knowledge("alpha beta", "x"),
        ];
        let (index, _) = Index::build(entries, &ScoringConfig::default());
        let results = rank_default("alpha beta", &index);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].score, results[1].score);
        assert_eq!(results[0].identity, "alpha beta");
    }

    #[test]
    fn tie_broken_by_identity_last() {
        let entries = vec![
            Entry::knowledge("alpha beta zz", "x"),
            Entry::knowledge("alpha beta aa", "x"),
        ];
        let (index, _) = Index::build(entries, &ScoringConfig::default());
        let results = rank_default("alpha beta", &index);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].identity, "alpha beta aa");
    }

    #[test]
    fn min_score_filters_results() {
        let index = sample_index();
        let all = rank("install knowledge", &index, &ScoringConfig::default(), 0.0);
        assert!(!all.is_empty());
        let none = rank("install knowledge", &index, &ScoringConfig::default(), 999.0);
        assert!(none.is_empty());
    }

    #[test]
    fn empty_query_yields_empty_result() {
        let index = sample_index();
        assert!(rank_default("", &index).is_empty());
        assert!(rank_default("?!", &index).is_empty());
    }

    #[test]
    fn typo_query_still_finds_the_entry() {
        let index = sample_index();
        let results = rank_default("instal knowledge", &index);
        assert!(!results.is_empty());
        assert_eq!(results[0].identity, "install knowledge");

        let exact = rank_default("install knowledge", &index);
        assert!(results[0].score < exact[0].score);
    }

    #[test]
    fn rebuild_from_same_entries_ranks_identically() {
        let a = sample_index();
        let b = sample_index();
        assert_eq!(
            rank_default("backup files nightly", &a),
            rank_default("backup files nightly", &b)
        );
    }
}
