//! The fuzzy scorer.
//!
//! Scores one query against one entry's postings by walking the query's
//! pair sequence in order:
//!
//! 1. **Exact match**: the pair is present with remaining occurrence
//!    budget (primary consumed before secondary). Adds the class weight
//!    plus a run bonus that grows with every consecutive exact match,
//!    so an unbroken phrase is worth more than the same words scattered.
//! 2. **Soft match**: no exact hit, but some entry pair lies within
//!    the edit-distance tolerance on both tokens. Adds a fraction of
//!    the matched class weight and leaves the run intact. Two soft
//!    matches in a row are never accepted, which keeps fuzzy credit
//!    from compounding.
//! 3. **Miss**: anything else resets the run.
//!
//! All constants live in [`ScoringConfig`] and come from the `[scoring]`
//! table of the configuration file.

use std::collections::HashMap;

use serde::Deserialize;

use crate::{
    bigram::{Pair, WeightClass},
    error::{Error, Result},
    index::{ClassCounts, Postings},
};

/// Tunable scoring parameters.
///
/// Every field has a default, so a configuration file may omit the
/// whole `[scoring]` table or override single fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoringConfig {
    /// Weight of an exact match on tag/name text.
    #[serde(default = "default_primary_weight")]
    pub primary_weight: f64,
    /// Weight of an exact match on value/description text.
    #[serde(default = "default_secondary_weight")]
    pub secondary_weight: f64,
    /// Fraction of the matched class weight credited to a soft match.
    #[serde(default = "default_soft_match_factor")]
    pub soft_match_factor: f64,
    /// Bonus added per position of an unbroken exact-match run.
    #[serde(default = "default_run_bonus")]
    pub run_bonus: f64,
    /// Per-token edit distance tolerated by a soft match.
    #[serde(default = "default_max_edit_distance")]
    pub max_edit_distance: usize,
    /// How often a single pair may earn exact credit within one entry.
    #[serde(default = "default_occurrence_cap")]
    pub occurrence_cap: u8,
    /// Results scoring below this threshold are dropped.
    #[serde(default = "default_min_score")]
    pub min_score: f64,
}

fn default_primary_weight() -> f64 {
    1.0
}
fn default_secondary_weight() -> f64 {
    0.5
}
fn default_soft_match_factor() -> f64 {
    0.5
}
fn default_run_bonus() -> f64 {
    1.0
}
fn default_max_edit_distance() -> usize {
    1
}
fn default_occurrence_cap() -> u8 {
    4
}
fn default_min_score() -> f64 {
    0.0
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            primary_weight: default_primary_weight(),
            secondary_weight: default_secondary_weight(),
            soft_match_factor: default_soft_match_factor(),
            run_bonus: default_run_bonus(),
            max_edit_distance: default_max_edit_distance(),
            occurrence_cap: default_occurrence_cap(),
            min_score: default_min_score(),
        }
    }
}

impl ScoringConfig {
    pub fn class_weight(&self, class: WeightClass) -> f64 {
        match class {
            WeightClass::Primary => self.primary_weight,
            WeightClass::Secondary => self.secondary_weight,
        }
    }

    /// Reject parameter combinations that would break scoring.
    pub fn validate(&self) -> Result<()> {
        if self.occurrence_cap == 0 {
            return Err(Error::Config(
                "scoring.occurrence_cap must be at least 1".into(),
            ));
        }
        if self.primary_weight <= 0.0 {
            return Err(Error::Config(
                "scoring.primary_weight must be greater than 0".into(),
            ));
        }
        if self.secondary_weight < 0.0 {
            return Err(Error::Config(
                "scoring.secondary_weight must not be negative".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.soft_match_factor) {
            return Err(Error::Config(
                "scoring.soft_match_factor must be between 0.0 and 1.0".into(),
            ));
        }
        if self.run_bonus < 0.0 {
            return Err(Error::Config(
                "scoring.run_bonus must not be negative".into(),
            ));
        }
        if self.min_score < 0.0 {
            return Err(Error::Config(
                "scoring.min_score must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Score a query's pair sequence against one entry's postings.
///
/// Always finite and non-negative. The query side carries no weight
/// class; the weight credited by each match is decided by the entry
/// side (primary occurrences are consumed first).
pub fn score(query: &[Pair], postings: &Postings, params: &ScoringConfig) -> f64 {
    let mut budget: HashMap<&Pair, ClassCounts> = HashMap::new();
    let mut total = 0.0;
    let mut run = 0u32;
    let mut prev_soft = false;

    for pair in query {
        if let Some(class) = consume(&mut budget, postings, pair) {
            run += 1;
            total += params.class_weight(class) + f64::from(run) * params.run_bonus;
            prev_soft = false;
        } else if !prev_soft
            && let Some(weight) = best_soft_weight(pair, postings, params)
        {
            total += params.soft_match_factor * weight;
            prev_soft = true;
            // the run is neither extended nor reset
        } else {
            run = 0;
            prev_soft = false;
        }
    }

    total
}

/// Take one occurrence of `pair` from the entry's budget, primary
/// before secondary. `None` once the pair is absent or used up.
fn consume<'a>(
    budget: &mut HashMap<&'a Pair, ClassCounts>,
    postings: &Postings,
    pair: &'a Pair,
) -> Option<WeightClass> {
    let counts = budget.entry(pair).or_insert_with(|| postings.counts(pair));
    if counts.primary > 0 {
        counts.primary -= 1;
        Some(WeightClass::Primary)
    } else if counts.secondary > 0 {
        counts.secondary -= 1;
        Some(WeightClass::Secondary)
    } else {
        None
    }
}

/// The highest class weight among entry pairs within edit-distance
/// tolerance of `pair`, or `None` when nothing is close enough.
fn best_soft_weight(pair: &Pair, postings: &Postings, params: &ScoringConfig) -> Option<f64> {
    let mut best: Option<f64> = None;
    for (candidate, class) in postings.distinct() {
        if pair_within_distance(pair, candidate, params.max_edit_distance) {
            let weight = params.class_weight(*class);
            if best.is_none_or(|b| weight > b) {
                best = Some(weight);
            }
        }
    }
    best
}

fn pair_within_distance(a: &Pair, b: &Pair, max: usize) -> bool {
    within_edit_distance(&a.first, &b.first, max)
        && within_edit_distance(&a.second, &b.second, max)
}

/// Bounded Levenshtein check: is the edit distance of `a` and `b` at
/// most `max`?
///
/// Short-circuits on a length difference larger than `max` and abandons
/// the table walk as soon as a whole row exceeds the bound.
pub fn within_edit_distance(a: &str, b: &str, max: usize) -> bool {
    if a == b {
        return true;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > max {
        return false;
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr: Vec<usize> = vec![0; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost)
                .min(prev[j + 1] + 1)
                .min(curr[j] + 1);
            row_min = row_min.min(curr[j + 1]);
        }
        if row_min > max {
            return false;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()] <= max
}
