use std::sync::{Arc, RwLock};

use crate::{
    entry::Layer,
    error::{Error, Result},
    index::{BuildReport, Index},
    merge,
    rank::{self, RankedEntry},
    scorer::ScoringConfig,
};

/// Owns the scoring parameters and the current index.
///
/// The engine has two states: unloaded (nothing built yet, `rank`
/// fails) and ready. `build` merges the layers and constructs the new
/// index completely before taking the write lock to publish it, so
/// concurrent readers always observe a fully old or fully new index.
/// When builds race, the last one to publish wins.
#[derive(Debug, Default)]
pub struct Engine {
    params: ScoringConfig,
    index: RwLock<Option<Arc<Index>>>,
}

impl Engine {
    pub fn new(params: ScoringConfig) -> Self {
        Self {
            params,
            index: RwLock::new(None),
        }
    }

    /// Merge the layers, index the result, and publish it.
    ///
    /// Malformed entries are skipped and listed in the report, never
    /// fatal. Rebuilding from identical layers yields an index that
    /// ranks identically.
    pub fn build(&self, layers: Vec<Layer>) -> BuildReport {
        let entries = merge::merge(layers);
        let (index, report) = Index::build(entries, &self.params);
        tracing::debug!(
            indexed = report.indexed,
            skipped = report.skipped.len(),
            "publishing index"
        );

        let mut slot = self.index.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::new(index));
        report
    }

    /// The current index snapshot, independent of later rebuilds.
    pub fn snapshot(&self) -> Result<Arc<Index>> {
        let slot = self.index.read().unwrap_or_else(|e| e.into_inner());
        slot.clone().ok_or(Error::NotReady)
    }

    /// Rank all reachable entries for a free-text query.
    pub fn rank(&self, query: &str) -> Result<Vec<RankedEntry>> {
        let index = self.snapshot()?;
        Ok(rank::rank(query, &index, &self.params, self.params.min_score))
    }
}
