//! Information-set table for one training run.
//!
//! The table is owned by a single solver and rebuilt for every training
//! run, so independent runs in the same process never share accumulators.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::cfr::config::DiscountFactors;
use crate::cfr::info_set::{uniform, InfoSet};

/// Average strategy per information-set key.
///
/// Ordered so that reports and JSON exports are deterministic.
pub type StrategyProfile = BTreeMap<String, Vec<f64>>;

/// Mapping from information-set key to its accumulators.
#[derive(Debug, Clone, Default)]
pub struct InfoSetStore {
    info_sets: FxHashMap<String, InfoSet>,
}

impl InfoSetStore {
    /// Create new empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            info_sets: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Look up an information set, creating it on first visit.
    pub fn get_or_insert_with<F>(&mut self, info_key: &str, create: F) -> &mut InfoSet
    where
        F: FnOnce() -> InfoSet,
    {
        self.info_sets
            .entry(info_key.to_string())
            .or_insert_with(create)
    }

    /// Look up an information set.
    pub fn get(&self, info_key: &str) -> Option<&InfoSet> {
        self.info_sets.get(info_key)
    }

    /// Mutable lookup of an information set.
    pub fn get_mut(&mut self, info_key: &str) -> Option<&mut InfoSet> {
        self.info_sets.get_mut(info_key)
    }

    /// Current (regret-matched) strategy, uniform for unseen info sets.
    pub fn get_current_strategy(&self, info_key: &str, num_actions: usize) -> Vec<f64> {
        match self.info_sets.get(info_key) {
            Some(info) => info.current_strategy(),
            None => uniform(num_actions),
        }
    }

    /// Average strategy, uniform for unseen info sets.
    ///
    /// An unknown key means the set was never reached with positive
    /// probability, which is not an error.
    pub fn get_average_strategy(&self, info_key: &str, num_actions: usize) -> Vec<f64> {
        match self.info_sets.get(info_key) {
            Some(info) => info.average_strategy(),
            None => uniform(num_actions),
        }
    }

    /// Action names for an info set.
    pub fn get_action_names(&self, info_key: &str) -> Option<Vec<String>> {
        self.info_sets.get(info_key).map(|info| info.actions().to_vec())
    }

    /// Commit the buffered iteration in every information set of `player`.
    ///
    /// Sets owned by other players keep their strategy, so a later pass in
    /// the same iteration still plays against what they had before.
    pub fn end_iteration(&mut self, player: usize, discount: &DiscountFactors) {
        for info in self.info_sets.values_mut().filter(|info| info.player() == player) {
            info.end_iteration(discount);
        }
    }

    /// Average strategies of all information sets.
    pub fn profile(&self) -> StrategyProfile {
        self.info_sets
            .iter()
            .map(|(key, info)| (key.clone(), info.average_strategy()))
            .collect()
    }

    /// Sum over info sets of the L1 distance between `current` and `previous`.
    ///
    /// Info sets missing from `previous` are compared against uniform.
    pub fn strategy_change(current: &StrategyProfile, previous: &StrategyProfile) -> f64 {
        current
            .iter()
            .map(|(key, strategy)| l1_change(strategy, previous.get(key)))
            .sum()
    }

    /// Strategy change split by the player owning each info set.
    ///
    /// Keys this store does not know are skipped.
    pub fn strategy_change_by_player(
        &self,
        current: &StrategyProfile,
        previous: &StrategyProfile,
        num_players: usize,
    ) -> Vec<f64> {
        let mut changes = vec![0.0; num_players];
        for (key, strategy) in current {
            let Some(info) = self.info_sets.get(key) else {
                continue;
            };
            if let Some(change) = changes.get_mut(info.player()) {
                *change += l1_change(strategy, previous.get(key));
            }
        }
        changes
    }

    /// Sum of positive cumulative regret across all info sets.
    pub fn total_positive_regret(&self) -> f64 {
        self.info_sets.values().map(InfoSet::positive_regret).sum()
    }

    /// Get the number of information sets stored.
    pub fn num_info_sets(&self) -> usize {
        self.info_sets.len()
    }

    /// Check if an info set exists in storage.
    pub fn contains(&self, info_key: &str) -> bool {
        self.info_sets.contains_key(info_key)
    }

    /// Iterate over every stored information set.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &InfoSet)> {
        self.info_sets.iter()
    }

    /// Clear all stored data.
    pub fn clear(&mut self) {
        self.info_sets.clear();
    }
}

fn l1_change(strategy: &[f64], previous: Option<&Vec<f64>>) -> f64 {
    let old = previous
        .cloned()
        .unwrap_or_else(|| uniform(strategy.len()));
    strategy
        .iter()
        .zip(old.iter())
        .map(|(&new, &old)| (new - old).abs())
        .sum()
}
