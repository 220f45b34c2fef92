//! Per-information-set regret and strategy bookkeeping.

use crate::cfr::config::DiscountFactors;

/// Accumulators for one information set.
///
/// The current strategy is cached for the duration of an iteration: every
/// state belonging to the set sees the same σ(I, ·), and the regrets and
/// reach weights it collects are buffered until [`InfoSet::end_iteration`]
/// commits them.
#[derive(Debug, Clone)]
pub struct InfoSet {
    /// Player acting at this information set.
    player: usize,
    /// Names of the legal actions, in the order the game lists them.
    actions: Vec<String>,
    /// Cumulative regret per action, R[a].
    regret_sum: Vec<f64>,
    /// Cumulative reach-weighted strategy per action, S[a].
    strategy_sum: Vec<f64>,
    /// Strategy used during the current iteration.
    strategy: Vec<f64>,
    /// Counterfactual regret collected during the current iteration.
    pending_regret: Vec<f64>,
    /// Own-reach weight collected during the current iteration.
    pending_reach: f64,
}

impl InfoSet {
    /// Create an information set with zero regret and a uniform strategy.
    pub fn new(player: usize, actions: Vec<String>) -> Self {
        let n = actions.len();
        Self {
            player,
            actions,
            regret_sum: vec![0.0; n],
            strategy_sum: vec![0.0; n],
            strategy: uniform(n),
            pending_regret: vec![0.0; n],
            pending_reach: 0.0,
        }
    }

    /// Player acting at this information set.
    pub fn player(&self) -> usize {
        self.player
    }

    /// Names of the legal actions.
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// Number of legal actions.
    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    /// Cumulative regret per action.
    pub fn regrets(&self) -> &[f64] {
        &self.regret_sum
    }

    /// Cumulative strategy sum per action.
    pub fn strategy_sums(&self) -> &[f64] {
        &self.strategy_sum
    }

    /// Strategy in force for the current iteration.
    pub fn strategy(&self) -> &[f64] {
        &self.strategy
    }

    /// Regret matching over the cumulative regrets.
    ///
    /// Strategy proportional to positive regret, or uniform when no action
    /// has positive regret. For floored variants this is RM+, since the
    /// regrets are already non-negative.
    pub fn current_strategy(&self) -> Vec<f64> {
        let positive: Vec<f64> = self.regret_sum.iter().map(|&r| r.max(0.0)).collect();
        let sum: f64 = positive.iter().sum();

        if sum > 0.0 {
            positive.iter().map(|&r| r / sum).collect()
        } else {
            uniform(self.actions.len())
        }
    }

    /// Time-averaged strategy, uniform if the set was never reached.
    pub fn average_strategy(&self) -> Vec<f64> {
        let total: f64 = self.strategy_sum.iter().sum();
        if total > 0.0 {
            self.strategy_sum.iter().map(|&s| s / total).collect()
        } else {
            uniform(self.actions.len())
        }
    }

    /// Sum of positive cumulative regret.
    pub fn positive_regret(&self) -> f64 {
        self.regret_sum.iter().map(|&r| r.max(0.0)).sum()
    }

    /// Buffer one visit's counterfactual regrets and own-reach weight.
    pub fn record_visit(&mut self, regrets: &[f64], reach: f64) {
        debug_assert_eq!(regrets.len(), self.pending_regret.len());
        for (pending, &r) in self.pending_regret.iter_mut().zip(regrets) {
            *pending += r;
        }
        self.pending_reach += reach;
    }

    /// Discount the existing regret of `action`, add `regret`, and floor the
    /// result at zero if the variant asks for it.
    pub fn update_regret(&mut self, action: usize, regret: f64, discount: &DiscountFactors) {
        let r = &mut self.regret_sum[action];
        if *r > 0.0 {
            *r *= discount.positive;
        } else if *r < 0.0 {
            *r *= discount.negative;
        }
        *r += regret;
        if discount.floor_regret && *r < 0.0 {
            *r = 0.0;
        }
    }

    /// Discount the strategy sum and add `reach_weight * σ(I, a)` for every action.
    pub fn accumulate_strategy(&mut self, reach_weight: f64, discount: &DiscountFactors) {
        for (sum, &prob) in self.strategy_sum.iter_mut().zip(&self.strategy) {
            *sum = *sum * discount.strategy + reach_weight * prob;
        }
    }

    /// Commit the buffered iteration and refresh the cached strategy.
    pub fn end_iteration(&mut self, discount: &DiscountFactors) {
        let pending = std::mem::replace(&mut self.pending_regret, vec![0.0; self.actions.len()]);
        for (a, r) in pending.into_iter().enumerate() {
            self.update_regret(a, r, discount);
        }

        let reach = std::mem::take(&mut self.pending_reach);
        self.accumulate_strategy(reach, discount);

        self.strategy = self.current_strategy();
    }
}

/// Uniform distribution over `n` actions.
pub(crate) fn uniform(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}
