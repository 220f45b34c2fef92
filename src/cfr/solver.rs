//! Counterfactual Regret Minimization solver.
//!
//! One traversal routine serves every variant; the differences between
//! vanilla CFR, CFR+, Linear CFR and Discounted CFR live entirely in the
//! [`DiscountParams`](crate::cfr::config::DiscountParams) of the config.
//!
//! Updates alternate: each iteration walks the tree once per player, and
//! only that player (the traverser) collects regret. Its information sets
//! are committed before the next player's pass, so the next traverser
//! already plays against the updated strategy. Chance is enumerated
//! exhaustively unless the config asks for sampling.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cfr::best_response;
use crate::cfr::config::{CFRConfig, IterationStats, TrainingReport};
use crate::cfr::error::CfrError;
use crate::cfr::game::{decision_point, Game, InfoState};
use crate::cfr::info_set::InfoSet;
use crate::cfr::storage::{InfoSetStore, StrategyProfile};

/// The main CFR solver.
///
/// Owns the information-set table of one training run. Every call to
/// [`CFRSolver::train`] starts from an empty table.
///
/// # Type Parameters
/// - `G`: The game type implementing the `Game` trait
///
/// # Example
/// ```
/// use cfr_solver::cfr::{CFRConfig, CFRSolver};
/// use cfr_solver::games::kuhn::KuhnPoker;
///
/// let mut solver = CFRSolver::new(KuhnPoker::new(), CFRConfig::discounted());
/// let report = solver.train(200, 10, 1e-6).unwrap();
///
/// let jack = &report.average_strategy["J:"];
/// assert!((jack[0] + jack[1] - 1.0).abs() < 1e-9);
/// ```
pub struct CFRSolver<G: Game> {
    /// The game being solved.
    game: G,

    /// Configuration for the solver.
    config: CFRConfig,

    /// Information sets discovered in the current run.
    storage: InfoSetStore,

    /// Current iteration count.
    iteration: u64,

    /// Random number generator for sampled chance.
    rng: StdRng,
}

impl<G: Game> CFRSolver<G> {
    /// Create a new CFR solver for the given game.
    ///
    /// # Arguments
    /// * `game` - The game to solve
    /// * `config` - Configuration options for the solver
    pub fn new(game: G, config: CFRConfig) -> Self {
        let rng = seeded_rng(config.seed);

        Self {
            game,
            config,
            storage: InfoSetStore::new(),
            iteration: 0,
            rng,
        }
    }

    /// Create a solver with pre-allocated storage capacity.
    pub fn with_capacity(game: G, config: CFRConfig, capacity: usize) -> Self {
        let mut solver = Self::new(game, config);
        solver.storage = InfoSetStore::with_capacity(capacity);
        solver
    }

    /// Run a single CFR iteration.
    ///
    /// One pass per player from the root with every reach probability at 1.
    /// After each pass the traverser's buffered regrets and strategy weights
    /// are committed with this iteration's discount factors.
    pub fn run_iteration(&mut self) -> Result<(), CfrError> {
        self.iteration += 1;

        let root = self.game.initial_state();
        let reach_probs = vec![1.0; self.game.num_players()];
        let factors = self.config.discount.factors(self.iteration);

        for traverser in 0..self.game.num_players() {
            self.cfr_iterate(&root, traverser, &reach_probs, 1.0)?;
            self.storage.end_iteration(traverser, &factors);
        }
        Ok(())
    }

    /// Train from scratch until the iteration budget is spent or the average
    /// strategy stops moving.
    ///
    /// # Arguments
    /// * `num_iterations` - Maximum number of iterations to run
    /// * `patience` - Consecutive quiet iterations required to stop early
    /// * `tolerance` - Strategy change below which an iteration counts as quiet
    ///
    /// # Returns
    /// The per-iteration series and final average strategy.
    pub fn train(
        &mut self,
        num_iterations: u64,
        patience: u64,
        tolerance: f64,
    ) -> Result<TrainingReport, CfrError> {
        self.train_with_callback(num_iterations, patience, tolerance, |_| {})
    }

    /// Train with a callback invoked after every iteration.
    ///
    /// The callback receives the monitored values of that iteration, which
    /// is what external plotting or reporting code consumes.
    pub fn train_with_callback<F>(
        &mut self,
        num_iterations: u64,
        patience: u64,
        tolerance: f64,
        mut callback: F,
    ) -> Result<TrainingReport, CfrError>
    where
        F: FnMut(&IterationStats),
    {
        self.config.validate()?;
        validate_schedule(num_iterations, patience, tolerance)?;

        self.reset();
        let start_time = Instant::now();
        let progress = self.progress_bar(num_iterations);

        log::info!(
            "training {} for up to {} iterations (patience {}, tolerance {})",
            self.config.variant,
            num_iterations,
            patience,
            tolerance
        );

        let mut report = TrainingReport::default();
        let mut previous = StrategyProfile::new();
        let mut quiet_streak = 0;

        while self.iteration < num_iterations {
            self.run_iteration()?;

            let profile = self.storage.profile();
            let by_player = self.storage.strategy_change_by_player(
                &profile,
                &previous,
                self.game.num_players(),
            );
            let stats = IterationStats {
                iteration: self.iteration,
                exploitability: best_response::exploitability(&self.game, &self.storage)?,
                strategy_change: InfoSetStore::strategy_change(&profile, &previous),
                strategy_change_by_player: by_player,
                total_regret: self.storage.total_positive_regret(),
            };

            report.exploitability.push(stats.exploitability);
            report.strategy_change.push(stats.strategy_change);
            report
                .strategy_change_by_player
                .push(stats.strategy_change_by_player.clone());
            report.total_regret.push(stats.total_regret);
            callback(&stats);
            progress.inc(1);

            if self.config.log_interval > 0 && self.iteration % self.config.log_interval == 0 {
                log::debug!(
                    "iteration {:>8}  exploitability {:.6}  change {:.6} {:?}  regret {:.4}",
                    stats.iteration,
                    stats.exploitability,
                    stats.strategy_change,
                    stats.strategy_change_by_player,
                    stats.total_regret
                );
            }

            // Iteration 1 has no previous average strategy to compare with.
            if self.iteration >= 2 && stats.strategy_change < tolerance {
                quiet_streak += 1;
            } else {
                quiet_streak = 0;
            }
            previous = profile;

            if quiet_streak >= patience {
                report.stopped_early = self.iteration < num_iterations;
                break;
            }
        }

        progress.finish_and_clear();

        report.iterations = self.iteration;
        report.average_strategy = previous;
        report.elapsed_seconds = start_time.elapsed().as_secs_f64();

        log::info!(
            "{} stopped at iteration {}{} with exploitability {:.6} ({} info sets, {:.2}s)",
            self.config.variant,
            report.iterations,
            if report.stopped_early { " (early)" } else { "" },
            report.final_exploitability().unwrap_or(f64::NAN),
            self.storage.num_info_sets(),
            report.elapsed_seconds
        );

        Ok(report)
    }

    /// Recursive CFR traversal for one player.
    ///
    /// Returns the expected value of `state` for `traverser` under the
    /// current strategies. At the traverser's decision nodes the
    /// counterfactual regrets (scaled by chance and opponent reach) and own
    /// reach are buffered in its information set. Other players' sets are
    /// created on first visit but collect nothing.
    ///
    /// # Arguments
    /// * `state` - Current game state
    /// * `traverser` - Player whose regrets are updated in this pass
    /// * `reach_probs` - Probability each player contributes to reaching `state`
    /// * `chance_reach` - Probability chance contributes to reaching `state`
    pub fn cfr_iterate(
        &mut self,
        state: &G::State,
        traverser: usize,
        reach_probs: &[f64],
        chance_reach: f64,
    ) -> Result<f64, CfrError> {
        if self.game.is_terminal(state) {
            return Ok(self.game.get_payoff(state, traverser));
        }

        if self.game.is_chance(state) {
            if self.config.chance_sampling {
                let outcome = self.game.sample_chance(state, &mut self.rng);
                return self.cfr_iterate(&outcome, traverser, reach_probs, chance_reach);
            }

            let mut value = 0.0;
            for (outcome, prob) in self.game.chance_outcomes(state) {
                let child_value =
                    self.cfr_iterate(&outcome, traverser, reach_probs, chance_reach * prob)?;
                value += prob * child_value;
            }
            return Ok(value);
        }

        let (current_player, actions) = decision_point(&self.game, state)?;

        let info_key = self.game.info_state(state).key();
        let game = &self.game;
        let strategy = self
            .storage
            .get_or_insert_with(&info_key, || {
                let names = actions.iter().map(|a| game.action_name(a)).collect();
                InfoSet::new(current_player, names)
            })
            .strategy()
            .to_vec();

        let mut action_values = Vec::with_capacity(actions.len());
        for (action, &prob) in actions.iter().zip(&strategy) {
            let child = self.game.apply_action(state, action)?;

            let mut child_reach = reach_probs.to_vec();
            child_reach[current_player] *= prob;

            action_values.push(self.cfr_iterate(&child, traverser, &child_reach, chance_reach)?);
        }

        let node_value: f64 = action_values
            .iter()
            .zip(&strategy)
            .map(|(&v, &prob)| prob * v)
            .sum();

        if current_player != traverser {
            return Ok(node_value);
        }

        let counterfactual_reach: f64 = chance_reach
            * reach_probs
                .iter()
                .enumerate()
                .filter(|&(p, _)| p != traverser)
                .map(|(_, &r)| r)
                .product::<f64>();

        let regrets: Vec<f64> = action_values
            .iter()
            .map(|&v| counterfactual_reach * (v - node_value))
            .collect();

        if let Some(info) = self.storage.get_mut(&info_key) {
            info.record_visit(&regrets, reach_probs[traverser]);
        }

        Ok(node_value)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::with_template(
            "  {msg} [{bar:40}] {pos}/{len} iters [{elapsed} < {eta}, {per_sec}]",
        ) {
            bar.set_style(style);
        }
        bar.set_message(self.config.variant.to_string());
        bar
    }

    /// Get the current (regret-matched) strategy for an information set.
    pub fn get_current_strategy(&self, info_key: &str, num_actions: usize) -> Vec<f64> {
        self.storage.get_current_strategy(info_key, num_actions)
    }

    /// Get the average strategy for an information set.
    ///
    /// Unknown keys yield the uniform distribution.
    pub fn get_average_strategy(&self, info_key: &str, num_actions: usize) -> Vec<f64> {
        self.storage.get_average_strategy(info_key, num_actions)
    }

    /// Average strategy of every discovered information set.
    pub fn strategy_profile(&self) -> StrategyProfile {
        self.storage.profile()
    }

    /// Exploitability of the current average strategy profile.
    pub fn calculate_exploitability(&self) -> Result<f64, CfrError> {
        best_response::exploitability(&self.game, &self.storage)
    }

    /// Get the current iteration count.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Get the number of information sets discovered.
    pub fn num_info_sets(&self) -> usize {
        self.storage.num_info_sets()
    }

    /// Get reference to the storage for analysis.
    pub fn storage(&self) -> &InfoSetStore {
        &self.storage
    }

    /// Get reference to the game.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &CFRConfig {
        &self.config
    }

    /// Get all information set keys discovered during training, sorted.
    pub fn info_set_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.storage.iter().map(|(k, _)| k.clone()).collect();
        keys.sort();
        keys
    }

    /// Get action names for an information set.
    pub fn get_action_names(&self, info_key: &str) -> Option<Vec<String>> {
        self.storage.get_action_names(info_key)
    }

    /// Reset the solver to its initial state.
    ///
    /// Also reseeds the sampler so repeated runs with a fixed seed match.
    pub fn reset(&mut self) {
        self.storage.clear();
        self.iteration = 0;
        self.rng = seeded_rng(self.config.seed);
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn validate_schedule(num_iterations: u64, patience: u64, tolerance: f64) -> Result<(), CfrError> {
    if num_iterations == 0 {
        return Err(CfrError::InvalidConfiguration(
            "num_iterations must be positive".to_string(),
        ));
    }
    if patience == 0 {
        return Err(CfrError::InvalidConfiguration(
            "patience must be positive".to_string(),
        ));
    }
    if tolerance.is_nan() || tolerance < 0.0 {
        return Err(CfrError::InvalidConfiguration(format!(
            "tolerance {} must be a non-negative number",
            tolerance
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::config::DiscountFactors;
    use crate::cfr::game::{Action, GameState};
    use crate::games::kuhn::KuhnPoker;

    /// A game whose root claims to be a decision node but offers no actions.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Stuck;

    impl Action for Stuck {
        fn to_string(&self) -> String {
            "stuck".to_string()
        }
    }

    impl InfoState for Stuck {
        fn key(&self) -> String {
            "stuck".to_string()
        }
    }

    impl GameState for Stuck {}

    impl Game for Stuck {
        type State = Stuck;
        type Action = Stuck;
        type InfoState = Stuck;

        fn initial_state(&self) -> Stuck {
            Stuck
        }

        fn is_terminal(&self, _state: &Stuck) -> bool {
            false
        }

        fn get_payoff(&self, _state: &Stuck, _player: usize) -> f64 {
            0.0
        }

        fn current_player(&self, _state: &Stuck) -> Option<usize> {
            Some(0)
        }

        fn num_players(&self) -> usize {
            2
        }

        fn available_actions(&self, _state: &Stuck) -> Vec<Stuck> {
            Vec::new()
        }

        fn apply_action(&self, _state: &Stuck, _action: &Stuck) -> Result<Stuck, CfrError> {
            Ok(Stuck)
        }

        fn info_state(&self, _state: &Stuck) -> Stuck {
            Stuck
        }
    }

    #[test]
    fn test_root_value_under_uniform_play() {
        let mut solver = CFRSolver::new(KuhnPoker::new(), CFRConfig::vanilla());
        let root = solver.game().initial_state();

        let first = solver.cfr_iterate(&root, 0, &[1.0, 1.0], 1.0).unwrap();
        let second = solver.cfr_iterate(&root, 1, &[1.0, 1.0], 1.0).unwrap();

        assert!((first - 0.125).abs() < 1e-12);
        assert!((second + 0.125).abs() < 1e-12);
        assert_eq!(solver.num_info_sets(), 12);
    }

    #[test]
    fn test_only_traverser_collects_regret() {
        let mut solver = CFRSolver::new(KuhnPoker::new(), CFRConfig::vanilla());
        let root = solver.game().initial_state();

        solver.cfr_iterate(&root, 0, &[1.0, 1.0], 1.0).unwrap();
        solver.storage.end_iteration(0, &DiscountFactors::none());
        solver.storage.end_iteration(1, &DiscountFactors::none());

        for (key, info) in solver.storage().iter() {
            let weight: f64 = info.strategy_sums().iter().sum();
            if info.player() == 0 {
                assert!(weight > 0.0, "{} got no strategy weight", key);
            } else {
                assert_eq!(info.regrets(), &[0.0, 0.0], "{}", key);
                assert_eq!(weight, 0.0, "{}", key);
                assert_eq!(info.strategy(), &[0.5, 0.5]);
            }
        }
        let jack = solver.storage().get("J:").unwrap();
        assert!(jack.regrets()[1] > 0.0);
    }

    #[test]
    fn test_second_pass_sees_first_players_update() {
        let mut solver = CFRSolver::new(KuhnPoker::new(), CFRConfig::vanilla());
        solver.run_iteration().unwrap();

        // Player 0 commits first and bets every card at the root, so player
        // 1's pass never reaches a pass and those sets learn nothing.
        for key in ["J:", "Q:", "K:"] {
            assert_eq!(solver.get_current_strategy(key, 2), vec![0.0, 1.0], "{}", key);
        }
        let king_after_pass = solver.storage().get("K:p").unwrap();
        assert_eq!(king_after_pass.regrets(), &[0.0, 0.0]);
        assert_eq!(king_after_pass.strategy(), &[0.5, 0.5]);

        // Facing that bet, the Jack's regret carries both deals in full.
        let jack_facing_bet = solver.storage().get("J:b").unwrap();
        assert!((jack_facing_bet.regrets()[0] - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(jack_facing_bet.strategy(), &[1.0, 0.0]);
    }

    #[test]
    fn test_sampled_pass_visits_one_deal() {
        let config = CFRConfig::vanilla().with_chance_sampling(true).with_seed(3);
        let mut solver = CFRSolver::new(KuhnPoker::new(), config);
        let root = solver.game().initial_state();

        solver.cfr_iterate(&root, 0, &[1.0, 1.0], 1.0).unwrap();

        // One private card per player, two decision points each.
        assert_eq!(solver.num_info_sets(), 4);

        solver.run_iteration().unwrap();
        assert!(solver.num_info_sets() <= 12);
        assert_eq!(solver.iteration(), 1);
    }

    #[test]
    fn test_dead_end_state_is_an_error() {
        let mut solver = CFRSolver::new(Stuck, CFRConfig::vanilla());

        assert!(matches!(solver.run_iteration(), Err(CfrError::InvalidState(_))));
        assert!(matches!(
            best_response::exploitability(&Stuck, solver.storage()),
            Err(CfrError::InvalidState(_))
        ));
        assert!(solver.train(10, 1, 0.0).is_err());
    }

    #[test]
    fn test_reset_clears_table() {
        let mut solver = CFRSolver::with_capacity(KuhnPoker::new(), CFRConfig::cfr_plus(), 16);
        for _ in 0..5 {
            solver.run_iteration().unwrap();
        }
        assert!(solver.calculate_exploitability().unwrap() < 11.0 / 24.0);

        solver.reset();
        assert_eq!(solver.iteration(), 0);
        assert_eq!(solver.num_info_sets(), 0);
        assert!(solver.strategy_profile().is_empty());
    }

    #[test]
    fn test_action_names_follow_game_labels() {
        let mut solver = CFRSolver::new(KuhnPoker::new(), CFRConfig::default());
        solver.run_iteration().unwrap();

        assert_eq!(
            solver.get_action_names("Q:pb"),
            Some(vec!["Pass".to_string(), "Bet".to_string()])
        );
        assert_eq!(solver.info_set_keys().last().map(String::as_str), Some("Q:pb"));
    }

    #[test]
    fn test_schedule_validation() {
        assert!(validate_schedule(10, 1, 0.0).is_ok());
        assert!(validate_schedule(0, 1, 0.0).is_err());
        assert!(validate_schedule(10, 0, 0.0).is_err());
        assert!(validate_schedule(10, 1, f64::NAN).is_err());
    }
}
