//! Integration tests: every CFR variant on Kuhn Poker.
//!
//! These run the full pipeline (traversal, discounting, exploitability,
//! early stopping) through the public API only.

use cfr_solver::cfr::{CFRConfig, CFRSolver, CfrError, IterationStats};
use cfr_solver::games::kuhn::KuhnPoker;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Never satisfied, so training always uses the full iteration budget.
const NO_EARLY_STOP: f64 = 0.0;

fn solver(config: CFRConfig) -> CFRSolver<KuhnPoker> {
    CFRSolver::new(KuhnPoker::new(), config)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn all_variants() -> Vec<CFRConfig> {
    vec![
        CFRConfig::vanilla(),
        CFRConfig::cfr_plus(),
        CFRConfig::linear(),
        CFRConfig::discounted(),
    ]
}

// ---------------------------------------------------------------------------
// Convergence
// ---------------------------------------------------------------------------

#[test]
fn vanilla_cfr_converges_on_kuhn() {
    let mut solver = solver(CFRConfig::vanilla());
    let report = solver.train(10_000, 1, NO_EARLY_STOP).unwrap();

    assert_eq!(report.iterations, 10_000);
    assert!(!report.stopped_early);
    assert_eq!(report.exploitability.len(), 10_000);
    assert_eq!(solver.num_info_sets(), 12);

    let final_exploitability = report.final_exploitability().unwrap();
    assert!(
        final_exploitability < 0.05,
        "exploitability {} should be below 0.05",
        final_exploitability
    );

    // Decreasing in expectation: late iterations beat early ones.
    let early = mean(&report.exploitability[..100]);
    let late = mean(&report.exploitability[report.exploitability.len() - 100..]);
    assert!(late < early, "late {} vs early {}", late, early);
}

#[test]
fn vanilla_cfr_finds_equilibrium_strategy() {
    let mut solver = solver(CFRConfig::vanilla());
    solver.train(10_000, 1, NO_EARLY_STOP).unwrap();

    // Index 0 = Pass, index 1 = Bet.
    let jack = solver.get_average_strategy("J:", 2);
    let queen = solver.get_average_strategy("Q:", 2);
    let king = solver.get_average_strategy("K:", 2);

    assert!(jack[1] < 0.4, "Jack bluffs at most 1/3: {:?}", jack);
    assert!(queen[0] > 0.95, "Queen always checks: {:?}", queen);
    assert!(
        (king[1] - 3.0 * jack[1]).abs() < 0.1,
        "King bets three times as often as Jack: {:?} vs {:?}",
        king,
        jack
    );

    let p2_jack_vs_bet = solver.get_average_strategy("J:b", 2);
    let p2_queen_vs_bet = solver.get_average_strategy("Q:b", 2);
    let p2_king_vs_bet = solver.get_average_strategy("K:b", 2);
    assert!(p2_jack_vs_bet[0] > 0.95, "P2 Jack folds: {:?}", p2_jack_vs_bet);
    assert!(p2_king_vs_bet[1] > 0.95, "P2 King calls: {:?}", p2_king_vs_bet);
    assert!(
        p2_queen_vs_bet[1] > 0.25 && p2_queen_vs_bet[1] < 0.42,
        "P2 Queen calls about 1/3: {:?}",
        p2_queen_vs_bet
    );

    let p2_king_after_pass = solver.get_average_strategy("K:p", 2);
    assert!(p2_king_after_pass[1] > 0.95);
}

#[test]
fn discounted_cfr_converges_no_slower_than_vanilla() {
    let threshold = 0.01;

    let vanilla = solver(CFRConfig::vanilla())
        .train(2_000, 1, NO_EARLY_STOP)
        .unwrap();
    let discounted = solver(CFRConfig::discounted())
        .train(2_000, 1, NO_EARLY_STOP)
        .unwrap();

    let vanilla_iters = vanilla
        .iterations_to_reach(threshold)
        .expect("vanilla reaches the threshold");
    let discounted_iters = discounted
        .iterations_to_reach(threshold)
        .expect("DCFR reaches the threshold");

    assert!(
        discounted_iters <= vanilla_iters,
        "DCFR needed {} iterations, vanilla {}",
        discounted_iters,
        vanilla_iters
    );
}

#[test]
fn every_variant_improves_on_uniform_play() {
    for config in all_variants() {
        let variant = config.variant;
        let report = solver(config).train(1_000, 1, NO_EARLY_STOP).unwrap();

        // The uniform profile of iteration 1 is exploitable by 11/24.
        assert!((report.exploitability[0] - 11.0 / 24.0).abs() < 1e-9);
        let last = report.final_exploitability().unwrap();
        assert!(last < 0.05, "{} ended at {}", variant, last);
    }
}

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

#[test]
fn strategies_are_distributions_every_iteration() {
    for config in all_variants() {
        let floored = config.discount.floor_regret;
        let variant = config.variant;
        let mut solver = solver(config);

        for _ in 0..200 {
            solver.run_iteration().unwrap();

            for (key, info) in solver.storage().iter() {
                let total: f64 = info.strategy().iter().sum();
                assert!((total - 1.0).abs() < 1e-9, "{} {}: {:?}", variant, key, info.strategy());
                assert!(info.strategy().iter().all(|&p| p >= 0.0));

                let avg: f64 = info.average_strategy().iter().sum();
                assert!((avg - 1.0).abs() < 1e-9);

                if floored {
                    assert!(
                        info.regrets().iter().all(|&r| r >= 0.0),
                        "{} {} has negative regret {:?}",
                        variant,
                        key,
                        info.regrets()
                    );
                }
            }
        }
    }
}

#[test]
fn vanilla_keeps_negative_regret() {
    let mut solver = solver(CFRConfig::vanilla());
    for _ in 0..10 {
        solver.run_iteration().unwrap();
    }
    let any_negative = solver
        .storage()
        .iter()
        .any(|(_, info)| info.regrets().iter().any(|&r| r < 0.0));
    assert!(any_negative);
}

#[test]
fn first_two_iterations_at_root_jack() {
    let mut solver = solver(CFRConfig::vanilla());

    // Iteration 1 plays uniformly: zero regret everywhere.
    solver.run_iteration().unwrap();
    assert_eq!(solver.get_average_strategy("J:", 2), vec![0.5, 0.5]);

    let jack = solver.storage().get("J:").expect("root Jack info set");
    assert_eq!(jack.player(), 0);
    assert_eq!(jack.actions(), &["Pass".to_string(), "Bet".to_string()]);
    // Against a uniform opponent betting the Jack is better than passing.
    assert!((jack.regrets()[0] + 0.125).abs() < 1e-12);
    assert!((jack.regrets()[1] - 0.125).abs() < 1e-12);

    // Iteration 2 follows the sign of that regret: pure Bet.
    assert_eq!(jack.strategy(), &[0.0, 1.0]);
    assert_eq!(solver.get_current_strategy("J:", 2), vec![0.0, 1.0]);

    solver.run_iteration().unwrap();
    assert_eq!(solver.get_average_strategy("J:", 2), vec![0.25, 0.75]);

    // The same two iterations through the training loop.
    let report = solver.train(2, 5, NO_EARLY_STOP).unwrap();
    assert_eq!(report.iterations, 2);
    assert_eq!(report.average_strategy["J:"], vec![0.25, 0.75]);
    assert_eq!(report.strategy_change[0], 0.0);
    assert_eq!(report.strategy_change_by_player[0], vec![0.0, 0.0]);
}

// ---------------------------------------------------------------------------
// Training loop
// ---------------------------------------------------------------------------

#[test]
fn generous_tolerance_stops_early() {
    let num_iterations = 1_000;
    let patience = 10;
    let tolerance = 1.0;

    let report = solver(CFRConfig::vanilla())
        .train(num_iterations, patience, tolerance)
        .unwrap();

    assert!(report.stopped_early);
    assert!(report.iterations < num_iterations);
    assert!(report.iterations + patience <= num_iterations);
    assert_eq!(report.exploitability.len() as u64, report.iterations);

    let quiet = &report.strategy_change[report.strategy_change.len() - patience as usize..];
    assert!(quiet.iter().all(|&c| c < tolerance), "{:?}", quiet);
}

#[test]
fn training_is_deterministic() {
    let first = solver(CFRConfig::discounted()).train(300, 1, NO_EARLY_STOP).unwrap();
    let second = solver(CFRConfig::discounted()).train(300, 1, NO_EARLY_STOP).unwrap();

    assert_eq!(first.average_strategy, second.average_strategy);
    assert_eq!(first.exploitability, second.exploitability);
    assert_eq!(first.strategy_change, second.strategy_change);
    assert_eq!(first.total_regret, second.total_regret);
}

#[test]
fn each_run_starts_from_a_fresh_table() {
    let mut solver = solver(CFRConfig::cfr_plus());
    let first = solver.train(100, 1, NO_EARLY_STOP).unwrap();
    let second = solver.train(100, 1, NO_EARLY_STOP).unwrap();

    assert_eq!(solver.iteration(), 100);
    assert_eq!(first.average_strategy, second.average_strategy);
    assert_eq!(first.exploitability, second.exploitability);
    assert_eq!(solver.info_set_keys().len(), 12);
    assert_eq!(solver.info_set_keys()[0], "J:");
}

#[test]
fn callback_sees_every_iteration() {
    let mut seen: Vec<IterationStats> = Vec::new();
    let report = solver(CFRConfig::linear())
        .train_with_callback(50, 1, NO_EARLY_STOP, |stats| seen.push(stats.clone()))
        .unwrap();

    assert_eq!(seen.len(), 50);
    assert_eq!(report.strategy_change_by_player.len(), 50);
    for (i, stats) in seen.iter().enumerate() {
        assert_eq!(stats.iteration, i as u64 + 1);
        assert_eq!(stats.exploitability, report.exploitability[i]);
        assert!(stats.total_regret >= 0.0);

        // Every info set belongs to one of the two players.
        assert_eq!(stats.strategy_change_by_player.len(), 2);
        let split: f64 = stats.strategy_change_by_player.iter().sum();
        assert!((split - stats.strategy_change).abs() < 1e-9);
        assert_eq!(report.strategy_change_by_player[i], stats.strategy_change_by_player);
    }
    assert!(seen[1].strategy_change_by_player.iter().all(|&c| c > 0.0));

    let json = report.to_json().unwrap();
    assert!(json.contains("\"average_strategy\""));
    assert!(json.contains("\"Q:pb\""));
}

#[test]
fn sampled_chance_training_converges() {
    let config = CFRConfig::vanilla().with_chance_sampling(true).with_seed(42);
    let first = solver(config.clone()).train(5_000, 1, NO_EARLY_STOP).unwrap();
    let second = solver(config).train(5_000, 1, NO_EARLY_STOP).unwrap();

    let last = first.final_exploitability().unwrap();
    assert!(last < 0.1, "sampled CFR ended at {}", last);

    // Same seed, same deals.
    assert_eq!(first.average_strategy, second.average_strategy);
    for strategy in first.average_strategy.values() {
        let total: f64 = strategy.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[test]
fn invalid_training_arguments_are_rejected() {
    let mut solver = solver(CFRConfig::vanilla());

    assert!(matches!(
        solver.train(0, 10, 1e-3),
        Err(CfrError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        solver.train(100, 0, 1e-3),
        Err(CfrError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        solver.train(100, 10, -1.0),
        Err(CfrError::InvalidConfiguration(_))
    ));
    assert_eq!(solver.iteration(), 0);
    assert_eq!(solver.num_info_sets(), 0);
}

#[test]
fn malformed_discount_exponents_are_rejected() {
    let config = CFRConfig::new().with_discount(f64::NAN, 0.0, 2.0, true);
    let err = solver(config).train(10, 1, 0.0).unwrap_err();
    assert!(err.to_string().contains("invalid configuration"));
}

#[test]
fn unreached_info_set_is_uniform() {
    let solver = solver(CFRConfig::vanilla());
    assert_eq!(solver.get_average_strategy("K:pbpb", 2), vec![0.5, 0.5]);
    assert!(solver.get_action_names("K:pbpb").is_none());
}

#[test]
fn custom_parameters_match_linear_preset() {
    let custom = solver(CFRConfig::new().with_discount(1.0, 1.0, 1.0, false))
        .train(100, 1, NO_EARLY_STOP)
        .unwrap();
    let linear = solver(CFRConfig::linear()).train(100, 1, NO_EARLY_STOP).unwrap();
    assert_eq!(custom.average_strategy, linear.average_strategy);
}
