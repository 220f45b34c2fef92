//! CFR (Counterfactual Regret Minimization) engine.
//!
//! This module provides a generic implementation of the CFR algorithm family
//! for computing Nash equilibrium strategies in two-player zero-sum
//! extensive-form games.
//!
//! # Overview
//!
//! CFR is an iterative algorithm that converges to Nash equilibrium by:
//! 1. Computing counterfactual regret for each action at each decision point
//! 2. Updating strategies to minimize regret over time
//! 3. Averaging strategies across iterations to converge to equilibrium
//!
//! # Supported Variants
//!
//! All variants share one traversal and differ only in [`DiscountParams`]:
//!
//! | Variant | α | β | γ | floor |
//! |---|---|---|---|---|
//! | CFR | +inf | +inf | 0 | no |
//! | CFR+ | +inf | -inf | 2 | yes |
//! | LCFR | 1 | 1 | 1 | no |
//! | DCFR | 3/2 | 0 | 2 | yes |
//!
//! # Example
//!
//! ```
//! use cfr_solver::cfr::{CFRConfig, CFRSolver};
//! use cfr_solver::games::kuhn::KuhnPoker;
//!
//! let mut solver = CFRSolver::new(KuhnPoker::new(), CFRConfig::vanilla());
//! let report = solver.train(1_000, 50, 1e-5).unwrap();
//! println!(
//!     "stopped after {} iterations, exploitability {:?}",
//!     report.iterations,
//!     report.final_exploitability()
//! );
//! ```
//!
//! # Theory
//!
//! **Regret Matching**: Set strategy proportional to positive regrets.
//! ```text
//! Strategy(a) = max(0, Regret(a)) / sum(max(0, Regret(a')))
//! ```
//!
//! # References
//!
//! - Zinkevich, M., et al. "Regret Minimization in Games with Incomplete Information" (2007)
//! - Tammelin, O. "Solving Large Imperfect Information Games Using CFR+" (2014)
//! - Brown, N., Sandholm, T. "Solving Imperfect-Information Games via Discounted Regret Minimization" (2019)

pub mod best_response;
pub mod config;
pub mod error;
pub mod game;
pub mod info_set;
pub mod solver;
pub mod storage;

// Re-export main types for convenient access
pub use config::{
    CFRConfig, CfrVariant, DiscountFactors, DiscountParams, IterationStats, TrainingReport,
};
pub use error::CfrError;
pub use game::{Action, Game, GameState, InfoState};
pub use info_set::InfoSet;
pub use solver::CFRSolver;
pub use storage::{InfoSetStore, StrategyProfile};
