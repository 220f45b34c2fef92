//! # CFR Solver
//!
//! Counterfactual Regret Minimization for small two-player zero-sum games
//! with imperfect information.
//!
//! ## Features
//!
//! - **Generic engine**: works with any game implementing the `Game` trait
//! - **Four variants, one algorithm**: CFR, CFR+, Linear CFR and Discounted
//!   CFR differ only in their discount parameters
//! - **Exact exploitability**: information-set best response over the full tree
//! - **Early stopping**: halts once the average strategy stops moving
//!
//! ## Quick Start
//!
//! ```
//! use cfr_solver::{CFRConfig, CFRSolver};
//! use cfr_solver::games::kuhn::KuhnPoker;
//!
//! let mut solver = CFRSolver::new(KuhnPoker::new(), CFRConfig::discounted());
//! let report = solver.train(500, 20, 1e-4).unwrap();
//!
//! let queen = solver.get_average_strategy("Q:", 2);
//! assert!(queen[0] > 0.9); // Queen checks at the root
//! assert!(report.final_exploitability().unwrap() < 0.05);
//! ```
//!
//! ## Modules
//!
//! - [`cfr`]: Core CFR algorithm and solver
//! - [`games`]: Game implementations (Kuhn Poker)

#![warn(missing_docs)]

/// CFR (Counterfactual Regret Minimization) engine.
pub mod cfr;

/// Game implementations.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use cfr::{
    Action, CFRConfig, CFRSolver, CfrError, CfrVariant, Game, GameState, InfoState,
    TrainingReport,
};
