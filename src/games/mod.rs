//! Game implementations for the CFR solver.
//!
//! Games with known Nash equilibria validate the engine and show how to
//! implement the `Game` trait.
//!
//! ## Available Games
//!
//! - [`kuhn`]: Kuhn Poker, a 3-card poker game with a known equilibrium
//!
//! ## Adding New Games
//!
//! 1. Create a new module under `src/games/`
//! 2. Define state, action, and info state types
//! 3. Implement the `Game` trait, including `chance_outcomes` if the game
//!    has chance nodes
//! 4. Add tests that verify expected behavior

pub mod kuhn;
