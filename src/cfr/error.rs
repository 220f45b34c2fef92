//! Errors raised by games and the CFR engine.

use thiserror::Error;

/// Errors that can occur while building a solver or walking a game tree.
///
/// All variants are usage errors: nothing here is transient, so callers
/// should fix the input rather than retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CfrError {
    /// An action was applied at a state where it is not legal.
    #[error("action `{action}` is not legal after history `{history}`")]
    InvalidAction {
        /// Label of the rejected action.
        action: String,
        /// Public history of the state it was applied to.
        history: String,
    },

    /// A non-terminal, non-chance state has no acting player or no legal
    /// actions, which means the `Game` implementation is inconsistent.
    #[error("dead end in game tree at {0}")]
    InvalidState(String),

    /// The solver configuration or training arguments were rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
