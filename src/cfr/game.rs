//! Game trait definition for the CFR engine.
//!
//! Any game that implements the `Game` trait can be solved by the engine.
//! The trait is a capability set rather than a hierarchy: adding a game never
//! requires touching the solver.

use std::fmt::Debug;
use std::hash::Hash;

use rand::Rng;

use crate::cfr::error::CfrError;

/// Trait for actions that can be taken in a game.
///
/// Actions are immutable labels; they carry no logic of their own.
pub trait Action: Clone + Eq + Hash + Debug {
    /// Short label used in histories and error messages.
    fn to_string(&self) -> String;
}

/// Trait for information states (what a player knows at a decision point).
///
/// Two game states that look identical to the acting player (same private
/// information, same public history) must produce the same key.
pub trait InfoState: Clone + Eq + Hash + Debug {
    /// Unique string key for this information state.
    fn key(&self) -> String;
}

/// Marker trait for game states.
///
/// A game state contains everything about one node of the tree, including
/// private information the players cannot see.
pub trait GameState: Clone + Debug {}

/// The interface a game exposes to the engine.
///
/// # Example
/// ```ignore
/// struct MyGame;
///
/// impl Game for MyGame {
///     type State = MyGameState;
///     type Action = MyAction;
///     type InfoState = MyInfoState;
///
///     // ... implement required methods
/// }
/// ```
pub trait Game: Clone {
    /// The type representing a complete game state.
    type State: GameState;

    /// The type representing an action a player can take.
    type Action: Action;

    /// The type representing what a player knows at a decision point.
    type InfoState: InfoState;

    /// Create the root of the game tree.
    fn initial_state(&self) -> Self::State;

    /// Check if the given state is terminal (game over).
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Payoff for `player` at a terminal state.
    ///
    /// Only meaningful for terminal states.
    fn get_payoff(&self, state: &Self::State, player: usize) -> f64;

    /// Index of the player who acts at `state`.
    ///
    /// Returns `None` at terminal and chance nodes.
    fn current_player(&self, state: &Self::State) -> Option<usize>;

    /// Total number of players in the game.
    fn num_players(&self) -> usize;

    /// Legal actions for the acting player; empty at terminal and chance nodes.
    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Apply an action and return the child state.
    ///
    /// The input state is left untouched. Fails with
    /// [`CfrError::InvalidAction`] if `action` is not legal at `state`.
    fn apply_action(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Result<Self::State, CfrError>;

    /// Information state for the player acting at `state`.
    fn info_state(&self, state: &Self::State) -> Self::InfoState;

    /// Check if `state` is a chance node.
    fn is_chance(&self, _state: &Self::State) -> bool {
        false
    }

    /// Every outcome of a chance node together with its probability.
    ///
    /// Probabilities must sum to 1. Games without chance nodes can keep the
    /// default empty list.
    fn chance_outcomes(&self, _state: &Self::State) -> Vec<(Self::State, f64)> {
        Vec::new()
    }

    /// Sample a single outcome of a chance node.
    ///
    /// The default draws from [`Game::chance_outcomes`] by cumulative
    /// probability and returns the state unchanged if there are none.
    fn sample_chance<R: Rng>(&self, state: &Self::State, rng: &mut R) -> Self::State {
        let mut outcomes = self.chance_outcomes(state);
        let r: f64 = rng.gen();
        let mut cumsum = 0.0;
        let mut chosen = outcomes.len().saturating_sub(1);

        for (i, (_, prob)) in outcomes.iter().enumerate() {
            cumsum += prob;
            if r < cumsum {
                chosen = i;
                break;
            }
        }

        if outcomes.is_empty() {
            return state.clone();
        }
        outcomes.swap_remove(chosen).0
    }

    /// Human-readable name for an action.
    fn action_name(&self, action: &Self::Action) -> String {
        Action::to_string(action)
    }
}

/// Acting player and legal actions at a decision state.
///
/// Callers have already handled terminal and chance states, so a missing
/// player or an empty action list is a broken game tree.
pub(crate) fn decision_point<G: Game>(
    game: &G,
    state: &G::State,
) -> Result<(usize, Vec<G::Action>), CfrError> {
    let actions = game.available_actions(state);
    match game.current_player(state) {
        Some(player) if !actions.is_empty() => Ok((player, actions)),
        _ => Err(CfrError::InvalidState(format!("{:?}", state))),
    }
}
