//! Kuhn Poker.
//!
//! The smallest interesting poker game and the usual correctness check for
//! CFR: its equilibrium is known in closed form, so exploitability and the
//! learned strategies can be compared against exact values.
//!
//! ## Game Rules
//!
//! - Deck of three cards (J < Q < K), one dealt face down to each player
//! - Both players ante 1; a bet or call adds 1 more
//! - Player 1 passes or bets, then player 2 answers; after pass-bet player 1
//!   gets one more decision
//! - A fold hands the pot to the other player, otherwise the higher card wins
//!
//! ## Game Tree
//!
//! ```text
//! Chance (6 deals, 1/6 each)
//! └── P1
//!     ├── Pass
//!     │   └── P2
//!     │       ├── Pass → Showdown (pot = 2)
//!     │       └── Bet
//!     │           └── P1
//!     │               ├── Pass → P2 wins (pot = 3)
//!     │               └── Bet → Showdown (pot = 4)
//!     └── Bet
//!         └── P2
//!             ├── Pass → P1 wins (pot = 3)
//!             └── Bet → Showdown (pot = 4)
//! ```
//!
//! ## Known Nash Equilibrium
//!
//! A one-parameter family, α ∈ [0, 1/3]:
//!
//! - **Player 1 with Jack**: Bet with probability α
//! - **Player 1 with Queen**: Always Pass; call a bet with probability α + 1/3
//! - **Player 1 with King**: Bet with probability 3α
//! - **Player 2 after a bet**: fold J, call Q with probability 1/3, call K
//! - **Player 2 after a pass**: bet J with probability 1/3, pass Q, bet K
//!
//! Player 1 loses 1/18 per hand on average for every α.

use std::fmt;

use crate::cfr::error::CfrError;
use crate::cfr::game::{Action, Game, GameState, InfoState};

/// The three cards of the deck, ordered by rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Card {
    /// Lowest card.
    #[default]
    Jack,
    /// Middle card.
    Queen,
    /// Highest card.
    King,
}

impl Card {
    /// Every card, lowest first.
    pub const ALL: [Card; 3] = [Card::Jack, Card::Queen, Card::King];

    /// Single-letter symbol used in info set keys.
    pub fn symbol(self) -> char {
        match self {
            Card::Jack => 'J',
            Card::Queen => 'Q',
            Card::King => 'K',
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Card::Jack => "Jack",
            Card::Queen => "Queen",
            Card::King => "King",
        };
        write!(f, "{}", name)
    }
}

/// Actions in Kuhn Poker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KuhnAction {
    /// Pass (check if no bet, fold if facing bet)
    Pass,
    /// Bet (or call if facing bet)
    Bet,
}

impl KuhnAction {
    fn symbol(self) -> char {
        match self {
            KuhnAction::Pass => 'p',
            KuhnAction::Bet => 'b',
        }
    }
}

impl Action for KuhnAction {
    fn to_string(&self) -> String {
        self.symbol().to_string()
    }
}

impl fmt::Display for KuhnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KuhnAction::Pass => write!(f, "Pass"),
            KuhnAction::Bet => write!(f, "Bet"),
        }
    }
}

/// Information state in Kuhn Poker.
///
/// What the acting player knows: their card and the public action history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KuhnInfoState {
    /// Acting player (0 = first to act).
    pub player: usize,
    /// Acting player's private card.
    pub card: Card,
    /// Action history as string (e.g., "pb" = pass then bet)
    pub history: String,
}

impl InfoState for KuhnInfoState {
    /// `"<card>:<history>"`, e.g. `"J:"` or `"Q:pb"`. The history fixes the
    /// acting player, so the player index is not repeated in the key.
    fn key(&self) -> String {
        format!("{}:{}", self.card.symbol(), self.history)
    }
}

impl fmt::Display for KuhnInfoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{} {}|{}", self.player + 1, self.card, self.history)
    }
}

/// Complete game state in Kuhn Poker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KuhnState {
    /// Cards dealt to each player; `cards[0]` belongs to player 1.
    pub cards: [Card; 2],
    /// Action history as string
    pub history: String,
    /// Amount each player has invested in the pot
    pub pot: [i32; 2],
    /// Whether cards have been dealt (for chance node handling)
    pub dealt: bool,
}

impl GameState for KuhnState {}

impl Default for KuhnState {
    fn default() -> Self {
        Self {
            cards: [Card::Jack, Card::Jack],
            history: String::new(),
            pot: [1, 1], // Both ante 1
            dealt: false,
        }
    }
}

impl KuhnState {
    /// State right after dealing `cards`, before anyone has acted.
    pub fn dealt(cards: [Card; 2]) -> Self {
        Self {
            cards,
            dealt: true,
            ..Default::default()
        }
    }
}

impl fmt::Display for KuhnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P1:{} P2:{} History:{} Pot:{:?}",
            self.cards[0].symbol(),
            self.cards[1].symbol(),
            self.history,
            self.pot
        )
    }
}

/// Kuhn Poker game.
#[derive(Debug, Clone, Default)]
pub struct KuhnPoker;

impl KuhnPoker {
    /// Create a new Kuhn Poker game.
    pub fn new() -> Self {
        Self
    }

    /// All six ordered deals of two distinct cards.
    pub fn deals() -> Vec<[Card; 2]> {
        let mut deals = Vec::with_capacity(6);
        for &first in &Card::ALL {
            for &second in &Card::ALL {
                if first != second {
                    deals.push([first, second]);
                }
            }
        }
        deals
    }
}

impl Game for KuhnPoker {
    type State = KuhnState;
    type Action = KuhnAction;
    type InfoState = KuhnInfoState;

    fn initial_state(&self) -> Self::State {
        KuhnState::default()
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        // "pp" showdown, "bp"/"pbp" fold, "bb"/"pbb" called showdown
        matches!(state.history.as_str(), "pp" | "pbp" | "pbb" | "bp" | "bb")
    }

    fn get_payoff(&self, state: &Self::State, player: usize) -> f64 {
        debug_assert!(self.is_terminal(state), "get_payoff called on non-terminal state");

        // The winner collects whatever the loser put in.
        let p0_wins = match state.history.as_str() {
            "bp" => true,
            "pbp" => false,
            "pp" | "bb" | "pbb" => state.cards[0] > state.cards[1],
            _ => return 0.0,
        };
        let p0_payoff = if p0_wins {
            f64::from(state.pot[1])
        } else {
            -f64::from(state.pot[0])
        };

        if player == 0 {
            p0_payoff
        } else {
            -p0_payoff
        }
    }

    fn current_player(&self, state: &Self::State) -> Option<usize> {
        if self.is_chance(state) {
            return None;
        }

        match state.history.as_str() {
            "" => Some(0),   // P1 acts first
            "p" => Some(1),  // P2 responds to pass
            "b" => Some(1),  // P2 responds to bet
            "pb" => Some(0), // P1 responds to P2's bet after pass
            _ => None,       // Terminal
        }
    }

    fn num_players(&self) -> usize {
        2
    }

    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if self.current_player(state).is_none() {
            return vec![];
        }
        vec![KuhnAction::Pass, KuhnAction::Bet]
    }

    fn apply_action(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Result<Self::State, CfrError> {
        let player = self
            .current_player(state)
            .ok_or_else(|| CfrError::InvalidAction {
                action: action.symbol().to_string(),
                history: state.history.clone(),
            })?;

        let mut new_state = state.clone();
        new_state.history.push(action.symbol());
        if *action == KuhnAction::Bet {
            new_state.pot[player] += 1;
        }
        Ok(new_state)
    }

    fn info_state(&self, state: &Self::State) -> Self::InfoState {
        let player = self.current_player(state).unwrap_or(0);
        KuhnInfoState {
            player,
            card: state.cards[player],
            history: state.history.clone(),
        }
    }

    fn is_chance(&self, state: &Self::State) -> bool {
        !state.dealt
    }

    fn chance_outcomes(&self, state: &Self::State) -> Vec<(Self::State, f64)> {
        if !self.is_chance(state) {
            return Vec::new();
        }
        let deals = Self::deals();
        let prob = 1.0 / deals.len() as f64;
        deals
            .into_iter()
            .map(|cards| (KuhnState::dealt(cards), prob))
            .collect()
    }

    fn action_name(&self, action: &Self::Action) -> String {
        format!("{}", action)
    }
}
