//! Exact best response and exploitability for small games.
//!
//! The best response respects information sets: the exploiter commits to one
//! action per information set, chosen against every state it cannot tell
//! apart, weighted by how likely chance and the opponents are to reach it.
//! Information sets are decided deepest first so that the value of every
//! deeper decision is already fixed when a shallower one is evaluated. This
//! relies on perfect recall, which guarantees that all states of a set sit
//! at the same depth in the exploiter's own action sequence.

use rustc_hash::FxHashMap;

use crate::cfr::error::CfrError;
use crate::cfr::game::{decision_point, Game, InfoState};
use crate::cfr::storage::InfoSetStore;

/// States of one exploiter information set and their reach weights.
struct ExploiterNodes<S> {
    own_depth: usize,
    num_actions: usize,
    states: Vec<(S, f64)>,
}

/// Exploitability of the average strategies stored in `store`.
///
/// Mean over players of what a best responder gains over playing the
/// average profile itself. Zero exactly at a Nash equilibrium.
pub fn exploitability<G: Game>(game: &G, store: &InfoSetStore) -> Result<f64, CfrError> {
    let root = game.initial_state();
    let num_players = game.num_players();
    let mut total = 0.0;

    for exploiter in 0..num_players {
        let br_value = best_response_value(game, store, &root, exploiter)?;
        let strategy_value = profile_value(game, store, &root, exploiter)?;
        total += br_value - strategy_value;
    }

    Ok(total / num_players as f64)
}

/// Value `exploiter` obtains by best-responding to the average strategies
/// of everyone else.
pub fn best_response_value<G: Game>(
    game: &G,
    store: &InfoSetStore,
    root: &G::State,
    exploiter: usize,
) -> Result<f64, CfrError> {
    let mut nodes: FxHashMap<String, ExploiterNodes<G::State>> = FxHashMap::default();
    collect_nodes(game, store, root, exploiter, 1.0, 0, &mut nodes)?;

    let mut order: Vec<(usize, String)> = nodes
        .iter()
        .map(|(key, group)| (group.own_depth, key.clone()))
        .collect();
    order.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    let mut choices: FxHashMap<String, usize> = FxHashMap::default();
    for (_, key) in order {
        let group = &nodes[&key];
        let mut best_action = 0;
        let mut best_value = f64::NEG_INFINITY;

        for a in 0..group.num_actions {
            let mut value = 0.0;
            for (state, reach) in &group.states {
                let actions = game.available_actions(state);
                let child = game.apply_action(state, &actions[a])?;
                value += reach * respond(game, store, &child, exploiter, &choices)?;
            }
            if value > best_value {
                best_value = value;
                best_action = a;
            }
        }
        choices.insert(key, best_action);
    }

    respond(game, store, root, exploiter, &choices)
}

/// Expected value for `player` when every player follows the average profile.
pub fn profile_value<G: Game>(
    game: &G,
    store: &InfoSetStore,
    state: &G::State,
    player: usize,
) -> Result<f64, CfrError> {
    if game.is_terminal(state) {
        return Ok(game.get_payoff(state, player));
    }

    if game.is_chance(state) {
        let mut value = 0.0;
        for (child, prob) in game.chance_outcomes(state) {
            value += prob * profile_value(game, store, &child, player)?;
        }
        return Ok(value);
    }

    let (_, actions) = decision_point(game, state)?;
    let key = game.info_state(state).key();
    let strategy = store.get_average_strategy(&key, actions.len());

    let mut value = 0.0;
    for (action, prob) in actions.iter().zip(strategy) {
        let child = game.apply_action(state, action)?;
        value += prob * profile_value(game, store, &child, player)?;
    }
    Ok(value)
}

/// Gather every exploiter decision state with its chance-and-opponent reach.
fn collect_nodes<G: Game>(
    game: &G,
    store: &InfoSetStore,
    state: &G::State,
    exploiter: usize,
    reach: f64,
    own_depth: usize,
    nodes: &mut FxHashMap<String, ExploiterNodes<G::State>>,
) -> Result<(), CfrError> {
    if game.is_terminal(state) {
        return Ok(());
    }

    if game.is_chance(state) {
        for (child, prob) in game.chance_outcomes(state) {
            collect_nodes(game, store, &child, exploiter, reach * prob, own_depth, nodes)?;
        }
        return Ok(());
    }

    let (player, actions) = decision_point(game, state)?;
    let key = game.info_state(state).key();

    if player == exploiter {
        nodes
            .entry(key)
            .or_insert_with(|| ExploiterNodes {
                own_depth,
                num_actions: actions.len(),
                states: Vec::new(),
            })
            .states
            .push((state.clone(), reach));

        for action in &actions {
            let child = game.apply_action(state, action)?;
            collect_nodes(game, store, &child, exploiter, reach, own_depth + 1, nodes)?;
        }
    } else {
        let strategy = store.get_average_strategy(&key, actions.len());
        for (action, prob) in actions.iter().zip(strategy) {
            let child = game.apply_action(state, action)?;
            collect_nodes(game, store, &child, exploiter, reach * prob, own_depth, nodes)?;
        }
    }

    Ok(())
}

/// Value for the exploiter following `choices` against the average profile.
fn respond<G: Game>(
    game: &G,
    store: &InfoSetStore,
    state: &G::State,
    exploiter: usize,
    choices: &FxHashMap<String, usize>,
) -> Result<f64, CfrError> {
    if game.is_terminal(state) {
        return Ok(game.get_payoff(state, exploiter));
    }

    if game.is_chance(state) {
        let mut value = 0.0;
        for (child, prob) in game.chance_outcomes(state) {
            value += prob * respond(game, store, &child, exploiter, choices)?;
        }
        return Ok(value);
    }

    let (player, actions) = decision_point(game, state)?;
    let key = game.info_state(state).key();

    if player == exploiter {
        match choices.get(&key) {
            Some(&a) => {
                let child = game.apply_action(state, &actions[a])?;
                respond(game, store, &child, exploiter, choices)
            }
            // Not decided yet: only happens for sets deeper than the one
            // being evaluated, which perfect recall rules out.
            None => {
                let mut best = f64::NEG_INFINITY;
                for action in &actions {
                    let child = game.apply_action(state, action)?;
                    best = best.max(respond(game, store, &child, exploiter, choices)?);
                }
                Ok(best)
            }
        }
    } else {
        let strategy = store.get_average_strategy(&key, actions.len());
        let mut value = 0.0;
        for (action, prob) in actions.iter().zip(strategy) {
            let child = game.apply_action(state, action)?;
            value += prob * respond(game, store, &child, exploiter, choices)?;
        }
        Ok(value)
    }
}
