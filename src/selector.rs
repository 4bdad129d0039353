//! Next-move selection over the connection graph.
//!
//! Pure functions: given the move catalog, the connection list and the
//! move being danced, pick the move to announce next. A dead end (no
//! usable, resolvable connection) is a normal outcome signalled with
//! `None`, never an error; callers must branch on it.

use crate::catalog::{Connection, Move, SMOOTHNESS_MAX, SMOOTHNESS_MIN};
use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;

/// The outcome of a selection step: the move to dance next, plus the
/// connection's note if the edge carried one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextMove {
    pub to: Move,
    pub note: Option<String>,
}

/// Pick the next move from `from`.
///
/// Eligibility: a connection counts only if it departs from `from` and is
/// marked `works`, and its target id resolves to a move in `moves` (the
/// catalog and connection list may be out of sync after hand edits).
///
/// With `priority_mode` off the pick is uniform over the eligible pairs.
/// With it on, each pair is weighted by its smoothness clamped into
/// [1, 5] and drawn by cumulative weight, so a smoothness-5 edge is
/// picked five times as often as a smoothness-1 edge. A non-positive
/// total weight cannot occur after clamping, but if it ever does the
/// draw falls back to uniform rather than failing.
///
/// The generator is injected so callers can seed it; selection itself has
/// no side effects.
#[must_use]
pub fn select_next<R: Rng + ?Sized>(
    moves: &[Move],
    connections: &[Connection],
    from: &Move,
    priority_mode: bool,
    rng: &mut R,
) -> Option<NextMove> {
    let eligible: Vec<&Connection> = connections
        .iter()
        .filter(|c| c.from_id == from.id && c.works)
        .collect();
    if eligible.is_empty() {
        trace!("No usable connection from '{}'", from.id);
        return None;
    }

    let resolved: Vec<(&Move, &Connection)> = eligible
        .iter()
        .filter_map(|c| moves.iter().find(|m| m.id == c.to_id).map(|m| (m, *c)))
        .collect();
    if resolved.is_empty() {
        trace!("Connections from '{}' point at unknown moves", from.id);
        return None;
    }

    let picked = if priority_mode {
        weighted_pick(&resolved, rng).unwrap_or_else(|| uniform_pick(&resolved, rng))
    } else {
        uniform_pick(&resolved, rng)
    };

    let (mov, conn) = picked;
    trace!("Selected '{}' after '{}'", mov.id, from.id);
    Some(NextMove {
        to: mov.clone(),
        note: conn.notes.clone(),
    })
}

fn uniform_pick<'a, R: Rng + ?Sized>(
    resolved: &[(&'a Move, &'a Connection)],
    rng: &mut R,
) -> (&'a Move, &'a Connection) {
    *resolved.choose(rng).expect("resolved set is non-empty")
}

/// Cumulative-sum weighted draw. Returns `None` only on a non-positive
/// total weight, which the caller treats as a cue to go uniform.
fn weighted_pick<'a, R: Rng + ?Sized>(
    resolved: &[(&'a Move, &'a Connection)],
    rng: &mut R,
) -> Option<(&'a Move, &'a Connection)> {
    let weights: Vec<u32> = resolved
        .iter()
        .map(|(_, c)| c.smoothness.clamp(SMOOTHNESS_MIN, SMOOTHNESS_MAX) as u32)
        .collect();
    let total: u32 = weights.iter().sum();
    if total == 0 {
        return None;
    }

    let mut r = rng.gen_range(0..total);
    for (pair, weight) in resolved.iter().zip(&weights) {
        if r < *weight {
            return Some(*pair);
        }
        r -= weight;
    }
    // Unreachable: r < total and the weights sum to total.
    resolved.last().copied()
}
