//! Exhaustive, bounded depth-first search over the Klondike game tree.
//!
//! The search expands positions with an explicit stack, skips positions
//! whose canonical hash (`game::state_hash64`) it has already expanded,
//! and stops at the first win. Moves come from
//! `moves::generate_search_moves`, which tries foundation moves first.
//!
//! A `false` answer means "no win found within the node budget", not a
//! proof that the deal is unwinnable: the budget can run out, and the
//! canonical hash treats positions that differ only in hidden card order
//! as the same position.

use std::collections::HashSet;

use log::trace;

use crate::game::{state_hash64, GameState};
use crate::moves::{generate_search_moves, Move};

/// How much per-node information the search should emit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetailLevel {
    /// Only the final outcome is reported.
    #[default]
    Summary,
    /// Every expanded node is logged at `trace` level.
    Trace,
}

/// Why a search stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationReason {
    /// Some branch reached four complete foundations.
    Win,
    /// Every reachable position (within the depth limit) was explored
    /// without finding a win.
    Exhausted,
    /// The node budget ran out first.
    MaxNodesReached,
}

/// Limits for a search run. These keep verification time bounded even when
/// recycling makes the state graph cyclic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchLimits {
    /// Hard cap on the number of distinct positions expanded.
    pub max_nodes: u64,
    /// Maximum depth (number of moves from the starting position).
    pub max_depth: u16,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            max_nodes: 5_000,
            max_depth: 1_500,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchConfig {
    pub limits: SearchLimits,
    pub detail: DetailLevel,
}

impl SearchConfig {
    pub fn with_limits(limits: SearchLimits) -> Self {
        SearchConfig {
            limits,
            detail: DetailLevel::Summary,
        }
    }
}

/// Result of searching a single starting position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolveOutcome {
    pub is_win: bool,
    /// If `is_win`, the moves from the starting position to a won one.
    pub winning_line: Option<Vec<Move>>,
    /// Distinct positions expanded.
    pub nodes_visited: u64,
    /// Positions skipped because their hash had already been expanded.
    pub duplicate_states: u64,
    /// Positions not expanded because they sat at the depth limit.
    pub depth_capped: u64,
    /// Deepest position expanded.
    pub max_depth_seen: u16,
    /// Largest size the DFS stack reached.
    pub max_stack: usize,
    pub termination: TerminationReason,
}

/// One entry of the move trail: the move that produced a position and the
/// trail index of the position it was played from.
#[derive(Clone, Copy, Debug)]
struct TrailEntry {
    parent: Option<usize>,
    mv: Move,
}

/// A position waiting on the DFS stack.
#[derive(Clone, Copy, Debug)]
struct Frame {
    state: GameState,
    /// Index into the trail, or `None` for the starting position.
    trail: Option<usize>,
    depth: u16,
}

fn rebuild_line(trail: &[TrailEntry], mut at: Option<usize>) -> Vec<Move> {
    let mut line = Vec::new();
    while let Some(idx) = at {
        line.push(trail[idx].mv);
        at = trail[idx].parent;
    }
    line.reverse();
    line
}

/// Search from `start` for a winning line, within `config.limits`.
pub fn solve(start: &GameState, config: &SearchConfig) -> SolveOutcome {
    let limits = config.limits;
    let tracing = config.detail == DetailLevel::Trace;

    let mut visited: HashSet<u64> = HashSet::new();
    let mut trail: Vec<TrailEntry> = Vec::new();
    let mut stack: Vec<Frame> = vec![Frame {
        state: *start,
        trail: None,
        depth: 0,
    }];

    let mut outcome = SolveOutcome {
        is_win: false,
        winning_line: None,
        nodes_visited: 0,
        duplicate_states: 0,
        depth_capped: 0,
        max_depth_seen: 0,
        max_stack: 1,
        termination: TerminationReason::Exhausted,
    };

    while let Some(frame) = stack.pop() {
        if !visited.insert(state_hash64(&frame.state)) {
            outcome.duplicate_states += 1;
            continue;
        }

        if frame.state.is_won() {
            outcome.is_win = true;
            outcome.winning_line = Some(rebuild_line(&trail, frame.trail));
            outcome.termination = TerminationReason::Win;
            break;
        }

        if outcome.nodes_visited >= limits.max_nodes {
            outcome.termination = TerminationReason::MaxNodesReached;
            break;
        }
        outcome.nodes_visited += 1;
        outcome.max_depth_seen = outcome.max_depth_seen.max(frame.depth);

        if frame.depth >= limits.max_depth {
            outcome.depth_capped += 1;
            continue;
        }

        let moves = generate_search_moves(&frame.state);
        if tracing {
            trace!(
                "node {} depth {} hash {:#018x}: {} moves, stack {}",
                outcome.nodes_visited,
                frame.depth,
                state_hash64(&frame.state),
                moves.len(),
                stack.len()
            );
        }

        // Push in reverse so the first generated move is explored first.
        for mv in moves.into_iter().rev() {
            let mut next = frame.state;
            mv.apply(&mut next);
            if visited.contains(&state_hash64(&next)) {
                outcome.duplicate_states += 1;
                continue;
            }
            trail.push(TrailEntry {
                parent: frame.trail,
                mv,
            });
            stack.push(Frame {
                state: next,
                trail: Some(trail.len() - 1),
                depth: frame.depth + 1,
            });
        }
        outcome.max_stack = outcome.max_stack.max(stack.len());
    }

    outcome
}

/// True if `solve` finds a win with the default limits.
pub fn can_solve(state: &GameState) -> bool {
    solve(state, &SearchConfig::default()).is_win
}
