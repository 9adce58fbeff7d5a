//! Greedy priority-move simulator.
//!
//! Plays a single line from a position without ever backtracking. Each
//! step takes the first move available in this order:
//!   1. waste -> foundation
//!   2. tableau top -> foundation
//!   3. tableau -> tableau, moving a pile's whole face-up run, only when
//!      that uncovers a face-down card or brings a King to an empty pile
//!   4. waste -> tableau
//!   5. draw, or recycle when the stock is empty.
//!
//! The simulator gives false negatives: a deal it cannot win may still be
//! winnable with a cleverer line. Use `search::solve` when that matters.

use crate::game::{GameState, NUM_TABLEAU_PILES};
use crate::moves::{is_productive_tableau_move, Move, Source};
use crate::rules;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GreedyLimits {
    /// Total moves before giving up.
    pub max_moves: u32,
    /// Recycles allowed without a non-stock move in between.
    pub max_idle_recycles: u32,
}

impl Default for GreedyLimits {
    fn default() -> Self {
        GreedyLimits {
            max_moves: 1_000,
            max_idle_recycles: 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GreedyTermination {
    Won,
    /// No move of any kind was available.
    NoMoves,
    /// The talon was cycled too often without progress.
    Cycling,
    MoveLimit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GreedyOutcome {
    pub is_win: bool,
    pub moves_played: u32,
    pub termination: GreedyTermination,
    /// The position the simulation stopped in.
    pub final_state: GameState,
}

/// The move the greedy policy plays next, if any.
pub fn next_greedy_move(state: &GameState) -> Option<Move> {
    if let Some(card) = state.waste.top() {
        if let Some(foundation) = rules::find_auto_move(card, state) {
            return Some(Move::ToFoundation {
                from: Source::Waste,
                foundation: foundation as u8,
            });
        }
    }

    for (idx, pile) in state.tableau.iter().enumerate() {
        if let Some(card) = pile.top() {
            if let Some(foundation) = rules::find_auto_move(card, state) {
                return Some(Move::ToFoundation {
                    from: Source::tableau_top(idx),
                    foundation: foundation as u8,
                });
            }
        }
    }

    for (src_idx, pile) in state.tableau.iter().enumerate() {
        let start = pile.face_up_start();
        if start >= pile.len() {
            continue;
        }
        let card = pile.as_slice()[start];
        let to = (0..NUM_TABLEAU_PILES).find(|&dst| {
            dst != src_idx
                && rules::can_place_on_tableau(card, state.tableau[dst].as_slice())
                && is_productive_tableau_move(pile, start, &state.tableau[dst])
        });
        if let Some(to) = to {
            return Some(Move::ToTableau {
                from: Source::Tableau {
                    pile: src_idx as u8,
                    count: (pile.len() - start) as u8,
                },
                to: to as u8,
            });
        }
    }

    if let Some(card) = state.waste.top() {
        if let Some(to) = rules::find_valid_tableau_destination(card, state) {
            return Some(Move::ToTableau {
                from: Source::Waste,
                to: to as u8,
            });
        }
    }

    if !state.stock.is_empty() {
        Some(Move::Draw)
    } else if !state.waste.is_empty() {
        Some(Move::Recycle)
    } else {
        None
    }
}

/// Play the greedy line from `start` until it wins or gets stuck.
pub fn simulate(start: &GameState, limits: GreedyLimits) -> GreedyOutcome {
    let mut state = *start;
    let mut moves_played = 0u32;
    let mut idle_recycles = 0u32;

    let termination = loop {
        if state.is_won() {
            break GreedyTermination::Won;
        }
        if moves_played >= limits.max_moves {
            break GreedyTermination::MoveLimit;
        }
        let Some(mv) = next_greedy_move(&state) else {
            break GreedyTermination::NoMoves;
        };

        match mv {
            Move::Recycle => {
                idle_recycles += 1;
                if idle_recycles > limits.max_idle_recycles {
                    break GreedyTermination::Cycling;
                }
            }
            Move::Draw => {}
            _ => idle_recycles = 0,
        }

        mv.apply(&mut state);
        moves_played += 1;
    };

    GreedyOutcome {
        is_win: termination == GreedyTermination::Won,
        moves_played,
        termination,
        final_state: state,
    }
}

/// True if the greedy line from `state` wins within the default limits.
pub fn can_solve_greedy(state: &GameState) -> bool {
    simulate(state, GreedyLimits::default()).is_win
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, Rank, Suit};
    use crate::game::DrawMode;
    use crate::pile::Pile;

    fn up(code: &str) -> Card {
        code.parse::<Card>().unwrap().turned_up()
    }

    fn down(code: &str) -> Card {
        code.parse::<Card>().unwrap()
    }

    fn foundations_through(state: &mut GameState, ranks: usize) {
        for (i, &suit) in Suit::ALL.iter().enumerate() {
            for &rank in Rank::ALL.iter().take(ranks) {
                state.foundations[i].push(Card::new(suit, rank).turned_up());
            }
        }
    }

    #[test]
    fn plays_out_an_easy_endgame() {
        let mut state = GameState::empty(DrawMode::One);
        foundations_through(&mut state, 11);
        state.tableau[0] = Pile::from_slice(&[down("KH"), up("QS")]);
        state.tableau[1] = Pile::from_slice(&[up("KS"), up("QH")]);
        state.tableau[2] = Pile::from_slice(&[up("KC")]);
        state.stock = Pile::from_slice(&[down("KD"), down("QC"), down("QD")]);

        let outcome = simulate(&state, GreedyLimits::default());
        assert!(outcome.is_win);
        assert_eq!(outcome.termination, GreedyTermination::Won);
        assert!(outcome.final_state.is_won());
        assert!(can_solve_greedy(&state));
    }

    #[test]
    fn priority_order() {
        let mut state = GameState::empty(DrawMode::One);
        state.tableau[0] = Pile::from_slice(&[down("2C"), up("9H")]);
        state.tableau[1] = Pile::from_slice(&[up("TS")]);
        state.tableau[2] = Pile::from_slice(&[up("AD")]);
        state.waste = Pile::from_slice(&[up("9C")]);
        state.stock = Pile::from_slice(&[down("5S")]);

        // Tableau top to foundation beats everything below it.
        assert_eq!(
            next_greedy_move(&state),
            Some(Move::ToFoundation {
                from: Source::tableau_top(2),
                foundation: 0
            })
        );

        // Then the uncovering tableau move, ahead of waste -> tableau.
        state.tableau[2] = Pile::from_slice(&[up("TD")]);
        assert_eq!(
            next_greedy_move(&state),
            Some(Move::ToTableau {
                from: Source::tableau_top(0),
                to: 1
            })
        );

        // With nothing to uncover, the waste card goes to the tableau.
        state.tableau[0] = Pile::from_slice(&[up("9H")]);
        assert_eq!(
            next_greedy_move(&state),
            Some(Move::ToTableau {
                from: Source::Waste,
                to: 2
            })
        );

        state.waste.clear();
        assert_eq!(next_greedy_move(&state), Some(Move::Draw));
    }

    #[test]
    fn cycling_talon_gives_up() {
        // Nothing in the talon ever fits: the simulator recycles a bounded
        // number of times and then stops.
        let mut state = GameState::empty(DrawMode::One);
        state.tableau[0] = Pile::from_slice(&[up("KS")]);
        state.stock = Pile::from_slice(&[down("5C"), down("9D")]);

        let outcome = simulate(&state, GreedyLimits::default());
        assert!(!outcome.is_win);
        assert_eq!(outcome.termination, GreedyTermination::Cycling);
        // Two draws per pass, four passes, three recycles in between.
        assert_eq!(outcome.moves_played, 4 * 2 + 3);
    }

    #[test]
    fn move_limit_is_respected() {
        let mut state = GameState::empty(DrawMode::One);
        state.tableau[0] = Pile::from_slice(&[up("KS")]);
        state.stock = Pile::from_slice(&[down("5C"), down("9D")]);

        let limits = GreedyLimits {
            max_moves: 5,
            max_idle_recycles: 3,
        };
        let outcome = simulate(&state, limits);
        assert_eq!(outcome.termination, GreedyTermination::MoveLimit);
        assert_eq!(outcome.moves_played, 5);
    }

    #[test]
    fn empty_talon_without_moves_is_stuck() {
        let mut state = GameState::empty(DrawMode::Three);
        state.tableau[0] = Pile::from_slice(&[down("AH"), up("5S")]);
        let outcome = simulate(&state, GreedyLimits::default());
        assert_eq!(outcome.termination, GreedyTermination::NoMoves);
        assert_eq!(outcome.moves_played, 0);
    }
}
