//! Move representation, application, and generation for Klondike.
//!
//! This module defines a compact `Move` type plus:
//!   - `Move::apply`, which mutates a `GameState` in place (flipping any
//!     newly exposed tableau card)
//!   - `Move::is_legal`, the rules check used by interactive play
//!   - `generate_legal_moves`, which lists everything legal in a position
//!   - `generate_search_moves`, the filtered, ordered list the exhaustive
//!     solver expands
//!   - `suggest_move`, a one-step hint for a player.
//!
//! Indices are 0-based internally but printed 1-based for humans.

use serde::{Deserialize, Serialize};

use crate::card::{Card, Rank};
use crate::game::{GameState, TableauPile, NUM_TABLEAU_PILES};
use crate::pile::Pile;
use crate::rules::{self, PileKind};

/// Where the cards of a move come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// The top card of the waste.
    Waste,
    /// The top `count` cards of tableau pile `pile`.
    Tableau { pile: u8, count: u8 },
}

impl Source {
    /// The single top card of tableau pile `pile`.
    #[inline]
    pub fn tableau_top(pile: usize) -> Self {
        Source::Tableau {
            pile: pile as u8,
            count: 1,
        }
    }

    pub fn kind(self) -> PileKind {
        match self {
            Source::Waste => PileKind::Waste,
            Source::Tableau { .. } => PileKind::Tableau,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Source::Waste => 0,
            Source::Tableau { pile, .. } => pile as usize,
        }
    }

    /// The selected cards, bottom-most first, or `None` if the selection
    /// is empty or reaches past the bottom of the pile.
    pub fn cards(self, state: &GameState) -> Option<&[Card]> {
        match self {
            Source::Waste => (!state.waste.is_empty()).then(|| state.waste.top_slice(1)),
            Source::Tableau { pile, count } => {
                let pile = state.tableau.get(pile as usize)?;
                let count = count as usize;
                (count > 0 && count <= pile.len()).then(|| pile.top_slice(count))
            }
        }
    }
}

/// A single Klondike move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    /// Move one card to foundation `foundation`.
    ToFoundation { from: Source, foundation: u8 },
    /// Move a card or a run onto tableau pile `to`.
    ToTableau { from: Source, to: u8 },
    /// Turn over up to `draw_mode` cards from the stock onto the waste.
    Draw,
    /// Stock empty: turn the waste over to form a new stock.
    Recycle,
}

impl Move {
    /// Check this move against the rules in `state`.
    pub fn is_legal(&self, state: &GameState) -> bool {
        match *self {
            Move::ToFoundation { from, foundation } => {
                let Some(cards) = from.cards(state) else {
                    return false;
                };
                (foundation as usize) < state.foundations.len()
                    && rules::is_valid_move(
                        cards,
                        from.kind(),
                        from.index(),
                        PileKind::Foundation,
                        foundation as usize,
                        state,
                    )
            }
            Move::ToTableau { from, to } => {
                let Some(cards) = from.cards(state) else {
                    return false;
                };
                if let Source::Tableau { pile, .. } = from {
                    if pile == to {
                        return false;
                    }
                }
                (to as usize) < NUM_TABLEAU_PILES
                    && rules::is_valid_move(
                        cards,
                        from.kind(),
                        from.index(),
                        PileKind::Tableau,
                        to as usize,
                        state,
                    )
            }
            Move::Draw => !state.stock.is_empty(),
            Move::Recycle => state.stock.is_empty() && !state.waste.is_empty(),
        }
    }

    /// Apply this move to `state`, mutating it in place.
    ///
    /// The move is assumed legal; it is not re-checked. Returns `true` if a
    /// face-down tableau card was turned face-up as a result.
    pub fn apply(&self, state: &mut GameState) -> bool {
        match *self {
            Move::ToFoundation { from, foundation } => {
                let (cards, flipped) = take_cards(state, from);
                let dst = &mut state.foundations[foundation as usize];
                for card in cards.iter() {
                    dst.push(card.turned_up());
                }
                flipped
            }

            Move::ToTableau { from, to } => {
                let (cards, flipped) = take_cards(state, from);
                state.tableau[to as usize].extend_from_slice(cards.as_slice());
                flipped
            }

            Move::Draw => {
                // The drawn block keeps its order, so the last stock card
                // becomes the top of the waste.
                let count = state.draw_mode.cards_per_draw().min(state.stock.len());
                let drawn: Pile<3> = Pile::from_slice(state.stock.top_slice(count));
                let remaining = state.stock.len() - count;
                state.stock.truncate(remaining);
                for card in drawn.iter() {
                    state.waste.push(card.turned_up());
                }
                false
            }

            Move::Recycle => {
                while let Some(card) = state.waste.pop() {
                    state.stock.push(card.turned_down());
                }
                false
            }
        }
    }

    /// Render a move as a human-readable string, using `state` (the
    /// position before the move) to name the cards involved.
    pub fn describe(&self, state: &GameState) -> String {
        let source_text = |from: Source| -> String {
            match (from, from.cards(state)) {
                (Source::Waste, Some(cards)) => format!("Waste: {}", cards[0]),
                (Source::Waste, None) => "Waste (empty)".to_string(),
                (Source::Tableau { pile, .. }, Some(cards)) if cards.len() == 1 => {
                    format!("Pile {}: {}", pile + 1, cards[0])
                }
                (Source::Tableau { pile, .. }, Some(cards)) => format!(
                    "Pile {}: {}..{}",
                    pile + 1,
                    cards[0],
                    cards[cards.len() - 1]
                ),
                (Source::Tableau { pile, .. }, None) => format!("Pile {} (empty)", pile + 1),
            }
        };

        match *self {
            Move::ToFoundation { from, foundation } => {
                format!("{} -> Foundation {}", source_text(from), foundation + 1)
            }
            Move::ToTableau { from, to } => format!("{} -> Pile {}", source_text(from), to + 1),
            Move::Draw => format!(
                "Draw {} from Stock",
                state.draw_mode.cards_per_draw().min(state.stock.len())
            ),
            Move::Recycle => "Recycle Waste into Stock".to_string(),
        }
    }
}

/// Remove the cards selected by `from` and flip any tableau card left
/// exposed. Returns the removed cards (bottom-most first) and whether a
/// flip happened.
fn take_cards(state: &mut GameState, from: Source) -> (TableauPile, bool) {
    match from {
        Source::Waste => {
            let mut cards = TableauPile::new();
            if let Some(card) = state.waste.pop() {
                cards.push(card);
            }
            (cards, false)
        }
        Source::Tableau { pile, count } => {
            let src = &mut state.tableau[pile as usize];
            let count = (count as usize).min(src.len());
            let cards = TableauPile::from_slice(src.top_slice(count));
            let remaining = src.len() - count;
            src.truncate(remaining);
            let flipped = src.flip_exposed_top();
            (cards, flipped)
        }
    }
}

/// The waste and every tableau top, in the order foundation moves are
/// tried.
fn foundation_candidates() -> impl Iterator<Item = Source> {
    core::iter::once(Source::Waste).chain((0..NUM_TABLEAU_PILES).map(Source::tableau_top))
}

/// A foundation move for the top card of `from`, if one is legal.
fn foundation_move(state: &GameState, from: Source) -> Option<Move> {
    let cards = from.cards(state)?;
    if !cards[0].is_face_up() {
        return None;
    }
    let foundation = rules::find_auto_move(cards[0], state)?;
    Some(Move::ToFoundation {
        from,
        foundation: foundation as u8,
    })
}

/// True if moving the run starting at `start` of `src` onto `dst` makes
/// progress: it exposes a face-down card, or brings a King to an empty pile
/// from a pile that has something under it.
pub fn is_productive_tableau_move(src: &TableauPile, start: usize, dst: &TableauPile) -> bool {
    let cards = src.as_slice();
    if start == 0 || start >= cards.len() {
        return false;
    }
    let exposes = !cards[start - 1].is_face_up();
    let king_to_empty = cards[start].rank() == Rank::King && dst.is_empty();
    exposes || king_to_empty
}

/// Every (start, destination) pair for which the face-up run starting at
/// `start` of pile `src_idx` can legally go onto another pile.
fn tableau_run_moves(state: &GameState, src_idx: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
    let src = &state.tableau[src_idx];
    let cards = src.as_slice();
    (src.face_up_start()..cards.len())
        .filter(move |&start| rules::is_valid_run(&cards[start..]))
        .flat_map(move |start| {
            (0..NUM_TABLEAU_PILES)
                .filter(move |&dst| {
                    dst != src_idx && rules::can_place_on_tableau(cards[start], state.tableau[dst].as_slice())
                })
                .map(move |dst| (start, dst))
        })
}

fn tableau_move(state: &GameState, src_idx: usize, start: usize, dst: usize) -> Move {
    Move::ToTableau {
        from: Source::Tableau {
            pile: src_idx as u8,
            count: (state.tableau[src_idx].len() - start) as u8,
        },
        to: dst as u8,
    }
}

/// Generate all legal moves from the given state.
///
/// This does **not** prioritize moves beyond a fixed, deterministic order;
/// it lists everything that is legal:
///   - Waste / tableau top -> Foundation (first accepting foundation)
///   - Waste -> Tableau
///   - Tableau -> Tableau (any valid face-up run)
///   - Draw when the stock is non-empty
///   - Recycle when the stock is empty and the waste is not
pub fn generate_legal_moves(state: &GameState) -> Vec<Move> {
    let mut moves: Vec<Move> = foundation_candidates()
        .filter_map(|from| foundation_move(state, from))
        .collect();

    if let Some(card) = state.waste.top() {
        for (to, pile) in state.tableau.iter().enumerate() {
            if rules::can_place_on_tableau(card, pile.as_slice()) {
                moves.push(Move::ToTableau {
                    from: Source::Waste,
                    to: to as u8,
                });
            }
        }
    }

    for src_idx in 0..NUM_TABLEAU_PILES {
        for (start, dst) in tableau_run_moves(state, src_idx) {
            moves.push(tableau_move(state, src_idx, start, dst));
        }
    }

    if Move::Draw.is_legal(state) {
        moves.push(Move::Draw);
    }
    if Move::Recycle.is_legal(state) {
        moves.push(Move::Recycle);
    }

    moves
}

/// Generate the moves the exhaustive solver expands, in the order it tries
/// them:
///   1. foundation moves (waste first, then tableau piles in order)
///   2. Draw, or Recycle when the stock is empty
///   3. waste -> tableau
///   4. tableau -> tableau, only when `is_productive_tableau_move` holds.
pub fn generate_search_moves(state: &GameState) -> Vec<Move> {
    let mut moves: Vec<Move> = foundation_candidates()
        .filter_map(|from| foundation_move(state, from))
        .collect();

    if Move::Draw.is_legal(state) {
        moves.push(Move::Draw);
    } else if Move::Recycle.is_legal(state) {
        moves.push(Move::Recycle);
    }

    if let Some(card) = state.waste.top() {
        for (to, pile) in state.tableau.iter().enumerate() {
            if rules::can_place_on_tableau(card, pile.as_slice()) {
                moves.push(Move::ToTableau {
                    from: Source::Waste,
                    to: to as u8,
                });
            }
        }
    }

    for src_idx in 0..NUM_TABLEAU_PILES {
        for (start, dst) in tableau_run_moves(state, src_idx) {
            if is_productive_tableau_move(&state.tableau[src_idx], start, &state.tableau[dst]) {
                moves.push(tableau_move(state, src_idx, start, dst));
            }
        }
    }

    moves
}

/// Suggest a single move for a player, or `None` if nothing helps.
///
/// Preference order: the waste card (foundation, then tableau), then
/// tableau cards that can go up or that uncover something, then the
/// stock (draw, or recycle when it is empty).
pub fn suggest_move(state: &GameState) -> Option<Move> {
    if let Some(mv) = foundation_move(state, Source::Waste) {
        return Some(mv);
    }
    if let Some(card) = state.waste.top() {
        if let Some(to) = rules::find_valid_tableau_destination(card, state) {
            return Some(Move::ToTableau {
                from: Source::Waste,
                to: to as u8,
            });
        }
    }

    for src_idx in 0..NUM_TABLEAU_PILES {
        if let Some(mv) = foundation_move(state, Source::tableau_top(src_idx)) {
            return Some(mv);
        }
        let productive = tableau_run_moves(state, src_idx).find(|&(start, dst)| {
            is_productive_tableau_move(&state.tableau[src_idx], start, &state.tableau[dst])
        });
        if let Some((start, dst)) = productive {
            return Some(tableau_move(state, src_idx, start, dst));
        }
    }

    if Move::Draw.is_legal(state) {
        Some(Move::Draw)
    } else if Move::Recycle.is_legal(state) {
        Some(Move::Recycle)
    } else {
        None
    }
}

// ----- Tests -----
