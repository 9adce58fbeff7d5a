//! Klondike placement rules.
//!
//! Every function here is a pure predicate over cards, piles, or a whole
//! `GameState`. Piles are passed as bottom-to-top slices. Pile indices out
//! of range are contract violations and panic.

use crate::card::{Card, Rank};
use crate::game::{GameState, NUM_FOUNDATIONS, NUM_TABLEAU_PILES};

/// The four kinds of pile a card can sit in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PileKind {
    Stock,
    Waste,
    Foundation,
    Tableau,
}

/// True if `card` may be placed on top of the foundation pile `pile`.
///
/// Empty foundations take only an Ace; otherwise the card must be the same
/// suit as the top card and exactly one rank higher.
pub fn can_place_on_foundation(card: Card, pile: &[Card]) -> bool {
    match pile.last() {
        None => card.rank() == Rank::Ace,
        Some(&top) => card.suit() == top.suit() && card.rank_number() == top.rank_number() + 1,
    }
}

/// True if `card` may be placed on top of the tableau pile `pile`.
///
/// Empty piles take only a King; otherwise the top card must be face-up,
/// of the opposite color, and exactly one rank higher than `card`.
pub fn can_place_on_tableau(card: Card, pile: &[Card]) -> bool {
    match pile.last() {
        None => card.rank() == Rank::King,
        Some(&top) => {
            top.is_face_up()
                && card.color() != top.color()
                && card.rank_number() + 1 == top.rank_number()
        }
    }
}

/// True if the slice (bottom-most card first) forms a descending,
/// alternating-color run suitable for moving as a block.
pub fn is_valid_run(cards: &[Card]) -> bool {
    if cards.is_empty() {
        return false;
    }
    cards
        .windows(2)
        .all(|pair| crate::card::is_one_lower_opposite_color(pair[1], pair[0]))
}

/// Check whether moving `cards` (bottom-most moved card first) onto the
/// pile `(to_kind, to_index)` is legal.
///
/// The source pile is not consulted beyond the cards themselves; callers
/// are expected to pass a real top-of-pile selection.
pub fn is_valid_move(
    cards: &[Card],
    _from_kind: PileKind,
    _from_index: usize,
    to_kind: PileKind,
    to_index: usize,
    state: &GameState,
) -> bool {
    let Some(&first) = cards.first() else {
        return false;
    };
    if !first.is_face_up() {
        return false;
    }

    match to_kind {
        PileKind::Stock | PileKind::Waste => false,
        PileKind::Foundation => {
            assert!(to_index < NUM_FOUNDATIONS, "foundation index {to_index} out of range");
            cards.len() == 1 && can_place_on_foundation(first, state.foundations[to_index].as_slice())
        }
        PileKind::Tableau => {
            assert!(to_index < NUM_TABLEAU_PILES, "tableau index {to_index} out of range");
            is_valid_run(cards) && can_place_on_tableau(first, state.tableau[to_index].as_slice())
        }
    }
}

/// Index of the first foundation that accepts `card`, if any.
pub fn find_auto_move(card: Card, state: &GameState) -> Option<usize> {
    state
        .foundations
        .iter()
        .position(|pile| can_place_on_foundation(card, pile.as_slice()))
}

/// Index of the first tableau pile that accepts `card`, if any.
///
/// This answers legality only; it does not prefer moves that expose a
/// face-down card.
pub fn find_valid_tableau_destination(card: Card, state: &GameState) -> Option<usize> {
    state
        .tableau
        .iter()
        .position(|pile| can_place_on_tableau(card, pile.as_slice()))
}

/// True when nothing is hidden any more: stock and waste are empty and
/// every tableau card is face-up.
pub fn can_auto_complete(state: &GameState) -> bool {
    state.stock.is_empty()
        && state.waste.is_empty()
        && state
            .tableau
            .iter()
            .all(|pile| pile.iter().all(|c| c.is_face_up()))
}

/// True iff all four foundations hold 13 cards.
pub fn is_game_won(state: &GameState) -> bool {
    state.foundations.iter().all(|f| f.len() == 13)
}

/// True if the player has anything to do.
///
/// A non-empty stock always counts (drawing is a move). Otherwise the waste
/// top and every face-up tableau card are checked for a destination; the
/// foundation is only considered for pile tops, and a tableau card's own
/// pile never counts as a destination.
pub fn has_any_valid_move(state: &GameState) -> bool {
    if !state.stock.is_empty() {
        return true;
    }

    if let Some(card) = state.waste.top() {
        if find_auto_move(card, state).is_some() || find_valid_tableau_destination(card, state).is_some() {
            return true;
        }
    }

    for (pile_idx, pile) in state.tableau.iter().enumerate() {
        let cards = pile.as_slice();
        for (card_idx, &card) in cards.iter().enumerate() {
            if !card.is_face_up() {
                continue;
            }
            if card_idx + 1 == cards.len() && find_auto_move(card, state).is_some() {
                return true;
            }
            let elsewhere = state
                .tableau
                .iter()
                .enumerate()
                .any(|(dst_idx, dst)| dst_idx != pile_idx && can_place_on_tableau(card, dst.as_slice()));
            if elsewhere {
                return true;
            }
        }
    }

    false
}
