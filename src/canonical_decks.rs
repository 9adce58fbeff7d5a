//! Canonical fixed 52-card deals used in tests.
//!
//! The main fixture is a draw-3 "no-moves" deal whose unplayability follows
//! from a few local conditions on the cards that can ever be reached, so
//! it can check the solver without trusting the solver.

use crate::card::{Card, Rank, Suit, DECK_LEN};
use crate::game::TABLEAU_DEAL_LEN;

/// In our dealing model (pile-major, 1..7 cards per pile), the face-up
/// top card of pile p (0-based) is at dealing index T(p+1) - 1 where
/// T(n) = n(n+1)/2.
pub fn accessible_tableau_indices() -> [usize; 7] {
    [0, 2, 5, 9, 14, 20, 27]
}

/// Dealing indices of the stock cards that can reach the top of the waste
/// in draw-3 while no card ever leaves the talon.
///
/// The stock holds dealing indices 28..=51, drawn from the end in blocks
/// of three that keep their order, so the first pass shows 51, 48, ..., 30.
/// A recycle reverses the waste, so the second pass shows 49, 46, ..., 28;
/// the third pass repeats the first.
pub fn accessible_stock_indices() -> [usize; 16] {
    let mut out = [0usize; 16];
    let mut n = 0;
    for k in 0..(DECK_LEN - TABLEAU_DEAL_LEN) {
        if k % 3 != 1 {
            out[n] = TABLEAU_DEAL_LEN + k;
            n += 1;
        }
    }
    out
}

/// Build a deck that is unplayable in draw-3 because:
///
/// 1. none of the reachable cards is an Ace,
/// 2. no two tableau tops of opposite colour differ in rank by one,
/// 3. no reachable waste card is one rank below a tableau top of the
///    opposite colour,
/// 4. no pile is empty, so Kings have nowhere to go.
fn unplayable_deck_by_local_conditions() -> [Card; DECK_LEN] {
    // Tableau tops are all black with odd ranks. Waste cards are either
    // black (never stack on a black top) or red with odd ranks.
    const FORCED: &[(usize, Suit, Rank)] = &[
        // Tableau tops
        (0, Suit::Clubs, Rank::Five),
        (2, Suit::Clubs, Rank::Seven),
        (5, Suit::Clubs, Rank::Nine),
        (9, Suit::Clubs, Rank::Jack),
        (14, Suit::Spades, Rank::Five),
        (20, Suit::Spades, Rank::Seven),
        (27, Suit::Spades, Rank::Nine),
        // First-pass waste tops
        (30, Suit::Clubs, Rank::Three),
        (33, Suit::Spades, Rank::Three),
        (36, Suit::Diamonds, Rank::Seven),
        (39, Suit::Hearts, Rank::Seven),
        (42, Suit::Diamonds, Rank::Jack),
        (45, Suit::Hearts, Rank::Jack),
        (48, Suit::Diamonds, Rank::King),
        (51, Suit::Hearts, Rank::King),
        // Second-pass waste tops
        (28, Suit::Clubs, Rank::Two),
        (31, Suit::Clubs, Rank::Four),
        (34, Suit::Clubs, Rank::Six),
        (37, Suit::Clubs, Rank::Eight),
        (40, Suit::Spades, Rank::Two),
        (43, Suit::Spades, Rank::Four),
        (46, Suit::Spades, Rank::Six),
        (49, Suit::Spades, Rank::Eight),
    ];

    let mut deck = [Card::from_index(0); DECK_LEN];
    let mut reserved = [false; DECK_LEN];
    let mut placed = [false; DECK_LEN];

    for &(idx, suit, rank) in FORCED {
        let card = Card::new(suit, rank);
        deck[idx] = card;
        reserved[idx] = true;
        placed[card.index() as usize] = true;
    }

    // Fill the free slots with the remaining cards in index order.
    let mut free_slots = (0..DECK_LEN).filter(|&i| !reserved[i]);
    for card_idx in 0..DECK_LEN {
        if placed[card_idx] {
            continue;
        }
        if let Some(slot) = free_slots.next() {
            deck[slot] = Card::from_index(card_idx as u8);
        }
    }

    deck
}

/// Purely local check of the unplayable conditions for a given deck.
///
/// This encodes the conditions used to build
/// `unplayable_deck_by_local_conditions` and serves as both documentation
/// and a regression test for that constructor.
pub fn is_unplayable_by_local_conditions(deck: &[Card; DECK_LEN]) -> bool {
    let tab_cards = accessible_tableau_indices().map(|i| deck[i]);
    let stock_cards = accessible_stock_indices().map(|i| deck[i]);

    if tab_cards
        .iter()
        .chain(stock_cards.iter())
        .any(|c| c.rank() == Rank::Ace)
    {
        return false;
    }

    for (i, &a) in tab_cards.iter().enumerate() {
        for &b in &tab_cards[i + 1..] {
            if a.color() != b.color() && a.rank_number().abs_diff(b.rank_number()) == 1 {
                return false;
            }
        }
    }

    for &s in &stock_cards {
        for &t in &tab_cards {
            if crate::card::is_one_lower_opposite_color(s, t) {
                return false;
            }
        }
    }

    true
}

/// Canonical "no-moves" draw-3 deal, as a dealing order.
///
/// Under draw-3 no card ever leaves the talon or the tableau; only
/// drawing and recycling are possible.
pub fn canonical_unplayable_deck() -> [Card; DECK_LEN] {
    unplayable_deck_by_local_conditions()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{DrawMode, GameState};
    use crate::moves::{generate_legal_moves, Move};
    use crate::rules;
    use crate::search::{self, SearchConfig, TerminationReason};

    fn check_is_permutation(deck: &[Card; DECK_LEN]) {
        let mut seen = [false; DECK_LEN];
        for &c in deck.iter() {
            let idx = c.index() as usize;
            assert!(!seen[idx], "Duplicate card in deck: {c} (index {idx})");
            seen[idx] = true;
        }
        for (i, used) in seen.iter().enumerate() {
            assert!(*used, "Missing card with index {i}");
        }
    }

    #[test]
    fn accessible_indices() {
        let stock = accessible_stock_indices();
        assert_eq!(stock[..4], [28, 30, 31, 33]);
        assert_eq!(stock[15], 51);
        assert!(!stock.contains(&29));
    }

    #[test]
    fn unplayable_deck_satisfies_local_conditions() {
        let deck = canonical_unplayable_deck();
        check_is_permutation(&deck);
        assert!(
            is_unplayable_by_local_conditions(&deck),
            "constructed deck does not satisfy local unplayable conditions"
        );
    }

    #[test]
    fn only_talon_moves_through_three_passes() {
        let mut state = GameState::deal_from_deck(&canonical_unplayable_deck(), DrawMode::Three);
        let accessible = accessible_stock_indices().map(|i| canonical_unplayable_deck()[i]);

        for _ in 0..3 * 9 {
            let moves = generate_legal_moves(&state);
            assert_eq!(moves.len(), 1, "unexpected moves {moves:?}");
            assert!(matches!(moves[0], Move::Draw | Move::Recycle));
            state.apply_move(moves[0]);
            if let Some(top) = state.waste.top() {
                assert!(accessible.iter().any(|c| c.same_card(top)), "{top} reached the waste top");
            }
        }
    }

    #[test]
    fn no_move_once_the_stock_is_drawn() {
        let mut state = GameState::deal_from_deck(&canonical_unplayable_deck(), DrawMode::Three);
        while Move::Draw.is_legal(&state) {
            state.apply_move(Move::Draw);
        }
        assert!(!rules::has_any_valid_move(&state));
    }

    #[test]
    fn search_exhausts_the_unplayable_deal() {
        let state = GameState::deal_from_deck(&canonical_unplayable_deck(), DrawMode::Three);
        let outcome = search::solve(&state, &SearchConfig::default());
        assert!(!outcome.is_win);
        assert_eq!(outcome.termination, TerminationReason::Exhausted);
        // The deal and eight draws; the recycled position hashes like the
        // deal itself because stock order is not part of the hash.
        assert_eq!(outcome.nodes_visited, 9);
        assert_eq!(outcome.duplicate_states, 1);
    }
}
