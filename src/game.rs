//! Game-level state.
//!
//! This module defines `GameState`, the aggregate of every pile in a
//! Klondike game plus the draw mode and the move/score counters, along
//! with:
//!   - the standard triangular deal from a 52-card dealing order
//!   - a canonical 64-bit hash used by the search for duplicate detection
//!   - invariant validation for states coming from outside the crate
//!   - the scoring glue that a play session runs after each accepted move.

use core::fmt;

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

use crate::card::{Card, CARDS_PER_DECK, DECK_LEN};
use crate::moves::{Move, Source};
use crate::pile::{Pile, FOUNDATION_CAPACITY, TABLEAU_PILE_CAPACITY, TALON_CAPACITY};
use crate::rules;

pub const NUM_FOUNDATIONS: usize = 4;
pub const NUM_TABLEAU_PILES: usize = 7;
/// Cards dealt to the tableau by the standard deal (1 + 2 + ... + 7).
pub const TABLEAU_DEAL_LEN: usize = 28;

pub type TableauPile = Pile<TABLEAU_PILE_CAPACITY>;
pub type FoundationPile = Pile<FOUNDATION_CAPACITY>;
pub type TalonPile = Pile<TALON_CAPACITY>;

/// Points awarded by `GameState::apply_move`.
pub mod points {
    pub const WASTE_TO_TABLEAU: i32 = 5;
    pub const WASTE_TO_FOUNDATION: i32 = 10;
    pub const TABLEAU_TO_FOUNDATION: i32 = 10;
    pub const FLIP_CARD: i32 = 5;
    /// Applied only in draw-3; the score never drops below zero.
    pub const RECYCLE_WASTE: i32 = -20;
}

/// How many cards a single draw turns over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DrawMode {
    #[default]
    One,
    Three,
}

impl DrawMode {
    #[inline]
    pub fn cards_per_draw(self) -> usize {
        match self {
            DrawMode::One => 1,
            DrawMode::Three => 3,
        }
    }
}

impl TryFrom<u8> for DrawMode {
    type Error = anyhow::Error;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(DrawMode::One),
            3 => Ok(DrawMode::Three),
            other => anyhow::bail!("draw mode must be 1 or 3, got {other}"),
        }
    }
}

impl From<DrawMode> for u8 {
    fn from(mode: DrawMode) -> u8 {
        mode.cards_per_draw() as u8
    }
}

/// Complete description of a game at a point in time.
///
/// All piles are fixed-capacity arrays, so the whole state is `Copy`;
/// simulations copy it freely and mutate their own copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Face-down reserve; the last card is drawn first.
    pub stock: TalonPile,
    /// Face-up cards drawn from the stock; the last card is playable.
    pub waste: TalonPile,
    /// Four foundations, each unbound until its first Ace arrives.
    pub foundations: [FoundationPile; NUM_FOUNDATIONS],
    /// Seven tableau piles, bottom-to-top.
    pub tableau: [TableauPile; NUM_TABLEAU_PILES],
    pub draw_mode: DrawMode,
    /// Number of moves applied through `apply_move`.
    pub moves: u32,
    pub score: i32,
    pub is_complete: bool,
    pub can_auto_complete: bool,
}

impl GameState {
    /// A state with every pile empty. Mostly useful for building test
    /// positions by hand.
    pub fn empty(draw_mode: DrawMode) -> Self {
        GameState {
            stock: Pile::new(),
            waste: Pile::new(),
            foundations: [Pile::new(); NUM_FOUNDATIONS],
            tableau: [Pile::new(); NUM_TABLEAU_PILES],
            draw_mode,
            moves: 0,
            score: 0,
            is_complete: false,
            can_auto_complete: false,
        }
    }

    /// Deal a 52-card dealing order into the standard layout.
    ///
    /// Pile `i` receives the next `i + 1` cards with only the last one
    /// face-up; the remaining 24 cards form the face-down stock, so the
    /// last card of `deck` is the first one drawn.
    pub fn deal_from_deck(deck: &[Card; DECK_LEN], draw_mode: DrawMode) -> Self {
        let mut state = GameState::empty(draw_mode);
        let mut next = 0usize;
        for pile_idx in 0..NUM_TABLEAU_PILES {
            for row in 0..=pile_idx {
                let card = deck[next];
                next += 1;
                state.tableau[pile_idx].push(if row == pile_idx {
                    card.turned_up()
                } else {
                    card.turned_down()
                });
            }
        }
        for &card in &deck[next..] {
            state.stock.push(card.turned_down());
        }
        state
    }

    /// True if this state still has the shape of a fresh standard deal:
    /// pile `i` holds `i + 1` cards with only the top face-up, the other 24
    /// cards are in the stock, and nothing has been played.
    pub fn is_fresh_deal(&self) -> bool {
        self.waste.is_empty()
            && self.foundations.iter().all(|f| f.is_empty())
            && self.stock.len() == DECK_LEN - TABLEAU_DEAL_LEN
            && self.tableau.iter().enumerate().all(|(i, pile)| {
                pile.len() == i + 1 && pile.face_up_start() == i
            })
    }

    /// The dealing order of a fresh deal: tableau piles 0..6 bottom-to-top,
    /// then the stock bottom-to-top. Inverse of `deal_from_deck`.
    ///
    /// Returns `None` if the state is not a fresh deal.
    pub fn dealing_order(&self) -> Option<[Card; DECK_LEN]> {
        if !self.is_fresh_deal() {
            return None;
        }
        let mut deck = [Card::from_index(0); DECK_LEN];
        let ordered = self
            .tableau
            .iter()
            .flat_map(|pile| pile.iter())
            .chain(self.stock.iter());
        for (slot, card) in deck.iter_mut().zip(ordered) {
            *slot = card.turned_down();
        }
        Some(deck)
    }

    /// Every card in the state, pile by pile.
    pub fn all_cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.stock
            .iter()
            .chain(self.waste.iter())
            .chain(self.foundations.iter().flat_map(|f| f.iter()))
            .chain(self.tableau.iter().flat_map(|p| p.iter()))
            .copied()
    }

    #[inline]
    pub fn is_won(&self) -> bool {
        rules::is_game_won(self)
    }

    /// Check the structural invariants of a Klondike position:
    ///   - exactly the 52 distinct cards are present
    ///   - stock cards are face-down, waste and foundation cards face-up
    ///   - each foundation is an Ace-up run of a single suit
    ///   - each tableau face-up suffix is a descending alternating run,
    ///     sitting on at most six face-down cards
    ///   - stock and waste together fit in one talon.
    ///
    /// Intended for states loaded from outside the crate.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = [false; DECK_LEN];
        let mut count = 0usize;
        for card in self.all_cards() {
            let idx = card.index();
            ensure!(idx < CARDS_PER_DECK, "card index {idx} out of range 0..=51");
            ensure!(!seen[idx as usize], "duplicate card {card}");
            seen[idx as usize] = true;
            count += 1;
        }
        ensure!(count == DECK_LEN, "expected {DECK_LEN} cards, found {count}");

        ensure!(
            self.stock.iter().all(|c| !c.is_face_up()),
            "stock contains a face-up card"
        );
        ensure!(
            self.waste.iter().all(|c| c.is_face_up()),
            "waste contains a face-down card"
        );

        for (i, foundation) in self.foundations.iter().enumerate() {
            for (k, card) in foundation.iter().enumerate() {
                let base = foundation.as_slice()[0];
                ensure!(
                    card.is_face_up() && card.suit() == base.suit() && card.rank_number() as usize == k + 1,
                    "foundation {i} is out of sequence at {card}"
                );
            }
        }

        // A draw moves cards from stock to waste, so both must fit one talon.
        ensure!(
            self.stock.len() + self.waste.len() <= TALON_CAPACITY,
            "stock and waste hold {} cards, more than {TALON_CAPACITY}",
            self.stock.len() + self.waste.len()
        );

        for (i, pile) in self.tableau.iter().enumerate() {
            let start = pile.face_up_start();
            ensure!(
                pile.as_slice()[..start].iter().all(|c| !c.is_face_up()),
                "tableau pile {i} has a face-up card under a face-down one"
            );
            // Room for a full King..Ace run on top of the hidden cards.
            ensure!(
                start < NUM_TABLEAU_PILES,
                "tableau pile {i} has {start} face-down cards, at most {} allowed",
                NUM_TABLEAU_PILES - 1
            );
            let suffix = pile.face_up_suffix();
            ensure!(
                suffix.is_empty() || rules::is_valid_run(suffix),
                "tableau pile {i} has an invalid face-up run"
            );
        }

        Ok(())
    }

    /// `validate`, consuming and returning the state on success.
    pub fn validated(self) -> anyhow::Result<Self> {
        self.validate().context("invalid game state")?;
        Ok(self)
    }

    /// Apply a move assumed legal and run the bookkeeping: move counter,
    /// score, completion and auto-complete flags.
    pub fn apply_move(&mut self, mv: Move) {
        let flipped = mv.apply(self);

        let mut gained = match mv {
            Move::ToFoundation { from: Source::Waste, .. } => points::WASTE_TO_FOUNDATION,
            Move::ToFoundation { from: Source::Tableau { .. }, .. } => points::TABLEAU_TO_FOUNDATION,
            Move::ToTableau { from: Source::Waste, .. } => points::WASTE_TO_TABLEAU,
            Move::ToTableau { from: Source::Tableau { .. }, .. } => 0,
            Move::Draw => 0,
            Move::Recycle if self.draw_mode == DrawMode::Three => points::RECYCLE_WASTE,
            Move::Recycle => 0,
        };
        if flipped {
            gained += points::FLIP_CARD;
        }

        self.score = (self.score + gained).max(0);
        self.moves += 1;
        self.is_complete = rules::is_game_won(self);
        self.can_auto_complete = rules::can_auto_complete(self);
    }

    /// Apply `mv` if the rules allow it. Returns whether it was applied.
    pub fn try_move(&mut self, mv: Move) -> bool {
        if !mv.is_legal(self) {
            return false;
        }
        self.apply_move(mv);
        true
    }

    /// Move the selected cards to the first place that takes them:
    /// a foundation for single cards, otherwise the first other tableau
    /// pile. Returns the move played, if any.
    pub fn smart_move(&mut self, from: Source) -> Option<Move> {
        let cards = from.cards(self)?;
        let first = cards[0];

        if cards.len() == 1 {
            if let Some(foundation) = rules::find_auto_move(first, self) {
                let mv = Move::ToFoundation {
                    from,
                    foundation: foundation as u8,
                };
                if self.try_move(mv) {
                    return Some(mv);
                }
            }
        }

        let own_pile = match from {
            Source::Tableau { pile, .. } => Some(pile as usize),
            Source::Waste => None,
        };
        let to = (0..NUM_TABLEAU_PILES).find(|&i| {
            Some(i) != own_pile && rules::can_place_on_tableau(first, self.tableau[i].as_slice())
        })?;
        let mv = Move::ToTableau { from, to: to as u8 };
        self.try_move(mv).then_some(mv)
    }

    /// Play one card to a foundation, looking at the waste first and then
    /// the tableau piles in order. Returns the move played, if any.
    pub fn auto_complete_step(&mut self) -> Option<Move> {
        let mut candidates = Vec::with_capacity(1 + NUM_TABLEAU_PILES);
        candidates.push(Source::Waste);
        candidates.extend((0..NUM_TABLEAU_PILES).map(Source::tableau_top));

        for from in candidates {
            let Some(cards) = from.cards(self) else {
                continue;
            };
            if let Some(foundation) = rules::find_auto_move(cards[0], self) {
                let mv = Move::ToFoundation {
                    from,
                    foundation: foundation as u8,
                };
                if self.try_move(mv) {
                    return Some(mv);
                }
            }
        }
        None
    }

    /// Run `auto_complete_step` until nothing more goes up. Returns the
    /// number of cards played.
    pub fn auto_complete(&mut self) -> usize {
        let mut played = 0;
        while self.auto_complete_step().is_some() {
            played += 1;
        }
        played
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::display::render_state(self))
    }
}

/// 64-bit FNV-1a parameters.
const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

/// Mix a single byte into an FNV-1a hash.
#[inline]
fn fnv1a_mix_byte(mut h: u64, byte: u8) -> u64 {
    h ^= byte as u64;
    h = h.wrapping_mul(FNV_PRIME);
    h
}

/// Mix a small tag (domain separator) into an FNV-1a hash.
#[inline]
fn fnv1a_mix_tag(h: u64, tag: u8) -> u64 {
    fnv1a_mix_byte(h, tag)
}

/// Canonical 64-bit hash of a position, used by the search to detect
/// states it has already expanded.
///
/// This covers:
///   - foundation pile lengths
///   - for each tableau pile: its length, and the ordered ids of its
///     face-up suffix
///   - stock and waste sizes, and the id of the top waste card.
///
/// Face-down tableau cards and the order of the stock are deliberately
/// left out: two positions that agree on everything visible and on every
/// pile size are treated as the same position. Counters and flags are
/// not part of the position.
pub fn state_hash64(state: &GameState) -> u64 {
    let mut h = FNV_OFFSET_BASIS;

    // --- Foundations ---
    h = fnv1a_mix_tag(h, 0xF0);
    for f in &state.foundations {
        h = fnv1a_mix_byte(h, f.len() as u8);
    }

    // --- Tableau ---
    h = fnv1a_mix_tag(h, 0xC0);
    for pile in &state.tableau {
        let suffix = pile.face_up_suffix();
        h = fnv1a_mix_byte(h, pile.len() as u8);
        h = fnv1a_mix_byte(h, suffix.len() as u8);
        for card in suffix {
            h = fnv1a_mix_byte(h, card.index());
        }
    }

    // --- Stock / waste ---
    h = fnv1a_mix_tag(h, b'S');
    h = fnv1a_mix_byte(h, state.stock.len() as u8);
    h = fnv1a_mix_tag(h, b'W');
    h = fnv1a_mix_byte(h, state.waste.len() as u8);
    h = fnv1a_mix_byte(h, state.waste.top().map_or(0xFF, |c| c.index()));

    h
}
