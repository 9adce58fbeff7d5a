//! Card, Suit, Rank, and Color types for a standard 52-card deck.
//!
//! - `Card` is a compact identity (0..=51) plus a face-up flag.
//! - `Suit` and `Rank` decode that identity.
//! - `create_deck` / `shuffle_deck` are the deck primitives used by the
//!   deal constructors.

use core::fmt;
use std::str::FromStr;

use anyhow::{bail, Context};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const NUM_SUITS: u8 = 4;
pub const NUM_RANKS: u8 = 13;
pub const CARDS_PER_DECK: u8 = NUM_SUITS * NUM_RANKS;
/// Deck length as `usize`, for array sizes.
pub const DECK_LEN: usize = CARDS_PER_DECK as usize;

/// A playing card: an identity in 0..=51 plus whether it is face-up.
///
/// The identity is `suit * 13 + rank`, with ranks counted from Ace = 0,
/// so the Hearts occupy 0..=12 and the Spades 39..=51.
///
/// Equality compares the face-up flag too; use `same_card` to compare
/// identities only.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Card {
    index: u8,
    face_up: bool,
}

/// The four suits, in deck-construction order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Suit {
    Hearts = 0,
    Diamonds = 1,
    Clubs = 2,
    Spades = 3,
}

/// The thirteen ranks.
///
/// Ace is the lowest rank (0); use `number()` to get 1..=13.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rank {
    Ace = 0,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King, // 12
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    Red,
    Black,
}

impl Card {
    /// Create a face-down card from a suit and rank.
    #[inline]
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Card {
            index: suit as u8 * NUM_RANKS + rank as u8,
            face_up: false,
        }
    }

    /// Create a face-down card from a raw index in 0..=51.
    ///
    /// # Panics
    ///
    /// Debug builds panic on an index of 52 or more.
    #[inline]
    pub const fn from_index(index: u8) -> Self {
        debug_assert!(index < CARDS_PER_DECK);
        Card {
            index,
            face_up: false,
        }
    }

    #[inline]
    pub fn index(self) -> u8 {
        self.index
    }

    #[inline]
    pub fn suit(self) -> Suit {
        Suit::from_u8(self.index / NUM_RANKS)
    }

    #[inline]
    pub fn rank(self) -> Rank {
        Rank::from_u8(self.index % NUM_RANKS)
    }

    /// Ace = 1 through King = 13.
    #[inline]
    pub fn rank_number(self) -> u8 {
        self.index % NUM_RANKS + 1
    }

    #[inline]
    pub fn color(self) -> Color {
        self.suit().color()
    }

    #[inline]
    pub fn is_face_up(self) -> bool {
        self.face_up
    }

    #[inline]
    pub fn set_face_up(&mut self, face_up: bool) {
        self.face_up = face_up;
    }

    /// This card turned face-up.
    #[inline]
    pub fn turned_up(mut self) -> Self {
        self.face_up = true;
        self
    }

    /// This card turned face-down.
    #[inline]
    pub fn turned_down(mut self) -> Self {
        self.face_up = false;
        self
    }

    /// True if both cards have the same (suit, rank) identity.
    #[inline]
    pub fn same_card(self, other: Card) -> bool {
        self.index == other.index
    }

    /// Two-character code: rank then suit, e.g. "TD" for the ten of diamonds.
    pub fn short_str(self) -> String {
        let rank = match self.rank() {
            Rank::Ace => 'A',
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
        };
        format!("{rank}{}", self.suit().short_char())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_str())
    }
}

/// Parses the `short_str` form ("AH", "TD", "10D" is also accepted).
/// The resulting card is face-down.
impl FromStr for Card {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let mut chars: Vec<char> = t.chars().collect();
        let suit_char = chars.pop().with_context(|| format!("empty card code {s:?}"))?;
        let suit = match suit_char.to_ascii_uppercase() {
            'H' => Suit::Hearts,
            'D' => Suit::Diamonds,
            'C' => Suit::Clubs,
            'S' => Suit::Spades,
            other => bail!("unknown suit {other:?} in card code {s:?}"),
        };
        let rank_str: String = chars.into_iter().collect();
        let rank = match rank_str.to_ascii_uppercase().as_str() {
            "A" | "1" => Rank::Ace,
            "T" | "10" => Rank::Ten,
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            digit => {
                let n: u8 = digit
                    .parse()
                    .with_context(|| format!("unknown rank {digit:?} in card code {s:?}"))?;
                if !(2..=9).contains(&n) {
                    bail!("rank {n} out of range in card code {s:?}");
                }
                Rank::from_u8(n - 1)
            }
        };
        Ok(Card::new(suit, rank))
    }
}

impl Suit {
    /// Deck-construction order; position equals the suit's value.
    pub const ALL: [Suit; NUM_SUITS as usize] = [
        Suit::Hearts,
        Suit::Diamonds,
        Suit::Clubs,
        Suit::Spades,
    ];

    /// Inverse of `suit as u8`; anything above 3 panics.
    #[inline]
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Suit::Hearts,
            1 => Suit::Diamonds,
            2 => Suit::Clubs,
            3 => Suit::Spades,
            other => panic!("suit value {other} out of range 0..=3"),
        }
    }

    #[inline]
    pub fn color(self) -> Color {
        match self {
            Suit::Hearts | Suit::Diamonds => Color::Red,
            Suit::Clubs | Suit::Spades => Color::Black,
        }
    }

    /// Single-character representation: 'H', 'D', 'C', or 'S'.
    #[inline]
    pub fn short_char(self) -> char {
        match self {
            Suit::Hearts => 'H',
            Suit::Diamonds => 'D',
            Suit::Clubs => 'C',
            Suit::Spades => 'S',
        }
    }
}

impl Rank {
    /// Ace first, King last.
    pub const ALL: [Rank; NUM_RANKS as usize] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Inverse of `rank as u8`; anything above 12 panics.
    #[inline]
    pub fn from_u8(v: u8) -> Self {
        Rank::ALL
            .get(v as usize)
            .copied()
            .unwrap_or_else(|| panic!("rank value {v} out of range 0..=12"))
    }

    /// Face value, Ace = 1.
    #[inline]
    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

/// The tableau stacking relation: `upper` may sit on `lower` when it is
/// one rank below it and of the other color.
#[inline]
pub fn is_one_lower_opposite_color(upper: Card, lower: Card) -> bool {
    upper.rank_number() + 1 == lower.rank_number() && upper.color() != lower.color()
}

/// The unshuffled deck, face-down and sorted by index.
pub fn create_deck() -> [Card; DECK_LEN] {
    core::array::from_fn(|i| Card::from_index(i as u8))
}

/// Return a uniformly shuffled copy of `deck` (Fisher-Yates via `rand`).
pub fn shuffle_deck<R: Rng + ?Sized>(deck: &[Card; DECK_LEN], rng: &mut R) -> [Card; DECK_LEN] {
    let mut shuffled = *deck;
    shuffled.shuffle(rng);
    shuffled
}

/// Return a deterministically shuffled standard deck for a 64-bit seed.
pub fn shuffled_deck_from_seed(seed: u64) -> [Card; DECK_LEN] {
    let mut rng = StdRng::seed_from_u64(seed);
    shuffle_deck(&create_deck(), &mut rng)
}
