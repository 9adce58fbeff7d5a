//! Fixed-capacity card piles.
//!
//! A `Pile<N>` stores its cards inline in a `[Card; N]` array plus a
//! length, bottom-to-top (the last card is the top of the pile). Because
//! piles are `Copy`, a whole `GameState` can be copied with a single
//! memcpy, which is what the solvers do for every branch they explore.

use core::fmt;
use core::hash::{Hash, Hasher};

use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::card::Card;

/// Capacity of a tableau pile: 6 face-down cards under a full King..Ace run.
pub const TABLEAU_PILE_CAPACITY: usize = 19;
/// Capacity of a foundation pile.
pub const FOUNDATION_CAPACITY: usize = 13;
/// Capacity of the stock and of the waste: the 24 cards not dealt to the tableau.
pub const TALON_CAPACITY: usize = 24;

#[derive(Clone, Copy)]
pub struct Pile<const N: usize> {
    cards: [Card; N],
    len: u8,
}

impl<const N: usize> Pile<N> {
    pub const CAPACITY: usize = N;

    pub const fn new() -> Self {
        Pile {
            cards: [Card::from_index(0); N],
            len: 0,
        }
    }

    /// Build a pile from a bottom-to-top slice.
    ///
    /// # Panics
    ///
    /// Panics if `cards.len() > N`.
    pub fn from_slice(cards: &[Card]) -> Self {
        let mut pile = Self::new();
        pile.extend_from_slice(cards);
        pile
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Card] {
        &self.cards[..self.len()]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Card] {
        let len = self.len();
        &mut self.cards[..len]
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, Card> {
        self.as_slice().iter()
    }

    #[inline]
    pub fn top(&self) -> Option<Card> {
        self.as_slice().last().copied()
    }

    /// Push a card on top.
    ///
    /// # Panics
    ///
    /// Panics if the pile is full.
    #[inline]
    pub fn push(&mut self, card: Card) {
        let len = self.len();
        assert!(len < N, "pile overflow: capacity {N}");
        self.cards[len] = card;
        self.len += 1;
    }

    #[inline]
    pub fn pop(&mut self) -> Option<Card> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(self.cards[self.len()])
    }

    pub fn extend_from_slice(&mut self, cards: &[Card]) {
        for &card in cards {
            self.push(card);
        }
    }

    /// Shorten the pile to `len` cards; no-op if it is already shorter.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        if len < self.len() {
            self.len = len as u8;
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// The top `count` cards, bottom-most first.
    ///
    /// # Panics
    ///
    /// Panics if `count > len()`.
    #[inline]
    pub fn top_slice(&self, count: usize) -> &[Card] {
        let len = self.len();
        &self.as_slice()[len - count..]
    }

    /// Index of the first card of the face-up suffix (`len()` if the top
    /// card is face-down or the pile is empty).
    pub fn face_up_start(&self) -> usize {
        let cards = self.as_slice();
        let mut start = cards.len();
        while start > 0 && cards[start - 1].is_face_up() {
            start -= 1;
        }
        start
    }

    /// The contiguous run of face-up cards at the top of the pile.
    #[inline]
    pub fn face_up_suffix(&self) -> &[Card] {
        &self.as_slice()[self.face_up_start()..]
    }

    #[inline]
    pub fn num_face_down(&self) -> usize {
        self.iter().filter(|c| !c.is_face_up()).count()
    }

    /// After cards were removed from the top: if the new top card is
    /// face-down, turn it face-up. Returns whether a card was flipped.
    #[inline]
    pub fn flip_exposed_top(&mut self) -> bool {
        let len = self.len();
        if len > 0 && !self.cards[len - 1].is_face_up() {
            self.cards[len - 1].set_face_up(true);
            return true;
        }
        false
    }
}

impl<const N: usize> Default for Pile<N> {
    fn default() -> Self {
        Self::new()
    }
}

// Slots past `len` hold stale cards, so comparisons only look at the live slice.
impl<const N: usize> PartialEq for Pile<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<const N: usize> Eq for Pile<N> {}

impl<const N: usize> Hash for Pile<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<const N: usize> fmt::Debug for Pile<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, const N: usize> IntoIterator for &'a Pile<N> {
    type Item = &'a Card;
    type IntoIter = core::slice::Iter<'a, Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<const N: usize> Serialize for Pile<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for card in self.iter() {
            seq.serialize_element(card)?;
        }
        seq.end()
    }
}

impl<'de, const N: usize> Deserialize<'de> for Pile<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let cards = Vec::<Card>::deserialize(deserializer)?;
        if cards.len() > N {
            return Err(de::Error::invalid_length(
                cards.len(),
                &format!("at most {N} cards").as_str(),
            ));
        }
        Ok(Pile::from_slice(&cards))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank, Suit};

    fn c(suit: Suit, rank: Rank) -> Card {
        Card::new(suit, rank)
    }

    #[test]
    fn push_pop_top_and_truncate() {
        let mut pile: Pile<4> = Pile::new();
        assert!(pile.is_empty());
        assert_eq!(pile.top(), None);

        pile.push(c(Suit::Hearts, Rank::Ace));
        pile.push(c(Suit::Clubs, Rank::Two));
        pile.push(c(Suit::Spades, Rank::Three));
        assert_eq!(pile.len(), 3);
        assert_eq!(pile.top(), Some(c(Suit::Spades, Rank::Three)));
        assert_eq!(pile.top_slice(2), &[c(Suit::Clubs, Rank::Two), c(Suit::Spades, Rank::Three)]);

        assert_eq!(pile.pop(), Some(c(Suit::Spades, Rank::Three)));
        pile.truncate(5);
        assert_eq!(pile.len(), 2);
        pile.truncate(1);
        assert_eq!(pile.as_slice(), &[c(Suit::Hearts, Rank::Ace)]);
    }

    #[test]
    #[should_panic(expected = "pile overflow")]
    fn push_past_capacity_panics() {
        let mut pile: Pile<1> = Pile::new();
        pile.push(c(Suit::Hearts, Rank::Ace));
        pile.push(c(Suit::Hearts, Rank::Two));
    }

    #[test]
    fn face_up_suffix_and_flip() {
        let mut pile: Pile<TABLEAU_PILE_CAPACITY> = Pile::from_slice(&[
            c(Suit::Hearts, Rank::Ace),
            c(Suit::Clubs, Rank::Two),
            c(Suit::Spades, Rank::Nine).turned_up(),
            c(Suit::Hearts, Rank::Eight).turned_up(),
        ]);
        assert_eq!(pile.face_up_start(), 2);
        assert_eq!(pile.face_up_suffix().len(), 2);
        assert_eq!(pile.num_face_down(), 2);

        pile.truncate(2);
        assert_eq!(pile.face_up_start(), 2);
        assert!(pile.face_up_suffix().is_empty());
        assert!(pile.flip_exposed_top());
        assert!(!pile.flip_exposed_top());
        assert_eq!(pile.face_up_start(), 1);
    }
}
