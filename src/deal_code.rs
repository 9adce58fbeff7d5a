//! Deal numbers: a freshly dealt layout as a single big integer.
//!
//! A fresh deal is fully described by its 52-card dealing order (tableau
//! piles 0..6 bottom-to-top, then the stock bottom-to-top, see
//! `GameState::dealing_order`). The deal number is the rank of that order
//! among all 52! permutations, in lexicographic order of card indices, so
//! the unshuffled deck is deal 0 and the fully reversed deck is 52! - 1.
//!
//! Deal codes typed by a person may carry grouping characters; a bracketed
//! list of 52 card indices is also accepted.

use anyhow::{bail, ensure, Context};
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::card::{Card, DECK_LEN};
use crate::game::{DrawMode, GameState};

/// 52!, one past the largest deal number.
pub fn deal_count() -> BigUint {
    (1..=DECK_LEN as u32).fold(BigUint::from(1u32), |acc, k| acc * k)
}

/// Check that `deck` holds each of the 52 cards exactly once.
fn ensure_permutation(deck: &[Card; DECK_LEN]) -> anyhow::Result<()> {
    let mut seen = [false; DECK_LEN];
    for card in deck {
        let idx = card.index() as usize;
        ensure!(idx < DECK_LEN, "card index {idx} out of range 0..=51");
        ensure!(!seen[idx], "duplicate card index {idx}");
        seen[idx] = true;
    }
    Ok(())
}

/// Rank of a dealing order among all permutations (Lehmer code read as a
/// factorial-base number).
pub fn deal_number_from_deck(deck: &[Card; DECK_LEN]) -> anyhow::Result<BigUint> {
    ensure_permutation(deck)?;

    let mut used = [false; DECK_LEN];
    let mut number = BigUint::zero();
    for (i, card) in deck.iter().enumerate() {
        let idx = card.index() as usize;
        let smaller_unused = used[..idx].iter().filter(|&&u| !u).count();
        used[idx] = true;
        number = number * (DECK_LEN - i) as u32 + smaller_unused as u32;
    }
    Ok(number)
}

/// Inverse of `deal_number_from_deck`. Numbers `>= 52!` are rejected.
pub fn deck_from_deal_number(number: &BigUint) -> anyhow::Result<[Card; DECK_LEN]> {
    ensure!(
        *number < deal_count(),
        "deal number {number} is too large (must be below 52!)"
    );

    // Factorial-base digits, most significant first.
    let mut digits = [0usize; DECK_LEN];
    let mut rest = number.clone();
    for i in (0..DECK_LEN).rev() {
        let base = BigUint::from((DECK_LEN - i) as u32);
        let digit = &rest % &base;
        rest /= &base;
        digits[i] = digit.to_usize().context("factorial digit does not fit in usize")?;
    }

    let mut unused: Vec<u8> = (0..DECK_LEN as u8).collect();
    let mut deck = [Card::from_index(0); DECK_LEN];
    for (slot, &digit) in deck.iter_mut().zip(digits.iter()) {
        *slot = Card::from_index(unused.remove(digit));
    }
    Ok(deck)
}

/// The deal number of a fresh deal, or `None` once play has started.
pub fn deal_number_of(state: &GameState) -> Option<BigUint> {
    let deck = state.dealing_order()?;
    deal_number_from_deck(&deck).ok()
}

/// Deal the layout with the given number.
pub fn state_from_deal_number(number: &BigUint, draw_mode: DrawMode) -> anyhow::Result<GameState> {
    let deck = deck_from_deal_number(number)?;
    Ok(GameState::deal_from_deck(&deck, draw_mode))
}

/// Parse a bracketed list of 52 distinct card indices, e.g. "[51, 32, 3, ...]".
pub fn parse_deck_list(s: &str) -> anyhow::Result<[Card; DECK_LEN]> {
    let open = s.find('[').context("missing '['")?;
    let close = s.rfind(']').context("missing ']'")?;
    ensure!(close > open, "malformed [...] list");

    let mut nums: Vec<u8> = Vec::with_capacity(DECK_LEN);
    for part in s[open + 1..close].split(',') {
        let t = part.trim();
        if t.is_empty() {
            continue;
        }
        let v: u8 = t
            .parse()
            .with_context(|| format!("could not parse {t:?} as a card index"))?;
        nums.push(v);
    }
    ensure!(
        nums.len() == DECK_LEN,
        "deck list must have {DECK_LEN} numbers, got {}",
        nums.len()
    );
    // Range-check before building cards.
    if let Some(&bad) = nums.iter().find(|&&v| v as usize >= DECK_LEN) {
        bail!("card index {bad} out of range 0..=51");
    }

    let mut deck = [Card::from_index(0); DECK_LEN];
    for (slot, &v) in deck.iter_mut().zip(nums.iter()) {
        *slot = Card::from_index(v);
    }
    ensure_permutation(&deck)?;
    Ok(deck)
}

/// Strip grouping characters (whitespace and `#-_.,`) from a typed deal
/// number.
fn normalize_deal_number(s: &str) -> anyhow::Result<String> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|&ch| !(ch.is_whitespace() || matches!(ch, '#' | '-' | '_' | '.' | ',')))
        .collect();
    ensure!(!cleaned.is_empty(), "empty deal code");
    ensure!(
        cleaned.chars().all(|c| c.is_ascii_digit()),
        "deal code contains non-digits after normalization: {cleaned:?}"
    );
    Ok(cleaned)
}

/// Parse a deal code: a decimal deal number (grouping characters allowed)
/// or a bracketed list of card indices.
pub fn parse_deal_code(s: &str) -> anyhow::Result<[Card; DECK_LEN]> {
    if s.contains('[') {
        return parse_deck_list(s);
    }
    let digits = normalize_deal_number(s)?;
    let number = BigUint::parse_bytes(digits.as_bytes(), 10)
        .with_context(|| format!("could not parse deal number {s:?}"))?;
    deck_from_deal_number(&number)
}
