//! Human-readable rendering of Klondike positions.
//!
//! Face-down cards are shown as "XX" and face-up cards with their
//! `short_str()` rank/suit code. The output is meant for the CLI and for
//! logging winning lines of play.

use crate::card::Card;
use crate::game::{GameState, NUM_TABLEAU_PILES};
use crate::moves::Move;

/// Format a single card for display: "XX" if face-down, else e.g. "7C".
pub fn format_card_visible(card: Card) -> String {
    if card.is_face_up() {
        card.short_str()
    } else {
        "XX".to_string()
    }
}

/// Render only the foundation row, one `[top]` cell per foundation.
///   - Empty foundation: `[  ]`
///   - Non-empty: e.g. `[AH]`, `[7C]`, `[KD]`
pub fn render_foundations(state: &GameState) -> String {
    let cells: Vec<String> = state
        .foundations
        .iter()
        .map(|f| match f.top() {
            Some(card) => format!("[{}]", card.short_str()),
            None => "[  ]".to_string(),
        })
        .collect();
    format!("Foundations: {}", cells.join(" "))
}

/// Render the stock (as a count) and the waste (top card and count) on a
/// single line.
pub fn render_stock_and_waste(state: &GameState) -> String {
    let stock = match state.stock.len() {
        0 => "Stock: [empty]".to_string(),
        n => format!("Stock: [{n} cards]"),
    };
    let waste = match state.waste.top() {
        None => "Waste: [empty]".to_string(),
        Some(top) => format!("Waste: [{}] ({} cards)", top.short_str(), state.waste.len()),
    };
    format!("{stock}    {waste}")
}

/// Render all tableau piles as vertical columns.
///
/// Each cell is four characters wide. Row 0 holds the bottom card of every
/// pile, so the lowest non-empty row of a column is its playable edge.
pub fn render_tableau_piles(state: &GameState) -> String {
    let mut s = String::new();

    s.push_str("Tableau:\n");
    s.push_str("      ");
    for pile_idx in 0..NUM_TABLEAU_PILES {
        s.push_str(&format!(" P{} ", pile_idx + 1));
    }
    s.push('\n');

    let max_height = state.tableau.iter().map(|p| p.len()).max().unwrap_or(0);
    for row in 0..max_height {
        s.push_str("      ");
        for pile in &state.tableau {
            match pile.as_slice().get(row) {
                Some(&card) => s.push_str(&format!("{:>3} ", format_card_visible(card))),
                None => s.push_str("    "),
            }
        }
        s.push('\n');
    }

    s
}

/// Render a full position: foundations, stock/waste, tableau, and the
/// score line.
pub fn render_state(state: &GameState) -> String {
    let mut s = String::new();
    s.push_str(&render_foundations(state));
    s.push('\n');
    s.push_str(&render_stock_and_waste(state));
    s.push('\n');
    s.push('\n');
    s.push_str(&render_tableau_piles(state));
    s.push_str(&format!(
        "Draw {} | moves {} | score {}",
        state.draw_mode.cards_per_draw(),
        state.moves,
        state.score
    ));
    s
}

pub fn print_state(state: &GameState) {
    println!("{}", render_state(state));
}

/// Debug helper: every pile with all cards shown, bottom -> top.
pub fn render_full_piles_debug(state: &GameState) -> String {
    fn line(label: &str, cards: &[Card]) -> String {
        if cards.is_empty() {
            format!("  {label}: <empty>\n")
        } else {
            let codes: Vec<String> = cards.iter().map(|c| c.short_str()).collect();
            format!("  {label}: {}\n", codes.join(" "))
        }
    }

    let mut s = String::from("Full piles (all cards shown, bottom -> top within each pile):\n");
    for (i, pile) in state.tableau.iter().enumerate() {
        s.push_str(&line(&format!("P{}", i + 1), pile.as_slice()));
    }
    s.push_str(&line("Stock", state.stock.as_slice()));
    s.push_str(&line("Waste", state.waste.as_slice()));
    s
}

/// Describe each move of `line`, replaying it from `start` so every
/// description names the cards actually moved.
pub fn render_move_line(start: &GameState, line: &[Move]) -> String {
    let mut state = *start;
    let mut s = String::new();
    for (i, mv) in line.iter().enumerate() {
        s.push_str(&format!("  {:3}: {}\n", i + 1, mv.describe(&state)));
        mv.apply(&mut state);
    }
    s
}
