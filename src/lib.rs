pub mod card;
pub mod pile;
pub mod rules;
pub mod moves;
pub mod game;
pub mod greedy;
pub mod search;
pub mod deal;
pub mod deal_code;
pub mod display;
pub mod stats;
pub mod canonical_decks;

pub use crate::deal::{generate_guaranteed_solvable_deal, DealConfig, DealStrategy, GeneratedDeal};
pub use crate::game::{DrawMode, GameState};
pub use crate::moves::{Move, Source};

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::display::{print_state, render_full_piles_debug, render_move_line};
use crate::greedy::GreedyLimits;
use crate::search::{DetailLevel, SearchConfig};
use crate::stats::GenerationStats;

/// Generate winnable Klondike deals, or check a given deal.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Cards turned over per draw (1 or 3)
    #[arg(short, long, default_value = "1", value_parser = parse_draw_mode)]
    pub draw: DrawMode,

    /// Seed for the deal generator; random if omitted
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Number of deals to generate
    #[arg(short, long, default_value_t = 1)]
    pub count: u32,

    /// Solve this deal instead of generating one (deal number or [i, ...] list)
    #[arg(long)]
    pub deal: Option<String>,

    /// Log every search node at trace level and print winning lines
    #[arg(long, default_value_t = false)]
    pub trace: bool,

    /// Also run the greedy simulator on each deal
    #[arg(long, default_value_t = false)]
    pub greedy: bool,
}

fn parse_draw_mode(s: &str) -> Result<DrawMode, String> {
    let n: u8 = s.parse().map_err(|_| format!("not a number: {s:?}"))?;
    DrawMode::try_from(n).map_err(|e| e.to_string())
}

/// Entry point for the `klondike_deal` binary.
///
/// Example:
///   cargo run -- --draw 3 --seed 12345 --count 20
pub fn run() -> anyhow::Result<()> {
    run_with(Args::parse())
}

pub fn run_with(args: Args) -> anyhow::Result<()> {
    let detail = if args.trace {
        DetailLevel::Trace
    } else {
        DetailLevel::Summary
    };

    if let Some(code) = &args.deal {
        let deck = deal_code::parse_deal_code(code)?;
        let state = GameState::deal_from_deck(&deck, args.draw);
        check_deal(&state, detail, args.greedy);
        return Ok(());
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let config = DealConfig::default();
    let mut stats = GenerationStats::default();

    for i in 0..args.count {
        let deal = deal::generate_guaranteed_solvable_deal_with(args.draw, &config, &mut rng);
        stats.record(&deal);

        let number = deal_code::deal_number_of(&deal.state)
            .map(|n| n.to_string())
            .unwrap_or_default();
        println!(
            "Deal {}: {:?} after {} attempts, verified={}",
            i + 1,
            deal.strategy,
            deal.attempts,
            deal.verified
        );
        println!("Deal number: {number}");
        if args.count == 1 || args.trace {
            print_state(&deal.state);
            println!();
        }
        if args.trace {
            print!("{}", render_full_piles_debug(&deal.state));
        }
        if args.greedy {
            let outcome = greedy::simulate(&deal.state, GreedyLimits::default());
            println!(
                "Greedy: win={} after {} moves ({:?})",
                outcome.is_win, outcome.moves_played, outcome.termination
            );
        }
    }

    if args.count > 1 {
        println!();
        println!("Deals: {}", stats.deals);
        println!(
            "Generate-and-test: {} ({:.1}%)",
            stats.by_generate_and_test,
            100.0 * stats.generate_and_test_rate()
        );
        println!("Reverse-play: {}", stats.by_reverse_play);
        println!("Mean attempts: {:.2}", stats.mean_attempts());
        println!(
            "Verified: {} ({:.1}%), unverified: {}",
            stats.verified,
            100.0 * stats.verified_rate(),
            stats.unverified
        );
    }

    Ok(())
}

/// Print a deal and what the solvers make of it.
fn check_deal(state: &GameState, detail: DetailLevel, with_greedy: bool) {
    print_state(state);
    println!();
    if detail == DetailLevel::Trace {
        print!("{}", render_full_piles_debug(state));
    }

    if with_greedy {
        let outcome = greedy::simulate(state, GreedyLimits::default());
        println!(
            "Greedy: win={} after {} moves ({:?})",
            outcome.is_win, outcome.moves_played, outcome.termination
        );
    }

    let config = SearchConfig {
        detail,
        ..SearchConfig::default()
    };
    let outcome = search::solve(state, &config);
    println!("Nodes visited: {}", outcome.nodes_visited);
    println!("Duplicate states: {}", outcome.duplicate_states);
    println!("Win? {}", outcome.is_win);
    println!("Termination reason: {:?}", outcome.termination);
    println!("Max depth (moves): {}", outcome.max_depth_seen);
    println!("Max DFS stack: {}", outcome.max_stack);

    if let Some(line) = &outcome.winning_line {
        println!("Winning move count: {}", line.len());
        if detail == DetailLevel::Trace {
            println!("Winning move sequence:");
            print!("{}", render_move_line(state, line));
        }
    }
}
