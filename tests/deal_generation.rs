use klondike_deal::deal::{self, DealConfig, DealStrategy};
use klondike_deal::deal_code;
use klondike_deal::game::{DrawMode, GameState};
use klondike_deal::greedy;
use klondike_deal::search::{self, SearchConfig, TerminationReason};
use klondike_deal::generate_guaranteed_solvable_deal;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn reverse_play_draw_one_deals_are_all_solvable() {
    let mut rng = StdRng::seed_from_u64(2024);
    for i in 0..100 {
        let state = deal::reverse_play_deal_with_rng(DrawMode::One, &mut rng);
        assert!(state.is_fresh_deal(), "deal {i} is not a standard layout");
        state.validate().unwrap();

        let outcome = search::solve(&state, &SearchConfig::default());
        assert!(outcome.is_win, "deal {i}: {:?}", outcome.termination);
        assert_eq!(outcome.termination, TerminationReason::Win);

        // The winning line replays to a won position through the public API.
        let mut replay = state;
        for mv in outcome.winning_line.unwrap() {
            assert!(replay.try_move(mv), "deal {i}: illegal {mv:?}");
        }
        assert!(replay.is_won());
        assert!(replay.is_complete);
    }
}

#[test]
fn guaranteed_deals_are_fresh_and_winnable() {
    for mode in [DrawMode::One, DrawMode::Three] {
        let state = generate_guaranteed_solvable_deal(mode);
        assert!(state.is_fresh_deal());
        assert_eq!(state.draw_mode, mode);
        state.validate().unwrap();
        if mode == DrawMode::One {
            assert!(search::can_solve(&state));
        }
    }
}

#[test]
fn seeded_generation_is_reproducible() {
    let config = DealConfig {
        max_attempts: 3,
        ..DealConfig::default()
    };
    let a = deal::generate_guaranteed_solvable_deal_with(DrawMode::One, &config, &mut StdRng::seed_from_u64(11));
    let b = deal::generate_guaranteed_solvable_deal_with(DrawMode::One, &config, &mut StdRng::seed_from_u64(11));
    assert_eq!(a, b);
    assert!(a.verified);
    if a.strategy == DealStrategy::GenerateAndTest {
        assert!(a.attempts <= 3);
    } else {
        assert_eq!(a.attempts, 4);
    }
    assert!(search::can_solve(&a.state));
}

#[test]
fn greedy_wins_are_search_wins() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..20 {
        let state = deal::reverse_play_deal_with_rng(DrawMode::One, &mut rng);
        if greedy::can_solve_greedy(&state) {
            assert!(search::can_solve(&state));
        }
    }
}

#[test]
fn deal_numbers_reload_generated_deals() {
    let mut rng = StdRng::seed_from_u64(31);
    let state = deal::reverse_play_deal_with_rng(DrawMode::Three, &mut rng);
    let number = deal_code::deal_number_of(&state).unwrap();
    let deck = deal_code::parse_deal_code(&number.to_string()).unwrap();
    assert_eq!(GameState::deal_from_deck(&deck, DrawMode::Three), state);
}

#[test]
fn game_state_survives_json() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut state = deal::random_deal_with_rng(DrawMode::Three, &mut rng);
    for _ in 0..5 {
        let mv = klondike_deal::moves::suggest_move(&state).unwrap();
        assert!(state.try_move(mv));
    }

    let json = serde_json::to_string(&state).unwrap();
    let back: GameState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, state);
    back.validated().unwrap();
}

#[test]
fn draw_mode_serializes_as_a_number() {
    assert_eq!(serde_json::to_string(&DrawMode::One).unwrap(), "1");
    assert_eq!(serde_json::to_string(&DrawMode::Three).unwrap(), "3");
    assert_eq!(serde_json::from_str::<DrawMode>("3").unwrap(), DrawMode::Three);
    assert!(serde_json::from_str::<DrawMode>("2").is_err());
}

#[test]
fn loaded_states_are_checked() {
    let state = GameState::deal_from_deck(&klondike_deal::card::shuffled_deck_from_seed(3), DrawMode::One);
    let mut value = serde_json::to_value(state).unwrap();

    // More cards than a foundation can hold.
    let card = value["stock"][0].clone();
    value["foundations"][0] = serde_json::Value::Array(vec![card; 14]);
    assert!(serde_json::from_value::<GameState>(value.clone()).is_err());

    // A duplicated card deserializes but fails validation.
    let mut dup = serde_json::to_value(state).unwrap();
    let first = dup["stock"][0].clone();
    dup["stock"][1] = first;
    let loaded: GameState = serde_json::from_value(dup).unwrap();
    assert!(loaded.validate().is_err());
}
