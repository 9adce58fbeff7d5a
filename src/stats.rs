use crate::deal::{DealStrategy, GeneratedDeal};

/// Tallies for a batch of generated deals.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationStats {
    pub deals: u64,
    pub by_generate_and_test: u64,
    pub by_reverse_play: u64,
    /// Candidate deals built across the whole batch.
    pub total_attempts: u64,
    pub verified: u64,
    pub unverified: u64,
}

impl GenerationStats {
    pub fn record(&mut self, deal: &GeneratedDeal) {
        self.deals += 1;
        match deal.strategy {
            DealStrategy::GenerateAndTest => self.by_generate_and_test += 1,
            DealStrategy::ReversePlay => self.by_reverse_play += 1,
        }
        self.total_attempts += u64::from(deal.attempts);
        if deal.verified {
            self.verified += 1;
        } else {
            self.unverified += 1;
        }
    }

    /// Share of deals that generate-and-test produced on its own.
    pub fn generate_and_test_rate(&self) -> f64 {
        if self.deals == 0 {
            0.0
        } else {
            self.by_generate_and_test as f64 / self.deals as f64
        }
    }

    pub fn verified_rate(&self) -> f64 {
        if self.deals == 0 {
            0.0
        } else {
            self.verified as f64 / self.deals as f64
        }
    }

    pub fn mean_attempts(&self) -> f64 {
        if self.deals == 0 {
            0.0
        } else {
            self.total_attempts as f64 / self.deals as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{DrawMode, GameState};

    fn deal(strategy: DealStrategy, attempts: u32, verified: bool) -> GeneratedDeal {
        GeneratedDeal {
            state: GameState::empty(DrawMode::One),
            strategy,
            attempts,
            verified,
        }
    }

    #[test]
    fn empty_stats_have_zero_rates() {
        let stats = GenerationStats::default();
        assert_eq!(stats.generate_and_test_rate(), 0.0);
        assert_eq!(stats.verified_rate(), 0.0);
        assert_eq!(stats.mean_attempts(), 0.0);
    }

    #[test]
    fn records_strategy_and_verification() {
        let mut stats = GenerationStats::default();
        stats.record(&deal(DealStrategy::GenerateAndTest, 3, true));
        stats.record(&deal(DealStrategy::ReversePlay, 51, true));
        stats.record(&deal(DealStrategy::GenerateAndTest, 1, true));
        stats.record(&deal(DealStrategy::ReversePlay, 70, false));

        assert_eq!(stats.deals, 4);
        assert_eq!(stats.by_generate_and_test, 2);
        assert_eq!(stats.by_reverse_play, 2);
        assert_eq!(stats.total_attempts, 125);
        assert_eq!(stats.verified, 3);
        assert_eq!(stats.unverified, 1);
        assert_eq!(stats.generate_and_test_rate(), 0.5);
        assert_eq!(stats.verified_rate(), 0.75);
        assert_eq!(stats.mean_attempts(), 31.25);
    }
}
