use serde::{Deserialize, Serialize};

/// Weight and threshold set for the four detection criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub price_excess_weight: f64,
    pub tailor_made_weight: f64,
    pub repeat_winner_weight: f64,
    pub low_competition_weight: f64,
    /// Estimated value above this multiple of the reference upper bound marks
    /// the case as suspected overpricing.
    pub price_flag_ratio: f64,
    /// Distinct marker count at which the tailor-made sub-score saturates.
    pub marker_saturation: u32,
    /// Win rates at or below this floor contribute nothing to the
    /// repeat-winner criterion.
    pub win_rate_floor: f64,
    /// Minimum recorded bids before a win rate is trusted at all.
    pub min_bid_sample: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            price_excess_weight: 0.40,
            tailor_made_weight: 0.30,
            repeat_winner_weight: 0.20,
            low_competition_weight: 0.10,
            price_flag_ratio: 1.30,
            marker_saturation: 3,
            win_rate_floor: 0.70,
            min_bid_sample: 5,
        }
    }
}

/// Invalid scoring configuration. Fatal at startup, never at per-record
/// granularity.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("criterion weights must sum to 1.0, got {0}")]
    WeightSum(f64),
    #[error("criterion weights must be non-negative")]
    NegativeWeight,
    #[error("marker saturation must be at least 1")]
    ZeroSaturation,
    #[error("win rate floor must lie within [0, 1), got {0}")]
    WinRateFloor(f64),
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let weights = [
            self.price_excess_weight,
            self.tailor_made_weight,
            self.repeat_winner_weight,
            self.low_competition_weight,
        ];
        if weights.iter().any(|weight| *weight < 0.0) {
            return Err(ConfigurationError::NegativeWeight);
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > 1e-9 {
            return Err(ConfigurationError::WeightSum(sum));
        }
        if self.marker_saturation == 0 {
            return Err(ConfigurationError::ZeroSaturation);
        }
        if !(0.0..1.0).contains(&self.win_rate_floor) {
            return Err(ConfigurationError::WinRateFloor(self.win_rate_floor));
        }
        Ok(())
    }
}
