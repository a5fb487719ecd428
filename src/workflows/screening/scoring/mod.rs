mod config;
mod rules;

pub use config::{ConfigurationError, ScoringConfig};

use serde::{Deserialize, Serialize};

use super::domain::{Case, RiskTier, Tender};
use super::history::VendorHistoryTable;
use super::reference::ReferencePriceIndex;
use super::signals::Vocabulary;

/// Detection criteria combined by the composite scorer. The declaration
/// order is also the evidence merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    PriceExcess,
    TailorMade,
    RepeatWinner,
    LowCompetition,
}

impl Criterion {
    pub const fn label(self) -> &'static str {
        match self {
            Criterion::PriceExcess => "price_excess",
            Criterion::TailorMade => "tailor_made",
            Criterion::RepeatWinner => "repeat_winner",
            Criterion::LowCompetition => "low_competition",
        }
    }
}

/// Sub-score in [0, 1] plus supporting evidence for one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionResult {
    pub criterion: Criterion,
    pub subscore: f64,
    pub evidence: Vec<String>,
}

/// Composite assessment of a single tender, allowing transparent audits of
/// each criterion's contribution before the case record is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub criteria: Vec<CriterionResult>,
    pub score: u8,
    pub tier: RiskTier,
    pub price_flagged: bool,
    pub reference_midpoint: Option<f64>,
}

/// Stateless composite scorer applying the weighted criteria to a tender.
/// Pure over its immutable inputs, so scoring may run on any number of
/// workers once the vendor history table is frozen.
pub struct ScoringEngine {
    config: ScoringConfig,
    index: ReferencePriceIndex,
    vocabulary: Vocabulary,
}

impl ScoringEngine {
    /// Build an engine, rejecting weight sets that do not sum to 1.0.
    pub fn new(
        config: ScoringConfig,
        index: ReferencePriceIndex,
        vocabulary: Vocabulary,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            config,
            index,
            vocabulary,
        })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Run all four criteria and combine them into the final score and tier.
    /// Evidence keeps the fixed order Price Excess, Tailor-Made,
    /// Repeat-Winner, Low Competition so output is diff-friendly across runs.
    pub fn assess(&self, tender: &Tender, history: &VendorHistoryTable) -> Assessment {
        let (price, price_signals) = rules::price_excess(tender, &self.index, &self.config);
        let tailor = rules::tailor_made(tender, &self.vocabulary, &self.config);
        let cartel = rules::repeat_winner(tender, history, &self.config);
        let competition = rules::low_competition(tender);

        let weighted = self.config.price_excess_weight * price.subscore
            + self.config.tailor_made_weight * tailor.subscore
            + self.config.repeat_winner_weight * cartel.subscore
            + self.config.low_competition_weight * competition.subscore;
        let score = (100.0 * weighted).round() as u8;

        Assessment {
            criteria: vec![price, tailor, cartel, competition],
            score,
            tier: RiskTier::from_score(score),
            price_flagged: price_signals.flagged,
            reference_midpoint: price_signals.reference_midpoint,
        }
    }

    /// Assess a tender and build its immutable case record.
    pub fn score(&self, tender: &Tender, history: &VendorHistoryTable) -> Case {
        let assessment = self.assess(tender, history);

        let potential_savings = match tender.homologated_value {
            Some(homologated) => (tender.estimated_value - homologated).max(0.0),
            None => assessment
                .reference_midpoint
                .map(|midpoint| (tender.estimated_value - midpoint).max(0.0))
                .unwrap_or(0.0),
        };

        let title = if assessment.price_flagged {
            format!("Suspected overpricing in {}", tender.category)
        } else {
            format!("Procurement review: {}", tender.category)
        };

        let evidence = assessment
            .criteria
            .iter()
            .flat_map(|result| result.evidence.iter().cloned())
            .collect();

        Case {
            id: tender.id.clone(),
            title,
            awarding_body: tender.body.name.clone(),
            tier: assessment.tier,
            score: assessment.score,
            potential_savings,
            evidence,
        }
    }
}
