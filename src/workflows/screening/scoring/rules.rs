use super::config::ScoringConfig;
use super::{Criterion, CriterionResult};
use crate::workflows::screening::domain::Tender;
use crate::workflows::screening::history::VendorHistoryTable;
use crate::workflows::screening::reference::ReferencePriceIndex;
use crate::workflows::screening::signals::Vocabulary;

pub(crate) struct PriceSignals {
    pub flagged: bool,
    pub reference_midpoint: Option<f64>,
}

fn zero(criterion: Criterion) -> CriterionResult {
    CriterionResult {
        criterion,
        subscore: 0.0,
        evidence: Vec::new(),
    }
}

/// Price Excess: linear from 0 at the reference upper bound to 1 at twice the
/// upper bound. A missing reference degrades to zero with explicit evidence
/// instead of failing the record.
pub(crate) fn price_excess(
    tender: &Tender,
    index: &ReferencePriceIndex,
    config: &ScoringConfig,
) -> (CriterionResult, PriceSignals) {
    let Some(range) = index.lookup(&tender.category) else {
        return (
            CriterionResult {
                criterion: Criterion::PriceExcess,
                subscore: 0.0,
                evidence: vec![format!(
                    "No market reference data for category \"{}\"",
                    tender.category
                )],
            },
            PriceSignals {
                flagged: false,
                reference_midpoint: None,
            },
        );
    };

    let signals = |flagged| PriceSignals {
        flagged,
        reference_midpoint: Some(range.midpoint),
    };

    if tender.estimated_value <= range.upper {
        return (zero(Criterion::PriceExcess), signals(false));
    }

    let subscore = ((tender.estimated_value - range.upper) / range.upper).clamp(0.0, 1.0);
    let percent_above = (tender.estimated_value / range.upper - 1.0) * 100.0;
    let flagged = tender.estimated_value > config.price_flag_ratio * range.upper;

    (
        CriterionResult {
            criterion: Criterion::PriceExcess,
            subscore,
            evidence: vec![format!("Price {percent_above:.1}% above market reference")],
        },
        signals(flagged),
    )
}

/// Tailor-Made Specification: proportional to distinct matched markers,
/// saturating at the configured count.
pub(crate) fn tailor_made(
    tender: &Tender,
    vocabulary: &Vocabulary,
    config: &ScoringConfig,
) -> CriterionResult {
    let matches = vocabulary.extract(&tender.specification);
    let subscore = (matches.len() as f64 / f64::from(config.marker_saturation)).min(1.0);
    let evidence = matches
        .into_iter()
        .map(|marker| format!("Restrictive wording: \"{marker}\""))
        .collect();

    CriterionResult {
        criterion: Criterion::TailorMade,
        subscore,
        evidence,
    }
}

/// Cartel/Repeat-Winner: linear from 0 at the win-rate floor to 1 at a 100%
/// win rate, ignored entirely on thin history.
pub(crate) fn repeat_winner(
    tender: &Tender,
    history: &VendorHistoryTable,
    config: &ScoringConfig,
) -> CriterionResult {
    let Some(vendor) = &tender.winning_vendor else {
        return zero(Criterion::RepeatWinner);
    };

    let stats = history.get(vendor, &tender.body.id);
    let rate = stats.win_rate();
    if stats.total < config.min_bid_sample || rate <= config.win_rate_floor {
        return zero(Criterion::RepeatWinner);
    }

    let subscore = ((rate - config.win_rate_floor) / (1.0 - config.win_rate_floor)).clamp(0.0, 1.0);

    CriterionResult {
        criterion: Criterion::RepeatWinner,
        subscore,
        evidence: vec![format!(
            "Vendor win rate {:.0}% with this body",
            rate * 100.0
        )],
    }
}

/// Low Competition: 1.0 below two participants, 0.5 at exactly two, 0 at
/// three or more.
pub(crate) fn low_competition(tender: &Tender) -> CriterionResult {
    let subscore = match tender.participant_count {
        0 | 1 => 1.0,
        2 => 0.5,
        _ => 0.0,
    };
    let evidence = if tender.participant_count < 3 {
        vec![format!("Only {} bidder(s)", tender.participant_count)]
    } else {
        Vec::new()
    };

    CriterionResult {
        criterion: Criterion::LowCompetition,
        subscore,
        evidence,
    }
}
