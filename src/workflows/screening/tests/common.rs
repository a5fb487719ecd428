//! Shared builders for the screening test suite.

use crate::workflows::screening::{
    AwardingBody, BidStats, BodyId, Case, CaseStore, PriceRange, RawTender, ReferencePriceIndex,
    ScoringConfig, ScoringEngine, StoreError, Tender, TenderId, VendorHistoryTable, VendorId,
    Vocabulary,
};

pub(super) fn reference_index() -> ReferencePriceIndex {
    let mut index = ReferencePriceIndex::new();
    index.insert("laptop", PriceRange::new(50_000.0, 100_000.0));
    index
}

pub(super) fn engine() -> ScoringEngine {
    engine_with(ScoringConfig::default())
}

pub(super) fn engine_with(config: ScoringConfig) -> ScoringEngine {
    ScoringEngine::new(config, reference_index(), Vocabulary::default())
        .expect("test config is valid")
}

/// A quiet tender: priced within the reference band, clean wording, healthy
/// competition, no resolved winner.
pub(super) fn tender(id: &str) -> Tender {
    Tender {
        id: TenderId(id.to_string()),
        category: "laptop".to_string(),
        estimated_value: 80_000.0,
        homologated_value: None,
        specification: "400 units, 16GB RAM, 3-year warranty".to_string(),
        body: AwardingBody {
            id: BodyId("org-001".to_string()),
            name: "City Procurement Office".to_string(),
            region: "SP".to_string(),
        },
        winning_vendor: None,
        bidders: Vec::new(),
        participant_count: 3,
    }
}

/// A tender tripping all four criteria: 50% above the reference upper bound,
/// two restrictive markers, a dominant repeat winner, a single bidder.
pub(super) fn suspicious_tender(id: &str) -> Tender {
    let mut suspect = tender(id);
    suspect.estimated_value = 150_000.0;
    suspect.specification =
        "Supplied exclusively as a specific brand configuration".to_string();
    suspect.winning_vendor = Some(VendorId("vendor-1".to_string()));
    suspect.participant_count = 1;
    suspect
}

/// History giving vendor-1 an 85% win rate (17 of 20) with org-001.
pub(super) fn dominant_history() -> VendorHistoryTable {
    let mut history = VendorHistoryTable::default();
    history.insert(
        VendorId("vendor-1".to_string()),
        BodyId("org-001".to_string()),
        BidStats {
            total: 20,
            wins: 17,
        },
    );
    history
}

pub(super) fn raw_tender(control: &str, sequence: u32) -> RawTender {
    RawTender {
        control_number: control.to_string(),
        year: 2024,
        sequence,
        category: "laptop".to_string(),
        estimated_value: Some(80_000.0),
        homologated_value: None,
        specification: "400 units, 16GB RAM".to_string(),
        body_id: "org-001".to_string(),
        body_name: "City Procurement Office".to_string(),
        region: "SP".to_string(),
        winning_vendor: None,
        bidders: Vec::new(),
        participant_count: Some(3),
    }
}

/// Store that always refuses writes, for persistence failure paths.
pub(super) struct FailingStore;

impl CaseStore for FailingStore {
    fn store(&self, _cases: &[Case]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("case store offline".to_string()))
    }
}
