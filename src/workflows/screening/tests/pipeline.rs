use std::sync::Arc;

use super::common::{engine, engine_with, raw_tender, FailingStore};
use crate::workflows::screening::{
    CancelFlag, InMemoryCaseStore, PipelineError, RawTender, RiskTier, ScoringConfig,
    ScreeningPipeline, SourceError, StaticTenderSource, TenderSource,
};

struct BrokenSource;

impl TenderSource for BrokenSource {
    fn fetch_tenders(&self, _days_back: u32) -> Result<Vec<RawTender>, SourceError> {
        Err(SourceError::Unavailable("collector offline".to_string()))
    }
}

fn pipeline_over(
    tenders: Vec<RawTender>,
) -> ScreeningPipeline<StaticTenderSource, InMemoryCaseStore> {
    ScreeningPipeline::new(
        Arc::new(StaticTenderSource::new(tenders)),
        Arc::new(InMemoryCaseStore::default()),
        Arc::new(engine()),
    )
}

#[test]
fn malformed_records_are_skipped_not_fatal() {
    let mut broken = raw_tender("PT", 2);
    broken.estimated_value = None;

    let pipeline = pipeline_over(vec![raw_tender("PT", 1), broken, raw_tender("PT", 3)]);
    let report = pipeline.run(7).expect("batch completes");

    assert_eq!(report.collected, 3);
    assert_eq!(report.scored, 2);
    assert_eq!(report.skipped, 1);
    assert!(!report.cancelled);
}

#[test]
fn ranking_breaks_score_ties_by_identifier() {
    let pipeline = pipeline_over(vec![raw_tender("B", 1), raw_tender("A", 1)]);
    let report = pipeline.run(7).expect("batch completes");

    assert_eq!(report.cases.len(), 2);
    assert_eq!(report.cases[0].score, report.cases[1].score);
    assert_eq!(report.cases[0].id.0, "A-2024-001");
    assert_eq!(report.cases[1].id.0, "B-2024-001");
}

#[test]
fn ranking_orders_by_score_descending() {
    let quiet = raw_tender("PT", 1);
    let mut loud = raw_tender("PT", 2);
    loud.estimated_value = Some(200_000.0);
    loud.participant_count = Some(1);

    let pipeline = pipeline_over(vec![quiet, loud]);
    let report = pipeline.run(7).expect("batch completes");

    assert_eq!(report.cases[0].id.0, "PT-2024-002");
    assert!(report.cases[0].score > report.cases[1].score);
}

#[test]
fn source_failure_aborts_the_batch() {
    let pipeline = ScreeningPipeline::new(
        Arc::new(BrokenSource),
        Arc::new(InMemoryCaseStore::default()),
        Arc::new(engine()),
    );
    assert!(matches!(pipeline.run(7), Err(PipelineError::Source(_))));
}

#[test]
fn persistence_failure_reports_scored_count() {
    let pipeline = ScreeningPipeline::new(
        Arc::new(StaticTenderSource::new(vec![
            raw_tender("PT", 1),
            raw_tender("PT", 2),
        ])),
        Arc::new(FailingStore),
        Arc::new(engine()),
    );

    match pipeline.run(7) {
        Err(PipelineError::Persistence { scored, .. }) => assert_eq!(scored, 2),
        other => panic!("expected persistence failure, got {other:?}"),
    }
}

#[test]
fn cancelled_run_completes_with_partial_output() {
    let pipeline = pipeline_over(vec![raw_tender("PT", 1), raw_tender("PT", 2)]);
    let cancel = CancelFlag::new();
    cancel.cancel();

    let report = pipeline.run_with_cancel(7, &cancel).expect("run still completes");
    assert!(report.cancelled);
    assert_eq!(report.scored, 0);
    assert_eq!(report.collected, 2);
}

#[test]
fn history_covers_the_whole_batch_before_scoring() {
    // With a two-bid sample threshold, each tender's repeat-winner criterion
    // must see the aggregate built from both tenders, not a running count.
    let config = ScoringConfig {
        min_bid_sample: 2,
        ..ScoringConfig::default()
    };

    let mut first = raw_tender("PT", 1);
    first.winning_vendor = Some("vendor-1".to_string());
    first.bidders = vec!["vendor-1".to_string()];
    let mut second = raw_tender("PT", 2);
    second.winning_vendor = Some("vendor-1".to_string());
    second.bidders = vec!["vendor-1".to_string()];

    let pipeline = ScreeningPipeline::new(
        Arc::new(StaticTenderSource::new(vec![first, second])),
        Arc::new(InMemoryCaseStore::default()),
        Arc::new(engine_with(config)),
    );
    let report = pipeline.run(7).expect("batch completes");

    let expected = "Vendor win rate 100% with this body".to_string();
    for case in &report.cases {
        assert!(
            case.evidence.contains(&expected),
            "case {} missing aggregate evidence: {:?}",
            case.id.0,
            case.evidence
        );
    }
}

#[test]
fn snapshot_reflects_the_latest_run() {
    let pipeline = pipeline_over(vec![raw_tender("PT", 1)]);
    assert!(pipeline.store().snapshot().is_none());

    let report = pipeline.run(7).expect("batch completes");
    let snapshot = pipeline.store().snapshot().expect("snapshot stored");

    assert_eq!(snapshot.total_count, 1);
    assert_eq!(snapshot.cases, report.cases);
}

#[test]
fn suspicious_count_covers_high_and_critical() {
    let mut extreme = raw_tender("PT", 1);
    extreme.estimated_value = Some(500_000.0);
    extreme.participant_count = Some(1);
    extreme.specification =
        "exclusively a specific brand, specific model, sole supplier".to_string();

    let pipeline = pipeline_over(vec![extreme, raw_tender("PT", 2)]);
    let report = pipeline.run(7).expect("batch completes");

    assert_eq!(report.suspicious, 1);
    assert!(report.cases[0].tier.is_suspicious());
    assert_eq!(report.cases[1].tier, RiskTier::Low);
}
