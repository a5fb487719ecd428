use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{Case, CaseSnapshot, Tender};
use super::history::VendorHistoryTable;
use super::normalizer;
use super::repository::{CaseStore, SourceError, StoreError, TenderSource};
use super::scoring::ScoringEngine;

/// Strictly sequential phases of a batch run; there is no loop-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Collecting,
    Aggregating,
    Scoring,
    Ranking,
    Done,
}

impl BatchPhase {
    pub const fn label(self) -> &'static str {
        match self {
            BatchPhase::Collecting => "collecting",
            BatchPhase::Aggregating => "aggregating",
            BatchPhase::Scoring => "scoring",
            BatchPhase::Ranking => "ranking",
            BatchPhase::Done => "done",
        }
    }
}

/// Cooperative cancellation handle, checked between tenders during the
/// Scoring phase. Cases scored before the flag is raised remain valid and
/// are still ranked and returned.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Summary of one completed batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub days_back: u32,
    pub collected: usize,
    pub scored: usize,
    pub skipped: usize,
    pub suspicious: usize,
    pub cancelled: bool,
    pub cases: Vec<Case>,
}

impl BatchReport {
    pub fn snapshot(&self) -> CaseSnapshot {
        CaseSnapshot {
            cases: self.cases.clone(),
            total_count: self.cases.len(),
            generated_at: self.generated_at,
        }
    }
}

/// Batch-level failures. Per-tender normalization errors never surface here;
/// they are converted to skip-and-log at the pipeline boundary.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("failed to persist {scored} scored case(s): {source}")]
    Persistence {
        scored: usize,
        #[source]
        source: StoreError,
    },
}

/// Orchestrates collection, aggregation, scoring, ranking, and persistence
/// for one batch of tenders.
pub struct ScreeningPipeline<S, P> {
    source: Arc<S>,
    store: Arc<P>,
    engine: Arc<ScoringEngine>,
}

impl<S, P> ScreeningPipeline<S, P>
where
    S: TenderSource + 'static,
    P: CaseStore + 'static,
{
    pub fn new(source: Arc<S>, store: Arc<P>, engine: Arc<ScoringEngine>) -> Self {
        Self {
            source,
            store,
            engine,
        }
    }

    pub fn store(&self) -> &Arc<P> {
        &self.store
    }

    pub fn run(&self, days_back: u32) -> Result<BatchReport, PipelineError> {
        self.run_with_cancel(days_back, &CancelFlag::new())
    }

    /// Run the full batch. The vendor history table is completely built
    /// before any scoring task starts; the phase boundary is the
    /// synchronization point, and no writer exists afterwards.
    pub fn run_with_cancel(
        &self,
        days_back: u32,
        cancel: &CancelFlag,
    ) -> Result<BatchReport, PipelineError> {
        info!(phase = BatchPhase::Collecting.label(), days_back, "batch run started");
        let raw = self.source.fetch_tenders(days_back)?;
        let collected = raw.len();

        let mut tenders = Vec::with_capacity(collected);
        let mut skipped = 0usize;
        for record in raw {
            match normalizer::normalize(record) {
                Ok(tender) => tenders.push(tender),
                Err(err) => {
                    skipped += 1;
                    warn!(%err, "skipping malformed tender");
                }
            }
        }

        info!(
            phase = BatchPhase::Aggregating.label(),
            tenders = tenders.len(),
            "building vendor history"
        );
        let history = VendorHistoryTable::build(&tenders);

        info!(phase = BatchPhase::Scoring.label(), "scoring tenders");
        let mut cases = self.score_all(&tenders, &history, cancel);

        info!(phase = BatchPhase::Ranking.label(), cases = cases.len(), "ranking cases");
        cases.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));

        let scored = cases.len();
        self.store
            .store(&cases)
            .map_err(|source| PipelineError::Persistence { scored, source })?;

        let suspicious = cases.iter().filter(|case| case.tier.is_suspicious()).count();
        info!(
            phase = BatchPhase::Done.label(),
            collected, scored, skipped, suspicious, "batch run complete"
        );

        Ok(BatchReport {
            generated_at: Utc::now(),
            days_back,
            collected,
            scored,
            skipped,
            suspicious,
            cancelled: cancel.is_cancelled(),
            cases,
        })
    }

    /// Score tenders on a scoped worker pool. Everything a worker touches is
    /// immutable, so no locking is needed; ranking restores a deterministic
    /// order afterwards.
    fn score_all(
        &self,
        tenders: &[Tender],
        history: &VendorHistoryTable,
        cancel: &CancelFlag,
    ) -> Vec<Case> {
        if tenders.is_empty() {
            return Vec::new();
        }

        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(tenders.len());
        let chunk_size = tenders.len().div_ceil(workers);
        let engine = &self.engine;

        let mut cases = Vec::with_capacity(tenders.len());
        thread::scope(|scope| {
            let handles: Vec<_> = tenders
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        let mut local = Vec::with_capacity(chunk.len());
                        for tender in chunk {
                            if cancel.is_cancelled() {
                                break;
                            }
                            local.push(engine.score(tender, history));
                        }
                        local
                    })
                })
                .collect();
            for handle in handles {
                cases.extend(handle.join().expect("scoring worker panicked"));
            }
        });
        cases
    }
}
