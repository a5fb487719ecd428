//! Tender screening: normalization, the four weighted detection criteria,
//! composite risk scoring, and the batch pipeline that turns a tender feed
//! into a ranked, persisted case list.

pub mod domain;
pub mod history;
pub mod normalizer;
pub mod pipeline;
pub mod reference;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod signals;

#[cfg(test)]
mod tests;

pub use domain::{
    AwardingBody, BodyId, Case, CaseSnapshot, RawTender, RiskTier, Tender, TenderId, VendorId,
};
pub use history::{BidStats, VendorHistoryTable};
pub use normalizer::MalformedTenderError;
pub use pipeline::{BatchPhase, BatchReport, CancelFlag, PipelineError, ScreeningPipeline};
pub use reference::{IndexLoadError, PriceRange, ReferencePriceIndex};
pub use repository::{
    CaseStore, InMemoryCaseStore, JsonFileCaseStore, JsonFileTenderSource, SourceError,
    StaticTenderSource, StoreError, TenderSource,
};
pub use router::screening_router;
pub use scoring::{
    Assessment, ConfigurationError, Criterion, CriterionResult, ScoringConfig, ScoringEngine,
};
pub use signals::Vocabulary;
