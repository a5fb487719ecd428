use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for normalized tenders, derived from control number,
/// year, and sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TenderId(pub String);

/// Identifier wrapper for bidding vendors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VendorId(pub String);

/// Identifier wrapper for awarding bodies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyId(pub String);

/// Raw record shape handed over by the ingestion collaborator. Fields are
/// optional wherever upstream feeds are known to omit them; normalization
/// decides which absences disqualify the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTender {
    pub control_number: String,
    pub year: u16,
    pub sequence: u32,
    pub category: String,
    pub estimated_value: Option<f64>,
    #[serde(default)]
    pub homologated_value: Option<f64>,
    #[serde(default)]
    pub specification: String,
    pub body_id: String,
    pub body_name: String,
    pub region: String,
    #[serde(default)]
    pub winning_vendor: Option<String>,
    #[serde(default)]
    pub bidders: Vec<String>,
    #[serde(default)]
    pub participant_count: Option<u32>,
}

/// Public entity running the procurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardingBody {
    pub id: BodyId,
    pub name: String,
    pub region: String,
}

/// Normalized, scoring-ready tender. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tender {
    pub id: TenderId,
    pub category: String,
    pub estimated_value: f64,
    pub homologated_value: Option<f64>,
    pub specification: String,
    pub body: AwardingBody,
    pub winning_vendor: Option<VendorId>,
    pub bidders: Vec<VendorId>,
    pub participant_count: u32,
}

/// Coarse bucketing of the final 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    /// Pure tier function over the final score; lower bounds are inclusive.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=39 => RiskTier::Low,
            40..=59 => RiskTier::Medium,
            60..=79 => RiskTier::High,
            _ => RiskTier::Critical,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
            RiskTier::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(RiskTier::Low),
            "medium" => Some(RiskTier::Medium),
            "high" => Some(RiskTier::High),
            "critical" => Some(RiskTier::Critical),
            _ => None,
        }
    }

    pub const fn is_suspicious(self) -> bool {
        matches!(self, RiskTier::High | RiskTier::Critical)
    }
}

/// Persisted output record for a single scored tender. Created once by the
/// composite scorer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: TenderId,
    pub title: String,
    pub awarding_body: String,
    pub tier: RiskTier,
    pub score: u8,
    pub potential_savings: f64,
    pub evidence: Vec<String>,
}

/// Read-only view of the most recent batch, rendered by the reporting surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSnapshot {
    pub cases: Vec<Case>,
    pub total_count: usize,
    pub generated_at: DateTime<Utc>,
}
