use tracing::warn;

use super::domain::{AwardingBody, BodyId, RawTender, Tender, TenderId, VendorId};

/// Field-level failures that disqualify a single raw record. The batch
/// pipeline skips the record and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum MalformedTenderError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` is invalid: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

fn required<'a>(
    value: &'a str,
    field: &'static str,
) -> Result<&'a str, MalformedTenderError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(MalformedTenderError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

fn positive_amount(value: f64, field: &'static str) -> Result<f64, MalformedTenderError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(MalformedTenderError::InvalidField {
            field,
            reason: format!("expected a positive amount, got {value}"),
        })
    }
}

/// Turn a raw ingestion record into a scoring-ready tender.
///
/// Category keys are lowercased so they match the reference price index; the
/// identifier is composed as control number + year + sequence.
pub fn normalize(raw: RawTender) -> Result<Tender, MalformedTenderError> {
    let control = required(&raw.control_number, "control_number")?;
    let category = required(&raw.category, "category")?.to_lowercase();
    let body_id = required(&raw.body_id, "body_id")?;
    let body_name = required(&raw.body_name, "body_name")?;

    let estimated_value = positive_amount(
        raw.estimated_value
            .ok_or(MalformedTenderError::MissingField("estimated_value"))?,
        "estimated_value",
    )?;

    let homologated_value = raw
        .homologated_value
        .map(|value| positive_amount(value, "homologated_value"))
        .transpose()?;

    let id = TenderId(format!("{control}-{}-{:03}", raw.year, raw.sequence));

    if let Some(homologated) = homologated_value {
        if homologated > estimated_value {
            // Anomalous but not disqualifying; potential savings clamp to zero.
            warn!(
                tender = %id.0,
                estimated_value,
                homologated_value = homologated,
                "homologated value exceeds estimated value"
            );
        }
    }

    let bidders: Vec<VendorId> = raw
        .bidders
        .iter()
        .map(|vendor| vendor.trim())
        .filter(|vendor| !vendor.is_empty())
        .map(|vendor| VendorId(vendor.to_string()))
        .collect();

    let winning_vendor = raw
        .winning_vendor
        .as_deref()
        .map(str::trim)
        .filter(|vendor| !vendor.is_empty())
        .map(|vendor| VendorId(vendor.to_string()));

    let participant_count = raw.participant_count.unwrap_or(bidders.len() as u32);

    Ok(Tender {
        id,
        category,
        estimated_value,
        homologated_value,
        specification: raw.specification.trim().to_string(),
        body: AwardingBody {
            id: BodyId(body_id.to_string()),
            name: body_name.to_string(),
            region: raw.region.trim().to_string(),
        },
        winning_vendor,
        bidders,
        participant_count,
    })
}
