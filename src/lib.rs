//! Tender screening service: flags public procurement records likely to be
//! overpriced or collusive, producing a bounded 0-100 risk score and the
//! supporting evidence for each record.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
