pub mod digikey;
pub mod mouser;

pub use digikey::{DigiKeyClient, DigiKeyConfig};
pub use mouser::MouserClient;

use crate::models::ComponentRecord;

/// Failure from one distributor, carrying which source produced it. The
/// Display form is exactly the string the aggregate response reports.
#[derive(Debug, Clone)]
pub struct AdapterError {
    pub source: String,
    pub message: String,
}

impl std::fmt::Display for AdapterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}

impl std::error::Error for AdapterError {}

impl AdapterError {
    pub fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_configured(source: &str) -> Self {
        Self::new(source, "API credentials not configured")
    }

    pub fn request(source: &str, err: &reqwest::Error) -> Self {
        Self::new(source, format!("request failed: {err}"))
    }

    pub fn status(source: &str, status: reqwest::StatusCode) -> Self {
        Self::new(source, format!("unexpected HTTP status {status}"))
    }

    pub fn decode(source: &str, err: &reqwest::Error) -> Self {
        Self::new(source, format!("failed to decode response: {err}"))
    }
}

/// One searchable distributor. Implementations normalize vendor payloads
/// into [`ComponentRecord`]s and report failure as a value, never a panic.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable identifier used in request source lists and result maps.
    fn id(&self) -> &'static str;

    /// Whether credentials for this source are present.
    fn is_configured(&self) -> bool;

    /// Runs a keyword search against the distributor. The limit is
    /// advisory; adapters clamp it to whatever the vendor accepts.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when credentials are missing, the request
    /// fails, or the vendor answers with an error payload.
    async fn search(&self, keyword: &str, limit: u32)
    -> Result<Vec<ComponentRecord>, AdapterError>;
}

/// Drops records missing identity fields before they leave the adapter.
#[must_use]
pub fn discard_invalid(source: &str, records: Vec<ComponentRecord>) -> Vec<ComponentRecord> {
    let before = records.len();
    let valid: Vec<ComponentRecord> = records
        .into_iter()
        .filter(ComponentRecord::is_valid)
        .collect();
    if valid.len() < before {
        tracing::debug!(
            "{}: discarded {} records with missing identity fields",
            source,
            before - valid.len()
        );
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, LifecycleStatus, Pricing};

    fn record(part_number: &str, manufacturer: &str) -> ComponentRecord {
        ComponentRecord {
            part_number: part_number.to_string(),
            manufacturer: manufacturer.to_string(),
            description: "desc".to_string(),
            category: String::new(),
            datasheet_url: None,
            product_url: None,
            specifications: std::collections::HashMap::new(),
            pricing: Pricing::default(),
            availability: Availability::default(),
            lifecycle_status: LifecycleStatus::Unknown,
            source: "digikey".to_string(),
        }
    }

    #[test]
    fn adapter_error_display_is_source_prefixed() {
        let err = AdapterError::not_configured("mouser");
        assert_eq!(err.to_string(), "mouser: API credentials not configured");
    }

    #[test]
    fn discard_invalid_filters_records_without_identity() {
        let records = vec![record("STM32F407VGT6", "STMicroelectronics"), record("", "Nobody")];
        let valid = discard_invalid("digikey", records);
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].part_number, "STM32F407VGT6");
    }
}
