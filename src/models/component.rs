use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A component offer normalized from one distributor. Every adapter emits
/// this shape regardless of what the vendor API calls the fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub part_number: String,
    pub manufacturer: String,
    pub description: String,
    /// Caller-supplied taxonomy tag, never taken from the vendor.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub datasheet_url: Option<String>,
    #[serde(default)]
    pub product_url: Option<String>,
    #[serde(default)]
    pub specifications: HashMap<String, String>,
    #[serde(default)]
    pub pricing: Pricing,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub lifecycle_status: LifecycleStatus,
    pub source: String,
}

impl ComponentRecord {
    /// Records missing any identity field are useless downstream and get
    /// discarded at the adapter boundary.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.part_number.trim().is_empty()
            && !self.manufacturer.trim().is_empty()
            && !self.description.trim().is_empty()
            && !self.source.trim().is_empty()
    }

    /// Unit price parsed for ranking, or the sort-last key when the vendor
    /// string is unparseable or absent.
    #[must_use]
    pub fn sort_price(&self) -> f64 {
        parse_price(&self.pricing.unit_price)
            .unwrap_or(crate::constants::pricing::UNPARSEABLE_SORT_KEY)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pricing {
    /// Display string as quoted by the source, e.g. "$12.50".
    pub unit_price: String,
    pub min_qty: u32,
    #[serde(default)]
    pub price_breaks: Vec<PriceBreak>,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            unit_price: String::new(),
            min_qty: 1,
            price_breaks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBreak {
    pub quantity: u32,
    pub price: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Availability {
    pub stock: i64,
    #[serde(default)]
    pub lead_time: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum LifecycleStatus {
    Active,
    #[serde(rename = "NRND")]
    Nrnd,
    Obsolete,
    #[default]
    Unknown,
}

impl From<String> for LifecycleStatus {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl LifecycleStatus {
    /// Maps free-form vendor status strings onto the four buckets the
    /// cache cares about. Anything unrecognized is Unknown.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        if lowered == "active" {
            Self::Active
        } else if lowered.contains("nrnd")
            || lowered.contains("not recommended")
            || lowered.contains("not for new")
        {
            Self::Nrnd
        } else if lowered.contains("obsolete")
            || lowered.contains("discontinued")
            || lowered.contains("last time buy")
        {
            Self::Obsolete
        } else {
            Self::Unknown
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Nrnd => "NRND",
            Self::Obsolete => "Obsolete",
            Self::Unknown => "Unknown",
        }
    }

    /// Cache lookup ordering: Active rows first, then NRND, then the rest.
    #[must_use]
    pub const fn cache_rank(self) -> u8 {
        match self {
            Self::Active => 1,
            Self::Nrnd => 2,
            Self::Obsolete | Self::Unknown => 3,
        }
    }

    /// Only current or nearly-current parts are worth serving from cache.
    #[must_use]
    pub const fn is_cacheable(self) -> bool {
        matches!(self, Self::Active | Self::Nrnd)
    }
}

impl std::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceParseError {
    #[error("price string is empty")]
    Empty,
    #[error("unparseable price: {0:?}")]
    Invalid(String),
}

/// Parses a vendor price string into a float, tolerating currency symbols
/// and thousands separators ("$1,234.56" -> 1234.56). Failure is explicit
/// so callers decide between propagating and ranking the record last.
pub fn parse_price(raw: &str) -> Result<f64, PriceParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PriceParseError::Empty);
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return Err(PriceParseError::Invalid(raw.to_string()));
    }

    cleaned
        .parse::<f64>()
        .map_err(|_| PriceParseError::Invalid(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(part_number: &str, unit_price: &str) -> ComponentRecord {
        ComponentRecord {
            part_number: part_number.to_string(),
            manufacturer: "Test Mfg".to_string(),
            description: "Test part".to_string(),
            category: "processor".to_string(),
            datasheet_url: None,
            product_url: None,
            specifications: HashMap::new(),
            pricing: Pricing {
                unit_price: unit_price.to_string(),
                min_qty: 1,
                price_breaks: Vec::new(),
            },
            availability: Availability::default(),
            lifecycle_status: LifecycleStatus::Active,
            source: "digikey".to_string(),
        }
    }

    #[test]
    fn parse_price_handles_plain_and_decorated_values() {
        assert_eq!(parse_price("12.50"), Ok(12.50));
        assert_eq!(parse_price("$12.50"), Ok(12.50));
        assert_eq!(parse_price("$1,234.56"), Ok(1234.56));
        assert_eq!(parse_price(" 3.10 "), Ok(3.10));
    }

    #[test]
    fn parse_price_rejects_empty_and_garbage() {
        assert_eq!(parse_price(""), Err(PriceParseError::Empty));
        assert_eq!(parse_price("   "), Err(PriceParseError::Empty));
        assert_eq!(
            parse_price("call for quote"),
            Err(PriceParseError::Invalid("call for quote".to_string()))
        );
        assert!(matches!(
            parse_price("1.2.3"),
            Err(PriceParseError::Invalid(_))
        ));
    }

    #[test]
    fn sort_price_falls_back_to_sort_last_key() {
        assert_eq!(record("P1", "$4.50").sort_price(), 4.50);
        assert_eq!(
            record("P2", "TBD").sort_price(),
            crate::constants::pricing::UNPARSEABLE_SORT_KEY
        );
    }

    #[test]
    fn records_without_identity_fields_are_invalid() {
        assert!(record("STM32F407VGT6", "$12.50").is_valid());

        let mut missing_part = record("STM32F407VGT6", "$12.50");
        missing_part.part_number = "  ".to_string();
        assert!(!missing_part.is_valid());

        let mut missing_source = record("STM32F407VGT6", "$12.50");
        missing_source.source = String::new();
        assert!(!missing_source.is_valid());
    }

    #[test]
    fn lifecycle_parse_covers_vendor_spellings() {
        assert_eq!(LifecycleStatus::parse("Active"), LifecycleStatus::Active);
        assert_eq!(LifecycleStatus::parse("active"), LifecycleStatus::Active);
        assert_eq!(LifecycleStatus::parse("NRND"), LifecycleStatus::Nrnd);
        assert_eq!(
            LifecycleStatus::parse("Not Recommended for New Designs"),
            LifecycleStatus::Nrnd
        );
        assert_eq!(
            LifecycleStatus::parse("Obsolete"),
            LifecycleStatus::Obsolete
        );
        assert_eq!(
            LifecycleStatus::parse("Discontinued at Digi-Key"),
            LifecycleStatus::Obsolete
        );
        assert_eq!(LifecycleStatus::parse("EOL soon"), LifecycleStatus::Unknown);
    }

    #[test]
    fn lifecycle_cache_rank_orders_active_before_nrnd() {
        assert!(LifecycleStatus::Active.cache_rank() < LifecycleStatus::Nrnd.cache_rank());
        assert!(LifecycleStatus::Nrnd.cache_rank() < LifecycleStatus::Obsolete.cache_rank());
        assert!(LifecycleStatus::Active.is_cacheable());
        assert!(LifecycleStatus::Nrnd.is_cacheable());
        assert!(!LifecycleStatus::Obsolete.is_cacheable());
        assert!(!LifecycleStatus::Unknown.is_cacheable());
    }
}
