use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::constants::{http, limits, sources};
use crate::models::{Availability, ComponentRecord, LifecycleStatus, PriceBreak, Pricing};

use super::{AdapterError, SourceAdapter, discard_invalid};

const MOUSER_API_BASE: &str = "https://api.mouser.com/api/v1";

/// Some Mouser accounts quote in rupees. Approximate conversion so every
/// record leaves the adapter in dollars.
const INR_PER_USD: f64 = 83.0;

/// Mouser keyword search. Auth is an API key passed as a query parameter.
#[derive(Debug, Clone)]
pub struct MouserClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl MouserClient {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(http::DEFAULT_TIMEOUT_SECONDS))
            .user_agent(http::USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_shared_client(api_key, client)
    }

    #[must_use]
    pub fn with_shared_client(api_key: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: MOUSER_API_BASE.to_string(),
        }
    }

    /// Test hook: point the client at a local stand-in server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait::async_trait]
impl SourceAdapter for MouserClient {
    fn id(&self) -> &'static str {
        sources::MOUSER
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn search(
        &self,
        keyword: &str,
        limit: u32,
    ) -> Result<Vec<ComponentRecord>, AdapterError> {
        if !self.is_configured() {
            return Err(AdapterError::not_configured(sources::MOUSER));
        }

        let url = format!("{}/search/keyword", self.base_url);
        // Vendor caps records at 50.
        let payload = json!({
            "SearchByKeywordRequest": {
                "keyword": keyword,
                "records": limit.min(limits::MAX_LIMIT_PER_SOURCE),
                "startingRecord": 0,
                "searchOptions": "InStock",
                "searchWithYourSignUpLanguage": "en-US",
            }
        });

        let response = self
            .client
            .post(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| AdapterError::request(sources::MOUSER, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::status(sources::MOUSER, status));
        }

        let body: KeywordSearchResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::decode(sources::MOUSER, &e))?;

        if let Some(first) = body.errors.first() {
            return Err(AdapterError::new(
                sources::MOUSER,
                format!("Mouser API error: {}", first.message),
            ));
        }

        let parts = body.search_results.map(|r| r.parts).unwrap_or_default();
        debug!("Mouser returned {} parts for '{}'", parts.len(), keyword);

        let records = parts.iter().map(MouserPart::to_record).collect();
        Ok(discard_invalid(sources::MOUSER, records))
    }
}

#[derive(Debug, Deserialize)]
struct KeywordSearchResponse {
    #[serde(rename = "Errors", default)]
    errors: Vec<MouserApiError>,
    #[serde(rename = "SearchResults", default)]
    search_results: Option<SearchResults>,
}

#[derive(Debug, Deserialize)]
struct MouserApiError {
    #[serde(rename = "Message", default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(rename = "Parts", default)]
    parts: Vec<MouserPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MouserPart {
    #[serde(default)]
    manufacturer_part_number: String,
    #[serde(default)]
    manufacturer: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    data_sheet_url: Option<String>,
    #[serde(default)]
    product_detail_url: Option<String>,
    #[serde(default)]
    product_attributes: Vec<MouserAttribute>,
    #[serde(default)]
    price_breaks: Vec<MouserPriceBreak>,
    /// Quoted as a string by the vendor, e.g. "5000".
    #[serde(default)]
    availability_in_stock: String,
    #[serde(default)]
    lead_time: Option<String>,
    #[serde(default)]
    lifecycle_status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MouserAttribute {
    #[serde(default)]
    attribute_name: String,
    #[serde(default)]
    attribute_value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MouserPriceBreak {
    #[serde(default)]
    quantity: u32,
    #[serde(default)]
    price: String,
}

impl MouserPart {
    fn to_record(&self) -> ComponentRecord {
        let pricing = self.price_breaks.first().map_or_else(Pricing::default, |first| Pricing {
            unit_price: normalize_unit_price(&first.price),
            min_qty: first.quantity.max(1),
            price_breaks: self
                .price_breaks
                .iter()
                .map(|brk| PriceBreak {
                    quantity: brk.quantity,
                    price: brk.price.clone(),
                })
                .collect(),
        });

        let specifications: HashMap<String, String> = self
            .product_attributes
            .iter()
            .filter(|a| !a.attribute_name.is_empty() && !a.attribute_value.is_empty())
            .map(|a| (a.attribute_name.clone(), a.attribute_value.clone()))
            .collect();

        let lifecycle_status = self
            .lifecycle_status
            .as_deref()
            .map_or(LifecycleStatus::Unknown, LifecycleStatus::parse);

        ComponentRecord {
            part_number: self.manufacturer_part_number.clone(),
            manufacturer: self.manufacturer.clone(),
            description: self.description.clone(),
            category: String::new(),
            datasheet_url: self.data_sheet_url.clone().filter(|s| !s.is_empty()),
            product_url: self.product_detail_url.clone().filter(|s| !s.is_empty()),
            specifications,
            pricing,
            availability: Availability {
                stock: self.availability_in_stock.trim().parse().unwrap_or(0),
                lead_time: self.lead_time.clone().filter(|s| !s.is_empty()),
            },
            lifecycle_status,
            source: sources::MOUSER.to_string(),
        }
    }
}

/// Converts a vendor price quote to a "$X.XX" string, translating rupee
/// quotes at the fixed approximate rate.
fn normalize_unit_price(raw: &str) -> String {
    let is_inr = raw.contains('₹') || raw.to_uppercase().contains("INR");

    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let value: f64 = digits.parse().unwrap_or(0.0);

    let dollars = if is_inr && value > 0.0 {
        (value / INR_PER_USD * 100.0).round() / 100.0
    } else {
        value
    };

    format!("${dollars:.2}")
}
