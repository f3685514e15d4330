use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;

use crate::constants::{http, limits, sources};
use crate::models::{Availability, ComponentRecord, LifecycleStatus, PriceBreak, Pricing};

use super::{AdapterError, SourceAdapter, discard_invalid};

const DIGIKEY_API_BASE: &str = "https://api.digikey.com";
const SEARCH_API_VERSION: &str = "v3";

/// Refresh the OAuth token this long before the vendor says it expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Default)]
pub struct DigiKeyConfig {
    pub client_id: String,
    pub client_secret: String,
}

impl DigiKeyConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

#[derive(Debug)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// DigiKey keyword search over the OAuth2 client-credentials flow. The
/// bearer token is fetched lazily and reused until shortly before expiry.
#[derive(Debug)]
pub struct DigiKeyClient {
    client: Client,
    config: DigiKeyConfig,
    base_url: String,
    token: RwLock<Option<CachedToken>>,
}

impl DigiKeyClient {
    #[must_use]
    pub fn new(config: DigiKeyConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(http::DEFAULT_TIMEOUT_SECONDS))
            .user_agent(http::USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_shared_client(config, client)
    }

    #[must_use]
    pub fn with_shared_client(config: DigiKeyConfig, client: Client) -> Self {
        Self {
            client,
            config,
            base_url: DIGIKEY_API_BASE.to_string(),
            token: RwLock::new(None),
        }
    }

    /// Test hook: point the client at a local stand-in server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn access_token(&self) -> Result<String, AdapterError> {
        if let Some(cached) = self.token.read().await.as_ref() {
            if Instant::now() < cached.expires_at {
                return Ok(cached.access_token.clone());
            }
        }
        self.fetch_token().await
    }

    async fn fetch_token(&self) -> Result<String, AdapterError> {
        let url = format!("{}/v1/oauth2/token", self.base_url);
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AdapterError::request(sources::DIGIKEY, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::new(
                sources::DIGIKEY,
                format!("token request failed with status {status}"),
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::decode(sources::DIGIKEY, &e))?;

        let lifetime = Duration::from_secs(token.expires_in)
            .saturating_sub(TOKEN_EXPIRY_MARGIN);
        debug!("obtained DigiKey token, valid for {}s", lifetime.as_secs());

        let access_token = token.access_token.clone();
        *self.token.write().await = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + lifetime,
        });

        Ok(access_token)
    }
}

#[async_trait::async_trait]
impl SourceAdapter for DigiKeyClient {
    fn id(&self) -> &'static str {
        sources::DIGIKEY
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn search(
        &self,
        keyword: &str,
        limit: u32,
    ) -> Result<Vec<ComponentRecord>, AdapterError> {
        if !self.is_configured() {
            return Err(AdapterError::not_configured(sources::DIGIKEY));
        }

        let token = self.access_token().await?;
        let url = format!(
            "{}/Search/{SEARCH_API_VERSION}/Products/Keyword",
            self.base_url
        );

        // Vendor caps RecordCount at 50.
        let payload = json!({
            "Keywords": keyword,
            "RecordCount": limit.min(limits::MAX_LIMIT_PER_SOURCE),
            "RecordStartPosition": 0,
            "Filters": {},
            "Sort": {
                "SortOption": "SortByUnitPrice",
                "Direction": "Ascending",
            },
            "RequestedQuantity": 1,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .header("X-DIGIKEY-Client-Id", &self.config.client_id)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AdapterError::request(sources::DIGIKEY, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::status(sources::DIGIKEY, status));
        }

        let body: KeywordSearchResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::decode(sources::DIGIKEY, &e))?;

        debug!(
            "DigiKey returned {} products for '{}'",
            body.products.len(),
            keyword
        );

        let records = body.products.iter().map(DigiKeyProduct::to_record).collect();
        Ok(discard_invalid(sources::DIGIKEY, records))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_lifetime")]
    expires_in: u64,
}

const fn default_token_lifetime() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct KeywordSearchResponse {
    #[serde(rename = "Products", default)]
    products: Vec<DigiKeyProduct>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DigiKeyProduct {
    #[serde(default)]
    manufacturer_part_number: String,
    #[serde(default)]
    manufacturer: Option<NamedField>,
    #[serde(default)]
    product_description: String,
    #[serde(default)]
    primary_datasheet: Option<String>,
    #[serde(default)]
    product_url: Option<String>,
    #[serde(default)]
    parameters: Vec<DigiKeyParameter>,
    #[serde(default)]
    standard_pricing: Vec<DigiKeyPriceBreak>,
    #[serde(default)]
    quantity_available: i64,
    #[serde(default)]
    manufacturer_lead_weeks: Option<String>,
    #[serde(default)]
    product_status: Option<StatusField>,
}

#[derive(Debug, Deserialize)]
struct NamedField {
    #[serde(rename = "Name", default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct StatusField {
    #[serde(rename = "Status", default)]
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DigiKeyParameter {
    #[serde(default)]
    parameter: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DigiKeyPriceBreak {
    #[serde(default)]
    break_quantity: u32,
    #[serde(default)]
    unit_price: f64,
}

impl DigiKeyProduct {
    fn to_record(&self) -> ComponentRecord {
        let pricing = self.standard_pricing.first().map_or_else(Pricing::default, |first| Pricing {
            unit_price: format!("${:.2}", first.unit_price),
            min_qty: first.break_quantity.max(1),
            price_breaks: self
                .standard_pricing
                .iter()
                .map(|brk| PriceBreak {
                    quantity: brk.break_quantity,
                    price: format!("${:.2}", brk.unit_price),
                })
                .collect(),
        });

        let specifications: HashMap<String, String> = self
            .parameters
            .iter()
            .filter(|p| !p.parameter.is_empty())
            .map(|p| (p.parameter.clone(), p.value.clone()))
            .collect();

        let lifecycle_status = self
            .product_status
            .as_ref()
            .map_or(LifecycleStatus::Unknown, |s| LifecycleStatus::parse(&s.status));

        ComponentRecord {
            part_number: self.manufacturer_part_number.clone(),
            manufacturer: self
                .manufacturer
                .as_ref()
                .map(|m| m.name.clone())
                .unwrap_or_default(),
            description: self.product_description.clone(),
            category: String::new(),
            datasheet_url: self.primary_datasheet.clone().filter(|s| !s.is_empty()),
            product_url: self.product_url.clone().filter(|s| !s.is_empty()),
            specifications,
            pricing,
            availability: Availability {
                stock: self.quantity_available,
                lead_time: self.manufacturer_lead_weeks.clone().filter(|s| !s.is_empty()),
            },
            lifecycle_status,
            source: sources::DIGIKEY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_payload_maps_to_record() {
        let raw = serde_json::json!({
            "ManufacturerPartNumber": "STM32F407VGT6",
            "Manufacturer": {"Name": "STMicroelectronics"},
            "ProductDescription": "ARM Cortex-M4 MCU",
            "PrimaryDatasheet": "https://example.com/ds.pdf",
            "ProductUrl": "https://example.com/p/stm32f407",
            "Parameters": [
                {"Parameter": "Core", "Value": "ARM Cortex-M4"},
                {"Parameter": "Speed", "Value": "168MHz"}
            ],
            "StandardPricing": [
                {"BreakQuantity": 1, "UnitPrice": 12.5},
                {"BreakQuantity": 10, "UnitPrice": 11.25}
            ],
            "QuantityAvailable": 2500,
            "ManufacturerLeadWeeks": "12 weeks",
            "ProductStatus": {"Status": "Active"}
        });

        let product: DigiKeyProduct = serde_json::from_value(raw).unwrap();
        let record = product.to_record();

        assert_eq!(record.part_number, "STM32F407VGT6");
        assert_eq!(record.manufacturer, "STMicroelectronics");
        assert_eq!(record.pricing.unit_price, "$12.50");
        assert_eq!(record.pricing.min_qty, 1);
        assert_eq!(record.pricing.price_breaks.len(), 2);
        assert_eq!(record.pricing.price_breaks[1].price, "$11.25");
        assert_eq!(record.availability.stock, 2500);
        assert_eq!(record.availability.lead_time.as_deref(), Some("12 weeks"));
        assert_eq!(record.lifecycle_status, LifecycleStatus::Active);
        assert_eq!(record.specifications.get("Speed").map(String::as_str), Some("168MHz"));
        assert_eq!(record.source, "digikey");
    }

    #[test]
    fn missing_pricing_yields_empty_price_string() {
        let raw = serde_json::json!({
            "ManufacturerPartNumber": "XC7A35T-1CSG324C",
            "Manufacturer": {"Name": "AMD/Xilinx"},
            "ProductDescription": "Artix-7 FPGA"
        });

        let product: DigiKeyProduct = serde_json::from_value(raw).unwrap();
        let record = product.to_record();

        assert!(record.pricing.unit_price.is_empty());
        assert!(record.pricing.price_breaks.is_empty());
        assert_eq!(record.lifecycle_status, LifecycleStatus::Unknown);
        assert!(record.is_valid());
    }

    #[tokio::test]
    async fn unconfigured_client_fails_fast() {
        let client = DigiKeyClient::new(DigiKeyConfig::default());
        let err = client.search("STM32F4", 10).await.unwrap_err();
        assert_eq!(err.source, "digikey");
        assert!(err.message.contains("not configured"));
    }
}
