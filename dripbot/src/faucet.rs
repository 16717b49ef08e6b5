//! Faucet API client.
//!
//! Talks to the LearnWeb3 faucet service: listing the testnets it can fund
//! and dripping a default amount of testnet tokens to an address. The
//! [`FaucetApi`] trait is the seam that lets handlers run against a scripted
//! faucet in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default LearnWeb3 faucet API base URL.
pub const LEARNWEB3_API_URL: &str = "https://learnweb3.io/api/v1/faucet";

/// Error type for faucet operations.
#[derive(Debug, thiserror::Error)]
pub enum FaucetError {
    /// API key not configured.
    #[error("API key not configured")]
    MissingApiKey,

    /// API error response.
    #[error("API error: {0}")]
    Api(String),

    /// Request error.
    #[error("request error: {0}")]
    Request(String),
}

/// Result type for faucet operations.
pub type FaucetResult<T> = std::result::Result<T, FaucetError>;

/// A testnet eligible for faucet disbursement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescriptor {
    /// Canonical network identifier (e.g. `base_sepolia`).
    pub network_id: String,
    /// Token symbol the faucet disburses on this network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// EVM chain ID, if the faucet reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

impl NetworkDescriptor {
    /// Create a descriptor carrying only the network ID.
    pub fn new(network_id: impl Into<String>) -> Self {
        Self {
            network_id: network_id.into(),
            token: None,
            chain_id: None,
        }
    }
}

/// The supported-networks payload, as served by the faucet API and as cached
/// under [`crate::cache::SUPPORTED_NETWORKS_KEY`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedNetworks {
    /// Ordered list of fundable testnets.
    pub supported_networks: Vec<NetworkDescriptor>,
}

/// Transaction receipt returned by a successful drip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Transaction reference (hash or explorer URL).
    pub tx: String,
}

impl Receipt {
    /// Create a receipt from a transaction reference.
    pub fn new(tx: impl Into<String>) -> Self {
        Self { tx: tx.into() }
    }
}

/// Outcome of a drip call at the API level: a receipt, or the error text the
/// service reported. Never both.
pub type DripOutcome = std::result::Result<Receipt, String>;

/// Wire shape of the drip endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DripResponse {
    ok: bool,
    #[serde(default)]
    value: Option<Receipt>,
    #[serde(default)]
    error: Option<String>,
}

impl DripResponse {
    fn into_outcome(self) -> DripOutcome {
        if self.ok {
            self.value
                .ok_or_else(|| "faucet reported success without a receipt".to_string())
        } else {
            Err(self
                .error
                .unwrap_or_else(|| "unknown faucet error".to_string()))
        }
    }
}

/// Trait for faucet API implementations.
#[async_trait]
pub trait FaucetApi: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Fetch the current list of fundable testnets.
    async fn supported_networks(&self) -> FaucetResult<Vec<NetworkDescriptor>>;

    /// Drip a default amount of testnet tokens to `address` on `network_id`.
    ///
    /// The `Err` arm of the returned [`DripOutcome`] carries the service's
    /// error text verbatim; transport failures surface as [`FaucetError`].
    async fn drip_tokens(&self, network_id: &str, address: &str) -> FaucetResult<DripOutcome>;
}

/// LearnWeb3 faucet client over HTTP.
#[derive(Debug, Clone)]
pub struct LearnWeb3Client {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl LearnWeb3Client {
    /// Create a new client against the default API URL.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: LEARNWEB3_API_URL.to_string(),
            api_key: Some(api_key.into()),
        }
    }

    /// Create a client from the `LEARNWEB3_API_KEY` environment variable.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: LEARNWEB3_API_URL.to_string(),
            api_key: std::env::var("LEARNWEB3_API_KEY").ok(),
        }
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Whether an API key is configured.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn get_api_key(&self) -> FaucetResult<&str> {
        self.api_key.as_deref().ok_or(FaucetError::MissingApiKey)
    }
}

impl Default for LearnWeb3Client {
    fn default() -> Self {
        Self::from_env()
    }
}

#[async_trait]
impl FaucetApi for LearnWeb3Client {
    fn name(&self) -> &'static str {
        "learnweb3"
    }

    async fn supported_networks(&self) -> FaucetResult<Vec<NetworkDescriptor>> {
        let api_key = self.get_api_key()?;
        let url = format!("{}/networks", self.base_url);

        debug!(url = %url, "fetching supported networks");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .send()
            .await
            .map_err(|e| FaucetError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(FaucetError::Api(format!("HTTP {status}: {body}")));
        }

        let payload: SupportedNetworks = response
            .json()
            .await
            .map_err(|e| FaucetError::Request(e.to_string()))?;

        info!(
            count = payload.supported_networks.len(),
            "supported networks fetched"
        );

        Ok(payload.supported_networks)
    }

    async fn drip_tokens(&self, network_id: &str, address: &str) -> FaucetResult<DripOutcome> {
        let api_key = self.get_api_key()?;
        let url = format!("{}/drip", self.base_url);

        debug!(network = %network_id, address = %address, "requesting drip");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&serde_json::json!({
                "networkId": network_id,
                "address": address,
            }))
            .send()
            .await
            .map_err(|e| FaucetError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(FaucetError::Api(format!("HTTP {status}: {body}")));
        }

        let drip: DripResponse = response
            .json()
            .await
            .map_err(|e| FaucetError::Request(e.to_string()))?;

        let outcome = drip.into_outcome();
        match &outcome {
            Ok(receipt) => info!(network = %network_id, tx = %receipt.tx, "drip succeeded"),
            Err(error) => info!(network = %network_id, error = %error, "drip rejected"),
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = LearnWeb3Client::new("test-key");
        assert!(client.is_available());
        assert_eq!(client.name(), "learnweb3");
    }

    #[test]
    fn test_supported_networks_payload_parsing() {
        let json = r#"{"supportedNetworks":[
            {"networkId":"base_sepolia","token":"ETH","chainId":84532},
            {"networkId":"base_goerli"}
        ]}"#;

        let payload: SupportedNetworks = serde_json::from_str(json).unwrap();
        assert_eq!(payload.supported_networks.len(), 2);
        assert_eq!(payload.supported_networks[0].network_id, "base_sepolia");
        assert_eq!(payload.supported_networks[0].chain_id, Some(84532));
        assert!(payload.supported_networks[1].token.is_none());
    }

    #[test]
    fn test_drip_response_outcomes() {
        let ok: DripResponse =
            serde_json::from_str(r#"{"ok":true,"value":{"tx":"0x1"}}"#).unwrap();
        assert_eq!(ok.into_outcome(), Ok(Receipt::new("0x1")));

        let err: DripResponse =
            serde_json::from_str(r#"{"ok":false,"error":"insufficient funds"}"#).unwrap();
        assert_eq!(err.into_outcome(), Err("insufficient funds".to_string()));

        // Success without a receipt is treated as an error, not a panic.
        let bad: DripResponse = serde_json::from_str(r#"{"ok":true}"#).unwrap();
        assert!(bad.into_outcome().is_err());
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client = LearnWeb3Client {
            client: reqwest::Client::new(),
            base_url: LEARNWEB3_API_URL.to_string(),
            api_key: None,
        };
        let err = client.supported_networks().await.unwrap_err();
        assert!(matches!(err, FaucetError::MissingApiKey));
    }
}
