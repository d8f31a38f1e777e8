//! Settlement through a remote facilitator over HTTP.
//!
//! The descriptor is POSTed as JSON together with the paying address. A 2xx
//! answer carries the transaction identifier; any other status is a rejection
//! whose body (`{ "message": ... }`) becomes the nested response data.

use crate::{
	ErrorData, ErrorResponse, SettlementError, SettlementFactory, SettlementInterface,
	SettlementRegistry,
};
use async_trait::async_trait;
use guild_types::{truncate_id, ImplementationRegistry, SettlementDescriptor, TransactionHash};
use guild_wallet::WalletInterface;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettlementConfig {
	/// Facilitator endpoint receiving the settlement request.
	pub url: String,
	#[serde(default = "default_timeout_seconds")]
	pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
	30
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SettleRequest<'a> {
	from: &'a str,
	#[serde(flatten)]
	descriptor: &'a SettlementDescriptor,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettleResponse {
	#[serde(default)]
	transaction_hash: String,
}

pub struct HttpSettlement {
	client: Client,
	url: String,
}

impl HttpSettlement {
	pub fn new(config: HttpSettlementConfig) -> Result<Self, SettlementError> {
		let client = Client::builder()
			.timeout(Duration::from_secs(config.timeout_seconds))
			.build()
			.map_err(|e| SettlementError::Configuration(format!("HTTP client: {}", e)))?;

		Ok(Self {
			client,
			url: config.url,
		})
	}
}

#[async_trait]
impl SettlementInterface for HttpSettlement {
	fn name(&self) -> &str {
		"http"
	}

	async fn settle(
		&self,
		descriptor: &SettlementDescriptor,
		wallet: &dyn WalletInterface,
	) -> Result<TransactionHash, SettlementError> {
		let request = SettleRequest {
			from: wallet.address(),
			descriptor,
		};

		tracing::debug!(url = %self.url, to = %descriptor.to, "Posting settlement request");

		let response = self
			.client
			.post(&self.url)
			.json(&request)
			.send()
			.await
			.map_err(|e| SettlementError::Network(format!("Settlement request failed: {}", e)))?;

		let status = response.status();

		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			let data = serde_json::from_str::<ErrorData>(&body).unwrap_or_default();

			tracing::warn!(%status, "Facilitator rejected settlement");

			return Err(SettlementError::Rejected {
				message: Some(format!("Request failed with status {}", status.as_u16())),
				response: Some(ErrorResponse {
					status: Some(status.as_u16()),
					data,
				}),
			});
		}

		let body: SettleResponse = response.json().await.map_err(|e| {
			SettlementError::Network(format!("Failed to parse settlement response: {}", e))
		})?;

		let hash = TransactionHash::new(body.transaction_hash);
		tracing::debug!(tx_hash = %truncate_id(hash.as_str()), "Facilitator accepted settlement");
		Ok(hash)
	}
}

/// Factory for `[settlement.implementations.http]`.
///
/// Required key: `url`. Optional: `timeout_seconds` (default 30).
pub fn create_settlement(
	config: &toml::Value,
) -> Result<Box<dyn SettlementInterface>, SettlementError> {
	let config: HttpSettlementConfig = config.clone().try_into().map_err(|e| {
		SettlementError::Configuration(format!("Invalid http settlement config: {}", e))
	})?;

	if config.url.trim().is_empty() {
		return Err(SettlementError::Configuration(
			"http settlement url cannot be empty".to_string(),
		));
	}

	Ok(Box::new(HttpSettlement::new(config)?))
}

pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = SettlementFactory;

	fn factory() -> Self::Factory {
		create_settlement
	}
}

impl SettlementRegistry for Registry {}
