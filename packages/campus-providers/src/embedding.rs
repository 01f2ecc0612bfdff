use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Builds the HTTP client used for every embedding request.
///
/// Fails when no API key is configured, which callers treat as "provider unavailable".
pub fn client(cfg: &campus_config::EmbeddingProviderConfig) -> Result<Client> {
	let Some(api_key) = cfg.api_key.as_deref().filter(|key| !key.trim().is_empty()) else {
		return Err(Error::InvalidConfig {
			message: "Embedding provider api_key is not configured.".to_string(),
		});
	};
	let headers = crate::auth_headers(api_key, &cfg.default_headers)?;
	let client = Client::builder()
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.default_headers(headers)
		.build()?;

	Ok(client)
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
	model: &'a str,
	input: &'a [String],
	dimensions: u32,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
	data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
	index: Option<usize>,
	embedding: Vec<f32>,
}

/// Sends one request for all `texts` and returns their vectors in input order.
pub async fn embed(
	client: &Client,
	cfg: &campus_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let url = format!("{}{}", cfg.api_base.trim_end_matches('/'), cfg.path);
	let request = EmbeddingRequest { model: &cfg.model, input: texts, dimensions: cfg.dimensions };
	let json: Value = client.post(url).json(&request).send().await?.error_for_status()?.json().await?;

	parse_embedding_response(json, texts.len(), cfg.dimensions as usize)
}

fn parse_embedding_response(
	json: Value,
	expected_count: usize,
	dimensions: usize,
) -> Result<Vec<Vec<f32>>> {
	let response: EmbeddingResponse = serde_json::from_value(json)?;

	if response.data.len() != expected_count {
		return Err(Error::InvalidResponse {
			message: format!(
				"Provider returned {} vectors for {expected_count} inputs.",
				response.data.len()
			),
		});
	}

	let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected_count];

	for (position, item) in response.data.into_iter().enumerate() {
		let index = item.index.unwrap_or(position);

		if item.embedding.len() != dimensions {
			return Err(Error::InvalidResponse {
				message: format!(
					"Vector {index} has {} dimensions, expected {dimensions}.",
					item.embedding.len()
				),
			});
		}

		let Some(slot) = slots.get_mut(index) else {
			return Err(Error::InvalidResponse {
				message: format!("Vector index {index} is out of range."),
			});
		};

		if slot.replace(item.embedding).is_some() {
			return Err(Error::InvalidResponse {
				message: format!("Vector index {index} appears more than once."),
			});
		}
	}

	// Every slot is filled: counts match and indices are unique and in range.
	Ok(slots.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_embeddings_in_index_order() {
		let json = serde_json::json!({
			"data": [
				{ "index": 1, "embedding": [2.0, 3.0] },
				{ "index": 0, "embedding": [0.5, 1.5] }
			]
		});
		let parsed = parse_embedding_response(json, 2, 2).expect("parse failed");

		assert_eq!(parsed.len(), 2);
		assert_eq!(parsed[0], vec![0.5, 1.5]);
		assert_eq!(parsed[1], vec![2.0, 3.0]);
	}

	#[test]
	fn rejects_count_and_dimension_mismatches() {
		let json = serde_json::json!({ "data": [ { "index": 0, "embedding": [1.0, 2.0] } ] });

		assert!(parse_embedding_response(json.clone(), 2, 2).is_err());
		assert!(parse_embedding_response(json, 1, 3).is_err());
	}

	#[test]
	fn rejects_duplicate_or_out_of_range_indices() {
		let duplicate = serde_json::json!({
			"data": [
				{ "index": 0, "embedding": [1.0] },
				{ "index": 0, "embedding": [2.0] }
			]
		});
		let out_of_range = serde_json::json!({ "data": [ { "index": 4, "embedding": [1.0] } ] });

		assert!(parse_embedding_response(duplicate, 2, 1).is_err());
		assert!(parse_embedding_response(out_of_range, 1, 1).is_err());
	}

	#[test]
	fn rejects_non_numeric_values() {
		let json = serde_json::json!({ "data": [ { "embedding": [1.0, "x"] } ] });

		assert!(matches!(parse_embedding_response(json, 1, 2), Err(Error::SerdeJson(_))));
	}

	#[test]
	fn client_requires_api_key() {
		let cfg = campus_config::EmbeddingProviderConfig {
			provider_id: "test".to_string(),
			api_base: "http://127.0.0.1:1".to_string(),
			api_key: None,
			path: "/".to_string(),
			model: "test".to_string(),
			dimensions: 2,
			timeout_ms: 1_000,
			default_headers: serde_json::Map::new(),
			max_attempts: 3,
			retry_base_delay_ms: 1_000,
			batch_size: 100,
			batch_delay_ms: 500,
			max_input_chars: 8_000,
		};

		assert!(matches!(client(&cfg), Err(Error::InvalidConfig { .. })));
	}
}
