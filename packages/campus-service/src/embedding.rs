use std::{sync::Arc, time::Duration};

use tokio::time;

use crate::{EmbeddingProvider, Error, HttpEmbeddingProvider, Result};
use campus_config::EmbeddingProviderConfig;
use campus_domain::text;

/// Retrying front for an [`EmbeddingProvider`].
///
/// Availability is decided once at construction and never re-probed. Every failure surfaced
/// here is meant to be absorbed by the caller as "no semantic signal".
#[derive(Clone)]
pub struct EmbeddingClient {
	cfg: EmbeddingProviderConfig,
	provider: Option<Arc<dyn EmbeddingProvider>>,
}
impl EmbeddingClient {
	pub fn from_config(cfg: &EmbeddingProviderConfig) -> Self {
		match HttpEmbeddingProvider::new(cfg) {
			Ok(provider) => Self::with_provider(cfg.clone(), Arc::new(provider)),
			Err(err) => {
				tracing::info!(
					provider_id = %cfg.provider_id,
					error = %err,
					"Embedding provider is not configured. Semantic search is disabled."
				);

				Self::unavailable(cfg.clone())
			},
		}
	}

	pub fn with_provider(cfg: EmbeddingProviderConfig, provider: Arc<dyn EmbeddingProvider>) -> Self {
		Self { cfg, provider: Some(provider) }
	}

	pub fn unavailable(cfg: EmbeddingProviderConfig) -> Self {
		Self { cfg, provider: None }
	}

	pub fn is_available(&self) -> bool {
		self.provider.is_some()
	}

	/// Embeds one text. `Ok(None)` means the text was empty after normalization and the
	/// provider was not called.
	pub async fn embed(&self, raw: &str) -> Result<Option<Vec<f32>>> {
		let Some(provider) = self.provider.as_ref() else {
			return Err(Error::EmbeddingUnavailable);
		};
		let normalized = text::normalize_with_limit(raw, self.cfg.max_input_chars as usize);

		if normalized.is_empty() {
			return Ok(None);
		}

		let mut vectors = self.embed_with_retry(provider.as_ref(), &[normalized]).await?;

		Ok(vectors.pop())
	}

	/// Embeds many texts, returning one slot per input in input order.
	///
	/// Non-empty texts are sent in chunks of `batch_size`, sequentially, with `batch_delay_ms`
	/// between chunks. A chunk that exhausts its retries leaves `None` in each of its slots
	/// and the remaining chunks still run.
	pub async fn embed_batch(&self, texts: &[String]) -> Vec<Option<Vec<f32>>> {
		let mut out = vec![None; texts.len()];
		let Some(provider) = self.provider.as_ref() else {
			return out;
		};
		let limit = self.cfg.max_input_chars as usize;
		let pending: Vec<(usize, String)> = texts
			.iter()
			.enumerate()
			.filter_map(|(index, raw)| {
				let normalized = text::normalize_with_limit(raw, limit);

				(!normalized.is_empty()).then_some((index, normalized))
			})
			.collect();
		let chunk_size = (self.cfg.batch_size as usize).max(1);
		let chunk_delay = Duration::from_millis(self.cfg.batch_delay_ms);

		for (chunk_index, chunk) in pending.chunks(chunk_size).enumerate() {
			if chunk_index > 0 && !chunk_delay.is_zero() {
				time::sleep(chunk_delay).await;
			}

			let inputs: Vec<String> = chunk.iter().map(|(_, text)| text.clone()).collect();

			match self.embed_with_retry(provider.as_ref(), &inputs).await {
				Ok(vectors) =>
					for ((index, _), vector) in chunk.iter().zip(vectors) {
						out[*index] = Some(vector);
					},
				Err(err) => {
					tracing::warn!(
						chunk = chunk_index,
						items = chunk.len(),
						error = %err,
						"Embedding batch chunk failed. Its items have no embedding."
					);
				},
			}
		}

		out
	}

	async fn embed_with_retry(
		&self,
		provider: &dyn EmbeddingProvider,
		inputs: &[String],
	) -> Result<Vec<Vec<f32>>> {
		let max_attempts = self.cfg.max_attempts.max(1);
		let mut last_error = String::new();

		for attempt in 1..=max_attempts {
			let result = provider
				.embed(&self.cfg, inputs)
				.await
				.and_then(|vectors| check_vectors(vectors, inputs.len(), self.cfg.dimensions));

			match result {
				Ok(vectors) => return Ok(vectors),
				Err(err) => {
					tracing::warn!(attempt, max_attempts, error = %err, "Embedding attempt failed.");

					last_error = err.to_string();
				},
			}

			if attempt < max_attempts {
				let delay = self.cfg.retry_base_delay_ms.saturating_mul(u64::from(attempt));

				time::sleep(Duration::from_millis(delay)).await;
			}
		}

		tracing::warn!(attempts = max_attempts, "Embedding retries exhausted.");

		Err(Error::EmbeddingGenerationFailed { attempts: max_attempts, message: last_error })
	}
}

fn check_vectors(vectors: Vec<Vec<f32>>, expected: usize, dimensions: u32) -> Result<Vec<Vec<f32>>> {
	if vectors.len() != expected {
		return Err(Error::Provider {
			message: format!("Provider returned {} vectors for {expected} inputs.", vectors.len()),
		});
	}
	if vectors.iter().any(|vector| vector.len() != dimensions as usize) {
		return Err(Error::Provider {
			message: format!("Provider returned a vector without {dimensions} dimensions."),
		});
	}
	if vectors.iter().flatten().any(|value| !value.is_finite()) {
		return Err(Error::Provider {
			message: "Provider returned a vector with non-finite values.".to_string(),
		});
	}

	Ok(vectors)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_count_and_dimension_mismatches() {
		assert!(check_vectors(vec![vec![0.0; 2]], 2, 2).is_err());
		assert!(check_vectors(vec![vec![0.0; 3]], 1, 2).is_err());
		assert!(check_vectors(vec![vec![f32::INFINITY, 0.0]], 1, 2).is_err());
		assert!(check_vectors(vec![vec![f32::NAN, 0.0]], 1, 2).is_err());
		assert_eq!(check_vectors(vec![vec![1.0, 2.0]], 1, 2).expect("check failed").len(), 1);
	}
}
