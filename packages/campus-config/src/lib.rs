mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, EmbeddingProviderConfig, Postgres, Providers, Search, Service, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	validate_embedding(&cfg.providers.embedding)?;
	validate_search(&cfg.search)?;

	Ok(())
}

fn validate_embedding(embedding: &EmbeddingProviderConfig) -> Result<()> {
	for (label, value) in [
		("providers.embedding.dimensions", embedding.dimensions),
		("providers.embedding.max_attempts", embedding.max_attempts),
		("providers.embedding.batch_size", embedding.batch_size),
		("providers.embedding.max_input_chars", embedding.max_input_chars),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (key, value) in &embedding.default_headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("providers.embedding.default_headers.{key} must be a string."),
			});
		}
	}

	Ok(())
}

fn validate_search(search: &Search) -> Result<()> {
	for (label, weight) in [
		("search.semantic_weight", search.semantic_weight),
		("search.keyword_weight", search.keyword_weight),
		("search.description_weight", search.description_weight),
	] {
		if !weight.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if !(0.0..=1.0).contains(&weight) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	if search.semantic_weight + search.keyword_weight > 1.0 + f32::EPSILON {
		return Err(Error::Validation {
			message: "search.semantic_weight plus search.keyword_weight must not exceed 1.0."
				.to_string(),
		});
	}
	if !search.relevance_floor.is_finite() || !(0.0..1.0).contains(&search.relevance_floor) {
		return Err(Error::Validation {
			message: "search.relevance_floor must be in the range 0.0 (inclusive) to 1.0 (exclusive)."
				.to_string(),
		});
	}

	for (label, value) in [
		("search.semantic_candidate_cap", search.semantic_candidate_cap),
		("search.keyword_candidate_cap", search.keyword_candidate_cap),
		("search.max_results", search.max_results),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg
		.providers
		.embedding
		.api_key
		.as_deref()
		.map(|key| key.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.embedding.api_key = None;
	}
}
