use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	/// Absent or blank disables semantic search for the lifetime of the process.
	#[serde(default)]
	pub api_key: Option<String>,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
	#[serde(default = "default_max_attempts")]
	pub max_attempts: u32,
	/// Attempt `n` waits `n * retry_base_delay_ms` before the next attempt.
	#[serde(default = "default_retry_base_delay_ms")]
	pub retry_base_delay_ms: u64,
	#[serde(default = "default_batch_size")]
	pub batch_size: u32,
	/// Pause between consecutive batch chunks.
	#[serde(default = "default_batch_delay_ms")]
	pub batch_delay_ms: u64,
	#[serde(default = "default_max_input_chars")]
	pub max_input_chars: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub semantic_weight: f32,
	pub keyword_weight: f32,
	/// Multiplier applied to the description keyword score before it competes with the title.
	pub description_weight: f32,
	/// Results must score strictly above this value.
	pub relevance_floor: f32,
	pub semantic_candidate_cap: u32,
	pub keyword_candidate_cap: u32,
	pub max_results: u32,
	/// Overall deadline for one search. Zero disables it.
	pub deadline_ms: u64,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			semantic_weight: 0.6,
			keyword_weight: 0.4,
			description_weight: 0.8,
			relevance_floor: 0.1,
			semantic_candidate_cap: 100,
			keyword_candidate_cap: 50,
			max_results: 20,
			deadline_ms: 0,
		}
	}
}

fn default_max_attempts() -> u32 {
	3
}

fn default_retry_base_delay_ms() -> u64 {
	1_000
}

fn default_batch_size() -> u32 {
	100
}

fn default_batch_delay_ms() -> u64 {
	500
}

fn default_max_input_chars() -> u32 {
	8_000
}
