pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid query: {message}")]
	InvalidQuery { message: String },
	#[error("Embedding provider is unavailable.")]
	EmbeddingUnavailable,
	#[error("Embedding generation failed after {attempts} attempts: {message}")]
	EmbeddingGenerationFailed { attempts: u32, message: String },
	#[error("Search is temporarily unavailable: {message}")]
	SearchUnavailable { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::SearchUnavailable { message: err.to_string() }
	}
}

impl From<campus_storage::Error> for Error {
	fn from(err: campus_storage::Error) -> Self {
		Self::SearchUnavailable { message: err.to_string() }
	}
}

impl From<campus_providers::Error> for Error {
	fn from(err: campus_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
