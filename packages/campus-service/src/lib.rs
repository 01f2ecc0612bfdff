pub mod embedding;
pub mod search;
pub mod store;
pub mod time_serde;

mod error;

pub use embedding::EmbeddingClient;
pub use error::{Error, Result};
pub use search::{ResultDetails, SearchQuery, SearchResponse, SearchResult, fusion::FusionPolicy};
pub use store::PgSearchStore;

use std::{future::Future, pin::Pin, sync::Arc};

use reqwest::Client;
use uuid::Uuid;

use campus_config::{Config, EmbeddingProviderConfig};
use campus_domain::entity::EntityKind;
use campus_storage::{
	db::Db,
	models::{DocumentRow, ProjectRow, StoredEmbedding, TaskRow},
	queries::CandidateQuery,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Turns texts into vectors, one per input and in input order.
pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

/// Read side of the relational store as seen by the retrievers.
///
/// Implementations must apply every bound in [`CandidateQuery`], including visibility, before
/// returning rows.
pub trait SearchStore
where
	Self: Send + Sync,
{
	fn projects<'a>(&'a self, query: &'a CandidateQuery) -> BoxFuture<'a, Result<Vec<ProjectRow>>>;

	fn tasks<'a>(&'a self, query: &'a CandidateQuery) -> BoxFuture<'a, Result<Vec<TaskRow>>>;

	fn documents<'a>(&'a self, query: &'a CandidateQuery)
	-> BoxFuture<'a, Result<Vec<DocumentRow>>>;

	fn embeddings<'a>(
		&'a self,
		kind: EntityKind,
		ids: &'a [Uuid],
	) -> BoxFuture<'a, Result<Vec<StoredEmbedding>>>;
}

/// [`EmbeddingProvider`] backed by the OpenAI-compatible HTTP endpoint in config.
pub struct HttpEmbeddingProvider {
	client: Client,
}
impl HttpEmbeddingProvider {
	pub fn new(cfg: &EmbeddingProviderConfig) -> Result<Self> {
		let client = campus_providers::embedding::client(cfg)?;

		Ok(Self { client })
	}
}
impl EmbeddingProvider for HttpEmbeddingProvider {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			let vectors = campus_providers::embedding::embed(&self.client, cfg, texts).await?;

			Ok(vectors)
		})
	}
}

pub struct SearchService {
	pub cfg: Config,
	pub embedding: EmbeddingClient,
	pub store: Arc<dyn SearchStore>,
}
impl SearchService {
	pub fn new(cfg: Config, db: Db) -> Self {
		let embedding = EmbeddingClient::from_config(&cfg.providers.embedding);

		Self { cfg, embedding, store: Arc::new(PgSearchStore::new(db)) }
	}

	pub fn with_parts(cfg: Config, embedding: EmbeddingClient, store: Arc<dyn SearchStore>) -> Self {
		Self { cfg, embedding, store }
	}
}
