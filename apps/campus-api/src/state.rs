use std::sync::Arc;

use campus_service::SearchService;
use campus_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<SearchService>,
}
impl AppState {
	pub async fn new(config: campus_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.providers.embedding.dimensions).await?;

		Ok(Self::from_service(SearchService::new(config, db)))
	}

	pub fn from_service(service: SearchService) -> Self {
		Self { service: Arc::new(service) }
	}
}
