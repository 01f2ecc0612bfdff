use uuid::Uuid;

use crate::{BoxFuture, Result, SearchStore};
use campus_domain::entity::EntityKind;
use campus_storage::{
	db::Db,
	models::{DocumentRow, ProjectRow, StoredEmbedding, TaskRow},
	queries::{self, CandidateQuery},
};

/// [`SearchStore`] over the Postgres read model.
pub struct PgSearchStore {
	db: Db,
}
impl PgSearchStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}
impl SearchStore for PgSearchStore {
	fn projects<'a>(&'a self, query: &'a CandidateQuery) -> BoxFuture<'a, Result<Vec<ProjectRow>>> {
		Box::pin(async move { Ok(queries::fetch_project_candidates(&self.db, query).await?) })
	}

	fn tasks<'a>(&'a self, query: &'a CandidateQuery) -> BoxFuture<'a, Result<Vec<TaskRow>>> {
		Box::pin(async move { Ok(queries::fetch_task_candidates(&self.db, query).await?) })
	}

	fn documents<'a>(
		&'a self,
		query: &'a CandidateQuery,
	) -> BoxFuture<'a, Result<Vec<DocumentRow>>> {
		Box::pin(async move { Ok(queries::fetch_document_candidates(&self.db, query).await?) })
	}

	fn embeddings<'a>(
		&'a self,
		kind: EntityKind,
		ids: &'a [Uuid],
	) -> BoxFuture<'a, Result<Vec<StoredEmbedding>>> {
		Box::pin(async move { Ok(queries::fetch_embeddings(&self.db, kind, ids).await?) })
	}
}
