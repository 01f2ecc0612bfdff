use std::collections::HashMap;

use uuid::Uuid;

use crate::{
	Result, SearchStore,
	search::{ResultDetails, SearchResult, fusion::FusionPolicy},
};
use campus_domain::{entity::EntityKind, text, vector};
use campus_storage::{
	models::{DocumentRow, ProjectRow, TaskRow},
	queries::CandidateQuery,
};

/// Everything one retriever needs. Built once per query and shared by all retrievers.
pub(crate) struct RetrievalContext<'a> {
	pub(crate) text: &'a str,
	pub(crate) embedding: Option<&'a [f32]>,
	pub(crate) keyword_enabled: bool,
	pub(crate) policy: FusionPolicy,
	pub(crate) description_weight: f32,
	pub(crate) candidates: CandidateQuery,
}

struct Scores {
	relevance: f32,
	keyword: f32,
	semantic: f32,
}

trait Candidate {
	const KIND: EntityKind;

	fn id(&self) -> Uuid;

	fn title(&self) -> &str;

	fn description(&self) -> Option<&str>;

	fn into_result(self, scores: Scores) -> SearchResult;
}
impl Candidate for ProjectRow {
	const KIND: EntityKind = EntityKind::Project;

	fn id(&self) -> Uuid {
		self.id
	}

	fn title(&self) -> &str {
		&self.title
	}

	fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	fn into_result(self, scores: Scores) -> SearchResult {
		SearchResult {
			id: self.id,
			kind: Self::KIND,
			title: self.title,
			description: self.description,
			status: self.status,
			created_at: self.created_at,
			updated_at: self.updated_at,
			details: ResultDetails::Project {
				lecturer_id: self.lecturer_id,
				lecturer: self.lecturer_name,
			},
			relevance_score: scores.relevance,
			keyword_score: scores.keyword,
			semantic_score: scores.semantic,
		}
	}
}
impl Candidate for TaskRow {
	const KIND: EntityKind = EntityKind::Task;

	fn id(&self) -> Uuid {
		self.id
	}

	fn title(&self) -> &str {
		&self.title
	}

	fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	fn into_result(self, scores: Scores) -> SearchResult {
		SearchResult {
			id: self.id,
			kind: Self::KIND,
			title: self.title,
			description: self.description,
			status: self.status,
			created_at: self.created_at,
			updated_at: self.updated_at,
			details: ResultDetails::Task {
				priority: self.priority,
				project_id: self.project_id,
				project_title: self.project_title,
				assignee_id: self.assignee_id,
				assignee: self.assignee_name,
			},
			relevance_score: scores.relevance,
			keyword_score: scores.keyword,
			semantic_score: scores.semantic,
		}
	}
}
impl Candidate for DocumentRow {
	const KIND: EntityKind = EntityKind::Document;

	fn id(&self) -> Uuid {
		self.id
	}

	fn title(&self) -> &str {
		&self.file_name
	}

	fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	fn into_result(self, scores: Scores) -> SearchResult {
		SearchResult {
			id: self.id,
			kind: Self::KIND,
			title: self.file_name,
			description: self.description,
			status: self.status,
			created_at: self.created_at,
			updated_at: self.updated_at,
			details: ResultDetails::Document {
				project_id: self.project_id,
				project_title: self.project_title,
				uploader_id: self.uploader_id,
				uploader: self.uploader_name,
			},
			relevance_score: scores.relevance,
			keyword_score: scores.keyword,
			semantic_score: scores.semantic,
		}
	}
}

pub(crate) async fn projects(
	store: &dyn SearchStore,
	ctx: &RetrievalContext<'_>,
) -> Result<Vec<SearchResult>> {
	let rows = store
		.projects(&ctx.candidates)
		.await
		.inspect_err(|err| log_failure(EntityKind::Project, err))?;

	rank(store, ctx, rows).await
}

pub(crate) async fn tasks(
	store: &dyn SearchStore,
	ctx: &RetrievalContext<'_>,
) -> Result<Vec<SearchResult>> {
	let rows =
		store.tasks(&ctx.candidates).await.inspect_err(|err| log_failure(EntityKind::Task, err))?;

	rank(store, ctx, rows).await
}

pub(crate) async fn documents(
	store: &dyn SearchStore,
	ctx: &RetrievalContext<'_>,
) -> Result<Vec<SearchResult>> {
	let rows = store
		.documents(&ctx.candidates)
		.await
		.inspect_err(|err| log_failure(EntityKind::Document, err))?;

	rank(store, ctx, rows).await
}

async fn rank<C>(
	store: &dyn SearchStore,
	ctx: &RetrievalContext<'_>,
	rows: Vec<C>,
) -> Result<Vec<SearchResult>>
where
	C: Candidate,
{
	let vectors = match ctx.embedding {
		Some(query_vec) => load_vectors::<C>(store, &rows, query_vec.len()).await?,
		None => HashMap::new(),
	};
	let mut out = Vec::new();

	for row in rows {
		let keyword = text::field_keyword_score(
			row.title(),
			row.description(),
			ctx.text,
			ctx.description_weight,
		);
		let semantic = match (ctx.embedding, vectors.get(&row.id())) {
			(Some(query_vec), Some(stored)) =>
				vector::cosine_similarity(query_vec, stored).clamp(0.0, 1.0),
			_ => 0.0,
		};
		let relevance =
			ctx.policy.fuse(keyword, semantic, ctx.embedding.is_some(), ctx.keyword_enabled);

		if ctx.policy.passes_floor(relevance) {
			out.push(row.into_result(Scores { relevance, keyword, semantic }));
		}
	}

	Ok(out)
}

/// Stored vectors keyed by entity id. Unparseable or wrong-length vectors are left out so the
/// entity scores as if it had never been indexed.
async fn load_vectors<C>(
	store: &dyn SearchStore,
	rows: &[C],
	dimensions: usize,
) -> Result<HashMap<Uuid, Vec<f32>>>
where
	C: Candidate,
{
	if rows.is_empty() {
		return Ok(HashMap::new());
	}

	let ids: Vec<Uuid> = rows.iter().map(|row| row.id()).collect();
	let stored = store
		.embeddings(C::KIND, &ids)
		.await
		.inspect_err(|err| log_failure(C::KIND, err))?;
	let mut out = HashMap::with_capacity(stored.len());

	for item in stored {
		match campus_storage::vector::parse_pg_vector(&item.embedding) {
			Ok(vec) if vec.len() == dimensions => {
				out.insert(item.id, vec);
			},
			Ok(vec) => tracing::warn!(
				entity = C::KIND.as_str(),
				id = %item.id,
				expected = dimensions,
				actual = vec.len(),
				"Stored embedding has the wrong dimension. Treating it as absent."
			),
			Err(err) => tracing::warn!(
				entity = C::KIND.as_str(),
				id = %item.id,
				error = %err,
				"Stored embedding is malformed. Treating it as absent."
			),
		}
	}

	Ok(out)
}

fn log_failure(kind: EntityKind, err: &crate::Error) {
	tracing::error!(entity = kind.as_str(), error = %err, "Candidate retrieval failed.");
}
