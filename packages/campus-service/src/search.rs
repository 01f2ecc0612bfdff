pub mod fusion;

mod retrieval;

use std::{cmp::Ordering, time::Duration};

use serde::Serialize;
use time::OffsetDateTime;
use tokio::time::{Instant, timeout_at};
use uuid::Uuid;

use crate::{
	Error, Result, SearchService,
	search::{fusion::FusionPolicy, retrieval::RetrievalContext},
};
use campus_domain::{
	entity::{DateRange, EntityKind, TaskPriority},
	principal::Principal,
	text,
};
use campus_storage::{queries::CandidateQuery, visibility::Visibility};

/// One search request, already authenticated and parsed.
#[derive(Debug, Clone)]
pub struct SearchQuery {
	pub text: String,
	/// Entity kinds to search. Empty means every kind.
	pub types: Vec<EntityKind>,
	pub status: Option<String>,
	/// Narrows tasks only.
	pub priority: Option<TaskPriority>,
	pub date_range: Option<DateRange>,
	pub principal: Principal,
	/// Keep keyword scoring in the blend even when a query embedding exists.
	pub force_keyword: bool,
}
impl SearchQuery {
	pub fn new(text: impl Into<String>, principal: Principal) -> Self {
		Self {
			text: text.into(),
			types: EntityKind::ALL.to_vec(),
			status: None,
			priority: None,
			date_range: None,
			principal,
			force_keyword: false,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
	pub id: Uuid,
	#[serde(rename = "type")]
	pub kind: EntityKind,
	pub title: String,
	pub description: Option<String>,
	pub status: String,
	#[serde(serialize_with = "crate::time_serde::serialize")]
	pub created_at: OffsetDateTime,
	#[serde(serialize_with = "crate::time_serde::serialize")]
	pub updated_at: OffsetDateTime,
	#[serde(flatten)]
	pub details: ResultDetails,
	pub relevance_score: f32,
	pub keyword_score: f32,
	pub semantic_score: f32,
}

/// Denormalized fields that only make sense for one entity kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum ResultDetails {
	Project {
		lecturer_id: Uuid,
		lecturer: Option<String>,
	},
	Task {
		priority: String,
		project_id: Uuid,
		project_title: String,
		assignee_id: Option<Uuid>,
		assignee: Option<String>,
	},
	Document {
		project_id: Uuid,
		project_title: String,
		uploader_id: Option<Uuid>,
		uploader: Option<String>,
	},
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
	pub query: String,
	pub results: Vec<SearchResult>,
	/// Candidates that cleared the relevance floor, before truncation.
	pub total: usize,
	pub semantic_search_enabled: bool,
	pub keyword_search_enabled: bool,
}

impl SearchService {
	pub async fn search(&self, query: SearchQuery) -> Result<SearchResponse> {
		let text = text::normalize_with_limit(
			&query.text,
			self.cfg.providers.embedding.max_input_chars as usize,
		);

		if text.is_empty() {
			return Err(Error::InvalidQuery { message: "Query text must not be empty.".to_string() });
		}

		let deadline = (self.cfg.search.deadline_ms > 0)
			.then(|| Instant::now() + Duration::from_millis(self.cfg.search.deadline_ms));
		let query_embedding = self.query_embedding(&text, deadline).await;
		let semantic_enabled = query_embedding.is_some();
		let keyword_enabled = query.force_keyword || !semantic_enabled;
		let ctx = RetrievalContext {
			text: &text,
			embedding: query_embedding.as_deref(),
			keyword_enabled,
			policy: FusionPolicy::from_config(&self.cfg.search),
			description_weight: self.cfg.search.description_weight,
			candidates: self.candidate_query(&query, &text, semantic_enabled),
		};
		let retrieval = self.retrieve(&query.types, &ctx);
		let mut results = match deadline {
			Some(deadline) => timeout_at(deadline, retrieval).await.map_err(|_| {
				tracing::error!("Search deadline exceeded during retrieval.");

				Error::SearchUnavailable {
					message: "Search deadline exceeded during retrieval.".to_string(),
				}
			})??,
			None => retrieval.await?,
		};

		results.sort_by(compare_results);

		let total = results.len();

		results.truncate(self.cfg.search.max_results as usize);

		tracing::debug!(
			total,
			returned = results.len(),
			semantic_enabled,
			keyword_enabled,
			"Search completed."
		);

		Ok(SearchResponse {
			query: text,
			results,
			total,
			semantic_search_enabled: semantic_enabled,
			keyword_search_enabled: keyword_enabled,
		})
	}

	/// Produces the query vector, or `None` when the query must run in keyword mode.
	async fn query_embedding(&self, text: &str, deadline: Option<Instant>) -> Option<Vec<f32>> {
		if !self.embedding.is_available() {
			tracing::info!("Embedding provider is unavailable. Using keyword search.");

			return None;
		}

		let result = match deadline {
			Some(deadline) => match timeout_at(deadline, self.embedding.embed(text)).await {
				Ok(result) => result,
				Err(_) => {
					tracing::warn!(
						"Search deadline exceeded while embedding the query. Using keyword search."
					);

					return None;
				},
			},
			None => self.embedding.embed(text).await,
		};

		match result {
			Ok(embedding) => embedding,
			Err(err) => {
				tracing::warn!(error = %err, "Query embedding failed. Using keyword search.");

				None
			},
		}
	}

	fn candidate_query(&self, query: &SearchQuery, text: &str, semantic: bool) -> CandidateQuery {
		let now = OffsetDateTime::now_utc();
		let status = query
			.status
			.as_deref()
			.map(str::trim)
			.filter(|status| !status.is_empty())
			.map(str::to_uppercase);
		// Storage-side text filtering only runs in keyword mode. Semantic mode scans a wider
		// recency window and scores keywords in process.
		let (keyword, limit) = if semantic {
			(None, self.cfg.search.semantic_candidate_cap)
		} else {
			(Some(text.to_string()), self.cfg.search.keyword_candidate_cap)
		};

		CandidateQuery {
			visibility: Visibility::for_principal(&query.principal),
			status,
			priority: query.priority,
			created_after: query.date_range.map(|range| range.start(now)),
			keyword,
			limit,
		}
	}

	async fn retrieve(
		&self,
		types: &[EntityKind],
		ctx: &RetrievalContext<'_>,
	) -> Result<Vec<SearchResult>> {
		let store = self.store.as_ref();
		let wants = |kind: EntityKind| types.is_empty() || types.contains(&kind);
		let (projects, tasks, documents) = tokio::try_join!(
			async {
				if wants(EntityKind::Project) {
					retrieval::projects(store, ctx).await
				} else {
					Ok(Vec::new())
				}
			},
			async {
				if wants(EntityKind::Task) {
					retrieval::tasks(store, ctx).await
				} else {
					Ok(Vec::new())
				}
			},
			async {
				if wants(EntityKind::Document) {
					retrieval::documents(store, ctx).await
				} else {
					Ok(Vec::new())
				}
			},
		)?;
		let mut merged = Vec::with_capacity(projects.len() + tasks.len() + documents.len());

		merged.extend(projects);
		merged.extend(tasks);
		merged.extend(documents);

		Ok(merged)
	}
}

/// Relevance descending, then most recently updated first. Kind and id settle exact ties so
/// ordering never depends on which retriever finished first.
fn compare_results(a: &SearchResult, b: &SearchResult) -> Ordering {
	b.relevance_score
		.total_cmp(&a.relevance_score)
		.then_with(|| b.updated_at.cmp(&a.updated_at))
		.then_with(|| a.kind.cmp(&b.kind))
		.then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	fn result(relevance: f32, updated_at: OffsetDateTime) -> SearchResult {
		SearchResult {
			id: Uuid::new_v4(),
			kind: EntityKind::Document,
			title: "report.pdf".to_string(),
			description: None,
			status: "ACTIVE".to_string(),
			created_at: updated_at,
			updated_at,
			details: ResultDetails::Document {
				project_id: Uuid::nil(),
				project_title: "Capstone".to_string(),
				uploader_id: None,
				uploader: None,
			},
			relevance_score: relevance,
			keyword_score: relevance,
			semantic_score: 0.0,
		}
	}

	#[test]
	fn sorts_by_relevance_then_recency() {
		let older = result(0.5, datetime!(2024-01-01 00:00 UTC));
		let newer = result(0.5, datetime!(2024-06-01 00:00 UTC));
		let best = result(0.9, datetime!(2023-01-01 00:00 UTC));
		let mut results = vec![older.clone(), newer.clone(), best.clone()];

		results.sort_by(compare_results);

		assert_eq!(results, vec![best, newer, older]);
	}

	#[test]
	fn serializes_camel_case_with_flattened_details() {
		let value = serde_json::to_value(result(0.5, datetime!(2024-01-01 00:00 UTC)))
			.expect("serialize failed");

		assert_eq!(value["type"], "document");
		assert_eq!(value["projectTitle"], "Capstone");
		assert_eq!(value["relevanceScore"], 0.5);
		assert_eq!(value["updatedAt"], "2024-01-01T00:00:00Z");
		assert!(value["uploader"].is_null());
	}
}
