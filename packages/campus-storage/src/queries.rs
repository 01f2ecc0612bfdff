use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Error, Result,
	db::Db,
	models::{DocumentRow, ProjectRow, StoredEmbedding, TaskRow},
	visibility::Visibility,
};
use campus_domain::entity::{EntityKind, TaskPriority};

/// Bounds for one candidate fetch. Every field is ANDed with the visibility predicate.
#[derive(Debug, Clone)]
pub struct CandidateQuery {
	pub visibility: Visibility,
	/// Upper-cased status to match exactly.
	pub status: Option<String>,
	/// Applied to tasks only.
	pub priority: Option<TaskPriority>,
	pub created_after: Option<OffsetDateTime>,
	/// Substring pushed down to storage. Only set when ranking is keyword-only.
	pub keyword: Option<String>,
	pub limit: u32,
}

struct Columns {
	project_alias: &'static str,
	status: &'static str,
	created_at: &'static str,
	title: &'static str,
	description: &'static str,
	updated_at: &'static str,
	id: &'static str,
}

const PROJECT_COLUMNS: Columns = Columns {
	project_alias: "p",
	status: "p.status",
	created_at: "p.created_at",
	title: "p.title",
	description: "p.description",
	updated_at: "p.updated_at",
	id: "p.id",
};
const TASK_COLUMNS: Columns = Columns {
	project_alias: "p",
	status: "t.status",
	created_at: "t.created_at",
	title: "t.title",
	description: "t.description",
	updated_at: "t.updated_at",
	id: "t.id",
};
const DOCUMENT_COLUMNS: Columns = Columns {
	project_alias: "p",
	status: "d.status",
	created_at: "d.created_at",
	title: "d.file_name",
	description: "d.description",
	updated_at: "d.updated_at",
	id: "d.id",
};

pub async fn fetch_project_candidates(db: &Db, query: &CandidateQuery) -> Result<Vec<ProjectRow>> {
	check_limit(query)?;

	let mut builder = project_candidates_sql(query);
	let rows = builder.build_query_as::<ProjectRow>().fetch_all(&db.pool).await?;

	Ok(rows)
}

pub async fn fetch_task_candidates(db: &Db, query: &CandidateQuery) -> Result<Vec<TaskRow>> {
	check_limit(query)?;

	let mut builder = task_candidates_sql(query);
	let rows = builder.build_query_as::<TaskRow>().fetch_all(&db.pool).await?;

	Ok(rows)
}

pub async fn fetch_document_candidates(
	db: &Db,
	query: &CandidateQuery,
) -> Result<Vec<DocumentRow>> {
	check_limit(query)?;

	let mut builder = document_candidates_sql(query);
	let rows = builder.build_query_as::<DocumentRow>().fetch_all(&db.pool).await?;

	Ok(rows)
}

/// Reads stored vectors for `ids`. Entities without an embedding are simply absent.
pub async fn fetch_embeddings(
	db: &Db,
	kind: EntityKind,
	ids: &[Uuid],
) -> Result<Vec<StoredEmbedding>> {
	if ids.is_empty() {
		return Ok(Vec::new());
	}

	let sql = match kind {
		EntityKind::Project =>
			"SELECT id, embedding::text AS embedding FROM projects WHERE id = ANY($1) AND embedding IS NOT NULL",
		EntityKind::Task =>
			"SELECT id, embedding::text AS embedding FROM tasks WHERE id = ANY($1) AND embedding IS NOT NULL",
		EntityKind::Document =>
			"SELECT id, embedding::text AS embedding FROM documents WHERE id = ANY($1) AND embedding IS NOT NULL",
	};
	let rows = sqlx::query_as::<_, StoredEmbedding>(sql).bind(ids).fetch_all(&db.pool).await?;

	Ok(rows)
}

fn project_candidates_sql(query: &CandidateQuery) -> QueryBuilder<'static, Postgres> {
	let mut builder = QueryBuilder::new(
		"\
SELECT
	p.id,
	p.title,
	p.description,
	p.status,
	p.lecturer_id,
	u.name AS lecturer_name,
	p.created_at,
	p.updated_at
FROM projects p
LEFT JOIN users u ON u.id = p.lecturer_id
WHERE TRUE",
	);

	push_filters(&mut builder, query, &PROJECT_COLUMNS);

	builder
}

fn task_candidates_sql(query: &CandidateQuery) -> QueryBuilder<'static, Postgres> {
	let mut builder = QueryBuilder::new(
		"\
SELECT
	t.id,
	t.title,
	t.description,
	t.status,
	t.priority,
	t.project_id,
	p.title AS project_title,
	t.assignee_id,
	u.name AS assignee_name,
	t.created_at,
	t.updated_at
FROM tasks t
JOIN projects p ON p.id = t.project_id
LEFT JOIN users u ON u.id = t.assignee_id
WHERE TRUE",
	);

	if let Some(priority) = query.priority {
		builder.push(" AND t.priority = ").push_bind(priority.as_str());
	}

	push_filters(&mut builder, query, &TASK_COLUMNS);

	builder
}

fn document_candidates_sql(query: &CandidateQuery) -> QueryBuilder<'static, Postgres> {
	let mut builder = QueryBuilder::new(
		"\
SELECT
	d.id,
	d.file_name,
	d.description,
	d.status,
	d.project_id,
	p.title AS project_title,
	d.uploader_id,
	u.name AS uploader_name,
	d.created_at,
	d.updated_at
FROM documents d
JOIN projects p ON p.id = d.project_id
LEFT JOIN users u ON u.id = d.uploader_id
WHERE TRUE",
	);

	push_filters(&mut builder, query, &DOCUMENT_COLUMNS);

	builder
}

fn push_filters(
	builder: &mut QueryBuilder<'static, Postgres>,
	query: &CandidateQuery,
	columns: &Columns,
) {
	query.visibility.push_sql(builder, columns.project_alias);

	if let Some(status) = query.status.as_ref() {
		builder.push(format!(" AND {} = ", columns.status)).push_bind(status.clone());
	}
	if let Some(created_after) = query.created_after {
		builder.push(format!(" AND {} >= ", columns.created_at)).push_bind(created_after);
	}
	if let Some(keyword) = query.keyword.as_deref().filter(|keyword| !keyword.is_empty()) {
		let pattern = like_pattern(keyword);

		builder
			.push(format!(" AND ({} ILIKE ", collapse_whitespace(columns.title)))
			.push_bind(pattern.clone())
			.push(format!(" OR {} ILIKE ", collapse_whitespace(columns.description)))
			.push_bind(pattern)
			.push(")");
	}

	builder
		.push(format!(" ORDER BY {} DESC, {} LIMIT ", columns.updated_at, columns.id))
		.push_bind(i64::from(query.limit));
}

fn check_limit(query: &CandidateQuery) -> Result<()> {
	if query.limit == 0 {
		return Err(Error::InvalidArgument("Candidate limit must be greater than zero.".to_string()));
	}

	Ok(())
}

/// Column text with whitespace runs collapsed, matching how query text is normalized.
fn collapse_whitespace(column: &str) -> String {
	format!(r"regexp_replace({column}, '\s+', ' ', 'g')")
}

/// Wraps `raw` for a contains-match, escaping LIKE metacharacters.
fn like_pattern(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len() + 2);

	out.push('%');

	for ch in raw.chars() {
		if matches!(ch, '%' | '_' | '\\') {
			out.push('\\');
		}

		out.push(ch);
	}

	out.push('%');

	out
}
