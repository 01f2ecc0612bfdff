use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectRow {
	pub id: Uuid,
	pub title: String,
	pub description: Option<String>,
	pub status: String,
	pub lecturer_id: Uuid,
	pub lecturer_name: Option<String>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskRow {
	pub id: Uuid,
	pub title: String,
	pub description: Option<String>,
	pub status: String,
	pub priority: String,
	pub project_id: Uuid,
	pub project_title: String,
	pub assignee_id: Option<Uuid>,
	pub assignee_name: Option<String>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRow {
	pub id: Uuid,
	pub file_name: String,
	pub description: Option<String>,
	pub status: String,
	pub project_id: Uuid,
	pub project_title: String,
	pub uploader_id: Option<Uuid>,
	pub uploader_name: Option<String>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

/// A stored embedding in pgvector text form, as read by `embedding::text`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredEmbedding {
	pub id: Uuid,
	pub embedding: String,
}
