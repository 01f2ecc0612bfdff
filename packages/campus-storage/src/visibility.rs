use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use campus_domain::principal::{OwnerScope, Principal, Role};

/// Row-level access predicate derived from the requesting principal.
///
/// Every candidate query is restricted by this predicate before any scoring happens, so an
/// entity outside the principal's owner scope is never a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
	All,
	/// The owning project's lecturer must be this user.
	Lecturer(Uuid),
	/// This user must be enrolled in the owning project.
	Student(Uuid),
}
impl Visibility {
	pub fn for_principal(principal: &Principal) -> Self {
		match principal.role {
			Role::Admin => Self::All,
			Role::Lecturer => Self::Lecturer(principal.id),
			Role::Student => Self::Student(principal.id),
		}
	}

	/// In-process form of the predicate, for stores that do not speak SQL.
	pub fn admits(&self, scope: &OwnerScope) -> bool {
		match self {
			Self::All => true,
			Self::Lecturer(id) => scope.lecturer_id == Some(*id),
			Self::Student(id) => scope.student_ids.contains(id),
		}
	}

	/// Appends ` AND <predicate>` against the owning project aliased as `project_alias`.
	pub fn push_sql(&self, builder: &mut QueryBuilder<'_, Postgres>, project_alias: &str) {
		match self {
			Self::All => {},
			Self::Lecturer(id) => {
				builder.push(format!(" AND {project_alias}.lecturer_id = ")).push_bind(*id);
			},
			Self::Student(id) => {
				builder
					.push(format!(
						" AND EXISTS (SELECT 1 FROM project_students ps WHERE ps.project_id = {project_alias}.id AND ps.student_id = "
					))
					.push_bind(*id)
					.push(")");
			},
		}
	}
}
