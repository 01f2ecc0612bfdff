use std::{fmt, str::FromStr};

use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
	Admin,
	Lecturer,
	Student,
}
impl Role {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Admin => "ADMIN",
			Self::Lecturer => "LECTURER",
			Self::Student => "STUDENT",
		}
	}
}
impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for Role {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		match raw.trim().to_ascii_uppercase().as_str() {
			"ADMIN" => Ok(Self::Admin),
			"LECTURER" => Ok(Self::Lecturer),
			"STUDENT" => Ok(Self::Student),
			_ => Err(Error::UnknownValue { kind: "role", value: raw.to_string() }),
		}
	}
}

/// The authenticated actor issuing a query. Resolved upstream and trusted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Principal {
	pub id: Uuid,
	pub role: Role,
}
impl Principal {
	pub fn new(id: Uuid, role: Role) -> Self {
		Self { id, role }
	}
}

/// Who may see an entity: the lecturer of the owning project and its enrolled students.
///
/// Tasks and documents inherit the scope of their parent project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerScope {
	pub lecturer_id: Option<Uuid>,
	pub student_ids: Vec<Uuid>,
}
