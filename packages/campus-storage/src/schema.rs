pub fn render_schema(vector_dim: u32) -> String {
	let init = include_str!("../../../sql/init.sql");
	let expanded = expand_includes(init);

	expanded.replace("<VECTOR_DIM>", &vector_dim.to_string())
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"00_extensions.sql" => out.push_str(include_str!("../../../sql/00_extensions.sql")),
				"tables/001_users.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_users.sql")),
				"tables/002_projects.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_projects.sql")),
				"tables/003_project_students.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_project_students.sql")),
				"tables/004_tasks.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_tasks.sql")),
				"tables/005_documents.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_documents.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn renders_every_table_with_vector_dim() {
		let sql = render_schema(1_536);

		for table in ["users", "projects", "project_students", "tasks", "documents"] {
			assert!(
				sql.contains(&format!("CREATE TABLE IF NOT EXISTS {table} (")),
				"Missing table {table}."
			);
		}

		assert!(sql.contains("vector(1536)"));
		assert!(!sql.contains("<VECTOR_DIM>"));
		assert!(!sql.contains("\\ir "));
	}
}
