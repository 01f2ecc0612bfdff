use crate::{Error, Result};

/// Renders a vector in pgvector text form, e.g. `[0.1,0.2]`.
pub fn vector_to_pg(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 8);

	out.push('[');

	for (i, value) in vec.iter().enumerate() {
		if i > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

pub fn parse_pg_vector(text: &str) -> Result<Vec<f32>> {
	let trimmed = text.trim();
	let without_brackets = trimmed
		.strip_prefix('[')
		.and_then(|s| s.strip_suffix(']'))
		.ok_or_else(|| Error::InvalidVector("Vector text is not bracketed.".to_string()))?;

	if without_brackets.trim().is_empty() {
		return Ok(Vec::new());
	}

	let mut vec = Vec::new();

	for part in without_brackets.split(',') {
		let value: f32 = part.trim().parse().map_err(|_| {
			Error::InvalidVector("Vector text contains a non-numeric value.".to_string())
		})?;

		if !value.is_finite() {
			return Err(Error::InvalidVector("Vector text contains a non-finite value.".to_string()));
		}

		vec.push(value);
	}

	Ok(vec)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_pgvector_text() {
		assert_eq!(parse_pg_vector("[0.5, -1,2e-3]").expect("parse failed"), vec![0.5, -1.0, 0.002]);
		assert_eq!(parse_pg_vector("[]").expect("parse failed"), Vec::<f32>::new());
		assert_eq!(vector_to_pg(&[0.25, -1.0]), "[0.25,-1]");
	}

	#[test]
	fn rejects_malformed_vectors() {
		assert!(parse_pg_vector("0.5,1").is_err());
		assert!(parse_pg_vector("[0.5,abc]").is_err());
		assert!(parse_pg_vector("[NaN,0,0]").is_err());
		assert!(parse_pg_vector("[inf,0]").is_err());
		assert!(parse_pg_vector("[1e39,0]").is_err());
	}
}
