use std::collections::HashSet;

/// Upper bound on characters submitted to the embedding provider.
pub const MAX_INPUT_CHARS: usize = 8_000;

/// Collapses whitespace runs to single spaces, trims, and truncates to [`MAX_INPUT_CHARS`].
pub fn normalize(text: &str) -> String {
	normalize_with_limit(text, MAX_INPUT_CHARS)
}

pub fn normalize_with_limit(text: &str, max_chars: usize) -> String {
	let mut out = String::with_capacity(text.len().min(max_chars));
	let mut chars = 0_usize;

	for word in text.split_whitespace() {
		let separator = usize::from(chars > 0);

		if chars + separator >= max_chars {
			break;
		}
		if separator == 1 {
			out.push(' ');

			chars += 1;
		}

		for ch in word.chars() {
			if chars >= max_chars {
				return out;
			}

			out.push(ch);

			chars += 1;
		}
	}

	out
}

/// Lexical relevance of `text` for `query`, in `[0, 1]`.
///
/// Full-query substring containment contributes `1.0`, and each distinct query word found
/// anywhere in the text contributes its share of the word count. Matching is plain
/// case-insensitive substring search with no tokenization or stemming.
pub fn keyword_score(text: &str, query: &str) -> f32 {
	let text = normalize(text).to_lowercase();
	let query = normalize(query).to_lowercase();

	if text.is_empty() || query.is_empty() {
		return 0.0;
	}

	let mut score = 0.0_f32;

	if text.contains(query.as_str()) {
		score += 1.0;
	}

	let mut seen = HashSet::new();
	let mut matched = 0_usize;

	for word in query.split_whitespace() {
		if !seen.insert(word) {
			continue;
		}
		if text.contains(word) {
			matched += 1;
		}
	}

	if !seen.is_empty() {
		score += matched as f32 / seen.len() as f32;
	}

	score.min(1.0)
}

/// Best keyword score across an entity's title and its down-weighted description.
pub fn field_keyword_score(
	title: &str,
	description: Option<&str>,
	query: &str,
	description_weight: f32,
) -> f32 {
	let title_score = keyword_score(title, query);
	let description_score =
		description.map(|text| keyword_score(text, query) * description_weight).unwrap_or(0.0);

	title_score.max(description_score).clamp(0.0, 1.0)
}
