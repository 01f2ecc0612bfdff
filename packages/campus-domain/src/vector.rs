/// Cosine similarity of two vectors.
///
/// Returns `0.0` when the lengths differ, either vector is empty, either norm is zero, or a
/// component is not finite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
	if a.len() != b.len() || a.is_empty() {
		return 0.0;
	}

	let mut dot = 0.0_f64;
	let mut norm_a = 0.0_f64;
	let mut norm_b = 0.0_f64;

	for (x, y) in a.iter().zip(b) {
		let (x, y) = (f64::from(*x), f64::from(*y));

		dot += x * y;
		norm_a += x * x;
		norm_b += y * y;
	}

	if norm_a == 0.0 || norm_b == 0.0 {
		return 0.0;
	}

	let similarity = (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32;

	if similarity.is_finite() { similarity.clamp(-1.0, 1.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn orthogonal_vectors_score_zero() {
		assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
	}

	#[test]
	fn opposite_vectors_score_negative_one() {
		let score = cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]);

		assert!((score + 1.0).abs() < 1e-6, "Unexpected score: {score}");
	}

	#[test]
	fn degenerate_inputs_score_zero() {
		assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
		assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
		assert_eq!(cosine_similarity(&[], &[]), 0.0);
	}

	#[test]
	fn non_finite_components_score_zero() {
		assert_eq!(cosine_similarity(&[f32::NAN, 0.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
		assert_eq!(cosine_similarity(&[f32::INFINITY, 0.0], &[1.0, 0.0]), 0.0);
		assert_eq!(cosine_similarity(&[1.0, 0.0], &[f32::NEG_INFINITY, 1.0]), 0.0);
	}
}
