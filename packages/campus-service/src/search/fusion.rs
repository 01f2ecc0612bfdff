use campus_config::Search;

/// Weights and floor used to collapse keyword and semantic scores into one relevance value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionPolicy {
	pub semantic_weight: f32,
	pub keyword_weight: f32,
	pub relevance_floor: f32,
}
impl FusionPolicy {
	pub fn from_config(cfg: &Search) -> Self {
		Self {
			semantic_weight: cfg.semantic_weight,
			keyword_weight: cfg.keyword_weight,
			relevance_floor: cfg.relevance_floor,
		}
	}

	/// Fuses both scores for one candidate.
	///
	/// Without a query embedding the keyword score stands alone. With one, keyword-disabled
	/// queries rank on the semantic score and keyword-enabled queries use the weighted sum.
	pub fn fuse(
		&self,
		keyword_score: f32,
		semantic_score: f32,
		embedding_present: bool,
		keyword_enabled: bool,
	) -> f32 {
		let keyword = unit(keyword_score);
		let semantic = unit(semantic_score);
		let fused = if !embedding_present {
			keyword
		} else if !keyword_enabled {
			semantic
		} else {
			self.semantic_weight * semantic + self.keyword_weight * keyword
		};

		unit(fused)
	}

	pub fn passes_floor(&self, relevance: f32) -> bool {
		relevance > self.relevance_floor
	}
}

fn unit(score: f32) -> f32 {
	if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn policy() -> FusionPolicy {
		FusionPolicy::from_config(&Search::default())
	}

	#[test]
	fn keyword_only_without_embedding() {
		assert_eq!(policy().fuse(0.7, 0.9, false, true), 0.7);
		// Keyword is implied when no embedding exists, whatever the flag says.
		assert_eq!(policy().fuse(0.7, 0.9, false, false), 0.7);
	}

	#[test]
	fn semantic_only_when_keyword_disabled() {
		assert_eq!(policy().fuse(1.0, 0.25, true, false), 0.25);
	}

	#[test]
	fn hybrid_uses_configured_weights() {
		let fused = policy().fuse(1.0, 0.5, true, true);

		assert!((fused - 0.7).abs() < 1e-6, "Unexpected fused score {fused}.");
	}

	#[test]
	fn fused_scores_stay_in_unit_range() {
		let policy = policy();
		let samples = [-1.0, 0.0, 0.05, 0.5, 1.0, 2.0, f32::NAN];

		for keyword in samples {
			for semantic in samples {
				for (present, enabled) in [(false, true), (true, false), (true, true)] {
					let fused = policy.fuse(keyword, semantic, present, enabled);

					assert!((0.0..=1.0).contains(&fused), "Out of range: {fused}.");
				}
			}
		}
	}

	#[test]
	fn fusion_is_monotonic_in_each_score() {
		let policy = policy();
		let steps = [0.0, 0.1, 0.3, 0.6, 0.9, 1.0];

		for window in steps.windows(2) {
			let (low, high) = (window[0], window[1]);

			for other in steps {
				assert!(policy.fuse(high, other, true, true) >= policy.fuse(low, other, true, true));
				assert!(policy.fuse(other, high, true, true) >= policy.fuse(other, low, true, true));
			}
		}
	}

	#[test]
	fn floor_is_exclusive() {
		let policy = policy();

		assert!(!policy.passes_floor(0.1));
		assert!(policy.passes_floor(0.100_001));
		assert!(!policy.passes_floor(0.0));
	}
}
