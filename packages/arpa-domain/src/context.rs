use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use time::Date;

use crate::Candidate;

/// Facts about the record being linked, read from the store once per query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFacts {
	pub reference_date: Option<Date>,
	pub units: HashSet<String>,
	/// The record's label before preprocessing.
	pub original_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedMatch {
	pub score: i32,
	/// Candidates credited to this mention after removing those also hit by a longer mention.
	pub ids: BTreeSet<String>,
}

/// Per-query view of the candidate set and the record, shared by every score term.
#[derive(Debug, Clone)]
pub struct ScoringContext {
	pub subject: String,
	pub query_text: String,
	pub reference_date: Option<Date>,
	pub units: HashSet<String>,
	pub original_text: Option<String>,
	pub ranked_matches: BTreeMap<String, RankedMatch>,
	pub match_scores: HashMap<String, i32>,
	/// Candidates carrying the honorific-granting source.
	pub honorific_holders: HashSet<String>,
}
impl ScoringContext {
	pub fn new(
		subject: &str,
		query_text: &str,
		facts: RecordFacts,
		candidates: &[Candidate],
		overlap_penalty: i32,
	) -> Self {
		let ranked_matches = rank_matches(candidates, overlap_penalty);
		let match_scores = match_scores(&ranked_matches);

		Self {
			subject: subject.to_string(),
			query_text: query_text.to_string(),
			reference_date: facts.reference_date,
			units: facts.units,
			original_text: facts.original_text,
			ranked_matches,
			match_scores,
			honorific_holders: HashSet::new(),
		}
	}

	pub fn match_score(&self, id: &str) -> i32 {
		self.match_scores.get(id).copied().unwrap_or(0)
	}

	/// Text searched for honorific markers.
	pub fn honorific_text(&self) -> &str {
		self.original_text.as_deref().unwrap_or(&self.query_text)
	}
}

/// Builds the mention table: each mention is penalized once per longer mention containing it
/// and loses credit for candidates that the longer mention also hit.
pub fn rank_matches(candidates: &[Candidate], overlap_penalty: i32) -> BTreeMap<String, RankedMatch> {
	let mut mention_ids: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

	for candidate in candidates {
		for mention in &candidate.matches {
			mention_ids.entry(mention.as_str()).or_default().insert(candidate.id.as_str());
		}
	}

	mention_ids
		.iter()
		.map(|(&mention, ids)| {
			let containing: Vec<&str> = mention_ids
				.keys()
				.copied()
				.filter(|other| *other != mention && other.contains(mention))
				.collect();
			let mut retained = ids.clone();

			for other in &containing {
				if let Some(other_ids) = mention_ids.get(other) {
					retained.retain(|id| !other_ids.contains(id));
				}
			}

			let score = overlap_penalty.saturating_mul(containing.len() as i32);
			let ids = retained.into_iter().map(str::to_string).collect();

			(mention.to_string(), RankedMatch { score, ids })
		})
		.collect()
}

fn match_scores(ranked_matches: &BTreeMap<String, RankedMatch>) -> HashMap<String, i32> {
	let mut scores: HashMap<String, i32> = HashMap::new();

	for ranked in ranked_matches.values() {
		for id in &ranked.ids {
			scores
				.entry(id.clone())
				.and_modify(|score| *score = (*score).max(ranked.score))
				.or_insert(ranked.score);
		}
	}

	scores
}
