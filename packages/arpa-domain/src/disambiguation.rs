use std::collections::{HashMap, HashSet};

use crate::Candidate;

struct MentionGroup<'a> {
	mention: &'a str,
	best: i32,
	winners: Vec<usize>,
}

/// Keeps, for every mention, only the highest-scoring candidate(s) hit by it.
///
/// Expects scored candidates; a candidate survives if it wins at least one of its mentions.
/// Output preserves input order and holds each id once.
pub fn choose_best(candidates: Vec<Candidate>) -> Vec<Candidate> {
	if candidates.len() <= 1 {
		return candidates;
	}

	let mut groups: Vec<MentionGroup<'_>> = Vec::new();
	let mut group_index: HashMap<&str, usize> = HashMap::new();

	for (index, candidate) in candidates.iter().enumerate() {
		let score = candidate.score.unwrap_or(0);

		for mention in &candidate.matches {
			let slot = *group_index.entry(mention.as_str()).or_insert_with(|| {
				groups.push(MentionGroup { mention, best: score, winners: Vec::new() });

				groups.len() - 1
			});
			let group = &mut groups[slot];

			if score > group.best {
				group.best = score;
				group.winners.clear();
			}
			if score == group.best && !group.winners.contains(&index) {
				group.winners.push(index);
			}
		}
	}

	let winners: HashSet<usize> = groups.iter().flat_map(|group| group.winners.iter().copied()).collect();

	for (index, candidate) in candidates.iter().enumerate() {
		if winners.contains(&index) {
			continue;
		}

		for group in groups.iter().filter(|group| candidate.matches.iter().any(|m| m == group.mention)) {
			let outscored_by: Vec<&str> =
				group.winners.iter().map(|winner| candidates[*winner].id.as_str()).collect();

			tracing::warn!(
				id = %candidate.id,
				label = %candidate.label,
				score = candidate.score.unwrap_or(0),
				mention = group.mention,
				best = group.best,
				outscored_by = ?outscored_by,
				"LOW SCORE"
			);
		}
	}

	let mut seen = HashSet::new();

	candidates
		.into_iter()
		.enumerate()
		.filter(|(index, candidate)| winners.contains(index) && seen.insert(candidate.id.clone()))
		.map(|(_, candidate)| candidate)
		.collect()
}
