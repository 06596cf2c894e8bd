use std::collections::{HashMap, HashSet};

use arpa_config::DuplicatePolicy;

use crate::{Candidate, QueryResults, plain_value};

/// Post-processing applied to every query response: ignore list, minimum mention length and
/// duplicate removal, in that order.
#[derive(Debug, Clone, Default)]
pub struct ResultFilter {
	ignore: HashSet<String>,
	min_ngram: usize,
	duplicates: DuplicatePolicy,
}
impl ResultFilter {
	pub fn new<I, S>(ignore: I, min_ngram: usize, duplicates: DuplicatePolicy) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		Self {
			ignore: ignore.into_iter().map(|term| term.as_ref().to_lowercase()).collect(),
			min_ngram,
			duplicates,
		}
	}

	pub fn from_config(cfg: &arpa_config::Filter) -> Self {
		Self::new(&cfg.ignore, cfg.min_ngram, cfg.duplicates.clone())
	}

	pub fn filter(&self, results: QueryResults) -> QueryResults {
		match results {
			QueryResults::Matches(candidates) => QueryResults::Matches(self.filter_matches(candidates)),
			QueryResults::Candidates(ngrams) => QueryResults::Candidates(self.filter_ngrams(ngrams)),
		}
	}

	pub fn filter_matches(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
		let kept: Vec<Candidate> = candidates
			.into_iter()
			.filter(|candidate| {
				if self.is_ignored(&candidate.label) {
					tracing::debug!(id = %candidate.id, label = %candidate.label, "Ignoring candidate.");

					return false;
				}
				if !self.is_long_enough(mention_of(candidate)) {
					tracing::debug!(id = %candidate.id, label = %candidate.label, "Mention is shorter than min_ngram.");

					return false;
				}

				true
			})
			.collect();

		match &self.duplicates {
			DuplicatePolicy::Disabled => kept,
			DuplicatePolicy::Arbitrary => remove_duplicates_arbitrarily(kept),
			DuplicatePolicy::PrioritizedBy(priorities) =>
				remove_duplicates_by_priority(kept, priorities),
		}
	}

	/// Candidate-only responses carry no types, so duplicates are never removed here.
	pub fn filter_ngrams(&self, ngrams: Vec<String>) -> Vec<String> {
		ngrams
			.into_iter()
			.filter(|ngram| !self.is_ignored(ngram) && self.is_long_enough(ngram))
			.collect()
	}

	fn is_ignored(&self, label: &str) -> bool {
		!self.ignore.is_empty() && self.ignore.contains(&label.to_lowercase())
	}

	fn is_long_enough(&self, mention: &str) -> bool {
		self.min_ngram <= 1 || mention.split_whitespace().count() >= self.min_ngram
	}
}

fn mention_of(candidate: &Candidate) -> &str {
	candidate
		.first_plain("ngram")
		.or_else(|| candidate.matches.first().map(String::as_str))
		.unwrap_or_default()
}

fn remove_duplicates_arbitrarily(candidates: Vec<Candidate>) -> Vec<Candidate> {
	let mut seen = HashSet::new();

	candidates
		.into_iter()
		.filter(|candidate| {
			let first = seen.insert(candidate.label.clone());

			if !first {
				tracing::debug!(id = %candidate.id, label = %candidate.label, "Dropping duplicate candidate.");
			}

			first
		})
		.collect()
}

fn remove_duplicates_by_priority(candidates: Vec<Candidate>, priorities: &[String]) -> Vec<Candidate> {
	// Lower-cased label -> (index into candidates, priority index).
	let mut retained: HashMap<String, (usize, usize)> = HashMap::new();

	for (index, candidate) in candidates.iter().enumerate() {
		let priority = priority_of(candidate, priorities);
		let key = candidate.label.to_lowercase();

		match retained.get(&key) {
			Some(&(_, current)) if priority >= current => {},
			_ => {
				retained.insert(key, (index, priority));
			},
		}
	}

	let keep: HashSet<usize> = retained.into_values().map(|(index, _)| index).collect();

	candidates
		.into_iter()
		.enumerate()
		.filter_map(|(index, candidate)| {
			if keep.contains(&index) {
				Some(candidate)
			} else {
				tracing::debug!(id = %candidate.id, label = %candidate.label, "Dropping lower priority duplicate.");

				None
			}
		})
		.collect()
}

/// Lowest index of any of the candidate's types in `priorities`; `usize::MAX` when none is listed.
fn priority_of(candidate: &Candidate, priorities: &[String]) -> usize {
	candidate
		.plain_values("type")
		.into_iter()
		.filter_map(|kind| priorities.iter().position(|priority| plain_value(priority) == kind))
		.min()
		.unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
	use super::*;

	const KUNTA: &str = "http://www.yso.fi/onto/suo/kunta";
	const KYLA: &str = "http://ldf.fi/warsa/places/place_types/Kyla";

	fn place(id: &str, label: &str, kind: &str) -> Candidate {
		Candidate::new(id, label)
			.with_match(label)
			.with_property("ngram", format!("\"{label}\""))
			.with_property("type", format!("<{kind}>"))
	}

	#[test]
	fn ignore_list_is_case_insensitive() {
		let filter = ResultFilter::new(["hanko"], 1, DuplicatePolicy::Disabled);
		let kept = filter.filter_matches(vec![place("a", "Hanko", KUNTA), place("b", "Viipuri", KUNTA)]);

		assert_eq!(kept.len(), 1);
		assert_eq!(kept[0].id, "b");
	}

	#[test]
	fn min_ngram_counts_mention_tokens() {
		let filter = ResultFilter::new(Vec::<String>::new(), 2, DuplicatePolicy::Disabled);
		let kept = filter.filter_matches(vec![
			place("a", "Hanko", KUNTA),
			place("b", "Hanko Hanko", KUNTA),
			place("c", "Iso Hanko Hanko", KUNTA),
		]);
		let ids: Vec<&str> = kept.iter().map(|candidate| candidate.id.as_str()).collect();

		assert_eq!(ids, vec!["b", "c"]);
	}

	#[test]
	fn arbitrary_keeps_one_per_label() {
		let filter = ResultFilter::new(Vec::<String>::new(), 1, DuplicatePolicy::Arbitrary);
		let kept = filter.filter_matches(vec![
			place("a1", "A", KUNTA),
			place("a2", "A", KYLA),
			place("b", "B", KUNTA),
		]);
		let labels: HashSet<&str> = kept.iter().map(|candidate| candidate.label.as_str()).collect();

		assert_eq!(kept.len(), 2);
		assert_eq!(labels, HashSet::from(["A", "B"]));
	}

	#[test]
	fn priority_list_picks_the_preferred_type() {
		let filter = ResultFilter::new(
			Vec::<String>::new(),
			1,
			DuplicatePolicy::PrioritizedBy(vec![KUNTA.to_string(), KYLA.to_string()]),
		);
		let kept = filter.filter_matches(vec![place("a1", "A", KYLA), place("a2", "a", KUNTA)]);

		assert_eq!(kept.len(), 1);
		assert_eq!(kept[0].id, "a2");
	}

	#[test]
	fn unlisted_types_rank_last_and_order_is_preserved() {
		let filter = ResultFilter::new(
			Vec::<String>::new(),
			1,
			DuplicatePolicy::PrioritizedBy(vec![KUNTA.to_string()]),
		);
		let kept = filter.filter_matches(vec![
			place("b", "B", KYLA),
			place("a1", "A", KYLA),
			place("a2", "A", KUNTA),
		]);
		let ids: Vec<&str> = kept.iter().map(|candidate| candidate.id.as_str()).collect();

		assert_eq!(ids, vec!["b", "a2"]);
	}

	#[test]
	fn ngrams_skip_duplicate_removal() {
		let filter = ResultFilter::new(["turku"], 1, DuplicatePolicy::Arbitrary);
		let kept = filter.filter(QueryResults::Candidates(vec![
			"hanko".to_string(),
			"hanko".to_string(),
			"Turku".to_string(),
		]));

		assert_eq!(kept, QueryResults::Candidates(vec!["hanko".to_string(), "hanko".to_string()]));
	}
}
