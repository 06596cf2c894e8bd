use std::collections::BTreeMap;

use arpa_storage::{Term, Triple, TripleStore};

use crate::Pruner;

/// Replaces every candidate literal of `predicate` with what `pruner` makes of it, dropping the
/// ones it rejects. Returns how many candidates were kept.
pub fn prune_candidates(
	store: &mut dyn TripleStore,
	predicate: &str,
	pruner: &dyn Pruner,
	record_type: Option<&str>,
) -> usize {
	tracing::info!(predicate, "Pruning candidates.");

	let mut kept = 0;

	for (subject, object) in crate::record_objects(store, predicate, record_type) {
		store.remove(&Triple::new(&subject, predicate, object.clone()));

		match pruner.prune(object.as_str()) {
			Some(candidate) => {
				kept += 1;

				store.add(Triple::new(subject, predicate, Term::literal(candidate)));
			},
			None => {
				tracing::debug!(subject = %subject, candidate = object.as_str(), "Pruned candidate.");
			},
		}
	}

	tracing::info!(kept, "Candidate pruning complete.");

	kept
}

/// Joins each subject's candidate literals into a single `"a" "b"` literal for bulk queries.
/// Returns how many subjects were rewritten.
pub fn combine_candidates(
	store: &mut dyn TripleStore,
	predicate: &str,
	record_type: Option<&str>,
) -> usize {
	tracing::info!(predicate, "Combining candidates.");

	let mut by_subject: BTreeMap<String, Vec<Term>> = BTreeMap::new();

	for (subject, object) in crate::record_objects(store, predicate, record_type) {
		by_subject.entry(subject).or_default().push(object);
	}

	let combined = by_subject.len();

	for (subject, objects) in by_subject {
		let values: Vec<&str> = objects.iter().map(Term::as_str).collect();
		let joined = combine_values(&values);

		for object in &objects {
			store.remove(&Triple::new(&subject, predicate, object.clone()));
		}

		store.add(Triple::new(subject, predicate, Term::literal(joined)));
	}

	tracing::info!(subjects = combined, "Candidates combined.");

	combined
}

/// Quotes each value, escaping inner quotes, and joins them with spaces.
pub fn combine_values(values: &[&str]) -> String {
	values
		.iter()
		.map(|value| format!("\"{}\"", value.replace('"', "\\\"")))
		.collect::<Vec<_>>()
		.join(" ")
}
