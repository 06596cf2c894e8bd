pub mod candidates;
pub mod linker;
pub mod preprocess;
pub mod process;

mod error;

pub use candidates::{combine_candidates, combine_values, prune_candidates};
pub use error::{Error, Result};
pub use linker::{LinkReport, Linker, RecordError};
pub use preprocess::PatternPreprocessor;
pub use process::{GraphJob, LinkStage, ProcessOutcome, process_graph};

use std::{future::Future, pin::Pin};

use arpa_domain::QueryResults;
use arpa_providers::{ArpaClient, QueryMode, SparqlMimic};
use arpa_storage::{Term, TripleStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Anything that answers ARPA-style queries.
pub trait MatchingClient
where
	Self: Send + Sync,
{
	fn query<'a>(
		&'a self,
		text: &'a str,
		mode: QueryMode,
	) -> BoxFuture<'a, arpa_providers::Result<QueryResults>>;
}

/// Rewrites a record's text before it is queried. An empty result skips the record.
pub trait Preprocessor {
	fn preprocess(&self, text: &str, subject: &str, store: &dyn TripleStore) -> String;
}

/// Decides what becomes of a single candidate literal: `None` drops it.
///
/// Implemented for closures, so a `NamePruner` is passed as `|c: &str| pruner.prune(c)`.
pub trait Pruner {
	fn prune(&self, candidate: &str) -> Option<String>;
}

impl MatchingClient for ArpaClient {
	fn query<'a>(
		&'a self,
		text: &'a str,
		mode: QueryMode,
	) -> BoxFuture<'a, arpa_providers::Result<QueryResults>> {
		Box::pin(ArpaClient::query(self, text, mode))
	}
}

impl MatchingClient for SparqlMimic {
	fn query<'a>(
		&'a self,
		text: &'a str,
		mode: QueryMode,
	) -> BoxFuture<'a, arpa_providers::Result<QueryResults>> {
		Box::pin(SparqlMimic::query(self, text, mode))
	}
}

impl<F> Preprocessor for F
where
	F: Fn(&str, &str, &dyn TripleStore) -> String,
{
	fn preprocess(&self, text: &str, subject: &str, store: &dyn TripleStore) -> String {
		self(text, subject, store)
	}
}

impl<F> Pruner for F
where
	F: Fn(&str) -> Option<String>,
{
	fn prune(&self, candidate: &str) -> Option<String> {
		self(candidate)
	}
}

/// `(subject, object)` pairs of `predicate`, restricted to subjects typed `record_type` when
/// one is given.
pub fn record_objects(
	store: &dyn TripleStore,
	predicate: &str,
	record_type: Option<&str>,
) -> Vec<(String, Term)> {
	store
		.triples(None, Some(predicate), None)
		.into_iter()
		.filter(|triple| record_type.is_none_or(|class| store.has_type(&triple.subject, class)))
		.map(|triple| (triple.subject, triple.object))
		.collect()
}

#[cfg(test)]
mod tests {
	use arpa_storage::{MemoryGraph, RDF_TYPE};

	use super::*;

	const LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";

	#[test]
	fn record_type_restricts_subjects() {
		let mut graph = MemoryGraph::new();

		graph.insert("photo_1", LABEL, Term::literal("Hanko"));
		graph.insert("photo_1", RDF_TYPE, Term::iri("Photograph"));
		graph.insert("event_1", LABEL, Term::literal("Hanko"));

		assert_eq!(record_objects(&graph, LABEL, None).len(), 2);
		assert_eq!(
			record_objects(&graph, LABEL, Some("Photograph")),
			vec![("photo_1".to_string(), Term::literal("Hanko"))]
		);
	}

	#[test]
	fn closures_act_as_collaborators() {
		let graph = MemoryGraph::new();
		let upper = |text: &str, _: &str, _: &dyn TripleStore| text.to_uppercase();
		let keep_long = |candidate: &str| (candidate.len() > 3).then(|| candidate.to_string());

		assert_eq!(upper.preprocess("hanko", "photo_1", &graph), "HANKO");
		assert_eq!(Pruner::prune(&keep_long, "Hanko"), Some("Hanko".to_string()));
		assert_eq!(Pruner::prune(&keep_long, "Han"), None);
	}
}
