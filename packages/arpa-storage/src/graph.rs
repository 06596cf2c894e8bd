use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
	Iri(String),
	Literal(String),
}
impl Term {
	pub fn iri(value: impl Into<String>) -> Self {
		Self::Iri(value.into())
	}

	pub fn literal(value: impl Into<String>) -> Self {
		Self::Literal(value.into())
	}

	pub fn as_str(&self) -> &str {
		match self {
			Self::Iri(value) | Self::Literal(value) => value,
		}
	}

	pub fn is_literal(&self) -> bool {
		matches!(self, Self::Literal(_))
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
	pub subject: String,
	pub predicate: String,
	pub object: Term,
}
impl Triple {
	pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Term) -> Self {
		Self { subject: subject.into(), predicate: predicate.into(), object }
	}
}

/// Labeled-triple store the linker reads records from and writes links into.
///
/// `None` in a pattern position matches anything.
pub trait TripleStore {
	fn triples(
		&self,
		subject: Option<&str>,
		predicate: Option<&str>,
		object: Option<&Term>,
	) -> Vec<Triple>;

	/// Returns `false` when the triple was already present.
	fn add(&mut self, triple: Triple) -> bool;

	/// Returns `false` when the triple was not present.
	fn remove(&mut self, triple: &Triple) -> bool;

	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn objects(&self, subject: &str, predicate: &str) -> Vec<Term> {
		self.triples(Some(subject), Some(predicate), None)
			.into_iter()
			.map(|triple| triple.object)
			.collect()
	}

	/// First object of `(subject, predicate)`, if any.
	fn value(&self, subject: &str, predicate: &str) -> Option<Term> {
		self.objects(subject, predicate).into_iter().next()
	}

	fn has_type(&self, subject: &str, class: &str) -> bool {
		!self.triples(Some(subject), Some(RDF_TYPE), Some(&Term::iri(class))).is_empty()
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryGraph {
	triples: BTreeSet<Triple>,
}
impl MemoryGraph {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Triple> {
		self.triples.iter()
	}

	pub fn into_triples(self) -> Vec<Triple> {
		self.triples.into_iter().collect()
	}

	pub fn insert(&mut self, subject: &str, predicate: &str, object: Term) -> bool {
		self.triples.insert(Triple::new(subject, predicate, object))
	}

	/// Adds every triple of `other`, returning how many were new.
	pub fn merge(&mut self, other: MemoryGraph) -> usize {
		let before = self.triples.len();

		self.triples.extend(other.triples);

		self.triples.len() - before
	}
}
impl TripleStore for MemoryGraph {
	fn triples(
		&self,
		subject: Option<&str>,
		predicate: Option<&str>,
		object: Option<&Term>,
	) -> Vec<Triple> {
		self.triples
			.iter()
			.filter(|triple| subject.is_none_or(|s| triple.subject == s))
			.filter(|triple| predicate.is_none_or(|p| triple.predicate == p))
			.filter(|triple| object.is_none_or(|o| &triple.object == o))
			.cloned()
			.collect()
	}

	fn add(&mut self, triple: Triple) -> bool {
		self.triples.insert(triple)
	}

	fn remove(&mut self, triple: &Triple) -> bool {
		self.triples.remove(triple)
	}

	fn len(&self) -> usize {
		self.triples.len()
	}
}
impl FromIterator<Triple> for MemoryGraph {
	fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
		Self { triples: iter.into_iter().collect() }
	}
}
