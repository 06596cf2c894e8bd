use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One matching-service hit.
///
/// Property values keep the service's RDF-term notation (`"v"^^dt`, `"v"@lang`, `<iri>`);
/// use [`plain_value`] before comparing them with configuration data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
	pub id: String,
	#[serde(default)]
	pub label: String,
	#[serde(default)]
	pub matches: Vec<String>,
	#[serde(default)]
	pub properties: BTreeMap<String, Vec<String>>,
	/// Set only on candidates that passed validation.
	#[serde(skip)]
	pub score: Option<i32>,
}
impl Candidate {
	pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			matches: Vec::new(),
			properties: BTreeMap::new(),
			score: None,
		}
	}

	pub fn with_match(mut self, mention: impl Into<String>) -> Self {
		self.add_match(mention);

		self
	}

	pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.properties.entry(key.into()).or_default().push(value.into());

		self
	}

	/// Records a mention unless it is already present.
	pub fn add_match(&mut self, mention: impl Into<String>) -> bool {
		let mention = mention.into();

		if self.matches.contains(&mention) {
			return false;
		}

		self.matches.push(mention);

		true
	}

	pub fn property(&self, key: &str) -> &[String] {
		self.properties.get(key).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn plain_values(&self, key: &str) -> Vec<&str> {
		self.property(key).iter().map(|value| plain_value(value)).collect()
	}

	pub fn first_plain(&self, key: &str) -> Option<&str> {
		self.property(key).first().map(|value| plain_value(value))
	}
}

/// Filtered response of one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResults {
	Matches(Vec<Candidate>),
	/// Raw n-grams, returned when the service is asked for candidates only.
	Candidates(Vec<String>),
}
impl QueryResults {
	pub fn len(&self) -> usize {
		match self {
			Self::Matches(candidates) => candidates.len(),
			Self::Candidates(ngrams) => ngrams.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Strips RDF-term notation: `"Hanko"@fi` -> `Hanko`, `"1940-02-01"^^xsd:date` -> `1940-02-01`,
/// `<http://x>` -> `http://x`. Anything else is returned trimmed.
pub fn plain_value(raw: &str) -> &str {
	let raw = raw.trim();

	if let Some(inner) = raw.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) {
		return inner;
	}
	if let Some(rest) = raw.strip_prefix('"')
		&& let Some(end) = rest.rfind('"')
	{
		return &rest[..end];
	}

	raw
}

/// Distinct mention strings across a candidate set.
pub fn distinct_mentions(candidates: &[Candidate]) -> BTreeSet<&str> {
	candidates.iter().flat_map(|candidate| candidate.matches.iter().map(String::as_str)).collect()
}
