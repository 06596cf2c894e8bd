use std::time::Duration;

use reqwest::Client;
use serde_json::{Map, Value};

use arpa_config::{RetryPolicy, VALUES_PLACEHOLDER};
use arpa_domain::{Candidate, QueryResults};

use crate::{Error, QueryMode, Result};

/// Answers ARPA-style queries from a SPARQL endpoint.
///
/// The query text replaces the `<VALUES>` placeholder of the template, and the result rows are
/// folded into the candidate shape the ARPA service returns.
#[derive(Debug, Clone)]
pub struct SparqlMimic {
	client: Client,
	url: String,
	template: String,
	retry: RetryPolicy,
}
impl SparqlMimic {
	pub fn new(
		url: impl Into<String>,
		template: impl Into<String>,
		timeout: Duration,
		retry: RetryPolicy,
	) -> Result<Self> {
		let template = template.into();

		if !template.contains(VALUES_PLACEHOLDER) {
			return Err(Error::InvalidQuery {
				message: format!("SPARQL query template must contain {VALUES_PLACEHOLDER}."),
			});
		}

		Ok(Self { client: crate::build_client(timeout)?, url: url.into(), template, retry })
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	pub async fn query(&self, text: &str, mode: QueryMode) -> Result<QueryResults> {
		if mode == QueryMode::Candidates {
			return Err(Error::InvalidQuery {
				message: "SPARQL endpoints cannot generate candidates.".to_string(),
			});
		}

		// Quotes are kept: the text is usually a list of SPARQL literals.
		let text = text.trim();

		if text.is_empty() {
			return Err(Error::InvalidQuery { message: "Query text must be non-empty.".to_string() });
		}

		let query = self.template.replace(VALUES_PLACEHOLDER, text);

		tracing::debug!(url = %self.url, text = %text, "Querying SPARQL endpoint.");

		let candidates = crate::post_form(
			&self.client,
			&self.url,
			&[("query", query.as_str())],
			&self.retry,
			|json| fold_bindings(&json),
		)
		.await?;

		Ok(QueryResults::Matches(candidates))
	}
}

/// Folds SPARQL JSON result rows into candidates.
///
/// Rows sharing an `id` become one candidate: the first row supplies the label, `ngram`
/// values accumulate into the mentions, and every variable accumulates into the properties in
/// RDF-term notation.
pub fn fold_bindings(json: &Value) -> Result<Vec<Candidate>> {
	let rows = json
		.pointer("/results/bindings")
		.and_then(Value::as_array)
		.ok_or_else(|| Error::InvalidResponse {
			message: "SPARQL response is missing results.bindings.".to_string(),
		})?;
	let mut candidates: Vec<Candidate> = Vec::new();

	for row in rows {
		let Some(row) = row.as_object() else {
			return Err(Error::InvalidResponse {
				message: "SPARQL result rows must be objects.".to_string(),
			});
		};
		let Some(id) = raw_value(row, "id") else {
			tracing::warn!(?row, "Skipping SPARQL result row without an id.");

			continue;
		};
		let position = match candidates.iter().position(|candidate| candidate.id == id) {
			Some(position) => position,
			None => {
				candidates.push(Candidate::new(id, raw_value(row, "label").unwrap_or_default()));

				candidates.len() - 1
			},
		};
		let candidate = &mut candidates[position];

		if let Some(ngram) = raw_value(row, "ngram") {
			candidate.add_match(ngram);
		}

		for (name, term) in row {
			candidate.properties.entry(name.clone()).or_default().push(render_term(term));
		}
	}

	Ok(candidates)
}

fn raw_value<'a>(row: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
	row.get(name).and_then(|term| term.get("value")).and_then(Value::as_str)
}

fn render_term(term: &Value) -> String {
	let value = term.get("value").and_then(Value::as_str).unwrap_or_default();

	match term.get("type").and_then(Value::as_str) {
		Some("literal" | "typed-literal") => match term.get("datatype").and_then(Value::as_str) {
			Some(datatype) => format!("\"{value}\"^^{datatype}"),
			None => format!("\"{value}\""),
		},
		Some("uri") => format!("<{value}>"),
		_ => value.to_string(),
	}
}
