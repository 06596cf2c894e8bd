use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use arpa_config::RetryPolicy;
use arpa_domain::{Candidate, QueryResults};

use crate::{Error, Result};

/// What an ARPA query asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryMode {
	/// Resolved entities with their matched mentions and properties.
	#[default]
	Matches,
	/// Only the n-grams the service would look up.
	Candidates,
}

/// Client for an ARPA matching service.
#[derive(Debug, Clone)]
pub struct ArpaClient {
	client: Client,
	url: String,
	retry: RetryPolicy,
}
impl ArpaClient {
	pub fn new(url: impl Into<String>, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
		Ok(Self { client: crate::build_client(timeout)?, url: url.into(), retry })
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	pub async fn query(&self, text: &str, mode: QueryMode) -> Result<QueryResults> {
		let text = crate::checked_query(text)?;
		let url = match mode {
			QueryMode::Matches => self.url.clone(),
			QueryMode::Candidates => format!("{}?cgen", self.url),
		};

		tracing::debug!(url = %url, text = %text, ?mode, "Querying ARPA.");

		crate::post_form(&self.client, &url, &[("text", text.as_str())], &self.retry, |json| {
			parse_results(json, mode)
		})
		.await
	}
}

fn parse_results(json: Value, mode: QueryMode) -> Result<QueryResults> {
	let Value::Object(mut body) = json else {
		return Err(Error::InvalidResponse {
			message: "ARPA response must be a JSON object.".to_string(),
		});
	};
	let Some(results) = body.remove("results") else {
		return Ok(match mode {
			QueryMode::Matches => QueryResults::Matches(Vec::new()),
			QueryMode::Candidates => QueryResults::Candidates(Vec::new()),
		});
	};

	match mode {
		QueryMode::Matches => {
			let candidates: Vec<Candidate> = serde_json::from_value(results)?;

			Ok(QueryResults::Matches(candidates))
		},
		QueryMode::Candidates => match results {
			Value::Object(ngrams) =>
				Ok(QueryResults::Candidates(ngrams.into_iter().map(|(ngram, _)| ngram).collect())),
			Value::Array(items) if items.is_empty() => Ok(QueryResults::Candidates(Vec::new())),
			_ => Err(Error::InvalidResponse {
				message: "ARPA candidate results must map n-grams to their forms.".to_string(),
			}),
		},
	}
}
