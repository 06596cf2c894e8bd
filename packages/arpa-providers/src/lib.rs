pub mod arpa;
pub mod sparql;

mod error;

pub use arpa::{ArpaClient, QueryMode};
pub use error::{Error, Result};
pub use sparql::{SparqlMimic, fold_bindings};

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use arpa_config::RetryPolicy;

/// Strips double quotes and parentheses, which the matching services reject, and trims.
pub fn normalize_query(text: &str) -> String {
	text.chars().filter(|c| !matches!(c, '"' | '(' | ')')).collect::<String>().trim().to_string()
}

pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
	Ok(Client::builder().timeout(timeout).build()?)
}

/// Normalizes `text`, rejecting input that ends up empty before anything is sent.
pub(crate) fn checked_query(text: &str) -> Result<String> {
	let normalized = normalize_query(text);

	if normalized.is_empty() {
		return Err(Error::InvalidQuery {
			message: format!("Query text must be non-empty after normalization, got {text:?}."),
		});
	}

	Ok(normalized)
}

/// Posts `form` to `url` and parses the JSON reply with `parse`, retrying transport errors,
/// error statuses and unparseable replies according to `retry`.
pub(crate) async fn post_form<T, F>(
	client: &Client,
	url: &str,
	form: &[(&str, &str)],
	retry: &RetryPolicy,
	parse: F,
) -> Result<T>
where
	F: Fn(Value) -> Result<T>,
{
	let attempts = retry.attempts();
	let mut last_error = String::new();

	for attempt in 1..=attempts {
		tracing::debug!(url, attempt, ?form, "Sending matching request.");

		match send(client, url, form).await.and_then(&parse) {
			Ok(parsed) => return Ok(parsed),
			Err(err) => {
				last_error = err.to_string();

				if attempt < attempts {
					tracing::warn!(
						url,
						attempt,
						error = %err,
						wait_ms = retry.wait().as_millis() as u64,
						"Matching request failed. Retrying."
					);
					tokio::time::sleep(retry.wait()).await;
				} else if retry.retries() > 0 {
					tracing::warn!(url, attempt, error = %err, "Matching request failed. Out of retries.");
				}
			},
		}
	}

	Err(Error::Service { url: url.to_string(), payload: format!("{form:?}"), message: last_error })
}

async fn send(client: &Client, url: &str, form: &[(&str, &str)]) -> Result<Value> {
	let res = client.post(url).form(form).send().await?;
	let body = res.error_for_status()?.text().await?;

	Ok(serde_json::from_str(&body)?)
}
