use arpa_config::Linking;
use arpa_domain::{QueryResults, ResultFilter, Validator, distinct_mentions};
use arpa_providers::QueryMode;
use arpa_storage::{Term, Triple, TripleStore};

use crate::{Error, MatchingClient, Preprocessor, Result};

/// A record whose query failed; the run continues without it.
#[derive(Debug)]
pub struct RecordError {
	pub subject: String,
	pub error: Error,
}

#[derive(Debug, Default)]
pub struct LinkReport {
	/// Source triples selected for linking.
	pub processed: usize,
	/// Links written.
	pub matches: usize,
	pub subjects_matched: usize,
	/// Distinct mentions that had candidates before validation, summed over records.
	pub pre_validation_mentions: usize,
	/// Distinct mentions of the accepted candidates, summed over records.
	pub post_validation_mentions: usize,
	pub errors: Vec<RecordError>,
}

struct RecordLinks {
	objects: Vec<Term>,
	pre_validation_mentions: usize,
	post_validation_mentions: usize,
}

/// Links the records of a store to the entities a matching service finds in their text.
pub struct Linker<'a> {
	client: &'a dyn MatchingClient,
	filter: ResultFilter,
	linking: Linking,
	preprocessor: Option<&'a dyn Preprocessor>,
}
impl<'a> Linker<'a> {
	pub fn new(client: &'a dyn MatchingClient, linking: Linking, filter: ResultFilter) -> Self {
		Self { client, filter, linking, preprocessor: None }
	}

	pub fn with_preprocessor(mut self, preprocessor: &'a dyn Preprocessor) -> Self {
		self.preprocessor = Some(preprocessor);

		self
	}

	pub fn linking(&self) -> &Linking {
		&self.linking
	}

	fn mode(&self) -> QueryMode {
		if self.linking.candidates_only { QueryMode::Candidates } else { QueryMode::Matches }
	}

	/// Queries every selected record of `input` and adds
	/// `(subject, target_predicate, match)` to `output`.
	///
	/// Matches are written as IRIs; in candidate mode the n-grams are written as literals.
	/// Failures are collected per record and never abort the run.
	pub async fn arpafy(
		&self,
		input: &dyn TripleStore,
		output: &mut dyn TripleStore,
		validator: Option<&dyn Validator>,
	) -> LinkReport {
		let records = crate::record_objects(
			input,
			&self.linking.source_predicate,
			self.linking.record_type.as_deref(),
		);
		let mut report = LinkReport { processed: records.len(), ..Default::default() };

		for (subject, object) in records {
			let text = match self.preprocessor {
				Some(preprocessor) => {
					let text = preprocessor.preprocess(object.as_str(), &subject, input);

					if text.trim().is_empty() {
						tracing::debug!(subject = %subject, "Preprocessor suppressed the query.");

						continue;
					}

					text
				},
				None => object.as_str().to_string(),
			};

			match self.link_record(&subject, &text, validator).await {
				Ok(links) => {
					report.pre_validation_mentions += links.pre_validation_mentions;

					if links.objects.is_empty() {
						tracing::info!(subject = %subject, text = %text, "No matches found.");

						continue;
					}

					report.subjects_matched += 1;
					report.post_validation_mentions += links.post_validation_mentions;

					for object in links.objects {
						report.matches += 1;

						output.add(Triple::new(&subject, &self.linking.target_predicate, object));
					}
				},
				Err(err) => {
					tracing::error!(
						subject = %subject,
						text = %text,
						error = %err,
						"Failed to link record."
					);

					report.errors.push(RecordError { subject, error: err });
				},
			}
		}

		tracing::info!(
			processed = report.processed,
			matches = report.matches,
			subjects_matched = report.subjects_matched,
			mentions = report.post_validation_mentions,
			total_mentions = report.pre_validation_mentions,
			errors = report.errors.len(),
			"Linking finished."
		);

		report
	}

	async fn link_record(
		&self,
		subject: &str,
		text: &str,
		validator: Option<&dyn Validator>,
	) -> Result<RecordLinks> {
		let results = self.filter.filter(self.client.query(text, self.mode()).await?);

		match results {
			QueryResults::Candidates(ngrams) => Ok(RecordLinks {
				objects: ngrams.into_iter().map(Term::literal).collect(),
				pre_validation_mentions: 0,
				post_validation_mentions: 0,
			}),
			QueryResults::Matches(candidates) => {
				let mut pre_validation_mentions = 0;
				let candidates = match validator {
					Some(validator) if !candidates.is_empty() => {
						let mentions = distinct_mentions(&candidates);

						pre_validation_mentions = mentions.len();

						tracing::info!(
							subject,
							mentions = ?mentions,
							"Distinct mentions before validation."
						);

						validator.validate(candidates, text, subject)?
					},
					_ => candidates,
				};
				let mentions = distinct_mentions(&candidates);

				if !candidates.is_empty() {
					tracing::info!(subject, mentions = ?mentions, "Found matches.");
				}

				Ok(RecordLinks {
					objects: candidates.iter().map(|candidate| Term::iri(&candidate.id)).collect(),
					pre_validation_mentions,
					post_validation_mentions: mentions.len(),
				})
			},
		}
	}
}
