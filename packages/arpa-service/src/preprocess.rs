use regex::Regex;

use arpa_config::Preprocess;
use arpa_storage::TripleStore;

use crate::{Error, Preprocessor, Result};

/// Configurable text normalizer: drops double quotes, applies regex replacements in order and
/// collapses whitespace.
#[derive(Debug, Clone, Default)]
pub struct PatternPreprocessor {
	replacements: Vec<(Regex, String)>,
}
impl PatternPreprocessor {
	pub fn new<I, P, R>(replacements: I) -> Result<Self>
	where
		I: IntoIterator<Item = (P, R)>,
		P: AsRef<str>,
		R: Into<String>,
	{
		let replacements = replacements
			.into_iter()
			.map(|(pattern, replacement)| {
				let pattern = pattern.as_ref();
				let regex = Regex::new(pattern).map_err(|err| Error::InvalidPattern {
					pattern: pattern.to_string(),
					message: err.to_string(),
				})?;

				Ok((regex, replacement.into()))
			})
			.collect::<Result<Vec<_>>>()?;

		Ok(Self { replacements })
	}

	pub fn from_config(cfg: &Preprocess) -> Result<Self> {
		Self::new(cfg.replacements.iter().map(|r| (r.pattern.as_str(), r.replacement.as_str())))
	}

	pub fn apply(&self, text: &str) -> String {
		let mut text = text.replace('"', "");

		for (pattern, replacement) in &self.replacements {
			text = pattern.replace_all(&text, replacement.as_str()).into_owned();
		}

		text.split_whitespace().collect::<Vec<_>>().join(" ")
	}
}
impl Preprocessor for PatternPreprocessor {
	fn preprocess(&self, text: &str, subject: &str, _: &dyn TripleStore) -> String {
		let processed = self.apply(text);

		tracing::debug!(subject, original = text, processed = %processed, "Preprocessed text.");

		processed
	}
}
