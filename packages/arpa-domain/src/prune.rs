use regex::Regex;

use crate::{Error, Result};

const NAME_CHARS: &str = "a-zA-ZäÄöÖåÅÜüáàéèíìóòúùýỳ-";

/// Keeps candidate strings shaped like personal names: given names or initials followed by a
/// capitalized surname.
#[derive(Debug, Clone)]
pub struct NamePruner {
	shape: Regex,
	exclude: Regex,
}
impl NamePruner {
	pub fn new() -> Result<Self> {
		let given = format!(r"(?:[a-zA-ZäÄåÅöÖ]\.[ ]*)|(?:[{NAME_CHARS}]{{3,}}[ ]+)");
		let second = format!(r"(?:-?[a-zA-ZäÄåÅöÖ]\.[ ]*)|(?:[{NAME_CHARS}]{{3,}}[ ]+)");
		let shape = format!(r"^(?:{given})(?:{second})?(?:{given})*[A-ZÄÖÅÜ][_{NAME_CHARS}]{{2,}}$");
		let exclude = r"(?:(?:\b[a-zäåö]+|\W+)$)|#";

		Ok(Self { shape: compile(&shape)?, exclude: compile(exclude)? })
	}

	pub fn prune(&self, candidate: &str) -> Option<String> {
		if self.shape.is_match(candidate) && !self.exclude.is_match(candidate) {
			return Some(candidate.to_string());
		}

		None
	}
}

fn compile(pattern: &str) -> Result<Regex> {
	Regex::new(pattern)
		.map_err(|err| Error::InvalidPattern { pattern: pattern.to_string(), message: err.to_string() })
}
