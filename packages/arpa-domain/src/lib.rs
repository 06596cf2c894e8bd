pub mod candidate;
pub mod context;
pub mod date;
pub mod disambiguation;
pub mod filter;
pub mod prune;
pub mod ranks;
pub mod scoring;

mod error;

pub use candidate::{Candidate, QueryResults, distinct_mentions, plain_value};
pub use context::{RankedMatch, RecordFacts, ScoringContext};
pub use date::parse_date;
pub use disambiguation::choose_best;
pub use error::{Error, Result};
pub use filter::ResultFilter;
pub use prune::NamePruner;
pub use ranks::RankTable;
pub use scoring::ScoringEngine;

/// Decides which of a record's candidates are kept.
pub trait Validator {
	fn validate(
		&self,
		candidates: Vec<Candidate>,
		query_text: &str,
		subject: &str,
	) -> Result<Vec<Candidate>>;
}
