pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{message}")]
	InvalidQuery { message: String },
	#[error("Invalid date {value:?}.")]
	InvalidDate { value: String },
	#[error("Invalid pattern {pattern:?}: {message}")]
	InvalidPattern { pattern: String, message: String },
}
