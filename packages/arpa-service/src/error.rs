pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid query: {message}")]
	InvalidQuery { message: String },
	#[error("Service error: {message}")]
	Service { message: String },
	#[error("Validation error: {message}")]
	Validation { message: String },
	#[error("Invalid pattern {pattern}: {message}")]
	InvalidPattern { pattern: String, message: String },
	#[error(transparent)]
	Config(#[from] arpa_config::Error),
	#[error(transparent)]
	Storage(#[from] arpa_storage::Error),
}
impl From<arpa_providers::Error> for Error {
	fn from(err: arpa_providers::Error) -> Self {
		match err {
			arpa_providers::Error::InvalidQuery { message } => Self::InvalidQuery { message },
			other => Self::Service { message: other.to_string() },
		}
	}
}

impl From<arpa_domain::Error> for Error {
	fn from(err: arpa_domain::Error) -> Self {
		match err {
			arpa_domain::Error::InvalidQuery { message } => Self::InvalidQuery { message },
			arpa_domain::Error::InvalidPattern { pattern, message } =>
				Self::InvalidPattern { pattern, message },
			other => Self::Validation { message: other.to_string() },
		}
	}
}
