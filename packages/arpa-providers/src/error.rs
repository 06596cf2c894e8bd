pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{message}")]
	InvalidQuery { message: String },
	#[error("Request to {url} failed with payload {payload}: {message}")]
	Service { url: String, payload: String, message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
}
