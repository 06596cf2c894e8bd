#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read triples from {path:?}.")]
	Read { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to write triples to {path:?}.")]
	Write { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to parse triples in {path:?}.")]
	Parse { path: std::path::PathBuf, source: serde_json::Error },
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
}
