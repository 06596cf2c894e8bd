use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Cannot read linker config {path:?}: {source}")]
	ReadConfig { path: PathBuf, source: std::io::Error },
	#[error("Linker config {path:?} is not valid TOML: {source}")]
	ParseConfig { path: PathBuf, source: toml::de::Error },
	/// A setting is present but unusable, e.g. a negative retry count.
	#[error("Invalid linker config: {message}")]
	Validation { message: String },
}
