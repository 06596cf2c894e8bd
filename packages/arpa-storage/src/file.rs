//! JSON triple files: an array of `{ "subject", "predicate", "object": { "iri" | "literal" } }`.

use std::{fs, path::Path};

use crate::{Error, MemoryGraph, Result, Triple, TripleStore};

pub fn load(path: &Path) -> Result<MemoryGraph> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::Read { path: path.to_path_buf(), source: err })?;
	let triples: Vec<Triple> = serde_json::from_str(&raw)
		.map_err(|err| Error::Parse { path: path.to_path_buf(), source: err })?;
	let graph: MemoryGraph = triples.into_iter().collect();

	tracing::debug!(path = %path.display(), triples = graph.len(), "Loaded triple file.");

	Ok(graph)
}

pub fn save(graph: &MemoryGraph, path: &Path) -> Result<()> {
	let triples: Vec<&Triple> = graph.iter().collect();
	let payload = serde_json::to_string_pretty(&triples)?;

	fs::write(path, payload).map_err(|err| Error::Write { path: path.to_path_buf(), source: err })?;

	tracing::debug!(path = %path.display(), triples = triples.len(), "Saved triple file.");

	Ok(())
}
