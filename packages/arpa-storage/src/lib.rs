pub mod file;
pub mod graph;

mod error;

pub use error::Error;
pub use graph::{MemoryGraph, RDF_TYPE, Term, Triple, TripleStore};

pub type Result<T, E = Error> = std::result::Result<T, E>;
