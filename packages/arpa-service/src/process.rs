use std::time::Instant;

use arpa_config::Linking;
use arpa_domain::Validator;
use arpa_storage::{MemoryGraph, RDF_TYPE, Term, Triple, TripleStore};

use crate::{LinkReport, Linker, Pruner};

pub struct LinkStage<'a> {
	pub linker: &'a Linker<'a>,
	pub validator: Option<&'a dyn Validator>,
}

/// Which stages to run over a graph, and where their output goes.
pub struct GraphJob<'a> {
	pub source_predicate: &'a str,
	pub record_type: Option<&'a str>,
	/// Write into an empty graph instead of a copy of the input.
	pub new_graph: bool,
	pub prune: Option<&'a dyn Pruner>,
	pub join: bool,
	pub link: Option<LinkStage<'a>>,
}
impl<'a> GraphJob<'a> {
	pub fn new(linking: &'a Linking) -> Self {
		Self {
			source_predicate: &linking.source_predicate,
			record_type: linking.record_type.as_deref(),
			new_graph: linking.new_graph,
			prune: None,
			join: false,
			link: None,
		}
	}
}

#[derive(Debug)]
pub struct ProcessOutcome {
	pub graph: MemoryGraph,
	/// Candidates left after pruning, when pruning ran.
	pub kept_candidates: Option<usize>,
	/// Subjects whose candidates were joined, when joining ran.
	pub combined_subjects: Option<usize>,
	pub report: Option<LinkReport>,
}

/// Runs prune, join and link, in that order, each on the previous stage's result.
///
/// The input is never modified. With `new_graph` the returned graph holds only what the stages
/// produced; otherwise it is the input plus their changes.
pub async fn process_graph(input: &MemoryGraph, job: GraphJob<'_>) -> ProcessOutcome {
	let started = Instant::now();
	let mut graph = if job.new_graph { MemoryGraph::new() } else { input.clone() };
	let rewrites = job.prune.is_some() || job.join;

	tracing::info!(new_graph = job.new_graph, "Begin processing.");

	if job.new_graph && rewrites {
		let records = crate::record_objects(input, job.source_predicate, job.record_type);

		// Typing is carried over so later stages select the same records.
		for (subject, object) in records {
			if let Some(class) = job.record_type {
				graph.add(Triple::new(&subject, RDF_TYPE, Term::iri(class)));
			}

			graph.add(Triple::new(subject, job.source_predicate, object));
		}
	}

	let kept_candidates = job.prune.map(|pruner| {
		crate::prune_candidates(&mut graph, job.source_predicate, pruner, job.record_type)
	});
	let combined_subjects = job
		.join
		.then(|| crate::combine_candidates(&mut graph, job.source_predicate, job.record_type));
	let report = match job.link {
		Some(stage) => {
			tracing::info!("Start linking.");

			let mut links = MemoryGraph::new();
			let source = if job.new_graph && !rewrites { input } else { &graph };
			let report = stage.linker.arpafy(source, &mut links, stage.validator).await;

			graph.merge(links);

			Some(report)
		},
		None => None,
	};

	tracing::info!(runtime_ms = started.elapsed().as_millis() as u64, "Processing complete.");

	ProcessOutcome { graph, kept_candidates, combined_subjects, report }
}
