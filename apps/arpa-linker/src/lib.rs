use std::{fs::OpenOptions, path::PathBuf, sync::Mutex, time::Duration};

use clap::{Parser, Subcommand};
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use arpa_config::{Config, Linking, RetryPolicy, Service};
use arpa_domain::{NamePruner, ResultFilter, ScoringEngine, Validator};
use arpa_providers::{ArpaClient, SparqlMimic};
use arpa_service::{
	GraphJob, LinkStage, Linker, MatchingClient, PatternPreprocessor, ProcessOutcome, Pruner,
	process_graph,
};
use arpa_storage::{MemoryGraph, TripleStore};

#[derive(Debug, Parser)]
#[command(
	version = arpa_cli::VERSION,
	rename_all = "kebab",
	styles = arpa_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// JSON triple file to read records from.
	#[arg(long, short = 'i', value_name = "FILE")]
	pub input: PathBuf,
	/// JSON triple file to write the resulting graph to.
	#[arg(long, short = 'o', value_name = "FILE")]
	pub output: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Query the matching service for every record and write the links.
	Link(LinkArgs),
	/// Keep only name-shaped candidate literals.
	Prune(StageArgs),
	/// Join each record's candidate literals into one quoted query string.
	Join(StageArgs),
}

#[derive(Debug, clap::Args)]
pub struct LinkArgs {
	/// Prune candidates before linking.
	#[arg(long)]
	pub prune: bool,
	/// Join candidates before linking.
	#[arg(long)]
	pub join: bool,
	/// Write candidate n-grams instead of matched resources.
	#[arg(long)]
	pub candidates_only: bool,
	#[command(flatten)]
	pub stage: StageArgs,
}

#[derive(Debug, Clone, Copy, clap::Args)]
pub struct StageArgs {
	/// Write only the produced triples instead of the input plus them.
	#[arg(long)]
	pub new_graph: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = arpa_config::load(&args.config)?;

	init_tracing(&config.service)?;

	let input = arpa_storage::file::load(&args.input)?;
	let outcome = process(&config, &args.command, &input).await?;

	arpa_storage::file::save(&outcome.graph, &args.output)?;

	if let Some(kept) = outcome.kept_candidates {
		tracing::info!(kept, "Pruned candidates.");
	}
	if let Some(subjects) = outcome.combined_subjects {
		tracing::info!(subjects, "Joined candidates.");
	}
	if let Some(report) = outcome.report.as_ref() {
		for failure in &report.errors {
			tracing::warn!(
				subject = %failure.subject,
				error = %failure.error,
				"Record was not linked."
			);
		}
	}

	tracing::info!(
		output = %args.output.display(),
		triples = outcome.graph.len(),
		"Wrote output graph."
	);

	Ok(())
}

/// Runs `command` over `input` with the collaborators described by `config`.
pub async fn process(
	config: &Config,
	command: &Command,
	input: &MemoryGraph,
) -> color_eyre::Result<ProcessOutcome> {
	let linking = linking_for(&config.linking, command);
	let pruner = NamePruner::new()?;
	let prune = |candidate: &str| pruner.prune(candidate);
	let mut job = GraphJob::new(&linking);

	let link = match command {
		Command::Link(args) => {
			job.join = args.join;

			if args.prune {
				job.prune = Some(&prune as &dyn Pruner);
			}

			true
		},
		Command::Prune(_) => {
			job.prune = Some(&prune as &dyn Pruner);

			false
		},
		Command::Join(_) => {
			job.join = true;

			false
		},
	};

	if !link {
		return Ok(process_graph(input, job).await);
	}

	let client = build_client(config, &linking)?;
	let filter = ResultFilter::from_config(&config.filter);
	let preprocessor =
		config.preprocess.as_ref().map(PatternPreprocessor::from_config).transpose()?;
	let engine =
		config.scoring.as_ref().map(|scoring| ScoringEngine::new(input, scoring)).transpose()?;
	let mut linker = Linker::new(client.as_ref(), linking.clone(), filter);

	if let Some(preprocessor) = preprocessor.as_ref() {
		linker = linker.with_preprocessor(preprocessor);
	}

	job.link = Some(LinkStage {
		linker: &linker,
		validator: engine.as_ref().map(|engine| engine as &dyn Validator),
	});

	Ok(process_graph(input, job).await)
}

fn linking_for(linking: &Linking, command: &Command) -> Linking {
	let mut linking = linking.clone();
	let stage = match command {
		Command::Link(args) => {
			linking.candidates_only |= args.candidates_only;

			args.stage
		},
		Command::Prune(stage) | Command::Join(stage) => *stage,
	};

	linking.new_graph |= stage.new_graph;

	linking
}

fn build_client(
	config: &Config,
	linking: &Linking,
) -> color_eyre::Result<Box<dyn MatchingClient>> {
	let timeout = Duration::from_millis(config.service.timeout_ms);
	let retry = RetryPolicy::new(config.service.retries, config.service.wait_seconds)?;

	match config.sparql.as_ref() {
		Some(_) if linking.candidates_only => Err(eyre::eyre!(
			"Candidate generation is not supported by a SPARQL endpoint."
		)),
		Some(sparql) => Ok(Box::new(SparqlMimic::new(
			&config.service.url,
			&sparql.query_template,
			timeout,
			retry,
		)?)),
		None => Ok(Box::new(ArpaClient::new(&config.service.url, timeout, retry)?)),
	}
}

fn init_tracing(service: &Service) -> color_eyre::Result<()> {
	let filter = EnvFilter::try_new(&service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	match service.log_file.as_ref() {
		Some(path) => {
			let file = OpenOptions::new().create(true).append(true).open(path)?;

			tracing_subscriber::fmt()
				.with_env_filter(filter)
				.with_ansi(false)
				.with_writer(Mutex::new(file))
				.init();
		},
		None => {
			tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
		},
	}

	Ok(())
}
