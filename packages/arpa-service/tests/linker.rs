use std::{collections::HashMap, time::Duration};

use serde_json::{Value, json};
use time::macros::date;

use arpa_config::{
	DCT_CREATED, Dataset, DuplicatePolicy, Linking, RetryPolicy, SKOS_PREF_LABEL, Scoring,
	ScoringWeights,
};
use arpa_domain::{Candidate, ResultFilter, ScoringEngine, Validator};
use arpa_providers::ArpaClient;
use arpa_service::{Error, Linker};
use arpa_storage::{MemoryGraph, Term, TripleStore};
use arpa_testkit::{MockMatchingService, MockResponse, StatusCode};

const TARGET: &str = "http://ldf.fi/schema/warsa/places";
const PHOTO_1: &str = "http://ldf.fi/warsa/photographs/sakuva_1";
const PHOTO_2: &str = "http://ldf.fi/warsa/photographs/sakuva_2";
const PHOTO_3: &str = "http://ldf.fi/warsa/photographs/sakuva_3";

struct KeepLabel(&'static str);
impl Validator for KeepLabel {
	fn validate(
		&self,
		candidates: Vec<Candidate>,
		_: &str,
		_: &str,
	) -> arpa_domain::Result<Vec<Candidate>> {
		Ok(candidates.into_iter().filter(|candidate| candidate.label == self.0).collect())
	}
}

fn linking(candidates_only: bool) -> Linking {
	Linking {
		source_predicate: SKOS_PREF_LABEL.to_string(),
		target_predicate: TARGET.to_string(),
		record_type: None,
		candidates_only,
		new_graph: false,
	}
}

fn client(url: &str) -> ArpaClient {
	ArpaClient::new(url, Duration::from_secs(5), RetryPolicy::none())
		.expect("Failed to build ARPA client.")
}

fn filter(min_ngram: usize) -> ResultFilter {
	ResultFilter::new(Vec::<String>::new(), min_ngram, DuplicatePolicy::Disabled)
}

fn place(id: &str, label: &str, ngram: &str, kind: &str) -> Value {
	json!({
		"id": id,
		"label": label,
		"matches": [ngram],
		"properties": {
			"ngram": [format!("\"{ngram}\"")],
			"type": [format!("<http://ldf.fi/warsa/places/place_types/{kind}>")]
		}
	})
}

fn hanko_results() -> Value {
	json!({
		"results": [
			place("http://ldf.fi/warsa/places/kunta_1", "Hanko", "Hanko", "kunta"),
			place("http://ldf.fi/warsa/places/kunta_2", "Hanko", "Hanko", "kunta"),
			place("http://ldf.fi/warsa/places/pnr_1", "Hanko Hanko", "Hanko Hanko", "pnr-other"),
		]
	})
}

fn records(texts: &[(&str, &str)]) -> MemoryGraph {
	let mut graph = MemoryGraph::new();

	for (subject, text) in texts {
		graph.insert(subject, SKOS_PREF_LABEL, Term::literal(*text));
	}

	graph
}

#[tokio::test]
async fn only_the_two_word_mention_survives_min_ngram() {
	let mock =
		MockMatchingService::json(hanko_results()).await.expect("Failed to start mock service.");
	let client = client(mock.url());
	let linker = Linker::new(&client, linking(false), filter(2));
	let input = records(&[(PHOTO_1, "Hanko Hanko")]);
	let mut output = MemoryGraph::new();
	let report = linker.arpafy(&input, &mut output, None).await;

	assert_eq!(report.processed, 1);
	assert_eq!(report.matches, 1);
	assert_eq!(report.subjects_matched, 1);
	assert!(report.errors.is_empty());
	assert_eq!(
		output.objects(PHOTO_1, TARGET),
		vec![Term::iri("http://ldf.fi/warsa/places/pnr_1")]
	);
}

#[tokio::test]
async fn failing_records_do_not_stop_the_run() {
	let mock = MockMatchingService::start(|_, request| match request.field("text") {
		Some("Kuolleet") => MockResponse::Status(StatusCode::SERVICE_UNAVAILABLE),
		_ => MockResponse::Json(hanko_results()),
	})
	.await
	.expect("Failed to start mock service.");
	let client = client(mock.url());
	let linker = Linker::new(&client, linking(false), filter(1));
	let input = records(&[(PHOTO_1, "Hanko"), (PHOTO_2, "Kuolleet"), (PHOTO_3, "\"()\"")]);
	let mut output = MemoryGraph::new();
	let report = linker.arpafy(&input, &mut output, None).await;

	assert_eq!(report.processed, 3);
	assert_eq!(report.matches, 3);
	assert_eq!(report.subjects_matched, 1);
	assert_eq!(report.errors.len(), 2);
	assert_eq!(mock.request_count(), 2);

	let errors: HashMap<&str, &Error> =
		report.errors.iter().map(|failure| (failure.subject.as_str(), &failure.error)).collect();

	assert!(matches!(errors[PHOTO_2], Error::Service { .. }));
	assert!(matches!(errors[PHOTO_3], Error::InvalidQuery { .. }));
}

#[tokio::test]
async fn preprocessed_text_is_sent_and_empty_text_is_skipped() {
	let mock = MockMatchingService::json(json!({ "results": [] }))
		.await
		.expect("Failed to start mock service.");
	let client = client(mock.url());
	let preprocessor = |text: &str, subject: &str, _: &dyn TripleStore| {
		if subject == PHOTO_2 { String::new() } else { text.replace("Hangon", "Hanko") }
	};
	let linker = Linker::new(&client, linking(false), filter(1)).with_preprocessor(&preprocessor);
	let input = records(&[(PHOTO_1, "Hangon satama"), (PHOTO_2, "Hanko")]);
	let mut output = MemoryGraph::new();
	let report = linker.arpafy(&input, &mut output, None).await;

	assert_eq!(report.processed, 2);
	assert_eq!(report.matches, 0);
	assert!(report.errors.is_empty());
	assert_eq!(mock.field_values("text"), vec!["Hanko satama".to_string()]);
	assert!(output.is_empty());
}

#[tokio::test]
async fn candidate_mode_writes_ngram_literals() {
	let mock = MockMatchingService::json(json!({
		"results": { "Hanko": ["Hanko"], "Hanko Hanko": ["Hanko Hanko"] }
	}))
	.await
	.expect("Failed to start mock service.");
	let client = client(mock.url());
	let linker = Linker::new(&client, linking(true), filter(2));
	let input = records(&[(PHOTO_1, "Hanko Hanko")]);
	let mut output = MemoryGraph::new();
	let report = linker.arpafy(&input, &mut output, None).await;

	assert_eq!(report.matches, 1);
	assert_eq!(output.objects(PHOTO_1, TARGET), vec![Term::literal("Hanko Hanko")]);
	assert_eq!(mock.requests()[0].query.as_deref(), Some("cgen"));
}

#[tokio::test]
async fn validation_narrows_the_links_and_counts_mentions() {
	let mock =
		MockMatchingService::json(hanko_results()).await.expect("Failed to start mock service.");
	let client = client(mock.url());
	let linker = Linker::new(&client, linking(false), filter(1));
	let input = records(&[(PHOTO_1, "Hanko Hanko")]);
	let mut output = MemoryGraph::new();
	let validator = KeepLabel("Hanko Hanko");
	let report = linker.arpafy(&input, &mut output, Some(&validator)).await;

	assert_eq!(report.matches, 1);
	assert_eq!(report.pre_validation_mentions, 2);
	assert_eq!(report.post_validation_mentions, 1);
}

#[tokio::test]
async fn scoring_keeps_the_person_consistent_with_the_text() {
	let general = json!({
		"id": "http://ldf.fi/warsa/actors/person_general",
		"label": "Aarne Snellman",
		"matches": ["A. Snellman", "kenraalimajuri A. Snellman"],
		"properties": {
			"ngram": ["\"kenraalimajuri A. Snellman\""],
			"rank": ["\"Kenraalimajuri\""],
			"hierarchy": ["\"Kenraalikunta\""],
			"promotion_date": ["\"1941-06-01\"^^xsd:date"]
		}
	});
	let lieutenant = json!({
		"id": "http://ldf.fi/warsa/actors/person_lieutenant",
		"label": "Arvo Snellman",
		"matches": ["A. Snellman"],
		"properties": {
			"ngram": ["\"A. Snellman\""],
			"rank": ["\"Luutnantti\""],
			"hierarchy": ["\"Komppaniaupseeri\""],
			"promotion_date": ["\"1940-01-01\"^^xsd:date"]
		}
	});
	let mock = MockMatchingService::json(json!({ "results": [lieutenant, general] }))
		.await
		.expect("Failed to start mock service.");
	let client = client(mock.url());
	let linker = Linker::new(&client, linking(false), filter(1));
	let mut input = records(&[(PHOTO_1, "kenraalimajuri A. Snellman")]);

	input.insert(PHOTO_1, DCT_CREATED, Term::literal("1942-06-04"));

	let scoring = Scoring {
		dataset: Dataset::Photo,
		label_predicate: SKOS_PREF_LABEL.to_string(),
		date_predicate: None,
		unit_predicate: None,
		pinned: None,
		honorific: None,
		war_start: date!(1939 - 01 - 01),
		historical_cutoff: date!(1946 - 01 - 01),
		source_weights: HashMap::new(),
		rank_class_scores: None,
		rank_levels: None,
		weights: ScoringWeights::default(),
	};
	let engine = ScoringEngine::new(&input, &scoring).expect("Failed to build scoring engine.");
	let mut output = MemoryGraph::new();
	let report = linker.arpafy(&input, &mut output, Some(&engine)).await;

	assert!(report.errors.is_empty());
	assert_eq!(
		output.objects(PHOTO_1, TARGET),
		vec![Term::iri("http://ldf.fi/warsa/actors/person_general")]
	);
}
