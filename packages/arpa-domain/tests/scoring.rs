use std::collections::HashMap;

use time::macros::date;

use arpa_config::{
	CRM_HAS_TIME_SPAN, DCT_CREATED, Dataset, Honorific, PinnedIdentity, SKOS_PREF_LABEL, Scoring,
	ScoringWeights,
};
use arpa_domain::{Candidate, Error, ScoringEngine, Validator};
use arpa_storage::{MemoryGraph, Term};

const PHOTO: &str = "http://ldf.fi/warsa/photographs/sakuva_1";
const UNIT: &str = "http://ldf.fi/warsa/photographs/unit";
const KNIGHTS: &str = "http://ldf.fi/warsa/sources/source5";
const WIKIPEDIA: &str = "http://ldf.fi/warsa/sources/source10";
const PINNED: &str = "http://ldf.fi/warsa/actors/person_1";

fn scoring(dataset: Dataset) -> Scoring {
	Scoring {
		dataset,
		label_predicate: SKOS_PREF_LABEL.to_string(),
		date_predicate: None,
		unit_predicate: Some(UNIT.to_string()),
		pinned: Some(PinnedIdentity { id: PINNED.to_string(), score: 50 }),
		honorific: Some(Honorific {
			pattern: "ritar[ie]".to_string(),
			source: format!("<{KNIGHTS}>"),
		}),
		war_start: date!(1939 - 01 - 01),
		historical_cutoff: date!(1946 - 01 - 01),
		source_weights: HashMap::from([(KNIGHTS.to_string(), 1), (WIKIPEDIA.to_string(), 1)]),
		rank_class_scores: None,
		rank_levels: None,
		weights: ScoringWeights::default(),
	}
}

fn photo(label: &str, created: Option<&str>) -> MemoryGraph {
	let mut graph = MemoryGraph::new();

	graph.insert(PHOTO, SKOS_PREF_LABEL, Term::literal(label));

	if let Some(created) = created {
		graph.insert(PHOTO, DCT_CREATED, Term::literal(created));
	}

	graph
}

fn person(id: &str, mentions: &[&str]) -> Candidate {
	mentions
		.iter()
		.fold(Candidate::new(id, id), |candidate, mention| candidate.with_match(*mention))
}

fn officer(id: &str, mentions: &[&str], rank: &str, class: &str, promoted: &str) -> Candidate {
	person(id, mentions)
		.with_property("rank", format!("\"{rank}\""))
		.with_property("hierarchy", format!("\"{class}\""))
		.with_property("promotion_date", format!("\"{promoted}\"^^xsd:date"))
}

#[test]
fn death_long_before_the_photo_is_penalized() {
	let cfg = scoring(Dataset::Photo);
	let graph = photo("Snellman", Some("1942-06-04"));
	let engine = ScoringEngine::new(&graph, &cfg).expect("Failed to build scoring engine.");
	let dead = person("dead", &["Snellman"]).with_property("death_date", "\"1942-01-01\"^^xsd:date");
	let recent = person("recent", &["Snellman"]).with_property("death_date", "\"1942-05-20\"");
	let broken = person("broken", &["Snellman"]).with_property("death_date", "\"unknown\"");
	let candidates = vec![dead.clone(), recent.clone(), broken.clone()];
	let ctx = engine.context(&candidates, "Snellman", PHOTO);

	assert_eq!(engine.date_term(&dead, &ctx), -30);
	assert_eq!(engine.date_term(&recent, &ctx), 0);
	assert_eq!(engine.date_term(&broken, &ctx), 0);
}

#[test]
fn longer_rank_mention_beats_contradicted_rank() {
	let cfg = scoring(Dataset::Photo);
	let graph = photo("kenraalimajuri A. Snellman", Some("1942-06-04"));
	let engine = ScoringEngine::new(&graph, &cfg).expect("Failed to build scoring engine.");
	let general = officer(
		"general",
		&["A. Snellman", "kenraalimajuri A. Snellman"],
		"Kenraalimajuri",
		"Kenraalikunta",
		"1941-06-01",
	);
	let lieutenant =
		officer("lieutenant", &["A. Snellman"], "Luutnantti", "Komppaniaupseeri", "1940-01-01");
	let candidates = vec![lieutenant.clone(), general.clone()];
	let ctx = engine.context(&candidates, "kenraalimajuri A. Snellman", PHOTO);

	assert_eq!(ctx.match_score("lieutenant"), -20);
	assert_eq!(ctx.match_score("general"), 0);
	assert_eq!(engine.rank_term(&general, &ctx), 21);
	assert_eq!(engine.rank_term(&lieutenant, &ctx), -10);

	let accepted = engine
		.validate(candidates, "kenraalimajuri A. Snellman", PHOTO)
		.expect("Failed to validate candidates.");

	assert_eq!(accepted.len(), 1);
	assert_eq!(accepted[0].id, "general");
	assert_eq!(accepted[0].score, Some(21));
}

#[test]
fn rank_before_an_initial_is_checked() {
	let cfg = scoring(Dataset::Photo);
	let text = "ja kapteeni A. Virtanen";
	let graph = photo(text, Some("1942-06-04"));
	let engine = ScoringEngine::new(&graph, &cfg).expect("Failed to build scoring engine.");
	let lieutenant =
		officer("lieutenant", &["Virtanen"], "Luutnantti", "Komppaniaupseeri", "1940-01-01");
	let captain = officer("captain", &["Virtanen"], "Kapteeni", "Komppaniaupseeri", "1941-02-01");
	let candidates = vec![lieutenant.clone(), captain.clone()];
	let ctx = engine.context(&candidates, text, PHOTO);

	assert_eq!(engine.rank_term(&lieutenant, &ctx), -10);
	assert_eq!(engine.rank_term(&captain, &ctx), 0);
}

#[test]
fn undated_records_use_wartime_ranks() {
	let cfg = scoring(Dataset::Photo);
	let graph = photo("kapteeni Virtanen", None);
	let engine = ScoringEngine::new(&graph, &cfg).expect("Failed to build scoring engine.");
	let captain =
		officer("captain", &["kapteeni Virtanen"], "Kapteeni", "Komppaniaupseeri", "1941-02-01");
	let postwar = officer("postwar", &["kapteeni Virtanen"], "Majuri", "Esiupseeri", "1950-01-01");
	let candidates = vec![captain.clone(), postwar.clone()];
	let ctx = engine.context(&candidates, "kapteeni Virtanen", PHOTO);

	assert_eq!(ctx.reference_date, None);
	assert_eq!(engine.rank_term(&captain, &ctx), 11);
	assert_eq!(engine.rank_term(&postwar, &ctx), -14);
}

#[test]
fn dated_records_penalize_ranks_not_held_at_the_time() {
	let cfg = scoring(Dataset::Photo);
	let graph = photo("kapteeni Virtanen", Some("1942-06-04"));
	let engine = ScoringEngine::new(&graph, &cfg).expect("Failed to build scoring engine.");
	let promoted_later =
		officer("later", &["kapteeni Virtanen"], "Luutnantti", "Komppaniaupseeri", "1940-01-01")
			.with_property("rank", "\"Kapteeni\"")
			.with_property("promotion_date", "\"1944-01-01\"^^xsd:date");
	let only_later =
		officer("only_later", &["kapteeni Virtanen"], "Kapteeni", "Komppaniaupseeri", "1944-01-01");
	let candidates = vec![promoted_later.clone(), only_later.clone()];
	let ctx = engine.context(&candidates, "kapteeni Virtanen", PHOTO);

	assert_eq!(ctx.reference_date, Some(date!(1942 - 06 - 04)));
	assert_eq!(engine.rank_term(&promoted_later, &ctx), -15);
	assert_eq!(engine.rank_term(&only_later, &ctx), -15);
}

#[test]
fn oversized_rank_windows_do_not_abort_validation() {
	let mut cfg = scoring(Dataset::Photo);

	cfg.weights.rank_window_days = 1_000_000_000_000_000;

	let graph = photo("kapteeni Virtanen", Some("1942-06-04"));
	let engine = ScoringEngine::new(&graph, &cfg).expect("Failed to build scoring engine.");
	let captain =
		officer("captain", &["kapteeni Virtanen"], "Kapteeni", "Komppaniaupseeri", "1941-02-01");
	let accepted = engine
		.validate(vec![captain], "kapteeni Virtanen", PHOTO)
		.expect("Failed to validate candidates.");

	assert_eq!(accepted.len(), 1);
	assert_eq!(accepted[0].score, Some(20));
}

#[test]
fn unknown_promotion_dates_earn_the_undated_bonus() {
	let cfg = scoring(Dataset::Photo);
	let graph = photo("kapteeni Virtanen", Some("1942-06-04"));
	let engine = ScoringEngine::new(&graph, &cfg).expect("Failed to build scoring engine.");
	let captain = officer("captain", &["kapteeni Virtanen"], "Kapteeni", "Komppaniaupseeri", "NA");
	let ctx = engine.context(std::slice::from_ref(&captain), "kapteeni Virtanen", PHOTO);

	assert_eq!(engine.rank_term(&captain, &ctx), 11);
}

#[test]
fn rankless_mentions_keep_the_class_base() {
	let cfg = scoring(Dataset::Photo);
	let graph = photo("Virtanen", Some("1942-06-04"));
	let engine = ScoringEngine::new(&graph, &cfg).expect("Failed to build scoring engine.");
	let private = officer("private", &["Virtanen"], "Sotamies", "Miehistö", "1940-01-01");
	let ctx = engine.context(std::slice::from_ref(&private), "Virtanen", PHOTO);

	assert_eq!(engine.rank_term(&private, &ctx), -7);
}

#[test]
fn given_names_and_initials_are_rewarded() {
	let cfg = scoring(Dataset::Photo);
	let graph = photo("", None);
	let engine = ScoringEngine::new(&graph, &cfg).expect("Failed to build scoring engine.");
	let with_names = |mention: &str| {
		person("p", &[mention]).with_property("first_names", "\"Aarne Henrik\"")
	};

	assert_eq!(engine.name_term(&with_names("A. H. Snellman")), 5);
	assert_eq!(engine.name_term(&with_names("A. Snellman")), 0);
	assert_eq!(engine.name_term(&with_names("Aarne Snellman")), 10);
	assert_eq!(engine.name_term(&with_names("Henrik Snellman")), 5);
	assert_eq!(engine.name_term(&person("p", &["Aarne Snellman"])), 0);
}

#[test]
fn sources_add_corroboration() {
	let cfg = scoring(Dataset::Photo);
	let graph = photo("", None);
	let engine = ScoringEngine::new(&graph, &cfg).expect("Failed to build scoring engine.");
	let both = person("p", &["Snellman"])
		.with_property("source", format!("<{WIKIPEDIA}>"))
		.with_property("source", "<http://ldf.fi/warsa/sources/source1>");
	let single = person("p", &["Snellman"]).with_property("source", "<http://ldf.fi/warsa/sources/source1>");

	assert_eq!(engine.source_term(&both), 2);
	assert_eq!(engine.source_term(&single), 0);
	assert_eq!(engine.source_term(&person("p", &["Snellman"])), 0);
}

#[test]
fn honorific_marker_favors_holders() {
	let cfg = scoring(Dataset::Photo);
	let graph = photo("Mannerheim-ristin ritari Snellman", None);
	let engine = ScoringEngine::new(&graph, &cfg).expect("Failed to build scoring engine.");
	let knight = person("knight", &["Snellman"]).with_property("source", format!("<{KNIGHTS}>"));
	let other = person("other", &["Snellman"]);
	let candidates = vec![knight.clone(), other.clone()];
	let ctx = engine.context(&candidates, "Snellman", PHOTO);

	assert_eq!(engine.honorific_term(&knight, &ctx), 20);
	assert_eq!(engine.honorific_term(&other, &ctx), -20);

	let plain_graph = photo("Snellman", None);
	let engine = ScoringEngine::new(&plain_graph, &cfg).expect("Failed to build scoring engine.");
	let ctx = engine.context(&candidates, "Snellman", PHOTO);

	assert_eq!(engine.honorific_term(&knight, &ctx), 0);
	assert_eq!(engine.honorific_term(&other, &ctx), 0);
}

#[test]
fn shared_units_are_rewarded() {
	let cfg = scoring(Dataset::Photo);
	let mut graph = photo("Snellman", None);

	graph.insert(PHOTO, UNIT, Term::iri("http://ldf.fi/warsa/actors/actor_940"));

	let engine = ScoringEngine::new(&graph, &cfg).expect("Failed to build scoring engine.");
	let member =
		person("member", &["Snellman"]).with_property("unit", "<http://ldf.fi/warsa/actors/actor_940>");
	let outsider =
		person("outsider", &["Snellman"]).with_property("unit", "<http://ldf.fi/warsa/actors/actor_1>");
	let candidates = vec![member.clone(), outsider.clone()];
	let ctx = engine.context(&candidates, "Snellman", PHOTO);

	assert_eq!(engine.unit_term(&member, &ctx), 15);
	assert_eq!(engine.unit_term(&outsider, &ctx), 0);
}

#[test]
fn pinned_identity_skips_the_terms() {
	let cfg = scoring(Dataset::Photo);
	let graph = photo("sotamies Mannerheim", Some("1942-06-04"));
	let engine = ScoringEngine::new(&graph, &cfg).expect("Failed to build scoring engine.");
	let pinned = officer(PINNED, &["Mannerheim"], "Suomen marsalkka", "Kenraalikunta", "1942-06-04")
		.with_property("death_date", "\"1900-01-01\"");
	let ctx = engine.context(std::slice::from_ref(&pinned), "sotamies Mannerheim", PHOTO);

	assert_eq!(engine.score(&pinned, &ctx), 50);
}

#[test]
fn event_dates_come_from_the_time_span() {
	let cfg = scoring(Dataset::Event);
	let mut graph = MemoryGraph::new();
	let event = "http://ldf.fi/warsa/events/event_1";

	graph.insert(
		event,
		CRM_HAS_TIME_SPAN,
		Term::iri("http://ldf.fi/warsa/events/times/time_1941-07-10-1941-07-12"),
	);

	let engine = ScoringEngine::new(&graph, &cfg).expect("Failed to build scoring engine.");

	assert_eq!(engine.record_facts(event).reference_date, Some(date!(1941 - 07 - 10)));
}

#[test]
fn empty_query_text_is_invalid() {
	let cfg = scoring(Dataset::Photo);
	let graph = photo("Snellman", None);
	let engine = ScoringEngine::new(&graph, &cfg).expect("Failed to build scoring engine.");
	let err = engine
		.validate(vec![person("p", &["Snellman"])], "  ", PHOTO)
		.expect_err("Expected empty query text to be rejected.");

	assert!(matches!(err, Error::InvalidQuery { .. }));
}

#[test]
fn non_positive_scores_are_rejected() {
	let cfg = scoring(Dataset::Photo);
	let graph = photo("Snellman", Some("1942-06-04"));
	let engine = ScoringEngine::new(&graph, &cfg).expect("Failed to build scoring engine.");
	let named = person("named", &["Aarne Snellman"]).with_property("first_names", "\"Aarne\"");
	let anonymous = person("anonymous", &["Aarne Snellman"]);
	let accepted = engine
		.validate(vec![named, anonymous], "Aarne Snellman", PHOTO)
		.expect("Failed to validate candidates.");

	assert_eq!(accepted.len(), 1);
	assert_eq!(accepted[0].id, "named");
	assert_eq!(accepted[0].score, Some(10));
}
