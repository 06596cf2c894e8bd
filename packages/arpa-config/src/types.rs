use std::{collections::HashMap, path::PathBuf};

use serde::{Deserialize, Deserializer};
use time::{
	Date,
	format_description::BorrowedFormatItem,
	macros::{date, format_description},
};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub const SKOS_PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";
pub const DCT_CREATED: &str = "http://purl.org/dc/terms/created";
pub const CRM_HAS_TIME_SPAN: &str = "http://www.cidoc-crm.org/cidoc-crm/P4_has_time-span";

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub linking: Linking,
	#[serde(default)]
	pub filter: Filter,
	pub sparql: Option<Sparql>,
	pub preprocess: Option<Preprocess>,
	pub scoring: Option<Scoring>,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub url: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	/// Extra attempts after the first failed request.
	#[serde(default)]
	pub retries: i64,
	#[serde(default)]
	pub wait_seconds: f64,
	#[serde(default = "default_log_level")]
	pub log_level: String,
	pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Linking {
	pub source_predicate: String,
	pub target_predicate: String,
	/// Only records typed with this class are linked when set.
	pub record_type: Option<String>,
	#[serde(default)]
	pub candidates_only: bool,
	#[serde(default)]
	pub new_graph: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Filter {
	pub ignore: Vec<String>,
	pub min_ngram: usize,
	pub duplicates: DuplicatePolicy,
}
impl Default for Filter {
	fn default() -> Self {
		Self { ignore: Vec::new(), min_ngram: 1, duplicates: DuplicatePolicy::Disabled }
	}
}

/// Strategy for collapsing candidates that share a label.
///
/// In TOML: `duplicates = "arbitrary"` or `duplicates = { prioritized_by = ["<type iri>", ...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
	#[default]
	Disabled,
	Arbitrary,
	PrioritizedBy(Vec<String>),
}

#[derive(Debug, Deserialize)]
pub struct Sparql {
	/// Query text with a `<VALUES>` placeholder for the mention text.
	pub query_template: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Preprocess {
	#[serde(default)]
	pub replacements: Vec<Replacement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Replacement {
	pub pattern: String,
	#[serde(default)]
	pub replacement: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
	/// Reference date comes from a time-span resource named `time_<start>-<end>`.
	Event,
	/// Reference date comes from a creation date literal.
	Photo,
}
impl Dataset {
	pub fn default_date_predicate(self) -> &'static str {
		match self {
			Self::Event => CRM_HAS_TIME_SPAN,
			Self::Photo => DCT_CREATED,
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct Scoring {
	pub dataset: Dataset,
	#[serde(default = "default_label_predicate")]
	pub label_predicate: String,
	pub date_predicate: Option<String>,
	pub unit_predicate: Option<String>,
	pub pinned: Option<PinnedIdentity>,
	pub honorific: Option<Honorific>,
	#[serde(default = "default_war_start", deserialize_with = "deserialize_date")]
	pub war_start: Date,
	#[serde(default = "default_historical_cutoff", deserialize_with = "deserialize_date")]
	pub historical_cutoff: Date,
	/// Keyed by plain source IRI.
	#[serde(default)]
	pub source_weights: HashMap<String, i32>,
	/// Replaces the built-in rank class table when set.
	pub rank_class_scores: Option<HashMap<String, i32>>,
	/// Replaces the built-in rank level table when set.
	pub rank_levels: Option<HashMap<String, i32>>,
	#[serde(default)]
	pub weights: ScoringWeights,
}
impl Scoring {
	pub fn date_predicate(&self) -> &str {
		self.date_predicate.as_deref().unwrap_or(self.dataset.default_date_predicate())
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct PinnedIdentity {
	pub id: String,
	#[serde(default = "default_pinned_score")]
	pub score: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Honorific {
	#[serde(default = "default_honorific_pattern")]
	pub pattern: String,
	/// Source IRI whose members hold the honorific.
	pub source: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
	pub match_overlap_penalty: i32,
	pub death_penalty: i32,
	pub death_grace_days: i64,
	pub context_rank_penalty: i32,
	pub current_rank_bonus: i32,
	pub undated_rank_bonus: i32,
	pub inconsistent_rank_penalty: i32,
	pub rank_window_days: i64,
	pub name_match_bonus: i32,
	pub first_name_bonus: i32,
	pub initials_step: i32,
	pub honorific_bonus: i32,
	pub honorific_penalty: i32,
	pub unit_bonus: i32,
}
impl Default for ScoringWeights {
	fn default() -> Self {
		Self {
			match_overlap_penalty: -20,
			death_penalty: -30,
			death_grace_days: 30,
			context_rank_penalty: -10,
			current_rank_bonus: 20,
			undated_rank_bonus: 11,
			inconsistent_rank_penalty: -15,
			rank_window_days: 30,
			name_match_bonus: 5,
			first_name_bonus: 5,
			initials_step: 5,
			honorific_bonus: 20,
			honorific_penalty: -20,
			unit_bonus: 15,
		}
	}
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = String::deserialize(deserializer)?;

	Date::parse(raw.trim(), DATE_FORMAT).map_err(serde::de::Error::custom)
}

fn default_timeout_ms() -> u64 {
	30_000
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_label_predicate() -> String {
	SKOS_PREF_LABEL.to_string()
}

fn default_pinned_score() -> i32 {
	50
}

fn default_honorific_pattern() -> String {
	"ritar[ie]".to_string()
}

fn default_war_start() -> Date {
	date!(1939 - 01 - 01)
}

fn default_historical_cutoff() -> Date {
	date!(1946 - 01 - 01)
}
