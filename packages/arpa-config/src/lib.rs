mod error;
mod retry;
mod types;

pub use error::{Error, Result};
pub use retry::RetryPolicy;
pub use types::{
	CRM_HAS_TIME_SPAN, Config, DCT_CREATED, Dataset, DuplicatePolicy, Filter, Honorific, Linking,
	PinnedIdentity, Preprocess, Replacement, SKOS_PREF_LABEL, Scoring, ScoringWeights, Service,
	Sparql,
};

use std::{fs, path::Path};

pub const VALUES_PLACEHOLDER: &str = "<VALUES>";
/// Upper bound for day-valued scoring windows, roughly a century.
pub const MAX_WINDOW_DAYS: i64 = 36_525;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	let url = cfg.service.url.trim();

	if url.is_empty() {
		return Err(Error::Validation { message: "service.url must be non-empty.".to_string() });
	}
	if !(url.starts_with("http://") || url.starts_with("https://")) {
		return Err(Error::Validation {
			message: "service.url must be an http or https URL.".to_string(),
		});
	}
	if cfg.service.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "service.timeout_ms must be greater than zero.".to_string(),
		});
	}

	RetryPolicy::new(cfg.service.retries, cfg.service.wait_seconds)?;

	for (label, value) in [
		("linking.source_predicate", &cfg.linking.source_predicate),
		("linking.target_predicate", &cfg.linking.target_predicate),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.filter.min_ngram == 0 {
		return Err(Error::Validation {
			message: "filter.min_ngram must be greater than zero.".to_string(),
		});
	}
	if let DuplicatePolicy::PrioritizedBy(types) = &cfg.filter.duplicates
		&& types.is_empty()
	{
		return Err(Error::Validation {
			message: "filter.duplicates.prioritized_by must list at least one type.".to_string(),
		});
	}

	if let Some(sparql) = cfg.sparql.as_ref() {
		if !sparql.query_template.contains(VALUES_PLACEHOLDER) {
			return Err(Error::Validation {
				message: format!("sparql.query_template must contain {VALUES_PLACEHOLDER}."),
			});
		}
		if cfg.linking.candidates_only {
			return Err(Error::Validation {
				message: "linking.candidates_only is not supported together with [sparql]."
					.to_string(),
			});
		}
	}

	if let Some(scoring) = cfg.scoring.as_ref() {
		validate_scoring(scoring)?;
	}

	Ok(())
}

fn validate_scoring(scoring: &Scoring) -> Result<()> {
	if scoring.label_predicate.trim().is_empty() {
		return Err(Error::Validation {
			message: "scoring.label_predicate must be non-empty.".to_string(),
		});
	}
	if scoring.historical_cutoff <= scoring.war_start {
		return Err(Error::Validation {
			message: "scoring.historical_cutoff must be later than scoring.war_start.".to_string(),
		});
	}
	for (label, days) in [
		("scoring.weights.rank_window_days", scoring.weights.rank_window_days),
		("scoring.weights.death_grace_days", scoring.weights.death_grace_days),
	] {
		if !(0..=MAX_WINDOW_DAYS).contains(&days) {
			return Err(Error::Validation {
				message: format!("{label} must be between 0 and {MAX_WINDOW_DAYS}, got {days}."),
			});
		}
	}
	if let Some(pinned) = scoring.pinned.as_ref()
		&& pinned.id.trim().is_empty()
	{
		return Err(Error::Validation {
			message: "scoring.pinned.id must be non-empty.".to_string(),
		});
	}
	if let Some(honorific) = scoring.honorific.as_ref() {
		for (label, value) in [
			("scoring.honorific.pattern", &honorific.pattern),
			("scoring.honorific.source", &honorific.source),
		] {
			if value.trim().is_empty() {
				return Err(Error::Validation { message: format!("{label} must be non-empty.") });
			}
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.url = cfg.service.url.trim().to_string();
	cfg.filter.ignore = cfg
		.filter
		.ignore
		.iter()
		.map(|term| term.trim().to_string())
		.filter(|term| !term.is_empty())
		.collect();

	if cfg.linking.record_type.as_deref().map(|value| value.trim().is_empty()).unwrap_or(false) {
		cfg.linking.record_type = None;
	}
	if cfg.service.log_file.as_ref().map(|path| path.as_os_str().is_empty()).unwrap_or(false) {
		cfg.service.log_file = None;
	}
	if let Some(scoring) = cfg.scoring.as_mut() {
		if scoring.date_predicate.as_deref().map(|value| value.trim().is_empty()).unwrap_or(false)
		{
			scoring.date_predicate = None;
		}
		if scoring.unit_predicate.as_deref().map(|value| value.trim().is_empty()).unwrap_or(false)
		{
			scoring.unit_predicate = None;
		}
	}
}
