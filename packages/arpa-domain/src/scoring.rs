use std::collections::{BTreeSet, HashMap, HashSet};

use regex::{Regex, RegexBuilder};
use time::Date;

use arpa_config::{Dataset, Scoring};
use arpa_storage::TripleStore;

use crate::{
	Candidate, Error, RankTable, RecordFacts, Result, ScoringContext, Validator, choose_best,
	parse_date, plain_value,
	ranks::{self, UNKNOWN},
};

/// Person validator: scores every candidate against the record it was found in and keeps the
/// best-scoring candidate(s) per mention.
pub struct ScoringEngine<'a> {
	store: &'a dyn TripleStore,
	cfg: &'a Scoring,
	ranks: RankTable,
	honorific: Option<Honorific>,
	source_weights: HashMap<String, i32>,
}
impl<'a> ScoringEngine<'a> {
	pub fn new(store: &'a dyn TripleStore, cfg: &'a Scoring) -> Result<Self> {
		let ranks = RankTable::from_config(cfg)?;
		let honorific = cfg
			.honorific
			.as_ref()
			.map(|honorific| -> Result<Honorific> {
				let marker = RegexBuilder::new(&honorific.pattern)
					.case_insensitive(true)
					.build()
					.map_err(|err| Error::InvalidPattern {
						pattern: honorific.pattern.clone(),
						message: err.to_string(),
					})?;

				Ok(Honorific { marker, source: plain_value(&honorific.source).to_string() })
			})
			.transpose()?;
		let source_weights = cfg
			.source_weights
			.iter()
			.map(|(source, weight)| (plain_value(source).to_string(), *weight))
			.collect();

		Ok(Self { store, cfg, ranks, honorific, source_weights })
	}

	/// Reads the reference date, units and original label of `subject`.
	pub fn record_facts(&self, subject: &str) -> RecordFacts {
		let reference_date = self
			.store
			.value(subject, self.cfg.date_predicate())
			.and_then(|term| reference_date(self.cfg.dataset, term.as_str()));
		let units = match self.cfg.unit_predicate.as_deref() {
			Some(predicate) => self
				.store
				.objects(subject, predicate)
				.iter()
				.map(|term| plain_value(term.as_str()).to_string())
				.collect(),
			None => HashSet::new(),
		};
		let original_text = self
			.store
			.value(subject, &self.cfg.label_predicate)
			.map(|term| plain_value(term.as_str()).to_string());

		RecordFacts { reference_date, units, original_text }
	}

	pub fn context(&self, candidates: &[Candidate], query_text: &str, subject: &str) -> ScoringContext {
		let facts = self.record_facts(subject);
		let mut ctx = ScoringContext::new(
			subject,
			query_text,
			facts,
			candidates,
			self.cfg.weights.match_overlap_penalty,
		);

		if let Some(honorific) = self.honorific.as_ref() {
			ctx.honorific_holders = candidates
				.iter()
				.filter(|candidate| holds_source(candidate, &honorific.source))
				.map(|candidate| candidate.id.clone())
				.collect();
		}

		ctx
	}

	pub fn score(&self, candidate: &Candidate, ctx: &ScoringContext) -> i32 {
		if let Some(pinned) = self.cfg.pinned.as_ref()
			&& pinned.id == candidate.id
		{
			tracing::debug!(id = %candidate.id, score = pinned.score, "Pinned identity score.");

			return pinned.score;
		}

		let terms = [
			("match", ctx.match_score(&candidate.id)),
			("date", self.date_term(candidate, ctx)),
			("rank", self.rank_term(candidate, ctx)),
			("name", self.name_term(candidate)),
			("source", self.source_term(candidate)),
			("honorific", self.honorific_term(candidate, ctx)),
			("unit", self.unit_term(candidate, ctx)),
		];

		for (term, value) in terms {
			tracing::debug!(id = %candidate.id, label = %candidate.label, term, value, "Score term.");
		}

		terms.iter().map(|(_, value)| value).sum()
	}

	/// Penalizes candidates who died well before the record's date.
	pub fn date_term(&self, candidate: &Candidate, ctx: &ScoringContext) -> i32 {
		let (Some(reference), Some(raw)) = (ctx.reference_date, candidate.first_plain("death_date"))
		else {
			return 0;
		};
		let Ok(death) = parse_date(raw) else {
			return 0;
		};
		let gap = (reference - death).whole_days();

		if gap > self.cfg.weights.death_grace_days {
			return self.cfg.weights.death_penalty;
		}
		if gap >= 0 {
			tracing::info!(
				subject = %ctx.subject,
				id = %candidate.id,
				days = gap,
				"Candidate died shortly before the record date."
			);
		}

		0
	}

	pub fn rank_term(&self, candidate: &Candidate, ctx: &ScoringContext) -> i32 {
		let weights = &self.cfg.weights;
		let ranks = lowercase_set(candidate.plain_values("rank"));
		let classes = lowercase_set(candidate.plain_values("hierarchy"));
		let only_unknown = ranks.len() == 1 && ranks.contains(&UNKNOWN.to_lowercase());

		if !only_unknown && !self.has_consistent_rank(candidate, &ranks, &classes, ctx) {
			tracing::info!(
				subject = %ctx.subject,
				id = %candidate.id,
				"Rank in the text contradicts the candidate's ranks."
			);

			return weights.context_rank_penalty;
		}

		let base = classes.iter().map(|class| self.ranks.class_score(class)).max().unwrap_or(0);
		let mention_text = candidate.matches.join(" ");
		let rank_tokens = self.ranks.rank_tokens(&mention_text);
		let (tokens, property) = if !rank_tokens.is_empty() {
			(rank_tokens, "rank")
		} else {
			let class_tokens = self.ranks.class_tokens(&mention_text);

			if class_tokens.is_empty() {
				return base;
			}

			(class_tokens, "hierarchy")
		};
		let history = ranks::promotion_history(candidate, property);
		let matches_any = |held: &BTreeSet<String>| tokens.iter().any(|token| held.contains(token));

		match ctx.reference_date {
			Some(date) => {
				if matches_any(&ranks::fuzzy_current_ranks(&history, date, weights.rank_window_days)) {
					base + weights.current_rank_bonus
				} else if matches_any(&ranks::ranks_with_unknown_date(&history)) {
					base + weights.undated_rank_bonus
				} else {
					base + weights.inconsistent_rank_penalty
				}
			},
			None => {
				let held = ranks::wartime_ranks(
					&history,
					&self.ranks,
					self.cfg.war_start,
					self.cfg.historical_cutoff,
				);

				if matches_any(&held) {
					base + weights.undated_rank_bonus
				} else {
					base + weights.inconsistent_rank_penalty
				}
			},
		}
	}

	/// Rewards given names (or their initials) that appear in the mentions.
	pub fn name_term(&self, candidate: &Candidate) -> i32 {
		let weights = &self.cfg.weights;
		let Some(first_names) =
			candidate.first_plain("first_names").map(str::trim).filter(|names| !names.is_empty())
		else {
			return 0;
		};
		let mention_text = candidate.matches.join(" ");
		let mut score = 0;

		if mention_text.contains('.') {
			let initials = name_initials(first_names);
			let longest = candidate
				.matches
				.iter()
				.map(|mention| common_prefix_len(&initials, &mention_initials(mention)))
				.max()
				.unwrap_or(0) as i32;

			score += ((longest - 1) * weights.initials_step).max(0);
		}

		let given: Vec<&str> = first_names.split_whitespace().collect();

		if given.iter().any(|name| contains_word(&mention_text, name)) {
			score += weights.name_match_bonus;

			if given.first().is_some_and(|name| contains_word(&mention_text, name)) {
				score += weights.first_name_bonus;
			}
		}

		score
	}

	/// Best source weight plus one point per additional source.
	pub fn source_term(&self, candidate: &Candidate) -> i32 {
		let sources: BTreeSet<&str> = candidate.plain_values("source").into_iter().collect();
		let Some(best) =
			sources.iter().map(|source| self.source_weights.get(*source).copied().unwrap_or(0)).max()
		else {
			return 0;
		};

		best + (sources.len() as i32 - 1)
	}

	pub fn honorific_term(&self, candidate: &Candidate, ctx: &ScoringContext) -> i32 {
		let weights = &self.cfg.weights;
		let Some(honorific) = self.honorific.as_ref() else {
			return 0;
		};

		if !honorific.marker.is_match(ctx.honorific_text()) {
			return 0;
		}
		if ctx.honorific_holders.contains(&candidate.id) {
			return weights.honorific_bonus;
		}

		let competes_with_holder = ctx.ranked_matches.values().any(|ranked| {
			ranked.ids.contains(&candidate.id)
				&& ranked
					.ids
					.iter()
					.any(|other| other != &candidate.id && ctx.honorific_holders.contains(other))
		});

		if competes_with_holder {
			tracing::info!(
				subject = %ctx.subject,
				id = %candidate.id,
				"Candidate lacks the honorific held by a competing candidate."
			);

			return weights.honorific_penalty;
		}

		0
	}

	pub fn unit_term(&self, candidate: &Candidate, ctx: &ScoringContext) -> i32 {
		if candidate.plain_values("unit").iter().any(|unit| ctx.units.contains(*unit)) {
			return self.cfg.weights.unit_bonus;
		}

		0
	}

	fn has_consistent_rank(
		&self,
		candidate: &Candidate,
		ranks: &BTreeSet<String>,
		classes: &BTreeSet<String>,
		ctx: &ScoringContext,
	) -> bool {
		if candidate.matches.iter().any(|mention| self.ranks.contains_token(mention)) {
			return true;
		}

		let mut preceding = Vec::new();

		for mention in candidate.matches.iter().filter(|mention| !mention.is_empty()) {
			for (start, _) in ctx.query_text.match_indices(mention.as_str()) {
				if let Some(word) = self.rank_word_before(&ctx.query_text[..start]) {
					preceding.push(word.to_lowercase());
				}
			}
		}

		preceding.is_empty()
			|| preceding.iter().any(|token| ranks.contains(token) || classes.contains(token))
	}

	/// The rank word directly before a mention, or before one intervening given name or initial.
	fn rank_word_before<'t>(&self, before: &'t str) -> Option<&'t str> {
		if !before.ends_with(char::is_whitespace) {
			return None;
		}

		let mut words = before.split_whitespace().rev();
		let adjacent = words.next()?;

		if self.ranks.is_token(adjacent) {
			return Some(adjacent);
		}

		words.next().filter(|word| self.ranks.is_token(word))
	}
}
impl Validator for ScoringEngine<'_> {
	fn validate(
		&self,
		candidates: Vec<Candidate>,
		query_text: &str,
		subject: &str,
	) -> Result<Vec<Candidate>> {
		if query_text.trim().is_empty() {
			return Err(Error::InvalidQuery {
				message: format!("Query text for {subject} must be non-empty."),
			});
		}
		if candidates.is_empty() {
			return Ok(candidates);
		}

		let ctx = self.context(&candidates, query_text, subject);
		let mut accepted = Vec::with_capacity(candidates.len());

		for mut candidate in candidates {
			let score = self.score(&candidate, &ctx);

			if score > 0 {
				tracing::info!(subject, id = %candidate.id, label = %candidate.label, score, "PASS");

				candidate.score = Some(score);

				accepted.push(candidate);
			} else {
				tracing::info!(subject, id = %candidate.id, label = %candidate.label, score, "FAIL");
			}
		}

		Ok(choose_best(accepted))
	}
}

struct Honorific {
	marker: Regex,
	source: String,
}

fn reference_date(dataset: Dataset, raw: &str) -> Option<Date> {
	let raw = match dataset {
		Dataset::Photo => raw,
		Dataset::Event => raw.rsplit_once("time_").map(|(_, span)| span)?,
	};

	match parse_date(raw) {
		Ok(date) => Some(date),
		Err(err) => {
			tracing::debug!(error = %err, "Record date is unknown.");

			None
		},
	}
}

fn holds_source(candidate: &Candidate, source: &str) -> bool {
	candidate.plain_values("source").contains(&source)
}

fn lowercase_set(values: Vec<&str>) -> BTreeSet<String> {
	values.into_iter().map(str::to_lowercase).collect()
}

fn name_initials(names: &str) -> Vec<char> {
	names
		.split(|c: char| c.is_whitespace() || c == '-')
		.filter_map(|name| name.chars().next())
		.flat_map(char::to_uppercase)
		.collect()
}

/// Capital letters directly followed by a dot, e.g. `A.` in `A. Snellman`.
fn mention_initials(mention: &str) -> Vec<char> {
	let chars: Vec<char> = mention.chars().collect();

	chars
		.windows(2)
		.filter(|pair| pair[1] == '.' && (pair[0].is_ascii_uppercase() || "ÄÅÖÜ".contains(pair[0])))
		.map(|pair| pair[0])
		.collect()
}

fn common_prefix_len(a: &[char], b: &[char]) -> usize {
	a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn contains_word(text: &str, word: &str) -> bool {
	let is_word_char = |c: char| c.is_alphanumeric() || c == '_';

	!word.is_empty()
		&& text.match_indices(word).any(|(start, _)| {
			let before = text[..start].chars().next_back();
			let after = text[start + word.len()..].chars().next();

			!before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
		})
}
