use std::collections::{BTreeSet, HashMap};

use regex::{Regex, RegexBuilder};
use time::{Date, Duration};

use crate::{Candidate, Error, Result, parse_date};

/// Placeholder used by the person data for an unknown rank or promotion date.
pub const UNKNOWN: &str = "NA";

/// Titles recorded alongside ranks that do not describe a rank.
const NON_RANK_TITLES: &[&str] = &["yleisesikuntaupseeri"];

/// Rank vocabulary: ordinal levels per rank and base scores per rank class.
#[derive(Debug, Clone)]
pub struct RankTable {
	levels: HashMap<String, i32>,
	class_scores: HashMap<String, i32>,
	rank_pattern: Regex,
	class_pattern: Regex,
}
impl RankTable {
	pub fn new<L, C>(levels: L, class_scores: C) -> Result<Self>
	where
		L: IntoIterator<Item = (String, i32)>,
		C: IntoIterator<Item = (String, i32)>,
	{
		let levels: HashMap<String, i32> =
			levels.into_iter().map(|(rank, level)| (rank.to_lowercase(), level)).collect();
		let class_scores: HashMap<String, i32> =
			class_scores.into_iter().map(|(class, score)| (class.to_lowercase(), score)).collect();
		let rank_pattern = token_pattern(levels.keys())?;
		let class_pattern = token_pattern(class_scores.keys())?;

		Ok(Self { levels, class_scores, rank_pattern, class_pattern })
	}

	pub fn builtin() -> Result<Self> {
		Self::new(
			RANK_LEVELS.iter().map(|(rank, level)| (rank.to_string(), *level)),
			RANK_CLASS_SCORES.iter().map(|(class, score)| (class.to_string(), *score)),
		)
	}

	/// Built-in tables with any configured replacements applied.
	pub fn from_config(cfg: &arpa_config::Scoring) -> Result<Self> {
		let levels: Vec<(String, i32)> = match cfg.rank_levels.as_ref() {
			Some(levels) => levels.iter().map(|(rank, level)| (rank.clone(), *level)).collect(),
			None => RANK_LEVELS.iter().map(|(rank, level)| (rank.to_string(), *level)).collect(),
		};
		let class_scores: Vec<(String, i32)> = match cfg.rank_class_scores.as_ref() {
			Some(scores) => scores.iter().map(|(class, score)| (class.clone(), *score)).collect(),
			None => RANK_CLASS_SCORES.iter().map(|(class, score)| (class.to_string(), *score)).collect(),
		};

		Self::new(levels, class_scores)
	}

	pub fn level(&self, rank: &str) -> i32 {
		self.levels.get(&rank.to_lowercase()).copied().unwrap_or(0)
	}

	pub fn class_score(&self, class: &str) -> i32 {
		self.class_scores.get(&class.to_lowercase()).copied().unwrap_or(0)
	}

	/// Rank words found in `text`, lower-cased, in order of appearance.
	pub fn rank_tokens(&self, text: &str) -> Vec<String> {
		self.rank_pattern.find_iter(text).map(|found| found.as_str().to_lowercase()).collect()
	}

	pub fn class_tokens(&self, text: &str) -> Vec<String> {
		self.class_pattern.find_iter(text).map(|found| found.as_str().to_lowercase()).collect()
	}

	pub fn contains_token(&self, text: &str) -> bool {
		self.rank_pattern.is_match(text) || self.class_pattern.is_match(text)
	}

	/// Whether `word` is exactly a rank or rank class.
	pub fn is_token(&self, word: &str) -> bool {
		let word = word.to_lowercase();

		word != UNKNOWN.to_lowercase()
			&& (self.levels.contains_key(&word) || self.class_scores.contains_key(&word))
	}
}

/// One entry of a candidate's rank history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
	/// Lower-cased rank or rank class.
	pub rank: String,
	pub promoted: Option<Date>,
	/// End of the uncertainty interval of the promotion date; equals `promoted` when not recorded.
	pub latest: Option<Date>,
	/// The promotion date is recorded as unknown.
	pub unknown_date: bool,
	pub level: Option<i32>,
}

/// Reads the parallel `<rank_property>`, `promotion_date`, `latest_promotion_date` and
/// `rank_level` arrays of a candidate.
pub fn promotion_history(candidate: &Candidate, rank_property: &str) -> Vec<Promotion> {
	let promoted = candidate.plain_values("promotion_date");
	let latest = candidate.plain_values("latest_promotion_date");
	let levels = candidate.plain_values("rank_level");

	candidate
		.plain_values(rank_property)
		.into_iter()
		.enumerate()
		.filter(|(_, rank)| !NON_RANK_TITLES.iter().any(|title| title.eq_ignore_ascii_case(rank)))
		.map(|(index, rank)| {
			let raw_date = promoted.get(index).copied();
			let promoted = raw_date.and_then(|raw| parse_date(raw).ok());
			let latest =
				latest.get(index).and_then(|raw| parse_date(raw).ok()).or(promoted);

			Promotion {
				rank: rank.to_lowercase(),
				promoted,
				latest,
				unknown_date: raw_date.is_some_and(|raw| raw.eq_ignore_ascii_case(UNKNOWN)),
				level: levels.get(index).and_then(|raw| raw.parse().ok()),
			}
		})
		.collect()
}

/// Ranks plausibly held within `window_days` of `date`.
///
/// When no promotion touches the window, the ranks of the most recent promotion before it are
/// returned instead.
pub fn fuzzy_current_ranks(history: &[Promotion], date: Date, window_days: i64) -> BTreeSet<String> {
	let window =
		window_days.checked_mul(86_400).map(Duration::seconds).unwrap_or(Duration::MAX);
	let upper = date.saturating_add(window);
	let lower = date.saturating_sub(window);
	let mut current = BTreeSet::new();
	let mut earlier = Vec::new();

	for promotion in history {
		let (Some(promoted), Some(latest)) = (promotion.promoted, promotion.latest) else {
			continue;
		};

		if promoted > upper {
			continue;
		}
		if latest > lower {
			current.insert(promotion.rank.clone());

			continue;
		}

		earlier.push((promotion, promoted, latest));
	}

	if !current.is_empty() {
		return current;
	}

	let Some(most_recent) = earlier.iter().map(|(_, promoted, _)| *promoted).max() else {
		return current;
	};

	earlier
		.into_iter()
		.filter(|(_, _, latest)| *latest >= most_recent)
		.map(|(promotion, _, _)| promotion.rank.clone())
		.collect()
}

pub fn ranks_with_unknown_date(history: &[Promotion]) -> BTreeSet<String> {
	history.iter().filter(|promotion| promotion.unknown_date).map(|p| p.rank.clone()).collect()
}

/// Ranks held at some point before `cutoff`, ignoring ranks below the highest one held at
/// `war_start`. Falls back to `{"na"}`.
pub fn wartime_ranks(
	history: &[Promotion],
	table: &RankTable,
	war_start: Date,
	cutoff: Date,
) -> BTreeSet<String> {
	let floor = fuzzy_current_ranks(history, war_start, 0)
		.iter()
		.map(|rank| table.level(rank))
		.max()
		.unwrap_or(0);
	let ranks: BTreeSet<String> = history
		.iter()
		.filter(|promotion| promotion.level.unwrap_or_else(|| table.level(&promotion.rank)) >= floor)
		.filter(|promotion| promotion.promoted.is_none_or(|promoted| promoted < cutoff))
		.map(|promotion| promotion.rank.clone())
		.collect();

	if ranks.is_empty() {
		return BTreeSet::from([UNKNOWN.to_lowercase()]);
	}

	ranks
}

fn token_pattern<'a>(keys: impl Iterator<Item = &'a String>) -> Result<Regex> {
	let mut alternatives: Vec<String> = keys
		.filter(|key| !key.eq_ignore_ascii_case(UNKNOWN))
		.map(|key| regex::escape(key))
		.collect();

	// Longest first so multi-word ranks win over their last word.
	alternatives.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

	let pattern = if alternatives.is_empty() {
		r"[^\s\S]".to_string()
	} else {
		format!(r"\b(?:{})\b", alternatives.join("|"))
	};

	RegexBuilder::new(&pattern)
		.case_insensitive(true)
		.build()
		.map_err(|err| Error::InvalidPattern { pattern, message: err.to_string() })
}

pub const RANK_LEVELS: &[(&str, i32)] = &[
	("alisotilasohjaaja", 0),
	("alisotilasvirkamies", 0),
	("aliupseerioppilas", 0),
	("alokas", 0),
	("apusisar", 0),
	("armeijakenraali", 0),
	("asemestari", 0),
	("cadet", 0),
	("erikoismestari", 0),
	("gewehrführer", 0),
	("hauptzugführer", 0),
	("hilfsgewehrführer", 0),
	("hilfsgruppenführer", 0),
	("kadetti", 0),
	("kadettialikersantti", 0),
	("kadettikersantti", 0),
	("kadettipursimies", 0),
	("kadettivääpeli", 0),
	("kadettiylikersantti", 0),
	("kansiupseeri", 0),
	("kenraalieversti", 0),
	("kenttäpostimestari", 0),
	("lentomekaanikko", 0),
	("linnoitustyönjohtaja", 0),
	("luotsi", 0),
	("lähetti", 0),
	("lääkintävirkamies", 0),
	("mekaanikko", 0),
	("merivartija", 0),
	("oberzugführer", 0),
	("offizierstellvertreter", 0),
	("oppilas", 0),
	("paikallispäällikkö", 0),
	("rottenführer", 0),
	("sairaanhoitaja", 0),
	("sairaanhoitajaoppilas", 0),
	("siviili", 0),
	("soitto-oppilas", 0),
	("sotainvalidi", 0),
	("sotakirjeenvaihtaja", 0),
	("sotaylituomari", 0),
	("sotilasalivirkamies", 0),
	("sotilasdiakoni", 0),
	("sotilaskotisisar", 0),
	("sotilaspoika", 0),
	("sotilaspoliisi", 0),
	("sotilasvirkamies", 0),
	("suojeluskunta-alokas", 0),
	("suojeluskuntaupseeri", 0),
	("toisen luokan nostomies", 0),
	("tuntematon", 0),
	("työvelvollinen", 0),
	("vapaaehtoinen", 0),
	("varusmiesdiakoni", 0),
	("varusmiespappi", 0),
	("vizefeldwebel", 0),
	("yleisesikuntaupseeri", 0),
	("ylihoitaja", 0),
	("zugführer", 0),
	("autosotamies", 1),
	("erikoisjääkäri", 1),
	("erikoisrajajääkäri", 1),
	("ilmasuojelumies", 1),
	("ilmasuojelusotamies", 1),
	("ilmavalvontalotta", 1),
	("jääkäri", 1),
	("kaartinjääkäri", 1),
	("kanslialotta", 1),
	("kenttälotta", 1),
	("lentosotamies", 1),
	("lotta", 1),
	("lääkintälotta", 1),
	("lääkintäsotamies", 1),
	("matruusi", 1),
	("muonituslotta", 1),
	("panssarijääkäri", 1),
	("panssarimies", 1),
	("pioneeri", 1),
	("rajajääkäri", 1),
	("rakuuna", 1),
	("rannikkojääkäri", 1),
	("ratsujääkäri", 1),
	("ratsumies", 1),
	("schütze", 1),
	("sotamies", 1),
	("suojelumies", 1),
	("suojeluskuntasotamies", 1),
	("tykkimies", 1),
	("valonheitinlotta", 1),
	("viestimies", 1),
	("gefreiter", 2),
	("jefreitteri", 2),
	("korpraali", 2),
	("lääkintäkorpraali", 2),
	("rajakorpraali", 2),
	("sturmmann", 2),
	("suojeluskuntakorpraali", 2),
	("ylimatruusi", 2),
	("alikersantti", 3),
	("lääkintäalikersantti", 3),
	("unterscharführer", 3),
	("upseerioppilas", 3),
	("kersantti", 4),
	("lääkintäkersantti", 4),
	("upseerikokelas", 4),
	("varavahtimestari", 5),
	("varavääpeli", 5),
	("ylikersantti", 5),
	("lääkintävääpeli", 6),
	("pursimies", 6),
	("rajavääpeli", 6),
	("ratsuvääpeli", 6),
	("reservin vääpeli", 6),
	("suojeluskuntavääpeli", 6),
	("vahtimestari", 6),
	("vääpeli", 6),
	("ylipursimies", 7),
	("ylivääpeli", 7),
	("lentomestari", 8),
	("sotilasmestari", 8),
	("tykkimestari", 8),
	("aliluutnantti", 9),
	("kornetti", 9),
	("musiikkivänrikki", 9),
	("reservin aliluutnantti", 9),
	("reservin kornetti", 9),
	("reservin vänrikki", 9),
	("untersturmführer", 9),
	("vänrikki", 9),
	("eläinlääkintäluutnantti", 10),
	("insinööriluutnantti", 10),
	("luutnantti", 10),
	("lääkintäluutnantti", 10),
	("musiikkiluutnantti", 10),
	("obersturmführer", 10),
	("reservin luutnantti", 10),
	("yliluutnantti", 11),
	("eläinlääkintäkapteeni", 12),
	("hauptmann", 12),
	("insinöörikapteeni", 12),
	("insinöörikapteeniluutnantti", 12),
	("kapteeni", 12),
	("kapteeniluutnantti", 12),
	("lääkintäkapteeni", 12),
	("musiikkikapteeni", 12),
	("ratsumestari", 12),
	("reservin kapteeni", 12),
	("sotilaspastori", 12),
	("eläinlääkintämajuri", 13),
	("insinöörimajuri", 13),
	("komentajakapteeni", 13),
	("lääkintämajuri", 13),
	("majuri", 13),
	("eläinlääkintäeverstiluutnantti", 14),
	("everstiluutnantti", 14),
	("insinöörieverstiluutnantti", 14),
	("kenttärovasti", 14),
	("lääkintäeverstiluutnantti", 14),
	("eläinlääkintäeversti", 15),
	("eversti", 15),
	("kommodori", 15),
	("lääkintäeversti", 15),
	("kenttäpiispa", 16),
	("lippueamiraali", 16),
	("prikaatikenraali", 16),
	("prikaatinkomentaja", 16),
	("divisioonankomentaja", 17),
	("eläinlääkintäkenraalimajuri", 17),
	("insinöörikenraalimajuri", 17),
	("kenraalimajuri", 17),
	("kontra-amiraali", 17),
	("lääkintäkenraalimajuri", 17),
	("armeijakunnankomentaja", 18),
	("gruppenführer", 18),
	("kenraaliluutnantti", 18),
	("lääkintäkenraaliluutnantti", 18),
	("vara-amiraali", 18),
	("2. luokan armeijankomentaja", 19),
	("amiraali", 19),
	("jalkaväenkenraali", 19),
	("jääkärikenraali", 19),
	("kenraali", 19),
	("lääkintäamiraali", 19),
	("ratsuväenkenraali", 19),
	("tykistönkenraali", 19),
	("1. luokan armeijankomentaja", 20),
	("sotamarsalkka", 20),
	("neuvostoliiton marsalkka", 21),
	("suomen marsalkka", 21),
];

pub const RANK_CLASS_SCORES: &[(&str, i32)] = &[
	("Kenraalikunta", 1),
	("Esiupseeri", 1),
	("Komppaniaupseeri", 0),
	("Upseeri", 0),
	("kirkollinen henkilöstö", 1),
	("Aliupseeri", -7),
	("Miehistö", -7),
	("lottahenkilöstö", 0),
	("virkahenkilöstö", 0),
	("Jääkäriarvo", 0),
	("Muu arvo", 0),
	("Päällystö", 0),
	("Saksalaisarvo", 0),
	("eläinlääkintähenkilöstö", 0),
	("lääkintähenkilöstö", 0),
	("musiikkihenkilöstö", 0),
	("tekninen henkilöstö", 0),
	("NA", 0),
];
