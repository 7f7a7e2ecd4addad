//! Tiered ranking used when the primary filters match nothing.
//!
//! Tiers escalate `relaxed`, then `keyword`, then `global`; the first tier that yields at least
//! one record wins. Each tier is a pure function over the snapshot so it can be exercised alone.

use serde::Serialize;

use tooldeck_domain::Service;

use crate::{
	cursor,
	query::{
		CatalogQuery,
		filter::{self, TagMode},
		sort,
	},
};

const EXACT_FIELD_SCORE: u32 = 5;
const SUBSTRING_FIELD_SCORE: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackTier {
	#[default]
	None,
	Relaxed,
	Keyword,
	Global,
}
impl FallbackTier {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Relaxed => "relaxed",
			Self::Keyword => "keyword",
			Self::Global => "global",
		}
	}
}

#[derive(Debug, Clone)]
pub struct FallbackPage<'a> {
	pub tier: FallbackTier,
	pub items: Vec<&'a Service>,
	/// Candidate count of the selected tier before slicing.
	pub total: usize,
	pub next_cursor: Option<String>,
}

/// Drops the category filter and accepts records matching any tag. Text and pricing still apply.
pub fn relaxed<'a>(services: &'a [Service], query: &CatalogQuery) -> Vec<&'a Service> {
	let needle = query.text.to_lowercase();
	let mut matched: Vec<&Service> = services
		.iter()
		.filter(|service| filter::matches_text(service, &needle))
		.filter(|service| filter::matches_pricing(service, query.pricing))
		.filter(|service| filter::matches_tags(service, &query.tags, TagMode::Any))
		.collect();

	sort::sort_services(&mut matched, query.sort, query.boost_category());

	matched
}

/// Scores every record against the raw query text, ignoring all structural filters.
pub fn keyword<'a>(services: &'a [Service], query: &CatalogQuery) -> Vec<&'a Service> {
	let needle = query.text.trim().to_lowercase();

	if needle.is_empty() {
		return Vec::new();
	}

	let mut scored: Vec<(u32, &Service)> = services
		.iter()
		.map(|service| (keyword_score(service, &needle), service))
		.filter(|(score, _)| *score > 0)
		.collect();

	scored.sort_by(|a, b| b.0.cmp(&a.0));

	scored.into_iter().map(|(_, service)| service).collect()
}

/// The whole snapshot ordered by the requested sort key.
pub fn global_top_k<'a>(services: &'a [Service], query: &CatalogQuery) -> Vec<&'a Service> {
	let mut all: Vec<&Service> = services.iter().collect();

	sort::sort_services(&mut all, query.sort, None);

	all
}

/// `needle` must be trimmed and lowercased. `features` counts as a single field.
pub fn keyword_score(service: &Service, needle: &str) -> u32 {
	let mut score = field_score(&service.name, needle)
		+ field_score(&service.summary, needle)
		+ field_score(&service.description, needle);
	let features: Vec<String> =
		service.features.iter().map(|feature| feature.trim().to_lowercase()).collect();

	if features.iter().any(|feature| feature == needle) {
		score += EXACT_FIELD_SCORE;
	} else if features.iter().any(|feature| feature.contains(needle)) {
		score += SUBSTRING_FIELD_SCORE;
	}

	score
}

pub fn rank<'a>(services: &'a [Service], query: &CatalogQuery, min_k: usize) -> FallbackPage<'a> {
	let relaxed = relaxed(services, query);

	if !relaxed.is_empty() {
		let len = slice_len(min_k, query.limit, relaxed.len());

		return page(FallbackTier::Relaxed, relaxed, len);
	}

	let keyword = keyword(services, query);

	if !keyword.is_empty() {
		let len = slice_len(min_k, query.limit, keyword.len());

		return page(FallbackTier::Keyword, keyword, len);
	}

	let global = global_top_k(services, query);
	let len = min_k.min(global.len());

	page(FallbackTier::Global, global, len)
}

/// At least `min_k` records even when `limit` asks for fewer, never more than exist.
fn slice_len(min_k: usize, limit: usize, count: usize) -> usize {
	min_k.max(limit.min(count)).min(count)
}

fn page<'a>(tier: FallbackTier, mut candidates: Vec<&'a Service>, len: usize) -> FallbackPage<'a> {
	let total = candidates.len();
	let len = len.min(total);

	candidates.truncate(len);

	let next_cursor = (total > len).then(|| cursor::encode_cursor(len as u64));

	tracing::debug!(tier = tier.as_str(), total, returned = len, "Fallback tier selected.");

	FallbackPage { tier, items: candidates, total, next_cursor }
}

fn field_score(value: &str, needle: &str) -> u32 {
	let value = value.trim().to_lowercase();

	if value == needle {
		EXACT_FIELD_SCORE
	} else if value.contains(needle) {
		SUBSTRING_FIELD_SCORE
	} else {
		0
	}
}

#[cfg(test)]
mod tests {
	use tooldeck_domain::{Category, Pricing};

	use super::*;
	use crate::query::SortKey;

	fn service(id: &str, name: &str, category: Category, features: &[&str], rating: f64) -> Service {
		Service {
			id: id.to_string(),
			name: name.to_string(),
			summary: format!("{name} summary"),
			description: String::new(),
			url: format!("https://{id}.example.com"),
			features: features.iter().map(|feature| feature.to_string()).collect(),
			category,
			pricing: vec![Pricing::Free],
			rating,
			user_count: 0,
			icon: String::new(),
		}
	}

	fn query(text: &str, tags: &[&str], limit: usize) -> CatalogQuery {
		CatalogQuery {
			text: text.to_string(),
			category: Some(Category::Chat),
			pricing: None,
			tags: tags.iter().map(|tag| tag.to_string()).collect(),
			sort: SortKey::Rating,
			offset: 0,
			limit,
			thin: false,
		}
	}

	fn catalog() -> Vec<Service> {
		vec![
			service("a", "Painter", Category::Image, &["draw", "sketch"], 4.0),
			service("b", "Scribe", Category::Writing, &["essay"], 4.5),
			service("c", "Coder", Category::Coding, &["draw"], 3.0),
			service("d", "Talker", Category::Audio, &["voice"], 4.9),
		]
	}

	#[test]
	fn relaxed_accepts_any_tag_and_ignores_category() {
		let services = catalog();
		let page = rank(&services, &query("", &["sketch", "missing"], 20), 3);

		assert_eq!(page.tier, FallbackTier::Relaxed);
		assert_eq!(page.items.len(), 1);
		assert_eq!(page.items[0].id, "a");
		assert!(page.next_cursor.is_none());
	}

	#[test]
	fn keyword_scores_exact_matches_above_substrings() {
		let services = catalog();
		let needle = "scribe";

		assert_eq!(keyword_score(&services[1], needle), EXACT_FIELD_SCORE + SUBSTRING_FIELD_SCORE);
		assert_eq!(keyword_score(&services[0], needle), 0);
		assert_eq!(keyword_score(&services[0], "draw"), EXACT_FIELD_SCORE);
	}

	#[test]
	fn keyword_tier_runs_only_when_relaxed_is_empty() {
		let services = catalog();
		// Every summary contains the text but no record carries the tag, so relaxed finds nothing.
		let page = rank(&services, &query("summary", &["nope"], 20), 3);

		assert_eq!(page.tier, FallbackTier::Keyword);
		assert_eq!(page.total, 4);
		assert_eq!(page.items.len(), 4);
	}

	#[test]
	fn global_tier_returns_min_k_top_rated() {
		let services = catalog();
		let page = rank(&services, &query("zz-no-match", &[], 1), 3);

		assert_eq!(page.tier, FallbackTier::Global);
		assert_eq!(page.items.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(), ["d", "b", "a"]);
		assert_eq!(page.total, 4);
		assert_eq!(page.next_cursor.as_deref().map(cursor::decode_cursor), Some(Ok(3)));
	}

	#[test]
	fn slices_to_at_least_min_k() {
		assert_eq!(slice_len(3, 1, 10), 3);
		assert_eq!(slice_len(3, 5, 10), 5);
		assert_eq!(slice_len(3, 5, 2), 2);
		assert_eq!(slice_len(3, 20, 4), 4);
	}
}
