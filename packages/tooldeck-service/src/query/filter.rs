use tooldeck_domain::{Category, Pricing, Service};

use crate::query::CatalogQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMode {
	All,
	Any,
}

/// `needle` must already be lowercased. An empty needle matches everything.
pub fn matches_text(service: &Service, needle: &str) -> bool {
	if needle.is_empty() {
		return true;
	}

	service.name.to_lowercase().contains(needle)
		|| service.summary.to_lowercase().contains(needle)
		|| service.description.to_lowercase().contains(needle)
		|| service.features.iter().any(|feature| feature.to_lowercase().contains(needle))
}

pub fn matches_category(service: &Service, category: Option<Category>) -> bool {
	category.is_none_or(|category| service.category == category)
}

pub fn matches_pricing(service: &Service, pricing: Option<Pricing>) -> bool {
	pricing.is_none_or(|pricing| service.pricing.contains(&pricing))
}

/// Each tag is a case-insensitive substring of at least one feature. No tags always matches.
pub fn matches_tags(service: &Service, tags: &[String], mode: TagMode) -> bool {
	if tags.is_empty() {
		return true;
	}

	let features: Vec<String> =
		service.features.iter().map(|feature| feature.to_lowercase()).collect();
	let hit = |tag: &String| {
		let tag = tag.to_lowercase();

		features.iter().any(|feature| feature.contains(&tag))
	};

	match mode {
		TagMode::All => tags.iter().all(hit),
		TagMode::Any => tags.iter().any(hit),
	}
}

pub fn primary<'a>(services: &'a [Service], query: &CatalogQuery) -> Vec<&'a Service> {
	let needle = query.text.to_lowercase();

	services
		.iter()
		.filter(|service| matches_text(service, &needle))
		.filter(|service| matches_category(service, query.category))
		.filter(|service| matches_pricing(service, query.pricing))
		.filter(|service| matches_tags(service, &query.tags, TagMode::All))
		.collect()
}
