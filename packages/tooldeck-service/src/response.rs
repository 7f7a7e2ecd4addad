use serde::Serialize;

use tooldeck_domain::{Service, ThinService};

use crate::{fallback::FallbackTier, rate_limit::RateDecision};

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ServicesPage {
	Full(Vec<Service>),
	Thin(Vec<ThinService>),
}
impl ServicesPage {
	pub fn project(items: &[&Service], thin: bool) -> Self {
		if thin {
			Self::Thin(items.iter().map(|service| service.thin()).collect())
		} else {
			Self::Full(items.iter().map(|service| (*service).clone()).collect())
		}
	}

	pub fn len(&self) -> usize {
		match self {
			Self::Full(items) => items.len(),
			Self::Thin(items) => items.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
	pub services: ServicesPage,
	pub total: usize,
	pub next_cursor: Option<String>,
	pub fallback: FallbackTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
	Cache,
	Live,
}
impl ServedFrom {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Cache => "cache",
			Self::Live => "live",
		}
	}
}

/// Conditional-caching metadata attached to every successful read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheMeta {
	pub etag: String,
	pub cache_control: String,
	pub served_from: ServedFrom,
	pub fetched_at_ms: i64,
}

#[derive(Debug, Clone)]
pub enum ListOutcome {
	NotModified { meta: CacheMeta },
	Page { body: ListResponse, meta: CacheMeta },
}

#[derive(Debug, Clone)]
pub struct ListReply {
	pub rate: RateDecision,
	pub outcome: ListOutcome,
}

#[derive(Debug, Clone)]
pub struct LookupReply {
	pub rate: RateDecision,
	pub service: Service,
	pub meta: CacheMeta,
}

/// Weak validator for one normalized query against one snapshot.
pub fn query_etag(catalog_fingerprint: &str, cache_key: &str) -> String {
	let mut hasher = blake3::Hasher::new();

	hasher.update(catalog_fingerprint.as_bytes());
	hasher.update(b"\n");
	hasher.update(cache_key.as_bytes());

	let hash = hasher.finalize().to_hex();

	format!("W/\"{}-q\"", &hash.as_str()[..16])
}

/// Weak comparison against a comma-separated `If-None-Match` value. `*` matches anything.
pub fn if_none_match_matches(header: &str, etag: &str) -> bool {
	let etag = strip_weak(etag);

	header.split(',').map(str::trim).any(|candidate| candidate == "*" || strip_weak(candidate) == etag)
}

fn strip_weak(tag: &str) -> &str {
	tag.strip_prefix("W/").unwrap_or(tag)
}
