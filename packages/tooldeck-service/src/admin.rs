use serde::Serialize;

use crate::{CatalogService, clock};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
	pub fingerprint: Option<String>,
	pub records: usize,
	pub fetched_at_ms: Option<i64>,
	pub tracked_clients: usize,
}

impl CatalogService {
	pub fn invalidate_cache(&self) -> CacheStatus {
		self.cache.invalidate();

		self.cache_status()
	}

	pub fn cache_status(&self) -> CacheStatus {
		let entry = self.cache.peek();

		CacheStatus {
			fingerprint: entry.as_ref().map(|entry| entry.fingerprint.clone()),
			records: entry.as_ref().map(|entry| entry.services.len()).unwrap_or(0),
			fetched_at_ms: entry.as_ref().map(|entry| clock::unix_millis(entry.fetched_at)),
			tracked_clients: self.limiter.tracked_keys(),
		}
	}
}
