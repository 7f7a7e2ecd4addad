use std::sync::Arc;

use parking_lot::RwLock;
use time::{Duration, OffsetDateTime};

use tooldeck_domain::Service;

use crate::{Error, Result, clock::Clock, source::CatalogSource};

/// One refresh worth of catalog content. Replaced wholesale, never patched.
#[derive(Debug)]
pub struct CacheEntry {
	pub services: Arc<Vec<Service>>,
	pub fingerprint: String,
	pub fetched_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
	pub services: Arc<Vec<Service>>,
	pub fingerprint: String,
	pub from_cache: bool,
	pub fetched_at: OffsetDateTime,
}
impl Snapshot {
	fn from_entry(entry: &CacheEntry, from_cache: bool) -> Self {
		Self {
			services: entry.services.clone(),
			fingerprint: entry.fingerprint.clone(),
			from_cache,
			fetched_at: entry.fetched_at,
		}
	}
}

#[derive(Default)]
struct Slot {
	current: Option<Arc<CacheEntry>>,
	/// Survives invalidation so upstream failures can still be absorbed.
	last_good: Option<Arc<CacheEntry>>,
}

/// Time-bounded cache of the full catalog.
///
/// There is no single-flight guard around refreshes: callers that observe a stale entry at the
/// same time each call the source, and the last write wins. Every write swaps a whole
/// [`CacheEntry`] under the lock, so readers never observe a mix of two refreshes.
pub struct CatalogCache {
	source: Arc<dyn CatalogSource>,
	clock: Arc<dyn Clock>,
	ttl: Duration,
	slot: RwLock<Slot>,
}
impl CatalogCache {
	pub fn new(source: Arc<dyn CatalogSource>, clock: Arc<dyn Clock>, ttl_ms: u64) -> Self {
		Self {
			source,
			clock,
			ttl: Duration::milliseconds(ttl_ms.min(i64::MAX as u64) as i64),
			slot: RwLock::new(Slot::default()),
		}
	}

	pub async fn get(&self, force_refresh: bool) -> Result<Snapshot> {
		let now = self.clock.now();
		let current = self.slot.read().current.clone();

		if !force_refresh
			&& let Some(entry) = current.as_ref()
			&& now - entry.fetched_at < self.ttl
		{
			return Ok(Snapshot::from_entry(entry, true));
		}

		match self.source.fetch_all().await {
			Ok(services) => {
				let fingerprint = fingerprint(&services)?;
				let entry = self.store(services, fingerprint);

				tracing::info!(
					records = entry.services.len(),
					fingerprint = %entry.fingerprint,
					"Catalog snapshot refreshed."
				);

				Ok(Snapshot::from_entry(&entry, false))
			},
			Err(err) => {
				let fallback = self.slot.read().last_good.clone();

				match fallback {
					Some(entry) => {
						tracing::warn!(
							error = %err,
							age_ms = (now - entry.fetched_at).whole_milliseconds() as i64,
							"Catalog refresh failed. Serving the last known-good snapshot."
						);

						Ok(Snapshot::from_entry(&entry, true))
					},
					None => {
						tracing::warn!(error = %err, "Catalog refresh failed with no snapshot to fall back on.");

						Err(match err {
							Error::Upstream { .. } => err,
							other => Error::Upstream { message: other.to_string() },
						})
					},
				}
			},
		}
	}

	/// Drops the current entry so the next [`CatalogCache::get`] refreshes.
	pub fn invalidate(&self) {
		self.slot.write().current = None;

		tracing::info!("Catalog cache invalidated.");
	}

	pub fn peek(&self) -> Option<Arc<CacheEntry>> {
		self.slot.read().current.clone()
	}

	fn store(&self, services: Vec<Service>, fingerprint: String) -> Arc<CacheEntry> {
		let mut slot = self.slot.write();
		let mut fetched_at = self.clock.now();

		if let Some(previous) = slot.last_good.as_ref()
			&& previous.fetched_at > fetched_at
		{
			fetched_at = previous.fetched_at;
		}

		let entry = Arc::new(CacheEntry { services: Arc::new(services), fingerprint, fetched_at });

		slot.current = Some(entry.clone());
		slot.last_good = Some(entry.clone());

		entry
	}
}

/// Deterministic weak validator over the serialized catalog.
pub fn fingerprint(services: &[Service]) -> Result<String> {
	let raw = serde_json::to_vec(services)?;
	let hash = blake3::hash(&raw).to_hex();

	Ok(format!("W/\"{}-{:x}\"", &hash.as_str()[..16], raw.len()))
}
