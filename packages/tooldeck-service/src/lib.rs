pub mod admin;
pub mod cache;
pub mod clock;
pub mod cursor;
pub mod error;
pub mod fallback;
pub mod list;
pub mod lookup;
pub mod query;
pub mod rate_limit;
pub mod response;
pub mod source;

use std::{future::Future, pin::Pin, sync::Arc};

pub use admin::CacheStatus;
pub use cache::{CacheEntry, CatalogCache, Snapshot};
pub use clock::{Clock, SystemClock};
pub use error::{Error, Result};
pub use fallback::FallbackTier;
pub use list::ListRequest;
pub use query::{CatalogQuery, ListParams, SortKey, ValidationIssue};
pub use rate_limit::{RateDecision, RateLimiter};
pub use response::{CacheMeta, ListOutcome, ListReply, ListResponse, LookupReply, ServedFrom};
pub use source::{CatalogSource, FileSource, HttpSource};

use tooldeck_config::Config;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Owns the per-instance cache and limiter and runs the read paths against them.
pub struct CatalogService {
	pub cfg: Config,
	pub cache: CatalogCache,
	pub limiter: RateLimiter,
}
impl CatalogService {
	pub fn new(cfg: Config, source: Arc<dyn CatalogSource>, clock: Arc<dyn Clock>) -> Self {
		let cache = CatalogCache::new(source, clock.clone(), cfg.cache.ttl_ms);
		let limiter = RateLimiter::new(&cfg.rate_limit, clock);

		Self { cfg, cache, limiter }
	}

	pub fn from_config(cfg: Config) -> Result<Self> {
		let source = source::from_config(&cfg.source)?;

		Ok(Self::new(cfg, source, Arc::new(SystemClock)))
	}

	pub(crate) fn admit(&self, client_key: &str) -> Result<RateDecision> {
		let decision = self.limiter.check(client_key);

		if decision.limited {
			return Err(Error::RateLimited { decision });
		}

		Ok(decision)
	}

	pub(crate) fn cache_meta(&self, snapshot: &Snapshot, etag: String) -> CacheMeta {
		CacheMeta {
			etag,
			cache_control: self.cfg.cache.cache_control.clone(),
			served_from: if snapshot.from_cache { ServedFrom::Cache } else { ServedFrom::Live },
			fetched_at_ms: clock::unix_millis(snapshot.fetched_at),
		}
	}
}
