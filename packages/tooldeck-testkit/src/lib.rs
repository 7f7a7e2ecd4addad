use std::sync::{
	Arc,
	atomic::{AtomicBool, AtomicUsize, Ordering},
};

use parking_lot::Mutex;
use time::{Duration, OffsetDateTime, macros::datetime};
use tokio::sync::Barrier;

use tooldeck_config::{
	Cache, ConditionalScope, Config, Fallback, Query, RateLimit, Service as ServiceCfg, Source,
	SourceKind,
};
use tooldeck_domain::{Category, Pricing, Service};
use tooldeck_service::{BoxFuture, CatalogService, CatalogSource, Clock, Error, Result};

pub const EPOCH: OffsetDateTime = datetime!(2026-01-01 00:00 UTC);

/// A clock that only moves when told to.
pub struct ManualClock {
	now: Mutex<OffsetDateTime>,
}
impl ManualClock {
	pub fn new(start: OffsetDateTime) -> Self {
		Self { now: Mutex::new(start) }
	}

	pub fn advance(&self, by: Duration) {
		*self.now.lock() += by;
	}

	pub fn advance_ms(&self, ms: i64) {
		self.advance(Duration::milliseconds(ms));
	}

	pub fn set(&self, at: OffsetDateTime) {
		*self.now.lock() = at;
	}
}
impl Default for ManualClock {
	fn default() -> Self {
		Self::new(EPOCH)
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.now.lock()
	}
}

/// In-memory catalog source with switchable failure and call counting.
#[derive(Default)]
pub struct StubSource {
	catalog: Mutex<Vec<Service>>,
	failing: AtomicBool,
	calls: AtomicUsize,
	barrier: Mutex<Option<Arc<Barrier>>>,
}
impl StubSource {
	pub fn new(catalog: Vec<Service>) -> Self {
		Self { catalog: Mutex::new(catalog), ..Default::default() }
	}

	pub fn replace(&self, catalog: Vec<Service>) {
		*self.catalog.lock() = catalog;
	}

	pub fn set_failing(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	/// Every later fetch waits on `barrier` before answering, so concurrent refreshes overlap.
	pub fn arm_barrier(&self, barrier: Arc<Barrier>) {
		*self.barrier.lock() = Some(barrier);
	}
}
impl CatalogSource for StubSource {
	fn fetch_all(&self) -> BoxFuture<'_, Result<Vec<Service>>> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let barrier = self.barrier.lock().clone();

			if let Some(barrier) = barrier {
				barrier.wait().await;
			}
			if self.failing.load(Ordering::SeqCst) {
				return Err(Error::Upstream { message: "stub source is failing".to_string() });
			}

			Ok(self.catalog.lock().clone())
		})
	}
}

/// Everything a service test needs a handle on.
pub struct Harness {
	pub service: Arc<CatalogService>,
	pub source: Arc<StubSource>,
	pub clock: Arc<ManualClock>,
}
impl Harness {
	pub fn new(cfg: Config, catalog: Vec<Service>) -> Self {
		let source = Arc::new(StubSource::new(catalog));
		let clock = Arc::new(ManualClock::default());
		let service = Arc::new(CatalogService::new(cfg, source.clone(), clock.clone()));

		Self { service, source, clock }
	}

	pub fn with_catalog(catalog: Vec<Service>) -> Self {
		Self::new(test_config(), catalog)
	}
}

pub fn test_config() -> Config {
	Config {
		service: ServiceCfg {
			http_bind: "127.0.0.1:0".to_string(),
			admin_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		source: Source {
			kind: SourceKind::File,
			path: Some("catalog.json".to_string()),
			url: None,
			timeout_ms: 1_000,
		},
		cache: Cache { conditional_scope: ConditionalScope::Catalog, ..Default::default() },
		rate_limit: RateLimit::default(),
		query: Query::default(),
		fallback: Fallback::default(),
	}
}

/// Deterministic record `index`. Names are zero-padded so `sort=name` keeps index order.
pub fn sample_service(index: usize) -> Service {
	let category = Category::ALL[index % Category::ALL.len()];
	let pricing = match index % 3 {
		0 => vec![Pricing::Free],
		1 => vec![Pricing::Partial, Pricing::Subscription],
		_ => vec![Pricing::Paid],
	};

	Service {
		id: format!("svc-{index:03}"),
		name: format!("Service {index:03}"),
		summary: format!("{category} tool number {index}"),
		description: format!("Long description of service {index}."),
		url: format!("https://www.svc{index}.example.com/home"),
		features: vec![format!("feature-{}", index % 5), format!("group-{}", index % 2)],
		category,
		pricing,
		rating: (index % 50) as f64 / 10.0,
		user_count: (index as u64) * 100,
		icon: String::new(),
	}
}

pub fn catalog(len: usize) -> Vec<Service> {
	(0..len).map(sample_service).collect()
}
