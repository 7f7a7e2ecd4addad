use std::{collections::HashMap, net::IpAddr, sync::Arc};

use parking_lot::Mutex;
use serde::Serialize;
use time::{Duration, OffsetDateTime};

use tooldeck_config::RateLimit;

use crate::clock::Clock;

pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateDecision {
	pub limited: bool,
	pub retry_after_secs: u64,
	pub limit: u32,
	pub remaining: u32,
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
	tokens: u32,
	window_start: OffsetDateTime,
}

/// Fixed-window request counter per client key.
///
/// Quotas reset at window boundaries rather than refilling continuously, so a client can spend
/// a full quota just before a boundary and another right after it.
pub struct RateLimiter {
	capacity: u32,
	window: Duration,
	max_keys: usize,
	clock: Arc<dyn Clock>,
	buckets: Mutex<HashMap<String, Bucket>>,
}
impl RateLimiter {
	pub fn new(cfg: &RateLimit, clock: Arc<dyn Clock>) -> Self {
		Self {
			capacity: cfg.capacity,
			window: Duration::milliseconds(cfg.window_ms.min(i64::MAX as u64) as i64),
			max_keys: cfg.max_keys.max(1),
			clock,
			buckets: Mutex::new(HashMap::new()),
		}
	}

	pub fn check(&self, client_key: &str) -> RateDecision {
		let now = self.clock.now();
		let mut buckets = self.buckets.lock();

		if !buckets.contains_key(client_key) && buckets.len() >= self.max_keys {
			self.evict(&mut buckets, now);
		}

		let bucket = buckets
			.entry(client_key.to_string())
			.or_insert(Bucket { tokens: self.capacity, window_start: now });

		if now - bucket.window_start >= self.window {
			bucket.tokens = self.capacity;
			bucket.window_start = now;
		}
		if bucket.tokens == 0 {
			let remaining_ms = (bucket.window_start + self.window - now).whole_milliseconds();
			let retry_after_secs = ((remaining_ms + 999) / 1_000).max(1) as u64;

			tracing::debug!(client_key, retry_after_secs, "Rate limit exceeded.");

			return RateDecision {
				limited: true,
				retry_after_secs,
				limit: self.capacity,
				remaining: 0,
			};
		}

		bucket.tokens -= 1;

		RateDecision {
			limited: false,
			retry_after_secs: 0,
			limit: self.capacity,
			remaining: bucket.tokens,
		}
	}

	pub fn tracked_keys(&self) -> usize {
		self.buckets.lock().len()
	}

	/// Expired buckets go first since a fresh bucket behaves identically. If that frees nothing,
	/// the bucket with the oldest window is dropped.
	fn evict(&self, buckets: &mut HashMap<String, Bucket>, now: OffsetDateTime) {
		let before = buckets.len();

		buckets.retain(|_, bucket| now - bucket.window_start < self.window);

		if buckets.len() >= self.max_keys
			&& let Some(oldest) = buckets
				.iter()
				.min_by_key(|(_, bucket)| bucket.window_start)
				.map(|(key, _)| key.clone())
		{
			buckets.remove(&oldest);
		}

		tracing::debug!(evicted = before - buckets.len(), "Evicted rate limit buckets.");
	}
}

/// First `X-Forwarded-For` hop, else the peer address, else a shared `unknown` key.
pub fn client_key(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> String {
	if let Some(first) = forwarded_for.and_then(|value| value.split(',').next())
		&& !first.trim().is_empty()
	{
		return first.trim().to_string();
	}

	match peer {
		Some(ip) => ip.to_string(),
		None => UNKNOWN_CLIENT.to_string(),
	}
}
