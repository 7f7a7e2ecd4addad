use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub source: Source,
	#[serde(default)]
	pub cache: Cache,
	#[serde(default)]
	pub rate_limit: RateLimit,
	#[serde(default)]
	pub query: Query,
	#[serde(default)]
	pub fallback: Fallback,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
	File,
	Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Source {
	pub kind: SourceKind,
	/// Required when `kind = "file"`. Path to a JSON array of catalog records.
	pub path: Option<String>,
	/// Required when `kind = "http"`.
	pub url: Option<String>,
	#[serde(default = "default_source_timeout_ms")]
	pub timeout_ms: u64,
}

/// Which content the `ETag` of a listing response is derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalScope {
	/// Whole unfiltered snapshot. A client may get "not modified" for a query whose page would
	/// differ only if the snapshot changed elsewhere.
	#[default]
	Catalog,
	/// Snapshot fingerprint combined with the normalized query.
	Query,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Cache {
	pub ttl_ms: u64,
	pub cache_control: String,
	pub conditional_scope: ConditionalScope,
}
impl Default for Cache {
	fn default() -> Self {
		Self {
			ttl_ms: 5 * 60 * 1_000,
			cache_control: "public, max-age=60, s-maxage=300, stale-while-revalidate=300"
				.to_string(),
			conditional_scope: ConditionalScope::Catalog,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimit {
	pub capacity: u32,
	pub window_ms: u64,
	/// Upper bound on tracked client keys before eviction kicks in.
	pub max_keys: usize,
}
impl Default for RateLimit {
	fn default() -> Self {
		Self { capacity: 60, window_ms: 60_000, max_keys: 10_000 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Query {
	pub default_limit: u32,
	pub max_limit: u32,
	pub max_query_chars: usize,
	pub max_tags: usize,
	pub max_tag_chars: usize,
}
impl Default for Query {
	fn default() -> Self {
		Self {
			default_limit: 20,
			max_limit: 50,
			max_query_chars: 100,
			max_tags: 10,
			max_tag_chars: 32,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Fallback {
	pub enabled: bool,
	pub min_k: usize,
}
impl Default for Fallback {
	fn default() -> Self {
		Self { enabled: true, min_k: 3 }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_source_timeout_ms() -> u64 {
	10_000
}
