use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::{Table, Value};

use tooldeck_config::{ConditionalScope, Error, SourceKind};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Table = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let table = root
		.get_mut(section)
		.and_then(Value::as_table_mut)
		.expect("Sample config must include the section.");

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render sample config.")
}

fn sample_without(sections: &[&str]) -> String {
	let mut root: Table = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");

	for section in sections {
		root.remove(*section);
	}

	toml::to_string(&root).expect("Failed to render sample config.")
}

fn write_temp_config(payload: &str) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("Clock went backwards.");
	let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
	let path = env::temp_dir().join(format!("tooldeck_config_{}_{seq}.toml", nanos.as_nanos()));

	fs::write(&path, payload).expect("Failed to write temp config.");

	path
}

fn expect_validation(raw: &str, needle: &str) {
	match tooldeck_config::parse(raw) {
		Err(Error::Validation { message }) => {
			assert!(message.contains(needle), "unexpected message: {message}")
		},
		other => panic!("Expected validation error containing {needle:?}, got {other:?}."),
	}
}

#[test]
fn sample_config_loads_from_disk() {
	let path = write_temp_config(SAMPLE_CONFIG_TOML);
	let cfg = tooldeck_config::load(&path).expect("Sample config must load.");

	fs::remove_file(&path).ok();

	assert_eq!(cfg.source.kind, SourceKind::File);
	assert_eq!(cfg.source.path.as_deref(), Some("data/catalog.json"));
	assert_eq!(cfg.cache.ttl_ms, 300_000);
	assert_eq!(cfg.cache.conditional_scope, ConditionalScope::Catalog);
	assert_eq!(cfg.rate_limit.capacity, 60);
	assert_eq!(cfg.query.default_limit, 20);
	assert_eq!(cfg.fallback.min_k, 3);
}

#[test]
fn missing_file_reports_path() {
	let path = env::temp_dir().join("tooldeck_config_does_not_exist.toml");

	match tooldeck_config::load(&path) {
		Err(Error::ReadConfig { path: reported, .. }) => assert_eq!(reported, path),
		other => panic!("Expected read error, got {other:?}."),
	}
}

#[test]
fn malformed_toml_reports_path() {
	let path = write_temp_config("[service\nhttp_bind = ");
	let result = tooldeck_config::load(&path);

	fs::remove_file(&path).ok();

	match result {
		Err(Error::ParseConfig { path: reported, .. }) => assert_eq!(reported, path),
		other => panic!("Expected parse error, got {other:?}."),
	}
}

#[test]
fn optional_sections_fall_back_to_defaults() {
	let raw = sample_without(&["cache", "rate_limit", "query", "fallback"]);
	let cfg = tooldeck_config::parse(&raw).expect("Defaults must validate.");

	assert_eq!(cfg.cache.ttl_ms, 300_000);
	assert_eq!(cfg.rate_limit.window_ms, 60_000);
	assert_eq!(cfg.query.max_limit, 50);
	assert!(cfg.fallback.enabled);
}

#[test]
fn query_scope_parses() {
	let raw = sample_with("cache", "conditional_scope", Value::String("query".to_string()));
	let cfg = tooldeck_config::parse(&raw).expect("Query scope must validate.");

	assert_eq!(cfg.cache.conditional_scope, ConditionalScope::Query);
}

#[test]
fn unknown_conditional_scope_is_a_parse_error() {
	let raw = sample_with("cache", "conditional_scope", Value::String("route".to_string()));

	assert!(matches!(tooldeck_config::parse(&raw), Err(Error::ParseConfig { .. })));
}

#[test]
fn rejects_non_loopback_admin_bind() {
	let raw = sample_with("service", "admin_bind", Value::String("0.0.0.0:8081".to_string()));

	expect_validation(&raw, "loopback");
}

#[test]
fn rejects_http_source_without_url() {
	let raw = sample_with("source", "kind", Value::String("http".to_string()));

	expect_validation(&raw, "source.url");
}

#[test]
fn blank_path_is_treated_as_missing() {
	let raw = sample_with("source", "path", Value::String("   ".to_string()));

	expect_validation(&raw, "source.path");
}

#[test]
fn rejects_zero_capacity() {
	let raw = sample_with("rate_limit", "capacity", Value::Integer(0));

	expect_validation(&raw, "rate_limit.capacity");
}

#[test]
fn rejects_default_limit_above_max() {
	let raw = sample_with("query", "default_limit", Value::Integer(80));

	expect_validation(&raw, "query.default_limit");
}

#[test]
fn rejects_zero_min_k() {
	let raw = sample_with("fallback", "min_k", Value::Integer(0));

	expect_validation(&raw, "fallback.min_k");
}
