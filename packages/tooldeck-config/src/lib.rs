mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Cache, ConditionalScope, Config, Fallback, Query, RateLimit, Service, Source, SourceKind,
};

use std::{fs, net::SocketAddr, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } => {
			Error::ParseConfig { path: path.to_path_buf(), source }
		},
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: "<inline>".into(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	let admin_addr: SocketAddr = cfg.service.admin_bind.parse().map_err(|_| Error::Validation {
		message: "service.admin_bind must be a socket address.".to_string(),
	})?;

	if !admin_addr.ip().is_loopback() {
		return Err(Error::Validation {
			message: "service.admin_bind must be a loopback address.".to_string(),
		});
	}

	match cfg.source.kind {
		SourceKind::File if cfg.source.path.is_none() => {
			return Err(Error::Validation {
				message: "source.path is required when source.kind is file.".to_string(),
			});
		},
		SourceKind::Http if cfg.source.url.is_none() => {
			return Err(Error::Validation {
				message: "source.url is required when source.kind is http.".to_string(),
			});
		},
		_ => {},
	}

	if cfg.source.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "source.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.cache.ttl_ms == 0 {
		return Err(Error::Validation {
			message: "cache.ttl_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.cache.cache_control.trim().is_empty() {
		return Err(Error::Validation {
			message: "cache.cache_control must be non-empty.".to_string(),
		});
	}
	if cfg.rate_limit.capacity == 0 {
		return Err(Error::Validation {
			message: "rate_limit.capacity must be greater than zero.".to_string(),
		});
	}
	if cfg.rate_limit.window_ms < 1_000 {
		return Err(Error::Validation {
			message: "rate_limit.window_ms must be at least 1000.".to_string(),
		});
	}
	if cfg.rate_limit.max_keys == 0 {
		return Err(Error::Validation {
			message: "rate_limit.max_keys must be greater than zero.".to_string(),
		});
	}
	if cfg.query.default_limit == 0 {
		return Err(Error::Validation {
			message: "query.default_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.query.default_limit > cfg.query.max_limit {
		return Err(Error::Validation {
			message: "query.default_limit must not exceed query.max_limit.".to_string(),
		});
	}

	for (label, value) in [
		("query.max_query_chars", cfg.query.max_query_chars),
		("query.max_tags", cfg.query.max_tags),
		("query.max_tag_chars", cfg.query.max_tag_chars),
		("fallback.min_k", cfg.fallback.min_k),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.source.path.as_deref().map(|path| path.trim().is_empty()).unwrap_or(false) {
		cfg.source.path = None;
	}
	if cfg.source.url.as_deref().map(|url| url.trim().is_empty()).unwrap_or(false) {
		cfg.source.url = None;
	}
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
}
