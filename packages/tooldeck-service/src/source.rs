use std::{collections::HashSet, path::PathBuf, sync::Arc, time::Duration};

use reqwest::Client;
use serde_json::Value;

use tooldeck_config::{Source, SourceKind};
use tooldeck_domain::{RawService, Service};

use crate::{BoxFuture, Error, Result};

/// Supplies the full, normalized catalog on demand.
pub trait CatalogSource
where
	Self: Send + Sync,
{
	fn fetch_all(&self) -> BoxFuture<'_, Result<Vec<Service>>>;
}

/// Reads a JSON snapshot from disk on every fetch.
#[derive(Debug, Clone)]
pub struct FileSource {
	path: PathBuf,
}
impl FileSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}
impl CatalogSource for FileSource {
	fn fetch_all(&self) -> BoxFuture<'_, Result<Vec<Service>>> {
		Box::pin(async move {
			let raw = tokio::fs::read_to_string(&self.path).await.map_err(|err| {
				Error::Upstream {
					message: format!("Failed to read catalog snapshot {:?}: {err}", self.path),
				}
			})?;
			let json: Value = serde_json::from_str(&raw).map_err(|err| Error::Upstream {
				message: format!("Catalog snapshot is not valid JSON: {err}"),
			})?;

			parse_catalog(json)
		})
	}
}

/// Fetches the catalog as JSON from an upstream endpoint.
#[derive(Debug, Clone)]
pub struct HttpSource {
	client: Client,
	url: String,
}
impl HttpSource {
	pub fn new(url: impl Into<String>, timeout_ms: u64) -> Result<Self> {
		let client = Client::builder()
			.timeout(Duration::from_millis(timeout_ms))
			.build()
			.map_err(|err| Error::Internal { message: format!("Failed to build client: {err}") })?;

		Ok(Self { client, url: url.into() })
	}
}
impl CatalogSource for HttpSource {
	fn fetch_all(&self) -> BoxFuture<'_, Result<Vec<Service>>> {
		Box::pin(async move {
			let upstream = |err: reqwest::Error| Error::Upstream {
				message: format!("Catalog request to {} failed: {err}", self.url),
			};
			let res = self.client.get(&self.url).send().await.map_err(upstream)?;
			let json: Value = res.error_for_status().map_err(upstream)?.json().await.map_err(upstream)?;

			parse_catalog(json)
		})
	}
}

pub fn from_config(cfg: &Source) -> Result<Arc<dyn CatalogSource>> {
	match cfg.kind {
		SourceKind::File => {
			let path = cfg.path.as_deref().ok_or_else(|| Error::Internal {
				message: "source.path is required for the file source.".to_string(),
			})?;

			Ok(Arc::new(FileSource::new(path)))
		},
		SourceKind::Http => {
			let url = cfg.url.as_deref().ok_or_else(|| Error::Internal {
				message: "source.url is required for the http source.".to_string(),
			})?;

			Ok(Arc::new(HttpSource::new(url, cfg.timeout_ms)?))
		},
	}
}

/// Accepts a bare array of records or an object wrapping one under `services` or `data`.
///
/// Ids are unique in the result. A repeated source id keeps its first record; a generated id
/// that collides with an earlier one gets a numeric suffix.
pub fn parse_catalog(json: Value) -> Result<Vec<Service>> {
	let items = match json {
		Value::Array(items) => items,
		Value::Object(mut map) => match map.remove("services").or_else(|| map.remove("data")) {
			Some(Value::Array(items)) => items,
			_ => {
				return Err(Error::Upstream {
					message: "Catalog payload is missing a services array.".to_string(),
				});
			},
		},
		_ => {
			return Err(Error::Upstream {
				message: "Catalog payload must be an array or an object.".to_string(),
			});
		},
	};
	let mut services = Vec::with_capacity(items.len());
	let mut seen = HashSet::with_capacity(items.len());

	for (index, item) in items.into_iter().enumerate() {
		let raw: RawService = serde_json::from_value(item).map_err(|err| Error::Upstream {
			message: format!("Catalog record {index} is malformed: {err}"),
		})?;
		let generated = !raw.has_id();
		let mut service = raw.normalize(index);

		if !seen.contains(&service.id) {
			seen.insert(service.id.clone());
			services.push(service);

			continue;
		}
		if !generated {
			tracing::warn!(id = %service.id, index, "Dropping catalog record with a duplicate id.");

			continue;
		}

		let mut suffix = 1_usize;

		while seen.contains(&format!("{}-{suffix}", service.id)) {
			suffix += 1;
		}

		service.id = format!("{}-{suffix}", service.id);

		seen.insert(service.id.clone());
		services.push(service);
	}

	Ok(services)
}
