use tooldeck_domain::{Service, model};

use crate::{CatalogService, Error, Result, response::LookupReply};

impl CatalogService {
	/// Finds one record by exact `id`, falling back to a case-insensitive domain match.
	pub async fn get_service(&self, client_key: &str, id_or_domain: &str) -> Result<LookupReply> {
		let rate = self.admit(client_key)?;
		let needle = id_or_domain.trim();

		if needle.is_empty() {
			return Err(Error::NotFound { message: "Service id is empty.".to_string() });
		}

		let snapshot = self.cache.get(false).await?;
		let service = find(&snapshot.services, needle).cloned().ok_or_else(|| Error::NotFound {
			message: format!("No service matches '{needle}'."),
		})?;
		let meta = self.cache_meta(&snapshot, snapshot.fingerprint.clone());

		Ok(LookupReply { rate, service, meta })
	}
}

pub fn find<'a>(services: &'a [Service], needle: &str) -> Option<&'a Service> {
	if let Some(service) = services.iter().find(|service| service.id == needle) {
		return Some(service);
	}

	let domain = model::host_of(needle)?;

	services.iter().find(|service| service.domain().as_deref() == Some(domain.as_str()))
}
