use tooldeck_config::ConditionalScope;

use crate::{
	CatalogService, Error, Result,
	fallback::{self, FallbackTier},
	query::{self, CatalogQuery, ListParams, ValidationIssue},
	response::{self, ListOutcome, ListReply, ListResponse, ServicesPage},
};

#[derive(Debug, Clone, Default)]
pub struct ListRequest {
	/// Rate limiting key, usually derived with [`crate::rate_limit::client_key`].
	pub client_key: String,
	pub params: ListParams,
	pub if_none_match: Option<String>,
}

impl CatalogService {
	pub async fn list(&self, req: ListRequest) -> Result<ListReply> {
		let rate = self.admit(&req.client_key)?;
		let force_refresh = req.params.force_refresh();
		let snapshot = self.cache.get(force_refresh).await?;
		let conditional = if force_refresh { None } else { req.if_none_match.as_deref() };
		let (query, etag) = match self.cfg.cache.conditional_scope {
			ConditionalScope::Catalog => {
				let etag = snapshot.fingerprint.clone();

				if conditional.is_some_and(|header| response::if_none_match_matches(header, &etag)) {
					let meta = self.cache_meta(&snapshot, etag);

					return Ok(ListReply { rate, outcome: ListOutcome::NotModified { meta } });
				}

				(self.parse_query(&req.params)?, etag)
			},
			ConditionalScope::Query => {
				let query = self.parse_query(&req.params)?;
				let etag = response::query_etag(&snapshot.fingerprint, &query.cache_key());

				if conditional.is_some_and(|header| response::if_none_match_matches(header, &etag)) {
					let meta = self.cache_meta(&snapshot, etag);

					return Ok(ListReply { rate, outcome: ListOutcome::NotModified { meta } });
				}

				(query, etag)
			},
		};
		let services = snapshot.services.as_slice();
		let primary = query::apply(services, &query);
		let body = if primary.total == 0 && self.cfg.fallback.enabled && !services.is_empty() {
			let ranked = fallback::rank(services, &query, self.cfg.fallback.min_k);

			ListResponse {
				services: ServicesPage::project(&ranked.items, query.thin),
				total: ranked.total,
				next_cursor: ranked.next_cursor,
				fallback: ranked.tier,
			}
		} else {
			ListResponse {
				services: ServicesPage::project(&primary.items, query.thin),
				total: primary.total,
				next_cursor: primary.next_cursor,
				fallback: FallbackTier::None,
			}
		};
		let meta = self.cache_meta(&snapshot, etag);

		Ok(ListReply { rate, outcome: ListOutcome::Page { body, meta } })
	}

	/// Error for a query string that could not be decoded at all. The request still counts
	/// against the client's quota, and a limited client gets the rate limit error instead.
	pub fn reject_params(&self, client_key: &str, message: impl Into<String>) -> Error {
		match self.admit(client_key) {
			Ok(_) => Error::Validation {
				issues: vec![ValidationIssue { field: "query".to_string(), message: message.into() }],
			},
			Err(err) => err,
		}
	}

	fn parse_query(&self, params: &ListParams) -> Result<CatalogQuery> {
		CatalogQuery::parse(params, &self.cfg.query).map_err(|issues| Error::Validation { issues })
	}
}
