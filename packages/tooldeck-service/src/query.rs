pub mod filter;
pub mod sort;

use serde::{Deserialize, Serialize};

use tooldeck_domain::{Category, Pricing, Service, infer_category, tags};

use crate::cursor;

pub use sort::SortKey;

/// Raw listing query parameters, exactly as received.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListParams {
	pub thin: Option<String>,
	pub page: Option<String>,
	pub limit: Option<String>,
	pub offset: Option<String>,
	pub cursor: Option<String>,
	pub q: Option<String>,
	pub category: Option<String>,
	pub pricing: Option<String>,
	pub sort: Option<String>,
	pub tags: Option<String>,
	pub refresh: Option<String>,
}
impl ListParams {
	pub fn force_refresh(&self) -> bool {
		self.refresh.as_deref() == Some("1")
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
	pub field: String,
	pub message: String,
}
impl ValidationIssue {
	fn new(field: &str, message: impl Into<String>) -> Self {
		Self { field: field.to_string(), message: message.into() }
	}
}

/// A validated listing query.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
	/// Trimmed free text; empty means no text filter.
	pub text: String,
	/// `None` means `all`.
	pub category: Option<Category>,
	pub pricing: Option<Pricing>,
	pub tags: Vec<String>,
	pub sort: SortKey,
	pub offset: usize,
	pub limit: usize,
	pub thin: bool,
}
impl CatalogQuery {
	pub fn parse(params: &ListParams, cfg: &tooldeck_config::Query) -> Result<Self, Vec<ValidationIssue>> {
		let mut issues = Vec::new();
		let text = params.q.as_deref().unwrap_or("").trim().to_string();

		if text.chars().count() > cfg.max_query_chars {
			issues.push(ValidationIssue::new(
				"q",
				format!("must be at most {} characters", cfg.max_query_chars),
			));
		}

		let category = match params.category.as_deref().map(str::trim) {
			None | Some("") | Some("all") => None,
			Some(raw) => {
				let parsed = Category::parse(raw);

				if parsed.is_none() {
					issues.push(ValidationIssue::new("category", format!("unknown category '{raw}'")));
				}

				parsed
			},
		};
		let pricing = match params.pricing.as_deref().map(str::trim) {
			None | Some("") | Some("all") => None,
			Some(raw) => {
				let parsed = Pricing::parse(raw);

				if parsed.is_none() {
					issues.push(ValidationIssue::new("pricing", format!("unknown pricing '{raw}'")));
				}

				parsed
			},
		};
		let sort = match params.sort.as_deref().map(str::trim) {
			None | Some("") => SortKey::default(),
			Some(raw) => SortKey::parse(raw).unwrap_or_else(|| {
				issues.push(ValidationIssue::new("sort", "must be one of rating, name, users"));

				SortKey::default()
			}),
		};
		let limit = match parse_count(&mut issues, "limit", params.limit.as_deref()) {
			Some(limit) if limit == 0 || limit > cfg.max_limit as u64 => {
				issues.push(ValidationIssue::new(
					"limit",
					format!("must be between 1 and {}", cfg.max_limit),
				));

				cfg.default_limit as usize
			},
			Some(limit) => limit as usize,
			None => cfg.default_limit as usize,
		};
		// Pages are 1-based; `page=0` counts as absent so an explicit offset still applies.
		let page = parse_count(&mut issues, "page", params.page.as_deref()).filter(|page| *page > 0);
		let explicit_offset = parse_count(&mut issues, "offset", params.offset.as_deref());
		let cursor_offset = match params.cursor.as_deref().map(str::trim) {
			None | Some("") => None,
			Some(token) => match cursor::decode_cursor(token) {
				Ok(offset) => Some(offset),
				Err(err) => {
					issues.push(ValidationIssue::new("cursor", err.message));

					None
				},
			},
		};
		let offset = cursor_offset
			.or_else(|| page.map(|page| (page - 1).saturating_mul(limit as u64)))
			.or(explicit_offset)
			.unwrap_or(0);
		let tags = tags::parse_tags(
			params.tags.as_deref().unwrap_or(""),
			cfg.max_tags,
			cfg.max_tag_chars,
		);

		if !issues.is_empty() {
			return Err(issues);
		}

		Ok(Self {
			text,
			category,
			pricing,
			tags,
			sort,
			offset: usize::try_from(offset).unwrap_or(usize::MAX),
			limit,
			thin: params.thin.as_deref() == Some("1"),
		})
	}

	/// Category whose records get sorted first: only inferred when no category was requested.
	pub fn boost_category(&self) -> Option<Category> {
		match self.category {
			Some(_) => None,
			None => infer_category(&self.text),
		}
	}

	/// Stable textual form of everything that shapes the result page.
	pub fn cache_key(&self) -> String {
		let pricing = self.pricing.map(Pricing::as_str).unwrap_or("all");
		let category = self.category.map(Category::as_str).unwrap_or("all");

		format!(
			"q={}|category={category}|pricing={pricing}|tags={}|sort={}|offset={}|limit={}|thin={}",
			self.text.to_lowercase(),
			self.tags.join(",").to_lowercase(),
			self.sort.as_str(),
			self.offset,
			self.limit,
			self.thin,
		)
	}
}

/// One page of primary-tier results.
#[derive(Debug, Clone)]
pub struct QueryPage<'a> {
	pub items: Vec<&'a Service>,
	pub total: usize,
	pub next_cursor: Option<String>,
}

pub fn apply<'a>(services: &'a [Service], query: &CatalogQuery) -> QueryPage<'a> {
	let mut matched = filter::primary(services, query);

	sort::sort_services(&mut matched, query.sort, query.boost_category());

	let total = matched.len();
	let start = query.offset.min(total);
	let end = start.saturating_add(query.limit).min(total);
	let next_cursor = (end < total).then(|| cursor::encode_cursor(end as u64));

	QueryPage { items: matched[start..end].to_vec(), total, next_cursor }
}

fn parse_count(issues: &mut Vec<ValidationIssue>, field: &str, raw: Option<&str>) -> Option<u64> {
	let raw = raw.map(str::trim).filter(|raw| !raw.is_empty())?;

	match raw.parse::<u64>() {
		Ok(value) => Some(value),
		Err(_) => {
			issues.push(ValidationIssue::new(field, "must be a non-negative integer"));

			None
		},
	}
}
