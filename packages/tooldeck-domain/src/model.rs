use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{category, text};

const MAX_NAME_CHARS: usize = 120;
const MAX_SUMMARY_CHARS: usize = 280;
const MAX_DESCRIPTION_CHARS: usize = 4_000;
const MAX_FEATURE_CHARS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
	Avatar,
	Image,
	Video,
	Audio,
	Writing,
	Coding,
	Productivity,
	Chat,
}
impl Category {
	pub const ALL: [Self; 8] = [
		Self::Avatar,
		Self::Image,
		Self::Video,
		Self::Audio,
		Self::Writing,
		Self::Coding,
		Self::Productivity,
		Self::Chat,
	];
	/// Unmapped source labels land here.
	pub const CATCH_ALL: Self = Self::Productivity;

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Avatar => "avatar",
			Self::Image => "image",
			Self::Video => "video",
			Self::Audio => "audio",
			Self::Writing => "writing",
			Self::Coding => "coding",
			Self::Productivity => "productivity",
			Self::Chat => "chat",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		let raw = raw.trim();

		Self::ALL.into_iter().find(|category| category.as_str().eq_ignore_ascii_case(raw))
	}
}
impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pricing {
	Free,
	Trial,
	Partial,
	Paid,
	Subscription,
	Usage,
}
impl Pricing {
	pub const ALL: [Self; 6] =
		[Self::Free, Self::Trial, Self::Partial, Self::Paid, Self::Subscription, Self::Usage];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Free => "free",
			Self::Trial => "trial",
			Self::Partial => "partial",
			Self::Paid => "paid",
			Self::Subscription => "subscription",
			Self::Usage => "usage",
		}
	}

	/// Parses a query-side pricing value. `freemium` is an alias of `partial`.
	pub fn parse(raw: &str) -> Option<Self> {
		let raw = raw.trim().to_lowercase();

		if raw == "freemium" {
			return Some(Self::Partial);
		}

		Self::ALL.into_iter().find(|pricing| pricing.as_str() == raw)
	}

	/// Maps a source label, including the catalog's Korean labels. Anything unrecognized is
	/// treated as paid.
	pub fn from_label(label: &str) -> Self {
		if let Some(pricing) = Self::parse(label) {
			return pricing;
		}

		match label.trim() {
			"무료" => Self::Free,
			"무료체험" => Self::Trial,
			"부분무료" => Self::Partial,
			"유료" => Self::Paid,
			"구독형태" => Self::Subscription,
			"사용량 기반 결제" => Self::Usage,
			_ => Self::Paid,
		}
	}
}
impl fmt::Display for Pricing {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One catalog entry. Built wholesale on every refresh and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
	pub id: String,
	pub name: String,
	pub summary: String,
	pub description: String,
	pub url: String,
	pub features: Vec<String>,
	pub category: Category,
	/// Never empty.
	pub pricing: Vec<Pricing>,
	pub rating: f64,
	pub user_count: u64,
	pub icon: String,
}
impl Service {
	/// Host of `url` without a leading `www.`, lowercased.
	pub fn domain(&self) -> Option<String> {
		host_of(&self.url)
	}

	pub fn thin(&self) -> ThinService {
		ThinService {
			id: self.id.clone(),
			name: self.name.clone(),
			summary: self.summary.clone(),
			url: self.url.clone(),
			icon: self.icon.clone(),
			category: self.category,
			pricing: self.pricing.clone(),
			features: self.features.clone(),
			rating: self.rating,
			user_count: self.user_count,
		}
	}
}

/// Listing projection without the long-form description.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinService {
	pub id: String,
	pub name: String,
	pub summary: String,
	pub url: String,
	pub icon: String,
	pub category: Category,
	pub pricing: Vec<Pricing>,
	pub features: Vec<String>,
	pub rating: f64,
	pub user_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
	One(String),
	Many(Vec<String>),
}
impl OneOrMany {
	fn into_vec(self) -> Vec<String> {
		match self {
			Self::One(value) => vec![value],
			Self::Many(values) => values,
		}
	}
}

/// A record as delivered by a catalog source, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawService {
	pub id: Option<Value>,
	#[serde(alias = "title")]
	pub name: Option<String>,
	pub summary: Option<String>,
	pub description: Option<String>,
	#[serde(alias = "link")]
	pub url: Option<String>,
	#[serde(alias = "tags")]
	pub features: Vec<String>,
	#[serde(alias = "categories")]
	pub category: Option<OneOrMany>,
	pub pricing: Option<OneOrMany>,
	pub rating: Option<f64>,
	#[serde(alias = "reviewCount")]
	pub user_count: Option<u64>,
	pub icon: Option<String>,
}
impl RawService {
	/// Whether the record carries a usable id of its own.
	pub fn has_id(&self) -> bool {
		match &self.id {
			Some(Value::String(id)) => !id.trim().is_empty(),
			Some(Value::Number(_)) => true,
			_ => false,
		}
	}

	/// `index` is the record's position in the source payload, used when it carries no id.
	pub fn normalize(self, index: usize) -> Service {
		let id = match self.id {
			Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
			Some(Value::Number(id)) => id.to_string(),
			_ => format!("snap-{index}"),
		};
		let summary_raw = self.summary.unwrap_or_default();
		let description_raw = self.description.unwrap_or_else(|| summary_raw.clone());
		let category_labels = self.category.map(OneOrMany::into_vec).unwrap_or_default();
		let pricing_labels = self.pricing.map(OneOrMany::into_vec).unwrap_or_default();

		Service {
			id,
			name: text::normalize_whitespace(self.name.as_deref().unwrap_or(""), MAX_NAME_CHARS),
			summary: text::normalize_whitespace(&summary_raw, MAX_SUMMARY_CHARS),
			description: text::normalize_multiline(&description_raw, MAX_DESCRIPTION_CHARS),
			url: self.url.map(|url| url.trim().to_string()).unwrap_or_default(),
			features: normalize_features(self.features),
			category: category::resolve_category(&category_labels),
			pricing: normalize_pricing(&pricing_labels),
			rating: self.rating.filter(|rating| rating.is_finite() && *rating >= 0.0).unwrap_or(0.0),
			user_count: self.user_count.unwrap_or(0),
			icon: self.icon.map(|icon| icon.trim().to_string()).unwrap_or_default(),
		}
	}
}

pub fn host_of(raw: &str) -> Option<String> {
	let raw = raw.trim();

	if raw.is_empty() {
		return None;
	}

	let candidate = if raw.starts_with("http://") || raw.starts_with("https://") {
		raw.to_string()
	} else {
		format!("https://{raw}")
	};
	let parsed = url::Url::parse(&candidate).ok()?;
	let host = parsed.host_str()?.to_lowercase();
	let host = host.strip_prefix("www.").unwrap_or(&host);

	if host.is_empty() { None } else { Some(host.to_string()) }
}

fn normalize_features(features: Vec<String>) -> Vec<String> {
	let mut seen = HashSet::new();
	let mut out = Vec::with_capacity(features.len());

	for feature in features {
		let feature = text::normalize_whitespace(&feature, MAX_FEATURE_CHARS);

		if feature.is_empty() {
			continue;
		}
		if seen.insert(feature.to_lowercase()) {
			out.push(feature);
		}
	}

	out
}

fn normalize_pricing(labels: &[String]) -> Vec<Pricing> {
	let mut out = Vec::with_capacity(labels.len().max(1));

	for label in labels {
		if label.trim().is_empty() {
			continue;
		}

		let pricing = Pricing::from_label(label);

		if !out.contains(&pricing) {
			out.push(pricing);
		}
	}

	if out.is_empty() {
		out.push(Pricing::Paid);
	}

	out
}
