use std::cmp::Ordering;

use tooldeck_domain::{Category, Service};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
	#[default]
	Rating,
	Name,
	Users,
}
impl SortKey {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Rating => "rating",
			Self::Name => "name",
			Self::Users => "users",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"rating" => Some(Self::Rating),
			"name" => Some(Self::Name),
			"users" => Some(Self::Users),
			_ => None,
		}
	}
}

/// Stable sort. Records in `boost` come first; ties keep their input order.
pub fn sort_services(services: &mut [&Service], sort: SortKey, boost: Option<Category>) {
	services.sort_by(|a, b| {
		boost_rank(a, boost).cmp(&boost_rank(b, boost)).then_with(|| compare(a, b, sort))
	});
}

pub fn compare(a: &Service, b: &Service, sort: SortKey) -> Ordering {
	match sort {
		SortKey::Rating => b.rating.total_cmp(&a.rating),
		SortKey::Name => compare_names(&a.name, &b.name),
		SortKey::Users => b.user_count.cmp(&a.user_count),
	}
}

/// Case-folded comparison first so `alpha` and `Beta` sort the way a reader expects, then the
/// raw strings to keep the order total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
	a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

fn boost_rank(service: &Service, boost: Option<Category>) -> u8 {
	match boost {
		Some(category) if service.category == category => 0,
		_ => 1,
	}
}
