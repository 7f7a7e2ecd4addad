use serde_json::json;

use tooldeck_domain::{
	Category, Pricing, RawService, infer_category, resolve_category,
	tags::{parse_tags, sanitize_tag},
	text::{normalize_multiline, normalize_whitespace},
};

fn raw(value: serde_json::Value) -> RawService {
	serde_json::from_value(value).expect("Failed to decode raw service.")
}

#[test]
fn normalizes_a_complete_record() {
	let service = raw(json!({
		"id": "AI-12",
		"name": "  Fast\tCut  ",
		"summary": "Video\nediting",
		"description": "Line one\r\n\r\n\r\n\r\nLine two",
		"url": "https://www.fastcut.ai/",
		"tags": ["Editing", " editing ", "", "Templates"],
		"category": ["영상 편집"],
		"pricing": ["무료", "free", "구독형태"],
		"rating": 4.5,
		"userCount": 1000,
		"icon": " https://cdn.example/icon.png "
	}))
	.normalize(0);

	assert_eq!(service.id, "AI-12");
	assert_eq!(service.name, "Fast Cut");
	assert_eq!(service.summary, "Video editing");
	assert_eq!(service.description, "Line one\n\nLine two");
	assert_eq!(service.features, vec!["Editing".to_string(), "Templates".to_string()]);
	assert_eq!(service.category, Category::Video);
	assert_eq!(service.pricing, vec![Pricing::Free, Pricing::Subscription]);
	assert_eq!(service.rating, 4.5);
	assert_eq!(service.user_count, 1_000);
	assert_eq!(service.icon, "https://cdn.example/icon.png");
	assert_eq!(service.domain().as_deref(), Some("fastcut.ai"));
}

#[test]
fn sparse_record_gets_defaults() {
	let service = raw(json!({ "title": "Bare" })).normalize(7);

	assert_eq!(service.id, "snap-7");
	assert_eq!(service.category, Category::CATCH_ALL);
	assert_eq!(service.pricing, vec![Pricing::Paid]);
	assert_eq!(service.rating, 0.0);
	assert_eq!(service.user_count, 0);
	assert!(service.domain().is_none());
}

#[test]
fn numeric_ids_are_stringified() {
	let service = raw(json!({ "id": 42, "name": "Numbered" })).normalize(0);

	assert_eq!(service.id, "42");
}

#[test]
fn unknown_pricing_labels_become_paid() {
	let service = raw(json!({ "name": "x", "pricing": ["enterprise", "freemium"] })).normalize(0);

	assert_eq!(service.pricing, vec![Pricing::Paid, Pricing::Partial]);
}

#[test]
fn negative_or_non_finite_rating_is_zeroed() {
	let service = raw(json!({ "name": "x", "rating": -2.0 })).normalize(0);

	assert_eq!(service.rating, 0.0);
}

#[test]
fn freemium_is_an_alias_for_partial() {
	assert_eq!(Pricing::parse("freemium"), Some(Pricing::Partial));
	assert_eq!(Pricing::parse("Partial"), Some(Pricing::Partial));
	assert_eq!(Pricing::parse("lifetime"), None);
}

#[test]
fn category_parse_is_case_insensitive() {
	assert_eq!(Category::parse("Chat"), Some(Category::Chat));
	assert_eq!(Category::parse("all"), None);
}

#[test]
fn resolves_labels_in_priority_order() {
	assert_eq!(resolve_category(&["AI 아바타".to_string()]), Category::Avatar);
	assert_eq!(resolve_category(&["Voice cloning".to_string()]), Category::Audio);
	assert_eq!(resolve_category(&["coding".to_string()]), Category::Coding);
	assert_eq!(resolve_category(&["기타".to_string()]), Category::Productivity);
	assert_eq!(resolve_category(&[]), Category::Productivity);
}

#[test]
fn infers_category_from_query_keywords() {
	assert_eq!(infer_category("best video generation"), Some(Category::Video));
	assert_eq!(infer_category("코딩 도우미"), Some(Category::Coding));
	assert_eq!(infer_category("zz-no-match"), None);
	assert_eq!(infer_category("   "), None);
}

#[test]
fn sanitizes_tags() {
	assert_eq!(sanitize_tag("  open-source!! ", 32).as_deref(), Some("open-source"));
	assert_eq!(sanitize_tag("영상 편집", 32).as_deref(), Some("영상 편집"));
	assert_eq!(sanitize_tag("<script>", 32).as_deref(), Some("script"));
	assert_eq!(sanitize_tag("@@@", 32), None);
	assert_eq!(sanitize_tag("abcdefghij", 4).as_deref(), Some("abcd"));
}

#[test]
fn parses_tag_lists_with_dedup_and_cap() {
	let tags = parse_tags("api, API ,,free,Api,voice", 10, 32);

	assert_eq!(tags, vec!["api".to_string(), "free".to_string(), "voice".to_string()]);

	let many = (0..20).map(|i| format!("t{i}")).collect::<Vec<_>>().join(",");

	assert_eq!(parse_tags(&many, 10, 32).len(), 10);
}

#[test]
fn whitespace_helpers_truncate_by_chars() {
	assert_eq!(normalize_whitespace("가나다라마", 3), "가나다");
	assert_eq!(normalize_multiline("a\n\n\n\nb", 100), "a\n\nb");
}
