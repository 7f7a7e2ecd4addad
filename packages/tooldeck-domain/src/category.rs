use crate::model::Category;

/// Priority order used when resolving source labels and inferring a category from a query.
const RESOLUTION_ORDER: [Category; 8] = [
	Category::Avatar,
	Category::Image,
	Category::Video,
	Category::Audio,
	Category::Chat,
	Category::Writing,
	Category::Coding,
	Category::Productivity,
];

pub fn synonyms(category: Category) -> &'static [&'static str] {
	match category {
		Category::Avatar => &[
			"avatar",
			"avata",
			"아바타",
			"vtuber",
			"digital human",
			"digital-human",
			"digitalhuman",
			"virtual human",
			"virtual-human",
			"virtualhuman",
			"character",
			"프로필",
			"디지털 휴먼",
			"디지털휴먼",
		],
		Category::Image =>
			&["image", "drawing", "drowing", "art", "이미지", "그림", "사진", "ai art", "ai 아트"],
		Category::Video => &["video", "비디오", "영상", "동영상", "video generation"],
		Category::Audio => &["audio", "음성", "오디오", "음악", "music", "voice", "tts", "stt"],
		Category::Writing => &[
			"writing",
			"write",
			"writer",
			"text",
			"text generation",
			"텍스트",
			"문서",
			"보고서",
			"레포트",
			"글쓰기",
			"라이팅",
			"요약",
			"summarize",
			"document",
			"report",
			"essay",
			"paper",
			"blog",
			"caption",
			"content",
		],
		Category::Coding => &["coding", "code", "코딩", "개발", "프로그래밍"],
		Category::Productivity =>
			&["education", "workflow", "task", "자동화", "automation", "생산성"],
		Category::Chat =>
			&["chat", "llm", "assistant", "채팅", "대화", "chat bot", "character chat"],
	}
}

/// Maps free-form source labels onto the fixed category set. Labels that match nothing resolve
/// to [`Category::CATCH_ALL`].
pub fn resolve_category(labels: &[String]) -> Category {
	let labels: Vec<String> = labels.iter().map(|label| label.trim().to_lowercase()).collect();

	if let Some(exact) = labels.iter().find_map(|label| Category::parse(label)) {
		return exact;
	}

	RESOLUTION_ORDER
		.into_iter()
		.find(|category| {
			labels.iter().any(|label| synonyms(*category).iter().any(|kw| label.contains(kw)))
		})
		.unwrap_or(Category::CATCH_ALL)
}

/// Category implied by a free-text query, if any of its keywords occurs in it.
pub fn infer_category(query: &str) -> Option<Category> {
	let query = query.trim().to_lowercase();

	if query.is_empty() {
		return None;
	}

	RESOLUTION_ORDER
		.into_iter()
		.find(|category| synonyms(*category).iter().any(|kw| query.contains(kw)))
}
