use std::collections::HashSet;

use unicode_script::{Script, UnicodeScript};

fn is_allowed(ch: char) -> bool {
	if ch.is_ascii_alphanumeric() || matches!(ch, ' ' | '-' | '_') {
		return true;
	}

	ch.is_alphanumeric() && matches!(ch.script(), Script::Latin | Script::Hangul)
}

/// Strips everything but letters, digits, spaces, hyphens and underscores, then trims and
/// truncates. Returns `None` when nothing usable remains.
pub fn sanitize_tag(raw: &str, max_chars: usize) -> Option<String> {
	let kept: String = raw.chars().filter(|ch| is_allowed(*ch)).collect();
	let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");
	let truncated = crate::text::truncate_chars(collapsed, max_chars);
	let trimmed = truncated.trim();

	if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// Parses a comma-separated tag list. Duplicates are dropped case-insensitively, keeping the
/// first spelling.
pub fn parse_tags(raw: &str, max_tags: usize, max_chars: usize) -> Vec<String> {
	let mut seen = HashSet::new();
	let mut out = Vec::new();

	for part in raw.split(',') {
		if out.len() >= max_tags {
			break;
		}

		let Some(tag) = sanitize_tag(part, max_chars) else { continue };

		if seen.insert(tag.to_lowercase()) {
			out.push(tag);
		}
	}

	out
}
