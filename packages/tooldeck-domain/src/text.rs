pub fn normalize_whitespace(text: &str, max_chars: usize) -> String {
	let cleaned: String =
		text.chars().map(|ch| if ch.is_control() { ' ' } else { ch }).collect();
	let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

	truncate_chars(collapsed, max_chars)
}

/// Like [`normalize_whitespace`] but keeps line breaks, collapsing runs of three or more into
/// one blank line.
pub fn normalize_multiline(text: &str, max_chars: usize) -> String {
	let unified = text.replace("\r\n", "\n").replace('\r', "\n");
	let mut lines = Vec::new();
	let mut blank_run = 0_usize;

	for line in unified.split('\n') {
		let line = normalize_whitespace(line, usize::MAX);

		if line.is_empty() {
			blank_run += 1;

			if blank_run > 1 {
				continue;
			}
		} else {
			blank_run = 0;
		}

		lines.push(line);
	}

	truncate_chars(lines.join("\n").trim().to_string(), max_chars)
}

pub fn truncate_chars(text: String, max_chars: usize) -> String {
	match text.char_indices().nth(max_chars) {
		Some((idx, _)) => text[..idx].to_string(),
		None => text,
	}
}
