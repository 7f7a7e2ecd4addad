//! Opaque pagination tokens.
//!
//! A cursor only carries a resume offset. It is not signed and not bound to the snapshot that
//! produced it, so a client can forge any offset it likes; nothing beyond pagination trusts it.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;

const CURSOR_VERSION_V1: &str = "v1";
const MAX_CURSOR_TOKEN_LEN: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorError {
	pub message: String,
}
impl CursorError {
	fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}
}
impl std::fmt::Display for CursorError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.message)
	}
}
impl std::error::Error for CursorError {}

#[derive(Debug, Deserialize)]
struct CursorPayload {
	offset: u64,
}

pub fn encode_cursor(offset: u64) -> String {
	let payload = format!("{{\"offset\":{offset}}}");

	format!("{CURSOR_VERSION_V1}.{}", URL_SAFE_NO_PAD.encode(payload))
}

pub fn decode_cursor(token: &str) -> Result<u64, CursorError> {
	let token = token.trim();

	if token.is_empty() || token.len() > MAX_CURSOR_TOKEN_LEN {
		return Err(CursorError::new("cursor has an invalid length"));
	}

	let Some((version, payload_part)) = token.split_once('.') else {
		return Err(CursorError::new("cursor format is invalid"));
	};

	if version != CURSOR_VERSION_V1 {
		return Err(CursorError::new(format!("unsupported cursor version: {version}")));
	}

	let bytes = URL_SAFE_NO_PAD
		.decode(payload_part)
		.map_err(|_| CursorError::new("cursor is not valid base64"))?;
	let payload: CursorPayload = serde_json::from_slice(&bytes)
		.map_err(|_| CursorError::new("cursor payload is invalid"))?;

	Ok(payload.offset)
}
