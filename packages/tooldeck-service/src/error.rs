use crate::{query::ValidationIssue, rate_limit::RateDecision};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid query parameters ({} issue(s)).", .issues.len())]
	Validation { issues: Vec<ValidationIssue> },
	#[error("Rate limit exceeded. Retry after {} second(s).", .decision.retry_after_secs)]
	RateLimited { decision: RateDecision },
	#[error("Upstream error: {message}")]
	Upstream { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Internal error: {message}")]
	Internal { message: String },
}
impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Internal { message: err.to_string() }
	}
}
