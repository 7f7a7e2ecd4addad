use time::OffsetDateTime;

pub trait Clock
where
	Self: Send + Sync,
{
	fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

pub fn unix_millis(at: OffsetDateTime) -> i64 {
	(at.unix_timestamp_nanos() / 1_000_000) as i64
}
