//! Wall-clock access and the two timestamp formats the documents use.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use time::format_description::well_known::Rfc2822;
use time::macros::format_description;
use time::OffsetDateTime;

pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// The host clock, in the local offset when it can be determined and UTC
/// otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
    }
}

/// Always returns the same instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub OffsetDateTime);
impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// The `updated` field: `Tue, 05 Mar 2024 07:08:09 +0000`.
pub fn updated(now: OffsetDateTime) -> Result<String> {
    now.format(&Rfc2822).or_raise(|| ErrorKind::Timestamp)
}

/// The version-group key: `YYYYMMDD` in the timestamp's own offset.
pub fn date_bucket(now: OffsetDateTime) -> Result<String> {
    now.format(format_description!("[year][month][day]")).or_raise(|| ErrorKind::Timestamp)
}
