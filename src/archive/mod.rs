//! Archive II container: framing, compression and binary layouts

mod bzip;
pub mod format;
mod reader;
mod source;

pub use bzip::reassemble;
pub use reader::{Archive, Compression, VolumeHeader};
pub use source::{unwrap_container, ByteSource};

use chrono::{DateTime, Utc};

const SECONDS_PER_DAY: i64 = 86_400;

/// Convert a NEXRAD modified Julian date and millisecond-of-day to UTC
///
/// Day 1 is 1970-01-01.
#[must_use]
pub fn nexrad_datetime(date: u32, ms: u32) -> Option<DateTime<Utc>> {
    let days = i64::from(date) - 1;
    let secs = days * SECONDS_PER_DAY + i64::from(ms / 1000);
    let nanos = (ms % 1000) * 1_000_000;
    DateTime::from_timestamp(secs, nanos)
}
