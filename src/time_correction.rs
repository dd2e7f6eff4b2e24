use chrono::{FixedOffset, Local, NaiveDateTime, Offset, TimeDelta};
use crate::errors::TimeError;

/// Wire format of upstream UTC timestamps
pub const UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Returns the device's current local minus UTC offset
pub fn current_offset() -> FixedOffset {
    Local::now().offset().fix()
}

/// Parses an upstream UTC timestamp and shifts it to device wall-clock time using
/// the local offset in effect right now
///
/// # Arguments
///
/// * 'utc' - timestamp on the form 2023-05-01T10:15:00Z
pub fn to_local(utc: &str) -> Result<NaiveDateTime, TimeError> {
    to_local_with_offset(utc, current_offset())
}

/// Parses an upstream UTC timestamp and shifts it by the given offset.
///
/// The offset is applied as-is to any instant, also one on the other side of a
/// daylight saving transition.
///
/// # Arguments
///
/// * 'utc' - timestamp on the form 2023-05-01T10:15:00Z
/// * 'offset' - local minus UTC
pub fn to_local_with_offset(utc: &str, offset: FixedOffset) -> Result<NaiveDateTime, TimeError> {
    let parsed = NaiveDateTime::parse_from_str(utc, UTC_FORMAT)
        .map_err(|_| TimeError::MalformedTimestamp(utc.to_string()))?;

    parsed
        .checked_add_signed(TimeDelta::seconds(offset.local_minus_utc() as i64))
        .ok_or_else(|| TimeError::MalformedTimestamp(utc.to_string()))
}
