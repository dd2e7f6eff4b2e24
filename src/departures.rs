use std::fmt;
use std::fmt::Formatter;
use chrono::FixedOffset;
use log::warn;
use crate::errors::DepartureError;
use crate::time_correction::{current_offset, to_local_with_offset};

/// One upstream departure, times are on the wire format 2023-05-01T10:15:00Z
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureRecord {
    pub estimated_departure: Option<String>,
    pub scheduled_departure: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartureKind {
    Estimated,
    Scheduled,
}

impl DepartureKind {
    pub fn tag(&self) -> &'static str {
        match self {
            DepartureKind::Estimated => "E",
            DepartureKind::Scheduled => "S",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureRow {
    pub kind: DepartureKind,
    /// HH:MM, 24 hour device wall-clock time
    pub local_time_label: String,
}

/// Implementation of the Display Trait, this is the text put on the display
impl fmt::Display for DepartureRow {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind.tag(), self.local_time_label)
    }
}

/// Normalizes departures using the device's current UTC offset
///
/// # Arguments
///
/// * 'records' - departures in upstream order
/// * 'max_rows' - max number of records to consider
pub fn normalize_departures(records: &[DepartureRecord], max_rows: usize) -> Result<Vec<DepartureRow>, DepartureError> {
    normalize_departures_with_offset(records, max_rows, current_offset())
}

/// Normalizes up to max_rows departures, keeping upstream order.
///
/// A record lacking both times is logged and skipped, a record carrying a malformed
/// time fails the whole normalization.
///
/// # Arguments
///
/// * 'records' - departures in upstream order
/// * 'max_rows' - max number of records to consider
/// * 'offset' - local minus UTC
pub fn normalize_departures_with_offset(records: &[DepartureRecord], max_rows: usize, offset: FixedOffset)
    -> Result<Vec<DepartureRow>, DepartureError> {

    let mut rows: Vec<DepartureRow> = Vec::with_capacity(max_rows.min(records.len()));

    for (i, record) in records.iter().take(max_rows).enumerate() {
        match normalize_departure(record, offset) {
            Ok(row) => rows.push(row),
            Err(DepartureError::MissingDeparture) => {
                warn!("skipping departure {}: {}", i, DepartureError::MissingDeparture);
            },
            Err(e) => return Err(e),
        }
    }

    Ok(rows)
}

/// Picks the estimated time if present, else the scheduled time, and converts it
/// to device wall-clock time
///
/// # Arguments
///
/// * 'record' - the departure to normalize
/// * 'offset' - local minus UTC
pub fn normalize_departure(record: &DepartureRecord, offset: FixedOffset) -> Result<DepartureRow, DepartureError> {
    let (kind, utc) = match (&record.estimated_departure, &record.scheduled_departure) {
        (Some(estimated), _) => (DepartureKind::Estimated, estimated),
        (None, Some(scheduled)) => (DepartureKind::Scheduled, scheduled),
        (None, None) => return Err(DepartureError::MissingDeparture),
    };

    let local = to_local_with_offset(utc, offset)?;

    Ok(DepartureRow { kind, local_time_label: local.format("%H:%M").to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TimeError;
    use pretty_assertions::assert_eq;

    fn plus_ten() -> FixedOffset {
        FixedOffset::east_opt(10 * 3600).unwrap()
    }

    fn record(estimated: Option<&str>, scheduled: Option<&str>) -> DepartureRecord {
        DepartureRecord {
            estimated_departure: estimated.map(str::to_string),
            scheduled_departure: scheduled.map(str::to_string),
        }
    }

    fn texts(rows: &[DepartureRow]) -> Vec<String> {
        rows.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn scheduled_time_when_no_estimate() {
        let row = normalize_departure(&record(None, Some("2023-05-01T10:15:00Z")), plus_ten()).unwrap();

        assert_eq!(row.kind, DepartureKind::Scheduled);
        assert_eq!(row.to_string(), "S: 20:15");
    }

    #[test]
    fn estimate_wins_over_schedule() {
        let row = normalize_departure(
            &record(Some("2023-05-01T10:17:00Z"), Some("2023-05-01T10:15:00Z")), plus_ten()).unwrap();

        assert_eq!(row.kind, DepartureKind::Estimated);
        assert_eq!(row.to_string(), "E: 20:17");
    }

    #[test]
    fn estimate_alone_is_enough() {
        let row = normalize_departure(&record(Some("2023-05-01T23:05:00Z"), None), plus_ten()).unwrap();

        assert_eq!(row.to_string(), "E: 09:05");
    }

    #[test]
    fn caps_rows_and_keeps_order() {
        let records = vec![
            record(None, Some("2023-05-01T10:30:00Z")),
            record(Some("2023-05-01T10:05:00Z"), Some("2023-05-01T10:00:00Z")),
            record(None, Some("2023-05-01T10:45:00Z")),
            record(None, Some("2023-05-01T11:00:00Z")),
            record(None, Some("2023-05-01T11:15:00Z")),
        ];
        let rows = normalize_departures_with_offset(&records, 4, plus_ten()).unwrap();

        assert_eq!(texts(&rows), vec!["S: 20:30", "E: 20:05", "S: 20:45", "S: 21:00"]);
    }

    #[test]
    fn skips_records_missing_both_times() {
        let records = vec![
            record(None, None),
            record(None, Some("2023-05-01T10:15:00Z")),
            record(None, None),
            record(Some("2023-05-01T10:20:00Z"), None),
        ];
        let rows = normalize_departures_with_offset(&records, 4, plus_ten()).unwrap();

        assert_eq!(texts(&rows), vec!["S: 20:15", "E: 20:20"]);
    }

    #[test]
    fn malformed_time_is_fatal() {
        let records = vec![
            record(None, Some("2023-05-01T10:15:00Z")),
            record(Some("soon"), None),
        ];
        let result = normalize_departures_with_offset(&records, 4, plus_ten());

        assert_eq!(result, Err(DepartureError::Time(TimeError::MalformedTimestamp("soon".to_string()))));
    }

    #[test]
    fn records_past_the_cap_are_not_parsed() {
        let records = vec![record(None, Some("2023-05-01T10:15:00Z")), record(Some("soon"), None)];
        let rows = normalize_departures_with_offset(&records, 1, plus_ten()).unwrap();

        assert_eq!(texts(&rows), vec!["S: 20:15"]);
    }

    #[test]
    fn every_row_has_a_well_formed_time() {
        let records: Vec<DepartureRecord> = (0..24)
            .map(|h| DepartureRecord {
                estimated_departure: (h % 2 == 0).then(|| format!("2023-05-01T{:02}:07:00Z", h)),
                scheduled_departure: Some(format!("2023-05-01T{:02}:09:00Z", h)),
            })
            .collect();
        let rows = normalize_departures_with_offset(&records, records.len(), plus_ten()).unwrap();

        assert_eq!(rows.len(), 24);
        for (h, row) in rows.iter().enumerate() {
            let label = &row.local_time_label;
            assert_eq!(label.len(), 5);
            assert_eq!(&label[2..3], ":");
            assert!(label[..2].parse::<u32>().unwrap() < 24);
            assert!(label[3..].parse::<u32>().unwrap() < 60);
            assert_eq!(row.kind == DepartureKind::Estimated, records[h].estimated_departure.is_some());
        }
    }

    #[test]
    fn empty_upstream_gives_no_rows() {
        assert!(normalize_departures_with_offset(&[], 4, plus_ten()).unwrap().is_empty());
    }
}
