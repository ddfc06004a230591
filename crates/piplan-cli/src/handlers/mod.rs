pub mod board;
pub mod feature;
pub mod story;
pub mod team;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use piplan_core::PlanningError;

/// Accepts either a bare date (midnight UTC) or a full RFC 3339 timestamp.
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>, PlanningError> {
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| PlanningError::InvalidArgument(format!("Invalid date: {}", input)))?;
        return Ok(Utc.from_utc_datetime(&midnight));
    }
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            PlanningError::InvalidArgument(format!(
                "Invalid date '{}': expected YYYY-MM-DD or RFC 3339",
                input
            ))
        })
}

/// Resolves a `--file`/`--json` payload pair to the raw JSON text.
pub fn read_payload(file: Option<String>, json: Option<String>) -> Result<String, PlanningError> {
    match (file, json) {
        (Some(path), None) => std::fs::read_to_string(&path).map_err(PlanningError::from),
        (None, Some(inline)) => Ok(inline),
        _ => Err(PlanningError::InvalidArgument(
            "Provide exactly one of --file or --json".to_string(),
        )),
    }
}
