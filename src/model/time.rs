use chrono::{DateTime, NaiveDateTime, Utc};

const CAMERA_FORMATS: [&str; 2] = ["%Y:%m:%d %H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parses either an RFC 3339 timestamp (`2023-07-04T10:00:00.000Z`) or the
/// camera form written by EXIF (`2023:07:04 10:00:00`, interpreted as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim().trim_end_matches('\0');
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    CAMERA_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Picks the timestamp an entry is dated by: the first parseable embedded
/// capture time, then the asset's creation time, then the current time.
pub fn choose_capture_time<'a, I>(embedded: I, created_time: &str) -> DateTime<Utc>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    embedded
        .into_iter()
        .flatten()
        .find_map(parse_timestamp)
        .or_else(|| parse_timestamp(created_time))
        .unwrap_or_else(Utc::now)
}

pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
