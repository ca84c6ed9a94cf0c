#![forbid(unsafe_code)]

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

fn datetime_from_ms(ts_ms: i64) -> OffsetDateTime {
    let nanos = i128::from(ts_ms) * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

pub(crate) fn ts_ms_to_rfc3339(ts_ms: i64) -> String {
    datetime_from_ms(ts_ms)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// `DD/MM/YYYY HH:MM`, as shown on the dashboard.
pub(crate) fn ts_ms_to_display(ts_ms: i64) -> String {
    datetime_from_ms(ts_ms)
        .format(format_description!("[day]/[month]/[year] [hour]:[minute]"))
        .unwrap_or_default()
}

/// `YYYYMMDD_HHMMSS`, embedded in stored upload names.
pub(crate) fn upload_stamp(now: OffsetDateTime) -> String {
    now.format(format_description!(
        "[year][month][day]_[hour][minute][second]"
    ))
    .unwrap_or_else(|_| "19700101_000000".to_string())
}

pub(crate) fn now_ms_of(now: OffsetDateTime) -> i64 {
    let ms = now.unix_timestamp_nanos() / 1_000_000;
    i64::try_from(ms).unwrap_or(if ms < 0 { 0 } else { i64::MAX })
}
