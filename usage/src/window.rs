use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use common::error::{AppError, Res};

/// Zone the daily and monthly quota windows are anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuotaClock {
    /// The server's local time zone.
    #[default]
    Local,
    Zone(Tz),
}

/// Window starts, in UTC, for a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaWindows {
    pub day_start: DateTime<Utc>,
    pub month_start: DateTime<Utc>,
}

impl QuotaClock {
    pub fn from_config(zone: Option<&str>) -> Res<Self> {
        match zone {
            None => Ok(QuotaClock::Local),
            Some(name) => name.parse::<Tz>().map(QuotaClock::Zone).map_err(|e| {
                AppError::Internal(format!("Invalid QUOTA_TIMEZONE '{}': {}", name, e))
            }),
        }
    }

    pub fn windows(&self, now: DateTime<Utc>) -> QuotaWindows {
        match self {
            QuotaClock::Local => windows_in(&now.with_timezone(&Local)),
            QuotaClock::Zone(tz) => windows_in(&now.with_timezone(tz)),
        }
    }
}

pub fn windows_in<Z: TimeZone>(now: &DateTime<Z>) -> QuotaWindows {
    let zone = now.timezone();
    let today = now.date_naive();
    let first_of_month = today.with_day(1).unwrap_or(today);

    QuotaWindows {
        day_start: start_of_day(&zone, today),
        month_start: start_of_day(&zone, first_of_month),
    }
}

/// First existing local instant of `date`. Midnight can be skipped by a DST
/// jump, in which case the first valid hour after it is used.
fn start_of_day<Z: TimeZone>(zone: &Z, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=2)
        .find_map(|hours| {
            zone.from_local_datetime(&(midnight + Duration::hours(hours)))
                .earliest()
        })
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}
