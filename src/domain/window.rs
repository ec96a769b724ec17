use chrono::{
    DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc,
};

use super::ValidationError;

/// The timezone in which calendar months are delimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferenceZone {
    /// The deployment's local zone.
    #[default]
    Local,
    /// A fixed offset from UTC, e.g. `+07:00`.
    Fixed(FixedOffset),
}

impl ReferenceZone {
    pub fn utc() -> Self {
        ReferenceZone::Fixed(Utc.fix())
    }

    /// The (year, month) containing `instant` in this zone.
    pub fn year_month_of(&self, instant: DateTime<Utc>) -> (i32, u32) {
        match self {
            ReferenceZone::Local => {
                let local = instant.with_timezone(&Local);
                (local.year(), local.month())
            }
            ReferenceZone::Fixed(offset) => {
                let local = instant.with_timezone(offset);
                (local.year(), local.month())
            }
        }
    }

    fn to_utc(&self, naive: NaiveDateTime) -> DateTime<Utc> {
        match self {
            ReferenceZone::Local => resolve_local(&Local, naive),
            ReferenceZone::Fixed(offset) => resolve_local(offset, naive),
        }
    }
}

impl std::str::FromStr for ReferenceZone {
    type Err = chrono::ParseError;

    /// Accepts `local` or an offset such as `+07:00`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("local") {
            return Ok(ReferenceZone::Local);
        }
        s.parse::<FixedOffset>().map(ReferenceZone::Fixed)
    }
}

/// Map a wall-clock time to an instant. Midnight can fall in a DST gap in a
/// handful of zones, in which case the first valid instant after it is used.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    let mut candidate = naive;
    loop {
        if let Some(resolved) = tz.from_local_datetime(&candidate).earliest() {
            return resolved.with_timezone(&Utc);
        }
        candidate += chrono::Duration::minutes(30);
    }
}

/// A calendar month as a half-open interval of instants: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub year: i32,
    pub month: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthWindow {
    /// Build the window for (`year`, `month`) in `zone`.
    pub fn new(year: i64, month: i64, zone: ReferenceZone) -> Result<Self, ValidationError> {
        if !(1000..=9999).contains(&year) {
            return Err(ValidationError::YearOutOfRange(year));
        }
        if !(1..=12).contains(&month) {
            return Err(ValidationError::MonthOutOfRange(month));
        }

        let (year, month) = (year as i32, month as u32);
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };

        Ok(Self {
            year,
            month,
            start: zone.to_utc(first_midnight(year, month)?),
            end: zone.to_utc(first_midnight(next_year, next_month)?),
        })
    }

    /// Returns true if `instant` falls within the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

fn first_midnight(year: i32, month: u32) -> Result<NaiveDateTime, ValidationError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or(ValidationError::YearOutOfRange(year as i64))
}

impl std::fmt::Display for MonthWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
