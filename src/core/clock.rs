use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, TimeZone, Utc};

/// Source of "now" and "today" for date-dependent rules.
///
/// `today` is the server-local calendar date; overdue checks, invoice
/// numbering and duplicate dating all compare dates, not instants.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate;

    /// Instants where calendar year `year` starts and ends, in the same
    /// timezone `today` uses. `[start, end)`.
    fn year_bounds(&self, year: i32) -> (DateTime<Utc>, DateTime<Utc>);
}

/// Wall clock in the server's local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn year_bounds(&self, year: i32) -> (DateTime<Utc>, DateTime<Utc>) {
        year_bounds_in(&Local, year)
    }
}

/// Clock pinned to a single instant, with dates read at a fixed UTC offset
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_offset(now, Utc.fix())
    }

    /// `today()` is the date at `offset`, e.g. UTC-5 for a server in New York
    pub fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now, offset }
    }

    /// Midday UTC on the given date, so `today()` is stable
    pub fn at_date(year: i32, month: u32, day: u32) -> Self {
        let now = Utc
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self::new(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.now.with_timezone(&self.offset).date_naive()
    }

    fn year_bounds(&self, year: i32) -> (DateTime<Utc>, DateTime<Utc>) {
        year_bounds_in(&self.offset, year)
    }
}

/// Local midnight on Jan 1 of `year` and of the next year, as UTC instants
pub fn year_bounds_in<Tz: TimeZone>(tz: &Tz, year: i32) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = new_year_midnight(tz, year).unwrap_or(DateTime::<Utc>::MIN_UTC);
    let end = new_year_midnight(tz, year + 1).unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

fn new_year_midnight<Tz: TimeZone>(tz: &Tz, year: i32) -> Option<DateTime<Utc>> {
    let midnight = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
