use foundation::time::{CalendarDate, Clock};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Local calendar date from `js_sys::Date`, matching what a date input shows.
#[derive(Debug, Copy, Clone, Default)]
pub struct JsClock;

impl Clock for JsClock {
    fn today(&self) -> CalendarDate {
        let now = js_sys::Date::new_0();
        CalendarDate::new(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
            .unwrap_or_else(|| {
                CalendarDate::from_days_since_epoch((js_sys::Date::now() / MS_PER_DAY).floor() as i64)
            })
    }
}

/// Milliseconds since the epoch; the time base for the deferred queue.
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}
