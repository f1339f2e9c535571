use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDateTime, NaiveTime};

/// Once-a-day trigger at a fixed local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    pub at: NaiveTime,
}

impl DailySchedule {
    pub fn parse(raw: &str) -> Result<Self> {
        let at = NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .with_context(|| format!("expected HH:MM, got {raw:?}"))?;
        Ok(Self { at })
    }

    /// First occurrence strictly after `now`.
    pub fn next_run_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.at);
        if today > now {
            return today;
        }
        now.date()
            .checked_add_days(Days::new(1))
            .map(|d| d.and_time(self.at))
            .unwrap_or(today)
    }

    pub fn delay_until_next(&self) -> Duration {
        let now = Local::now().naive_local();
        let next = self.next_run_after(now);
        (next - now).to_std().unwrap_or(Duration::ZERO)
    }
}
