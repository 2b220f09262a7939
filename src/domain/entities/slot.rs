use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::shared::utils::datetime::{format_slot, DATE_FORMAT, TIME_FORMAT};

/// A calendar date plus time-of-day in the business time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotTime {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl SlotTime {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    /// Slot granularity is one minute; seconds are dropped.
    pub fn from_local(at: NaiveDateTime) -> Self {
        let time = at.time();
        Self {
            date: at.date(),
            time: NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time),
        }
    }

    pub fn to_local(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Storage form of the date column, `YYYY-MM-DD`.
    pub fn date_key(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// Storage form of the time column, `HH:MM`.
    pub fn time_key(&self) -> String {
        self.time.format(TIME_FORMAT).to_string()
    }
}

impl std::fmt::Display for SlotTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_slot(self))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: i64,
    pub specialist_id: i64,
    pub at: SlotTime,
    pub is_booked: bool,
}

impl Slot {
    /// Booked slots are frozen until released.
    pub fn is_mutable(&self) -> bool {
        !self.is_booked
    }
}
