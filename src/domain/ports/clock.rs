use chrono::{DateTime, NaiveDateTime, Utc};

/// Source of "now". Slot times are compared against `local_now` in the business zone.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
    fn local_now(&self) -> NaiveDateTime;
}
