use crate::domain::ports::clock::Clock;
use crate::domain::ports::task_spawner::TaskSpawner;
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use futures::future::BoxFuture;

#[derive(Clone)]
pub struct TokioTaskSpawner;

impl TokioTaskSpawner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TokioTaskSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskSpawner for TokioTaskSpawner {
    fn spawn(&self, future: BoxFuture<'static, ()>) {
        tokio::spawn(future);
    }
}

/// Wall clock pinned to the business time zone.
#[derive(Clone)]
pub struct SystemClock {
    zone: Tz,
}

impl SystemClock {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }
}

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_now(&self) -> NaiveDateTime {
        self.now_utc().with_timezone(&self.zone).naive_local()
    }
}

/// Clock frozen at a given local instant; the UTC reading uses the same wall time.
#[derive(Clone)]
pub struct FixedClock {
    local: std::sync::Arc<std::sync::Mutex<NaiveDateTime>>,
}

impl FixedClock {
    pub fn new(local: NaiveDateTime) -> Self {
        Self {
            local: std::sync::Arc::new(std::sync::Mutex::new(local)),
        }
    }

    pub fn set(&self, local: NaiveDateTime) {
        if let Ok(mut guard) = self.local.lock() {
            *guard = local;
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut guard) = self.local.lock() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.local_now().and_utc()
    }

    fn local_now(&self) -> NaiveDateTime {
        match self.local.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
