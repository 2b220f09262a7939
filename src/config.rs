use chrono::NaiveTime;
use chrono_tz::Tz;
use std::env;
use std::time::Duration;

use crate::domain::entities::ChatIdentity;
use crate::shared::utils::datetime::TIME_FORMAT;

/// Tunables of the periodic reconciliation job.
#[derive(Clone, Debug, PartialEq)]
pub struct SchedulerSettings {
    pub tick: Duration,
    /// Times of day generated for every working day.
    pub daily_times: Vec<NaiveTime>,
    /// Number of calendar days, starting tomorrow, kept populated with slots.
    pub regeneration_days: u32,
    /// Free slots older than this are pruned.
    pub expiry_grace: chrono::Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(60),
            daily_times: default_daily_times(),
            regeneration_days: 7,
            expiry_grace: chrono::Duration::minutes(5),
        }
    }
}

fn default_daily_times() -> Vec<NaiveTime> {
    [(10, 0), (14, 0), (18, 0)]
        .iter()
        .filter_map(|&(h, m)| NaiveTime::from_hms_opt(h, m, 0))
        .collect()
}

#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_token: String,
    pub database_url: String,
    pub business_timezone: Tz,
    pub admin_identities: Vec<ChatIdentity>,
    pub scheduler: SchedulerSettings,
    pub flow_ttl: Duration,
    pub outbound_messages_per_second: u32,
    pub otel_exporter_endpoint: Option<String>,
    pub service_name: String,
    pub metrics_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let telegram_token = lookup("TELEGRAM_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingTelegramToken)?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://slotdesk.db?mode=rwc".to_string());

        let business_timezone = match lookup("BUSINESS_TIMEZONE") {
            Some(name) => name
                .trim()
                .parse::<Tz>()
                .map_err(|_| ConfigError::Invalid("BUSINESS_TIMEZONE", name.clone()))?,
            None => Tz::UTC,
        };

        let admin_identities = match lookup("ADMIN_TELEGRAM_IDS") {
            Some(raw) => parse_identities(&raw)?,
            None => Vec::new(),
        };

        let defaults = SchedulerSettings::default();

        let tick_seconds: u64 = parse_or("SCHEDULER_TICK_SECONDS", &lookup, 60)?;
        if tick_seconds == 0 {
            return Err(ConfigError::Invalid(
                "SCHEDULER_TICK_SECONDS",
                tick_seconds.to_string(),
            ));
        }

        let daily_times = match lookup("DAILY_SLOT_TIMES") {
            Some(raw) => parse_daily_times(&raw)?,
            None => defaults.daily_times,
        };

        let regeneration_days: u32 = parse_or("REGENERATION_DAYS", &lookup, 7)?;
        let grace_minutes: i64 = parse_or("EXPIRY_GRACE_MINUTES", &lookup, 5)?;
        let expiry_grace = Some(grace_minutes)
            .filter(|minutes| *minutes >= 0)
            .and_then(chrono::Duration::try_minutes)
            .ok_or_else(|| {
                ConfigError::Invalid("EXPIRY_GRACE_MINUTES", grace_minutes.to_string())
            })?;

        let flow_ttl_minutes: u64 = parse_or("FLOW_TTL_MINUTES", &lookup, 30)?;
        let flow_ttl = flow_ttl_minutes
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                ConfigError::Invalid("FLOW_TTL_MINUTES", flow_ttl_minutes.to_string())
            })?;

        let outbound_messages_per_second: u32 =
            parse_or("OUTBOUND_MESSAGES_PER_SECOND", &lookup, 25)?;
        if outbound_messages_per_second == 0 {
            return Err(ConfigError::Invalid(
                "OUTBOUND_MESSAGES_PER_SECOND",
                "0".to_string(),
            ));
        }

        let otel_exporter_endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT");

        let service_name = lookup("SERVICE_NAME").unwrap_or_else(|| "slotdesk".to_string());

        let metrics_port: u16 = parse_or("METRICS_PORT", &lookup, 9000)?;

        Ok(Config {
            telegram_token,
            database_url,
            business_timezone,
            admin_identities,
            scheduler: SchedulerSettings {
                tick: Duration::from_secs(tick_seconds),
                daily_times,
                regeneration_days,
                expiry_grace,
            },
            flow_ttl,
            outbound_messages_per_second,
            otel_exporter_endpoint,
            service_name,
            metrics_port,
        })
    }
}

fn parse_or<T, F>(key: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(key, raw.clone())),
        None => Ok(default),
    }
}

fn parse_identities(raw: &str) -> Result<Vec<ChatIdentity>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse()
                .map_err(|_| ConfigError::Invalid("ADMIN_TELEGRAM_IDS", part.to_string()))
        })
        .collect()
}

fn parse_daily_times(raw: &str) -> Result<Vec<NaiveTime>, ConfigError> {
    let mut times = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            NaiveTime::parse_from_str(part, TIME_FORMAT)
                .map_err(|_| ConfigError::Invalid("DAILY_SLOT_TIMES", part.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if times.is_empty() {
        return Err(ConfigError::Invalid("DAILY_SLOT_TIMES", raw.to_string()));
    }

    times.sort();
    times.dedup();
    Ok(times)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TELEGRAM_TOKEN environment variable not set")]
    MissingTelegramToken,

    #[error("Invalid value for {0}: '{1}'")]
    Invalid(&'static str, String),
}
