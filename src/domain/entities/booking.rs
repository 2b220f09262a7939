use serde::{Deserialize, Serialize};

use super::slot::SlotTime;
use super::user::ChatIdentity;

/// A live booking joined with everything needed to notify both sides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDetails {
    pub booking_id: i64,
    pub user_id: i64,
    pub client_identity: ChatIdentity,
    pub client_name: String,
    pub slot_id: i64,
    pub at: SlotTime,
    pub specialist_id: i64,
    pub specialist_name: String,
    pub specialist_identity: ChatIdentity,
    pub specialization: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosureOutcome {
    Expired,
    Cancelled,
}

impl ClosureOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClosureOutcome::Expired => "expired",
            ClosureOutcome::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for ClosureOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expired" => Ok(ClosureOutcome::Expired),
            "cancelled" => Ok(ClosureOutcome::Cancelled),
            _ => Err(format!("Invalid closure outcome: {}", s)),
        }
    }
}

/// Immutable archive row, written once when a booking closes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingHistory {
    pub id: i64,
    pub user_id: i64,
    pub slot_id: i64,
    pub specialist_id: i64,
    pub created_at: String,
    pub closed_at: String,
    pub outcome: ClosureOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    /// Sent when the appointment is 23-24 hours away.
    Tomorrow,
    /// Sent during the last hour before the appointment.
    Soon,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::Tomorrow => "tomorrow",
            ReminderKind::Soon => "soon",
        }
    }

    /// Reminder window for a given number of hours until the start, if any.
    pub fn for_hours_until(hours: f64) -> Option<ReminderKind> {
        if hours > 23.0 && hours <= 24.0 {
            Some(ReminderKind::Tomorrow)
        } else if hours > 0.0 && hours <= 1.0 {
            Some(ReminderKind::Soon)
        } else {
            None
        }
    }
}
