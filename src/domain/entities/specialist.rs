use serde::{Deserialize, Serialize};

use super::user::ChatIdentity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specialist {
    pub id: i64,
    pub user_id: i64,
    pub specialization: String,
    pub description: String,
}

/// Specialist joined with the owning user, as shown in menus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialistProfile {
    pub id: i64,
    pub name: String,
    pub specialization: String,
    pub telegram_identity: ChatIdentity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub specialist_id: i64,
    pub name: String,
}

/// Everything the onboarding form collects before a single commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSpecialist {
    pub telegram_identity: ChatIdentity,
    pub name: String,
    pub specialization: String,
    pub description: String,
    pub first_service: String,
    pub first_slot: super::slot::SlotTime,
}
