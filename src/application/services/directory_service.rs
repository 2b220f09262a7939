use crate::domain::entities::{
    ChatIdentity, NewSpecialist, Service, Specialist, SpecialistProfile, SlotTime,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{Clock, DirectoryRepository, UserRepository};
use crate::shared::utils::name_validator::{require_text, validate_service_name};
use std::sync::Arc;

/// Specialists and their services.
#[derive(Clone)]
pub struct DirectoryService {
    directory: Arc<dyn DirectoryRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl DirectoryService {
    pub fn new(
        directory: Arc<dyn DirectoryRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            directory,
            users,
            clock,
        }
    }

    /// Rejects identities that already belong to a specialist.
    pub async fn ensure_onboardable(&self, identity: ChatIdentity) -> DomainResult<()> {
        if let Some(user) = self.users.find_user_by_identity(identity).await? {
            if self.directory.find_specialist_by_user(user.id).await?.is_some() {
                return Err(DomainError::Validation(format!(
                    "Identity {} is already registered as a specialist",
                    identity
                )));
            }
        }
        Ok(())
    }

    pub async fn onboard(&self, new: NewSpecialist) -> DomainResult<Specialist> {
        let new = NewSpecialist {
            telegram_identity: new.telegram_identity,
            name: require_text(&new.name, "Name")?,
            specialization: require_text(&new.specialization, "Specialization")?,
            description: require_text(&new.description, "Description")?,
            first_service: validate_service_name(&new.first_service)?,
            first_slot: new.first_slot,
        };

        if new.first_slot < SlotTime::from_local(self.clock.local_now()) {
            return Err(DomainError::Validation(
                "The slot must be in the future".to_string(),
            ));
        }

        self.ensure_onboardable(new.telegram_identity).await?;

        let specialist = self.directory.onboard_specialist(&new).await?;
        tracing::info!(
            specialist_id = specialist.id,
            identity = new.telegram_identity,
            "Specialist onboarded"
        );
        Ok(specialist)
    }

    pub async fn get_specialist(&self, id: i64) -> DomainResult<SpecialistProfile> {
        self.directory
            .get_specialist(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("specialist #{}", id)))
    }

    pub async fn specialist_for_user(&self, user_id: i64) -> DomainResult<Option<Specialist>> {
        self.directory.find_specialist_by_user(user_id).await
    }

    pub async fn list_specialists(&self) -> DomainResult<Vec<SpecialistProfile>> {
        self.directory.list_specialists().await
    }

    pub async fn add_service(&self, specialist_id: i64, name: &str) -> DomainResult<Service> {
        let name = validate_service_name(name)?;
        self.get_specialist(specialist_id).await?;

        let service = self.directory.create_service(specialist_id, &name).await?;
        tracing::info!(service_id = service.id, specialist_id, "Service added");
        Ok(service)
    }

    pub async fn rename_service(&self, service_id: i64, name: &str) -> DomainResult<String> {
        let name = validate_service_name(name)?;
        self.directory.rename_service(service_id, &name).await?;
        tracing::info!(service_id, "Service renamed");
        Ok(name)
    }

    pub async fn get_service(&self, id: i64) -> DomainResult<Service> {
        self.directory
            .get_service(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("service #{}", id)))
    }

    pub async fn list_services(&self, specialist_id: i64) -> DomainResult<Vec<Service>> {
        self.directory.list_services(specialist_id).await
    }
}
