use crate::domain::entities::{NewSpecialist, Service, Specialist, SpecialistProfile};
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Writes user, specialist, first service and first slot in one transaction.
    async fn onboard_specialist(&self, new: &NewSpecialist) -> DomainResult<Specialist>;
    async fn get_specialist(&self, id: i64) -> DomainResult<Option<SpecialistProfile>>;
    async fn find_specialist_by_user(&self, user_id: i64) -> DomainResult<Option<Specialist>>;
    async fn list_specialists(&self) -> DomainResult<Vec<SpecialistProfile>>;

    async fn create_service(&self, specialist_id: i64, name: &str) -> DomainResult<Service>;
    async fn rename_service(&self, service_id: i64, name: &str) -> DomainResult<()>;
    async fn get_service(&self, id: i64) -> DomainResult<Option<Service>>;
    async fn list_services(&self, specialist_id: i64) -> DomainResult<Vec<Service>>;
}
