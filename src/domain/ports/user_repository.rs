use crate::domain::entities::{ChatIdentity, User, UserRole};
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_identity(&self, identity: ChatIdentity) -> DomainResult<Option<User>>;
    async fn get_user_by_id(&self, id: i64) -> DomainResult<Option<User>>;
    /// Creates a client on first contact; otherwise refreshes the display name only.
    async fn upsert_user(&self, identity: ChatIdentity, name: &str) -> DomainResult<User>;
    /// Creates the user with `role`, or promotes an existing one. Admins keep their role.
    async fn assign_role(
        &self,
        identity: ChatIdentity,
        name: &str,
        role: UserRole,
    ) -> DomainResult<User>;
    async fn list_admin_identities(&self) -> DomainResult<Vec<ChatIdentity>>;
}
