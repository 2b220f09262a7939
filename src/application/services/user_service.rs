use crate::domain::entities::{ChatIdentity, User, UserRole};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::UserRepository;
use std::sync::Arc;

const FALLBACK_NAME: &str = "Anonymous";

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Called on every inbound event; creates a client on first contact.
    pub async fn register(&self, identity: ChatIdentity, display_name: &str) -> DomainResult<User> {
        let name = display_name.trim();
        let name = if name.is_empty() { FALLBACK_NAME } else { name };
        self.users.upsert_user(identity, name).await
    }

    pub async fn promote(
        &self,
        identity: ChatIdentity,
        name: &str,
        role: UserRole,
    ) -> DomainResult<User> {
        let user = self.users.assign_role(identity, name, role).await?;
        tracing::info!(identity, role = %user.role, "User role assigned");
        Ok(user)
    }

    /// Creates or promotes every configured admin identity.
    pub async fn seed_admins(&self, identities: &[ChatIdentity]) -> DomainResult<()> {
        for &identity in identities {
            let name = match self.users.find_user_by_identity(identity).await? {
                Some(existing) => existing.name,
                None => "Admin".to_string(),
            };
            self.promote(identity, &name, UserRole::Admin).await?;
        }
        Ok(())
    }

    pub async fn get_user(&self, id: i64) -> DomainResult<User> {
        self.users
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user #{}", id)))
    }

    pub async fn find_by_identity(&self, identity: ChatIdentity) -> DomainResult<Option<User>> {
        self.users.find_user_by_identity(identity).await
    }
}
