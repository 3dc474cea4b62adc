//! Resolution of provider profiles to local identities.
//!
//! Email is the sole natural key: a profile's email either maps to an
//! existing identity or causes one to be created. Repeat logins never
//! update the stored name or picture, and logins from different providers
//! sharing an email resolve to the same identity. Uniqueness under
//! concurrent first-time logins is enforced by the store's unique email
//! constraint, not here.

use crate::auth::provider::ProfileData;
use crate::entity::identity;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};
use std::sync::Arc;

/// Contract to the durable identity store.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn lookup_identity_by_email(&self, email: &str) -> Result<Option<i32>, DbErr>;

    async fn create_identity(
        &self,
        name: &str,
        email: &str,
        picture_url: Option<&str>,
    ) -> Result<i32, DbErr>;
}

/// SeaORM-backed identity store.
#[derive(Clone)]
pub struct DbIdentityStore {
    db: Arc<DatabaseConnection>,
}

impl DbIdentityStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentityStore for DbIdentityStore {
    async fn lookup_identity_by_email(&self, email: &str) -> Result<Option<i32>, DbErr> {
        let found = identity::Entity::find()
            .filter(identity::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await?;
        Ok(found.map(|model| model.id))
    }

    async fn create_identity(
        &self,
        name: &str,
        email: &str,
        picture_url: Option<&str>,
    ) -> Result<i32, DbErr> {
        let model = identity::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            picture_url: Set(picture_url.map(String::from)),
            ..Default::default()
        };
        let inserted = model.insert(self.db.as_ref()).await?;
        Ok(inserted.id)
    }
}

/// Maps profile data to a local identity id, creating the identity when the
/// email is unknown.
#[derive(Clone)]
pub struct IdentityResolver<S> {
    store: S,
}

impl<S: IdentityStore> IdentityResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Idempotent by email: a second resolve with the same email returns
    /// the existing id unchanged, with no field refresh from the new
    /// profile.
    #[tracing::instrument(skip(self, profile), fields(email = %profile.email))]
    pub async fn resolve(&self, profile: &ProfileData) -> Result<i32, DbErr> {
        if let Some(id) = self
            .store
            .lookup_identity_by_email(&profile.email)
            .await?
        {
            return Ok(id);
        }

        let id = self
            .store
            .create_identity(&profile.name, &profile.email, profile.picture_url.as_deref())
            .await?;
        tracing::info!(identity_id = id, "Created identity on first login");
        Ok(id)
    }
}
