//! Account repositories: auth, profile, saved addresses and notifications.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::instrument;

use brewmart_core::{AddressId, Email, NotificationId, UserId};

use crate::backend::{
    AuthClient, AuthUser, BackendClient, BackendError, Direction, OtpKind, Session,
    SignUpOutcome, UserAttributes,
};
use crate::models::{
    Address, AddressRow, NewAddress, Notification, NotificationRow, Profile, ProfileRow,
    ProfileUpdate,
};

/// Session management against the auth provider.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn sign_in(&self, email: &Email, password: &str) -> Result<Session, BackendError>;

    /// `metadata` is stored as the user's free-form metadata.
    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        metadata: Value,
    ) -> Result<SignUpOutcome, BackendError>;

    async fn verify_otp(
        &self,
        email: &Email,
        code: &str,
        kind: OtpKind,
    ) -> Result<Session, BackendError>;

    async fn resend_otp(&self, email: &Email) -> Result<(), BackendError>;

    async fn update_user(&self, attributes: &UserAttributes) -> Result<AuthUser, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;

    /// The signed-in user, if any. Never makes a request.
    async fn current_user(&self) -> Option<AuthUser>;
}

/// The `profiles` row of a user.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn profile(&self, user: UserId) -> Result<Profile, BackendError>;

    async fn update_profile(
        &self,
        user: UserId,
        update: &ProfileUpdate,
    ) -> Result<Profile, BackendError>;
}

/// Saved delivery addresses.
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Default address first, then newest.
    async fn addresses(&self, user: UserId) -> Result<Vec<Address>, BackendError>;

    async fn add_address(&self, address: &NewAddress) -> Result<Address, BackendError>;

    async fn delete_address(&self, id: AddressId) -> Result<(), BackendError>;
}

/// Messages addressed to the user.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Newest first.
    async fn notifications(&self, user: UserId) -> Result<Vec<Notification>, BackendError>;

    async fn mark_read(&self, id: NotificationId) -> Result<(), BackendError>;
}

/// [`AuthRepository`] over the auth endpoints.
#[derive(Debug, Clone)]
pub struct RemoteAuthRepository {
    auth: AuthClient,
}

impl RemoteAuthRepository {
    #[must_use]
    pub const fn new(auth: AuthClient) -> Self {
        Self { auth }
    }
}

#[async_trait]
impl AuthRepository for RemoteAuthRepository {
    async fn sign_in(&self, email: &Email, password: &str) -> Result<Session, BackendError> {
        self.auth.sign_in_with_password(email, password).await
    }

    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        metadata: Value,
    ) -> Result<SignUpOutcome, BackendError> {
        self.auth.sign_up(email, password, metadata).await
    }

    async fn verify_otp(
        &self,
        email: &Email,
        code: &str,
        kind: OtpKind,
    ) -> Result<Session, BackendError> {
        self.auth.verify_otp(email, code, kind).await
    }

    async fn resend_otp(&self, email: &Email) -> Result<(), BackendError> {
        self.auth.resend_otp(email).await
    }

    async fn update_user(&self, attributes: &UserAttributes) -> Result<AuthUser, BackendError> {
        self.auth.update_user(attributes).await
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.auth.sign_out().await
    }

    async fn current_user(&self) -> Option<AuthUser> {
        self.auth.current_user().await
    }
}

/// Profile, address and notification tables over the REST layer.
#[derive(Debug, Clone)]
pub struct RemoteAccountRepository {
    backend: BackendClient,
}

impl RemoteAccountRepository {
    #[must_use]
    pub const fn new(backend: BackendClient) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ProfileRepository for RemoteAccountRepository {
    #[instrument(skip(self))]
    async fn profile(&self, user: UserId) -> Result<Profile, BackendError> {
        let row: ProfileRow = self
            .backend
            .from("profiles")
            .select("*")
            .eq("id", user)
            .single()
            .await?;
        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn update_profile(
        &self,
        user: UserId,
        update: &ProfileUpdate,
    ) -> Result<Profile, BackendError> {
        let rows: Vec<ProfileRow> = self
            .backend
            .from("profiles")
            .select("*")
            .eq("id", user)
            .update(update)
            .await?;
        rows.into_iter()
            .next()
            .map(Profile::from)
            .ok_or_else(|| BackendError::NotFound(format!("profile {user}")))
    }
}

#[async_trait]
impl AddressRepository for RemoteAccountRepository {
    #[instrument(skip(self))]
    async fn addresses(&self, user: UserId) -> Result<Vec<Address>, BackendError> {
        let rows: Vec<AddressRow> = self
            .backend
            .from("addresses")
            .select("*")
            .eq("user_id", user)
            .order("is_default", Direction::Descending)
            .order("id", Direction::Descending)
            .select_all()
            .await?;
        Ok(rows.into_iter().map(Address::from).collect())
    }

    #[instrument(skip(self, address), fields(user = %address.user_id))]
    async fn add_address(&self, address: &NewAddress) -> Result<Address, BackendError> {
        let rows: Vec<AddressRow> = self
            .backend
            .from("addresses")
            .select("*")
            .insert(address)
            .await?;
        rows.into_iter()
            .next()
            .map(Address::from)
            .ok_or_else(|| BackendError::NotFound("no row returned from 'addresses'".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete_address(&self, id: AddressId) -> Result<(), BackendError> {
        self.backend.from("addresses").eq("id", id).delete().await
    }
}

#[async_trait]
impl NotificationRepository for RemoteAccountRepository {
    #[instrument(skip(self))]
    async fn notifications(&self, user: UserId) -> Result<Vec<Notification>, BackendError> {
        let rows: Vec<NotificationRow> = self
            .backend
            .from("notifications")
            .select("*")
            .eq("user_id", user)
            .order("created_at", Direction::Descending)
            .select_all()
            .await?;
        Ok(rows.into_iter().map(Notification::from).collect())
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, id: NotificationId) -> Result<(), BackendError> {
        let _: Vec<Value> = self
            .backend
            .from("notifications")
            .select("id")
            .eq("id", id)
            .update(&json!({ "is_read": true }))
            .await?;
        Ok(())
    }
}
