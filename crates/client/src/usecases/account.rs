//! Authentication, profile, address and notification use-cases.

use std::sync::Arc;

use serde_json::json;

use brewmart_core::{AddressId, Email, NotificationId, PhoneNumber};

use super::orders::validate_delivery;
use super::{failed, sign_path, signed_in_user};
use crate::backend::{AuthUser, OtpKind, SignUpOutcome, UserAttributes};
use crate::error::{Outcome, UseCaseError, clear_sentry_user, set_sentry_user};
use crate::models::{Address, DeliveryDetails, NewAddress, Notification, Profile, ProfileUpdate};
use crate::repositories::{
    AddressRepository, AuthRepository, ImageSigner, NotificationRepository, ProfileRepository,
};

/// Shortest password the auth provider accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

// =============================================================================
// Auth
// =============================================================================

/// Sign in, sign up and OTP confirmation.
#[derive(Clone)]
pub struct AuthUseCases {
    auth: Arc<dyn AuthRepository>,
}

impl AuthUseCases {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthRepository>) -> Self {
        Self { auth }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Fails with `Invalid` for a malformed email or empty password, or with
    /// the provider's error.
    pub async fn sign_in(&self, email: &str, password: &str) -> Outcome<AuthUser> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(UseCaseError::invalid("Enter your password"));
        }
        let session = self
            .auth
            .sign_in(&email, password)
            .await
            .map_err(failed("sign_in"))?;
        set_sentry_user(&session.user.id, session.user.email.as_deref());
        tracing::info!(user = %session.user.id, "Signed in");
        Ok(session.user)
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Fails with `Invalid` for a malformed email or short password, or with
    /// the provider's error.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Outcome<SignUpOutcome> {
        let email = Email::parse(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(UseCaseError::invalid(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let metadata = json!({
            "first_name": first_name.trim(),
            "last_name": last_name.trim(),
        });
        let outcome = self
            .auth
            .sign_up(&email, password, metadata)
            .await
            .map_err(failed("sign_up"))?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            set_sentry_user(&session.user.id, session.user.email.as_deref());
        }
        Ok(outcome)
    }

    /// Confirm a sign-up with the emailed code.
    ///
    /// # Errors
    ///
    /// Fails with `Invalid` for a blank code, `Unauthorized` for a wrong or
    /// expired code.
    pub async fn verify_otp(&self, email: &str, code: &str) -> Outcome<AuthUser> {
        let email = Email::parse(email)?;
        let code = code.trim();
        if code.is_empty() {
            return Err(UseCaseError::invalid("Enter the code from the email"));
        }
        let session = self
            .auth
            .verify_otp(&email, code, OtpKind::Signup)
            .await
            .map_err(failed("verify_otp"))?;
        set_sentry_user(&session.user.id, session.user.email.as_deref());
        Ok(session.user)
    }

    /// Send the sign-up code again.
    ///
    /// # Errors
    ///
    /// Fails if the provider refuses (rate limit) or the request fails.
    pub async fn resend_otp(&self, email: &str) -> Outcome<()> {
        let email = Email::parse(email)?;
        self.auth
            .resend_otp(&email)
            .await
            .map_err(failed("resend_otp"))
    }

    /// Sign out. The local session is gone even when this fails.
    ///
    /// # Errors
    ///
    /// Fails if the provider call fails.
    pub async fn sign_out(&self) -> Outcome<()> {
        let result = self.auth.sign_out().await.map_err(failed("sign_out"));
        clear_sentry_user();
        result
    }

    /// The signed-in user, if any.
    pub async fn current_user(&self) -> Option<AuthUser> {
        self.auth.current_user().await
    }
}

// =============================================================================
// Profile and addresses
// =============================================================================

/// Values of the profile edit form, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    /// Empty clears the phone.
    pub phone: String,
    pub email: String,
}

impl From<&Profile> for ProfileForm {
    fn from(profile: &Profile) -> Self {
        Self {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            phone: profile.phone.clone().unwrap_or_default(),
            email: profile.email.clone().unwrap_or_default(),
        }
    }
}

/// The signed-in user's profile and saved addresses.
#[derive(Clone)]
pub struct ProfileUseCases {
    auth: Arc<dyn AuthRepository>,
    profiles: Arc<dyn ProfileRepository>,
    addresses: Arc<dyn AddressRepository>,
    images: Arc<dyn ImageSigner>,
}

impl ProfileUseCases {
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthRepository>,
        profiles: Arc<dyn ProfileRepository>,
        addresses: Arc<dyn AddressRepository>,
        images: Arc<dyn ImageSigner>,
    ) -> Self {
        Self {
            auth,
            profiles,
            addresses,
            images,
        }
    }

    /// The profile with a signed avatar URL. A missing email falls back to
    /// the auth user's.
    ///
    /// # Errors
    ///
    /// Fails with `Unauthorized` when signed out, or if a request fails.
    pub async fn get_profile(&self) -> Outcome<Profile> {
        let user = self
            .auth
            .current_user()
            .await
            .ok_or_else(UseCaseError::unauthorized)?;
        let mut profile = self
            .profiles
            .profile(user.id)
            .await
            .map_err(failed("get_profile"))?;
        if profile.email.is_none() {
            profile.email = user.email;
        }
        profile.avatar_url = sign_path(self.images.as_ref(), profile.avatar_path.as_deref())
            .await
            .map_err(failed("get_profile"))?;
        Ok(profile)
    }

    /// Save the profile form.
    ///
    /// Email and phone also live on the auth user; they are sent to the auth
    /// provider first when they differ from it, then the profile row is
    /// patched.
    ///
    /// # Errors
    ///
    /// Fails with `Invalid` for a malformed email or phone, or if a request
    /// fails.
    pub async fn update_profile(&self, form: &ProfileForm) -> Outcome<Profile> {
        let email = Email::parse(&form.email)?;
        let phone = match form.phone.trim() {
            "" => None,
            raw => Some(PhoneNumber::parse(raw)?),
        };
        let user = self
            .auth
            .current_user()
            .await
            .ok_or_else(UseCaseError::unauthorized)?;

        let attributes = UserAttributes {
            email: (user.email.as_deref() != Some(email.as_str()))
                .then(|| email.as_str().to_string()),
            phone: phone
                .as_ref()
                .filter(|p| user.phone.as_deref() != Some(p.as_str()))
                .map(|p| p.as_str().to_string()),
            ..UserAttributes::default()
        };
        if !attributes.is_empty() {
            self.auth
                .update_user(&attributes)
                .await
                .map_err(failed("update_profile"))?;
        }

        let update = ProfileUpdate {
            first_name: Some(form.first_name.trim().to_string()),
            last_name: Some(form.last_name.trim().to_string()),
            phone: Some(phone.map(|p| p.as_str().to_string()).unwrap_or_default()),
            email: Some(email.into_inner()),
        };
        let mut profile = self
            .profiles
            .update_profile(user.id, &update)
            .await
            .map_err(failed("update_profile"))?;
        profile.avatar_url = sign_path(self.images.as_ref(), profile.avatar_path.as_deref())
            .await
            .map_err(failed("update_profile"))?;
        Ok(profile)
    }

    /// Saved addresses, default first.
    ///
    /// # Errors
    ///
    /// Fails with `Unauthorized` when signed out, or if the request fails.
    pub async fn get_addresses(&self) -> Outcome<Vec<Address>> {
        let user = signed_in_user(self.auth.as_ref()).await?;
        self.addresses
            .addresses(user)
            .await
            .map_err(failed("get_addresses"))
    }

    /// Save a delivery address for reuse at checkout.
    ///
    /// # Errors
    ///
    /// Fails with `Invalid` for incomplete details, or if the request fails.
    pub async fn save_address(
        &self,
        delivery: &DeliveryDetails,
        is_default: bool,
    ) -> Outcome<Address> {
        let delivery = validate_delivery(delivery)?;
        let user = signed_in_user(self.auth.as_ref()).await?;
        self.addresses
            .add_address(&NewAddress {
                user_id: user,
                delivery,
                is_default,
            })
            .await
            .map_err(failed("save_address"))
    }

    /// Delete a saved address.
    ///
    /// # Errors
    ///
    /// Fails if the request fails.
    pub async fn delete_address(&self, id: AddressId) -> Outcome<()> {
        self.addresses
            .delete_address(id)
            .await
            .map_err(failed("delete_address"))
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// The signed-in user's notifications.
#[derive(Clone)]
pub struct NotificationUseCases {
    auth: Arc<dyn AuthRepository>,
    notifications: Arc<dyn NotificationRepository>,
}

impl NotificationUseCases {
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthRepository>,
        notifications: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self {
            auth,
            notifications,
        }
    }

    /// Newest first.
    ///
    /// # Errors
    ///
    /// Fails with `Unauthorized` when signed out, or if the request fails.
    pub async fn get_notifications(&self) -> Outcome<Vec<Notification>> {
        let user = signed_in_user(self.auth.as_ref()).await?;
        self.notifications
            .notifications(user)
            .await
            .map_err(failed("get_notifications"))
    }

    /// # Errors
    ///
    /// Fails if the request fails.
    pub async fn mark_notification_read(&self, id: NotificationId) -> Outcome<()> {
        self.notifications
            .mark_read(id)
            .await
            .map_err(failed("mark_notification_read"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{FakeBackend, delivery};

    fn auth(fake: &Arc<FakeBackend>) -> AuthUseCases {
        AuthUseCases::new(fake.clone())
    }

    fn profiles(fake: &Arc<FakeBackend>) -> ProfileUseCases {
        ProfileUseCases::new(fake.clone(), fake.clone(), fake.clone(), fake.clone())
    }

    #[tokio::test]
    async fn test_sign_in_validates_before_request() {
        let fake = FakeBackend::new();
        let err = auth(&fake).sign_in("not-an-email", "secret").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Invalid);
        let err = auth(&fake).sign_in("olena@example.com", "").await.unwrap_err();
        assert_eq!(err.message, "Enter your password");
        assert_eq!(fake.calls("sign_in"), 0);
    }

    #[tokio::test]
    async fn test_sign_in_then_out() {
        let fake = FakeBackend::new();
        let auth = auth(&fake);
        let user = auth.sign_in("olena@example.com", "correct horse").await.unwrap();
        assert_eq!(user.email.as_deref(), Some("olena@example.com"));
        assert!(auth.current_user().await.is_some());

        auth.sign_out().await.unwrap();
        assert!(auth.current_user().await.is_none());
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let fake = FakeBackend::new();
        let err = auth(&fake)
            .sign_in("olena@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_sign_up_rejects_short_password() {
        let fake = FakeBackend::new();
        let err = auth(&fake)
            .sign_up("olena@example.com", "12345", "Olena", "K")
            .await
            .unwrap_err();
        assert_eq!(err.message, "Password must be at least 6 characters");
    }

    #[tokio::test]
    async fn test_sign_up_then_verify() {
        let fake = FakeBackend::new();
        let auth = auth(&fake);
        let outcome = auth
            .sign_up("taras@example.com", "long enough", "Taras", "Shevchenko")
            .await
            .unwrap();
        assert!(matches!(outcome, SignUpOutcome::ConfirmationRequired(_)));

        let err = auth.verify_otp("taras@example.com", "  ").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Invalid);

        let user = auth.verify_otp("taras@example.com", "123456").await.unwrap();
        assert_eq!(user.email.as_deref(), Some("taras@example.com"));
    }

    #[tokio::test]
    async fn test_profile_falls_back_to_auth_email() {
        let fake = FakeBackend::signed_in();
        let profile = profiles(&fake).get_profile().await.unwrap();
        assert_eq!(profile.email.as_deref(), Some("olena@example.com"));
        assert_eq!(profile.first_name, "Olena");
    }

    #[tokio::test]
    async fn test_update_profile_pushes_changed_contact_fields_to_auth() {
        let fake = FakeBackend::signed_in();
        let form = ProfileForm {
            first_name: " Olena ".to_string(),
            last_name: "Kovalenko".to_string(),
            phone: "0671234567".to_string(),
            email: "olena@example.com".to_string(),
        };
        let profile = profiles(&fake).update_profile(&form).await.unwrap();
        assert_eq!(profile.first_name, "Olena");
        assert_eq!(profile.phone.as_deref(), Some("+380671234567"));

        let attributes = fake.last_user_update().unwrap();
        assert_eq!(attributes.phone.as_deref(), Some("+380671234567"));
        assert!(attributes.email.is_none());
    }

    #[tokio::test]
    async fn test_update_profile_rejects_bad_phone() {
        let fake = FakeBackend::signed_in();
        let form = ProfileForm {
            phone: "12345".to_string(),
            email: "olena@example.com".to_string(),
            ..ProfileForm::default()
        };
        let err = profiles(&fake).update_profile(&form).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Invalid);
        assert!(fake.last_user_update().is_none());
    }

    #[tokio::test]
    async fn test_saved_addresses_are_listed() {
        let fake = FakeBackend::signed_in();
        let profiles = profiles(&fake);
        let saved = profiles.save_address(&delivery(), true).await.unwrap();
        assert!(saved.is_default);
        let addresses = profiles.get_addresses().await.unwrap();
        assert_eq!(addresses, vec![saved.clone()]);

        profiles.delete_address(saved.id).await.unwrap();
        assert!(profiles.get_addresses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notifications_require_session() {
        let fake = FakeBackend::new();
        let notifications = NotificationUseCases::new(fake.clone(), fake.clone());
        let err = notifications.get_notifications().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }
}
