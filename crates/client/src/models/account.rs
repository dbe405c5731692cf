//! Account entities: delivery addresses, profile and notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use brewmart_core::{AddressId, NotificationId, UserId};

use super::shipping::{City, Department};

// =============================================================================
// Delivery details
// =============================================================================

/// Where and to whom a parcel goes.
///
/// Stored flattened on both `addresses` and `orders`, so an order keeps the
/// delivery it was placed with even if the address is later deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    pub recipient_name: String,
    /// Normalised `+380` phone number.
    pub recipient_phone: String,
    pub city_name: String,
    pub city_ref: String,
    pub department_name: String,
    pub department_ref: String,
}

impl DeliveryDetails {
    /// Build delivery details from carrier lookups.
    #[must_use]
    pub fn new(
        recipient_name: &str,
        recipient_phone: &str,
        city: &City,
        department: &Department,
    ) -> Self {
        Self {
            recipient_name: recipient_name.trim().to_string(),
            recipient_phone: recipient_phone.to_string(),
            city_name: city.name.clone(),
            city_ref: city.reference.clone(),
            department_name: department.description.clone(),
            department_ref: department.reference.clone(),
        }
    }

    /// The city as a carrier lookup result.
    #[must_use]
    pub fn city(&self) -> City {
        City {
            reference: self.city_ref.clone(),
            name: self.city_name.clone(),
            area: None,
        }
    }

    /// The department as a carrier lookup result.
    #[must_use]
    pub fn department(&self) -> Department {
        Department {
            reference: self.department_ref.clone(),
            number: String::new(),
            description: self.department_name.clone(),
            city_reference: self.city_ref.clone(),
        }
    }
}

// =============================================================================
// Address
// =============================================================================

/// `addresses` row.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressRow {
    pub id: AddressId,
    #[serde(flatten)]
    pub delivery: DeliveryDetails,
    #[serde(default)]
    pub is_default: bool,
}

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub id: AddressId,
    pub delivery: DeliveryDetails,
    pub is_default: bool,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: row.id,
            delivery: row.delivery,
            is_default: row.is_default,
        }
    }
}

/// Insert payload for `addresses`.
#[derive(Debug, Clone, Serialize)]
pub struct NewAddress {
    pub user_id: UserId,
    #[serde(flatten)]
    pub delivery: DeliveryDetails,
    pub is_default: bool,
}

// =============================================================================
// Profile
// =============================================================================

/// `profiles` row; `id` is the auth user's id.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub id: UserId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_path: Option<String>,
}

/// The signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Profile {
    pub id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub avatar_path: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: Some(row.id),
            first_name: row.first_name.unwrap_or_default(),
            last_name: row.last_name.unwrap_or_default(),
            phone: row.phone.filter(|p| !p.is_empty()),
            email: row.email.filter(|e| !e.is_empty()),
            avatar_path: row.avatar_path.filter(|p| !p.is_empty()),
            avatar_url: None,
        }
    }
}

impl Profile {
    /// "First Last", skipping empty parts.
    #[must_use]
    pub fn full_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Patch payload for `profiles`; unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// =============================================================================
// Notification
// =============================================================================

/// `notifications` row.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationRow {
    pub id: NotificationId,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A message for the user (order updates, news).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            body: row.body.unwrap_or_default(),
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}
