//! In-memory backend used by unit tests of use-cases and view-models.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use brewmart_core::{
    AddressId, CartItemId, Email, FavoriteId, NotificationId, OrderId, OrderItemId, Price,
    ProductId, PromotionId, UserId,
};

use crate::backend::{AuthUser, BackendError, OtpKind, Session, SignUpOutcome, UserAttributes};
use crate::models::{
    Address, CartItem, Category, City, DeliveryDetails, Department, Favorite, NewAddress,
    NewOrder, NewOrderItem, Notification, Order, OrderItem, Product, Profile, ProfileUpdate,
    Promotion,
};
use crate::repositories::{
    AddressRepository, AuthRepository, CartRepository, CatalogRepository, FavoritesRepository,
    ImageSigner, NotificationRepository, OrderRepository, ProfileRepository, ShippingRepository,
};
use crate::shipping::ShippingError;

pub const PASSWORD: &str = "correct horse";
pub const OTP_CODE: &str = "123456";

pub fn user_id() -> UserId {
    UserId::new(Uuid::from_u128(0x7c9e_6679_7425_40de_944b_e07f_c1f9_0ae7))
}

pub fn product(id: i64, name: &str, price: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: String::new(),
        price: Price::uah(Decimal::from_str(price).unwrap_or_default()),
        image_path: Some(format!("products/{id}.jpg")),
        image_url: None,
        category_id: None,
        volume: Some("250 g".to_string()),
        is_available: true,
        created_at: None,
    }
}

pub fn promotion(
    id: i64,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
) -> Promotion {
    Promotion {
        id: PromotionId::new(id),
        title: format!("Promotion {id}"),
        description: String::new(),
        image_path: Some(format!("promotions/{id}.jpg")),
        image_url: None,
        discount_percent: Some(10),
        starts_at,
        ends_at,
    }
}

pub fn kyiv() -> City {
    City {
        reference: "city-kyiv".to_string(),
        name: "Київ".to_string(),
        area: Some("Київська".to_string()),
    }
}

pub fn lviv() -> City {
    City {
        reference: "city-lviv".to_string(),
        name: "Львів".to_string(),
        area: Some("Львівська".to_string()),
    }
}

fn department(city: &City, number: u32) -> Department {
    Department {
        reference: format!("{}-dep-{number}", city.reference),
        number: number.to_string(),
        description: format!("Відділення №{number}"),
        city_reference: city.reference.clone(),
    }
}

pub fn delivery() -> DeliveryDetails {
    DeliveryDetails::new(
        "Olena Kovalenko",
        "+380671234567",
        &lviv(),
        &department(&lviv(), 12),
    )
}

fn auth_user(email: &str) -> AuthUser {
    AuthUser {
        id: user_id(),
        email: Some(email.to_string()),
        phone: None,
        user_metadata: Value::Null,
    }
}

fn session(email: &str) -> Session {
    Session {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        expires_in: 3600,
        user: auth_user(email),
    }
}

#[derive(Default)]
struct State {
    products: Vec<Product>,
    categories: Vec<Category>,
    promotions: Vec<Promotion>,
    cart: Vec<CartItem>,
    favorites: Vec<Favorite>,
    orders: Vec<Order>,
    addresses: Vec<Address>,
    notifications: Vec<Notification>,
    profile: Option<Profile>,
    session: Option<Session>,
    next_id: i64,
    calls: HashMap<&'static str, usize>,
    failures: HashMap<&'static str, String>,
    signing_fails: bool,
    last_search: Option<String>,
    last_user_update: Option<UserAttributes>,
    shipping_queries: Vec<String>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn product(&self, id: ProductId) -> Result<Product, BackendError> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("product {id}")))
    }
}

/// Implements every repository trait over in-memory tables.
///
/// Rows are not partitioned by user; there is only ever one user.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A backend with a session and a profile row for [`user_id`].
    pub fn signed_in() -> Arc<Self> {
        let fake = Self::new();
        {
            let mut state = fake.lock();
            state.session = Some(session("olena@example.com"));
            state.profile = Some(Profile {
                id: Some(user_id()),
                first_name: "Olena".to_string(),
                last_name: "Kovalenko".to_string(),
                phone: None,
                email: None,
                avatar_path: Some("avatars/olena.jpg".to_string()),
                avatar_url: None,
            });
        }
        fake
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Count the call and fail it if a failure was scheduled for `op`.
    fn record(&self, op: &'static str) -> Result<MutexGuard<'_, State>, BackendError> {
        let mut state = self.lock();
        *state.calls.entry(op).or_default() += 1;
        if let Some(message) = state.failures.get(op) {
            return Err(BackendError::Api {
                status: 500,
                message: message.clone(),
            });
        }
        Ok(state)
    }

    pub fn add_product(&self, product: Product) {
        self.lock().products.push(product);
    }

    pub fn add_category(&self, category: Category) {
        self.lock().categories.push(category);
    }

    pub fn add_promotion(&self, promotion: Promotion) {
        self.lock().promotions.push(promotion);
    }

    pub fn add_notification(&self, title: &str) -> NotificationId {
        let mut state = self.lock();
        let id = NotificationId::new(state.next_id());
        state.notifications.push(Notification {
            id,
            title: title.to_string(),
            body: String::new(),
            is_read: false,
            created_at: Utc::now(),
        });
        id
    }

    /// Make every later call of `op` fail with a server error.
    pub fn fail(&self, op: &'static str, message: &str) {
        self.lock().failures.insert(op, message.to_string());
    }

    pub fn fail_signing(&self) {
        self.lock().signing_fails = true;
    }

    pub fn calls(&self, op: &str) -> usize {
        self.lock().calls.get(op).copied().unwrap_or_default()
    }

    pub fn last_search(&self) -> Option<String> {
        self.lock().last_search.clone()
    }

    pub fn last_user_update(&self) -> Option<UserAttributes> {
        self.lock().last_user_update.clone()
    }

    /// Every query sent to the carrier, city and department lookups alike.
    pub fn shipping_queries(&self) -> Vec<String> {
        self.lock().shipping_queries.clone()
    }

    pub fn notification_is_read(&self, id: NotificationId) -> bool {
        self.lock()
            .notifications
            .iter()
            .any(|n| n.id == id && n.is_read)
    }
}

#[async_trait]
impl ImageSigner for FakeBackend {
    async fn signed_url(&self, path: &str) -> Result<String, BackendError> {
        if self.lock().signing_fails {
            return Err(BackendError::Api {
                status: 400,
                message: "Object not found".to_string(),
            });
        }
        Ok(format!("https://cdn.test/signed/{path}"))
    }
}

#[async_trait]
impl CatalogRepository for FakeBackend {
    async fn categories(&self) -> Result<Vec<Category>, BackendError> {
        Ok(self.record("categories")?.categories.clone())
    }

    async fn products(
        &self,
        category: Option<brewmart_core::CategoryId>,
    ) -> Result<Vec<Product>, BackendError> {
        let state = self.record("products")?;
        Ok(state
            .products
            .iter()
            .filter(|p| category.is_none() || p.category_id == category)
            .cloned()
            .collect())
    }

    async fn product(&self, id: ProductId) -> Result<Product, BackendError> {
        self.record("product")?.product(id)
    }

    async fn search_products(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Product>, BackendError> {
        let mut state = self.record("search_products")?;
        state.last_search = Some(query.to_string());
        let needle = query.to_lowercase();
        Ok(state
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn promotions(&self) -> Result<Vec<Promotion>, BackendError> {
        Ok(self.record("promotions")?.promotions.clone())
    }
}

#[async_trait]
impl CartRepository for FakeBackend {
    async fn cart_items(&self, _user: UserId) -> Result<Vec<CartItem>, BackendError> {
        Ok(self.record("cart_items")?.cart.clone())
    }

    async fn add_item(
        &self,
        _user: UserId,
        product: ProductId,
        quantity: u32,
    ) -> Result<CartItem, BackendError> {
        let mut state = self.record("add_item")?;
        let item = CartItem {
            id: CartItemId::new(state.next_id()),
            product: state.product(product)?,
            quantity,
        };
        state.cart.push(item.clone());
        Ok(item)
    }

    async fn update_quantity(
        &self,
        item: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, BackendError> {
        let mut state = self.record("update_quantity")?;
        let line = state
            .cart
            .iter_mut()
            .find(|line| line.id == item)
            .ok_or_else(|| BackendError::NotFound(format!("cart item {item}")))?;
        line.quantity = quantity;
        Ok(line.clone())
    }

    async fn remove_item(&self, item: CartItemId) -> Result<(), BackendError> {
        self.record("remove_item")?.cart.retain(|line| line.id != item);
        Ok(())
    }

    async fn clear(&self, _user: UserId) -> Result<(), BackendError> {
        self.record("clear")?.cart.clear();
        Ok(())
    }
}

#[async_trait]
impl FavoritesRepository for FakeBackend {
    async fn favorites(&self, _user: UserId) -> Result<Vec<Favorite>, BackendError> {
        Ok(self.record("favorites")?.favorites.clone())
    }

    async fn add_favorite(
        &self,
        _user: UserId,
        product: ProductId,
    ) -> Result<Favorite, BackendError> {
        let mut state = self.record("add_favorite")?;
        let favorite = Favorite {
            id: FavoriteId::new(state.next_id()),
            product: state.product(product)?,
        };
        state.favorites.push(favorite.clone());
        Ok(favorite)
    }

    async fn remove_favorite(&self, _user: UserId, product: ProductId) -> Result<(), BackendError> {
        self.record("remove_favorite")?
            .favorites
            .retain(|f| f.product.id != product);
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for FakeBackend {
    async fn orders(&self, _user: UserId) -> Result<Vec<Order>, BackendError> {
        let state = self.record("orders")?;
        Ok(state.orders.iter().rev().cloned().collect())
    }

    async fn order(&self, id: OrderId) -> Result<Order, BackendError> {
        self.record("order")?
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("order {id}")))
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Order, BackendError> {
        let mut state = self.record("create_order")?;
        let created = Order {
            id: OrderId::new(state.next_id()),
            status: order.status,
            total: Price::uah(order.total),
            delivery: order.delivery.clone(),
            created_at: Utc::now(),
            items: Vec::new(),
        };
        state.orders.push(created.clone());
        Ok(created)
    }

    async fn add_order_items(&self, items: &[NewOrderItem]) -> Result<(), BackendError> {
        let mut state = self.record("add_order_items")?;
        for item in items {
            let line = OrderItem {
                id: OrderItemId::new(state.next_id()),
                product: state.product(item.product_id).ok(),
                quantity: item.quantity,
                unit_price: Price::uah(item.unit_price),
            };
            let order = state
                .orders
                .iter_mut()
                .find(|o| o.id == item.order_id)
                .ok_or_else(|| BackendError::NotFound(format!("order {}", item.order_id)))?;
            order.items.push(line);
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for FakeBackend {
    async fn profile(&self, user: UserId) -> Result<Profile, BackendError> {
        self.record("profile")?
            .profile
            .clone()
            .ok_or_else(|| BackendError::NotFound(format!("profile {user}")))
    }

    async fn update_profile(
        &self,
        user: UserId,
        update: &ProfileUpdate,
    ) -> Result<Profile, BackendError> {
        let mut state = self.record("update_profile")?;
        let profile = state
            .profile
            .as_mut()
            .ok_or_else(|| BackendError::NotFound(format!("profile {user}")))?;
        if let Some(first_name) = &update.first_name {
            profile.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &update.last_name {
            profile.last_name.clone_from(last_name);
        }
        if let Some(phone) = &update.phone {
            profile.phone = Some(phone.clone()).filter(|p| !p.is_empty());
        }
        if let Some(email) = &update.email {
            profile.email = Some(email.clone());
        }
        Ok(profile.clone())
    }
}

#[async_trait]
impl AddressRepository for FakeBackend {
    async fn addresses(&self, _user: UserId) -> Result<Vec<Address>, BackendError> {
        let state = self.record("addresses")?;
        let mut addresses = state.addresses.clone();
        addresses.sort_by_key(|a| (!a.is_default, std::cmp::Reverse(a.id)));
        Ok(addresses)
    }

    async fn add_address(&self, address: &NewAddress) -> Result<Address, BackendError> {
        let mut state = self.record("add_address")?;
        let saved = Address {
            id: AddressId::new(state.next_id()),
            delivery: address.delivery.clone(),
            is_default: address.is_default,
        };
        state.addresses.push(saved.clone());
        Ok(saved)
    }

    async fn delete_address(&self, id: AddressId) -> Result<(), BackendError> {
        self.record("delete_address")?.addresses.retain(|a| a.id != id);
        Ok(())
    }
}

#[async_trait]
impl NotificationRepository for FakeBackend {
    async fn notifications(&self, _user: UserId) -> Result<Vec<Notification>, BackendError> {
        let state = self.record("notifications")?;
        Ok(state.notifications.iter().rev().cloned().collect())
    }

    async fn mark_read(&self, id: NotificationId) -> Result<(), BackendError> {
        let mut state = self.record("mark_read")?;
        if let Some(n) = state.notifications.iter_mut().find(|n| n.id == id) {
            n.is_read = true;
        }
        Ok(())
    }
}

#[async_trait]
impl AuthRepository for FakeBackend {
    async fn sign_in(&self, email: &Email, password: &str) -> Result<Session, BackendError> {
        let mut state = self.record("sign_in")?;
        if password != PASSWORD {
            return Err(BackendError::Unauthorized(
                "Invalid login credentials".to_string(),
            ));
        }
        let session = session(email.as_str());
        state.session = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &Email,
        _password: &str,
        _metadata: Value,
    ) -> Result<SignUpOutcome, BackendError> {
        drop(self.record("sign_up")?);
        Ok(SignUpOutcome::ConfirmationRequired(auth_user(email.as_str())))
    }

    async fn verify_otp(
        &self,
        email: &Email,
        code: &str,
        _kind: OtpKind,
    ) -> Result<Session, BackendError> {
        let mut state = self.record("verify_otp")?;
        if code != OTP_CODE {
            return Err(BackendError::Unauthorized(
                "Token has expired or is invalid".to_string(),
            ));
        }
        let session = session(email.as_str());
        state.session = Some(session.clone());
        Ok(session)
    }

    async fn resend_otp(&self, _email: &Email) -> Result<(), BackendError> {
        drop(self.record("resend_otp")?);
        Ok(())
    }

    async fn update_user(&self, attributes: &UserAttributes) -> Result<AuthUser, BackendError> {
        let mut state = self.record("update_user")?;
        state.last_user_update = Some(attributes.clone());
        let session = state
            .session
            .as_mut()
            .ok_or_else(|| BackendError::Unauthorized("not signed in".to_string()))?;
        if let Some(email) = &attributes.email {
            session.user.email = Some(email.clone());
        }
        if let Some(phone) = &attributes.phone {
            session.user.phone = Some(phone.clone());
        }
        Ok(session.user.clone())
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let mut state = self.lock();
        *state.calls.entry("sign_out").or_default() += 1;
        state.session = None;
        Ok(())
    }

    async fn current_user(&self) -> Option<AuthUser> {
        self.lock().session.as_ref().map(|s| s.user.clone())
    }
}

#[async_trait]
impl ShippingRepository for FakeBackend {
    async fn cities(&self, query: &str) -> Result<Vec<City>, ShippingError> {
        let mut state = self.lock();
        *state.calls.entry("cities").or_default() += 1;
        state.shipping_queries.push(query.to_string());
        if let Some(message) = state.failures.get("cities") {
            return Err(ShippingError::Carrier(message.clone()));
        }
        let needle = query.to_lowercase();
        Ok([kyiv(), lviv()]
            .into_iter()
            .filter(|c| c.name.to_lowercase().starts_with(&needle))
            .collect())
    }

    async fn departments(
        &self,
        city_reference: &str,
        query: &str,
    ) -> Result<Vec<Department>, ShippingError> {
        let mut state = self.lock();
        *state.calls.entry("departments").or_default() += 1;
        state.shipping_queries.push(query.to_string());
        if let Some(message) = state.failures.get("departments") {
            return Err(ShippingError::Carrier(message.clone()));
        }
        let city = [kyiv(), lviv()]
            .into_iter()
            .find(|c| c.reference == city_reference);
        Ok(city
            .map(|city| {
                [1, 12]
                    .into_iter()
                    .map(|n| department(&city, n))
                    .filter(|d| d.description.contains(query))
                    .collect()
            })
            .unwrap_or_default())
    }
}
