//! Domain entities decoded from backend rows.
//!
//! Each `*Row` type mirrors the JSON the REST layer returns (including
//! embedded joins) and converts into the entity the rest of the client uses.
//! Image columns hold storage paths; use-cases fill the matching
//! `image_url` with a signed URL.

mod account;
mod cart;
mod catalog;
mod order;
mod shipping;

pub use account::{
    Address, AddressRow, DeliveryDetails, NewAddress, Notification, NotificationRow, Profile,
    ProfileRow, ProfileUpdate,
};
pub use cart::{CartItem, CartItemRow, Favorite, FavoriteRow, cart_item_count, cart_subtotal};
pub use catalog::{Category, CategoryRow, Product, ProductRow, Promotion, PromotionRow};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem, OrderItemRow, OrderRow};
pub use shipping::{City, Department};
