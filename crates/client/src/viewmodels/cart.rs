//! Cart screen.
//!
//! Quantity changes are applied to the local state first and then sent. A
//! failed request reloads the cart so the screen shows what the server has.

use brewmart_core::{CartItemId, Price};

use super::{Screen, ScreenError, Store, ViewModel};
use crate::error::Outcome;
use crate::models::{CartItem, cart_item_count, cart_subtotal};
use crate::usecases::CartUseCases;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    pub items: Vec<CartItem>,
    pub is_loading: bool,
    pub error: Option<ScreenError>,
    pub message: Option<String>,
}

impl CartState {
    #[must_use]
    pub fn subtotal(&self) -> Price {
        cart_subtotal(&self.items)
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        cart_item_count(&self.items)
    }

    fn quantity_of(&self, id: CartItemId) -> Option<u32> {
        self.items.iter().find(|i| i.id == id).map(|i| i.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartIntent {
    Load,
    Increase(CartItemId),
    /// Decreasing a single unit removes the line.
    Decrease(CartItemId),
    Remove(CartItemId),
    Checkout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    NavigateToCheckout,
}

pub fn reduce(state: &mut CartState, intent: &CartIntent) {
    state.message = None;
    match intent {
        CartIntent::Load => {
            state.is_loading = true;
            state.error = None;
        }
        CartIntent::Increase(id) => {
            if let Some(item) = state.items.iter_mut().find(|i| i.id == *id) {
                item.quantity = item.quantity.saturating_add(1);
            }
        }
        CartIntent::Decrease(id) => {
            if let Some(item) = state.items.iter_mut().find(|i| i.id == *id) {
                item.quantity = item.quantity.saturating_sub(1);
            }
            state.items.retain(|i| i.quantity > 0);
        }
        CartIntent::Remove(id) => state.items.retain(|i| i.id != *id),
        CartIntent::Checkout => {}
    }
}

fn apply_cart(state: &mut CartState, result: Outcome<Vec<CartItem>>) {
    match result {
        Ok(items) => {
            state.items = items;
            state.error = None;
        }
        Err(err) => state.error = Some(ScreenError::from(&err)),
    }
    state.is_loading = false;
}

pub struct CartViewModel {
    screen: Screen<CartState, CartEvent>,
    cart: CartUseCases,
}

impl CartViewModel {
    #[must_use]
    pub fn new(cart: CartUseCases) -> Self {
        Self {
            screen: Screen::new(CartState::default()),
            cart,
        }
    }

    fn load(&mut self) {
        let store = self.screen.store().clone();
        let cart = self.cart.clone();
        self.screen.launch(async move {
            let result = cart.get_cart().await;
            store.update(|s| apply_cart(s, result));
        });
    }

    /// Send the quantity the local state now holds for `id`.
    fn sync_line(&mut self, id: CartItemId) {
        let store = self.screen.store().clone();
        let quantity = store.read(|s| s.quantity_of(id)).unwrap_or(0);
        let cart = self.cart.clone();
        self.screen.launch(async move {
            match cart.change_quantity(id, quantity).await {
                Ok(Some(line)) => store.update(|s| {
                    if let Some(item) = s.items.iter_mut().find(|i| i.id == line.id) {
                        *item = line;
                    }
                }),
                Ok(None) => {}
                Err(err) => reload_after_failure(&store, &cart, err.message).await,
            }
        });
    }

    fn remove(&mut self, id: CartItemId) {
        let store = self.screen.store().clone();
        let cart = self.cart.clone();
        self.screen.launch(async move {
            if let Err(err) = cart.remove_from_cart(id).await {
                reload_after_failure(&store, &cart, err.message).await;
            }
        });
    }
}

async fn reload_after_failure(
    store: &Store<CartState, CartEvent>,
    cart: &CartUseCases,
    message: String,
) {
    let result = cart.get_cart().await;
    store.update(|s| {
        apply_cart(s, result);
        s.message = Some(message);
    });
}

impl ViewModel for CartViewModel {
    type State = CartState;
    type Intent = CartIntent;
    type Event = CartEvent;

    const NAME: &'static str = "cart";

    fn screen(&self) -> &Screen<CartState, CartEvent> {
        &self.screen
    }

    fn screen_mut(&mut self) -> &mut Screen<CartState, CartEvent> {
        &mut self.screen
    }

    fn handle(&mut self, intent: CartIntent) {
        let known = match &intent {
            CartIntent::Increase(id) | CartIntent::Decrease(id) | CartIntent::Remove(id) => {
                self.screen.store().read(|s| s.quantity_of(*id).is_some())
            }
            _ => true,
        };
        if !known {
            return;
        }
        self.screen.store().update(|s| reduce(s, &intent));
        match intent {
            CartIntent::Load => self.load(),
            CartIntent::Increase(id) | CartIntent::Decrease(id) => self.sync_line(id),
            CartIntent::Remove(id) => self.remove(id),
            CartIntent::Checkout => {
                if self.screen.store().read(|s| !s.items.is_empty()) {
                    self.screen.store().emit(CartEvent::NavigateToCheckout);
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::*;
    use crate::testing::{FakeBackend, product};
    use brewmart_core::ProductId;

    async fn loaded(fake: &Arc<FakeBackend>) -> CartViewModel {
        let cart = CartUseCases::new(fake.clone(), fake.clone(), fake.clone());
        cart.add_to_cart(ProductId::new(1), 2).await.unwrap();
        cart.add_to_cart(ProductId::new(2), 1).await.unwrap();
        let mut vm = CartViewModel::new(cart);
        vm.on_intent(CartIntent::Load);
        vm.idle().await;
        vm
    }

    fn fake_with_products() -> Arc<FakeBackend> {
        let fake = FakeBackend::signed_in();
        fake.add_product(product(1, "Guatemala Antigua", "380"));
        fake.add_product(product(2, "Milk oolong", "260"));
        fake
    }

    #[tokio::test]
    async fn test_load_and_totals() {
        let fake = fake_with_products();
        let vm = loaded(&fake).await;
        let state = vm.state();
        assert_eq!(state.items.len(), 2);
        assert_eq!(state.item_count(), 3);
        assert_eq!(state.subtotal().amount, Decimal::new(1020, 0));
    }

    #[tokio::test]
    async fn test_increase_and_decrease_sync_with_server() {
        let fake = fake_with_products();
        let mut vm = loaded(&fake).await;
        let first = vm.state().items[0].id;
        let second = vm.state().items[1].id;

        vm.on_intent(CartIntent::Increase(first));
        assert_eq!(vm.state().items[0].quantity, 3);
        vm.on_intent(CartIntent::Decrease(second));
        assert_eq!(vm.state().items.len(), 1);
        vm.idle().await;

        vm.on_intent(CartIntent::Load);
        vm.idle().await;
        let state = vm.state();
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].quantity, 3);
        assert_eq!(fake.calls("remove_item"), 1);
    }

    #[tokio::test]
    async fn test_failed_update_reloads_from_server() {
        let fake = fake_with_products();
        let mut vm = loaded(&fake).await;
        fake.fail("update_quantity", "conflict");
        let first = vm.state().items[0].id;

        vm.on_intent(CartIntent::Increase(first));
        vm.idle().await;

        let state = vm.state();
        assert_eq!(state.items[0].quantity, 2);
        assert!(state.message.unwrap().contains("conflict"));
    }

    #[tokio::test]
    async fn test_unknown_line_is_ignored() {
        let fake = fake_with_products();
        let mut vm = loaded(&fake).await;
        vm.on_intent(CartIntent::Remove(CartItemId::new(999)));
        vm.idle().await;
        assert_eq!(fake.calls("remove_item"), 0);
    }

    #[tokio::test]
    async fn test_checkout_ignored_when_empty() {
        let fake = FakeBackend::signed_in();
        let mut vm = CartViewModel::new(CartUseCases::new(fake.clone(), fake.clone(), fake.clone()));
        let mut events = vm.take_events().unwrap();
        vm.on_intent(CartIntent::Load);
        vm.idle().await;

        vm.on_intent(CartIntent::Checkout);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_checkout_navigates_with_items() {
        let fake = fake_with_products();
        let mut vm = loaded(&fake).await;
        let mut events = vm.take_events().unwrap();
        vm.on_intent(CartIntent::Checkout);
        assert_eq!(events.try_recv().unwrap(), CartEvent::NavigateToCheckout);
    }
}
