//! Product detail screen.

use brewmart_core::ProductId;

use super::{Screen, ScreenError, Store, ViewModel};
use crate::error::{ErrorKind, UseCaseError};
use crate::models::Product;
use crate::usecases::{CartUseCases, CatalogUseCases, FavoritesUseCases};

/// Upper bound of the quantity stepper.
pub const MAX_QUANTITY: u32 = 99;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductState {
    pub product: Option<Product>,
    pub quantity: u32,
    pub is_favorite: bool,
    pub is_loading: bool,
    pub is_adding: bool,
    pub error: Option<ScreenError>,
    /// Inline message for a failed action.
    pub message: Option<String>,
}

impl Default for ProductState {
    fn default() -> Self {
        Self {
            product: None,
            quantity: 1,
            is_favorite: false,
            is_loading: false,
            is_adding: false,
            error: None,
            message: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductIntent {
    Load(ProductId),
    Increment,
    /// Never goes below one.
    Decrement,
    ToggleFavorite,
    AddToCart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductEvent {
    AddedToCart { product: ProductId, quantity: u32 },
    /// The action needs a signed-in user.
    SignInRequired,
}

pub fn reduce(state: &mut ProductState, intent: &ProductIntent) {
    match intent {
        ProductIntent::Load(_) => {
            state.is_loading = true;
            state.error = None;
            state.quantity = 1;
        }
        ProductIntent::Increment => state.quantity = (state.quantity + 1).min(MAX_QUANTITY),
        ProductIntent::Decrement => state.quantity = state.quantity.saturating_sub(1).max(1),
        ProductIntent::AddToCart => {
            if state.product.is_some() {
                state.is_adding = true;
                state.message = None;
            }
        }
        ProductIntent::ToggleFavorite => state.message = None,
    }
}

/// Route an action failure: sign-in prompt or inline message.
fn action_failed(store: &Store<ProductState, ProductEvent>, err: &UseCaseError) {
    if err.kind == ErrorKind::Unauthorized {
        store.emit(ProductEvent::SignInRequired);
    } else {
        let message = err.message.clone();
        store.update(|s| s.message = Some(message));
    }
}

pub struct ProductViewModel {
    screen: Screen<ProductState, ProductEvent>,
    catalog: CatalogUseCases,
    cart: CartUseCases,
    favorites: FavoritesUseCases,
}

impl ProductViewModel {
    #[must_use]
    pub fn new(catalog: CatalogUseCases, cart: CartUseCases, favorites: FavoritesUseCases) -> Self {
        Self {
            screen: Screen::new(ProductState::default()),
            catalog,
            cart,
            favorites,
        }
    }

    fn load(&mut self, id: ProductId) {
        let store = self.screen.store().clone();
        let catalog = self.catalog.clone();
        let favorites = self.favorites.clone();
        self.screen.launch(async move {
            let (product, is_favorite) =
                tokio::join!(catalog.get_product(id), favorites.is_favorite(id));
            store.update(|s| {
                match product {
                    Ok(product) => s.product = Some(product),
                    Err(err) => s.error = Some(ScreenError::from(&err)),
                }
                // The heart is decoration; a failed lookup leaves it empty
                s.is_favorite = is_favorite.unwrap_or(false);
                s.is_loading = false;
            });
        });
    }

    fn toggle_favorite(&mut self) {
        let store = self.screen.store().clone();
        let Some((id, current)) =
            store.read(|s| s.product.as_ref().map(|p| (p.id, s.is_favorite)))
        else {
            return;
        };
        let favorites = self.favorites.clone();
        self.screen.launch(async move {
            match favorites.toggle_favorite(id, current).await {
                Ok(is_favorite) => store.update(|s| s.is_favorite = is_favorite),
                Err(err) => action_failed(&store, &err),
            }
        });
    }

    fn add_to_cart(&mut self) {
        let store = self.screen.store().clone();
        let Some((id, quantity)) = store.read(|s| s.product.as_ref().map(|p| (p.id, s.quantity)))
        else {
            return;
        };
        let cart = self.cart.clone();
        self.screen.launch(async move {
            let result = cart.add_to_cart(id, quantity).await;
            store.update(|s| s.is_adding = false);
            match result {
                Ok(_) => {
                    store.update(|s| s.quantity = 1);
                    store.emit(ProductEvent::AddedToCart {
                        product: id,
                        quantity,
                    });
                }
                Err(err) => action_failed(&store, &err),
            }
        });
    }
}

impl ViewModel for ProductViewModel {
    type State = ProductState;
    type Intent = ProductIntent;
    type Event = ProductEvent;

    const NAME: &'static str = "product";

    fn screen(&self) -> &Screen<ProductState, ProductEvent> {
        &self.screen
    }

    fn screen_mut(&mut self) -> &mut Screen<ProductState, ProductEvent> {
        &mut self.screen
    }

    fn handle(&mut self, intent: ProductIntent) {
        let adding = self.screen.store().read(|s| s.is_adding);
        if adding && matches!(intent, ProductIntent::AddToCart) {
            return;
        }
        self.screen.store().update(|s| reduce(s, &intent));
        match intent {
            ProductIntent::Load(id) => self.load(id),
            ProductIntent::ToggleFavorite => self.toggle_favorite(),
            ProductIntent::AddToCart => self.add_to_cart(),
            ProductIntent::Increment | ProductIntent::Decrement => {}
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{FakeBackend, product};

    fn view_model(fake: &Arc<FakeBackend>) -> ProductViewModel {
        ProductViewModel::new(
            CatalogUseCases::new(fake.clone(), fake.clone(), 20),
            CartUseCases::new(fake.clone(), fake.clone(), fake.clone()),
            FavoritesUseCases::new(fake.clone(), fake.clone(), fake.clone()),
        )
    }

    #[test]
    fn test_quantity_stepper_bounds() {
        let mut state = ProductState::default();
        reduce(&mut state, &ProductIntent::Decrement);
        assert_eq!(state.quantity, 1);
        reduce(&mut state, &ProductIntent::Increment);
        reduce(&mut state, &ProductIntent::Increment);
        assert_eq!(state.quantity, 3);
        reduce(&mut state, &ProductIntent::Decrement);
        assert_eq!(state.quantity, 2);

        state.quantity = MAX_QUANTITY;
        reduce(&mut state, &ProductIntent::Increment);
        assert_eq!(state.quantity, MAX_QUANTITY);
    }

    #[test]
    fn test_add_to_cart_without_product_is_ignored() {
        let mut state = ProductState::default();
        reduce(&mut state, &ProductIntent::AddToCart);
        assert!(!state.is_adding);
    }

    #[tokio::test]
    async fn test_load_and_add_to_cart() {
        let fake = FakeBackend::signed_in();
        fake.add_product(product(3, "Kenya AA", "395"));
        let mut vm = view_model(&fake);
        let mut events = vm.take_events().unwrap();

        vm.on_intent(ProductIntent::Load(ProductId::new(3)));
        vm.idle().await;
        assert_eq!(vm.state().product.unwrap().name, "Kenya AA");

        vm.on_intent(ProductIntent::Increment);
        vm.on_intent(ProductIntent::AddToCart);
        assert!(vm.state().is_adding);
        vm.idle().await;

        assert_eq!(
            events.try_recv().unwrap(),
            ProductEvent::AddedToCart {
                product: ProductId::new(3),
                quantity: 2
            }
        );
        let state = vm.state();
        assert!(!state.is_adding);
        assert_eq!(state.quantity, 1);
    }

    #[tokio::test]
    async fn test_double_add_to_cart_adds_once() {
        let fake = FakeBackend::signed_in();
        fake.add_product(product(3, "Kenya AA", "395"));
        let mut vm = view_model(&fake);
        let mut events = vm.take_events().unwrap();

        vm.on_intent(ProductIntent::Load(ProductId::new(3)));
        vm.idle().await;

        vm.on_intent(ProductIntent::AddToCart);
        vm.on_intent(ProductIntent::AddToCart);
        vm.idle().await;

        assert!(matches!(events.try_recv().unwrap(), ProductEvent::AddedToCart { .. }));
        assert!(events.try_recv().is_err());
        assert_eq!(fake.calls("add_item"), 1);

        let cart = CartUseCases::new(fake.clone(), fake.clone(), fake.clone());
        let lines = cart.get_cart().await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_favorite_when_signed_out_asks_to_sign_in() {
        let fake = FakeBackend::new();
        fake.add_product(product(3, "Kenya AA", "395"));
        let mut vm = view_model(&fake);
        let mut events = vm.take_events().unwrap();

        vm.on_intent(ProductIntent::Load(ProductId::new(3)));
        vm.idle().await;
        vm.on_intent(ProductIntent::ToggleFavorite);
        vm.idle().await;

        assert_eq!(events.try_recv().unwrap(), ProductEvent::SignInRequired);
        assert!(!vm.state().is_favorite);
    }

    #[tokio::test]
    async fn test_toggle_favorite_flips_flag() {
        let fake = FakeBackend::signed_in();
        fake.add_product(product(3, "Kenya AA", "395"));
        let mut vm = view_model(&fake);

        vm.on_intent(ProductIntent::Load(ProductId::new(3)));
        vm.idle().await;
        vm.on_intent(ProductIntent::ToggleFavorite);
        vm.idle().await;
        assert!(vm.state().is_favorite);

        vm.on_intent(ProductIntent::ToggleFavorite);
        vm.idle().await;
        assert!(!vm.state().is_favorite);
    }

    #[tokio::test]
    async fn test_unknown_product_shows_error() {
        let fake = FakeBackend::new();
        let mut vm = view_model(&fake);
        vm.on_intent(ProductIntent::Load(ProductId::new(404)));
        vm.idle().await;
        let state = vm.state();
        assert_eq!(state.error, Some(ScreenError::Generic));
        assert!(!state.is_loading);
    }
}
