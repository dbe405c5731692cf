//! Favorites screen.

use brewmart_core::ProductId;

use super::{Screen, ScreenError, ViewModel};
use crate::models::Product;
use crate::usecases::FavoritesUseCases;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoritesState {
    pub products: Vec<Product>,
    pub is_loading: bool,
    pub error: Option<ScreenError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoritesIntent {
    Load,
    Remove(ProductId),
    Open(ProductId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoritesEvent {
    NavigateToProduct(ProductId),
}

pub fn reduce(state: &mut FavoritesState, intent: &FavoritesIntent) {
    match intent {
        FavoritesIntent::Load => {
            state.is_loading = true;
            state.error = None;
        }
        FavoritesIntent::Remove(id) => state.products.retain(|p| p.id != *id),
        FavoritesIntent::Open(_) => {}
    }
}

pub struct FavoritesViewModel {
    screen: Screen<FavoritesState, FavoritesEvent>,
    favorites: FavoritesUseCases,
}

impl FavoritesViewModel {
    #[must_use]
    pub fn new(favorites: FavoritesUseCases) -> Self {
        Self {
            screen: Screen::new(FavoritesState::default()),
            favorites,
        }
    }

    fn load(&mut self) {
        let store = self.screen.store().clone();
        let favorites = self.favorites.clone();
        self.screen.launch(async move {
            let result = favorites.get_favorites().await;
            store.update(|s| {
                match result {
                    Ok(products) => s.products = products,
                    Err(err) => s.error = Some(ScreenError::from(&err)),
                }
                s.is_loading = false;
            });
        });
    }
}

impl ViewModel for FavoritesViewModel {
    type State = FavoritesState;
    type Intent = FavoritesIntent;
    type Event = FavoritesEvent;

    const NAME: &'static str = "favorites";

    fn screen(&self) -> &Screen<FavoritesState, FavoritesEvent> {
        &self.screen
    }

    fn screen_mut(&mut self) -> &mut Screen<FavoritesState, FavoritesEvent> {
        &mut self.screen
    }

    fn handle(&mut self, intent: FavoritesIntent) {
        self.screen.store().update(|s| reduce(s, &intent));
        match intent {
            FavoritesIntent::Load => self.load(),
            FavoritesIntent::Remove(id) => {
                let favorites = self.favorites.clone();
                self.screen.launch(async move {
                    // Failure is logged by the use-case; the next load restores the row
                    let _ = favorites.toggle_favorite(id, true).await;
                });
            }
            FavoritesIntent::Open(id) => {
                self.screen
                    .store()
                    .emit(FavoritesEvent::NavigateToProduct(id));
            }
        }
    }
}
