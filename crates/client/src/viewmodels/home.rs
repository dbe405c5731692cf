//! Home screen: categories, promotions and the product grid.

use brewmart_core::{CategoryId, ProductId};

use super::{Screen, ScreenError, Store, ViewModel, record_error};
use crate::error::Outcome;
use crate::models::{Category, Product, Promotion};
use crate::usecases::CatalogUseCases;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeState {
    pub is_loading: bool,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub promotions: Vec<Promotion>,
    /// `None` shows every product.
    pub selected_category: Option<CategoryId>,
    pub error: Option<ScreenError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeIntent {
    Load,
    /// Choosing the selected category again clears the filter.
    SelectCategory(CategoryId),
    OpenProduct(ProductId),
    Retry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeEvent {
    NavigateToProduct(ProductId),
}

/// Synchronous part of an intent.
pub fn reduce(state: &mut HomeState, intent: &HomeIntent) {
    match intent {
        HomeIntent::Load | HomeIntent::Retry => {
            state.is_loading = true;
            state.error = None;
        }
        HomeIntent::SelectCategory(category) => {
            state.selected_category = if state.selected_category == Some(*category) {
                None
            } else {
                Some(*category)
            };
            state.is_loading = true;
            state.error = None;
        }
        HomeIntent::OpenProduct(_) => {}
    }
}

/// Merge the three start-up fetches; any failure shows the error screen.
fn apply_loaded(
    state: &mut HomeState,
    categories: Outcome<Vec<Category>>,
    products: Outcome<Vec<Product>>,
    promotions: Outcome<Vec<Promotion>>,
) {
    match categories {
        Ok(categories) => state.categories = categories,
        Err(err) => record_error(&mut state.error, &err),
    }
    match products {
        Ok(products) => state.products = products,
        Err(err) => record_error(&mut state.error, &err),
    }
    match promotions {
        Ok(promotions) => state.promotions = promotions,
        Err(err) => record_error(&mut state.error, &err),
    }
    state.is_loading = false;
}

pub struct HomeViewModel {
    screen: Screen<HomeState, HomeEvent>,
    catalog: CatalogUseCases,
}

impl HomeViewModel {
    #[must_use]
    pub fn new(catalog: CatalogUseCases) -> Self {
        Self {
            screen: Screen::new(HomeState::default()),
            catalog,
        }
    }

    fn load(&mut self) {
        let store = self.screen.store().clone();
        let catalog = self.catalog.clone();
        let category = store.read(|s| s.selected_category);
        self.screen.launch(async move {
            let (categories, products, promotions) = tokio::join!(
                catalog.get_categories(),
                catalog.get_products(category),
                catalog.get_promotions(),
            );
            store.update(|s| apply_loaded(s, categories, products, promotions));
        });
    }

    fn load_products(&mut self) {
        let store: Store<HomeState, HomeEvent> = self.screen.store().clone();
        let catalog = self.catalog.clone();
        let category = store.read(|s| s.selected_category);
        self.screen.launch(async move {
            let result = catalog.get_products(category).await;
            store.update(|s| {
                // A newer selection has its own request in flight
                if s.selected_category != category {
                    return;
                }
                match result {
                    Ok(products) => s.products = products,
                    Err(err) => record_error(&mut s.error, &err),
                }
                s.is_loading = false;
            });
        });
    }
}

impl ViewModel for HomeViewModel {
    type State = HomeState;
    type Intent = HomeIntent;
    type Event = HomeEvent;

    const NAME: &'static str = "home";

    fn screen(&self) -> &Screen<HomeState, HomeEvent> {
        &self.screen
    }

    fn screen_mut(&mut self) -> &mut Screen<HomeState, HomeEvent> {
        &mut self.screen
    }

    fn handle(&mut self, intent: HomeIntent) {
        self.screen.store().update(|s| reduce(s, &intent));
        match intent {
            HomeIntent::Load | HomeIntent::Retry => self.load(),
            HomeIntent::SelectCategory(_) => self.load_products(),
            HomeIntent::OpenProduct(id) => {
                self.screen.store().emit(HomeEvent::NavigateToProduct(id));
            }
        }
    }
}
