//! Product search with search-as-you-type.

use std::time::Duration;

use brewmart_core::ProductId;

use super::debounce::debounce_field;
use super::{Screen, ScreenError, Store, ViewModel};
use crate::models::Product;
use crate::usecases::CatalogUseCases;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<Product>,
    pub is_searching: bool,
    pub error: Option<ScreenError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchIntent {
    QueryChanged(String),
    Clear,
    OpenProduct(ProductId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    NavigateToProduct(ProductId),
}

pub fn reduce(state: &mut SearchState, intent: &SearchIntent) {
    match intent {
        SearchIntent::QueryChanged(query) => {
            state.query.clone_from(query);
            if query.trim().is_empty() {
                state.results.clear();
                state.error = None;
            }
        }
        SearchIntent::Clear => *state = SearchState::default(),
        SearchIntent::OpenProduct(_) => {}
    }
}

async fn run_search(
    store: Store<SearchState, SearchEvent>,
    catalog: CatalogUseCases,
    query: String,
) {
    store.update(|s| s.is_searching = true);
    let result = catalog.search_products(&query).await;
    store.update(|s| {
        s.is_searching = false;
        if s.query.trim() != query {
            return;
        }
        match result {
            Ok(products) => {
                s.results = products;
                s.error = None;
            }
            Err(err) => s.error = Some(ScreenError::from(&err)),
        }
    });
}

pub struct SearchViewModel {
    screen: Screen<SearchState, SearchEvent>,
}

impl SearchViewModel {
    /// `debounce` is the quiet period before a typed query is sent.
    #[must_use]
    pub fn new(catalog: CatalogUseCases, debounce: Duration) -> Self {
        let mut screen = Screen::new(SearchState::default());
        let store = screen.store().clone();
        screen.watch(debounce_field(
            store.subscribe(),
            debounce,
            |s: &SearchState| s.query.clone(),
            move |query| run_search(store.clone(), catalog.clone(), query),
        ));
        Self { screen }
    }
}

impl ViewModel for SearchViewModel {
    type State = SearchState;
    type Intent = SearchIntent;
    type Event = SearchEvent;

    const NAME: &'static str = "search";

    fn screen(&self) -> &Screen<SearchState, SearchEvent> {
        &self.screen
    }

    fn screen_mut(&mut self) -> &mut Screen<SearchState, SearchEvent> {
        &mut self.screen
    }

    fn handle(&mut self, intent: SearchIntent) {
        self.screen.store().update(|s| reduce(s, &intent));
        if let SearchIntent::OpenProduct(id) = intent {
            self.screen.store().emit(SearchEvent::NavigateToProduct(id));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{FakeBackend, product};

    const DEBOUNCE: Duration = Duration::from_millis(300);

    fn view_model(fake: &Arc<FakeBackend>) -> SearchViewModel {
        SearchViewModel::new(CatalogUseCases::new(fake.clone(), fake.clone(), 10), DEBOUNCE)
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_sends_one_search() {
        let fake = FakeBackend::new();
        fake.add_product(product(1, "Sumatra Mandheling", "350"));
        fake.add_product(product(2, "Assam", "150"));
        let mut vm = view_model(&fake);

        for partial in ["s", "su", "sum"] {
            vm.on_intent(SearchIntent::QueryChanged(partial.to_string()));
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        tokio::time::sleep(DEBOUNCE * 2).await;

        assert_eq!(fake.calls("search_products"), 1);
        let state = vm.state();
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].name, "Sumatra Mandheling");
        assert!(!state.is_searching);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_query_clears_results_without_request() {
        let fake = FakeBackend::new();
        fake.add_product(product(1, "Assam", "150"));
        let mut vm = view_model(&fake);

        vm.on_intent(SearchIntent::QueryChanged("assam".to_string()));
        tokio::time::sleep(DEBOUNCE * 2).await;
        assert_eq!(vm.state().results.len(), 1);

        vm.on_intent(SearchIntent::QueryChanged(String::new()));
        assert!(vm.state().results.is_empty());
        tokio::time::sleep(DEBOUNCE * 2).await;
        assert_eq!(fake.calls("search_products"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_search_shows_error() {
        let fake = FakeBackend::new();
        fake.fail("search_products", "statement timeout");
        let mut vm = view_model(&fake);
        vm.on_intent(SearchIntent::QueryChanged("kenya".to_string()));
        tokio::time::sleep(DEBOUNCE * 2).await;
        assert_eq!(vm.state().error, Some(ScreenError::Generic));
    }

    #[tokio::test]
    async fn test_open_product() {
        let fake = FakeBackend::new();
        let mut vm = view_model(&fake);
        let mut events = vm.take_events().unwrap();
        vm.on_intent(SearchIntent::OpenProduct(ProductId::new(4)));
        assert_eq!(
            events.try_recv().unwrap(),
            SearchEvent::NavigateToProduct(ProductId::new(4))
        );
    }
}
