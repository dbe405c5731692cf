//! Order history screen.

use brewmart_core::OrderId;

use super::{Screen, ScreenError, ViewModel};
use crate::models::Order;
use crate::usecases::OrderUseCases;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrdersState {
    pub orders: Vec<Order>,
    pub is_loading: bool,
    pub error: Option<ScreenError>,
}

impl OrdersState {
    /// Orders that are not yet delivered or cancelled.
    pub fn active(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.status.is_active())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrdersIntent {
    Load,
    Open(OrderId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrdersEvent {
    NavigateToOrder(OrderId),
}

pub fn reduce(state: &mut OrdersState, intent: &OrdersIntent) {
    if let OrdersIntent::Load = intent {
        state.is_loading = true;
        state.error = None;
    }
}

pub struct OrdersViewModel {
    screen: Screen<OrdersState, OrdersEvent>,
    orders: OrderUseCases,
}

impl OrdersViewModel {
    #[must_use]
    pub fn new(orders: OrderUseCases) -> Self {
        Self {
            screen: Screen::new(OrdersState::default()),
            orders,
        }
    }
}

impl ViewModel for OrdersViewModel {
    type State = OrdersState;
    type Intent = OrdersIntent;
    type Event = OrdersEvent;

    const NAME: &'static str = "orders";

    fn screen(&self) -> &Screen<OrdersState, OrdersEvent> {
        &self.screen
    }

    fn screen_mut(&mut self) -> &mut Screen<OrdersState, OrdersEvent> {
        &mut self.screen
    }

    fn handle(&mut self, intent: OrdersIntent) {
        self.screen.store().update(|s| reduce(s, &intent));
        match intent {
            OrdersIntent::Load => {
                let store = self.screen.store().clone();
                let orders = self.orders.clone();
                self.screen.launch(async move {
                    let result = orders.get_orders().await;
                    store.update(|s| {
                        match result {
                            Ok(orders) => s.orders = orders,
                            Err(err) => s.error = Some(ScreenError::from(&err)),
                        }
                        s.is_loading = false;
                    });
                });
            }
            OrdersIntent::Open(id) => self.screen.store().emit(OrdersEvent::NavigateToOrder(id)),
        }
    }
}
