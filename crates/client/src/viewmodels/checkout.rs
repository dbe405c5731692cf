//! Checkout wizard: address, delivery, confirmation.
//!
//! The city and department fields search the shipping carrier as the user
//! types. Both lookups are debounced watchers over the screen state (see
//! [`debounce_field`]); selecting a city resets the department step and
//! immediately lists every department of that city.

use std::time::Duration;

use brewmart_core::{AddressId, OrderId, Price};

use super::debounce::debounce_field;
use super::{Screen, ScreenError, Store, ViewModel, record_error};
use crate::models::{Address, CartItem, City, DeliveryDetails, Department, cart_subtotal};
use crate::usecases::{CartUseCases, OrderUseCases, ProfileUseCases, ShippingUseCases};

/// Pager pages of the wizard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    #[default]
    Address,
    Delivery,
    Confirmation,
}

impl Step {
    pub const LAST: usize = 2;

    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Address,
            1 => Self::Delivery,
            _ => Self::Confirmation,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutState {
    /// Pager index, `0..=Step::LAST`.
    pub step: usize,
    pub items: Vec<CartItem>,
    pub addresses: Vec<Address>,
    pub selected_address: Option<AddressId>,

    pub city_query: String,
    pub cities: Vec<City>,
    pub selected_city: Option<City>,
    pub is_searching_cities: bool,

    pub department_query: String,
    pub departments: Vec<Department>,
    pub selected_department: Option<Department>,
    pub is_searching_departments: bool,

    pub recipient_name: String,
    pub recipient_phone: String,

    pub is_loading: bool,
    pub is_placing: bool,
    pub error: Option<ScreenError>,
    pub message: Option<String>,
}

impl CheckoutState {
    #[must_use]
    pub const fn current_step(&self) -> Step {
        Step::from_index(self.step)
    }

    #[must_use]
    pub fn subtotal(&self) -> Price {
        cart_subtotal(&self.items)
    }

    /// Delivery details once both city and department are chosen.
    #[must_use]
    pub fn delivery(&self) -> Option<DeliveryDetails> {
        let city = self.selected_city.as_ref()?;
        let department = self.selected_department.as_ref()?;
        Some(DeliveryDetails::new(
            &self.recipient_name,
            self.recipient_phone.trim(),
            city,
            department,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutIntent {
    Load,
    NextStep,
    PreviousStep,
    SelectAddress(AddressId),
    CityQueryChanged(String),
    SelectCity(City),
    DepartmentQueryChanged(String),
    SelectDepartment(Department),
    RecipientChanged(String),
    PhoneChanged(String),
    /// Save the entered delivery details as an address.
    SaveAddress,
    PlaceOrder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutEvent {
    OrderPlaced(OrderId),
}

pub fn reduce(state: &mut CheckoutState, intent: &CheckoutIntent) {
    match intent {
        CheckoutIntent::Load => {
            state.is_loading = true;
            state.error = None;
        }
        CheckoutIntent::NextStep => state.step = (state.step + 1).min(Step::LAST),
        CheckoutIntent::PreviousStep => state.step = state.step.saturating_sub(1),
        CheckoutIntent::SelectAddress(id) => {
            let Some(address) = state.addresses.iter().find(|a| a.id == *id) else {
                return;
            };
            let delivery = address.delivery.clone();
            state.selected_address = Some(*id);
            state.recipient_name = delivery.recipient_name.clone();
            state.recipient_phone = delivery.recipient_phone.clone();
            state.selected_city = Some(delivery.city());
            state.selected_department = Some(delivery.department());
            state.cities.clear();
            state.departments.clear();
        }
        CheckoutIntent::CityQueryChanged(query) => {
            state.city_query.clone_from(query);
            if query.trim().is_empty() {
                state.cities.clear();
            }
        }
        CheckoutIntent::SelectCity(city) => {
            state.selected_city = Some(city.clone());
            state.selected_address = None;
            state.cities.clear();
            state.department_query.clear();
            state.departments.clear();
            state.selected_department = None;
            state.is_searching_departments = true;
        }
        CheckoutIntent::DepartmentQueryChanged(query) => {
            state.department_query.clone_from(query);
        }
        CheckoutIntent::SelectDepartment(department) => {
            state.selected_department = Some(department.clone());
            state.selected_address = None;
            state.departments.clear();
        }
        CheckoutIntent::RecipientChanged(name) => {
            state.recipient_name.clone_from(name);
            state.selected_address = None;
        }
        CheckoutIntent::PhoneChanged(phone) => {
            state.recipient_phone.clone_from(phone);
            state.selected_address = None;
        }
        CheckoutIntent::SaveAddress => state.message = None,
        CheckoutIntent::PlaceOrder => {
            if !state.is_placing {
                state.is_placing = true;
                state.message = None;
            }
        }
    }
}

type CheckoutStore = Store<CheckoutState, CheckoutEvent>;

async fn search_cities(store: CheckoutStore, shipping: ShippingUseCases, query: String) {
    store.update(|s| s.is_searching_cities = true);
    let result = shipping.search_cities(&query).await;
    store.update(|s| {
        s.is_searching_cities = false;
        // Typing moved on while the request was in flight
        if s.city_query.trim() != query {
            return;
        }
        match result {
            Ok(cities) => s.cities = cities,
            Err(err) => s.message = Some(err.message),
        }
    });
}

async fn search_departments(store: CheckoutStore, shipping: ShippingUseCases, query: String) {
    let Some(city) = store.read(|s| s.selected_city.clone()) else {
        return;
    };
    store.update(|s| s.is_searching_departments = true);
    let result = shipping.search_departments(&city.reference, &query).await;
    store.update(|s| {
        s.is_searching_departments = false;
        let same_city = s.selected_city.as_ref().map(|c| c.reference.as_str())
            == Some(city.reference.as_str());
        if !same_city || s.department_query.trim() != query {
            return;
        }
        match result {
            Ok(departments) => s.departments = departments,
            Err(err) => s.message = Some(err.message),
        }
    });
}

pub struct CheckoutViewModel {
    screen: Screen<CheckoutState, CheckoutEvent>,
    cart: CartUseCases,
    orders: OrderUseCases,
    profiles: ProfileUseCases,
    shipping: ShippingUseCases,
}

impl CheckoutViewModel {
    /// `debounce` is the quiet period before a typed city or department
    /// query is sent.
    #[must_use]
    pub fn new(
        cart: CartUseCases,
        orders: OrderUseCases,
        profiles: ProfileUseCases,
        shipping: ShippingUseCases,
        debounce: Duration,
    ) -> Self {
        let mut screen = Screen::new(CheckoutState::default());

        let store = screen.store().clone();
        let lookup = shipping.clone();
        screen.watch(debounce_field(
            store.subscribe(),
            debounce,
            |s: &CheckoutState| s.city_query.clone(),
            move |query| search_cities(store.clone(), lookup.clone(), query),
        ));

        let store = screen.store().clone();
        let lookup = shipping.clone();
        screen.watch(debounce_field(
            store.subscribe(),
            debounce,
            |s: &CheckoutState| s.department_query.clone(),
            move |query| search_departments(store.clone(), lookup.clone(), query),
        ));

        Self {
            screen,
            cart,
            orders,
            profiles,
            shipping,
        }
    }

    fn load(&mut self) {
        let store = self.screen.store().clone();
        let cart = self.cart.clone();
        let profiles = self.profiles.clone();
        self.screen.launch(async move {
            let (items, addresses, profile) = tokio::join!(
                cart.get_cart(),
                profiles.get_addresses(),
                profiles.get_profile(),
            );
            store.update(|s| {
                match items {
                    Ok(items) => s.items = items,
                    Err(err) => record_error(&mut s.error, &err),
                }
                match addresses {
                    Ok(addresses) => s.addresses = addresses,
                    Err(err) => record_error(&mut s.error, &err),
                }
                // Prefill the recipient from the profile; a missing profile is fine
                if let Ok(profile) = profile {
                    if s.recipient_name.is_empty() {
                        s.recipient_name = profile.full_name();
                    }
                    if s.recipient_phone.is_empty() {
                        s.recipient_phone = profile.phone.unwrap_or_default();
                    }
                }
                s.is_loading = false;
            });
            // Start from the default address when there is one
            let default = store.read(|s| {
                s.selected_city
                    .is_none()
                    .then(|| s.addresses.iter().find(|a| a.is_default).map(|a| a.id))
                    .flatten()
            });
            if let Some(id) = default {
                store.update(|s| reduce(s, &CheckoutIntent::SelectAddress(id)));
            }
        });
    }

    fn load_departments(&mut self) {
        let store = self.screen.store().clone();
        let shipping = self.shipping.clone();
        self.screen
            .launch(search_departments(store, shipping, String::new()));
    }

    fn save_address(&mut self) {
        let store = self.screen.store().clone();
        let Some(delivery) = store.read(CheckoutState::delivery) else {
            store.update(|s| s.message = Some("Choose a city and department".to_string()));
            return;
        };
        let profiles = self.profiles.clone();
        self.screen.launch(async move {
            let is_default = store.read(|s| s.addresses.is_empty());
            let result = profiles.save_address(&delivery, is_default).await;
            store.update(|s| match result {
                Ok(address) => {
                    s.selected_address = Some(address.id);
                    s.addresses.push(address);
                    s.message = Some("Address saved".to_string());
                }
                Err(err) => s.message = Some(err.message),
            });
        });
    }

    fn place_order(&mut self) {
        let store = self.screen.store().clone();
        let Some(delivery) = store.read(CheckoutState::delivery) else {
            store.update(|s| {
                s.is_placing = false;
                s.message = Some("Choose a city and department".to_string());
            });
            return;
        };
        let orders = self.orders.clone();
        self.screen.launch(async move {
            let result = orders.place_order(&delivery).await;
            store.update(|s| s.is_placing = false);
            match result {
                Ok(order) => {
                    store.update(|s| s.items.clear());
                    store.emit(CheckoutEvent::OrderPlaced(order.id));
                }
                Err(err) => store.update(|s| s.message = Some(err.message)),
            }
        });
    }
}

impl ViewModel for CheckoutViewModel {
    type State = CheckoutState;
    type Intent = CheckoutIntent;
    type Event = CheckoutEvent;

    const NAME: &'static str = "checkout";

    fn screen(&self) -> &Screen<CheckoutState, CheckoutEvent> {
        &self.screen
    }

    fn screen_mut(&mut self) -> &mut Screen<CheckoutState, CheckoutEvent> {
        &mut self.screen
    }

    fn handle(&mut self, intent: CheckoutIntent) {
        let placing = self.screen.store().read(|s| s.is_placing);
        self.screen.store().update(|s| reduce(s, &intent));
        match intent {
            CheckoutIntent::Load => self.load(),
            CheckoutIntent::SelectCity(_) => self.load_departments(),
            CheckoutIntent::SaveAddress => self.save_address(),
            CheckoutIntent::PlaceOrder if !placing => self.place_order(),
            _ => {}
        }
    }
}
