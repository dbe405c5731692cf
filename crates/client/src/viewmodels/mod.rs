//! View-models: one state record per screen, driven by intents.
//!
//! A view-model owns a [`Screen`]: the current state in a `watch` channel,
//! a one-shot event channel for navigation, and the [`Scope`] its tasks run
//! in. [`ViewModel::on_intent`] applies the synchronous part of an intent
//! through the screen's pure `reduce` function, then launches whatever
//! use-case calls the intent needs. Tasks write their results back into the
//! state. Dropping the view-model aborts every task it launched.
//!
//! View-models with debounced fields start their watchers on construction,
//! so they must be created inside a Tokio runtime.

mod auth;
mod cart;
mod checkout;
mod debounce;
mod favorites;
mod home;
mod notifications;
mod orders;
mod product;
mod profile;
mod search;

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

use crate::error::{ErrorKind, UseCaseError, add_breadcrumb};

pub use auth::{AuthEvent, AuthIntent, AuthMode, AuthState, AuthViewModel};
pub use cart::{CartEvent, CartIntent, CartState, CartViewModel};
pub use checkout::{CheckoutEvent, CheckoutIntent, CheckoutState, CheckoutViewModel, Step};
pub use favorites::{FavoritesEvent, FavoritesIntent, FavoritesState, FavoritesViewModel};
pub use home::{HomeEvent, HomeIntent, HomeState, HomeViewModel};
pub use notifications::{NotificationsIntent, NotificationsState, NotificationsViewModel};
pub use orders::{OrdersEvent, OrdersIntent, OrdersState, OrdersViewModel};
pub use product::{ProductEvent, ProductIntent, ProductState, ProductViewModel};
pub use profile::{ProfileEvent, ProfileIntent, ProfileState, ProfileViewModel};
pub use search::{SearchEvent, SearchIntent, SearchState, SearchViewModel};

/// Which error illustration a screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenError {
    /// "No connection" illustration.
    Network,
    /// Generic "something went wrong" illustration.
    Generic,
}

impl From<&UseCaseError> for ScreenError {
    fn from(err: &UseCaseError) -> Self {
        match err.kind {
            ErrorKind::Network => Self::Network,
            _ => Self::Generic,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Handle to a screen's state and event channel, cloned into its tasks.
pub struct Store<S, E> {
    state: Arc<watch::Sender<S>>,
    events: mpsc::UnboundedSender<E>,
}

impl<S, E> Clone for Store<S, E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            events: self.events.clone(),
        }
    }
}

impl<S, E> Store<S, E> {
    fn new(initial: S) -> (Self, mpsc::UnboundedReceiver<E>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let store = Self {
            state: Arc::new(watch::Sender::new(initial)),
            events,
        };
        (store, receiver)
    }

    /// Snapshot of the current state.
    pub fn get(&self) -> S
    where
        S: Clone,
    {
        self.state.borrow().clone()
    }

    /// Read part of the state without cloning all of it.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Mutate the state and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut S)) {
        self.state.send_modify(f);
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }

    /// Send a one-shot event. Dropped if nobody holds the receiver.
    pub fn emit(&self, event: E) {
        let _ = self.events.send(event);
    }
}

// =============================================================================
// Scope
// =============================================================================

/// Tasks owned by a view-model. Dropping the scope aborts them.
#[derive(Default)]
pub struct Scope {
    tasks: JoinSet<()>,
}

impl Scope {
    /// Spawn a task in this scope.
    pub fn launch<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // Reap finished tasks so the set doesn't grow with every intent
        while self.tasks.try_join_next().is_some() {}
        self.tasks.spawn(task);
    }

    /// Wait until every launched task has finished. Panics in a task are
    /// re-raised here.
    pub async fn idle(&mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(err) = result
                && err.is_panic()
            {
                std::panic::resume_unwind(err.into_panic());
            }
        }
    }

    /// Abort every task.
    pub fn cancel(&mut self) {
        self.tasks.abort_all();
    }

    /// Number of tasks not yet reaped.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

// =============================================================================
// Screen
// =============================================================================

/// State, events and tasks of one view-model.
///
/// Long-lived watchers (debounced fields) run in their own scope so that
/// [`Screen::idle`] only waits for intent work.
pub struct Screen<S, E> {
    store: Store<S, E>,
    events: Option<mpsc::UnboundedReceiver<E>>,
    scope: Scope,
    watchers: Scope,
}

impl<S, E> Screen<S, E>
where
    S: Send + Sync + 'static,
    E: Send + 'static,
{
    #[must_use]
    pub fn new(initial: S) -> Self {
        let (store, events) = Store::new(initial);
        Self {
            store,
            events: Some(events),
            scope: Scope::default(),
            watchers: Scope::default(),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &Store<S, E> {
        &self.store
    }

    pub fn launch<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.scope.launch(task);
    }

    /// Start a watcher that lives as long as the screen.
    pub fn watch<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.watchers.launch(task);
    }

    pub async fn idle(&mut self) {
        self.scope.idle().await;
    }
}

impl<S, E> Drop for Screen<S, E> {
    fn drop(&mut self) {
        self.scope.cancel();
        self.watchers.cancel();
    }
}

// =============================================================================
// ViewModel
// =============================================================================

/// Common surface of every view-model.
pub trait ViewModel {
    type State: Clone + Send + Sync + 'static;
    type Intent: Debug;
    type Event: Send + 'static;

    /// Screen name used in logs and breadcrumbs.
    const NAME: &'static str;

    fn screen(&self) -> &Screen<Self::State, Self::Event>;

    fn screen_mut(&mut self) -> &mut Screen<Self::State, Self::Event>;

    /// Apply one intent.
    fn handle(&mut self, intent: Self::Intent);

    /// Dispatch an intent, leaving a breadcrumb for error reports.
    fn on_intent(&mut self, intent: Self::Intent) {
        let description = format!("{intent:?}");
        tracing::debug!(screen = Self::NAME, intent = %description, "Intent");
        add_breadcrumb(Self::NAME, &description);
        self.handle(intent);
    }

    /// Snapshot of the current state.
    fn state(&self) -> Self::State {
        self.screen().store().get()
    }

    /// Receiver that sees every state change.
    fn subscribe(&self) -> watch::Receiver<Self::State> {
        self.screen().store().subscribe()
    }

    /// The event receiver; `None` after the first call.
    fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<Self::Event>> {
        self.screen_mut().events.take()
    }

    /// Wait for all work started by intents so far.
    fn idle(&mut self) -> impl Future<Output = ()> + Send {
        self.screen_mut().idle()
    }
}

/// Fold a use-case failure into a screen error, keeping the first one.
pub(crate) fn record_error(slot: &mut Option<ScreenError>, err: &UseCaseError) {
    if slot.is_none() {
        *slot = Some(ScreenError::from(err));
    }
}
