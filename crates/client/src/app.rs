//! Wiring: one place that builds clients, repositories and use-cases from
//! configuration and hands out view-models.

use std::sync::Arc;

use crate::backend::{AuthClient, BackendClient, StorageClient};
use crate::config::ClientConfig;
use crate::repositories::{
    RemoteAccountRepository, RemoteAuthRepository, RemoteCartRepository, RemoteCatalogRepository,
    RemoteOrderRepository, RemoteShippingRepository,
};
use crate::shipping::ShippingClient;
use crate::usecases::{
    AuthUseCases, CartUseCases, CatalogUseCases, FavoritesUseCases, NotificationUseCases,
    OrderUseCases, ProfileUseCases, ShippingUseCases,
};
use crate::viewmodels::{
    AuthViewModel, CartViewModel, CheckoutViewModel, FavoritesViewModel, HomeViewModel,
    NotificationsViewModel, OrdersViewModel, ProductViewModel, ProfileViewModel, SearchViewModel,
};

/// The assembled storefront.
///
/// Cheap to clone; every clone shares the same HTTP clients, session and
/// image URL cache.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: ClientConfig,
    auth: AuthUseCases,
    catalog: CatalogUseCases,
    cart: CartUseCases,
    favorites: FavoritesUseCases,
    orders: OrderUseCases,
    profiles: ProfileUseCases,
    notifications: NotificationUseCases,
    shipping: ShippingUseCases,
}

impl Storefront {
    /// Build the storefront against the configured backend and carrier.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let backend = BackendClient::new(&config.backend);
        let storage = Arc::new(StorageClient::new(
            backend.clone(),
            &config.catalog.images_bucket,
            config.catalog.signed_url_expiry,
        ));
        let auth = Arc::new(RemoteAuthRepository::new(AuthClient::new(backend.clone())));
        let account = Arc::new(RemoteAccountRepository::new(backend.clone()));
        let catalog = Arc::new(RemoteCatalogRepository::new(backend.clone()));
        let cart = Arc::new(RemoteCartRepository::new(backend.clone()));
        let orders = Arc::new(RemoteOrderRepository::new(backend));
        let shipping = Arc::new(RemoteShippingRepository::new(
            ShippingClient::new(&config.shipping),
            config.catalog.search_limit,
        ));

        let inner = StorefrontInner {
            auth: AuthUseCases::new(auth.clone()),
            catalog: CatalogUseCases::new(
                catalog,
                storage.clone(),
                config.catalog.search_limit,
            ),
            cart: CartUseCases::new(auth.clone(), cart.clone(), storage.clone()),
            favorites: FavoritesUseCases::new(auth.clone(), cart.clone(), storage.clone()),
            orders: OrderUseCases::new(auth.clone(), cart, orders),
            profiles: ProfileUseCases::new(auth.clone(), account.clone(), account.clone(), storage),
            notifications: NotificationUseCases::new(auth, account),
            shipping: ShippingUseCases::new(shipping),
            config,
        };
        tracing::debug!(backend = %inner.config.backend.url, "Storefront assembled");
        Self {
            inner: Arc::new(inner),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn auth(&self) -> &AuthUseCases {
        &self.inner.auth
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogUseCases {
        &self.inner.catalog
    }

    #[must_use]
    pub fn cart(&self) -> &CartUseCases {
        &self.inner.cart
    }

    #[must_use]
    pub fn favorites(&self) -> &FavoritesUseCases {
        &self.inner.favorites
    }

    #[must_use]
    pub fn orders(&self) -> &OrderUseCases {
        &self.inner.orders
    }

    #[must_use]
    pub fn profiles(&self) -> &ProfileUseCases {
        &self.inner.profiles
    }

    #[must_use]
    pub fn notifications(&self) -> &NotificationUseCases {
        &self.inner.notifications
    }

    #[must_use]
    pub fn shipping(&self) -> &ShippingUseCases {
        &self.inner.shipping
    }

    // =========================================================================
    // View-models
    // =========================================================================

    #[must_use]
    pub fn home(&self) -> HomeViewModel {
        HomeViewModel::new(self.catalog().clone())
    }

    #[must_use]
    pub fn product(&self) -> ProductViewModel {
        ProductViewModel::new(
            self.catalog().clone(),
            self.cart().clone(),
            self.favorites().clone(),
        )
    }

    /// Must be called inside a Tokio runtime.
    #[must_use]
    pub fn search(&self) -> SearchViewModel {
        SearchViewModel::new(self.catalog().clone(), self.config().catalog.search_debounce)
    }

    #[must_use]
    pub fn cart_screen(&self) -> CartViewModel {
        CartViewModel::new(self.cart().clone())
    }

    #[must_use]
    pub fn favorites_screen(&self) -> FavoritesViewModel {
        FavoritesViewModel::new(self.favorites().clone())
    }

    /// Must be called inside a Tokio runtime.
    #[must_use]
    pub fn checkout(&self) -> CheckoutViewModel {
        CheckoutViewModel::new(
            self.cart().clone(),
            self.orders().clone(),
            self.profiles().clone(),
            self.shipping().clone(),
            self.config().catalog.search_debounce,
        )
    }

    #[must_use]
    pub fn orders_screen(&self) -> OrdersViewModel {
        OrdersViewModel::new(self.orders().clone())
    }

    #[must_use]
    pub fn sign_in(&self) -> AuthViewModel {
        AuthViewModel::new(self.auth().clone())
    }

    #[must_use]
    pub fn profile(&self) -> ProfileViewModel {
        ProfileViewModel::new(self.profiles().clone(), self.auth().clone())
    }

    #[must_use]
    pub fn notifications_screen(&self) -> NotificationsViewModel {
        NotificationsViewModel::new(self.notifications().clone())
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
