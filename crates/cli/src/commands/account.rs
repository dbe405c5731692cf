//! Commands that read the signed-in user's data.

use brewmart_client::Storefront;
use brewmart_client::viewmodels::{CartIntent, NotificationsIntent, OrdersIntent, ViewModel};
use secrecy::ExposeSecret;

use super::{CliError, Credentials};

async fn sign_in(storefront: &Storefront, credentials: &Credentials) -> Result<(), CliError> {
    let (Some(email), Some(password)) = (&credentials.email, &credentials.password) else {
        return Err(CliError::MissingCredentials);
    };
    let user = storefront
        .auth()
        .sign_in(email, password.expose_secret())
        .await?;
    tracing::info!(user = %user.id, "Signed in");
    Ok(())
}

/// Print the cart with line totals.
///
/// # Errors
///
/// Returns an error if sign-in or loading the cart fails.
#[allow(clippy::print_stdout)]
pub async fn cart(storefront: &Storefront, credentials: &Credentials) -> Result<(), CliError> {
    sign_in(storefront, credentials).await?;
    let mut screen = storefront.cart_screen();
    screen.on_intent(CartIntent::Load);
    screen.idle().await;

    let state = screen.state();
    if state.error.is_some() {
        return Err(CliError::Screen("cart"));
    }
    if state.items.is_empty() {
        println!("Your cart is empty");
        return Ok(());
    }
    for item in &state.items {
        println!(
            "{:>3} x {:<40} {}",
            item.quantity,
            item.product.name,
            item.line_total()
        );
    }
    println!("{} items, subtotal {}", state.item_count(), state.subtotal());
    Ok(())
}

/// Print order history, newest first.
///
/// # Errors
///
/// Returns an error if sign-in or loading orders fails.
#[allow(clippy::print_stdout)]
pub async fn orders(storefront: &Storefront, credentials: &Credentials) -> Result<(), CliError> {
    sign_in(storefront, credentials).await?;
    let mut screen = storefront.orders_screen();
    screen.on_intent(OrdersIntent::Load);
    screen.idle().await;

    let state = screen.state();
    if state.error.is_some() {
        return Err(CliError::Screen("orders"));
    }
    for order in &state.orders {
        println!(
            "#{:<6} {}  {:<10} {}  -> {}, {}",
            order.id.as_i64(),
            order.created_at.format("%Y-%m-%d"),
            order.status.as_str(),
            order.total,
            order.delivery.city_name,
            order.delivery.department_name,
        );
        for item in &order.items {
            let name = item.product.as_ref().map_or("(removed product)", |p| p.name.as_str());
            println!("         {:>3} x {name}", item.quantity);
        }
    }
    Ok(())
}

/// Print notifications and mark them read.
///
/// # Errors
///
/// Returns an error if sign-in or loading notifications fails.
#[allow(clippy::print_stdout)]
pub async fn notifications(
    storefront: &Storefront,
    credentials: &Credentials,
) -> Result<(), CliError> {
    sign_in(storefront, credentials).await?;
    let mut screen = storefront.notifications_screen();
    screen.on_intent(NotificationsIntent::Load);
    screen.idle().await;

    let state = screen.state();
    if state.error.is_some() {
        return Err(CliError::Screen("notifications"));
    }
    println!("{} unread", state.unread_count());
    for n in &state.notifications {
        let marker = if n.is_read { " " } else { "*" };
        println!("{marker} {}  {}", n.created_at.format("%Y-%m-%d %H:%M"), n.title);
        if !n.body.is_empty() {
            println!("    {}", n.body);
        }
        if !n.is_read {
            screen.on_intent(NotificationsIntent::MarkRead(n.id));
        }
    }
    screen.idle().await;
    Ok(())
}
