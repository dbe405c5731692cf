//! Catalog browsing commands.

use brewmart_client::Storefront;
use brewmart_client::viewmodels::{HomeIntent, ProductIntent, ViewModel};
use brewmart_core::{CategoryId, ProductId};

use super::CliError;

/// Print categories, active promotions and products.
///
/// # Errors
///
/// Returns an error if the home screen fails to load.
#[allow(clippy::print_stdout)]
pub async fn list(storefront: &Storefront, category: Option<i64>) -> Result<(), CliError> {
    let mut home = storefront.home();
    // Select first so the combined load already fetches the filtered grid
    if let Some(id) = category {
        home.on_intent(HomeIntent::SelectCategory(CategoryId::new(id)));
    }
    home.on_intent(HomeIntent::Load);
    home.idle().await;

    let state = home.state();
    if state.error.is_some() {
        return Err(CliError::Screen("catalog"));
    }

    println!("Categories:");
    for c in &state.categories {
        let marker = if state.selected_category == Some(c.id) { "*" } else { " " };
        println!(" {marker} {:>4}  {}", c.id.as_i64(), c.name);
    }
    if !state.promotions.is_empty() {
        println!();
        println!("Promotions:");
        for p in &state.promotions {
            match p.discount_percent {
                Some(percent) => println!("   {} (-{percent}%)", p.title),
                None => println!("   {}", p.title),
            }
        }
    }
    println!();
    println!("Products:");
    for p in &state.products {
        println!("   {:>4}  {:<40} {}", p.id.as_i64(), p.name, p.price);
    }
    Ok(())
}

/// Print products matching `query`.
///
/// # Errors
///
/// Returns an error if the search fails.
#[allow(clippy::print_stdout)]
pub async fn search(storefront: &Storefront, query: &str) -> Result<(), CliError> {
    let products = storefront.catalog().search_products(query).await?;
    if products.is_empty() {
        println!("No products match \"{}\"", query.trim());
    }
    for p in &products {
        println!("{:>4}  {:<40} {}", p.id.as_i64(), p.name, p.price);
    }
    Ok(())
}

/// Print one product's details.
///
/// # Errors
///
/// Returns an error if the product can't be loaded.
#[allow(clippy::print_stdout)]
pub async fn show(storefront: &Storefront, id: i64) -> Result<(), CliError> {
    let mut screen = storefront.product();
    screen.on_intent(ProductIntent::Load(ProductId::new(id)));
    screen.idle().await;

    let state = screen.state();
    let Some(product) = state.product else {
        return Err(CliError::Screen("product"));
    };
    println!("{}", product.name);
    println!("Price:     {}", product.price);
    if let Some(volume) = &product.volume {
        println!("Volume:    {volume}");
    }
    println!(
        "Available: {}",
        if product.is_available { "yes" } else { "no" }
    );
    if state.is_favorite {
        println!("In your favorites");
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
    if let Some(url) = &product.image_url {
        println!();
        println!("Image: {url}");
    }
    Ok(())
}
