//! Carrier lookup commands.

use brewmart_client::Storefront;

use super::CliError;

/// Print cities whose name starts with `query`.
///
/// # Errors
///
/// Returns an error if the carrier lookup fails.
#[allow(clippy::print_stdout)]
pub async fn cities(storefront: &Storefront, query: &str) -> Result<(), CliError> {
    for city in storefront.shipping().search_cities(query).await? {
        println!("{}  {}", city.reference, city.label());
    }
    Ok(())
}

/// Print departments of the city `city_ref`.
///
/// # Errors
///
/// Returns an error if the carrier lookup fails.
#[allow(clippy::print_stdout)]
pub async fn departments(
    storefront: &Storefront,
    city_ref: &str,
    query: &str,
) -> Result<(), CliError> {
    let departments = storefront
        .shipping()
        .search_departments(city_ref, query)
        .await?;
    for d in departments {
        println!("{:>5}  {}", d.number, d.description);
    }
    Ok(())
}
