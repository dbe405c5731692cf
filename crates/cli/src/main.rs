//! Brewmart CLI - drive the storefront client from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog, optionally by category
//! brewmart catalog
//! brewmart catalog --category 3
//!
//! # Search products and show one
//! brewmart search "ethiopia"
//! brewmart product 42
//!
//! # Carrier lookups
//! brewmart cities "Льв"
//! brewmart departments <city-ref> --query 12
//!
//! # Account data (needs BREWMART_EMAIL and BREWMART_PASSWORD)
//! brewmart cart
//! brewmart orders
//! brewmart notifications
//! ```
//!
//! Configuration comes from the same environment variables as the client
//! library; see `brewmart_client::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use brewmart_client::{ClientConfig, Storefront};

mod commands;

use commands::{CliError, Credentials};

#[derive(Parser)]
#[command(name = "brewmart")]
#[command(author, version, about = "Brewmart storefront CLI")]
struct Cli {
    /// Account email for commands that need a session
    #[arg(long, env = "BREWMART_EMAIL", global = true)]
    email: Option<String>,

    /// Account password for commands that need a session
    #[arg(long, env = "BREWMART_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List categories and products
    Catalog {
        /// Only show products in this category
        #[arg(short, long)]
        category: Option<i64>,
    },
    /// Search products by name
    Search {
        /// Text to search for
        query: String,
    },
    /// Show one product
    Product {
        /// Product ID
        id: i64,
    },
    /// Find carrier cities by name prefix
    Cities {
        /// Start of the city name
        query: String,
    },
    /// List carrier departments in a city
    Departments {
        /// Carrier city reference, as printed by `cities`
        city_ref: String,

        /// Filter by department number or street
        #[arg(default_value = "")]
        query: String,
    },
    /// Show the signed-in user's cart
    Cart,
    /// Show the signed-in user's orders
    Orders,
    /// Show the signed-in user's notifications
    Notifications,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
#[allow(clippy::print_stderr)]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // No subscriber yet; report straight to the terminal
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    // Sentry first, so the tracing layer has a client to report to
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "brewmart_cli=info,brewmart_client=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let storefront = Storefront::new(config);

    if let Err(e) = run(cli, &storefront).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, storefront: &Storefront) -> Result<(), CliError> {
    let credentials = Credentials {
        email: cli.email,
        password: cli.password.map(SecretString::from),
    };

    match cli.command {
        Commands::Catalog { category } => commands::catalog::list(storefront, category).await?,
        Commands::Search { query } => commands::catalog::search(storefront, &query).await?,
        Commands::Product { id } => commands::catalog::show(storefront, id).await?,
        Commands::Cities { query } => commands::shipping::cities(storefront, &query).await?,
        Commands::Departments { city_ref, query } => {
            commands::shipping::departments(storefront, &city_ref, &query).await?;
        }
        Commands::Cart => commands::account::cart(storefront, &credentials).await?,
        Commands::Orders => commands::account::orders(storefront, &credentials).await?,
        Commands::Notifications => {
            commands::account::notifications(storefront, &credentials).await?;
        }
    }
    Ok(())
}
