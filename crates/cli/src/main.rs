//! Coffee Box CLI - Database tools and a terminal front end for subscriptions.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! cb-cli migrate
//!
//! # Mirror the catalog into the database
//! cb-cli seed --catalog crates/storefront/static/data/catalog.json
//!
//! # Show plans and brands served by the storefront
//! cb-cli plans
//!
//! # Subscribe
//! cb-cli subscribe --plan standard --brand brand_juan_valdez --grind espresso \
//!     --name Ana --lastname Gómez --email ana@example.com --phone 3000000000 \
//!     --address "Calle 123"
//!
//! # List stored subscriptions, show and resend local ones
//! cb-cli list
//! cb-cli pending
//! cb-cli sync
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Upsert the catalog into the database
//! - `plans`, `subscribe`, `list`, `pending`, `sync` - Talk to the storefront API

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "cb-cli")]
#[command(author, version, about = "Coffee Box CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Upsert plans, brands and grind options from a catalog file
    Seed {
        /// Catalog document to load
        #[arg(long, default_value = "crates/storefront/static/data/catalog.json")]
        catalog: PathBuf,
    },
    /// Show plans and brands from the storefront catalog
    Plans {
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Fill in the subscription form and submit it
    Subscribe {
        #[command(flatten)]
        api: ApiArgs,

        #[command(flatten)]
        form: SubscribeArgs,
    },
    /// List subscriptions stored by the storefront
    List {
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Show subscriptions kept locally because the storefront was unreachable
    Pending {
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Resend locally kept subscriptions
    Sync {
        #[command(flatten)]
        api: ApiArgs,
    },
}

/// Where the storefront and the local store live.
#[derive(Args)]
struct ApiArgs {
    /// Storefront base URL
    #[arg(long, env = "COFFEE_BOX_API_URL", default_value = "http://localhost:3000")]
    api_url: Url,

    /// Local store for submissions that could not be sent
    #[arg(long, env = "COFFEE_BOX_STORE", default_value = ".coffee-box/subscriptions.json")]
    store: PathBuf,
}

#[derive(Args)]
struct SubscribeArgs {
    /// Plan id (defaults to the first plan)
    #[arg(long)]
    plan: Option<String>,

    /// Page URL whose `plan` query parameter preselects the plan
    #[arg(long)]
    from_url: Option<Url>,

    /// Brand id (defaults to the first brand)
    #[arg(long)]
    brand: Option<String>,

    /// Grind id (defaults to the first grind of the brand)
    #[arg(long)]
    grind: Option<String>,

    #[arg(long, default_value = "")]
    name: String,

    #[arg(long, default_value = "")]
    lastname: String,

    #[arg(long, default_value = "")]
    email: String,

    #[arg(long, default_value = "")]
    phone: String,

    #[arg(long, default_value = "")]
    address: String,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { catalog } => commands::seed::catalog(&catalog).await?,
        Commands::Plans { api } => commands::subscriptions::plans(&api.api_url).await?,
        Commands::Subscribe { api, form } => {
            let input = commands::subscriptions::SubscribeInput {
                plan: form.plan,
                from_url: form.from_url,
                brand: form.brand,
                grind: form.grind,
                name: form.name,
                lastname: form.lastname,
                email: form.email,
                phone: form.phone,
                address: form.address,
            };
            commands::subscriptions::subscribe(&api.api_url, &api.store, input).await?;
        }
        Commands::List { api } => commands::subscriptions::list(&api.api_url).await?,
        Commands::Pending { api } => commands::subscriptions::pending(&api.store)?,
        Commands::Sync { api } => commands::subscriptions::sync(&api.api_url, &api.store).await?,
    }
    Ok(())
}
