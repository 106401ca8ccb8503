//! Terminal front end for the subscription form and API.
//!
//! # Environment Variables
//!
//! - `COFFEE_BOX_API_URL` - Storefront base URL (default `http://localhost:3000`)
//! - `COFFEE_BOX_STORE` - Local store file (default `.coffee-box/subscriptions.json`)

use std::path::Path;

use coffee_box_client::{
    ApiClient, CatalogProvider, CustomerField, JsonFileStore, LocalSubscriptionStore, Session,
    SubmissionFlow, SubmissionOutcome, SubscriptionForm,
};
use url::Url;

/// Values entered on the command line for `subscribe`.
pub struct SubscribeInput {
    pub plan: Option<String>,
    pub from_url: Option<Url>,
    pub brand: Option<String>,
    pub grind: Option<String>,
    pub name: String,
    pub lastname: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

type CommandResult = Result<(), Box<dyn std::error::Error>>;

async fn session(api: &ApiClient) -> Result<Session, Box<dyn std::error::Error>> {
    let catalog = CatalogProvider::default().fetch(&api.catalog_url()?).await?;
    Ok(Session::new(catalog))
}

fn open_flow(
    api_url: &Url,
    store: &Path,
) -> Result<SubmissionFlow<JsonFileStore>, Box<dyn std::error::Error>> {
    let backend = JsonFileStore::open(store)?;
    Ok(SubmissionFlow::new(
        ApiClient::new(api_url.clone()),
        LocalSubscriptionStore::new(backend),
    ))
}

/// Print the plan, brand and grind options offered by the storefront.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched.
pub async fn plans(api_url: &Url) -> CommandResult {
    let api = ApiClient::new(api_url.clone());
    let session = session(&api).await?;
    let form = SubscriptionForm::new(&session);

    #[allow(clippy::print_stdout)]
    {
        println!("Plans:");
        for option in form.plan_options() {
            println!("  {:<12} {}", option.value, option.label);
        }
        println!("Brands:");
        for brand in &session.catalog().coffee_brands {
            let grinds: Vec<&str> = brand.grind_options.iter().map(|g| g.id.as_str()).collect();
            println!(
                "  {:<18} {} ({}) grinds: {}",
                brand.id,
                brand.name,
                brand.origin,
                grinds.join(", ")
            );
        }
    }
    Ok(())
}

/// Fill the form from `input` and run the submission flow.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched, a selection is not in
/// the catalog, the form is incomplete, or the server rejects the submission.
pub async fn subscribe(api_url: &Url, store: &Path, input: SubscribeInput) -> CommandResult {
    let mut flow = open_flow(api_url, store)?;
    let session = session(flow.api()).await?;
    let mut form = SubscriptionForm::new(&session);

    if let Some(url) = &input.from_url {
        form.preselect_plan_from_url(url);
    }
    if let Some(plan) = &input.plan {
        form.select_plan(plan)?;
    }
    if let Some(brand) = &input.brand {
        form.select_brand(brand)?;
    }
    if let Some(grind) = &input.grind {
        form.select_grind(grind)?;
    }
    form.set_customer_field(CustomerField::Name, input.name);
    form.set_customer_field(CustomerField::Lastname, input.lastname);
    form.set_customer_field(CustomerField::Email, input.email);
    form.set_customer_field(CustomerField::Phone, input.phone);
    form.set_customer_field(CustomerField::Address, input.address);

    let outcome = flow.submit_form(&form).await?;

    #[allow(clippy::print_stdout)]
    {
        match outcome {
            SubmissionOutcome::Persisted { subscription_id } => {
                println!("Subscription created! ID: {subscription_id}");
            }
            SubmissionOutcome::StoredLocally { local_id } => {
                println!("Storefront unavailable; subscription saved locally with ID {local_id}.");
                println!("Run `cb-cli sync` to send it later.");
            }
        }
    }
    Ok(())
}

/// Print the subscriptions stored by the storefront, newest first.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn list(api_url: &Url) -> CommandResult {
    let api = ApiClient::new(api_url.clone());
    let subscriptions = api.list_subscriptions().await?;

    #[allow(clippy::print_stdout)]
    {
        if subscriptions.is_empty() {
            println!("No subscriptions yet.");
        }
        for s in subscriptions {
            println!(
                "#{:<5} {} {:<10} {} {} <{}>",
                s.id,
                s.created_at.format("%Y-%m-%d %H:%M"),
                s.plan,
                s.customer_name,
                s.customer_lastname,
                s.email
            );
        }
    }
    Ok(())
}

/// Print the submissions kept in the local store.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn pending(store: &Path) -> CommandResult {
    let store = LocalSubscriptionStore::new(JsonFileStore::open(store)?);
    let records = store.list()?;

    #[allow(clippy::print_stdout)]
    {
        if records.is_empty() {
            println!("No pending subscriptions.");
        }
        for record in records {
            let email = record
                .submission
                .customer
                .as_ref()
                .map_or("-", |c| c.email.as_str());
            println!(
                "{} {} plan={} customer={}",
                record.id,
                record.created_at.format("%Y-%m-%d %H:%M"),
                record.submission.plan_id,
                email
            );
        }
    }
    Ok(())
}

/// Resend every submission in the local store.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub async fn sync(api_url: &Url, store: &Path) -> CommandResult {
    let mut flow = open_flow(api_url, store)?;
    let report = flow.resend_pending().await?;

    #[allow(clippy::print_stdout)]
    {
        for (local_id, subscription_id) in &report.sent {
            println!("{local_id} -> subscription #{subscription_id}");
        }
        for (local_id, error) in &report.failed {
            let state = if error.is_retryable() { "kept" } else { "dropped" };
            println!("{local_id} failed ({state}): {error}");
        }
        println!("{} sent, {} failed", report.sent.len(), report.failed.len());
    }
    Ok(())
}
