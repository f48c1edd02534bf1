// Create the administrator account, or reset its password.
//
// Usage: create-admin <email> <password>
// ADMIN_EMAIL and ADMIN_PASSWORD are used when the arguments are omitted.

use anyhow::{bail, Context};
use portfolio_blog::{create_admin, init_db, logging, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;
    logging::init(config.log_format);

    let mut args = std::env::args().skip(1);
    let email = args.next().or_else(|| std::env::var("ADMIN_EMAIL").ok());
    let password = args.next().or_else(|| std::env::var("ADMIN_PASSWORD").ok());
    let (email, password) = match (email, password) {
        (Some(email), Some(password)) => (email, password),
        _ => bail!("Usage: create-admin <email> <password>"),
    };

    let pool = init_db(&config).await?;
    let id = create_admin(&pool, &email, &password).await?;
    tracing::info!("Administrator {} is ready (user id {})", email.trim(), id);
    Ok(())
}
