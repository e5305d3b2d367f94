//! `bizdesk` -- command-line companion for the bizdesk dashboard.
//!
//! Restores the persisted session (or starts one from `BIZDESK_TOKEN`)
//! and lists the companies visible to the signed-in user.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default                 | Description                        |
//! |------------------------|----------|-------------------------|------------------------------------|
//! | `API_BASE_URL`         | no       | `http://localhost:8000` | Backend base URL                   |
//! | `APP_ORIGIN`           | no       | `http://localhost:3000` | Origin checked against allow-list  |
//! | `TOKEN_STORE_PATH`     | no       | `.bizdesk/storage.json` | Persisted token file               |
//! | `REQUEST_TIMEOUT_SECS` | no       | `30`                    | HTTP timeout                       |
//! | `BIZDESK_TOKEN`        | no       | --                      | Access token to log in with        |

use std::sync::Arc;

use bizdesk_client::{ClientConfig, CompanyApi};
use bizdesk_core::session::{FileTokenStore, SessionConfig, SessionManager, SessionOutcome};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bizdesk=info,bizdesk_client=info,bizdesk_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "bizdesk failed");
        std::process::exit(1);
    }
}

async fn run(config: ClientConfig) -> anyhow::Result<()> {
    tracing::info!(
        api_base_url = %config.api_base_url,
        origin = %config.app_origin,
        token_store = %config.token_store_path.display(),
        "Starting bizdesk",
    );

    let store = Arc::new(FileTokenStore::new(config.token_store_path.clone()));
    let session = Arc::new(SessionManager::new(
        SessionConfig::new(config.app_origin.clone()),
        store,
    ));

    let mut outcome = session.initialize();
    if let Ok(token) = std::env::var("BIZDESK_TOKEN") {
        outcome = session.login(token.trim());
    }

    let user = match outcome {
        SessionOutcome::Authenticated(user) => user,
        other => {
            tracing::warn!(outcome = other.as_str(), "Login required");
            anyhow::bail!("not signed in ({})", other.as_str());
        }
    };
    tracing::info!(
        user_id = ?user.id,
        username = user.username.as_deref().unwrap_or("-"),
        "Session active",
    );

    let api = CompanyApi::new(&config, session.clone())?;
    let companies = match api.list().await {
        Ok(companies) => companies,
        Err(e) => {
            if e.requires_login() {
                session.logout();
            }
            anyhow::bail!(e.user_message());
        }
    };

    for company in &companies {
        tracing::info!(
            id = company.id,
            name = %company.com_name,
            gst = company.gst.as_deref().unwrap_or("-"),
            "Company",
        );
    }
    tracing::info!(count = companies.len(), "Companies listed");

    session.close();
    Ok(())
}
