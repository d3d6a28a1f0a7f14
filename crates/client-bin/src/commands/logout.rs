//! Logout command handler.

use auth_api_client::AuthApiClient;
use client_config_and_utils::{Config, Paths};
use session_store::create_session_manager;

/// Clear the local session, then invalidate it server-side. Local clearing
/// never waits on, or fails because of, the network.
pub async fn run(config: &Config, paths: &Paths) -> Result<(), Box<dyn std::error::Error>> {
    let manager = create_session_manager(paths)?;
    manager.clear_session()?;

    let api = AuthApiClient::new(&config.api_url, &config.publishable_key);
    api.logout_best_effort().await;

    println!("Logged out.");
    Ok(())
}
