//! Login command handler.

use super::flow;
use crate::console::prompt;
use challenge_orchestrator::ChallengeQuery;
use client_config_and_utils::{Config, Paths};

/// Log in with a password challenge, following chained challenges (MFA,
/// email verification) until a session is established.
pub async fn run(
    config: &Config,
    paths: &Paths,
    username: Option<String>,
    redirect_to: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let username = match username {
        Some(username) => username,
        None => prompt("Username")?,
    };

    let query = ChallengeQuery {
        challenge_type: Some("password".to_string()),
        username: Some(username),
        redirect_to,
        ..Default::default()
    };

    flow::drive(config, paths, query).await
}
