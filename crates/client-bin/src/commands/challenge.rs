//! Challenge command handler: resume a flow from a /challenge URL.

use super::flow;
use challenge_orchestrator::ChallengeQuery;
use client_config_and_utils::{Config, Paths};

/// Resume a challenge from a URL, e.g. an emailed verification link.
pub async fn run(
    config: &Config,
    paths: &Paths,
    url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    flow::drive(config, paths, ChallengeQuery::from_url(url)).await
}
