//! Interactive challenge loop shared by the `login` and `challenge` commands.

use crate::console::{prompt, CapturedNavigator};
use auth_api_client::AuthApiClient;
use challenge_countdown::{Remaining, SystemClock};
use challenge_orchestrator::{
    ChallengeController, ChallengeMode, ChallengeQuery, ResendFeedback, SubmissionResult,
    CHALLENGE_PATH,
};
use client_config_and_utils::{Config, Paths};
use session_store::{create_session_manager, StoredSessionSink};
use std::sync::Arc;
use tracing::warn;

/// Drive a challenge (and any challenges it chains into) to completion.
pub async fn drive(
    config: &Config,
    paths: &Paths,
    mut query: ChallengeQuery,
) -> Result<(), Box<dyn std::error::Error>> {
    let api = AuthApiClient::new(&config.api_url, &config.publishable_key);

    // Any 401, from any call, clears the persisted session.
    {
        let hook_manager = create_session_manager(paths)?;
        api.set_unauthorized_hook(Box::new(move || {
            if let Err(e) = hook_manager.clear_session() {
                warn!(error = %e, "Could not clear session after 401");
            }
        }));
    }

    let clock = Arc::new(SystemClock);

    'challenge: loop {
        let sink = StoredSessionSink::new(create_session_manager(paths)?);
        let navigator = Arc::new(CapturedNavigator::default());
        let mut controller =
            ChallengeController::new(&query, api.clone(), sink, navigator.clone(), clock.clone());

        let Some(descriptor) = controller.descriptor().cloned() else {
            println!("This challenge link is invalid or incomplete.");
            return Ok(());
        };

        if let Some(email) = &descriptor.display_email {
            println!("A code was sent to {email}.");
        }
        if let Remaining::Seconds(secs) = controller.expiry_remaining() {
            println!("The code expires in {secs}s.");
        }

        loop {
            let label = match descriptor.mode {
                ChallengeMode::Password => "Password",
                _ if descriptor.mode.supports_resend() => "Code (or 'resend')",
                _ => "Code",
            };
            let input = prompt(label)?;

            if input == "resend" && descriptor.mode != ChallengeMode::Password {
                match controller.resend().await {
                    ResendFeedback::Resent { message } => println!("{message}"),
                    ResendFeedback::CooldownActive { seconds_remaining } => {
                        println!(
                            "Please wait {seconds_remaining}s before requesting another code."
                        );
                    }
                    ResendFeedback::Unavailable => {
                        println!("This challenge cannot resend codes.");
                    }
                    ResendFeedback::Busy => println!("A resend is already in progress."),
                    ResendFeedback::LimitExceeded { message } => {
                        println!("{message}");
                        return Ok(());
                    }
                    ResendFeedback::Failed { message } => println!("{message}"),
                }
                continue;
            }

            match controller.submit(&input).await {
                SubmissionResult::Error { message } => {
                    println!("{message}");
                }
                SubmissionResult::Noop => {
                    println!("This challenge link is invalid or incomplete.");
                    return Ok(());
                }
                SubmissionResult::LoginSuccess { user } => {
                    let name = user.username.or(user.email).unwrap_or(user.id);
                    println!("Logged in as {name}.");
                    if let Some(target) = navigator.take() {
                        println!("Continue at {target}");
                    }
                    return Ok(());
                }
                SubmissionResult::SignupVerified { email } => {
                    match email {
                        Some(email) => println!("Email {email} verified. Continue signing up."),
                        None => println!("Email verified. Continue signing up."),
                    }
                    return Ok(());
                }
                SubmissionResult::ActionSuccess { redirect_url } => {
                    println!("Verified.");
                    if let Some(url) = redirect_url {
                        println!("Continue at {url}");
                    }
                    return Ok(());
                }
                SubmissionResult::NextChallenge { url } => {
                    if url.starts_with(CHALLENGE_PATH) {
                        println!("One more step.");
                        query = ChallengeQuery::from_url(&url);
                        continue 'challenge;
                    }
                    println!("Continue at {url}");
                    return Ok(());
                }
            }
        }
    }
}
