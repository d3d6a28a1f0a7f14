//! Status command handler.

use client_config_and_utils::Paths;
use session_store::{create_session_manager, SessionStatus};

/// Print the current session status.
pub fn run(paths: &Paths) -> Result<(), Box<dyn std::error::Error>> {
    let manager = create_session_manager(paths)?;

    match manager.status()? {
        SessionStatus::LoggedIn {
            user_id,
            expires_at,
        } => {
            println!("Logged in (user {user_id}).");
            if let Some(at) = expires_at {
                println!("Session expires at {at}.");
            }
        }
        SessionStatus::Expired => println!("Session expired. Please log in again."),
        SessionStatus::NotLoggedIn => println!("Not logged in."),
    }

    Ok(())
}
