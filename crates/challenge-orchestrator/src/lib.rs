//! Challenge & verification orchestration for the Bazaar client.
//!
//! This crate drives a user through login, signup email verification,
//! multi-factor authentication (TOTP or email OTP), password re-entry, and
//! privileged-action re-authentication behind a single generic "challenge"
//! concept:
//! - Query resolution into a canonical [`ChallengeDescriptor`]
//! - An explicit FSM for code submission with polymorphic result handling
//!   and chained-challenge navigation
//! - A resend coordinator with flow-id rotation and resend-limit fallback
//! - Open-redirect-safe navigation threading a caller-supplied destination
//!   through every step

mod api;
mod controller;
mod descriptor;
mod machine;
mod navigator;
mod resend;
mod result;
mod urls;

pub use api::AuthApi;
pub use controller::ChallengeController;
pub use descriptor::{resolve, ChallengeDescriptor, ChallengeMode, ChallengeQuery};
pub use machine::challenge_machine;
pub use machine::{ChallengeMachine, ChallengeMachineInput, ChallengeMachineState};
pub use navigator::Navigator;
pub use resend::{ResendCoordinator, ResendFeedback, RESEND_LIMIT_REDIRECT_DELAY};
pub use result::SubmissionResult;
pub use urls::{next_challenge_url, CHALLENGE_PATH, LOGIN_PATH};
