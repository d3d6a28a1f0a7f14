//! REST client for the Bazaar auth API.
//!
//! This crate owns the request/response contracts of the challenge protocol:
//! - verify-login (email / MFA / TOTP code submission)
//! - verify-action (privileged-action re-authentication)
//! - signup code verification
//! - resend-code (flow rotation)
//! - password-challenge login
//!
//! Every polymorphic wire response is mapped into a tagged enum here, at the
//! boundary; nothing downstream branches on "is field X present".

mod client;
mod error;
mod types;

pub use client::{AuthApiClient, UnauthorizedHook};
pub use error::{ApiError, ApiResult};
pub use types::{
    ActionVerification, AuthUser, LoginOutcome, ResendRotation, SignupVerification,
};
