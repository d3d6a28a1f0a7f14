//! Resend coordination: cooldown gating, flow-id rotation, limit fallback.

use crate::api::AuthApi;
use crate::descriptor::ChallengeDescriptor;
use crate::navigator::Navigator;
use crate::urls::LOGIN_PATH;
use auth_api_client::ApiError;
use challenge_countdown::{seconds_remaining, Clock, Remaining};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// How long the limit-exceeded message stays on screen before the user is
/// sent back to the login entry point.
pub const RESEND_LIMIT_REDIRECT_DELAY: Duration = Duration::from_secs(3);

/// What a resend attempt amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResendFeedback {
    /// A fresh code is on its way; the flow id has rotated.
    Resent { message: String },
    /// The cooldown has not elapsed; no request was made.
    CooldownActive { seconds_remaining: u64 },
    /// This mode has nothing to resend, or the flow is already dead.
    Unavailable,
    /// Another resend is still in flight.
    Busy,
    /// The backend refused further resends for this flow. Terminal: the
    /// user is returned to login after a fixed delay.
    LimitExceeded { message: String },
    /// Any other failure; state unchanged, retry permitted.
    Failed { message: String },
}

/// Re-issues verification codes for the owning challenge.
///
/// Preconditions are checked before any network call: the mode must be an
/// email-delivered one, no resend may be in flight, and the cooldown must
/// be elapsed or not configured. On success the owning descriptor's
/// identifier rotates to the fresh flow id; the old one is dead and any
/// submission still referencing it will fail server-side with a retryable
/// error.
pub struct ResendCoordinator<N: Navigator + 'static, C: Clock> {
    navigator: Arc<N>,
    clock: Arc<C>,
    is_resending: bool,
    limit_reached: bool,
}

impl<N: Navigator + 'static, C: Clock> ResendCoordinator<N, C> {
    pub fn new(navigator: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            navigator,
            clock,
            is_resending: false,
            limit_reached: false,
        }
    }

    /// Whether a resend is currently in flight.
    pub fn is_resending(&self) -> bool {
        self.is_resending
    }

    /// Request a fresh code for `descriptor`'s flow, rotating its identifier
    /// and timestamps on success.
    pub async fn resend<A: AuthApi>(
        &mut self,
        api: &A,
        descriptor: &mut ChallengeDescriptor,
    ) -> ResendFeedback {
        if !descriptor.mode.supports_resend() || self.limit_reached {
            return ResendFeedback::Unavailable;
        }
        if self.is_resending {
            return ResendFeedback::Busy;
        }
        if let Remaining::Seconds(seconds) =
            seconds_remaining(descriptor.next_resend_at.as_deref(), self.clock.now())
        {
            if seconds > 0 {
                return ResendFeedback::CooldownActive {
                    seconds_remaining: seconds,
                };
            }
        }

        self.is_resending = true;
        let result = api.resend_code(&descriptor.identifier).await;
        self.is_resending = false;

        match result {
            Ok(rotation) => {
                info!(flow_id = %rotation.flow_id, "Resent code, flow rotated");
                descriptor.identifier = rotation.flow_id;
                descriptor.expires_at = rotation.expires_at;
                descriptor.next_resend_at = rotation.next_resend_at;
                ResendFeedback::Resent {
                    message: rotation
                        .message
                        .unwrap_or_else(|| "A new code has been sent".to_string()),
                }
            }
            Err(ApiError::ResendLimitExceeded) => {
                warn!("Resend limit exceeded, returning to login");
                self.limit_reached = true;

                let navigator = self.navigator.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(RESEND_LIMIT_REDIRECT_DELAY).await;
                    navigator.navigate(LOGIN_PATH);
                });

                ResendFeedback::LimitExceeded {
                    message: ApiError::ResendLimitExceeded.user_message(),
                }
            }
            Err(e) => {
                warn!(error = %e, "Resend failed");
                ResendFeedback::Failed {
                    message: e.user_message(),
                }
            }
        }
    }
}
