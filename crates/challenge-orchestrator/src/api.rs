//! Seam between the controller and the auth API transport.

use auth_api_client::{
    ActionVerification, ApiResult, AuthApiClient, LoginOutcome, ResendRotation, SignupVerification,
};

/// The auth API operations the challenge flow consumes.
///
/// The challenge flow is single-threaded and user-driven, so the futures
/// never cross threads; tests substitute a scripted implementation.
#[allow(async_fn_in_trait)]
pub trait AuthApi {
    /// Submit a verification code against a login-family challenge.
    async fn verify_login(
        &self,
        method: &str,
        identifier: &str,
        code: &str,
    ) -> ApiResult<LoginOutcome>;

    /// Password-challenge login; same response shape as `verify_login`.
    async fn password_login(&self, username: &str, password: &str) -> ApiResult<LoginOutcome>;

    /// Re-authenticate a privileged action.
    async fn verify_action(
        &self,
        method: &str,
        identifier: &str,
        code: &str,
        action: &str,
    ) -> ApiResult<ActionVerification>;

    /// Verify a signup email code.
    async fn verify_signup_code(&self, flow_id: &str, code: &str)
        -> ApiResult<SignupVerification>;

    /// Request a fresh code; rotates the flow id on success.
    async fn resend_code(&self, flow_id: &str) -> ApiResult<ResendRotation>;
}

impl AuthApi for AuthApiClient {
    async fn verify_login(
        &self,
        method: &str,
        identifier: &str,
        code: &str,
    ) -> ApiResult<LoginOutcome> {
        AuthApiClient::verify_login(self, method, identifier, code).await
    }

    async fn password_login(&self, username: &str, password: &str) -> ApiResult<LoginOutcome> {
        AuthApiClient::password_login(self, username, password).await
    }

    async fn verify_action(
        &self,
        method: &str,
        identifier: &str,
        code: &str,
        action: &str,
    ) -> ApiResult<ActionVerification> {
        AuthApiClient::verify_action(self, method, identifier, code, action).await
    }

    async fn verify_signup_code(
        &self,
        flow_id: &str,
        code: &str,
    ) -> ApiResult<SignupVerification> {
        AuthApiClient::verify_signup_code(self, flow_id, code).await
    }

    async fn resend_code(&self, flow_id: &str) -> ApiResult<ResendRotation> {
        AuthApiClient::resend_code(self, flow_id).await
    }
}
