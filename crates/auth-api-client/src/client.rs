//! HTTP client for the auth API endpoints.

use crate::error::{extract_message, is_resend_limit};
use crate::types::RawLoginResponse;
use crate::{
    ActionVerification, ApiError, ApiResult, LoginOutcome, ResendRotation, SignupVerification,
};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Hook invoked whenever any call comes back 401, regardless of which flow
/// was active. Typically wired to clear the persisted session.
pub type UnauthorizedHook = Box<dyn Fn() + Send + Sync>;

/// Client for the Bazaar auth API.
#[derive(Clone)]
pub struct AuthApiClient {
    http_client: reqwest::Client,
    api_url: String,
    publishable_key: String,
    on_unauthorized: Arc<Mutex<Option<UnauthorizedHook>>>,
}

impl AuthApiClient {
    /// Create a new auth API client.
    ///
    /// # Arguments
    /// * `api_url` - The API base URL (e.g., `https://api.bazaar.app`)
    /// * `publishable_key` - The publishable API key
    pub fn new(api_url: impl Into<String>, publishable_key: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_url: api_url.into(),
            publishable_key: publishable_key.into(),
            on_unauthorized: Arc::new(Mutex::new(None)),
        }
    }

    /// Install the global 401 hook.
    pub fn set_unauthorized_hook(&self, hook: UnauthorizedHook) {
        let mut slot = self.on_unauthorized.lock().unwrap();
        *slot = Some(hook);
    }

    /// Build the URL for an auth endpoint.
    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/v1/auth/{}", self.api_url, endpoint)
    }

    /// Shared error path for every call.
    async fn error_from(&self, response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        self.classify_error(status, &body)
    }

    /// Classify a failed status/body pair: fires the 401 session-clear hook,
    /// recognizes the distinguished resend-limit code, and extracts a
    /// user-facing message otherwise.
    fn classify_error(&self, status: u16, body: &str) -> ApiError {
        if status == reqwest::StatusCode::UNAUTHORIZED.as_u16() {
            warn!(status, "Unauthorized response, firing session-clear hook");
            let hook = self.on_unauthorized.lock().unwrap();
            if let Some(hook) = hook.as_ref() {
                hook();
            }
            return ApiError::Unauthorized;
        }

        if is_resend_limit(body) {
            return ApiError::ResendLimitExceeded;
        }

        let message = extract_message(status, body);
        warn!(status, message = %message, "Auth API rejected request");
        ApiError::Api { status, message }
    }

    /// Submit a verification code against a login-family challenge.
    ///
    /// `method` is the backend method tag (EMAIL, TOTP, PASSWORD); `identifier`
    /// is the flow id or MFA token the mode selected.
    pub async fn verify_login(
        &self,
        method: &str,
        identifier: &str,
        code: &str,
    ) -> ApiResult<LoginOutcome> {
        let url = self.auth_url("verify-login");
        debug!(url = %url, method = %method, "Submitting login verification code");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.publishable_key)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({
                "method": method,
                "identifier": identifier,
                "code": code,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }

        let raw: RawLoginResponse = response.json().await?;
        Ok(LoginOutcome::from(raw))
    }

    /// Re-authenticate a privileged action with a verification code.
    pub async fn verify_action(
        &self,
        method: &str,
        identifier: &str,
        code: &str,
        action: &str,
    ) -> ApiResult<ActionVerification> {
        let url = self.auth_url("verify-action");
        debug!(url = %url, method = %method, action = %action, "Submitting action re-authentication code");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.publishable_key)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({
                "method": method,
                "identifier": identifier,
                "code": code,
                "action": action,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }

        let verification: ActionVerification = response.json().await?;
        Ok(verification)
    }

    /// Verify a signup email code against its flow.
    pub async fn verify_signup_code(
        &self,
        flow_id: &str,
        code: &str,
    ) -> ApiResult<SignupVerification> {
        let url = self.auth_url("verify-signup");
        debug!(url = %url, "Submitting signup verification code");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.publishable_key)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({
                "flow_id": flow_id,
                "code": code,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }

        let verification: SignupVerification = response.json().await?;
        Ok(verification)
    }

    /// Request a fresh code for a flow. On success the flow id rotates and
    /// the previous one is dead.
    pub async fn resend_code(&self, flow_id: &str) -> ApiResult<ResendRotation> {
        let url = self.auth_url("resend-code");
        debug!(url = %url, "Requesting code resend");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.publishable_key)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({ "flow_id": flow_id }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }

        let rotation: ResendRotation = response.json().await?;
        debug!(flow_id = %rotation.flow_id, "Flow rotated after resend");
        Ok(rotation)
    }

    /// Password-challenge login. Same response shape as verify-login.
    pub async fn password_login(&self, username: &str, password: &str) -> ApiResult<LoginOutcome> {
        let url = self.auth_url("login");
        debug!(url = %url, username = %username, "Attempting password login");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.publishable_key)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }

        let raw: RawLoginResponse = response.json().await?;
        Ok(LoginOutcome::from(raw))
    }

    /// Best-effort server-side session invalidation. Never fails the caller;
    /// local session clearing must not depend on this.
    pub async fn logout_best_effort(&self) {
        let url = self.auth_url("logout");
        debug!(url = %url, "Requesting server-side logout");

        match self
            .http_client
            .post(&url)
            .header("apikey", &self.publishable_key)
            .send()
            .await
        {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), "Server-side logout failed, continuing");
            }
            Err(e) => {
                warn!(error = %e, "Server-side logout unreachable, continuing");
            }
            _ => {}
        }
    }
}
