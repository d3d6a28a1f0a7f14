//! The challenge controller: one instance per mounted challenge screen.
//!
//! Owns the resolved descriptor, the submission state machine, both
//! countdown timers, and the resend coordinator; they are created and
//! destroyed together. Submission and resend are user-triggered and
//! single-threaded, so the busy guards here are state checks, not locks.

use crate::api::AuthApi;
use crate::descriptor::{resolve, ChallengeDescriptor, ChallengeMode, ChallengeQuery};
use crate::machine::{ChallengeMachine, ChallengeMachineInput, ChallengeMachineState};
use crate::navigator::Navigator;
use crate::resend::{ResendCoordinator, ResendFeedback};
use crate::result::SubmissionResult;
use crate::urls::next_challenge_url;
use auth_api_client::{ApiError, AuthUser, LoginOutcome};
use challenge_countdown::{Clock, CountdownTimer, Remaining};
use redirect_safety_gate::{append_action_token, safe_redirect_or_default};
use session_store::{SessionSink, SessionUser};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Drives one challenge from arrival to a terminal outcome.
pub struct ChallengeController<A, S, N, C>
where
    A: AuthApi,
    S: SessionSink,
    N: Navigator + 'static,
    C: Clock + 'static,
{
    descriptor: Option<ChallengeDescriptor>,
    machine: ChallengeMachine,
    api: A,
    sink: S,
    navigator: Arc<N>,
    clock: Arc<C>,
    resend: ResendCoordinator<N, C>,
    expiry_timer: Option<CountdownTimer>,
    cooldown_timer: Option<CountdownTimer>,
}

impl<A, S, N, C> ChallengeController<A, S, N, C>
where
    A: AuthApi,
    S: SessionSink,
    N: Navigator + 'static,
    C: Clock + 'static,
{
    /// Resolve `query` and mount the controller. An unresolvable query still
    /// yields a controller; its submissions are no-ops.
    pub fn new(query: &ChallengeQuery, api: A, sink: S, navigator: Arc<N>, clock: Arc<C>) -> Self {
        let descriptor = resolve(query);

        let (expiry_timer, cooldown_timer) = match &descriptor {
            Some(d) => (
                Some(CountdownTimer::start(clock.clone(), d.expires_at.clone())),
                Some(CountdownTimer::start(clock.clone(), d.next_resend_at.clone())),
            ),
            None => (None, None),
        };

        Self {
            descriptor,
            machine: ChallengeMachine::new(),
            api,
            sink,
            navigator: navigator.clone(),
            clock: clock.clone(),
            resend: ResendCoordinator::new(navigator, clock),
            expiry_timer,
            cooldown_timer,
        }
    }

    /// The resolved descriptor, if the query resolved.
    pub fn descriptor(&self) -> Option<&ChallengeDescriptor> {
        self.descriptor.as_ref()
    }

    /// Current submission state.
    pub fn state(&self) -> &ChallengeMachineState {
        self.machine.state()
    }

    /// Seconds until the current code expires. Informational only; an
    /// expired countdown does not block submission.
    pub fn expiry_remaining(&self) -> Remaining {
        self.expiry_timer
            .as_ref()
            .map(|t| t.remaining())
            .unwrap_or(Remaining::NotApplicable)
    }

    /// Seconds until another resend is allowed.
    pub fn cooldown_remaining(&self) -> Remaining {
        self.cooldown_timer
            .as_ref()
            .map(|t| t.remaining())
            .unwrap_or(Remaining::NotApplicable)
    }

    /// Submit a verification code (or password, in password mode).
    ///
    /// Validation failures never reach the network and leave the controller
    /// idle for another attempt. All transport and backend failures are
    /// normalized into the `Error` variant; nothing propagates.
    pub async fn submit(&mut self, code: &str) -> SubmissionResult {
        let Some(descriptor) = self.descriptor.clone() else {
            warn!("Submission against an unresolved challenge, ignoring");
            return SubmissionResult::Noop;
        };

        match self.machine.state() {
            ChallengeMachineState::Idle => {}
            ChallengeMachineState::Submitting => {
                return SubmissionResult::Error {
                    message: "A submission is already in progress".to_string(),
                }
            }
            _ => {
                return SubmissionResult::Error {
                    message: "This challenge has already been completed".to_string(),
                }
            }
        }

        if let Some(message) = validate_code(descriptor.mode, code) {
            debug!(mode = %descriptor.mode.as_str(), "Rejected code client-side");
            return SubmissionResult::Error { message };
        }

        if self.machine.consume(&ChallengeMachineInput::Submit).is_err() {
            return SubmissionResult::Error {
                message: "A submission is already in progress".to_string(),
            };
        }

        let result = self.dispatch(&descriptor, code).await;

        let input = match &result {
            SubmissionResult::SignupVerified { .. }
            | SubmissionResult::LoginSuccess { .. }
            | SubmissionResult::ActionSuccess { .. } => ChallengeMachineInput::Accepted,
            SubmissionResult::NextChallenge { .. } => ChallengeMachineInput::Chained,
            SubmissionResult::Error { .. } | SubmissionResult::Noop => {
                ChallengeMachineInput::Rejected
            }
        };
        let _ = self.machine.consume(&input);

        result
    }

    /// Request a fresh code. Delegates preconditions and rotation to the
    /// resend coordinator; restarts both countdowns when the flow rotates.
    pub async fn resend(&mut self) -> ResendFeedback {
        if !matches!(self.machine.state(), ChallengeMachineState::Idle) {
            return ResendFeedback::Busy;
        }
        let Some(descriptor) = self.descriptor.as_mut() else {
            return ResendFeedback::Unavailable;
        };

        let feedback = self.resend.resend(&self.api, descriptor).await;

        if matches!(feedback, ResendFeedback::Resent { .. }) {
            self.expiry_timer = Some(CountdownTimer::start(
                self.clock.clone(),
                descriptor.expires_at.clone(),
            ));
            self.cooldown_timer = Some(CountdownTimer::start(
                self.clock.clone(),
                descriptor.next_resend_at.clone(),
            ));
        }

        feedback
    }

    /// Mode × action dispatch. Exactly one endpoint per submission.
    async fn dispatch(&mut self, descriptor: &ChallengeDescriptor, code: &str) -> SubmissionResult {
        let method = descriptor.mode.method_tag();

        if let Some(action) = descriptor.action.clone() {
            return match self
                .api
                .verify_action(method, &descriptor.identifier, code, &action)
                .await
            {
                Ok(verification) if verification.success => {
                    let base = safe_redirect_or_default(descriptor.redirect_to.as_deref());
                    let redirect_url = match &verification.action_token {
                        Some(token) => append_action_token(&base, token),
                        None => base,
                    };
                    info!(action = %action, "Privileged action re-authenticated");
                    self.navigator.navigate(&redirect_url);
                    SubmissionResult::ActionSuccess {
                        redirect_url: Some(redirect_url),
                    }
                }
                Ok(_) => SubmissionResult::Error {
                    message: "That code is incorrect".to_string(),
                },
                Err(e) => submission_error(e),
            };
        }

        match descriptor.mode {
            ChallengeMode::Email if descriptor.signup => {
                match self
                    .api
                    .verify_signup_code(&descriptor.identifier, code)
                    .await
                {
                    Ok(verification) if verification.verified => {
                        info!("Signup email verified");
                        SubmissionResult::SignupVerified {
                            email: verification.email,
                        }
                    }
                    Ok(_) => SubmissionResult::Error {
                        message: "That code is incorrect".to_string(),
                    },
                    Err(e) => submission_error(e),
                }
            }
            ChallengeMode::Email | ChallengeMode::EmailMfa | ChallengeMode::Totp => {
                match self
                    .api
                    .verify_login(method, &descriptor.identifier, code)
                    .await
                {
                    Ok(outcome) => self.conclude_login(descriptor, outcome),
                    Err(e) => submission_error(e),
                }
            }
            ChallengeMode::Password => {
                match self.api.password_login(&descriptor.identifier, code).await {
                    Ok(outcome) => self.conclude_login(descriptor, outcome),
                    Err(e) => submission_error(e),
                }
            }
        }
    }

    /// Map a login-family outcome to its terminal effect: establish the
    /// session, chain to the next challenge, or surface the rejection.
    fn conclude_login(
        &mut self,
        descriptor: &ChallengeDescriptor,
        outcome: LoginOutcome,
    ) -> SubmissionResult {
        match outcome {
            LoginOutcome::Authenticated { user } => self.complete_login(descriptor, user),
            LoginOutcome::MfaRequired {
                mfa_type,
                mfa_token,
                masked_email,
                expires_at,
                next_resend_at,
            } => {
                let mode = ChallengeMode::from_type(&mfa_type).unwrap_or(ChallengeMode::Email);
                self.chain(
                    descriptor,
                    mode,
                    &mfa_token,
                    masked_email.as_deref(),
                    expires_at.as_deref(),
                    next_resend_at.as_deref(),
                )
            }
            LoginOutcome::VerificationRequired {
                flow_id,
                masked_email,
                expires_at,
                next_resend_at,
            } => self.chain(
                descriptor,
                ChallengeMode::Email,
                &flow_id,
                masked_email.as_deref(),
                expires_at.as_deref(),
                next_resend_at.as_deref(),
            ),
            LoginOutcome::Rejected { message } => SubmissionResult::Error { message },
        }
    }

    fn complete_login(
        &mut self,
        descriptor: &ChallengeDescriptor,
        user: AuthUser,
    ) -> SubmissionResult {
        let session_user = SessionUser {
            id: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
        };
        if let Err(e) = self.sink.login(&session_user) {
            error!(error = %e, "Could not persist session after login");
            return SubmissionResult::Error {
                message: "Login succeeded but the session could not be saved. Please try again."
                    .to_string(),
            };
        }

        let target = safe_redirect_or_default(descriptor.redirect_to.as_deref());
        info!(user_id = %user.id, target = %target, "Login complete");
        self.navigator.navigate(&target);

        SubmissionResult::LoginSuccess { user }
    }

    /// Synthesize and navigate to the next challenge, carrying forward the
    /// display hint, both countdown targets, and the redirect target.
    fn chain(
        &mut self,
        descriptor: &ChallengeDescriptor,
        mode: ChallengeMode,
        identifier: &str,
        masked_email: Option<&str>,
        expires_at: Option<&str>,
        next_resend_at: Option<&str>,
    ) -> SubmissionResult {
        let url = next_challenge_url(
            mode,
            identifier,
            masked_email,
            expires_at,
            next_resend_at,
            descriptor.redirect_to.as_deref(),
        );
        info!(mode = %mode.as_str(), "Further challenge required");
        self.navigator.navigate(&url);
        SubmissionResult::NextChallenge { url }
    }
}

/// Client-side code validation. `None` means the code may go to the
/// network; `Some` carries the message for the user.
fn validate_code(mode: ChallengeMode, code: &str) -> Option<String> {
    if mode.expects_otp() {
        if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Some("Enter the 6-digit code".to_string());
        }
    } else if code.chars().count() < 8 {
        return Some("Password must be at least 8 characters".to_string());
    }
    None
}

fn submission_error(e: ApiError) -> SubmissionResult {
    warn!(error = %e, "Submission failed");
    SubmissionResult::Error {
        message: e.user_message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resend::RESEND_LIMIT_REDIRECT_DELAY;
    use auth_api_client::{
        ActionVerification, ApiResult, LoginOutcome, ResendRotation, SignupVerification,
    };
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Scripted auth API: responses are queued per endpoint, every call is
    /// recorded.
    #[derive(Clone, Default)]
    struct MockApi {
        calls: Arc<Mutex<Vec<String>>>,
        login_responses: Arc<Mutex<VecDeque<ApiResult<LoginOutcome>>>>,
        action_responses: Arc<Mutex<VecDeque<ApiResult<ActionVerification>>>>,
        signup_responses: Arc<Mutex<VecDeque<ApiResult<SignupVerification>>>>,
        resend_responses: Arc<Mutex<VecDeque<ApiResult<ResendRotation>>>>,
    }

    impl MockApi {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn queue_login(&self, response: ApiResult<LoginOutcome>) {
            self.login_responses.lock().unwrap().push_back(response);
        }

        fn queue_action(&self, response: ApiResult<ActionVerification>) {
            self.action_responses.lock().unwrap().push_back(response);
        }

        fn queue_signup(&self, response: ApiResult<SignupVerification>) {
            self.signup_responses.lock().unwrap().push_back(response);
        }

        fn queue_resend(&self, response: ApiResult<ResendRotation>) {
            self.resend_responses.lock().unwrap().push_back(response);
        }
    }

    impl AuthApi for MockApi {
        async fn verify_login(
            &self,
            method: &str,
            identifier: &str,
            code: &str,
        ) -> ApiResult<LoginOutcome> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("verify_login:{method}:{identifier}:{code}"));
            self.login_responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected verify_login call")
        }

        async fn password_login(&self, username: &str, password: &str) -> ApiResult<LoginOutcome> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("password_login:{username}:{password}"));
            self.login_responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected password_login call")
        }

        async fn verify_action(
            &self,
            method: &str,
            identifier: &str,
            code: &str,
            action: &str,
        ) -> ApiResult<ActionVerification> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("verify_action:{method}:{identifier}:{code}:{action}"));
            self.action_responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected verify_action call")
        }

        async fn verify_signup_code(
            &self,
            flow_id: &str,
            code: &str,
        ) -> ApiResult<SignupVerification> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("verify_signup:{flow_id}:{code}"));
            self.signup_responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected verify_signup_code call")
        }

        async fn resend_code(&self, flow_id: &str) -> ApiResult<ResendRotation> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("resend:{flow_id}"));
            self.resend_responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected resend_code call")
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink {
        logins: Arc<Mutex<Vec<SessionUser>>>,
        logouts: Arc<Mutex<usize>>,
    }

    impl SessionSink for RecordingSink {
        fn login(&self, user: &SessionUser) -> session_store::StorageResult<()> {
            self.logins.lock().unwrap().push(user.clone());
            Ok(())
        }

        fn logout(&self) -> session_store::StorageResult<()> {
            *self.logouts.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        visits: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        fn visits(&self) -> Vec<String> {
            self.visits.lock().unwrap().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, path: &str) {
            self.visits.lock().unwrap().push(path.to_string());
        }
    }

    struct FakeClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl FakeClock {
        fn starting_at(now: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(now),
            }
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_760_000_000, 0).unwrap()
    }

    struct Harness {
        api: MockApi,
        sink: RecordingSink,
        navigator: Arc<RecordingNavigator>,
        controller: ChallengeController<MockApi, RecordingSink, RecordingNavigator, FakeClock>,
    }

    fn mount(query: ChallengeQuery) -> Harness {
        let api = MockApi::default();
        let sink = RecordingSink::default();
        let navigator = Arc::new(RecordingNavigator::default());
        let clock = Arc::new(FakeClock::starting_at(t0()));
        let controller = ChallengeController::new(
            &query,
            api.clone(),
            sink.clone(),
            navigator.clone(),
            clock,
        );
        Harness {
            api,
            sink,
            navigator,
            controller,
        }
    }

    fn email_query(flow_id: &str) -> ChallengeQuery {
        ChallengeQuery {
            flow_id: Some(flow_id.to_string()),
            ..Default::default()
        }
    }

    fn user(id: &str) -> AuthUser {
        AuthUser {
            id: id.to_string(),
            email: Some(format!("{id}@example.com")),
            username: Some(id.to_string()),
        }
    }

    #[tokio::test]
    async fn test_unresolved_challenge_submits_noop() {
        let mut h = mount(ChallengeQuery::default());
        assert_eq!(h.controller.submit("123456").await, SubmissionResult::Noop);
        assert!(h.api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_short_code_never_reaches_network() {
        for query in [
            email_query("f1"),
            ChallengeQuery {
                challenge_type: Some("totp".to_string()),
                token: Some("tok".to_string()),
                ..Default::default()
            },
            ChallengeQuery {
                challenge_type: Some("email_mfa".to_string()),
                token: Some("tok".to_string()),
                ..Default::default()
            },
        ] {
            let mut h = mount(query);
            for bad in ["123", "1234567", "12345a", ""] {
                let result = h.controller.submit(bad).await;
                assert!(matches!(result, SubmissionResult::Error { .. }));
            }
            assert!(h.api.calls().is_empty());
            // Still idle: validation failures are recoverable.
            assert_eq!(*h.controller.state(), ChallengeMachineState::Idle);
        }
    }

    #[tokio::test]
    async fn test_short_password_never_reaches_network() {
        let mut h = mount(ChallengeQuery {
            challenge_type: Some("password".to_string()),
            username: Some("sam".to_string()),
            ..Default::default()
        });
        let result = h.controller.submit("hunter2").await;
        assert!(matches!(result, SubmissionResult::Error { .. }));
        assert!(h.api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_signup_flow_verifies_against_flow_id() {
        let mut h = mount(ChallengeQuery {
            flow_id: Some("flow-7".to_string()),
            signup: true,
            ..Default::default()
        });
        h.api.queue_signup(Ok(SignupVerification {
            verified: true,
            email: Some("new@example.com".to_string()),
        }));

        let result = h.controller.submit("123456").await;
        assert_eq!(
            result,
            SubmissionResult::SignupVerified {
                email: Some("new@example.com".to_string())
            }
        );
        assert_eq!(h.api.calls(), vec!["verify_signup:flow-7:123456"]);
        assert_eq!(*h.controller.state(), ChallengeMachineState::Succeeded);
    }

    #[tokio::test]
    async fn test_signup_wrong_code_is_retryable() {
        let mut h = mount(ChallengeQuery {
            flow_id: Some("flow-7".to_string()),
            signup: true,
            ..Default::default()
        });
        h.api.queue_signup(Ok(SignupVerification {
            verified: false,
            email: None,
        }));

        let result = h.controller.submit("123456").await;
        assert_eq!(
            result,
            SubmissionResult::Error {
                message: "That code is incorrect".to_string()
            }
        );
        assert_eq!(*h.controller.state(), ChallengeMachineState::Idle);
    }

    #[tokio::test]
    async fn test_email_login_success_establishes_session_and_navigates() {
        let mut h = mount(ChallengeQuery {
            flow_id: Some("f1".to_string()),
            redirect_to: Some("/cart".to_string()),
            ..Default::default()
        });
        h.api
            .queue_login(Ok(LoginOutcome::Authenticated { user: user("u1") }));

        let result = h.controller.submit("123456").await;
        match result {
            SubmissionResult::LoginSuccess { user } => assert_eq!(user.id, "u1"),
            other => panic!("Expected LoginSuccess, got {other:?}"),
        }
        assert_eq!(h.api.calls(), vec!["verify_login:EMAIL:f1:123456"]);

        let logins = h.sink.logins.lock().unwrap().clone();
        assert_eq!(logins.len(), 1);
        assert_eq!(logins[0].id, "u1");
        assert_eq!(h.navigator.visits(), vec!["/cart"]);
    }

    #[tokio::test]
    async fn test_unsafe_redirect_falls_back_to_default() {
        let mut h = mount(ChallengeQuery {
            flow_id: Some("f1".to_string()),
            redirect_to: Some("https://evil.com".to_string()),
            ..Default::default()
        });
        h.api
            .queue_login(Ok(LoginOutcome::Authenticated { user: user("u1") }));

        h.controller.submit("123456").await;
        assert_eq!(h.navigator.visits(), vec!["/"]);
    }

    #[tokio::test]
    async fn test_email_mfa_submits_under_totp_method() {
        let mut h = mount(ChallengeQuery {
            challenge_type: Some("email_mfa".to_string()),
            token: Some("mfa-tok".to_string()),
            ..Default::default()
        });
        h.api
            .queue_login(Ok(LoginOutcome::Authenticated { user: user("u1") }));

        h.controller.submit("654321").await;
        // Shared backend second-factor path: method tag is TOTP on the wire.
        assert_eq!(h.api.calls(), vec!["verify_login:TOTP:mfa-tok:654321"]);
    }

    #[tokio::test]
    async fn test_password_login_chains_to_totp_challenge() {
        let mut h = mount(ChallengeQuery {
            challenge_type: Some("password".to_string()),
            username: Some("sam".to_string()),
            redirect_to: Some("/orders".to_string()),
            ..Default::default()
        });
        h.api.queue_login(Ok(LoginOutcome::MfaRequired {
            mfa_type: "totp".to_string(),
            mfa_token: "mfa-9".to_string(),
            masked_email: Some("s***@example.com".to_string()),
            expires_at: None,
            next_resend_at: None,
        }));

        let result = h.controller.submit("correct-horse").await;
        let SubmissionResult::NextChallenge { url } = result else {
            panic!("Expected NextChallenge, got {result:?}");
        };
        assert!(url.contains("type=totp"));
        assert!(url.contains("token=mfa-9"));
        assert_eq!(h.navigator.visits(), vec![url.clone()]);
        assert_eq!(*h.controller.state(), ChallengeMachineState::ChainRequired);

        // Round-trip: the chained URL resolves back to the response's
        // mfa_type/mfa_token, with the display hint and redirect carried.
        let descriptor = resolve(&ChallengeQuery::from_url(&url)).unwrap();
        assert_eq!(descriptor.mode, ChallengeMode::Totp);
        assert_eq!(descriptor.identifier, "mfa-9");
        assert_eq!(descriptor.display_email.as_deref(), Some("s***@example.com"));
        assert_eq!(descriptor.redirect_to.as_deref(), Some("/orders"));
    }

    #[tokio::test]
    async fn test_mfa_chain_end_to_end_establishes_session_once() {
        // Step 1: password login surfaces an MFA requirement.
        let mut h = mount(ChallengeQuery {
            challenge_type: Some("password".to_string()),
            username: Some("sam".to_string()),
            ..Default::default()
        });
        h.api.queue_login(Ok(LoginOutcome::MfaRequired {
            mfa_type: "totp".to_string(),
            mfa_token: "mfa-9".to_string(),
            masked_email: None,
            expires_at: None,
            next_resend_at: None,
        }));
        let SubmissionResult::NextChallenge { url } = h.controller.submit("correct-horse").await
        else {
            panic!("Expected NextChallenge");
        };

        // Step 2: a fresh controller mounts from the chained URL.
        let mut h2 = mount(ChallengeQuery::from_url(&url));
        h2.api
            .queue_login(Ok(LoginOutcome::Authenticated { user: user("u1") }));

        let result = h2.controller.submit("123456").await;
        assert!(matches!(result, SubmissionResult::LoginSuccess { .. }));
        assert_eq!(h2.api.calls(), vec!["verify_login:TOTP:mfa-9:123456"]);
        assert_eq!(h2.sink.logins.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_email_login_chains_to_fresh_email_flow() {
        let mut h = mount(email_query("f1"));
        h.api.queue_login(Ok(LoginOutcome::VerificationRequired {
            flow_id: "f2".to_string(),
            masked_email: None,
            expires_at: None,
            next_resend_at: None,
        }));

        let SubmissionResult::NextChallenge { url } = h.controller.submit("123456").await else {
            panic!("Expected NextChallenge");
        };
        assert!(url.contains("type=email"));
        assert!(url.contains("flow_id=f2"));
    }

    #[tokio::test]
    async fn test_action_reauth_appends_action_token() {
        let mut h = mount(ChallengeQuery {
            flow_id: Some("f1".to_string()),
            action: Some("delete_account".to_string()),
            redirect_to: Some("/settings?tab=danger".to_string()),
            ..Default::default()
        });
        h.api.queue_action(Ok(ActionVerification {
            success: true,
            action_token: Some("tok-1".to_string()),
            user: None,
            action: Some("delete_account".to_string()),
        }));

        let result = h.controller.submit("123456").await;
        assert_eq!(
            result,
            SubmissionResult::ActionSuccess {
                redirect_url: Some("/settings?tab=danger&action_token=tok-1".to_string())
            }
        );
        assert_eq!(
            h.api.calls(),
            vec!["verify_action:EMAIL:f1:123456:delete_account"]
        );
        assert_eq!(
            h.navigator.visits(),
            vec!["/settings?tab=danger&action_token=tok-1"]
        );
    }

    #[tokio::test]
    async fn test_backend_rejection_returns_to_idle() {
        let mut h = mount(email_query("f1"));
        h.api.queue_login(Err(ApiError::Api {
            status: 400,
            message: "That code is incorrect".to_string(),
        }));

        let result = h.controller.submit("123456").await;
        assert_eq!(
            result,
            SubmissionResult::Error {
                message: "That code is incorrect".to_string()
            }
        );
        assert_eq!(*h.controller.state(), ChallengeMachineState::Idle);

        // Retry is permitted.
        h.api
            .queue_login(Ok(LoginOutcome::Authenticated { user: user("u1") }));
        let result = h.controller.submit("654321").await;
        assert!(matches!(result, SubmissionResult::LoginSuccess { .. }));
    }

    #[tokio::test]
    async fn test_completed_challenge_refuses_further_submissions() {
        let mut h = mount(email_query("f1"));
        h.api
            .queue_login(Ok(LoginOutcome::Authenticated { user: user("u1") }));
        h.controller.submit("123456").await;

        let result = h.controller.submit("123456").await;
        assert!(matches!(result, SubmissionResult::Error { .. }));
        assert_eq!(h.api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_resend_rotates_flow_id_before_next_submission() {
        let mut h = mount(email_query("f1"));
        h.api.queue_resend(Ok(ResendRotation {
            flow_id: "f2".to_string(),
            expires_at: Some((t0() + chrono::Duration::seconds(300)).to_rfc3339()),
            next_resend_at: Some((t0() + chrono::Duration::seconds(60)).to_rfc3339()),
            message: None,
        }));

        let feedback = h.controller.resend().await;
        assert!(matches!(feedback, ResendFeedback::Resent { .. }));
        assert_eq!(h.controller.descriptor().unwrap().identifier, "f2");
        assert_eq!(h.controller.cooldown_remaining(), Remaining::Seconds(60));

        h.api
            .queue_login(Ok(LoginOutcome::Authenticated { user: user("u1") }));
        h.controller.submit("123456").await;
        assert_eq!(
            h.api.calls(),
            vec!["resend:f1", "verify_login:EMAIL:f2:123456"]
        );
    }

    #[tokio::test]
    async fn test_resend_blocked_while_cooldown_running() {
        let mut h = mount(ChallengeQuery {
            flow_id: Some("f1".to_string()),
            next_resend_at: Some((t0() + chrono::Duration::seconds(42)).to_rfc3339()),
            ..Default::default()
        });

        let feedback = h.controller.resend().await;
        assert_eq!(
            feedback,
            ResendFeedback::CooldownActive {
                seconds_remaining: 42
            }
        );
        assert!(h.api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_resend_unavailable_for_totp() {
        let mut h = mount(ChallengeQuery {
            challenge_type: Some("totp".to_string()),
            token: Some("tok".to_string()),
            ..Default::default()
        });

        assert_eq!(h.controller.resend().await, ResendFeedback::Unavailable);
        assert!(h.api.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resend_limit_navigates_to_login_after_fixed_delay() {
        let mut h = mount(email_query("f1"));
        h.api.queue_resend(Err(ApiError::ResendLimitExceeded));

        let feedback = h.controller.resend().await;
        assert!(matches!(feedback, ResendFeedback::LimitExceeded { .. }));
        assert!(h.navigator.visits().is_empty());
        tokio::task::yield_now().await;

        // The forced navigation fires exactly once, after the fixed delay.
        tokio::time::advance(RESEND_LIMIT_REDIRECT_DELAY).await;
        tokio::task::yield_now().await;
        assert_eq!(h.navigator.visits(), vec!["/login"]);

        tokio::time::advance(RESEND_LIMIT_REDIRECT_DELAY).await;
        tokio::task::yield_now().await;
        assert_eq!(h.navigator.visits(), vec!["/login"]);

        // The flow is dead; no further resend attempts go out.
        assert_eq!(h.controller.resend().await, ResendFeedback::Unavailable);
        assert_eq!(h.api.calls(), vec!["resend:f1"]);
    }

    #[tokio::test]
    async fn test_expiry_countdown_reads_descriptor_timestamp() {
        let h = mount(ChallengeQuery {
            flow_id: Some("f1".to_string()),
            expires_at: Some((t0() + chrono::Duration::seconds(300)).to_rfc3339()),
            ..Default::default()
        });
        assert_eq!(h.controller.expiry_remaining(), Remaining::Seconds(300));
        assert_eq!(h.controller.cooldown_remaining(), Remaining::NotApplicable);
    }
}
