//! Web-form login.
//!
//! The flow is an explicit state machine. A CSRF rejection earns exactly one
//! refresh of the login form and one resubmission: the resubmitted response
//! goes straight to verification and can never re-enter the rejection check.

use mispctl_core::{Credentials, TokenTriplet};
use mispctl_fetch::html::{extract_tokens, has_csrf_rejection, has_logout_link};
use mispctl_fetch::{FetchError, RequestBody, Response, RetryPolicy};
use tracing::{debug, info, instrument, warn};

use crate::client::MispClient;
use crate::error::MispError;

/// Login form path.
const LOGIN_PATH: &str = "users/login";

/// Form field carrying the username.
const EMAIL_FIELD: &str = "data[User][email]";

/// Form field carrying the password.
const PASSWORD_FIELD: &str = "data[User][password]";

// ============================================================================
// State Machine
// ============================================================================

enum LoginState {
    /// Load the login page and read its tokens.
    FetchingForm,
    /// Submit credentials with the first set of tokens.
    Submitting(TokenTriplet),
    /// Inspect the first submission for a CSRF rejection.
    CheckingRejection(Response),
    /// Reload the login page after a rejection; holds the rejected response.
    RefreshingForm(Response),
    /// Submit credentials once more with fresh tokens.
    Resubmitting(TokenTriplet),
    /// Decide on the final submission response.
    Verifying(Response),
    /// The submission showed no logout link; look at the dashboard.
    CheckingHome,
    Done,
}

impl MispClient {
    /// Logs in through the web form.
    ///
    /// Success means a logout affordance is visible, either on the login
    /// response or on the server root fetched afterwards.
    #[instrument(skip(self, credentials), fields(user = %credentials.username()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<(), MispError> {
        let mut state = LoginState::FetchingForm;

        loop {
            state = match state {
                LoginState::FetchingForm => {
                    let page = self.http().get(LOGIN_PATH).await?;
                    if page.is_error() {
                        return Err(MispError::LoginPageUnavailable(page.status_code()));
                    }
                    LoginState::Submitting(extract_tokens(&page.body))
                }
                LoginState::Submitting(tokens) => {
                    LoginState::CheckingRejection(self.submit_login(credentials, &tokens).await?)
                }
                LoginState::CheckingRejection(response) => {
                    if response.is_error() || has_csrf_rejection(&response.body) {
                        warn!(status = response.status_code(), "Login rejected, refreshing form");
                        LoginState::RefreshingForm(response)
                    } else {
                        LoginState::Verifying(response)
                    }
                }
                LoginState::RefreshingForm(rejected) => {
                    let page = self.http().get(LOGIN_PATH).await?;
                    if page.is_error() {
                        warn!(status = page.status_code(), "Login page refresh failed");
                        LoginState::Verifying(rejected)
                    } else {
                        LoginState::Resubmitting(extract_tokens(&page.body))
                    }
                }
                LoginState::Resubmitting(tokens) => {
                    LoginState::Verifying(self.submit_login(credentials, &tokens).await?)
                }
                LoginState::Verifying(response) => {
                    if response.is_error() {
                        return Err(MispError::LoginRejected(response.status_code()));
                    }
                    if has_logout_link(&response.body) {
                        LoginState::Done
                    } else {
                        debug!("No logout link on login response, checking dashboard");
                        LoginState::CheckingHome
                    }
                }
                LoginState::CheckingHome => {
                    let home = self.http().get("").await?;
                    if home.is_error() || !has_logout_link(&home.body) {
                        return Err(MispError::LogoutLinkMissing);
                    }
                    LoginState::Done
                }
                LoginState::Done => {
                    info!("Login succeeded");
                    return Ok(());
                }
            };
        }
    }

    /// Logs in, retrying the whole flow under `policy`.
    pub async fn login_with_retries(
        &self,
        credentials: &Credentials,
        policy: &RetryPolicy,
    ) -> Result<(), FetchError> {
        policy.run("login", |_| self.login(credentials)).await
    }

    async fn submit_login(
        &self,
        credentials: &Credentials,
        tokens: &TokenTriplet,
    ) -> Result<Response, MispError> {
        let mut form = vec![("_method".to_string(), "POST".to_string())];
        form.extend(
            tokens
                .form_fields()
                .into_iter()
                .map(|(name, value)| (name.to_string(), value)),
        );
        form.push((EMAIL_FIELD.to_string(), credentials.username().to_string()));
        form.push((PASSWORD_FIELD.to_string(), credentials.password().to_string()));

        let headers = self.form_headers(LOGIN_PATH);
        Ok(self
            .http()
            .post(LOGIN_PATH, &headers, &RequestBody::Form(form))
            .await?)
    }
}

// ============================================================================
// Tests
// ============================================================================
