//! Session lifecycle: sign-in, sign-up, sign-out, and route protection.
//!
//! The session owns the credential store and the transient identity. The
//! identity lives only in memory: a fresh process knows whether it is signed
//! in (the credential survives) but not who the user is; the display name
//! is only captured at sign-in time and is not re-derived from the API.

use std::fmt;

use anyhow::{Context, Result};

use crate::api::auth::{SignInRequest, SignUpRequest};
use crate::api::{ApiClient, ApiFailure, ApiFailureKind, ApiOutcome};
use crate::auth::{self, TokenStore};

/// Display-name length bounds (sign-up form).
pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 96;
/// Email length bound (sign-up form).
pub const EMAIL_MAX_LEN: usize = 96;
/// Minimum password length (sign-up form).
pub const PASSWORD_MIN_LEN: usize = 8;

/// The signed-in user, known only transiently after sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub user_name: String,
}

/// Client routes: two public entry points and one protected surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SignIn,
    SignUp,
    Tasks,
}

impl Route {
    /// Resolves a requested route against the authentication state.
    ///
    /// Unauthenticated access to the task list lands on sign-in; an
    /// authenticated session lands on the task list no matter what was
    /// requested; an unmatched request (`None`) redirects by authentication
    /// state.
    pub fn resolve(requested: Option<Route>, authenticated: bool) -> Route {
        if authenticated {
            Route::Tasks
        } else {
            match requested {
                Some(Route::SignUp) => Route::SignUp,
                _ => Route::SignIn,
            }
        }
    }
}

/// Sign-up form fields before validation.
#[derive(Debug, Clone, Default)]
pub struct SignUpDraft {
    pub first_name: String,
    /// Optional; bounds apply only when non-empty.
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Field-level validation failures, caught before anything is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    FirstNameRequired,
    FirstNameTooShort,
    FirstNameTooLong,
    LastNameTooShort,
    LastNameTooLong,
    EmailRequired,
    EmailTooLong,
    EmailInvalid,
    PasswordTooShort,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FirstNameRequired => write!(f, "First name is required"),
            ValidationError::FirstNameTooShort => {
                write!(f, "First name must be at least {NAME_MIN_LEN} characters")
            }
            ValidationError::FirstNameTooLong => {
                write!(f, "First name must be at most {NAME_MAX_LEN} characters")
            }
            ValidationError::LastNameTooShort => {
                write!(f, "Last name must be at least {NAME_MIN_LEN} characters")
            }
            ValidationError::LastNameTooLong => {
                write!(f, "Last name must be at most {NAME_MAX_LEN} characters")
            }
            ValidationError::EmailRequired => write!(f, "Email is required"),
            ValidationError::EmailTooLong => {
                write!(f, "Email must be at most {EMAIL_MAX_LEN} characters")
            }
            ValidationError::EmailInvalid => write!(f, "Email address is not valid"),
            ValidationError::PasswordTooShort => {
                write!(f, "Password must be at least {PASSWORD_MIN_LEN} characters")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validates the sign-up form. An empty result means ready to dispatch.
pub fn validate_sign_up(draft: &SignUpDraft) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let first = draft.first_name.trim();
    if first.is_empty() {
        errors.push(ValidationError::FirstNameRequired);
    } else if first.chars().count() < NAME_MIN_LEN {
        errors.push(ValidationError::FirstNameTooShort);
    } else if first.chars().count() > NAME_MAX_LEN {
        errors.push(ValidationError::FirstNameTooLong);
    }

    let last = draft.last_name.trim();
    if !last.is_empty() {
        if last.chars().count() < NAME_MIN_LEN {
            errors.push(ValidationError::LastNameTooShort);
        } else if last.chars().count() > NAME_MAX_LEN {
            errors.push(ValidationError::LastNameTooLong);
        }
    }

    let email = draft.email.trim();
    if email.is_empty() {
        errors.push(ValidationError::EmailRequired);
    } else if email.chars().count() > EMAIL_MAX_LEN {
        errors.push(ValidationError::EmailTooLong);
    } else if !email.contains('@') {
        errors.push(ValidationError::EmailInvalid);
    }

    if draft.password.chars().count() < PASSWORD_MIN_LEN {
        errors.push(ValidationError::PasswordTooShort);
    }

    errors
}

/// Result of a sign-in attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    /// Credential persisted, identity captured.
    SignedIn(Identity),
    /// The server rejected the attempt or never answered. Nothing stored.
    Rejected(ApiFailure),
}

/// Result of a sign-up attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// Account created; the caller should route to sign-in.
    Registered,
    /// Caught before dispatch; no request was sent.
    Invalid(Vec<ValidationError>),
    /// The server rejected the registration (its message, when present, is
    /// in the failure summary).
    Rejected(ApiFailure),
}

/// Orchestrates sign-in, sign-up, and sign-out against the credential store.
#[derive(Debug)]
pub struct Session {
    store: TokenStore,
    identity: Option<Identity>,
}

impl Session {
    pub fn new(store: TokenStore) -> Self {
        Self {
            store,
            identity: None,
        }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// The transient identity, present only after a sign-in in this process.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        auth::is_authenticated(&self.store)
    }

    /// Submits credentials; on success persists the returned credential and
    /// captures the identity. A rejection leaves any stored credential
    /// untouched.
    ///
    /// # Errors
    /// Returns an error if a granted credential cannot be persisted.
    pub async fn sign_in(
        &mut self,
        client: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<SignInOutcome> {
        let request = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        match client.sign_in(&request).await {
            ApiOutcome::Success(response) => {
                self.store
                    .save(&response.access_token)
                    .context("persist session credential")?;
                let identity = Identity {
                    user_id: response.user_id,
                    user_name: response.user_name,
                };
                self.identity = Some(identity.clone());
                Ok(SignInOutcome::SignedIn(identity))
            }
            ApiOutcome::Failure(failure) => {
                tracing::warn!(error = %failure, "sign in rejected");
                Ok(SignInOutcome::Rejected(failure))
            }
            ApiOutcome::SessionExpired => Ok(SignInOutcome::Rejected(ApiFailure::new(
                ApiFailureKind::HttpStatus,
                "Sign in failed",
            ))),
        }
    }

    /// Validates and submits the registration form. Validation failures are
    /// caught before dispatch; no request is sent for an invalid draft.
    pub async fn sign_up(client: &ApiClient, draft: &SignUpDraft) -> SignUpOutcome {
        let errors = validate_sign_up(draft);
        if !errors.is_empty() {
            return SignUpOutcome::Invalid(errors);
        }

        let request = SignUpRequest {
            first_name: draft.first_name.trim().to_string(),
            last_name: draft.last_name.trim().to_string(),
            email: draft.email.trim().to_string(),
            password: draft.password.clone(),
        };

        match client.sign_up(&request).await {
            ApiOutcome::Success(()) => SignUpOutcome::Registered,
            ApiOutcome::SessionExpired => SignUpOutcome::Rejected(ApiFailure::new(
                ApiFailureKind::HttpStatus,
                "Sign up failed",
            )),
            ApiOutcome::Failure(f) => {
                tracing::warn!(error = %f, "sign up rejected");
                SignUpOutcome::Rejected(f)
            }
        }
    }

    /// Clears the stored credential and the transient identity.
    ///
    /// Triggered by explicit user action, or implicitly after the fetch
    /// layer reports session invalidation. The caller routes to sign-in.
    ///
    /// # Errors
    /// Returns an error if the credential file cannot be removed.
    pub fn sign_out(&mut self) -> Result<()> {
        self.store.clear().context("clear session credential")?;
        self.identity = None;
        Ok(())
    }
}
