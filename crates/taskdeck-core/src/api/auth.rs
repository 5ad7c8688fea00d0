//! Authentication endpoints (sign-in / sign-up).

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiOutcome};

const SIGN_IN_PATH: &str = "/auth/sign-in";
const SIGN_UP_PATH: &str = "/auth/sign-up";

/// Sign-in request body.
#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Sign-in response: the bearer credential plus the signed-in identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub access_token: String,
    pub user_id: i64,
    pub user_name: String,
}

/// Sign-up request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl ApiClient {
    /// `POST /auth/sign-in`. Unauthenticated; a rejection here is a failed
    /// login attempt, not session invalidation.
    pub async fn sign_in(&self, request: &SignInRequest) -> ApiOutcome<SignInResponse> {
        self.send_public(Method::POST, SIGN_IN_PATH, request).await
    }

    /// `POST /auth/sign-up`. The server answers 200, or an error with a
    /// `message` body that [`super::ApiFailure`] lifts into the summary.
    pub async fn sign_up(&self, request: &SignUpRequest) -> ApiOutcome<()> {
        self.send_public_unit(Method::POST, SIGN_UP_PATH, request)
            .await
    }
}
