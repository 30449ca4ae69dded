//! Login and password endpoints.

use tracing::instrument;

use super::{StoreApiClient, StoreApiError};
use crate::api::types::{LoginRequest, LoginResponse, PasswordChange};

const LOGIN_PATH: &str = "store/auth/login";
const PASSWORD_PATH: &str = "store/auth/password";

impl StoreApiClient {
    /// Exchange credentials for a bearer token.
    ///
    /// A 401 means wrong credentials; callers show that on the login form.
    ///
    /// # Errors
    ///
    /// Returns `StoreApiError::Unauthorized` for bad credentials, or any
    /// transport/parse error.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, StoreApiError> {
        let builder = self
            .request(reqwest::Method::POST, None, LOGIN_PATH)?
            .json(request);
        self.send_json(builder, LOGIN_PATH).await
    }

    /// Change the logged-in user's password.
    ///
    /// # Errors
    ///
    /// Returns `StoreApiError::Status` when the backend rejects the current
    /// password.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        token: &str,
        change: &PasswordChange,
    ) -> Result<(), StoreApiError> {
        self.put_empty(token, PASSWORD_PATH, Some(change)).await
    }
}
