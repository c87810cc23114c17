use crate::error::ClientResult;
use crate::http::ApiClient;
use crate::models::{AuthPayload, Credentials, Registration, UserRecord};

use super::{to_body, LOGIN_PATH, LOGOUT_PATH, ME_PATH, REGISTER_PATH};

impl ApiClient {
    /// Exchange credentials for a token. Stateless; see `SessionController::login`.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<AuthPayload> {
        let body = to_body(credentials)?;
        self.post(LOGIN_PATH, Some(&body)).await?.json()
    }

    pub async fn register(&self, registration: &Registration) -> ClientResult<AuthPayload> {
        let body = to_body(registration)?;
        self.post(REGISTER_PATH, Some(&body)).await?.json()
    }

    pub async fn logout(&self) -> ClientResult<()> {
        self.post(LOGOUT_PATH, None).await.map(|_| ())
    }

    /// Profile of whoever the stored token belongs to.
    pub async fn me(&self) -> ClientResult<UserRecord> {
        self.get(ME_PATH).await?.data()
    }
}
