//! Login endpoint.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use storefront::identity::AuthToken;

use crate::{
    api::{ApiClient, ApiError},
    domain::auth::UserProfile,
};

/// Credentials and profile returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    pub token: AuthToken,
    pub user: UserProfile,
}

#[automock]
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange an email and password for a bearer token.
    async fn login(&self, email: &str, password: &str) -> Result<LoginSession, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: ApiClient,
}

impl HttpAuthApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginRecord {
    #[serde(alias = "accessToken")]
    token: String,
    user: UserProfile,
}

impl TryFrom<LoginRecord> for LoginSession {
    type Error = ApiError;

    fn try_from(record: LoginRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            token: AuthToken::new(record.token).map_err(ApiError::malformed)?,
            user: record.user,
        })
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    #[tracing::instrument(name = "auth.api.login", skip(self, password), err)]
    async fn login(&self, email: &str, password: &str) -> Result<LoginSession, ApiError> {
        let request = self
            .client
            .request(Method::POST, "auth/login", None)?
            .json(&LoginRequest { email, password });

        let record: LoginRecord = self.client.send(request).await?.into_data("login")?;

        record.try_into()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::api::client::{Envelope, decode};

    #[test]
    fn login_record_is_converted() -> TestResult {
        let envelope: Envelope<LoginRecord> = decode(
            br#"{"data": {"token": "abc", "user": {"_id": "u-1", "email": "a@example.com", "name": "An"}}}"#,
        )?;

        let session = LoginSession::try_from(envelope.into_data("login")?)?;

        assert_eq!(session.token.expose(), "abc");
        assert_eq!(session.user.id.as_deref(), Some("u-1"));

        Ok(())
    }

    #[test]
    fn blank_token_is_malformed() -> TestResult {
        let envelope: Envelope<LoginRecord> =
            decode(br#"{"data": {"token": "", "user": {"email": "a@example.com"}}}"#)?;

        let result = LoginSession::try_from(envelope.into_data("login")?);

        assert!(
            matches!(result, Err(ApiError::Validation(_))),
            "expected Validation, got {result:?}"
        );

        Ok(())
    }
}
