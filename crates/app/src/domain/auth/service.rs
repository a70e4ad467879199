//! Login and logout.

use std::{fmt, sync::Arc};

use tracing::{info, warn};

use crate::{
    api::AuthApi,
    domain::{
        auth::{AuthServiceError, UserProfile},
        carts::CartService,
    },
    session::Session,
};

/// Sign-in state. Any change of identity forgets the cached cart.
#[derive(Clone)]
pub struct AuthService {
    api: Arc<dyn AuthApi>,
    carts: CartService,
    session: Session,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, carts: CartService, session: Session) -> Self {
        Self { api, carts, session }
    }

    /// Sign in and fold any guest cart into the account.
    ///
    /// The merge is best effort: a failure is logged and the guest id is dropped regardless, so
    /// later requests carry only the bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::MissingCredentials`] without a request when either field is
    /// blank, or the login failure.
    #[tracing::instrument(name = "auth.service.login", skip(self, password), err)]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthServiceError> {
        let email = email.trim();

        if email.is_empty() || password.is_empty() {
            return Err(AuthServiceError::MissingCredentials);
        }

        let login = self.api.login(email, password).await?;

        self.session.sign_in(&login.token, &login.user)?;

        if let Some(guest) = self.session.guest_id()? {
            match self.carts.merge_guest_cart(&login.token, &guest).await {
                Ok(()) => info!(guest_id = %guest, "guest cart merged"),
                Err(error) => warn!(guest_id = %guest, %error, "guest cart merge failed"),
            }

            self.session.clear_guest_id()?;
        }

        self.carts.reset().await;

        info!(email = %login.user.email, "signed in");

        Ok(login.user)
    }

    /// Drop the token, profile and cached cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the session store fails.
    #[tracing::instrument(name = "auth.service.logout", skip(self), err)]
    pub async fn logout(&self) -> Result<(), AuthServiceError> {
        self.session.sign_out()?;
        self.carts.reset().await;

        info!("signed out");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use storefront::identity::{AuthToken, GuestId, Identity};
    use testresult::TestResult;

    use super::*;
    use crate::{
        api::{ApiError, LoginSession, auth::MockAuthApi, carts::MockCartsApi},
        test::{cart, payload},
    };

    fn service(api: MockAuthApi, carts: MockCartsApi, session: &Session) -> AuthService {
        AuthService::new(
            Arc::new(api),
            CartService::new(Arc::new(carts), session.clone()),
            session.clone(),
        )
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: Some("user-1".to_string()),
            name: None,
            email: "an@example.com".to_string(),
        }
    }

    fn accepting_login() -> TestResult<MockAuthApi> {
        let token = AuthToken::new("token-1")?;

        let mut api = MockAuthApi::new();
        api.expect_login()
            .withf(|email, password| email == "an@example.com" && password == "secret")
            .times(1)
            .returning(move |_, _| {
                Ok(LoginSession {
                    token: token.clone(),
                    user: profile(),
                })
            });

        Ok(api)
    }

    #[tokio::test]
    async fn login_drops_guest_id_even_when_merge_fails() -> TestResult {
        let session = Session::in_memory();
        session.store_guest_id(&GuestId::new("guest-1")?)?;

        let mut carts = MockCartsApi::new();
        carts
            .expect_merge_guest_cart()
            .withf(|token, guest| token.expose() == "token-1" && guest.as_str() == "guest-1")
            .times(1)
            .returning(|_, _| {
                Err(ApiError::Gateway {
                    status: 500,
                    message: None,
                })
            });

        let service = service(accepting_login()?, carts, &session);

        let user = service.login(" an@example.com ", "secret").await?;

        assert_eq!(user, profile());
        assert_eq!(session.guest_id()?, None);
        assert!(
            matches!(session.current_identity()?, Some(Identity::Authenticated(_))),
            "expected an authenticated identity"
        );

        Ok(())
    }

    #[tokio::test]
    async fn login_without_guest_skips_merge() -> TestResult {
        let mut carts = MockCartsApi::new();
        carts.expect_merge_guest_cart().never();

        let session = Session::in_memory();
        let service = service(accepting_login()?, carts, &session);

        service.login("an@example.com", "secret").await?;

        assert_eq!(session.current_user()?, Some(profile()));

        Ok(())
    }

    #[tokio::test]
    async fn blank_credentials_are_rejected_locally() -> TestResult {
        let mut api = MockAuthApi::new();
        api.expect_login().never();

        let service = service(api, MockCartsApi::new(), &Session::in_memory());

        let result = service.login("  ", "secret").await;

        assert!(
            matches!(result, Err(AuthServiceError::MissingCredentials)),
            "expected MissingCredentials, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn logout_clears_token_and_profile() -> TestResult {
        let session = Session::in_memory();
        let service = service(accepting_login()?, MockCartsApi::new(), &session);

        service.login("an@example.com", "secret").await?;
        service.logout().await?;

        assert_eq!(session.auth_token()?, None);
        assert_eq!(session.current_user()?, None);

        Ok(())
    }

    #[tokio::test]
    async fn signing_in_and_out_forgets_cached_cart() -> TestResult {
        let session = Session::in_memory();

        let mut carts_api = MockCartsApi::new();
        let guest_cart = cart(&[("v-1", 100, 5, 1)])?;
        carts_api
            .expect_get_cart()
            .times(2)
            .returning(move |_| Ok(payload(guest_cart.clone())));
        carts_api
            .expect_merge_guest_cart()
            .times(1)
            .returning(|_, _| Ok(()));

        let carts = CartService::new(Arc::new(carts_api), session.clone());
        let service = AuthService::new(Arc::new(accepting_login()?), carts.clone(), session.clone());

        carts.get_cart().await?;
        assert!(carts.current().await.is_some(), "expected the guest cart to be cached");

        service.login("an@example.com", "secret").await?;
        assert_eq!(carts.current().await, None);

        carts.get_cart().await?;
        service.logout().await?;
        assert_eq!(carts.current().await, None);

        Ok(())
    }
}
