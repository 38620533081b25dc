// Admin authentication
//
// Email/password login against `admin-auth/login`. The backend returns the
// token at the top level and the user under `data.user`; on success the
// full credential is written to the client's session store.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, info};

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::LoginResponse;
use crate::session::Session;

const LOGIN_FAILED: &str = "Login failed";

impl ApiClient {
    /// Authenticate and persist the resulting session.
    ///
    /// Nothing is written to the session store unless the backend returns
    /// both a token and a user.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Session, Error> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::validation("email", "is required"));
        }
        if password.expose_secret().is_empty() {
            return Err(Error::validation("password", "is required"));
        }

        debug!(email, "logging in");

        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });
        let resp: LoginResponse = self
            .post_body("admin-auth/login", &body, LOGIN_FAILED)
            .await?;

        let (nested_token, user) = match resp.data {
            Some(data) => (data.token, data.user),
            None => (None, None),
        };
        let token = resp
            .token
            .or(nested_token)
            .filter(|t| !t.trim().is_empty());

        let (Some(token), Some(user)) = (token, user) else {
            return Err(Error::Unauthorized {
                message: LOGIN_FAILED.into(),
            });
        };

        let session = Session::new(&token, user);
        self.session().save(&session)?;
        info!(user_id = %session.user_id, "login successful");
        Ok(session)
    }

    /// Drop the local session. The backend keeps no server-side state.
    pub fn logout(&self) {
        self.session().clear();
        info!("logged out");
    }
}
