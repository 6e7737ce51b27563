use crate::auth::session::SessionStore;
use crate::error::{ClientError, ClientResult};
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, Session};
use crate::services::api::ApiClient;

/// Login, registration and logout against the backend, recorded in a
/// [`SessionStore`].
#[derive(Clone)]
pub struct AuthClient {
    api: ApiClient,
    store: SessionStore,
}

impl AuthClient {
    pub fn new(api: ApiClient, store: SessionStore) -> Self {
        Self { api, store }
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        require_email(email)?;
        require("Password", password)?;

        let resp = self
            .api
            .send(self.api.post("/auth/login").json(&LoginRequest { email, password }))
            .await?;

        if !resp.status().is_success() {
            return Err(self.api.fail(resp, "Login failed", ClientError::Auth).await);
        }

        let body: LoginResponse = self.api.parse(resp).await?;
        self.store.write(&body.access_token, &body.user)?;
        tracing::info!("Logged in as {email}");

        Ok(Session::LoggedIn {
            token: body.access_token,
            user: body.user,
        })
    }

    /// Create an account. No session is established; the caller logs in
    /// as a separate step.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> ClientResult<()> {
        require("Name", name)?;
        require_email(email)?;
        require("Password", password)?;

        let resp = self
            .api
            .send(
                self.api
                    .post("/auth/register")
                    .json(&RegisterRequest { name, email, password }),
            )
            .await?;

        if !resp.status().is_success() {
            return Err(self
                .api
                .fail(resp, "Registration failed", ClientError::Register)
                .await);
        }

        // The body carries nothing we need, but it must be the backend's JSON
        let _: serde_json::Value = self.api.parse(resp).await?;
        tracing::info!("Registered account for {email}");
        Ok(())
    }

    /// Purely local: forget the stored session.
    pub fn logout(&self) -> ClientResult<()> {
        self.store.clear()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }
}

fn require(field: &str, value: &str) -> ClientResult<()> {
    if value.trim().is_empty() {
        return Err(ClientError::InvalidInput(format!("{field} is required")));
    }
    Ok(())
}

fn require_email(email: &str) -> ClientResult<()> {
    require("Email", email)?;
    if !email.contains('@') {
        return Err(ClientError::InvalidInput("Invalid email address".to_string()));
    }
    Ok(())
}
