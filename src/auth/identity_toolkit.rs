//! Identity Toolkit v1 REST client.
//!
//! Speaks the `accounts:*` JSON endpoints with an API key. Only the pieces
//! needed for email/password accounts are implemented.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::{AuthProvider, AuthUser, auth_error};
use crate::error::{AppError, Result};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Extract the error code from a failure body such as
/// `{"error": {"message": "WEAK_PASSWORD : Password should be at least 6 characters"}}`.
fn error_code(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    envelope
        .error
        .message
        .split([' ', ':'])
        .find(|part| !part.is_empty())
        .map(str::to_string)
}

/// Email/password accounts backed by the Identity Toolkit service.
pub struct IdentityToolkitAuth {
    client: Client,
    endpoint: String,
    api_key: String,
    /// Token of the signed-in account.
    id_token: Mutex<Option<String>>,
}

impl IdentityToolkitAuth {
    /// Create a client for `endpoint` (for example `https://identitytoolkit.googleapis.com/v1`).
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            id_token: Mutex::new(None),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{base}/accounts:{method}?key={key}", base = self.endpoint, key = self.api_key)
    }

    async fn post<B: Serialize + Sync, R: DeserializeOwned + Send>(&self, method: &str, body: &B) -> Result<R> {
        debug!("POST accounts:{method}");
        let response = self.client.post(self.url(method)).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            return Err(match error_code(&body) {
                Some(code) => auth_error(&code),
                None => AppError::remote(format!("auth service returned {status}")),
            });
        }

        Ok(response.json::<R>().await?)
    }

    async fn password_call(&self, method: &str, email: &str, password: &str) -> Result<AccountResponse> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        self.post(method, &request).await
    }
}

#[async_trait]
impl AuthProvider for IdentityToolkitAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let account = self.password_call("signInWithPassword", email, password).await?;
        *self.id_token.lock().await = Some(account.id_token.clone());

        Ok(AuthUser {
            uid: account.local_id,
            email: account.email,
            display_name: account.display_name.filter(|n| !n.is_empty()),
        })
    }

    async fn sign_up(&self, email: &str, password: &str, display_name: Option<&str>) -> Result<AuthUser> {
        let account = self.password_call("signUp", email, password).await?;

        let display_name = display_name.map(str::trim).filter(|n| !n.is_empty());
        if let Some(name) = display_name {
            let request = UpdateProfileRequest {
                id_token: &account.id_token,
                display_name: name,
                return_secure_token: false,
            };
            let _: serde_json::Value = self.post("update", &request).await?;
        }
        *self.id_token.lock().await = Some(account.id_token);

        Ok(AuthUser {
            uid: account.local_id,
            email: account.email,
            display_name: display_name.map(str::to_string),
        })
    }

    async fn sign_out(&self) -> Result<()> {
        self.id_token.lock().await.take();
        Ok(())
    }
}
