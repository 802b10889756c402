//! In-process accounts for offline mode and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AuthProvider, AuthUser, auth_error};
use crate::error::Result;
use crate::services::collaborator::is_valid_email;

const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    user: AuthUser,
    password: String,
}

/// Accounts kept in memory for the lifetime of the process.
#[derive(Default)]
pub struct LocalAuth {
    accounts: RwLock<HashMap<String, Account>>,
}

impl LocalAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register an account.
    pub fn with_account(mut self, email: &str, password: &str, display_name: Option<&str>) -> Self {
        let key = email.to_lowercase();
        let account = Account {
            user: AuthUser {
                uid: Uuid::new_v4().simple().to_string(),
                email: email.to_string(),
                display_name: display_name.map(str::to_string),
            },
            password: password.to_string(),
        };
        self.accounts.get_mut().insert(key, account);
        self
    }
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(&email.to_lowercase())
            .ok_or_else(|| auth_error("EMAIL_NOT_FOUND"))?;
        if account.password != password {
            return Err(auth_error("INVALID_PASSWORD"));
        }
        Ok(account.user.clone())
    }

    async fn sign_up(&self, email: &str, password: &str, display_name: Option<&str>) -> Result<AuthUser> {
        if !is_valid_email(email) {
            return Err(auth_error("INVALID_EMAIL"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(auth_error("WEAK_PASSWORD"));
        }

        let mut accounts = self.accounts.write().await;
        let key = email.to_lowercase();
        if accounts.contains_key(&key) {
            return Err(auth_error("EMAIL_EXISTS"));
        }

        let user = AuthUser {
            uid: Uuid::new_v4().simple().to_string(),
            email: email.to_string(),
            display_name: display_name.filter(|n| !n.trim().is_empty()).map(str::to_string),
        };
        accounts.insert(
            key,
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        Ok(())
    }
}
