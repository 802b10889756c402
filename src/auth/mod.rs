//! Authentication: provider abstraction and the signed-in session.

pub mod identity_toolkit;
pub mod local;

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use regex::Regex;
use tracing::info;

use crate::error::{AppError, Result};
use crate::services::collaborator::is_valid_email;

pub use identity_toolkit::IdentityToolkitAuth;
pub use local::LocalAuth;

/// Signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl AuthUser {
    /// Display name, falling back to the email.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.email)
    }
}

/// Remote or local account service.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Create an account and sign it in.
    async fn sign_up(&self, email: &str, password: &str, display_name: Option<&str>) -> Result<AuthUser>;

    async fn sign_out(&self) -> Result<()>;
}

/// User-facing message for a provider error code.
pub(crate) fn auth_error(code: &str) -> AppError {
    let msg = match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => "Invalid email or password",
        "USER_DISABLED" => "This account has been disabled",
        "EMAIL_EXISTS" => "An account with this email already exists",
        "WEAK_PASSWORD" => "Password should be at least 6 characters",
        "INVALID_EMAIL" => "Email is invalid",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts, try again later",
        other => return AppError::remote(format!("auth service error: {other}")),
    };
    AppError::auth(msg)
}

type Listener = Arc<dyn Fn(Option<&AuthUser>) + Send + Sync>;

#[derive(Default)]
struct SessionState {
    user: Option<AuthUser>,
    listeners: BTreeMap<u64, Listener>,
    next_id: u64,
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Current user plus auth state listeners. Cheap to clone.
#[derive(Clone)]
pub struct AuthSession {
    provider: Arc<dyn AuthProvider>,
    state: Arc<Mutex<SessionState>>,
}

impl AuthSession {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            provider,
            state: Arc::default(),
        }
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        lock(&self.state).user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        lock(&self.state).user.is_some()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let user = self.provider.sign_in(email.trim(), password).await?;
        info!("Signed in as {}", user.email);
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    pub async fn sign_up(&self, email: &str, password: &str, display_name: Option<&str>) -> Result<AuthUser> {
        let user = self.provider.sign_up(email.trim(), password, display_name).await?;
        info!("Created account {}", user.email);
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.provider.sign_out().await?;
        info!("Signed out");
        self.set_user(None);
        Ok(())
    }

    /// Register `callback`. It runs right away with the current user and
    /// again after every sign-in or sign-out, until the subscription drops.
    pub fn on_auth_state_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Option<&AuthUser>) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(callback);
        let (id, user) = {
            let mut state = lock(&self.state);
            let id = state.next_id;
            state.next_id += 1;
            state.listeners.insert(id, listener.clone());
            (id, state.user.clone())
        };
        listener(user.as_ref());

        Subscription {
            state: Arc::downgrade(&self.state),
            id,
        }
    }

    fn set_user(&self, user: Option<AuthUser>) {
        // Listeners run outside the lock so they may call back into the session.
        let listeners: Vec<Listener> = {
            let mut state = lock(&self.state);
            state.user = user.clone();
            state.listeners.values().cloned().collect()
        };
        for listener in listeners {
            listener(user.as_ref());
        }
    }
}

/// Handle returned by [`AuthSession::on_auth_state_change`].
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    state: Weak<Mutex<SessionState>>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            lock(&state).listeners.remove(&self.id);
        }
    }
}

static EMAIL_LOCAL_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]+$").expect("local part pattern is valid"));

/// Registration form.
///
/// With a company domain configured, `email` holds only the local part.
#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    /// Validate and return the full email address to register.
    pub fn validate(&self, email_domain: Option<&str>) -> Result<String> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Name is required"));
        }

        let email = self.email.trim();
        let email = match email_domain {
            Some(domain) => {
                if !EMAIL_LOCAL_PART.is_match(email) {
                    return Err(AppError::validation(
                        "Email may only contain letters, digits, dots, hyphens or underscores",
                    ));
                }
                format!("{email}@{domain}")
            }
            None => {
                if !is_valid_email(email) {
                    return Err(AppError::validation("Email is invalid"));
                }
                email.to_string()
            }
        };

        if self.password.is_empty() {
            return Err(AppError::validation("Password is required"));
        }
        if self.password != self.confirm_password {
            return Err(AppError::validation("Passwords do not match"));
        }
        Ok(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn session() -> AuthSession {
        AuthSession::new(Arc::new(LocalAuth::new()))
    }

    #[tokio::test]
    async fn test_listener_fires_immediately_and_on_change() {
        let session = session();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let seen = calls.clone();
        let _sub = session.on_auth_state_change(move |user| {
            seen.lock().unwrap().push(user.map(|u| u.email.clone()));
        });

        session
            .sign_up("ana@example.com", "secret1", Some("Ana"))
            .await
            .unwrap();
        session.sign_out().await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![None, Some("ana@example.com".to_string()), None]
        );
    }

    #[tokio::test]
    async fn test_dropped_subscription_stops_notifications() {
        let session = session();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let sub = session.on_auth_state_change(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        sub.unsubscribe();

        session.sign_up("ana@example.com", "secret1", None).await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_sign_in_keeps_user_out() {
        let session = session();
        let err = session.sign_in("nobody@example.com", "secret1").await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
        assert_eq!(session.current_user(), None);
    }

    #[test]
    fn test_unknown_code_is_remote() {
        assert!(auth_error("SOMETHING_NEW").is_remote());
        assert!(matches!(auth_error("EMAIL_EXISTS"), AppError::Auth(_)));
    }

    #[test]
    fn test_sign_up_form_with_company_domain() {
        let mut form = SignUpForm {
            name: "Ana".to_string(),
            email: "ana.souza".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        };
        assert_eq!(form.validate(Some("flugo.com")).unwrap(), "ana.souza@flugo.com");

        form.email = "ana souza".to_string();
        assert!(form.validate(Some("flugo.com")).is_err());
    }

    #[test]
    fn test_sign_up_form_password_mismatch() {
        let form = SignUpForm {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret2".to_string(),
        };
        let err = form.validate(None).unwrap_err();
        assert_eq!(err.user_message("x"), "Passwords do not match");
    }
}
