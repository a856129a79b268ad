//! In-process authentication provider
//!
//! Keeps an account table in memory and remembers the signed-in identity,
//! mirroring the contract of a hosted email/password provider. Used by the
//! tests and for running the profile store without a hosted backend.

use crate::core::{AuthError, AuthProvider, Identity};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    user_id: String,
    password: String,
}

#[derive(Default)]
pub struct MemoryAuthProvider {
    accounts: Mutex<HashMap<String, Account>>,
    current: Mutex<Option<Identity>>,
    next_id: AtomicU64,
    fail_sign_out: AtomicBool,
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `sign_out` fail, for exercising error paths.
    pub fn set_sign_out_failure(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    fn identity(email: &str, account: &Account) -> Identity {
        Identity {
            user_id: account.user_id.clone(),
            email: Some(email.to_string()),
        }
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let accounts = self.accounts.lock().await;
        let account = accounts.get(email).ok_or_else(|| {
            AuthError::Rejected(
                "There is no user record corresponding to this identifier.".to_string(),
            )
        })?;
        if account.password != password {
            return Err(AuthError::Rejected(
                "The password is invalid or the user does not have a password.".to_string(),
            ));
        }

        let identity = Self::identity(email, account);
        *self.current.lock().await = Some(identity.clone());
        debug!("Signed in user {}", identity.user_id);
        Ok(identity)
    }

    async fn create_user(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        if !email.contains('@') {
            return Err(AuthError::Rejected(
                "The email address is badly formatted.".to_string(),
            ));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Rejected(format!(
                "The password must be {MIN_PASSWORD_LEN} characters long or more."
            )));
        }

        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(email) {
            return Err(AuthError::Rejected(
                "The email address is already in use by another account.".to_string(),
            ));
        }

        let account = Account {
            user_id: format!("user-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            password: password.to_string(),
        };
        let identity = Self::identity(email, &account);
        accounts.insert(email.to_string(), account);
        *self.current.lock().await = Some(identity.clone());
        debug!("Created user {}", identity.user_id);
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AuthError::Rejected("Network error while signing out.".to_string()));
        }
        *self.current.lock().await = None;
        Ok(())
    }

    async fn current_user(&self) -> Option<Identity> {
        self.current.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_sign_in() {
        let auth = MemoryAuthProvider::new();

        let created = auth.create_user("a@example.com", "secret1").await.unwrap();
        auth.sign_out().await.unwrap();
        assert!(auth.current_user().await.is_none());

        let signed_in = auth.sign_in("a@example.com", "secret1").await.unwrap();
        assert_eq!(created, signed_in);
        assert_eq!(auth.current_user().await, Some(signed_in));
    }

    #[tokio::test]
    async fn test_rejections_carry_provider_messages() {
        let auth = MemoryAuthProvider::new();

        let bad_email = auth.create_user("nope", "secret1").await.unwrap_err();
        assert_eq!(bad_email.message(), "The email address is badly formatted.");

        let short = auth.create_user("a@example.com", "abc").await.unwrap_err();
        assert!(short.message().contains("6 characters"));

        auth.create_user("a@example.com", "secret1").await.unwrap();
        let duplicate = auth.create_user("a@example.com", "secret2").await.unwrap_err();
        assert!(duplicate.message().contains("already in use"));

        let wrong = auth.sign_in("a@example.com", "wrong").await.unwrap_err();
        assert!(wrong.message().contains("password is invalid"));
    }

    #[tokio::test]
    async fn test_sign_out_failure_keeps_current_user() {
        let auth = MemoryAuthProvider::new();
        auth.create_user("a@example.com", "secret1").await.unwrap();
        auth.set_sign_out_failure(true);

        assert!(auth.sign_out().await.is_err());
        assert!(auth.current_user().await.is_some());
    }
}
