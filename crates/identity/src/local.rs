//! File-backed email/password provider.
//!
//! Accounts live in a JSON file next to a session file that remembers who is
//! signed in between CLI invocations. Passwords are stored as salted SHA-256
//! digests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::{watch, Mutex};

use clipsync_media_model::Identity;

use crate::error::AuthError;
use crate::session::{AuthProvider, SessionProvider, SessionState};

/// Shortest password accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    uid: String,
    email: String,
    salt: String,
    password_sha256: String,
    created_at: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountBook {
    accounts: Vec<Account>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    uid: String,
    email: String,
}

/// Email/password provider persisting to the local filesystem.
pub struct LocalAuthProvider {
    accounts_path: PathBuf,
    session_path: PathBuf,
    book: Mutex<AccountBook>,
    session: SessionState,
}

impl LocalAuthProvider {
    /// Open (or lazily create) the account book and restore a saved session.
    pub fn open(
        accounts_path: impl Into<PathBuf>,
        session_path: impl Into<PathBuf>,
    ) -> Result<Self, AuthError> {
        let accounts_path = accounts_path.into();
        let session_path = session_path.into();

        let book: AccountBook = read_json(&accounts_path)?.unwrap_or_default();
        let saved: Option<SessionFile> = read_json(&session_path)?;

        let restored = saved.and_then(|s| {
            if book.accounts.iter().any(|a| a.uid == s.uid) {
                Some(Identity::new(s.uid))
            } else {
                tracing::warn!(uid = %s.uid, "Saved session refers to unknown account; ignoring");
                None
            }
        });

        tracing::debug!(
            accounts = book.accounts.len(),
            signed_in = restored.is_some(),
            path = %accounts_path.display(),
            "Opened local auth provider"
        );

        let session = match restored {
            Some(identity) => SessionState::signed_in(identity),
            None => SessionState::signed_out(),
        };

        Ok(Self {
            accounts_path,
            session_path,
            book: Mutex::new(book),
            session,
        })
    }

    /// Email of the signed-in account, if any.
    pub async fn current_email(&self) -> Option<String> {
        let identity = self.session.current_identity()?;
        let book = self.book.lock().await;
        book.accounts
            .iter()
            .find(|a| a.uid == identity.as_str())
            .map(|a| a.email.clone())
    }

    fn start_session(&self, account: &Account) -> Result<Identity, AuthError> {
        write_json(
            &self.session_path,
            &SessionFile {
                uid: account.uid.clone(),
                email: account.email.clone(),
            },
        )?;
        let identity = Identity::new(account.uid.clone());
        self.session.set(Some(identity.clone()));
        Ok(identity)
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email);
        validate_email(&email)?;

        let book = self.book.lock().await;
        let account = book
            .accounts
            .iter()
            .find(|a| a.email == email)
            .ok_or(AuthError::UserNotFound)?;

        if digest_password(&account.salt, password) != account.password_sha256 {
            tracing::info!(email = %email, "Sign-in rejected: wrong password");
            return Err(AuthError::WrongPassword);
        }

        let identity = self.start_session(account)?;
        tracing::info!(uid = %identity, "Signed in");
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email);
        validate_email(&email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword {
                min: MIN_PASSWORD_LEN,
            });
        }

        let mut book = self.book.lock().await;
        if book.accounts.iter().any(|a| a.email == email) {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let salt = uuid::Uuid::new_v4().simple().to_string();
        let account = Account {
            uid: uuid::Uuid::new_v4().simple().to_string(),
            password_sha256: digest_password(&salt, password),
            salt,
            email,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        book.accounts.push(account.clone());
        if let Err(e) = write_json(&self.accounts_path, &*book) {
            book.accounts.pop();
            return Err(e);
        }

        // Without a session the new account is unusable; drop it so the
        // email can be registered again.
        let identity = match self.start_session(&account) {
            Ok(identity) => identity,
            Err(e) => {
                book.accounts.pop();
                if let Err(rollback) = write_json(&self.accounts_path, &*book) {
                    tracing::warn!(
                        email = %account.email,
                        error = %rollback,
                        "Account left on disk after failed session start"
                    );
                }
                return Err(e);
            }
        };
        tracing::info!(uid = %identity, "Account created");
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        match std::fs::remove_file(&self.session_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(AuthError::Backend(e.to_string())),
        }
        if self.session.set(None) {
            tracing::info!("Signed out");
        }
        Ok(())
    }
}

impl SessionProvider for LocalAuthProvider {
    fn current_identity(&self) -> Option<Identity> {
        self.session.current_identity()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.session.subscribe()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Accepts `local@domain.tld` with no whitespace.
fn validate_email(email: &str) -> Result<(), AuthError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthError::InvalidEmail);
    };
    let well_formed = !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split('.')
            .filter(|label| !label.is_empty())
            .count()
            >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.');
    if well_formed {
        Ok(())
    } else {
        Err(AuthError::InvalidEmail)
    }
}

fn digest_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, AuthError> {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| AuthError::Backend(format!("{}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AuthError::Backend(format!("{}: {e}", path.display()))),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AuthError::Backend(format!("{}: {e}", parent.display())))?;
    }
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AuthError::Backend(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| AuthError::Backend(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("clipsync_test_auth_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn open(dir: &Path) -> LocalAuthProvider {
        LocalAuthProvider::open(dir.join("accounts.json"), dir.join("session.json")).unwrap()
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("a.b@mail.example.org").is_ok());
        assert_eq!(validate_email("ana"), Err(AuthError::InvalidEmail));
        assert_eq!(validate_email("@example.com"), Err(AuthError::InvalidEmail));
        assert_eq!(validate_email("ana@localhost"), Err(AuthError::InvalidEmail));
        assert_eq!(validate_email("ana@example."), Err(AuthError::InvalidEmail));
        assert_eq!(validate_email("an a@example.com"), Err(AuthError::InvalidEmail));
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let dir = fresh_dir("signup_signin");
        let auth = open(&dir);

        let created = auth.sign_up("Ana@Example.com ", "secret1").await.unwrap();
        assert_eq!(auth.current_identity(), Some(created.clone()));
        assert_eq!(auth.current_email().await.as_deref(), Some("ana@example.com"));

        auth.sign_out().await.unwrap();
        assert!(auth.current_identity().is_none());

        let signed_in = auth.sign_in("ana@example.com", "secret1").await.unwrap();
        assert_eq!(signed_in, created);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_sign_up_rejections() {
        let dir = fresh_dir("signup_rejections");
        let auth = open(&dir);

        assert_eq!(
            auth.sign_up("ana@example.com", "12345").await,
            Err(AuthError::WeakPassword { min: 6 })
        );
        assert_eq!(
            auth.sign_up("not-an-email", "123456").await,
            Err(AuthError::InvalidEmail)
        );
        auth.sign_up("ana@example.com", "123456").await.unwrap();
        assert_eq!(
            auth.sign_up("ana@example.com", "abcdef").await,
            Err(AuthError::EmailAlreadyInUse)
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_sign_in_rejections() {
        let dir = fresh_dir("signin_rejections");
        let auth = open(&dir);
        auth.sign_up("ana@example.com", "123456").await.unwrap();
        auth.sign_out().await.unwrap();

        assert_eq!(
            auth.sign_in("bob@example.com", "123456").await,
            Err(AuthError::UserNotFound)
        );
        assert_eq!(
            auth.sign_in("ana@example.com", "654321").await,
            Err(AuthError::WrongPassword)
        );
        assert!(auth.current_identity().is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_session_survives_reopen() {
        let dir = fresh_dir("session_reopen");
        let uid = {
            let auth = open(&dir);
            auth.sign_up("ana@example.com", "123456").await.unwrap()
        };

        let reopened = open(&dir);
        assert_eq!(reopened.current_identity(), Some(uid));

        reopened.sign_out().await.unwrap();
        let again = open(&dir);
        assert!(again.current_identity().is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_failed_session_start_rolls_back_account() {
        let dir = fresh_dir("signup_rollback");
        let session_path = dir.join("session.json");
        let auth =
            LocalAuthProvider::open(dir.join("accounts.json"), session_path.clone()).unwrap();
        // A directory where the session file should go makes the write fail.
        std::fs::create_dir_all(&session_path).unwrap();

        let err = auth.sign_up("ana@example.com", "123456").await.unwrap_err();
        assert!(matches!(err, AuthError::Backend(_)));
        assert!(auth.current_identity().is_none());
        // Retrying reports the session failure again, not a taken email.
        assert!(matches!(
            auth.sign_up("ana@example.com", "123456").await,
            Err(AuthError::Backend(_))
        ));

        std::fs::remove_dir_all(&session_path).unwrap();
        let reopened = open(&dir);
        reopened.sign_up("ana@example.com", "123456").await.unwrap();

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_password_digest_depends_on_salt() {
        assert_ne!(digest_password("a", "pw"), digest_password("b", "pw"));
        assert_eq!(digest_password("a", "pw"), digest_password("a", "pw"));
    }
}
