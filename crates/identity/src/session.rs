//! Session provider contracts.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use clipsync_media_model::Identity;

use crate::error::AuthError;

/// Read side of the authenticated session.
///
/// Components that need an owner for their work call
/// [`current_identity`](Self::current_identity) at the start of each
/// operation. Nothing outside the provider mutates session state.
pub trait SessionProvider: Send + Sync {
    /// The signed-in identity, if any.
    fn current_identity(&self) -> Option<Identity>;

    /// Receiver that observes every authenticated/unauthenticated transition.
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
}

/// Credential operations of an authentication service.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// In-process session state backed by a `watch` channel.
///
/// Subscribers are only woken when the identity actually changes.
#[derive(Debug, Clone)]
pub struct SessionState {
    tx: Arc<watch::Sender<Option<Identity>>>,
}

impl SessionState {
    pub fn signed_out() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn signed_in(identity: Identity) -> Self {
        let (tx, _rx) = watch::channel(Some(identity));
        Self { tx: Arc::new(tx) }
    }

    /// Replace the current identity. Returns whether it changed.
    pub fn set(&self, identity: Option<Identity>) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == identity {
                false
            } else {
                *current = identity;
                true
            }
        })
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::signed_out()
    }
}

impl SessionProvider for SessionState {
    fn current_identity(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }
}

/// Run `callback` on every session transition until the provider goes away.
///
/// The callback is not invoked for the state current at subscription time.
pub fn on_identity_change<F>(provider: &dyn SessionProvider, mut callback: F) -> JoinHandle<()>
where
    F: FnMut(Option<Identity>) + Send + 'static,
{
    let mut rx = provider.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let identity = rx.borrow_and_update().clone();
            tracing::debug!(signed_in = identity.is_some(), "Session transition");
            callback(identity);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_set_reports_change_only_on_transition() {
        let session = SessionState::signed_out();
        assert!(session.current_identity().is_none());
        assert!(session.set(Some(Identity::new("u1"))));
        assert!(!session.set(Some(Identity::new("u1"))));
        assert_eq!(session.current_identity(), Some(Identity::new("u1")));
        assert!(session.set(None));
    }

    #[tokio::test]
    async fn test_on_identity_change_sees_transitions() {
        let session = SessionState::signed_out();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handle = on_identity_change(&session, move |id| {
            sink.lock().unwrap().push(id.map(|i| i.to_string()));
        });

        session.set(Some(Identity::new("u1")));
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        session.set(None);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        drop(session);
        handle.await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![Some("u1".to_string()), None]);
    }
}
