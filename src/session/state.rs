use std::sync::{Arc, RwLock};

use crate::models::User;

#[derive(Debug)]
struct SessionState {
    user: Option<User>,
    initializing: bool,
}

/// Shared handle to the process-wide session: the authenticated identity
/// plus the startup-initialization flag. Cheap to clone; all clones see the
/// same state, so the gateway can clear the identity on an unrecoverable
/// auth failure without owning the manager.
#[derive(Clone)]
pub struct Session {
    inner: Arc<RwLock<SessionState>>,
}

impl Session {
    /// A fresh session: no identity, initialization pending.
    pub fn new() -> Self {
        Session {
            inner: Arc::new(RwLock::new(SessionState {
                user: None,
                initializing: true,
            })),
        }
    }

    pub fn user(&self) -> Option<User> {
        self.inner.read().expect("session lock poisoned").user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .expect("session lock poisoned")
            .user
            .is_some()
    }

    pub fn is_initializing(&self) -> bool {
        self.inner
            .read()
            .expect("session lock poisoned")
            .initializing
    }

    pub fn set_user(&self, user: User) {
        self.inner.write().expect("session lock poisoned").user = Some(user);
    }

    /// Drop the identity; used by logout and by the gateway on an
    /// unrecoverable auth failure.
    pub fn clear_user(&self) {
        self.inner.write().expect("session lock poisoned").user = None;
    }

    pub fn finish_initializing(&self) {
        self.inner
            .write()
            .expect("session lock poisoned")
            .initializing = false;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: "1".to_string(),
            username: "ada".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            ..Default::default()
        }
    }

    /// Test the initial state: unauthenticated, initialization pending.
    #[test]
    fn test_initial_state() {
        let session = Session::new();
        assert!(session.is_initializing());
        assert!(!session.is_authenticated());
        assert_eq!(session.user(), None);
    }

    /// Test that setting and clearing the user flips authentication.
    #[test]
    fn test_set_and_clear_user() {
        let session = Session::new();
        session.set_user(test_user());
        assert!(session.is_authenticated());
        assert_eq!(session.user().unwrap().username, "ada");

        session.clear_user();
        assert!(!session.is_authenticated());
    }

    /// Test that clones observe each other's writes.
    #[test]
    fn test_clones_share_state() {
        let session = Session::new();
        let clone = session.clone();

        clone.set_user(test_user());
        assert!(session.is_authenticated());

        session.finish_initializing();
        assert!(!clone.is_initializing());
    }
}
